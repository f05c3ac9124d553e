//! Proposed transfers and their confirmation state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Status of a proposed transfer
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Fewer confirmations than the threshold
    AwaitingConfirmations,
    /// Enough confirmations, not yet executed
    Ready,
    /// Funds moved; terminal
    Executed,
}

/// A proposed transfer
///
/// Fields are private: the confirmation count must always equal the size
/// of the confirming set, and `executed` only ever goes from false to true.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    to: String,
    value: u128,
    #[serde(with = "hex::serde")]
    data: Vec<u8>,
    executed: bool,
    confirmation_count: usize,
    confirmed_by: BTreeSet<String>,
    proposer: String,
    created_at: DateTime<Utc>,
    executed_at: Option<DateTime<Utc>>,
}

/// Read-only view of a transaction
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionInfo {
    pub to: String,
    pub value: u128,
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
    pub executed: bool,
    pub confirmation_count: usize,
}

impl Transaction {
    pub(crate) fn new(proposer: &str, to: &str, value: u128, data: Vec<u8>) -> Self {
        Self {
            to: to.to_string(),
            value,
            data,
            executed: false,
            confirmation_count: 0,
            confirmed_by: BTreeSet::new(),
            proposer: proposer.to_string(),
            created_at: Utc::now(),
            executed_at: None,
        }
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn value(&self) -> u128 {
        self.value
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn executed(&self) -> bool {
        self.executed
    }

    pub fn confirmation_count(&self) -> usize {
        self.confirmation_count
    }

    /// Owners currently holding a confirmation, sorted
    pub fn confirmed_by(&self) -> Vec<&str> {
        self.confirmed_by.iter().map(String::as_str).collect()
    }

    pub fn is_confirmed_by(&self, owner: &str) -> bool {
        self.confirmed_by.contains(owner)
    }

    pub fn proposer(&self) -> &str {
        &self.proposer
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn executed_at(&self) -> Option<DateTime<Utc>> {
        self.executed_at
    }

    /// Status against a threshold
    pub fn status(&self, threshold: u32) -> TransactionStatus {
        if self.executed {
            TransactionStatus::Executed
        } else if self.confirmation_count >= threshold as usize {
            TransactionStatus::Ready
        } else {
            TransactionStatus::AwaitingConfirmations
        }
    }

    pub fn info(&self) -> TransactionInfo {
        TransactionInfo {
            to: self.to.clone(),
            value: self.value,
            data: self.data.clone(),
            executed: self.executed,
            confirmation_count: self.confirmation_count,
        }
    }

    /// Record a confirmation; false if the owner already confirmed
    pub(crate) fn add_confirmation(&mut self, owner: &str) -> bool {
        if !self.confirmed_by.insert(owner.to_string()) {
            return false;
        }
        self.confirmation_count += 1;
        true
    }

    /// Withdraw a confirmation; false if the owner had none
    pub(crate) fn remove_confirmation(&mut self, owner: &str) -> bool {
        if !self.confirmed_by.remove(owner) {
            return false;
        }
        self.confirmation_count -= 1;
        true
    }

    pub(crate) fn mark_executed(&mut self) {
        self.executed = true;
    }

    /// Undo `mark_executed` after a failed transfer
    pub(crate) fn rollback_execution(&mut self) {
        self.executed = false;
        self.executed_at = None;
    }

    pub(crate) fn finalize_execution(&mut self) {
        self.executed_at = Some(Utc::now());
    }

    /// Stored count matches the confirming set
    pub(crate) fn is_consistent(&self) -> bool {
        self.confirmation_count == self.confirmed_by.len()
    }
}
