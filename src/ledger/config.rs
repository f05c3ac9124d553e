//! Ledger configuration and errors
//!
//! The owner set and threshold are validated once here and never change
//! for the lifetime of a ledger.

use crate::crypto::script_address;
use crate::custody::TransferError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors returned by ledger operations
///
/// Every variant is a rejected call: no state changed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Not an owner: {0}")]
    NotAnOwner(String),
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(usize),
    #[error("Transaction {0} already executed")]
    AlreadyExecuted(usize),
    #[error("Transaction {index} already confirmed by {owner}")]
    AlreadyConfirmed { index: usize, owner: String },
    #[error("Transaction {index} not confirmed by {owner}")]
    NotConfirmed { index: usize, owner: String },
    #[error("Insufficient confirmations: have {have}, need {need}")]
    InsufficientConfirmations { have: usize, need: u32 },
    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
    #[error("Reentrant call while a transfer is in flight")]
    Reentrant,
    #[error("Ledger lock poisoned")]
    LockPoisoned,
}

/// Owner set and confirmation threshold
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LedgerConfig {
    /// Authorized owners, in deployment order
    pub owners: Vec<String>,
    /// Minimum confirmations required (M in M-of-N)
    pub threshold: u32,
    /// Optional human-readable label
    #[serde(default)]
    pub label: Option<String>,
}

impl LedgerConfig {
    /// Create a validated configuration
    ///
    /// # Errors
    /// `InvalidConfiguration` if the owner list is empty, contains a blank
    /// or duplicate identifier, or the threshold is outside `1..=owners`.
    pub fn new(
        owners: Vec<String>,
        threshold: u32,
        label: Option<String>,
    ) -> Result<Self, LedgerError> {
        let config = Self {
            owners,
            threshold,
            label,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants `new` enforces
    ///
    /// Configurations read from disk go through this as well.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.owners.is_empty() {
            return Err(LedgerError::InvalidConfiguration(
                "owner list is empty".to_string(),
            ));
        }

        if self.owners.iter().any(|o| o.trim().is_empty()) {
            return Err(LedgerError::InvalidConfiguration(
                "owner identifier is blank".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for owner in &self.owners {
            if !seen.insert(owner.as_str()) {
                return Err(LedgerError::InvalidConfiguration(format!(
                    "duplicate owner {}",
                    owner
                )));
            }
        }

        if self.threshold == 0 {
            return Err(LedgerError::InvalidConfiguration(
                "threshold must be at least 1".to_string(),
            ));
        }

        if self.threshold as usize > self.owners.len() {
            return Err(LedgerError::InvalidConfiguration(format!(
                "threshold {} exceeds owner count {}",
                self.threshold,
                self.owners.len()
            )));
        }

        Ok(())
    }

    /// Check if an identifier is one of the owners
    pub fn is_owner(&self, id: &str) -> bool {
        self.owners.iter().any(|o| o == id)
    }

    /// Get the total owner count (N)
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.threshold, self.owners.len())
    }

    /// Deterministic custodial address for this owner set
    ///
    /// Address = Base58Check(0x05 || RIPEMD160(SHA256(threshold || sorted owners)))
    pub fn address(&self) -> String {
        let mut sorted_owners = self.owners.clone();
        sorted_owners.sort();

        let mut script_data = self.threshold.to_be_bytes().to_vec();
        for owner in &sorted_owners {
            script_data.extend_from_slice(owner.as_bytes());
            // Separator so ["ab","c"] and ["a","bc"] differ
            script_data.push(0);
        }

        script_address(&script_data)
    }
}
