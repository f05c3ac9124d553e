//! In-memory balance book
//!
//! Balances per account, plus recipient policies: accounts that refuse all
//! incoming value, and receive hooks that inspect an incoming transfer and
//! may reject it.

use crate::custody::{Custodian, TransferError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A transfer as seen by the receiving account
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingTransfer<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub value: u128,
    pub data: &'a [u8],
}

/// Callback run before funds reach an account; `Err(reason)` rejects
pub type ReceiveHook = Box<dyn Fn(&IncomingTransfer<'_>) -> Result<(), String> + Send + Sync>;

#[derive(Default)]
struct Hooks(HashMap<String, ReceiveHook>);

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// Balance book implementing [`Custodian`]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Bank {
    /// Balances: account -> amount
    balances: HashMap<String, u128>,
    /// Accounts that refuse every incoming transfer
    #[serde(default)]
    rejecting: BTreeSet<String>,
    /// Runtime-only receive hooks
    #[serde(skip)]
    hooks: Hooks,
}

impl Bank {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse all incoming transfers to `account`
    pub fn reject_incoming(&mut self, account: &str) {
        self.rejecting.insert(account.to_string());
    }

    /// Accept incoming transfers to `account` again
    pub fn accept_incoming(&mut self, account: &str) {
        self.rejecting.remove(account);
    }

    /// Install a receive hook for `account`, replacing any previous one
    pub fn on_receive<F>(&mut self, account: &str, hook: F)
    where
        F: Fn(&IncomingTransfer<'_>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.hooks.0.insert(account.to_string(), Box::new(hook));
    }

    /// Remove the receive hook for `account`
    pub fn clear_hook(&mut self, account: &str) {
        self.hooks.0.remove(account);
    }

    /// All accounts holding a positive balance
    pub fn holders(&self) -> Vec<(&String, &u128)> {
        self.balances.iter().filter(|(_, &b)| b > 0).collect()
    }

    /// Sum of all balances
    pub fn total_supply(&self) -> u128 {
        self.balances.values().sum()
    }

    fn check_recipient(&self, incoming: &IncomingTransfer<'_>) -> Result<(), TransferError> {
        if self.rejecting.contains(incoming.to) {
            return Err(TransferError::Rejected {
                to: incoming.to.to_string(),
                reason: "account does not accept transfers".to_string(),
            });
        }

        if let Some(hook) = self.hooks.0.get(incoming.to) {
            hook(incoming).map_err(|reason| TransferError::Rejected {
                to: incoming.to.to_string(),
                reason,
            })?;
        }

        Ok(())
    }
}

impl Custodian for Bank {
    fn balance_of(&self, account: &str) -> u128 {
        *self.balances.get(account).unwrap_or(&0)
    }

    fn credit(&mut self, account: &str, amount: u128) -> Result<u128, TransferError> {
        let new_balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or(TransferError::Overflow)?;
        self.balances.insert(account.to_string(), new_balance);
        Ok(new_balance)
    }

    fn transfer(
        &mut self,
        from: &str,
        to: &str,
        value: u128,
        data: &[u8],
    ) -> Result<(), TransferError> {
        let from_balance = self.balance_of(from);
        if from_balance < value {
            return Err(TransferError::InsufficientFunds {
                have: from_balance,
                need: value,
            });
        }

        self.check_recipient(&IncomingTransfer {
            from,
            to,
            value,
            data,
        })?;

        if from == to {
            return Ok(());
        }

        let to_balance = self
            .balance_of(to)
            .checked_add(value)
            .ok_or(TransferError::Overflow)?;

        // Nothing below can fail
        self.balances
            .insert(from.to_string(), from_balance - value);
        self.balances.insert(to.to_string(), to_balance);

        Ok(())
    }
}
