//! Custody of the funds a ledger controls
//!
//! The ledger never touches balances directly. Every movement of value goes
//! through a [`Custodian`], which either applies the whole transfer or
//! returns an error and leaves all balances as they were.
//!
//! # Example
//!
//! ```ignore
//! use multisig_ledger::custody::{Bank, Custodian};
//!
//! let mut bank = Bank::new();
//! bank.credit("vault", 1_000)?;
//! bank.transfer("vault", "alice", 250, &[])?;
//! assert_eq!(bank.balance_of("alice"), 250);
//! ```

pub mod bank;
pub mod units;

pub use bank::{Bank, IncomingTransfer, ReceiveHook};
pub use units::{format_ether, parse_ether, UnitsError, ETHER_DECIMALS, WEI_PER_ETHER};

use thiserror::Error;

/// Reasons a transfer can fail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: u128, need: u128 },
    #[error("Transfer rejected by {to}: {reason}")]
    Rejected { to: String, reason: String },
    #[error("Balance overflow")]
    Overflow,
}

/// Holder of account balances
///
/// `transfer` is all-or-nothing: on `Err` no balance has changed.
pub trait Custodian {
    /// Current balance of an account
    fn balance_of(&self, account: &str) -> u128;

    /// Add funds arriving from outside the book
    fn credit(&mut self, account: &str, amount: u128) -> Result<u128, TransferError>;

    /// Move `value` from `from` to `to`, delivering `data` to the destination
    fn transfer(
        &mut self,
        from: &str,
        to: &str,
        value: u128,
        data: &[u8],
    ) -> Result<(), TransferError>;
}
