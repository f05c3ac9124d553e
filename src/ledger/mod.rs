//! Multi-owner approval ledger
//!
//! A fixed set of owners jointly approves transfers out of a custodial
//! account: any owner proposes, owners confirm (and may revoke before
//! execution), and once the threshold is reached any owner executes.
//!
//! # Example
//!
//! ```ignore
//! use multisig_ledger::custody::Bank;
//! use multisig_ledger::ledger::{LedgerConfig, MultisigLedger};
//!
//! // 2-of-3 ledger
//! let config = LedgerConfig::new(vec![a, b, c], 2, None)?;
//! let mut ledger = MultisigLedger::new(config, Bank::new())?;
//! ledger.deposit(&a, 1_000)?;
//!
//! let index = ledger.propose(&a, &recipient, 200, vec![])?;
//! ledger.confirm(&a, index)?;
//! ledger.confirm(&b, index)?;
//! ledger.execute(&a, index)?;
//! ```

pub mod config;
pub mod ledger;
pub mod shared;
pub mod transaction;

pub use config::{LedgerConfig, LedgerError};
pub use ledger::MultisigLedger;
pub use shared::SharedLedger;
pub use transaction::{Transaction, TransactionInfo, TransactionStatus};
