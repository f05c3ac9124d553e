//! Multisig Ledger: an M-of-N multisignature custody ledger in Rust
//!
//! A fixed set of owners shares control of one custodial account. Any owner
//! may propose an outbound transfer; it moves funds only after at least
//! `threshold` distinct owners have confirmed it, and it can be executed at
//! most once.
//!
//! This crate provides:
//! - The transaction ledger (propose, confirm, revoke, execute)
//! - A pluggable custody book behind the `Custodian` trait
//! - Event notifications through the `EventSink` observer trait
//! - JSON persistence with backup rotation
//! - A CLI and a REST/WebSocket API over a deployed ledger
//!
//! # Example
//!
//! ```rust
//! use multisig_ledger::custody::{parse_ether, Bank, Custodian};
//! use multisig_ledger::ledger::{LedgerConfig, MultisigLedger};
//!
//! let owners = vec!["alice".to_string(), "bob".to_string(), "carol".to_string()];
//! let config = LedgerConfig::new(owners, 2, None).unwrap();
//! let mut ledger = MultisigLedger::new(config, Bank::new()).unwrap();
//!
//! ledger.deposit("funder", parse_ether("1").unwrap()).unwrap();
//!
//! let index = ledger
//!     .propose("alice", "dave", parse_ether("0.2").unwrap(), Vec::new())
//!     .unwrap();
//! ledger.confirm("alice", index).unwrap();
//! ledger.confirm("bob", index).unwrap();
//! ledger.execute("carol", index).unwrap();
//!
//! assert_eq!(ledger.custody().balance_of("dave"), parse_ether("0.2").unwrap());
//! assert_eq!(ledger.balance(), parse_ether("0.8").unwrap());
//! ```

pub mod api;
pub mod cli;
pub mod crypto;
pub mod custody;
pub mod events;
pub mod ledger;
pub mod storage;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use custody::{Bank, Custodian, TransferError};
pub use events::{EventSink, LedgerEvent};
pub use ledger::{LedgerConfig, LedgerError, MultisigLedger, SharedLedger, Transaction};
pub use storage::{Storage, StorageConfig};
