//! Cryptographic utilities
//!
//! SHA-256 / RIPEMD-160 hashing and Base58Check encoding for
//! deterministic custodial addresses.

pub mod hash;

pub use hash::{
    base58check, double_sha256, hash160, script_address, sha256, sha256_hex,
    LEDGER_ADDRESS_VERSION,
};
