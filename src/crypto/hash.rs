//! Hashing utilities used to name custodial accounts
//!
//! Ledger addresses are P2SH-style: Base58Check over
//! RIPEMD160(SHA256(payload)) with a version byte.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Version byte for ledger addresses (produces addresses starting with '3')
pub const LEDGER_ADDRESS_VERSION: u8 = 0x05;

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    sha256(&sha256(data))
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> Vec<u8> {
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256(data));
    ripemd.finalize().to_vec()
}

/// Base58Check encoding: version || payload || first 4 bytes of double SHA-256
pub fn base58check(version: u8, payload: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(payload.len() + 5);
    bytes.push(version);
    bytes.extend_from_slice(payload);

    let checksum = double_sha256(&bytes);
    bytes.extend_from_slice(&checksum[..4]);

    bs58::encode(bytes).into_string()
}

/// Derive a custodial address from arbitrary script data
pub fn script_address(script_data: &[u8]) -> String {
    base58check(LEDGER_ADDRESS_VERSION, &hash160(script_data))
}
