//! Hashing System - SHA-256 Fingerprints
//!
//! Lets callers correlate chains seen in live traffic without logging them.

use sha2::{Digest, Sha256};

use crate::codec::encode;
use crate::model::SupplyChain;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Fingerprint of the canonical wire encoding; equal chains hash equally.
pub fn fingerprint(chain: &SupplyChain) -> String {
    sha256_hex(encode(chain).as_bytes())
}

/// Fingerprint of an undecoded wire string.
pub fn fingerprint_raw(raw: &str) -> String {
    sha256_hex(raw.as_bytes())
}
