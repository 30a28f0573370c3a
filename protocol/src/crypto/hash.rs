//! # Hashing Utilities
//!
//! SHA-256 is the only hash the engine needs: transaction hashes, network
//! ids and nothing else.

use sha2::{Digest, Sha256};

/// SHA-256 digest as a fixed-size array.
///
/// ```
/// use lumen_protocol::crypto::sha256_array;
///
/// assert_eq!(sha256_array(b"lumen").len(), 32);
/// ```
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 over several byte slices without concatenating them first.
pub fn sha256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
