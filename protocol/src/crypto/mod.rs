//! # Cryptographic Primitives
//!
//! Thin, type-safe wrappers over audited implementations:
//!
//! - **Ed25519** (`ed25519-dalek`) for account keys and transaction signatures.
//! - **SHA-256** (`sha2`) for transaction hashes and network ids.
//!
//! Nothing here is clever, which is the point.

pub mod hash;
pub mod keys;

pub use hash::{sha256_array, sha256_concat};
pub use keys::{AccountId, KeyError, Keypair, PublicKey, Signature};
