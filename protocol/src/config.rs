//! # Protocol Configuration & Constants
//!
//! Every magic number the engine relies on lives here. The ledger itself
//! enforces most of these limits at submission time; we mirror them locally
//! so that a doomed transaction fails on the operator's machine instead of
//! after a network round trip.
//!
//! [`EngineConfig`] bundles the handful of values that legitimately vary
//! between deployments (which network, how deep the path search may go,
//! the base reserve assumed for fresh accounts).

use serde::{Deserialize, Serialize};

use crate::crypto::hash::sha256_array;

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Passphrase of the public network. Hashed into every transaction so a
/// signature made for one network can never be replayed on another.
pub const PUBLIC_NETWORK_PASSPHRASE: &str = "Lumen Public Network ; March 2026";

/// Passphrase of the shared test network.
pub const TEST_NETWORK_PASSPHRASE: &str = "Lumen Test Network ; March 2026";

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Number of decimal places in a displayed amount.
pub const AMOUNT_DECIMALS: u32 = 7;

/// Smallest units ("stroops") per whole unit of any asset.
pub const STROOPS_PER_UNIT: u64 = 10_000_000;

/// Base reserve assumed when no snapshot value is available: 0.5 units.
pub const DEFAULT_BASE_RESERVE: u64 = 5_000_000;

/// Every account must hold `(BASE_RESERVE_ENTRIES + subentries) * base_reserve`.
pub const BASE_RESERVE_ENTRIES: u64 = 2;

// ---------------------------------------------------------------------------
// Account Limits
// ---------------------------------------------------------------------------

/// Maximum number of additional signers (the master key is not counted).
pub const MAX_SIGNERS: usize = 20;

/// Maximum data entry name length in bytes.
pub const MAX_DATA_NAME_LENGTH: usize = 64;

/// Maximum data entry value length in bytes.
pub const MAX_DATA_VALUE_LENGTH: usize = 64;

/// Maximum asset code length. Codes are 1..=12 ASCII alphanumerics.
pub const MAX_ASSET_CODE_LENGTH: usize = 12;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Maximum number of operations in one transaction.
pub const MAX_OPERATIONS_PER_TX: usize = 100;

/// Maximum text memo length in bytes. Enough for an invoice number,
/// not enough for a love letter.
pub const MAX_MEMO_TEXT_LENGTH: usize = 28;

// ---------------------------------------------------------------------------
// Path Search
// ---------------------------------------------------------------------------

/// Default hop budget for unconstrained path search. Four hops means at
/// most three intermediate assets between source and destination.
pub const DEFAULT_MAX_PATH_HOPS: usize = 4;

/// Hard ceiling on the configurable hop budget. Search cost grows with the
/// branching factor raised to this power, so we don't let it float.
pub const MAX_PATH_HOPS_CEILING: usize = 6;

/// Longest explicit path (intermediate assets) a caller may supply.
pub const MAX_EXPLICIT_PATH_LENGTH: usize = 5;

/// Partial routes one search may queue. Breadth-first order means the cap
/// only ever drops the longest routes.
pub const MAX_PATH_FRONTIER: usize = 4096;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 secret seed length in bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Deployment-specific engine settings.
///
/// Everything else is a protocol constant. The CLI fills this from flags
/// and `LUMEN_*` environment variables; library callers usually start from
/// [`EngineConfig::default`] (test network) or [`EngineConfig::public`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Network passphrase hashed into transaction ids.
    pub network_passphrase: String,
    /// Hop budget for unconstrained path search.
    pub max_path_hops: usize,
    /// Base reserve for ledgers started from scratch.
    pub base_reserve: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            network_passphrase: TEST_NETWORK_PASSPHRASE.to_string(),
            max_path_hops: DEFAULT_MAX_PATH_HOPS,
            base_reserve: DEFAULT_BASE_RESERVE,
        }
    }
}

impl EngineConfig {
    /// Config for the public network with default search settings.
    pub fn public() -> Self {
        Self {
            network_passphrase: PUBLIC_NETWORK_PASSPHRASE.to_string(),
            ..Self::default()
        }
    }

    /// Network id: SHA-256 of the passphrase.
    pub fn network_id(&self) -> [u8; 32] {
        sha256_array(self.network_passphrase.as_bytes())
    }

    /// Hop budget clamped to `1..=MAX_PATH_HOPS_CEILING`.
    pub fn effective_max_hops(&self) -> usize {
        self.max_path_hops.clamp(1, MAX_PATH_HOPS_CEILING)
    }
}

/// Returns a friendly name for a passphrase, mainly for logging.
pub fn network_name(passphrase: &str) -> &'static str {
    match passphrase {
        PUBLIC_NETWORK_PASSPHRASE => "public",
        TEST_NETWORK_PASSPHRASE => "testnet",
        _ => "custom",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_ids_are_distinct() {
        assert_ne!(
            EngineConfig::default().network_id(),
            EngineConfig::public().network_id()
        );
    }

    #[test]
    fn hop_budget_is_clamped() {
        let mut cfg = EngineConfig::default();
        assert_eq!(cfg.effective_max_hops(), DEFAULT_MAX_PATH_HOPS);

        cfg.max_path_hops = 0;
        assert_eq!(cfg.effective_max_hops(), 1);

        cfg.max_path_hops = 50;
        assert_eq!(cfg.effective_max_hops(), MAX_PATH_HOPS_CEILING);
    }

    #[test]
    fn network_name_formatting() {
        assert_eq!(network_name(PUBLIC_NETWORK_PASSPHRASE), "public");
        assert_eq!(network_name(TEST_NETWORK_PASSPHRASE), "testnet");
        assert_eq!(network_name("my private ledger"), "custom");
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"max_path_hops": 5}"#).unwrap();
        assert_eq!(cfg.max_path_hops, 5);
        assert_eq!(cfg.network_passphrase, TEST_NETWORK_PASSPHRASE);
        assert_eq!(cfg.base_reserve, DEFAULT_BASE_RESERVE);
    }

    #[test]
    fn amount_constants_agree() {
        assert_eq!(STROOPS_PER_UNIT, 10u64.pow(AMOUNT_DECIMALS));
        assert!(DEFAULT_MAX_PATH_HOPS <= MAX_PATH_HOPS_CEILING);
        assert_eq!(SIGNATURE_LENGTH, 2 * PUBLIC_KEY_LENGTH);
    }
}
