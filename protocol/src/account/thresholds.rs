//! Signer weights and per-class thresholds.
//!
//! Every operation belongs to an [`AuthClass`]. An account publishes one
//! threshold per class; a signature set authorizes an operation when the
//! summed weight of its matching signers reaches the threshold for the
//! operation's class.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::keys::PublicKey;

/// Sensitivity tier of an operation. Ordered `Low < Medium < High`, so the
/// class a transaction needs is simply the `max()` over its operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthClass {
    Low,
    Medium,
    High,
}

impl fmt::Display for AuthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Threshold settings of an account.
///
/// `master_weight` is the weight of the account's own key. Zero means the
/// master key can no longer sign for the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub master_weight: u8,
    pub low: u8,
    pub medium: u8,
    pub high: u8,
}

impl Default for Thresholds {
    /// Fresh accounts: master key weight 1, every threshold 0.
    fn default() -> Self {
        Self {
            master_weight: 1,
            low: 0,
            medium: 0,
            high: 0,
        }
    }
}

impl Thresholds {
    pub fn new(master_weight: u8, low: u8, medium: u8, high: u8) -> Self {
        Self {
            master_weight,
            low,
            medium,
            high,
        }
    }

    /// The threshold configured for `class`.
    pub fn for_class(&self, class: AuthClass) -> u8 {
        match class {
            AuthClass::Low => self.low,
            AuthClass::Medium => self.medium,
            AuthClass::High => self.high,
        }
    }
}

/// An additional signer on an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    pub key: PublicKey,
    pub weight: u8,
}

impl Signer {
    pub fn new(key: PublicKey, weight: u8) -> Self {
        Self { key, weight }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_are_ordered() {
        assert!(AuthClass::Low < AuthClass::Medium);
        assert!(AuthClass::Medium < AuthClass::High);
        let max = [AuthClass::Medium, AuthClass::Low, AuthClass::High]
            .into_iter()
            .max();
        assert_eq!(max, Some(AuthClass::High));
    }

    #[test]
    fn threshold_lookup_by_class() {
        let t = Thresholds::new(1, 1, 2, 3);
        assert_eq!(t.for_class(AuthClass::Low), 1);
        assert_eq!(t.for_class(AuthClass::Medium), 2);
        assert_eq!(t.for_class(AuthClass::High), 3);
    }

    #[test]
    fn class_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AuthClass::Medium).unwrap(), "\"medium\"");
        assert_eq!(AuthClass::High.to_string(), "high");
    }
}
