//! # Assets and Trustlines
//!
//! An [`Asset`] is either the network's native asset or an `(code, issuer)`
//! pair. Assets are immutable value types: two assets are equal iff
//! native-ness, code and issuer all match, which is exactly what the derived
//! `PartialEq` gives us.
//!
//! ```text
//! amount.rs   : stroop-denominated amount parsing/formatting
//! trustline.rs: capacity-bounded permission to hold an issued asset
//! ```
//!
//! The textual form is `native` or `CODE:ISSUER` (ISSUER being the base58
//! account address). Serde uses the same form, so assets can be JSON map
//! keys and appear verbatim in snapshot files.

pub mod amount;
pub mod trustline;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::MAX_ASSET_CODE_LENGTH;
use crate::crypto::keys::AccountId;

pub use amount::{format_amount, parse_amount};
pub use trustline::{TrustLine, TrustLineError};

/// Errors raised while constructing or parsing assets and amounts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("invalid asset code {0:?}: must be 1-12 ASCII alphanumerics")]
    InvalidCode(String),

    #[error("invalid asset {0:?}: expected `native` or `CODE:ISSUER`")]
    InvalidAsset(String),

    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
}

// ---------------------------------------------------------------------------
// AssetCode
// ---------------------------------------------------------------------------

/// A validated asset code: 1..=12 ASCII alphanumeric characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetCode(String);

impl AssetCode {
    pub fn new(code: &str) -> Result<Self, AssetError> {
        let valid = !code.is_empty()
            && code.len() <= MAX_ASSET_CODE_LENGTH
            && code.bytes().all(|b| b.is_ascii_alphanumeric());
        if !valid {
            return Err(AssetError::InvalidCode(code.to_string()));
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AssetCode {
    type Error = AssetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<AssetCode> for String {
    fn from(code: AssetCode) -> Self {
        code.0
    }
}

impl fmt::Display for AssetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// The native asset or an issued `(code, issuer)` asset.
///
/// The derived ordering (native first, then by code, then by issuer) is what
/// makes order-book iteration and path search deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Asset {
    /// The network's own asset. Held directly on the account, no trustline.
    Native,
    /// An asset issued by `issuer`.
    Issued { code: AssetCode, issuer: AccountId },
}

impl Asset {
    /// Shorthand for [`Asset::Native`].
    pub fn native() -> Self {
        Self::Native
    }

    /// Build an issued asset, validating the code.
    pub fn issued(code: &str, issuer: AccountId) -> Result<Self, AssetError> {
        Ok(Self::Issued {
            code: AssetCode::new(code)?,
            issuer,
        })
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// The issuer, or `None` for the native asset.
    pub fn issuer(&self) -> Option<&AccountId> {
        match self {
            Self::Native => None,
            Self::Issued { issuer, .. } => Some(issuer),
        }
    }

    /// The asset code; `"native"` for the native asset.
    pub fn code(&self) -> &str {
        match self {
            Self::Native => "native",
            Self::Issued { code, .. } => code.as_str(),
        }
    }

    /// `true` if `account` is this asset's issuer. Issuers implicitly trust
    /// their own asset without limit.
    pub fn is_issued_by(&self, account: &AccountId) -> bool {
        self.issuer() == Some(account)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Issued { code, issuer } => write!(f, "{}:{}", code, issuer),
        }
    }
}

impl FromStr for Asset {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("native") {
            return Ok(Self::Native);
        }
        let (code, issuer) = s
            .split_once(':')
            .ok_or_else(|| AssetError::InvalidAsset(s.to_string()))?;
        let issuer = issuer
            .parse::<AccountId>()
            .map_err(|_| AssetError::InvalidAsset(s.to_string()))?;
        Self::issued(code, issuer)
    }
}

impl TryFrom<String> for Asset {
    type Error = AssetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Asset> for String {
    fn from(asset: Asset) -> Self {
        asset.to_string()
    }
}
