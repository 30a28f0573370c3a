//! Error type for transaction construction and authorization.
//!
//! Every failure here stems from caller-supplied data or from the snapshot
//! the caller handed in, so all of them are recoverable and none should
//! ever reach submission.

use thiserror::Error;

use crate::account::AccountError;
use crate::asset::{AssetError, TrustLineError};
use crate::auth::AuthError;
use crate::crypto::keys::AccountId;
use crate::dex::{OrderBookError, PathError};

#[derive(Debug, Error)]
pub enum TransactionError {
    /// Structurally malformed transaction or operation: conflicting memo
    /// kinds, inverted time bounds, non-positive amounts and so on.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The caller's sequence number does not match the snapshot.
    #[error("stale sequence for {account}: ledger has {expected}, caller supplied {got}")]
    BadSequence {
        account: AccountId,
        expected: u64,
        got: u64,
    },

    #[error("account {0} does not exist")]
    AccountNotFound(AccountId),

    #[error("account {0} already exists")]
    AccountExists(AccountId),

    /// Includes `TrustLineCapacityExceeded`.
    #[error(transparent)]
    TrustLine(#[from] TrustLineError),

    #[error(transparent)]
    Path(#[from] PathError),

    /// `InsufficientWeight` lives here.
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    OrderBook(#[from] OrderBookError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Account(#[from] AccountError),

    /// The transaction hash does not match its contents.
    #[error("transaction hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("transaction is outside its time bounds: now {now}, window [{min_time}, {max_time})")]
    OutsideTimeBounds {
        now: i64,
        min_time: i64,
        max_time: i64,
    },

    #[error("canonical encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
}

impl TransactionError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }
}
