//! # Ledger State and Submission
//!
//! ```text
//! snapshot.rs: LedgerSnapshot: accounts, trustlines, order book
//! apply.rs   : apply_transaction: the state transition, LedgerError
//! service.rs : SnapshotProvider / SubmissionService seams, LocalLedger
//! ```
//!
//! The builder and the authorization evaluator read snapshots. Only
//! [`apply_transaction`] produces new ones, and it does so by value: the
//! input snapshot is never modified.

pub mod apply;
pub mod service;
pub mod snapshot;

pub use apply::{apply_transaction, LedgerError};
pub use service::{
    LocalLedger, SnapshotProvider, SubmissionError, SubmissionReceipt, SubmissionService,
};
pub use snapshot::{LedgerSnapshot, SnapshotError};
