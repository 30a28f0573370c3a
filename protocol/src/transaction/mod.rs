//! # Transaction Module
//!
//! Construction, signing and authorization of ledger transactions. A
//! transaction is a source account, the next sequence number, an ordered
//! list of [`Operation`]s, an optional [`Memo`] and optional
//! [`TimeBounds`].
//!
//! ## Architecture
//!
//! ```text
//! types.rs       : Memo and TimeBounds value types
//! operation.rs   : closed Operation enum, auth classes, structural checks
//! builder.rs     : TransactionBuilder, canonical bytes and hash
//! signing.rs     : TransactionSigner seam, SignatureSet collection
//! verification.rs: per-account authorization, AuthorizedTransaction
//! error.rs       : TransactionError
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build**: [`TransactionBuilder::build`] validates against a
//!    [`crate::ledger::LedgerSnapshot`] and computes the hash.
//! 2. **Sign**: each co-signer calls [`sign_transaction`] over the hash.
//! 3. **Authorize**: [`authorize_transaction`] checks signer weight for
//!    every distinct source account.
//! 4. **Submit**: the [`AuthorizedTransaction`] goes to a
//!    [`crate::ledger::SubmissionService`].
//!
//! Steps 1 and 3 are pure functions of their inputs and the snapshot.

pub mod builder;
pub mod error;
pub mod operation;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{Transaction, TransactionBuilder};
pub use error::TransactionError;
pub use operation::{Operation, OperationBody};
pub use signing::{sign_transaction, sign_with_all, TransactionSigner};
pub use types::{Memo, TimeBounds};
pub use verification::{authorize_transaction, AuthorizedTransaction};
