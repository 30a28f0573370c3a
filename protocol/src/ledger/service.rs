//! External seams: where snapshots come from and where transactions go.
//!
//! The engine never talks to a network. Callers plug in a
//! [`SnapshotProvider`] and a [`SubmissionService`]; [`LocalLedger`]
//! implements both in process and is what the CLI and the integration
//! tests run against.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::apply::{apply_transaction, LedgerError};
use super::snapshot::LedgerSnapshot;
use crate::config::EngineConfig;
use crate::transaction::AuthorizedTransaction;

/// Read-only view of current ledger state.
pub trait SnapshotProvider {
    fn snapshot(&self) -> LedgerSnapshot;
}

/// Proof of inclusion handed back by a submission service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Hex transaction hash.
    pub hash: String,
    /// Ledger that included the transaction.
    pub ledger_sequence: u64,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The ledger refused the transaction. Nothing was applied.
    #[error("transaction {hash} rejected: {source}")]
    Rejected {
        hash: String,
        #[source]
        source: LedgerError,
    },

    #[error("submission service unavailable: {0}")]
    Unavailable(String),
}

/// Accepts authorized transactions. Implementations decide on retries;
/// callers of this trait never retry on their own.
#[async_trait]
pub trait SubmissionService: Send + Sync {
    async fn submit(
        &self,
        tx: &AuthorizedTransaction,
    ) -> Result<SubmissionReceipt, SubmissionError>;
}

type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// In-process ledger: a snapshot behind a lock plus the transition
/// function. Clones share the same state.
#[derive(Clone)]
pub struct LocalLedger {
    state: Arc<RwLock<LedgerSnapshot>>,
    config: EngineConfig,
    clock: Clock,
}

impl fmt::Debug for LocalLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalLedger")
            .field("ledger_sequence", &self.state.read().ledger_sequence())
            .field("config", &self.config)
            .finish()
    }
}

impl LocalLedger {
    /// Wall-clock time from `chrono`.
    pub fn new(genesis: LedgerSnapshot, config: EngineConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(genesis)),
            config,
            clock: Arc::new(|| Utc::now().timestamp()),
        }
    }

    /// Replace the clock used for time-bound checks (Unix seconds).
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger_sequence(&self) -> u64 {
        self.state.read().ledger_sequence()
    }

    /// Apply under the write lock so concurrent submissions serialize.
    fn commit(&self, tx: &AuthorizedTransaction) -> Result<SubmissionReceipt, SubmissionError> {
        let now = (self.clock)();
        let hash = tx.transaction().hash_hex();
        let mut state = self.state.write();

        match apply_transaction(&state, tx, &self.config, now) {
            Ok(next) => {
                *state = next;
                let ledger_sequence = state.ledger_sequence();
                info!(hash = %hash, ledger = ledger_sequence, "transaction applied");
                Ok(SubmissionReceipt {
                    hash,
                    ledger_sequence,
                })
            }
            Err(source) => {
                warn!(hash = %hash, error = %source, "transaction rejected");
                Err(SubmissionError::Rejected { hash, source })
            }
        }
    }
}

impl SnapshotProvider for LocalLedger {
    fn snapshot(&self) -> LedgerSnapshot {
        self.state.read().clone()
    }
}

#[async_trait]
impl SubmissionService for LocalLedger {
    async fn submit(
        &self,
        tx: &AuthorizedTransaction,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        self.commit(tx)
    }
}
