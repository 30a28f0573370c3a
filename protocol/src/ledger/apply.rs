//! Ledger transitions: apply an authorized transaction to a snapshot.
//!
//! [`apply_transaction`] never mutates its input. It clones the snapshot,
//! applies every operation to the clone and returns it; any failure drops
//! the clone, so a transaction either applies in full or not at all.
//!
//! Asset movement follows issuer semantics: an issuer paying out its own
//! asset mints it, and an issuer receiving its own asset burns it. Neither
//! side touches a trustline.
//!
//! Offers are backed by nothing but the seller's balance. Before any
//! operation matches against the book, offers whose sellers can no longer
//! deliver or receive are shrunk or dropped, so a stale offer never blocks
//! other traders.

use thiserror::Error;
use tracing::debug;

use crate::account::{Account, AccountError};
use crate::asset::{Asset, TrustLine, TrustLineError};
use crate::auth::AuthError;
use crate::config::{EngineConfig, BASE_RESERVE_ENTRIES};
use crate::crypto::keys::AccountId;
use crate::dex::{
    MatchResult, OrderBookError, PathError, PathMode, PathRequest, PathResolver, TakerOrder,
};
use crate::ledger::LedgerSnapshot;
use crate::transaction::{
    authorize_transaction, AuthorizedTransaction, Operation, OperationBody, TransactionError,
};

/// Ledger-level rejections.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transaction was built for network {actual}, ledger runs {expected}")]
    WrongNetwork { expected: String, actual: String },

    #[error("bad sequence for {account}: expected {expected}, got {got}")]
    BadSequence {
        account: AccountId,
        expected: u64,
        got: u64,
    },

    #[error("account {0} does not exist")]
    AccountNotFound(AccountId),

    #[error("account {0} already exists")]
    AccountExists(AccountId),

    #[error("{account} holds {have} {asset}, needs {need}")]
    Underfunded {
        account: AccountId,
        asset: Asset,
        need: u64,
        have: u64,
    },

    /// A native debit or a new subentry would take the account below its
    /// minimum balance.
    #[error("{account} would hold {balance}, below its minimum balance {minimum}")]
    BelowReserve {
        account: AccountId,
        balance: u64,
        minimum: u64,
    },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    TrustLine(#[from] TrustLineError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    OrderBook(#[from] OrderBookError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Apply `authorized` to `snapshot` at time `now` (Unix seconds) and
/// return the next snapshot.
pub fn apply_transaction(
    snapshot: &LedgerSnapshot,
    authorized: &AuthorizedTransaction,
    config: &EngineConfig,
    now: i64,
) -> Result<LedgerSnapshot, LedgerError> {
    let tx = authorized.transaction();

    let network_id = config.network_id();
    if tx.network_id != network_id {
        return Err(LedgerError::WrongNetwork {
            expected: hex::encode(network_id),
            actual: hex::encode(tx.network_id),
        });
    }
    tx.check_time_bounds(now)?;

    let source = snapshot
        .account(&tx.source)
        .ok_or(LedgerError::AccountNotFound(tx.source))?;
    let expected = source.sequence.saturating_add(1);
    if tx.sequence != expected {
        return Err(LedgerError::BadSequence {
            account: tx.source,
            expected,
            got: tx.sequence,
        });
    }

    // Signer sets may have changed since the caller authorized.
    authorize_transaction(tx, authorized.signatures(), snapshot)?;

    let mut next = snapshot.clone();
    account_mut(&mut next, &tx.source)?.sequence = tx.sequence;

    for (index, op) in tx.operations.iter().enumerate() {
        let source = op.effective_source(&tx.source);
        apply_operation(&mut next, op, &source, config).map_err(|e| {
            debug!(index, kind = op.body.kind(), error = %e, "operation failed");
            e
        })?;
    }

    next.bump_ledger_sequence();
    debug!(
        hash = %tx.hash_hex(),
        ledger = next.ledger_sequence(),
        operations = tx.operations.len(),
        "transaction applied"
    );
    Ok(next)
}

fn apply_operation(
    snap: &mut LedgerSnapshot,
    op: &Operation,
    source: &AccountId,
    config: &EngineConfig,
) -> Result<(), LedgerError> {
    if snap.account(source).is_none() {
        return Err(LedgerError::AccountNotFound(*source));
    }

    match &op.body {
        OperationBody::CreateAccount {
            destination,
            starting_balance,
        } => {
            if snap.account(destination).is_some() {
                return Err(LedgerError::AccountExists(*destination));
            }
            let minimum = BASE_RESERVE_ENTRIES.saturating_mul(snap.base_reserve());
            if *starting_balance < minimum {
                return Err(LedgerError::BelowReserve {
                    account: *destination,
                    balance: *starting_balance,
                    minimum,
                });
            }
            debit(snap, source, &Asset::Native, *starting_balance)?;
            let base_reserve = snap.base_reserve();
            snap.insert_account(Account::new(*destination, *starting_balance, base_reserve));
        }

        OperationBody::Payment {
            destination,
            asset,
            amount,
        } => {
            if snap.account(destination).is_none() {
                return Err(LedgerError::AccountNotFound(*destination));
            }
            debit(snap, source, asset, *amount)?;
            credit(snap, destination, asset, *amount)?;
        }

        OperationBody::PathPayment {
            destination,
            send_asset,
            dest_asset,
            mode,
            path,
        } => {
            if snap.account(destination).is_none() {
                return Err(LedgerError::AccountNotFound(*destination));
            }
            let request = PathRequest {
                source_asset: send_asset.clone(),
                dest_asset: dest_asset.clone(),
                mode: *mode,
                explicit_path: path.clone(),
            };
            snap.prune_unfunded_offers(None)?;
            let resolved = PathResolver::with_config(snap.order_book(), config).find_path(&request)?;

            for trade in resolved.trades() {
                snap.order_book_mut().fill(trade.offer_id, trade.sold_amount)?;
                debit(snap, &trade.seller, &trade.sold_asset, trade.sold_amount)?;
                credit(snap, &trade.seller, &trade.bought_asset, trade.bought_amount)?;
            }

            let delivered = match mode {
                PathMode::StrictSend { .. } => resolved.dest_amount,
                PathMode::StrictReceive { dest_amount, .. } => *dest_amount,
            };
            debit(snap, source, send_asset, resolved.source_amount)?;
            credit(snap, destination, dest_asset, delivered)?;
        }

        OperationBody::CreateTrustLine { asset, limit } => {
            let issuer = asset
                .issuer()
                .copied()
                .ok_or_else(|| invalid("the native asset needs no trustline"))?;
            let issuer_account = snap
                .account(&issuer)
                .ok_or(LedgerError::AccountNotFound(issuer))?;
            let authorized = !issuer_account.flags.auth_required;

            match snap.trustline_mut(source, asset) {
                Some(tl) => tl.set_limit(*limit)?,
                None => {
                    snap.insert_trustline(TrustLine::new(*source, asset.clone(), *limit, authorized));
                    check_reserve(snap, source)?;
                }
            }
        }

        OperationBody::RemoveTrustLine { asset } => {
            let tl = snap
                .trustline(source, asset)
                .ok_or_else(|| invalid(format!("{} has no trustline to {}", source, asset)))?;
            tl.check_removable()?;
            snap.remove_trustline(source, asset);
        }

        OperationBody::SetSigner { signer, weight } => {
            account_mut(snap, source)?.set_signer(*signer, *weight)?;
            check_reserve(snap, source)?;
        }

        OperationBody::SetThresholds {
            master_weight,
            low,
            medium,
            high,
        } => {
            let thresholds = &mut account_mut(snap, source)?.thresholds;
            if let Some(w) = master_weight {
                thresholds.master_weight = *w;
            }
            if let Some(w) = low {
                thresholds.low = *w;
            }
            if let Some(w) = medium {
                thresholds.medium = *w;
            }
            if let Some(w) = high {
                thresholds.high = *w;
            }
        }

        OperationBody::SetFlags { set, clear } => {
            let account = account_mut(snap, source)?;
            account.flags = account.flags.apply(set, clear)?;
        }

        OperationBody::ManageOffer {
            offer_id,
            selling,
            buying,
            amount,
            price,
        } => {
            snap.prune_unfunded_offers(*offer_id)?;
            let result = match offer_id {
                None => snap.order_book_mut().match_offer(TakerOrder {
                    account: *source,
                    selling: selling.clone(),
                    buying: buying.clone(),
                    amount: *amount,
                    price: *price,
                    immediate_or_cancel: false,
                })?,
                Some(id) => {
                    let offer = snap
                        .order_book()
                        .get(*id)
                        .ok_or(OrderBookError::OfferNotFound(*id))?;
                    if &offer.seller != source {
                        return Err(invalid(format!("offer {} is not owned by {}", id, source)));
                    }
                    if &offer.selling != selling || &offer.buying != buying {
                        return Err(invalid(format!("offer {} trades a different pair", id)));
                    }
                    snap.order_book_mut().update(*id, *amount, *price)?
                }
            };
            settle_match(snap, source, selling, buying, &result)?;
        }

        OperationBody::ManageData { name, value } => {
            let account = account_mut(snap, source)?;
            match value {
                Some(bytes) => {
                    account.data.insert(name.clone(), bytes.clone());
                    check_reserve(snap, source)?;
                }
                None => {
                    if account.data.remove(name).is_none() {
                        return Err(invalid(format!("no data entry named {:?}", name)));
                    }
                }
            }
        }
    }
    Ok(())
}

/// Move funds for every fill of a ManageOffer and make sure a resting
/// remainder is backed by the seller's balance.
fn settle_match(
    snap: &mut LedgerSnapshot,
    taker: &AccountId,
    selling: &Asset,
    buying: &Asset,
    result: &MatchResult,
) -> Result<(), LedgerError> {
    for trade in &result.trades {
        debit(snap, &trade.seller, &trade.sold_asset, trade.sold_amount)?;
        credit(snap, &trade.seller, &trade.bought_asset, trade.bought_amount)?;
    }
    if result.sold > 0 {
        debit(snap, taker, selling, result.sold)?;
        credit(snap, taker, buying, result.bought)?;
    }

    if let Some(id) = result.resting {
        // The offer itself must be receivable, so a trustline is required.
        snap.check_receive(taker, buying, 0)?;
        let have = snap.sellable(taker, selling);
        if have < result.remaining {
            return Err(LedgerError::Underfunded {
                account: *taker,
                asset: selling.clone(),
                need: result.remaining,
                have,
            });
        }
        check_reserve(snap, taker)?;
        debug!(offer = id, remaining = result.remaining, "offer resting");
    }
    Ok(())
}

/// Take `amount` of `asset` from `account`.
fn debit(
    snap: &mut LedgerSnapshot,
    account: &AccountId,
    asset: &Asset,
    amount: u64,
) -> Result<(), LedgerError> {
    match asset {
        Asset::Native => {
            let minimum = snap
                .minimum_balance(account)
                .ok_or(LedgerError::AccountNotFound(*account))?;
            let entry = account_mut(snap, account)?;
            let balance = entry.balance.checked_sub(amount).ok_or(LedgerError::Underfunded {
                account: *account,
                asset: Asset::Native,
                need: amount,
                have: entry.balance,
            })?;
            if balance < minimum {
                return Err(LedgerError::BelowReserve {
                    account: *account,
                    balance,
                    minimum,
                });
            }
            entry.balance = balance;
        }
        _ if asset.is_issued_by(account) => {}
        _ => match snap.trustline_mut(account, asset) {
            Some(tl) => {
                tl.debit(amount)?;
            }
            None => {
                return Err(LedgerError::Underfunded {
                    account: *account,
                    asset: asset.clone(),
                    need: amount,
                    have: 0,
                })
            }
        },
    }
    Ok(())
}

/// Give `amount` of `asset` to `account`.
fn credit(
    snap: &mut LedgerSnapshot,
    account: &AccountId,
    asset: &Asset,
    amount: u64,
) -> Result<(), LedgerError> {
    match asset {
        Asset::Native => {
            let entry = account_mut(snap, account)?;
            entry.balance = entry
                .balance
                .checked_add(amount)
                .ok_or_else(|| invalid("native balance overflow"))?;
        }
        _ if asset.is_issued_by(account) => {}
        _ => {
            snap.check_receive(account, asset, amount)?;
            if let Some(tl) = snap.trustline_mut(account, asset) {
                tl.credit(amount)?;
            }
        }
    }
    Ok(())
}

fn check_reserve(snap: &LedgerSnapshot, account: &AccountId) -> Result<(), LedgerError> {
    let balance = snap
        .account(account)
        .map(|a| a.balance)
        .ok_or(LedgerError::AccountNotFound(*account))?;
    let minimum = snap
        .minimum_balance(account)
        .ok_or(LedgerError::AccountNotFound(*account))?;
    if balance < minimum {
        return Err(LedgerError::BelowReserve {
            account: *account,
            balance,
            minimum,
        });
    }
    Ok(())
}

fn account_mut<'a>(
    snap: &'a mut LedgerSnapshot,
    id: &AccountId,
) -> Result<&'a mut Account, LedgerError> {
    snap.account_mut(id).ok_or(LedgerError::AccountNotFound(*id))
}

fn invalid(msg: impl Into<String>) -> LedgerError {
    LedgerError::InvalidOperation(msg.into())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
