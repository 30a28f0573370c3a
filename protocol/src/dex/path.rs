//! Path Resolver: converts an amount of one asset into another through a
//! chain of order-book hops.
//!
//! Two request modes:
//!
//! - **Strict send**: spend exactly `send_amount` of the source asset and
//!   receive as much of the destination asset as possible, failing if that
//!   is below `min_receive`.
//! - **Strict receive**: deliver exactly `dest_amount` of the destination
//!   asset for as little source asset as possible, failing if that is above
//!   `max_send`. Prices are walked backwards from the destination.
//!
//! A hop `from → to` is priced against offers selling `to` for `from`.
//! Liquidity consumed by earlier hops of the same path is tracked in a
//! scratch overlay, so a path that revisits a pair never double-spends an
//! offer. A hop that runs out of offers makes the whole path non-viable.
//!
//! Without an explicit path the resolver runs a breadth-first search over
//! simple paths (no asset repeated) up to `max_hops` hops. Neighbours are
//! visited in asset order. Candidates are ranked by amount, then by hop
//! count, then by the asset sequence, so the answer is fully determined by
//! the book contents. At most `MAX_PATH_FRONTIER` partial routes are queued
//! per search; on a dense book the longest routes are the ones left out.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use thiserror::Error;
use tracing::debug;

use super::offer::{Offer, OfferId, Trade};
use super::orderbook::OrderBook;
use crate::asset::Asset;
use crate::config::{
    EngineConfig, MAX_EXPLICIT_PATH_LENGTH, MAX_PATH_FRONTIER, MAX_PATH_HOPS_CEILING,
};

/// Path resolution failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("no path from {from} to {to}")]
    NoPathFound { from: Asset, to: Asset },

    /// The slippage guard tripped.
    #[error("best path {what} {amount}, bound is {bound}")]
    ExceedsBound {
        what: &'static str,
        amount: u64,
        bound: u64,
    },

    /// The search ran out of hop budget before reaching a verdict, or an
    /// explicit path is longer than allowed.
    #[error("path search exceeded the limit of {limit}")]
    HopLimitExceeded { limit: usize },

    #[error("path amount must be positive")]
    ZeroAmount,
}

/// Which side of the conversion is fixed, and the bound on the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PathMode {
    StrictSend { send_amount: u64, min_receive: u64 },
    StrictReceive { dest_amount: u64, max_send: u64 },
}

impl PathMode {
    fn fixed_amount(&self) -> u64 {
        match *self {
            Self::StrictSend { send_amount, .. } => send_amount,
            Self::StrictReceive { dest_amount, .. } => dest_amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRequest {
    pub source_asset: Asset,
    pub dest_asset: Asset,
    pub mode: PathMode,
    /// Fixed intermediate assets. `Some(vec![])` means a direct hop;
    /// `None` asks the resolver to search.
    pub explicit_path: Option<Vec<Asset>>,
}

/// One conversion step and the fills that priced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hop {
    pub from: Asset,
    pub to: Asset,
    pub amount_in: u64,
    pub amount_out: u64,
    pub trades: Vec<Trade>,
}

/// A priced conversion route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub source_asset: Asset,
    pub dest_asset: Asset,
    pub intermediates: Vec<Asset>,
    pub source_amount: u64,
    pub dest_amount: u64,
    pub hops: Vec<Hop>,
}

impl Path {
    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }

    /// Every trade along the path, in hop order.
    pub fn trades(&self) -> impl Iterator<Item = &Trade> {
        self.hops.iter().flat_map(|h| h.trades.iter())
    }
}

// ---------------------------------------------------------------------------
// Liquidity overlay
// ---------------------------------------------------------------------------

/// Liquidity already claimed by earlier hops of the path being priced.
#[derive(Debug, Default)]
struct LiquidityOverlay {
    consumed: HashMap<OfferId, u64>,
}

impl LiquidityOverlay {
    fn available(&self, offer: &Offer) -> u64 {
        offer.amount - self.consumed.get(&offer.id).copied().unwrap_or(0)
    }

    fn consume(&mut self, id: OfferId, amount: u64) {
        *self.consumed.entry(id).or_insert(0) += amount;
    }
}

// ---------------------------------------------------------------------------
// Single-hop pricing
// ---------------------------------------------------------------------------

fn noop_hop(asset: &Asset, amount: u64) -> Hop {
    Hop {
        from: asset.clone(),
        to: asset.clone(),
        amount_in: amount,
        amount_out: amount,
        trades: Vec::new(),
    }
}

/// Spend exactly `amount_in` of `from`. The last, partial fill pays the
/// whole remaining budget, rounding in the maker's favour.
fn convert_send(
    book: &OrderBook,
    from: &Asset,
    to: &Asset,
    amount_in: u64,
    overlay: &mut LiquidityOverlay,
) -> Option<Hop> {
    if from == to {
        return Some(noop_hop(from, amount_in));
    }

    let mut budget = amount_in;
    let mut amount_out: u64 = 0;
    let mut trades = Vec::new();

    for offer in book.offers(to, from) {
        if budget == 0 {
            break;
        }
        let available = overlay.available(offer);
        if available == 0 {
            continue;
        }
        let full_cost = offer.cost_of(available)?;
        let (take, pay) = if full_cost <= budget {
            (available, full_cost)
        } else {
            let take = offer.price.max_for_budget(budget);
            if take == 0 {
                // Leftover too small to buy a single unit.
                return None;
            }
            (take, budget)
        };

        overlay.consume(offer.id, take);
        budget -= pay;
        amount_out = amount_out.checked_add(take)?;
        trades.push(Trade {
            offer_id: offer.id,
            seller: offer.seller,
            sold_asset: to.clone(),
            sold_amount: take,
            bought_asset: from.clone(),
            bought_amount: pay,
        });
    }

    if budget > 0 {
        return None;
    }
    Some(Hop {
        from: from.clone(),
        to: to.clone(),
        amount_in,
        amount_out,
        trades,
    })
}

/// Obtain exactly `amount_out` of `to`, paying as little `from` as the
/// book allows.
fn convert_receive(
    book: &OrderBook,
    from: &Asset,
    to: &Asset,
    amount_out: u64,
    overlay: &mut LiquidityOverlay,
) -> Option<Hop> {
    if from == to {
        return Some(noop_hop(from, amount_out));
    }

    let mut needed = amount_out;
    let mut amount_in: u64 = 0;
    let mut trades = Vec::new();

    for offer in book.offers(to, from) {
        if needed == 0 {
            break;
        }
        let available = overlay.available(offer);
        if available == 0 {
            continue;
        }
        let take = available.min(needed);
        let pay = offer.cost_of(take)?;

        overlay.consume(offer.id, take);
        needed -= take;
        amount_in = amount_in.checked_add(pay)?;
        trades.push(Trade {
            offer_id: offer.id,
            seller: offer.seller,
            sold_asset: to.clone(),
            sold_amount: take,
            bought_asset: from.clone(),
            bought_amount: pay,
        });
    }

    if needed > 0 {
        return None;
    }
    Some(Hop {
        from: from.clone(),
        to: to.clone(),
        amount_in,
        amount_out,
        trades,
    })
}

// ---------------------------------------------------------------------------
// PathResolver
// ---------------------------------------------------------------------------

/// Resolves [`PathRequest`]s against one order book snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    book: &'a OrderBook,
    max_hops: usize,
}

impl<'a> PathResolver<'a> {
    /// `max_hops` is clamped to `1..=MAX_PATH_HOPS_CEILING`.
    pub fn new(book: &'a OrderBook, max_hops: usize) -> Self {
        Self {
            book,
            max_hops: max_hops.clamp(1, MAX_PATH_HOPS_CEILING),
        }
    }

    pub fn with_config(book: &'a OrderBook, config: &EngineConfig) -> Self {
        Self::new(book, config.effective_max_hops())
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    pub fn find_path(&self, request: &PathRequest) -> Result<Path, PathError> {
        if request.mode.fixed_amount() == 0 {
            return Err(PathError::ZeroAmount);
        }

        let best = match &request.explicit_path {
            Some(intermediates) => self.price_explicit(request, intermediates)?,
            None => self.search(request)?,
        };

        debug!(
            from = %request.source_asset,
            to = %request.dest_asset,
            hops = best.hop_count(),
            source_amount = best.source_amount,
            dest_amount = best.dest_amount,
            "resolved path"
        );

        check_bound(&request.mode, &best)?;
        Ok(best)
    }

    fn price_explicit(
        &self,
        request: &PathRequest,
        intermediates: &[Asset],
    ) -> Result<Path, PathError> {
        if intermediates.len() > MAX_EXPLICIT_PATH_LENGTH {
            return Err(PathError::HopLimitExceeded {
                limit: MAX_EXPLICIT_PATH_LENGTH,
            });
        }

        let mut assets = Vec::with_capacity(intermediates.len() + 2);
        assets.push(request.source_asset.clone());
        assets.extend(intermediates.iter().cloned());
        assets.push(request.dest_asset.clone());

        let no_path = || PathError::NoPathFound {
            from: request.source_asset.clone(),
            to: request.dest_asset.clone(),
        };

        for pair in assets.windows(2) {
            if pair[0] != pair[1] && !self.book.has_offers(&pair[1], &pair[0]) {
                return Err(no_path());
            }
        }

        self.price(&assets, &request.mode).ok_or_else(no_path)
    }

    fn search(&self, request: &PathRequest) -> Result<Path, PathError> {
        let source = &request.source_asset;
        let dest = &request.dest_asset;

        if source == dest {
            return self
                .price(&[source.clone(), dest.clone()], &request.mode)
                .ok_or_else(|| PathError::NoPathFound {
                    from: source.clone(),
                    to: dest.clone(),
                });
        }

        // Taker converts `from` into `to` wherever someone sells `to` for `from`.
        let mut graph: BTreeMap<Asset, BTreeSet<Asset>> = BTreeMap::new();
        for (selling, buying) in self.book.edges() {
            graph.entry(buying).or_default().insert(selling);
        }

        let mut best: Option<Path> = None;
        let mut truncated = false;
        let mut queued = 1usize;
        let mut frontier: VecDeque<Vec<Asset>> = VecDeque::new();
        frontier.push_back(vec![source.clone()]);

        while let Some(route) = frontier.pop_front() {
            let hops = route.len() - 1;
            let Some(neighbours) = route.last().and_then(|last| graph.get(last)) else {
                continue;
            };

            for next in neighbours {
                if route.contains(next) {
                    continue;
                }
                if hops == self.max_hops {
                    truncated = true;
                    break;
                }

                let mut extended = route.clone();
                extended.push(next.clone());

                if next == dest {
                    if let Some(candidate) = self.price(&extended, &request.mode) {
                        let replace = match &best {
                            Some(current) => ranks_above(&request.mode, &candidate, current),
                            None => true,
                        };
                        if replace {
                            best = Some(candidate);
                        }
                    }
                } else if queued < MAX_PATH_FRONTIER {
                    queued += 1;
                    frontier.push_back(extended);
                }
            }
        }
        if queued >= MAX_PATH_FRONTIER {
            debug!(limit = MAX_PATH_FRONTIER, "path frontier capped");
        }

        match best {
            Some(path) => Ok(path),
            None if truncated => Err(PathError::HopLimitExceeded {
                limit: self.max_hops,
            }),
            None => Err(PathError::NoPathFound {
                from: source.clone(),
                to: dest.clone(),
            }),
        }
    }

    /// Price a full asset sequence `[source, .., dest]`. `None` if any hop
    /// lacks liquidity.
    fn price(&self, assets: &[Asset], mode: &PathMode) -> Option<Path> {
        let mut overlay = LiquidityOverlay::default();
        let mut hops = Vec::with_capacity(assets.len().saturating_sub(1));

        match *mode {
            PathMode::StrictSend { send_amount, .. } => {
                let mut amount = send_amount;
                for pair in assets.windows(2) {
                    let hop = convert_send(self.book, &pair[0], &pair[1], amount, &mut overlay)?;
                    amount = hop.amount_out;
                    hops.push(hop);
                }
            }
            PathMode::StrictReceive { dest_amount, .. } => {
                let mut amount = dest_amount;
                for pair in assets.windows(2).rev() {
                    let hop =
                        convert_receive(self.book, &pair[0], &pair[1], amount, &mut overlay)?;
                    amount = hop.amount_in;
                    hops.push(hop);
                }
                hops.reverse();
            }
        }

        let source_amount = hops.first()?.amount_in;
        let dest_amount = hops.last()?.amount_out;
        Some(Path {
            source_asset: assets.first()?.clone(),
            dest_asset: assets.last()?.clone(),
            intermediates: assets[1..assets.len() - 1].to_vec(),
            source_amount,
            dest_amount,
            hops,
        })
    }
}

/// `true` if `a` should replace `b` as the best candidate.
fn ranks_above(mode: &PathMode, a: &Path, b: &Path) -> bool {
    let by_amount = match mode {
        PathMode::StrictSend { .. } => a.dest_amount.cmp(&b.dest_amount),
        PathMode::StrictReceive { .. } => b.source_amount.cmp(&a.source_amount),
    };
    by_amount
        .then_with(|| b.hop_count().cmp(&a.hop_count()))
        .then_with(|| b.intermediates.cmp(&a.intermediates))
        == Ordering::Greater
}

fn check_bound(mode: &PathMode, path: &Path) -> Result<(), PathError> {
    match *mode {
        PathMode::StrictSend { min_receive, .. } if path.dest_amount < min_receive => {
            Err(PathError::ExceedsBound {
                what: "receives",
                amount: path.dest_amount,
                bound: min_receive,
            })
        }
        PathMode::StrictReceive { max_send, .. } if path.source_amount > max_send => {
            Err(PathError::ExceedsBound {
                what: "sends",
                amount: path.source_amount,
                bound: max_send,
            })
        }
        _ => Ok(()),
    }
}

/// Resolve with the hop budget from `config`.
pub fn find_path(
    book: &OrderBook,
    request: &PathRequest,
    config: &EngineConfig,
) -> Result<Path, PathError> {
    PathResolver::with_config(book, config).find_path(request)
}
