//! # Decentralized Exchange
//!
//! The order book and the path resolver that prices cross-asset payments
//! against it.
//!
//! ```text
//! price.rs    : exact rational prices (n/d, u128 arithmetic)
//! offer.rs    : Offer, TakerOrder, Trade, MatchResult
//! orderbook.rs: price-time priority book, continuous matching
//! path.rs     : bounded BFS path search, explicit path pricing
//! ```
//!
//! Everything here is pure computation over an in-memory book. Callers
//! hand in a snapshot and get values back; nothing is cached between calls.

pub mod offer;
pub mod orderbook;
pub mod path;
pub mod price;

pub use offer::{MatchResult, Offer, OfferId, TakerOrder, Trade};
pub use orderbook::{OrderBook, OrderBookError};
pub use path::{find_path, Hop, Path, PathError, PathMode, PathRequest, PathResolver};
pub use price::Price;
