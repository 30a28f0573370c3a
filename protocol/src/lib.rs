// Copyright (c) 2026 Lumen Contributors. MIT License.
// See LICENSE for details.

//! # Lumen Protocol: Core Library
//!
//! Client-side transaction construction and authorization for a federated
//! asset ledger. Everything here runs offline against a ledger snapshot the
//! caller supplies: build a transaction, price a cross-asset payment
//! through the order book, collect co-signer signatures and prove the
//! signer weight is sufficient before anything is submitted.
//!
//! ## Architecture
//!
//! - **config**: Protocol constants, network passphrases, `EngineConfig`.
//! - **crypto**: Ed25519 keys and signatures, SHA-256.
//! - **asset**: Native and issued assets, amounts, trustlines.
//! - **account**: Accounts, weighted signers, thresholds, issuer flags.
//! - **auth**: The authorization evaluator over a `SignatureSet`.
//! - **dex**: Price-time priority order book and the path resolver.
//! - **transaction**: Operations, the builder, signing, authorization.
//! - **ledger**: Snapshots, state transitions, submission seams.
//!
//! ## Ground Rules
//!
//! 1. Amounts are `u64` stroops and prices are exact rationals. No floats.
//! 2. Every search and every map iteration is ordered, so the same inputs
//!    always give the same transaction hash and the same path.
//! 3. Signer weights are read from the snapshot on every check.

pub mod account;
pub mod asset;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod dex;
pub mod ledger;
pub mod transaction;
