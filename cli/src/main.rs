// Copyright (c) 2026 Lumen Contributors. MIT License.
// See LICENSE for details.

//! # Lumen CLI
//!
//! Entry point for the `lumen` binary. Parses arguments, initializes
//! logging and dispatches to one of four subcommands:
//!
//! - `keygen`    generate a keypair
//! - `pay`       build, sign and authorize a payment, optionally applying it
//! - `path`      resolve a conversion path
//! - `orderbook` print price levels
//!
//! Results go to stdout as JSON. Any engine error ends the process with a
//! non-zero status and the error chain on stderr.

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use chrono::DateTime;
use clap::Parser;
use serde_json::json;
use std::path::Path as FsPath;

use lumen_protocol::asset::{format_amount, parse_amount, Asset};
use lumen_protocol::config::{network_name, EngineConfig};
use lumen_protocol::crypto::{AccountId, Keypair};
use lumen_protocol::dex::{PathMode, PathRequest, PathResolver};
use lumen_protocol::ledger::{LedgerSnapshot, LocalLedger, SnapshotProvider, SubmissionService};
use lumen_protocol::transaction::{
    authorize_transaction, sign_with_all, Operation, TransactionBuilder,
};

use cli::{Commands, GlobalArgs, LumenCli, OrderbookArgs, PathArgs, PathSide, PayArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = LumenCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.global.log_format);

    let config = engine_config(&cli.global);
    tracing::debug!(
        network = network_name(&config.network_passphrase),
        max_hops = config.effective_max_hops(),
        "engine configured"
    );

    let output = match cli.command {
        Commands::Keygen => keygen(),
        Commands::Pay(args) => pay(args, &config).await?,
        Commands::Path(args) => path(args, &config)?,
        Commands::Orderbook(args) => orderbook(args)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn engine_config(global: &GlobalArgs) -> EngineConfig {
    EngineConfig {
        network_passphrase: global.network.clone(),
        max_path_hops: global.max_hops,
        ..EngineConfig::default()
    }
}

fn keygen() -> serde_json::Value {
    let keypair = Keypair::generate();
    json!({
        "address": keypair.public_key().to_address(),
        "secret": keypair.to_hex(),
    })
}

/// Builds a payment from the snapshot, signs it with every `--signers`
/// seed and authorizes it. With `--apply`, submits it to an in-process
/// ledger and writes the next snapshot.
async fn pay(args: PayArgs, config: &EngineConfig) -> Result<serde_json::Value> {
    let snapshot = load_snapshot(&args.snapshot)?;

    let signers = args
        .signers
        .iter()
        .map(|seed| Keypair::from_hex(seed).context("invalid signer seed"))
        .collect::<Result<Vec<_>>>()?;
    let source = match &args.from {
        Some(address) => parse_account(address)?,
        None => match signers.first() {
            Some(keypair) => keypair.public_key(),
            None => bail!("at least one signer is required"),
        },
    };
    let destination = parse_account(&args.to)?;
    let dest_asset = parse_asset(&args.asset)?;
    let amount = parse_amount(&args.amount).context("invalid --amount")?;

    let operation = match &args.with {
        Some(with) => {
            let send_asset = parse_asset(with)?;
            let max_send = match &args.max {
                Some(max) => parse_amount(max).context("invalid --max")?,
                None => bail!("--max is required when paying --with another asset"),
            };
            let path = parse_path(&args.path)?;
            Operation::path_payment(
                destination,
                send_asset,
                dest_asset,
                PathMode::StrictReceive {
                    dest_amount: amount,
                    max_send,
                },
                path,
            )
        }
        None => Operation::payment(destination, dest_asset, amount),
    };

    let sequence = snapshot
        .account(&source)
        .map(|account| account.sequence)
        .with_context(|| format!("source account {} not in snapshot", source))?;

    let mut builder = TransactionBuilder::new(source, sequence)
        .config(config.clone())
        .operation(operation);
    if let Some(text) = &args.memotext {
        builder = builder.memo_text(text);
    }
    if let Some(id) = args.memoid {
        builder = builder.memo_id(id);
    }
    if args.mintime.is_some() || args.maxtime.is_some() {
        let min = args.mintime.as_deref().map(parse_time).transpose()?.unwrap_or(0);
        let max = args.maxtime.as_deref().map(parse_time).transpose()?.unwrap_or(0);
        builder = builder.time_bounds(min, max);
    }

    let tx = builder.build(&snapshot).context("failed to build transaction")?;
    let signatures = sign_with_all(&tx, signers.iter());
    let authorized = authorize_transaction(&tx, &signatures, &snapshot)
        .context("signatures do not authorize the transaction")?;
    tracing::info!(hash = %tx.hash_hex(), signers = signatures.len(), "transaction authorized");

    let mut output = json!({
        "hash": tx.hash_hex(),
        "transaction": &authorized,
    });

    if let Some(out) = &args.apply {
        let ledger = LocalLedger::new(snapshot, config.clone());
        let receipt = ledger
            .submit(&authorized)
            .await
            .context("ledger rejected the transaction")?;
        save_snapshot(out, &ledger.snapshot())?;
        output["receipt"] = serde_json::to_value(&receipt)?;
    }

    Ok(output)
}

fn path(args: PathArgs, config: &EngineConfig) -> Result<serde_json::Value> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let amount = parse_amount(&args.amount).context("invalid --amount")?;
    let bound = args
        .bound
        .as_deref()
        .map(parse_amount)
        .transpose()
        .context("invalid --bound")?;

    let mode = match args.side {
        PathSide::Send => PathMode::StrictSend {
            send_amount: amount,
            min_receive: bound.unwrap_or(1),
        },
        PathSide::Receive => PathMode::StrictReceive {
            dest_amount: amount,
            max_send: bound.unwrap_or(u64::MAX),
        },
    };
    let request = PathRequest {
        source_asset: parse_asset(&args.from_asset)?,
        dest_asset: parse_asset(&args.to_asset)?,
        mode,
        explicit_path: parse_path(&args.path)?,
    };

    let book = snapshot
        .funded_order_book()
        .context("snapshot order book is inconsistent")?;
    let resolver = PathResolver::with_config(&book, config);
    let found = resolver.find_path(&request).context("path resolution failed")?;

    Ok(json!({
        "source_amount": format_amount(found.source_amount),
        "dest_amount": format_amount(found.dest_amount),
        "path": found.intermediates.iter().map(|a| a.to_string()).collect::<Vec<_>>(),
        "hops": found.hop_count(),
    }))
}

fn orderbook(args: OrderbookArgs) -> Result<serde_json::Value> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let selling = parse_asset(&args.selling)?;
    let buying = parse_asset(&args.buying)?;

    let levels: Vec<_> = snapshot
        .order_book()
        .depth(&selling, &buying, args.limit)
        .into_iter()
        .map(|(price, amount)| {
            json!({
                "price": price.to_string(),
                "amount": format_amount(amount),
            })
        })
        .collect();

    Ok(json!({
        "selling": selling.to_string(),
        "buying": buying.to_string(),
        "levels": levels,
    }))
}

fn load_snapshot(path: &FsPath) -> Result<LedgerSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))
}

fn save_snapshot(path: &FsPath, snapshot: &LedgerSnapshot) -> Result<()> {
    let raw = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, raw)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    tracing::info!(path = %path.display(), ledger = snapshot.ledger_sequence(), "snapshot written");
    Ok(())
}

fn parse_account(address: &str) -> Result<AccountId> {
    address
        .parse::<AccountId>()
        .with_context(|| format!("invalid account address {:?}", address))
}

fn parse_asset(text: &str) -> Result<Asset> {
    text.parse::<Asset>()
        .with_context(|| format!("invalid asset {:?}", text))
}

fn parse_path(assets: &[String]) -> Result<Option<Vec<Asset>>> {
    if assets.is_empty() {
        return Ok(None);
    }
    assets
        .iter()
        .map(|a| parse_asset(a))
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// RFC 3339 instant to Unix seconds.
fn parse_time(text: &str) -> Result<i64> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.timestamp())
        .with_context(|| format!("invalid time {:?}, expected RFC 3339", text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_protocol::account::Account;
    use std::path::PathBuf;

    const UNIT: u64 = 10_000_000;

    fn write_genesis(dir: &tempfile::TempDir, alice: &Keypair, bob: &Keypair) -> PathBuf {
        let mut genesis = LedgerSnapshot::new(UNIT / 2);
        genesis.insert_account(Account::new(alice.public_key(), 100 * UNIT, UNIT / 2));
        genesis.insert_account(Account::new(bob.public_key(), 100 * UNIT, UNIT / 2));
        let path = dir.path().join("genesis.json");
        save_snapshot(&path, &genesis).unwrap();
        path
    }

    fn pay_args(snapshot: PathBuf, alice: &Keypair, bob: &Keypair) -> PayArgs {
        PayArgs {
            snapshot,
            from: None,
            to: bob.public_key().to_address(),
            amount: "12.5".into(),
            asset: "native".into(),
            with: None,
            max: None,
            path: Vec::new(),
            memotext: Some("rent".into()),
            memoid: None,
            mintime: None,
            maxtime: None,
            signers: vec![alice.to_hex()],
            apply: None,
        }
    }

    #[test]
    fn time_parsing_accepts_rfc3339() {
        assert_eq!(parse_time("1970-01-01T00:01:40Z").unwrap(), 100);
        assert!(parse_time("yesterday").is_err());
    }

    #[test]
    fn empty_path_means_search() {
        assert!(parse_path(&[]).unwrap().is_none());
        assert_eq!(parse_path(&["native".into()]).unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn pay_apply_writes_next_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        let genesis = write_genesis(&dir, &alice, &bob);
        let next = dir.path().join("next.json");

        let mut args = pay_args(genesis, &alice, &bob);
        args.apply = Some(next.clone());
        let out = pay(args, &EngineConfig::default()).await.unwrap();
        assert_eq!(out["receipt"]["ledger_sequence"], 2);

        let snapshot = load_snapshot(&next).unwrap();
        let bob_balance = snapshot.account(&bob.public_key()).unwrap().balance;
        assert_eq!(bob_balance, 100 * UNIT + 125_000_000);
        assert_eq!(snapshot.account(&alice.public_key()).unwrap().sequence, 1);
    }

    #[tokio::test]
    async fn mintime_alone_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        let genesis = write_genesis(&dir, &alice, &bob);

        let mut args = pay_args(genesis, &alice, &bob);
        args.mintime = Some("2026-01-01T00:00:00Z".into());
        assert!(pay(args, &EngineConfig::default()).await.is_err());
    }

    #[tokio::test]
    async fn wrong_signer_fails_authorization() {
        let dir = tempfile::tempdir().unwrap();
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        let genesis = write_genesis(&dir, &alice, &bob);

        let mut args = pay_args(genesis, &alice, &bob);
        args.from = Some(alice.public_key().to_address());
        args.signers = vec![bob.to_hex()];
        assert!(pay(args, &EngineConfig::default()).await.is_err());
    }

    #[test]
    fn orderbook_of_empty_pair_has_no_levels() {
        let dir = tempfile::tempdir().unwrap();
        let alice = Keypair::from_seed(&[1; 32]);
        let bob = Keypair::from_seed(&[2; 32]);
        let genesis = write_genesis(&dir, &alice, &bob);

        let usd = format!("USD:{}", alice.public_key());
        let out = orderbook(OrderbookArgs {
            snapshot: genesis,
            selling: "native".into(),
            buying: usd,
            limit: 5,
        })
        .unwrap();
        assert_eq!(out["levels"].as_array().unwrap().len(), 0);
    }
}
