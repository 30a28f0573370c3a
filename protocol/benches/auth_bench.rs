// Authorization benchmarks for the Lumen engine.
//
// Covers transaction building, signing over the hash, and the authorization
// evaluator against accounts with a growing number of co-signers.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use lumen_protocol::account::{Account, Thresholds};
use lumen_protocol::asset::Asset;
use lumen_protocol::crypto::keys::Keypair;
use lumen_protocol::ledger::LedgerSnapshot;
use lumen_protocol::transaction::{
    authorize_transaction, sign_with_all, Operation, Transaction, TransactionBuilder,
};

/// An account with `cosigners` extra signers of weight 1 and a medium
/// threshold that needs all of them plus the master key.
fn multisig_fixture(cosigners: usize) -> (LedgerSnapshot, Transaction, Vec<Keypair>) {
    let master = Keypair::from_seed(&[1; 32]);
    let dest = Keypair::from_seed(&[2; 32]);
    let signers: Vec<Keypair> = (0..cosigners)
        .map(|i| Keypair::from_seed(&[10 + i as u8; 32]))
        .collect();

    let mut account = Account::new(master.public_key(), 1_000_000_000, 100);
    for kp in &signers {
        account.set_signer(kp.public_key(), 1).unwrap();
    }
    let need = (cosigners + 1).min(255) as u8;
    account.thresholds = Thresholds::new(1, need, need, need);

    let mut snap = LedgerSnapshot::new(100);
    snap.insert_account(account);
    snap.insert_account(Account::new(dest.public_key(), 1_000_000_000, 100));

    let tx = TransactionBuilder::new(master.public_key(), 0)
        .operation(Operation::payment(dest.public_key(), Asset::native(), 1_000))
        .build(&snap)
        .unwrap();

    let mut all = vec![master];
    all.extend(signers);
    (snap, tx, all)
}

fn bench_build(c: &mut Criterion) {
    let (snap, _, keys) = multisig_fixture(0);
    let dest = Keypair::from_seed(&[2; 32]).public_key();
    let source = keys[0].public_key();

    c.bench_function("transaction/build_payment", |b| {
        b.iter(|| {
            TransactionBuilder::new(source, 0)
                .operation(Operation::payment(dest, Asset::native(), 1_000))
                .memo_text("rent")
                .build(&snap)
                .unwrap()
        });
    });
}

fn bench_sign(c: &mut Criterion) {
    let (_, tx, keys) = multisig_fixture(0);

    c.bench_function("transaction/sign_single", |b| {
        b.iter(|| sign_with_all(&tx, keys.iter()));
    });
}

fn bench_authorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("auth/authorize_multisig");

    for cosigners in [0usize, 2, 5, 19] {
        let (snap, tx, keys) = multisig_fixture(cosigners);
        let sigs = sign_with_all(&tx, keys.iter());

        group.throughput(Throughput::Elements(keys.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(cosigners), &sigs, |b, sigs| {
            b.iter(|| authorize_transaction(&tx, sigs, &snap).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_sign, bench_authorize);
criterion_main!(benches);
