use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use financial_ledger::{AccountRegistry, AccountType, InMemoryStore, LedgerEngine, LedgerStore};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn benchmark_deposit_throughput(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("deposit_throughput");

    for num_accounts in [1, 10, 100].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_accounts),
            num_accounts,
            |b, &num_accounts| {
                b.to_async(&rt).iter(|| async move {
                    let store: Arc<dyn LedgerStore> = Arc::new(InMemoryStore::new());
                    let registry = AccountRegistry::new(store.clone());
                    let engine = LedgerEngine::new(store);

                    let mut accounts = Vec::new();
                    for i in 0..num_accounts {
                        let account = registry
                            .create_account(
                                format!("u{}", i),
                                AccountType::Checking,
                                "USD",
                            )
                            .await
                            .unwrap();
                        accounts.push(account.id);
                    }

                    for i in 0..1000 {
                        let account = accounts[i % accounts.len()];
                        let _ = engine
                            .execute_deposit(account, dec!(1.00), "USD", None)
                            .await;
                    }

                    black_box(accounts.len())
                });
            },
        );
    }

    group.finish();
}

fn benchmark_transfer_pair(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    c.bench_function("transfer_500_round_trips", |b| {
        b.to_async(&rt).iter(|| async {
            let store: Arc<dyn LedgerStore> = Arc::new(InMemoryStore::new());
            let registry = AccountRegistry::new(store.clone());
            let engine = LedgerEngine::new(store);

            let a = registry
                .create_account("u1", AccountType::Checking, "USD")
                .await
                .unwrap()
                .id;
            let b_id = registry
                .create_account("u2", AccountType::Checking, "USD")
                .await
                .unwrap()
                .id;
            engine
                .execute_deposit(a, dec!(1000.00), "USD", None)
                .await
                .unwrap();

            for i in 0..500 {
                let (from, to) = if i % 2 == 0 { (a, b_id) } else { (b_id, a) };
                let _ = engine
                    .execute_transfer(from, to, dec!(10.00), "USD", None)
                    .await;
            }

            black_box(())
        });
    });
}

criterion_group!(benches, benchmark_deposit_throughput, benchmark_transfer_pair);
criterion_main!(benches);
