//! Throughput benchmarks for batch splitting and host selection.

use algolia_client::batch::split_into_batches;
use algolia_client::{Accept, Action, CallType, HostConfig, HostRanker};
use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Value, json};
use std::time::Duration;

fn records(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| json!({"objectID": i.to_string(), "name": format!("record {i}"), "rank": i}))
        .collect()
}

fn benchmark_batch_splitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");

    for size in [1_000usize, 10_000, 100_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("split_{size}"), |b| {
            b.iter_batched(
                || records(size),
                |objects| split_into_batches(Action::UpdateObject, objects, 1000).unwrap(),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn benchmark_host_ranker(c: &mut Criterion) {
    let hosts = vec![
        HostConfig::new("app-dsn.algolia.net").with_accept(Accept::Read),
        HostConfig::new("app.algolia.net").with_accept(Accept::Write),
        HostConfig::new("app-1.algolianet.com"),
        HostConfig::new("app-2.algolianet.com"),
        HostConfig::new("app-3.algolianet.com"),
    ];

    let ranker = HostRanker::new(hosts, Duration::from_secs(300)).unwrap();

    let mut group = c.benchmark_group("host_ranker");
    group.throughput(Throughput::Elements(1));

    group.bench_function("tryable_read_hosts", |b| {
        b.iter(|| ranker.tryable_hosts(CallType::Read));
    });

    group.bench_function("tryable_write_hosts", |b| {
        b.iter(|| ranker.tryable_hosts(CallType::Write));
    });

    group.finish();
}

criterion_group!(benches, benchmark_batch_splitting, benchmark_host_ranker);
criterion_main!(benches);
