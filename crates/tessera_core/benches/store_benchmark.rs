//! # Store Benchmark
//!
//! Add/remove churn and filtered iteration over the entity store.
//!
//! Run with: `cargo bench --package tessera_core --bench store_benchmark`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_core::{Component, ComponentType, Store};

#[derive(Debug, Clone, Copy)]
struct Pos {
    x: f32,
    y: f32,
}
impl Component for Pos {}

#[derive(Debug, Clone, Copy)]
struct Vel {
    x: f32,
    y: f32,
}
impl Component for Vel {}

fn populated(count: usize) -> Store {
    let mut store = Store::new(count);
    for i in 0..count {
        let f = i as f32;
        if i % 2 == 0 {
            store.add_entity((Pos { x: f, y: f }, Vel { x: 1.0, y: 1.0 }));
        } else {
            store.add_entity((Pos { x: f, y: f },));
        }
    }
    store
}

/// Benchmark: Add entities into a store that starts small and grows.
fn bench_add_with_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_with_growth");

    for count in [1_000, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut store = Store::new(16);
                for i in 0..count {
                    black_box(store.add_entity((Pos { x: i as f32, y: 0.0 },)));
                }
                store.size()
            });
        });
    }

    group.finish();
}

/// Benchmark: Remove and re-add entities, exercising slot reuse.
fn bench_churn(c: &mut Criterion) {
    c.bench_function("churn_10k", |b| {
        let mut store = populated(10_000);
        let mut ids: Vec<_> = store.iter(&[]).map(|e| e.id()).collect();
        b.iter(|| {
            for id in ids.iter_mut().step_by(3) {
                assert!(store.remove(*id).is_ok(), "churned id is always live");
                *id = store.add_entity((Pos { x: 0.0, y: 0.0 },));
            }
            black_box(store.size())
        });
    });
}

/// Benchmark: Filtered mutable iteration, the shape of a movement system.
fn bench_filtered_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("filtered_update");
    let filter = [ComponentType::of::<Pos>(), ComponentType::of::<Vel>()];

    for count in [1_000, 100_000] {
        let mut store = populated(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                for entity in store.iter_mut(&filter) {
                    let vel = entity.get::<Vel>().copied();
                    if let (Some(vel), Some(pos)) = (vel, entity.get_mut::<Pos>()) {
                        pos.x += vel.x * 0.016;
                        pos.y += vel.y * 0.016;
                    }
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_add_with_growth, bench_churn, bench_filtered_update);

criterion_main!(benches);
