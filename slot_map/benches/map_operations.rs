/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slot_map::{SlotId, SlotMap};

const POOL_SIZES: &[usize] = &[100, 10_000];

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_map/insert");
    for &size in POOL_SIZES {
        group.bench_function(format!("{size}"), |b| {
            b.iter_batched(
                SlotMap::<u64>::new,
                |mut map| {
                    for v in 0..size as u64 {
                        black_box(map.insert(v));
                    }
                    map
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_map/get");
    for &size in POOL_SIZES {
        let mut map = SlotMap::new();
        let ids: Vec<SlotId> = (0..size as u64).map(|v| map.insert(v)).collect();
        let mut rng = StdRng::seed_from_u64(0xDECADE);

        group.bench_function(format!("{size}"), |b| {
            b.iter(|| {
                let id = ids[rng.random_range(0..ids.len())];
                black_box(map.get(black_box(id)));
            });
        });
    }
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    // Steady-state workload: every removal is followed by an insertion
    // that reuses the freed slot.
    let mut group = c.benchmark_group("slot_map/churn");
    for &size in POOL_SIZES {
        let mut map = SlotMap::new();
        let mut ids: Vec<SlotId> = (0..size as u64).map(|v| map.insert(v)).collect();
        let mut rng = StdRng::seed_from_u64(0xFEED);

        group.bench_function(format!("{size}"), |b| {
            b.iter(|| {
                let pick = rng.random_range(0..ids.len());
                let value = map.remove(ids[pick]);
                ids[pick] = map.insert(black_box(value + 1));
            });
        });
    }
    group.finish();
}

fn bench_stale_lookup(c: &mut Criterion) {
    // The miss path: version checks against slots that were recycled.
    let mut group = c.benchmark_group("slot_map/stale_lookup");
    let mut map = SlotMap::new();
    let stale: Vec<SlotId> = (0..10_000u64)
        .map(|v| {
            let id = map.insert(v);
            map.remove(id);
            map.insert(v);
            id
        })
        .collect();
    let mut rng = StdRng::seed_from_u64(0xBADC0DE);

    group.bench_function("10000", |b| {
        b.iter(|| {
            let id = stale[rng.random_range(0..stale.len())];
            black_box(map.get(black_box(id)));
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_get,
    bench_churn,
    bench_stale_lookup
);
criterion_main!(benches);
