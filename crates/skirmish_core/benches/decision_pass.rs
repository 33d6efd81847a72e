//! Decision-pass benchmarks for skirmish_core.
//!
//! Run with: `cargo bench -p skirmish_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skirmish_core::engine::Engine;
use skirmish_core::entity::Faction;
use skirmish_test_utils::fixtures::at;
use skirmish_test_utils::scenario::{face_off, squad, FlatTerrain};

/// Full decision pass over a pitched battle, various army sizes.
pub fn full_pass_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pass");
    for size in [10usize, 50, 200] {
        let snapshot = face_off(
            squad(1, Faction::Friendly, 0, size, 10, 100),
            squad(1000, Faction::Enemy, 20, size, 8, 80),
        );
        group.bench_function(format!("{size}v{size}"), |b| {
            let mut engine = Engine::new(vec![at(80, 80)]).unwrap();
            b.iter(|| black_box(engine.step(black_box(&snapshot), &FlatTerrain, 0)));
        });
    }
    group.finish();
}

criterion_group!(benches, full_pass_benchmark);
criterion_main!(benches);
