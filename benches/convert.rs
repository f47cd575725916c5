//! Conversion benchmarks for the two solvers.
//!
//! Run with:
//! ```bash
//! cargo bench --bench convert
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use lpb_rs::clause::ClauseSet;
use lpb_rs::lp::{LinearProgram, TightenMode};
use lpb_rs::lpb::Lpb;
use lpb_rs::solve::{min_solver, TreeSolver};
use lpb_rs::split::SplittingTree;

/// The worked examples plus a few k-out-of-n instances.
fn instances() -> Vec<(&'static str, ClauseSet, usize)> {
    let smaus = Lpb::new(5, vec![4, 3, 2, 2, 1]);
    let wenzelmann = Lpb::new(8, vec![5, 3, 3, 2, 1]);
    let majority7 = Lpb::new(4, vec![1; 7]);
    let two_of_eight = Lpb::new(2, vec![1; 8]);
    vec![
        ("smaus", smaus.to_dnf(), 5),
        ("wenzelmann", wenzelmann.to_dnf(), 5),
        ("majority7", majority7.to_dnf(), 7),
        ("two_of_eight", two_of_eight.to_dnf(), 8),
    ]
}

fn bench_min_comb(c: &mut Criterion) {
    let mut group = c.benchmark_group("min_comb");
    for (name, dnf, nbvar) in instances() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &dnf, |b, dnf| {
            b.iter(|| {
                let mut tree = SplittingTree::new(dnf, nbvar, true, true);
                min_solver().solve(&mut tree).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_lp(c: &mut Criterion) {
    let mut group = c.benchmark_group("lp");
    for (name, dnf, nbvar) in instances() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &dnf, |b, dnf| {
            b.iter(|| {
                LinearProgram::new(dnf, nbvar, true, true)
                    .solve(TightenMode::Neighbours, true)
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_min_comb, bench_lp);
criterion_main!(benches);
