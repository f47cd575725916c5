//! End-to-end tests for the threshold synthesis pipeline.
//!
//! The worked examples come from Smaus' paper (Example 6.6) and
//! Wenzelmann's thesis (Example 2.2); the remaining cases exercise the
//! renaming round trip and the boundary inputs.

use lpb_rs::clause::ClauseSet;
use lpb_rs::dimacs::parse_positive_dimacs;
use lpb_rs::error::Error;
use lpb_rs::lp::{LinearProgram, TightenMode};
use lpb_rs::lpb::Lpb;
use lpb_rs::solve::{min_solver, TreeSolver};
use lpb_rs::split::SplittingTree;

fn phi(clauses: &[&[u32]]) -> ClauseSet {
    ClauseSet::from(clauses.iter().map(|c| c.to_vec()).collect::<Vec<_>>())
}

/// DNF of 4x1 + 3x2 + 2x3 + 2x4 + x5 ≥ 5 in importance order.
fn smaus_dnf() -> ClauseSet {
    phi(&[
        &[0, 1],
        &[0, 2],
        &[0, 3],
        &[0, 4],
        &[1, 2],
        &[1, 3],
        &[2, 3, 4],
    ])
}

/// DNF of 5x1 + 3x2 + 3x3 + 2x4 + x5 ≥ 8 in importance order.
fn wenzelmann_dnf() -> ClauseSet {
    phi(&[&[0, 1], &[0, 2], &[0, 3, 4], &[1, 2, 3]])
}

fn solve_min(dnf: &ClauseSet, nbvar: usize) -> lpb_rs::error::Result<Lpb> {
    let mut tree = SplittingTree::new(dnf, nbvar, true, true);
    min_solver().solve(&mut tree)
}

// ─── Combinatorial solver ──────────────────────────────────────────────────────

#[test]
fn smaus_min_combinatorial() {
    let lpb = solve_min(&smaus_dnf(), 5).unwrap();
    assert_eq!(lpb, Lpb::new(5, vec![4, 3, 2, 2, 1]));
    assert!(lpb.to_dnf().deep_sorted_equals(&smaus_dnf()));
}

#[test]
fn wenzelmann_min_combinatorial() {
    let lpb = solve_min(&wenzelmann_dnf(), 5).unwrap();
    assert_eq!(lpb, Lpb::new(8, vec![5, 3, 3, 2, 1]));
    assert!(lpb.to_dnf().deep_sorted_equals(&wenzelmann_dnf()));
}

/// The solver must translate its result back into the caller's variable
/// numbering: permuting the input variables permutes the coefficients.
#[test]
fn renaming_round_trip_on_permuted_input() {
    // Smaus' DNF with the variables renamed by σ = [2, 4, 1, 3, 0].
    let permuted = phi(&[
        &[2, 4],
        &[1, 2],
        &[2, 3],
        &[0, 2],
        &[1, 4],
        &[3, 4],
        &[0, 1, 3],
    ]);
    let lpb = solve_min(&permuted, 5).unwrap();
    assert_eq!(lpb, Lpb::new(5, vec![1, 2, 4, 2, 3]));
    assert!(lpb.to_dnf().deep_sorted_equals(&permuted));
}

/// LPB → DNF → LPB is the identity on minimal LPBs the solver accepts.
#[test]
fn lpb_dnf_lpb_round_trip() {
    let cases = [
        Lpb::new(1, vec![1]),
        Lpb::new(1, vec![1, 1]),
        Lpb::new(2, vec![1, 1]),
        Lpb::new(2, vec![1, 1, 1]),
        Lpb::new(2, vec![2, 1, 1]),
        Lpb::new(3, vec![1, 1, 1, 1]),
        Lpb::new(3, vec![2, 1, 1, 1]),
        Lpb::new(3, vec![3, 1, 1, 1]),
        Lpb::new(4, vec![3, 2, 2, 1]),
        Lpb::new(4, vec![2, 2, 1, 1]),
        Lpb::new(5, vec![3, 2, 2, 1]),
        Lpb::new(6, vec![4, 3, 2, 2, 1]),
        Lpb::new(5, vec![4, 3, 2, 2, 1]),
        Lpb::new(8, vec![5, 3, 3, 2, 1]),
    ];
    for lpb in cases {
        let dnf = lpb.to_dnf();
        let solved = solve_min(&dnf, lpb.nbvar()).unwrap();
        assert_eq!(solved, lpb, "round trip changed the LPB");
        assert!(solved.to_dnf().deep_sorted_equals(&dnf));
    }
}

// ─── Boundary inputs ───────────────────────────────────────────────────────────

#[test]
fn empty_dnf_gives_false_lpb() {
    let lpb = solve_min(&phi(&[]), 4).unwrap();
    let sum: u64 = lpb.coefficients.iter().sum();
    assert!((sum as i64) < lpb.threshold);
    assert!(lpb.to_dnf().is_empty());
}

#[test]
fn tautology_dnf_gives_true_lpb() {
    let lpb = solve_min(&phi(&[&[]]), 4).unwrap();
    assert!(lpb.threshold <= 0);
    assert_eq!(lpb.to_dnf(), phi(&[&[]]));
}

#[test]
fn no_variables() {
    let lpb = solve_min(&phi(&[]), 0).unwrap();
    assert!(lpb.coefficients.is_empty());
    assert!(lpb.threshold > 0);

    let lpb = solve_min(&phi(&[&[]]), 0).unwrap();
    assert!(lpb.coefficients.is_empty());
    assert!(lpb.threshold <= 0);
}

// ─── LP solver ─────────────────────────────────────────────────────────────────

#[test]
fn lp_solver_round_trips() {
    for tighten in [TightenMode::None, TightenMode::Neighbours, TightenMode::All] {
        for (dnf, nbvar) in [(smaus_dnf(), 5), (wenzelmann_dnf(), 5)] {
            let lpb = LinearProgram::new(&dnf, nbvar, true, true)
                .solve(tighten, true)
                .unwrap();
            assert!(
                lpb.to_dnf().deep_sorted_equals(&dnf),
                "LPB {} does not represent the DNF (tighten = {:?})",
                lpb,
                tighten
            );
        }
    }
}

#[test]
fn lp_solver_rejects_non_regular_dnf() {
    // x0x1 ∨ x2x3 fails the neighbour-swap test.
    let dnf = phi(&[&[0, 1], &[2, 3]]);
    let err = LinearProgram::new(&dnf, 4, true, true)
        .solve(TightenMode::None, true)
        .unwrap_err();
    assert!(matches!(err, Error::NotRegular));
}

// ─── DIMACS front end ──────────────────────────────────────────────────────────

#[test]
fn dimacs_to_lpb() {
    let input = "\
c majority of three
p dnf 3 3
1 2 0
1 3 0
2 3 0
";
    let (name, nbvar, dnf) = parse_positive_dimacs(input.as_bytes()).unwrap();
    assert_eq!(name, "dnf");
    assert_eq!(nbvar, 3);
    let lpb = solve_min(&dnf, nbvar).unwrap();
    assert_eq!(lpb, Lpb::new(2, vec![1, 1, 1]));
}
