//! Threshold synthesis as an integer linear program.
//!
//! The coefficients and the degree of the LPB are integer variables; every
//! minimal true point demands its weight reaches the degree, every maximal
//! false point demands its weight stays below. Any feasible point of this
//! program is a correct LPB for the DNF, so the objective is zero and the
//! external MILP backend is used purely as a feasibility oracle.
//!
//! The Winder matrix optionally *tightens* the program with monotonicity
//! constraints between coefficients of neighbouring (or all) variable
//! pairs; the matrix must be sorted descending for that.

use log::debug;
use microlp::{ComparisonOp, OptimizationDirection, Problem, Variable};

use crate::clause::{BooleanVector, ClauseSet, Finality};
use crate::error::{Error, Result};
use crate::lpb::Lpb;
use crate::points::{compute_mfps, compute_mtps};
use crate::regular::{build_dnf_tree, DnfTree};
use crate::rename::Renaming;
use crate::winder::{compare_rows, WinderMatrix};

/// How aggressively to add Winder-derived constraints to the program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TightenMode {
    /// Only the constraints necessary for solving the problem.
    #[default]
    None,
    /// Also order the coefficients of neighbouring variables.
    Neighbours,
    /// Order the coefficients of all variable pairs.
    All,
}

/// The LP-based solver for one DNF.
///
/// Construction renames the variables by Winder-matrix importance (unless
/// `sort_matrix` is off for pre-sorted inputs); [`LinearProgram::solve`]
/// does the rest.
pub struct LinearProgram {
    pub renaming: Renaming,
    pub winder: WinderMatrix,
    pub phi: ClauseSet,
    pub nbvar: usize,
}

impl LinearProgram {
    pub fn new(phi: &ClauseSet, nbvar: usize, sort_matrix: bool, sort_clauses: bool) -> Self {
        let mut winder = WinderMatrix::new(phi, nbvar);
        let (new_dnf, renaming) = if sort_matrix {
            winder.sort();
            let renaming = Renaming::from_sorted_winder(&winder);
            // apply() also resorts every rewritten clause.
            (renaming.apply(phi), renaming)
        } else {
            let mut new_dnf = phi.clone();
            if sort_clauses {
                new_dnf.sort_all();
            }
            (new_dnf, Renaming::identity(nbvar))
        };
        Self {
            renaming,
            winder,
            phi: new_dnf,
            nbvar,
        }
    }

    /// Enumerate the points, optionally check regularity, formulate and
    /// solve. The returned LPB speaks the caller's original variable ids.
    pub fn solve(&self, tighten: TightenMode, reg_test: bool) -> Result<Lpb> {
        // Trivial DNFs have no point structure to formulate over.
        match self.phi.finality() {
            Finality::IsFalse => return Ok(Lpb::new(1, vec![0; self.nbvar])),
            Finality::IsTrue => return Ok(Lpb::new(0, vec![0; self.nbvar])),
            Finality::NotFinal => {}
        }

        let mut mtps = compute_mtps(&self.phi, self.nbvar);
        if reg_test {
            let tree: DnfTree = build_dnf_tree(&self.phi, self.nbvar);
            if !tree.is_regular(&mtps) {
                return Err(Error::NotRegular);
            }
        }
        let mfps = compute_mfps(&mut mtps, true);
        debug!(
            "formulating LP over {} MTPs and {} MFPs, tighten = {:?}",
            mtps.len(),
            mfps.len(),
            tighten
        );
        let (problem, vars) = formulate_lp(&mtps, &mfps, self.nbvar, &self.winder, tighten)?;
        let renamed = solve_lp(problem, &vars)?;
        let coefficients = self.renaming.unrename_coefficients(&renamed.coefficients);
        Ok(Lpb::new(renamed.threshold, coefficients))
    }
}

/// Build the integer program: one non-negative integer variable per
/// coefficient plus one for the degree, an `≥ 0` row per MTP, an `≤ -1` row
/// per MFP, and the Winder tightening rows.
pub fn formulate_lp(
    mtps: &[BooleanVector],
    mfps: &[BooleanVector],
    nbvar: usize,
    winder: &WinderMatrix,
    tighten: TightenMode,
) -> Result<(Problem, Vec<Variable>)> {
    let mut problem = Problem::new(OptimizationDirection::Minimize);
    // Feasibility only: zero objective on every variable. The last variable
    // is the degree.
    let vars: Vec<Variable> = (0..nbvar + 1)
        .map(|_| problem.add_integer_var(0.0, (0, i32::MAX)))
        .collect();
    let degree = vars[nbvar];

    for mtp in mtps {
        let mut row: Vec<(Variable, f64)> = Vec::with_capacity(nbvar + 1);
        for (j, &set) in mtp.iter().enumerate() {
            if set {
                row.push((vars[j], 1.0));
            }
        }
        row.push((degree, -1.0));
        problem.add_constraint(row.as_slice(), ComparisonOp::Ge, 0.0);
    }
    for mfp in mfps {
        let mut row: Vec<(Variable, f64)> = Vec::with_capacity(nbvar + 1);
        for (j, &set) in mfp.iter().enumerate() {
            if set {
                row.push((vars[j], 1.0));
            }
        }
        row.push((degree, -1.0));
        problem.add_constraint(row.as_slice(), ComparisonOp::Le, -1.0);
    }

    match tighten {
        TightenMode::None => {}
        TightenMode::Neighbours => {
            // The matrix is sorted descending, so w(i-1) ≥ w(i) always; the
            // rows decide whether the coefficients must even be equal.
            for i in 1..nbvar {
                let cmp = compare_rows(winder.row(i - 1), winder.row(i));
                if cmp == std::cmp::Ordering::Less {
                    return Err(Error::Internal(
                        "unsorted Winder matrix in formulate_lp".to_string(),
                    ));
                }
                let op = if cmp == std::cmp::Ordering::Equal {
                    ComparisonOp::Eq
                } else {
                    ComparisonOp::Ge
                };
                problem.add_constraint(
                    [(vars[i - 1], 1.0), (vars[i], -1.0)].as_slice(),
                    op,
                    0.0,
                );
            }
        }
        TightenMode::All => {
            if nbvar == 0 {
                return Ok((problem, vars));
            }
            // Precompute the neighbour comparisons once; transitivity gives
            // every pair. While the chain from i is all-equal the pair is
            // equal, afterwards only ≥.
            let mut precomputed = Vec::with_capacity(nbvar.saturating_sub(1));
            for i in 1..nbvar {
                let cmp = compare_rows(winder.row(i - 1), winder.row(i));
                if cmp == std::cmp::Ordering::Less {
                    return Err(Error::Internal(
                        "unsorted Winder matrix in formulate_lp".to_string(),
                    ));
                }
                precomputed.push(cmp);
            }
            for i in 0..nbvar {
                let mut j = i + 1;
                while j < nbvar && precomputed[j - 1] == std::cmp::Ordering::Equal {
                    problem.add_constraint(
                        [(vars[i], 1.0), (vars[j], -1.0)].as_slice(),
                        ComparisonOp::Eq,
                        0.0,
                    );
                    j += 1;
                }
                while j < nbvar {
                    problem.add_constraint(
                        [(vars[i], 1.0), (vars[j], -1.0)].as_slice(),
                        ComparisonOp::Ge,
                        0.0,
                    );
                    j += 1;
                }
            }
        }
    }
    Ok((problem, vars))
}

/// Hand the program to the backend and round the solution to an LPB. Only a
/// solved outcome is accepted; anything else surfaces as
/// [`Error::ExternalSolverFailure`].
pub fn solve_lp(problem: Problem, vars: &[Variable]) -> Result<Lpb> {
    let solution = problem
        .solve()
        .map_err(|e| Error::ExternalSolverFailure(e.to_string()))?;
    let mut coefficients = Vec::with_capacity(vars.len() - 1);
    for &var in &vars[..vars.len() - 1] {
        // The backend reports integers as floats; floor defensively.
        coefficients.push(solution[var].floor() as u64);
    }
    let threshold = solution[vars[vars.len() - 1]].floor() as i64;
    Ok(Lpb::new(threshold, coefficients))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phi(clauses: &[&[u32]]) -> ClauseSet {
        ClauseSet::from(clauses.iter().map(|c| c.to_vec()).collect::<Vec<_>>())
    }

    fn assert_round_trip(clauses: &[&[u32]], nbvar: usize, tighten: TightenMode) {
        let dnf = phi(clauses);
        let lp = LinearProgram::new(&dnf, nbvar, true, true);
        let lpb = lp.solve(tighten, true).unwrap();
        assert!(
            lpb.to_dnf().deep_sorted_equals(&dnf),
            "LPB {} does not represent the input DNF",
            lpb
        );
    }

    #[test]
    fn test_lp_majority() {
        for tighten in [TightenMode::None, TightenMode::Neighbours, TightenMode::All] {
            assert_round_trip(&[&[0, 1], &[0, 2], &[1, 2]], 3, tighten);
        }
    }

    #[test]
    fn test_lp_weighted() {
        for tighten in [TightenMode::None, TightenMode::Neighbours, TightenMode::All] {
            assert_round_trip(&[&[0], &[1, 2]], 3, tighten);
        }
    }

    #[test]
    fn test_lp_wenzelmann() {
        for tighten in [TightenMode::None, TightenMode::Neighbours, TightenMode::All] {
            assert_round_trip(&[&[0, 1], &[0, 2], &[0, 3, 4], &[1, 2, 3]], 5, tighten);
        }
    }

    #[test]
    fn test_lp_coefficients_respect_importance_order() {
        let dnf = phi(&[&[0, 1], &[0, 2], &[0, 3, 4], &[1, 2, 3]]);
        let lp = LinearProgram::new(&dnf, 5, true, true);
        let lpb = lp.solve(TightenMode::Neighbours, true).unwrap();
        // The input is already importance-ordered, so the tightened program
        // forces descending coefficients.
        for pair in lpb.coefficients.windows(2) {
            assert!(pair[0] >= pair[1], "coefficients not monotone: {:?}", lpb);
        }
    }

    #[test]
    fn test_lp_rejects_non_regular() {
        let dnf = phi(&[&[0, 1], &[2, 3]]);
        let lp = LinearProgram::new(&dnf, 4, true, true);
        let err = lp.solve(TightenMode::None, true).unwrap_err();
        assert!(matches!(err, Error::NotRegular));
    }

    #[test]
    fn test_lp_infeasible_without_reg_test() {
        // x0x1 ∨ x2x3 is not a threshold function; with the regularity test
        // disabled the failure comes from the solver instead.
        let dnf = phi(&[&[0, 1], &[2, 3]]);
        let lp = LinearProgram::new(&dnf, 4, true, true);
        let err = lp.solve(TightenMode::None, false).unwrap_err();
        assert!(matches!(err, Error::ExternalSolverFailure(_)));
    }

    #[test]
    fn test_lp_trivial_inputs() {
        let lp = LinearProgram::new(&phi(&[]), 3, true, true);
        let lpb = lp.solve(TightenMode::None, true).unwrap();
        assert!(lpb.to_dnf().is_empty());

        let lp = LinearProgram::new(&phi(&[&[]]), 3, true, true);
        let lpb = lp.solve(TightenMode::None, true).unwrap();
        assert_eq!(lpb.to_dnf(), phi(&[&[]]));
    }
}
