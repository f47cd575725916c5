//! Variable renaming by importance.
//!
//! Both solvers require the variables of the input DNF to be numbered in
//! descending importance: variable 0 is the most important one. A
//! [`Renaming`] is built from a sorted occurrence-pattern array or a sorted
//! Winder matrix and keeps both directions: `forward[old] = new` rewrites the
//! DNF, `reverse[new] = old` translates solved coefficients back into the
//! caller's numbering.

use rayon::prelude::*;

use crate::clause::ClauseSet;
use crate::pattern::OccurrencePattern;
use crate::winder::WinderMatrix;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renaming {
    forward: Vec<u32>,
    reverse: Vec<u32>,
}

impl Renaming {
    pub fn identity(nbvar: usize) -> Self {
        let ids: Vec<u32> = (0..nbvar as u32).collect();
        Self {
            forward: ids.clone(),
            reverse: ids,
        }
    }

    /// Renaming induced by a pattern array already sorted by importance:
    /// the variable of the pattern at position `i` becomes variable `i`.
    pub fn from_sorted_patterns(patterns: &[OccurrencePattern]) -> Self {
        let mut forward = vec![0; patterns.len()];
        let mut reverse = vec![0; patterns.len()];
        for (new_id, pattern) in patterns.iter().enumerate() {
            forward[pattern.variable as usize] = new_id as u32;
            reverse[new_id] = pattern.variable;
        }
        Self { forward, reverse }
    }

    /// Renaming induced by a Winder matrix already sorted descending.
    pub fn from_sorted_winder(matrix: &WinderMatrix) -> Self {
        let nbvar = matrix.nbvar();
        let mut forward = vec![0; nbvar];
        let mut reverse = vec![0; nbvar];
        for new_id in 0..nbvar {
            let old_id = matrix.variable_of_row(new_id);
            forward[old_id as usize] = new_id as u32;
            reverse[new_id] = old_id;
        }
        Self { forward, reverse }
    }

    pub fn nbvar(&self) -> usize {
        self.forward.len()
    }

    pub fn forward(&self, old: u32) -> u32 {
        self.forward[old as usize]
    }

    pub fn reverse(&self, new: u32) -> u32 {
        self.reverse[new as usize]
    }

    /// Rewrite ϕ under the renaming, one parallel task per clause. Each
    /// rewritten clause is resorted so the increasing-order invariant holds
    /// in the new numbering.
    pub fn apply(&self, phi: &ClauseSet) -> ClauseSet {
        let clauses = phi
            .clauses
            .par_iter()
            .map(|clause| {
                let mut renamed: Vec<u32> =
                    clause.iter().map(|&v| self.forward[v as usize]).collect();
                renamed.sort_unstable();
                renamed
            })
            .collect();
        ClauseSet { clauses }
    }

    /// Translate a coefficient vector indexed by renamed variables back to
    /// the original numbering.
    pub fn unrename_coefficients(&self, coefficients: &[u64]) -> Vec<u64> {
        assert_eq!(coefficients.len(), self.forward.len());
        self.forward
            .iter()
            .map(|&new_id| coefficients[new_id as usize])
            .collect()
    }
}
