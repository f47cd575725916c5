//! Linear pseudo-Boolean constraints.
//!
//! An [`Lpb`] is a constraint `a1·x1 + … + an·xn ≥ d` with non-negative
//! integer coefficients and an arbitrary integer threshold. Besides parsing
//! and printing, the model can expand a constraint back into the minimal DNF
//! of its satisfying assignments, which is what the round-trip verification
//! of the benchmark driver is built on.

use std::fmt;
use std::str::FromStr;

use crate::clause::{Clause, ClauseSet};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lpb {
    pub threshold: i64,
    pub coefficients: Vec<u64>,
}

impl Lpb {
    pub fn new(threshold: i64, coefficients: Vec<u64>) -> Self {
        Self {
            threshold,
            coefficients,
        }
    }

    pub fn nbvar(&self) -> usize {
        self.coefficients.len()
    }

    /// The minimal DNF of the constraint.
    ///
    /// `Σ ai < d` yields the empty clause set (false) and `d ≤ 0` the set
    /// `{∅}` (true). Otherwise every prime implicant is enumerated: with the
    /// variables visited in descending coefficient order, a subset is
    /// emitted as soon as its weight reaches the threshold. The element
    /// added last has the smallest weight of the subset, so dropping any
    /// element pushes the sum below the threshold again and each emitted
    /// clause is prime. Subsets are visited at most once, so no duplicates
    /// arise.
    pub fn to_dnf(&self) -> ClauseSet {
        let sum: u64 = self
            .coefficients
            .iter()
            .fold(0u64, |acc, &c| acc.saturating_add(c));
        if (sum as i128) < self.threshold as i128 {
            return ClauseSet::new();
        }
        if self.threshold <= 0 {
            return ClauseSet::from(vec![Clause::new()]);
        }

        // Visit variables by descending coefficient; ties keep id order.
        let mut order: Vec<usize> = (0..self.coefficients.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(self.coefficients[i]));
        let weights: Vec<u64> = order.iter().map(|&i| self.coefficients[i]).collect();
        let mut suffix = vec![0u64; weights.len() + 1];
        for i in (0..weights.len()).rev() {
            suffix[i] = suffix[i + 1].saturating_add(weights[i]);
        }

        let mut res = ClauseSet::with_capacity(10);
        let mut current: Vec<usize> = Vec::new();
        self.collect_implicants(
            0,
            self.threshold as u64,
            &order,
            &weights,
            &suffix,
            &mut current,
            &mut res,
        );
        res
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_implicants(
        &self,
        pos: usize,
        remaining: u64,
        order: &[usize],
        weights: &[u64],
        suffix: &[u64],
        current: &mut Vec<usize>,
        res: &mut ClauseSet,
    ) {
        if pos == weights.len() || weights[pos] == 0 {
            return;
        }
        // Include the variable: either the clause is complete, or the rest
        // of the threshold has to come from later variables.
        if weights[pos] >= remaining {
            let mut clause: Clause = current
                .iter()
                .chain(std::iter::once(&pos))
                .map(|&p| order[p] as u32)
                .collect();
            clause.sort_unstable();
            res.push(clause);
        } else {
            current.push(pos);
            self.collect_implicants(
                pos + 1,
                remaining - weights[pos],
                order,
                weights,
                suffix,
                current,
                res,
            );
            current.pop();
        }
        // Skip the variable, unless the remaining weight cannot reach the
        // threshold anymore.
        if suffix[pos + 1] >= remaining {
            self.collect_implicants(pos + 1, remaining, order, weights, suffix, current, res);
        }
    }
}

impl FromStr for Lpb {
    type Err = Error;

    /// Parse the textual form `a1 a2 … an d`: whitespace-separated integers,
    /// the last one being the threshold.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let (&threshold_token, coeff_tokens) = tokens
            .split_last()
            .ok_or_else(|| Error::InvalidInput("LPB description is empty".to_string()))?;
        let threshold: i64 = threshold_token
            .parse()
            .map_err(|_| Error::InvalidInput(format!("invalid threshold: {:?}", threshold_token)))?;
        let mut coefficients = Vec::with_capacity(coeff_tokens.len());
        for token in coeff_tokens {
            let value: i64 = token
                .parse()
                .map_err(|_| Error::InvalidInput(format!("invalid coefficient: {:?}", token)))?;
            if value < 0 {
                return Err(Error::InvalidInput(format!(
                    "LPB coefficients must be non-negative, got {}",
                    value
                )));
            }
            coefficients.push(value as u64);
        }
        Ok(Lpb::new(threshold, coefficients))
    }
}

impl fmt::Display for Lpb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.coefficients.is_empty() {
            write!(f, "0")?;
        } else {
            for (i, coeff) in self.coefficients.iter().enumerate() {
                if i > 0 {
                    write!(f, " + ")?;
                }
                write!(f, "{}⋅x{}", coeff, i + 1)?;
            }
        }
        write!(f, " ≥ {}", self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phi(clauses: &[&[u32]]) -> ClauseSet {
        ClauseSet::from(clauses.iter().map(|c| c.to_vec()).collect::<Vec<_>>())
    }

    #[test]
    fn test_parse() {
        let lpb: Lpb = "2 1 1 2".parse().unwrap();
        assert_eq!(lpb, Lpb::new(2, vec![2, 1, 1]));
    }

    #[test]
    fn test_parse_negative_threshold() {
        let lpb: Lpb = "1 1 -2".parse().unwrap();
        assert_eq!(lpb, Lpb::new(-2, vec![1, 1]));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Lpb>().is_err());
        assert!("   ".parse::<Lpb>().is_err());
        assert!("1 x 2".parse::<Lpb>().is_err());
        assert!("-1 1 2".parse::<Lpb>().is_err());
    }

    #[test]
    fn test_parse_print_round_trip() {
        for text in ["2 1 1 2", "5 3 3 2 1 8", "0", "4 -1"] {
            let lpb: Lpb = text.parse().unwrap();
            let plain: Vec<String> = lpb
                .coefficients
                .iter()
                .map(|c| c.to_string())
                .chain(std::iter::once(lpb.threshold.to_string()))
                .collect();
            assert_eq!(plain.join(" "), text);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Lpb::new(2, vec![2, 1]).to_string(), "2⋅x1 + 1⋅x2 ≥ 2");
        assert_eq!(Lpb::new(0, vec![]).to_string(), "0 ≥ 0");
    }

    #[test]
    fn test_to_dnf_false() {
        let res = Lpb::new(10, vec![1, 1, 1, 3]).to_dnf();
        assert!(res.is_empty());
    }

    #[test]
    fn test_to_dnf_true() {
        let res = Lpb::new(0, vec![]).to_dnf();
        assert_eq!(res, phi(&[&[]]));
        let res = Lpb::new(-1, vec![2, 1]).to_dnf();
        assert_eq!(res, phi(&[&[]]));
    }

    #[test]
    fn test_to_dnf_conjunction() {
        let res = Lpb::new(2, vec![1, 1]).to_dnf();
        assert!(res.deep_sorted_equals(&phi(&[&[0, 1]])));
    }

    #[test]
    fn test_to_dnf_majority() {
        let res = Lpb::new(2, vec![1, 1, 1]).to_dnf();
        assert!(res.deep_sorted_equals(&phi(&[&[0, 1], &[0, 2], &[1, 2]])));
    }

    #[test]
    fn test_to_dnf_weighted() {
        // 2·x0 + x1 + x2 ≥ 2: x0 alone, or x1 and x2 together.
        let res = Lpb::new(2, vec![2, 1, 1]).to_dnf();
        assert!(res.deep_sorted_equals(&phi(&[&[0], &[1, 2]])));
    }

    #[test]
    fn test_to_dnf_smaus() {
        // 4·x0 + 3·x1 + 2·x2 + 2·x3 + 1·x4 ≥ 5.
        let res = Lpb::new(5, vec![4, 3, 2, 2, 1]).to_dnf();
        let expected = phi(&[
            &[0, 1],
            &[0, 2],
            &[0, 3],
            &[0, 4],
            &[1, 2],
            &[1, 3],
            &[2, 3, 4],
        ]);
        assert!(res.deep_sorted_equals(&expected));
    }

    #[test]
    fn test_to_dnf_wenzelmann() {
        // 5·x0 + 3·x1 + 3·x2 + 2·x3 + 1·x4 ≥ 8.
        let res = Lpb::new(8, vec![5, 3, 3, 2, 1]).to_dnf();
        let expected = phi(&[&[0, 1], &[0, 2], &[0, 3, 4], &[1, 2, 3]]);
        assert!(res.deep_sorted_equals(&expected));
    }

    #[test]
    fn test_to_dnf_ignores_zero_coefficients() {
        let res = Lpb::new(1, vec![1, 0, 1]).to_dnf();
        assert!(res.deep_sorted_equals(&phi(&[&[0], &[2]])));
    }

    #[test]
    fn test_to_dnf_clauses_are_sorted() {
        let res = Lpb::new(3, vec![1, 2, 1]).to_dnf();
        for clause in &res {
            assert!(clause.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
