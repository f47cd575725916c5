//! Minimal true points and maximal false points.
//!
//! For a *minimal* DNF every clause is a prime implicant, so each clause
//! yields exactly one minimal true point: the characteristic vector of its
//! variables. Maximal false points are produced from the sorted MTPs by the
//! flip-and-fill construction: take an MTP, flip one of its 1-bits to 0 and
//! force every later position to 1. The ν vector bounds which positions have
//! to be considered per MTP; duplicates across MTPs are possible and left to
//! the consumer (the LP is robust to redundant constraints).

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::clause::{BooleanVector, ClauseSet};

/// One minimal true point per clause of the minimal DNF ϕ.
pub fn compute_mtps(phi: &ClauseSet, nbvar: usize) -> Vec<BooleanVector> {
    phi.iter()
        .map(|clause| {
            let mut point = vec![false; nbvar];
            for &v in clause {
                point[v as usize] = true;
            }
            point
        })
        .collect()
}

/// Point order used by the MFP construction: at the first differing index,
/// the point carrying the 0 is the smaller one.
fn cmp_points(p1: &BooleanVector, p2: &BooleanVector) -> Ordering {
    for (a, b) in p1.iter().zip(p2) {
        match (a, b) {
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

/// Maximal false points from the minimal true points.
///
/// If `sort_points` is set the MTPs are first sorted under the point order
/// above (the construction requires it); the reordering is visible to the
/// caller, which is fine for the LP formulation where constraints are a set.
pub fn compute_mfps(mtps: &mut [BooleanVector], sort_points: bool) -> Vec<BooleanVector> {
    if mtps.is_empty() {
        return Vec::new();
    }
    if sort_points {
        mtps.sort_unstable_by(cmp_points);
    }
    let mtps: &[BooleanVector] = mtps;

    // ν[i]: one past the first position where the predecessor has a 0 and
    // this point has a 1. Positions below ν[i] yield only duplicates.
    let mut nu = vec![0usize; mtps.len()];
    nu[1..].par_iter_mut().enumerate().for_each(|(offset, slot)| {
        let i = offset + 1;
        for j in 0..mtps[i].len() {
            if !mtps[i - 1][j] && mtps[i][j] {
                *slot = j + 1;
                break;
            }
        }
    });

    mtps.par_iter()
        .enumerate()
        .flat_map_iter(|(i, point)| {
            let vars = point.len();
            (nu[i]..vars).filter_map(move |j| {
                if !point[j] {
                    return None;
                }
                let mut new_point = point.clone();
                new_point[j] = false;
                for bit in &mut new_point[j + 1..] {
                    *bit = true;
                }
                Some(new_point)
            })
        })
        .collect()
}
