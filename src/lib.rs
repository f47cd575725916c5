//! # lpb-rs: Threshold Synthesis for Positive DNFs
//!
//! **`lpb-rs`** decides whether a positive, minimal DNF over variables
//! `x1…xn` is a *threshold function*, and when it is, produces a **linear
//! pseudo-Boolean constraint** (LPB)
//!
//! ```text
//! a1·x1 + a2·x2 + … + an·xn ≥ d
//! ```
//!
//! with the same set of satisfying assignments. This is the *threshold
//! synthesis problem* (Smaus, "On Boolean Functions Encodable as a Single
//! Linear Pseudo-Boolean Constraint").
//!
//! ## Two solvers
//!
//! - **Combinatorial** ([`split`], [`solve`]): builds a splitting DAG in
//!   which each node carries the residual DNF after assigning a prefix of
//!   the variables, then chooses coefficients column by column, bottom-up,
//!   by intersecting integer intervals. Integrality conflicts are escaped
//!   by *doubling* the subsystem. Incomplete but fast, and exact on the
//!   instances it accepts.
//! - **Linear program** ([`lp`]): formulates synthesis as an integer LP
//!   over the minimal true points and maximal false points ([`points`]),
//!   optionally tightened with monotonicity constraints from the Winder
//!   matrix ([`winder`]) and guarded by a regularity check ([`regular`]).
//!   The MILP backend is used as a black-box feasibility oracle.
//!
//! Both solvers first reorder the variables by importance ([`pattern`],
//! [`rename`]) and return the LPB in the caller's original numbering.
//!
//! ## Basic Usage
//!
//! ```rust
//! use lpb_rs::clause::ClauseSet;
//! use lpb_rs::solve::{min_solver, TreeSolver};
//! use lpb_rs::split::SplittingTree;
//!
//! // Majority of three: x0x1 ∨ x0x2 ∨ x1x2.
//! let phi = ClauseSet::from(vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
//!
//! let mut tree = SplittingTree::new(&phi, 3, true, true);
//! let lpb = min_solver().solve(&mut tree).unwrap();
//!
//! assert_eq!(lpb.threshold, 2);
//! assert_eq!(lpb.coefficients, vec![1, 1, 1]);
//! assert!(lpb.to_dnf().deep_sorted_equals(&phi));
//! ```
//!
//! ## Conventions
//!
//! - Variables are `0`-based ids; clauses are strictly increasing sequences
//!   of ids; a clause set is a positive DNF ([`clause`]).
//! - `∅` is logical false, `{∅}` logical true.
//! - DIMACS input/output is `1`-based and handled in [`dimacs`].

pub mod clause;
pub mod coeff;
pub mod dimacs;
pub mod error;
pub mod lp;
pub mod lpb;
pub mod pattern;
pub mod points;
pub mod regular;
pub mod rename;
pub mod solve;
pub mod split;
pub mod winder;
