//! Coefficient selection over the splitting DAG.
//!
//! Once the DAG is built, coefficients are chosen column by column from
//! right to left. For every node an interval `(a, b]` of admissible values
//! is derived from the intervals of its children and the already-chosen
//! downstream coefficients; consecutive intervals within a column then bound
//! the coefficient of the column's variable.
//!
//! Integrality conflicts of the shape `b = a + 1` are resolved by *doubling*:
//! the interval factor of the conflicting column and every coefficient and
//! factor below it are multiplied by two. Uniform scaling preserves the set
//! of satisfying assignments, so the emitted LPB is unchanged as a function.

use std::fmt;

use log::debug;

use crate::clause::Finality;
use crate::coeff::{Coeff, NegInf, PosInf};
use crate::error::{Error, Result};
use crate::lpb::Lpb;
use crate::split::{NodeId, SplittingTree};

/// An interval `(lhs, rhs]` of coefficients; a valid choice lies strictly
/// between the endpoints.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Interval {
    pub lhs: Coeff,
    pub rhs: Coeff,
}

impl Interval {
    pub fn new(lhs: Coeff, rhs: Coeff) -> Self {
        Self { lhs, rhs }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}]", self.lhs, self.rhs)
    }
}

/// Per-column search state of the combinatorial solver.
///
/// All four arrays are sized `nbvar + 1`; index 0 is the degree slot. The
/// stored interval endpoints are never rewritten on doubling; instead the
/// per-column factor is applied on every read.
pub struct SolverState {
    coefficients: Vec<Coeff>,
    coeff_sums: Vec<Coeff>,
    intervals: Vec<Vec<Interval>>,
    interval_factors: Vec<u64>,
}

impl SolverState {
    pub fn new(tree: &SplittingTree) -> Self {
        let size = tree.context.nbvar + 1;
        let intervals = (0..size)
            .map(|column| vec![Interval::new(NegInf, NegInf); tree.context.column_len(column)])
            .collect();
        Self {
            coefficients: vec![NegInf; size],
            coeff_sums: vec![Coeff::ZERO; size],
            intervals,
            interval_factors: vec![1; size],
        }
    }

    pub fn coefficient(&self, column: usize) -> Coeff {
        self.coefficients[column]
    }

    /// Set the coefficient of a column, maintaining the suffix sum
    /// `coeff_sums[k] = Σ_{j ≥ k} coefficients[j]`.
    pub fn set_coeff(&mut self, column: usize, value: Coeff) {
        self.coefficients[column] = value;
        self.coeff_sums[column] = if column == self.coeff_sums.len() - 1 {
            value
        } else {
            self.coeff_sums[column + 1].add(value)
        };
    }

    /// Sum of all coefficients strictly after the column.
    pub fn sum_after(&self, column: usize) -> Coeff {
        if column == self.coeff_sums.len() - 1 {
            Coeff::ZERO
        } else {
            self.coeff_sums[column + 1]
        }
    }

    /// The interval stored for a node, scaled by the column factor.
    pub fn interval(&self, column: usize, row: usize) -> Interval {
        let current = self.intervals[column][row];
        let factor = Coeff::Finite(self.interval_factors[column]);
        Interval::new(current.lhs.mul(factor), current.rhs.mul(factor))
    }

    /// Resolve a conflict `a + 1 = b` in the given column by doubling the
    /// whole subsystem from the column downward: the column's interval
    /// factor, and every later coefficient, suffix sum, and factor.
    pub fn solve_conflict(&mut self, column: usize) {
        debug!("doubling the system from column {} on", column);
        self.interval_factors[column] *= 2;
        let two = Coeff::Finite(2);
        for k in column + 1..self.coefficients.len() {
            self.coefficients[k] = self.coefficients[k].mul(two);
            self.coeff_sums[k] = self.coeff_sums[k].mul(two);
            self.interval_factors[k] *= 2;
        }
    }

    /// Compute and store the interval of the node at `(column, row)`.
    ///
    /// Trivially true residuals admit `(-∞, 0]`, trivially false ones
    /// `(Σ_after, ∞]`; a missing child means the corresponding case is
    /// decided and yields the same two shapes. Otherwise both child
    /// intervals are intersected, the lower one shifted by the coefficient
    /// of the next column.
    pub fn compute_interval(&mut self, tree: &SplittingTree, column: usize, row: usize) -> Interval {
        let node = tree.context.node(NodeId { column, row });
        let sum_after = self.sum_after(column);
        let res = match node.phi.finality() {
            Finality::IsTrue => Interval::new(NegInf, Coeff::ZERO),
            Finality::IsFalse => Interval::new(sum_after, PosInf),
            Finality::NotFinal => match (node.upper_child, node.lower_child) {
                (None, _) => Interval::new(sum_after, PosInf),
                (_, None) => Interval::new(NegInf, Coeff::ZERO),
                (Some(uc), Some(lc)) => {
                    let upper = self.interval(column + 1, uc.row);
                    let lower = self.interval(column + 1, lc.row);
                    let coeff = self.coefficients[column + 1];
                    Interval::new(
                        upper.lhs.max(lower.lhs.add(coeff)),
                        upper.rhs.min(lower.rhs.add(coeff)),
                    )
                }
            },
        };
        self.intervals[column][row] = res;
        res
    }
}

/// Chooses coefficients and the degree from column intervals.
///
/// `handle_column` must compute the intervals of every node in the column
/// (in row order) and return the interval the column's coefficient has to be
/// chosen from. The solver guarantees `choose_coeff` is only called with an
/// interval that admits a choice; conflicts are resolved before.
pub trait ColumnHandler {
    fn init(&mut self, _tree: &SplittingTree) {}

    fn choose_coeff(
        &self,
        interval: Interval,
        state: &SolverState,
        tree: &SplittingTree,
        column: usize,
    ) -> Result<Coeff>;

    fn choose_degree(&self, interval: Interval, state: &SolverState, tree: &SplittingTree)
        -> Result<Coeff>;

    fn handle_column(&self, state: &mut SolverState, tree: &SplittingTree, column: usize)
        -> Interval;
}

/// The minimum policy: always pick the smallest admissible value, `a + 1`
/// for a finite lower bound and 0 for an unbounded one.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinColumnHandler;

impl ColumnHandler for MinColumnHandler {
    fn choose_coeff(
        &self,
        interval: Interval,
        _state: &SolverState,
        _tree: &SplittingTree,
        _column: usize,
    ) -> Result<Coeff> {
        match interval.lhs {
            PosInf => Err(Error::CannotChoose(interval)),
            NegInf => Ok(Coeff::ZERO),
            Coeff::Finite(a) => Ok(Coeff::Finite(a + 1)),
        }
    }

    fn choose_degree(
        &self,
        interval: Interval,
        state: &SolverState,
        tree: &SplittingTree,
    ) -> Result<Coeff> {
        self.choose_coeff(interval, state, tree, 0)
    }

    fn handle_column(
        &self,
        state: &mut SolverState,
        tree: &SplittingTree,
        column: usize,
    ) -> Interval {
        let num_rows = tree.context.column_len(column);
        if num_rows == 0 {
            // Trivial inputs leave later columns empty; any value works.
            return Interval::new(NegInf, PosInf);
        }
        let mut max_so_far = NegInf;
        let mut min_so_far = PosInf;
        let mut last = state.compute_interval(tree, column, 0);
        for row in 1..num_rows {
            let current = state.compute_interval(tree, column, row);
            let node = tree.context.node(NodeId { column, row });
            if node.upper_parent.is_some() {
                max_so_far = max_so_far.max(last.lhs.sub(current.rhs));
                min_so_far = min_so_far.min(last.rhs.sub(current.lhs));
            }
            last = current;
        }
        Interval::new(max_so_far, min_so_far)
    }
}

/// A solver that turns a splitting DAG into an LPB, or fails if the DNF is
/// not recognized as a threshold function.
pub trait TreeSolver {
    fn solve(&mut self, tree: &mut SplittingTree) -> Result<Lpb>;
}

/// Right-to-left sweep with a pluggable column handler.
pub struct SimpleTreeSolver<H> {
    handler: H,
}

impl<H: ColumnHandler> SimpleTreeSolver<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }
}

/// The solver variant used throughout: simple sweep, minimum policy.
pub fn min_solver() -> SimpleTreeSolver<MinColumnHandler> {
    SimpleTreeSolver::new(MinColumnHandler)
}

impl<H: ColumnHandler> TreeSolver for SimpleTreeSolver<H> {
    fn solve(&mut self, tree: &mut SplittingTree) -> Result<Lpb> {
        tree.create()?;
        self.handler.init(tree);
        let mut state = SolverState::new(tree);
        let nbvar = tree.context.nbvar;

        for column in (0..=nbvar).rev() {
            let mut interval = self.handler.handle_column(&mut state, tree, column);
            if column == 0 {
                break;
            }
            if interval.lhs.add(Coeff::ONE) == interval.rhs {
                // b = a + 1: no room for an integer strictly inside. Double
                // the subsystem; the interval scales along with it.
                state.solve_conflict(column);
                let two = Coeff::Finite(2);
                interval = Interval::new(interval.lhs.mul(two), interval.rhs.mul(two));
            } else if interval.lhs >= interval.rhs {
                return Err(Error::CannotChoose(interval));
            }
            let coeff = self.handler.choose_coeff(interval, &state, tree, column)?;
            debug!("column {}: interval {}, coefficient {}", column, interval, coeff);
            state.set_coeff(column, coeff);
        }

        let root_interval = state.interval(0, 0);
        if root_interval.lhs >= root_interval.rhs {
            return Err(Error::CannotChoose(root_interval));
        }
        let degree = self.handler.choose_degree(root_interval, &state, tree)?;
        debug!("root interval {}, degree {}", root_interval, degree);

        // Assemble the LPB, translating back to the caller's variable ids.
        let mut renamed = Vec::with_capacity(nbvar);
        for column in 1..=nbvar {
            let value = state.coefficient(column).finite().ok_or_else(|| {
                Error::Internal(format!("column {} has no finite coefficient", column))
            })?;
            renamed.push(value);
        }
        let coefficients = tree.renaming.unrename_coefficients(&renamed);
        let threshold = degree
            .finite()
            .and_then(|d| i64::try_from(d).ok())
            .ok_or_else(|| Error::Internal(format!("degree {} is not finite", degree)))?;
        Ok(Lpb::new(threshold, coefficients))
    }
}
