//! Error types shared by the parsers and both solvers.

use thiserror::Error;

use crate::solve::Interval;

/// Everything that can go wrong between reading a DNF and emitting an LPB.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed DIMACS or LPB text, or a literal outside the declared range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The DNF failed the neighbour-swap regularity test; it cannot be a
    /// threshold function under the current variable order.
    #[error("DNF is not regular")]
    NotRegular,

    /// The combinatorial solver reached an interval with no room for a
    /// coefficient, even after doubling.
    #[error("cannot choose a value α with {} < α < {}", .0.lhs, .0.rhs)]
    CannotChoose(Interval),

    /// The external MILP backend returned something other than a solution.
    #[error("external LP solver failed: {0}")]
    ExternalSolverFailure(String),

    /// An invariant the algorithms rely on was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
