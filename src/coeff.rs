//! Coefficient arithmetic with ±∞ sentinels.
//!
//! LPB coefficients and interval endpoints are non-negative integers, but the
//! interval computations of the combinatorial solver need `∞` and `-∞` as
//! absorbing endpoints. `Coeff` is the closed arithmetic for that: a tagged
//! value with a total order and saturating `add`/`sub`/`mul`.
//!
//! The variant order is chosen so that the derived `Ord` is exactly the
//! extended order `-∞ < 0 < 1 < … < ∞`.

use std::fmt;

/// A non-negative integer extended with `∞` and `-∞`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Coeff {
    NegInf,
    Finite(u64),
    PosInf,
}

pub use Coeff::{NegInf, PosInf};

impl Coeff {
    pub const ZERO: Self = Coeff::Finite(0);
    pub const ONE: Self = Coeff::Finite(1);

    pub fn is_finite(self) -> bool {
        matches!(self, Coeff::Finite(_))
    }

    /// The finite value, or `None` for a sentinel.
    pub fn finite(self) -> Option<u64> {
        match self {
            Coeff::Finite(v) => Some(v),
            _ => None,
        }
    }

    /// `self + rhs`. A sentinel on the left absorbs; otherwise a sentinel on
    /// the right absorbs; finite addition saturates at `u64::MAX`.
    pub fn add(self, rhs: Coeff) -> Coeff {
        match (self, rhs) {
            (NegInf, _) => NegInf,
            (PosInf, _) => PosInf,
            (_, NegInf) => NegInf,
            (_, PosInf) => PosInf,
            (Coeff::Finite(a), Coeff::Finite(b)) => Coeff::Finite(a.saturating_add(b)),
        }
    }

    /// `self - rhs` under the extended-reals rules: a sentinel on the left
    /// absorbs, subtracting `∞` yields `-∞` and vice versa. Finite
    /// subtraction saturates at zero so the result stays representable.
    pub fn sub(self, rhs: Coeff) -> Coeff {
        match (self, rhs) {
            (NegInf, _) => NegInf,
            (PosInf, _) => PosInf,
            (_, PosInf) => NegInf,
            (_, NegInf) => PosInf,
            (Coeff::Finite(a), Coeff::Finite(b)) => Coeff::Finite(a.saturating_sub(b)),
        }
    }

    /// `self * rhs`. Sentinels absorb regardless of the other operand.
    pub fn mul(self, rhs: Coeff) -> Coeff {
        match (self, rhs) {
            (NegInf, _) => NegInf,
            (PosInf, _) => PosInf,
            (_, NegInf) => NegInf,
            (_, PosInf) => PosInf,
            (Coeff::Finite(a), Coeff::Finite(b)) => Coeff::Finite(a.saturating_mul(b)),
        }
    }

    pub fn min(self, rhs: Coeff) -> Coeff {
        std::cmp::min(self, rhs)
    }

    pub fn max(self, rhs: Coeff) -> Coeff {
        std::cmp::max(self, rhs)
    }
}

impl From<u64> for Coeff {
    fn from(v: u64) -> Self {
        Coeff::Finite(v)
    }
}

impl fmt::Display for Coeff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegInf => write!(f, "-∞"),
            PosInf => write!(f, "∞"),
            Coeff::Finite(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fin(v: u64) -> Coeff {
        Coeff::Finite(v)
    }

    #[test]
    fn test_add() {
        let tests = [
            (fin(0), fin(1), fin(1)),
            (fin(21), fin(21), fin(42)),
            (PosInf, fin(42), PosInf),
            (NegInf, fin(42), NegInf),
            (fin(42), PosInf, PosInf),
            (fin(42), NegInf, NegInf),
        ];
        for (a, b, expected) in tests {
            assert_eq!(a.add(b), expected, "{} + {}", a, b);
        }
    }

    #[test]
    fn test_sub() {
        let tests = [
            (fin(42), fin(21), fin(21)),
            (fin(5), fin(5), fin(0)),
            (fin(42), PosInf, NegInf),
            (fin(42), NegInf, PosInf),
            (PosInf, fin(42), PosInf),
            (NegInf, fin(42), NegInf),
        ];
        for (a, b, expected) in tests {
            assert_eq!(a.sub(b), expected, "{} - {}", a, b);
        }
    }

    #[test]
    fn test_sub_saturates_at_zero() {
        assert_eq!(fin(2).sub(fin(5)), fin(0));
    }

    #[test]
    fn test_mul() {
        let tests = [
            (fin(21), fin(2), fin(42)),
            (fin(3), fin(5), fin(15)),
            (fin(42), PosInf, PosInf),
            (fin(42), NegInf, NegInf),
            (PosInf, fin(42), PosInf),
            (NegInf, fin(42), NegInf),
        ];
        for (a, b, expected) in tests {
            assert_eq!(a.mul(b), expected, "{} * {}", a, b);
        }
    }

    #[test]
    fn test_order() {
        assert!(NegInf < fin(0));
        assert!(fin(0) < fin(1));
        assert!(fin(u64::MAX) < PosInf);
        assert!(NegInf < PosInf);
        assert_eq!(fin(7).max(fin(3)), fin(7));
        assert_eq!(fin(7).min(NegInf), NegInf);
        assert_eq!(PosInf.max(fin(3)), PosInf);
    }

    #[test]
    fn test_display() {
        assert_eq!(fin(42).to_string(), "42");
        assert_eq!(PosInf.to_string(), "∞");
        assert_eq!(NegInf.to_string(), "-∞");
    }
}
