//! Gauss quadrature rules for finite element reference cells.
//!
//! The rules in this crate are plain `f64` data and have no knowledge of meshes or elements.
//! `femasm` wraps them into run-time dimensioned rules, but they are perfectly usable on their
//! own.
//!
//! Reference domains:
//!
//! - interval: `[-1, 1]`,
//! - quadrilateral: `[-1, 1]^2`,
//! - hexahedron: `[-1, 1]^3`,
//! - triangle: the convex hull of `(0, 0)`, `(1, 0)` and `(0, 1)`,
//! - tetrahedron: the convex hull of the origin and the three unit vectors.

use std::fmt;
use std::fmt::{Display, Formatter};

pub mod simplex;
pub mod tensor;
pub mod univariate;

/// The highest polynomial strength for which rules can be requested.
///
/// Higher strengths are perfectly computable, but no finite element kernel in practice needs
/// them, and requesting one is almost certainly a configuration mistake.
pub const MAX_STRENGTH: usize = 43;

/// Library-wide error type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Indicates that a rule satisfying the given requirements is not available.
    NoRuleAvailable,
    /// The requested polynomial strength exceeds [`MAX_STRENGTH`].
    StrengthTooHigh { strength: usize },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRuleAvailable => {
                write!(f, "There is no quadrature rule satisfying the requirements available")
            }
            Self::StrengthTooHigh { strength } => {
                write!(
                    f,
                    "Requested quadrature strength {strength} exceeds the maximum supported strength {MAX_STRENGTH}"
                )
            }
        }
    }
}

impl std::error::Error for Error {}

/// A D-dimensional point.
pub type Point<const D: usize> = [f64; D];

/// A D-dimensional rule, stored as `(weights, points)`.
pub type Rule<const D: usize> = (Vec<f64>, Vec<Point<D>>);

/// Number of 1D Gauss points needed to integrate polynomials of degree `strength` exactly.
///
/// An `n`-point Gauss rule is exact up to degree `2n - 1`.
pub fn gauss_points_for_strength(strength: usize) -> usize {
    (strength + 2) / 2
}

/// Checks that a strength is within the supported range.
pub fn check_strength(strength: usize) -> Result<(), Error> {
    if strength > MAX_STRENGTH {
        Err(Error::StrengthTooHigh { strength })
    } else {
        Ok(())
    }
}

/// Approximates the integral of `f` with the given rule.
pub fn integrate<const D: usize>(rule: &Rule<D>, f: impl Fn(&Point<D>) -> f64) -> f64 {
    let (weights, points) = rule;
    weights
        .iter()
        .zip(points)
        .map(|(w, p)| w * f(p))
        .sum()
}
