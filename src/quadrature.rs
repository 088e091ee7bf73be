//! Run-time dimensioned quadrature rules on reference cells.
//!
//! The rules themselves come from `femasm-quadrature`. This module only lifts them into a form
//! in which the dimension is a value rather than a type parameter, with points padded to three
//! coordinates.
use crate::element::ReferenceCell;
use crate::{AssemblyError, Result};
use femasm_quadrature::simplex::{tetrahedron_conical_gauss, triangle_conical_gauss};
use femasm_quadrature::tensor::hypercube_gauss;
use femasm_quadrature::{check_strength, gauss_points_for_strength, Rule};
use nalgebra::Point3;

pub use femasm_quadrature::MAX_STRENGTH as MAX_QUADRATURE_ORDER;

/// A quadrature rule on a reference cell.
///
/// Coordinates beyond the cell's dimension are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureRule {
    cell: ReferenceCell,
    order: usize,
    weights: Vec<f64>,
    points: Vec<Point3<f64>>,
}

fn lift<const D: usize>((weights, points): Rule<D>) -> (Vec<f64>, Vec<Point3<f64>>) {
    let points = points
        .into_iter()
        .map(|p| {
            let mut lifted = Point3::origin();
            for d in 0..D {
                lifted[d] = p[d];
            }
            lifted
        })
        .collect();
    (weights, points)
}

impl QuadratureRule {
    /// A Gauss rule on `[-1, 1]^dim` exact for polynomials of total degree `order`.
    pub fn gauss(dim: usize, order: usize) -> Result<Self> {
        let cell = ReferenceCell::hypercube(dim).ok_or(AssemblyError::UnsupportedQuadrature { dim, order })?;
        Self::gauss_for_cell(cell, order)
    }

    /// A Gauss-type rule on the given reference cell exact for polynomials of total degree
    /// `order`.
    pub fn gauss_for_cell(cell: ReferenceCell, order: usize) -> Result<Self> {
        check_strength(order).map_err(|_| AssemblyError::UnsupportedQuadrature { dim: cell.dim(), order })?;
        let n = gauss_points_for_strength(order);
        let (weights, points) = match cell {
            ReferenceCell::Point => (vec![1.0], vec![Point3::origin()]),
            ReferenceCell::Line => lift(hypercube_gauss::<1>(n)),
            ReferenceCell::Quadrilateral => lift(hypercube_gauss::<2>(n)),
            ReferenceCell::Hexahedron => lift(hypercube_gauss::<3>(n)),
            ReferenceCell::Triangle => lift(triangle_conical_gauss(order)),
            ReferenceCell::Tetrahedron => lift(tetrahedron_conical_gauss(order)),
        };
        Ok(Self {
            cell,
            order,
            weights,
            points,
        })
    }

    pub fn cell(&self) -> ReferenceCell {
        self.cell
    }

    pub fn dim(&self) -> usize {
        self.cell.dim()
    }

    /// The polynomial degree up to which the rule is exact.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn n_points(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Approximates the integral of `f` over the reference cell.
    pub fn integrate(&self, f: impl Fn(&Point3<f64>) -> f64) -> f64 {
        self.weights
            .iter()
            .zip(&self.points)
            .map(|(w, p)| w * f(p))
            .sum()
    }
}
