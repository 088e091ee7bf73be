//! Quadrature rules on hypercubes formed as tensor products of 1D Gauss rules.

use crate::univariate::gauss;
use crate::Rule;

/// A Gauss rule on `[-1, 1]^D` with `num_points_per_dim` points along each axis.
///
/// Points are ordered with the first coordinate varying fastest.
pub fn hypercube_gauss<const D: usize>(num_points_per_dim: usize) -> Rule<D> {
    let n = num_points_per_dim;
    let (weights1d, points1d) = gauss(n);
    let total = n.pow(D as u32);

    let mut weights = Vec::with_capacity(total);
    let mut points = Vec::with_capacity(total);
    let mut multi_index = [0usize; D];

    for _ in 0..total {
        let mut w = 1.0;
        let mut p = [0.0; D];
        for d in 0..D {
            w *= weights1d[multi_index[d]];
            p[d] = points1d[multi_index[d]][0];
        }
        weights.push(w);
        points.push(p);

        // Advance the multi-index like an odometer
        for d in 0..D {
            multi_index[d] += 1;
            if multi_index[d] < n {
                break;
            }
            multi_index[d] = 0;
        }
    }

    (weights, points)
}

/// A Gauss rule for the reference quadrilateral.
pub fn quadrilateral_gauss(num_points_per_dim: usize) -> Rule<2> {
    hypercube_gauss(num_points_per_dim)
}

/// A Gauss rule for the reference hexahedron.
pub fn hexahedron_gauss(num_points_per_dim: usize) -> Rule<3> {
    hypercube_gauss(num_points_per_dim)
}
