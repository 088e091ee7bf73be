//! Conical product rules for the reference triangle and tetrahedron.
//!
//! The rules are obtained by collapsing a tensor-product Gauss rule on the unit square (cube)
//! onto the simplex (the Duffy transformation). The collapse introduces the factors `(1 - u)`
//! (and `(1 - v)` in 3D) into the integrand, which is accounted for by using one or two extra
//! points along the collapsed directions.

use crate::univariate::gauss_unit_interval;
use crate::{gauss_points_for_strength, Rule};

/// A rule on the reference triangle integrating polynomials of total degree `strength` exactly.
///
/// The mapping is `x = u`, `y = v (1 - u)` with Jacobian `(1 - u)`.
pub fn triangle_conical_gauss(strength: usize) -> Rule<2> {
    let n = gauss_points_for_strength(strength + 1);
    let (w1d, p1d) = gauss_unit_interval(n);

    let mut weights = Vec::with_capacity(n * n);
    let mut points = Vec::with_capacity(n * n);
    for (&wu, &[u]) in w1d.iter().zip(&p1d) {
        for (&wv, &[v]) in w1d.iter().zip(&p1d) {
            weights.push(wu * wv * (1.0 - u));
            points.push([u, v * (1.0 - u)]);
        }
    }
    (weights, points)
}

/// A rule on the reference tetrahedron integrating polynomials of total degree `strength`
/// exactly.
///
/// The mapping is `x = u`, `y = v (1 - u)`, `z = w (1 - u) (1 - v)` with Jacobian
/// `(1 - u)^2 (1 - v)`.
pub fn tetrahedron_conical_gauss(strength: usize) -> Rule<3> {
    let n = gauss_points_for_strength(strength + 2);
    let (w1d, p1d) = gauss_unit_interval(n);

    let mut weights = Vec::with_capacity(n * n * n);
    let mut points = Vec::with_capacity(n * n * n);
    for (&wu, &[u]) in w1d.iter().zip(&p1d) {
        for (&wv, &[v]) in w1d.iter().zip(&p1d) {
            for (&ww, &[w]) in w1d.iter().zip(&p1d) {
                let jacobian = (1.0 - u) * (1.0 - u) * (1.0 - v);
                weights.push(wu * wv * ww * jacobian);
                points.push([u, v * (1.0 - u), w * (1.0 - u) * (1.0 - v)]);
            }
        }
    }
    (weights, points)
}
