//! Quadrature rules for the one-dimensional domain `[-1, 1]`.

use crate::Rule;
use std::f64::consts::PI;

/// Upper bound on Newton iterations when locating a root of a Legendre polynomial.
///
/// With the initial guess below, convergence to machine precision takes a handful of steps for
/// every rule size we support.
const MAX_NEWTON_ITERATIONS: usize = 100;

/// Recurrence relation for Legendre polynomials.
///
/// The derivative formula is singular at |x| == 1, so evaluation is restricted to the open
/// interval (-1, 1). Gauss points never lie on the end points.
#[derive(Debug, Default)]
struct LegendreRecurrence {
    n: usize,
    x: f64,
    // p_n(x)
    p1: f64,
    // p_{n - 1}(x)
    p2: f64,
}

impl LegendreRecurrence {
    fn evaluate(n: usize, x: f64) -> Self {
        // m P_m(x) = (2m - 1) x P_{m - 1}(x) - (m - 1) P_{m - 2}(x)
        let mut p1 = 1.0;
        let mut p2 = 0.0;
        for m in 1..=n {
            let m = m as f64;
            let p3 = p2;
            p2 = p1;
            p1 = ((2.0 * m - 1.0) * x * p2 - (m - 1.0) * p3) / m;
        }

        Self { n, x, p1, p2 }
    }

    fn value(&self) -> f64 {
        self.p1
    }

    fn derivative(&self) -> f64 {
        let Self { n, x, p1, p2 } = self;
        let n = *n as f64;
        // dp_n/dx (x) = n (x p_n(x) - p_{n - 1}(x)) / (x^2 - 1)
        n * (x * p1 - p2) / (x * x - 1.0)
    }
}

/// Gauss-Legendre quadrature for the reference interval `[-1, 1]`.
///
/// Given `n` points the rule integrates polynomials of degree up to `2n - 1` exactly.
/// Points are returned in ascending order.
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn gauss(num_points: usize) -> Rule<1> {
    let n = num_points;
    assert!(n > 0, "number of points must be positive");

    // Roots are symmetric about the origin, so only the first half is computed
    let m = (n + 1) / 2;
    let mut half_points = Vec::with_capacity(m);
    let mut half_weights = Vec::with_capacity(m);

    for i in 0..m {
        // Chebyshev-like initial guess, close to the i-th largest root
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut recurrence = LegendreRecurrence::evaluate(n, x);

        for _ in 0..MAX_NEWTON_ITERATIONS {
            let dx = -recurrence.value() / recurrence.derivative();
            x += dx;
            recurrence = LegendreRecurrence::evaluate(n, x);
            if dx.abs() <= 1e-15 {
                break;
            }
        }

        let dp = recurrence.derivative();
        half_points.push(x);
        half_weights.push(2.0 / ((1.0 - x * x) * dp * dp));
    }

    // half_points holds the non-negative roots in descending order. Mirror them to obtain
    // all roots in ascending order.
    let mut points = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);
    for (&x, &w) in half_points.iter().zip(&half_weights) {
        points.push([-x]);
        weights.push(w);
    }
    let num_mirrored = n - m;
    for k in (0..num_mirrored).rev() {
        points.push([half_points[k]]);
        weights.push(half_weights[k]);
    }
    // For odd n the middle root is exactly zero. Avoid a spurious -0.0.
    if n % 2 == 1 {
        points[m - 1] = [0.0];
    }

    debug_assert_eq!(points.len(), n);
    (weights, points)
}

/// Gauss-Legendre quadrature mapped onto the unit interval `[0, 1]`.
pub fn gauss_unit_interval(num_points: usize) -> Rule<1> {
    let (weights, points) = gauss(num_points);
    let weights = weights.into_iter().map(|w| 0.5 * w).collect();
    let points = points.into_iter().map(|[x]| [0.5 * (x + 1.0)]).collect();
    (weights, points)
}
