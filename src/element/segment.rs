//! One-dimensional Lagrange bases and the tensor-product machinery built on them.
use nalgebra::{Point3, Vector3};

/// Reference coordinate of each 1D node index. Vertices come first, the midpoint last.
const LATTICE_COORDS: [f64; 3] = [-1.0, 1.0, 0.0];

pub(crate) const EDGE_TENSOR_INDICES: [[usize; 1]; 3] = [[0], [1], [2]];

pub(crate) const EDGE_SIDES: [&[usize]; 2] = [&[0], &[1]];

/// Value and derivative of the 1D Lagrange basis function associated with node `k`.
fn lagrange_1d(degree: usize, k: usize, x: f64) -> (f64, f64) {
    match (degree, k) {
        (1, 0) => (0.5 * (1.0 - x), -0.5),
        (1, 1) => (0.5 * (1.0 + x), 0.5),
        (2, 0) => (0.5 * x * (x - 1.0), x - 0.5),
        (2, 1) => (0.5 * x * (x + 1.0), x + 0.5),
        (2, 2) => (1.0 - x * x, -2.0 * x),
        _ => unreachable!("no 1D Lagrange node {k} for degree {degree}"),
    }
}

pub(crate) fn tensor_node_coords<const D: usize>(indices: &[usize; D]) -> Point3<f64> {
    let mut p = Point3::origin();
    for d in 0..D {
        p[d] = LATTICE_COORDS[indices[d]];
    }
    p
}

pub(crate) fn tensor_values<const D: usize>(
    indices: &[[usize; D]],
    degree: usize,
    xi: &Point3<f64>,
    values: &mut [f64],
) {
    for (value, node) in values.iter_mut().zip(indices) {
        *value = (0..D).map(|d| lagrange_1d(degree, node[d], xi[d]).0).product();
    }
}

pub(crate) fn tensor_gradients<const D: usize>(
    indices: &[[usize; D]],
    degree: usize,
    xi: &Point3<f64>,
    gradients: &mut [Vector3<f64>],
) {
    for (gradient, node) in gradients.iter_mut().zip(indices) {
        let factors: [(f64, f64); D] = std::array::from_fn(|d| lagrange_1d(degree, node[d], xi[d]));
        *gradient = Vector3::zeros();
        for d in 0..D {
            gradient[d] = factors
                .iter()
                .enumerate()
                .map(|(e, &(value, derivative))| if e == d { derivative } else { value })
                .product();
        }
    }
}
