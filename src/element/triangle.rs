//! Triangles, along with the barycentric Lagrange bases shared with tetrahedra.
use nalgebra::{Point3, Vector3};

/// Vertex pairs of the mid-edge nodes of `TRI6`, in node order starting at node 3.
pub(crate) const TRI_EDGES: [(usize, usize); 3] = [(0, 1), (1, 2), (2, 0)];

/// Side nodes in `EDGE3` order.
pub(crate) const TRI_SIDES: [&[usize]; 3] = [&[0, 1, 3], &[1, 2, 4], &[2, 0, 5]];

/// Barycentric coordinates of the reference simplex and their (constant) gradients.
///
/// Vertex 0 sits at the origin and vertex `k > 0` at the `k`-th unit vector.
fn barycentric<const D: usize>(xi: &Point3<f64>) -> ([f64; 4], [Vector3<f64>; 4]) {
    let mut lambda = [0.0; 4];
    let mut gradients = [Vector3::zeros(); 4];
    lambda[0] = 1.0 - (0..D).map(|d| xi[d]).sum::<f64>();
    for d in 0..D {
        lambda[d + 1] = xi[d];
        gradients[0][d] = -1.0;
        gradients[d + 1][d] = 1.0;
    }
    (lambda, gradients)
}

pub(crate) fn simplex_node_coords<const D: usize>(node: usize, edges: &[(usize, usize)]) -> Point3<f64> {
    let vertex = |v: usize| {
        let mut p = Point3::origin();
        if v > 0 {
            p[v - 1] = 1.0;
        }
        p
    };
    if node <= D {
        vertex(node)
    } else {
        let (a, b) = edges[node - D - 1];
        nalgebra::center(&vertex(a), &vertex(b))
    }
}

pub(crate) fn simplex_values<const D: usize>(
    edges: &[(usize, usize)],
    degree: usize,
    xi: &Point3<f64>,
    values: &mut [f64],
) {
    let (lambda, _) = barycentric::<D>(xi);
    let (vertex_values, edge_values) = values.split_at_mut(D + 1);
    for (value, &l) in vertex_values.iter_mut().zip(&lambda) {
        *value = if degree == 1 { l } else { l * (2.0 * l - 1.0) };
    }
    for (value, &(a, b)) in edge_values.iter_mut().zip(edges) {
        *value = 4.0 * lambda[a] * lambda[b];
    }
}

pub(crate) fn simplex_gradients<const D: usize>(
    edges: &[(usize, usize)],
    degree: usize,
    xi: &Point3<f64>,
    gradients: &mut [Vector3<f64>],
) {
    let (lambda, dlambda) = barycentric::<D>(xi);
    let (vertex_gradients, edge_gradients) = gradients.split_at_mut(D + 1);
    for (i, gradient) in vertex_gradients.iter_mut().enumerate() {
        *gradient = if degree == 1 {
            dlambda[i]
        } else {
            dlambda[i] * (4.0 * lambda[i] - 1.0)
        };
    }
    for (gradient, &(a, b)) in edge_gradients.iter_mut().zip(edges) {
        *gradient = (dlambda[b] * lambda[a] + dlambda[a] * lambda[b]) * 4.0;
    }
}
