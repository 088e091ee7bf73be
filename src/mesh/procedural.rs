//! Basic procedural mesh generation routines.
//!
//! All generators place nodes on a structured lattice. Second-order elements use a lattice with
//! twice the resolution, so that mid-edge, face and centre nodes are lattice points shared
//! between neighboring cells.
use crate::element::{ElemType, ReferenceCell};
use crate::fe::Order;
use crate::mesh::Mesh;
use crate::{AssemblyError, Result};
use log::info;
use nalgebra::Point3;

/// Hypercube corners in the vertex order of `EDGE2`, `QUAD4` and `HEX8` respectively.
const CUBE_CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// Vertices of a line, square and cube cell used as a single element.
const WHOLE_CELL: [&[usize]; 3] = [&[0, 1], &[0, 1, 2, 3], &[0, 1, 2, 3, 4, 5, 6, 7]];

/// Split of a square cell into two triangles along the diagonal from corner 0 to corner 2.
const SQUARE_TO_TRIANGLES: [[usize; 3]; 2] = [[0, 1, 2], [0, 2, 3]];

/// Split of a cube cell into six tetrahedra around the diagonal from corner 0 to corner 6.
///
/// Every cube is split the same way, so the face diagonals of neighboring cubes agree.
const CUBE_TO_TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 1, 2, 6],
    [0, 2, 3, 6],
    [0, 3, 7, 6],
    [0, 7, 4, 6],
    [0, 4, 5, 6],
    [0, 5, 1, 6],
];

/// A uniform mesh of `cells` segments on `interval`.
pub fn create_line_mesh(cells: usize, interval: [f64; 2], elem_type: ElemType) -> Result<Mesh> {
    create_structured_mesh(1, [cells, 1, 1], [interval, [0.0, 0.0], [0.0, 0.0]], elem_type)
}

/// A uniform mesh of the rectangle `x_range x y_range` with `nx x ny` cells.
///
/// For triangle types every cell is split into two triangles.
pub fn create_rectangle_mesh(
    nx: usize,
    ny: usize,
    x_range: [f64; 2],
    y_range: [f64; 2],
    elem_type: ElemType,
) -> Result<Mesh> {
    create_structured_mesh(2, [nx, ny, 1], [x_range, y_range, [0.0, 0.0]], elem_type)
}

/// A uniform mesh of a box with `nx x ny x nz` cells.
///
/// For tetrahedron types every cell is split into six tetrahedra.
pub fn create_box_mesh(cells: [usize; 3], ranges: [[f64; 2]; 3], elem_type: ElemType) -> Result<Mesh> {
    create_structured_mesh(3, cells, ranges, elem_type)
}

/// A uniform mesh of `[-1, 1]^dim` with `n` cells along each axis.
pub fn build_cube(dim: usize, n: usize, elem_type: ElemType) -> Result<Mesh> {
    let range = [-1.0, 1.0];
    match dim {
        1 => create_line_mesh(n, range, elem_type),
        2 => create_rectangle_mesh(n, n, range, range, elem_type),
        3 => create_box_mesh([n; 3], [range; 3], elem_type),
        _ => Err(AssemblyError::InvalidMesh(format!("unsupported mesh dimension {dim}"))),
    }
}

fn create_structured_mesh(
    dim: usize,
    cells: [usize; 3],
    ranges: [[f64; 2]; 3],
    elem_type: ElemType,
) -> Result<Mesh> {
    if elem_type.dim() != dim {
        return Err(AssemblyError::DimensionMismatch {
            expected: dim,
            found: elem_type.dim(),
        });
    }
    if cells[..dim].contains(&0) {
        return Err(AssemblyError::InvalidMesh(
            "a structured mesh needs at least one cell per axis".to_string(),
        ));
    }

    let stride = elem_type.geometric_order().degree();
    let mut lattice = [1usize; 3];
    for d in 0..dim {
        lattice[d] = cells[d] * stride + 1;
    }
    let lattice_index = |p: [usize; 3]| p[0] + lattice[0] * (p[1] + lattice[1] * p[2]);

    let mut nodes = Vec::with_capacity(lattice.iter().product());
    for k in 0..lattice[2] {
        for j in 0..lattice[1] {
            for i in 0..lattice[0] {
                let mut x = Point3::origin();
                for (d, &l) in [i, j, k].iter().enumerate().take(dim) {
                    let [lo, hi] = ranges[d];
                    x[d] = lo + (hi - lo) * l as f64 / (lattice[d] - 1) as f64;
                }
                nodes.push(x);
            }
        }
    }

    let sub_cells: Vec<&[usize]> = match elem_type.reference_cell() {
        ReferenceCell::Line | ReferenceCell::Quadrilateral | ReferenceCell::Hexahedron => {
            vec![WHOLE_CELL[dim - 1]]
        }
        ReferenceCell::Triangle => SQUARE_TO_TRIANGLES.iter().map(|t| t.as_slice()).collect(),
        ReferenceCell::Tetrahedron => CUBE_TO_TETRAHEDRA.iter().map(|t| t.as_slice()).collect(),
        ReferenceCell::Point => unreachable!("element dimension was checked above"),
    };
    let linear_type = elem_type
        .lagrange_type(Order::First)
        .ok_or(AssemblyError::UnsupportedApproximation {
            elem_type,
            order: Order::First,
        })?;

    // Linear interpolation weights of the vertices at every node of the reference element
    let node_weights: Vec<Vec<f64>> = (0..elem_type.n_nodes())
        .map(|node| {
            let mut weights = vec![0.0; linear_type.n_nodes()];
            linear_type.populate_shape_values(&elem_type.reference_node(node), &mut weights);
            weights
        })
        .collect();

    let mut connectivity = Vec::new();
    for k in 0..cells[2] {
        for j in 0..cells[1] {
            for i in 0..cells[0] {
                let corners: Vec<[usize; 3]> = CUBE_CORNERS[..1 << dim]
                    .iter()
                    .map(|c| [stride * (i + c[0]), stride * (j + c[1]), stride * (k + c[2])])
                    .collect();
                for sub_cell in &sub_cells {
                    let element_nodes = node_weights
                        .iter()
                        .map(|weights| {
                            let mut position = [0usize; 3];
                            for (d, coordinate) in position.iter_mut().enumerate() {
                                let x: f64 = weights
                                    .iter()
                                    .zip(sub_cell.iter())
                                    .map(|(w, &corner)| w * corners[corner][d] as f64)
                                    .sum();
                                *coordinate = x.round() as usize;
                            }
                            lattice_index(position)
                        })
                        .collect();
                    connectivity.push((elem_type, element_nodes));
                }
            }
        }
    }

    let mesh = Mesh::from_nodes_and_connectivity(dim, nodes, connectivity)?;
    info!(
        "Generated structured {} mesh with {} elements and {} nodes",
        elem_type,
        mesh.n_elem(),
        mesh.n_nodes()
    );
    Ok(mesh)
}
