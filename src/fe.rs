//! Lagrange finite element bases and their evaluation on physical elements.
//!
//! A [`FiniteElement`] is an immutable description: dimension, [`FEType`] and the quadrature
//! rules used for volume and side integrals. All per-element state lives in [`BasisValues`], an
//! explicit workspace that is overwritten by every call to [`FiniteElement::reinit`] or
//! [`FiniteElement::reinit_side`]. Since the description is shared and the workspace is not, any
//! number of threads can evaluate the same `FiniteElement` concurrently with one `BasisValues`
//! each.
use crate::element::{ElemType, ReferenceCell};
use crate::mesh::Mesh;
use crate::quadrature::QuadratureRule;
use crate::{AssemblyError, Result};
use nalgebra::{DMatrix, Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Polynomial order of an approximation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Order {
    First,
    Second,
}

impl Order {
    pub fn degree(&self) -> usize {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "FIRST"),
            Self::Second => write!(f, "SECOND"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FEFamily {
    /// Nodal, continuous Lagrange basis.
    Lagrange,
}

/// Order and family of a finite element approximation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FEType {
    pub order: Order,
    pub family: FEFamily,
}

impl FEType {
    pub fn lagrange(order: Order) -> Self {
        Self {
            order,
            family: FEFamily::Lagrange,
        }
    }

    /// The quadrature order used when no other order is attached.
    ///
    /// This integrates mass-matrix type terms exactly on affine elements.
    pub fn default_quadrature_order(&self) -> usize {
        2 * self.order.degree() + 1
    }
}

impl Display for FEType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.family {
            FEFamily::Lagrange => write!(f, "{} order LAGRANGE", self.order),
        }
    }
}

/// Reference cells of the given dimension that some element type maps from.
fn cells_of_dim(dim: usize) -> &'static [ReferenceCell] {
    match dim {
        0 => &[ReferenceCell::Point],
        1 => &[ReferenceCell::Line],
        2 => &[ReferenceCell::Quadrilateral, ReferenceCell::Triangle],
        3 => &[ReferenceCell::Hexahedron, ReferenceCell::Tetrahedron],
        _ => &[],
    }
}

fn build_rules(dim: usize, order: usize) -> Result<Vec<QuadratureRule>> {
    let cells = cells_of_dim(dim);
    if cells.is_empty() {
        return Err(AssemblyError::UnsupportedQuadrature { dim, order });
    }
    cells
        .iter()
        .map(|&cell| QuadratureRule::gauss_for_cell(cell, order))
        .collect()
}

/// A Lagrange finite element of fixed dimension and order.
#[derive(Debug, Clone)]
pub struct FiniteElement {
    dim: usize,
    fe_type: FEType,
    volume_rules: Vec<QuadratureRule>,
    side_rules: Vec<QuadratureRule>,
}

impl FiniteElement {
    /// Builds a finite element of the given dimension with the default quadrature for its type
    /// attached.
    pub fn build(dim: usize, fe_type: FEType) -> Result<Self> {
        if !(1..=3).contains(&dim) {
            return Err(AssemblyError::UnsupportedQuadrature {
                dim,
                order: fe_type.default_quadrature_order(),
            });
        }
        let mut fe = Self {
            dim,
            fe_type,
            volume_rules: Vec::new(),
            side_rules: Vec::new(),
        };
        fe.attach_quadrature(fe_type.default_quadrature_order())?;
        Ok(fe)
    }

    /// Attaches Gauss rules of the given order for volume and side integrals.
    pub fn attach_quadrature(&mut self, order: usize) -> Result<()> {
        let volume_rules = build_rules(self.dim, order)?;
        let side_rules = build_rules(self.dim - 1, order)?;
        self.volume_rules = volume_rules;
        self.side_rules = side_rules;
        Ok(())
    }

    /// Replaces only the side rules, keeping the volume rules.
    pub fn attach_face_quadrature(&mut self, order: usize) -> Result<()> {
        self.side_rules = build_rules(self.dim - 1, order)?;
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn fe_type(&self) -> FEType {
        self.fe_type
    }

    /// The volume rule used for elements on the given reference cell.
    pub fn volume_rule(&self, cell: ReferenceCell) -> Option<&QuadratureRule> {
        self.volume_rules.iter().find(|rule| rule.cell() == cell)
    }

    /// The side rule used for sides on the given reference cell.
    pub fn side_rule(&self, cell: ReferenceCell) -> Option<&QuadratureRule> {
        self.side_rules.iter().find(|rule| rule.cell() == cell)
    }

    /// The element type whose shape functions form the basis on elements of type `elem_type`.
    pub fn dof_type(&self, elem_type: ElemType) -> Result<ElemType> {
        if elem_type.dim() != self.dim {
            return Err(AssemblyError::DimensionMismatch {
                expected: self.dim,
                found: elem_type.dim(),
            });
        }
        elem_type
            .lagrange_type(self.fe_type.order)
            .ok_or(AssemblyError::UnsupportedApproximation {
                elem_type,
                order: self.fe_type.order,
            })
    }

    /// Number of shape functions on elements of the given type.
    pub fn n_shape_functions(&self, elem_type: ElemType) -> Result<usize> {
        Ok(self.dof_type(elem_type)?.n_nodes())
    }

    /// Evaluates the basis at the volume quadrature points of the given element.
    pub fn reinit(&self, values: &mut BasisValues, mesh: &Mesh, element: usize) -> Result<()> {
        self.reinit_impl(values, mesh, element, None)
    }

    /// Evaluates the basis at the side quadrature points of the given side of an element.
    ///
    /// The volume shape functions are evaluated, so `values()` has one row per element shape
    /// function. Integration weights carry the surface measure of the side.
    pub fn reinit_side(&self, values: &mut BasisValues, mesh: &Mesh, element: usize, side: usize) -> Result<()> {
        let n_sides = mesh.element(element).elem_type().n_sides();
        if side >= n_sides {
            return Err(AssemblyError::InvalidMesh(format!(
                "side {side} requested on element {element}, which has {n_sides} sides"
            )));
        }
        self.reinit_impl(values, mesh, element, Some(side))
    }

    fn reinit_impl(&self, values: &mut BasisValues, mesh: &Mesh, element: usize, side: Option<usize>) -> Result<()> {
        let elem = mesh.element(element);
        let elem_type = elem.elem_type();
        let dof_type = self.dof_type(elem_type)?;
        let rule = match side {
            None => self.volume_rule(elem_type.reference_cell()),
            Some(_) => self.side_rule(elem_type.side_reference_cell()),
        }
        // Rules exist for every cell of the basis dimension, and dimensions were checked above
        .ok_or(AssemblyError::DimensionMismatch {
            expected: self.dim,
            found: elem_type.dim(),
        })?;

        let key = CacheKey {
            elem_type,
            dof_type,
            side,
            rule_order: rule.order(),
        };
        values.update_reference_cache(key, rule);

        values.element_nodes.clear();
        values
            .element_nodes
            .extend(elem.nodes().iter().map(|&node| *mesh.node(node)));
        values.map_to_physical(element, self.dim)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct CacheKey {
    elem_type: ElemType,
    dof_type: ElemType,
    side: Option<usize>,
    rule_order: usize,
}

/// Overwrites `matrix` with a `nrows x ncols` matrix filled with `value`, reusing the
/// allocation when the shape is unchanged.
fn reset<T: nalgebra::Scalar + Copy>(matrix: &mut DMatrix<T>, nrows: usize, ncols: usize, value: T) {
    if matrix.shape() == (nrows, ncols) {
        matrix.fill(value);
    } else {
        *matrix = DMatrix::from_element(nrows, ncols, value);
    }
}

fn evaluate_shapes(
    elem_type: ElemType,
    points: &[Point3<f64>],
    phi: &mut DMatrix<f64>,
    dphi: &mut DMatrix<Vector3<f64>>,
) {
    let n = elem_type.n_nodes();
    reset(phi, n, points.len(), 0.0);
    reset(dphi, n, points.len(), Vector3::zeros());
    let mut value_buffer = vec![0.0; n];
    let mut gradient_buffer = vec![Vector3::zeros(); n];
    for (q, xi) in points.iter().enumerate() {
        elem_type.populate_shape_values(xi, &mut value_buffer);
        elem_type.populate_shape_gradients(xi, &mut gradient_buffer);
        for i in 0..n {
            phi[(i, q)] = value_buffer[i];
            dphi[(i, q)] = gradient_buffer[i];
        }
    }
}

/// Shape function values, physical gradients, points and weights on one element (or side).
///
/// Matrices are indexed `[(shape_function, quadrature_point)]`. The contents are valid until the
/// next `reinit` with this workspace.
#[derive(Debug, Clone)]
pub struct BasisValues {
    phi: DMatrix<f64>,
    dphi: DMatrix<Vector3<f64>>,
    xyz: Vec<Point3<f64>>,
    jxw: Vec<f64>,
    normals: Vec<Vector3<f64>>,

    // Reference-cell data, reused while consecutive elements share a cache key
    key: Option<CacheKey>,
    weights: Vec<f64>,
    reference_points: Vec<Point3<f64>>,
    reference_phi: DMatrix<f64>,
    reference_dphi: DMatrix<Vector3<f64>>,
    geometry_phi: DMatrix<f64>,
    geometry_dphi: DMatrix<Vector3<f64>>,
    // Derivatives of the element reference coordinates along the side parameters
    side_tangents: Vec<[Vector3<f64>; 2]>,
    side_dim: Option<usize>,

    element_nodes: Vec<Point3<f64>>,
}

impl Default for BasisValues {
    fn default() -> Self {
        Self::new()
    }
}

impl BasisValues {
    pub fn new() -> Self {
        Self {
            phi: DMatrix::zeros(0, 0),
            dphi: DMatrix::from_element(0, 0, Vector3::zeros()),
            xyz: Vec::new(),
            jxw: Vec::new(),
            normals: Vec::new(),
            key: None,
            weights: Vec::new(),
            reference_points: Vec::new(),
            reference_phi: DMatrix::zeros(0, 0),
            reference_dphi: DMatrix::from_element(0, 0, Vector3::zeros()),
            geometry_phi: DMatrix::zeros(0, 0),
            geometry_dphi: DMatrix::from_element(0, 0, Vector3::zeros()),
            side_tangents: Vec::new(),
            side_dim: None,
            element_nodes: Vec::new(),
        }
    }

    /// Shape function values `phi[(i, qp)]`.
    pub fn values(&self) -> &DMatrix<f64> {
        &self.phi
    }

    /// Physical shape function gradients `dphi[(i, qp)]`.
    pub fn gradients(&self) -> &DMatrix<Vector3<f64>> {
        &self.dphi
    }

    pub fn physical_points(&self) -> &[Point3<f64>] {
        &self.xyz
    }

    /// Jacobian-weighted quadrature weights (`JxW`).
    pub fn integration_weights(&self) -> &[f64] {
        &self.jxw
    }

    /// Outward unit normals at the quadrature points. Empty after a volume `reinit`.
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    pub fn n_shape_functions(&self) -> usize {
        self.phi.nrows()
    }

    pub fn n_points(&self) -> usize {
        self.jxw.len()
    }

    fn update_reference_cache(&mut self, key: CacheKey, rule: &QuadratureRule) {
        if self.key == Some(key) {
            return;
        }
        let elem_type = key.elem_type;

        self.reference_points.clear();
        self.side_tangents.clear();
        match key.side {
            None => {
                self.reference_points.extend_from_slice(rule.points());
                self.side_dim = None;
            }
            Some(side) => {
                self.reference_points.extend(
                    rule.points()
                        .iter()
                        .map(|p| elem_type.map_side_reference_coords(side, p)),
                );
                self.side_dim = Some(elem_type.dim() - 1);
                self.side_tangents
                    .extend(rule.points().iter().map(|p| side_tangents(elem_type, side, p)));
            }
        }
        self.weights.clear();
        self.weights.extend_from_slice(rule.weights());

        evaluate_shapes(
            key.dof_type,
            &self.reference_points,
            &mut self.reference_phi,
            &mut self.reference_dphi,
        );
        evaluate_shapes(
            elem_type,
            &self.reference_points,
            &mut self.geometry_phi,
            &mut self.geometry_dphi,
        );
        self.key = Some(key);
    }

    fn map_to_physical(&mut self, element: usize, dim: usize) -> Result<()> {
        let n_points = self.weights.len();
        let n_shapes = self.reference_phi.nrows();

        reset(&mut self.phi, n_shapes, n_points, 0.0);
        self.phi.copy_from(&self.reference_phi);
        reset(&mut self.dphi, n_shapes, n_points, Vector3::zeros());
        self.xyz.clear();
        self.jxw.clear();
        self.normals.clear();

        for q in 0..n_points {
            let mut x = Vector3::zeros();
            let mut jacobian = Matrix3::zeros();
            for (n, node) in self.element_nodes.iter().enumerate() {
                x += node.coords * self.geometry_phi[(n, q)];
                jacobian += node.coords * self.geometry_dphi[(n, q)].transpose();
            }
            for d in dim..3 {
                jacobian[(d, d)] = 1.0;
            }

            let determinant = jacobian.determinant();
            let degenerate = AssemblyError::DegenerateElement { element, determinant };
            if determinant <= 0.0 {
                return Err(degenerate);
            }
            let inverse_transpose = jacobian.try_inverse().ok_or(degenerate)?.transpose();
            for i in 0..n_shapes {
                self.dphi[(i, q)] = inverse_transpose * self.reference_dphi[(i, q)];
            }

            let measure = match self.side_dim {
                None => determinant,
                Some(side_dim) => {
                    let [s, t] = self.side_tangents[q];
                    let (measure, normal) = match side_dim {
                        0 => {
                            // The side is a vertex of a line; the normal points away from the interior
                            let outward = self.reference_points[q].x.signum();
                            (1.0, Vector3::new(outward, 0.0, 0.0))
                        }
                        1 => {
                            let tangent = jacobian * s;
                            let length = tangent.norm();
                            (length, Vector3::new(tangent.y, -tangent.x, 0.0) / length)
                        }
                        _ => {
                            let cross = (jacobian * s).cross(&(jacobian * t));
                            let area = cross.norm();
                            (area, cross / area)
                        }
                    };
                    self.normals.push(normal);
                    measure
                }
            };

            self.xyz.push(Point3::from(x));
            self.jxw.push(measure * self.weights[q]);
        }
        Ok(())
    }
}

/// Derivatives of the element's reference coordinates with respect to the side parameters.
fn side_tangents(elem_type: ElemType, side: usize, side_xi: &Point3<f64>) -> [Vector3<f64>; 2] {
    let mut tangents = [Vector3::zeros(); 2];
    let Some(linear_side) = elem_type
        .side_type()
        .and_then(|side_type| side_type.lagrange_type(Order::First))
    else {
        return tangents;
    };
    let mut gradients = [Vector3::zeros(); 4];
    let gradients = &mut gradients[..linear_side.n_nodes()];
    linear_side.populate_shape_gradients(side_xi, gradients);
    for (gradient, &vertex) in gradients.iter().zip(elem_type.side_vertices(side)) {
        let xi = elem_type.reference_node(vertex).coords;
        for (a, tangent) in tangents.iter_mut().enumerate() {
            *tangent += xi * gradient[a];
        }
    }
    tangents
}
