//! Element types, reference cells and Lagrange shape functions.
//!
//! All reference coordinates and gradients are stored in three-component nalgebra types. For
//! elements of dimension `d < 3` the trailing components are zero and never read.
//!
//! Node ordering follows the usual convention of listing vertices first, then edge nodes, then
//! face nodes and finally interior nodes. A first-order element's nodes are therefore always a
//! prefix of the corresponding second-order element's nodes, which is what lets a first-order
//! basis live on second-order geometry.
use crate::fe::Order;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

mod hexahedron;
mod quadrilateral;
mod segment;
mod tetrahedron;
mod triangle;

/// The geometric shape of a reference cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReferenceCell {
    /// A single point. Sides of one-dimensional elements are points.
    Point,
    /// `[-1, 1]`.
    Line,
    /// The unit right triangle.
    Triangle,
    /// `[-1, 1]^2`.
    Quadrilateral,
    /// The unit right tetrahedron.
    Tetrahedron,
    /// `[-1, 1]^3`.
    Hexahedron,
}

impl ReferenceCell {
    pub fn dim(&self) -> usize {
        match self {
            Self::Point => 0,
            Self::Line => 1,
            Self::Triangle | Self::Quadrilateral => 2,
            Self::Tetrahedron | Self::Hexahedron => 3,
        }
    }

    /// The measure (length, area, volume) of the reference cell.
    pub fn volume(&self) -> f64 {
        match self {
            Self::Point => 1.0,
            Self::Line => 2.0,
            Self::Triangle => 0.5,
            Self::Quadrilateral => 4.0,
            Self::Tetrahedron => 1.0 / 6.0,
            Self::Hexahedron => 8.0,
        }
    }

    /// The hypercube reference cell of the given dimension.
    pub fn hypercube(dim: usize) -> Option<Self> {
        match dim {
            0 => Some(Self::Point),
            1 => Some(Self::Line),
            2 => Some(Self::Quadrilateral),
            3 => Some(Self::Hexahedron),
            _ => None,
        }
    }
}

/// Supported element types.
///
/// The numeric suffix is the number of nodes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ElemType {
    Edge2,
    Edge3,
    Tri3,
    Tri6,
    Quad4,
    Quad9,
    Tet4,
    Tet10,
    Hex8,
    Hex27,
}

impl Display for ElemType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Edge2 => "EDGE2",
            Self::Edge3 => "EDGE3",
            Self::Tri3 => "TRI3",
            Self::Tri6 => "TRI6",
            Self::Quad4 => "QUAD4",
            Self::Quad9 => "QUAD9",
            Self::Tet4 => "TET4",
            Self::Tet10 => "TET10",
            Self::Hex8 => "HEX8",
            Self::Hex27 => "HEX27",
        };
        write!(f, "{name}")
    }
}

impl ElemType {
    pub fn dim(&self) -> usize {
        self.reference_cell().dim()
    }

    pub fn reference_cell(&self) -> ReferenceCell {
        match self {
            Self::Edge2 | Self::Edge3 => ReferenceCell::Line,
            Self::Tri3 | Self::Tri6 => ReferenceCell::Triangle,
            Self::Quad4 | Self::Quad9 => ReferenceCell::Quadrilateral,
            Self::Tet4 | Self::Tet10 => ReferenceCell::Tetrahedron,
            Self::Hex8 | Self::Hex27 => ReferenceCell::Hexahedron,
        }
    }

    pub fn n_nodes(&self) -> usize {
        match self {
            Self::Edge2 => 2,
            Self::Edge3 => 3,
            Self::Tri3 => 3,
            Self::Tri6 => 6,
            Self::Quad4 => 4,
            Self::Quad9 => 9,
            Self::Tet4 => 4,
            Self::Tet10 => 10,
            Self::Hex8 => 8,
            Self::Hex27 => 27,
        }
    }

    pub fn n_vertices(&self) -> usize {
        match self.reference_cell() {
            ReferenceCell::Point => 1,
            ReferenceCell::Line => 2,
            ReferenceCell::Triangle => 3,
            ReferenceCell::Quadrilateral => 4,
            ReferenceCell::Tetrahedron => 4,
            ReferenceCell::Hexahedron => 8,
        }
    }

    pub fn n_sides(&self) -> usize {
        match self.reference_cell() {
            ReferenceCell::Point => 0,
            ReferenceCell::Line => 2,
            ReferenceCell::Triangle => 3,
            ReferenceCell::Quadrilateral => 4,
            ReferenceCell::Tetrahedron => 4,
            ReferenceCell::Hexahedron => 6,
        }
    }

    /// The polynomial order of the element's geometric mapping.
    pub fn geometric_order(&self) -> Order {
        match self {
            Self::Edge2 | Self::Tri3 | Self::Quad4 | Self::Tet4 | Self::Hex8 => Order::First,
            Self::Edge3 | Self::Tri6 | Self::Quad9 | Self::Tet10 | Self::Hex27 => Order::Second,
        }
    }

    /// The element type whose nodes carry the degrees of freedom of a Lagrange basis of the
    /// given order on this geometry.
    ///
    /// Returns `None` if the geometry does not have enough nodes for the requested order.
    pub fn lagrange_type(&self, order: Order) -> Option<ElemType> {
        match (order, self.reference_cell()) {
            (Order::First, ReferenceCell::Line) => Some(Self::Edge2),
            (Order::First, ReferenceCell::Triangle) => Some(Self::Tri3),
            (Order::First, ReferenceCell::Quadrilateral) => Some(Self::Quad4),
            (Order::First, ReferenceCell::Tetrahedron) => Some(Self::Tet4),
            (Order::First, ReferenceCell::Hexahedron) => Some(Self::Hex8),
            (Order::First, ReferenceCell::Point) => None,
            (Order::Second, _) => (self.geometric_order() == Order::Second).then_some(*self),
        }
    }

    /// The element type of the sides of this element, or `None` for one-dimensional elements
    /// whose sides are points.
    pub fn side_type(&self) -> Option<ElemType> {
        match self {
            Self::Edge2 | Self::Edge3 => None,
            Self::Tri3 | Self::Quad4 => Some(Self::Edge2),
            Self::Tri6 | Self::Quad9 => Some(Self::Edge3),
            Self::Tet4 => Some(Self::Tri3),
            Self::Tet10 => Some(Self::Tri6),
            Self::Hex8 => Some(Self::Quad4),
            Self::Hex27 => Some(Self::Quad9),
        }
    }

    /// The reference cell of the sides of this element.
    pub fn side_reference_cell(&self) -> ReferenceCell {
        self.side_type()
            .map(|side_type| side_type.reference_cell())
            .unwrap_or(ReferenceCell::Point)
    }

    /// Local indices of the nodes on the given side, ordered as the nodes of
    /// [`side_type`](Self::side_type).
    ///
    /// Sides are oriented so that the side's own parametrization yields an outward normal.
    ///
    /// # Panics
    ///
    /// Panics if `side >= self.n_sides()`.
    pub fn side_nodes(&self, side: usize) -> &'static [usize] {
        let nodes: &'static [usize] = match self.reference_cell() {
            ReferenceCell::Point => &[],
            ReferenceCell::Line => segment::EDGE_SIDES[side],
            ReferenceCell::Triangle => triangle::TRI_SIDES[side],
            ReferenceCell::Quadrilateral => quadrilateral::QUAD_SIDES[side],
            ReferenceCell::Tetrahedron => tetrahedron::TET_SIDES[side],
            ReferenceCell::Hexahedron => hexahedron::HEX_SIDES[side],
        };
        let n_side_nodes = self.side_type().map(|t| t.n_nodes()).unwrap_or(1);
        &nodes[..n_side_nodes]
    }

    /// Local indices of the vertices on the given side.
    pub fn side_vertices(&self, side: usize) -> &'static [usize] {
        let n_side_vertices = self.side_type().map(|t| t.n_vertices()).unwrap_or(1);
        &self.side_nodes(side)[..n_side_vertices]
    }

    /// Reference coordinates of the given local node.
    pub fn reference_node(&self, node: usize) -> Point3<f64> {
        assert!(node < self.n_nodes(), "node index out of bounds");
        match self.reference_cell() {
            ReferenceCell::Point => Point3::origin(),
            ReferenceCell::Line => segment::tensor_node_coords(&segment::EDGE_TENSOR_INDICES[node]),
            ReferenceCell::Quadrilateral => segment::tensor_node_coords(&quadrilateral::QUAD_TENSOR_INDICES[node]),
            ReferenceCell::Hexahedron => segment::tensor_node_coords(&hexahedron::HEX_TENSOR_INDICES[node]),
            ReferenceCell::Triangle => triangle::simplex_node_coords::<2>(node, &triangle::TRI_EDGES),
            ReferenceCell::Tetrahedron => triangle::simplex_node_coords::<3>(node, &tetrahedron::TET_EDGES),
        }
    }

    /// Evaluates all shape functions of this element at the given reference coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != self.n_nodes()`.
    pub fn populate_shape_values(&self, xi: &Point3<f64>, values: &mut [f64]) {
        assert_eq!(values.len(), self.n_nodes(), "output must have one entry per node");
        let degree = self.geometric_order().degree();
        let n = self.n_nodes();
        match self.reference_cell() {
            ReferenceCell::Point => values.fill(1.0),
            ReferenceCell::Line => segment::tensor_values(&segment::EDGE_TENSOR_INDICES[..n], degree, xi, values),
            ReferenceCell::Quadrilateral => {
                segment::tensor_values(&quadrilateral::QUAD_TENSOR_INDICES[..n], degree, xi, values)
            }
            ReferenceCell::Hexahedron => {
                segment::tensor_values(&hexahedron::HEX_TENSOR_INDICES[..n], degree, xi, values)
            }
            ReferenceCell::Triangle => triangle::simplex_values::<2>(&triangle::TRI_EDGES, degree, xi, values),
            ReferenceCell::Tetrahedron => triangle::simplex_values::<3>(&tetrahedron::TET_EDGES, degree, xi, values),
        }
    }

    /// Evaluates the reference gradients of all shape functions at the given reference
    /// coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `gradients.len() != self.n_nodes()`.
    pub fn populate_shape_gradients(&self, xi: &Point3<f64>, gradients: &mut [Vector3<f64>]) {
        assert_eq!(gradients.len(), self.n_nodes(), "output must have one entry per node");
        let degree = self.geometric_order().degree();
        let n = self.n_nodes();
        match self.reference_cell() {
            ReferenceCell::Point => gradients.fill(Vector3::zeros()),
            ReferenceCell::Line => {
                segment::tensor_gradients(&segment::EDGE_TENSOR_INDICES[..n], degree, xi, gradients)
            }
            ReferenceCell::Quadrilateral => {
                segment::tensor_gradients(&quadrilateral::QUAD_TENSOR_INDICES[..n], degree, xi, gradients)
            }
            ReferenceCell::Hexahedron => {
                segment::tensor_gradients(&hexahedron::HEX_TENSOR_INDICES[..n], degree, xi, gradients)
            }
            ReferenceCell::Triangle => {
                triangle::simplex_gradients::<2>(&triangle::TRI_EDGES, degree, xi, gradients)
            }
            ReferenceCell::Tetrahedron => {
                triangle::simplex_gradients::<3>(&tetrahedron::TET_EDGES, degree, xi, gradients)
            }
        }
    }

    /// Maps reference coordinates on a side to reference coordinates of this element.
    ///
    /// Reference sides are flat, so the map is affine in the side's vertices.
    pub fn map_side_reference_coords(&self, side: usize, side_xi: &Point3<f64>) -> Point3<f64> {
        let vertices = self.side_vertices(side);
        match self.side_type().and_then(|t| t.lagrange_type(Order::First)) {
            None => self.reference_node(vertices[0]),
            Some(side_type) => {
                let mut weights = [0.0; 4];
                let weights = &mut weights[..side_type.n_nodes()];
                side_type.populate_shape_values(side_xi, weights);
                let mut xi = Vector3::zeros();
                for (w, &v) in weights.iter().zip(vertices) {
                    xi += self.reference_node(v).coords * *w;
                }
                Point3::from(xi)
            }
        }
    }
}

/// Lists all element types, mainly useful for exhaustive tests.
pub const ALL_ELEM_TYPES: [ElemType; 10] = [
    ElemType::Edge2,
    ElemType::Edge3,
    ElemType::Tri3,
    ElemType::Tri6,
    ElemType::Quad4,
    ElemType::Quad9,
    ElemType::Tet4,
    ElemType::Tet10,
    ElemType::Hex8,
    ElemType::Hex27,
];
