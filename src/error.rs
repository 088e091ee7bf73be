//! Error taxonomy for quadrature, basis evaluation, DOF distribution and assembly.
use crate::element::ElemType;
use crate::fe::Order;
use crate::perf_log::PerfLogError;
use thiserror::Error;

/// Errors produced while setting up or running an assembly pass.
///
/// Configuration errors (unsupported quadrature, approximation order, mismatched system) are
/// detected before any element is visited. Data errors (degenerate elements, malformed meshes)
/// abort the pass in which they are found. No variant is transient: retrying the same operation
/// with the same input fails the same way.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssemblyError {
    #[error("no Gauss rule of order {order} is available in dimension {dim}")]
    UnsupportedQuadrature { dim: usize, order: usize },

    #[error("element type {elem_type} does not support {order} order Lagrange approximation")]
    UnsupportedApproximation { elem_type: ElemType, order: Order },

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("assembly was requested for system \"{found}\", but the assembler is set up for \"{expected}\"")]
    SystemMismatch { expected: String, found: String },

    #[error("DOF map was distributed over {dof_map_elements} elements, but the mesh has {mesh_elements}")]
    DofMapMismatch {
        mesh_elements: usize,
        dof_map_elements: usize,
    },

    #[error("rank {rank} is out of range for a mesh with {n_partitions} partition(s)")]
    InvalidRank { rank: usize, n_partitions: usize },

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("element {element} has non-positive Jacobian determinant {determinant:e}")]
    DegenerateElement { element: usize, determinant: f64 },

    #[error("entry ({row}, {col}) is not part of the sparsity pattern of the global matrix")]
    MissingSparsityEntry { row: usize, col: usize },

    #[error("performance log misuse: {0}")]
    Instrumentation(#[from] PerfLogError),

    #[error("the linear system has not been (successfully) assembled")]
    NotAssembled,

    #[error("linear solver failure: {0}")]
    Solver(String),
}
