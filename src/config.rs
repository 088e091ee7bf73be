//! Serializable configuration for assembly passes and for complete Poisson problems.
use crate::element::ElemType;
use crate::fe::Order;
use crate::mesh::Partitioner;
use crate::{AssemblyError, Result};
use serde::{Deserialize, Serialize};

/// Parameters of an assembly pass.
///
/// Missing fields take their default values when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// The name of the system the assembler is responsible for.
    pub system_name: String,
    /// The penalty coefficient `β` used to enforce Dirichlet conditions.
    ///
    /// Larger values enforce the boundary data more accurately, but beyond roughly `1e12`
    /// relative to the stiffness entries the system becomes too ill-conditioned to solve
    /// accurately.
    pub penalty: f64,
    /// Polynomial order integrated exactly by the volume quadrature.
    pub quadrature_order: usize,
    /// Polynomial order integrated exactly by the side quadrature.
    pub face_quadrature_order: usize,
    /// Number of elements handed to a worker at a time during parallel assembly.
    pub parallel_chunk_size: usize,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            system_name: "Poisson".to_string(),
            penalty: 1e10,
            quadrature_order: 5,
            face_quadrature_order: 5,
            parallel_chunk_size: 64,
        }
    }
}

impl AssemblyConfig {
    pub fn with_system_name(mut self, name: impl Into<String>) -> Self {
        self.system_name = name.into();
        self
    }

    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    /// Sets both the volume and the side quadrature order.
    pub fn with_quadrature_order(mut self, order: usize) -> Self {
        self.quadrature_order = order;
        self.face_quadrature_order = order;
        self
    }

    pub fn with_parallel_chunk_size(mut self, chunk_size: usize) -> Self {
        self.parallel_chunk_size = chunk_size;
        self
    }
}

/// A complete Poisson problem on `[-1, 1]^dim`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemConfig {
    pub dim: usize,
    /// Number of elements along each axis.
    pub n: usize,
    pub elem_type: ElemType,
    pub order: Order,
    pub n_partitions: usize,
    pub partitioner: Partitioner,
    pub assembly: AssemblyConfig,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            dim: 2,
            n: 15,
            elem_type: ElemType::Quad9,
            order: Order::Second,
            n_partitions: 1,
            partitioner: Partitioner::Centroid,
            assembly: AssemblyConfig::default(),
        }
    }
}

impl ProblemConfig {
    /// Checks that the configuration describes a problem that can be set up.
    pub fn validate(&self) -> Result<()> {
        if self.elem_type.dim() != self.dim {
            return Err(AssemblyError::DimensionMismatch {
                expected: self.dim,
                found: self.elem_type.dim(),
            });
        }
        if self.elem_type.lagrange_type(self.order).is_none() {
            return Err(AssemblyError::UnsupportedApproximation {
                elem_type: self.elem_type,
                order: self.order,
            });
        }
        if self.n == 0 || self.n_partitions == 0 {
            return Err(AssemblyError::InvalidMesh(
                "at least one element and one partition are required".to_string(),
            ));
        }
        Ok(())
    }
}
