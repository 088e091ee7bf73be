//! Partition-aware finite element assembly.
//!
//! `femasm` turns a mesh, a Lagrange basis, a quadrature rule and a per-element physics kernel
//! into a globally assembled sparse linear system. Dirichlet conditions are enforced weakly by a
//! penalty term on boundary sides, and every assembly pass can be instrumented with a
//! [`PerfLog`](perf_log::PerfLog).
//!
//! A typical pass:
//!
//! 1. build a [`Mesh`](mesh::Mesh) (e.g. with [`mesh::procedural`]) and optionally partition it,
//! 2. distribute degrees of freedom with [`DofMap`](dof_map::DofMap),
//! 3. create a [`LinearSystem`](system::LinearSystem) from the DOF map's sparsity pattern,
//! 4. run a [`PoissonAssembler`](assembly::PoissonAssembler) over the elements owned by a rank,
//! 5. solve.

pub mod assembly;
pub mod config;
pub mod dof_map;
pub mod element;
pub mod error;
pub mod fe;
pub mod mesh;
pub mod norms;
pub mod perf_log;
pub mod quadrature;
pub mod system;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;

pub use error::AssemblyError;

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, AssemblyError>;
