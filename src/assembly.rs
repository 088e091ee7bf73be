//! Element-by-element assembly of global linear systems.
//!
//! For every element owned by a partition, the assembler evaluates the basis at the element's
//! quadrature points, computes a dense element matrix and vector from an [`EllipticOperator`]
//! and a source term, adds penalty terms on the element's boundary sides and finally scatters
//! the element contributions additively into a [`GlobalSystem`].
//!
//! Each pass is instrumented with the events `"elem init"`, `"Ke"`, `"Fe"`, `"BCs"` and
//! `"matrix insertion"` in the supplied [`PerfLog`].
use crate::config::AssemblyConfig;
use crate::dof_map::DofMap;
use crate::fe::FiniteElement;
use crate::mesh::Mesh;
use crate::perf_log::PerfLog;
use crate::system::{GlobalSystem, LinearSystem};
use crate::{AssemblyError, Result};
use log::debug;
use nalgebra::{DMatrix, DVector};

mod parallel;

pub mod operators;
pub mod workspace;

pub use operators::*;
pub use workspace::AssemblyWorkspace;

/// Assembles `-∇ · (a ∇u) = f` with Dirichlet data `u = g` enforced by a penalty method.
#[derive(Debug, Clone)]
pub struct PoissonAssembler<Op, Source, Boundary> {
    operator: Op,
    source: Source,
    boundary: Boundary,
    config: AssemblyConfig,
}

impl<Op, Source, Boundary> PoissonAssembler<Op, Source, Boundary>
where
    Op: EllipticOperator,
    Source: ScalarFunction,
    Boundary: ScalarFunction,
{
    /// Creates an assembler with the default [`AssemblyConfig`].
    pub fn new(operator: Op, source: Source, boundary: Boundary) -> Self {
        Self {
            operator,
            source,
            boundary,
            config: AssemblyConfig::default(),
        }
    }

    pub fn with_config(self, config: AssemblyConfig) -> Self {
        Self { config, ..self }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Assembles the contributions of the elements owned by `rank` into `system`.
    ///
    /// The system is zeroed first. On success it is marked as assembled. On failure all entries
    /// are cleared again, so that no partially assembled system is ever exposed.
    pub fn assemble(
        &self,
        mesh: &Mesh,
        dof_map: &DofMap,
        system: &mut LinearSystem,
        rank: usize,
        perf_log: &mut PerfLog,
    ) -> Result<()> {
        self.run_pass(system, |system| {
            let fe = self.prepare(mesh, dof_map, system, rank)?;
            self.assemble_elements(&fe, mesh, dof_map, rank, system, perf_log)
        })
    }

    /// Assembles into an arbitrary [`GlobalSystem`] without zeroing it first.
    ///
    /// Contributions are added on top of whatever the system already contains. No checks of the
    /// system's identity are made. All element contributions are computed and checked against
    /// the target before the first one is inserted, so a failing pass leaves `system` untouched.
    pub fn assemble_into<S: GlobalSystem>(
        &self,
        mesh: &Mesh,
        dof_map: &DofMap,
        system: &mut S,
        rank: usize,
        perf_log: &mut PerfLog,
    ) -> Result<()> {
        self.check_mesh(mesh, dof_map, rank)?;
        let fe = self.finite_element(mesh, dof_map)?;
        let mut workspace = AssemblyWorkspace::default();
        let contributions = mesh
            .local_elements(rank)
            .map(|element| {
                self.compute_element(&fe, mesh, dof_map, element, &mut workspace, perf_log)?;
                Ok(ElementContribution::from_workspace(&workspace))
            })
            .collect::<Result<Vec<_>>>()?;
        for contribution in &contributions {
            system.check_dofs(&contribution.dofs)?;
        }
        for contribution in &contributions {
            perf_log.measure("matrix insertion", || contribution.scatter_into(system))??;
        }
        debug!(
            "Assembled {} elements of rank {} into a generic system",
            contributions.len(),
            rank
        );
        Ok(())
    }

    /// Runs `pass` on a zeroed system and marks the outcome on the system.
    fn run_pass(&self, system: &mut LinearSystem, pass: impl FnOnce(&mut LinearSystem) -> Result<()>) -> Result<()> {
        system.zero();
        let result = pass(system);
        match &result {
            Ok(()) => system.set_assembled(true),
            Err(err) => {
                debug!("Assembly of system \"{}\" failed: {}", system.name(), err);
                system.zero();
            }
        }
        result
    }

    /// Checks that all inputs belong together and builds the finite element for the pass.
    fn prepare(&self, mesh: &Mesh, dof_map: &DofMap, system: &LinearSystem, rank: usize) -> Result<FiniteElement> {
        if system.name() != self.config.system_name {
            return Err(AssemblyError::SystemMismatch {
                expected: self.config.system_name.clone(),
                found: system.name().to_string(),
            });
        }
        self.check_mesh(mesh, dof_map, rank)?;
        if system.n_dofs() != dof_map.n_dofs() {
            return Err(AssemblyError::DimensionMismatch {
                expected: dof_map.n_dofs(),
                found: system.n_dofs(),
            });
        }
        self.finite_element(mesh, dof_map)
    }

    fn check_mesh(&self, mesh: &Mesh, dof_map: &DofMap, rank: usize) -> Result<()> {
        if dof_map.n_elem() != mesh.n_elem() || dof_map.n_partitions() != mesh.n_partitions() {
            return Err(AssemblyError::DofMapMismatch {
                mesh_elements: mesh.n_elem(),
                dof_map_elements: dof_map.n_elem(),
            });
        }
        if rank >= mesh.n_partitions() {
            return Err(AssemblyError::InvalidRank {
                rank,
                n_partitions: mesh.n_partitions(),
            });
        }
        Ok(())
    }

    fn finite_element(&self, mesh: &Mesh, dof_map: &DofMap) -> Result<FiniteElement> {
        let mut fe = FiniteElement::build(mesh.dim(), dof_map.fe_type())?;
        fe.attach_quadrature(self.config.quadrature_order)?;
        fe.attach_face_quadrature(self.config.face_quadrature_order)?;
        Ok(fe)
    }

    /// Computes the element matrix and vector of a single element in `workspace`.
    pub(crate) fn compute_element(
        &self,
        fe: &FiniteElement,
        mesh: &Mesh,
        dof_map: &DofMap,
        element: usize,
        workspace: &mut AssemblyWorkspace,
        perf_log: &mut PerfLog,
    ) -> Result<()> {
        perf_log.measure("elem init", || workspace.init_element(fe, mesh, dof_map, element))??;
        perf_log.measure("Ke", || workspace.add_stiffness(&self.operator))?;
        perf_log.measure("Fe", || workspace.add_source(&self.source))?;
        perf_log.measure("BCs", || {
            workspace.add_boundary_penalty(fe, mesh, element, &self.boundary, self.config.penalty)
        })??;
        Ok(())
    }

    fn assemble_elements<S: GlobalSystem>(
        &self,
        fe: &FiniteElement,
        mesh: &Mesh,
        dof_map: &DofMap,
        rank: usize,
        system: &mut S,
        perf_log: &mut PerfLog,
    ) -> Result<()> {
        let mut workspace = AssemblyWorkspace::default();
        let mut n_assembled = 0;
        for element in mesh.local_elements(rank) {
            self.compute_element(fe, mesh, dof_map, element, &mut workspace, perf_log)?;
            perf_log.measure("matrix insertion", || scatter(system, &workspace))??;
            n_assembled += 1;
        }
        debug!(
            "Assembled {} elements of rank {} with {} DOFs",
            n_assembled,
            rank,
            dof_map.n_local_dofs(rank)
        );
        Ok(())
    }
}

/// The finished contribution of a single element.
pub(crate) struct ElementContribution {
    pub(crate) dofs: Vec<usize>,
    pub(crate) matrix: DMatrix<f64>,
    pub(crate) vector: DVector<f64>,
}

impl ElementContribution {
    pub(crate) fn from_workspace(workspace: &AssemblyWorkspace) -> Self {
        Self {
            dofs: workspace.dofs().to_vec(),
            matrix: workspace.element_matrix().clone(),
            vector: workspace.element_vector().clone(),
        }
    }

    pub(crate) fn scatter_into<S: GlobalSystem>(&self, system: &mut S) -> Result<()> {
        system.add_matrix(&self.matrix, &self.dofs)?;
        system.add_vector(&self.vector, &self.dofs)
    }
}

fn scatter<S: GlobalSystem>(system: &mut S, workspace: &AssemblyWorkspace) -> Result<()> {
    system.add_matrix(workspace.element_matrix(), workspace.dofs())?;
    system.add_vector(workspace.element_vector(), workspace.dofs())
}
