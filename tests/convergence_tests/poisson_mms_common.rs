use eyre::eyre;
use femasm::assembly::{LaplaceOperator, ManufacturedSolution, PoissonAssembler, ScalarFunction};
use femasm::config::AssemblyConfig;
use femasm::dof_map::DofMap;
use femasm::fe::{FEType, Order};
use femasm::mesh::Mesh;
use femasm::norms::{h1_seminorm_error, l2_error, nodal_max_error};
use femasm::perf_log::PerfLog;
use femasm::system::LinearSystem;
use nalgebra::{DVector, Point3};
use serde::{Deserialize, Serialize};

/// Quadrature order used for error computations, well above the order used for assembly.
pub const ERROR_QUADRATURE_ORDER: usize = 8;

#[allow(non_snake_case)]
pub struct PoissonSolveResult {
    pub dof_map: DofMap,
    pub u_h: DVector<f64>,
    pub L2_error: f64,
    pub H1_seminorm_error: f64,
    pub nodal_max_error: f64,
}

/// Assembles and solves `-Δu = f` with penalty boundary data taken from the manufactured
/// solution, then measures the error of the discrete solution.
#[allow(non_snake_case)]
pub fn solve_poisson<F: ScalarFunction>(
    mesh: &Mesh,
    order: Order,
    solution: &ManufacturedSolution<F>,
    config: AssemblyConfig,
) -> eyre::Result<PoissonSolveResult> {
    let dof_map = DofMap::distribute_dofs(mesh, FEType::lagrange(order))?;
    let assembler = PoissonAssembler::new(LaplaceOperator, solution.source(), solution.boundary()).with_config(config);
    let mut perf_log = PerfLog::new("Poisson");
    let system = if mesh.n_partitions() == 1 {
        let mut system = LinearSystem::new(assembler.config().system_name.clone(), &dof_map);
        assembler.assemble(mesh, &dof_map, &mut system, 0, &mut perf_log)?;
        system
    } else {
        let mut parts = assembler
            .assemble_partitioned(mesh, &dof_map, &mut perf_log)?
            .into_iter();
        let mut system = parts.next().ok_or_else(|| eyre!("mesh has no partitions"))?;
        for part in parts {
            system.accumulate(&part)?;
        }
        system
    };
    perf_log.finish()?;
    let u_h = system.solve()?;

    let exact = solution.boundary();
    let L2_error = l2_error(mesh, &dof_map, &u_h, &exact, ERROR_QUADRATURE_ORDER)?;
    let H1_seminorm_error = h1_seminorm_error(
        mesh,
        &dof_map,
        &u_h,
        |x: &Point3<f64>| solution.gradient(x),
        ERROR_QUADRATURE_ORDER,
    )?;
    let nodal_max_error = nodal_max_error(mesh, &dof_map, &u_h, &exact)?;
    Ok(PoissonSolveResult {
        dof_map,
        u_h,
        L2_error,
        H1_seminorm_error,
        nodal_max_error,
    })
}

/// For serializing to JSON for subsequent analysis/plots
#[derive(Debug, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct ErrorSummary {
    pub element_name: String,
    pub L2_errors: Vec<f64>,
    pub H1_seminorm_errors: Vec<f64>,
    /// Number of cells along each axis of the cube.
    pub resolutions: Vec<usize>,
}

impl ErrorSummary {
    pub fn new(element_name: impl Into<String>) -> Self {
        Self {
            element_name: element_name.into(),
            L2_errors: Vec::new(),
            H1_seminorm_errors: Vec::new(),
            resolutions: Vec::new(),
        }
    }

    pub fn push(&mut self, resolution: usize, result: &PoissonSolveResult) {
        self.resolutions.push(resolution);
        self.L2_errors.push(result.L2_error);
        self.H1_seminorm_errors.push(result.H1_seminorm_error);
    }

    /// Observed convergence rates between consecutive resolutions.
    fn rates(&self, errors: &[f64]) -> Vec<f64> {
        self.resolutions
            .windows(2)
            .zip(errors.windows(2))
            .map(|(n, e)| (e[0] / e[1]).ln() / (n[1] as f64 / n[0] as f64).ln())
            .collect()
    }

    #[allow(non_snake_case)]
    pub fn assert_rates_at_least(&self, L2_rate: f64, H1_rate: f64) {
        let summary = serde_json::to_string(self).expect("summary is serializable");
        for rate in self.rates(&self.L2_errors) {
            assert!(rate >= L2_rate, "L2 rate {rate} below {L2_rate}: {summary}");
        }
        for rate in self.rates(&self.H1_seminorm_errors) {
            assert!(rate >= H1_rate, "H1 seminorm rate {rate} below {H1_rate}: {summary}");
        }
    }
}
