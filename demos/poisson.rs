//! Solves `-Δu = f` on `[-1, 1]^d` with a manufactured solution and penalty boundary conditions.
//!
//! Run with `RUST_LOG=info` to see the performance summary of the assembly. An optional JSON
//! file with a `ProblemConfig` may be passed as the first argument, e.g.
//!
//! ```json
//! { "dim": 3, "n": 6, "elem_type": "HEX27", "n_partitions": 4 }
//! ```
use eyre::{eyre, WrapErr};
use femasm::assembly::{LaplaceOperator, ManufacturedSolution, PoissonAssembler};
use femasm::config::ProblemConfig;
use femasm::dof_map::DofMap;
use femasm::fe::FEType;
use femasm::mesh::procedural::build_cube;
use femasm::norms::{h1_seminorm_error, l2_error, nodal_max_error};
use femasm::perf_log::PerfLog;
use femasm::system::LinearSystem;
use nalgebra::Point3;
use std::fs;

fn load_config() -> eyre::Result<ProblemConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = fs::read_to_string(&path).wrap_err_with(|| format!("failed to read {path}"))?;
            serde_json::from_str(&json).wrap_err("invalid problem configuration")
        }
        None => Ok(ProblemConfig::default()),
    }
}

fn main() -> eyre::Result<()> {
    env_logger::init();
    let config = load_config()?;
    config.validate()?;

    let mut mesh = build_cube(config.dim, config.n, config.elem_type)?;
    mesh.partition(config.partitioner, config.n_partitions)?;
    println!("{mesh}");

    let dof_map = DofMap::distribute_dofs(&mesh, FEType::lagrange(config.order))?;
    println!("Number of DOFs: {}", dof_map.n_dofs());

    let solution = ManufacturedSolution::cosine_sine(config.dim);
    let assembler = PoissonAssembler::new(LaplaceOperator, solution.source(), solution.boundary())
        .with_config(config.assembly.clone());

    let mut perf_log = PerfLog::new("Matrix Assembly");
    let system = if mesh.n_partitions() == 1 {
        let mut system = LinearSystem::new(config.assembly.system_name.clone(), &dof_map);
        assembler.assemble_par(&mesh, &dof_map, &mut system, 0, &mut perf_log)?;
        system
    } else {
        let mut parts = assembler
            .assemble_partitioned(&mesh, &dof_map, &mut perf_log)?
            .into_iter();
        let mut system = parts
            .next()
            .ok_or_else(|| eyre!("mesh has no partitions"))?;
        for part in parts {
            system.accumulate(&part)?;
        }
        system
    };
    println!("{}", perf_log.finish()?);

    let u_h = system.solve()?;
    let exact = solution.boundary();
    let quadrature_order = config.assembly.quadrature_order + 2;
    println!(
        "L2 error:           {:.6e}",
        l2_error(&mesh, &dof_map, &u_h, &exact, quadrature_order)?
    );
    println!(
        "H1 seminorm error:  {:.6e}",
        h1_seminorm_error(&mesh, &dof_map, &u_h, |x: &Point3<f64>| solution.gradient(x), quadrature_order)?
    );
    println!(
        "Max nodal error:    {:.6e}",
        nodal_max_error(&mesh, &dof_map, &u_h, &exact)?
    );
    Ok(())
}
