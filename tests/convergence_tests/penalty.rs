//! The penalty method only enforces Dirichlet data approximately. The boundary error must vanish
//! as the penalty grows.
use crate::convergence_tests::poisson_mms_common::solve_poisson;
use femasm::assembly::ManufacturedSolution;
use femasm::config::AssemblyConfig;
use femasm::element::ElemType;
use femasm::fe::Order;
use femasm::mesh::procedural::build_cube;
use nalgebra::Point3;

#[test]
fn boundary_error_decreases_with_penalty() -> eyre::Result<()> {
    let mesh = build_cube(2, 4, ElemType::Quad4)?;
    let solution = ManufacturedSolution::new(2, |x: &Point3<f64>| 1.0 + x.x + 2.0 * x.y);
    let boundary_nodes = mesh.boundary_nodes();

    let mut errors = Vec::new();
    for penalty in [1e2, 1e4, 1e6, 1e8] {
        let config = AssemblyConfig::default().with_penalty(penalty);
        let result = solve_poisson(&mesh, Order::First, &solution, config)?;
        let boundary_error = boundary_nodes
            .iter()
            .filter_map(|&node| result.dof_map.node_dof(node).map(|dof| (node, dof)))
            .map(|(node, dof)| (result.u_h[dof] - solution.value(mesh.node(node))).abs())
            .fold(0.0, f64::max);
        errors.push(boundary_error);
    }

    for pair in errors.windows(2) {
        assert!(pair[1] < pair[0], "boundary errors do not decrease: {errors:?}");
    }
    assert!(errors[3] < 1e-4, "boundary errors: {errors:?}");
    Ok(())
}
