//! Discretization error measures for computed solutions.
use crate::assembly::ScalarFunction;
use crate::dof_map::DofMap;
use crate::fe::{BasisValues, FiniteElement};
use crate::mesh::Mesh;
use crate::{AssemblyError, Result};
use nalgebra::{DVector, Point3, Vector3};

fn check_solution(dof_map: &DofMap, solution: &DVector<f64>) -> Result<()> {
    if solution.len() != dof_map.n_dofs() {
        return Err(AssemblyError::DimensionMismatch {
            expected: dof_map.n_dofs(),
            found: solution.len(),
        });
    }
    Ok(())
}

/// Integrates `error(x, u_h(x), ∇u_h(x))` over the mesh.
fn integrate_error(
    mesh: &Mesh,
    dof_map: &DofMap,
    solution: &DVector<f64>,
    quadrature_order: usize,
    error: impl Fn(&Point3<f64>, f64, &Vector3<f64>) -> f64,
) -> Result<f64> {
    check_solution(dof_map, solution)?;
    let mut fe = FiniteElement::build(mesh.dim(), dof_map.fe_type())?;
    fe.attach_quadrature(quadrature_order)?;
    let mut values = BasisValues::new();

    let mut total = 0.0;
    for element in 0..mesh.n_elem() {
        fe.reinit(&mut values, mesh, element)?;
        let dofs = dof_map.dof_indices(element);
        let phi = values.values();
        let dphi = values.gradients();
        for (qp, (jxw, x)) in values
            .integration_weights()
            .iter()
            .zip(values.physical_points())
            .enumerate()
        {
            let mut u_h = 0.0;
            let mut grad_u_h = Vector3::zeros();
            for (i, &dof) in dofs.iter().enumerate() {
                u_h += solution[dof] * phi[(i, qp)];
                grad_u_h += dphi[(i, qp)] * solution[dof];
            }
            total += jxw * error(x, u_h, &grad_u_h);
        }
    }
    Ok(total)
}

/// The L2 norm of `u_h - u`.
pub fn l2_error(
    mesh: &Mesh,
    dof_map: &DofMap,
    solution: &DVector<f64>,
    exact: &impl ScalarFunction,
    quadrature_order: usize,
) -> Result<f64> {
    let squared = integrate_error(mesh, dof_map, solution, quadrature_order, |x, u_h, _| {
        (u_h - exact.evaluate(x)).powi(2)
    })?;
    Ok(squared.sqrt())
}

/// The H1 seminorm of `u_h - u`, given the gradient of the exact solution.
pub fn h1_seminorm_error(
    mesh: &Mesh,
    dof_map: &DofMap,
    solution: &DVector<f64>,
    exact_gradient: impl Fn(&Point3<f64>) -> Vector3<f64>,
    quadrature_order: usize,
) -> Result<f64> {
    let squared = integrate_error(mesh, dof_map, solution, quadrature_order, |x, _, grad_u_h| {
        (grad_u_h - exact_gradient(x)).norm_squared()
    })?;
    Ok(squared.sqrt())
}

/// The largest deviation `|u_h - u|` over all nodes carrying a degree of freedom.
pub fn nodal_max_error(
    mesh: &Mesh,
    dof_map: &DofMap,
    solution: &DVector<f64>,
    exact: &impl ScalarFunction,
) -> Result<f64> {
    check_solution(dof_map, solution)?;
    Ok((0..mesh.n_nodes())
        .filter_map(|node| dof_map.node_dof(node).map(|dof| (node, dof)))
        .map(|(node, dof)| (solution[dof] - exact.evaluate(mesh.node(node))).abs())
        .fold(0.0, f64::max))
}
