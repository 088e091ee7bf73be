use crate::quad_and_triangles_mesh;
use femasm::dof_map::DofMap;
use femasm::fe::{FEType, Order};
use femasm::system::{GlobalSystem, LinearSystem};
use femasm::AssemblyError;
use matrixcompare::assert_matrix_eq;
use nalgebra::{dmatrix, dvector, DMatrix, DVector};

fn mixed_system() -> (DofMap, LinearSystem) {
    let mesh = quad_and_triangles_mesh();
    let dof_map = DofMap::distribute_dofs(&mesh, FEType::lagrange(Order::First)).unwrap();
    let system = LinearSystem::new("Poisson", &dof_map);
    (dof_map, system)
}

#[test]
fn new_system_is_zero_and_not_assembled() {
    let (dof_map, system) = mixed_system();
    assert_eq!(system.name(), "Poisson");
    assert_eq!(system.n_dofs(), 6);
    assert_eq!(system.matrix().pattern(), &dof_map.compute_sparsity());
    assert!(system.matrix().values().iter().all(|&v| v == 0.0));
    assert_eq!(system.rhs(), &DVector::zeros(6));
    assert!(!system.is_assembled());
    assert!(matches!(system.solve(), Err(AssemblyError::NotAssembled)));
}

#[test]
fn contributions_are_added_at_global_indices() {
    let (_, mut system) = mixed_system();
    // Triangle 2 has the unsorted global DOFs [1, 5, 2]
    let local = dmatrix![1.0, 2.0, 3.0;
                         4.0, 5.0, 6.0;
                         7.0, 8.0, 9.0];
    let dofs = [1, 5, 2];
    system.add_matrix(&local, &dofs).unwrap();
    system.add_matrix(&local, &dofs).unwrap();
    system.add_vector(&dvector![1.0, 2.0, 3.0], &dofs).unwrap();

    let mut expected = DMatrix::zeros(6, 6);
    for (i, &gi) in dofs.iter().enumerate() {
        for (j, &gj) in dofs.iter().enumerate() {
            expected[(gi, gj)] += 2.0 * local[(i, j)];
        }
    }
    assert_matrix_eq!(DMatrix::from(system.matrix()), expected);
    assert_matrix_eq!(system.rhs().clone(), dvector![0.0, 1.0, 3.0, 0.0, 0.0, 2.0]);
}

#[test]
fn out_of_range_contributions_are_rejected() {
    let (_, mut system) = mixed_system();
    let local = DMatrix::from_element(2, 2, 1.0);
    assert!(matches!(
        system.add_matrix(&local, &[0, 6]),
        Err(AssemblyError::MissingSparsityEntry { row: 6, col: 6 })
    ));
    assert!(matches!(
        system.add_vector(&dvector![1.0, 1.0], &[0, 7]),
        Err(AssemblyError::DimensionMismatch { expected: 6, found: 8 })
    ));
}

#[test]
fn couplings_outside_the_pattern_are_rejected() {
    let (_, mut system) = mixed_system();
    // DOFs 0 and 4 never share an element
    let local = DMatrix::from_element(2, 2, 1.0);
    assert!(matches!(
        system.add_matrix(&local, &[0, 4]),
        Err(AssemblyError::MissingSparsityEntry { row: 0, col: 4 })
    ));
}

#[test]
fn zero_clears_entries() {
    let (_, mut system) = mixed_system();
    system.add_matrix(&DMatrix::identity(3, 3), &[1, 4, 5]).unwrap();
    system.add_vector(&dvector![1.0, 1.0, 1.0], &[1, 4, 5]).unwrap();
    system.zero();
    assert!(system.matrix().values().iter().all(|&v| v == 0.0));
    assert!(system.rhs().iter().all(|&v| v == 0.0));
}

#[test]
fn unassembled_systems_cannot_be_accumulated() {
    let (_, mut system) = mixed_system();
    let (_, other) = mixed_system();
    assert!(matches!(system.accumulate(&other), Err(AssemblyError::NotAssembled)));
}
