use femasm::element::{ElemType, ReferenceCell, ALL_ELEM_TYPES};
use femasm::fe::Order;
use matrixcompare::assert_scalar_eq;
use nalgebra::{Point3, Vector3};
use proptest::prelude::*;

/// Points in the reference cell of the given element type.
fn point_in_reference_cell(elem_type: ElemType) -> impl Strategy<Value = Point3<f64>> {
    let r = -1.0..=1.0f64;
    let u = 0.0..=1.0f64;
    match elem_type.reference_cell() {
        ReferenceCell::Point => Just(Point3::origin()).boxed(),
        ReferenceCell::Line => r.prop_map(|x| Point3::new(x, 0.0, 0.0)).boxed(),
        ReferenceCell::Quadrilateral => [r.clone(), r]
            .prop_map(|[x, y]| Point3::new(x, y, 0.0))
            .boxed(),
        ReferenceCell::Hexahedron => [r.clone(), r.clone(), r]
            .prop_map(|[x, y, z]| Point3::new(x, y, z))
            .boxed(),
        // Fold the unit square (cube) onto the simplex by scaling with the remaining room
        ReferenceCell::Triangle => [u.clone(), u]
            .prop_map(|[a, b]| Point3::new(a, b * (1.0 - a), 0.0))
            .boxed(),
        ReferenceCell::Tetrahedron => [u.clone(), u.clone(), u]
            .prop_map(|[a, b, c]| {
                let y = b * (1.0 - a);
                Point3::new(a, y, c * (1.0 - a - y))
            })
            .boxed(),
    }
}

fn elem_type_and_point() -> impl Strategy<Value = (ElemType, Point3<f64>)> {
    proptest::sample::select(ALL_ELEM_TYPES.to_vec())
        .prop_flat_map(|elem_type| (Just(elem_type), point_in_reference_cell(elem_type)))
}

proptest! {
    #[test]
    fn shape_functions_form_partition_of_unity((elem_type, xi) in elem_type_and_point()) {
        let mut values = vec![0.0; elem_type.n_nodes()];
        elem_type.populate_shape_values(&xi, &mut values);
        let sum: f64 = values.iter().sum();
        prop_assert!((sum - 1.0).abs() <= 1e-12);
    }

    #[test]
    fn shape_function_gradients_sum_to_zero((elem_type, xi) in elem_type_and_point()) {
        // Since the sum of basis functions is 1, the sum of the gradients must be 0
        let mut gradients = vec![Vector3::zeros(); elem_type.n_nodes()];
        elem_type.populate_shape_gradients(&xi, &mut gradients);
        let sum: Vector3<f64> = gradients.iter().sum();
        prop_assert!(sum.norm() <= 1e-12);
    }

    #[test]
    fn shape_function_gradients_match_finite_differences((elem_type, xi) in elem_type_and_point()) {
        let n = elem_type.n_nodes();
        let h = 1e-6;
        let mut gradients = vec![Vector3::zeros(); n];
        elem_type.populate_shape_gradients(&xi, &mut gradients);

        let mut plus = vec![0.0; n];
        let mut minus = vec![0.0; n];
        for d in 0..elem_type.dim() {
            let mut offset = Vector3::zeros();
            offset[d] = h;
            elem_type.populate_shape_values(&(xi + offset), &mut plus);
            elem_type.populate_shape_values(&(xi - offset), &mut minus);
            for i in 0..n {
                let fd = (plus[i] - minus[i]) / (2.0 * h);
                prop_assert!((fd - gradients[i][d]).abs() <= 1e-6);
            }
        }
    }
}

#[test]
fn node_and_side_counts() {
    let expected = [
        (ElemType::Edge2, 2, 2, 2),
        (ElemType::Edge3, 3, 2, 2),
        (ElemType::Tri3, 3, 3, 3),
        (ElemType::Tri6, 6, 3, 3),
        (ElemType::Quad4, 4, 4, 4),
        (ElemType::Quad9, 9, 4, 4),
        (ElemType::Tet4, 4, 4, 4),
        (ElemType::Tet10, 10, 4, 4),
        (ElemType::Hex8, 8, 8, 6),
        (ElemType::Hex27, 27, 8, 6),
    ];
    for (elem_type, n_nodes, n_vertices, n_sides) in expected {
        assert_eq!(elem_type.n_nodes(), n_nodes, "{elem_type}");
        assert_eq!(elem_type.n_vertices(), n_vertices, "{elem_type}");
        assert_eq!(elem_type.n_sides(), n_sides, "{elem_type}");
    }
}

#[test]
fn lagrange_types_follow_geometry() {
    assert_eq!(ElemType::Quad9.lagrange_type(Order::First), Some(ElemType::Quad4));
    assert_eq!(ElemType::Quad9.lagrange_type(Order::Second), Some(ElemType::Quad9));
    assert_eq!(ElemType::Hex27.lagrange_type(Order::First), Some(ElemType::Hex8));
    assert_eq!(ElemType::Tet10.lagrange_type(Order::First), Some(ElemType::Tet4));
    assert_eq!(ElemType::Tri6.lagrange_type(Order::First), Some(ElemType::Tri3));
    assert_eq!(ElemType::Edge3.lagrange_type(Order::First), Some(ElemType::Edge2));
    assert_eq!(ElemType::Quad4.lagrange_type(Order::Second), None);
    assert_eq!(ElemType::Tet4.lagrange_type(Order::Second), None);
}

#[test]
fn side_types_match_side_node_counts() {
    for elem_type in ALL_ELEM_TYPES {
        for side in 0..elem_type.n_sides() {
            let n_side_nodes = elem_type.side_type().map(|t| t.n_nodes()).unwrap_or(1);
            assert_eq!(elem_type.side_nodes(side).len(), n_side_nodes);
            // Vertices of a side are vertices of the element
            for &v in elem_type.side_vertices(side) {
                assert!(v < elem_type.n_vertices());
            }
        }
    }
}

#[test]
fn hex27_side_centres_are_face_centres() {
    let expected_normals = [
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(0.0, -1.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(-1.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
    ];
    for (side, normal) in expected_normals.iter().enumerate() {
        let centre_node = ElemType::Hex27.side_nodes(side)[8];
        let centre = ElemType::Hex27.reference_node(centre_node);
        assert_scalar_eq!((centre.coords - normal).norm(), 0.0, comp = abs, tol = 1e-14);
    }
}

#[test]
fn reference_cell_volumes() {
    assert_eq!(ElemType::Quad9.reference_cell().volume(), 4.0);
    assert_eq!(ElemType::Tri6.reference_cell().volume(), 0.5);
    assert_eq!(ElemType::Hex8.reference_cell().volume(), 8.0);
    assert_scalar_eq!(ElemType::Tet4.reference_cell().volume(), 1.0 / 6.0, comp = abs, tol = 1e-15);
    assert_eq!(ElemType::Edge3.side_reference_cell(), ReferenceCell::Point);
    assert_eq!(ElemType::Tet10.side_reference_cell(), ReferenceCell::Triangle);
}
