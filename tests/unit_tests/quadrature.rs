use femasm::element::ReferenceCell;
use femasm::quadrature::{QuadratureRule, MAX_QUADRATURE_ORDER};
use femasm::AssemblyError;
use matrixcompare::assert_scalar_eq;
use proptest::prelude::*;

/// Exact integral of `x^a y^b z^c` over `[-1, 1]^dim`.
fn hypercube_monomial_integral(dim: usize, exponents: [i32; 3]) -> f64 {
    exponents
        .iter()
        .take(dim)
        .map(|&p| if p % 2 == 1 { 0.0 } else { 2.0 / (p as f64 + 1.0) })
        .product()
}

fn factorial(n: i32) -> f64 {
    (1..=n).map(|k| k as f64).product()
}

/// Exact integral of `x^a y^b z^c` over the reference simplex of dimension `dim`.
fn simplex_monomial_integral(dim: usize, exponents: [i32; 3]) -> f64 {
    let exponents = &exponents[..dim];
    let numerator: f64 = exponents.iter().map(|&p| factorial(p)).product();
    let total: i32 = exponents.iter().sum();
    numerator / factorial(total + dim as i32)
}

#[test]
fn rule_weights_sum_to_reference_volume() {
    let cells = [
        ReferenceCell::Point,
        ReferenceCell::Line,
        ReferenceCell::Quadrilateral,
        ReferenceCell::Hexahedron,
        ReferenceCell::Triangle,
        ReferenceCell::Tetrahedron,
    ];
    for cell in cells {
        for order in [0, 1, 2, 5, 9] {
            let rule = QuadratureRule::gauss_for_cell(cell, order).unwrap();
            let sum: f64 = rule.weights().iter().sum();
            assert_scalar_eq!(sum, cell.volume(), comp = abs, tol = 1e-13);
            assert_eq!(rule.points().len(), rule.n_points());
            assert_eq!(rule.cell(), cell);
            assert_eq!(rule.order(), order);
        }
    }
}

#[test]
fn gauss_rule_of_dimension_zero_is_a_single_point() {
    let rule = QuadratureRule::gauss(0, 5).unwrap();
    assert_eq!(rule.n_points(), 1);
    assert_eq!(rule.weights(), &[1.0]);
    assert_eq!(rule.dim(), 0);
}

#[test]
fn unsupported_rules_are_rejected() {
    let too_high = MAX_QUADRATURE_ORDER + 1;
    assert!(matches!(
        QuadratureRule::gauss(2, too_high),
        Err(AssemblyError::UnsupportedQuadrature { dim: 2, order }) if order == too_high
    ));
    assert!(matches!(
        QuadratureRule::gauss(4, 2),
        Err(AssemblyError::UnsupportedQuadrature { dim: 4, order: 2 })
    ));
    assert!(QuadratureRule::gauss(3, MAX_QUADRATURE_ORDER).is_ok());
}

#[test]
fn points_are_padded_with_zeros() {
    let rule = QuadratureRule::gauss(2, 4).unwrap();
    assert!(rule.points().iter().all(|p| p.z == 0.0));
    let rule = QuadratureRule::gauss_for_cell(ReferenceCell::Line, 4).unwrap();
    assert!(rule.points().iter().all(|p| p.y == 0.0 && p.z == 0.0));
}

proptest! {
    #[test]
    fn hypercube_rules_integrate_polynomials_exactly(
        dim in 1..=3usize,
        (order, exponents) in (0..=12usize).prop_flat_map(|order| {
            let p = order as i32;
            (Just(order), [0..=p, 0..=p, 0..=p])
        })
    ) {
        // Restrict to monomials of total degree <= order
        let mut exponents = exponents;
        let mut remaining = order as i32;
        for (d, p) in exponents.iter_mut().enumerate() {
            *p = if d < dim { (*p).min(remaining) } else { 0 };
            remaining -= *p;
        }
        let rule = QuadratureRule::gauss(dim, order).unwrap();
        let [a, b, c] = exponents;
        let approx = rule.integrate(|x| x.x.powi(a) * x.y.powi(b) * x.z.powi(c));
        let exact = hypercube_monomial_integral(dim, exponents);
        prop_assert!((approx - exact).abs() <= 1e-12, "approx = {}, exact = {}", approx, exact);
    }

    #[test]
    fn simplex_rules_integrate_polynomials_exactly(
        dim in 2..=3usize,
        order in 0..=10usize,
        exponents in [0..=10i32, 0..=10i32, 0..=10i32]
    ) {
        let mut exponents = exponents;
        let mut remaining = order as i32;
        for p in exponents.iter_mut() {
            *p = (*p).min(remaining);
            remaining -= *p;
        }
        if dim == 2 {
            exponents[2] = 0;
        }
        let cell = if dim == 2 { ReferenceCell::Triangle } else { ReferenceCell::Tetrahedron };
        let rule = QuadratureRule::gauss_for_cell(cell, order).unwrap();
        let [a, b, c] = exponents;
        let approx = rule.integrate(|x| x.x.powi(a) * x.y.powi(b) * x.z.powi(c));
        let exact = simplex_monomial_integral(dim, exponents);
        prop_assert!((approx - exact).abs() <= 1e-12, "approx = {}, exact = {}", approx, exact);
    }
}
