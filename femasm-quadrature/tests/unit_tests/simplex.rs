use femasm_quadrature::integrate;
use femasm_quadrature::simplex::{tetrahedron_conical_gauss, triangle_conical_gauss};

use super::factorial;
use matrixcompare::assert_scalar_eq;

#[test]
fn triangle_rules_integrate_monomials_up_to_strength() {
    for strength in 0..=12 {
        let rule = triangle_conical_gauss(strength);
        assert!(rule.0.iter().all(|&w| w > 0.0));
        assert!(rule
            .1
            .iter()
            .all(|&[x, y]| x >= 0.0 && y >= 0.0 && x + y <= 1.0));

        for a in 0..=strength as u32 {
            for b in 0..=(strength as u32 - a) {
                // int_T x^a y^b = a! b! / (a + b + 2)!
                let expected = factorial(a) * factorial(b) / factorial(a + b + 2);
                let estimated = integrate(&rule, |&[x, y]| x.powi(a as i32) * y.powi(b as i32));
                assert_scalar_eq!(estimated, expected, comp = abs, tol = 1e-14);
            }
        }
    }
}

#[test]
fn tetrahedron_rules_integrate_monomials_up_to_strength() {
    for strength in 0..=8 {
        let rule = tetrahedron_conical_gauss(strength);
        assert!(rule.0.iter().all(|&w| w > 0.0));

        for a in 0..=strength as u32 {
            for b in 0..=(strength as u32 - a) {
                for c in 0..=(strength as u32 - a - b) {
                    // int_T x^a y^b z^c = a! b! c! / (a + b + c + 3)!
                    let expected = factorial(a) * factorial(b) * factorial(c) / factorial(a + b + c + 3);
                    let estimated = integrate(&rule, |&[x, y, z]| {
                        x.powi(a as i32) * y.powi(b as i32) * z.powi(c as i32)
                    });
                    assert_scalar_eq!(estimated, expected, comp = abs, tol = 1e-14);
                }
            }
        }
    }
}
