//! Physics kernels: bilinear forms and scalar data functions.
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// The bilinear form of a scalar second-order elliptic operator.
///
/// `contract` returns the integrand `a(x) ∇φ_i · ∇φ_j`, evaluated for the gradients of two shape
/// functions at the physical point `x`.
pub trait EllipticOperator: Sync {
    fn contract(&self, x: &Point3<f64>, grad_i: &Vector3<f64>, grad_j: &Vector3<f64>) -> f64;
}

/// The Laplace operator `-Δu`, with bilinear form `∫ ∇u · ∇v`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LaplaceOperator;

impl EllipticOperator for LaplaceOperator {
    fn contract(&self, _x: &Point3<f64>, grad_i: &Vector3<f64>, grad_j: &Vector3<f64>) -> f64 {
        grad_i.dot(grad_j)
    }
}

/// The diffusion operator `-∇ · (k ∇u)` with a constant coefficient `k`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DiffusionOperator {
    pub coefficient: f64,
}

impl EllipticOperator for DiffusionOperator {
    fn contract(&self, _x: &Point3<f64>, grad_i: &Vector3<f64>, grad_j: &Vector3<f64>) -> f64 {
        self.coefficient * grad_i.dot(grad_j)
    }
}

/// A scalar field evaluated at physical points, used for forcing terms and boundary data.
pub trait ScalarFunction: Sync {
    fn evaluate(&self, x: &Point3<f64>) -> f64;
}

impl<F> ScalarFunction for F
where
    F: Fn(&Point3<f64>) -> f64 + Sync,
{
    fn evaluate(&self, x: &Point3<f64>) -> f64 {
        self(x)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Constant(pub f64);

impl ScalarFunction for Constant {
    fn evaluate(&self, _x: &Point3<f64>) -> f64 {
        self.0
    }
}

/// Step used for the finite difference derivatives of manufactured solutions.
pub const FINITE_DIFFERENCE_STEP: f64 = 1e-3;

/// A known exact solution of `-Δu = f`, from which the forcing `f` is derived numerically.
///
/// The forcing is a second-order central finite difference approximation of `-Δu` at the
/// evaluation point, taken along the first `dim` axes.
#[derive(Debug, Clone)]
pub struct ManufacturedSolution<F> {
    dim: usize,
    exact: F,
    eps: f64,
}

impl<F: ScalarFunction> ManufacturedSolution<F> {
    pub fn new(dim: usize, exact: F) -> Self {
        Self {
            dim,
            exact,
            eps: FINITE_DIFFERENCE_STEP,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The exact solution at `x`. This is also the Dirichlet boundary value.
    pub fn value(&self, x: &Point3<f64>) -> f64 {
        self.exact.evaluate(x)
    }

    /// Central finite difference approximation of `-Δu(x)`.
    pub fn forcing(&self, x: &Point3<f64>) -> f64 {
        let eps = self.eps;
        let u = self.exact.evaluate(x);
        let mut laplacian = 0.0;
        for d in 0..self.dim {
            let mut offset = Vector3::zeros();
            offset[d] = eps;
            let u_minus = self.exact.evaluate(&(x - offset));
            let u_plus = self.exact.evaluate(&(x + offset));
            laplacian += (u_minus + u_plus - 2.0 * u) / eps / eps;
        }
        -laplacian
    }

    /// Central finite difference approximation of `∇u(x)`.
    pub fn gradient(&self, x: &Point3<f64>) -> Vector3<f64> {
        let eps = self.eps;
        let mut gradient = Vector3::zeros();
        for d in 0..self.dim {
            let mut offset = Vector3::zeros();
            offset[d] = eps;
            gradient[d] = (self.exact.evaluate(&(x + offset)) - self.exact.evaluate(&(x - offset))) / (2.0 * eps);
        }
        gradient
    }

    /// The forcing term as a standalone function.
    pub fn source(&self) -> impl ScalarFunction + '_ {
        move |x: &Point3<f64>| self.forcing(x)
    }

    /// The boundary data as a standalone function.
    pub fn boundary(&self) -> impl ScalarFunction + '_ {
        move |x: &Point3<f64>| self.value(x)
    }
}

/// `u = cos(πx/2) sin(πy/2) cos(πz/2)`, the classic Poisson benchmark on `[-1, 1]^d`.
pub fn cosine_sine_solution(x: &Point3<f64>) -> f64 {
    (0.5 * PI * x.x).cos() * (0.5 * PI * x.y).sin() * (0.5 * PI * x.z).cos()
}

impl ManufacturedSolution<fn(&Point3<f64>) -> f64> {
    /// The manufactured solution [`cosine_sine_solution`] in the given dimension.
    pub fn cosine_sine(dim: usize) -> Self {
        Self::new(dim, cosine_sine_solution as fn(&Point3<f64>) -> f64)
    }
}
