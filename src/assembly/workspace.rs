//! Reusable per-element scratch buffers for the assembly loop.
use crate::assembly::operators::{EllipticOperator, ScalarFunction};
use crate::dof_map::DofMap;
use crate::fe::{BasisValues, FiniteElement};
use crate::mesh::Mesh;
use crate::Result;
use nalgebra::{DMatrix, DVector};

/// Scratch state for computing the contribution of one element at a time.
///
/// Buffers are resized, not reallocated, when consecutive elements have different numbers of
/// degrees of freedom.
#[derive(Debug, Clone)]
pub struct AssemblyWorkspace {
    volume: BasisValues,
    side: BasisValues,
    dofs: Vec<usize>,
    element_matrix: DMatrix<f64>,
    element_vector: DVector<f64>,
}

impl Default for AssemblyWorkspace {
    fn default() -> Self {
        Self {
            volume: BasisValues::new(),
            side: BasisValues::new(),
            dofs: Vec::new(),
            element_matrix: DMatrix::zeros(0, 0),
            element_vector: DVector::zeros(0),
        }
    }
}

impl AssemblyWorkspace {
    /// Global DOF indices of the current element.
    pub fn dofs(&self) -> &[usize] {
        &self.dofs
    }

    pub fn element_matrix(&self) -> &DMatrix<f64> {
        &self.element_matrix
    }

    pub fn element_vector(&self) -> &DVector<f64> {
        &self.element_vector
    }

    /// Fetches the element's DOFs, evaluates the basis and zeroes the local matrix and vector.
    pub fn init_element(&mut self, fe: &FiniteElement, mesh: &Mesh, dof_map: &DofMap, element: usize) -> Result<()> {
        self.dofs.clear();
        self.dofs.extend_from_slice(dof_map.dof_indices(element));
        fe.reinit(&mut self.volume, mesh, element)?;
        debug_assert_eq!(self.volume.n_shape_functions(), self.dofs.len());

        let n = self.dofs.len();
        self.element_matrix.resize_mut(n, n, 0.0);
        self.element_matrix.fill(0.0);
        self.element_vector.resize_vertically_mut(n, 0.0);
        self.element_vector.fill(0.0);
        Ok(())
    }

    /// Adds `∫ a(∇φ_i, ∇φ_j)` to the local matrix.
    pub fn add_stiffness(&mut self, operator: &impl EllipticOperator) {
        let dphi = self.volume.gradients();
        let n = dphi.nrows();
        for (qp, (jxw, x)) in self
            .volume
            .integration_weights()
            .iter()
            .zip(self.volume.physical_points())
            .enumerate()
        {
            for i in 0..n {
                for j in 0..n {
                    self.element_matrix[(i, j)] += jxw * operator.contract(x, &dphi[(i, qp)], &dphi[(j, qp)]);
                }
            }
        }
    }

    /// Adds `∫ f φ_i` to the local vector.
    pub fn add_source(&mut self, source: &impl ScalarFunction) {
        let phi = self.volume.values();
        for (qp, (jxw, x)) in self
            .volume
            .integration_weights()
            .iter()
            .zip(self.volume.physical_points())
            .enumerate()
        {
            let f = source.evaluate(x);
            for i in 0..phi.nrows() {
                self.element_vector[i] += jxw * f * phi[(i, qp)];
            }
        }
    }

    /// Adds the penalty terms `β ∫ φ_i φ_j` and `β ∫ g φ_i` on every boundary side of the
    /// element.
    pub fn add_boundary_penalty(
        &mut self,
        fe: &FiniteElement,
        mesh: &Mesh,
        element: usize,
        boundary: &impl ScalarFunction,
        penalty: f64,
    ) -> Result<()> {
        let neighbors = mesh.element(element).neighbors();
        for (side, neighbor) in neighbors.iter().enumerate() {
            if !neighbor.is_boundary() {
                continue;
            }
            fe.reinit_side(&mut self.side, mesh, element, side)?;
            let phi = self.side.values();
            let n = phi.nrows();
            for (qp, (jxw, x)) in self
                .side
                .integration_weights()
                .iter()
                .zip(self.side.physical_points())
                .enumerate()
            {
                let value = boundary.evaluate(x);
                for i in 0..n {
                    for j in 0..n {
                        self.element_matrix[(i, j)] += jxw * penalty * phi[(i, qp)] * phi[(j, qp)];
                    }
                    self.element_vector[i] += jxw * penalty * value * phi[(i, qp)];
                }
            }
        }
        Ok(())
    }
}
