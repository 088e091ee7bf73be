//! Global sparse linear systems and additive scatter of element contributions.
use crate::dof_map::DofMap;
use crate::{AssemblyError, Result};
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::pattern::SparsityPattern;
use nalgebra_sparse::{CscMatrix, CsrMatrix};

/// A target for element contributions.
///
/// Contributions are always added to the existing entries, never written over them, since
/// several elements contribute to every shared degree of freedom.
pub trait GlobalSystem {
    /// Adds the dense `local` matrix at the rows and columns given by `dofs`.
    fn add_matrix(&mut self, local: &DMatrix<f64>, dofs: &[usize]) -> Result<()>;

    /// Adds `local` at the entries given by `dofs`.
    fn add_vector(&mut self, local: &DVector<f64>, dofs: &[usize]) -> Result<()>;

    /// Checks that a contribution coupling all of `dofs` would be accepted, without changing
    /// the system.
    fn check_dofs(&self, dofs: &[usize]) -> Result<()> {
        let _ = dofs;
        Ok(())
    }
}

/// A named linear system `A x = b` with a CSR matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    name: String,
    matrix: CsrMatrix<f64>,
    rhs: DVector<f64>,
    assembled: bool,
    // Local indices sorted by their global index, reused across calls to add_matrix
    sorted_permutation: Vec<usize>,
}

impl LinearSystem {
    /// Creates a zeroed system with the sparsity pattern of the given DOF map.
    pub fn new(name: impl Into<String>, dof_map: &DofMap) -> Self {
        Self::from_pattern(name, dof_map.compute_sparsity())
    }

    pub fn from_pattern(name: impl Into<String>, pattern: SparsityPattern) -> Self {
        let n = pattern.major_dim();
        let values = vec![0.0; pattern.nnz()];
        let matrix = CsrMatrix::try_from_pattern_and_values(pattern, values)
            .expect("number of values matches the pattern by construction");
        Self {
            name: name.into(),
            matrix,
            rhs: DVector::zeros(n),
            assembled: false,
            sorted_permutation: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_dofs(&self) -> usize {
        self.rhs.len()
    }

    pub fn matrix(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    /// Whether the system holds the result of a complete, successful assembly pass.
    pub fn is_assembled(&self) -> bool {
        self.assembled
    }

    /// Zeroes all matrix and vector entries and marks the system as not assembled.
    pub fn zero(&mut self) {
        self.matrix.values_mut().fill(0.0);
        self.rhs.fill(0.0);
        self.assembled = false;
    }

    pub(crate) fn set_assembled(&mut self, assembled: bool) {
        self.assembled = assembled;
    }

    /// Adds the entries of another assembled system with the same sparsity pattern.
    ///
    /// This is how partial systems assembled independently per partition are combined.
    pub fn accumulate(&mut self, other: &LinearSystem) -> Result<()> {
        if !other.assembled {
            return Err(AssemblyError::NotAssembled);
        }
        if self.matrix.pattern() != other.matrix.pattern() {
            return Err(AssemblyError::DimensionMismatch {
                expected: self.matrix.nnz(),
                found: other.matrix.nnz(),
            });
        }
        for (value, other_value) in self.matrix.values_mut().iter_mut().zip(other.matrix.values()) {
            *value += other_value;
        }
        self.rhs += &other.rhs;
        Ok(())
    }

    /// Solves the system with a sparse Cholesky factorization.
    ///
    /// Refuses to solve a system that has not been successfully assembled.
    pub fn solve(&self) -> Result<DVector<f64>> {
        if !self.assembled {
            return Err(AssemblyError::NotAssembled);
        }
        if self.n_dofs() == 0 {
            return Ok(DVector::zeros(0));
        }
        let csc = CscMatrix::from(&self.matrix);
        let cholesky = CscCholesky::factor(&csc).map_err(|err| AssemblyError::Solver(format!("{err:?}")))?;
        let rhs = DMatrix::from_column_slice(self.n_dofs(), 1, self.rhs.as_slice());
        let solution = cholesky.solve(&rhs);
        Ok(DVector::from_column_slice(solution.as_slice()))
    }
}

impl GlobalSystem for LinearSystem {
    fn add_matrix(&mut self, local: &DMatrix<f64>, dofs: &[usize]) -> Result<()> {
        assert_eq!(local.nrows(), dofs.len(), "local matrix must have one row per DOF");
        assert_eq!(local.ncols(), dofs.len(), "local matrix must have one column per DOF");
        let n = self.n_dofs();
        if let Some(&dof) = dofs.iter().find(|&&dof| dof >= n) {
            return Err(AssemblyError::MissingSparsityEntry { row: dof, col: dof });
        }

        self.sorted_permutation.clear();
        self.sorted_permutation.extend(0..dofs.len());
        self.sorted_permutation
            .sort_unstable_by_key(|&local_index| dofs[local_index]);

        for (local_row, &global_row) in dofs.iter().enumerate() {
            let mut csr_row = self.matrix.row_mut(global_row);
            let (column_indices, values) = csr_row.cols_and_values_mut();
            // Columns are visited in ascending global order, so the search through the CSR row
            // only ever moves forward
            let mut csr_columns = column_indices.iter().copied().enumerate();
            for &local_col in &self.sorted_permutation {
                let global_col = dofs[local_col];
                let (csr_index, _) = csr_columns
                    .find(|&(_, col)| col == global_col)
                    .ok_or(AssemblyError::MissingSparsityEntry {
                        row: global_row,
                        col: global_col,
                    })?;
                values[csr_index] += local[(local_row, local_col)];
            }
        }
        Ok(())
    }

    fn check_dofs(&self, dofs: &[usize]) -> Result<()> {
        let n = self.n_dofs();
        for &row in dofs {
            if row >= n {
                return Err(AssemblyError::MissingSparsityEntry { row, col: row });
            }
            let matrix_row = self.matrix.row(row);
            let columns = matrix_row.col_indices();
            if let Some(&col) = dofs.iter().find(|&&col| columns.binary_search(&col).is_err()) {
                return Err(AssemblyError::MissingSparsityEntry { row, col });
            }
        }
        Ok(())
    }

    fn add_vector(&mut self, local: &DVector<f64>, dofs: &[usize]) -> Result<()> {
        assert_eq!(local.len(), dofs.len(), "local vector must have one entry per DOF");
        let n = self.n_dofs();
        for (&dof, value) in dofs.iter().zip(local.iter()) {
            if dof >= n {
                return Err(AssemblyError::DimensionMismatch { expected: n, found: dof + 1 });
            }
            self.rhs[dof] += value;
        }
        Ok(())
    }
}
