//! Global numbering of degrees of freedom.
//!
//! Lagrange degrees of freedom live on nodes. A node is owned by the lowest-numbered partition
//! among the elements that carry a DOF on it, and DOFs are numbered partition by partition.
//! Consequently every partition owns a contiguous range of global indices.
use crate::fe::FEType;
use crate::mesh::Mesh;
use crate::{AssemblyError, Result};
use log::info;
use nalgebra_sparse::pattern::SparsityPattern;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DofMap {
    fe_type: FEType,
    n_partitions: usize,
    node_dofs: Vec<Option<usize>>,
    element_offsets: Vec<usize>,
    element_dofs: Vec<usize>,
    partition_offsets: Vec<usize>,
}

impl DofMap {
    /// Numbers the degrees of freedom of a Lagrange approximation of the given type on `mesh`.
    pub fn distribute_dofs(mesh: &Mesh, fe_type: FEType) -> Result<Self> {
        let order = fe_type.order;
        let n_partitions = mesh.n_partitions();

        // Number of DOF nodes per element. They always form a prefix of the element's nodes.
        let dofs_per_element = mesh
            .elements()
            .iter()
            .map(|element| {
                let elem_type = element.elem_type();
                elem_type
                    .lagrange_type(order)
                    .map(|dof_type| dof_type.n_nodes())
                    .ok_or(AssemblyError::UnsupportedApproximation { elem_type, order })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut node_owner = vec![usize::MAX; mesh.n_nodes()];
        for (element, &n_dofs) in mesh.elements().iter().zip(&dofs_per_element) {
            for &node in &element.nodes()[..n_dofs] {
                node_owner[node] = node_owner[node].min(element.processor_id());
            }
        }

        let mut node_dofs = vec![None; mesh.n_nodes()];
        let mut partition_offsets = Vec::with_capacity(n_partitions + 1);
        let mut next_dof = 0;
        partition_offsets.push(next_dof);
        for rank in 0..n_partitions {
            for element_index in mesh.local_elements(rank) {
                let element = mesh.element(element_index);
                for &node in &element.nodes()[..dofs_per_element[element_index]] {
                    if node_owner[node] == rank && node_dofs[node].is_none() {
                        node_dofs[node] = Some(next_dof);
                        next_dof += 1;
                    }
                }
            }
            partition_offsets.push(next_dof);
        }

        let mut element_offsets = Vec::with_capacity(mesh.n_elem() + 1);
        let mut element_dofs = Vec::with_capacity(dofs_per_element.iter().sum());
        element_offsets.push(0);
        for (element_index, element) in mesh.elements().iter().enumerate() {
            for &node in &element.nodes()[..dofs_per_element[element_index]] {
                let dof = node_dofs[node].ok_or_else(|| {
                    AssemblyError::InvalidMesh(format!(
                        "node {node} of element {element_index} is owned by no partition"
                    ))
                })?;
                element_dofs.push(dof);
            }
            element_offsets.push(element_dofs.len());
        }

        info!(
            "Distributed {} {} DOFs over {} partition(s)",
            next_dof, fe_type, n_partitions
        );

        Ok(Self {
            fe_type,
            n_partitions,
            node_dofs,
            element_offsets,
            element_dofs,
            partition_offsets,
        })
    }

    /// Global DOF indices of an element in local shape function order.
    pub fn dof_indices(&self, element: usize) -> &[usize] {
        &self.element_dofs[self.element_offsets[element]..self.element_offsets[element + 1]]
    }

    pub fn n_dofs(&self) -> usize {
        self.partition_offsets.last().copied().unwrap_or(0)
    }

    pub fn first_dof(&self, rank: usize) -> usize {
        self.partition_offsets[rank]
    }

    pub fn end_dof(&self, rank: usize) -> usize {
        self.partition_offsets[rank + 1]
    }

    pub fn n_local_dofs(&self, rank: usize) -> usize {
        self.end_dof(rank) - self.first_dof(rank)
    }

    /// The partition owning the given DOF.
    pub fn dof_owner(&self, dof: usize) -> usize {
        assert!(dof < self.n_dofs(), "DOF index out of bounds");
        self.partition_offsets.partition_point(|&offset| offset <= dof) - 1
    }

    /// The DOF attached to a mesh node, if the node carries one.
    pub fn node_dof(&self, node: usize) -> Option<usize> {
        self.node_dofs[node]
    }

    pub fn n_partitions(&self) -> usize {
        self.n_partitions
    }

    /// Number of elements of the mesh the DOFs were distributed on.
    pub fn n_elem(&self) -> usize {
        self.element_offsets.len() - 1
    }

    pub fn fe_type(&self) -> FEType {
        self.fe_type
    }

    /// The sparsity pattern of a matrix coupling all DOFs that share an element.
    pub fn compute_sparsity(&self) -> SparsityPattern {
        // Collecting into a BTreeSet stores each entry once and yields them in row-major order
        let mut matrix_entries = BTreeSet::new();
        for element in 0..self.n_elem() {
            let dofs = self.dof_indices(element);
            for &i in dofs {
                for &j in dofs {
                    matrix_entries.insert((i, j));
                }
            }
        }

        let num_rows = self.n_dofs();
        let mut offsets = Vec::with_capacity(num_rows + 1);
        let mut column_indices = Vec::with_capacity(matrix_entries.len());

        offsets.push(0);
        for (i, j) in matrix_entries {
            // Loop to correctly handle consecutive empty rows
            while i + 1 > offsets.len() {
                offsets.push(column_indices.len());
            }
            column_indices.push(j);
        }
        while offsets.len() < num_rows + 1 {
            offsets.push(column_indices.len());
        }

        SparsityPattern::try_from_offsets_and_indices(num_rows, num_rows, offsets, column_indices)
            .expect("entries are sorted, unique and in bounds by construction")
    }
}
