//! Unstructured meshes with side connectivity and partition ownership.
use crate::element::ElemType;
use crate::{AssemblyError, Result};
use itertools::Itertools;
use log::info;
use nalgebra::{Point3, Vector3};
use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};

pub mod procedural;

/// What lies across a side of an element.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SideNeighbor {
    /// The side is shared with the element of the given index.
    Interior(usize),
    /// The side lies on the domain boundary.
    Boundary,
}

impl SideNeighbor {
    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    elem_type: ElemType,
    nodes: Vec<usize>,
    neighbors: Vec<SideNeighbor>,
    processor_id: usize,
}

impl Element {
    pub fn elem_type(&self) -> ElemType {
        self.elem_type
    }

    /// Global node indices in local node order.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    pub fn neighbor(&self, side: usize) -> SideNeighbor {
        self.neighbors[side]
    }

    pub fn neighbors(&self) -> &[SideNeighbor] {
        &self.neighbors
    }

    pub fn on_boundary(&self) -> bool {
        self.neighbors.iter().any(SideNeighbor::is_boundary)
    }

    /// The partition that owns this element.
    pub fn processor_id(&self) -> usize {
        self.processor_id
    }
}

/// Strategies for assigning elements to partitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partitioner {
    /// Contiguous blocks of element indices.
    Linear,
    /// Contiguous blocks of elements sorted lexicographically by centroid.
    Centroid,
}

/// A mesh of dimension 1, 2 or 3.
///
/// Node coordinates are stored as 3D points whose coordinates beyond the mesh dimension are
/// zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    dim: usize,
    nodes: Vec<Point3<f64>>,
    elements: Vec<Element>,
    n_partitions: usize,
}

impl Mesh {
    /// Builds a mesh from nodes and element connectivity and computes side neighbors.
    ///
    /// All elements start out owned by partition 0.
    pub fn from_nodes_and_connectivity(
        dim: usize,
        nodes: Vec<Point3<f64>>,
        connectivity: Vec<(ElemType, Vec<usize>)>,
    ) -> Result<Self> {
        if !(1..=3).contains(&dim) {
            return Err(AssemblyError::InvalidMesh(format!("unsupported mesh dimension {dim}")));
        }

        let mut elements = Vec::with_capacity(connectivity.len());
        for (index, (elem_type, elem_nodes)) in connectivity.into_iter().enumerate() {
            if elem_type.dim() != dim {
                return Err(AssemblyError::DimensionMismatch {
                    expected: dim,
                    found: elem_type.dim(),
                });
            }
            if elem_nodes.len() != elem_type.n_nodes() {
                return Err(AssemblyError::InvalidMesh(format!(
                    "element {index} of type {elem_type} has {} nodes, expected {}",
                    elem_nodes.len(),
                    elem_type.n_nodes()
                )));
            }
            if let Some(&node) = elem_nodes.iter().find(|&&node| node >= nodes.len()) {
                return Err(AssemblyError::InvalidMesh(format!(
                    "element {index} references node {node}, but the mesh has {} nodes",
                    nodes.len()
                )));
            }
            elements.push(Element {
                elem_type,
                nodes: elem_nodes,
                neighbors: vec![SideNeighbor::Boundary; elem_type.n_sides()],
                processor_id: 0,
            });
        }

        let mut mesh = Self {
            dim,
            nodes,
            elements,
            n_partitions: 1,
        };
        mesh.find_neighbors()?;
        Ok(mesh)
    }

    /// Matches element sides by their (sorted) vertex indices.
    fn find_neighbors(&mut self) -> Result<()> {
        let mut sides: FxHashMap<Vec<usize>, Vec<(usize, usize)>> = FxHashMap::default();
        for (element_index, element) in self.elements.iter().enumerate() {
            for side in 0..element.elem_type.n_sides() {
                let key = element
                    .elem_type
                    .side_vertices(side)
                    .iter()
                    .map(|&local| element.nodes[local])
                    .sorted()
                    .collect_vec();
                sides.entry(key).or_default().push((element_index, side));
            }
        }

        for (vertices, owners) in sides {
            match owners.as_slice() {
                [_] => {}
                &[(a, side_a), (b, side_b)] => {
                    self.elements[a].neighbors[side_a] = SideNeighbor::Interior(b);
                    self.elements[b].neighbors[side_b] = SideNeighbor::Interior(a);
                }
                _ => {
                    return Err(AssemblyError::InvalidMesh(format!(
                        "side with vertices {vertices:?} is shared by {} elements",
                        owners.len()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_elem(&self) -> usize {
        self.elements.len()
    }

    pub fn node(&self, index: usize) -> &Point3<f64> {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[Point3<f64>] {
        &self.nodes
    }

    pub fn element(&self, index: usize) -> &Element {
        &self.elements[index]
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn n_partitions(&self) -> usize {
        self.n_partitions
    }

    /// Indices of the elements owned by the given partition, in increasing order.
    pub fn local_elements(&self, rank: usize) -> impl Iterator<Item = usize> + '_ {
        self.elements
            .iter()
            .positions(move |element| element.processor_id == rank)
    }

    pub fn n_local_elements(&self, rank: usize) -> usize {
        self.local_elements(rank).count()
    }

    pub fn centroid(&self, element: usize) -> Point3<f64> {
        let element = &self.elements[element];
        let vertices = &element.nodes[..element.elem_type.n_vertices()];
        let sum: Vector3<f64> = vertices.iter().map(|&node| self.nodes[node].coords).sum();
        Point3::from(sum / vertices.len() as f64)
    }

    /// Nodes lying on at least one boundary side, sorted.
    pub fn boundary_nodes(&self) -> Vec<usize> {
        self.elements
            .iter()
            .flat_map(|element| {
                (0..element.elem_type.n_sides())
                    .filter(|&side| element.neighbors[side].is_boundary())
                    .flat_map(|side| {
                        element
                            .elem_type
                            .side_nodes(side)
                            .iter()
                            .map(|&local| element.nodes[local])
                    })
            })
            .sorted()
            .dedup()
            .collect()
    }

    /// Assigns every element to one of `n_partitions` partitions.
    ///
    /// Partitions receive contiguous, balanced blocks of elements in the order given by the
    /// partitioner. With more partitions than elements, some partitions are empty.
    pub fn partition(&mut self, partitioner: Partitioner, n_partitions: usize) -> Result<()> {
        if n_partitions == 0 {
            return Err(AssemblyError::InvalidMesh(
                "a mesh needs at least one partition".to_string(),
            ));
        }

        let order: Vec<usize> = match partitioner {
            Partitioner::Linear => (0..self.n_elem()).collect(),
            Partitioner::Centroid => (0..self.n_elem())
                .map(|element| {
                    let c = self.centroid(element);
                    ((OrderedFloat(c.x), OrderedFloat(c.y), OrderedFloat(c.z)), element)
                })
                .sorted()
                .map(|(_, element)| element)
                .collect(),
        };

        let n_elem = self.n_elem();
        for (position, element) in order.into_iter().enumerate() {
            self.elements[element].processor_id = position * n_partitions / n_elem;
        }
        self.n_partitions = n_partitions;

        info!(
            "Partitioned {} elements into {} partitions ({:?})",
            n_elem, n_partitions, partitioner
        );
        Ok(())
    }
}

impl Display for Mesh {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, " Mesh Information:")?;
        writeln!(f, "  mesh_dimension()={}", self.dim)?;
        writeln!(f, "  n_nodes()={}", self.n_nodes())?;
        writeln!(f, "  n_elem()={}", self.n_elem())?;
        writeln!(f, "  n_partitions()={}", self.n_partitions)?;
        let mut counts = BTreeMap::new();
        for element in &self.elements {
            *counts.entry(element.elem_type.to_string()).or_insert(0usize) += 1;
        }
        for (elem_type, count) in counts {
            writeln!(f, "   {elem_type}: {count}")?;
        }
        Ok(())
    }
}
