//! Parallel variants of the assembly loop.
//!
//! Element contributions are independent, so they are computed concurrently with one
//! [`AssemblyWorkspace`] per worker thread. Insertion into the global matrix stays serial and
//! follows element order, which makes the result bit-identical to the serial loop.
use crate::assembly::{AssemblyWorkspace, ElementContribution, EllipticOperator, PoissonAssembler, ScalarFunction};
use crate::dof_map::DofMap;
use crate::mesh::Mesh;
use crate::perf_log::PerfLog;
use crate::system::LinearSystem;
use crate::Result;
use log::debug;
use rayon::prelude::*;
use std::cell::RefCell;
use thread_local::ThreadLocal;

/// A fresh log for a worker, enabled only if the caller's log is.
fn worker_log(enabled: bool, label: &str) -> PerfLog {
    if enabled {
        PerfLog::new(label)
    } else {
        PerfLog::disabled()
    }
}

impl<Op, Source, Boundary> PoissonAssembler<Op, Source, Boundary>
where
    Op: EllipticOperator,
    Source: ScalarFunction,
    Boundary: ScalarFunction,
{
    /// Parallel version of [`assemble`](Self::assemble) with an identical result.
    ///
    /// Elements are processed in chunks of
    /// [`parallel_chunk_size`](crate::config::AssemblyConfig::parallel_chunk_size). Timings
    /// of the worker threads are merged into `perf_log`.
    pub fn assemble_par(
        &self,
        mesh: &Mesh,
        dof_map: &DofMap,
        system: &mut LinearSystem,
        rank: usize,
        perf_log: &mut PerfLog,
    ) -> Result<()> {
        self.run_pass(system, |system| {
            let fe = self.prepare(mesh, dof_map, system, rank)?;
            let elements: Vec<usize> = mesh.local_elements(rank).collect();
            let chunk_size = self.config.parallel_chunk_size.max(1);
            // Bound the number of contributions held in memory at once
            let batch_size = chunk_size * rayon::current_num_threads();
            let workspaces: ThreadLocal<RefCell<AssemblyWorkspace>> = ThreadLocal::new();
            let (log_enabled, log_label) = (perf_log.is_enabled(), perf_log.label().to_string());

            for batch in elements.chunks(batch_size) {
                let chunk_results = batch
                    .par_chunks(chunk_size)
                    .map(|chunk| {
                        let mut workspace = workspaces.get_or_default().borrow_mut();
                        let mut log = worker_log(log_enabled, &log_label);
                        let contributions = chunk
                            .iter()
                            .map(|&element| {
                                self.compute_element(&fe, mesh, dof_map, element, &mut workspace, &mut log)?;
                                Ok(ElementContribution::from_workspace(&workspace))
                            })
                            .collect::<Result<Vec<_>>>()?;
                        Ok((contributions, log))
                    })
                    .collect::<Result<Vec<_>>>()?;

                for (contributions, log) in chunk_results {
                    perf_log.merge(log);
                    for contribution in &contributions {
                        perf_log.measure("matrix insertion", || contribution.scatter_into(system))??;
                    }
                }
            }

            debug!(
                "Assembled {} elements of rank {} in parallel (chunk size {})",
                elements.len(),
                rank,
                chunk_size
            );
            Ok(())
        })
    }

    /// Assembles every partition of the mesh concurrently, each into its own system.
    ///
    /// The returned systems are indexed by rank. Each only contains the contributions of the
    /// partition's own elements; [`LinearSystem::accumulate`] combines them into the global
    /// system.
    pub fn assemble_partitioned(
        &self,
        mesh: &Mesh,
        dof_map: &DofMap,
        perf_log: &mut PerfLog,
    ) -> Result<Vec<LinearSystem>> {
        let pattern = dof_map.compute_sparsity();
        let (log_enabled, log_label) = (perf_log.is_enabled(), perf_log.label().to_string());
        let results = (0..mesh.n_partitions())
            .into_par_iter()
            .map(|rank| {
                let mut system = LinearSystem::from_pattern(self.config.system_name.clone(), pattern.clone());
                let mut log = worker_log(log_enabled, &format!("{log_label} (rank {rank})"));
                self.assemble(mesh, dof_map, &mut system, rank, &mut log)?;
                Ok((system, log))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut systems = Vec::with_capacity(results.len());
        for (system, log) in results {
            perf_log.merge(log);
            systems.push(system);
        }
        Ok(systems)
    }
}
