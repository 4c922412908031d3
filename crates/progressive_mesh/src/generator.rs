//! Work-submission context: validates, snapshots and submits LOD builds.
//!
//! [`lod_pipeline`] wires a [`LodGenerator`] and a [`LodInjector`] to one
//! completion channel. The generator lives wherever builds are requested,
//! the injector on the thread that owns the meshes:
//!
//! ```text
//!   main thread                worker                    main thread
//!   ───────────                ──────                    ───────────
//!   build(mesh, config)
//!     validate + snapshot
//!     submit(job) ──────────►  simplify + bake
//!                              send(CompletedBuild) ──►  process_frame()
//!                                                          try_recv + inject
//! ```
//!
//! No build is cancelled once submitted. If the injector is gone when a
//! build completes, the result is dropped with a warning.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Sender};
use web_time::Instant;

use crate::bake::{bake, BakedIndexBuffer};
use crate::error::LodResult;
use crate::inject::LodInjector;
use crate::mesh::MeshSource;
use crate::simplify::{simplify, LodLevelReport};
use crate::snapshot::{snapshot, BuildRequest};
use crate::threading::WorkQueue;
use crate::types::{CostParams, LodConfig, MeshId, RequestId};

/// Worker output handed to the injector.
///
/// Move-only; dropped by the injector once installed.
#[derive(Debug)]
pub struct CompletedBuild {
  pub request_id: RequestId,
  pub mesh_id: MeshId,
  pub mesh_name: String,
  pub config: LodConfig,
  /// `submeshes[s][l]`: index buffer of level `l` of submesh `s`.
  pub submeshes: Vec<Vec<BakedIndexBuffer>>,
  pub levels: Vec<LodLevelReport>,
  /// Unique vertices of the full-detail mesh.
  pub unique_vertex_count: usize,
  /// Worker time spent on simplify + bake, microseconds.
  pub build_time_us: u64,
}

impl CompletedBuild {
  pub fn submesh_count(&self) -> usize {
    self.submeshes.len()
  }

  pub fn level_count(&self) -> usize {
    self.config.level_count()
  }

  /// Installed triangles per level, over all submeshes.
  pub fn triangles_per_level(&self) -> Vec<usize> {
    (0..self.level_count())
      .map(|level| {
        self
          .submeshes
          .iter()
          .filter_map(|levels| levels.get(level))
          .map(BakedIndexBuffer::triangle_count)
          .sum()
      })
      .collect()
  }
}

/// Simplify and bake one request. Runs on a worker.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "generator::run_build"))]
pub fn run_build(request: BuildRequest, params: &CostParams) -> CompletedBuild {
  let start = Instant::now();

  let topology = simplify(request, params);
  let submeshes = bake(&topology);

  CompletedBuild {
    request_id: topology.request_id,
    mesh_id: topology.mesh_id,
    mesh_name: topology.mesh_name,
    config: topology.config,
    submeshes,
    levels: topology.levels,
    unique_vertex_count: topology.unique_vertex_count,
    build_time_us: start.elapsed().as_micros() as u64,
  }
}

/// Submits LOD builds to a [`WorkQueue`].
#[derive(Clone)]
pub struct LodGenerator {
  queue: Arc<dyn WorkQueue>,
  completions: Sender<CompletedBuild>,
  params: CostParams,
}

impl LodGenerator {
  /// Queue a LOD build of `mesh`.
  ///
  /// Configuration and data-shape problems are returned here and nothing is
  /// submitted. The result reaches the paired [`LodInjector`].
  pub fn build<M: MeshSource + ?Sized>(&self, mesh: &M, config: LodConfig) -> LodResult<RequestId> {
    config.validate()?;

    let id = RequestId::next();
    let request = snapshot(mesh, config, id)?;

    log::debug!(
      "queueing LOD build {} for mesh '{}' ({} levels)",
      id.raw(),
      request.mesh_name,
      request.config.level_count()
    );

    let params = self.params.clone();
    let completions = self.completions.clone();
    self.queue.submit(Box::new(move || {
      let completed = run_build(request, &params);
      if let Err(err) = completions.send(completed) {
        log::warn!(
          "LOD build for mesh '{}' finished after its injector was dropped",
          err.0.mesh_name
        );
      }
    }));

    Ok(id)
  }

  /// Cost tuning applied to every build.
  pub fn params(&self) -> &CostParams {
    &self.params
  }

  /// Builds queued or running.
  pub fn pending_count(&self) -> usize {
    self.queue.pending_count()
  }
}

/// Create a connected generator/injector pair.
pub fn lod_pipeline(queue: Arc<dyn WorkQueue>, params: CostParams) -> (LodGenerator, LodInjector) {
  let (sender, receiver) = unbounded();
  let generator = LodGenerator {
    queue,
    completions: sender,
    params,
  };
  (generator, LodInjector::new(receiver))
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod generator_test;
