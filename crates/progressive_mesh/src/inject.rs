//! Injector: installs completed builds on live meshes, once per frame.
//!
//! The injector owns the receiving end of the completion channel and runs on
//! the thread that owns the meshes. [`LodInjector::process_frame`] never
//! waits on in-flight work: it takes what has completed, installs it and
//! returns.

use crossbeam_channel::Receiver;
use web_time::Instant;

use crate::error::{LodError, LodResult};
use crate::generator::CompletedBuild;
use crate::mesh::{LodFaceList, LodTarget, MeshRegistry};
use crate::metrics::LodMetrics;
use crate::types::RequestId;

/// Injector state. `Draining` only lasts for the body of
/// [`LodInjector::process_frame`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum InjectorState {
  /// Nothing being drained.
  #[default]
  Idle,
  /// Draining the completion channel for this frame.
  Draining,
}

/// What one [`LodInjector::process_frame`] call did.
#[derive(Debug, Default)]
pub struct FrameReport {
  /// Builds installed on their mesh.
  pub injected: Vec<RequestId>,
  /// Builds whose mesh is no longer registered.
  pub discarded: Vec<RequestId>,
  /// Builds rejected by their mesh. Other builds are unaffected.
  pub failed: Vec<(RequestId, LodError)>,
}

impl FrameReport {
  /// Builds taken from the channel this frame.
  pub fn processed(&self) -> usize {
    self.injected.len() + self.discarded.len() + self.failed.len()
  }

  pub fn is_empty(&self) -> bool {
    self.processed() == 0
  }
}

/// Main-thread end of the LOD pipeline. Created by
/// [`lod_pipeline`](crate::generator::lod_pipeline).
pub struct LodInjector {
  completions: Receiver<CompletedBuild>,
  pub(crate) state: InjectorState,
  metrics: LodMetrics,
}

impl LodInjector {
  pub(crate) fn new(completions: Receiver<CompletedBuild>) -> Self {
    Self {
      completions,
      state: InjectorState::Idle,
      metrics: LodMetrics::new(),
    }
  }

  /// Completed builds waiting for the next frame.
  pub fn queued_count(&self) -> usize {
    self.completions.len()
  }

  pub fn metrics(&self) -> &LodMetrics {
    &self.metrics
  }

  pub fn metrics_mut(&mut self) -> &mut LodMetrics {
    &mut self.metrics
  }

  /// Install every build completed so far.
  ///
  /// Only builds already in the channel when the frame starts are taken, so
  /// a fast worker cannot keep one frame busy.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "inject::process_frame"))]
  pub fn process_frame<R: MeshRegistry + ?Sized>(&mut self, registry: &mut R) -> FrameReport {
    let mut report = FrameReport::default();

    let available = self.completions.len();
    if available == 0 {
      return report;
    }

    self.state = InjectorState::Draining;
    for _ in 0..available {
      let Ok(build) = self.completions.try_recv() else {
        break;
      };
      self.handle(build, registry, &mut report);
    }
    self.state = InjectorState::Idle;

    report
  }

  fn handle<R: MeshRegistry + ?Sized>(
    &mut self,
    build: CompletedBuild,
    registry: &mut R,
    report: &mut FrameReport,
  ) {
    debug_assert_eq!(self.state, InjectorState::Draining);
    let Some(mesh) = registry.lod_target(build.mesh_id) else {
      log::debug!(
        "dropping LOD build {}: mesh '{}' is gone",
        build.request_id.raw(),
        build.mesh_name
      );
      self.metrics.record_discard();
      report.discarded.push(build.request_id);
      return;
    };

    let start = Instant::now();
    match inject(mesh, &build) {
      Ok(()) => {
        let inject_us = start.elapsed().as_micros() as u64;
        log::debug!(
          "installed {} LOD levels on mesh '{}' (built in {}us, injected in {}us)",
          build.level_count(),
          build.mesh_name,
          build.build_time_us,
          inject_us
        );
        self
          .metrics
          .record_injection(build.build_time_us, inject_us, &build.triangles_per_level());
        report.injected.push(build.request_id);
      }
      Err(err) => {
        log::warn!("failed to install LODs on mesh '{}': {err}", build.mesh_name);
        self.metrics.record_failure();
        report.failed.push((build.request_id, err));
      }
    }
  }
}

/// Replace the LOD levels of `mesh` with those of `build`.
///
/// Existing levels are removed first, so injecting the same build again
/// leaves the same result. Zero-length levels get a face list without an
/// index buffer.
pub fn inject<T: LodTarget + ?Sized>(mesh: &mut T, build: &CompletedBuild) -> LodResult<()> {
  let found = mesh.submesh_count();
  if found != build.submesh_count() {
    return Err(LodError::SubmeshCountMismatch {
      expected: build.submesh_count(),
      found,
    });
  }

  mesh.remove_lod_levels();

  for (submesh, levels) in build.submeshes.iter().enumerate() {
    for baked in levels {
      let index_buffer = if baked.index_count > 0 {
        Some(mesh.create_index_buffer(baked.width, baked.index_count, &baked.bytes))
      } else {
        None
      };
      mesh.push_lod_face_list(
        submesh,
        LodFaceList {
          index_start: 0,
          index_count: baked.index_count,
          index_buffer,
        },
      );
    }
  }

  mesh.configure_lod_usage(build.config.lod_usage());
  Ok(())
}

#[cfg(test)]
#[path = "inject_test.rs"]
mod inject_test;
