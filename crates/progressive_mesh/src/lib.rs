//! progressive_mesh - Engine independent progressive-mesh LOD generation
//!
//! Computes simplified versions of a triangle mesh on a worker thread with a
//! greedy edge-collapse algorithm, then installs them on the live mesh from
//! the render thread without stalling it.
//!
//! # Pipeline
//!
//! - **Snapshot** ([`snapshot`]): copies positions and indices of a live mesh
//!   into a self-contained [`BuildRequest`] on the calling thread.
//! - **Simplify** ([`simplify`]): deduplicates vertices by position and
//!   collapses the cheapest edges until every LOD level's target is met.
//! - **Bake** ([`bake`]): serializes each level into an index buffer at the
//!   submesh's original index width.
//! - **Inject** ([`inject`]): drains completed builds once per frame and
//!   replaces the mesh's LOD levels.
//!
//! Engines plug in through [`MeshSource`], [`LodTarget`] and
//! [`MeshRegistry`]; [`Mesh`] is an in-memory implementation.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use progressive_mesh::{lod_pipeline, CostParams, LodConfig, RayonWorkQueue, ReductionMethod};
//!
//! let (generator, mut injector) =
//!     lod_pipeline(Arc::new(RayonWorkQueue::global()), CostParams::default());
//!
//! let config = LodConfig::new()
//!     .with_level(20.0, ReductionMethod::Proportional(0.5))
//!     .with_level(50.0, ReductionMethod::Proportional(0.8));
//! generator.build(&meshes[&id], config)?;
//!
//! // Once per frame, on the render thread:
//! let report = injector.process_frame(&mut meshes);
//! ```

pub mod bake;
pub mod constants;
pub mod error;
pub mod generator;
pub mod inject;
pub mod mesh;
pub mod metrics;
pub mod simplify;
pub mod snapshot;
pub mod threading;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used items
pub use bake::{bake, BakedIndexBuffer};
pub use error::{LodError, LodResult};
pub use generator::{lod_pipeline, run_build, CompletedBuild, LodGenerator};
pub use inject::{inject, FrameReport, LodInjector};
pub use mesh::{
  IndexBuffer, IndexData, LodFaceList, LodTarget, Mesh, MeshRegistry, MeshSource, Submesh,
  SubmeshData, VertexBuffer, VertexData,
};
pub use metrics::LodMetrics;
pub use simplify::{simplify, LodLevelReport, SimplifiedTopology, Simplifier};
pub use snapshot::{snapshot, BuildRequest};
pub use threading::{InlineWorkQueue, RayonWorkQueue, WorkQueue, WorkerConfig};
pub use types::{
  CostParams, IndexWidth, LodConfig, LodLevel, LodStrategy, LodUsage, LodUsageLevel, MeshId,
  ReductionMethod, RequestId,
};
