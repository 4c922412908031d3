//! Error types for LOD generation.
//!
//! Errors are grouped by where they are detected:
//!
//! - **Configuration** – bad LOD level lists (rejected before snapshotting)
//!   and meshes whose structure changed while a build was in flight
//!   (rejected at injection).
//! - **Data shape** – vertex/index streams the snapshotter cannot read. A
//!   request failing here is never submitted to a worker.
//! - **Topology** – simplifier invariant violations reported by
//!   [`Simplifier::validate`](crate::simplify::Simplifier::validate).
//! - **Setup** – the worker pool could not be created.
//!
//! Empty submeshes and zero-triangle LODs are not errors; the baker handles
//! them with its dummy-triangle policy.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type LodResult<T> = Result<T, LodError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LodError {
  #[error("LOD configuration has no levels")]
  EmptyLodLevels,

  #[error("LOD configuration has {count} levels, at most {max} are supported")]
  TooManyLodLevels { count: usize, max: usize },

  #[error("LOD distances must be strictly increasing: level {index} has distance {distance}, previous level has {previous}")]
  UnsortedLodLevels {
    index: usize,
    distance: f32,
    previous: f32,
  },

  #[error("LOD level {index} has invalid distance {distance}")]
  InvalidLodDistance { index: usize, distance: f32 },

  #[error("LOD level {index} has invalid reduction value {value}")]
  InvalidReduction { index: usize, value: f32 },

  #[error("mesh has {found} submeshes but the build captured {expected}")]
  SubmeshCountMismatch { expected: usize, found: usize },

  #[error("unexpected position element size: expected {expected} bytes, found {found}")]
  UnexpectedVertexStride { expected: usize, found: usize },

  #[error("unsupported index size of {0} bytes (expected 2 or 4)")]
  UnsupportedIndexWidth(usize),

  #[error("{what} buffer holds {available} bytes but {required} are required")]
  BufferTooSmall {
    what: &'static str,
    required: usize,
    available: usize,
  },

  #[error("submesh {0} uses shared vertices but the mesh has no shared vertex data")]
  MissingSharedVertices(usize),

  #[error("submesh {0} has neither shared nor private vertex data")]
  MissingVertexData(usize),

  #[error("submesh {submesh} references vertex {index} but only {vertex_count} vertices exist")]
  IndexOutOfRange {
    submesh: usize,
    index: u32,
    vertex_count: usize,
  },

  #[error("invalid simplifier topology: {0}")]
  InvalidTopology(String),

  #[error("failed to build worker pool: {0}")]
  WorkerPool(String),
}
