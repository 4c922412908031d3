//! Engine interface: how LOD generation reads and writes live meshes.
//!
//! ```text
//!   Engine mesh ──MeshSource──► snapshot ──► worker ──► injector ──LodTarget──► Engine mesh
//!                (read-only)                                      (write)
//! ```
//!
//! - [`MeshSource`] hands out borrowed views of the vertex and index streams.
//!   The borrow is the read lock: engines backed by GPU or locked buffers
//!   implement the trait on a read guard that lives as long as the copy.
//! - [`LodTarget`] receives the generated LOD face lists and selection
//!   values on the main thread.
//! - [`MeshRegistry`] resolves a [`MeshId`] to its live target at injection
//!   time, so completed builds never hold a reference to the mesh.
//!
//! [`Mesh`] is an engine-agnostic implementation of both sides, used by
//! tests and by engines without their own mesh type.

use std::collections::HashMap;

use crate::types::{IndexWidth, LodUsage, MeshId};

mod memory;

pub use memory::{IndexBuffer, Mesh, Submesh, VertexBuffer};

/// Borrowed view of a vertex stream.
#[derive(Clone, Copy, Debug)]
pub struct VertexData<'a> {
  /// Raw interleaved vertex bytes.
  pub bytes: &'a [u8],
  /// Number of vertices in the stream.
  pub vertex_count: usize,
  /// Distance in bytes between consecutive vertices.
  pub vertex_size: usize,
  /// Byte offset of the position element inside a vertex.
  pub position_offset: usize,
  /// Size in bytes of the position element (must be 3 × f32).
  pub position_size: usize,
}

/// Borrowed view of an index stream.
#[derive(Clone, Copy, Debug)]
pub struct IndexData<'a> {
  /// Raw native-endian index bytes.
  pub bytes: &'a [u8],
  /// Element size in bytes (2 or 4 supported).
  pub index_size: usize,
  /// First element used by the submesh.
  pub index_start: usize,
  /// Number of elements used by the submesh.
  pub index_count: usize,
}

/// Borrowed view of one submesh.
#[derive(Clone, Copy, Debug)]
pub struct SubmeshData<'a> {
  /// Indices refer to the mesh's shared vertex stream.
  pub uses_shared_vertices: bool,
  /// Private vertex stream, present when `uses_shared_vertices` is false.
  pub vertices: Option<VertexData<'a>>,
  /// Index stream of the full-detail geometry.
  pub indices: IndexData<'a>,
}

/// Read access to a live mesh.
pub trait MeshSource {
  /// Identifier used to find the mesh again at injection time.
  fn id(&self) -> MeshId;

  /// Name for logging.
  fn name(&self) -> &str;

  /// Number of submeshes.
  fn submesh_count(&self) -> usize;

  /// Vertex stream shared by submeshes that declare it.
  fn shared_vertices(&self) -> Option<VertexData<'_>>;

  /// View of submesh `index` (`index < submesh_count()`).
  fn submesh(&self, index: usize) -> SubmeshData<'_>;
}

/// One LOD level of one submesh as installed on the mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct LodFaceList<B> {
  /// First index used from `index_buffer`.
  pub index_start: usize,
  /// Number of indices. Zero only for submeshes without vertices.
  pub index_count: usize,
  /// GPU index resource; `None` when `index_count` is zero.
  pub index_buffer: Option<B>,
}

/// Write access used by the injector.
///
/// Called only on the thread that owns the mesh (the render thread).
pub trait LodTarget {
  /// Engine index resource type.
  type IndexBuffer;

  /// Number of submeshes the mesh has now.
  fn submesh_count(&self) -> usize;

  /// Drop every installed LOD level (face lists and usage values).
  fn remove_lod_levels(&mut self);

  /// Create an index resource holding `index_count` indices of `width`,
  /// initialised with `bytes`.
  fn create_index_buffer(
    &mut self,
    width: IndexWidth,
    index_count: usize,
    bytes: &[u8],
  ) -> Self::IndexBuffer;

  /// Append the next LOD level's face list to `submesh`.
  fn push_lod_face_list(&mut self, submesh: usize, face_list: LodFaceList<Self::IndexBuffer>);

  /// Install LOD selection values.
  fn configure_lod_usage(&mut self, usage: LodUsage);
}

/// Resolves mesh ids to live meshes at injection time.
///
/// A mesh that is no longer registered is skipped: its owner discarded it
/// while the build was in flight.
pub trait MeshRegistry {
  type Target: LodTarget;

  fn lod_target(&mut self, id: MeshId) -> Option<&mut Self::Target>;
}

impl<T: LodTarget> MeshRegistry for HashMap<MeshId, T> {
  type Target = T;

  fn lod_target(&mut self, id: MeshId) -> Option<&mut T> {
    self.get_mut(&id)
  }
}
