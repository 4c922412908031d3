//! In-memory mesh implementing both [`MeshSource`] and [`LodTarget`].

use super::{IndexData, LodFaceList, LodTarget, MeshSource, SubmeshData, VertexData};
use crate::constants::POSITION_ELEMENT_SIZE;
use crate::types::{IndexWidth, LodUsage, MeshId};

/// Owned vertex stream.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexBuffer {
  pub bytes: Vec<u8>,
  pub vertex_count: usize,
  pub vertex_size: usize,
  pub position_offset: usize,
  pub position_size: usize,
}

impl VertexBuffer {
  /// Tightly packed position-only stream.
  pub fn from_positions(positions: &[[f32; 3]]) -> Self {
    let mut bytes = Vec::with_capacity(positions.len() * POSITION_ELEMENT_SIZE);
    for p in positions {
      for c in p {
        bytes.extend_from_slice(&c.to_ne_bytes());
      }
    }
    Self {
      bytes,
      vertex_count: positions.len(),
      vertex_size: POSITION_ELEMENT_SIZE,
      position_offset: 0,
      position_size: POSITION_ELEMENT_SIZE,
    }
  }

  /// Interleaved stream with the position element at `position_offset`.
  pub fn interleaved(bytes: Vec<u8>, vertex_size: usize, position_offset: usize) -> Self {
    let vertex_count = if vertex_size == 0 {
      0
    } else {
      bytes.len() / vertex_size
    };
    Self {
      bytes,
      vertex_count,
      vertex_size,
      position_offset,
      position_size: POSITION_ELEMENT_SIZE,
    }
  }

  pub(crate) fn view(&self) -> VertexData<'_> {
    VertexData {
      bytes: &self.bytes,
      vertex_count: self.vertex_count,
      vertex_size: self.vertex_size,
      position_offset: self.position_offset,
      position_size: self.position_size,
    }
  }
}

/// Owned index stream.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexBuffer {
  pub width: IndexWidth,
  pub bytes: Vec<u8>,
  pub index_start: usize,
  pub index_count: usize,
}

impl IndexBuffer {
  pub fn from_u16(indices: &[u16]) -> Self {
    Self::encode(IndexWidth::U16, indices.iter().map(|&i| i as u32), indices.len())
  }

  pub fn from_u32(indices: &[u32]) -> Self {
    Self::encode(IndexWidth::U32, indices.iter().copied(), indices.len())
  }

  /// Wrap raw bytes produced elsewhere (for example a baked LOD buffer).
  pub fn from_bytes(width: IndexWidth, index_count: usize, bytes: &[u8]) -> Self {
    Self {
      width,
      bytes: bytes.to_vec(),
      index_start: 0,
      index_count,
    }
  }

  /// Use only `count` indices starting at element `start`.
  pub fn with_range(mut self, start: usize, count: usize) -> Self {
    self.index_start = start;
    self.index_count = count;
    self
  }

  /// Decode the used index range.
  pub fn indices(&self) -> Vec<u32> {
    (self.index_start..self.index_start + self.index_count)
      .map(|i| self.width.read(&self.bytes, i))
      .collect()
  }

  fn encode(width: IndexWidth, indices: impl Iterator<Item = u32>, count: usize) -> Self {
    let mut bytes = Vec::with_capacity(count * width.size());
    for index in indices {
      width.write(&mut bytes, index);
    }
    Self {
      width,
      bytes,
      index_start: 0,
      index_count: count,
    }
  }

  pub(crate) fn view(&self) -> IndexData<'_> {
    IndexData {
      bytes: &self.bytes,
      index_size: self.width.size(),
      index_start: self.index_start,
      index_count: self.index_count,
    }
  }
}

/// One independently indexed part of a [`Mesh`].
#[derive(Clone, Debug, PartialEq)]
pub struct Submesh {
  /// Private vertices; `None` means the mesh's shared vertices are used.
  pub vertices: Option<VertexBuffer>,
  /// Full-detail indices.
  pub indices: IndexBuffer,
  /// Installed LOD levels, ascending.
  pub lod_face_lists: Vec<LodFaceList<IndexBuffer>>,
}

impl Submesh {
  /// Submesh indexing the mesh's shared vertices.
  pub fn shared(indices: IndexBuffer) -> Self {
    Self {
      vertices: None,
      indices,
      lod_face_lists: Vec::new(),
    }
  }

  /// Submesh with its own vertices.
  pub fn private(vertices: VertexBuffer, indices: IndexBuffer) -> Self {
    Self {
      vertices: Some(vertices),
      indices,
      lod_face_lists: Vec::new(),
    }
  }
}

/// Engine-agnostic render-ready mesh.
#[derive(Clone, Debug)]
pub struct Mesh {
  id: MeshId,
  name: String,
  pub shared_vertices: Option<VertexBuffer>,
  pub submeshes: Vec<Submesh>,
  lod_usage: Option<LodUsage>,
}

impl Mesh {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      id: MeshId::new(),
      name: name.into(),
      shared_vertices: None,
      submeshes: Vec::new(),
      lod_usage: None,
    }
  }

  pub fn with_shared_vertices(mut self, vertices: VertexBuffer) -> Self {
    self.shared_vertices = Some(vertices);
    self
  }

  pub fn with_submesh(mut self, submesh: Submesh) -> Self {
    self.submeshes.push(submesh);
    self
  }

  pub fn submesh_count(&self) -> usize {
    self.submeshes.len()
  }

  /// Installed LOD selection values, if any.
  pub fn lod_usage(&self) -> Option<&LodUsage> {
    self.lod_usage.as_ref()
  }

  /// Number of installed LOD levels (excluding full detail).
  pub fn lod_level_count(&self) -> usize {
    self.lod_usage.as_ref().map_or(0, |usage| usage.levels.len())
  }

  /// Installed face lists of `submesh`.
  pub fn lod_face_lists(&self, submesh: usize) -> &[LodFaceList<IndexBuffer>] {
    &self.submeshes[submesh].lod_face_lists
  }
}

impl MeshSource for Mesh {
  fn id(&self) -> MeshId {
    self.id
  }

  fn name(&self) -> &str {
    &self.name
  }

  fn submesh_count(&self) -> usize {
    self.submeshes.len()
  }

  fn shared_vertices(&self) -> Option<VertexData<'_>> {
    self.shared_vertices.as_ref().map(VertexBuffer::view)
  }

  fn submesh(&self, index: usize) -> SubmeshData<'_> {
    let submesh = &self.submeshes[index];
    SubmeshData {
      uses_shared_vertices: submesh.vertices.is_none(),
      vertices: submesh.vertices.as_ref().map(VertexBuffer::view),
      indices: submesh.indices.view(),
    }
  }
}

impl LodTarget for Mesh {
  type IndexBuffer = IndexBuffer;

  fn submesh_count(&self) -> usize {
    self.submeshes.len()
  }

  fn remove_lod_levels(&mut self) {
    for submesh in &mut self.submeshes {
      submesh.lod_face_lists.clear();
    }
    self.lod_usage = None;
  }

  fn create_index_buffer(
    &mut self,
    width: IndexWidth,
    index_count: usize,
    bytes: &[u8],
  ) -> IndexBuffer {
    IndexBuffer::from_bytes(width, index_count, bytes)
  }

  fn push_lod_face_list(&mut self, submesh: usize, face_list: LodFaceList<IndexBuffer>) {
    self.submeshes[submesh].lod_face_lists.push(face_list);
  }

  fn configure_lod_usage(&mut self, usage: LodUsage) {
    self.lod_usage = Some(usage);
  }
}
