//! Snapshotter: copies a live mesh into a self-contained [`BuildRequest`].
//!
//! Runs synchronously on the main thread. Only positions and indices are
//! copied; the request is independent of the live mesh once this returns.
//! Every data-shape problem is reported here, so a request that reaches a
//! worker is always well formed.

use glam::Vec3;

use crate::constants::POSITION_ELEMENT_SIZE;
use crate::error::{LodError, LodResult};
use crate::mesh::{IndexData, MeshSource, VertexData};
use crate::types::{IndexWidth, LodConfig, MeshId, RequestId};

/// Copied vertex positions.
#[derive(Debug, Default, PartialEq)]
pub struct VertexSnapshot {
  pub positions: Vec<Vec3>,
}

impl VertexSnapshot {
  pub fn vertex_count(&self) -> usize {
    self.positions.len()
  }
}

/// Copied index stream, starting at the submesh's first index.
#[derive(Debug, PartialEq)]
pub struct IndexSnapshot {
  pub width: IndexWidth,
  pub index_count: usize,
  /// Native-endian bytes, `index_count * width.size()` long.
  pub bytes: Vec<u8>,
}

impl IndexSnapshot {
  /// Decode index `i`.
  #[inline]
  pub fn get(&self, i: usize) -> u32 {
    self.width.read(&self.bytes, i)
  }

  pub fn triangle_count(&self) -> usize {
    self.index_count / 3
  }
}

/// Where a submesh's vertices come from.
#[derive(Debug, PartialEq)]
pub enum SubmeshVertices {
  /// The request's shared snapshot.
  Shared,
  /// A private snapshot.
  Private(VertexSnapshot),
}

/// Snapshot of one submesh.
#[derive(Debug, PartialEq)]
pub struct SubmeshSnapshot {
  pub vertices: SubmeshVertices,
  pub indices: IndexSnapshot,
}

impl SubmeshSnapshot {
  pub fn uses_shared_vertices(&self) -> bool {
    matches!(self.vertices, SubmeshVertices::Shared)
  }
}

/// Self-contained, engine-independent input of one LOD build.
///
/// Move-only: owned by the generator, then by the worker job that consumes
/// it. Dropping it on any path releases every buffer.
#[derive(Debug)]
pub struct BuildRequest {
  pub id: RequestId,
  pub mesh_id: MeshId,
  pub mesh_name: String,
  pub config: LodConfig,
  pub submeshes: Vec<SubmeshSnapshot>,
  /// Copied once, however many submeshes share it.
  pub shared_vertices: Option<VertexSnapshot>,
}

impl BuildRequest {
  /// Vertex count of the buffer submesh `index` draws from.
  pub fn submesh_vertex_count(&self, index: usize) -> usize {
    match &self.submeshes[index].vertices {
      SubmeshVertices::Shared => self
        .shared_vertices
        .as_ref()
        .map_or(0, VertexSnapshot::vertex_count),
      SubmeshVertices::Private(vertices) => vertices.vertex_count(),
    }
  }
}

/// Copy `mesh` into a new [`BuildRequest`].
///
/// `config` is expected to be validated already.
pub fn snapshot<M: MeshSource + ?Sized>(
  mesh: &M,
  config: LodConfig,
  id: RequestId,
) -> LodResult<BuildRequest> {
  let submesh_count = mesh.submesh_count();
  let mut submeshes = Vec::with_capacity(submesh_count);
  let mut shared_vertices: Option<VertexSnapshot> = None;

  for i in 0..submesh_count {
    let data = mesh.submesh(i);

    let (vertices, vertex_count) = if data.uses_shared_vertices {
      if shared_vertices.is_none() {
        let shared = mesh
          .shared_vertices()
          .ok_or(LodError::MissingSharedVertices(i))?;
        shared_vertices = Some(copy_vertices(&shared)?);
      }
      let count = shared_vertices
        .as_ref()
        .map_or(0, VertexSnapshot::vertex_count);
      (SubmeshVertices::Shared, count)
    } else {
      let own = data.vertices.ok_or(LodError::MissingVertexData(i))?;
      let copy = copy_vertices(&own)?;
      let count = copy.vertex_count();
      (SubmeshVertices::Private(copy), count)
    };

    let indices = copy_indices(&data.indices)?;
    check_index_range(&indices, i, vertex_count)?;

    submeshes.push(SubmeshSnapshot { vertices, indices });
  }

  log::debug!(
    "snapshot of mesh '{}': {} submeshes, shared vertices: {}",
    mesh.name(),
    submesh_count,
    shared_vertices
      .as_ref()
      .map_or(0, VertexSnapshot::vertex_count)
  );

  Ok(BuildRequest {
    id,
    mesh_id: mesh.id(),
    mesh_name: mesh.name().to_owned(),
    config,
    submeshes,
    shared_vertices,
  })
}

/// Copy the position element of every vertex.
pub fn copy_vertices(data: &VertexData<'_>) -> LodResult<VertexSnapshot> {
  if data.position_size != POSITION_ELEMENT_SIZE {
    return Err(LodError::UnexpectedVertexStride {
      expected: POSITION_ELEMENT_SIZE,
      found: data.position_size,
    });
  }
  if data.vertex_count == 0 {
    return Ok(VertexSnapshot::default());
  }
  if data.vertex_size < data.position_offset + POSITION_ELEMENT_SIZE {
    return Err(LodError::UnexpectedVertexStride {
      expected: data.position_offset + POSITION_ELEMENT_SIZE,
      found: data.vertex_size,
    });
  }

  let required = (data.vertex_count - 1) * data.vertex_size + data.position_offset + POSITION_ELEMENT_SIZE;
  if data.bytes.len() < required {
    return Err(LodError::BufferTooSmall {
      what: "vertex",
      required,
      available: data.bytes.len(),
    });
  }

  let positions = data
    .bytes
    .chunks(data.vertex_size)
    .take(data.vertex_count)
    .map(|vertex| {
      let p = &vertex[data.position_offset..data.position_offset + POSITION_ELEMENT_SIZE];
      Vec3::new(read_f32(&p[0..4]), read_f32(&p[4..8]), read_f32(&p[8..12]))
    })
    .collect();

  Ok(VertexSnapshot { positions })
}

/// Copy the used index range.
pub fn copy_indices(data: &IndexData<'_>) -> LodResult<IndexSnapshot> {
  let width = IndexWidth::from_size(data.index_size)?;
  let start = data.index_start * width.size();
  let len = data.index_count * width.size();
  let required = start + len;

  if data.bytes.len() < required {
    return Err(LodError::BufferTooSmall {
      what: "index",
      required,
      available: data.bytes.len(),
    });
  }

  Ok(IndexSnapshot {
    width,
    index_count: data.index_count,
    bytes: data.bytes[start..required].to_vec(),
  })
}

fn check_index_range(indices: &IndexSnapshot, submesh: usize, vertex_count: usize) -> LodResult<()> {
  for i in 0..indices.index_count {
    let index = indices.get(i);
    if index as usize >= vertex_count {
      return Err(LodError::IndexOutOfRange {
        submesh,
        index,
        vertex_count,
      });
    }
  }
  Ok(())
}

#[inline]
fn read_f32(bytes: &[u8]) -> f32 {
  f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;
