//! Baker: serializes reduced triangle lists into GPU-ready index buffers.

use crate::constants::{DUMMY_TRIANGLE, INDICES_PER_TRIANGLE};
use crate::simplify::{SimplifiedTopology, SubmeshLods};
use crate::types::IndexWidth;

/// Index buffer of one LOD level of one submesh.
#[derive(Clone, Debug, PartialEq)]
pub struct BakedIndexBuffer {
  /// Element width, matching the submesh's original index buffer.
  pub width: IndexWidth,
  pub index_count: usize,
  /// Native-endian elements, `index_count * width.size()` bytes.
  pub bytes: Vec<u8>,
}

impl BakedIndexBuffer {
  pub fn triangle_count(&self) -> usize {
    self.index_count / INDICES_PER_TRIANGLE
  }

  /// Decode the buffer.
  pub fn indices(&self) -> Vec<u32> {
    (0..self.index_count)
      .map(|i| self.width.read(&self.bytes, i))
      .collect()
  }

  pub fn is_empty(&self) -> bool {
    self.index_count == 0
  }
}

/// Bake every level of every submesh, `[submesh][level]`.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "bake::bake"))]
pub fn bake(topology: &SimplifiedTopology) -> Vec<Vec<BakedIndexBuffer>> {
  topology.submeshes.iter().map(bake_submesh).collect()
}

/// Bake the levels of one submesh.
pub fn bake_submesh(lods: &SubmeshLods) -> Vec<BakedIndexBuffer> {
  lods
    .levels
    .iter()
    .map(|triangles| bake_level(triangles, lods.index_width, lods.vertex_count))
    .collect()
}

/// Serialize `triangles` at `width`.
///
/// An empty list becomes a single degenerate `[0, 0, 0]` triangle when the
/// submesh has vertices, since backends reject empty index buffers. Without
/// vertices the empty buffer is kept.
pub fn bake_level(triangles: &[[u32; 3]], width: IndexWidth, vertex_count: usize) -> BakedIndexBuffer {
  let triangles: &[[u32; 3]] = if triangles.is_empty() && vertex_count > 0 {
    &[DUMMY_TRIANGLE]
  } else {
    triangles
  };

  let index_count = triangles.len() * INDICES_PER_TRIANGLE;
  let mut bytes = Vec::with_capacity(index_count * width.size());
  for triangle in triangles {
    for &index in triangle {
      width.write(&mut bytes, index);
    }
  }

  BakedIndexBuffer {
    width,
    index_count,
    bytes,
  }
}

#[cfg(test)]
#[path = "bake_test.rs"]
mod bake_test;
