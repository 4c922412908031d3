//! Test utilities: mesh fixtures shared by the module tests.

use crate::mesh::{IndexBuffer, Mesh, Submesh, VertexBuffer};
use crate::types::{LodConfig, ReductionMethod};

// =============================================================================
// Mesh fixtures
// =============================================================================

/// Unit quad: 4 vertices, 2 triangles, 16-bit indices.
pub fn quad() -> Mesh {
  Mesh::new("quad").with_submesh(Submesh::private(
    VertexBuffer::from_positions(&[
      [0.0, 0.0, 0.0],
      [1.0, 0.0, 0.0],
      [1.0, 1.0, 0.0],
      [0.0, 1.0, 0.0],
    ]),
    IndexBuffer::from_u16(&[0, 1, 2, 0, 2, 3]),
  ))
}

/// Corner positions of the unit cube, index = x + 2y + 4z.
pub const CUBE_CORNERS: [[f32; 3]; 8] = [
  [0.0, 0.0, 0.0],
  [1.0, 0.0, 0.0],
  [0.0, 1.0, 0.0],
  [1.0, 1.0, 0.0],
  [0.0, 0.0, 1.0],
  [1.0, 0.0, 1.0],
  [0.0, 1.0, 1.0],
  [1.0, 1.0, 1.0],
];

/// Outward-wound faces of the cube, two triangles each.
pub const CUBE_FACES: [[u16; 6]; 6] = [
  [0, 2, 1, 1, 2, 3], // -z
  [4, 5, 6, 5, 7, 6], // +z
  [0, 1, 4, 1, 5, 4], // -y
  [2, 6, 3, 3, 6, 7], // +y
  [0, 4, 2, 2, 4, 6], // -x
  [1, 3, 5, 3, 7, 5], // +x
];

/// Cube: 8 shared vertices, one submesh per face, 12 triangles total.
pub fn cube() -> Mesh {
  CUBE_FACES.iter().fold(
    Mesh::new("cube").with_shared_vertices(VertexBuffer::from_positions(&CUBE_CORNERS)),
    |mesh, face| mesh.with_submesh(Submesh::shared(IndexBuffer::from_u16(face))),
  )
}

/// Gently curved `n × n` grid of quads in one private submesh.
///
/// 32-bit indices once the vertex count no longer fits 16 bits.
pub fn grid(n: usize) -> Mesh {
  let side = n + 1;
  let mut positions = Vec::with_capacity(side * side);
  for y in 0..side {
    for x in 0..side {
      let (fx, fy) = (x as f32, y as f32);
      let height = 0.25 * (fx * 0.7).sin() * (fy * 0.45).cos();
      positions.push([fx, fy, height]);
    }
  }

  let mut indices = Vec::with_capacity(n * n * 6);
  for y in 0..n {
    for x in 0..n {
      let i = (y * side + x) as u32;
      let right = i + 1;
      let up = i + side as u32;
      let diagonal = up + 1;
      indices.extend_from_slice(&[i, right, diagonal, i, diagonal, up]);
    }
  }

  let index_buffer = if positions.len() <= u16::MAX as usize {
    let narrow: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
    IndexBuffer::from_u16(&narrow)
  } else {
    IndexBuffer::from_u32(&indices)
  };

  Mesh::new(format!("grid_{n}")).with_submesh(Submesh::private(
    VertexBuffer::from_positions(&positions),
    index_buffer,
  ))
}

/// Two unit quads side by side, each with its own four vertices.
///
/// The shared edge is split (as an attribute seam would be), so the two
/// vertices at x = 1 exist twice by position.
pub fn seam_quads() -> Mesh {
  Mesh::new("seam_quads").with_submesh(Submesh::private(
    VertexBuffer::from_positions(&[
      [0.0, 0.0, 0.0],
      [1.0, 0.0, 0.0],
      [1.0, 1.0, 0.0],
      [0.0, 1.0, 0.0],
      [1.0, 0.0, 0.0],
      [2.0, 0.0, 0.0],
      [2.0, 1.0, 0.0],
      [1.0, 1.0, 0.0],
    ]),
    IndexBuffer::from_u16(&[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]),
  ))
}

/// Submesh with vertices but no indices.
pub fn vertices_only() -> Mesh {
  Mesh::new("vertices_only").with_submesh(Submesh::private(
    VertexBuffer::from_positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
    IndexBuffer::from_u32(&[]),
  ))
}

/// Submesh with neither vertices nor indices.
pub fn empty_submesh() -> Mesh {
  Mesh::new("empty").with_submesh(Submesh::private(
    VertexBuffer::from_positions(&[]),
    IndexBuffer::from_u16(&[]),
  ))
}

// =============================================================================
// Config fixtures
// =============================================================================

/// Single level removing `fraction` of every submesh's triangles.
pub fn single_level(fraction: f32) -> LodConfig {
  LodConfig::new().with_level(10.0, ReductionMethod::Proportional(fraction))
}

/// Three increasingly strict proportional levels.
pub fn three_levels() -> LodConfig {
  LodConfig::new()
    .with_level(10.0, ReductionMethod::Proportional(0.25))
    .with_level(20.0, ReductionMethod::Proportional(0.5))
    .with_level(40.0, ReductionMethod::Proportional(0.8))
}
