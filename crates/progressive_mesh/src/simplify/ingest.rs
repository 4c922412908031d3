//! Ingestion: position dedup and triangle construction.

use std::collections::{BTreeSet, HashMap};

use glam::Vec3;

use super::{Edge, Simplifier, SubmeshState, Triangle, TriangleId, Vertex, VertexId};
use crate::snapshot::{BuildRequest, SubmeshVertices, VertexSnapshot};
use crate::types::CostParams;

/// Hash key of a position. `-0.0` and `0.0` map to the same key.
#[inline]
fn position_key(position: Vec3) -> [u32; 3] {
  let bits = |c: f32| if c == 0.0 { 0.0f32.to_bits() } else { c.to_bits() };
  [bits(position.x), bits(position.y), bits(position.z)]
}

#[inline]
pub(crate) fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
  (b - a).cross(c - a).normalize_or_zero()
}

impl Simplifier {
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "simplify::ingest"))]
  pub(super) fn ingest(request: &BuildRequest, params: CostParams) -> Self {
    // Sizing pass: reserve for the worst case (no duplicate positions)
    let shared_count = request
      .shared_vertices
      .as_ref()
      .map_or(0, VertexSnapshot::vertex_count);
    let private_count: usize = request
      .submeshes
      .iter()
      .map(|s| match &s.vertices {
        SubmeshVertices::Private(vertices) => vertices.vertex_count(),
        SubmeshVertices::Shared => 0,
      })
      .sum();
    let vertex_capacity = shared_count + private_count;
    let triangle_capacity: usize = request
      .submeshes
      .iter()
      .map(|s| s.indices.triangle_count())
      .sum();

    let mut simplifier = Self {
      params,
      vertices: Vec::with_capacity(vertex_capacity),
      triangles: Vec::with_capacity(triangle_capacity),
      cost_set: BTreeSet::new(),
      submeshes: Vec::with_capacity(request.submeshes.len()),
      shared_lookup: Vec::new(),
      ingested_vertex_count: 0,
      collapsed_count: 0,
    };
    let mut unique: HashMap<[u32; 3], VertexId> = HashMap::with_capacity(vertex_capacity);
    let mut shared_loaded = false;

    for (submesh, snapshot) in request.submeshes.iter().enumerate() {
      let lookup = match &snapshot.vertices {
        SubmeshVertices::Shared => {
          if !shared_loaded {
            if let Some(shared) = &request.shared_vertices {
              simplifier.shared_lookup = simplifier.add_vertices(shared, &mut unique);
            }
            shared_loaded = true;
          }
          None
        }
        SubmeshVertices::Private(vertices) => Some(simplifier.add_vertices(vertices, &mut unique)),
      };

      let first = simplifier.triangles.len();
      let indices = &snapshot.indices;
      for t in 0..indices.triangle_count() {
        let ids = [indices.get(t * 3), indices.get(t * 3 + 1), indices.get(t * 3 + 2)];
        let table = lookup.as_deref().unwrap_or(&simplifier.shared_lookup);
        let vertices = ids.map(|id| table[id as usize]);
        if vertices[0] == vertices[1] || vertices[1] == vertices[2] || vertices[0] == vertices[2] {
          continue;
        }
        simplifier.add_triangle(vertices, ids, submesh);
      }
      let last = simplifier.triangles.len();

      simplifier.submeshes.push(SubmeshState {
        index_width: indices.width,
        vertex_count: request.submesh_vertex_count(submesh),
        input_triangles: indices.triangle_count(),
        live_triangles: last - first,
        triangles: first..last,
        lookup,
      });
    }

    log::trace!(
      "ingested {} vertices into {} unique ({} seams), {} triangles",
      simplifier.ingested_vertex_count,
      simplifier.vertices.len(),
      simplifier.seam_vertex_count(),
      simplifier.triangles.len()
    );

    simplifier
  }

  /// Insert a vertex buffer into the dedup map, returning its lookup table.
  fn add_vertices(
    &mut self,
    snapshot: &VertexSnapshot,
    unique: &mut HashMap<[u32; 3], VertexId>,
  ) -> Vec<VertexId> {
    self.ingested_vertex_count += snapshot.vertex_count();

    snapshot
      .positions
      .iter()
      .map(|&position| {
        let next = self.vertices.len() as VertexId;
        let id = *unique.entry(position_key(position)).or_insert(next);
        if id == next {
          self.vertices.push(Vertex::new(position));
        } else {
          self.vertices[id as usize].seam = true;
        }
        id
      })
      .collect()
  }

  fn add_triangle(&mut self, vertices: [VertexId; 3], vertex_ids: [u32; 3], submesh: usize) {
    let id = self.triangles.len() as TriangleId;
    let [a, b, c] = vertices.map(|v| self.vertices[v as usize].position);
    self.triangles.push(Triangle {
      vertices,
      vertex_ids,
      normal: face_normal(a, b, c),
      submesh,
      removed: false,
    });

    for v in vertices {
      self.vertices[v as usize].triangles.push(id);
    }
    self.add_edge(vertices[0], vertices[1]);
    self.add_edge(vertices[1], vertices[2]);
    self.add_edge(vertices[2], vertices[0]);
  }

  pub(super) fn add_edge(&mut self, a: VertexId, b: VertexId) {
    for (from, to) in [(a, b), (b, a)] {
      let edges = &mut self.vertices[from as usize].edges;
      match edges.iter_mut().find(|edge| edge.dst == to) {
        Some(edge) => edge.ref_count += 1,
        None => edges.push(Edge {
          dst: to,
          ref_count: 1,
        }),
      }
    }
  }

  pub(super) fn remove_edge(&mut self, a: VertexId, b: VertexId) {
    for (from, to) in [(a, b), (b, a)] {
      let edges = &mut self.vertices[from as usize].edges;
      if let Some(pos) = edges.iter().position(|edge| edge.dst == to) {
        edges[pos].ref_count -= 1;
        if edges[pos].ref_count == 0 {
          edges.remove(pos);
        }
      }
    }
  }
}
