//! Edge collapse.

use smallvec::SmallVec;

use super::ingest::face_normal;
use super::{Simplifier, TriangleId, VertexId};

/// Original-index mapping of a collapsed edge inside one submesh.
#[derive(Clone, Copy, Debug)]
struct CollapsedEdge {
  submesh: usize,
  src_id: u32,
  dst_id: u32,
}

impl Simplifier {
  /// Merge `src` into its collapse target.
  ///
  /// Triangles holding both endpoints are removed. Every other triangle of
  /// `src` is moved onto the target, reusing the target's original index
  /// from a collapsed triangle of the same submesh and corner; a triangle
  /// without such a match is removed so no attribute is stretched across a
  /// seam.
  pub(crate) fn collapse(&mut self, src: VertexId) {
    let Some(dst) = self.vertices[src as usize].collapse_to else {
      self.remove_from_cost_set(src);
      return;
    };

    let neighbours: SmallVec<[VertexId; 16]> = self.vertices[src as usize]
      .edges
      .iter()
      .map(|edge| edge.dst)
      .collect();
    let incident: SmallVec<[TriangleId; 16]> = self.vertices[src as usize]
      .triangles
      .iter()
      .copied()
      .collect();

    let mut collapsed_edges: SmallVec<[CollapsedEdge; 8]> = SmallVec::new();
    for &t in &incident {
      let triangle = &self.triangles[t as usize];
      if let (Some(s), Some(d)) = (triangle.corner_of(src), triangle.corner_of(dst)) {
        collapsed_edges.push(CollapsedEdge {
          submesh: triangle.submesh,
          src_id: triangle.vertex_ids[s],
          dst_id: triangle.vertex_ids[d],
        });
      }
    }

    for &t in &incident {
      let triangle = &self.triangles[t as usize];
      let Some(corner) = triangle.corner_of(src) else {
        continue;
      };
      if triangle.contains(dst) {
        self.remove_triangle(t);
        continue;
      }

      let src_id = triangle.vertex_ids[corner];
      let submesh = triangle.submesh;
      match collapsed_edges
        .iter()
        .find(|edge| edge.submesh == submesh && edge.src_id == src_id)
      {
        Some(edge) => self.move_corner(t, corner, dst, edge.dst_id),
        None => self.remove_triangle(t),
      }
    }

    debug_assert!(self.vertices[src as usize].triangles.is_empty());
    debug_assert!(self.vertices[src as usize].edges.is_empty());

    self.remove_from_cost_set(src);
    let vertex = &mut self.vertices[src as usize];
    vertex.collapsed = true;
    vertex.collapse_to = None;
    self.collapsed_count += 1;

    self.update_vertex_cost(dst);
    for n in neighbours {
      if n != dst {
        self.update_vertex_cost(n);
      }
    }
    let around_dst: SmallVec<[VertexId; 16]> = self.vertices[dst as usize]
      .edges
      .iter()
      .map(|edge| edge.dst)
      .collect();
    for n in around_dst {
      self.update_vertex_cost(n);
    }
  }

  /// Mark `t` removed and detach it from its vertices and edges.
  pub(crate) fn remove_triangle(&mut self, t: TriangleId) {
    let triangle = &mut self.triangles[t as usize];
    if triangle.removed {
      return;
    }
    triangle.removed = true;
    let [a, b, c] = triangle.vertices;
    let submesh = triangle.submesh;

    for v in [a, b, c] {
      let triangles = &mut self.vertices[v as usize].triangles;
      if let Some(pos) = triangles.iter().position(|&other| other == t) {
        triangles.remove(pos);
      }
    }
    self.remove_edge(a, b);
    self.remove_edge(b, c);
    self.remove_edge(c, a);

    self.submeshes[submesh].live_triangles -= 1;
  }

  /// Replace corner `corner` of `t` with `dst`, using original index `dst_id`.
  fn move_corner(&mut self, t: TriangleId, corner: usize, dst: VertexId, dst_id: u32) {
    let triangle = &self.triangles[t as usize];
    let src = triangle.vertices[corner];
    let others = [
      triangle.vertices[(corner + 1) % 3],
      triangle.vertices[(corner + 2) % 3],
    ];

    for other in others {
      self.remove_edge(src, other);
      self.add_edge(dst, other);
    }

    let triangles = &mut self.vertices[src as usize].triangles;
    if let Some(pos) = triangles.iter().position(|&other| other == t) {
      triangles.remove(pos);
    }
    self.vertices[dst as usize].triangles.push(t);

    let triangle = &mut self.triangles[t as usize];
    triangle.vertices[corner] = dst;
    triangle.vertex_ids[corner] = dst_id;
    let [a, b, c] = triangle.vertices;
    let normal = face_normal(
      self.vertices[a as usize].position,
      self.vertices[b as usize].position,
      self.vertices[c as usize].position,
    );
    self.triangles[t as usize].normal = normal;
  }
}
