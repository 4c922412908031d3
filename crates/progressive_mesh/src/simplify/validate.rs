//! Topology invariant checks.

use super::{Simplifier, VertexId};
use crate::error::{LodError, LodResult};

impl Simplifier {
  /// Check the internal topology.
  ///
  /// - live triangles reference three distinct, uncollapsed vertices that
  ///   list them back;
  /// - every vertex only lists live triangles containing it;
  /// - edge reference counts match the live triangles on both endpoints;
  /// - exactly the vertices with edges are in the cost set;
  /// - per-submesh live counts match.
  ///
  /// Cost is linear in the topology size; callable in any build profile.
  pub fn validate(&self) -> LodResult<()> {
    let mut live = vec![0usize; self.submeshes.len()];

    for (t, triangle) in self.triangles.iter().enumerate() {
      if triangle.removed {
        continue;
      }
      live[triangle.submesh] += 1;

      let [a, b, c] = triangle.vertices;
      if a == b || b == c || a == c {
        return Err(invalid(format!("triangle {t} is degenerate: {:?}", triangle.vertices)));
      }
      for v in triangle.vertices {
        let vertex = &self.vertices[v as usize];
        if vertex.collapsed {
          return Err(invalid(format!("triangle {t} references collapsed vertex {v}")));
        }
        if !vertex.triangles.contains(&(t as u32)) {
          return Err(invalid(format!("vertex {v} does not list triangle {t}")));
        }
      }
    }

    for (s, state) in self.submeshes.iter().enumerate() {
      if state.live_triangles != live[s] {
        return Err(invalid(format!(
          "submesh {s} counts {} live triangles, found {}",
          state.live_triangles, live[s]
        )));
      }
    }

    for (v, vertex) in self.vertices.iter().enumerate() {
      let v = v as VertexId;

      if vertex.collapsed && (!vertex.triangles.is_empty() || !vertex.edges.is_empty()) {
        return Err(invalid(format!("collapsed vertex {v} is still connected")));
      }

      for &t in &vertex.triangles {
        let triangle = &self.triangles[t as usize];
        if triangle.removed || !triangle.contains(v) {
          return Err(invalid(format!("vertex {v} lists stale triangle {t}")));
        }
      }

      for edge in &vertex.edges {
        let shared = vertex
          .triangles
          .iter()
          .filter(|&&t| self.triangles[t as usize].contains(edge.dst))
          .count();
        if shared as u32 != edge.ref_count || shared == 0 {
          return Err(invalid(format!(
            "edge {v}-{} counts {} triangles, found {shared}",
            edge.dst, edge.ref_count
          )));
        }

        let back = self.vertices[edge.dst as usize]
          .edges
          .iter()
          .find(|e| e.dst == v)
          .map(|e| e.ref_count);
        if back != Some(edge.ref_count) {
          return Err(invalid(format!("edge {v}-{} is not symmetric", edge.dst)));
        }
      }

      let in_set = vertex.cost.is_some();
      if in_set == vertex.edges.is_empty() {
        return Err(invalid(format!(
          "vertex {v} has {} edges but cost set membership is {in_set}",
          vertex.edges.len()
        )));
      }
    }

    let keyed = self.vertices.iter().filter(|v| v.cost.is_some()).count();
    if keyed != self.cost_set.len() {
      return Err(invalid(format!(
        "cost set holds {} keys for {keyed} keyed vertices",
        self.cost_set.len()
      )));
    }

    Ok(())
  }
}

fn invalid(message: String) -> LodError {
  LodError::InvalidTopology(message)
}
