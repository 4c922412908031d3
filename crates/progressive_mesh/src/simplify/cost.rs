//! Collapse cost model.
//!
//! The cost of collapsing `src` into a neighbour is
//!
//! ```text
//!   curvature(src, dst) * |dst - src| + flips * flip_penalty
//! ```
//!
//! where the curvature term measures how far the faces around `src` deviate
//! from the faces that disappear with the edge, raised for border and seam
//! vertices. Every cost is finite: a flipped face is penalised, never
//! forbidden, so any mesh can be reduced down to zero triangles.

use super::{CostKey, Edge, Simplifier, VertexId};
use super::ingest::face_normal;

impl Simplifier {
  /// Cost of collapsing `src` along `edge`.
  pub(crate) fn edge_cost(&self, src: VertexId, edge: &Edge) -> f32 {
    let params = &self.params;
    let source = &self.vertices[src as usize];
    let target = &self.vertices[edge.dst as usize];

    // Faces removed with the edge
    let sides = source
      .triangles
      .iter()
      .map(|&t| &self.triangles[t as usize])
      .filter(|t| t.contains(edge.dst));

    // Largest deviation of any face around src from its closest side face
    let mut curvature = 0.0f32;
    for &t in &source.triangles {
      let normal = self.triangles[t as usize].normal;
      let mut closest = 1.0f32;
      for side in sides.clone() {
        let dot = normal.dot(side.normal);
        closest = closest.min((params.curvature_bias - dot) * 0.5);
      }
      curvature = curvature.max(closest);
    }
    curvature = curvature.max(params.min_curvature);

    // Pulling a border vertex inwards eats into the silhouette
    if edge.ref_count > 1 && source.is_border() {
      let (floor, multiplier) = params.border;
      curvature = curvature.max(floor) * multiplier;
    }

    if source.seam {
      let (floor, multiplier) = if target.seam {
        params.seam_to_seam
      } else {
        params.seam_to_plain
      };
      curvature = curvature.max(floor) * multiplier;
    }

    let length = source.position.distance(target.position);
    let flips = self.count_flips(src, edge.dst);

    curvature * length + flips as f32 * params.flip_penalty
  }

  /// Faces around `src` that would turn over when `src` moves onto `dst`.
  fn count_flips(&self, src: VertexId, dst: VertexId) -> usize {
    let destination = self.vertices[dst as usize].position;

    self.vertices[src as usize]
      .triangles
      .iter()
      .map(|&t| &self.triangles[t as usize])
      .filter(|t| !t.contains(dst))
      .filter(|t| {
        let [a, b, c] = t.vertices.map(|v| {
          if v == src {
            destination
          } else {
            self.vertices[v as usize].position
          }
        });
        face_normal(a, b, c).dot(t.normal) < 0.0
      })
      .count()
  }

  /// Recompute the cheapest collapse of `vertex` and re-key it in the cost
  /// set. Collapsed and isolated vertices leave the set.
  pub(crate) fn update_vertex_cost(&mut self, vertex: VertexId) {
    self.remove_from_cost_set(vertex);

    let v = &self.vertices[vertex as usize];
    if v.collapsed || v.edges.is_empty() {
      self.vertices[vertex as usize].collapse_to = None;
      return;
    }

    let mut best: Option<(f32, VertexId)> = None;
    for edge in &v.edges {
      let cost = self.edge_cost(vertex, edge);
      if best.map_or(true, |(lowest, _)| cost.total_cmp(&lowest).is_lt()) {
        best = Some((cost, edge.dst));
      }
    }

    if let Some((cost, dst)) = best {
      let v = &mut self.vertices[vertex as usize];
      v.collapse_to = Some(dst);
      v.cost = Some(cost);
      self.cost_set.insert(CostKey { cost, vertex });
    }
  }

  pub(crate) fn remove_from_cost_set(&mut self, vertex: VertexId) {
    if let Some(cost) = self.vertices[vertex as usize].cost.take() {
      self.cost_set.remove(&CostKey { cost, vertex });
    }
  }
}
