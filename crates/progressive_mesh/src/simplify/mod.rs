//! Simplifier: greedy edge-collapse decimation over a [`BuildRequest`].
//!
//! Runs on a worker thread. The request's vertices are deduplicated by
//! position into a single topology shared by every submesh, each vertex gets
//! the cost of collapsing it along its cheapest edge, and the cheapest vertex
//! is collapsed repeatedly until a level's target is met. Levels are reduced
//! in ascending distance order, each starting from the previous one.
//!
//! ```text
//!   ingest ──► compute costs ──► level 0: collapse* ──► snapshot
//!                                level 1: collapse* ──► snapshot
//!                                ...
//! ```
//!
//! Triangles keep the original buffer index of each corner, so the output is
//! expressed in the submesh's own index space and can be baked without
//! touching the vertex buffers.

mod collapse;
mod cost;
mod ingest;
mod validate;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::ops::Range;

use glam::Vec3;
use smallvec::SmallVec;

use crate::snapshot::BuildRequest;
use crate::types::{CostParams, IndexWidth, LodConfig, MeshId, ReductionMethod, RequestId};

pub(crate) type VertexId = u32;
pub(crate) type TriangleId = u32;

// =============================================================================
// Internal topology
// =============================================================================

/// Undirected edge as seen from one endpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Edge {
  pub dst: VertexId,
  /// Live triangles containing both endpoints.
  pub ref_count: u32,
}

/// Unique position in the deduplicated topology.
#[derive(Clone, Debug)]
pub(crate) struct Vertex {
  pub position: Vec3,
  /// Several input vertices share this position.
  pub seam: bool,
  /// Merged into its collapse target; no longer part of the topology.
  pub collapsed: bool,
  pub triangles: SmallVec<[TriangleId; 8]>,
  pub edges: SmallVec<[Edge; 8]>,
  /// Neighbour of the cheapest collapse.
  pub collapse_to: Option<VertexId>,
  /// Key in the cost set while the vertex is collapsible.
  pub cost: Option<f32>,
}

impl Vertex {
  fn new(position: Vec3) -> Self {
    Self {
      position,
      seam: false,
      collapsed: false,
      triangles: SmallVec::new(),
      edges: SmallVec::new(),
      collapse_to: None,
      cost: None,
    }
  }

  /// Some incident edge belongs to a single triangle.
  pub fn is_border(&self) -> bool {
    self.edges.iter().any(|edge| edge.ref_count == 1)
  }
}

#[derive(Clone, Debug)]
pub(crate) struct Triangle {
  pub vertices: [VertexId; 3],
  /// Original buffer index of each corner.
  pub vertex_ids: [u32; 3],
  pub normal: Vec3,
  pub submesh: usize,
  pub removed: bool,
}

impl Triangle {
  #[inline]
  pub fn contains(&self, vertex: VertexId) -> bool {
    self.vertices.contains(&vertex)
  }

  #[inline]
  pub fn corner_of(&self, vertex: VertexId) -> Option<usize> {
    self.vertices.iter().position(|&v| v == vertex)
  }
}

/// Entry of the ordered cost set.
///
/// Ties are broken by vertex id, which is insertion order, so a build is
/// deterministic for a given input.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CostKey {
  pub cost: f32,
  pub vertex: VertexId,
}

impl PartialEq for CostKey {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for CostKey {}

impl PartialOrd for CostKey {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for CostKey {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .cost
      .total_cmp(&other.cost)
      .then(self.vertex.cmp(&other.vertex))
  }
}

/// Per-submesh bookkeeping.
#[derive(Clone, Debug)]
pub(crate) struct SubmeshState {
  pub index_width: IndexWidth,
  /// Vertex count of the buffer the submesh draws from.
  pub vertex_count: usize,
  /// Input triangle count, the base of proportional budgets.
  pub input_triangles: usize,
  pub live_triangles: usize,
  /// Contiguous range of this submesh's triangles.
  pub triangles: Range<usize>,
  /// Original index → vertex. `None` when the shared lookup is used.
  pub lookup: Option<Vec<VertexId>>,
}

// =============================================================================
// Simplifier
// =============================================================================

/// Edge-collapse state of one build.
pub struct Simplifier {
  pub(crate) params: CostParams,
  pub(crate) vertices: Vec<Vertex>,
  pub(crate) triangles: Vec<Triangle>,
  pub(crate) cost_set: BTreeSet<CostKey>,
  pub(crate) submeshes: Vec<SubmeshState>,
  pub(crate) shared_lookup: Vec<VertexId>,
  /// Input vertices read during ingestion. Shared buffers count once.
  pub(crate) ingested_vertex_count: usize,
  pub(crate) collapsed_count: usize,
}

impl Simplifier {
  /// Ingest `request` and compute the initial collapse costs.
  pub fn new(request: &BuildRequest, params: &CostParams) -> Self {
    let mut simplifier = Self::ingest(request, params.clone());

    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("compute_costs").entered();

    for vertex in 0..simplifier.vertices.len() as VertexId {
      simplifier.update_vertex_cost(vertex);
    }
    simplifier
  }

  /// Unique positions after ingestion.
  pub fn unique_vertex_count(&self) -> usize {
    self.vertices.len()
  }

  /// Unique positions not collapsed yet.
  pub fn remaining_vertex_count(&self) -> usize {
    self.vertices.len() - self.collapsed_count
  }

  /// Input vertices read during ingestion.
  pub fn ingested_vertex_count(&self) -> usize {
    self.ingested_vertex_count
  }

  /// Vertices whose position occurs more than once in the input.
  pub fn seam_vertex_count(&self) -> usize {
    self.vertices.iter().filter(|v| v.seam).count()
  }

  pub fn submesh_count(&self) -> usize {
    self.submeshes.len()
  }

  pub fn live_triangle_count(&self, submesh: usize) -> usize {
    self.submeshes[submesh].live_triangles
  }

  pub fn total_live_triangles(&self) -> usize {
    self.submeshes.iter().map(|s| s.live_triangles).sum()
  }

  /// Vertex an original index of `submesh` resolved to.
  pub fn vertex_for_index(&self, submesh: usize, index: u32) -> Option<usize> {
    let lookup = self.submeshes[submesh]
      .lookup
      .as_deref()
      .unwrap_or(&self.shared_lookup);
    lookup.get(index as usize).map(|&v| v as usize)
  }

  pub fn is_seam(&self, vertex: usize) -> bool {
    self.vertices[vertex].seam
  }

  /// Cheapest pending collapse, if any vertex is still collapsible.
  pub fn cheapest_cost(&self) -> Option<f32> {
    self.cost_set.first().map(|key| key.cost)
  }

  /// Collapse until `method`'s target is met or nothing is collapsible.
  ///
  /// Targets are measured against the full-detail input, so successive calls
  /// with stricter targets are cumulative. Returns the number of collapses.
  pub fn reduce(&mut self, method: ReductionMethod) -> usize {
    let before = self.collapsed_count;

    while !self.target_met(method) {
      let Some(&cheapest) = self.cost_set.first() else {
        break;
      };
      if let ReductionMethod::CollapseCost(limit) = method {
        if !(cheapest.cost < limit) {
          break;
        }
      }
      self.collapse(cheapest.vertex);
    }

    self.collapsed_count - before
  }

  fn target_met(&self, method: ReductionMethod) -> bool {
    match method {
      ReductionMethod::Proportional(fraction) => self
        .submeshes
        .iter()
        .all(|s| s.live_triangles <= triangle_budget(s.input_triangles, fraction)),
      ReductionMethod::Constant(count) => {
        self.remaining_vertex_count() <= self.unique_vertex_count().saturating_sub(count)
      }
      ReductionMethod::CollapseCost(_) => false,
    }
  }

  /// Live triangles of `submesh` in original buffer indices, input order.
  pub fn live_triangles(&self, submesh: usize) -> Vec<[u32; 3]> {
    let state = &self.submeshes[submesh];
    let mut out = Vec::with_capacity(state.live_triangles);
    out.extend(
      self.triangles[state.triangles.clone()]
        .iter()
        .filter(|t| !t.removed)
        .map(|t| t.vertex_ids),
    );
    out
  }
}

/// Triangles a submesh may keep after removing `fraction` of `total`.
#[inline]
pub fn triangle_budget(total: usize, fraction: f32) -> usize {
  (total as f64 * (1.0 - fraction as f64)).floor().max(0.0) as usize
}

// =============================================================================
// Output
// =============================================================================

/// Outcome of one LOD level.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LodLevelReport {
  pub distance: f32,
  /// Unique vertices left after the level.
  pub unique_vertex_count: usize,
  /// Live triangles over all submeshes.
  pub triangle_count: usize,
  /// No vertex was collapsed relative to the previous level.
  pub skipped: bool,
}

/// Reduced triangle lists of one submesh.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmeshLods {
  pub index_width: IndexWidth,
  /// Vertex count of the buffer the submesh draws from.
  pub vertex_count: usize,
  /// `levels[l]` holds the triangles of LOD level `l`.
  pub levels: Vec<Vec<[u32; 3]>>,
}

/// Worker output: reduced triangles per submesh per level.
#[derive(Debug)]
pub struct SimplifiedTopology {
  pub request_id: RequestId,
  pub mesh_id: MeshId,
  pub mesh_name: String,
  pub config: LodConfig,
  pub submeshes: Vec<SubmeshLods>,
  pub levels: Vec<LodLevelReport>,
  pub unique_vertex_count: usize,
  pub ingested_vertex_count: usize,
}

/// Simplify `request` into one triangle list per submesh per level.
///
/// Consumes the request: its buffers are released once ingested.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "simplify::simplify"))]
pub fn simplify(request: BuildRequest, params: &CostParams) -> SimplifiedTopology {
  let mut simplifier = Simplifier::new(&request, params);

  let BuildRequest {
    id,
    mesh_id,
    mesh_name,
    config,
    submeshes,
    shared_vertices,
  } = request;
  drop(submeshes);
  drop(shared_vertices);

  if params.validate_topology {
    check_topology(&simplifier, &mesh_name, "ingestion");
  }

  let mut outputs: Vec<SubmeshLods> = simplifier
    .submeshes
    .iter()
    .map(|s| SubmeshLods {
      index_width: s.index_width,
      vertex_count: s.vertex_count,
      levels: Vec::with_capacity(config.level_count()),
    })
    .collect();
  let mut levels = Vec::with_capacity(config.level_count());

  for level in &config.levels {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("reduce_level", distance = level.distance).entered();

    let collapsed = simplifier.reduce(level.reduction);

    if params.validate_topology {
      check_topology(&simplifier, &mesh_name, "reduction");
    }

    for (submesh, output) in outputs.iter_mut().enumerate() {
      output.levels.push(simplifier.live_triangles(submesh));
    }

    let report = LodLevelReport {
      distance: level.distance,
      unique_vertex_count: simplifier.remaining_vertex_count(),
      triangle_count: simplifier.total_live_triangles(),
      skipped: collapsed == 0,
    };
    log::trace!(
      "mesh '{}' level at {}: {} vertices, {} triangles{}",
      mesh_name,
      report.distance,
      report.unique_vertex_count,
      report.triangle_count,
      if report.skipped { " (skipped)" } else { "" }
    );
    levels.push(report);
  }

  SimplifiedTopology {
    request_id: id,
    mesh_id,
    mesh_name,
    config,
    submeshes: outputs,
    levels,
    unique_vertex_count: simplifier.unique_vertex_count(),
    ingested_vertex_count: simplifier.ingested_vertex_count(),
  }
}

fn check_topology(simplifier: &Simplifier, mesh_name: &str, stage: &str) {
  if let Err(err) = simplifier.validate() {
    log::error!("mesh '{mesh_name}': invalid topology after {stage}: {err}");
    debug_assert!(false, "invalid topology after {stage}: {err}");
  }
}
