//! Core data and configuration types for LOD generation.

use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{cost_defaults, MAX_LOD_LEVELS};
use crate::error::{LodError, LodResult};

// =============================================================================
// Identifiers
// =============================================================================

static MESH_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of a live mesh.
///
/// Generated atomically - guaranteed unique within process lifetime. Engines
/// with their own handles can wrap them via [`MeshId::from_raw`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshId(u64);

impl MeshId {
  /// Generate a new unique MeshId.
  pub fn new() -> Self {
    Self(MESH_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  /// Wrap an engine-provided handle.
  pub const fn from_raw(raw: u64) -> Self {
    Self(raw)
  }

  /// Get the raw ID value.
  pub fn raw(&self) -> u64 {
    self.0
  }
}

impl Default for MeshId {
  fn default() -> Self {
    Self::new()
  }
}

/// Identifier of one submitted build.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RequestId(u64);

impl RequestId {
  /// Allocate the next request id.
  pub fn next() -> Self {
    Self(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  pub fn raw(&self) -> u64 {
    self.0
  }
}

// =============================================================================
// Index width
// =============================================================================

/// Element width of an index buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IndexWidth {
  /// 16-bit indices.
  U16,
  /// 32-bit indices.
  U32,
}

impl IndexWidth {
  /// Map an element size in bytes to a width.
  pub fn from_size(bytes: usize) -> LodResult<Self> {
    match bytes {
      2 => Ok(IndexWidth::U16),
      4 => Ok(IndexWidth::U32),
      other => Err(LodError::UnsupportedIndexWidth(other)),
    }
  }

  /// Element size in bytes.
  #[inline]
  pub const fn size(self) -> usize {
    match self {
      IndexWidth::U16 => 2,
      IndexWidth::U32 => 4,
    }
  }

  /// Decode the `i`-th element of a native-endian index byte buffer.
  #[inline]
  pub fn read(self, bytes: &[u8], i: usize) -> u32 {
    match self {
      IndexWidth::U16 => {
        let at = i * 2;
        u16::from_ne_bytes([bytes[at], bytes[at + 1]]) as u32
      }
      IndexWidth::U32 => {
        let at = i * 4;
        u32::from_ne_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
      }
    }
  }

  /// Append one element in native-endian encoding.
  ///
  /// Values wider than the element are truncated, matching the source
  /// buffer they were read from.
  #[inline]
  pub fn write(self, out: &mut Vec<u8>, value: u32) {
    match self {
      IndexWidth::U16 => out.extend_from_slice(&(value as u16).to_ne_bytes()),
      IndexWidth::U32 => out.extend_from_slice(&value.to_ne_bytes()),
    }
  }
}

// =============================================================================
// LOD configuration
// =============================================================================

/// How the mesh engine measures the value a LOD level is selected by.
///
/// Both variants are distance based; they differ in which bounding volume
/// the engine measures the camera distance to. The value installed on the
/// mesh is the squared distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LodStrategy {
  /// Distance to the bounding sphere.
  #[default]
  DistanceSphere,
  /// Distance to the bounding box.
  DistanceBox,
}

impl LodStrategy {
  /// Convert a user-facing distance into the value the engine compares.
  #[inline]
  pub fn transform_user_value(self, distance: f32) -> f32 {
    match self {
      LodStrategy::DistanceSphere | LodStrategy::DistanceBox => distance * distance,
    }
  }
}

/// Target a LOD level is reduced to.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReductionMethod {
  /// Fraction of every submesh's triangles to remove, in `[0, 1]`.
  /// `0.5` leaves each submesh with at most half of its triangles.
  Proportional(f32),

  /// Number of unique vertices to remove from the whole mesh.
  Constant(usize),

  /// Collapse while the cheapest collapse costs less than this value.
  CollapseCost(f32),
}

impl Default for ReductionMethod {
  fn default() -> Self {
    ReductionMethod::Proportional(0.5)
  }
}

/// One LOD level: the distance it becomes active at and how far to reduce.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LodLevel {
  /// Distance (user value) at which this level is used.
  pub distance: f32,
  /// Reduction target, cumulative over the previous levels.
  pub reduction: ReductionMethod,
}

impl LodLevel {
  pub fn new(distance: f32, reduction: ReductionMethod) -> Self {
    Self {
      distance,
      reduction,
    }
  }

  /// Level removing `fraction` of the triangles of every submesh.
  pub fn proportional(distance: f32, fraction: f32) -> Self {
    Self::new(distance, ReductionMethod::Proportional(fraction))
  }
}

/// LOD configuration for one build.
///
/// Levels must be non-empty, at most [`MAX_LOD_LEVELS`] long and strictly
/// increasing by distance. Each level builds on the previous one, so
/// reductions are cumulative.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LodConfig {
  /// Selection strategy installed on the mesh.
  pub strategy: LodStrategy,
  /// Levels in ascending distance order.
  pub levels: Vec<LodLevel>,
}

impl LodConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_strategy(mut self, strategy: LodStrategy) -> Self {
    self.strategy = strategy;
    self
  }

  pub fn with_level(mut self, distance: f32, reduction: ReductionMethod) -> Self {
    self.levels.push(LodLevel::new(distance, reduction));
    self
  }

  pub fn with_levels(mut self, levels: impl IntoIterator<Item = LodLevel>) -> Self {
    self.levels.extend(levels);
    self
  }

  /// Number of configured levels.
  pub fn level_count(&self) -> usize {
    self.levels.len()
  }

  /// Check the level list.
  ///
  /// Runs in every build profile; [`LodGenerator::build`] calls it before
  /// touching the mesh.
  ///
  /// [`LodGenerator::build`]: crate::generator::LodGenerator::build
  pub fn validate(&self) -> LodResult<()> {
    if self.levels.is_empty() {
      return Err(LodError::EmptyLodLevels);
    }
    if self.levels.len() > MAX_LOD_LEVELS {
      return Err(LodError::TooManyLodLevels {
        count: self.levels.len(),
        max: MAX_LOD_LEVELS,
      });
    }

    for (index, level) in self.levels.iter().enumerate() {
      if !level.distance.is_finite() || level.distance < 0.0 {
        return Err(LodError::InvalidLodDistance {
          index,
          distance: level.distance,
        });
      }

      if index > 0 {
        let previous = self.levels[index - 1].distance;
        if level.distance <= previous {
          return Err(LodError::UnsortedLodLevels {
            index,
            distance: level.distance,
            previous,
          });
        }
      }

      match level.reduction {
        ReductionMethod::Proportional(fraction) => {
          if !(0.0..=1.0).contains(&fraction) {
            return Err(LodError::InvalidReduction {
              index,
              value: fraction,
            });
          }
        }
        ReductionMethod::CollapseCost(limit) => {
          if !(limit >= 0.0) {
            return Err(LodError::InvalidReduction {
              index,
              value: limit,
            });
          }
        }
        ReductionMethod::Constant(_) => {}
      }
    }

    Ok(())
  }

  /// LOD usage metadata to install on the mesh for this configuration.
  pub fn lod_usage(&self) -> LodUsage {
    LodUsage {
      strategy: self.strategy,
      levels: self
        .levels
        .iter()
        .map(|level| LodUsageLevel {
          user_value: level.distance,
          value: self.strategy.transform_user_value(level.distance),
        })
        .collect(),
    }
  }
}

/// Per-level selection values installed on a mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodUsageLevel {
  /// Distance as configured.
  pub user_value: f32,
  /// Strategy-transformed value the engine compares against.
  pub value: f32,
}

/// LOD selection metadata installed on a mesh after injection.
#[derive(Clone, Debug, PartialEq)]
pub struct LodUsage {
  pub strategy: LodStrategy,
  pub levels: Vec<LodUsageLevel>,
}

// =============================================================================
// Collapse cost tuning
// =============================================================================

/// Tunable weights of the edge-collapse cost.
///
/// Only the relative order of costs matters; visual-quality tuning is done
/// here without touching the simplifier.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostParams {
  /// Lower bound of the curvature term.
  pub min_curvature: f32,
  /// Offset subtracted from by the normal dot product (slightly above 1).
  pub curvature_bias: f32,
  /// Curvature floor / multiplier for seam → non-seam collapses.
  pub seam_to_plain: (f32, f32),
  /// Curvature floor / multiplier for seam → seam collapses.
  pub seam_to_seam: (f32, f32),
  /// Curvature floor / multiplier for pulling a border vertex inwards.
  pub border: (f32, f32),
  /// Added per neighbouring face whose normal would flip.
  pub flip_penalty: f32,
  /// Run [`Simplifier::validate`](crate::simplify::Simplifier::validate)
  /// after ingestion and after every LOD level.
  pub validate_topology: bool,
}

impl Default for CostParams {
  fn default() -> Self {
    Self {
      min_curvature: cost_defaults::MIN_CURVATURE,
      curvature_bias: cost_defaults::CURVATURE_BIAS,
      seam_to_plain: (
        cost_defaults::SEAM_TO_PLAIN_FLOOR,
        cost_defaults::SEAM_TO_PLAIN_PENALTY,
      ),
      seam_to_seam: (
        cost_defaults::SEAM_TO_SEAM_FLOOR,
        cost_defaults::SEAM_TO_SEAM_PENALTY,
      ),
      border: (cost_defaults::BORDER_FLOOR, cost_defaults::BORDER_PENALTY),
      flip_penalty: cost_defaults::FLIP_PENALTY,
      validate_topology: cfg!(debug_assertions),
    }
  }
}

impl CostParams {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_min_curvature(mut self, value: f32) -> Self {
    self.min_curvature = value;
    self
  }

  pub fn with_seam_penalties(mut self, to_plain: (f32, f32), to_seam: (f32, f32)) -> Self {
    self.seam_to_plain = to_plain;
    self.seam_to_seam = to_seam;
    self
  }

  pub fn with_border_penalty(mut self, floor: f32, multiplier: f32) -> Self {
    self.border = (floor, multiplier);
    self
  }

  pub fn with_flip_penalty(mut self, penalty: f32) -> Self {
    self.flip_penalty = penalty;
    self
  }

  pub fn with_validation(mut self, validate: bool) -> Self {
    self.validate_topology = validate;
    self
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
