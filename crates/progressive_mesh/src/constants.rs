//! Buffer layout and collapse-cost constants.
//!
//! # Buffer Layout
//!
//! ```text
//! Vertex stream (one element per vertex, `vertex_size` bytes apart):
//!
//!   ┌──────────┬───────────────────────────┬──────────┐
//!   │  ....    │ position: [f32; 3] (12 B) │  ....    │
//!   └──────────┴───────────────────────────┴──────────┘
//!   ^ vertex start   ^ position_offset
//!
//! Index stream (`index_start` elements skipped, then `index_count` elements):
//!
//!   u16: [i0 lo, i0 hi][i1 lo, i1 hi] ...      (2 bytes per index)
//!   u32: [i0 b0..b3][i1 b0..b3] ...            (4 bytes per index)
//! ```
//!
//! Only position data is read; all other vertex attributes are untouched.

/// Size in bytes of a position element (three `f32`).
pub const POSITION_ELEMENT_SIZE: usize = 12;

/// Indices per triangle.
pub const INDICES_PER_TRIANGLE: usize = 3;

/// Maximum number of LOD levels a single configuration may hold.
pub const MAX_LOD_LEVELS: usize = 0xffff;

/// Placeholder triangle substituted for an empty LOD of a non-empty submesh.
///
/// Some render backends fault on zero-length index buffers, so a submesh
/// with vertices always gets at least this degenerate triangle.
pub const DUMMY_TRIANGLE: [u32; 3] = [0, 0, 0];

/// Default collapse-cost tuning values.
///
/// These are tunables, not a contract: changing them only changes which
/// edges are collapsed first.
pub mod cost_defaults {
  /// Lower bound of the curvature term for flat regions.
  pub const MIN_CURVATURE: f32 = 0.001;

  /// Normal-deviation offset, slightly above 1 so coplanar faces stay > 0.
  pub const CURVATURE_BIAS: f32 = 1.002;

  /// Curvature floor when a seam vertex collapses into a non-seam vertex.
  pub const SEAM_TO_PLAIN_FLOOR: f32 = 0.05;

  /// Multiplier when a seam vertex collapses into a non-seam vertex.
  pub const SEAM_TO_PLAIN_PENALTY: f32 = 64.0;

  /// Curvature floor when a seam vertex collapses into another seam vertex.
  pub const SEAM_TO_SEAM_FLOOR: f32 = 0.005;

  /// Multiplier when a seam vertex collapses into another seam vertex.
  pub const SEAM_TO_SEAM_PENALTY: f32 = 8.0;

  /// Curvature floor when a border vertex is pulled off the border.
  pub const BORDER_FLOOR: f32 = 0.1;

  /// Multiplier when a border vertex is pulled off the border.
  pub const BORDER_PENALTY: f32 = 32.0;

  /// Added to the cost for every neighbouring face that would flip.
  pub const FLIP_PENALTY: f32 = 1000.0;
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
