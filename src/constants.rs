//! Centralized defaults for dungeon-forge.
//!
//! Eliminates magic numbers duplicated across config defaults and the
//! generation stages. Per-module constants that are only meaningful to one
//! stage stay local to that module.

// =====================================================
// Config defaults
// =====================================================

/// Default fraction of extra edges added beyond a spanning tree.
pub const DEFAULT_BRANCHING_FACTOR: f32 = 0.3;

/// Minimum room count accepted by any graph algorithm.
pub const MIN_ROOM_COUNT: usize = 2;

// =====================================================
// Spatial solver
// =====================================================

/// Search radius at which the nearby-placement fallback gives up.
pub const DEFAULT_MAX_PLACEMENT_RADIUS: i32 = 12;

/// First radius tried by the nearby-placement fallback (spec §4.5: `2..max_radius`).
pub const NEARBY_PLACEMENT_START_RADIUS: i32 = 2;

// =====================================================
// Difficulty scaling
// =====================================================

/// Default floor on per-room difficulty.
pub const DEFAULT_DIFFICULTY_BASE: f32 = 1.0;

/// Default linear/exponential scaling factor.
pub const DEFAULT_DIFFICULTY_FACTOR: f32 = 0.5;

/// Default difficulty ceiling.
pub const DEFAULT_MAX_DIFFICULTY: f32 = 10.0;

// =====================================================
// Clustering
// =====================================================

/// Default maximum centroid distance for two rooms to cluster together.
pub const DEFAULT_CLUSTER_EPSILON: f32 = 4.0;

/// Default minimum cluster size kept after clique discovery.
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 2;
