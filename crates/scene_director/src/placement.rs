//! Spawn-position search.
//!
//! Online rejection sampling: draw a uniform planar candidate, test it
//! against everything already placed, retry up to a fixed ceiling. There is
//! no backtracking — an exhausted search means the caller skips that
//! instance, never that population fails.

use rand::Rng;
use scene_math::{Vec3, ground, planar_distance};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Attempt ceiling for the radius-aware search.
pub const RADIUS_AWARE_ATTEMPTS: usize = 50;

/// Attempt ceiling for the fixed-distance search.
pub const FIXED_DISTANCE_ATTEMPTS: usize = 100;

/// Axis-aligned rectangle on the ground plane that candidates are drawn
/// from. The vertical axis is fixed to ground level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl SpawnBounds {
    fn sample(&self, rng: &mut impl Rng) -> Vec3 {
        ground(
            sample_axis(self.min_x, self.max_x, rng),
            sample_axis(self.min_z, self.max_z, rng),
        )
    }
}

/// A degenerate axis (`min >= max`) pins the coordinate to `min` instead of
/// panicking on an empty range, so a line- or point-shaped rectangle is
/// still a valid sampling region.
fn sample_axis(min: f32, max: f32, rng: &mut impl Rng) -> f32 {
    if min < max { rng.gen_range(min..max) } else { min }
}

/// Live record of occupied positions and their bounding radii.
///
/// Each population stage extends the index as its entities resolve, so later
/// stages sample against everything placed before them.
#[derive(Debug, Default)]
pub struct OccupancyIndex {
    entries: Vec<(Vec3, f32)>,
}

impl OccupancyIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an occupant. A zero radius (unresolved or footprint-less
    /// entity) excludes nothing.
    pub fn record(&mut self, position: Vec3, radius: f32) {
        self.entries.push((position, radius));
    }

    /// Number of recorded occupants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn clear_of(&self, candidate: Vec3) -> bool {
        self.entries
            .iter()
            .all(|&(position, radius)| planar_distance(candidate, position) >= radius)
    }
}

/// Radius-aware spawn search.
///
/// A candidate is accepted iff its planar distance to every occupant is at
/// least that occupant's own radius. The new entity's eventual radius is
/// unknown at candidate time and deliberately not summed in; the attempt
/// ceiling is tuned around that tolerance.
///
/// Returns `None` after [`RADIUS_AWARE_ATTEMPTS`] rejected candidates.
pub fn find_spawn_position(
    occupancy: &OccupancyIndex,
    bounds: SpawnBounds,
    rng: &mut impl Rng,
) -> Option<Vec3> {
    for _ in 0..RADIUS_AWARE_ATTEMPTS {
        let candidate = bounds.sample(rng);
        if occupancy.clear_of(candidate) {
            return Some(candidate);
        }
    }
    warn!(
        attempts = RADIUS_AWARE_ATTEMPTS,
        occupants = occupancy.len(),
        "no clear spawn position found"
    );
    None
}

/// Fixed-distance spawn search against raw positions.
///
/// Serves generic placement where no per-object radius exists: every
/// existing position excludes the same `min_distance`. The sampling
/// rectangle is centred on the origin with the given width and depth.
///
/// Returns `None` after [`FIXED_DISTANCE_ATTEMPTS`] rejected candidates.
pub fn find_position_avoiding(
    existing: &[Vec3],
    width: f32,
    depth: f32,
    min_distance: f32,
    rng: &mut impl Rng,
) -> Option<Vec3> {
    let bounds = SpawnBounds {
        min_x: -width / 2.0,
        max_x: width / 2.0,
        min_z: -depth / 2.0,
        max_z: depth / 2.0,
    };
    for _ in 0..FIXED_DISTANCE_ATTEMPTS {
        let candidate = bounds.sample(rng);
        if existing
            .iter()
            .all(|&position| planar_distance(candidate, position) >= min_distance)
        {
            return Some(candidate);
        }
    }
    warn!(
        attempts = FIXED_DISTANCE_ATTEMPTS,
        min_distance, "no position clear of the avoid list"
    );
    None
}
