//! # scene_math
//!
//! Math types for the cinematic scene director. Re-exports [`glam`] for
//! linear algebra and defines the ground-plane helpers the placement and
//! entity code share.
//!
//! The world lives on the XZ plane: Y is up, entities sit at y = 0, and all
//! collision reasoning is planar.

// Re-export glam types for convenience.
pub use glam::{Vec2, Vec3};

/// Planar distance between two points, measured on the ground (XZ) plane.
///
/// The Y components are ignored — an entity floating above another still
/// occupies the same footprint.
#[must_use]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Linear interpolation from `start` to `end` with `t` clamped to `[0, 1]`.
#[must_use]
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t.clamp(0.0, 1.0)
}

/// A point on the ground plane (y = 0).
#[must_use]
pub fn ground(x: f32, z: f32) -> Vec3 {
    Vec3::new(x, 0.0, z)
}
