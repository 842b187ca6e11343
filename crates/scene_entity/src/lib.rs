//! # scene_entity
//!
//! Entity types for the cinematic scene director.
//!
//! A [`WorldEntity`] is a spatial core — position, scale, yaw, and a
//! bounding radius that stays at zero until the entity's visual
//! representation has resolved — plus optional motion and animation
//! components. Scripted events reach entities through the closed
//! [`WorldOp`] operation type.
//!
//! Asset resolution is the only asynchronous boundary: an [`AssetSource`]
//! turns an asset path into an [`AssetFootprint`] (ground-plane extents and
//! animation clips) without the core ever decoding a model itself.

pub mod assets;
pub mod animation;
pub mod entity;
pub mod interp;

pub use assets::{AssetError, AssetFootprint, AssetSource, ClipInfo, ManifestAssets};
pub use animation::{AnimationError, AnimationState, BLEND_SECONDS};
pub use entity::{Motion, OpError, SpatialEntity, WorldEntity, WorldOp};
pub use interp::Interpolation;
