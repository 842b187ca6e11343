//! World entities.
//!
//! Every populated object is a [`WorldEntity`]: a spatial core plus optional
//! motion and animation components. Scenery (rocks, cacti, the tent) is
//! spatial only; the train moves but carries no clips; the horse and rider
//! carry both.
//!
//! An entity's bounding radius is zero until [`WorldEntity::resolve`] runs —
//! before that the entity must not take part in collision checks, and its
//! per-tick update is a no-op.

use scene_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::animation::{AnimationError, AnimationState};
use crate::assets::AssetFootprint;
use crate::interp::Interpolation;

fn default_speed_duration() -> f32 {
    2.0
}

fn default_rotation_duration() -> f32 {
    1.0
}

/// Operations a scripted event can apply to an entity.
///
/// The operation set is closed: scripts are checked against it at
/// deserialization time, only the target category remains a runtime lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WorldOp {
    /// Cross-fade to a named animation clip.
    SetAnimation {
        clip: String,
        #[serde(default)]
        play_once: bool,
    },
    /// Interpolate the movement speed to `speed` over `duration` seconds.
    SetSpeed {
        speed: f32,
        #[serde(default = "default_speed_duration")]
        duration: f32,
    },
    /// Interpolate the yaw to `radians` over `duration` seconds.
    SetRotation {
        radians: f32,
        #[serde(default = "default_rotation_duration")]
        duration: f32,
    },
}

/// Errors from applying a [`WorldOp`] to an entity.
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    /// The entity carries no animation clips.
    #[error("entity has no animation component")]
    NotAnimated,

    /// The entity has no motion component.
    #[error("entity has no motion component")]
    Immobile,

    /// The clip name was not found in the entity's clip table.
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

/// Core spatial state shared by every world entity.
#[derive(Debug, Clone)]
pub struct SpatialEntity {
    position: Vec3,
    /// Planar collision radius; 0 until the visual representation resolves.
    bounding_radius: f32,
    scale: f32,
    /// Yaw around the vertical axis, in radians.
    rotation: f32,
    loaded: bool,
}

impl SpatialEntity {
    /// Create an unresolved entity at `position`.
    #[must_use]
    pub fn new(position: Vec3, scale: f32) -> Self {
        Self {
            position,
            bounding_radius: 0.0,
            scale,
            rotation: 0.0,
            loaded: false,
        }
    }

    /// World-space position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Bounding radius on the ground plane. Zero until resolved.
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    /// Uniform scale applied to the visual representation.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Yaw in radians.
    #[must_use]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Whether the visual representation has resolved.
    #[must_use]
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    /// Mark the entity resolved, deriving its radius from the footprint's
    /// half extents scaled by the entity's own scale.
    pub fn resolve(&mut self, footprint: &AssetFootprint) {
        self.bounding_radius = footprint.bounding_radius() * self.scale;
        self.loaded = true;
    }
}

/// Ground-plane motion: movement along +X with interpolated speed and yaw.
#[derive(Debug, Clone, Default)]
pub struct Motion {
    speed: f32,
    speed_interp: Option<Interpolation>,
    rotation_interp: Option<Interpolation>,
}

impl Motion {
    #[must_use]
    fn new(speed: f32) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }
}

/// A populated world object: spatial core plus optional components.
#[derive(Debug, Clone)]
pub struct WorldEntity {
    spatial: SpatialEntity,
    motion: Option<Motion>,
    /// Clip the entity starts in once its asset resolves.
    default_clip: Option<String>,
    animation: Option<AnimationState>,
}

impl WorldEntity {
    /// Static scenery: no motion, no animation.
    #[must_use]
    pub fn fixed(position: Vec3, scale: f32) -> Self {
        Self {
            spatial: SpatialEntity::new(position, scale),
            motion: None,
            default_clip: None,
            animation: None,
        }
    }

    /// A moving entity without animation clips (the train).
    #[must_use]
    pub fn moving(position: Vec3, scale: f32, speed: f32) -> Self {
        Self {
            spatial: SpatialEntity::new(position, scale),
            motion: Some(Motion::new(speed)),
            default_clip: None,
            animation: None,
        }
    }

    /// An animated entity starting in `default_clip` once resolved.
    #[must_use]
    pub fn animated(position: Vec3, scale: f32, speed: f32, default_clip: &str) -> Self {
        Self {
            spatial: SpatialEntity::new(position, scale),
            motion: Some(Motion::new(speed)),
            default_clip: Some(default_clip.to_string()),
            animation: None,
        }
    }

    /// Set the yaw directly, bypassing interpolation. Used at spawn time.
    #[must_use]
    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.spatial.rotation = radians;
        self
    }

    /// World-space position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.spatial.position()
    }

    /// Planar bounding radius; zero until resolved.
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        self.spatial.bounding_radius()
    }

    /// Whether the asset has resolved.
    #[must_use]
    pub fn loaded(&self) -> bool {
        self.spatial.loaded()
    }

    /// Yaw in radians.
    #[must_use]
    pub fn rotation(&self) -> f32 {
        self.spatial.rotation()
    }

    /// Current movement speed, or 0 for static entities.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.motion.as_ref().map_or(0.0, |motion| motion.speed)
    }

    /// Name of the active animation clip, if the entity is animated.
    #[must_use]
    pub fn current_clip(&self) -> Option<&str> {
        self.animation.as_ref().map(AnimationState::current)
    }

    /// Read access to the animation state, if any.
    #[must_use]
    pub fn animation(&self) -> Option<&AnimationState> {
        self.animation.as_ref()
    }

    /// Complete asset resolution: derive the bounding radius and, for
    /// animated entities, bind the clip table.
    pub fn resolve(&mut self, footprint: &AssetFootprint) {
        self.spatial.resolve(footprint);
        if let Some(clip) = &self.default_clip {
            if !footprint.clips.is_empty() {
                self.animation = Some(AnimationState::new(&footprint.clips, clip));
            }
        }
    }

    /// Per-tick update. A no-op until the asset has resolved; with `dt == 0`
    /// nothing changes.
    pub fn update(&mut self, dt: f32) {
        if !self.spatial.loaded {
            return;
        }
        if let Some(motion) = self.motion.as_mut() {
            if let Some(interp) = motion.speed_interp.as_mut() {
                motion.speed = interp.advance(dt);
                if interp.finished() {
                    motion.speed_interp = None;
                }
            }
            if let Some(interp) = motion.rotation_interp.as_mut() {
                self.spatial.rotation = interp.advance(dt);
                if interp.finished() {
                    motion.rotation_interp = None;
                }
            }
            self.spatial.position.x += motion.speed * dt;
        }
        if let Some(animation) = self.animation.as_mut() {
            animation.update(dt);
        }
    }

    /// Apply a scripted operation.
    ///
    /// Starting a speed or rotation change replaces any interpolation already
    /// running on that field.
    ///
    /// # Errors
    ///
    /// Returns an [`OpError`] when the entity lacks the component the
    /// operation targets, or when the clip name is unknown.
    pub fn apply(&mut self, op: &WorldOp) -> Result<(), OpError> {
        match op {
            WorldOp::SetAnimation { clip, play_once } => {
                let animation = self.animation.as_mut().ok_or(OpError::NotAnimated)?;
                animation.set_clip(clip, *play_once)?;
                Ok(())
            }
            WorldOp::SetSpeed { speed, duration } => {
                let motion = self.motion.as_mut().ok_or(OpError::Immobile)?;
                motion.speed_interp = Some(Interpolation::new(motion.speed, *speed, *duration));
                Ok(())
            }
            WorldOp::SetRotation { radians, duration } => {
                let motion = self.motion.as_mut().ok_or(OpError::Immobile)?;
                motion.rotation_interp =
                    Some(Interpolation::new(self.spatial.rotation, *radians, *duration));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ClipInfo;
    use scene_math::ground;

    fn animated_footprint() -> AssetFootprint {
        AssetFootprint {
            half_width: 0.6,
            half_depth: 1.4,
            clips: vec![
                ClipInfo {
                    name: "idle".to_string(),
                    duration: 2.0,
                },
                ClipInfo {
                    name: "gallop".to_string(),
                    duration: 1.0,
                },
            ],
        }
    }

    #[test]
    fn test_radius_zero_until_resolved() {
        let mut entity = WorldEntity::fixed(ground(1.0, 2.0), 3.0);
        assert_eq!(entity.bounding_radius(), 0.0);
        assert!(!entity.loaded());

        entity.resolve(&AssetFootprint {
            half_width: 2.0,
            half_depth: 1.0,
            clips: Vec::new(),
        });
        // max(half extents) * scale
        assert_eq!(entity.bounding_radius(), 6.0);
        assert!(entity.loaded());
    }

    #[test]
    fn test_update_is_a_no_op_before_resolution() {
        let mut entity = WorldEntity::moving(ground(0.0, 0.0), 1.0, 10.0);
        entity.update(1.0);
        assert_eq!(entity.position(), ground(0.0, 0.0));
    }

    #[test]
    fn test_resolved_entity_moves_along_x() {
        let mut entity = WorldEntity::moving(ground(5.0, -1.0), 1.0, 4.0);
        entity.resolve(&AssetFootprint::default());
        entity.update(0.5);
        assert_eq!(entity.position(), Vec3::new(7.0, 0.0, -1.0));
    }

    #[test]
    fn test_update_zero_dt_changes_nothing() {
        let mut entity = WorldEntity::animated(ground(3.0, 3.0), 1.0, 2.0, "idle");
        entity.resolve(&animated_footprint());
        entity.apply(&WorldOp::SetSpeed {
            speed: 9.0,
            duration: 1.0,
        })
        .unwrap();

        entity.update(0.0);
        assert_eq!(entity.position(), ground(3.0, 3.0));
        assert_eq!(entity.speed(), 2.0);
        assert_eq!(entity.current_clip(), Some("idle"));
    }

    #[test]
    fn test_speed_interpolation_samples_per_tick() {
        let mut entity = WorldEntity::moving(ground(0.0, 0.0), 1.0, 0.0);
        entity.resolve(&AssetFootprint::default());
        entity.apply(&WorldOp::SetSpeed {
            speed: 8.0,
            duration: 2.0,
        })
        .unwrap();

        entity.update(1.0);
        assert!((entity.speed() - 4.0).abs() < 1e-6);
        entity.update(1.0);
        assert_eq!(entity.speed(), 8.0);
        // After the duration the interpolation slot is released.
        entity.update(1.0);
        assert_eq!(entity.speed(), 8.0);
    }

    #[test]
    fn test_new_speed_change_replaces_inflight_one() {
        let mut entity = WorldEntity::moving(ground(0.0, 0.0), 1.0, 0.0);
        entity.resolve(&AssetFootprint::default());
        entity.apply(&WorldOp::SetSpeed {
            speed: 8.0,
            duration: 2.0,
        })
        .unwrap();
        entity.update(1.0); // speed now 4.0, halfway

        entity.apply(&WorldOp::SetSpeed {
            speed: 0.0,
            duration: 1.0,
        })
        .unwrap();
        entity.update(0.5);
        assert!((entity.speed() - 2.0).abs() < 1e-6);
        entity.update(0.5);
        assert_eq!(entity.speed(), 0.0);
    }

    #[test]
    fn test_rotation_interpolation_snaps_to_target() {
        let mut entity = WorldEntity::animated(ground(0.0, 0.0), 1.0, 0.0, "idle");
        entity.resolve(&animated_footprint());
        let target = -std::f32::consts::FRAC_PI_2;
        entity.apply(&WorldOp::SetRotation {
            radians: target,
            duration: 1.0,
        })
        .unwrap();

        entity.update(0.25);
        assert!((entity.rotation() - target * 0.25).abs() < 1e-5);
        entity.update(1.0);
        assert_eq!(entity.rotation(), target);
    }

    #[test]
    fn test_ops_rejected_by_missing_components() {
        let mut scenery = WorldEntity::fixed(ground(0.0, 0.0), 1.0);
        scenery.resolve(&AssetFootprint::default());

        let err = scenery
            .apply(&WorldOp::SetSpeed {
                speed: 1.0,
                duration: 1.0,
            })
            .unwrap_err();
        assert!(matches!(err, OpError::Immobile));

        let err = scenery
            .apply(&WorldOp::SetAnimation {
                clip: "idle".to_string(),
                play_once: false,
            })
            .unwrap_err();
        assert!(matches!(err, OpError::NotAnimated));
    }

    #[test]
    fn test_animated_entity_binds_clip_table_on_resolve() {
        let mut entity = WorldEntity::animated(ground(0.0, 0.0), 1.35, 0.0, "idle");
        assert_eq!(entity.current_clip(), None);
        entity.resolve(&animated_footprint());
        assert_eq!(entity.current_clip(), Some("idle"));

        entity.apply(&WorldOp::SetAnimation {
            clip: "gallop".to_string(),
            play_once: false,
        })
        .unwrap();
        assert_eq!(entity.current_clip(), Some("gallop"));
    }

    #[test]
    fn test_world_op_script_form() {
        let raw = r#"{ "op": "set_speed", "speed": 14.0 }"#;
        let op: WorldOp = serde_json::from_str(raw).unwrap();
        assert_eq!(
            op,
            WorldOp::SetSpeed {
                speed: 14.0,
                duration: 2.0
            }
        );

        let raw = r#"{ "op": "set_animation", "clip": "gallop_jump", "play_once": true }"#;
        let op: WorldOp = serde_json::from_str(raw).unwrap();
        assert_eq!(
            op,
            WorldOp::SetAnimation {
                clip: "gallop_jump".to_string(),
                play_once: true
            }
        );
    }
}
