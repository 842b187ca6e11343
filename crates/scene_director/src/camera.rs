//! Scene cameras.
//!
//! Cameras here are pure poses (position + look-at); rendering is out of
//! scope. A follow camera re-derives its pose from an anchor entity every
//! frame, a fixed camera keeps whatever pose it was given. The rig owns the
//! cameras and tracks which one is active; the timeline switches between
//! them by name.

use scene_math::Vec3;
use tracing::debug;

use crate::registry::WorldRegistry;

/// Errors from camera activation.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// No camera registered under this name.
    #[error("unknown camera: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone)]
enum CameraMode {
    /// Pose never changes unless set explicitly.
    Fixed,
    /// Pose follows an anchor entity in the registry.
    Follow {
        anchor: String,
        position_offset: Vec3,
        /// Entity whose position the camera looks at; `None` looks at the
        /// anchor itself.
        look_target: Option<String>,
        look_offset: Vec3,
    },
}

/// One named camera pose.
#[derive(Debug, Clone)]
pub struct SceneCamera {
    name: String,
    mode: CameraMode,
    position: Vec3,
    look_at: Vec3,
}

impl SceneCamera {
    /// A fixed camera at `position` looking at `look_at`.
    #[must_use]
    pub fn fixed(name: &str, position: Vec3, look_at: Vec3) -> Self {
        Self {
            name: name.to_string(),
            mode: CameraMode::Fixed,
            position,
            look_at,
        }
    }

    /// A camera that trails `anchor` at `position_offset` and looks at the
    /// anchor plus `look_offset`.
    #[must_use]
    pub fn follow(name: &str, anchor: &str, position_offset: Vec3, look_offset: Vec3) -> Self {
        Self {
            name: name.to_string(),
            mode: CameraMode::Follow {
                anchor: anchor.to_string(),
                position_offset,
                look_target: None,
                look_offset,
            },
            position: position_offset,
            look_at: look_offset,
        }
    }

    /// Like [`SceneCamera::follow`], but the look-at tracks a different
    /// entity than the anchor.
    #[must_use]
    pub fn follow_looking_at(
        name: &str,
        anchor: &str,
        position_offset: Vec3,
        look_target: &str,
        look_offset: Vec3,
    ) -> Self {
        Self {
            name: name.to_string(),
            mode: CameraMode::Follow {
                anchor: anchor.to_string(),
                position_offset,
                look_target: Some(look_target.to_string()),
                look_offset,
            },
            position: position_offset,
            look_at: look_offset,
        }
    }

    /// Camera name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current look-at point.
    #[must_use]
    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    /// Re-derive the pose from the registry. A missing anchor keeps the
    /// last pose.
    pub fn update(&mut self, registry: &WorldRegistry) {
        let CameraMode::Follow {
            anchor,
            position_offset,
            look_target,
            look_offset,
        } = &self.mode
        else {
            return;
        };
        let Some(anchor_entity) = registry.first(anchor) else {
            return;
        };
        self.position = anchor_entity.position() + *position_offset;
        let look_base = match look_target {
            Some(target) => match registry.first(target) {
                Some(entity) => entity.position(),
                None => return,
            },
            None => anchor_entity.position(),
        };
        self.look_at = look_base + *look_offset;
    }
}

/// Owns every camera and the notion of which one is live.
#[derive(Debug, Default)]
pub struct CameraRig {
    cameras: Vec<SceneCamera>,
    active: Option<usize>,
}

impl CameraRig {
    /// Create an empty rig.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a camera. The first camera added becomes active.
    pub fn add(&mut self, camera: SceneCamera) {
        if self.active.is_none() {
            self.active = Some(self.cameras.len());
        }
        self.cameras.push(camera);
    }

    /// Switch the active camera by name.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::Unknown`] when no camera has that name; the
    /// previously active camera stays live.
    pub fn activate(&mut self, name: &str) -> Result<(), CameraError> {
        let index = self
            .cameras
            .iter()
            .position(|camera| camera.name() == name)
            .ok_or_else(|| CameraError::Unknown(name.to_string()))?;
        self.active = Some(index);
        debug!(camera = name, "camera cut");
        Ok(())
    }

    /// The active camera, if any were added.
    #[must_use]
    pub fn active(&self) -> Option<&SceneCamera> {
        self.active.map(|index| &self.cameras[index])
    }

    /// Number of cameras in the rig.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    /// Returns `true` when no camera has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Update the active camera's pose from the registry. Inactive cameras
    /// are left stale; they re-derive on activation's next frame.
    pub fn update(&mut self, registry: &WorldRegistry) {
        if let Some(index) = self.active {
            self.cameras[index].update(registry);
        }
    }
}

/// The rig used by the default cinematic. The camp wide shot comes first so
/// it is live before the script's first cut.
#[must_use]
pub fn default_rig() -> CameraRig {
    let mut rig = CameraRig::new();
    rig.add(SceneCamera::follow_looking_at(
        "camp",
        "campfire",
        Vec3::new(35.0, 5.0, 0.0),
        "train",
        Vec3::new(0.0, 0.0, -10.0),
    ));
    rig.add(SceneCamera::fixed(
        "default",
        Vec3::new(0.0, 60.0, 0.0),
        Vec3::new(400.0, 60.0, 60.0),
    ));
    rig.add(SceneCamera::follow(
        "campfire",
        "campfire",
        Vec3::new(-10.0, 2.0, 15.0),
        Vec3::new(1.0, 4.0, 0.0),
    ));
    rig.add(SceneCamera::follow(
        "pov_train",
        "train",
        Vec3::new(-10.0, 10.0, 1.0),
        Vec3::new(1000.0, 10.0, 0.0),
    ));
    rig.add(SceneCamera::follow(
        "train",
        "train",
        Vec3::new(20.0, 10.0, 40.0),
        Vec3::new(0.0, 5.0, 0.0),
    ));
    rig.add(SceneCamera::follow(
        "horse",
        "horse",
        Vec3::new(5.0, 5.0, 18.0),
        Vec3::new(0.0, 5.0, 0.0),
    ));
    rig.add(SceneCamera::follow(
        "rider",
        "rider",
        Vec3::new(5.0, 5.0, 18.0),
        Vec3::new(0.0, 5.0, 0.0),
    ));
    rig
}
