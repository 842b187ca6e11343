//! Cinematic scripts.
//!
//! A script is a flat list of `(step, action)` pairs, loadable from JSON or
//! supplied by the built-in western cinematic. Registration is tolerant: an
//! entry whose step falls outside the timeline is logged and skipped, the
//! rest of the script still loads.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::timeline::{Action, TimelineScheduler};
use scene_entity::WorldOp;

/// Errors from loading a script file.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The script file could not be read.
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),

    /// The script file was not valid JSON.
    #[error("malformed script: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One timed script entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEntry {
    /// Timeline step the action fires on.
    pub step: i64,
    #[serde(flatten)]
    pub action: Action,
}

/// An ordered list of script entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CinematicScript {
    entries: Vec<ScriptEntry>,
}

impl CinematicScript {
    /// Build a script from entries.
    #[must_use]
    pub fn new(entries: Vec<ScriptEntry>) -> Self {
        Self { entries }
    }

    /// Load a JSON script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ScriptError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` for an empty script.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register every entry into the timeline. Entries with out-of-range
    /// steps are skipped with a warning.
    pub fn register_into(&self, timeline: &mut TimelineScheduler) {
        let mut skipped = 0_usize;
        for entry in &self.entries {
            if let Err(error) = timeline.register(entry.step, entry.action.clone()) {
                warn!(step = entry.step, %error, "script entry skipped");
                skipped += 1;
            }
        }
        info!(
            entries = self.entries.len() - skipped,
            skipped, "cinematic script registered"
        );
    }
}

/// The built-in cinematic: a night camp, a passing train, and a chase that
/// ends badly.
#[must_use]
pub fn default_cinematic() -> CinematicScript {
    use std::f32::consts::FRAC_PI_2;

    fn cut(step: i64, camera: &str) -> ScriptEntry {
        ScriptEntry {
            step,
            action: Action::SetCamera {
                camera: camera.to_string(),
            },
        }
    }

    fn event(step: i64, target: &str, op: WorldOp) -> ScriptEntry {
        ScriptEntry {
            step,
            action: Action::WorldEvent {
                target: target.to_string(),
                op,
            },
        }
    }

    fn clip(name: &str, play_once: bool) -> WorldOp {
        WorldOp::SetAnimation {
            clip: name.to_string(),
            play_once,
        }
    }

    fn speed(speed: f32, duration: f32) -> WorldOp {
        WorldOp::SetSpeed { speed, duration }
    }

    fn turn(radians: f32) -> WorldOp {
        WorldOp::SetRotation {
            radians,
            duration: 1.0,
        }
    }

    CinematicScript::new(vec![
        // The camp at night.
        cut(0, "campfire"),
        // The train rolls in.
        cut(19, "train"),
        cut(22, "pov_train"),
        // The pair notice it.
        event(24, "horse", turn(-FRAC_PI_2)),
        event(24, "rider", turn(-FRAC_PI_2)),
        cut(25, "camp"),
        // The chase begins.
        event(30, "horse", turn(FRAC_PI_2)),
        event(30, "rider", turn(FRAC_PI_2)),
        event(30, "rider", clip("run", false)),
        event(30, "horse", clip("gallop", false)),
        event(30, "horse", speed(10.0, 2.0)),
        event(30, "rider", speed(10.0, 2.0)),
        cut(35, "pov_train"),
        cut(40, "horse"),
        // Jumps over the fallen logs.
        event(41, "horse", clip("gallop_jump", true)),
        event(45, "horse", clip("gallop_jump", true)),
        cut(46, "pov_train"),
        event(49, "horse", clip("gallop_jump", true)),
        cut(54, "horse"),
        event(55, "horse", clip("gallop_jump", true)),
        // The train pulls away; the chase winds down.
        event(60, "horse", clip("walk", false)),
        event(60, "rider", clip("walk", false)),
        event(60, "horse", speed(2.0, 2.0)),
        event(60, "rider", speed(2.0, 2.0)),
        event(64, "horse", speed(0.0, 2.0)),
        event(64, "rider", speed(0.0, 2.0)),
        event(65, "horse", clip("idle", false)),
        event(65, "rider", clip("idle", false)),
        event(66, "horse", turn(0.0)),
        event(66, "rider", turn(0.0)),
        // Collapse.
        event(69, "horse", clip("death", true)),
        event(69, "rider", clip("death", true)),
    ])
}
