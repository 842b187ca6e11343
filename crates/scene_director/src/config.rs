//! Director configuration.
//!
//! Everything has a default so the binary runs with no arguments; a JSON
//! config file can override any subset of fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::placement::SpawnBounds;

/// Errors from loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file was not valid JSON.
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// World layout constants consumed by the default population script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// X offset of the camp (campfire, tent, horse, rider).
    pub camp_offset_x: f32,
    /// Where the train starts, far behind the camp.
    pub train_start_x: f32,
    /// Constant train speed along +X.
    pub train_speed: f32,
    /// X position of the tunnel the track runs into.
    pub tunnel_x: f32,
    /// Index of the first track segment (segments extend backwards too).
    pub rail_first_index: i32,
    /// Number of track segments.
    pub rail_count: u32,
    /// World-space length of one track segment.
    pub rail_spacing: f32,
    /// Cactus spawn attempts.
    pub cactus_count: u32,
    /// Rock spawn attempts.
    pub rock_count: u32,
    /// Sampling rectangle for scattered scenery.
    pub scatter_bounds: SpawnBounds,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            camp_offset_x: -40.0,
            train_start_x: -500.0,
            train_speed: 14.0,
            tunnel_x: 900.0,
            rail_first_index: -20,
            rail_count: 80,
            rail_spacing: 22.0,
            cactus_count: 300,
            rock_count: 50,
            scatter_bounds: SpawnBounds {
                min_x: -300.0,
                max_x: 2800.0,
                min_z: -700.0,
                max_z: 700.0,
            },
        }
    }
}

/// Top-level configuration for the director binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Target frames per second for the frame loop.
    pub tick_rate: f64,
    /// Maximum number of frames to run (0 = unlimited).
    pub max_ticks: u64,
    /// Number of discrete steps in the timeline.
    pub timeline_steps: usize,
    /// Optional asset manifest path; the built-in manifest is used otherwise.
    pub manifest: Option<PathBuf>,
    /// Optional cinematic script path; the built-in script is used otherwise.
    pub script: Option<PathBuf>,
    /// World layout constants.
    pub layout: LayoutConfig,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
            timeline_steps: 70,
            manifest: None,
            script: None,
            layout: LayoutConfig::default(),
        }
    }
}

impl DirectorConfig {
    /// Load a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
