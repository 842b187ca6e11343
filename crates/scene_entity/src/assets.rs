//! Asset resolution boundary.
//!
//! The scene core never decodes models. An [`AssetSource`] resolves an asset
//! path into the data the core actually needs: the ground-plane half extents
//! of the visual representation and the animation clips baked into it.
//! Completion of the returned future corresponds to the representation being
//! ready; until then the owning entity's bounding radius stays at zero.

use std::collections::HashMap;
use std::path::Path;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// A named animation clip and its duration in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    /// Clip name as referenced by scripted events.
    pub name: String,
    /// Playback duration of one loop, in seconds.
    pub duration: f32,
}

/// Resolved visual data for one asset.
///
/// Half extents are in unscaled model units; the owning entity multiplies by
/// its own scale when deriving a bounding radius.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetFootprint {
    /// Half of the model's extent along X.
    pub half_width: f32,
    /// Half of the model's extent along Z.
    pub half_depth: f32,
    /// Animation clips carried by the model, empty for static assets.
    #[serde(default)]
    pub clips: Vec<ClipInfo>,
}

impl AssetFootprint {
    /// Planar bounding radius: the larger of the two half extents.
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        self.half_width.max(self.half_depth)
    }

    /// Returns the duration of the named clip, if the asset carries it.
    #[must_use]
    pub fn clip_duration(&self, name: &str) -> Option<f32> {
        self.clips
            .iter()
            .find(|clip| clip.name == name)
            .map(|clip| clip.duration)
    }
}

/// Errors from asset resolution.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The source has no entry for the requested path.
    #[error("unknown asset: {0}")]
    Unknown(String),

    /// The asset manifest could not be read.
    #[error("failed to read asset manifest: {0}")]
    Io(#[from] std::io::Error),

    /// The asset manifest was not valid JSON.
    #[error("malformed asset manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The resolution boundary to the rendering collaborator.
///
/// Resolution is asynchronous and may fail; failures are permanent — callers
/// treat a rejected future as absence, never retry.
pub trait AssetSource: Send + Sync {
    /// Resolve `path` into its footprint.
    fn resolve(&self, path: &str) -> BoxFuture<'_, Result<AssetFootprint, AssetError>>;
}

/// Asset source backed by a manifest mapping asset paths to footprints.
///
/// Stands in for a real model decoder, which would report the same extents
/// after loading the mesh. Resolution completes immediately but still runs
/// through the async boundary so the population pipeline's sequencing is
/// exercised for real.
#[derive(Debug, Clone, Default)]
pub struct ManifestAssets {
    footprints: HashMap<String, AssetFootprint>,
}

impl ManifestAssets {
    /// Build a source from an in-memory map.
    #[must_use]
    pub fn from_map(footprints: HashMap<String, AssetFootprint>) -> Self {
        Self { footprints }
    }

    /// Load a JSON manifest: an object mapping asset paths to footprints.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_path(path: &Path) -> Result<Self, AssetError> {
        let raw = std::fs::read_to_string(path)?;
        let footprints: HashMap<String, AssetFootprint> = serde_json::from_str(&raw)?;
        Ok(Self { footprints })
    }

    /// Returns the number of assets the source knows about.
    #[must_use]
    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    /// Returns `true` if the source has no assets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }
}

impl AssetSource for ManifestAssets {
    fn resolve(&self, path: &str) -> BoxFuture<'_, Result<AssetFootprint, AssetError>> {
        let result = self
            .footprints
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::Unknown(path.to_string()));
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footprint(half_width: f32, half_depth: f32) -> AssetFootprint {
        AssetFootprint {
            half_width,
            half_depth,
            clips: Vec::new(),
        }
    }

    #[test]
    fn test_bounding_radius_is_larger_half_extent() {
        assert_eq!(footprint(2.0, 5.0).bounding_radius(), 5.0);
        assert_eq!(footprint(7.0, 1.0).bounding_radius(), 7.0);
    }

    #[test]
    fn test_clip_duration_lookup() {
        let fp = AssetFootprint {
            half_width: 1.0,
            half_depth: 1.0,
            clips: vec![ClipInfo {
                name: "gallop".to_string(),
                duration: 0.8,
            }],
        };
        assert_eq!(fp.clip_duration("gallop"), Some(0.8));
        assert_eq!(fp.clip_duration("walk"), None);
    }

    #[tokio::test]
    async fn test_manifest_resolves_known_asset() {
        let mut map = HashMap::new();
        map.insert("rock.glb".to_string(), footprint(1.5, 2.5));
        let assets = ManifestAssets::from_map(map);

        let fp = assets.resolve("rock.glb").await.unwrap();
        assert_eq!(fp.bounding_radius(), 2.5);
    }

    #[tokio::test]
    async fn test_manifest_unknown_asset_is_an_error() {
        let assets = ManifestAssets::default();
        let err = assets.resolve("missing.glb").await.unwrap_err();
        assert!(matches!(err, AssetError::Unknown(path) if path == "missing.glb"));
    }

    #[test]
    fn test_manifest_from_path_rejects_malformed_json() {
        let path = std::env::temp_dir().join("scene_entity_manifest_malformed.json");
        std::fs::write(&path, r#"{ "horse.glb": { "half_width": }"#).unwrap();

        let err = ManifestAssets::from_path(&path).unwrap_err();
        assert!(matches!(err, AssetError::Parse(_)));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_manifest_from_path_surfaces_missing_file() {
        let path = std::env::temp_dir().join("scene_entity_manifest_absent.json");
        let err = ManifestAssets::from_path(&path).unwrap_err();
        assert!(matches!(err, AssetError::Io(_)));
    }

    #[test]
    fn test_manifest_json_shape() {
        let raw = r#"{
            "horse.glb": {
                "half_width": 0.6,
                "half_depth": 1.4,
                "clips": [{ "name": "idle", "duration": 2.0 }]
            },
            "tent.glb": { "half_width": 3.0, "half_depth": 3.0 }
        }"#;
        let parsed: HashMap<String, AssetFootprint> = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["horse.glb"].clip_duration("idle"), Some(2.0));
        assert!(parsed["tent.glb"].clips.is_empty());
    }
}
