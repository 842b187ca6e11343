//! World population.
//!
//! Population is an explicit, ordered list of spawn stages. Each stage
//! awaits its asset resolution before the next stage begins: later stages
//! place against the radii resolved by earlier ones, so the sequencing is a
//! causal dependency, not an optimization target. Every resolved entity
//! extends the shared [`OccupancyIndex`].
//!
//! Failure is never fatal here: a rejected resolution omits that entity, an
//! exhausted placement search skips that instance, and `populate` always
//! runs to the end of the stage list.

use std::collections::HashMap;
use std::f32::consts::TAU;

use rand::Rng;
use scene_entity::{AssetFootprint, AssetSource, ClipInfo, ManifestAssets, WorldEntity};
use scene_math::{Vec3, ground};
use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::placement::{OccupancyIndex, SpawnBounds, find_spawn_position};
use crate::registry::WorldRegistry;

/// How to construct one entity: its asset and component set.
#[derive(Debug, Clone)]
pub struct EntitySpec {
    /// Asset path resolved through the [`AssetSource`].
    pub asset: String,
    /// Uniform scale.
    pub scale: f32,
    /// Initial yaw in radians.
    pub rotation: f32,
    /// Movement speed; `None` for static scenery.
    pub speed: Option<f32>,
    /// Starting animation clip; `None` for unanimated entities.
    pub clip: Option<String>,
}

impl EntitySpec {
    /// Static scenery.
    #[must_use]
    pub fn scenery(asset: &str, scale: f32) -> Self {
        Self {
            asset: asset.to_string(),
            scale,
            rotation: 0.0,
            speed: None,
            clip: None,
        }
    }

    /// A moving entity without clips.
    #[must_use]
    pub fn moving(asset: &str, scale: f32, speed: f32) -> Self {
        Self {
            speed: Some(speed),
            ..Self::scenery(asset, scale)
        }
    }

    /// An animated entity starting in `clip`.
    #[must_use]
    pub fn animated(asset: &str, scale: f32, speed: f32, clip: &str) -> Self {
        Self {
            speed: Some(speed),
            clip: Some(clip.to_string()),
            ..Self::scenery(asset, scale)
        }
    }

    /// Override the initial yaw.
    #[must_use]
    pub fn rotated(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    fn build(&self, position: Vec3) -> WorldEntity {
        let entity = match (&self.clip, self.speed) {
            (Some(clip), speed) => {
                WorldEntity::animated(position, self.scale, speed.unwrap_or(0.0), clip)
            }
            (None, Some(speed)) => WorldEntity::moving(position, self.scale, speed),
            (None, None) => WorldEntity::fixed(position, self.scale),
        };
        entity.with_rotation(self.rotation)
    }
}

/// One stage of the population script.
#[derive(Debug, Clone)]
pub enum SpawnStage {
    /// A single entity at a fixed position.
    Single {
        key: String,
        spec: EntitySpec,
        position: Vec3,
    },
    /// A contiguous run of fixed-spacing segments sharing one resolution
    /// (the track).
    SegmentRun {
        key: String,
        spec: EntitySpec,
        first_index: i32,
        count: u32,
        spacing: f32,
    },
    /// A bulk category scattered by rejection sampling. Scale and yaw are
    /// randomized per instance; `spec.scale` is ignored.
    Scatter {
        key: String,
        spec: EntitySpec,
        count: u32,
        scale_range: (f32, f32),
        bounds: SpawnBounds,
    },
}

/// Run the population script to completion.
///
/// Stages resolve strictly one after another; a stage's failure is logged
/// and its entity omitted, never propagated.
pub async fn populate(
    stages: &[SpawnStage],
    assets: &dyn AssetSource,
    registry: &mut WorldRegistry,
    occupancy: &mut OccupancyIndex,
    rng: &mut impl Rng,
) {
    for stage in stages {
        run_stage(stage, assets, registry, occupancy, rng).await;
    }
    debug!(
        categories = registry.category_count(),
        entities = registry.entity_count(),
        "population complete"
    );
}

async fn run_stage(
    stage: &SpawnStage,
    assets: &dyn AssetSource,
    registry: &mut WorldRegistry,
    occupancy: &mut OccupancyIndex,
    rng: &mut impl Rng,
) {
    match stage {
        SpawnStage::Single { key, spec, position } => {
            match assets.resolve(&spec.asset).await {
                Ok(footprint) => {
                    place(registry, occupancy, key, spec.build(*position), &footprint);
                }
                Err(error) => {
                    warn!(%key, asset = %spec.asset, %error, "stage resolution failed; entity omitted");
                }
            }
        }
        SpawnStage::SegmentRun {
            key,
            spec,
            first_index,
            count,
            spacing,
        } => {
            // One shared resolution for the whole run.
            match assets.resolve(&spec.asset).await {
                Ok(footprint) => {
                    for offset in 0..*count {
                        let index = first_index + offset as i32;
                        let position = ground(index as f32 * spacing, 0.0);
                        place(registry, occupancy, key, spec.build(position), &footprint);
                    }
                }
                Err(error) => {
                    warn!(%key, asset = %spec.asset, %error, "segment run resolution failed; run omitted");
                }
            }
        }
        SpawnStage::Scatter {
            key,
            spec,
            count,
            scale_range,
            bounds,
        } => {
            // The category exists even if every attempt below fails.
            registry.ensure_category(key);
            for _ in 0..*count {
                let Some(position) = find_spawn_position(occupancy, *bounds, rng) else {
                    // Exhausted search: skip this instance.
                    continue;
                };
                match assets.resolve(&spec.asset).await {
                    Ok(footprint) => {
                        let mut instance = spec.clone();
                        instance.scale = rng.gen_range(scale_range.0..scale_range.1);
                        instance.rotation = rng.gen_range(0.0..TAU);
                        place(registry, occupancy, key, instance.build(position), &footprint);
                    }
                    Err(error) => {
                        warn!(%key, asset = %spec.asset, %error, "instance resolution failed; instance omitted");
                    }
                }
            }
        }
    }
}

fn place(
    registry: &mut WorldRegistry,
    occupancy: &mut OccupancyIndex,
    key: &str,
    mut entity: WorldEntity,
    footprint: &AssetFootprint,
) {
    entity.resolve(footprint);
    occupancy.record(entity.position(), entity.bounding_radius());
    registry.insert(key, entity);
}

/// The default scene: a night-time desert camp beside a rail line, a train
/// coming through, a rider and horse that will chase it.
#[must_use]
pub fn default_stages(layout: &LayoutConfig) -> Vec<SpawnStage> {
    use std::f32::consts::{FRAC_PI_2, PI};

    let camp_x = layout.camp_offset_x;
    let mut stages = vec![
        SpawnStage::Single {
            key: "ground".to_string(),
            spec: EntitySpec::scenery("ground", 1.0),
            position: ground(0.0, 0.0),
        },
        SpawnStage::Single {
            key: "sky".to_string(),
            spec: EntitySpec::scenery("sky", 1.0),
            position: ground(0.0, 0.0),
        },
        SpawnStage::Single {
            key: "train".to_string(),
            spec: EntitySpec::moving("train.glb", 0.2, layout.train_speed),
            position: Vec3::new(layout.train_start_x, 0.5, -0.9),
        },
        SpawnStage::Single {
            key: "horse".to_string(),
            spec: EntitySpec::animated("horse.glb", 1.35, 0.0, "idle").rotated(FRAC_PI_2),
            position: ground(camp_x + 2.0, 6.0),
        },
        SpawnStage::Single {
            key: "rider".to_string(),
            spec: EntitySpec::animated("rider.glb", 3.0, 0.0, "idle"),
            position: ground(camp_x, 11.0),
        },
        SpawnStage::Single {
            key: "campfire".to_string(),
            spec: EntitySpec::animated("campfire.glb", 2.0, 0.0, "flicker"),
            position: Vec3::new(camp_x, 0.8, 20.0),
        },
        SpawnStage::Single {
            key: "woodlog".to_string(),
            spec: EntitySpec::scenery("woodlog.glb", 1.0).rotated(0.55),
            position: ground(0.0, 25.0),
        },
        SpawnStage::Single {
            key: "woodlog".to_string(),
            spec: EntitySpec::scenery("woodlog.glb", 1.0).rotated(1.65),
            position: ground(-5.0, 20.0),
        },
        SpawnStage::Single {
            key: "tent".to_string(),
            spec: EntitySpec::scenery("tent.glb", 4.0).rotated(-PI / 2.1),
            position: Vec3::new(camp_x + 10.0, 2.5, 18.0),
        },
        SpawnStage::SegmentRun {
            key: "rail".to_string(),
            spec: EntitySpec::scenery("rail", 0.22),
            first_index: layout.rail_first_index,
            count: layout.rail_count,
            spacing: layout.rail_spacing,
        },
    ];

    // Fallen logs along the track.
    for x in [77.0, 105.0, 135.0, 175.0] {
        stages.push(SpawnStage::Single {
            key: "woodlog".to_string(),
            spec: EntitySpec::scenery("woodlog.glb", 1.1).rotated(FRAC_PI_2),
            position: ground(x, 6.0),
        });
    }

    stages.push(SpawnStage::Single {
        key: "tunnel".to_string(),
        spec: EntitySpec::scenery("tunnel.glb", 1.0),
        position: Vec3::new(layout.tunnel_x, -2.0, 0.0),
    });
    stages.push(SpawnStage::Scatter {
        key: "cactus".to_string(),
        spec: EntitySpec::scenery("cactus.glb", 1.0),
        count: layout.cactus_count,
        scale_range: (3.0, 6.0),
        bounds: layout.scatter_bounds,
    });
    stages.push(SpawnStage::Scatter {
        key: "rock".to_string(),
        spec: EntitySpec::scenery("rock.glb", 1.0),
        count: layout.rock_count,
        scale_range: (1.0, 3.0),
        bounds: layout.scatter_bounds,
    });

    stages
}

/// The built-in asset manifest matching [`default_stages`]. Stands in for
/// the renderer's model library.
#[must_use]
pub fn default_manifest() -> ManifestAssets {
    fn clip(name: &str, duration: f32) -> ClipInfo {
        ClipInfo {
            name: name.to_string(),
            duration,
        }
    }

    let mut footprints = HashMap::new();
    // Ground and sky never report extents; their radius stays zero so they
    // exclude nothing.
    footprints.insert("ground".to_string(), AssetFootprint::default());
    footprints.insert("sky".to_string(), AssetFootprint::default());
    footprints.insert(
        "train.glb".to_string(),
        AssetFootprint {
            half_width: 60.0,
            half_depth: 10.0,
            clips: Vec::new(),
        },
    );
    footprints.insert(
        "horse.glb".to_string(),
        AssetFootprint {
            half_width: 0.6,
            half_depth: 1.6,
            clips: vec![
                clip("idle", 2.0),
                clip("walk", 1.2),
                clip("gallop", 0.8),
                clip("gallop_jump", 0.9),
                clip("death", 2.5),
            ],
        },
    );
    footprints.insert(
        "rider.glb".to_string(),
        AssetFootprint {
            half_width: 0.4,
            half_depth: 0.4,
            clips: vec![
                clip("idle", 2.0),
                clip("walk", 1.1),
                clip("run", 0.7),
                clip("death", 2.2),
            ],
        },
    );
    footprints.insert(
        "campfire.glb".to_string(),
        AssetFootprint {
            half_width: 0.9,
            half_depth: 0.9,
            clips: vec![clip("flicker", 1.0)],
        },
    );
    footprints.insert(
        "woodlog.glb".to_string(),
        AssetFootprint {
            half_width: 2.2,
            half_depth: 0.5,
            clips: Vec::new(),
        },
    );
    footprints.insert(
        "tent.glb".to_string(),
        AssetFootprint {
            half_width: 1.1,
            half_depth: 1.0,
            clips: Vec::new(),
        },
    );
    footprints.insert(
        "rail".to_string(),
        AssetFootprint {
            half_width: 50.0,
            half_depth: 11.0,
            clips: Vec::new(),
        },
    );
    footprints.insert(
        "tunnel.glb".to_string(),
        AssetFootprint {
            half_width: 15.0,
            half_depth: 12.0,
            clips: Vec::new(),
        },
    );
    footprints.insert(
        "cactus.glb".to_string(),
        AssetFootprint {
            half_width: 0.8,
            half_depth: 0.8,
            clips: Vec::new(),
        },
    );
    footprints.insert(
        "rock.glb".to_string(),
        AssetFootprint {
            half_width: 1.0,
            half_depth: 0.9,
            clips: Vec::new(),
        },
    );
    ManifestAssets::from_map(footprints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use futures::future::BoxFuture;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use scene_entity::AssetError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Resolves every asset to the same footprint, failing on one chosen
    /// call (counted across the whole test).
    struct FlakySource {
        footprint: AssetFootprint,
        fail_on_call: Option<usize>,
        calls: AtomicUsize,
    }

    impl FlakySource {
        fn always(footprint: AssetFootprint) -> Self {
            Self {
                footprint,
                fail_on_call: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing_once(footprint: AssetFootprint, fail_on_call: usize) -> Self {
            Self {
                footprint,
                fail_on_call: Some(fail_on_call),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl AssetSource for FlakySource {
        fn resolve(&self, path: &str) -> BoxFuture<'_, Result<AssetFootprint, AssetError>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let result = if self.fail_on_call == Some(call) {
                Err(AssetError::Unknown(path.to_string()))
            } else {
                Ok(self.footprint.clone())
            };
            Box::pin(async move { result })
        }
    }

    fn small_footprint() -> AssetFootprint {
        AssetFootprint {
            half_width: 1.0,
            half_depth: 1.0,
            clips: Vec::new(),
        }
    }

    fn wide_bounds() -> SpawnBounds {
        SpawnBounds {
            min_x: -5000.0,
            max_x: 5000.0,
            min_z: -5000.0,
            max_z: 5000.0,
        }
    }

    #[tokio::test]
    async fn test_single_stage_failure_omits_entity_and_continues() {
        let stages = vec![
            SpawnStage::Single {
                key: "tent".to_string(),
                spec: EntitySpec::scenery("tent.glb", 1.0),
                position: ground(0.0, 0.0),
            },
            SpawnStage::Single {
                key: "train".to_string(),
                spec: EntitySpec::moving("train.glb", 1.0, 8.0),
                position: ground(10.0, 0.0),
            },
        ];
        // First resolution fails, second succeeds.
        let assets = FlakySource::failing_once(small_footprint(), 0);
        let mut registry = WorldRegistry::new();
        let mut occupancy = OccupancyIndex::new();
        let mut rng = StdRng::seed_from_u64(1);

        populate(&stages, &assets, &mut registry, &mut occupancy, &mut rng).await;

        assert!(registry.get("tent").is_empty());
        assert_eq!(registry.get("train").len(), 1);
        assert_eq!(occupancy.len(), 1);
    }

    #[tokio::test]
    async fn test_scatter_one_resolution_failure_yields_one_fewer() {
        let stages = vec![SpawnStage::Scatter {
            key: "rock".to_string(),
            spec: EntitySpec::scenery("rock.glb", 1.0),
            count: 50,
            scale_range: (1.0, 3.0),
            bounds: wide_bounds(),
        }];
        let assets = FlakySource::failing_once(small_footprint(), 17);
        let mut registry = WorldRegistry::new();
        let mut occupancy = OccupancyIndex::new();
        let mut rng = StdRng::seed_from_u64(2);

        populate(&stages, &assets, &mut registry, &mut occupancy, &mut rng).await;

        assert_eq!(registry.get("rock").len(), 49);
    }

    #[tokio::test]
    async fn test_dense_world_skips_exhausted_instances_without_failing() {
        let stages = vec![SpawnStage::Scatter {
            key: "cactus".to_string(),
            spec: EntitySpec::scenery("cactus.glb", 1.0),
            count: 10,
            scale_range: (1.0, 2.0),
            bounds: SpawnBounds {
                min_x: -5.0,
                max_x: 5.0,
                min_z: -5.0,
                max_z: 5.0,
            },
        }];
        let assets = FlakySource::always(small_footprint());
        let mut registry = WorldRegistry::new();
        let mut occupancy = OccupancyIndex::new();
        // Everything inside the bounds is already excluded.
        occupancy.record(ground(0.0, 0.0), 1000.0);
        let mut rng = StdRng::seed_from_u64(3);

        populate(&stages, &assets, &mut registry, &mut occupancy, &mut rng).await;

        // The category exists but holds nothing.
        assert_eq!(registry.category_count(), 1);
        assert!(registry.get("cactus").is_empty());
    }

    #[tokio::test]
    async fn test_segment_run_spawns_fixed_spacing_segments() {
        let stages = vec![SpawnStage::SegmentRun {
            key: "rail".to_string(),
            spec: EntitySpec::scenery("rail", 0.22),
            first_index: -2,
            count: 5,
            spacing: 22.0,
        }];
        let assets = FlakySource::always(small_footprint());
        let mut registry = WorldRegistry::new();
        let mut occupancy = OccupancyIndex::new();
        let mut rng = StdRng::seed_from_u64(4);

        populate(&stages, &assets, &mut registry, &mut occupancy, &mut rng).await;

        let segments = registry.get("rail");
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0].position().x, -44.0);
        assert_eq!(segments[4].position().x, 44.0);
    }

    #[tokio::test]
    async fn test_scattered_entities_respect_earlier_radii() {
        let big = AssetFootprint {
            half_width: 8.0,
            half_depth: 8.0,
            clips: Vec::new(),
        };
        let stages = vec![
            SpawnStage::Single {
                key: "tent".to_string(),
                spec: EntitySpec::scenery("tent.glb", 1.0),
                position: ground(0.0, 0.0),
            },
            SpawnStage::Scatter {
                key: "rock".to_string(),
                spec: EntitySpec::scenery("rock.glb", 1.0),
                count: 40,
                scale_range: (1.0, 2.0),
                bounds: SpawnBounds {
                    min_x: -50.0,
                    max_x: 50.0,
                    min_z: -50.0,
                    max_z: 50.0,
                },
            },
        ];
        let assets = FlakySource::always(big);
        let mut registry = WorldRegistry::new();
        let mut occupancy = OccupancyIndex::new();
        let mut rng = StdRng::seed_from_u64(5);

        populate(&stages, &assets, &mut registry, &mut occupancy, &mut rng).await;

        let tent_position = registry.first("tent").unwrap().position();
        for rock in registry.get("rock") {
            assert!(scene_math::planar_distance(rock.position(), tent_position) >= 8.0);
        }
    }

    #[tokio::test]
    async fn test_default_stages_populate_the_full_scene() {
        let layout = LayoutConfig::default();
        let stages = default_stages(&layout);
        let assets = default_manifest();
        let mut registry = WorldRegistry::new();
        let mut occupancy = OccupancyIndex::new();
        let mut rng = StdRng::seed_from_u64(6);

        populate(&stages, &assets, &mut registry, &mut occupancy, &mut rng).await;

        let keys: Vec<&str> = registry.keys().collect();
        assert_eq!(
            keys,
            [
                "ground", "sky", "train", "horse", "rider", "campfire", "woodlog", "tent",
                "rail", "tunnel", "cactus", "rock"
            ]
        );
        assert_eq!(registry.get("rail").len(), layout.rail_count as usize);
        assert_eq!(registry.get("woodlog").len(), 6);
        assert!(registry.get("cactus").len() <= layout.cactus_count as usize);
        assert!(!registry.get("cactus").is_empty());
        // The horse starts idle and the campfire flickers.
        assert_eq!(registry.first("horse").unwrap().current_clip(), Some("idle"));
        assert_eq!(
            registry.first("campfire").unwrap().current_clip(),
            Some("flicker")
        );
    }
}
