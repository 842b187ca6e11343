//! Scene director binary.
//!
//! Populates the world, loads the cinematic script, and runs the frame loop.
//! Pass a JSON config path as the first argument to override defaults.

mod camera;
mod config;
mod driver;
mod placement;
mod population;
mod registry;
mod script;
mod timeline;

use std::path::PathBuf;

use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::StdRng;
use scene_entity::ManifestAssets;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::camera::default_rig;
use crate::config::DirectorConfig;
use crate::driver::FrameDriver;
use crate::placement::OccupancyIndex;
use crate::population::{default_manifest, default_stages, populate};
use crate::registry::WorldRegistry;
use crate::script::{CinematicScript, default_cinematic};
use crate::timeline::TimelineScheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("scene_director=info".parse()?),
        )
        .init();

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => DirectorConfig::from_path(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DirectorConfig::default(),
    };

    let assets = match &config.manifest {
        Some(path) => ManifestAssets::from_path(path)
            .with_context(|| format!("loading manifest {}", path.display()))?,
        None => default_manifest(),
    };

    let mut registry = WorldRegistry::new();
    let mut occupancy = OccupancyIndex::new();
    let mut rng = StdRng::from_entropy();
    let stages = default_stages(&config.layout);
    populate(&stages, &assets, &mut registry, &mut occupancy, &mut rng).await;
    info!(
        categories = registry.category_count(),
        entities = registry.entity_count(),
        "world populated"
    );

    let mut scheduler = TimelineScheduler::new(config.timeline_steps);
    let script = match &config.script {
        Some(path) => CinematicScript::from_path(path)
            .with_context(|| format!("loading script {}", path.display()))?,
        None => default_cinematic(),
    };
    script.register_into(&mut scheduler);

    let mut driver = FrameDriver::new(scheduler, registry, default_rig());
    driver.run(config.tick_rate, config.max_ticks).await;
    Ok(())
}
