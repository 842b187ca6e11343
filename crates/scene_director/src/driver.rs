//! Frame driver.
//!
//! One frame is: fire the timeline batch due at the current scene time,
//! advance every entity by the elapsed wall time, then re-derive the active
//! camera pose. Scene time is the accumulated sum of frame deltas, so a
//! paused loop does not skip timeline steps when it resumes.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{info, warn};

use crate::camera::CameraRig;
use crate::registry::WorldRegistry;
use crate::timeline::TimelineScheduler;

/// Owns the world and drives it frame by frame.
#[derive(Debug)]
pub struct FrameDriver {
    scheduler: TimelineScheduler,
    registry: WorldRegistry,
    rig: CameraRig,
    scene_time: f64,
    started: bool,
}

impl FrameDriver {
    /// Assemble a driver from a populated world.
    #[must_use]
    pub fn new(scheduler: TimelineScheduler, registry: WorldRegistry, rig: CameraRig) -> Self {
        Self {
            scheduler,
            registry,
            rig,
            scene_time: 0.0,
            started: false,
        }
    }

    /// Advance one frame by `dt` seconds of scene time.
    ///
    /// A failed timeline batch is logged and dropped; the frame still
    /// updates entities and the camera, and the loop keeps running.
    pub fn step(&mut self, dt: f64) {
        // The first frame carries no elapsed time.
        let frame_dt = if self.started { dt } else { 0.0 };
        self.started = true;
        self.scene_time += frame_dt;
        if let Err(error) = self
            .scheduler
            .tick(self.scene_time, &mut self.registry, &mut self.rig)
        {
            warn!(%error, time = self.scene_time, "timeline batch aborted");
        }
        self.registry.update(frame_dt as f32);
        self.rig.update(&self.registry);
    }

    /// Run the frame loop at `tick_rate` frames per second for `max_ticks`
    /// frames (0 = until cancelled).
    pub async fn run(&mut self, tick_rate: f64, max_ticks: u64) {
        let period = Duration::from_secs_f64(1.0 / tick_rate);
        info!(tick_rate, max_ticks, "frame loop starting");
        let mut ticks = 0_u64;
        loop {
            let frame_start = Instant::now();
            self.step(period.as_secs_f64());
            ticks += 1;
            if max_ticks != 0 && ticks >= max_ticks {
                break;
            }
            let elapsed = frame_start.elapsed();
            match period.checked_sub(elapsed) {
                Some(remaining) => sleep(remaining).await,
                None => {
                    warn!(?elapsed, ?period, "frame over budget");
                }
            }
        }
        info!(ticks, time = self.scene_time, "frame loop finished");
    }

    /// Accumulated scene time in seconds.
    #[must_use]
    pub fn scene_time(&self) -> f64 {
        self.scene_time
    }

    /// The world registry.
    #[must_use]
    pub fn registry(&self) -> &WorldRegistry {
        &self.registry
    }

    /// The camera rig.
    #[must_use]
    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }
}
