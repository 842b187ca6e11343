//! Timeline scheduler.
//!
//! Cinematic time is continuous; the timeline is discrete. Each whole second
//! of scene time is one step, and every step owns a (possibly empty) batch of
//! actions. The scheduler guarantees each step's batch fires exactly once per
//! visit: fractional advances inside one step re-fire nothing, and the cursor
//! is compared by step identity rather than monotonic time, so a rewind back
//! into an earlier step fires that step's batch again.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::{CameraError, CameraRig};
use crate::registry::{DispatchError, WorldRegistry};
use scene_entity::WorldOp;

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Cut to a named camera.
    SetCamera { camera: String },
    /// Apply an operation to the first entity of a category.
    WorldEvent {
        target: String,
        #[serde(flatten)]
        op: WorldOp,
    },
}

/// Errors from registering an action.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// The step index falls outside the timeline.
    #[error("step {step} outside timeline of {len} steps")]
    StepOutOfRange { step: i64, len: usize },
}

/// Errors from executing a step's batch.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// A world event could not be dispatched.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A camera cut named an unknown camera.
    #[error(transparent)]
    Camera(#[from] CameraError),
}

/// Fixed-length sequence of per-step action batches with a firing cursor.
#[derive(Debug)]
pub struct TimelineScheduler {
    slots: Vec<Vec<Action>>,
    /// Step whose batch last fired. `None` until the first advance.
    cursor: Option<i64>,
}

impl TimelineScheduler {
    /// A timeline of `steps` empty slots.
    #[must_use]
    pub fn new(steps: usize) -> Self {
        Self {
            slots: vec![Vec::new(); steps],
            cursor: None,
        }
    }

    /// Append an action to the batch at `step`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::StepOutOfRange`] when `step` is negative or
    /// past the last slot; the timeline is unchanged.
    pub fn register(&mut self, step: i64, action: Action) -> Result<(), TimelineError> {
        let index = usize::try_from(step).ok().filter(|&i| i < self.slots.len());
        match index {
            Some(index) => {
                self.slots[index].push(action);
                Ok(())
            }
            None => Err(TimelineError::StepOutOfRange {
                step,
                len: self.slots.len(),
            }),
        }
    }

    /// Advance to scene time `time` (seconds). Returns the batch to fire, or
    /// `None` when the step already fired or holds nothing to run.
    ///
    /// Steps past the end of the timeline move the cursor but fire nothing.
    pub fn advance(&mut self, time: f64) -> Option<&[Action]> {
        let step = time.floor() as i64;
        if self.cursor == Some(step) {
            return None;
        }
        self.cursor = Some(step);
        if step < 0 {
            return None;
        }
        self.slots.get(step as usize).map(Vec::as_slice)
    }

    /// Total registered actions across all steps.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    /// The last step whose batch fired.
    #[must_use]
    pub fn cursor(&self) -> Option<i64> {
        self.cursor
    }

    /// Advance to `time` and execute the due batch against the world.
    ///
    /// Actions run in registration order. The first failure aborts the rest
    /// of this step's batch; the step still counts as fired, so the batch is
    /// not retried on the next frame.
    ///
    /// # Errors
    ///
    /// Returns the first action's [`ActionError`].
    pub fn tick(
        &mut self,
        time: f64,
        registry: &mut WorldRegistry,
        rig: &mut CameraRig,
    ) -> Result<(), ActionError> {
        let step = time.floor() as i64;
        let Some(batch) = self.advance(time) else {
            return Ok(());
        };
        if !batch.is_empty() {
            debug!(step, actions = batch.len(), "timeline step firing");
        }
        for action in batch {
            match action {
                Action::SetCamera { camera } => rig.activate(camera)?,
                Action::WorldEvent { target, op } => registry.dispatch(target, op)?,
            }
        }
        Ok(())
    }
}
