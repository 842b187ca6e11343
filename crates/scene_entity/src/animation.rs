//! Animation clip state for animated entities.
//!
//! The mixer that actually samples skeletal poses lives with the renderer;
//! the core tracks which clip is active, the cross-fade between clips, and
//! play-once clips that revert to the previous clip when their duration
//! elapses.

use std::collections::HashMap;

use crate::assets::ClipInfo;

/// Fixed cross-fade duration between two clips, in seconds.
pub const BLEND_SECONDS: f32 = 0.5;

/// Errors from clip selection.
#[derive(Debug, thiserror::Error)]
pub enum AnimationError {
    /// The entity's asset carries no clip with this name.
    #[error("unknown animation clip: {0}")]
    UnknownClip(String),
}

#[derive(Debug, Clone)]
struct PlayOnce {
    revert_to: String,
    remaining: f32,
}

/// Clip selection state for one animated entity.
#[derive(Debug, Clone)]
pub struct AnimationState {
    /// Clip name to duration, from the resolved asset.
    clips: HashMap<String, f32>,
    current: String,
    blend_remaining: f32,
    play_once: Option<PlayOnce>,
}

impl AnimationState {
    /// Create the state with the entity's clip table and its starting clip.
    ///
    /// The starting clip is accepted even if the table does not carry it —
    /// the renderer simply has nothing to play, matching an asset whose
    /// default clip was misnamed. Switching *to* an unknown clip later is an
    /// error.
    #[must_use]
    pub fn new(clips: &[ClipInfo], initial: &str) -> Self {
        Self {
            clips: clips
                .iter()
                .map(|clip| (clip.name.clone(), clip.duration))
                .collect(),
            current: initial.to_string(),
            blend_remaining: 0.0,
            play_once: None,
        }
    }

    /// The name of the active clip.
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Returns `true` while a cross-fade is in progress.
    #[must_use]
    pub fn is_blending(&self) -> bool {
        self.blend_remaining > 0.0
    }

    /// Returns `true` if the active clip loops indefinitely.
    #[must_use]
    pub fn looping(&self) -> bool {
        self.play_once.is_none()
    }

    /// Switch to `name`.
    ///
    /// A no-op when `name` is already active. Otherwise starts a fixed
    /// cross-fade from the previous clip. With `play_once` the previous clip
    /// name is restored once the new clip's duration elapses; without it the
    /// new clip loops.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationError::UnknownClip`] if the clip table has no
    /// entry for `name`; state is unchanged.
    pub fn set_clip(&mut self, name: &str, play_once: bool) -> Result<(), AnimationError> {
        if self.current == name {
            return Ok(());
        }
        let duration = *self
            .clips
            .get(name)
            .ok_or_else(|| AnimationError::UnknownClip(name.to_string()))?;

        let previous = std::mem::replace(&mut self.current, name.to_string());
        self.blend_remaining = BLEND_SECONDS;
        self.play_once = play_once.then(|| PlayOnce {
            revert_to: previous,
            remaining: duration,
        });
        Ok(())
    }

    /// Advance clip time by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        if self.blend_remaining > 0.0 {
            self.blend_remaining = (self.blend_remaining - dt).max(0.0);
        }

        let mut revert = None;
        if let Some(play_once) = self.play_once.as_mut() {
            play_once.remaining -= dt;
            if play_once.remaining <= 0.0 {
                revert = self.play_once.take().map(|p| p.revert_to);
            }
        }
        if let Some(name) = revert {
            // The previous clip came from the same table, so this cannot fail.
            let _ = self.set_clip(&name, false);
        }
    }
}
