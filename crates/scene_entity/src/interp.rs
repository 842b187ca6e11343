//! Scalar interpolation slots.
//!
//! Speed and rotation changes are not applied instantly: each starts a
//! linear interpolation from the current value to the target, sampled once
//! per tick. An entity owns at most one in-flight interpolation per field —
//! starting a new one replaces whatever was running, so two overlapping
//! changes can never fight over the same field.

use scene_math::lerp;

/// A linear interpolation from a start value to a target over a fixed
/// duration.
///
/// Once the accumulated time reaches the duration the sampled value snaps
/// exactly to the target, with no floating-point residue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolation {
    start: f32,
    target: f32,
    duration: f32,
    elapsed: f32,
}

impl Interpolation {
    /// Begin an interpolation. A non-positive `duration` completes on the
    /// first sample.
    #[must_use]
    pub fn new(start: f32, target: f32, duration: f32) -> Self {
        Self {
            start,
            target,
            duration,
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` seconds and return the current sampled value.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.target
        } else {
            lerp(self.start, self.target, self.elapsed / self.duration)
        }
    }

    /// Returns `true` once the duration has elapsed and the value has
    /// snapped to the target.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_sample() {
        let mut interp = Interpolation::new(0.0, 10.0, 2.0);
        assert!((interp.advance(1.0) - 5.0).abs() < 1e-6);
        assert!(!interp.finished());
    }

    #[test]
    fn test_snaps_exactly_to_target() {
        let mut interp = Interpolation::new(1.0, 4.0, 0.9);
        // Three irregular ticks that overshoot the duration.
        interp.advance(0.4);
        interp.advance(0.4);
        let value = interp.advance(0.4);
        assert_eq!(value, 4.0);
        assert!(interp.finished());
    }

    #[test]
    fn test_zero_dt_returns_start_unchanged() {
        let mut interp = Interpolation::new(3.0, 9.0, 1.0);
        assert_eq!(interp.advance(0.0), 3.0);
        assert!(!interp.finished());
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let mut interp = Interpolation::new(3.0, 9.0, 0.0);
        assert_eq!(interp.advance(0.0), 9.0);
        assert!(interp.finished());
    }

    #[test]
    fn test_decreasing_interpolation() {
        let mut interp = Interpolation::new(8.0, 0.0, 2.0);
        assert!((interp.advance(0.5) - 6.0).abs() < 1e-6);
        assert!((interp.advance(0.5) - 4.0).abs() < 1e-6);
    }
}
