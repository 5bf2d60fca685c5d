//! Time-driven interpolation of the carousel position
//!
//! An [`AnimationRun`] owns no item state. It only knows where it started,
//! how far it travels (already resolved for direction), and how long it
//! takes. The controller samples it once per display tick.

use std::time::{Duration, Instant};

use crate::circular::{self, Direction};
use crate::easing::{EasingType, EasingTypeExt};
use crate::timing::{is_complete, progress};

/// One sample of a running animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationStep {
    /// Wrapped position for this frame
    pub position: f64,
    /// True on the final frame
    pub finished: bool,
}

/// Active position animation
#[derive(Debug, Clone)]
pub struct AnimationRun {
    target_index: usize,
    start_position: f64,
    change: f64,
    duration: Duration,
    easing: EasingType,
    activate_selection: bool,
    /// Stamped by the first tick, like a display link's first callback
    started_at: Option<Instant>,
}

impl AnimationRun {
    /// Plan an animation from `start_position` to the slot at `target_position`
    pub fn new(
        target_index: usize,
        start_position: f64,
        target_position: f64,
        direction: Direction,
        duration: Duration,
        easing: EasingType,
        activate_selection: bool,
    ) -> Self {
        Self {
            target_index,
            start_position,
            change: circular::resolve_change(start_position, target_position, direction),
            duration,
            easing,
            activate_selection,
            started_at: None,
        }
    }

    #[inline]
    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// Signed distance travelled over the whole run
    #[inline]
    pub fn change(&self) -> f64 {
        self.change
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[inline]
    pub fn activates_selection(&self) -> bool {
        self.activate_selection
    }

    #[inline]
    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Advance to `now` and return the position for this frame
    pub fn step(&mut self, now: Instant) -> AnimationStep {
        let start = *self.started_at.get_or_insert(now);
        let finished = is_complete(start, now, self.duration);
        let t = if finished {
            1.0
        } else {
            self.easing.apply(progress(start, now, self.duration))
        };
        AnimationStep {
            position: circular::wrap(self.start_position + self.change * t),
            finished,
        }
    }
}
