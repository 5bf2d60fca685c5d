//! Pointer gestures to scroll-view callbacks
//!
//! The terminal has no native scroll view, so [`ScrollHost`] plays that
//! role for the carousel: it owns a vertical content offset, turns pointer
//! presses and drags into drag callbacks, estimates release velocity, runs
//! its own momentum deceleration towards the target the controller snapped,
//! and recognises taps. All coordinates are in layout points.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use whirl_core::controller::{CONTENT_EXTENT, SCROLL_ORIGIN};
use whirl_core::timing::lerp;
use whirl_core::{CarouselController, Point};

/// Movement (points) before a press becomes a drag
const TOUCH_SLOP: f64 = 6.0;

/// Only samples this recent contribute to the release velocity
const VELOCITY_HORIZON: Duration = Duration::from_millis(100);

/// If the pointer rested this long before release, there is no fling
const ASSUME_STOPPED: Duration = Duration::from_millis(40);

/// Velocities below this (points/ms) settle without momentum
const MIN_FLING_VELOCITY: f64 = 0.05;

/// Per-millisecond velocity decay used to predict the resting offset
pub const DECELERATION_RATE: f64 = 0.998;

const MIN_DECELERATION: Duration = Duration::from_millis(120);
const MAX_DECELERATION: Duration = Duration::from_millis(2000);

/// Recent `(time, offset)` samples of an active drag
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: VecDeque<(Instant, f64)>,
}

impl VelocityTracker {
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn add(&mut self, time: Instant, offset: f64) {
        self.samples.push_back((time, offset));
        while let Some(&(oldest, _)) = self.samples.front() {
            if time.saturating_duration_since(oldest) > VELOCITY_HORIZON {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Offset velocity in points per millisecond at `now`
    pub fn velocity(&self, now: Instant) -> f64 {
        let (Some(&(first_time, first)), Some(&(last_time, last))) =
            (self.samples.front(), self.samples.back())
        else {
            return 0.0;
        };
        if now.saturating_duration_since(last_time) > ASSUME_STOPPED {
            return 0.0;
        }
        let elapsed_ms = last_time.saturating_duration_since(first_time).as_secs_f64() * 1000.0;
        if elapsed_ms <= 0.0 {
            return 0.0;
        }
        (last - first) / elapsed_ms
    }
}

/// Where the offset would come to rest under free deceleration
pub fn predicted_target(offset: f64, velocity: f64) -> f64 {
    offset + velocity * DECELERATION_RATE / (1.0 - DECELERATION_RATE)
}

/// Move a snapped target by whole slots until it lies within the content
///
/// `slot_units` is the offset distance of one item slot.
pub fn bounded_target(target: f64, slot_units: f64) -> f64 {
    if !slot_units.is_finite() || slot_units <= 0.0 || slot_units > CONTENT_EXTENT {
        return target.clamp(0.0, CONTENT_EXTENT);
    }
    if target < 0.0 {
        target + (-target / slot_units).ceil() * slot_units
    } else if target > CONTENT_EXTENT {
        target - ((target - CONTENT_EXTENT) / slot_units).ceil() * slot_units
    } else {
        target
    }
}

/// Momentum animation towards a snapped target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deceleration {
    from: f64,
    to: f64,
    duration: Duration,
    started_at: Option<Instant>,
}

impl Deceleration {
    /// Cubic ease-out whose initial speed matches the release velocity
    pub fn new(from: f64, to: f64, velocity: f64) -> Self {
        let distance = (to - from).abs();
        let ms = if velocity.abs() > 0.0 {
            3.0 * distance / velocity.abs()
        } else {
            0.0
        };
        let duration = Duration::from_secs_f64(ms / 1000.0).clamp(MIN_DECELERATION, MAX_DECELERATION);
        Self {
            from,
            to,
            duration,
            started_at: None,
        }
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.to
    }

    /// Offset at `now` and whether the motion finished
    pub fn sample(&mut self, now: Instant) -> (f64, bool) {
        let start = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_duration_since(start);
        if elapsed >= self.duration {
            return (self.to, true);
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let inv = 1.0 - t;
        let eased = 1.0 - inv * inv * inv;
        (lerp(self.from, self.to, eased), false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollPhase {
    Idle,
    /// Pointer down, not yet moved past the slop
    Pressed,
    /// Pointer down and dragging
    Tracking,
    /// Released with momentum
    Decelerating(Deceleration),
}

/// Terminal stand-in for a native scroll view
#[derive(Debug, Clone)]
pub struct ScrollHost {
    offset: f64,
    phase: ScrollPhase,
    press_point: Point,
    press_offset: f64,
    tracker: VelocityTracker,
}

impl Default for ScrollHost {
    fn default() -> Self {
        Self {
            offset: SCROLL_ORIGIN,
            phase: ScrollPhase::Idle,
            press_point: Point::default(),
            press_offset: SCROLL_ORIGIN,
            tracker: VelocityTracker::default(),
        }
    }
}

impl ScrollHost {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    #[inline]
    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    #[inline]
    pub fn is_decelerating(&self) -> bool {
        matches!(self.phase, ScrollPhase::Decelerating(_))
    }

    /// Apply a pending origin reset requested by the controller
    pub fn sync(&mut self, controller: &mut CarouselController) {
        if let Some(offset) = controller.take_offset_reset() {
            tracing::trace!(offset, "Scroll offset re-centred");
            self.offset = offset;
        }
    }

    pub fn press(&mut self, point: Point, now: Instant, controller: &mut CarouselController) {
        self.press_point = point;
        self.tracker.reset();

        if let ScrollPhase::Decelerating(_) = self.phase {
            // Catching a moving carousel resumes the drag from where it is
            self.press_offset = self.offset;
            self.phase = ScrollPhase::Tracking;
            controller.resume_tracking();
        } else {
            self.sync(controller);
            self.press_offset = self.offset;
            self.phase = ScrollPhase::Pressed;
        }
        self.tracker.add(now, self.offset);
    }

    pub fn drag(&mut self, point: Point, now: Instant, controller: &mut CarouselController) {
        match self.phase {
            ScrollPhase::Pressed => {
                let dx = point.x - self.press_point.x;
                let dy = point.y - self.press_point.y;
                if (dx * dx + dy * dy).sqrt() < TOUCH_SLOP {
                    return;
                }
                self.phase = ScrollPhase::Tracking;
                controller.begin_drag(self.press_offset);
            }
            ScrollPhase::Tracking => {}
            _ => return,
        }

        // Dragging upwards scrolls content forward
        self.offset = (self.press_offset + (self.press_point.y - point.y)).clamp(0.0, CONTENT_EXTENT);
        self.tracker.add(now, self.offset);
        controller.update_drag(self.offset);
    }

    pub fn release(&mut self, point: Point, now: Instant, controller: &mut CarouselController) {
        match self.phase {
            ScrollPhase::Pressed => {
                self.phase = ScrollPhase::Idle;
                controller.tap(point);
            }
            ScrollPhase::Tracking => {
                let mut velocity = self.tracker.velocity(now);
                if velocity.abs() < MIN_FLING_VELOCITY {
                    velocity = 0.0;
                }
                let predicted = predicted_target(self.offset, velocity).clamp(0.0, CONTENT_EXTENT);
                let slot_units = controller.slot_width() / controller.config().drag_sensitivity;
                let target = bounded_target(controller.end_drag(predicted, velocity), slot_units);
                let will_decelerate = velocity != 0.0 && target != self.offset;
                tracing::debug!(velocity, predicted, target, will_decelerate, "Drag released");

                controller.drag_settled(will_decelerate);
                if will_decelerate {
                    self.phase = ScrollPhase::Decelerating(Deceleration::new(self.offset, target, velocity));
                } else {
                    self.phase = ScrollPhase::Idle;
                    self.sync(controller);
                }
            }
            _ => {}
        }
        self.tracker.reset();
    }

    /// Advance momentum; returns whether more frames are wanted
    pub fn tick(&mut self, now: Instant, controller: &mut CarouselController) -> bool {
        let ScrollPhase::Decelerating(mut deceleration) = self.phase else {
            return false;
        };
        let (offset, finished) = deceleration.sample(now);
        self.offset = offset;
        controller.update_drag(offset);

        if finished {
            self.phase = ScrollPhase::Idle;
            controller.deceleration_ended();
            self.sync(controller);
            false
        } else {
            self.phase = ScrollPhase::Decelerating(deceleration);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whirl_core::{CarouselConfig, ItemSet, Size, StickerCatalog};

    const VIEWPORT: Size = Size::new(960.0, 640.0);

    /// Controller laid out with the entrance animation finished
    fn controller(now: Instant) -> CarouselController {
        let items = ItemSet::from_items(StickerCatalog::demo().stickers()[..10].to_vec());
        let mut controller = CarouselController::headless(items, CarouselConfig::default());
        controller.update_layout(VIEWPORT);
        controller.tick(now);
        controller.tick(now + Duration::from_secs(1));
        controller
    }

    fn ms(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn test_velocity_tracker() {
        let base = Instant::now();
        let mut tracker = VelocityTracker::default();
        tracker.add(base, 0.0);
        tracker.add(ms(base, 10), 20.0);
        tracker.add(ms(base, 20), 40.0);
        assert!((tracker.velocity(ms(base, 20)) - 2.0).abs() < 1e-9);
        // Resting before release kills the fling
        assert_eq!(tracker.velocity(ms(base, 100)), 0.0);
    }

    #[test]
    fn test_velocity_horizon_drops_old_samples() {
        let base = Instant::now();
        let mut tracker = VelocityTracker::default();
        tracker.add(base, 0.0);
        tracker.add(ms(base, 200), 100.0);
        tracker.add(ms(base, 210), 110.0);
        assert!((tracker.velocity(ms(base, 210)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounded_target_stays_on_slots() {
        assert_eq!(bounded_target(480.0, 200.0), 480.0);
        assert_eq!(bounded_target(-120.0, 200.0), 80.0);
        assert_eq!(bounded_target(-400.0, 200.0), 0.0);
        assert_eq!(bounded_target(CONTENT_EXTENT + 50.0, 200.0), CONTENT_EXTENT - 150.0);
        // No usable slot size: plain clamp
        assert_eq!(bounded_target(-5.0, 0.0), 0.0);
        assert_eq!(bounded_target(-5.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_hard_fling_down_keeps_offset_in_content() {
        let base = Instant::now();
        let mut controller = controller(base);
        let mut host = ScrollHost::new();
        host.sync(&mut controller);
        let start_offset = host.offset();

        let start = ms(base, 2000);
        host.press(Point::new(480.0, 0.0), start, &mut controller);
        for step in 1..=5u64 {
            host.drag(Point::new(480.0, step as f64 * 120.0), ms(start, step * 10), &mut controller);
        }
        host.release(Point::new(480.0, 600.0), ms(start, 55), &mut controller);

        let ScrollPhase::Decelerating(deceleration) = host.phase() else {
            panic!("expected momentum, got {:?}", host.phase());
        };
        let target = deceleration.target();
        assert!((0.0..=CONTENT_EXTENT).contains(&target), "target {target}");
        let slots = (target - start_offset) / 200.0;
        assert!((slots - slots.round()).abs() < 1e-6, "slots {slots}");

        let mut now = ms(start, 60);
        while host.tick(now, &mut controller) {
            assert!(host.offset() >= 0.0);
            now += Duration::from_millis(16);
        }
    }

    #[test]
    fn test_press_during_deceleration_resumes_tracking() {
        let base = Instant::now();
        let mut controller = controller(base);
        let mut host = ScrollHost::new();
        host.sync(&mut controller);

        let start = ms(base, 2000);
        host.press(Point::new(480.0, 600.0), start, &mut controller);
        for step in 1..=5u64 {
            host.drag(Point::new(480.0, 600.0 - step as f64 * 30.0), ms(start, step * 10), &mut controller);
        }
        host.release(Point::new(480.0, 450.0), ms(start, 55), &mut controller);
        assert!(host.is_decelerating());
        host.tick(ms(start, 60), &mut controller);
        host.tick(ms(start, 200), &mut controller);
        let caught_at = host.offset();

        host.press(Point::new(480.0, 300.0), ms(start, 210), &mut controller);
        assert_eq!(host.phase(), ScrollPhase::Tracking);
        assert_eq!(controller.drag_phase(), Some(whirl_core::DragPhase::Tracking));

        // Dragging continues from where the carousel was caught
        host.drag(Point::new(480.0, 280.0), ms(start, 220), &mut controller);
        assert_eq!(host.offset(), caught_at + 20.0);
    }

    #[test]
    fn test_press_release_without_move_is_tap() {
        let base = Instant::now();
        let mut controller = controller(base);
        let mut host = ScrollHost::new();
        host.sync(&mut controller);

        let target = controller.placements()[2].transformed_frame().center();
        let start = ms(base, 2000);
        host.press(target, start, &mut controller);
        host.drag(Point::new(target.x + 2.0, target.y), ms(start, 5), &mut controller);
        host.release(target, ms(start, 10), &mut controller);

        assert_eq!(host.phase(), ScrollPhase::Idle);
        assert!(controller.is_animating(), "tap starts an animation");
    }

    #[test]
    fn test_slow_drag_settles_on_nearest_item() {
        let base = Instant::now();
        let mut controller = controller(base);
        let mut host = ScrollHost::new();
        host.sync(&mut controller);
        let origin = host.offset();

        let start = ms(base, 2000);
        let press = Point::new(480.0, 400.0);
        host.press(press, start, &mut controller);
        // Move up 150 points slowly, then rest
        for step in 1..=15u64 {
            host.drag(Point::new(480.0, 400.0 - step as f64 * 10.0), ms(start, step * 20), &mut controller);
        }
        assert!(controller.is_dragging());
        assert_eq!(host.offset(), origin + 150.0);

        host.release(Point::new(480.0, 250.0), ms(start, 500), &mut controller);
        assert_eq!(host.phase(), ScrollPhase::Idle);
        assert!(controller.is_animating(), "settle snap runs");
        assert_eq!(host.offset(), SCROLL_ORIGIN - VIEWPORT.height * 0.5);
    }

    #[test]
    fn test_fling_decelerates_to_slot_boundary() {
        let base = Instant::now();
        let mut controller = controller(base);
        let mut host = ScrollHost::new();
        host.sync(&mut controller);

        let start = ms(base, 2000);
        let press = Point::new(480.0, 600.0);
        host.press(press, start, &mut controller);
        for step in 1..=5u64 {
            host.drag(Point::new(480.0, 600.0 - step as f64 * 30.0), ms(start, step * 10), &mut controller);
        }
        let release_offset = host.offset();
        host.release(Point::new(480.0, 450.0), ms(start, 55), &mut controller);

        let ScrollPhase::Decelerating(deceleration) = host.phase() else {
            panic!("expected momentum, got {:?}", host.phase());
        };
        assert_eq!(controller.drag_phase(), Some(whirl_core::DragPhase::Decelerating));

        // Target lies a whole number of slots (200 units each) from the drag start
        let slots = (deceleration.target() - release_offset + 150.0) / 200.0;
        assert!((slots - slots.round()).abs() < 1e-6, "slots {slots}");

        let mut now = ms(start, 60);
        while host.tick(now, &mut controller) {
            now += Duration::from_millis(16);
        }
        assert!(!controller.is_dragging());
        let slot = controller.position() / controller.slot_width();
        assert!((slot - slot.round()).abs() < 1e-6, "rests on a slot: {slot}");
        assert_eq!(
            controller.central_indices().collect::<Vec<_>>(),
            vec![controller.current_index()]
        );
    }
}
