//! The carousel controller
//!
//! Owns the continuous position, the single active driver, and the
//! selection policy. Hosts feed it gesture callbacks and display ticks; it
//! recomputes every placement from the position alone and pushes the result
//! down to the item presenters.
//!
//! Gesture offsets are in the host's scroll units. `K`
//! ([`CarouselConfig::drag_sensitivity`]) converts an offset delta into a
//! position delta; at the default one revolution spans 2000 units.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use crate::animation::AnimationRun;
use crate::catalog::ItemSet;
use crate::circular::{self, Direction};
use crate::collaborators::{
    AssetFetcher, Haptics, NoopFetcher, NoopHaptics, NoopPlayback, PlaybackFactory,
};
use crate::config::CarouselConfig;
use crate::geometry::{Point, Size};
use crate::layout::{self, ItemPlacement, LayoutParams};
use crate::presenter::ItemPresenter;

/// Scroll offset the host is re-centred on after every gesture
pub const SCROLL_ORIGIN: f64 = 5000.0;
/// Scrollable extent the host should offer
pub const CONTENT_EXTENT: f64 = 10_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// Finger (or pointer) is down
    Tracking,
    /// Released with momentum; the host is decelerating
    Decelerating,
}

/// Baseline captured when a drag starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub start_offset: f64,
    pub start_position: f64,
    pub phase: DragPhase,
}

/// The one mechanism currently allowed to move the position
#[derive(Debug, Clone, Default)]
pub enum Driver {
    #[default]
    Idle,
    Dragging(DragSession),
    Animating(AnimationRun),
}

pub struct CarouselController {
    config: CarouselConfig,
    params: LayoutParams,
    count: usize,
    position: f64,
    current_index: usize,
    driver: Driver,
    central: BTreeSet<usize>,
    presenters: Vec<ItemPresenter>,
    /// Paint order, front-most last
    z_order: Vec<usize>,
    haptics: Box<dyn Haptics>,
    visible: bool,
    viewport: Option<Size>,
    placements: Vec<ItemPlacement>,
    pending_offset_reset: Option<f64>,
    entered: bool,
}

impl std::fmt::Debug for CarouselController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarouselController")
            .field("count", &self.count)
            .field("position", &self.position)
            .field("current_index", &self.current_index)
            .field("driver", &self.driver)
            .field("central", &self.central)
            .field("visible", &self.visible)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl CarouselController {
    pub fn new(
        items: ItemSet,
        config: CarouselConfig,
        factory: &dyn PlaybackFactory,
        fetcher: &dyn AssetFetcher,
        haptics: Box<dyn Haptics>,
    ) -> Self {
        let presenters: Vec<ItemPresenter> = items
            .iter()
            .cloned()
            .map(|sticker| ItemPresenter::new(sticker, factory, fetcher))
            .collect();
        let count = presenters.len();
        let params = LayoutParams {
            clamp_appearance: config.clamp_appearance,
            ..LayoutParams::default()
        };

        tracing::debug!(count, "Carousel created");

        Self {
            config,
            params,
            count,
            position: 0.0,
            current_index: 0,
            driver: Driver::Idle,
            central: BTreeSet::new(),
            presenters,
            z_order: (0..count).collect(),
            haptics,
            visible: true,
            viewport: None,
            placements: Vec::new(),
            pending_offset_reset: None,
            entered: false,
        }
    }

    /// Controller with no-op playback, fetching and haptics
    pub fn headless(items: ItemSet, config: CarouselConfig) -> Self {
        Self::new(items, config, &NoopPlayback, &NoopFetcher, Box::new(NoopHaptics))
    }

    // ---- state -------------------------------------------------------

    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn slot_width(&self) -> f64 {
        circular::slot_width(self.count)
    }

    #[inline]
    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        matches!(self.driver, Driver::Animating(_))
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        matches!(self.driver, Driver::Dragging(_))
    }

    pub fn drag_phase(&self) -> Option<DragPhase> {
        match &self.driver {
            Driver::Dragging(session) => Some(session.phase),
            _ => None,
        }
    }

    /// Indices currently playing their effect (at most one)
    pub fn central_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.central.iter().copied()
    }

    /// Placements from the last layout pass
    #[inline]
    pub fn placements(&self) -> &[ItemPlacement] {
        &self.placements
    }

    #[inline]
    pub fn presenters(&self) -> &[ItemPresenter] {
        &self.presenters
    }

    /// Item indices in paint order, front-most last
    #[inline]
    pub fn z_order(&self) -> &[usize] {
        &self.z_order
    }

    #[inline]
    pub fn viewport(&self) -> Option<Size> {
        self.viewport
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    /// True while frames are needed: an animation runs or an overlay fades
    pub fn needs_tick(&self) -> bool {
        self.is_animating() || self.presenters.iter().any(ItemPresenter::is_transitioning)
    }

    // ---- layout ------------------------------------------------------

    /// Lay out for `viewport`; the first pass also starts the entrance animation
    pub fn update_layout(&mut self, viewport: Size) {
        if viewport.is_empty() {
            tracing::debug!(?viewport, "Ignoring layout with empty viewport");
            return;
        }
        self.viewport = Some(viewport);

        if self.entered {
            self.relayout();
            return;
        }

        self.entered = true;
        self.reset_scroll_position();
        self.relayout();
        tracing::info!(count = self.count, "Carousel entering");
        self.animate_to(
            self.config.entrance_index,
            true,
            self.config.entrance_duration(),
            Direction::Clockwise,
        );
    }

    /// Show or hide the carousel's context; re-lays out on change
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        self.relayout();
    }

    fn relayout(&mut self) {
        let Some(viewport) = self.viewport else {
            return;
        };
        self.placements =
            layout::compute_layout(self.count, self.position, viewport, self.visible, &self.params);
        self.current_index = circular::nearest_index(self.position, self.count);
        for (presenter, placement) in self.presenters.iter_mut().zip(&self.placements) {
            presenter.apply(placement);
        }
    }

    fn set_position(&mut self, position: f64) {
        self.position = circular::wrap(position);
    }

    // ---- gestures ----------------------------------------------------

    /// A drag started at scroll `offset`; replaces a running animation
    pub fn begin_drag(&mut self, offset: f64) {
        if self.count == 0 {
            return;
        }
        match &self.driver {
            Driver::Dragging(_) => return,
            Driver::Animating(run) => {
                tracing::debug!(target = run.target_index(), "Drag interrupts animation");
            }
            Driver::Idle => {}
        }
        self.driver = Driver::Dragging(DragSession {
            start_offset: offset,
            start_position: self.position,
            phase: DragPhase::Tracking,
        });
    }

    /// The pointer caught a decelerating carousel; the open session tracks again
    pub fn resume_tracking(&mut self) {
        if let Driver::Dragging(session) = &mut self.driver {
            session.phase = DragPhase::Tracking;
        }
    }

    /// The host's scroll offset moved to `offset`
    pub fn update_drag(&mut self, offset: f64) {
        let Driver::Dragging(session) = &self.driver else {
            return;
        };
        let delta = offset - session.start_offset;
        let position = session.start_position + delta * self.config.drag_sensitivity;
        self.set_position(position);

        let index = circular::nearest_index(self.position, self.count);
        if index != self.current_index {
            self.current_index = index;
            self.haptics.tap();
        }

        self.relayout();
    }

    /// Round the host's predicted resting offset to a whole number of slots
    pub fn end_drag(&self, predicted_target_offset: f64, velocity: f64) -> f64 {
        let Driver::Dragging(session) = &self.driver else {
            return predicted_target_offset;
        };
        let sensitivity = self.config.drag_sensitivity;
        if velocity == 0.0 || self.count == 0 || sensitivity == 0.0 {
            return predicted_target_offset;
        }

        let width = self.slot_width();
        let raw_delta = (predicted_target_offset - session.start_offset) * sensitivity;
        let snap_count = (raw_delta / width).round();
        session.start_offset + snap_count * width / sensitivity
    }

    /// The pointer lifted; snap now unless the host keeps decelerating
    pub fn drag_settled(&mut self, will_decelerate: bool) {
        let Driver::Dragging(session) = &mut self.driver else {
            return;
        };
        if will_decelerate {
            session.phase = DragPhase::Decelerating;
            return;
        }

        self.reset_scroll_position();
        let index = circular::nearest_index(self.position, self.count);
        self.animate_to(index, true, self.config.settle_duration(), Direction::ShortestPath);
    }

    /// The host's deceleration came to rest
    pub fn deceleration_ended(&mut self) {
        self.reset_scroll_position();
        self.selection_activation();
    }

    /// Tap at `point` in viewport coordinates; ignored while anything moves
    /// or while the carousel is hidden
    pub fn tap(&mut self, point: Point) -> bool {
        if !self.visible {
            tracing::debug!("Tap ignored while hidden");
            return false;
        }
        if !matches!(self.driver, Driver::Idle) {
            tracing::debug!("Tap ignored while a driver is active");
            return false;
        }
        let Some(index) = layout::hit_test(&self.placements, point) else {
            return false;
        };
        self.animate_to(index, true, self.config.tap_duration(), Direction::ShortestPath);
        true
    }

    /// Drop the drag baseline and ask the host to re-centre its offset
    fn reset_scroll_position(&mut self) {
        if self.is_dragging() {
            self.driver = Driver::Idle;
        }
        let height = self.viewport.map_or(0.0, |size| size.height);
        self.pending_offset_reset = Some(SCROLL_ORIGIN - height * 0.5);
    }

    /// Offset the host should jump to, if a reset happened since the last call
    pub fn take_offset_reset(&mut self) -> Option<f64> {
        self.pending_offset_reset.take()
    }

    // ---- programmatic navigation ------------------------------------

    /// Animate to `target_index`; out-of-range indices are ignored
    pub fn animate_to(
        &mut self,
        target_index: usize,
        activate_selection: bool,
        duration: Duration,
        direction: Direction,
    ) {
        if target_index >= self.count {
            tracing::debug!(target_index, count = self.count, "Ignoring out-of-range target");
            return;
        }
        self.current_index = target_index;
        let run = AnimationRun::new(
            target_index,
            self.position,
            circular::index_position(target_index, self.count),
            direction,
            self.config.scaled(duration),
            self.config.easing,
            activate_selection,
        );
        tracing::debug!(
            target_index,
            change = run.change(),
            duration_ms = run.duration().as_millis() as u64,
            "Animation started"
        );
        self.driver = Driver::Animating(run);
    }

    /// Place `index` at the front immediately
    pub fn jump_to(&mut self, index: usize, activate_selection: bool) {
        if index >= self.count {
            return;
        }
        self.driver = Driver::Idle;
        self.set_position(circular::index_position(index, self.count));
        self.relayout();
        if activate_selection {
            self.selection_activation();
        }
    }

    /// Animate one slot forward; ignored during a drag
    pub fn go_to_next(&mut self) {
        self.step_by(1);
    }

    /// Animate one slot back; ignored during a drag
    pub fn go_to_previous(&mut self) {
        self.step_by(self.count.saturating_sub(1));
    }

    fn step_by(&mut self, steps: usize) {
        if self.count == 0 || self.is_dragging() {
            return;
        }
        let base = match &self.driver {
            Driver::Animating(run) => run.target_index(),
            _ => self.current_index,
        };
        let target = (base + steps) % self.count;
        self.animate_to(target, true, self.config.tap_duration(), Direction::ShortestPath);
    }

    // ---- frame driver -----------------------------------------------

    /// Display tick. Returns whether more frames are wanted.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Driver::Animating(run) = &mut self.driver {
            let step = run.step(now);
            let activate = run.activates_selection();
            self.set_position(step.position);
            self.relayout();

            if step.finished {
                self.driver = Driver::Idle;
                tracing::debug!(position = self.position, "Animation finished");
                if activate {
                    self.selection_activation();
                }
            }
        }

        for presenter in &mut self.presenters {
            presenter.tick(now);
        }

        self.needs_tick()
    }

    /// Mark the item nearest the front as central and start its effect
    pub fn selection_activation(&mut self) {
        if self.count == 0 {
            return;
        }
        let index = circular::nearest_index(self.position, self.count);
        if self.central.contains(&index) {
            return;
        }

        for (i, presenter) in self.presenters.iter_mut().enumerate() {
            presenter.set_central(i == index);
        }
        self.z_order.retain(|&i| i != index);
        self.z_order.push(index);

        self.central.clear();
        self.central.insert(index);
        tracing::debug!(index, "Selection activated");
    }
}
