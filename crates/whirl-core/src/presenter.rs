//! Per-sticker presentation
//!
//! An [`ItemPresenter`] receives its placement from the controller on every
//! layout pass and relays visibility and centrality to the playback engine.
//! It owns the effect overlay: a second animation shown only while the item
//! is both visible and central, faded out and in on a short timeline.

use std::time::{Duration, Instant};

use crate::catalog::Sticker;
use crate::collaborators::{AssetFetcher, Playback, PlaybackFactory};
use crate::geometry::{Rect, Size};
use crate::layout::ItemPlacement;
use crate::timing::{is_complete, progress};

/// Bounds the still image is fitted into
const IMAGE_BOUNDS: Size = Size::new(240.0, 240.0);
/// Bounds the animated content is decoded at
const DECODE_BOUNDS: Size = Size::new(400.0, 400.0);
/// Fallback pixel size for stickers without dimensions
const DEFAULT_DIMENSIONS: Size = Size::new(512.0, 512.0);

/// Overlay outset relative to the image size
const EFFECT_OUTSET: f64 = 0.245;
const EFFECT_SHIFT_X: f64 = 21.0;
const EFFECT_SHIFT_Y: f64 = -1.0;

pub const EFFECT_FADE_OUT: Duration = Duration::from_millis(200);
pub const EFFECT_FADE_IN_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq)]
enum EffectTransition {
    /// Presentation alpha falls 1 → 0; playback hides at the end
    FadeOut { started_at: Option<Instant> },
    /// Playback restarted; alpha snaps to 1 after the delay
    FadeIn { started_at: Option<Instant> },
}

struct EffectOverlay {
    playback: Box<dyn Playback>,
    /// Visibility last handed to the effect playback
    visible: bool,
    alpha: f64,
    transition: Option<EffectTransition>,
    play_count: u32,
}

impl EffectOverlay {
    fn new(playback: Box<dyn Playback>) -> Self {
        Self {
            playback,
            visible: false,
            alpha: 0.0,
            transition: None,
            play_count: 0,
        }
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
        self.playback.set_alpha(alpha);
    }

    fn show_or_hide(&mut self, show: bool) {
        let was_visible = self.visible;
        let fading_out = matches!(self.transition, Some(EffectTransition::FadeOut { .. }));

        if was_visible && !show {
            if !fading_out {
                self.transition = Some(EffectTransition::FadeOut { started_at: None });
            }
        } else if show {
            if fading_out {
                // Came back before the fade finished: keep playing, restore opacity
                self.transition = None;
                self.set_alpha(1.0);
            }
            self.visible = true;
            self.playback.set_visible(true);
            if !was_visible {
                self.playback.play(0);
                self.play_count += 1;
                self.transition = Some(EffectTransition::FadeIn { started_at: None });
            }
        }
    }

    fn tick(&mut self, now: Instant) {
        let Some(transition) = self.transition else {
            return;
        };
        match transition {
            EffectTransition::FadeOut { started_at } => {
                let start = started_at.unwrap_or(now);
                if is_complete(start, now, EFFECT_FADE_OUT) {
                    self.set_alpha(0.0);
                    self.visible = false;
                    self.playback.set_visible(false);
                    self.transition = None;
                } else {
                    self.set_alpha(1.0 - progress(start, now, EFFECT_FADE_OUT));
                    self.transition = Some(EffectTransition::FadeOut {
                        started_at: Some(start),
                    });
                }
            }
            EffectTransition::FadeIn { started_at } => {
                let start = started_at.unwrap_or(now);
                if is_complete(start, now, EFFECT_FADE_IN_DELAY) {
                    self.set_alpha(1.0);
                    self.transition = None;
                } else {
                    self.transition = Some(EffectTransition::FadeIn {
                        started_at: Some(start),
                    });
                }
            }
        }
    }
}

/// Renderable unit for one sticker
pub struct ItemPresenter {
    sticker: Sticker,
    content: Option<Box<dyn Playback>>,
    effect: Option<EffectOverlay>,
    visible: bool,
    central: bool,
    frame: Rect,
    scale: f64,
    alpha: f64,
}

impl std::fmt::Debug for ItemPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemPresenter")
            .field("sticker", &self.sticker.id)
            .field("visible", &self.visible)
            .field("central", &self.central)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl ItemPresenter {
    /// Build the presenter and kick off asset fetches for animated stickers
    pub fn new(sticker: Sticker, factory: &dyn PlaybackFactory, fetcher: &dyn AssetFetcher) -> Self {
        let mut content = None;
        let mut effect = None;

        if sticker.premium {
            let decode_size = sticker
                .dimensions
                .unwrap_or(DEFAULT_DIMENSIONS)
                .aspect_fitted(DECODE_BOUNDS);
            content = Some(factory.create(&sticker.asset, decode_size));
            fetcher.fetch(&sticker.asset);

            if let Some(effect_asset) = &sticker.effect {
                fetcher.fetch(effect_asset);
                let effect_size = Size::new(decode_size.width * 2.0, decode_size.height * 2.0);
                effect = Some(EffectOverlay::new(factory.create(effect_asset, effect_size)));
            }
        }

        Self {
            sticker,
            content,
            effect,
            visible: false,
            central: false,
            frame: Rect::default(),
            scale: 1.0,
            alpha: 1.0,
        }
    }

    /// Take this frame's placement
    pub fn apply(&mut self, placement: &ItemPlacement) {
        self.frame = placement.frame;
        self.scale = placement.scale;
        self.alpha = placement.alpha;
        self.set_visible(placement.is_visible);
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.update_playback();
    }

    pub fn set_central(&mut self, central: bool) {
        self.central = central;
        if let Some(content) = self.content.as_mut() {
            content.set_central(central);
        }
        self.update_playback();
    }

    fn update_playback(&mut self) {
        if let Some(content) = self.content.as_mut() {
            content.set_visible(self.visible);
        }
        let show_effect = self.visible && self.central;
        if let Some(effect) = self.effect.as_mut() {
            effect.show_or_hide(show_effect);
        }
    }

    /// Advance overlay transitions
    pub fn tick(&mut self, now: Instant) {
        if let Some(effect) = self.effect.as_mut() {
            effect.tick(now);
        }
    }

    /// True while an overlay transition is pending
    pub fn is_transitioning(&self) -> bool {
        self.effect
            .as_ref()
            .is_some_and(|effect| effect.transition.is_some())
    }

    #[inline]
    pub fn sticker(&self) -> &Sticker {
        &self.sticker
    }

    #[inline]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn is_central(&self) -> bool {
        self.central
    }

    #[inline]
    pub fn is_animated(&self) -> bool {
        self.content.is_some()
    }

    pub fn has_effect(&self) -> bool {
        self.effect.is_some()
    }

    /// Whether the effect playback is currently shown (including a fade-out)
    pub fn effect_visible(&self) -> bool {
        self.effect.as_ref().is_some_and(|effect| effect.visible)
    }

    pub fn effect_alpha(&self) -> f64 {
        self.effect.as_ref().map_or(0.0, |effect| effect.alpha)
    }

    /// How many times the effect was restarted from frame 0
    pub fn effect_play_count(&self) -> u32 {
        self.effect.as_ref().map_or(0, |effect| effect.play_count)
    }

    /// Still-image frame in item-local coordinates
    pub fn image_frame(&self) -> Option<Rect> {
        let dimensions = self.sticker.dimensions?;
        let image_size = dimensions.aspect_fitted(IMAGE_BOUNDS);
        Some(Rect::new(
            ((self.frame.size.width - image_size.width) / 2.0).floor(),
            0.0,
            image_size.width,
            image_size.height,
        ))
    }

    /// Effect overlay frame in item-local coordinates
    pub fn effect_frame(&self) -> Option<Rect> {
        self.effect.as_ref()?;
        let image = self.image_frame()?;
        let outset_x = image.size.width * EFFECT_OUTSET;
        let outset_y = image.size.height * EFFECT_OUTSET;
        Some(
            image
                .offset_by(-outset_x + EFFECT_SHIFT_X, EFFECT_SHIFT_Y)
                .inset_by(-outset_x, -outset_y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssetRef;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Recorded {
        visible: Vec<bool>,
        plays: Vec<u32>,
        alpha: Vec<f64>,
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<(String, Rc<RefCell<Recorded>>)>>>);

    struct RecordingPlayback(Rc<RefCell<Recorded>>);

    impl Playback for RecordingPlayback {
        fn set_visible(&mut self, visible: bool) {
            self.0.borrow_mut().visible.push(visible);
        }

        fn play(&mut self, from_frame: u32) {
            self.0.borrow_mut().plays.push(from_frame);
        }

        fn set_alpha(&mut self, alpha: f64) {
            self.0.borrow_mut().alpha.push(alpha);
        }
    }

    impl PlaybackFactory for Recorder {
        fn create(&self, asset: &AssetRef, _size: Size) -> Box<dyn Playback> {
            let state = Rc::new(RefCell::new(Recorded::default()));
            self.0.borrow_mut().push((asset.id.clone(), state.clone()));
            Box::new(RecordingPlayback(state))
        }
    }

    impl Recorder {
        fn state(&self, id: &str) -> Rc<RefCell<Recorded>> {
            self.0
                .borrow()
                .iter()
                .find(|(asset, _)| asset == id)
                .map(|(_, state)| state.clone())
                .unwrap()
        }
    }

    #[derive(Default)]
    struct CountingFetcher(RefCell<Vec<String>>);

    impl AssetFetcher for CountingFetcher {
        fn fetch(&self, asset: &AssetRef) {
            self.0.borrow_mut().push(asset.id.clone());
        }
    }

    fn sticker(premium: bool) -> Sticker {
        Sticker {
            id: "duck".into(),
            title: "Duck".into(),
            dimensions: Some(Size::new(512.0, 512.0)),
            premium,
            asset: AssetRef::new("duck", "duck.tgs"),
            effect: Some(AssetRef::new("duck:effect", "duck-effect.tgs")),
        }
    }

    #[test]
    fn test_premium_fetches_asset_and_effect() {
        let recorder = Recorder::default();
        let fetcher = CountingFetcher::default();
        let presenter = ItemPresenter::new(sticker(true), &recorder, &fetcher);
        assert_eq!(*fetcher.0.borrow(), vec!["duck".to_string(), "duck:effect".to_string()]);
        assert!(presenter.is_animated());
        assert!(presenter.has_effect());
    }

    #[test]
    fn test_plain_sticker_has_no_playback() {
        let recorder = Recorder::default();
        let fetcher = CountingFetcher::default();
        let mut presenter = ItemPresenter::new(sticker(false), &recorder, &fetcher);
        assert!(fetcher.0.borrow().is_empty());
        assert!(!presenter.is_animated());
        presenter.set_visible(true);
        presenter.set_central(true);
        assert!(!presenter.effect_visible());
    }

    #[test]
    fn test_effect_needs_visible_and_central() {
        let recorder = Recorder::default();
        let mut presenter = ItemPresenter::new(sticker(true), &recorder, &CountingFetcher::default());
        let effect = recorder.state("duck:effect");

        presenter.set_central(true);
        assert!(effect.borrow().plays.is_empty());

        presenter.set_visible(true);
        assert_eq!(effect.borrow().plays, vec![0]);
        assert!(presenter.effect_visible());
        assert_eq!(presenter.effect_alpha(), 0.0);

        // Re-asserting the same signal does not replay
        presenter.set_visible(true);
        presenter.set_central(true);
        assert_eq!(presenter.effect_play_count(), 1);
    }

    #[test]
    fn test_fade_in_after_delay() {
        let recorder = Recorder::default();
        let mut presenter = ItemPresenter::new(sticker(true), &recorder, &CountingFetcher::default());
        presenter.set_visible(true);
        presenter.set_central(true);

        let start = Instant::now();
        presenter.tick(start);
        assert_eq!(presenter.effect_alpha(), 0.0);
        presenter.tick(start + Duration::from_millis(30));
        assert_eq!(presenter.effect_alpha(), 0.0);
        presenter.tick(start + EFFECT_FADE_IN_DELAY);
        assert_eq!(presenter.effect_alpha(), 1.0);
        assert!(!presenter.is_transitioning());
    }

    #[test]
    fn test_fade_out_then_hide() {
        let recorder = Recorder::default();
        let mut presenter = ItemPresenter::new(sticker(true), &recorder, &CountingFetcher::default());
        let effect = recorder.state("duck:effect");
        presenter.set_visible(true);
        presenter.set_central(true);
        let start = Instant::now();
        presenter.tick(start);
        presenter.tick(start + EFFECT_FADE_IN_DELAY);

        presenter.set_central(false);
        // Still shown while fading
        assert!(presenter.effect_visible());
        let fade_start = start + Duration::from_millis(100);
        presenter.tick(fade_start);
        presenter.tick(fade_start + Duration::from_millis(100));
        assert!((presenter.effect_alpha() - 0.5).abs() < 1e-9);

        presenter.tick(fade_start + EFFECT_FADE_OUT);
        assert!(!presenter.effect_visible());
        assert_eq!(effect.borrow().visible.last(), Some(&false));
    }

    #[test]
    fn test_return_during_fade_out_does_not_replay() {
        let recorder = Recorder::default();
        let mut presenter = ItemPresenter::new(sticker(true), &recorder, &CountingFetcher::default());
        presenter.set_visible(true);
        presenter.set_central(true);
        presenter.set_visible(false);
        presenter.set_visible(true);
        assert_eq!(presenter.effect_play_count(), 1);
        assert_eq!(presenter.effect_alpha(), 1.0);
        assert!(presenter.effect_visible());
    }

    #[test]
    fn test_overlay_geometry() {
        let recorder = Recorder::default();
        let mut presenter = ItemPresenter::new(sticker(true), &recorder, &CountingFetcher::default());
        let placement = crate::layout::place_item(
            0,
            10,
            0.0,
            Size::new(390.0, 400.0),
            true,
            &Default::default(),
        );
        presenter.apply(&placement);

        let image = presenter.image_frame().unwrap();
        assert_eq!(image, Rect::new(-10.0, 0.0, 240.0, 240.0));

        let overlay = presenter.effect_frame().unwrap();
        let outset = 240.0 * EFFECT_OUTSET;
        assert!((overlay.origin.x - (-10.0 - outset + 21.0 - outset)).abs() < 1e-9);
        assert!((overlay.origin.y - (-1.0 - outset)).abs() < 1e-9);
        assert!((overlay.size.width - (240.0 + 2.0 * outset)).abs() < 1e-9);
    }
}
