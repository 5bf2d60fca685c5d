//! Services the engine drives but does not implement
//!
//! Hosts plug their playback engine, haptic device and asset loader in
//! through these traits. The no-op implementations let the engine run
//! headless (layout dumps, tests).

use crate::catalog::AssetRef;
use crate::geometry::Size;

/// Per-item animated content control
pub trait Playback {
    /// Whether the content is on screen and should be decoding
    fn set_visible(&mut self, visible: bool);

    /// Whether the item is the carousel's central item
    fn set_central(&mut self, _central: bool) {}

    /// Restart playback at `frame`
    fn play(&mut self, from_frame: u32);

    /// Opacity of the rendered content
    fn set_alpha(&mut self, _alpha: f64) {}
}

/// Creates playback instances for sticker assets
pub trait PlaybackFactory {
    /// `size` is the decode size in pixels
    fn create(&self, asset: &AssetRef, size: Size) -> Box<dyn Playback>;
}

/// Fire-and-forget asset fetching
pub trait AssetFetcher {
    fn fetch(&self, asset: &AssetRef);
}

/// Haptic feedback device
pub trait Haptics {
    fn tap(&mut self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPlayback;

impl Playback for NoopPlayback {
    fn set_visible(&mut self, _visible: bool) {}

    fn play(&mut self, _from_frame: u32) {}
}

impl PlaybackFactory for NoopPlayback {
    fn create(&self, _asset: &AssetRef, _size: Size) -> Box<dyn Playback> {
        Box::new(NoopPlayback)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFetcher;

impl AssetFetcher for NoopFetcher {
    fn fetch(&self, _asset: &AssetRef) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHaptics;

impl Haptics for NoopHaptics {
    fn tap(&mut self) {}
}
