//! Terminal implementations of the carousel's collaborators

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use whirl_core::{AssetFetcher, AssetRef, Haptics, Playback, PlaybackFactory, Size};

use crate::event::FetchResult;

/// Frame rate the simulated playback advances at
const PLAYBACK_FPS: f64 = 30.0;

/// How long a haptic tick keeps the status bar highlighted
pub const FLASH_DURATION: Duration = Duration::from_millis(120);

/// Observable state of one simulated playback
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackState {
    pub decode_size: Size,
    pub visible: bool,
    pub central: bool,
    pub alpha: f64,
    pub frame: u32,
    pub plays: u32,
    elapsed_frames: f64,
}

/// Shared table of playback states keyed by asset id
#[derive(Debug, Clone, Default)]
pub struct PlaybackRegistry {
    states: Rc<RefCell<HashMap<String, PlaybackState>>>,
    last_advance: Rc<Cell<Option<Instant>>>,
}

impl PlaybackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<PlaybackState> {
        self.states.borrow().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.states.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.borrow().is_empty()
    }

    /// Number of playbacks currently decoding
    pub fn active(&self) -> usize {
        self.states.borrow().values().filter(|state| state.visible).count()
    }

    /// Advance frame counters of visible playbacks to `now`
    pub fn advance(&self, now: Instant) {
        let Some(last) = self.last_advance.replace(Some(now)) else {
            return;
        };
        let frames = now.saturating_duration_since(last).as_secs_f64() * PLAYBACK_FPS;
        for state in self.states.borrow_mut().values_mut() {
            if state.visible {
                state.elapsed_frames += frames;
                state.frame = state.elapsed_frames as u32;
            }
        }
    }

    fn update(&self, id: &str, f: impl FnOnce(&mut PlaybackState)) {
        if let Some(state) = self.states.borrow_mut().get_mut(id) {
            f(state);
        }
    }
}

/// Playback handle that records into the registry
pub struct TerminalPlayback {
    id: String,
    registry: PlaybackRegistry,
}

impl Playback for TerminalPlayback {
    fn set_visible(&mut self, visible: bool) {
        self.registry.update(&self.id, |state| state.visible = visible);
    }

    fn set_central(&mut self, central: bool) {
        self.registry.update(&self.id, |state| state.central = central);
    }

    fn play(&mut self, from_frame: u32) {
        self.registry.update(&self.id, |state| {
            state.frame = from_frame;
            state.elapsed_frames = from_frame as f64;
            state.plays += 1;
        });
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.registry.update(&self.id, |state| state.alpha = alpha);
    }
}

/// Hands out [`TerminalPlayback`]s bound to one registry
#[derive(Debug, Clone, Default)]
pub struct TerminalPlaybackFactory {
    registry: PlaybackRegistry,
}

impl TerminalPlaybackFactory {
    pub fn new(registry: PlaybackRegistry) -> Self {
        Self { registry }
    }
}

impl PlaybackFactory for TerminalPlaybackFactory {
    fn create(&self, asset: &AssetRef, size: Size) -> Box<dyn Playback> {
        self.registry.states.borrow_mut().insert(
            asset.id.clone(),
            PlaybackState {
                decode_size: size,
                alpha: 1.0,
                ..PlaybackState::default()
            },
        );
        Box::new(TerminalPlayback {
            id: asset.id.clone(),
            registry: self.registry.clone(),
        })
    }
}

/// Haptics rendered as a status bar flash, optionally with the bell
#[derive(Debug, Clone, Default)]
pub struct FlashHaptics {
    last_tap: Rc<Cell<Option<Instant>>>,
    taps: Rc<Cell<u64>>,
    bell: bool,
}

impl FlashHaptics {
    pub fn new(bell: bool) -> Self {
        Self {
            bell,
            ..Self::default()
        }
    }

    /// Whether the flash is still showing at `now`
    pub fn is_flashing(&self, now: Instant) -> bool {
        self.last_tap
            .get()
            .is_some_and(|at| now.saturating_duration_since(at) < FLASH_DURATION)
    }

    pub fn taps(&self) -> u64 {
        self.taps.get()
    }
}

impl Haptics for FlashHaptics {
    fn tap(&mut self) {
        self.last_tap.set(Some(Instant::now()));
        self.taps.set(self.taps.get() + 1);
        if self.bell {
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(b"\x07").and_then(|_| stdout.flush());
        }
    }
}

/// Checks assets on a tokio task and reports back over a channel
#[derive(Debug, Clone)]
pub struct AsyncAssetFetcher {
    tx: mpsc::UnboundedSender<FetchResult>,
}

impl AsyncAssetFetcher {
    pub fn new(tx: mpsc::UnboundedSender<FetchResult>) -> Self {
        Self { tx }
    }

    /// Fetcher plus the receiving end the draw loop drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<FetchResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl AssetFetcher for AsyncAssetFetcher {
    fn fetch(&self, asset: &AssetRef) {
        let tx = self.tx.clone();
        let id = asset.id.clone();
        let path = asset.path.clone();

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(%id, "No runtime available for asset fetch");
            let _ = tx.send(FetchResult::Failed {
                id,
                error: "no async runtime".to_string(),
            });
            return;
        };

        handle.spawn(async move {
            let result = match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => FetchResult::Loaded { id, bytes: meta.len() },
                Ok(_) => FetchResult::Failed {
                    id,
                    error: format!("{} is not a file", path.display()),
                },
                Err(e) => FetchResult::Failed {
                    id,
                    error: format!("{}: {}", path.display(), e),
                },
            };
            // Receiver gone means the app is shutting down
            let _ = tx.send(result);
        });
    }
}
