use std::time::{Duration, Instant};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use whirl_core::collaborators::NoopFetcher;
use whirl_core::{AppConfig, AssetFetcher, CarouselController, ItemSet, Point, Size};

use crate::event::FetchResult;
use crate::gesture::ScrollHost;
use crate::input::Action;
use crate::services::{FlashHaptics, PlaybackRegistry, TerminalPlaybackFactory};
use crate::theme::{load_theme, Theme};

/// How long status messages stay up
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Help,
}

/// Asset fetch bookkeeping for the status bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub loaded: usize,
    pub failed: usize,
}

/// Main application state
pub struct App {
    pub config: AppConfig,
    pub theme: Theme,
    pub controller: CarouselController,
    pub scroll: ScrollHost,
    pub playback: PlaybackRegistry,
    pub haptics: FlashHaptics,
    pub mode: Mode,
    pub should_quit: bool,
    pub status_message: Option<(String, Instant)>,
    pub fetches: FetchStats,
    /// Terminal cells the carousel occupies
    pub carousel_area: Rect,
}

impl App {
    pub fn new(items: ItemSet, config: AppConfig, fetcher: &dyn AssetFetcher) -> Self {
        let playback = PlaybackRegistry::new();
        let factory = TerminalPlaybackFactory::new(playback.clone());
        let haptics = FlashHaptics::new(config.ui.bell_on_haptic);
        let controller = CarouselController::new(
            items,
            config.carousel.clone(),
            &factory,
            fetcher,
            Box::new(haptics.clone()),
        );
        let theme = load_theme(&config.ui.theme);

        Self {
            config,
            theme,
            controller,
            scroll: ScrollHost::new(),
            playback,
            haptics,
            mode: Mode::Normal,
            should_quit: false,
            status_message: None,
            fetches: FetchStats::default(),
            carousel_area: Rect::default(),
        }
    }

    /// App whose assets are never fetched
    pub fn headless(items: ItemSet, config: AppConfig) -> Self {
        Self::new(items, config, &NoopFetcher)
    }

    /// Split the terminal into carousel and status bar areas
    pub fn split_area(area: Rect) -> (Rect, Rect) {
        let status_height = area.height.min(1);
        let carousel = Rect::new(area.x, area.y, area.width, area.height - status_height);
        let status = Rect::new(area.x, area.y + carousel.height, area.width, status_height);
        (carousel, status)
    }

    /// The terminal was (re)sized to `area`
    pub fn resize(&mut self, area: Rect) {
        let (carousel, _) = Self::split_area(area);
        self.carousel_area = carousel;
        let viewport = Size::new(
            carousel.width as f64 * self.config.ui.cell_width_pt,
            carousel.height as f64 * self.config.ui.cell_height_pt,
        );
        tracing::debug!(cols = carousel.width, rows = carousel.height, ?viewport, "Resized");
        self.controller.update_layout(viewport);
        self.scroll.sync(&mut self.controller);
    }

    /// Centre of the terminal cell at `(column, row)` in layout points
    pub fn cell_to_point(&self, column: u16, row: u16) -> Point {
        let x = column.saturating_sub(self.carousel_area.x) as f64 + 0.5;
        let y = row.saturating_sub(self.carousel_area.y) as f64 + 0.5;
        Point::new(x * self.config.ui.cell_width_pt, y * self.config.ui.cell_height_pt)
    }

    /// Whether the draw loop should poll at animation rate
    pub fn wants_fast_ticks(&self, now: Instant) -> bool {
        self.controller.needs_tick() || self.scroll.is_decelerating() || self.haptics.is_flashing(now)
    }

    pub fn set_status(&mut self, message: impl Into<String>, now: Instant) {
        self.status_message = Some((message.into(), now));
    }

    pub fn handle_action(&mut self, action: Action, now: Instant) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Next => self.controller.go_to_next(),
            Action::Previous => self.controller.go_to_previous(),
            Action::ToggleVisible => {
                let visible = !self.controller.is_visible();
                self.controller.set_visible(visible);
                let label = if visible { "Carousel shown" } else { "Carousel hidden" };
                self.set_status(label, now);
            }
            Action::ShowHelp => self.mode = Mode::Help,
            Action::ExitMode => self.mode = Mode::Normal,
            Action::None => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if self.mode == Mode::Help {
            if let MouseEventKind::Down(_) = mouse.kind {
                self.mode = Mode::Normal;
            }
            return;
        }

        let point = self.cell_to_point(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.scroll.press(point, now, &mut self.controller)
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.scroll.drag(point, now, &mut self.controller)
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.scroll.release(point, now, &mut self.controller)
            }
            MouseEventKind::ScrollDown => self.controller.go_to_next(),
            MouseEventKind::ScrollUp => self.controller.go_to_previous(),
            _ => {}
        }
    }

    pub fn handle_fetch_result(&mut self, result: FetchResult, now: Instant) {
        match result {
            FetchResult::Loaded { id, bytes } => {
                tracing::debug!(%id, bytes, "Asset ready");
                self.fetches.loaded += 1;
            }
            FetchResult::Failed { id, error } => {
                tracing::warn!(%id, %error, "Asset fetch failed");
                self.fetches.failed += 1;
                self.set_status(format!("Failed to load {}", id), now);
            }
        }
    }

    /// Advance gestures, animations and playback; returns whether more frames are wanted
    pub fn tick(&mut self, now: Instant) -> bool {
        let scrolling = self.scroll.tick(now, &mut self.controller);
        let animating = self.controller.tick(now);
        self.scroll.sync(&mut self.controller);
        self.playback.advance(now);

        if let Some((_, at)) = &self.status_message {
            if now.saturating_duration_since(*at) >= STATUS_TIMEOUT {
                self.status_message = None;
            }
        }

        scrolling || animating
    }
}
