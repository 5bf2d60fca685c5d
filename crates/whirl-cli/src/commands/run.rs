use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tokio::sync::mpsc;

use whirl_core::{AppConfig, ItemSet, StickerCatalog};
use whirl_tui::{
    app::{App, Mode},
    event::{AppEvent, EventHandler, FetchResult},
    input::handle_key_event,
    services::AsyncAssetFetcher,
    widgets::{CarouselWidget, PopupWidget, StatusBarWidget},
};

type Backend = CrosstermBackend<io::Stdout>;

pub async fn run(
    config: AppConfig,
    manifest: Option<PathBuf>,
    seed: Option<u64>,
    max_items: Option<usize>,
) -> Result<()> {
    let catalog = match manifest.or_else(|| config.manifest_path()) {
        Some(path) => StickerCatalog::load(&path)
            .with_context(|| format!("loading manifest {}", path.display()))?,
        None => StickerCatalog::demo(),
    };

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let max_items = max_items.unwrap_or(config.carousel.max_items);
    let items = ItemSet::sample(catalog.stickers(), max_items, &mut rng);
    tracing::info!(pool = catalog.len(), items = items.len(), ?seed, "Starting carousel");

    let (fetcher, fetch_rx) = AsyncAssetFetcher::channel();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Whirl"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(items, config, &fetcher);
    let result = main_loop(&mut terminal, app, fetch_rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Carousel exited with an error");
    }
    result
}

fn main_loop(
    terminal: &mut Terminal<Backend>,
    mut app: App,
    mut fetch_rx: mpsc::UnboundedReceiver<FetchResult>,
) -> Result<()> {
    let event_handler =
        EventHandler::with_animation_fps(app.config.ui.tick_rate_ms, app.config.ui.animation_fps);

    let size = terminal.size()?;
    app.resize(Rect::new(0, 0, size.width, size.height));

    loop {
        // Process completed fetches (non-blocking)
        while let Ok(result) = fetch_rx.try_recv() {
            app.handle_fetch_result(result, Instant::now());
        }

        let now = Instant::now();
        app.tick(now);

        terminal.draw(|frame| {
            let (carousel, status) = App::split_area(frame.area());
            CarouselWidget::render(frame, carousel, &app);
            StatusBarWidget::render(frame, status, &app, now);
            if app.mode == Mode::Help {
                PopupWidget::render_help(frame, &app.theme);
            }
        })?;

        // Poll faster while anything moves
        let fast = app.wants_fast_ticks(now);
        if let Some(event) = event_handler.next(fast)? {
            let now = Instant::now();
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, &app);
                    app.handle_action(action, now);
                }
                AppEvent::Mouse(mouse) => app.handle_mouse(mouse, now),
                AppEvent::Resize(width, height) => app.resize(Rect::new(0, 0, width, height)),
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            tracing::info!("Quitting");
            return Ok(());
        }
    }
}
