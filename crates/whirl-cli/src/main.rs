use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use whirl_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "whirl")]
#[command(author, version, about = "An interactive circular sticker carousel")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this config file instead of ~/.config/whirl/config.toml
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the carousel
    Run {
        /// Sticker manifest (JSON); overrides the configured one
        #[arg(short = 'm', long)]
        manifest: Option<PathBuf>,
        /// Seed for sampling the item set
        #[arg(short = 's', long)]
        seed: Option<u64>,
        /// Maximum number of items to show
        #[arg(short = 'n', long)]
        items: Option<usize>,
    },
    /// Print the placement of every item for a carousel position
    Layout {
        /// Number of items on the ring
        #[arg(short = 'n', long)]
        count: usize,
        /// Carousel position in [0, 1)
        #[arg(short = 'p', long, default_value_t = 0.0)]
        position: f64,
        /// Viewport width in points
        #[arg(long, default_value_t = 390.0)]
        width: f64,
        /// Viewport height in points
        #[arg(long, default_value_t = 400.0)]
        height: f64,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration (refuses to overwrite)
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
}

/// Log to a file while the TUI owns the terminal, to stderr otherwise
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.general.log_level.as_str()));

    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening log file {}", path.display()))?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let is_tui = matches!(cli.command, None | Some(Commands::Run { .. }));
    init_logging(&config, is_tui)?;

    match cli.command {
        Some(Commands::Run {
            manifest,
            seed,
            items,
        }) => commands::run::run(config, manifest, seed, items).await,
        None => commands::run::run(config, None, None, None).await,
        Some(Commands::Layout {
            count,
            position,
            width,
            height,
            json,
        }) => commands::layout::run(&config, count, position, width, height, json),
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { force } => commands::config::init(&config_path, force),
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
    }
}
