use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log file lives here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Sticker manifest (JSON). The built-in demo pool is used when unset.
    #[serde(default)]
    pub manifest: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            manifest: None,
        }
    }
}

/// Easing curve applied to normalized animation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump to the end on completion
    None,
    Linear,
    /// Cubic ease-out
    Cubic,
    /// Quintic ease-out
    Quintic,
    /// Exponential ease-out
    EaseOut,
    /// The platform list curve, cubic-bezier(0.23, 1.0, 0.32, 1.0)
    #[default]
    System,
}

/// Tunables for the carousel engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselConfig {
    /// Maximum number of stickers sampled into the carousel
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// Position change per unit of scroll offset (K)
    #[serde(default = "default_drag_sensitivity")]
    pub drag_sensitivity: f64,
    /// Duration of tap-to-select animations
    #[serde(default = "default_tap_duration")]
    pub tap_duration_ms: u64,
    /// Duration of the snap after a drag that ends without momentum
    #[serde(default = "default_settle_duration")]
    pub settle_duration_ms: u64,
    /// Duration of the entrance animation
    #[serde(default = "default_entrance_duration")]
    pub entrance_duration_ms: u64,
    /// Item the entrance animation rotates to
    #[serde(default = "default_entrance_index")]
    pub entrance_index: usize,
    /// Global multiplier applied to every animation duration
    #[serde(default = "default_animation_speed")]
    pub animation_speed: f64,
    /// Easing curve for programmatic animations
    #[serde(default)]
    pub easing: EasingType,
    /// Clamp scale and alpha at zero for items behind the carousel
    #[serde(default)]
    pub clamp_appearance: bool,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            drag_sensitivity: default_drag_sensitivity(),
            tap_duration_ms: default_tap_duration(),
            settle_duration_ms: default_settle_duration(),
            entrance_duration_ms: default_entrance_duration(),
            entrance_index: default_entrance_index(),
            animation_speed: default_animation_speed(),
            easing: EasingType::default(),
            clamp_appearance: false,
        }
    }
}

impl CarouselConfig {
    pub fn tap_duration(&self) -> Duration {
        Duration::from_millis(self.tap_duration_ms)
    }

    pub fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.settle_duration_ms)
    }

    pub fn entrance_duration(&self) -> Duration {
        Duration::from_millis(self.entrance_duration_ms)
    }

    /// Apply the global speed factor to a nominal duration
    pub fn scaled(&self, duration: Duration) -> Duration {
        if !self.animation_speed.is_finite() || self.animation_speed <= 0.0 {
            return Duration::ZERO;
        }
        duration.mul_f64(self.animation_speed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds while idle
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Frame rate while an animation or deceleration runs
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Width of one terminal cell in layout points
    #[serde(default = "default_cell_width")]
    pub cell_width_pt: f64,
    /// Height of one terminal cell in layout points
    #[serde(default = "default_cell_height")]
    pub cell_height_pt: f64,
    /// Ring the terminal bell on haptic ticks
    #[serde(default)]
    pub bell_on_haptic: bool,
    /// Theme name
    #[serde(default = "default_theme_name")]
    pub theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
            cell_width_pt: default_cell_width(),
            cell_height_pt: default_cell_height(),
            bell_on_haptic: false,
            theme: default_theme_name(),
        }
    }
}

impl UiConfig {
    /// Tick duration while animating
    pub fn animation_tick_duration(&self) -> Duration {
        if self.animation_fps == 0 {
            Duration::from_millis(16) // ~60fps fallback
        } else {
            Duration::from_millis(1000 / self.animation_fps as u64)
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("whirl")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_items() -> usize {
    14
}

fn default_drag_sensitivity() -> f64 {
    0.0005 // 2000 offset units per revolution
}

fn default_tap_duration() -> u64 {
    400
}

fn default_settle_duration() -> u64 {
    200
}

fn default_entrance_duration() -> u64 {
    500
}

fn default_entrance_index() -> usize {
    1
}

fn default_animation_speed() -> f64 {
    1.0
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    60
}

fn default_cell_width() -> f64 {
    8.0
}

fn default_cell_height() -> f64 {
    16.0
}

fn default_theme_name() -> String {
    "gruvbox-dark".to_string()
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, defaults when missing
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &std::path::Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/whirl/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("whirl")
            .join("config.toml")
    }

    /// Get the log file path
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("whirl.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Get the manifest path (with tilde expansion)
    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.general.manifest.as_deref().map(expand_tilde)
    }
}
