pub mod app;
pub mod event;
pub mod gesture;
pub mod input;
pub mod services;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use theme::{load_theme, Theme};
