pub mod animation;
pub mod catalog;
pub mod circular;
pub mod collaborators;
pub mod config;
pub mod controller;
pub mod easing;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod presenter;
pub mod timing;

pub use catalog::{AssetRef, ItemSet, Sticker, StickerCatalog};
pub use circular::Direction;
pub use collaborators::{AssetFetcher, Haptics, Playback, PlaybackFactory};
pub use config::{AppConfig, CarouselConfig, EasingType, UiConfig};
pub use controller::{CarouselController, DragPhase, Driver};
pub use error::{Error, Result};
pub use geometry::{Point, Rect, Size};
pub use layout::{ItemPlacement, LayoutParams};
pub use presenter::ItemPresenter;
