//! Level layout: a grid of tiles regenerated together from one wave field.

mod config;
mod layout;

pub use config::{ConfigLoadError, LevelConfig};
pub use layout::{LevelLayout, PassStats, Tile};
