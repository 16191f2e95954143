//! Skyburst library - fireworks launched by multi-band onset detection

pub mod analysis;
pub mod audio;
pub mod camera;
pub mod cli;
pub mod effects;
pub mod error;
pub mod params;
pub mod rendering;
pub mod show;
pub mod sky;

pub use error::{Error, Result};
