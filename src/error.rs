//! Crate-wide error type for setup and I/O failures.
//!
//! Core analysis and effect code never returns these: a broken precondition
//! there is a programming error and panics instead.

use thiserror::Error;

/// Errors raised while configuring or wiring up the show
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("no audio output device found")]
    NoOutputDevice,
    #[error("audio stream failed: {0}")]
    Audio(String),
    #[error("WAV I/O failed: {0}")]
    Wav(#[from] hound::Error),
    #[error("window system failed: {0}")]
    Window(String),
    #[error("GPU initialization failed: {0}")]
    GpuInit(String),
    #[error("frame capture failed: {0}")]
    Capture(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
