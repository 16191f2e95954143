//! Rendering, background and recording configuration.

use crate::error::{Error, Result};

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (world units)
    pub near_plane: f32,

    /// Far clipping plane (world units), must reach the star field
    pub far_plane: f32,

    /// Number of background stars
    pub star_count: usize,

    /// Edge length of the cube stars are scattered in (world units)
    pub star_spread: f32,

    /// Star point size (world units)
    pub star_size: f32,

    /// Twinkle depth (0.0 = static stars)
    pub twinkle_depth: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 75.0,
            near_plane: 0.1,
            far_plane: 2000.0,
            star_count: 3000,
            star_spread: 2000.0,
            star_size: 1.0,
            twinkle_depth: 0.35,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }

    pub fn validate(&self) -> Result<()> {
        if self.near_plane <= 0.0 || self.far_plane <= self.near_plane {
            return Err(Error::Config(format!(
                "clip planes must satisfy 0 < near < far, got {}..{}",
                self.near_plane, self.far_plane
            )));
        }
        if !(1.0..180.0).contains(&self.fov_degrees) {
            return Err(Error::Config(format!(
                "field of view out of range: {}",
                self.fov_degrees
            )));
        }
        if !(0.0..=1.0).contains(&self.twinkle_depth) {
            return Err(Error::Config(format!(
                "twinkle depth must be in [0, 1], got {}",
                self.twinkle_depth
            )));
        }
        Ok(())
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames and audio
    pub output_dir: String,

    /// Frame rate (FPS)
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            output_dir: "recording".to_string(),
            fps: 60,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(Error::Config(format!(
                "recording duration must be a positive number of seconds, got {}",
                self.duration_secs
            )));
        }
        if self.fps == 0 {
            return Err(Error::Config("recording frame rate must be > 0".to_string()));
        }
        Ok(())
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps as f32).ceil() as usize
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> String {
        format!("{}/frames", self.output_dir)
    }

    /// Audio file path
    pub fn audio_path(&self) -> String {
        format!("{}/audio.wav", self.output_dir)
    }
}
