//! Parameter definitions with units and documented semantics.
//!
//! All tunables live here with:
//! - Units (world units, render frames, Hz, dBFS)
//! - Documented ranges and meanings
//! - A `validate()` that rejects values the core treats as preconditions

mod audio;
mod camera;
mod effects;
mod onset;
mod render;

// Re-export all types
pub use audio::{audio_constants, FFTConfig};
pub use camera::{CameraPreset, DriftCamera, FixedCamera};
pub use effects::{ColorRange, ParticlePhysics, SpawnMapping};
pub use onset::{OnsetConfig, MIN_BASELINE_FRAMES};
pub use render::{RecordingConfig, RenderConfig};

use crate::error::Result;

/// Everything the show needs, validated together at startup
#[derive(Debug, Clone, Default)]
pub struct ShowConfig {
    pub fft: FFTConfig,
    pub onset: OnsetConfig,
    pub mapping: SpawnMapping,
    pub physics: ParticlePhysics,
    pub render: RenderConfig,
    pub camera: CameraPreset,
}

impl ShowConfig {
    pub fn validate(&self) -> Result<()> {
        self.fft.validate()?;
        self.onset.validate()?;
        self.mapping.validate()?;
        self.physics.validate()?;
        self.render.validate()?;
        self.camera.validate()?;
        if self.onset.num_bands > self.fft.bin_count() {
            return Err(crate::error::Error::Config(format!(
                "{} bands requested but the spectrum has only {} bins",
                self.onset.num_bands,
                self.fft.bin_count()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_show_config_is_valid() {
        assert!(ShowConfig::default().validate().is_ok());
    }

    #[test]
    fn test_more_bands_than_bins_rejected() {
        let mut config = ShowConfig::default();
        config.fft.fft_size = 32;
        config.onset.num_bands = 17;
        assert!(config.validate().is_err());
    }
}
