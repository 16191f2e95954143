//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::audio::AudioSource;
use crate::error::Result;
use crate::params::{CameraPreset, DriftCamera, FixedCamera, RecordingConfig, ShowConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Skyburst")]
#[command(about = "Fireworks that launch on the beat", long_about = None)]
pub struct Args {
    /// Play a PCM WAV file instead of the built-in Glicol composition
    #[arg(long, value_name = "PATH")]
    pub wav: Option<PathBuf>,

    /// Record frames and audio (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Camera preset: fixed (default), drift
    #[arg(long, value_name = "PRESET", default_value = "fixed")]
    pub camera: String,

    /// Number of frequency bands
    #[arg(long, value_name = "N")]
    pub bands: Option<usize>,

    /// Energy history length (frames)
    #[arg(long, value_name = "FRAMES")]
    pub history: Option<usize>,

    /// Per-band cooldown between onsets
    #[arg(long, value_name = "MS")]
    pub cooldown_ms: Option<u64>,

    /// Bursts launched per analysis frame at most
    #[arg(long, value_name = "N")]
    pub max_spawns: Option<usize>,

    /// FFT size (power of two)
    #[arg(long, value_name = "SAMPLES")]
    pub fft_size: Option<usize>,

    /// Spectrum smoothing time constant in [0, 1)
    #[arg(long, value_name = "TAU")]
    pub smoothing: Option<f32>,

    /// Chance per frame of an unprompted burst (0 disables)
    #[arg(long, value_name = "P")]
    pub idle_chance: Option<f64>,

    /// Seed for burst placement, colors and the star field
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    /// Defaults with command-line overrides applied, validated
    pub fn show_config(&self) -> Result<ShowConfig> {
        let mut config = ShowConfig {
            camera: self.parse_camera_preset(),
            ..ShowConfig::default()
        };

        if let Some(bands) = self.bands {
            config.onset.num_bands = bands;
        }
        if let Some(history) = self.history {
            config.onset.history_capacity = history;
        }
        if let Some(ms) = self.cooldown_ms {
            config.onset.cooldown = Duration::from_millis(ms);
        }
        if let Some(cap) = self.max_spawns {
            config.mapping.max_spawns_per_frame = cap;
        }
        if let Some(size) = self.fft_size {
            config.fft.fft_size = size;
            config.fft.hop_size = size / 2;
        }
        if let Some(tau) = self.smoothing {
            config.fft.smoothing_time_constant = tau;
        }
        if let Some(chance) = self.idle_chance {
            config.mapping.idle_launch_chance = chance;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse camera preset from command-line arguments
    pub fn parse_camera_preset(&self) -> CameraPreset {
        match self.camera.to_lowercase().as_str() {
            "drift" => {
                log::info!("Camera: Drift");
                CameraPreset::Drift(DriftCamera::default())
            }
            "fixed" => {
                log::info!("Camera: Fixed");
                CameraPreset::Fixed(FixedCamera::default())
            }
            other => {
                log::warn!("Unknown camera preset '{}', using fixed", other);
                CameraPreset::Fixed(FixedCamera::default())
            }
        }
    }

    pub fn audio_source(&self) -> AudioSource {
        match &self.wav {
            Some(path) => AudioSource::Wav(path.clone()),
            None => AudioSource::Synth,
        }
    }

    /// Create recording configuration (and its directories) if recording
    /// mode is enabled
    pub fn create_recording_config(&self) -> Result<Option<RecordingConfig>> {
        let Some(duration) = self.record else {
            return Ok(None);
        };
        let config = RecordingConfig::new(duration);
        config.validate()?;

        // Create output directories
        std::fs::create_dir_all(config.frames_dir())?;
        std::fs::create_dir_all(&config.output_dir)?;

        Ok(Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_gives_defaults() {
        let args = Args::parse_from(["skyburst"]);
        let config = args.show_config().unwrap();
        assert_eq!(config.onset.num_bands, 8);
        assert_eq!(config.mapping.max_spawns_per_frame, 3);
        assert!(matches!(config.camera, CameraPreset::Fixed(_)));
        assert!(matches!(args.audio_source(), AudioSource::Synth));
        assert!(args.create_recording_config().unwrap().is_none());
    }

    #[test]
    fn test_overrides_applied() {
        let args = Args::parse_from([
            "skyburst",
            "--bands",
            "16",
            "--cooldown-ms",
            "120",
            "--fft-size",
            "1024",
            "--camera",
            "drift",
            "--wav",
            "song.wav",
        ]);
        let config = args.show_config().unwrap();
        assert_eq!(config.onset.num_bands, 16);
        assert_eq!(config.onset.cooldown, Duration::from_millis(120));
        assert_eq!(config.fft.fft_size, 1024);
        assert_eq!(config.fft.hop_size, 512);
        assert!(matches!(config.camera, CameraPreset::Drift(_)));
        assert!(matches!(args.audio_source(), AudioSource::Wav(p) if p == PathBuf::from("song.wav")));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = Args::parse_from(["skyburst", "--bands", "0"]);
        assert!(args.show_config().is_err());

        let args = Args::parse_from(["skyburst", "--idle-chance", "1.5"]);
        assert!(args.show_config().is_err());
    }

    #[test]
    fn test_bad_recording_duration_rejected() {
        let args = Args::parse_from(["skyburst", "--record=-5"]);
        assert!(args.create_recording_config().is_err());

        let args = Args::parse_from(["skyburst", "--record", "NaN"]);
        assert!(args.create_recording_config().is_err());
    }
}
