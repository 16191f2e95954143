//! Audio analysis configuration and constants.

use crate::error::{Error, Result};

/// Spectrum analysis configuration
///
/// The byte spectrum mirrors a Web Audio analyser node: windowed FFT,
/// exponential smoothing across frames, then a linear map of the
/// `[min_decibels, max_decibels]` window onto `0..=255`.
#[derive(Debug, Clone)]
pub struct FFTConfig {
    /// Audio sample rate (Hz), replaced by the device rate at startup
    pub sample_rate_hz: usize,

    /// FFT window size (must be power of 2); yields `fft_size / 2` bins
    pub fft_size: usize,

    /// Samples between two analysis frames (50% overlap by default)
    pub hop_size: usize,

    /// Smoothing between consecutive frames (0.0 = none, must be < 1.0)
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to byte 0 (dBFS)
    pub min_decibels: f32,

    /// Magnitude mapped to byte 255 (dBFS)
    pub max_decibels: f32,

    /// Pending PCM kept for analysis, in FFT windows; older samples are dropped
    pub max_backlog_windows: usize,
}

impl Default for FFTConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            fft_size: 2048,
            hop_size: 1024, // ~23ms @ 44.1kHz
            smoothing_time_constant: 0.6,
            min_decibels: -100.0,
            max_decibels: -30.0,
            max_backlog_windows: 8,
        }
    }
}

impl FFTConfig {
    /// Number of frequency bins per spectrum frame
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Duration of one analysis hop in seconds
    pub fn hop_secs(&self) -> f64 {
        self.hop_size as f64 / self.sample_rate_hz as f64
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(Error::Config(format!(
                "FFT size must be a power of 2 >= 32, got {}",
                self.fft_size
            )));
        }
        if self.sample_rate_hz == 0 {
            return Err(Error::Config("sample rate must be > 0".to_string()));
        }
        if self.hop_size == 0 || self.hop_size > self.fft_size {
            return Err(Error::Config(format!(
                "hop size must be in 1..={}, got {}",
                self.fft_size, self.hop_size
            )));
        }
        if !(0.0..1.0).contains(&self.smoothing_time_constant) {
            return Err(Error::Config(format!(
                "smoothing time constant must be in [0, 1), got {}",
                self.smoothing_time_constant
            )));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(Error::Config(format!(
                "min decibels ({}) must be below max decibels ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        if self.max_backlog_windows == 0 {
            return Err(Error::Config("backlog must hold at least one window".to_string()));
        }
        Ok(())
    }
}

/// Audio constants (compile-time, match Glicol engine setup)
pub mod audio_constants {
    /// Audio block size (samples per buffer)
    /// 128 = 2.9ms @ 44.1kHz
    pub const BLOCK_SIZE: usize = 128;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FFTConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bin_count(), 1024);
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let config = FFTConfig {
            fft_size: 1000,
            ..FFTConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_full_smoothing() {
        let config = FFTConfig {
            smoothing_time_constant: 1.0,
            ..FFTConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_hop_duration() {
        let config = FFTConfig {
            sample_rate_hz: 48000,
            hop_size: 480,
            ..FFTConfig::default()
        };
        assert!((config.hop_secs() - 0.01).abs() < 1e-9);
    }
}
