//! Onset detection thresholds.
//!
//! The constants below are tuning defaults, not invariants. None of them
//! has been validated as optimal across material.

use std::time::Duration;

use crate::error::{Error, Result};

/// Minimum number of baseline frames before any band may fire
pub const MIN_BASELINE_FRAMES: usize = 3;

/// Adaptive threshold configuration for the multi-band onset detector
#[derive(Debug, Clone)]
pub struct OnsetConfig {
    /// Number of contiguous frequency bands the spectrum is split into
    pub num_bands: usize,

    /// Frames kept in the energy history (baseline uses the preceding
    /// `history_capacity - 1`)
    pub history_capacity: usize,

    /// Minimum spacing between two onsets on the same band
    pub cooldown: Duration,

    /// Lower bound of the threshold margin above the baseline mean
    pub threshold_floor: f32,

    /// Standard deviations above the mean a band must exceed
    pub variance_multiplier: f32,

    /// Minimum rise above the baseline mean
    pub increase_floor: f32,

    /// Minimum absolute band energy (0-255 scale)
    pub absolute_floor: f32,

    /// Rise that maps to one unit of burst speed
    pub speed_divisor: f32,

    /// Burst speed for a rise of zero
    pub base_speed: f32,

    /// Upper bound of burst speed
    pub max_speed: f32,

    /// Band energy that maps to an intensity of 1.0
    pub intensity_divisor: f32,

    /// Upper bound of intensity
    pub max_intensity: f32,
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            num_bands: 8,
            history_capacity: 10,
            cooldown: Duration::from_millis(80),
            threshold_floor: 8.0,
            variance_multiplier: 1.5,
            increase_floor: 5.0,
            absolute_floor: 20.0,
            speed_divisor: 30.0,
            base_speed: 0.8,
            max_speed: 2.5,
            intensity_divisor: 80.0,
            max_intensity: 1.5,
        }
    }
}

impl OnsetConfig {
    /// Baseline frames actually used per decision once history is full
    pub fn baseline_len(&self) -> usize {
        self.history_capacity.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_bands == 0 {
            return Err(Error::Config("band count must be >= 1".to_string()));
        }
        if self.baseline_len() < MIN_BASELINE_FRAMES {
            return Err(Error::Config(format!(
                "history capacity must be >= {}, got {}",
                MIN_BASELINE_FRAMES + 1,
                self.history_capacity
            )));
        }
        if self.speed_divisor <= 0.0 || self.intensity_divisor <= 0.0 {
            return Err(Error::Config("speed and intensity divisors must be > 0".to_string()));
        }
        Ok(())
    }
}
