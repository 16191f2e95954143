//! Multi-band onset detection with adaptive thresholds.
//!
//! Every band is judged against its own recent history: a frame fires when
//! its energy clears `mean + max(floor, stddev * k)` of the preceding frames,
//! rises far enough above the mean, and is loud enough in absolute terms.
//! A per-band cooldown keeps a sustained tone from firing on every frame
//! while leaving the other bands free to react.

use std::collections::VecDeque;
use std::time::Duration;

use super::bands::BandEnergy;
use crate::params::{OnsetConfig, MIN_BASELINE_FRAMES};

/// Monotonic analysis time (audio sample clock)
pub type Timestamp = Duration;

/// A detected onset on one band
#[derive(Debug, Clone, PartialEq)]
pub struct OnsetEvent {
    /// Band that fired, `0..num_bands`, lowest frequencies first
    pub band_index: usize,
    /// Loudness of the onset, `0.0..=max_intensity`
    pub intensity: f32,
    /// Sharpness of the rise, `base_speed..=max_speed`
    pub speed: f32,
    /// `band_index / num_bands`, in `[0, 1)`
    pub frequency_position: f32,
    pub timestamp: Timestamp,
}

/// Mean and population standard deviation of one band over the baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandStats {
    pub mean: f32,
    pub stddev: f32,
}

/// Bounded ring of recent band-energy frames
#[derive(Debug, Clone)]
pub struct EnergyHistory {
    frames: VecDeque<BandEnergy>,
    capacity: usize,
}

impl EnergyHistory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "history needs room for a baseline frame");
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a frame, evicting the oldest one when full
    pub fn push(&mut self, frame: BandEnergy) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Frames a decision is measured against: the newest `capacity - 1`
    fn baseline(&self) -> impl Iterator<Item = &BandEnergy> {
        let skip = self.frames.len().saturating_sub(self.capacity - 1);
        self.frames.iter().skip(skip)
    }

    pub fn baseline_len(&self) -> usize {
        self.frames.len().min(self.capacity - 1)
    }

    /// Statistics of `band` over the baseline, `None` while it is empty
    pub fn band_stats(&self, band: usize) -> Option<BandStats> {
        let n = self.baseline_len();
        if n == 0 {
            return None;
        }

        let mean = self.baseline().map(|frame| frame[band]).sum::<f32>() / n as f32;
        let variance = self
            .baseline()
            .map(|frame| {
                let d = frame[band] - mean;
                d * d
            })
            .sum::<f32>()
            / n as f32;

        Some(BandStats {
            mean,
            stddev: variance.sqrt(),
        })
    }
}

/// Cooldown bookkeeping for one band
#[derive(Debug, Clone, Copy, Default)]
struct BandState {
    last_fire: Option<Timestamp>,
}

impl BandState {
    fn cooling_down(&self, now: Timestamp, cooldown: Duration) -> bool {
        match self.last_fire {
            Some(last) => now.saturating_sub(last) < cooldown,
            None => false,
        }
    }
}

/// Stateful onset detector over a fixed number of bands
pub struct OnsetDetector {
    config: OnsetConfig,
    history: EnergyHistory,
    bands: Vec<BandState>,
}

impl OnsetDetector {
    pub fn new(config: OnsetConfig) -> Self {
        let history = EnergyHistory::new(config.history_capacity);
        let bands = vec![BandState::default(); config.num_bands];
        Self {
            config,
            history,
            bands,
        }
    }

    pub fn config(&self) -> &OnsetConfig {
        &self.config
    }

    /// Frames currently held in the energy history
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Forget history and cooldowns, e.g. when a new track starts
    pub fn reset(&mut self) {
        self.history.clear();
        self.bands.fill(BandState::default());
    }

    /// Judge one frame of band energies and return the bands that fired.
    ///
    /// All bands are evaluated against the same pre-update history; the
    /// frame joins the history afterwards.
    ///
    /// # Panics
    /// If `energies` does not hold exactly `num_bands` values.
    pub fn detect(&mut self, energies: &[f32], now: Timestamp) -> Vec<OnsetEvent> {
        assert_eq!(
            energies.len(),
            self.config.num_bands,
            "band energy frame does not match the configured band count"
        );

        let mut events = Vec::new();

        if self.history.baseline_len() >= MIN_BASELINE_FRAMES {
            for (band, (&energy, state)) in energies.iter().zip(self.bands.iter_mut()).enumerate() {
                if state.cooling_down(now, self.config.cooldown) {
                    continue;
                }
                let Some(stats) = self.history.band_stats(band) else {
                    continue;
                };
                if let Some(event) = evaluate_band(&self.config, band, energy, stats, now) {
                    log::debug!(
                        "onset band={} energy={:.1} mean={:.1} sd={:.1} speed={:.2} intensity={:.2}",
                        band,
                        energy,
                        stats.mean,
                        stats.stddev,
                        event.speed,
                        event.intensity
                    );
                    state.last_fire = Some(now);
                    events.push(event);
                }
            }
        }

        self.history.push(energies.to_vec());
        events
    }
}

/// Apply the three firing guards to one band and derive the event metadata
fn evaluate_band(
    config: &OnsetConfig,
    band: usize,
    energy: f32,
    stats: BandStats,
    now: Timestamp,
) -> Option<OnsetEvent> {
    let threshold = stats.mean + config.threshold_floor.max(stats.stddev * config.variance_multiplier);
    let increase = energy - stats.mean;

    let outlier = energy > threshold;
    let rising = increase > config.increase_floor;
    let audible = energy > config.absolute_floor;
    if !(outlier && rising && audible) {
        return None;
    }

    Some(OnsetEvent {
        band_index: band,
        intensity: (energy / config.intensity_divisor).min(config.max_intensity),
        speed: (config.base_speed + increase / config.speed_divisor).min(config.max_speed),
        frequency_position: band as f32 / config.num_bands as f32,
        timestamp: now,
    })
}
