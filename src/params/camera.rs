//! Camera configuration and presets.

use crate::error::{Error, Result};

/// Stationary camera
#[derive(Debug, Clone)]
pub struct FixedCamera {
    /// Camera position (world units)
    pub position: [f32; 3],

    /// Look-at target (world units)
    pub target: [f32; 3],
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 5.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// Slow swaying camera that keeps the spawn box in frame
#[derive(Debug, Clone)]
pub struct DriftCamera {
    /// Distance from the target along Z (world units)
    pub distance: f32,

    /// Horizontal sway amplitude (world units)
    pub sway_amplitude: f32,

    /// Horizontal sway frequency (Hz)
    pub sway_freq_hz: f32,

    /// Vertical bob amplitude (world units)
    pub bob_amplitude: f32,

    /// Vertical bob frequency (Hz)
    pub bob_freq_hz: f32,

    /// Look-at target (world units)
    pub target: [f32; 3],
}

impl Default for DriftCamera {
    fn default() -> Self {
        Self {
            distance: 5.0,
            sway_amplitude: 1.5,
            sway_freq_hz: 0.05,
            bob_amplitude: 0.5,
            bob_freq_hz: 0.08,
            target: [0.0, 1.0, 0.0],
        }
    }
}

/// Camera preset selection
#[derive(Debug, Clone)]
pub enum CameraPreset {
    /// Fixed preset: stationary camera facing the spawn box
    Fixed(FixedCamera),

    /// Drift preset: gentle sway and bob around the spawn box
    Drift(DriftCamera),
}

impl Default for CameraPreset {
    fn default() -> Self {
        Self::Fixed(FixedCamera::default())
    }
}

impl CameraPreset {
    pub fn validate(&self) -> Result<()> {
        match self {
            CameraPreset::Fixed(p) => {
                if p.position == p.target {
                    return Err(Error::Config(
                        "fixed camera position and target coincide".to_string(),
                    ));
                }
            }
            CameraPreset::Drift(p) => {
                if p.distance <= 0.0 {
                    return Err(Error::Config(format!(
                        "drift distance must be > 0, got {}",
                        p.distance
                    )));
                }
            }
        }
        Ok(())
    }
}
