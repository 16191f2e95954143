//! Burst physics and the onset-to-burst mapping.
//!
//! Units: positions in world units, velocities in world units per render
//! frame, lifetimes in render frames (~60 Hz).

use std::ops::{Range, RangeInclusive};

use crate::error::{Error, Result};

/// Per-component RGB bounds a burst color is sampled from
#[derive(Debug, Clone)]
pub struct ColorRange {
    pub r: Range<f32>,
    pub g: Range<f32>,
    pub b: Range<f32>,
}

/// Particle physics shared by every burst
#[derive(Debug, Clone)]
pub struct ParticlePhysics {
    /// Subtracted from each particle's vertical velocity every frame
    pub gravity: f32,

    /// Minimum particle speed before the burst speed scale is applied
    pub base_speed: f32,

    /// Random extra speed in `[0, speed_variance)`
    pub speed_variance: f32,
}

impl Default for ParticlePhysics {
    fn default() -> Self {
        Self {
            gravity: 0.001,
            base_speed: 0.02,
            speed_variance: 0.05,
        }
    }
}

impl ParticlePhysics {
    pub fn validate(&self) -> Result<()> {
        if self.base_speed < 0.0 || self.speed_variance < 0.0 {
            return Err(Error::Config("particle speeds must be >= 0".to_string()));
        }
        Ok(())
    }
}

/// How onset metadata maps onto burst parameters
#[derive(Debug, Clone)]
pub struct SpawnMapping {
    /// Spawn requests kept per analysis callback; extra onsets are dropped
    pub max_spawns_per_frame: usize,

    /// Horizontal spawn extent (world units)
    pub spawn_x: Range<f32>,

    /// Vertical spawn extent (world units)
    pub spawn_y: Range<f32>,

    /// Depth of the spawn plane
    pub spawn_z: f32,

    /// Particle count at intensity 0
    pub min_particles: usize,

    /// Particle count at `intensity_ceiling`
    pub max_particles: usize,

    /// Highest intensity the detector reports
    pub intensity_ceiling: f32,

    /// Point size at intensity 0 (world units)
    pub base_point_size: f32,

    /// Point size added per unit of intensity
    pub point_size_per_intensity: f32,

    /// Lifetime of a burst with speed 1.0; faster bursts live shorter
    pub base_lifetime_frames: f32,

    /// Lifetime clamp (render frames)
    pub lifetime_frames: RangeInclusive<u32>,

    /// Colors for the lowest third of the spectrum
    pub warm: ColorRange,

    /// Colors for the highest third of the spectrum
    pub cool: ColorRange,

    /// Chance per render frame of an unprompted burst while audio flows
    pub idle_launch_chance: f64,

    /// Intensity of unprompted bursts
    pub idle_intensity: f32,

    /// Speed scale of unprompted bursts
    pub idle_speed: f32,
}

impl Default for SpawnMapping {
    fn default() -> Self {
        Self {
            max_spawns_per_frame: 3,
            spawn_x: -4.0..4.0,
            spawn_y: 0.0..4.0,
            spawn_z: 0.0,
            min_particles: 80,
            max_particles: 140,
            intensity_ceiling: 1.5,
            base_point_size: 0.08,
            point_size_per_intensity: 0.06,
            base_lifetime_frames: 120.0,
            lifetime_frames: 40..=180,
            warm: ColorRange {
                r: 0.9..1.0,
                g: 0.25..0.65,
                b: 0.0..0.2,
            },
            cool: ColorRange {
                r: 0.1..0.4,
                g: 0.5..0.9,
                b: 0.85..1.0,
            },
            idle_launch_chance: 0.01,
            idle_intensity: 0.6,
            idle_speed: 1.0,
        }
    }
}

impl SpawnMapping {
    pub fn validate(&self) -> Result<()> {
        if self.min_particles > self.max_particles {
            return Err(Error::Config(format!(
                "particle bounds inverted: {}..{}",
                self.min_particles, self.max_particles
            )));
        }
        if self.spawn_x.is_empty() || self.spawn_y.is_empty() {
            return Err(Error::Config("spawn box must be non-empty".to_string()));
        }
        if self.intensity_ceiling <= 0.0 {
            return Err(Error::Config("intensity ceiling must be > 0".to_string()));
        }
        if *self.lifetime_frames.start() == 0 || self.lifetime_frames.is_empty() {
            return Err(Error::Config(format!(
                "lifetime range must be non-empty and start above 0, got {:?}",
                self.lifetime_frames
            )));
        }
        if !(0.0..=1.0).contains(&self.idle_launch_chance) {
            return Err(Error::Config(format!(
                "idle launch chance must be a probability, got {}",
                self.idle_launch_chance
            )));
        }
        for range in [&self.warm, &self.cool] {
            if range.r.is_empty() || range.g.is_empty() || range.b.is_empty() {
                return Err(Error::Config("color ranges must be non-empty".to_string()));
            }
        }
        Ok(())
    }
}
