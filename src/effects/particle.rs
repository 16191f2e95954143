//! A single firework burst.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

use super::SpawnRequest;
use crate::params::ParticlePhysics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectState {
    Alive,
    /// Terminal; particle buffers have been released
    Dead,
}

/// A burst of particles expanding from one point and fading out over
/// `max_age` render frames.
#[derive(Debug)]
pub struct ParticleEffect {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    color: [f32; 3],
    point_size: f32,
    gravity: f32,
    opacity: f32,
    age: u32,
    max_age: u32,
    state: EffectState,
}

impl ParticleEffect {
    /// Build a burst at `request.position` with velocities spread uniformly
    /// over spherical angles
    pub fn new(request: &SpawnRequest, physics: &ParticlePhysics) -> Self {
        let mut rng = StdRng::seed_from_u64(request.seed);

        let velocities = (0..request.particle_count)
            .map(|_| {
                let theta = rng.random::<f32>() * 2.0 * PI;
                let phi = rng.random::<f32>() * PI;
                let speed = (rng.random::<f32>() * physics.speed_variance + physics.base_speed)
                    * request.speed;
                Vec3::new(
                    phi.sin() * theta.cos(),
                    phi.sin() * theta.sin(),
                    phi.cos(),
                ) * speed
            })
            .collect();

        Self {
            positions: vec![request.position; request.particle_count],
            velocities,
            color: request.color,
            point_size: request.point_size,
            gravity: physics.gravity,
            opacity: 1.0,
            age: 0,
            max_age: request.max_age,
            state: EffectState::Alive,
        }
    }

    /// Step the burst by one render frame.
    ///
    /// Returns the state after the step. The effect turns Dead on the
    /// `max_age`-th call (the first call when `max_age <= 1`).
    ///
    /// # Panics
    /// If the effect is already Dead.
    pub fn advance(&mut self) -> EffectState {
        assert!(
            self.state == EffectState::Alive,
            "advance() called on a dead particle effect"
        );

        self.age += 1;

        for (position, velocity) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            *position += *velocity;
            velocity.y -= self.gravity;
        }

        self.opacity = if self.max_age == 0 {
            0.0
        } else {
            (1.0 - self.age as f32 / self.max_age as f32).max(0.0)
        };

        if self.age >= self.max_age {
            self.dispose();
        }
        self.state
    }

    fn dispose(&mut self) {
        self.state = EffectState::Dead;
        self.positions = Vec::new();
        self.velocities = Vec::new();
    }

    /// Current particle positions (empty once Dead)
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    pub fn is_dead(&self) -> bool {
        self.state == EffectState::Dead
    }
}
