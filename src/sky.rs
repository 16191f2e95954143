//! Background star field with noise-driven twinkle.

use glam::Vec3;
use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::params::RenderConfig;

/// How fast the twinkle pattern evolves (noise units per second)
const TWINKLE_RATE: f64 = 0.7;

/// Static stars scattered through a cube around the origin
pub struct StarField {
    positions: Vec<Vec3>,
    perlin: Perlin,
    twinkle_depth: f32,
}

impl StarField {
    pub fn new(render_config: &RenderConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let half = render_config.star_spread / 2.0;

        let positions = (0..render_config.star_count)
            .map(|_| {
                Vec3::new(
                    rng.random_range(-half..=half),
                    rng.random_range(-half..=half),
                    rng.random_range(-half..=half),
                )
            })
            .collect();

        Self {
            positions,
            perlin: Perlin::new(seed as u32),
            twinkle_depth: render_config.twinkle_depth,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Brightness of star `index` at `time_s`, in `[1 - twinkle_depth, 1]`
    pub fn brightness(&self, index: usize, time_s: f32) -> f32 {
        if self.twinkle_depth == 0.0 {
            return 1.0;
        }
        // Each star walks its own line through the noise field
        let sample = self
            .perlin
            .get([index as f64 * 1.618, time_s as f64 * TWINKLE_RATE, 0.5]);
        let dip = (0.5 + 0.5 * sample as f32).clamp(0.0, 1.0);
        1.0 - self.twinkle_depth * dip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars_fill_the_cube() {
        let config = RenderConfig::default();
        let stars = StarField::new(&config, 42);
        assert_eq!(stars.len(), 3000);

        let half = config.star_spread / 2.0;
        for p in stars.positions() {
            assert!(p.abs().max_element() <= half);
        }
    }

    #[test]
    fn test_brightness_range() {
        let config = RenderConfig::default();
        let stars = StarField::new(&config, 1);
        for i in 0..200 {
            for t in [0.0, 0.3, 1.7, 20.0] {
                let b = stars.brightness(i, t);
                assert!((1.0 - config.twinkle_depth..=1.0).contains(&b), "{}", b);
            }
        }
    }

    #[test]
    fn test_no_twinkle_when_depth_zero() {
        let config = RenderConfig {
            twinkle_depth: 0.0,
            star_count: 10,
            ..RenderConfig::default()
        };
        let stars = StarField::new(&config, 3);
        assert!((0..10).all(|i| stars.brightness(i, 5.0) == 1.0));
    }

    #[test]
    fn test_same_seed_same_sky() {
        let config = RenderConfig::default();
        assert_eq!(
            StarField::new(&config, 9).positions(),
            StarField::new(&config, 9).positions()
        );
    }
}
