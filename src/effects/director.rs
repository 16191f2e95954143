//! Onset events in, burst requests out.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::analysis::OnsetEvent;
use crate::params::{ColorRange, SpawnMapping};

/// Everything needed to build one burst
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub position: Vec3,
    pub color: [f32; 3],
    pub particle_count: usize,
    /// World units
    pub point_size: f32,
    /// Scale on the outward particle speed
    pub speed: f32,
    /// Lifetime in render frames
    pub max_age: u32,
    /// Seeds the burst's velocity sampling
    pub seed: u64,
}

/// Maps onset metadata onto burst parameters
pub struct EffectDirector {
    mapping: SpawnMapping,
    rng: StdRng,
}

impl EffectDirector {
    pub fn new(mapping: SpawnMapping) -> Self {
        Self {
            mapping,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic director for reproducible shows and tests
    pub fn with_seed(mapping: SpawnMapping, seed: u64) -> Self {
        Self {
            mapping,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn mapping(&self) -> &SpawnMapping {
        &self.mapping
    }

    /// One request per event, up to `max_spawns_per_frame`; the rest are
    /// dropped
    pub fn on_events(&mut self, events: &[OnsetEvent]) -> Vec<SpawnRequest> {
        let cap = self.mapping.max_spawns_per_frame;
        if events.len() > cap {
            log::debug!(
                "spawn cap reached, dropping {} of {} onsets",
                events.len() - cap,
                events.len()
            );
        }

        events
            .iter()
            .take(cap)
            .map(|event| {
                let color = self.band_color(event.frequency_position);
                self.request(event.intensity, event.speed, color)
            })
            .collect()
    }

    /// Roll for an unprompted burst with a random color
    pub fn idle_launch(&mut self) -> Option<SpawnRequest> {
        if !self.rng.random_bool(self.mapping.idle_launch_chance) {
            return None;
        }
        let color = [self.rng.random(), self.rng.random(), self.rng.random()];
        Some(self.request(self.mapping.idle_intensity, self.mapping.idle_speed, color))
    }

    fn request(&mut self, intensity: f32, speed: f32, color: [f32; 3]) -> SpawnRequest {
        let m = &self.mapping;
        let level = (intensity / m.intensity_ceiling).clamp(0.0, 1.0);
        let particle_count = m.min_particles
            + ((m.max_particles - m.min_particles) as f32 * level).round() as usize;
        let point_size = m.base_point_size + m.point_size_per_intensity * intensity.max(0.0);
        let max_age = (m.base_lifetime_frames / speed.max(f32::EPSILON))
            .round()
            .clamp(*m.lifetime_frames.start() as f32, *m.lifetime_frames.end() as f32)
            as u32;

        let position = Vec3::new(
            self.rng.random_range(m.spawn_x.clone()),
            self.rng.random_range(m.spawn_y.clone()),
            m.spawn_z,
        );

        SpawnRequest {
            position,
            color,
            particle_count,
            point_size,
            speed,
            max_age,
            seed: self.rng.random(),
        }
    }

    /// Low third warm, high third cool, anything between a saturated hue
    fn band_color(&mut self, frequency_position: f32) -> [f32; 3] {
        if frequency_position < 1.0 / 3.0 {
            sample_range(&mut self.rng, &self.mapping.warm)
        } else if frequency_position < 2.0 / 3.0 {
            hue_to_rgb(self.rng.random())
        } else {
            sample_range(&mut self.rng, &self.mapping.cool)
        }
    }
}

fn sample_range(rng: &mut StdRng, range: &ColorRange) -> [f32; 3] {
    [
        rng.random_range(range.r.clone()),
        rng.random_range(range.g.clone()),
        rng.random_range(range.b.clone()),
    ]
}

/// Fully saturated, half-lightness HSL color for `hue` in [0, 1)
fn hue_to_rgb(hue: f32) -> [f32; 3] {
    let channel = |n: f32| {
        let k = (n + hue * 12.0) % 12.0;
        0.5 - 0.5 * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
    };
    [channel(0.0), channel(8.0), channel(4.0)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::time::Duration;

    fn event(band_index: usize, intensity: f32, speed: f32) -> OnsetEvent {
        OnsetEvent {
            band_index,
            intensity,
            speed,
            frequency_position: band_index as f32 / 8.0,
            timestamp: Duration::ZERO,
        }
    }

    fn in_range(color: [f32; 3], range: &ColorRange) -> bool {
        range.r.contains(&color[0]) && range.g.contains(&color[1]) && range.b.contains(&color[2])
    }

    #[test]
    fn test_excess_events_dropped() {
        let mut director = EffectDirector::with_seed(SpawnMapping::default(), 1);
        let events: Vec<_> = (0..8).map(|b| event(b, 1.0, 1.0)).collect();
        let requests = director.on_events(&events);
        assert_eq!(requests.len(), 3);
        // The first events win
        assert!(in_range(requests[0].color, &director.mapping().warm));
    }

    #[test]
    fn test_intensity_scales_count_and_size() {
        let mut director = EffectDirector::with_seed(SpawnMapping::default(), 2);
        let quiet = &director.on_events(&[event(0, 0.0, 1.0)])[0];
        assert_eq!(quiet.particle_count, 80);
        assert_relative_eq!(quiet.point_size, 0.08);

        let loud = &director.on_events(&[event(0, 1.5, 1.0)])[0];
        assert_eq!(loud.particle_count, 140);
        assert_relative_eq!(loud.point_size, 0.08 + 0.06 * 1.5);

        let mid = &director.on_events(&[event(0, 0.75, 1.0)])[0];
        assert_eq!(mid.particle_count, 110);
    }

    #[test]
    fn test_faster_onsets_live_shorter() {
        let mut director = EffectDirector::with_seed(SpawnMapping::default(), 3);
        let slow = director.on_events(&[event(0, 1.0, 1.0)])[0].clone();
        let fast = director.on_events(&[event(0, 1.0, 2.5)])[0].clone();
        assert_eq!(slow.max_age, 120);
        assert_eq!(fast.max_age, 48);
        assert_relative_eq!(fast.speed, 2.5);

        let crawl = director.on_events(&[event(0, 1.0, 0.1)])[0].clone();
        assert_eq!(crawl.max_age, 180);
    }

    #[test]
    fn test_color_by_frequency_third() {
        let mut director = EffectDirector::with_seed(SpawnMapping::default(), 4);
        let mapping = director.mapping().clone();
        for _ in 0..50 {
            let low = director.on_events(&[event(0, 1.0, 1.0)])[0].color;
            let high = director.on_events(&[event(7, 1.0, 1.0)])[0].color;
            let mid = director.on_events(&[event(4, 1.0, 1.0)])[0].color;
            assert!(in_range(low, &mapping.warm), "{:?}", low);
            assert!(in_range(high, &mapping.cool), "{:?}", high);
            // Saturated: one channel full, one empty
            let max = mid.iter().cloned().fold(0.0, f32::max);
            let min = mid.iter().cloned().fold(1.0, f32::min);
            assert_relative_eq!(max, 1.0, epsilon = 1e-5);
            assert_relative_eq!(min, 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_hue_to_rgb_primaries() {
        assert_eq!(hue_to_rgb(0.0), [1.0, 0.0, 0.0]);
        let green = hue_to_rgb(1.0 / 3.0);
        assert_relative_eq!(green[1], 1.0, epsilon = 1e-5);
        assert_relative_eq!(green[0], 0.0, epsilon = 1e-5);
        let blue = hue_to_rgb(2.0 / 3.0);
        assert_relative_eq!(blue[2], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_positions_inside_spawn_box() {
        let mut director = EffectDirector::with_seed(SpawnMapping::default(), 5);
        for _ in 0..100 {
            let r = &director.on_events(&[event(2, 1.0, 1.0)])[0];
            assert!((-4.0..4.0).contains(&r.position.x));
            assert!((0.0..4.0).contains(&r.position.y));
            assert_eq!(r.position.z, 0.0);
        }
    }

    #[test]
    fn test_idle_launch_chance_extremes() {
        let never = SpawnMapping {
            idle_launch_chance: 0.0,
            ..SpawnMapping::default()
        };
        let mut director = EffectDirector::with_seed(never, 6);
        assert!((0..1000).all(|_| director.idle_launch().is_none()));

        let always = SpawnMapping {
            idle_launch_chance: 1.0,
            ..SpawnMapping::default()
        };
        let mut director = EffectDirector::with_seed(always, 6);
        let request = director.idle_launch().unwrap();
        assert_eq!(request.max_age, 120);
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_spawn_cap(count in 0usize..50, cap in 0usize..6, seed in any::<u64>()) {
            let mapping = SpawnMapping { max_spawns_per_frame: cap, ..SpawnMapping::default() };
            let mut director = EffectDirector::with_seed(mapping, seed);
            let events: Vec<_> = (0..count).map(|i| event(i % 8, 1.0, 1.5)).collect();
            let requests = director.on_events(&events);
            prop_assert_eq!(requests.len(), count.min(cap));
        }
    }
}
