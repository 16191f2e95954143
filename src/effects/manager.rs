//! Live burst set and its lifecycle.

use super::{EffectState, ParticleEffect, RenderSink, SpawnRequest};
use crate::params::ParticlePhysics;

/// Opaque id a RenderSink keys its drawables on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectHandle(u64);

/// Owns every live burst and keeps the render sink in step with it
pub struct EffectManager {
    physics: ParticlePhysics,
    live: Vec<(EffectHandle, ParticleEffect)>,
    next_handle: u64,
}

impl EffectManager {
    pub fn new(physics: ParticlePhysics) -> Self {
        Self {
            physics,
            live: Vec::new(),
            next_handle: 0,
        }
    }

    /// Register a new Alive burst and its drawable
    pub fn create(&mut self, request: &SpawnRequest, sink: &mut dyn RenderSink) -> EffectHandle {
        let handle = EffectHandle(self.next_handle);
        self.next_handle += 1;

        let effect = ParticleEffect::new(request, &self.physics);
        sink.add_drawable(handle, &effect);
        self.live.push((handle, effect));
        handle
    }

    /// Advance every live burst once, then retire the ones that died.
    ///
    /// Returns the number of bursts retired.
    pub fn advance_all(&mut self, sink: &mut dyn RenderSink) -> usize {
        let before = self.live.len();

        self.live.retain_mut(|(handle, effect)| match effect.advance() {
            EffectState::Alive => {
                sink.update_drawable(*handle, effect);
                true
            }
            EffectState::Dead => {
                sink.remove_drawable(*handle);
                false
            }
        });

        before - self.live.len()
    }

    /// Retire every burst without advancing it
    pub fn clear(&mut self, sink: &mut dyn RenderSink) {
        for (handle, _) in self.live.drain(..) {
            sink.remove_drawable(handle);
        }
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Live bursts in creation order
    pub fn iter(&self) -> impl Iterator<Item = (EffectHandle, &ParticleEffect)> {
        self.live.iter().map(|(handle, effect)| (*handle, effect))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use glam::Vec3;
    use std::collections::HashMap;

    /// Sink double that records every call
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub drawables: HashMap<EffectHandle, usize>,
        pub added: Vec<EffectHandle>,
        pub updates: Vec<EffectHandle>,
        pub removed: Vec<EffectHandle>,
        pub viewport: Option<(u32, u32)>,
    }

    impl RenderSink for RecordingSink {
        fn add_drawable(&mut self, handle: EffectHandle, effect: &ParticleEffect) {
            assert!(
                self.drawables.insert(handle, effect.positions().len()).is_none(),
                "drawable registered twice"
            );
            self.added.push(handle);
        }

        fn update_drawable(&mut self, handle: EffectHandle, effect: &ParticleEffect) {
            assert!(!effect.is_dead());
            assert!(self.drawables.contains_key(&handle), "update of unknown drawable");
            self.updates.push(handle);
        }

        fn remove_drawable(&mut self, handle: EffectHandle) {
            assert!(
                self.drawables.remove(&handle).is_some(),
                "drawable removed twice"
            );
            self.removed.push(handle);
        }

        fn set_viewport(&mut self, width: u32, height: u32) {
            self.viewport = Some((width, height));
        }
    }

    fn request(max_age: u32) -> SpawnRequest {
        SpawnRequest {
            position: Vec3::ZERO,
            color: [1.0, 1.0, 1.0],
            particle_count: 10,
            point_size: 0.1,
            speed: 1.0,
            max_age,
            seed: u64::from(max_age),
        }
    }

    #[test]
    fn test_advance_with_no_effects_is_noop() {
        let mut manager = EffectManager::new(ParticlePhysics::default());
        let mut sink = RecordingSink::default();
        assert_eq!(manager.advance_all(&mut sink), 0);
        assert!(sink.updates.is_empty() && sink.removed.is_empty());
    }

    #[test]
    fn test_create_registers_drawable() {
        let mut manager = EffectManager::new(ParticlePhysics::default());
        let mut sink = RecordingSink::default();
        let a = manager.create(&request(3), &mut sink);
        let b = manager.create(&request(3), &mut sink);

        assert_ne!(a, b);
        assert_eq!(manager.len(), 2);
        assert_eq!(sink.drawables.get(&a), Some(&10));
    }

    #[test]
    fn test_live_set_drops_exactly_the_dead() {
        let mut manager = EffectManager::new(ParticlePhysics::default());
        let mut sink = RecordingSink::default();
        let short = manager.create(&request(1), &mut sink);
        let mid = manager.create(&request(2), &mut sink);
        let long = manager.create(&request(4), &mut sink);

        assert_eq!(manager.advance_all(&mut sink), 1);
        assert_eq!(sink.removed, vec![short]);
        let live: Vec<_> = manager.iter().map(|(h, _)| h).collect();
        assert_eq!(live, vec![mid, long]);

        assert_eq!(manager.advance_all(&mut sink), 1);
        assert_eq!(sink.removed, vec![short, mid]);

        manager.advance_all(&mut sink);
        manager.advance_all(&mut sink);
        assert!(manager.is_empty());
        assert_eq!(sink.removed, vec![short, mid, long]);
        assert!(sink.drawables.is_empty());
    }

    #[test]
    fn test_each_effect_advanced_once_per_call() {
        let mut manager = EffectManager::new(ParticlePhysics::default());
        let mut sink = RecordingSink::default();
        for _ in 0..5 {
            manager.create(&request(10), &mut sink);
        }
        manager.advance_all(&mut sink);
        assert!(manager.iter().all(|(_, e)| e.age() == 1));
        assert_eq!(sink.updates.len(), 5);
    }

    #[test]
    fn test_creates_between_advances() {
        // Several analysis callbacks may land between two render frames
        let mut manager = EffectManager::new(ParticlePhysics::default());
        let mut sink = RecordingSink::default();
        manager.create(&request(2), &mut sink);
        manager.advance_all(&mut sink);
        manager.create(&request(2), &mut sink);
        manager.create(&request(2), &mut sink);
        manager.advance_all(&mut sink);

        assert_eq!(manager.len(), 2);
        assert_eq!(sink.removed.len(), 1);
    }

    #[test]
    fn test_clear_removes_all_drawables() {
        let mut manager = EffectManager::new(ParticlePhysics::default());
        let mut sink = RecordingSink::default();
        manager.create(&request(5), &mut sink);
        manager.create(&request(5), &mut sink);
        manager.clear(&mut sink);

        assert!(manager.is_empty());
        assert!(sink.drawables.is_empty());
        assert_eq!(sink.removed.len(), 2);
    }
}
