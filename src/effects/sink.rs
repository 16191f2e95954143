use super::{EffectHandle, ParticleEffect};

/// Whatever draws the live bursts.
///
/// The manager registers a drawable once per effect, refreshes it after
/// every advance and removes it exactly once when the effect dies.
pub trait RenderSink {
    fn add_drawable(&mut self, handle: EffectHandle, effect: &ParticleEffect);

    /// Positions, opacity or size changed
    fn update_drawable(&mut self, handle: EffectHandle, effect: &ParticleEffect);

    fn remove_drawable(&mut self, handle: EffectHandle);

    /// Window resized
    fn set_viewport(&mut self, width: u32, height: u32);
}
