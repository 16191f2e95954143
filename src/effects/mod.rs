//! Firework bursts driven by onset events.
//!
//! - `EffectDirector`: onset metadata to spawn requests (capped per callback)
//! - `ParticleEffect`: one burst, Alive until `max_age` advances, then Dead
//! - `EffectManager`: live set, advanced once per render frame
//! - `RenderSink`: what the manager tells about drawables

mod director;
mod manager;
mod particle;
mod sink;

pub use director::{EffectDirector, SpawnRequest};
pub use manager::{EffectHandle, EffectManager};
pub use particle::{EffectState, ParticleEffect};
pub use sink::RenderSink;

#[cfg(test)]
pub(crate) use manager::tests::RecordingSink;
