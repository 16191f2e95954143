//! Procedural music synthesis (default audio source).

use glicol::Engine;

use super::SampleGenerator;
use crate::error::{Error, Result};
use crate::params::audio_constants::BLOCK_SIZE;

/// Glicol composition (procedural music code): a gated saw lead whose
/// percussive envelope gives the detector clean onsets to chase
pub const GLICOL_COMPOSITION: &str = r#"
~gate: speed 2.0 >> seq 60 _60 _~a 48
~a: choose 48 48 48 72 0 0 0
~amp: ~gate >> envperc 0.001 0.1
~pit: ~gate >> mul 261.63
~lead: saw ~pit >> mul ~amp >> lpf ~mod 5.0 >> mul 0.1
~mod: sin 0.2 >> mul 1300 >> add 1500
o: ~lead >> plate 0.1
"#;

/// Streams stereo blocks out of a Glicol engine, carrying partial blocks
/// across device callbacks
pub struct SynthGenerator {
    engine: Engine<BLOCK_SIZE>,
    left: [f32; BLOCK_SIZE],
    right: [f32; BLOCK_SIZE],
    cursor: usize,
}

impl SynthGenerator {
    /// Fails if the composition does not parse
    pub fn new(sample_rate_hz: usize) -> Result<Self> {
        let mut engine = Engine::<BLOCK_SIZE>::new();
        engine.set_sr(sample_rate_hz);
        engine.update_with_code(GLICOL_COMPOSITION);
        engine
            .update()
            .map_err(|e| Error::Audio(format!("Glicol engine init failed: {:?}", e)))?;

        Ok(Self {
            engine,
            left: [0.0; BLOCK_SIZE],
            right: [0.0; BLOCK_SIZE],
            cursor: BLOCK_SIZE,
        })
    }

    fn refill(&mut self) {
        let (buffers, _) = self.engine.next_block(vec![]);
        for i in 0..BLOCK_SIZE {
            self.left[i] = buffers[0][i];
            self.right[i] = buffers[1][i];
        }
        self.cursor = 0;
    }
}

impl SampleGenerator for SynthGenerator {
    fn fill(&mut self, out: &mut [f32], channels: usize) -> bool {
        for frame in out.chunks_mut(channels) {
            if self.cursor == BLOCK_SIZE {
                self.refill();
            }
            // Safety limiter: hard clip to ±0.5 to prevent ear damage
            let left = self.left[self.cursor].clamp(-0.5, 0.5);
            let right = self.right[self.cursor].clamp(-0.5, 0.5);
            self.cursor += 1;

            for (c, sample) in frame.iter_mut().enumerate() {
                *sample = if c % 2 == 0 { left } else { right };
            }
        }
        true
    }
}
