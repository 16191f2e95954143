//! Audio playback and spectrum analysis.
//!
//! Plays Glicol procedural music or a WAV file, and turns the played PCM
//! into byte spectra for the onset detector.

mod fft;
mod pcm;
mod synthesis;
mod system;
mod wav;

// Re-export public types
pub use fft::{blackman_window, SpectrumAnalyser, SpectrumSource};
pub use pcm::{PcmBuffer, SharedPcm};
pub use synthesis::{SynthGenerator, GLICOL_COMPOSITION};
pub use system::{AudioSource, AudioSystem};
pub use wav::WavPlayback;

/// Something that can fill an interleaved device buffer
pub trait SampleGenerator: Send {
    /// Write `out.len() / channels` frames. Returns `false` once the source
    /// has run out; the remainder of `out` is then silence.
    fn fill(&mut self, out: &mut [f32], channels: usize) -> bool;
}
