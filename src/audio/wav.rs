//! PCM WAV playback through hound.

use std::path::Path;

use super::SampleGenerator;
use crate::error::Result;

/// A fully loaded WAV file played back at the device rate.
///
/// Rate conversion is nearest-sample; channels are mapped by index, with
/// the last source channel repeated for any extra device channels.
pub struct WavPlayback {
    samples: Vec<f32>,
    channels: usize,
    step: f64,
    position: f64,
}

impl WavPlayback {
    /// Decode `path` into memory for playback at `device_rate_hz`
    pub fn open(path: &Path, device_rate_hz: usize) -> Result<Self> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / full_scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        log::info!(
            "Loaded {}: {} ch @ {}Hz, {:.1}s",
            path.display(),
            spec.channels,
            spec.sample_rate,
            samples.len() as f32 / spec.channels as f32 / spec.sample_rate as f32
        );

        Ok(Self::from_samples(
            samples,
            spec.channels as usize,
            spec.sample_rate as usize,
            device_rate_hz,
        ))
    }

    /// Wrap interleaved samples recorded at `source_rate_hz`
    pub fn from_samples(
        samples: Vec<f32>,
        channels: usize,
        source_rate_hz: usize,
        device_rate_hz: usize,
    ) -> Self {
        assert!(channels > 0, "WAV data needs at least one channel");
        Self {
            samples,
            channels,
            step: source_rate_hz as f64 / device_rate_hz as f64,
            position: 0.0,
        }
    }

    fn frame_count(&self) -> usize {
        self.samples.len() / self.channels
    }
}

impl SampleGenerator for WavPlayback {
    fn fill(&mut self, out: &mut [f32], channels: usize) -> bool {
        let frames = self.frame_count();
        let mut playing = true;

        for frame in out.chunks_mut(channels) {
            let index = self.position as usize;
            if index >= frames {
                frame.fill(0.0);
                playing = false;
                continue;
            }
            let base = index * self.channels;
            for (c, sample) in frame.iter_mut().enumerate() {
                *sample = self.samples[base + c.min(self.channels - 1)];
            }
            self.position += self.step;
        }
        playing
    }
}
