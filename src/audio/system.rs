//! Audio output stream feeding the analysis buffer.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::pcm::{PcmBuffer, SharedPcm};
use super::synthesis::SynthGenerator;
use super::wav::WavPlayback;
use super::SampleGenerator;
use crate::error::{Error, Result};
use crate::params::{FFTConfig, RecordingConfig};

type SharedWavWriter = Arc<Mutex<hound::WavWriter<std::io::BufWriter<std::fs::File>>>>;

/// Where the music comes from
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// Procedural Glicol composition
    Synth,
    /// PCM WAV file
    Wav(PathBuf),
}

/// Audio system playing a source on the default output device.
///
/// The device callback only produces samples: it writes the output buffer,
/// appends a mono mixdown to the shared PCM buffer and optionally records
/// to WAV. All analysis happens on the caller's thread. The PCM buffer is
/// capped at `fft_size * max_backlog_windows` samples on the producer side,
/// so it stays bounded while nothing polls it.
pub struct AudioSystem {
    /// Mono PCM waiting for analysis
    pcm: SharedPcm,

    /// Set by the callback once the source has run dry
    finished: Arc<AtomicBool>,

    paused: bool,

    sample_rate_hz: usize,

    /// Audio output stream (kept alive)
    stream: cpal::Stream,
}

impl AudioSystem {
    /// Open the default output device and start playing `source`
    pub fn new(
        source: &AudioSource,
        fft_config: &FFTConfig,
        recording_config: Option<&RecordingConfig>,
    ) -> Result<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(Error::NoOutputDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| Error::Audio(format!("failed to get audio config: {}", e)))?;

        let sample_rate_hz = config.sample_rate().0 as usize;
        let channels = config.channels() as usize;

        log::info!(
            "Audio: {} @ {}Hz, {} channels",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate_hz,
            channels
        );

        let mut generator: Box<dyn SampleGenerator> = match source {
            AudioSource::Synth => Box::new(SynthGenerator::new(sample_rate_hz)?),
            AudioSource::Wav(path) => Box::new(WavPlayback::open(path, sample_rate_hz)?),
        };

        // Create WAV writer if recording
        let wav_writer: Option<SharedWavWriter> = match recording_config {
            Some(config) => {
                let spec = hound::WavSpec {
                    channels: channels as u16,
                    sample_rate: sample_rate_hz as u32,
                    bits_per_sample: 32,
                    sample_format: hound::SampleFormat::Float,
                };
                let writer = hound::WavWriter::create(config.audio_path(), spec)?;
                Some(Arc::new(Mutex::new(writer)))
            }
            None => None,
        };

        let pcm = PcmBuffer::shared(fft_config.fft_size * fft_config.max_backlog_windows);
        let pcm_callback = Arc::clone(&pcm);
        let finished = Arc::new(AtomicBool::new(false));
        let finished_callback = Arc::clone(&finished);

        // Build audio output stream
        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if finished_callback.load(Ordering::Relaxed) {
                        data.fill(0.0);
                        return;
                    }

                    if !generator.fill(data, channels) {
                        finished_callback.store(true, Ordering::Relaxed);
                    }

                    if let Ok(mut buf) = pcm_callback.lock() {
                        buf.push_interleaved(data, channels);
                    }

                    if let Some(ref writer) = wav_writer {
                        if let Ok(mut w) = writer.lock() {
                            for &sample in data.iter() {
                                let _ = w.write_sample(sample);
                            }
                        }
                    }
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| Error::Audio(format!("failed to build audio stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| Error::Audio(format!("failed to start audio stream: {}", e)))?;

        Ok(Self {
            pcm,
            finished,
            paused: false,
            sample_rate_hz,
            stream,
        })
    }

    /// Shared PCM buffer the analysis side drains
    pub fn pcm(&self) -> SharedPcm {
        Arc::clone(&self.pcm)
    }

    pub fn sample_rate_hz(&self) -> usize {
        self.sample_rate_hz
    }

    /// True while samples are reaching the analysis buffer
    pub fn is_flowing(&self) -> bool {
        !self.paused && !self.finished.load(Ordering::Relaxed)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause or resume playback
    pub fn toggle_pause(&mut self) -> Result<()> {
        if self.paused {
            self.stream
                .play()
                .map_err(|e| Error::Audio(format!("failed to resume: {}", e)))?;
            log::info!("Playing");
        } else {
            self.stream
                .pause()
                .map_err(|e| Error::Audio(format!("failed to pause: {}", e)))?;
            log::info!("Paused");
        }
        self.paused = !self.paused;
        Ok(())
    }
}
