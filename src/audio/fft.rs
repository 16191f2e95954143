//! Byte spectrum analysis over the shared PCM buffer.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;
use std::time::Duration;

use super::pcm::SharedPcm;
use crate::analysis::Timestamp;
use crate::params::FFTConfig;

/// Windowed FFT producing smoothed byte magnitudes, one frame per hop.
///
/// Magnitudes are normalised by the FFT size, smoothed exponentially
/// against the previous frame, converted to dBFS and mapped linearly from
/// `[min_decibels, max_decibels]` onto `0..=255`.
pub struct SpectrumAnalyser {
    config: FFTConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
}

impl SpectrumAnalyser {
    pub fn new(config: FFTConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let window = (0..config.fft_size)
            .map(|i| blackman_window(i, config.fft_size))
            .collect();
        let bins = config.bin_count();

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); config.fft_size],
            smoothed: vec![0.0; bins],
            bytes: vec![0; bins],
            config,
        }
    }

    pub fn config(&self) -> &FFTConfig {
        &self.config
    }

    /// Analyse the first `fft_size` samples and return the byte spectrum
    ///
    /// # Panics
    /// If fewer than `fft_size` samples are given.
    pub fn process(&mut self, samples: &[f32]) -> &[u8] {
        let size = self.config.fft_size;
        assert!(samples.len() >= size, "analysis window needs {} samples", size);

        for (slot, (&sample, &w)) in self
            .scratch
            .iter_mut()
            .zip(samples.iter().zip(self.window.iter()))
        {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let tau = self.config.smoothing_time_constant;
        let scale = 1.0 / size as f32;
        let db_range = self.config.max_decibels - self.config.min_decibels;

        for ((bin, smoothed), byte) in self
            .scratch
            .iter()
            .zip(self.smoothed.iter_mut())
            .zip(self.bytes.iter_mut())
        {
            let magnitude = bin.norm() * scale;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;

            let db = 20.0 * smoothed.max(1e-10).log10();
            let normalized = (db - self.config.min_decibels) / db_range;
            *byte = (normalized * 255.0).clamp(0.0, 255.0) as u8;
        }

        &self.bytes
    }

    /// Drop smoothing state, e.g. after a pause
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
        self.bytes.fill(0);
    }
}

/// Pulls hop-sized analysis frames out of the PCM buffer the audio
/// callback fills.
///
/// Timestamps come from the number of samples consumed, so they advance
/// only while audio actually flows. Samples the producer dropped on
/// overflow still count toward the clock.
pub struct SpectrumSource {
    analyser: SpectrumAnalyser,
    pcm: SharedPcm,
    /// Analysis window copied out of `pcm` so the lock is not held while
    /// analysing
    window: Vec<f32>,
    samples_consumed: u64,
}

impl SpectrumSource {
    pub fn new(config: FFTConfig, pcm: SharedPcm) -> Self {
        let window = vec![0.0; config.fft_size];
        Self {
            analyser: SpectrumAnalyser::new(config),
            pcm,
            window,
            samples_consumed: 0,
        }
    }

    /// Audio time of the newest analysed frame
    pub fn clock(&self) -> Timestamp {
        samples_to_time(self.samples_consumed, self.analyser.config().sample_rate_hz)
    }

    /// Run `on_frame` once for every complete hop buffered since the last
    /// poll. Returns the number of frames produced.
    ///
    /// The PCM lock is taken once per hop, only long enough to copy the
    /// window out.
    pub fn poll(&mut self, mut on_frame: impl FnMut(&[u8], Timestamp)) -> usize {
        let hop_size = self.analyser.config().hop_size;
        let sample_rate_hz = self.analyser.config().sample_rate_hz;

        let mut frames = 0;
        loop {
            let (ready, dropped) = match self.pcm.lock() {
                Ok(mut pcm) => (pcm.read_window(&mut self.window, hop_size), pcm.take_dropped()),
                Err(_) => {
                    log::error!("PCM buffer poisoned, skipping analysis");
                    return frames;
                }
            };

            if dropped > 0 {
                log::warn!("analysis fell behind, {} samples dropped", dropped);
                self.samples_consumed += dropped;
            }
            if !ready {
                return frames;
            }

            self.samples_consumed += hop_size as u64;
            let now = samples_to_time(self.samples_consumed, sample_rate_hz);
            on_frame(self.analyser.process(&self.window), now);
            frames += 1;
        }
    }
}

fn samples_to_time(samples: u64, sample_rate_hz: usize) -> Duration {
    let nanos = u128::from(samples) * 1_000_000_000 / sample_rate_hz as u128;
    Duration::from_nanos(nanos as u64)
}

/// Blackman window (the analyser-node default) for FFT analysis
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::PcmBuffer;

    fn small_config() -> FFTConfig {
        FFTConfig {
            sample_rate_hz: 8000,
            fft_size: 256,
            hop_size: 128,
            ..FFTConfig::default()
        }
    }

    /// Wide dB window so neighbouring bins do not all saturate
    fn wide_config() -> FFTConfig {
        FFTConfig {
            max_decibels: 0.0,
            ..small_config()
        }
    }

    fn sine(freq_hz: f32, rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq_hz * i as f32 / rate).sin() * 0.8)
            .collect()
    }

    #[test]
    fn test_blackman_window() {
        let size = 1024;

        // Blackman window is ~0 at the edges and 1 at the center
        assert!(blackman_window(0, size).abs() < 0.01);
        assert!((blackman_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_silence_maps_to_zero() {
        let mut analyser = SpectrumAnalyser::new(small_config());
        let spectrum = analyser.process(&[0.0; 256]);
        assert_eq!(spectrum.len(), 128);
        assert!(spectrum.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let mut analyser = SpectrumAnalyser::new(wide_config());
        // 1000 Hz at 8 kHz / 256 points = bin 32
        let signal = sine(1000.0, 8000.0, 256);
        let spectrum = analyser.process(&signal).to_vec();

        let peak = spectrum
            .iter()
            .enumerate()
            .max_by_key(|&(_, &b)| b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 32);
        assert!(spectrum[32] > 150);
        assert!(spectrum[31] < spectrum[32]);
        assert!(spectrum[100] < spectrum[32] / 2);
    }

    #[test]
    fn test_smoothing_carries_over_frames() {
        let mut analyser = SpectrumAnalyser::new(wide_config());
        let signal = sine(1000.0, 8000.0, 256);
        let loud = analyser.process(&signal)[32];
        // The first silent frame still holds 60% of the previous magnitude
        let decayed = analyser.process(&[0.0; 256])[32];
        assert!(decayed > 0 && decayed < loud);

        analyser.reset();
        assert_eq!(analyser.process(&[0.0; 256])[32], 0);
    }

    fn filled(capacity: usize, len: usize) -> SharedPcm {
        let pcm = PcmBuffer::shared(capacity);
        pcm.lock().unwrap().push_mono(&vec![0.0; len]);
        pcm
    }

    #[test]
    fn test_source_emits_one_frame_per_hop() {
        let pcm = filled(4096, 256 + 128 * 3 + 50);
        let mut source = SpectrumSource::new(small_config(), Arc::clone(&pcm));

        let mut stamps = Vec::new();
        let frames = source.poll(|spectrum, now| {
            assert_eq!(spectrum.len(), 128);
            stamps.push(now);
        });

        assert_eq!(frames, 4);
        assert_eq!(pcm.lock().unwrap().len(), 256 - 128 + 50);
        // 128 samples at 8 kHz = 16ms per hop
        assert_eq!(stamps[0], Duration::from_millis(16));
        assert_eq!(stamps[3], Duration::from_millis(64));
        assert_eq!(source.clock(), Duration::from_millis(64));

        // Nothing new buffered: no frames, clock holds still
        assert_eq!(source.poll(|_, _| panic!("no frame expected")), 0);
    }

    #[test]
    fn test_dropped_samples_advance_clock() {
        // Producer kept only the newest 512 of 2560 samples
        let pcm = filled(512, 256 * 10);
        let mut source = SpectrumSource::new(small_config(), Arc::clone(&pcm));

        let frames = source.poll(|_, _| {});
        // (512 - 256) / 128 + 1 frames
        assert_eq!(frames, 3);
        assert!(pcm.lock().unwrap().len() < 256);
        // 2048 dropped + 3 hops of 128 = 2432 samples at 8 kHz
        assert_eq!(source.clock(), Duration::from_millis(304));
    }

    #[test]
    fn test_poll_releases_lock_between_hops() {
        let pcm = filled(4096, 256 + 128);
        let mut source = SpectrumSource::new(small_config(), Arc::clone(&pcm));

        // The producer can still push while a frame is being handled
        let frames = source.poll(|_, _| {
            pcm.try_lock()
                .expect("PCM lock held during frame handling")
                .push_mono(&[0.0; 8]);
        });
        assert_eq!(frames, 2);
        assert_eq!(pcm.lock().unwrap().len(), 128 + 16);
    }
}
