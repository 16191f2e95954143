//! Bounded mono PCM buffer shared between the device callback and analysis.

use std::sync::{Arc, Mutex};

/// PCM buffer handle shared with the device callback
pub type SharedPcm = Arc<Mutex<PcmBuffer>>;

/// Mono samples waiting for analysis, capped at a fixed length.
///
/// The producer drops the oldest samples once the cap is reached, so the
/// buffer stays bounded even when nothing drains it (e.g. a hidden window
/// that no longer receives redraws). Dropped samples are counted so the
/// analysis clock can skip over them.
#[derive(Debug)]
pub struct PcmBuffer {
    samples: Vec<f32>,
    capacity: usize,
    dropped: u64,
}

impl PcmBuffer {
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "PCM buffer needs room for at least one sample");
        Self {
            // Headroom for one device callback past the cap
            samples: Vec::with_capacity(capacity * 2),
            capacity,
            dropped: 0,
        }
    }

    pub fn shared(capacity: usize) -> SharedPcm {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    /// Append the mono mixdown of an interleaved device buffer
    pub fn push_interleaved(&mut self, data: &[f32], channels: usize) {
        let channels = channels.max(1);
        self.samples.extend(
            data.chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
        self.trim();
    }

    /// Append mono samples
    pub fn push_mono(&mut self, samples: &[f32]) {
        self.samples.extend_from_slice(samples);
        self.trim();
    }

    fn trim(&mut self) {
        if self.samples.len() > self.capacity {
            let excess = self.samples.len() - self.capacity;
            self.samples.drain(0..excess);
            self.dropped += excess as u64;
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples dropped since the last call
    pub fn take_dropped(&mut self) -> u64 {
        std::mem::take(&mut self.dropped)
    }

    /// Copy the oldest `window.len()` samples into `window` and release the
    /// first `hop` of them. Returns `false` (leaving everything untouched)
    /// while fewer than `window.len()` samples are buffered.
    pub fn read_window(&mut self, window: &mut [f32], hop: usize) -> bool {
        if self.samples.len() < window.len() {
            return false;
        }
        window.copy_from_slice(&self.samples[..window.len()]);
        self.samples.drain(0..hop.min(self.samples.len()));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_never_exceeds_capacity() {
        let mut pcm = PcmBuffer::new(512);
        // ~3 seconds of stereo callbacks at 44.1kHz with no consumer
        let block = vec![0.25; 2 * 441];
        for _ in 0..300 {
            pcm.push_interleaved(&block, 2);
            assert!(pcm.len() <= 512);
        }
        assert_eq!(pcm.len(), 512);
        assert_eq!(pcm.take_dropped(), 300 * 441 - 512);
        assert_eq!(pcm.take_dropped(), 0);
    }

    #[test]
    fn test_oldest_samples_are_dropped() {
        let mut pcm = PcmBuffer::new(4);
        pcm.push_mono(&[1.0, 2.0, 3.0]);
        pcm.push_mono(&[4.0, 5.0, 6.0]);

        let mut window = [0.0; 4];
        assert!(pcm.read_window(&mut window, 2));
        assert_eq!(window, [3.0, 4.0, 5.0, 6.0]);
        assert_eq!(pcm.len(), 2);
        assert_eq!(pcm.take_dropped(), 2);
    }

    #[test]
    fn test_mixdown_averages_channels() {
        let mut pcm = PcmBuffer::new(16);
        pcm.push_interleaved(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2);

        let mut window = [9.0; 3];
        assert!(pcm.read_window(&mut window, 3));
        assert_eq!(window, [0.5, 0.5, 0.0]);
        assert!(pcm.is_empty());
    }

    #[test]
    fn test_short_buffer_yields_no_window() {
        let mut pcm = PcmBuffer::new(16);
        pcm.push_mono(&[0.1; 3]);
        let mut window = [0.0; 4];
        assert!(!pcm.read_window(&mut window, 2));
        assert_eq!(pcm.len(), 3);
    }
}
