//! The analysis-to-fireworks pipeline.
//!
//! Two entry points run on the event-loop thread: `on_spectrum` once per
//! analysis hop and `on_frame` once per rendered frame. Their cadences are
//! independent; any number of hops may land between two frames.

use crate::analysis::{compute_band_energies, OnsetDetector, OnsetEvent, Timestamp};
use crate::effects::{EffectDirector, EffectManager, RenderSink};
use crate::params::ShowConfig;

pub struct FireworkShow {
    detector: OnsetDetector,
    director: EffectDirector,
    manager: EffectManager,
}

impl FireworkShow {
    pub fn new(config: &ShowConfig, seed: Option<u64>) -> Self {
        let director = match seed {
            Some(seed) => EffectDirector::with_seed(config.mapping.clone(), seed),
            None => EffectDirector::new(config.mapping.clone()),
        };

        Self {
            detector: OnsetDetector::new(config.onset.clone()),
            director,
            manager: EffectManager::new(config.physics.clone()),
        }
    }

    /// Analyse one spectrum frame and launch a burst for each onset that
    /// survives the spawn cap. Returns every detected onset.
    pub fn on_spectrum(
        &mut self,
        spectrum: &[u8],
        now: Timestamp,
        sink: &mut dyn RenderSink,
    ) -> Vec<OnsetEvent> {
        let energies = compute_band_energies(spectrum, self.detector.config().num_bands);
        let events = self.detector.detect(&energies, now);

        for request in self.director.on_events(&events) {
            self.manager.create(&request, sink);
        }
        events
    }

    /// Per render frame: maybe an idle launch while audio flows, then age
    /// every burst. Returns the number of bursts retired.
    pub fn on_frame(&mut self, audio_flowing: bool, sink: &mut dyn RenderSink) -> usize {
        if audio_flowing {
            if let Some(request) = self.director.idle_launch() {
                self.manager.create(&request, sink);
            }
        }
        self.manager.advance_all(sink)
    }

    pub fn live_effects(&self) -> usize {
        self.manager.len()
    }

    pub fn manager(&self) -> &EffectManager {
        &self.manager
    }
}
