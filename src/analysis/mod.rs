//! Spectrum analysis: band energies and onset detection.

mod bands;
mod onset;

pub use bands::{compute_band_energies, BandEnergy};
pub use onset::{BandStats, EnergyHistory, OnsetDetector, OnsetEvent, Timestamp};
