//! Reduction of a byte spectrum to per-band mean energies.

/// Mean energy per frequency band, lowest band first
pub type BandEnergy = Vec<f32>;

/// Split `spectrum` into `num_bands` contiguous, equal-width slices and
/// return the mean magnitude of each.
///
/// Slices are `spectrum.len() / num_bands` bins wide; the last slice also
/// takes the remainder of the division.
///
/// # Panics
/// If `num_bands` is zero or larger than the spectrum.
pub fn compute_band_energies(spectrum: &[u8], num_bands: usize) -> BandEnergy {
    assert!(num_bands >= 1, "band count must be at least 1");
    assert!(
        spectrum.len() >= num_bands,
        "spectrum of {} bins cannot be split into {} bands",
        spectrum.len(),
        num_bands
    );

    let width = spectrum.len() / num_bands;

    (0..num_bands)
        .map(|band| {
            let start = band * width;
            let end = if band + 1 == num_bands {
                spectrum.len()
            } else {
                start + width
            };
            let slice = &spectrum[start..end];
            let sum: u32 = slice.iter().map(|&bin| u32::from(bin)).sum();
            sum as f32 / slice.len() as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_equal_slices() {
        let spectrum = [10, 20, 30, 40, 50, 60, 70, 80];
        let bands = compute_band_energies(&spectrum, 4);
        assert_eq!(bands, vec![15.0, 35.0, 55.0, 75.0]);
    }

    #[test]
    fn test_last_band_absorbs_remainder() {
        // 10 bins / 3 bands: widths 3, 3, 4
        let spectrum = [0, 0, 0, 3, 3, 3, 8, 8, 8, 8];
        let bands = compute_band_energies(&spectrum, 3);
        assert_eq!(bands, vec![0.0, 3.0, 8.0]);
    }

    #[test]
    fn test_single_band_is_global_mean() {
        let spectrum = [255u8; 1024];
        assert_eq!(compute_band_energies(&spectrum, 1), vec![255.0]);
    }

    #[test]
    #[should_panic(expected = "band count")]
    fn test_zero_bands_panics() {
        compute_band_energies(&[1, 2, 3], 0);
    }

    #[test]
    #[should_panic(expected = "cannot be split")]
    fn test_too_few_bins_panics() {
        compute_band_energies(&[1, 2], 3);
    }

    proptest! {
        #[test]
        fn prop_band_count_and_means(
            spectrum in proptest::collection::vec(any::<u8>(), 1..512),
            bands_hint in 1usize..64,
        ) {
            let num_bands = bands_hint.min(spectrum.len());
            let energies = compute_band_energies(&spectrum, num_bands);
            prop_assert_eq!(energies.len(), num_bands);

            // Rebuild the slices independently; lengths must cover the spectrum
            let width = spectrum.len() / num_bands;
            let mut covered = 0;
            for (band, energy) in energies.iter().enumerate() {
                let len = if band + 1 == num_bands { spectrum.len() - covered } else { width };
                let slice = &spectrum[covered..covered + len];
                let mean = slice.iter().map(|&b| b as f32).sum::<f32>() / len as f32;
                prop_assert!((energy - mean).abs() < 1e-3);
                covered += len;
            }
            prop_assert_eq!(covered, spectrum.len());
        }
    }
}
