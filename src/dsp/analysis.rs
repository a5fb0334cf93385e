//! Harmonic analysis
//!
//! Finds the strongest non-DC bin of the positive half-spectrum and reports
//! the nearest bins to its integer multiples, along with signal levels.

use serde::{Deserialize, Serialize};

use super::spectrum::{fft, fft_frequencies, magnitudes};
use crate::engine::signal::{peak, rms};
use crate::error::{Result, SolidarityError};

/// Highest harmonic number reported
pub const MAX_HARMONIC: usize = 10;

/// One harmonic of the detected fundamental
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harmonic {
    /// Harmonic number (2 = first overtone)
    pub number: usize,
    /// Frequency of the nearest bin in Hz
    pub frequency: f64,
    /// Magnitude of that bin
    pub magnitude: f64,
}

/// Result of [`analyze_harmonics`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonicAnalysis {
    pub fundamental_frequency: f64,
    pub fundamental_magnitude: f64,
    pub harmonics: Vec<Harmonic>,
    pub rms: f64,
    pub peak: f64,
}

/// Analyze the harmonic content of `signal`.
///
/// Needs at least 4 samples so the positive half-spectrum has a non-DC bin.
pub fn analyze_harmonics(signal: &[f64], sample_rate: u32) -> Result<HarmonicAnalysis> {
    let n = signal.len();
    if n < 4 {
        return Err(SolidarityError::SignalTooShort {
            operation: "harmonic analysis",
            len: n,
            min: 4,
        });
    }

    let half = n / 2;
    let freqs = fft_frequencies(n, sample_rate as f64);
    let mags = magnitudes(&fft(signal));
    let positive_freqs = &freqs[..half];
    let positive_mags = &mags[..half];

    // argmax over bins 1.., first maximum wins
    let mut fundamental_idx = 1;
    for (k, &m) in positive_mags.iter().enumerate().skip(2) {
        if m > positive_mags[fundamental_idx] {
            fundamental_idx = k;
        }
    }
    let fundamental_frequency = positive_freqs[fundamental_idx];

    let harmonics = (2..=MAX_HARMONIC)
        .map(|number| {
            let target = fundamental_frequency * number as f64;
            let idx = nearest_bin(positive_freqs, target);
            Harmonic {
                number,
                frequency: positive_freqs[idx],
                magnitude: positive_mags[idx],
            }
        })
        .collect();

    Ok(HarmonicAnalysis {
        fundamental_frequency,
        fundamental_magnitude: positive_mags[fundamental_idx],
        harmonics,
        rms: rms(signal),
        peak: peak(signal),
    })
}

/// Index of the bin closest to `target`; ties go to the lower bin
fn nearest_bin(freqs: &[f64], target: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (k, f) in freqs.iter().enumerate() {
        let dist = (f - target).abs();
        if dist < best_dist {
            best = k;
            best_dist = dist;
        }
    }
    best
}
