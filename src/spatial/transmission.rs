//! Spatial transmission effects
//!
//! Lossy transmission (random sample drop-outs, smoothed), a spectral notch
//! "barrier", lossless pass-through, and two-signal coherence blending.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustfft::num_complex::Complex;
use tracing::{debug, Span};

use super::encoder::{pan, Position3D, StereoPair};
use crate::dsp::spectrum::{fft, fft_frequencies, ifft_real};
use crate::engine::signal::{moving_average, EPSILON};
use crate::error::{Result, SolidarityError};
use crate::logging;

/// Width of the barrier notch on each side of its centre, in Hz
pub const BARRIER_WIDTH_HZ: f64 = 100.0;

/// Transmission smoothing window in seconds
const SMOOTHING_SECS: f64 = 0.001;

/// Pearson correlation of two equal-length signals, in [-1, 1]
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    if a.is_empty() {
        return 0.0;
    }
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    (cov / ((var_a * var_b).sqrt() + EPSILON)).clamp(-1.0, 1.0)
}

/// Spatial transmission processor
#[derive(Debug, Clone)]
pub struct SpatialProcessor {
    sample_rate: u32,
    rng: StdRng,
    span: Span,
}

impl SpatialProcessor {
    /// Create a processor with an entropy-seeded RNG
    pub fn new(sample_rate: u32) -> Self {
        Self::with_rng(sample_rate, StdRng::from_entropy())
    }

    /// Create a processor whose transmission masks are reproducible
    pub fn with_seed(sample_rate: u32, seed: u64) -> Self {
        Self::with_rng(sample_rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(sample_rate: u32, rng: StdRng) -> Self {
        Self {
            sample_rate,
            rng,
            span: logging::component_span("spatial_transmission"),
        }
    }

    /// Replace the logging span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Keep each sample with probability `transmission_probability`, zero the
    /// rest, then smooth with a ~1 ms moving average to soften the gaps.
    pub fn apply_transmission(&mut self, signal: &[f64], transmission_probability: f64) -> Vec<f64> {
        let transmitted: Vec<f64> = signal
            .iter()
            .map(|&s| {
                if self.rng.gen::<f64>() < transmission_probability {
                    s
                } else {
                    0.0
                }
            })
            .collect();

        let kernel = ((self.sample_rate as f64 * SMOOTHING_SECS) as usize).max(1);
        let _guard = self.span.enter();
        debug!(transmission_probability, kernel, "transmission applied");
        moving_average(&transmitted, kernel)
    }

    /// Attenuate every bin within `BARRIER_WIDTH_HZ` of `barrier_frequency`
    /// by `barrier_strength`.
    ///
    /// Only the signed frequency is matched, so the mirrored negative bins
    /// pass untouched and a real tone at the barrier keeps `(2 - strength) / 2`
    /// of its amplitude once the real part is taken.
    pub fn create_barrier(
        &self,
        signal: &[f64],
        barrier_frequency: f64,
        barrier_strength: f64,
    ) -> Vec<f64> {
        let freqs = fft_frequencies(signal.len(), self.sample_rate as f64);
        let gain = 1.0 - barrier_strength;

        let filtered: Vec<Complex<f64>> = fft(signal)
            .into_iter()
            .zip(freqs.iter())
            .map(|(bin, f)| {
                if (f - barrier_frequency).abs() < BARRIER_WIDTH_HZ {
                    bin * gain
                } else {
                    bin
                }
            })
            .collect();

        ifft_real(&filtered)
    }

    /// Lossless transmission: an exact copy
    pub fn apply_perfect_transmission(&self, signal: &[f64]) -> Vec<f64> {
        signal.to_vec()
    }

    /// Blend two signals' magnitude spectra (average) under the first
    /// signal's phase. Returns the blended signal and the time-domain
    /// correlation of the inputs.
    pub fn apply_coherence(&self, a: &[f64], b: &[f64]) -> Result<(Vec<f64>, f64)> {
        if a.len() != b.len() {
            return Err(SolidarityError::LengthMismatch {
                expected: a.len(),
                actual: b.len(),
            });
        }
        let coherence = pearson_correlation(a, b);

        let spectrum_a = fft(a);
        let spectrum_b = fft(b);
        let enhanced: Vec<Complex<f64>> = spectrum_a
            .iter()
            .zip(spectrum_b.iter())
            .map(|(sa, sb)| {
                let magnitude = (sa.norm() + sb.norm()) / 2.0;
                Complex::from_polar(magnitude, sa.arg())
            })
            .collect();

        let _guard = self.span.enter();
        debug!(coherence, "coherence processed");
        Ok((ifft_real(&enhanced), coherence))
    }

    pub fn apply_3d_positioning(&self, signal: &[f64], x: f64, y: f64, z: f64) -> StereoPair {
        pan(signal, &Position3D::new(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::spectrum::magnitudes;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn tone(frequency: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * frequency * i as f64 / 44100.0).sin())
            .collect()
    }

    #[test]
    fn test_perfect_transmission_is_identity() {
        let processor = SpatialProcessor::with_seed(44100, 7);
        let signal = tone(440.0, 1000);
        assert_eq!(processor.apply_perfect_transmission(&signal), signal);
    }

    #[test]
    fn test_full_transmission_is_only_smoothed() {
        let mut processor = SpatialProcessor::with_seed(44100, 7);
        let signal = vec![1.0; 200];
        let out = processor.apply_transmission(&signal, 1.0);
        assert_eq!(out.len(), 200);
        // away from the edges the 44-tap average of ones is one
        assert_relative_eq!(out[100], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_transmission_silences() {
        let mut processor = SpatialProcessor::with_seed(44100, 7);
        let out = processor.apply_transmission(&tone(440.0, 500), 0.0);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_seeded_transmission_is_reproducible() {
        let signal = tone(440.0, 2000);
        let a = SpatialProcessor::with_seed(44100, 42).apply_transmission(&signal, 0.8);
        let b = SpatialProcessor::with_seed(44100, 42).apply_transmission(&signal, 0.8);
        assert_eq!(a, b);
    }

    #[test]
    fn test_barrier_halves_target_frequency() {
        let processor = SpatialProcessor::with_seed(44100, 0);
        let signal: Vec<f64> = tone(1000.0, 44100)
            .iter()
            .zip(tone(5000.0, 44100).iter())
            .map(|(a, b)| a + b)
            .collect();

        let out = processor.create_barrier(&signal, 1000.0, 1.0);
        let mags = magnitudes(&fft(&out));
        assert_relative_eq!(mags[1000], 11025.0, epsilon = 1e-6);
        assert_relative_eq!(mags[5000], 22050.0, epsilon = 1e-6);
    }

    #[test]
    fn test_partial_barrier_scales_bins() {
        let processor = SpatialProcessor::with_seed(44100, 0);
        let signal = tone(1000.0, 44100);
        let out = processor.create_barrier(&signal, 1000.0, 0.7);
        for (o, s) in out.iter().zip(signal.iter()) {
            assert_relative_eq!(*o, s * 0.65, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_barrier_ignores_mirrored_frequency() {
        let processor = SpatialProcessor::with_seed(44100, 0);
        let signal = tone(1000.0, 44100);
        let out = processor.create_barrier(&signal, -1000.0, 1.0);
        for (o, s) in out.iter().zip(signal.iter()) {
            assert_relative_eq!(*o, s * 0.5, epsilon = 1e-9);
        }
        let far = processor.create_barrier(&signal, 3000.0, 1.0);
        for (o, s) in far.iter().zip(signal.iter()) {
            assert_relative_eq!(o, s, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_coherence_of_identical_signals() {
        let processor = SpatialProcessor::with_seed(44100, 0);
        let signal = tone(440.0, 4410);
        let (enhanced, coherence) = processor.apply_coherence(&signal, &signal).unwrap();
        assert_relative_eq!(coherence, 1.0, epsilon = 1e-6);
        for (e, s) in enhanced.iter().zip(signal.iter()) {
            assert_relative_eq!(e, s, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_coherence_of_inverted_signals() {
        let processor = SpatialProcessor::with_seed(44100, 0);
        let signal = tone(440.0, 4410);
        let inverted: Vec<f64> = signal.iter().map(|s| -s).collect();
        let (_, coherence) = processor.apply_coherence(&signal, &inverted).unwrap();
        assert_relative_eq!(coherence, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_coherence_length_mismatch() {
        let processor = SpatialProcessor::with_seed(44100, 0);
        assert!(processor.apply_coherence(&[0.0; 4], &[0.0; 3]).is_err());
    }

    #[test]
    fn test_constant_signals_have_zero_coherence() {
        assert_eq!(pearson_correlation(&[1.0; 8], &[2.0; 8]), 0.0);
    }
}
