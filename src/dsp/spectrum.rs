//! FFT helpers
//!
//! Full-length complex transforms of real signals via `rustfft`, plus the
//! matching bin-frequency table.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Forward DFT of a real signal (unnormalized)
pub fn fft(samples: &[f64]) -> Vec<Complex<f64>> {
    let mut buffer: Vec<Complex<f64>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
    if buffer.is_empty() {
        return buffer;
    }
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);
    buffer
}

/// Inverse DFT, normalized by `1/n`, keeping only the real part
pub fn ifft_real(spectrum: &[Complex<f64>]) -> Vec<f64> {
    if spectrum.is_empty() {
        return Vec::new();
    }
    let mut buffer = spectrum.to_vec();
    let mut planner = FftPlanner::new();
    let ifft = planner.plan_fft_inverse(buffer.len());
    ifft.process(&mut buffer);

    let scale = 1.0 / buffer.len() as f64;
    buffer.iter().map(|c| c.re * scale).collect()
}

/// Magnitude of each bin
pub fn magnitudes(spectrum: &[Complex<f64>]) -> Vec<f64> {
    spectrum.iter().map(|c| c.norm()).collect()
}

/// Centre frequency of each DFT bin for an `n`-point transform.
///
/// Bins `0..=(n-1)/2` are non-negative, the rest wrap to negative
/// frequencies, as in the standard `fftfreq` layout.
pub fn fft_frequencies(n: usize, sample_rate: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let bin_hz = sample_rate / n as f64;
    let positive_end = (n - 1) / 2;
    (0..n)
        .map(|k| {
            if k <= positive_end {
                k as f64 * bin_hz
            } else {
                (k as f64 - n as f64) * bin_hz
            }
        })
        .collect()
}
