//! Signal helpers
//!
//! Signals are plain `&[f64]` slices at the owning component's sample rate.
//! These helpers cover the array primitives the effects are built from:
//! level measurement, linear interpolation over the sample grid, and
//! same-length moving averages.

/// Guard added to data-dependent denominators
pub const EPSILON: f64 = 1e-10;

/// Root-mean-square level (0.0 for an empty signal)
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Absolute peak level (0.0 for an empty signal)
pub fn peak(samples: &[f64]) -> f64 {
    samples.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()))
}

/// Peak-to-RMS ratio in dB
pub fn dynamic_range_db(samples: &[f64]) -> f64 {
    20.0 * (peak(samples) / (rms(samples) + EPSILON)).log10()
}

/// True when every sample is finite
pub fn is_finite(samples: &[f64]) -> bool {
    samples.iter().all(|s| s.is_finite())
}

/// `num` evenly spaced values from `start` to `stop`, both ends included
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            (0..num)
                .map(|i| {
                    if i == num - 1 {
                        stop
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// Linear interpolation of `samples` at fractional index `position`.
///
/// Positions outside `[0, len-1]` clamp to the first/last sample.
pub fn interp_at(samples: &[f64], position: f64) -> f64 {
    let Some(&last) = samples.last() else {
        return 0.0;
    };
    if position <= 0.0 {
        return samples[0];
    }
    let max_index = (samples.len() - 1) as f64;
    if position >= max_index {
        return last;
    }
    let lower = position.floor() as usize;
    let frac = position - lower as f64;
    samples[lower] + (samples[lower + 1] - samples[lower]) * frac
}

/// Resample `samples` onto a new grid where output index `i` reads
/// input position `i * step`.
pub fn resample(samples: &[f64], output_len: usize, step: f64) -> Vec<f64> {
    (0..output_len)
        .map(|i| interp_at(samples, i as f64 * step))
        .collect()
}

/// Centred moving average of width `window`, same length as the input.
///
/// Matches a "same"-mode convolution with a box kernel: output `i` averages
/// the kernel-aligned neighbourhood, with zeros beyond the edges.
pub fn moving_average(samples: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let n = samples.len();
    let offset = (window - 1) / 2;
    let scale = 1.0 / window as f64;

    // Prefix sums keep this linear in n regardless of window
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    let mut acc = 0.0;
    for &s in samples {
        acc += s;
        prefix.push(acc);
    }

    (0..n)
        .map(|i| {
            // full-convolution index k = i + offset covers inputs k-window+1..=k
            let k = i + offset;
            let hi = (k + 1).min(n);
            let lo = (k + 1).saturating_sub(window).min(hi);
            (prefix[hi] - prefix[lo]) * scale
        })
        .collect()
}

/// Running sum
pub fn cumsum(samples: &[f64]) -> Vec<f64> {
    samples
        .iter()
        .scan(0.0, |acc, &s| {
            *acc += s;
            Some(*acc)
        })
        .collect()
}

/// Circular shift to the right by `shift` (negative shifts rotate left)
pub fn roll(samples: &[f64], shift: isize) -> Vec<f64> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }
    let k = shift.rem_euclid(n as isize) as usize;
    let mut rolled = Vec::with_capacity(n);
    rolled.extend_from_slice(&samples[n - k..]);
    rolled.extend_from_slice(&samples[..n - k]);
    rolled
}

/// `sin(2π·frequency·t)` sampled at each time in `times`
pub fn sine_at(frequency: f64, times: &[f64]) -> Vec<f64> {
    times
        .iter()
        .map(|t| (2.0 * std::f64::consts::PI * frequency * t).sin())
        .collect()
}

/// Sign of a sample, with zero mapping to zero
pub(crate) fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
