//! Compressor effect
//!
//! Peak envelope follower with instant attack and linear-coefficient
//! release, followed by a hard-knee gain computer. Samples whose envelope
//! sits above the threshold are replaced by the compressed envelope level
//! carrying the original sign.

use serde::{Deserialize, Serialize};

use super::effect::{check_positive, check_range, Effect};
use crate::engine::signal::sign;
use crate::error::Result;

/// Dynamic range compressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Compressor {
    /// Linear threshold (0 to 1)
    pub threshold: f64,
    /// Compression ratio (must be positive; above 1 compresses)
    pub ratio: f64,
    /// Attack time in seconds. The follower attacks instantly; this is
    /// kept so parameter snapshots round-trip.
    pub attack: f64,
    /// Release time in seconds
    pub release: f64,
}

impl Default for Compressor {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            ratio: 4.0,
            attack: 0.005,
            release: 0.1,
        }
    }
}

impl Compressor {
    pub fn new(threshold: f64, ratio: f64) -> Self {
        Self {
            threshold,
            ratio,
            ..Default::default()
        }
    }
}

/// Peak envelope of `signal`.
///
/// The first sample always starts the envelope at zero. After that a louder
/// sample is taken directly and a quieter one decays the previous envelope
/// by `1 - 1/release_samples`.
pub fn envelope(signal: &[f64], release: f64, sample_rate: u32) -> Vec<f64> {
    let release_samples = ((release * sample_rate as f64) as usize).max(1);
    let decay = 1.0 - 1.0 / release_samples as f64;

    let mut env = vec![0.0; signal.len()];
    for i in 1..signal.len() {
        let level = signal[i].abs();
        env[i] = if level > env[i - 1] {
            level
        } else {
            env[i - 1] * decay
        };
    }
    env
}

impl Effect for Compressor {
    fn effect_type(&self) -> &'static str {
        "compression"
    }

    fn validate(&self) -> Result<()> {
        check_range("threshold", self.threshold, 0.0, 1.0)?;
        check_positive("ratio", self.ratio)?;
        check_range("attack", self.attack, 0.0, 1.0)?;
        check_positive("release", self.release)?;
        Ok(())
    }

    fn render(&self, signal: &[f64], sample_rate: u32) -> Vec<f64> {
        let env = envelope(signal, self.release, sample_rate);

        signal
            .iter()
            .zip(env.iter())
            .map(|(&s, &e)| {
                if e > self.threshold {
                    let excess = e - self.threshold;
                    (self.threshold + excess / self.ratio) * sign(s)
                } else {
                    s
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::signal::peak;

    fn sine(frequency: f64, num_samples: usize, amplitude: f64) -> Vec<f64> {
        (0..num_samples)
            .map(|i| amplitude * (2.0 * std::f64::consts::PI * frequency * i as f64 / 44100.0).sin())
            .collect()
    }

    #[test]
    fn test_envelope_starts_at_zero_and_tracks_peaks() {
        let env = envelope(&[0.9, 0.2, 0.8, 0.1], 0.1, 44100);
        assert_eq!(env[0], 0.0);
        assert_eq!(env[1], 0.2);
        assert_eq!(env[2], 0.8);
        // release decays by 1 - 1/4410
        assert!((env[3] - 0.8 * (1.0 - 1.0 / 4410.0)).abs() < 1e-12);
    }

    #[test]
    fn test_zero_release_does_not_divide_by_zero() {
        let env = envelope(&[0.0, 1.0, 0.5], 0.0, 44100);
        assert_eq!(env, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_peak_never_increases() {
        let input = sine(440.0, 44100, 1.0);
        for ratio in [1.5, 2.0, 4.0, 10.0] {
            let output = Compressor::new(0.5, ratio).process(&input, 44100).unwrap();
            assert_eq!(output.len(), input.len());
            assert!(peak(&output) <= peak(&input));
        }
    }

    #[test]
    fn test_quiet_signal_untouched() {
        let input = sine(440.0, 4410, 0.3);
        let output = Compressor::default().process(&input, 44100).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_loud_signal_reduced() {
        let input = sine(440.0, 44100, 1.0);
        let output = Compressor::new(0.5, 4.0).process(&input, 44100).unwrap();
        // threshold + (1 - threshold) / ratio
        assert!(peak(&output) <= 0.625 + 1e-9);
        assert!(peak(&output) > 0.6);
    }

    #[test]
    fn test_sign_preserved() {
        let input = [0.0, 0.9, -0.95, 0.92, -0.97];
        let output = Compressor::new(0.5, 4.0).process(&input, 44100).unwrap();
        for (i, o) in input.iter().zip(output.iter()) {
            assert!(i * o >= 0.0);
        }
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        let comp = Compressor::new(0.5, 0.0);
        assert!(comp.process(&[0.1, 0.2], 44100).is_err());
    }
}
