//! Delay Effect
//!
//! Single feedback delay line blended with the dry signal. The same line
//! drives every tap of the reverb.

use serde::{Deserialize, Serialize};

use super::effect::{check_range, Effect};
use crate::error::Result;

/// Run `signal` through a feedback delay line of `delay_samples`.
///
/// Feedback accumulates forward through the output, so each echo feeds the
/// next: `out[i] += out[i - delay] * feedback` for `i >= delay`. A zero delay
/// degenerates to a plain gain of `1 + feedback`.
pub fn feedback_delay_line(signal: &[f64], delay_samples: usize, feedback: f64) -> Vec<f64> {
    let mut output = signal.to_vec();
    for i in delay_samples..output.len() {
        output[i] += output[i - delay_samples] * feedback;
    }
    output
}

/// Echo effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delay {
    /// Delay time in seconds (0 to 10)
    pub delay_time: f64,
    /// Feedback amount (0 to 0.99)
    pub feedback: f64,
    /// Blend amount (0 to 1). The delayed line is weighted by `1 - wet`
    /// and the untouched input by `wet`.
    pub wet: f64,
}

impl Default for Delay {
    fn default() -> Self {
        Self {
            delay_time: 0.5,
            feedback: 0.3,
            wet: 0.4,
        }
    }
}

impl Delay {
    pub fn new(delay_time: f64) -> Self {
        Self {
            delay_time,
            ..Default::default()
        }
    }

    /// Delay length in samples at `sample_rate`
    pub fn delay_samples(&self, sample_rate: u32) -> usize {
        (self.delay_time * sample_rate as f64) as usize
    }
}

impl Effect for Delay {
    fn effect_type(&self) -> &'static str {
        "delay"
    }

    fn validate(&self) -> Result<()> {
        check_range("delay_time", self.delay_time, 0.0, 10.0)?;
        check_range("feedback", self.feedback, 0.0, 0.99)?;
        check_range("wet", self.wet, 0.0, 1.0)?;
        Ok(())
    }

    fn render(&self, signal: &[f64], sample_rate: u32) -> Vec<f64> {
        let line = feedback_delay_line(signal, self.delay_samples(sample_rate), self.feedback);
        line.iter()
            .zip(signal.iter())
            .map(|(&delayed, &dry)| delayed * (1.0 - self.wet) + dry * self.wet)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_line_impulse_echoes() {
        let mut impulse = vec![0.0; 10];
        impulse[0] = 1.0;
        let out = feedback_delay_line(&impulse, 3, 0.5);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[3], 0.5);
        assert_eq!(out[6], 0.25);
        assert_eq!(out[9], 0.125);
        assert_eq!(out[1], 0.0);
    }

    #[test]
    fn test_zero_delay_is_gain() {
        let out = feedback_delay_line(&[1.0, -2.0], 0, 0.3);
        assert!((out[0] - 1.3).abs() < 1e-12);
        assert!((out[1] + 2.6).abs() < 1e-12);
    }

    #[test]
    fn test_delay_longer_than_signal_passes_through() {
        let signal = [0.1, 0.2, 0.3];
        assert_eq!(feedback_delay_line(&signal, 10, 0.9), signal.to_vec());
    }

    #[test]
    fn test_delay_preserves_length() {
        let signal: Vec<f64> = (0..44100).map(|i| (i as f64 * 0.01).sin()).collect();
        let out = Delay::default().process(&signal, 44100).unwrap();
        assert_eq!(out.len(), signal.len());
    }

    #[test]
    fn test_delay_blend() {
        // before the first echo the line equals the input, so the blend is identity
        let signal = vec![0.5; 100];
        let out = Delay::new(0.5).process(&signal, 44100).unwrap();
        for s in out {
            assert!((s - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_runaway_feedback_rejected() {
        let delay = Delay {
            feedback: 1.5,
            ..Default::default()
        };
        assert!(delay.process(&[0.0; 4], 44100).is_err());
    }
}
