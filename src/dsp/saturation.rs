//! Distortion
//!
//! Hyperbolic-tangent soft clipper. Output is always inside (-1, 1).

use serde::{Deserialize, Serialize};

use super::effect::{check_range, Effect};
use crate::error::Result;

/// Soft-clip distortion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Distortion {
    /// Input gain before the clipper (0 to 100)
    pub gain: f64,
}

impl Default for Distortion {
    fn default() -> Self {
        Self { gain: 5.0 }
    }
}

impl Distortion {
    pub fn new(gain: f64) -> Self {
        Self { gain }
    }
}

impl Effect for Distortion {
    fn effect_type(&self) -> &'static str {
        "distortion"
    }

    fn validate(&self) -> Result<()> {
        check_range("gain", self.gain, 0.0, 100.0)
    }

    fn render(&self, signal: &[f64], _sample_rate: u32) -> Vec<f64> {
        signal.iter().map(|s| (s * self.gain).tanh()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_bounded() {
        let signal = [-10.0, -1.0, 0.0, 0.5, 3.0];
        let out = Distortion::default().process(&signal, 44100).unwrap();
        assert!(out.iter().all(|s| s.abs() <= 1.0));
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn test_small_gain_is_nearly_linear() {
        let out = Distortion::new(1.0).process(&[0.001], 44100).unwrap();
        assert!((out[0] - 0.001).abs() < 1e-8);
    }

    #[test]
    fn test_odd_symmetry() {
        let out = Distortion::default().process(&[0.3, -0.3], 44100).unwrap();
        assert_eq!(out[0], -out[1]);
    }
}
