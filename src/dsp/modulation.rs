//! Modulation effects
//!
//! Chorus and flanger read the dry signal back through an LFO-swept lookback;
//! the phaser stacks rotated copies of the running output.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::effect::{check_positive, check_range, Effect};
use crate::engine::signal::roll;
use crate::error::Result;

/// Sine LFO value at sample `i`
fn lfo(rate: f64, i: usize, sample_rate: u32) -> f64 {
    (2.0 * PI * rate * i as f64 / sample_rate as f64).sin()
}

/// Lookback distance at sample `i` for an LFO-swept delay of `depth` seconds
fn lookback(rate: f64, depth: f64, i: usize, sample_rate: u32) -> usize {
    (lfo(rate, i, sample_rate) * depth * sample_rate as f64)
        .round()
        .abs() as usize
}

/// Mix each sample with an LFO-delayed copy; samples whose lookback would
/// reach before the start pass through dry.
fn swept_mix(
    signal: &[f64],
    rate: f64,
    depth: f64,
    sample_rate: u32,
    mix: impl Fn(f64, f64) -> f64,
) -> Vec<f64> {
    signal
        .iter()
        .enumerate()
        .map(|(i, &dry)| {
            let d = lookback(rate, depth, i, sample_rate);
            if i >= d {
                mix(dry, signal[i - d])
            } else {
                dry
            }
        })
        .collect()
}

/// Chorus: dry/wet crossfade against an LFO-delayed copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chorus {
    /// LFO rate in Hz
    pub rate: f64,
    /// Maximum delay in seconds (0 to 0.1)
    pub depth: f64,
    /// Wet level (0 to 1)
    pub wet: f64,
}

impl Default for Chorus {
    fn default() -> Self {
        Self {
            rate: 1.5,
            depth: 0.002,
            wet: 0.5,
        }
    }
}

impl Effect for Chorus {
    fn effect_type(&self) -> &'static str {
        "chorus"
    }

    fn validate(&self) -> Result<()> {
        check_positive("rate", self.rate)?;
        check_range("depth", self.depth, 0.0, 0.1)?;
        check_range("wet", self.wet, 0.0, 1.0)?;
        Ok(())
    }

    fn render(&self, signal: &[f64], sample_rate: u32) -> Vec<f64> {
        let wet = self.wet;
        swept_mix(signal, self.rate, self.depth, sample_rate, |dry, delayed| {
            (1.0 - wet) * dry + wet * delayed
        })
    }
}

/// Flanger: the full dry signal plus a scaled LFO-delayed copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flanger {
    /// LFO rate in Hz
    pub rate: f64,
    /// Maximum delay in seconds (0 to 0.1)
    pub depth: f64,
    /// Level of the delayed copy (0 to 1)
    pub mix: f64,
}

impl Default for Flanger {
    fn default() -> Self {
        Self {
            rate: 0.5,
            depth: 0.003,
            mix: 0.5,
        }
    }
}

impl Effect for Flanger {
    fn effect_type(&self) -> &'static str {
        "flanger"
    }

    fn validate(&self) -> Result<()> {
        check_positive("rate", self.rate)?;
        check_range("depth", self.depth, 0.0, 0.1)?;
        check_range("mix", self.mix, 0.0, 1.0)?;
        Ok(())
    }

    fn render(&self, signal: &[f64], sample_rate: u32) -> Vec<f64> {
        let mix = self.mix;
        swept_mix(signal, self.rate, self.depth, sample_rate, |dry, delayed| {
            dry + mix * delayed
        })
    }
}

/// Phaser: repeated self-addition of a rotated copy, averaged over stages.
///
/// The rotation is taken from the LFO's value at the first sample scaled by
/// `sweep`, so it is fixed for the whole buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phaser {
    /// LFO rate in Hz
    pub rate: f64,
    /// Number of stages (1 to 32)
    pub stages: usize,
    /// Level of the rotated copy added per stage (0 to 1)
    pub feedback: f64,
    /// Maximum rotation in samples
    pub sweep: f64,
}

impl Default for Phaser {
    fn default() -> Self {
        Self {
            rate: 0.5,
            stages: 4,
            feedback: 0.3,
            sweep: 10.0,
        }
    }
}

impl Phaser {
    /// Rotation applied at each stage
    pub fn rotation(&self, sample_rate: u32) -> isize {
        (lfo(self.rate, 0, sample_rate) * self.sweep) as isize
    }
}

impl Effect for Phaser {
    fn effect_type(&self) -> &'static str {
        "phaser"
    }

    fn validate(&self) -> Result<()> {
        check_positive("rate", self.rate)?;
        check_range("stages", self.stages as f64, 1.0, 32.0)?;
        check_range("feedback", self.feedback, 0.0, 1.0)?;
        check_range("sweep", self.sweep, 0.0, 1000.0)?;
        Ok(())
    }

    fn render(&self, signal: &[f64], sample_rate: u32) -> Vec<f64> {
        let shift = self.rotation(sample_rate);
        let mut output = signal.to_vec();

        for _ in 0..self.stages {
            let rotated = roll(&output, shift);
            for (out, r) in output.iter_mut().zip(rotated.iter()) {
                *out += self.feedback * r;
            }
        }

        let norm = (self.stages + 1) as f64;
        output.iter().map(|s| s / norm).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / n as f64).collect()
    }

    #[test]
    fn test_lookback_is_non_negative_and_bounded() {
        let depth = 0.002;
        for i in (0..44100).step_by(97) {
            let d = lookback(1.5, depth, i, 44100);
            assert!(d <= (depth * 44100.0).round() as usize);
        }
    }

    #[test]
    fn test_chorus_start_is_dry() {
        // the LFO starts at zero, so the first sample reads itself
        let signal = ramp(1000);
        let out = Chorus::default().process(&signal, 44100).unwrap();
        assert_eq!(out.len(), signal.len());
        assert_relative_eq!(out[0], signal[0]);
    }

    #[test]
    fn test_chorus_mixes_delayed_copy() {
        let signal = ramp(44100);
        let out = Chorus::default().process(&signal, 44100).unwrap();
        // a quarter LFO cycle in, lookback reaches its maximum of 88 samples
        let i = (44100.0 / (4.0 * 1.5)) as usize;
        let d = lookback(1.5, 0.002, i, 44100);
        assert_eq!(d, 88);
        assert_relative_eq!(out[i], 0.5 * signal[i] + 0.5 * signal[i - d]);
    }

    #[test]
    fn test_flanger_adds_delayed_copy() {
        let signal = ramp(44100);
        let out = Flanger::default().process(&signal, 44100).unwrap();
        let i = 22050;
        let d = lookback(0.5, 0.003, i, 44100);
        assert_relative_eq!(out[i], signal[i] + 0.5 * signal[i - d]);
    }

    #[test]
    fn test_phaser_default_rotation_is_zero() {
        assert_eq!(Phaser::default().rotation(44100), 0);
        let signal = ramp(100);
        let out = Phaser::default().process(&signal, 44100).unwrap();
        let gain = 1.3_f64.powi(4) / 5.0;
        for (o, s) in out.iter().zip(signal.iter()) {
            assert_relative_eq!(*o, s * gain, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_phaser_invalid_stages() {
        let phaser = Phaser {
            stages: 0,
            ..Default::default()
        };
        assert!(phaser.process(&[0.0; 4], 44100).is_err());
    }
}
