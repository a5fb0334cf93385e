//! Resampling effects
//!
//! Pitch shift and time stretch both read the input back at a fractional
//! step with linear interpolation. Pitch shift keeps the buffer length, so an
//! upward shift runs out of input early and the tail holds the last sample.
//! Time stretch resizes the buffer instead.

use serde::{Deserialize, Serialize};

use super::effect::{check_positive, check_range, Effect};
use crate::engine::signal::resample;
use crate::error::Result;

/// Resampling pitch shift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PitchShift {
    /// Shift in semitones (-48 to 48)
    pub semitones: f64,
}

impl PitchShift {
    pub fn new(semitones: f64) -> Self {
        Self { semitones }
    }

    /// Playback-rate ratio `2^(semitones/12)`
    pub fn ratio(&self) -> f64 {
        2.0_f64.powf(self.semitones / 12.0)
    }
}

impl Effect for PitchShift {
    fn effect_type(&self) -> &'static str {
        "pitch_shift"
    }

    fn validate(&self) -> Result<()> {
        check_range("semitones", self.semitones, -48.0, 48.0)
    }

    fn render(&self, signal: &[f64], _sample_rate: u32) -> Vec<f64> {
        resample(signal, signal.len(), self.ratio())
    }
}

/// Resampling time stretch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeStretch {
    /// Length multiplier; output holds `round(len * factor)` samples
    pub factor: f64,
}

impl Default for TimeStretch {
    fn default() -> Self {
        Self { factor: 1.5 }
    }
}

impl TimeStretch {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }

    /// Output length for an input of `len` samples
    pub fn output_len(&self, len: usize) -> usize {
        (len as f64 * self.factor).round() as usize
    }
}

impl Effect for TimeStretch {
    fn effect_type(&self) -> &'static str {
        "time_stretch"
    }

    fn validate(&self) -> Result<()> {
        check_positive("factor", self.factor)
    }

    fn render(&self, signal: &[f64], _sample_rate: u32) -> Vec<f64> {
        resample(signal, self.output_len(signal.len()), 1.0 / self.factor)
    }
}

/// Harmonizer: dry signal plus a fifth and an octave above
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Harmonizer {
    pub dry_level: f64,
    pub fifth_level: f64,
    pub octave_level: f64,
}

impl Default for Harmonizer {
    fn default() -> Self {
        Self {
            dry_level: 0.6,
            fifth_level: 0.3,
            octave_level: 0.1,
        }
    }
}

impl Effect for Harmonizer {
    fn effect_type(&self) -> &'static str {
        "harmonize"
    }

    fn validate(&self) -> Result<()> {
        check_range("dry_level", self.dry_level, 0.0, 1.0)?;
        check_range("fifth_level", self.fifth_level, 0.0, 1.0)?;
        check_range("octave_level", self.octave_level, 0.0, 1.0)?;
        Ok(())
    }

    fn render(&self, signal: &[f64], sample_rate: u32) -> Vec<f64> {
        let fifth = PitchShift::new(7.0).render(signal, sample_rate);
        let octave = PitchShift::new(12.0).render(signal, sample_rate);

        signal
            .iter()
            .zip(fifth.iter().zip(octave.iter()))
            .map(|(&s, (&f, &o))| s * self.dry_level + f * self.fifth_level + o * self.octave_level)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::signal::peak;
    use approx::assert_relative_eq;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_octave_up_reads_every_other_sample() {
        let signal = ramp(10);
        let out = PitchShift::new(12.0).process(&signal, 44100).unwrap();
        assert_eq!(out.len(), 10);
        assert_relative_eq!(out[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(out[4], 8.0, epsilon = 1e-12);
        // past the end of the input the last sample holds
        assert_relative_eq!(out[9], 9.0);
    }

    #[test]
    fn test_zero_shift_is_identity() {
        let signal = ramp(16);
        assert_eq!(PitchShift::new(0.0).process(&signal, 44100).unwrap(), signal);
    }

    #[test]
    fn test_time_stretch_length() {
        let signal = ramp(1001);
        for factor in [0.5, 0.75, 1.0, 1.5, 2.0, 1.337] {
            let out = TimeStretch::new(factor).process(&signal, 44100).unwrap();
            assert_eq!(out.len(), (1001.0 * factor).round() as usize);
        }
    }

    #[test]
    fn test_time_stretch_interpolates() {
        let out = TimeStretch::new(2.0).process(&[0.0, 1.0, 2.0], 44100).unwrap();
        assert_eq!(out, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.0]);
    }

    #[test]
    fn test_time_stretch_rejects_zero_factor() {
        assert!(TimeStretch::new(0.0).process(&[1.0], 44100).is_err());
    }

    #[test]
    fn test_harmonizer_bounded_by_weights() {
        let signal: Vec<f64> = (0..4410).map(|i| (i as f64 * 0.05).sin()).collect();
        let out = Harmonizer::default().process(&signal, 44100).unwrap();
        assert_eq!(out.len(), signal.len());
        assert!(peak(&out) <= peak(&signal) + 1e-12);
    }
}
