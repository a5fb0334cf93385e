//! Reverb effect
//!
//! Eight parallel feedback delay lines at mutually prime-ish offsets,
//! scaled by room size and summed on top of the dry signal.

use serde::{Deserialize, Serialize};

use super::delay::feedback_delay_line;
use super::effect::{check_range, Effect};
use crate::error::Result;

/// Tap offsets in seconds at room size 1.0
pub const REVERB_DELAYS: [f64; 8] = [0.037, 0.041, 0.043, 0.047, 0.051, 0.053, 0.059, 0.061];

/// Multi-tap room reverb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reverb {
    /// Room size scaling the tap offsets (0 to 10)
    pub room_size: f64,
    /// Feedback of each delay line (0 to 0.99)
    pub damping: f64,
    /// Total wet level, split evenly across the taps (0 to 1)
    pub wet: f64,
}

impl Default for Reverb {
    fn default() -> Self {
        Self {
            room_size: 0.7,
            damping: 0.5,
            wet: 0.3,
        }
    }
}

impl Reverb {
    pub fn new(room_size: f64) -> Self {
        Self {
            room_size,
            ..Default::default()
        }
    }

    /// Tap lengths in samples at `sample_rate`
    pub fn tap_samples(&self, sample_rate: u32) -> [usize; 8] {
        REVERB_DELAYS.map(|t| (t * sample_rate as f64 * self.room_size) as usize)
    }
}

impl Effect for Reverb {
    fn effect_type(&self) -> &'static str {
        "reverb"
    }

    fn validate(&self) -> Result<()> {
        check_range("room_size", self.room_size, 0.0, 10.0)?;
        check_range("damping", self.damping, 0.0, 0.99)?;
        check_range("wet", self.wet, 0.0, 1.0)?;
        Ok(())
    }

    fn render(&self, signal: &[f64], sample_rate: u32) -> Vec<f64> {
        let mut output = signal.to_vec();
        let tap_gain = self.wet / REVERB_DELAYS.len() as f64;

        for delay_samples in self.tap_samples(sample_rate) {
            let line = feedback_delay_line(signal, delay_samples, self.damping);
            for (out, tap) in output.iter_mut().zip(line.iter()) {
                *out += tap * tap_gain;
            }
        }
        output
    }
}
