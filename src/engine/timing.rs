//! Time allocation
//!
//! Converts between durations, sample counts and phase-aligned times at a
//! fixed sample rate, and builds the time grids test signals are sampled on.

use std::f64::consts::PI;

use crate::engine::signal::linspace;
use crate::error::{Result, SolidarityError};

/// Time bookkeeping for a fixed sample rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioTimeBuyer {
    sample_rate: u32,
}

impl AudioTimeBuyer {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Time grid covering `duration_secs`, both ends included.
    ///
    /// Holds `floor(duration * sample_rate)` points.
    pub fn allocate_time_slice(&self, duration_secs: f64) -> Vec<f64> {
        let num_samples = (duration_secs * self.sample_rate as f64).max(0.0) as usize;
        linspace(0.0, duration_secs, num_samples)
    }

    /// Time offset within one period of `frequency` matching `phase_offset` radians
    pub fn calculate_phase_time(&self, frequency: f64, phase_offset: f64) -> Result<f64> {
        if frequency <= 0.0 || !frequency.is_finite() {
            return Err(SolidarityError::invalid_param(
                "frequency",
                frequency,
                "a positive frequency in Hz",
            ));
        }
        let period = 1.0 / frequency;
        Ok((phase_offset / (2.0 * PI)) * period)
    }

    /// Duration of one buffer in seconds
    pub fn buffer_time(&self, buffer_size: usize) -> f64 {
        buffer_size as f64 / self.sample_rate as f64
    }

    /// Snap a time value to the nearest multiple of π
    pub fn synchronize_to_pi_boundary(&self, time_value: f64) -> f64 {
        (time_value / PI).round() * PI
    }
}

impl Default for AudioTimeBuyer {
    fn default() -> Self {
        Self::new(44100)
    }
}
