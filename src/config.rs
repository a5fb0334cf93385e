//! Audio settings snapshot
//!
//! A flat JSON object; every recognized key is listed here with its
//! default. Missing keys default, unknown keys are rejected.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SolidarityError};

/// Coarse quality setting used for spatial resolution and temporal accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Low,
    Medium,
    #[default]
    High,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resolution::Low => "low",
            Resolution::Medium => "medium",
            Resolution::High => "high",
        };
        f.write_str(name)
    }
}

/// System-wide audio parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioParameters {
    /// Sample rate in Hz (8000 to 192000)
    pub sample_rate: u32,
    /// Processing buffer size in samples (16 to 65536)
    pub buffer_size: usize,
    /// Bit depth (8, 16, 24 or 32)
    pub bit_depth: u16,
    /// Channel count (1 or 2)
    pub channels: u16,
    /// Harmonic precision in bits (1 to 64)
    pub harmonic_precision: u32,
    pub spatial_resolution: Resolution,
    /// Enables exponential smoothing in the parameter controller
    pub gradient_smoothing: bool,
    pub temporal_accuracy: Resolution,
    /// Seed for the transmission mask RNG; entropy-seeded when absent
    pub transmission_seed: Option<u64>,
}

impl Default for AudioParameters {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 1024,
            bit_depth: 16,
            channels: 2,
            harmonic_precision: 16,
            spatial_resolution: Resolution::High,
            gradient_smoothing: true,
            temporal_accuracy: Resolution::High,
            transmission_seed: None,
        }
    }
}

impl AudioParameters {
    /// Validate parameters against their supported ranges
    pub fn validate(&self) -> Result<()> {
        if !(8000..=192_000).contains(&self.sample_rate) {
            return Err(SolidarityError::invalid_param(
                "sample_rate",
                self.sample_rate,
                "8000 to 192000 Hz",
            ));
        }
        if !(16..=65536).contains(&self.buffer_size) {
            return Err(SolidarityError::invalid_param(
                "buffer_size",
                self.buffer_size,
                "16 to 65536 samples",
            ));
        }
        if ![8, 16, 24, 32].contains(&self.bit_depth) {
            return Err(SolidarityError::invalid_param(
                "bit_depth",
                self.bit_depth,
                "8, 16, 24 or 32",
            ));
        }
        if !(1..=2).contains(&self.channels) {
            return Err(SolidarityError::invalid_param(
                "channels",
                self.channels,
                "1 or 2",
            ));
        }
        if !(1..=64).contains(&self.harmonic_precision) {
            return Err(SolidarityError::invalid_param(
                "harmonic_precision",
                self.harmonic_precision,
                "1 to 64 bits",
            ));
        }
        Ok(())
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let params: AudioParameters = serde_json::from_str(&contents)?;
        params.validate()?;
        info!(path = %path.display(), "configuration loaded");
        Ok(params)
    }

    /// Load settings, falling back to defaults if anything goes wrong
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(params) => params,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "could not load configuration, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Write settings as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Smoothing factor the parameter controller should use
    pub fn smoothing_factor(&self) -> f64 {
        if self.gradient_smoothing {
            0.95
        } else {
            1.0
        }
    }
}
