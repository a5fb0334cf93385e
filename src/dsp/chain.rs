//! Processing chain
//!
//! An ordered list of typed steps, run front to back by the master system.
//! Chains are plain JSON arrays of internally tagged objects:
//!
//! ```json
//! [
//!   {"type": "compression", "threshold": 0.5, "ratio": 4.0},
//!   {"type": "zip_phrase", "phrase": "reverb", "params": {"room_size": 0.7}},
//!   {"type": "spatial", "position": {"x": 0.5, "y": 0.0, "z": 0.5}},
//!   {"type": "harmonic_analysis"}
//! ]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Compressor, Delay, Reverb};
use crate::error::{Result, SolidarityError};
use crate::phrase::{PhraseParams, ZipPhrase};
use crate::spatial::Position3D;

fn default_transfer_amount() -> f64 {
    0.5
}

/// One step of a processing chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessingStep {
    /// Dispatch a ZIP phrase
    ZipPhrase {
        phrase: ZipPhrase,
        #[serde(default)]
        params: PhraseParams,
    },
    /// Pan to a position and fold back to mono
    Spatial { position: Position3D },
    /// Blend in the gradient of `source`; without a source the step is a no-op
    GradientTransfer {
        #[serde(default)]
        source: Option<Vec<f64>>,
        #[serde(default = "default_transfer_amount")]
        amount: f64,
    },
    Compression(Compressor),
    Reverb(Reverb),
    Delay(Delay),
    /// Log a harmonic analysis; the signal passes through
    HarmonicAnalysis,
}

impl ProcessingStep {
    /// Type name, as written in the `type` tag
    pub fn step_type(&self) -> &'static str {
        match self {
            ProcessingStep::ZipPhrase { .. } => "zip_phrase",
            ProcessingStep::Spatial { .. } => "spatial",
            ProcessingStep::GradientTransfer { .. } => "gradient_transfer",
            ProcessingStep::Compression(_) => "compression",
            ProcessingStep::Reverb(_) => "reverb",
            ProcessingStep::Delay(_) => "delay",
            ProcessingStep::HarmonicAnalysis => "harmonic_analysis",
        }
    }

    /// ZIP phrase step with default parameters
    pub fn phrase(phrase: ZipPhrase) -> Self {
        ProcessingStep::ZipPhrase {
            phrase,
            params: PhraseParams::default(),
        }
    }

    pub fn spatial(x: f64, y: f64, z: f64) -> Self {
        ProcessingStep::Spatial {
            position: Position3D::new(x, y, z),
        }
    }
}

/// Ordered processing steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessingChain {
    steps: Vec<ProcessingStep>,
}

impl ProcessingChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step, builder style
    pub fn with(mut self, step: ProcessingStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Add a step at the end of the chain
    pub fn push(&mut self, step: ProcessingStep) {
        self.steps.push(step);
    }

    /// Add a step at a specific index
    pub fn add_at(&mut self, step: ProcessingStep, index: usize) {
        let index = index.min(self.steps.len());
        self.steps.insert(index, step);
    }

    /// Remove the step at `index`
    pub fn remove(&mut self, index: usize) -> Result<ProcessingStep> {
        if index >= self.steps.len() {
            return Err(SolidarityError::invalid_param(
                "index",
                index,
                format!("less than {}", self.steps.len()),
            ));
        }
        Ok(self.steps.remove(index))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessingStep> {
        self.steps.iter()
    }

    /// Type names of all steps, in order
    pub fn step_types(&self) -> Vec<&'static str> {
        self.steps.iter().map(ProcessingStep::step_type).collect()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a chain from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Serialize chain to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl FromIterator<ProcessingStep> for ProcessingChain {
    fn from_iter<I: IntoIterator<Item = ProcessingStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}
