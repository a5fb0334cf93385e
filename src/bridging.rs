//! Bridging / anchor transform
//!
//! A fixed pipeline of golden-ratio scaling, peak anchoring, a recursive
//! "quantum tunneling" sine overlay and a Henry 7/14/49 chunk sequence.
//! All formulas operate on whole buffers and preserve length.

use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Span};

use crate::config::Resolution;
use crate::engine::signal::{peak, rms, EPSILON};
use crate::error::{Result, SolidarityError};
use crate::logging;

pub const BASE_RATIO: f64 = 1.618033988749;
pub const BRIDGING_BASELINE: f64 = 0.618;
pub const HENRY_BASE: u32 = 7;
pub const HENRY_DOUBLE: usize = 14;
pub const HENRY_SQUARE: u32 = 49;
pub const CONTROL_RATIO: f64 = 3.5;
pub const QUANTUM_DEPTH: u32 = 14;
pub const QUANTUM_RECURSION_LEVELS: u32 = 49;

/// Default anchor detection threshold used by [`BridgingAnchorProcessor::full_process`]
pub const ANCHOR_THRESHOLD: f64 = 0.7;

/// Processor settings, readable from JSON. Missing keys keep their
/// defaults; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgingConfig {
    pub sample_rate: u32,
    /// Precision in bits
    pub precision: u16,
    pub spatial_resolution: Resolution,
}

impl Default for BridgingConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            precision: 16,
            spatial_resolution: Resolution::High,
        }
    }
}

impl BridgingConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&contents)?;
        if config.sample_rate == 0 {
            return Err(SolidarityError::invalid_param(
                "sample_rate",
                config.sample_rate,
                "> 0",
            ));
        }
        Ok(config)
    }

    /// Load `path`, falling back to defaults with a warning
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "could not load bridging config, using defaults");
            Self::default()
        })
    }
}

/// RMS and peak of one pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageStats {
    pub stage: &'static str,
    pub rms: f64,
    pub peak: f64,
}

/// Every intermediate signal of [`BridgingAnchorProcessor::full_process`]
#[derive(Debug, Clone, PartialEq)]
pub struct BridgingResults {
    pub original: Vec<f64>,
    pub bridged: Vec<f64>,
    pub anchor_points: Vec<usize>,
    pub stabilized: Vec<f64>,
    /// Present only when quantum tunneling was requested
    pub quantum: Option<Vec<f64>>,
    pub final_signal: Vec<f64>,
}

impl BridgingResults {
    /// Signal stages in pipeline order
    pub fn stages(&self) -> Vec<(&'static str, &[f64])> {
        let mut stages = vec![
            ("original", self.original.as_slice()),
            ("bridged", self.bridged.as_slice()),
            ("stabilized", self.stabilized.as_slice()),
        ];
        if let Some(quantum) = &self.quantum {
            stages.push(("quantum", quantum.as_slice()));
        }
        stages.push(("final", self.final_signal.as_slice()));
        stages
    }

    pub fn statistics(&self) -> Vec<StageStats> {
        self.stages()
            .into_iter()
            .map(|(stage, signal)| StageStats {
                stage,
                rms: rms(signal),
                peak: peak(signal),
            })
            .collect()
    }
}

/// The 14-step Henry sequence starting at `node_id`: `next = cur * 7 mod 49`
pub fn henry_sequence(node_id: u32) -> [u32; HENRY_DOUBLE] {
    let mut sequence = [0; HENRY_DOUBLE];
    let mut current = node_id;
    for value in sequence.iter_mut() {
        *value = current;
        current = ((current as u64 * HENRY_BASE as u64) % HENRY_SQUARE as u64) as u32;
    }
    sequence
}

#[derive(Debug, Clone)]
pub struct BridgingAnchorProcessor {
    config: BridgingConfig,
    span: Span,
}

impl BridgingAnchorProcessor {
    pub fn new() -> Self {
        Self::with_config(BridgingConfig::default())
    }

    pub fn with_config(config: BridgingConfig) -> Self {
        Self::with_span(config, logging::component_span("bridging_anchor"))
    }

    /// Create a processor logging into `span`
    pub fn with_span(config: BridgingConfig, span: Span) -> Self {
        {
            let _guard = span.enter();
            info!(
                base_ratio = BASE_RATIO,
                baseline = BRIDGING_BASELINE,
                sample_rate = config.sample_rate,
                "bridging anchor processor initialized"
            );
        }
        Self { config, span }
    }

    /// Build from an optional JSON file; unreadable files keep the defaults
    pub fn from_config_path(path: impl AsRef<Path>) -> Self {
        Self::with_config(BridgingConfig::load_or_default(path))
    }

    pub fn config(&self) -> &BridgingConfig {
        &self.config
    }

    /// `s * (1 + 0.618 I) + sin(2 pi 7 i / n) * 0.1 I`
    pub fn apply_bridging_transform(&self, signal: &[f64], intensity: f64) -> Vec<f64> {
        let n = signal.len() as f64;
        let gain = 1.0 + BRIDGING_BASELINE * intensity;
        signal
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let modulation = (i as f64 * 2.0 * PI * HENRY_BASE as f64 / n).sin();
                s * gain + modulation * 0.1 * intensity
            })
            .collect()
    }

    /// Indices whose normalized magnitude exceeds `threshold`
    pub fn detect_anchor_points(&self, signal: &[f64], threshold: f64) -> Vec<usize> {
        let max = peak(signal) + EPSILON;
        signal
            .iter()
            .enumerate()
            .filter(|(_, s)| s.abs() / max > threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// Scale a +/-14 sample window around each anchor by the bridging
    /// baseline. Overlapping windows are scaled once per anchor.
    pub fn stabilize_at_anchors(&self, signal: &[f64], anchors: &[usize]) -> Vec<f64> {
        let n = signal.len();
        let mut stabilized = signal.to_vec();
        for &anchor in anchors {
            let start = anchor.saturating_sub(HENRY_DOUBLE);
            let end = (anchor + HENRY_DOUBLE).min(n);
            if start >= end {
                continue;
            }
            for s in &mut stabilized[start..end] {
                *s *= BRIDGING_BASELINE;
            }
        }
        stabilized
    }

    /// Overlay `min(depth, 49)` slow sine layers, each weighted `0.618/(level+1)`,
    /// then normalize by `1 + depth * 0.618`.
    pub fn apply_quantum_tunneling(&self, signal: &[f64], depth: u32) -> Vec<f64> {
        let n = signal.len() as f64;
        let mut result = signal.to_vec();

        for level in 0..depth.min(QUANTUM_RECURSION_LEVELS) {
            let phase = 2.0 * PI * level as f64 / QUANTUM_RECURSION_LEVELS as f64;
            let weight = BRIDGING_BASELINE / (level as f64 + 1.0);
            for (i, (r, s)) in result.iter_mut().zip(signal.iter()).enumerate() {
                *r += s * (i as f64 * phase / n).sin() * weight;
            }
        }

        let norm = 1.0 + depth as f64 * BRIDGING_BASELINE;
        result.iter_mut().for_each(|r| *r /= norm);
        result
    }

    /// Split the signal into 14 chunks and scale chunk `i` by
    /// `(henry[i] / 49) * BASE_RATIO`. The last chunk absorbs the remainder.
    pub fn process_with_henry_sequence(&self, signal: &[f64], node_id: u32) -> Vec<f64> {
        let n = signal.len();
        let sequence = henry_sequence(node_id);
        let chunk = n / HENRY_DOUBLE;
        let mut result = signal.to_vec();

        for (i, &value) in sequence.iter().enumerate() {
            let start = i * chunk;
            let end = if i < HENRY_DOUBLE - 1 { start + chunk } else { n };
            if start >= n {
                continue;
            }
            let factor = (value as f64 / HENRY_SQUARE as f64) * BASE_RATIO;
            for s in &mut result[start..end] {
                *s *= factor;
            }
        }
        result
    }

    /// bridge(1.0) -> anchors(0.7) -> stabilize -> [quantum(14)] -> henry
    pub fn full_process(&self, signal: &[f64], apply_quantum: bool, node_id: u32) -> Result<BridgingResults> {
        if signal.is_empty() {
            return Err(SolidarityError::EmptySignal);
        }
        let _guard = self.span.enter();

        let bridged = self.apply_bridging_transform(signal, 1.0);
        let anchor_points = self.detect_anchor_points(&bridged, ANCHOR_THRESHOLD);
        let stabilized = self.stabilize_at_anchors(&bridged, &anchor_points);
        debug!(anchors = anchor_points.len(), "anchors stabilized");

        let quantum = apply_quantum.then(|| self.apply_quantum_tunneling(&stabilized, QUANTUM_DEPTH));
        let final_signal =
            self.process_with_henry_sequence(quantum.as_deref().unwrap_or(&stabilized), node_id);

        info!(
            samples = signal.len(),
            anchors = anchor_points.len(),
            quantum = apply_quantum,
            node_id,
            "bridging pipeline complete"
        );

        Ok(BridgingResults {
            original: signal.to_vec(),
            bridged,
            anchor_points,
            stabilized,
            quantum,
            final_signal,
        })
    }
}

impl Default for BridgingAnchorProcessor {
    fn default() -> Self {
        Self::new()
    }
}
