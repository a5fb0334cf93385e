//! ZIP phrase dispatcher
//!
//! Thirteen named commands, each mapped to an effect from the library or a
//! small bespoke transform. Every applied phrase is appended to a
//! timestamped history.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Span};

use crate::dsp::{
    Chorus, Compressor, Delay, Distortion, EffectsProcessor, Flanger, Harmonizer, Phaser, Reverb,
    TimeStretch,
};
use crate::error::{Result, SolidarityError};
use crate::logging;
use crate::spatial::{pan, Position3D};

/// Per-sample gain cycle used by `beatbox`
pub const BEAT_PATTERN: [f64; 4] = [1.0, 0.3, 0.7, 0.3];

/// Number of positions visited by the `spatial` rotation sweep
const SWEEP_POSITIONS: usize = 100;

/// ZIP phrase commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZipPhrase {
    Compression,
    Expansion,
    Zoomies,
    Lockstop,
    Beatbox,
    Reverb,
    Delay,
    Chorus,
    Flanger,
    Phaser,
    Distortion,
    Harmonize,
    Spatial,
}

impl ZipPhrase {
    pub const ALL: [ZipPhrase; 13] = [
        ZipPhrase::Compression,
        ZipPhrase::Expansion,
        ZipPhrase::Zoomies,
        ZipPhrase::Lockstop,
        ZipPhrase::Beatbox,
        ZipPhrase::Reverb,
        ZipPhrase::Delay,
        ZipPhrase::Chorus,
        ZipPhrase::Flanger,
        ZipPhrase::Phaser,
        ZipPhrase::Distortion,
        ZipPhrase::Harmonize,
        ZipPhrase::Spatial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZipPhrase::Compression => "compression",
            ZipPhrase::Expansion => "expansion",
            ZipPhrase::Zoomies => "zoomies",
            ZipPhrase::Lockstop => "lockstop",
            ZipPhrase::Beatbox => "beatbox",
            ZipPhrase::Reverb => "reverb",
            ZipPhrase::Delay => "delay",
            ZipPhrase::Chorus => "chorus",
            ZipPhrase::Flanger => "flanger",
            ZipPhrase::Phaser => "phaser",
            ZipPhrase::Distortion => "distortion",
            ZipPhrase::Harmonize => "harmonize",
            ZipPhrase::Spatial => "spatial",
        }
    }
}

impl fmt::Display for ZipPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZipPhrase {
    type Err = SolidarityError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        ZipPhrase::ALL
            .into_iter()
            .find(|p| p.as_str() == name)
            .ok_or_else(|| SolidarityError::UnknownPhrase {
                name: s.to_string(),
            })
    }
}

/// Parameter overrides for phrase processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhraseParams {
    /// `compression` threshold
    pub threshold: f64,
    /// `compression` ratio
    pub ratio: f64,
    /// `expansion` gain
    pub expansion_factor: f64,
    /// `zoomies` time-stretch factor
    pub speed_factor: f64,
    /// `reverb` room size
    pub room_size: f64,
    /// `delay` time in seconds
    pub delay_time: f64,
    /// `distortion` drive
    pub gain: f64,
}

impl Default for PhraseParams {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            ratio: 4.0,
            expansion_factor: 1.5,
            speed_factor: 1.5,
            room_size: 0.7,
            delay_time: 0.5,
            gain: 5.0,
        }
    }
}

/// One applied phrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseRecord {
    pub phrase: ZipPhrase,
    pub applied_at: DateTime<Utc>,
}

/// Multiply each sample by the repeating beat pattern
pub fn rhythmic_gate(signal: &[f64]) -> Vec<f64> {
    signal
        .iter()
        .zip(BEAT_PATTERN.iter().cycle())
        .map(|(s, g)| s * g)
        .collect()
}

/// Sweep the signal around a circle in the xz-plane.
///
/// The buffer is cut into chunks of `len/100` samples; each chunk is panned
/// to the point on the circle matching its start and folded back to mono.
pub fn rotation_sweep(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    let chunk_len = (n / SWEEP_POSITIONS).max(1);
    let mut output = Vec::with_capacity(n);

    for (k, chunk) in signal.chunks(chunk_len).enumerate() {
        let index = (k * n / SWEEP_POSITIONS).min(n - 1);
        let theta = 2.0 * PI * index as f64 / n as f64;
        let position = Position3D::new(theta.cos(), 0.0, theta.sin());
        output.extend(pan(chunk, &position).mono_mix());
    }
    output
}

/// Dispatches ZIP phrases and records their history
#[derive(Debug, Clone)]
pub struct PhraseProcessor {
    effects: EffectsProcessor,
    history: Vec<PhraseRecord>,
    span: Span,
}

impl PhraseProcessor {
    pub fn new(sample_rate: u32) -> Self {
        Self::with_span(sample_rate, logging::component_span("zip_phrase"))
    }

    /// Create a processor logging into `span`
    pub fn with_span(sample_rate: u32, span: Span) -> Self {
        let effects = EffectsProcessor::new(sample_rate).with_span(logging::child_span(&span, "effects"));
        Self {
            effects,
            history: Vec::new(),
            span,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.effects.sample_rate()
    }

    /// Apply `phrase` to `signal` and record it
    pub fn process(&mut self, signal: &[f64], phrase: ZipPhrase, params: &PhraseParams) -> Result<Vec<f64>> {
        self.history.push(PhraseRecord {
            phrase,
            applied_at: Utc::now(),
        });

        let fx = &self.effects;
        let result = match phrase {
            ZipPhrase::Compression => fx.apply(&Compressor::new(params.threshold, params.ratio), signal)?,
            ZipPhrase::Expansion => signal.iter().map(|s| s * params.expansion_factor).collect(),
            ZipPhrase::Zoomies => fx.apply(&TimeStretch::new(params.speed_factor), signal)?,
            ZipPhrase::Lockstop => vec![0.0; signal.len()],
            ZipPhrase::Beatbox => rhythmic_gate(signal),
            ZipPhrase::Reverb => fx.apply(&Reverb::new(params.room_size), signal)?,
            ZipPhrase::Delay => fx.apply(&Delay::new(params.delay_time), signal)?,
            ZipPhrase::Chorus => fx.apply(&Chorus::default(), signal)?,
            ZipPhrase::Flanger => fx.apply(&Flanger::default(), signal)?,
            ZipPhrase::Phaser => fx.apply(&Phaser::default(), signal)?,
            ZipPhrase::Distortion => fx.apply(&Distortion::new(params.gain), signal)?,
            ZipPhrase::Harmonize => fx.apply(&Harmonizer::default(), signal)?,
            ZipPhrase::Spatial => rotation_sweep(signal),
        };

        let _guard = self.span.enter();
        info!(phrase = %phrase, "applied ZIP phrase");
        Ok(result)
    }

    /// Apply a phrase given by name. Unknown names are logged and the
    /// signal passes through unchanged without being recorded.
    pub fn process_named(&mut self, signal: &[f64], name: &str, params: &PhraseParams) -> Result<Vec<f64>> {
        match name.parse::<ZipPhrase>() {
            Ok(phrase) => self.process(signal, phrase, params),
            Err(_) => {
                let _guard = self.span.enter();
                warn!(phrase = name, "unknown ZIP phrase, passing signal through");
                Ok(signal.to_vec())
            }
        }
    }

    pub fn history(&self) -> &[PhraseRecord] {
        &self.history
    }

    /// Phrase names in the order they were applied
    pub fn phrase_names(&self) -> Vec<String> {
        self.history.iter().map(|r| r.phrase.to_string()).collect()
    }
}

impl Default for PhraseProcessor {
    fn default() -> Self {
        Self::new(44100)
    }
}
