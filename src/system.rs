//! Master system
//!
//! Owns one instance of every component at the configured sample rate and
//! runs processing chains through them.

use std::path::Path;

use serde::Serialize;
use tracing::{info, Span};
use uuid::Uuid;

use crate::config::AudioParameters;
use crate::dsp::{analyze_harmonics, EffectsProcessor, GradientEngine, HarmonicAnalysis, ProcessingChain, ProcessingStep};
use crate::engine::params::ParameterController;
use crate::engine::signal::{dynamic_range_db, peak, rms, sine_at};
use crate::engine::timing::AudioTimeBuyer;
use crate::error::{Result, SolidarityError};
use crate::logging;
use crate::phrase::PhraseProcessor;
use crate::spatial::{Position3D, PositionalEncoder, SpatialProcessor};

/// Channel name `analyze_signal` stores its encoded position under
pub const ANALYSIS_CHANNEL: &str = "main";

/// Level, spectrum and position summary of one signal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalAnalysis {
    pub rms: f64,
    pub peak: f64,
    pub dynamic_range_db: f64,
    pub harmonics: HarmonicAnalysis,
    pub spatial_position: Position3D,
}

/// Snapshot of the system state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStatus {
    pub session_id: Uuid,
    pub initialized: bool,
    pub sample_rate: u32,
    pub engine_status: &'static str,
    /// Step types of the most recent chain
    pub active_processors: Vec<String>,
    pub zip_phrase_history: Vec<String>,
    pub active_positions: Vec<String>,
    pub parameter_count: usize,
}

/// Top-level orchestrator
#[derive(Debug)]
pub struct MasterSystem {
    config: AudioParameters,
    session_id: Uuid,
    time_buyer: AudioTimeBuyer,
    parameters: ParameterController,
    gradient: GradientEngine,
    encoder: PositionalEncoder,
    effects: EffectsProcessor,
    spatial: SpatialProcessor,
    phrases: PhraseProcessor,
    active_processors: Vec<String>,
    span: Span,
}

impl MasterSystem {
    /// Validate `config` and build every component at its sample rate
    pub fn new(config: AudioParameters) -> Result<Self> {
        config.validate()?;
        let sr = config.sample_rate;
        let span = logging::component_span("master_system");

        let spatial = match config.transmission_seed {
            Some(seed) => SpatialProcessor::with_seed(sr, seed),
            None => SpatialProcessor::new(sr),
        };

        let system = Self {
            session_id: Uuid::new_v4(),
            time_buyer: AudioTimeBuyer::new(sr),
            parameters: ParameterController::new(&config)
                .with_span(logging::child_span(&span, "parameters")),
            gradient: GradientEngine::new(sr).with_span(logging::child_span(&span, "gradient")),
            encoder: PositionalEncoder::new()
                .with_span(logging::child_span(&span, "positional_encoder")),
            effects: EffectsProcessor::new(sr).with_span(logging::child_span(&span, "effects")),
            spatial: spatial.with_span(logging::child_span(&span, "spatial_transmission")),
            phrases: PhraseProcessor::with_span(sr, logging::child_span(&span, "zip_phrase")),
            active_processors: Vec::new(),
            config,
            span,
        };

        {
            let _guard = system.span.enter();
            let c = &system.config;
            info!(
                session = %system.session_id,
                sample_rate = c.sample_rate,
                harmonic_precision = c.harmonic_precision,
                spatial_resolution = %c.spatial_resolution,
                gradient_smoothing = c.gradient_smoothing,
                temporal_accuracy = %c.temporal_accuracy,
                "master system initialized"
            );
        }
        Ok(system)
    }

    pub fn config(&self) -> &AudioParameters {
        &self.config
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    pub fn time_buyer(&self) -> &AudioTimeBuyer {
        &self.time_buyer
    }

    pub fn parameters(&self) -> &ParameterController {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterController {
        &mut self.parameters
    }

    pub fn gradient(&self) -> &GradientEngine {
        &self.gradient
    }

    pub fn encoder(&self) -> &PositionalEncoder {
        &self.encoder
    }

    pub fn encoder_mut(&mut self) -> &mut PositionalEncoder {
        &mut self.encoder
    }

    pub fn effects(&self) -> &EffectsProcessor {
        &self.effects
    }

    pub fn spatial_mut(&mut self) -> &mut SpatialProcessor {
        &mut self.spatial
    }

    pub fn phrases(&self) -> &PhraseProcessor {
        &self.phrases
    }

    pub fn phrases_mut(&mut self) -> &mut PhraseProcessor {
        &mut self.phrases
    }

    /// Run `signal` through every step of `chain` in order.
    ///
    /// Typed effect parameters are recorded in the parameter controller
    /// under `<step>.<param>`.
    pub fn process_audio(&mut self, signal: &[f64], chain: &ProcessingChain) -> Result<Vec<f64>> {
        if signal.is_empty() {
            return Err(SolidarityError::EmptySignal);
        }
        self.active_processors.clear();
        let mut output = signal.to_vec();

        for step in chain.iter() {
            self.active_processors.push(step.step_type().to_string());

            output = match step {
                ProcessingStep::ZipPhrase { phrase, params } => {
                    self.phrases.process(&output, *phrase, params)?
                }
                ProcessingStep::Spatial { position } => self
                    .spatial
                    .apply_3d_positioning(&output, position.x, position.y, position.z)
                    .mono_mix(),
                ProcessingStep::GradientTransfer { source, amount } => match source {
                    Some(source) => self.gradient.transfer_gradient(source, &output, *amount)?,
                    None => output,
                },
                ProcessingStep::Compression(compressor) => {
                    self.parameters.set("compression.threshold", compressor.threshold, false);
                    self.parameters.set("compression.ratio", compressor.ratio, false);
                    self.effects.apply(compressor, &output)?
                }
                ProcessingStep::Reverb(reverb) => {
                    self.parameters.set("reverb.room_size", reverb.room_size, false);
                    self.effects.apply(reverb, &output)?
                }
                ProcessingStep::Delay(delay) => {
                    self.parameters.set("delay.delay_time", delay.delay_time, false);
                    self.effects.apply(delay, &output)?
                }
                ProcessingStep::HarmonicAnalysis => {
                    let analysis = self.effects.apply_harmonic_analysis(&output)?;
                    let _guard = self.span.enter();
                    info!(
                        fundamental = analysis.fundamental_frequency,
                        harmonics = analysis.harmonics.len(),
                        rms = analysis.rms,
                        peak = analysis.peak,
                        "harmonic analysis"
                    );
                    output
                }
            };
        }

        let _guard = self.span.enter();
        info!(steps = chain.len(), samples = output.len(), "chain processed");
        Ok(output)
    }

    /// Sine test tone sampled on `allocate_time_slice(duration_secs)`
    pub fn generate_test_signal(&self, frequency: f64, duration_secs: f64) -> Vec<f64> {
        sine_at(frequency, &self.time_buyer.allocate_time_slice(duration_secs))
    }

    /// Measure levels, harmonics and spectral position. The position is
    /// stored under [`ANALYSIS_CHANNEL`].
    pub fn analyze_signal(&mut self, signal: &[f64]) -> Result<SignalAnalysis> {
        let harmonics = analyze_harmonics(signal, self.config.sample_rate)?;
        let spatial_position = self.encoder.encode_position(signal, ANALYSIS_CHANNEL)?;
        Ok(SignalAnalysis {
            rms: rms(signal),
            peak: peak(signal),
            dynamic_range_db: dynamic_range_db(signal),
            harmonics,
            spatial_position,
        })
    }

    pub fn status(&self) -> SystemStatus {
        SystemStatus {
            session_id: self.session_id,
            initialized: true,
            sample_rate: self.config.sample_rate,
            engine_status: "ready",
            active_processors: self.active_processors.clone(),
            zip_phrase_history: self.phrases.phrase_names(),
            active_positions: self.encoder.channels(),
            parameter_count: self.parameters.history_len(),
        }
    }

    pub fn save_config(&self, path: impl AsRef<Path>) -> Result<()> {
        self.config.save(path)
    }

    /// Load and apply a configuration file.
    ///
    /// Components are rebuilt at the new sample rate, so phrase history,
    /// stored positions and parameter history start over. The session id
    /// is kept.
    pub fn load_config(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let config = AudioParameters::load(path)?;
        let session_id = self.session_id;
        *self = Self::new(config)?;
        self.session_id = session_id;
        Ok(())
    }
}
