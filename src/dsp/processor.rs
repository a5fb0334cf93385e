//! Effects processor
//!
//! Binds the effect library to a sample rate and a logging span, with
//! shorthand methods for the common parameterizations.

use tracing::{debug, Span};

use super::analysis::{analyze_harmonics, HarmonicAnalysis};
use super::{Chorus, Compressor, Delay, Effect, PitchShift, Reverb, TimeStretch};
use crate::error::Result;
use crate::logging;

/// Applies effects at a fixed sample rate
#[derive(Debug, Clone)]
pub struct EffectsProcessor {
    sample_rate: u32,
    span: Span,
}

impl EffectsProcessor {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            span: logging::component_span("effects"),
        }
    }

    /// Replace the logging span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Validate and render any effect
    pub fn apply<E: Effect + ?Sized>(&self, effect: &E, signal: &[f64]) -> Result<Vec<f64>> {
        let _guard = self.span.enter();
        debug!(effect = effect.effect_type(), len = signal.len(), "applying effect");
        effect.process(signal, self.sample_rate)
    }

    pub fn apply_compression(&self, signal: &[f64], threshold: f64, ratio: f64) -> Result<Vec<f64>> {
        self.apply(&Compressor::new(threshold, ratio), signal)
    }

    pub fn apply_reverb(&self, signal: &[f64], room_size: f64) -> Result<Vec<f64>> {
        self.apply(&Reverb::new(room_size), signal)
    }

    pub fn apply_delay(&self, signal: &[f64], delay_time: f64) -> Result<Vec<f64>> {
        self.apply(&Delay::new(delay_time), signal)
    }

    pub fn apply_chorus(&self, signal: &[f64]) -> Result<Vec<f64>> {
        self.apply(&Chorus::default(), signal)
    }

    pub fn apply_pitch_shift(&self, signal: &[f64], semitones: f64) -> Result<Vec<f64>> {
        self.apply(&PitchShift::new(semitones), signal)
    }

    pub fn apply_time_stretch(&self, signal: &[f64], factor: f64) -> Result<Vec<f64>> {
        self.apply(&TimeStretch::new(factor), signal)
    }

    pub fn apply_harmonic_analysis(&self, signal: &[f64]) -> Result<HarmonicAnalysis> {
        analyze_harmonics(signal, self.sample_rate)
    }
}

impl Default for EffectsProcessor {
    fn default() -> Self {
        Self::new(44100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::signal::peak;

    fn tone() -> Vec<f64> {
        (0..44100)
            .map(|i| (2.0 * std::f64::consts::PI * 440.0 * i as f64 / 44100.0).sin())
            .collect()
    }

    #[test]
    fn test_shorthands_preserve_length() {
        let processor = EffectsProcessor::default();
        let signal = tone();

        let compressed = processor.apply_compression(&signal, 0.5, 4.0).unwrap();
        assert_eq!(compressed.len(), signal.len());
        assert!(peak(&compressed) <= peak(&signal));

        assert_eq!(processor.apply_reverb(&signal, 0.7).unwrap().len(), signal.len());
        assert_eq!(processor.apply_delay(&signal, 0.5).unwrap().len(), signal.len());
        assert_eq!(processor.apply_chorus(&signal).unwrap().len(), signal.len());
        assert_eq!(processor.apply_pitch_shift(&signal, 7.0).unwrap().len(), signal.len());
    }

    #[test]
    fn test_time_stretch_resizes() {
        let processor = EffectsProcessor::default();
        let out = processor.apply_time_stretch(&tone(), 1.5).unwrap();
        assert_eq!(out.len(), 66150);
    }

    #[test]
    fn test_harmonic_analysis_keys() {
        let processor = EffectsProcessor::default();
        let analysis = processor.apply_harmonic_analysis(&tone()).unwrap();
        assert!((analysis.fundamental_frequency - 440.0).abs() < 1.0);
        assert!(!analysis.harmonics.is_empty());
        assert!(analysis.rms > 0.0);
    }

    #[test]
    fn test_apply_trait_object() {
        let processor = EffectsProcessor::default();
        let effect: Box<dyn Effect> = Box::new(Reverb::default());
        assert_eq!(processor.apply(effect.as_ref(), &[0.0; 32]).unwrap(), vec![0.0; 32]);
    }
}
