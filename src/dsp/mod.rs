//! DSP Effects Library
//!
//! Whole-buffer effects over mono `f64` signals. Every effect is a
//! serializable parameter struct implementing [`Effect`].

pub mod analysis;
mod chain;
mod compressor;
mod delay;
mod effect;
pub mod gradient;
mod modulation;
mod pitch;
mod processor;
mod reverb;
mod saturation;
pub mod spectrum;

pub use analysis::{analyze_harmonics, Harmonic, HarmonicAnalysis};
pub use chain::{ProcessingChain, ProcessingStep};
pub use compressor::{envelope, Compressor};
pub use delay::{feedback_delay_line, Delay};
pub use effect::Effect;
pub use gradient::GradientEngine;
pub use modulation::{Chorus, Flanger, Phaser};
pub use pitch::{Harmonizer, PitchShift, TimeStretch};
pub use processor::EffectsProcessor;
pub use reverb::{Reverb, REVERB_DELAYS};
pub use saturation::Distortion;
