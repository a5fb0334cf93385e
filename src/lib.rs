//! Solidarity - Whole-Buffer Audio DSP Toolkit
//!
//! Solidarity processes mono `f64` signals through three families of tools:
//! 1. Effects - compression, reverb, delay, modulation, pitch and saturation
//! 2. Spatial - positional encoding, stereo panning and transmission effects
//! 3. Transforms - ZIP phrase dispatch, bridging/anchor pipeline and
//!    gradient-domain editing
//!
//! # Architecture
//!
//! Every component is a plain value bound to a sample rate and a logging
//! span. [`system::MasterSystem`] owns one of each and runs JSON-defined
//! [`dsp::ProcessingChain`]s through them.

pub mod bridging;
pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod logging;
pub mod phrase;
pub mod spatial;
pub mod system;

pub use config::AudioParameters;
pub use error::{Result, SolidarityError};
pub use system::MasterSystem;
