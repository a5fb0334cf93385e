//! Audio Engine Module
//!
//! Core bookkeeping shared by every component:
//! - Signal primitives (levels, interpolation, smoothing)
//! - Time allocation at a fixed sample rate
//! - Named parameter history with smoothing

pub mod params;
pub mod signal;
pub mod timing;

pub use params::ParameterController;
pub use timing::AudioTimeBuyer;
