//! Spatial audio
//!
//! Positional encoding and stereo panning, plus transmission effects that
//! model lossy or filtered propagation.

pub mod encoder;
pub mod transmission;

pub use encoder::{
    cartesian_to_spherical, pan, spherical_to_cartesian, PanGains, Position3D, PositionalEncoder,
    Spherical, StereoPair,
};
pub use transmission::{pearson_correlation, SpatialProcessor};
