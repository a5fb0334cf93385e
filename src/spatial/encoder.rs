//! 3D positional encoder
//!
//! Derives a position from a signal's spectrum, keeps a position per named
//! channel, and renders mono signals to stereo with a simple
//! balance/distance/elevation panner.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, Span};

use crate::dsp::spectrum::{fft, magnitudes};
use crate::engine::signal::EPSILON;
use crate::error::{Result, SolidarityError};
use crate::logging;

/// Point in the unit listening cube
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3D {
    /// Left (-1) to right (+1)
    pub x: f64,
    /// Elevation
    pub y: f64,
    /// Depth; distance attenuation grows with |z|
    pub z: f64,
}

impl Position3D {
    pub const ORIGIN: Position3D = Position3D {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`
    pub fn distance_to(&self, other: &Position3D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl From<(f64, f64, f64)> for Position3D {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self { x, y, z }
    }
}

/// Spherical coordinates: azimuth `theta` in the xy-plane, polar angle
/// `phi` measured from the z-axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub radius: f64,
    pub theta: f64,
    pub phi: f64,
}

/// Left/right output of the panner
#[derive(Debug, Clone, PartialEq)]
pub struct StereoPair {
    pub left: Vec<f64>,
    pub right: Vec<f64>,
}

impl StereoPair {
    /// Average of both channels
    pub fn mono_mix(&self) -> Vec<f64> {
        self.left
            .iter()
            .zip(self.right.iter())
            .map(|(l, r)| (l + r) / 2.0)
            .collect()
    }
}

/// Per-sample gains the panner applies for `position`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGains {
    pub left: f64,
    pub right: f64,
}

impl PanGains {
    pub fn for_position(position: &Position3D) -> Self {
        let distance_factor = 1.0 / (1.0 + position.z.abs());
        let elevation_factor = 1.0 - position.y.abs() * 0.3;
        let common = distance_factor * elevation_factor;
        Self {
            left: (1.0 - position.x) / 2.0 * common,
            right: (1.0 + position.x) / 2.0 * common,
        }
    }
}

/// Render `signal` to stereo at `position`
pub fn pan(signal: &[f64], position: &Position3D) -> StereoPair {
    let gains = PanGains::for_position(position);
    StereoPair {
        left: signal.iter().map(|s| s * gains.left).collect(),
        right: signal.iter().map(|s| s * gains.right).collect(),
    }
}

pub fn spherical_to_cartesian(radius: f64, theta: f64, phi: f64) -> Position3D {
    Position3D {
        x: radius * phi.sin() * theta.cos(),
        y: radius * phi.sin() * theta.sin(),
        z: radius * phi.cos(),
    }
}

pub fn cartesian_to_spherical(x: f64, y: f64, z: f64) -> Spherical {
    let radius = (x * x + y * y + z * z).sqrt();
    Spherical {
        radius,
        theta: y.atan2(x),
        phi: (z / (radius + EPSILON)).clamp(-1.0, 1.0).acos(),
    }
}

/// Index centroid of a magnitude band
fn band_centroid(band: &[f64]) -> f64 {
    let weighted: f64 = band.iter().enumerate().map(|(k, m)| k as f64 * m).sum();
    let total: f64 = band.iter().sum();
    weighted / (total + EPSILON)
}

/// Named-channel position store with spectral encoding
#[derive(Debug, Clone)]
pub struct PositionalEncoder {
    positions: HashMap<String, Position3D>,
    span: Span,
}

impl PositionalEncoder {
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
            span: logging::component_span("positional_encoder"),
        }
    }

    /// Replace the logging span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Derive a position from the spectrum of `signal` and store it under `channel`.
    ///
    /// The magnitude spectrum is cut into three equal bands (the last band
    /// takes any remainder); each band's centroid, rescaled from
    /// `[0, band_len]` to `[-1, 1]`, becomes one coordinate.
    pub fn encode_position(&mut self, signal: &[f64], channel: &str) -> Result<Position3D> {
        let n = signal.len();
        if n < 3 {
            return Err(SolidarityError::SignalTooShort {
                operation: "position encoding",
                len: n,
                min: 3,
            });
        }

        let mags = magnitudes(&fft(signal));
        let third = n / 3;
        let scale = |c: f64| (c / third as f64) * 2.0 - 1.0;

        let position = Position3D {
            x: scale(band_centroid(&mags[..third])),
            y: scale(band_centroid(&mags[third..2 * third])),
            z: scale(band_centroid(&mags[2 * third..])),
        };

        let _guard = self.span.enter();
        debug!(channel, x = position.x, y = position.y, z = position.z, "position encoded");
        self.positions.insert(channel.to_string(), position);
        Ok(position)
    }

    pub fn set_position(&mut self, channel: &str, position: Position3D) {
        self.positions.insert(channel.to_string(), position);
    }

    /// Stored position, or the origin for unknown channels
    pub fn get_position(&self, channel: &str) -> Position3D {
        self.positions
            .get(channel)
            .copied()
            .unwrap_or(Position3D::ORIGIN)
    }

    /// Distance between two channels' positions
    pub fn calculate_distance(&self, a: &str, b: &str) -> f64 {
        self.get_position(a).distance_to(&self.get_position(b))
    }

    /// Names of all channels with a stored position, sorted
    pub fn channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self.positions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn apply_spatial_panning(&self, signal: &[f64], position: &Position3D) -> StereoPair {
        pan(signal, position)
    }
}

impl Default for PositionalEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn tone(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * 440.0 * i as f64 / 44100.0).sin())
            .collect()
    }

    #[test]
    fn test_new_encoder_is_empty() {
        assert!(PositionalEncoder::new().is_empty());
    }

    #[test]
    fn test_encode_position_in_range() {
        let mut encoder = PositionalEncoder::new();
        let position = encoder.encode_position(&tone(44100), "main").unwrap();
        for c in [position.x, position.y, position.z] {
            assert!((-1.5..=1.5).contains(&c));
        }
        assert_eq!(encoder.get_position("main"), position);
    }

    #[test]
    fn test_encode_low_tone_sits_left() {
        // energy at bin 440 of 44100 lands near the start of the first band
        let mut encoder = PositionalEncoder::new();
        let position = encoder.encode_position(&tone(44100), "main").unwrap();
        assert!(position.x < -0.9);
    }

    #[test]
    fn test_encode_too_short() {
        let mut encoder = PositionalEncoder::new();
        assert!(encoder.encode_position(&[1.0, 2.0], "main").is_err());
    }

    #[test]
    fn test_set_get_position() {
        let mut encoder = PositionalEncoder::new();
        encoder.set_position("test", Position3D::new(0.5, 0.3, -0.2));
        assert_eq!(encoder.get_position("test"), Position3D::new(0.5, 0.3, -0.2));
        assert_eq!(encoder.get_position("unknown"), Position3D::ORIGIN);
    }

    #[test]
    fn test_calculate_distance() {
        let mut encoder = PositionalEncoder::new();
        encoder.set_position("a", Position3D::new(0.0, 0.0, 0.0));
        encoder.set_position("b", Position3D::new(1.0, 0.0, 0.0));
        assert_relative_eq!(encoder.calculate_distance("a", "b"), 1.0);
        // undefined channels sit at the origin
        assert_relative_eq!(encoder.calculate_distance("b", "nowhere"), 1.0);
    }

    #[test]
    fn test_panning_right_is_louder_on_right() {
        let signal = tone(4410);
        let stereo = pan(&signal, &Position3D::new(0.5, 0.0, 0.0));
        assert_eq!(stereo.left.len(), signal.len());
        assert_eq!(stereo.right.len(), signal.len());
        let left: f64 = stereo.left.iter().map(|s| s.abs()).sum();
        let right: f64 = stereo.right.iter().map(|s| s.abs()).sum();
        assert!(right > left);
    }

    #[test]
    fn test_pan_gains() {
        let gains = PanGains::for_position(&Position3D::new(0.5, 1.0, 0.5));
        let common = (1.0 / 1.5) * 0.7;
        assert_relative_eq!(gains.left, 0.25 * common);
        assert_relative_eq!(gains.right, 0.75 * common);
    }

    #[test]
    fn test_spherical_to_cartesian() {
        let p = spherical_to_cartesian(1.0, 0.0, PI / 2.0);
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_cartesian_to_spherical() {
        let s = cartesian_to_spherical(1.0, 0.0, 0.0);
        assert_relative_eq!(s.radius, 1.0, epsilon = 1e-5);
        assert_relative_eq!(s.theta, 0.0);
        assert_relative_eq!(s.phi, PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_spherical_round_trip() {
        for (x, y, z) in [(0.3, -0.4, 0.5), (-0.7, 0.2, -0.1), (0.1, 0.9, 0.25)] {
            let s = cartesian_to_spherical(x, y, z);
            let p = spherical_to_cartesian(s.radius, s.theta, s.phi);
            assert_relative_eq!(p.x, x, epsilon = 1e-8);
            assert_relative_eq!(p.y, y, epsilon = 1e-8);
            assert_relative_eq!(p.z, z, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_mono_mix() {
        let stereo = StereoPair {
            left: vec![1.0, 0.0],
            right: vec![0.0, 1.0],
        };
        assert_eq!(stereo.mono_mix(), vec![0.5, 0.5]);
    }
}
