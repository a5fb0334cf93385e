//! Parameter controller
//!
//! Named knobs with an append-only value history. New values can be blended
//! exponentially with the previous one to avoid zipper jumps.

use std::collections::HashMap;

use tracing::{debug, Span};

use crate::config::AudioParameters;
use crate::engine::signal::linspace;
use crate::logging;

/// Stores and smooths named parameter values
#[derive(Debug, Clone)]
pub struct ParameterController {
    smoothing_factor: f64,
    history: HashMap<String, Vec<f64>>,
    span: Span,
}

impl ParameterController {
    /// Create a controller using the smoothing implied by `params`
    pub fn new(params: &AudioParameters) -> Self {
        Self::with_smoothing(params.smoothing_factor())
    }

    /// Create a controller with an explicit smoothing factor (clamped to 0-1)
    pub fn with_smoothing(smoothing_factor: f64) -> Self {
        Self {
            smoothing_factor: smoothing_factor.clamp(0.0, 1.0),
            history: HashMap::new(),
            span: logging::component_span("parameters"),
        }
    }

    /// Replace the logging span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn smoothing_factor(&self) -> f64 {
        self.smoothing_factor
    }

    /// Record a new value, returning the value actually stored.
    ///
    /// With `smooth` set and an existing history, the stored value is
    /// `f * last + (1 - f) * value`.
    pub fn set(&mut self, name: &str, value: f64, smooth: bool) -> f64 {
        let factor = self.smoothing_factor;
        let entries = self.history.entry(name.to_string()).or_default();

        let stored = match entries.last() {
            Some(&last) if smooth => factor * last + (1.0 - factor) * value,
            _ => value,
        };
        entries.push(stored);

        let _guard = self.span.enter();
        debug!(parameter = name, requested = value, stored, "parameter set");
        stored
    }

    /// Current value, or `default` when the parameter has no history
    pub fn get(&self, name: &str, default: f64) -> f64 {
        self.history
            .get(name)
            .and_then(|entries| entries.last().copied())
            .unwrap_or(default)
    }

    /// Ramp from the current value (0.0 if unset) to `target` over `steps` points
    pub fn interpolate(&self, name: &str, target: f64, steps: usize) -> Vec<f64> {
        linspace(self.get(name, 0.0), target, steps)
    }

    /// Clear a parameter's history
    pub fn reset(&mut self, name: &str) {
        if let Some(entries) = self.history.get_mut(name) {
            entries.clear();
        }
    }

    /// Full value history of one parameter
    pub fn history(&self, name: &str) -> &[f64] {
        self.history.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of stored values across all parameters
    pub fn history_len(&self) -> usize {
        self.history.values().map(Vec::len).sum()
    }
}

impl Default for ParameterController {
    fn default() -> Self {
        Self::new(&AudioParameters::default())
    }
}
