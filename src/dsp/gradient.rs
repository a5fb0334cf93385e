//! Gradient transference
//!
//! Works on the central-difference gradient of a signal rather than its
//! samples: blend or reshape the gradient, then integrate back from the
//! original starting sample.

use tracing::{debug, Span};

use crate::engine::signal::{cumsum, moving_average};
use crate::error::{Result, SolidarityError};
use crate::logging;

/// Central-difference gradient with one-sided differences at the edges
pub fn gradient(signal: &[f64]) -> Result<Vec<f64>> {
    let n = signal.len();
    if n < 2 {
        return Err(SolidarityError::SignalTooShort {
            operation: "gradient",
            len: n,
            min: 2,
        });
    }

    let mut grad = Vec::with_capacity(n);
    grad.push(signal[1] - signal[0]);
    for i in 1..n - 1 {
        grad.push((signal[i + 1] - signal[i - 1]) / 2.0);
    }
    grad.push(signal[n - 1] - signal[n - 2]);
    Ok(grad)
}

/// Integrate a gradient back into a signal starting from `start`
fn integrate(gradient: &[f64], start: f64) -> Vec<f64> {
    cumsum(gradient).into_iter().map(|s| s + start).collect()
}

/// Gradient-domain processing engine
#[derive(Debug, Clone)]
pub struct GradientEngine {
    sample_rate: u32,
    span: Span,
}

impl GradientEngine {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            span: logging::component_span("gradient"),
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

    /// Gradient of `signal`
    pub fn calculate_gradient(&self, signal: &[f64]) -> Result<Vec<f64>> {
        gradient(signal)
    }

    /// Blend `amount` of the source's gradient into the target's and
    /// rebuild from the target's first sample.
    pub fn transfer_gradient(&self, source: &[f64], target: &[f64], amount: f64) -> Result<Vec<f64>> {
        if source.len() != target.len() {
            return Err(SolidarityError::LengthMismatch {
                expected: target.len(),
                actual: source.len(),
            });
        }
        let source_grad = gradient(source)?;
        let target_grad = gradient(target)?;

        let blended: Vec<f64> = target_grad
            .iter()
            .zip(source_grad.iter())
            .map(|(t, s)| (1.0 - amount) * t + amount * s)
            .collect();

        let _guard = self.span.enter();
        debug!(amount, len = target.len(), "gradient transferred");
        Ok(integrate(&blended, target[0]))
    }

    /// Smooth the gradient with a centred box filter of `window` samples
    pub fn smooth_gradient(&self, signal: &[f64], window: usize) -> Result<Vec<f64>> {
        let grad = gradient(signal)?;
        let smoothed = moving_average(&grad, window);
        Ok(integrate(&smoothed, signal[0]))
    }

    /// Apply an arbitrary transform to the gradient and rebuild.
    ///
    /// The transform must return a gradient of the same length.
    pub fn apply_gradient_transform<F>(&self, signal: &[f64], transform: F) -> Result<Vec<f64>>
    where
        F: FnOnce(Vec<f64>) -> Vec<f64>,
    {
        let grad = gradient(signal)?;
        let transformed = transform(grad);
        if transformed.len() != signal.len() {
            return Err(SolidarityError::LengthMismatch {
                expected: signal.len(),
                actual: transformed.len(),
            });
        }
        Ok(integrate(&transformed, signal[0]))
    }
}

impl Default for GradientEngine {
    fn default() -> Self {
        Self::new(44100)
    }
}
