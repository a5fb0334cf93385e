//! Effect trait definition
//!
//! Every effect is a small serializable parameter struct that knows how to
//! render a whole buffer. Rendering never mutates the input.

use crate::error::Result;

/// Base trait for all whole-buffer DSP effects
pub trait Effect {
    /// Get the effect type identifier
    fn effect_type(&self) -> &'static str;

    /// Check parameters against their valid ranges
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Render the effect over `signal` without validating parameters
    fn render(&self, signal: &[f64], sample_rate: u32) -> Vec<f64>;

    /// Validate, then render
    fn process(&self, signal: &[f64], sample_rate: u32) -> Result<Vec<f64>> {
        self.validate()?;
        Ok(self.render(signal, sample_rate))
    }
}

/// Reject non-finite values and values outside `min..=max`
pub(crate) fn check_range(param: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(crate::error::SolidarityError::invalid_param(
            param,
            value,
            format!("{} to {}", min, max),
        ));
    }
    Ok(())
}

/// Reject non-finite and non-positive values
pub(crate) fn check_positive(param: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(crate::error::SolidarityError::invalid_param(
            param,
            value,
            "a positive value",
        ));
    }
    Ok(())
}
