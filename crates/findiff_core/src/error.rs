use thiserror::Error;

/// Errors raised by the differentiation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiffError {
    /// The step size was zero or negative; the stencils would divide by zero.
    #[error("step size h must be positive, got {0}")]
    NonPositiveStep(f64),
    #[error("{name} must be finite, got {value}")]
    NonFiniteInput { name: &'static str, value: f64 },
    #[error("method index {0} is out of range (expected 0, 1 or 2)")]
    InvalidMethodIndex(usize),
    #[error("unknown differentiation method: {0}")]
    UnknownMethod(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    /// A fit needs at least two samples with a finite, non-zero error.
    #[error("need at least two usable samples, got {0}")]
    InsufficientSamples(usize),
    #[error("least-squares fit failed: {0}")]
    Fit(String),
    /// Every step candidate pushed the stencil outside the range of f64.
    #[error("no step candidate gives a finite error at x = {0}")]
    NoFiniteStep(f64),
}

pub type Result<T, E = DiffError> = std::result::Result<T, E>;

/// Rejects NaN and infinite inputs.
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DiffError::NonFiniteInput { name, value })
    }
}

/// Rejects steps that are non-finite, zero or negative.
pub(crate) fn ensure_step(h: f64) -> Result<()> {
    ensure_finite("h", h)?;
    if h <= 0.0 {
        return Err(DiffError::NonPositiveStep(h));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_step_rejects_zero_negative_and_nan() {
        assert_eq!(ensure_step(0.0), Err(DiffError::NonPositiveStep(0.0)));
        assert_eq!(ensure_step(-1e-3), Err(DiffError::NonPositiveStep(-1e-3)));
        assert!(matches!(
            ensure_step(f64::NAN),
            Err(DiffError::NonFiniteInput { name: "h", .. })
        ));
        assert!(ensure_step(1e-12).is_ok());
    }

    #[test]
    fn error_messages_name_the_offending_value() {
        let err = DiffError::NonFiniteInput {
            name: "x",
            value: f64::INFINITY,
        };
        assert_eq!(err.to_string(), "x must be finite, got inf");
        assert!(DiffError::NonPositiveStep(0.0)
            .to_string()
            .contains("must be positive"));
    }
}
