//! Step-size selection balancing truncation against round-off.
//!
//! The total error of a stencil of order p behaves like `C·h^p + R/h`:
//! - Forward/Backward: `C = |f''(x)|/2`, `R = 2ε·m`, minimised at `h = 2·sqrt(ε·m/|f''|)`.
//! - Central: `C = |f'''(x)|/6`, `R = ε·m`, minimised at `h = cbrt(3ε·m/|f'''|)`.
//!
//! where `ε` is the f64 machine epsilon and `m = max(|f(x)|, 1)` the magnitude the
//! round-off scales with. The model step is then checked against the caller's
//! current step and a geometric grid, and whichever has the smallest observed error
//! wins.

use crate::difference::{difference_quotient, ensure_defined_at};
use crate::error::{ensure_step, DiffError, Result};
use crate::method::Method;
use crate::traits::Differentiable;
use serde::{Deserialize, Serialize};

/// Upper bound on `candidates_per_decade`.
pub const MAX_CANDIDATES_PER_DECADE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepSearchSettings {
    pub min_step: f64,
    pub max_step: f64,
    /// Grid density of the empirical check. Zero disables the grid.
    pub candidates_per_decade: u32,
}

impl Default for StepSearchSettings {
    fn default() -> Self {
        Self {
            min_step: 1e-10,
            max_step: 0.1,
            candidates_per_decade: 4,
        }
    }
}

impl StepSearchSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.min_step.is_finite() || self.min_step <= 0.0 {
            return Err(DiffError::InvalidSettings(format!(
                "min_step must be positive, got {}",
                self.min_step
            )));
        }
        if !self.max_step.is_finite() || self.max_step < self.min_step {
            return Err(DiffError::InvalidSettings(format!(
                "max_step ({}) must be finite and at least min_step ({})",
                self.max_step, self.min_step
            )));
        }
        if self.candidates_per_decade > MAX_CANDIDATES_PER_DECADE {
            return Err(DiffError::InvalidSettings(format!(
                "candidates_per_decade must be at most {}, got {}",
                MAX_CANDIDATES_PER_DECADE, self.candidates_per_decade
            )));
        }
        Ok(())
    }

    fn clamp(&self, h: f64) -> f64 {
        h.clamp(self.min_step, self.max_step)
    }

    fn grid(&self) -> Vec<f64> {
        if self.candidates_per_decade == 0 {
            return Vec::new();
        }
        let lo = self.min_step.log10();
        let decades = self.max_step.log10() - lo;
        let count = (decades * self.candidates_per_decade as f64).round() as usize;
        let mut grid: Vec<f64> = (0..count)
            .map(|k| 10f64.powf(lo + k as f64 / self.candidates_per_decade as f64))
            .collect();
        grid.push(self.max_step);
        grid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepSizeEstimate {
    /// Selected step.
    pub h: f64,
    /// Observed |approx - exact| at `h`.
    pub error: f64,
    /// Minimiser of the error model, clamped to the search bounds.
    pub model_step: f64,
}

/// Minimiser of the truncation + round-off model, clamped to the bounds.
///
/// Zero curvature means the stencil is exact up to round-off, so the largest
/// allowed step wins.
pub fn model_step<F>(f: &F, method: Method, x: f64, settings: &StepSearchSettings) -> f64
where
    F: Differentiable<f64> + ?Sized,
{
    let eps = f64::EPSILON;
    let magnitude = f.value(x).abs().max(1.0);
    let raw = match method {
        Method::Forward | Method::Backward => {
            let curvature = f.derivative(2, x).abs();
            if curvature > 0.0 {
                2.0 * (eps * magnitude / curvature).sqrt()
            } else {
                settings.max_step
            }
        }
        Method::Central => {
            let jerk = f.derivative(3, x).abs();
            if jerk > 0.0 {
                (3.0 * eps * magnitude / jerk).cbrt()
            } else {
                settings.max_step
            }
        }
    };
    if raw.is_finite() {
        settings.clamp(raw)
    } else {
        settings.max_step
    }
}

/// Picks the step with the smallest observed error among the model step, the
/// current step and the search grid. Ties go to the larger step.
///
/// The current step competes unclamped, so the result is never worse than
/// `current_h`. It is the only candidate that may lie outside the bounds.
pub fn find_optimal_step_size<F>(
    f: &F,
    method: Method,
    x: f64,
    current_h: f64,
    settings: &StepSearchSettings,
) -> Result<StepSizeEstimate>
where
    F: Differentiable<f64> + ?Sized,
{
    settings.validate()?;
    ensure_step(current_h)?;
    let exact = ensure_defined_at(f, x)?;

    let model = model_step(f, method, x, settings);
    tracing::debug!(%method, x, model_step = model, "error model minimiser");

    let mut candidates = vec![model, current_h];
    candidates.extend(settings.grid());

    let mut best: Option<(f64, f64)> = None;
    for h in candidates {
        let error = (difference_quotient(f, method, x, h) - exact).abs();
        if !error.is_finite() {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_h, best_error)) => {
                error < best_error || (error == best_error && h > best_h)
            }
        };
        if better {
            best = Some((h, error));
        }
    }

    let (h, error) = best.ok_or(DiffError::NoFiniteStep(x))?;
    tracing::debug!(%method, x, h, error, "selected step size");

    Ok(StepSizeEstimate {
        h,
        error,
        model_step: model,
    })
}
