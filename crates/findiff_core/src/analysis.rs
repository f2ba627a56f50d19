//! Error-versus-step sweeps, convergence sequences and order fits.

use crate::difference::{difference_quotient, ensure_defined_at};
use crate::error::{ensure_step, DiffError, Result};
use crate::method::Method;
use crate::traits::Differentiable;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Upper bound on `samples_per_decade`.
pub const MAX_SAMPLES_PER_DECADE: u32 = 100;
/// Upper bound on convergence sequence length. Halving 0.1 this many times already
/// leaves the normal f64 range.
pub const MAX_HALVINGS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Smallest step in the error sweep is 10^min_exponent.
    pub min_exponent: i32,
    pub max_exponent: i32,
    pub samples_per_decade: u32,
    /// First step of the convergence sequence.
    pub initial_step: f64,
    /// Number of samples in the convergence sequence; h halves between them.
    pub halvings: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            min_exponent: -10,
            max_exponent: 0,
            samples_per_decade: 1,
            initial_step: 0.1,
            halvings: 10,
        }
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<()> {
        if self.min_exponent > self.max_exponent {
            return Err(DiffError::InvalidSettings(format!(
                "min_exponent ({}) exceeds max_exponent ({})",
                self.min_exponent, self.max_exponent
            )));
        }
        if self.min_exponent < -300 || self.max_exponent > 300 {
            return Err(DiffError::InvalidSettings(
                "sweep exponents must lie within [-300, 300]".to_string(),
            ));
        }
        if self.samples_per_decade == 0 || self.samples_per_decade > MAX_SAMPLES_PER_DECADE {
            return Err(DiffError::InvalidSettings(format!(
                "samples_per_decade must lie within [1, {}], got {}",
                MAX_SAMPLES_PER_DECADE, self.samples_per_decade
            )));
        }
        if !self.initial_step.is_finite() || self.initial_step <= 0.0 {
            return Err(DiffError::InvalidSettings(format!(
                "initial_step must be positive, got {}",
                self.initial_step
            )));
        }
        if self.halvings == 0 || self.halvings > MAX_HALVINGS {
            return Err(DiffError::InvalidSettings(format!(
                "halvings must lie within [1, {}], got {}",
                MAX_HALVINGS, self.halvings
            )));
        }
        Ok(())
    }
}

/// One point of an error curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub h: f64,
    pub error: f64,
}

/// One step of a convergence sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceSample {
    pub iteration: usize,
    pub h: f64,
    pub value: f64,
    pub error: f64,
}

impl ConvergenceSample {
    pub fn sample(&self) -> Sample {
        Sample {
            h: self.h,
            error: self.error,
        }
    }
}

/// Sweeps h geometrically over [10^min_exponent, 10^max_exponent] and records
/// |approx - exact| for each step, smallest h first.
pub fn error_analysis<F>(
    f: &F,
    method: Method,
    x: f64,
    settings: &AnalysisSettings,
) -> Result<Vec<Sample>>
where
    F: Differentiable<f64> + ?Sized,
{
    settings.validate()?;
    let exact = ensure_defined_at(f, x)?;

    let per_decade = settings.samples_per_decade as i64;
    let first = settings.min_exponent as i64 * per_decade;
    let last = settings.max_exponent as i64 * per_decade;

    Ok((first..=last)
        .map(|k| {
            let h = 10f64.powf(k as f64 / per_decade as f64);
            let approx = difference_quotient(f, method, x, h);
            Sample {
                h,
                error: (approx - exact).abs(),
            }
        })
        .collect())
}

/// Halves h from `h0` and records the estimate and its error, `n` samples in total.
///
/// The sequence ends early once h leaves the normal f64 range, so it never
/// evaluates a quotient with h = 0.
pub fn convergence_analysis<F>(
    f: &F,
    method: Method,
    x: f64,
    h0: f64,
    n: usize,
) -> Result<Vec<ConvergenceSample>>
where
    F: Differentiable<f64> + ?Sized,
{
    ensure_step(h0)?;
    if n > MAX_HALVINGS {
        return Err(DiffError::InvalidSettings(format!(
            "halvings must be at most {}, got {}",
            MAX_HALVINGS, n
        )));
    }
    let exact = ensure_defined_at(f, x)?;

    let mut h = h0;
    let mut samples = Vec::with_capacity(n);
    for iteration in 0..n {
        if !h.is_normal() {
            break;
        }
        let value = difference_quotient(f, method, x, h);
        samples.push(ConvergenceSample {
            iteration,
            h,
            value,
            error: (value - exact).abs(),
        });
        h *= 0.5;
    }
    Ok(samples)
}

/// Convergence sequence using the step and length from `settings`.
pub fn convergence_with_settings<F>(
    f: &F,
    method: Method,
    x: f64,
    settings: &AnalysisSettings,
) -> Result<Vec<ConvergenceSample>>
where
    F: Differentiable<f64> + ?Sized,
{
    settings.validate()?;
    convergence_analysis(f, method, x, settings.initial_step, settings.halvings)
}

/// (log10 h, log10 error) pairs for a log-log plot. Zero errors have no logarithm
/// and are skipped.
pub fn log_log_points(samples: &[Sample]) -> Vec<(f64, f64)> {
    samples
        .iter()
        .filter(|s| usable(s))
        .map(|s| (s.h.log10(), s.error.log10()))
        .collect()
}

/// Least-squares slope of log10(error) against log10(h).
///
/// A method of order p gives a slope close to p while truncation error dominates.
pub fn observed_order(samples: &[Sample]) -> Result<f64> {
    let points = log_log_points(samples);
    if points.len() < 2 {
        return Err(DiffError::InsufficientSamples(points.len()));
    }
    let first_h = points[0].0;
    if points.iter().all(|(lh, _)| (lh - first_h).abs() < f64::EPSILON) {
        return Err(DiffError::Fit("all samples share the same step".to_string()));
    }

    let n = points.len();
    let mut design = DMatrix::<f64>::zeros(n, 2);
    let mut rhs = DVector::<f64>::zeros(n);
    for (i, (lh, le)) in points.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = *lh;
        rhs[i] = *le;
    }

    let svd = design.svd(true, true);
    let coeffs = svd
        .solve(&rhs, 1e-12)
        .map_err(|e| DiffError::Fit(e.to_string()))?;
    Ok(coeffs[1])
}

fn usable(sample: &Sample) -> bool {
    sample.h > 0.0 && sample.error > 0.0 && sample.error.is_finite() && sample.h.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Function;

    fn assert_err_contains<T: std::fmt::Debug>(result: Result<T>, needle: &str) {
        let err = result.expect_err("expected an error");
        assert!(
            err.to_string().contains(needle),
            "error `{}` does not contain `{}`",
            err,
            needle
        );
    }

    #[test]
    fn default_sweep_covers_eleven_decades() {
        let samples =
            error_analysis(&Function::Sin, Method::Forward, 2.0, &AnalysisSettings::default())
                .unwrap();
        assert_eq!(samples.len(), 11);
        assert!((samples[0].h - 1e-10).abs() < 1e-24);
        assert_eq!(samples[10].h, 1.0);
    }

    #[test]
    fn denser_sweep_adds_intermediate_steps() {
        let settings = AnalysisSettings {
            min_exponent: -3,
            max_exponent: -1,
            samples_per_decade: 4,
            ..AnalysisSettings::default()
        };
        let samples = error_analysis(&Function::Exp, Method::Central, 0.0, &settings).unwrap();
        assert_eq!(samples.len(), 9);
        assert!(samples.windows(2).all(|w| w[0].h < w[1].h));
    }

    #[test]
    fn one_sided_methods_are_first_order() {
        let settings = AnalysisSettings {
            min_exponent: -6,
            max_exponent: -1,
            samples_per_decade: 2,
            ..AnalysisSettings::default()
        };
        for method in [Method::Forward, Method::Backward] {
            for function in Function::ALL {
                let samples = error_analysis(&function, method, 1.0, &settings).unwrap();
                let order = observed_order(&samples).unwrap();
                assert!((order - 1.0).abs() < 0.1, "{function} {method}: {order}");
            }
        }
    }

    #[test]
    fn central_method_is_second_order() {
        for function in [Function::Sin, Function::Exp] {
            let samples = convergence_analysis(&function, Method::Central, 1.0, 0.1, 10).unwrap();
            let curve: Vec<Sample> = samples.iter().map(ConvergenceSample::sample).collect();
            let order = observed_order(&curve).unwrap();
            assert!((order - 2.0).abs() < 0.1, "{function}: {order}");
        }
    }

    #[test]
    fn convergence_halves_the_step() {
        let samples =
            convergence_analysis(&Function::Square, Method::Forward, 2.0, 0.1, 4).unwrap();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[3].iteration, 3);
        assert!((samples[3].h - 0.0125).abs() < 1e-15);
        // Forward error on x² is exactly h.
        for s in &samples {
            assert!((s.error - s.h).abs() < 1e-12);
            assert!((s.value - 4.0 - s.h).abs() < 1e-12);
        }
    }

    #[test]
    fn central_error_curve_is_u_shaped() {
        let samples =
            error_analysis(&Function::Sin, Method::Central, 1.0, &AnalysisSettings::default())
                .unwrap();
        let (best, min_error) = samples
            .iter()
            .enumerate()
            .map(|(i, s)| (i, s.error))
            .fold((0, f64::INFINITY), |acc, cur| if cur.1 < acc.1 { cur } else { acc });
        assert!(best > 0 && best < samples.len() - 1);
        assert!(samples[0].error > 100.0 * min_error);
        assert!(samples[samples.len() - 1].error > 100.0 * min_error);
        // Truncation side falls monotonically towards the minimum.
        assert!(samples[best..].windows(2).all(|w| w[0].error <= w[1].error));
    }

    #[test]
    fn observed_order_needs_two_usable_samples() {
        let samples = [
            Sample { h: 0.1, error: 0.0 },
            Sample { h: 0.01, error: 1e-3 },
        ];
        assert_eq!(
            observed_order(&samples),
            Err(DiffError::InsufficientSamples(1))
        );
        let same_h = [
            Sample { h: 0.1, error: 1e-2 },
            Sample { h: 0.1, error: 2e-2 },
        ];
        assert_err_contains(observed_order(&same_h), "same step");
    }

    #[test]
    fn log_log_points_skip_exact_hits() {
        let samples = [
            Sample { h: 1e-2, error: 1e-4 },
            Sample { h: 1e-3, error: 0.0 },
        ];
        let points = log_log_points(&samples);
        assert_eq!(points.len(), 1);
        assert!((points[0].0 + 2.0).abs() < 1e-12);
        assert!((points[0].1 + 4.0).abs() < 1e-12);
    }

    #[test]
    fn settings_are_validated() {
        let swapped = AnalysisSettings {
            min_exponent: 0,
            max_exponent: -3,
            ..AnalysisSettings::default()
        };
        assert_err_contains(swapped.validate(), "exceeds max_exponent");
        let no_samples = AnalysisSettings {
            samples_per_decade: 0,
            ..AnalysisSettings::default()
        };
        assert_err_contains(no_samples.validate(), "samples_per_decade");
        let too_dense = AnalysisSettings {
            samples_per_decade: u32::MAX,
            ..AnalysisSettings::default()
        };
        assert_err_contains(too_dense.validate(), "samples_per_decade must lie within");
        let too_long = AnalysisSettings {
            halvings: usize::MAX,
            ..AnalysisSettings::default()
        };
        assert_err_contains(too_long.validate(), "halvings must lie within");
        assert_err_contains(
            convergence_analysis(&Function::Sin, Method::Forward, 1.0, 0.1, usize::MAX),
            "halvings must be at most",
        );
        let bad_step = AnalysisSettings {
            initial_step: -0.1,
            ..AnalysisSettings::default()
        };
        assert_err_contains(
            convergence_with_settings(&Function::Sin, Method::Central, 0.0, &bad_step),
            "initial_step",
        );
        assert_err_contains(
            convergence_analysis(&Function::Sin, Method::Central, 0.0, 0.0, 3),
            "must be positive",
        );
    }

    #[test]
    fn convergence_stops_before_the_step_underflows() {
        let samples =
            convergence_analysis(&Function::Sin, Method::Forward, 1.0, 0.1, MAX_HALVINGS).unwrap();
        assert!(samples.len() < MAX_HALVINGS);
        assert!(samples.iter().all(|s| s.h > 0.0 && !s.value.is_nan()));

        let tiny = convergence_analysis(&Function::Sin, Method::Central, 1.0, 5e-324, 3).unwrap();
        assert!(tiny.is_empty());
    }

    #[test]
    fn overflowing_base_point_is_an_input_error() {
        assert!(matches!(
            convergence_analysis(&Function::Exp, Method::Central, 710.0, 0.1, 3),
            Err(DiffError::NonFiniteInput { name: "f(x)", .. })
        ));
        assert!(matches!(
            error_analysis(&Function::Exp, Method::Forward, 710.0, &AnalysisSettings::default()),
            Err(DiffError::NonFiniteInput { name: "f(x)", .. })
        ));
    }

    #[test]
    fn huge_steps_yield_undefined_errors_that_plots_skip() {
        let settings = AnalysisSettings {
            max_exponent: 300,
            ..AnalysisSettings::default()
        };
        let samples = error_analysis(&Function::Square, Method::Central, 1.0, &settings).unwrap();
        assert_eq!(samples.len(), 311);
        assert!(samples.iter().any(|s| s.error.is_nan()));

        let points = log_log_points(&samples);
        assert!(points.len() < samples.len());
        assert!(points.iter().all(|(lh, le)| lh.is_finite() && le.is_finite()));
        assert!(observed_order(&samples).unwrap().is_finite());
    }
}
