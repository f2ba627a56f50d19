//! Single call surface that bundles every result a lesson screen shows.

use crate::analysis::{
    convergence_with_settings, error_analysis, AnalysisSettings, ConvergenceSample, Sample,
};
use crate::difference::{
    derivative_approx, ensure_defined_at, stencil_points, tangent_line, TangentLine,
};
use crate::error::{ensure_finite, ensure_step, Result};
use crate::function::Function;
use crate::method::Method;
use crate::optimal::{find_optimal_step_size, StepSearchSettings, StepSizeEstimate};
use crate::traits::Differentiable;
use serde::{Deserialize, Serialize};

/// Absolute errors above this suggest trying a smaller step.
pub const ERROR_HINT_THRESHOLD: f64 = 0.01;

/// Immutable description of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub function: Function,
    pub method: Method,
    pub x: f64,
    pub h: f64,
}

impl EvaluationRequest {
    /// Builds a request, rejecting non-finite `x` and non-positive or non-finite `h`.
    pub fn new(function: Function, method: Method, x: f64, h: f64) -> Result<Self> {
        let request = Self {
            function,
            method,
            x,
            h,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_finite("x", self.x)?;
        ensure_step(self.h)
    }

    pub fn with_step(self, h: f64) -> Result<Self> {
        Self::new(self.function, self.method, self.x, h)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorSettings {
    pub analysis: AnalysisSettings,
    pub step_search: StepSearchSettings,
}

impl EvaluatorSettings {
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.step_search.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccuracyHint {
    Acceptable,
    ReduceStep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub request: EvaluationRequest,
    pub approx: f64,
    pub exact: f64,
    pub absolute_error: f64,
    pub tangent: TangentLine,
    /// Points the stencil sampled, in ascending x.
    pub stencil: Vec<(f64, f64)>,
    pub error_curve: Vec<Sample>,
    pub convergence_curve: Vec<ConvergenceSample>,
    pub optimal: StepSizeEstimate,
    pub accuracy_hint: AccuracyHint,
}

/// Runs every analysis for `request`.
pub fn evaluate(request: &EvaluationRequest, settings: &EvaluatorSettings) -> Result<Evaluation> {
    request.validate()?;
    settings.validate()?;

    let EvaluationRequest {
        function,
        method,
        x,
        h,
    } = *request;

    let exact = ensure_defined_at(&function, x)?;
    let approx = derivative_approx(&function, method, x, h)?;
    let absolute_error = (approx - exact).abs();
    let fx = Differentiable::<f64>::value(&function, x);

    let accuracy_hint = if absolute_error > ERROR_HINT_THRESHOLD {
        AccuracyHint::ReduceStep
    } else {
        AccuracyHint::Acceptable
    };
    tracing::trace!(%function, %method, x, h, approx, exact, "evaluated derivative");

    Ok(Evaluation {
        request: *request,
        approx,
        exact,
        absolute_error,
        tangent: tangent_line(x, fx, approx),
        stencil: stencil_points(&function, method, x, h)?,
        error_curve: error_analysis(&function, method, x, &settings.analysis)?,
        convergence_curve: convergence_with_settings(&function, method, x, &settings.analysis)?,
        optimal: find_optimal_step_size(&function, method, x, h, &settings.step_search)?,
        accuracy_hint,
    })
}
