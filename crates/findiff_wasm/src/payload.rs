//! Plot-ready payloads handed to the front end.

use anyhow::{Context, Result};
use findiff_core::analysis::log_log_points;
use findiff_core::{evaluate, Evaluation, EvaluationRequest, EvaluatorSettings};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationPayload {
    pub function_label: &'static str,
    pub method_description: &'static str,
    pub evaluation: Evaluation,
    /// (log10 h, log10 error) for the error graph.
    pub error_points: Vec<(f64, f64)>,
    /// (iteration, log10 error) for the convergence graph.
    pub convergence_points: Vec<(f64, f64)>,
}

pub(crate) fn build_payload(
    request: &EvaluationRequest,
    settings: &EvaluatorSettings,
) -> Result<EvaluationPayload> {
    let evaluation = evaluate(request, settings).with_context(|| {
        format!(
            "Evaluation failed for {} ({}) at x = {}, h = {}",
            request.function, request.method, request.x, request.h
        )
    })?;

    let error_points = log_log_points(&evaluation.error_curve);
    let convergence_points = evaluation
        .convergence_curve
        .iter()
        .filter(|s| s.error > 0.0 && s.error.is_finite())
        .map(|s| (s.iteration as f64, s.error.log10()))
        .collect();

    Ok(EvaluationPayload {
        function_label: request.function.label(),
        method_description: request.method.description(),
        evaluation,
        error_points,
        convergence_points,
    })
}
