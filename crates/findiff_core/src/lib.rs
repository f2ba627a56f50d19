//! The `findiff_core` crate is the numerical engine behind the differentiation lessons.
//! Everything here is a pure function of its inputs.
//!
//! Key components:
//! - **Traits**: `Scalar` (numeric type abstraction) and `Differentiable` (a function with known derivatives).
//! - **Difference**: forward, backward and central quotients plus tangent lines.
//! - **Analysis**: error-versus-step sweeps, convergence sequences and order fits.
//! - **Optimal**: step-size selection from a truncation + round-off model, checked empirically.
//! - **Evaluator**: one request in, every displayed result out.

pub mod analysis;
pub mod difference;
pub mod error;
pub mod evaluator;
pub mod function;
pub mod input;
pub mod method;
pub mod optimal;
pub mod traits;

pub use error::{DiffError, Result};
pub use evaluator::{evaluate, Evaluation, EvaluationRequest, EvaluatorSettings};
pub use function::Function;
pub use method::Method;
