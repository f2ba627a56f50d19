//! Parameter state fed by raw front-end input.
//!
//! Text that fails to parse, or parses to a value the engine cannot use, leaves the
//! previous value in place so a half-typed number never breaks the current view.

use crate::error::Result;
use crate::evaluator::EvaluationRequest;
use crate::function::Function;
use crate::method::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterInput {
    function: Function,
    method: Method,
    x: f64,
    h: f64,
}

impl Default for ParameterInput {
    fn default() -> Self {
        Self {
            function: Function::Sin,
            method: Method::Forward,
            x: 2.0,
            h: 0.1,
        }
    }
}

impl ParameterInput {
    pub fn function(&self) -> Function {
        self.function
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn h(&self) -> f64 {
        self.h
    }

    pub fn set_function(&mut self, function: Function) {
        self.function = function;
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn set_function_index(&mut self, index: usize) {
        self.function = Function::from_index(index);
    }

    pub fn set_method_index(&mut self, index: usize) -> Result<()> {
        self.method = Method::from_index(index)?;
        Ok(())
    }

    /// Accepts any finite number. Returns whether the text was taken.
    pub fn set_x_text(&mut self, text: &str) -> bool {
        match parse_number(text) {
            Some(x) if x.is_finite() => {
                self.x = x;
                true
            }
            _ => {
                tracing::warn!(text, kept = self.x, "rejected x input");
                false
            }
        }
    }

    /// Accepts any finite, positive number. Returns whether the text was taken.
    pub fn set_h_text(&mut self, text: &str) -> bool {
        match parse_number(text) {
            Some(h) if h.is_finite() && h > 0.0 => {
                self.h = h;
                true
            }
            _ => {
                tracing::warn!(text, kept = self.h, "rejected h input");
                false
            }
        }
    }

    /// Sets h directly, under the same rules as text input.
    pub fn set_h(&mut self, h: f64) -> bool {
        if h.is_finite() && h > 0.0 {
            self.h = h;
            true
        } else {
            false
        }
    }

    pub fn request(&self) -> EvaluationRequest {
        EvaluationRequest {
            function: self.function,
            method: self.method,
            x: self.x,
            h: self.h,
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}
