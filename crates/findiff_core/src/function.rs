//! The built-in test functions and their closed-form derivatives.

use crate::traits::{Differentiable, Scalar};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the functions the lessons differentiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Function {
    /// sin(x), derivative cos(x).
    #[default]
    Sin,
    /// x², derivative 2x.
    Square,
    /// eˣ, its own derivative.
    Exp,
}

impl Function {
    pub const ALL: [Function; 3] = [Function::Sin, Function::Square, Function::Exp];

    /// Maps a selector position to a function. Unknown positions fall back to sin(x).
    pub fn from_index(index: usize) -> Self {
        match index {
            1 => Function::Square,
            2 => Function::Exp,
            _ => Function::Sin,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Function::Sin => 0,
            Function::Square => 1,
            Function::Exp => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Function::Sin => "sin(x)",
            Function::Square => "x²",
            Function::Exp => "eˣ",
        }
    }

    /// Closed-form first derivative: cos(x), 2x or eˣ.
    pub fn exact_derivative(self, x: f64) -> f64 {
        Differentiable::<f64>::derivative(&self, 1, x)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<T: Scalar> Differentiable<T> for Function {
    fn value(&self, x: T) -> T {
        match self {
            Function::Sin => x.sin(),
            Function::Square => x * x,
            Function::Exp => x.exp(),
        }
    }

    fn derivative(&self, order: u32, x: T) -> T {
        match self {
            // sin cycles through cos, -sin, -cos.
            Function::Sin => match order % 4 {
                0 => x.sin(),
                1 => x.cos(),
                2 => -x.sin(),
                _ => -x.cos(),
            },
            Function::Square => match order {
                0 => x * x,
                1 => x + x,
                2 => T::one() + T::one(),
                _ => T::zero(),
            },
            Function::Exp => x.exp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_derivatives_match_closed_forms() {
        for &x in &[-1.5, 0.0, 0.7, 2.0] {
            assert!((Function::Sin.exact_derivative(x) - f64::cos(x)).abs() < 1e-15);
            assert!((Function::Square.exact_derivative(x) - 2.0 * x).abs() < 1e-15);
            assert!((Function::Exp.exact_derivative(x) - f64::exp(x)).abs() < 1e-15);
        }
    }

    #[test]
    fn higher_derivatives_follow_the_rules() {
        let x = 0.3_f64;
        assert!((Function::Sin.derivative(2, x) + x.sin()).abs() < 1e-15);
        assert!((Function::Sin.derivative(3, x) + x.cos()).abs() < 1e-15);
        assert!((Function::Sin.derivative(4, x) - x.sin()).abs() < 1e-15);
        assert_eq!(Function::Square.derivative(2, x), 2.0);
        assert_eq!(Function::Square.derivative(3, x), 0.0);
        assert!((Function::Exp.derivative(5, x) - x.exp()).abs() < 1e-15);
    }

    #[test]
    fn selector_index_round_trips_and_falls_back_to_sin() {
        for function in Function::ALL {
            assert_eq!(Function::from_index(function.index()), function);
        }
        assert_eq!(Function::from_index(7), Function::Sin);
    }

    #[test]
    fn evaluates_in_single_precision() {
        let y: f32 = Function::Exp.value(1.0_f32);
        assert!((y - std::f32::consts::E).abs() < 1e-6);
        assert_eq!(Function::Square.to_string(), "x²");
    }
}
