//! Finite-difference quotients and the tangent lines built from them.

use crate::error::{ensure_finite, ensure_step, Result};
use crate::function::Function;
use crate::method::Method;
use crate::traits::{Differentiable, Scalar};
use serde::{Deserialize, Serialize};

/// Raw difference quotient. Callers must guarantee `h > 0`.
pub(crate) fn difference_quotient<T, F>(f: &F, method: Method, x: T, h: T) -> T
where
    T: Scalar,
    F: Differentiable<T> + ?Sized,
{
    match method {
        Method::Forward => (f.value(x + h) - f.value(x)) / h,
        Method::Backward => (f.value(x) - f.value(x - h)) / h,
        Method::Central => (f.value(x + h) - f.value(x - h)) / (h + h),
    }
}

/// Approximates f'(x) with the chosen stencil.
///
/// Rejects non-finite `x` and any `h` that is not a positive finite number, so the
/// quotient never divides by zero.
pub fn derivative_approx<T, F>(f: &F, method: Method, x: T, h: T) -> Result<T>
where
    T: Scalar,
    F: Differentiable<T> + ?Sized,
{
    ensure_finite("x", as_f64(x))?;
    ensure_step(as_f64(h))?;
    Ok(difference_quotient(f, method, x, h))
}

/// Checks that f and f' are finite at x and returns f'(x).
///
/// Large arguments overflow (eˣ past x ≈ 709.78), and every quotient built on an
/// infinite value is meaningless.
pub(crate) fn ensure_defined_at<F>(f: &F, x: f64) -> Result<f64>
where
    F: Differentiable<f64> + ?Sized,
{
    ensure_finite("x", x)?;
    ensure_finite("f(x)", f.value(x))?;
    let slope = f.derivative(1, x);
    ensure_finite("f'(x)", slope)?;
    Ok(slope)
}

/// Closed-form derivative of a built-in function.
pub fn exact_derivative(function: Function, x: f64) -> f64 {
    function.exact_derivative(x)
}

/// Absolute difference between the stencil estimate and the true derivative.
pub fn absolute_error<F>(f: &F, method: Method, x: f64, h: f64) -> Result<f64>
where
    F: Differentiable<f64> + ?Sized,
{
    let approx = derivative_approx(f, method, x, h)?;
    Ok((approx - f.derivative(1, x)).abs())
}

/// The points (x, f(x)) a stencil samples, in ascending x.
pub fn stencil_points<F>(f: &F, method: Method, x: f64, h: f64) -> Result<Vec<(f64, f64)>>
where
    F: Differentiable<f64> + ?Sized,
{
    ensure_finite("x", x)?;
    ensure_step(h)?;
    Ok(method
        .stencil_offsets()
        .iter()
        .map(|&k| {
            let at = x + k * h;
            (at, f.value(at))
        })
        .collect())
}

/// Line through (x0, y0) with the given slope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TangentLine {
    pub x0: f64,
    pub y0: f64,
    pub slope: f64,
}

impl TangentLine {
    pub fn at(&self, v: f64) -> f64 {
        self.y0 + self.slope * (v - self.x0)
    }

    pub fn into_fn(self) -> impl Fn(f64) -> f64 {
        move |v| self.at(v)
    }

    /// Evenly spaced points over [from, to] for plotting. A count of 1 gives the
    /// point at `from`, a count of 0 gives nothing.
    pub fn sample(&self, from: f64, to: f64, count: usize) -> Vec<(f64, f64)> {
        match count {
            0 => return Vec::new(),
            1 => return vec![(from, self.at(from))],
            _ => {}
        }
        let step = (to - from) / (count - 1) as f64;
        (0..count)
            .map(|i| {
                let v = from + step * i as f64;
                (v, self.at(v))
            })
            .collect()
    }
}

/// t(v) = fx + slope * (v - x)
pub fn tangent_line(x: f64, fx: f64, slope: f64) -> TangentLine {
    TangentLine {
        x0: x,
        y0: fx,
        slope,
    }
}

/// Tangent at x whose slope is the stencil estimate rather than the exact derivative.
pub fn approximate_tangent<F>(f: &F, method: Method, x: f64, h: f64) -> Result<TangentLine>
where
    F: Differentiable<f64> + ?Sized,
{
    let slope = derivative_approx(f, method, x, h)?;
    Ok(tangent_line(x, f.value(x), slope))
}

fn as_f64<T: Scalar>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
