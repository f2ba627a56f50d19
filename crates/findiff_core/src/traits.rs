use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types the difference stencils can run on.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A real function of one variable whose derivatives are known in closed form.
pub trait Differentiable<T: Scalar> {
    /// Evaluates f(x).
    fn value(&self, x: T) -> T;

    /// Evaluates the n-th derivative at x.
    /// order: 0 is the function itself, 1 the slope, and so on.
    fn derivative(&self, order: u32, x: T) -> T;
}

impl<T: Scalar, F: Differentiable<T> + ?Sized> Differentiable<T> for &F {
    fn value(&self, x: T) -> T {
        (**self).value(x)
    }

    fn derivative(&self, order: u32, x: T) -> T {
        (**self).derivative(order, x)
    }
}
