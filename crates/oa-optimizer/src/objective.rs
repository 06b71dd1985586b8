//! Differentiable objectives for the gradient optimizers.

/// A function to minimize together with its analytic gradient.
pub trait Objective {
    /// Dimension the objective is defined for, or `None` if any is accepted.
    fn dim(&self) -> Option<usize> {
        None
    }

    fn value(&self, x: &[f64]) -> f64;

    fn gradient(&self, x: &[f64]) -> Vec<f64>;
}

/// `f(x) = sin(x0)·cos(x1) + 0.1·(x0² + x1²)`.
///
/// A quadratic bowl with a sinusoidal ripple, so it has several local minima.
/// Only defined in two dimensions: `value` and `gradient` panic on a point
/// with fewer than two coordinates. [`crate::minimize`] and
/// [`crate::PointSolution::evaluate`] check the length first.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SinCosBowl;

impl Objective for SinCosBowl {
    fn dim(&self) -> Option<usize> {
        Some(2)
    }

    fn value(&self, x: &[f64]) -> f64 {
        x[0].sin() * x[1].cos() + 0.1 * (x[0].powi(2) + x[1].powi(2))
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        vec![
            x[0].cos() * x[1].cos() + 0.2 * x[0],
            -x[0].sin() * x[1].sin() + 0.2 * x[1],
        ]
    }
}

/// Objective built from a pair of closures, for dimensions other than two.
pub struct FnObjective<F, G> {
    value: F,
    gradient: G,
}

impl<F, G> FnObjective<F, G>
where
    F: Fn(&[f64]) -> f64,
    G: Fn(&[f64]) -> Vec<f64>,
{
    pub fn new(value: F, gradient: G) -> Self {
        Self { value, gradient }
    }
}

impl<F, G> Objective for FnObjective<F, G>
where
    F: Fn(&[f64]) -> f64,
    G: Fn(&[f64]) -> Vec<f64>,
{
    fn value(&self, x: &[f64]) -> f64 {
        (self.value)(x)
    }

    fn gradient(&self, x: &[f64]) -> Vec<f64> {
        (self.gradient)(x)
    }
}
