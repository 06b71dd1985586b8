//! Gradient-based minimization: plain gradient descent, momentum and Adam.
//!
//! A run samples an integer starting point in `[0, 10]` per coordinate, then
//! applies one [`UpdateRule`] for a fixed number of steps. There is no
//! convergence check; NaN or infinite values from a diverging run propagate
//! into the returned point.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use oa_types::{InputError, OaResult};

use crate::objective::{Objective, SinCosBowl};

/// A stateful point update driven by the gradient.
pub trait UpdateRule {
    /// Move `x` given the gradient evaluated at `x`.
    fn apply(&mut self, x: &mut [f64], grad: &[f64], learning_rate: f64);

    fn name(&self) -> &str;
}

/// `x ← x - lr·g`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientStep;

impl UpdateRule for GradientStep {
    fn apply(&mut self, x: &mut [f64], grad: &[f64], learning_rate: f64) {
        for (xi, gi) in x.iter_mut().zip(grad) {
            *xi -= learning_rate * gi;
        }
    }

    fn name(&self) -> &str {
        "gradient_descent"
    }
}

/// Exponential moving average of the gradient:
/// `v ← β·v + (1-β)·g`, `x ← x - lr·v`.
#[derive(Debug, Clone)]
pub struct MomentumStep {
    beta: f64,
    velocity: Vec<f64>,
}

impl MomentumStep {
    pub fn new(beta: f64, dim: usize) -> Self {
        Self {
            beta,
            velocity: vec![0.0; dim],
        }
    }

    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }
}

impl UpdateRule for MomentumStep {
    fn apply(&mut self, x: &mut [f64], grad: &[f64], learning_rate: f64) {
        for ((xi, vi), gi) in x.iter_mut().zip(self.velocity.iter_mut()).zip(grad) {
            *vi = self.beta * *vi + (1.0 - self.beta) * gi;
            *xi -= learning_rate * *vi;
        }
    }

    fn name(&self) -> &str {
        "momentum"
    }
}

/// Adam: bias-corrected first and second moment estimates.
#[derive(Debug, Clone)]
pub struct AdamStep {
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    m: Vec<f64>,
    v: Vec<f64>,
    /// Steps taken; the step being applied uses `t + 1` for bias correction.
    t: u64,
}

impl AdamStep {
    pub fn new(beta1: f64, beta2: f64, epsilon: f64, dim: usize) -> Self {
        Self {
            beta1,
            beta2,
            epsilon,
            m: vec![0.0; dim],
            v: vec![0.0; dim],
            t: 0,
        }
    }

    pub fn steps_taken(&self) -> u64 {
        self.t
    }
}

impl UpdateRule for AdamStep {
    fn apply(&mut self, x: &mut [f64], grad: &[f64], learning_rate: f64) {
        self.t += 1;
        let correction1 = 1.0 - self.beta1.powf(self.t as f64);
        let correction2 = 1.0 - self.beta2.powf(self.t as f64);

        for (((xi, mi), vi), gi) in x
            .iter_mut()
            .zip(self.m.iter_mut())
            .zip(self.v.iter_mut())
            .zip(grad)
        {
            *mi = self.beta1 * *mi + (1.0 - self.beta1) * gi;
            *vi = self.beta2 * *vi + (1.0 - self.beta2) * gi.powi(2);
            let m_hat = *mi / correction1;
            let v_hat = *vi / correction2;
            *xi -= learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }

    fn name(&self) -> &str {
        "adam"
    }
}

/// Which update rule to run, with its hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Method {
    GradientDescent,
    Momentum {
        #[serde(default = "default_beta")]
        beta: f64,
    },
    Adam {
        #[serde(default = "default_beta")]
        beta1: f64,
        #[serde(default = "default_beta2")]
        beta2: f64,
        #[serde(default = "default_epsilon")]
        epsilon: f64,
    },
}

fn default_beta() -> f64 {
    0.9
}

fn default_beta2() -> f64 {
    0.999
}

fn default_epsilon() -> f64 {
    1e-8
}

impl Method {
    /// Momentum with `β = 0.9`.
    pub fn momentum() -> Self {
        Self::Momentum {
            beta: default_beta(),
        }
    }

    /// Adam with `β1 = 0.9`, `β2 = 0.999`, `ε = 1e-8`.
    pub fn adam() -> Self {
        Self::Adam {
            beta1: default_beta(),
            beta2: default_beta2(),
            epsilon: default_epsilon(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::GradientDescent => "gradient_descent",
            Self::Momentum { .. } => "momentum",
            Self::Adam { .. } => "adam",
        }
    }

    /// A fresh rule with zeroed state for a `dim`-dimensional point.
    pub fn rule(&self, dim: usize) -> Box<dyn UpdateRule> {
        match *self {
            Self::GradientDescent => Box::new(GradientStep),
            Self::Momentum { beta } => Box::new(MomentumStep::new(beta, dim)),
            Self::Adam {
                beta1,
                beta2,
                epsilon,
            } => Box::new(AdamStep::new(beta1, beta2, epsilon, dim)),
        }
    }
}

impl Default for Method {
    fn default() -> Self {
        Self::GradientDescent
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GradientDescent => write!(f, "gradient_descent"),
            Self::Momentum { beta } => write!(f, "momentum(beta={beta})"),
            Self::Adam {
                beta1,
                beta2,
                epsilon,
            } => write!(f, "adam(beta1={beta1}, beta2={beta2}, epsilon={epsilon})"),
        }
    }
}

/// Parameters of one gradient run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientConfig {
    pub dim: usize,
    pub learning_rate: f64,
    pub steps: usize,
    pub method: Method,
}

impl GradientConfig {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Check the run against an objective before any sampling happens.
    pub fn validate<O: Objective + ?Sized>(&self, objective: &O) -> OaResult<()> {
        if self.dim == 0 {
            return Err(InputError::NonPositiveDimension.into());
        }
        if self.steps == 0 {
            return Err(InputError::NonPositiveSteps.into());
        }
        if let Some(expected) = objective.dim() {
            if expected != self.dim {
                return Err(InputError::DimensionMismatch {
                    expected,
                    actual: self.dim,
                }
                .into());
            }
        }
        Ok(())
    }
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            dim: 2,
            learning_rate: 0.05,
            steps: 100,
            method: Method::GradientDescent,
        }
    }
}

/// Final point of a gradient run and the objective value there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSolution {
    pub method: Method,
    pub point: Vec<f64>,
    pub value: f64,
}

impl PointSolution {
    /// Evaluate `objective` at `point`, which must match the objective's
    /// fixed dimension if it declares one.
    pub fn evaluate<O: Objective + ?Sized>(
        objective: &O,
        method: Method,
        point: Vec<f64>,
    ) -> OaResult<Self> {
        if let Some(expected) = objective.dim() {
            if point.len() != expected {
                return Err(InputError::DimensionMismatch {
                    expected,
                    actual: point.len(),
                }
                .into());
            }
        }
        let value = objective.value(&point);
        Ok(Self {
            method,
            point,
            value,
        })
    }
}

/// Integer coordinates drawn uniformly from `[0, 10]`.
pub fn random_start<R: Rng + ?Sized>(dim: usize, rng: &mut R) -> Vec<f64> {
    (0..dim).map(|_| f64::from(rng.gen_range(0..=10u8))).collect()
}

/// Minimize `objective` from a random starting point.
pub fn minimize<O, R>(objective: &O, config: &GradientConfig, rng: &mut R) -> OaResult<Vec<f64>>
where
    O: Objective + ?Sized,
    R: Rng + ?Sized,
{
    config.validate(objective)?;
    let start = random_start(config.dim, rng);
    minimize_from(objective, start, config)
}

/// Minimize `objective` starting at `x`.
pub fn minimize_from<O>(objective: &O, mut x: Vec<f64>, config: &GradientConfig) -> OaResult<Vec<f64>>
where
    O: Objective + ?Sized,
{
    config.validate(objective)?;
    if x.len() != config.dim {
        return Err(InputError::InitialPointDimension {
            expected: config.dim,
            actual: x.len(),
        }
        .into());
    }

    let mut rule = config.method.rule(config.dim);
    info!(
        "Running {} for {} steps (lr {}) from {:?}",
        rule.name(),
        config.steps,
        config.learning_rate,
        x
    );

    for step in 1..=config.steps {
        let grad = objective.gradient(&x);
        if grad.len() != x.len() {
            return Err(InputError::GradientLength {
                expected: x.len(),
                actual: grad.len(),
            }
            .into());
        }
        rule.apply(&mut x, &grad, config.learning_rate);
        trace!("{} step {}: x = {:?}", rule.name(), step, x);
    }

    info!("{} finished at {:?}", rule.name(), x);
    Ok(x)
}

/// Plain gradient descent on [`SinCosBowl`].
pub fn gradient_descent<R: Rng + ?Sized>(
    dim: usize,
    learning_rate: f64,
    steps: usize,
    rng: &mut R,
) -> OaResult<Vec<f64>> {
    let config = GradientConfig::new(Method::GradientDescent)
        .with_dim(dim)
        .with_learning_rate(learning_rate)
        .with_steps(steps);
    minimize(&SinCosBowl, &config, rng)
}

/// Momentum descent on [`SinCosBowl`].
pub fn momentum<R: Rng + ?Sized>(
    dim: usize,
    learning_rate: f64,
    steps: usize,
    beta: f64,
    rng: &mut R,
) -> OaResult<Vec<f64>> {
    let config = GradientConfig::new(Method::Momentum { beta })
        .with_dim(dim)
        .with_learning_rate(learning_rate)
        .with_steps(steps);
    minimize(&SinCosBowl, &config, rng)
}

/// Adam on [`SinCosBowl`].
pub fn adam<R: Rng + ?Sized>(
    dim: usize,
    learning_rate: f64,
    steps: usize,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    rng: &mut R,
) -> OaResult<Vec<f64>> {
    let config = GradientConfig::new(Method::Adam {
        beta1,
        beta2,
        epsilon,
    })
    .with_dim(dim)
    .with_learning_rate(learning_rate)
    .with_steps(steps);
    minimize(&SinCosBowl, &config, rng)
}
