//! # oa-optimizer
//!
//! Two independent optimization heuristics.
//!
//! [`hill_climb`] searches subsets of an item list for the largest sum that
//! does not exceed a target, moving one item toggle at a time. [`gradient`]
//! minimizes a differentiable [`Objective`] with plain gradient descent,
//! momentum or Adam.
//!
//! Every routine takes its random source as an argument, so a seeded
//! generator reproduces a run exactly.

pub mod gradient;
pub mod hill_climb;
mod objective;

pub use gradient::{
    adam, gradient_descent, minimize, minimize_from, momentum, random_start, AdamStep,
    GradientConfig, GradientStep, Method, MomentumStep, PointSolution, UpdateRule,
};
pub use hill_climb::{fitness, neighbors, search, Climb, HillClimbConfig, HillClimber, SubsetSolution};
pub use objective::{FnObjective, Objective, SinCosBowl};
