//! # oa-cli
//!
//! Runs the subset hill climber and the configured gradient optimizers once,
//! from a single seeded random source, and collects a [`RunReport`].

mod config;
mod report;

pub use config::{OutputFormat, RunnerConfig, CONFIG_ENV, FORMAT_ENV, SEED_ENV};
pub use report::RunReport;

use chrono::Utc;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use oa_optimizer::{minimize, HillClimber, PointSolution, SinCosBowl};
use oa_types::OaResult;

/// Execute every configured search, drawing all randomness from `rng`.
pub fn run<R: Rng + ?Sized>(config: &RunnerConfig, seed: u64, rng: &mut R) -> OaResult<RunReport> {
    config.validate()?;
    let started_at = Utc::now();
    info!("Starting run with seed {}", seed);

    let climber = HillClimber::new(&config.items, config.hill_climb.clone())?;
    let subset = climber.search(rng);

    let mut gradient = Vec::with_capacity(config.gradient.len());
    for gradient_config in &config.gradient {
        let point = minimize(&SinCosBowl, gradient_config, rng)?;
        gradient.push(PointSolution::evaluate(
            &SinCosBowl,
            gradient_config.method,
            point,
        )?);
    }

    let finished_at = Utc::now();
    info!("Run completed in {} ms", (finished_at - started_at).num_milliseconds());

    Ok(RunReport {
        id: Uuid::new_v4(),
        seed,
        started_at,
        finished_at,
        subset,
        gradient,
    })
}
