//! Runner configuration.
//!
//! Defaults reproduce the classic demo: the subset search over
//! `[3, 7, 10, 2, 8, 4, 1, 20, -10]` toward 20, and each gradient method for
//! 1200 steps on the two-dimensional sin/cos bowl. A JSON file named by
//! `OPTALGO_CONFIG` replaces the defaults; `OPTALGO_SEED` and
//! `OPTALGO_FORMAT` override single fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use oa_optimizer::{GradientConfig, HillClimbConfig, Method};
use oa_types::{config_error, OaResult};

pub const CONFIG_ENV: &str = "OPTALGO_CONFIG";
pub const SEED_ENV: &str = "OPTALGO_SEED";
pub const FORMAT_ENV: &str = "OPTALGO_FORMAT";

/// How the final report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Text
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Seed for the run; drawn at random when absent.
    pub seed: Option<u64>,
    pub items: Vec<f64>,
    pub hill_climb: HillClimbConfig,
    /// Gradient runs, executed in order.
    pub gradient: Vec<GradientConfig>,
    pub format: OutputFormat,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        let gradient = [Method::GradientDescent, Method::momentum(), Method::adam()]
            .into_iter()
            .map(|method| GradientConfig::new(method).with_steps(1200))
            .collect();
        Self {
            seed: None,
            items: vec![3.0, 7.0, 10.0, 2.0, 8.0, 4.0, 1.0, 20.0, -10.0],
            hill_climb: HillClimbConfig::new(20.0),
            gradient,
            format: OutputFormat::Text,
        }
    }
}

impl RunnerConfig {
    /// Load from the environment: file first, then single-field overrides.
    pub fn load() -> OaResult<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(
            std::env::var(SEED_ENV).ok().as_deref(),
            std::env::var(FORMAT_ENV).ok().as_deref(),
        )?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> OaResult<Self> {
        let path = path.as_ref();
        tracing::info!("Loading configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn apply_overrides(&mut self, seed: Option<&str>, format: Option<&str>) -> OaResult<()> {
        if let Some(raw) = seed {
            let seed = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| config_error!("{SEED_ENV}={raw:?} is not a u64: {e}"))?;
            self.seed = Some(seed);
        }
        if let Some(raw) = format {
            self.format = raw.parse().map_err(|e| config_error!("{FORMAT_ENV}: {e}"))?;
        }
        Ok(())
    }

    /// Reject configurations the runner cannot execute as a whole.
    ///
    /// Per-run argument checks stay with the optimizers themselves.
    pub fn validate(&self) -> OaResult<()> {
        if self.items.is_empty() {
            return Err(config_error!("items must not be empty"));
        }
        if let Some(bad) = self.items.iter().find(|v| !v.is_finite()) {
            return Err(config_error!("items must be finite, found {bad}"));
        }
        if self.gradient.is_empty() {
            tracing::warn!("No gradient runs configured");
        }
        Ok(())
    }
}
