//! rtt-sim
//!
//! Drives an [`RttEstimator`] with a go-back-N sender over a simulated link
//! that adds delay and jitter, drops segments and congestion-marks them.
//!
//! Usage: `rtt-sim [config.json5]` (see `demo.json5`)
//!
//! Environment variables:
//! - RTT_SIM_LOG: tracing filter, e.g. `debug` or `rtt_estimator=trace` (default `info`)

mod link;
mod sim;

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use rtt_estimator::estimator::SmoothingAlgorithm;
use rtt_estimator::{AlgorithmConfig, ConfigError, EstimatorConfig, RttEstimator};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::link::{Link, LinkConfig};
use crate::sim::Simulation;

/// Upper bound on simulated time.
const TIME_LIMIT: Duration = Duration::from_secs(24 * 3600);

#[derive(Debug, Error)]
enum SimError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing config: {0}")]
    Parse(#[from] json5::Error),

    #[error("invalid estimator config: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SimConfig {
    segments: u32,
    window: u32,
    link: LinkConfig,
    estimator: EstimatorConfig,
    algorithm: AlgorithmConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            segments: 1000,
            window: 8,
            link: LinkConfig::default(),
            estimator: EstimatorConfig::default(),
            algorithm: AlgorithmConfig::default(),
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SimConfig, SimError> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(json5::from_str(&text)?)
        }
        None => Ok(SimConfig::default()),
    }
}

fn run(path: Option<&Path>) -> Result<(), SimError> {
    let config = load_config(path)?;
    let rtt = RttEstimator::from_config(config.estimator, &config.algorithm)?;
    info!(
        segments = config.segments,
        window = config.window,
        algorithm = rtt.algorithm().name(),
        "starting transfer"
    );

    let mut sim = Simulation::new(rtt, Link::new(config.link), config.segments, config.window);
    let report = sim.run(TIME_LIMIT);
    sim::log_report(sim.estimator(), &report);
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("RTT_SIM_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let path = std::env::args_os().nth(1);
    match run(path.as_deref().map(Path::new)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
