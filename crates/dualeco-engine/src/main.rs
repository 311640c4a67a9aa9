//! Command-line runner for the DualEco model.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `dualeco-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Calibrate the steady state, check its accounting matrices and
//!    create the population and market relations
//! 4. Run the step loop until the configured horizon
//! 5. Log the result

mod error;
mod series_callback;

use std::path::Path;

use anyhow::Context as _;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dualeco_core::config::{LoggingConfig, SimulationConfig};
use dualeco_core::{SimulationContext, log_run_end, run};
use dualeco_types::RunId;

use crate::error::EngineError;
use crate::series_callback::SeriesCallback;

const CONFIG_PATH: &str = "dualeco-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the steady state
/// cannot be calibrated or does not close, or a step fails.
fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    let run_id = RunId::new();
    info!(
        %run_id,
        name = config.simulation.name,
        seed = config.simulation.seed,
        steps = config.simulation.steps,
        "dualeco-engine starting"
    );

    // 3. Calibrate, check and create the economy.
    let mut ctx = SimulationContext::new(&config)
        .map_err(EngineError::from)
        .with_context(|| format!("setup failed for {}", config.parameters()))?;
    info!(
        %run_id,
        households = ctx.population.households.len(),
        firms = ctx.population.firms.len(),
        banks = ctx.population.banks.len(),
        "Economy ready"
    );

    // 4. Run.
    let mut callback = SeriesCallback::new(run_id);
    let summary = run(
        &mut ctx,
        &mut callback,
        config.logging.summary_interval_steps,
    )
    .map_err(EngineError::from)?;

    // 5. Log results.
    log_run_end(&summary);
    info!(
        %run_id,
        peak_unemployment = callback.peak_unemployment,
        credit_granted = callback.credit_granted,
        defaults = callback.defaults,
        denied_at_ceiling = callback.denied_at_ceiling,
        "dualeco-engine shutdown complete"
    );
    Ok(())
}

/// Load the run configuration from `dualeco-config.yaml`.
///
/// Looks for the file relative to the current working directory.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        Ok(SimulationConfig::default())
    }
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
