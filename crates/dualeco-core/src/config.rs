//! Configuration loading and typed config structures for DualEco runs.
//!
//! The canonical configuration lives in `dualeco-config.yaml` at the
//! project root. It has three sections: `simulation` (run bounds and
//! checks), `parameters` (a flat mapping merged over
//! [`ParamMap::baseline`]) and `logging`. Every field has a default, so an
//! empty file describes the baseline economy.

use std::path::Path;

use serde::Deserialize;

use dualeco_agents::{AgentError, BehaviorConfig};
use dualeco_calibration::{ParamError, ParamMap};

/// Errors that can occur when loading or interpreting configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The configuration is not valid YAML.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// Parser error.
        source: serde_yml::Error,
    },

    /// A behavioral parameter is missing or malformed.
    #[error("invalid parameter: {source}")]
    Parameter {
        /// The underlying parameter error.
        #[from]
        source: ParamError,
    },

    /// A behavioral parameter is out of range.
    #[error("invalid behavior: {source}")]
    Behavior {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level run configuration.
///
/// Mirrors the structure of `dualeco-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Run bounds and consistency checks.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Parameter overrides, merged over the baseline economy.
    #[serde(default)]
    pub parameters: ParamMap,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Read and parse a YAML run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a YAML run configuration document.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// The baseline parameters with this configuration's overrides applied.
    pub fn parameters(&self) -> ParamMap {
        let mut params = ParamMap::baseline();
        params.merge(&self.parameters);
        params
    }
}

/// Run bounds and checks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Human-readable run name.
    #[serde(default = "default_run_name")]
    pub name: String,

    /// Seed of the run's random number generator.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of steps to run.
    #[serde(default = "default_steps")]
    pub steps: u64,

    /// Decimal places used by the sigma checks.
    #[serde(default = "default_precision")]
    pub precision: u32,

    /// Whether to check the accounting matrices after every step.
    #[serde(default = "default_true")]
    pub check_every_step: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: default_run_name(),
            seed: default_seed(),
            steps: default_steps(),
            precision: default_precision(),
            check_every_step: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable ones.
    #[serde(default)]
    pub json: bool,

    /// Log a sector summary every N steps (0 disables).
    #[serde(default = "default_summary_interval_steps")]
    pub summary_interval_steps: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            summary_interval_steps: default_summary_interval_steps(),
        }
    }
}

/// Read the behavioral and policy parameters agents use during a run.
///
/// # Errors
///
/// Returns [`ConfigError::Parameter`] when a key is missing or not a
/// count, and [`ConfigError::Behavior`] when a value is out of range.
pub fn behavior_from_params(params: &ParamMap) -> Result<BehaviorConfig, ConfigError> {
    let config = BehaviorConfig {
        delta: params.value("delta")?,
        upsilon_f: params.value("upsilon_F")?,
        upsilon_h: params.value("upsilon_H")?,
        beta_l: params.value("beta_L")?,
        gamma_l: params.value("gamma_L")?,
        alpha_y: params.value("alpha_Y")?,
        alpha_w: params.value("alpha_W")?,
        theta_m: params.value("theta_M")?,
        theta_w: params.value("theta_W")?,
        theta_y: params.value("theta_y")?,
        kappa_e: params.value("kappa_E")?,
        kappa_r: params.value("kappa_R")?,
        chi_w: params.count("chi_W")?,
        chi_y: params.count("chi_Y")?,
        tau: params.value("tau")?,
        rho: params.value("rho")?,
        markup: params.value("m")?,
        r_d: params.value("r_D")?,
        r_l: params.value("r_L")?,
        r_b: params.value("r_B")?,
        r_a: params.value("r_A")?,
        w_min: params.value("w_min")?,
        kappa_z: params.value("kappa_Z")?,
    };
    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Serde field defaults
// ---------------------------------------------------------------------------

fn default_run_name() -> String {
    "baseline".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_steps() -> u64 {
    100
}

const fn default_precision() -> u32 {
    6
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_summary_interval_steps() -> u64 {
    10
}
