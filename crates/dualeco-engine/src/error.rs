//! Error types for the DualEco engine binary.
//!
//! [`EngineError`] wraps every failure mode of a run, from loading the
//! configuration to the last step.

use dualeco_core::{ConfigError, SetupError, StepError};

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Calibration, the steady-state check or population setup failed.
    #[error("setup error: {source}")]
    Setup {
        /// The underlying setup error.
        #[from]
        source: SetupError,
    },

    /// A step failed.
    #[error("step error: {source}")]
    Step {
        /// The underlying step error.
        #[from]
        source: StepError,
    },
}
