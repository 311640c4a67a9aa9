//! Error types for building and stepping a DualEco economy.

use dualeco_calibration::{CalibrationError, ParamError};
use dualeco_ledger::{InvariantViolation, LedgerAnomaly};
use dualeco_markets::MarketError;

use crate::clock::ClockError;
use crate::config::ConfigError;

/// Errors raised while calibrating the economy and creating its population.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The run configuration is invalid.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// A structural parameter is missing or malformed.
    #[error("parameter error: {source}")]
    Parameter {
        /// The underlying parameter error.
        #[from]
        source: ParamError,
    },

    /// Re-solving the bank block for one bank failed.
    #[error("calibration error: {source}")]
    Calibration {
        /// The underlying calibration error.
        #[from]
        source: CalibrationError,
    },

    /// The calibrated aggregates do not pass the sigma check.
    #[error("steady state does not close: {source}")]
    SteadyState {
        /// The failed sigma check.
        source: InvariantViolation,
    },

    /// A sector has workers but no firm to employ them.
    #[error("sector {sector} has {workers} workers but no firms")]
    NoFirms {
        /// Sector index.
        sector: u32,
        /// Workers left without an employer.
        workers: u32,
    },

    /// The initial balance sheets do not close.
    #[error("initial balance sheets are inconsistent: {source}")]
    Inconsistent {
        /// The failed sigma check.
        #[from]
        source: InvariantViolation,
    },
}

/// Errors that abort a step.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// The step clock failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A market relation points at a missing agent.
    #[error("market error at step {step}: {source}")]
    Market {
        /// Step being executed.
        step: u64,
        /// The underlying market error.
        source: MarketError,
    },

    /// The step's transactions do not conserve money.
    #[error("ledger anomaly at step {step}: {source}")]
    Ledger {
        /// Step being closed.
        step: u64,
        /// The conservation failure.
        source: LedgerAnomaly,
    },

    /// The accounting matrices do not close after the step.
    #[error("invariant violation at step {step}: {source}")]
    Invariant {
        /// Step being closed.
        step: u64,
        /// The failed sigma check.
        source: InvariantViolation,
    },
}
