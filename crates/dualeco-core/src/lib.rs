//! Configuration, population, step cycle and run loop for the DualEco model.
//!
//! This crate turns a calibrated steady state into a running economy:
//! it creates the agents, distributes the steady-state stocks among them
//! and drives the ten-phase step cycle, checking the books after every
//! step.
//!
//! # Modules
//!
//! - [`clock`] -- Step counter with a fixed horizon.
//! - [`config`] -- Configuration loading from `dualeco-config.yaml` into
//!   strongly-typed structs.
//! - [`population`] -- Agent creation and steady-state distribution.
//! - [`step`] -- The ten-phase step cycle and the [`SimulationContext`].
//! - [`snapshot`] -- Per-step [`Snapshot`] of sector totals.
//! - [`runner`] -- Bounded run loop with a [`StepCallback`] hook.
//! - [`error`] -- Error types ([`SetupError`], [`StepError`]).

pub mod clock;
pub mod config;
pub mod error;
pub mod population;
pub mod runner;
pub mod snapshot;
pub mod step;

pub use clock::{ClockError, StepClock};
pub use config::{ConfigError, SimulationConfig};
pub use error::{SetupError, StepError};
pub use population::{Markets, Population, populate};
pub use runner::{NoOpCallback, RunSummary, SnapshotRecorder, StepCallback, log_run_end, run};
pub use snapshot::Snapshot;
pub use step::{SimulationContext, run_step};
