//! Error types for the dualeco-agents crate.
//!
//! Behaviors never fail on economic grounds (a short agent pays what it
//! can). Errors are reserved for invalid configuration and for lookups of
//! agents that do not exist.

use dualeco_types::{BankId, FirmId, HouseholdId};

/// Errors raised by agent construction and lookups.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgentError {
    /// A behavioral parameter is out of range.
    #[error("invalid behavioral parameter {name}: {value}")]
    InvalidParameter {
        /// Canonical parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Household with the given id was not found.
    #[error("household not found: {0}")]
    HouseholdNotFound(HouseholdId),

    /// Firm with the given id was not found.
    #[error("firm not found: {0}")]
    FirmNotFound(FirmId),

    /// Bank with the given id was not found.
    #[error("bank not found: {0}")]
    BankNotFound(BankId),
}
