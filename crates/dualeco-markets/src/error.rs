//! Error types for the dualeco-markets crate.
//!
//! Failing to find a job, a supplier or a loan is an ordinary market
//! outcome and is reported in the return value. Errors only signal a
//! relation that points at an agent outside the population.

use dualeco_types::{BankId, FirmId, HouseholdId};

/// Errors raised while a market walks its relations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketError {
    /// A relation refers to a household that does not exist.
    #[error("market refers to unknown household {0}")]
    UnknownHousehold(HouseholdId),

    /// A relation refers to a firm that does not exist.
    #[error("market refers to unknown firm {0}")]
    UnknownFirm(FirmId),

    /// A relation refers to a bank that does not exist.
    #[error("market refers to unknown bank {0}")]
    UnknownBank(BankId),
}
