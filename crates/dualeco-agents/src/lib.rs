//! Agent records and behaviors for the DualEco model.
//!
//! This crate holds the state of every agent kind and the decisions each
//! agent takes on its own: production planning, consumption planning,
//! reservation-wage adaptation, loan assessment, reserve management and
//! profit distribution. Anything that moves money goes through the ledger
//! primitives; matching between agents lives in `dualeco-markets`.
//!
//! # Modules
//!
//! - [`household`] -- Workers, entrepreneurs, bank owners and the unemployed
//! - [`firm`] -- Formal and informal producers
//! - [`bank`] -- Commercial banks and credit rationing ([`LoanDecision`])
//! - [`public`] -- The government and the central bank
//! - [`config`] -- Behavioral and policy parameters ([`BehaviorConfig`])
//! - [`error`] -- Error types ([`AgentError`])

pub mod bank;
pub mod config;
pub mod error;
pub mod firm;
pub mod household;
pub mod public;

// Re-export primary types at crate root for convenience.
pub use bank::{Bank, Denial, LoanDecision};
pub use config::BehaviorConfig;
pub use error::AgentError;
pub use firm::Firm;
pub use household::{Household, Ownership};
pub use public::{CentralBank, Government};
