//! Shared type definitions for the DualEco model.
//!
//! This crate is the single source of truth for the vocabulary every other
//! crate speaks: agent identifiers, institutional sectors, balance-sheet
//! stock and flow fields, and the per-agent [`Accounts`] record that ledger
//! primitives mutate.
//!
//! # Modules
//!
//! - [`ids`] -- Dense index identifiers for agents and a UUID run id
//! - [`enums`] -- Sectors, stock and flow kinds, labor status, transactions
//! - [`accounts`] -- Stock and flow records plus the accounting sign table

pub mod accounts;
pub mod enums;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use accounts::{Accounts, Field, Flows, Stocks};
pub use enums::{Employer, Flow, LaborStatus, Sector, Segment, Stock, TransactionKind};
pub use ids::{BankId, FirmId, HouseholdId, RunId};
