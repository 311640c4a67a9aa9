//! Ledger primitives and accounting consistency for the DualEco model.
//!
//! Every movement of money between agents goes through one of the
//! primitives in [`primitives`]. A primitive never creates or destroys
//! money: for each field it touches, the signed postings on its two parties
//! cancel. The conservation law is verified when each step closes, and the
//! sigma check over the accounting matrix is the correctness oracle for
//! both the calibrator and the running simulation.
//!
//! # Modules
//!
//! - [`primitives`] -- Atomic bilateral operations (wages, taxes, loans, ...).
//! - [`transaction`] -- [`Transaction`] records and the [`TransactionBuilder`].
//! - [`journal`] -- The per-step append-only [`Journal`].
//! - [`conservation`] -- Conservation law verification and anomaly detection.
//! - [`matrix`] -- Balance-sheet and flow matrices with the sigma check.
//!
//! # Conservation Law
//!
//! For every step T and every field F:
//!
//! ```text
//! sum(sign(F, sector) * delta for postings on F in T) == 0
//! ```
//!
//! A violation produces a [`LedgerAnomaly`].
//!
//! # Usage
//!
//! ```
//! use dualeco_ledger::{Journal, primitives};
//! use dualeco_types::{Accounts, Sector};
//!
//! let mut journal = Journal::new();
//! journal.open_step(1);
//!
//! let mut firm = Accounts::new(Sector::Firm);
//! let mut worker = Accounts::new(Sector::Household);
//! firm.stocks.cash = 20.0;
//!
//! journal.record(primitives::pay_wages(12.0, &mut firm, &mut worker));
//!
//! assert!(journal.verify_conservation().is_balanced());
//! assert!((worker.stocks.cash - 12.0).abs() < 1e-12);
//! ```

pub mod conservation;
pub mod journal;
pub mod matrix;
pub mod primitives;
pub mod transaction;

// Re-export primary types at crate root.
pub use conservation::ConservationResult;
pub use journal::Journal;
pub use matrix::{AccountingMatrix, InvariantViolation, SectorTotals};
pub use transaction::{Posting, Transaction, TransactionBuilder};

use std::collections::BTreeMap;

use dualeco_types::Field;

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A conservation law violation detected when a step closes.
///
/// Captures each field whose signed postings did not cancel.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerAnomaly {
    /// The step where the anomaly was detected.
    pub step: u64,
    /// Net signed imbalance per offending field.
    pub imbalances: BTreeMap<Field, f64>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LedgerAnomaly {}
