//! Conservation law verification over a step's transactions.
//!
//! For every field F touched during step T, the check is:
//!
//! ```text
//! sum(signed postings for F in T) == 0
//! ```
//!
//! Each primitive writes offsetting postings, so the check passes by
//! construction for well-formed transactions. It exists to catch a
//! primitive edited out of balance or a non-finite amount slipping into
//! the books.

use std::collections::BTreeMap;

use dualeco_types::Field;

use crate::LedgerAnomaly;
use crate::transaction::{BALANCE_TOLERANCE, Transaction};

/// The result of a conservation check for a single step.
#[derive(Debug, Clone, PartialEq)]
pub enum ConservationResult {
    /// Every field nets to zero.
    Balanced,
    /// One or more fields do not net to zero.
    Anomaly(LedgerAnomaly),
}

impl ConservationResult {
    /// Whether the step balanced.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Verify that the signed postings of `transactions` cancel field by field.
pub fn verify_conservation(step: u64, transactions: &[Transaction]) -> ConservationResult {
    let mut net: BTreeMap<Field, f64> = BTreeMap::new();
    let mut volume: BTreeMap<Field, f64> = BTreeMap::new();

    for tx in transactions {
        for (field, imbalance) in tx.imbalances() {
            *net.entry(field).or_insert(0.0) += imbalance;
        }
        for posting in &tx.postings {
            *volume.entry(posting.field).or_insert(0.0) += posting.delta.abs();
        }
    }

    let imbalances: BTreeMap<Field, f64> = net
        .into_iter()
        .filter(|(field, value)| {
            let scale = volume.get(field).copied().unwrap_or(0.0).max(1.0);
            !value.is_finite() || value.abs() > BALANCE_TOLERANCE * scale
        })
        .collect();

    if imbalances.is_empty() {
        return ConservationResult::Balanced;
    }

    let detail: Vec<String> = imbalances
        .iter()
        .map(|(field, value)| format!("{}: {value}", field.symbol()))
        .collect();
    ConservationResult::Anomaly(LedgerAnomaly {
        step,
        message: format!(
            "LEDGER_ANOMALY at step {step}: unbalanced fields [{}]",
            detail.join(", ")
        ),
        imbalances,
    })
}
