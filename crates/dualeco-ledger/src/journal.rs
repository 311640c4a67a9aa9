//! Append-only transaction journal for the current step.
//!
//! The journal collects every [`Transaction`] executed during a step so the
//! conservation law can be verified when the step closes. It is cleared
//! when the next step opens; long-term recording is left to step
//! callbacks.

use std::collections::BTreeMap;

use tracing::debug;

use dualeco_types::TransactionKind;

use crate::conservation::{self, ConservationResult};
use crate::transaction::Transaction;

/// Count and total amount of one transaction kind within a step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KindTotal {
    /// Number of transactions.
    pub count: u64,
    /// Sum of headline amounts.
    pub amount: f64,
}

/// Per-step append-only log of executed transactions.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    step: u64,
    transactions: Vec<Transaction>,
}

impl Journal {
    /// Create an empty journal at step 0.
    pub const fn new() -> Self {
        Self {
            step: 0,
            transactions: Vec::new(),
        }
    }

    /// Discard the previous step's transactions and start `step`.
    pub fn open_step(&mut self, step: u64) {
        debug!(
            step,
            previous = self.transactions.len(),
            "Journal opened for new step"
        );
        self.step = step;
        self.transactions.clear();
    }

    /// Append a transaction to the current step.
    pub fn record(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// The step currently being recorded.
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Transactions recorded so far in the current step.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Number of transactions recorded in the current step.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether no transaction has been recorded in the current step.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Count and volume of each transaction kind in the current step.
    pub fn totals_by_kind(&self) -> BTreeMap<TransactionKind, KindTotal> {
        let mut totals: BTreeMap<TransactionKind, KindTotal> = BTreeMap::new();
        for tx in &self.transactions {
            let total = totals.entry(tx.kind).or_default();
            total.count = total.count.saturating_add(1);
            total.amount += tx.amount;
        }
        totals
    }

    /// Verify the conservation law for the current step.
    pub fn verify_conservation(&self) -> ConservationResult {
        conservation::verify_conservation(self.step, &self.transactions)
    }
}

#[cfg(test)]
mod tests {
    use dualeco_types::{Accounts, Sector};

    use super::*;
    use crate::primitives;

    #[test]
    fn totals_group_by_kind() {
        let mut journal = Journal::new();
        journal.open_step(1);
        let mut gov = Accounts::new(Sector::Government);
        let mut a = Accounts::new(Sector::Household);
        let mut b = Accounts::new(Sector::Household);
        journal.record(primitives::pay_doles(2.0, &mut gov, &mut a));
        journal.record(primitives::pay_doles(3.0, &mut gov, &mut b));
        journal.record(primitives::pay_taxes(1.0, &mut a, &mut gov));

        let totals = journal.totals_by_kind();
        let doles = totals.get(&TransactionKind::PayDoles).copied().unwrap_or_default();
        assert_eq!(doles.count, 2);
        assert!((doles.amount - 5.0).abs() < 1e-12);
        assert_eq!(journal.len(), 3);
        assert!(journal.verify_conservation().is_balanced());
    }

    #[test]
    fn opening_a_step_clears_the_log() {
        let mut journal = Journal::new();
        let mut gov = Accounts::new(Sector::Government);
        let mut h = Accounts::new(Sector::Household);
        journal.record(primitives::pay_doles(2.0, &mut gov, &mut h));
        journal.open_step(2);
        assert!(journal.is_empty());
        assert_eq!(journal.step(), 2);
    }
}
