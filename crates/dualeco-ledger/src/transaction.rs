//! Transaction records and the posting builder.
//!
//! A [`Transaction`] is the trace a ledger primitive leaves behind: its
//! kind, headline amount, and the list of signed [`Posting`]s it applied
//! to the two parties. Postings are applied to the parties' accounts as
//! they are added, so a finished builder always reflects state that has
//! already been written.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dualeco_types::{Accounts, Field, Sector, TransactionKind};

/// Relative tolerance used when checking that postings offset.
pub const BALANCE_TOLERANCE: f64 = 1e-9;

/// One field change on one party.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    /// Sector of the party the posting was applied to.
    pub sector: Sector,
    /// Field that changed.
    pub field: Field,
    /// Raw change applied to the field's magnitude.
    pub delta: f64,
}

impl Posting {
    /// The posting's contribution to its accounting-matrix row.
    pub const fn signed(&self) -> f64 {
        self.field.sign(self.sector) * self.delta
    }
}

/// The record of one executed ledger primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Primitive that produced this transaction.
    pub kind: TransactionKind,
    /// Headline amount (capital plus interest for repayments).
    pub amount: f64,
    /// Every field change, in application order.
    pub postings: Vec<Posting>,
}

impl Transaction {
    /// Signed net effect of the transaction per touched field.
    pub fn imbalances(&self) -> BTreeMap<Field, f64> {
        let mut totals: BTreeMap<Field, f64> = BTreeMap::new();
        for posting in &self.postings {
            *totals.entry(posting.field).or_insert(0.0) += posting.signed();
        }
        totals
    }

    /// Whether every touched field nets to zero across both parties.
    pub fn is_balanced(&self) -> bool {
        let scale = self.amount.abs().max(1.0);
        self.imbalances()
            .values()
            .all(|net| net.is_finite() && net.abs() <= BALANCE_TOLERANCE * scale)
    }
}

/// Builder that applies postings to accounts and records them.
///
/// # Examples
///
/// ```
/// use dualeco_ledger::TransactionBuilder;
/// use dualeco_types::{Accounts, Field, Sector, Stock, TransactionKind};
///
/// let mut household = Accounts::new(Sector::Household);
/// let mut bank = Accounts::new(Sector::Bank);
/// household.stocks.cash = 10.0;
///
/// let tx = TransactionBuilder::new(TransactionKind::MakeDeposits, 4.0)
///     .post(&mut household, Field::Stock(Stock::Deposits), 4.0)
///     .post(&mut household, Field::Stock(Stock::Cash), -4.0)
///     .post(&mut bank, Field::Stock(Stock::Deposits), 4.0)
///     .post(&mut bank, Field::Stock(Stock::Cash), 4.0)
///     .build();
///
/// assert!(tx.is_balanced());
/// assert!((household.stocks.cash - 6.0).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct TransactionBuilder {
    kind: TransactionKind,
    amount: f64,
    postings: Vec<Posting>,
}

impl TransactionBuilder {
    /// Start a transaction of the given kind and headline amount.
    pub const fn new(kind: TransactionKind, amount: f64) -> Self {
        Self {
            kind,
            amount,
            postings: Vec::new(),
        }
    }

    /// Apply `delta` to `field` on `accounts` and record the posting.
    #[must_use]
    pub fn post(mut self, accounts: &mut Accounts, field: Field, delta: f64) -> Self {
        accounts.add(field, delta);
        self.postings.push(Posting {
            sector: accounts.sector,
            field,
            delta,
        });
        self
    }

    /// Finish the transaction.
    pub fn build(self) -> Transaction {
        Transaction {
            kind: self.kind,
            amount: self.amount,
            postings: self.postings,
        }
    }
}
