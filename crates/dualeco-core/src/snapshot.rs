//! Per-step observation of the economy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dualeco_ledger::SectorTotals;
use dualeco_types::{Flows, Sector, Stocks};

/// Aggregate state of the economy at the close of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Step that produced this snapshot.
    pub step: u64,
    /// Closing stocks per sector.
    pub stocks: BTreeMap<Sector, Stocks>,
    /// Flows of the step per sector.
    pub flows: BTreeMap<Sector, Flows>,
    /// Value of firms' inventories at unit cost.
    pub inventories: f64,
    /// Households with a job (entrepreneurs included).
    pub employed: u32,
    /// Households without a job.
    pub unemployed: u32,
    /// Hires made by the labor market this step.
    pub hires: u32,
    /// Vacancy rate seen by job seekers this step.
    pub vacancy_rate: f64,
    /// Units produced.
    pub output: f64,
    /// Units sold to households.
    pub units_sold: f64,
    /// Loan demand submitted to banks.
    pub credit_requested: f64,
    /// Loans granted.
    pub credit_granted: f64,
    /// Requests denied because a bank hit its ceiling.
    pub denied_at_ceiling: u32,
    /// Loans written off.
    pub defaults: f64,
    /// Bonds issued by the government.
    pub bonds_issued: f64,
    /// Transactions recorded in the journal.
    pub transactions: usize,
}

impl Snapshot {
    /// The snapshot's stocks and flows as sector totals.
    pub fn totals(&self) -> SectorTotals {
        SectorTotals {
            stocks: self.stocks.clone(),
            flows: self.flows.clone(),
            inventories: self.inventories,
        }
    }

    /// Unemployment rate over the labor force.
    pub fn unemployment_rate(&self) -> f64 {
        let force = f64::from(self.employed) + f64::from(self.unemployed);
        if force > 0.0 {
            f64::from(self.unemployed) / force
        } else {
            0.0
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        let mut stocks = BTreeMap::new();
        stocks.insert(
            Sector::Household,
            Stocks {
                cash: 12.0,
                deposits: 30.0,
                ..Stocks::default()
            },
        );
        Snapshot {
            step: 3,
            stocks,
            flows: BTreeMap::new(),
            inventories: 4.5,
            employed: 90,
            unemployed: 10,
            hires: 2,
            vacancy_rate: 0.05,
            output: 120.0,
            units_sold: 118.0,
            credit_requested: 10.0,
            credit_granted: 8.0,
            denied_at_ceiling: 1,
            defaults: 0.0,
            bonds_issued: 3.0,
            transactions: 812,
        }
    }

    #[test]
    fn serializes_with_sector_keys() {
        let json = serde_json::to_string(&snapshot()).unwrap();
        assert!(json.contains("\"Household\""));
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot());
    }

    #[test]
    fn unemployment_rate_over_labor_force() {
        assert!((snapshot().unemployment_rate() - 0.1).abs() < 1e-12);
        let totals = snapshot().totals();
        assert!((totals.stocks_of(Sector::Household).deposits - 30.0).abs() < 1e-12);
    }
}
