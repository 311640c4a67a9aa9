//! The government and the central bank.

use serde::{Deserialize, Serialize};

use dualeco_ledger::{Transaction, primitives};
use dualeco_types::{Accounts, Sector};

/// The government: public employer, tax collector and bond issuer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Government {
    /// Stocks and period flows.
    pub accounts: Accounts,
    /// Wage paid to public employees.
    pub wage: f64,
    /// Number of public positions.
    pub positions: u32,
    /// Positions open in the current labor market.
    pub vacancies: u32,
}

impl Government {
    /// Create a government with empty accounts.
    pub fn new(wage: f64, positions: u32) -> Self {
        Self {
            accounts: Accounts::new(Sector::Government),
            wage,
            positions,
            vacancies: 0,
        }
    }

    /// Post vacancies for every unfilled public position.
    pub const fn post_vacancies(&mut self, employed: u32) -> u32 {
        self.vacancies = self.positions.saturating_sub(employed);
        self.vacancies
    }

    /// Bonds to issue so the government's cash balance is not negative.
    pub fn bond_need(&self) -> f64 {
        (-self.accounts.stocks.cash).max(0.0)
    }
}

/// The central bank: issues cash, lends advances and buys residual bonds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralBank {
    /// Stocks and period flows.
    pub accounts: Accounts,
}

impl Default for CentralBank {
    fn default() -> Self {
        Self::new()
    }
}

impl CentralBank {
    /// Create a central bank with empty accounts.
    pub fn new() -> Self {
        Self {
            accounts: Accounts::new(Sector::CentralBank),
        }
    }

    /// Interest earned this step, all of which is owed to the government.
    pub fn profit(&self) -> f64 {
        let flows = &self.accounts.flows;
        flows.interest_advances + flows.interest_bonds
    }

    /// Transfer the step's profit to the government.
    pub fn transfer_profit(&mut self, government: &mut Accounts) -> Option<Transaction> {
        let profit = self.profit();
        (profit > 0.0).then(|| primitives::transfer_profits(profit, &mut self.accounts, government))
    }
}
