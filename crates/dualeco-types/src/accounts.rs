//! Per-agent stock and flow records.
//!
//! Every agent owns one [`Accounts`] value. Fields hold magnitudes; the
//! balance-sheet role of a field (asset or liability, income or outlay) is
//! derived from the agent's [`Sector`] through [`Stock::sign`] and
//! [`Flow::sign`]. Ledger primitives are the only code that mutates these
//! records during a run.

use serde::{Deserialize, Serialize};

use crate::enums::{Flow, Sector, Stock};

/// Balance-sheet stocks of one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stocks {
    /// Cash (`M`).
    pub cash: f64,
    /// Central bank advances (`A`).
    pub advances: f64,
    /// Deposits (`D`).
    pub deposits: f64,
    /// Government bonds (`B`).
    pub bonds: f64,
    /// Loans (`L`).
    pub loans: f64,
    /// Equity (`E`).
    pub equity: f64,
}

impl Stocks {
    /// Read one stock.
    pub const fn get(&self, stock: Stock) -> f64 {
        match stock {
            Stock::Cash => self.cash,
            Stock::Advances => self.advances,
            Stock::Deposits => self.deposits,
            Stock::Bonds => self.bonds,
            Stock::Loans => self.loans,
            Stock::Equity => self.equity,
        }
    }

    /// Mutable access to one stock.
    pub const fn get_mut(&mut self, stock: Stock) -> &mut f64 {
        match stock {
            Stock::Cash => &mut self.cash,
            Stock::Advances => &mut self.advances,
            Stock::Deposits => &mut self.deposits,
            Stock::Bonds => &mut self.bonds,
            Stock::Loans => &mut self.loans,
            Stock::Equity => &mut self.equity,
        }
    }

    /// Signed sum of all stocks for a sector: assets minus liabilities.
    pub fn net_worth(&self, sector: Sector) -> f64 {
        Stock::ALL
            .iter()
            .map(|stock| stock.sign(sector) * self.get(*stock))
            .sum()
    }

    /// Field-wise sum of two stock records.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        Self {
            cash: self.cash + other.cash,
            advances: self.advances + other.advances,
            deposits: self.deposits + other.deposits,
            bonds: self.bonds + other.bonds,
            loans: self.loans + other.loans,
            equity: self.equity + other.equity,
        }
    }

    /// Field-wise difference `self - other`.
    #[must_use]
    pub fn minus(&self, other: &Self) -> Self {
        Self {
            cash: self.cash - other.cash,
            advances: self.advances - other.advances,
            deposits: self.deposits - other.deposits,
            bonds: self.bonds - other.bonds,
            loans: self.loans - other.loans,
            equity: self.equity - other.equity,
        }
    }

    /// Every stock multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            cash: self.cash * factor,
            advances: self.advances * factor,
            deposits: self.deposits * factor,
            bonds: self.bonds * factor,
            loans: self.loans * factor,
            equity: self.equity * factor,
        }
    }
}

/// Period flows of one agent, reset at the start of every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Flows {
    /// Consumption (households) or sales (firms).
    pub consumption: f64,
    /// Wages.
    pub wages: f64,
    /// Public transfers.
    pub transfers: f64,
    /// Taxes.
    pub taxes: f64,
    /// Interest on advances.
    pub interest_advances: f64,
    /// Bond coupons.
    pub interest_bonds: f64,
    /// Interest on loans.
    pub interest_loans: f64,
    /// Interest on deposits.
    pub interest_deposits: f64,
    /// Dividends.
    pub dividends: f64,
    /// Central bank profit transfer.
    pub profits: f64,
    /// Loans written off.
    pub defaults: f64,
}

impl Flows {
    /// Read one flow.
    pub const fn get(&self, flow: Flow) -> f64 {
        match flow {
            Flow::Consumption => self.consumption,
            Flow::Wages => self.wages,
            Flow::Transfers => self.transfers,
            Flow::Taxes => self.taxes,
            Flow::InterestAdvances => self.interest_advances,
            Flow::InterestBonds => self.interest_bonds,
            Flow::InterestLoans => self.interest_loans,
            Flow::InterestDeposits => self.interest_deposits,
            Flow::Dividends => self.dividends,
            Flow::Profits => self.profits,
            Flow::Defaults => self.defaults,
        }
    }

    /// Mutable access to one flow.
    pub const fn get_mut(&mut self, flow: Flow) -> &mut f64 {
        match flow {
            Flow::Consumption => &mut self.consumption,
            Flow::Wages => &mut self.wages,
            Flow::Transfers => &mut self.transfers,
            Flow::Taxes => &mut self.taxes,
            Flow::InterestAdvances => &mut self.interest_advances,
            Flow::InterestBonds => &mut self.interest_bonds,
            Flow::InterestLoans => &mut self.interest_loans,
            Flow::InterestDeposits => &mut self.interest_deposits,
            Flow::Dividends => &mut self.dividends,
            Flow::Profits => &mut self.profits,
            Flow::Defaults => &mut self.defaults,
        }
    }

    /// Signed sum of all flows for a sector: sources minus uses of funds.
    pub fn net_income(&self, sector: Sector) -> f64 {
        Flow::ALL
            .iter()
            .map(|flow| flow.sign(sector) * self.get(*flow))
            .sum()
    }

    /// Field-wise sum of two flow records.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        let mut out = *self;
        for flow in Flow::ALL {
            *out.get_mut(flow) += other.get(flow);
        }
        out
    }

    /// Every flow multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = *self;
        for flow in Flow::ALL {
            *out.get_mut(flow) *= factor;
        }
        out
    }
}

/// A field of an [`Accounts`] record touched by a ledger posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    /// A balance-sheet stock.
    Stock(Stock),
    /// A period flow.
    Flow(Flow),
}

impl Field {
    /// Accounting sign of the field for a sector.
    pub const fn sign(self, sector: Sector) -> f64 {
        match self {
            Self::Stock(stock) => stock.sign(sector),
            Self::Flow(flow) => flow.sign(sector),
        }
    }

    /// Short label used in anomaly reports.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Stock(stock) => stock.symbol(),
            Self::Flow(flow) => flow.symbol(),
        }
    }
}

/// The complete accounting record of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accounts {
    /// Institutional sector of the owning agent.
    pub sector: Sector,
    /// Balance-sheet stocks.
    pub stocks: Stocks,
    /// Flows accrued during the current step.
    pub flows: Flows,
}

impl Accounts {
    /// Create an empty record for a sector.
    pub fn new(sector: Sector) -> Self {
        Self {
            sector,
            stocks: Stocks::default(),
            flows: Flows::default(),
        }
    }

    /// Read one field.
    pub const fn get(&self, field: Field) -> f64 {
        match field {
            Field::Stock(stock) => self.stocks.get(stock),
            Field::Flow(flow) => self.flows.get(flow),
        }
    }

    /// Add `delta` to one field.
    pub fn add(&mut self, field: Field, delta: f64) {
        match field {
            Field::Stock(stock) => *self.stocks.get_mut(stock) += delta,
            Field::Flow(flow) => *self.flows.get_mut(flow) += delta,
        }
    }

    /// Liquid funds available for payments: cash plus deposits.
    pub fn liquidity(&self) -> f64 {
        self.stocks.cash + self.stocks.deposits
    }

    /// Clear all period flows.
    pub fn reset_flows(&mut self) {
        self.flows = Flows::default();
    }

    /// Signed financial net worth for this agent's sector.
    pub fn net_worth(&self) -> f64 {
        self.stocks.net_worth(self.sector)
    }

    /// Signed net income of the current period.
    pub fn net_income(&self) -> f64 {
        self.flows.net_income(self.sector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn firm_net_worth_subtracts_loans_and_equity() {
        let mut firm = Accounts::new(Sector::Firm);
        firm.stocks.deposits = 100.0;
        firm.stocks.cash = 20.0;
        firm.stocks.loans = 50.0;
        firm.stocks.equity = 40.0;
        assert_close(firm.net_worth(), 30.0);
    }

    #[test]
    fn central_bank_money_counts_against_net_worth() {
        let mut cb = Accounts::new(Sector::CentralBank);
        cb.stocks.cash = 80.0;
        cb.stocks.bonds = 60.0;
        cb.stocks.advances = 20.0;
        assert_close(cb.net_worth(), 0.0);
    }

    #[test]
    fn household_net_income_nets_consumption_and_taxes() {
        let mut h = Accounts::new(Sector::Household);
        h.flows.wages = 10.0;
        h.flows.dividends = 2.0;
        h.flows.taxes = 3.0;
        h.flows.consumption = 8.0;
        assert_close(h.net_income(), 1.0);
    }

    #[test]
    fn add_routes_to_the_right_field() {
        let mut bank = Accounts::new(Sector::Bank);
        bank.add(Field::Stock(Stock::Loans), 25.0);
        bank.add(Field::Flow(Flow::InterestLoans), 1.5);
        assert_close(bank.stocks.loans, 25.0);
        assert_close(bank.get(Field::Flow(Flow::InterestLoans)), 1.5);
        bank.reset_flows();
        assert_close(bank.flows.interest_loans, 0.0);
        assert_close(bank.stocks.loans, 25.0);
    }

    #[test]
    fn stock_arithmetic_is_fieldwise() {
        let a = Stocks {
            cash: 1.0,
            deposits: 2.0,
            ..Stocks::default()
        };
        let b = a.scaled(3.0).minus(&a).plus(&a);
        assert_close(b.cash, 3.0);
        assert_close(b.deposits, 6.0);
    }
}
