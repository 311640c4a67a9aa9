//! Households: workers, entrepreneurs, bank owners and the unemployed.
//!
//! A household sells labor, receives wages, doles, dividends and deposit
//! interest, pays income tax, consumes, and splits its savings between
//! cash and a deposit account at its bank.

use rand::Rng;
use serde::{Deserialize, Serialize};

use dualeco_ledger::{Transaction, primitives};
use dualeco_types::{Accounts, BankId, Employer, FirmId, HouseholdId, LaborStatus, Sector};

use crate::config::BehaviorConfig;

/// The firm or bank a household owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ownership {
    /// Residual claimant of a firm (and works there).
    Firm(FirmId),
    /// Residual claimant of a bank.
    Bank(BankId),
}

/// A household and its balance sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    /// Population index.
    pub id: HouseholdId,
    /// Stocks and period flows.
    pub accounts: Accounts,
    /// Labor-market state.
    pub status: LaborStatus,
    /// Current employer, if any.
    pub employer: Option<Employer>,
    /// Wage of the current job (zero when unemployed).
    pub wage: f64,
    /// Lowest wage the household accepts.
    pub reservation_wage: f64,
    /// Deposit bank.
    pub bank: Option<BankId>,
    /// Firm or bank owned, if any.
    pub owns: Option<Ownership>,
    /// Disposable income of the last completed step.
    pub disposable_income: f64,
}

impl Household {
    /// Create a household with empty accounts.
    pub fn new(id: HouseholdId, status: LaborStatus, reservation_wage: f64) -> Self {
        Self {
            id,
            accounts: Accounts::new(Sector::Household),
            status,
            employer: None,
            wage: 0.0,
            reservation_wage,
            bank: None,
            owns: None,
            disposable_income: 0.0,
        }
    }

    /// Whether the household looks for a (better) job this step.
    ///
    /// The unemployed always search; employed workers search while their
    /// wage is below their reservation wage.
    pub fn is_searching(&self) -> bool {
        if !self.status.can_search() {
            return false;
        }
        self.employer.is_none() || self.wage < self.reservation_wage
    }

    /// Take a job.
    pub const fn hire(&mut self, employer: Employer, status: LaborStatus, wage: f64) {
        self.employer = Some(employer);
        self.status = status;
        self.wage = wage;
    }

    /// Lose the current job.
    pub const fn dismiss(&mut self) {
        self.employer = None;
        self.status = LaborStatus::Unemployed;
        self.wage = 0.0;
    }

    /// Revise the reservation wage given the economy-wide vacancy rate.
    ///
    /// An unemployed household lowers its demand with probability
    /// `exp(-upsilon_H v)` (never below the minimum wage); an employed one
    /// raises it with probability `1 - exp(-upsilon_H v)`. Returns whether
    /// the reservation wage changed.
    pub fn adapt_reservation_wage<R: Rng + ?Sized>(
        &mut self,
        vacancy_rate: f64,
        config: &BehaviorConfig,
        rng: &mut R,
    ) -> bool {
        if !self.status.can_search() {
            return false;
        }
        let slack = (-config.upsilon_h * vacancy_rate).exp();
        let draw: f64 = rng.random();
        if self.employer.is_none() {
            if draw < slack {
                let u: f64 = rng.random();
                let lowered = self.reservation_wage * (1.0 - config.delta * u);
                self.reservation_wage = lowered.max(config.w_min);
                return true;
            }
        } else if draw < 1.0 - slack {
            let u: f64 = rng.random();
            self.reservation_wage *= 1.0 + config.delta * u;
            return true;
        }
        false
    }

    /// Consumption budget for this step.
    ///
    /// `alpha_Y` of last step's disposable income plus `alpha_W` of liquid
    /// wealth.
    pub fn desired_consumption(&self, config: &BehaviorConfig) -> f64 {
        let budget = config.alpha_y * self.disposable_income
            + config.alpha_w * self.accounts.liquidity();
        budget.max(0.0)
    }

    /// Cash above the share of liquid wealth kept in hand.
    pub fn excess_cash(&self, config: &BehaviorConfig) -> f64 {
        let target = config.theta_m * self.accounts.liquidity();
        (self.accounts.stocks.cash - target).max(0.0)
    }

    /// Taxable income of the current step.
    pub fn gross_income(&self) -> f64 {
        let flows = &self.accounts.flows;
        flows.wages + flows.interest_deposits + flows.dividends
    }

    /// Income tax due this step.
    pub fn income_tax(&self, config: &BehaviorConfig) -> f64 {
        (config.tau * self.gross_income()).max(0.0)
    }

    /// Pay income tax out of cash, truncated to the cash on hand.
    pub fn pay_income_tax(
        &mut self,
        config: &BehaviorConfig,
        government: &mut Accounts,
    ) -> Option<Transaction> {
        let tax = self.income_tax(config).min(self.accounts.stocks.cash);
        (tax > 0.0).then(|| primitives::pay_taxes(tax, &mut self.accounts, government))
    }

    /// Record this step's disposable income for next step's consumption.
    pub fn close_income(&mut self) {
        let flows = &self.accounts.flows;
        self.disposable_income = flows.wages + flows.transfers + flows.interest_deposits
            + flows.dividends
            - flows.taxes;
    }
}
