//! Commercial banks: credit rationing, reserves and profit distribution.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dualeco_ledger::{Transaction, primitives};
use dualeco_types::{Accounts, BankId, HouseholdId, Sector};

use crate::config::BehaviorConfig;

/// Why a loan request was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Denial {
    /// The request was not positive.
    NoDemand,
    /// Granting it would exceed the bank's lending ceiling for the step.
    Ceiling,
    /// The borrower has no positive equity to measure leverage against.
    NoEquity,
    /// The acceptance draw failed.
    Draw,
}

/// Outcome of a loan assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LoanDecision {
    /// The full amount is granted at `rate`.
    Granted {
        /// Amount lent.
        amount: f64,
        /// Leverage-scaled loan rate.
        rate: f64,
    },
    /// The request is denied.
    Denied(Denial),
}

impl LoanDecision {
    /// Amount granted (zero when denied).
    pub const fn granted(&self) -> f64 {
        match self {
            Self::Granted { amount, .. } => *amount,
            Self::Denied(_) => 0.0,
        }
    }
}

/// A commercial bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    /// Population index.
    pub id: BankId,
    /// Stocks and period flows.
    pub accounts: Accounts,
    /// The household that owns the bank.
    pub owner: HouseholdId,
    /// Loans granted during the current step.
    pub lent: f64,
    /// Profit of the current step.
    pub profit: f64,
}

impl Bank {
    /// Create a bank with empty accounts.
    pub fn new(id: BankId, owner: HouseholdId) -> Self {
        Self {
            id,
            accounts: Accounts::new(Sector::Bank),
            owner,
            lent: 0.0,
            profit: 0.0,
        }
    }

    /// Clear per-step counters.
    pub const fn open_step(&mut self) {
        self.lent = 0.0;
    }

    /// Maximum new lending in one step: `kappa_E` times equity.
    pub fn credit_ceiling(&self, config: &BehaviorConfig) -> f64 {
        (config.kappa_e * self.accounts.stocks.equity).max(0.0)
    }

    /// Lending capacity left in the current step.
    pub fn remaining_credit(&self, config: &BehaviorConfig) -> f64 {
        (self.credit_ceiling(config) - self.lent).max(0.0)
    }

    /// Decide on a loan request of `demand` from a firm with `firm_equity`.
    ///
    /// The ceiling is checked first and denies without drawing. Otherwise
    /// the request is granted with probability `exp(-gamma_L lambda)`,
    /// where `lambda = demand / firm_equity`, at rate
    /// `r_L (1 + beta_L lambda)`. A grant counts towards the ceiling.
    pub fn assess_loan<R: Rng + ?Sized>(
        &mut self,
        demand: f64,
        firm_equity: f64,
        config: &BehaviorConfig,
        rng: &mut R,
    ) -> LoanDecision {
        if demand <= 0.0 || !demand.is_finite() {
            return LoanDecision::Denied(Denial::NoDemand);
        }
        if self.lent + demand > self.credit_ceiling(config) {
            debug!(bank = %self.id, demand, lent = self.lent, "Loan denied at ceiling");
            return LoanDecision::Denied(Denial::Ceiling);
        }
        if firm_equity <= 0.0 {
            return LoanDecision::Denied(Denial::NoEquity);
        }
        let leverage = demand / firm_equity;
        let probability = (-config.gamma_l * leverage).exp();
        let draw: f64 = rng.random();
        if draw >= probability {
            return LoanDecision::Denied(Denial::Draw);
        }
        self.lent += demand;
        LoanDecision::Granted {
            amount: demand,
            rate: config.r_l * (1.0 + config.beta_l * leverage),
        }
    }

    /// Reserves above (positive) or below (negative) `kappa_R` deposits.
    pub fn reserve_gap(&self, config: &BehaviorConfig) -> f64 {
        self.accounts.stocks.cash - config.kappa_r * self.accounts.stocks.deposits
    }

    /// Compute the step's profit from interest margins and write-offs.
    pub fn compute_profit(&mut self) -> f64 {
        let flows = &self.accounts.flows;
        self.profit = flows.interest_loans + flows.interest_bonds
            - flows.interest_deposits
            - flows.interest_advances
            - flows.defaults;
        self.profit
    }

    /// Pay `tau` on positive profit, truncated to cash on hand.
    pub fn pay_profit_tax(
        &mut self,
        config: &BehaviorConfig,
        government: &mut Accounts,
    ) -> Option<Transaction> {
        let due = if self.profit > 0.0 {
            config.tau * self.profit
        } else {
            0.0
        };
        let tax = due.min(self.accounts.stocks.cash);
        (tax > 0.0).then(|| primitives::pay_taxes(tax, &mut self.accounts, government))
    }

    /// Pay `rho` of after-tax profit to the owner, truncated to cash.
    pub fn pay_dividend(
        &mut self,
        config: &BehaviorConfig,
        owner: &mut Accounts,
    ) -> Option<Transaction> {
        let due = (config.rho * (self.profit - self.accounts.flows.taxes)).max(0.0);
        let dividend = due.min(self.accounts.stocks.cash);
        (dividend > 0.0).then(|| primitives::pay_dividends(dividend, &mut self.accounts, owner))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{RngCore, SeedableRng};

    use super::*;

    /// Draws zero forever, so every probabilistic test passes.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
    }

    fn bank(equity: f64) -> Bank {
        let mut b = Bank::new(BankId::new(0), HouseholdId::new(0));
        b.accounts.stocks.equity = equity;
        b
    }

    #[test]
    fn loan_decision_serializes_by_variant() {
        let granted = LoanDecision::Granted {
            amount: 25.0,
            rate: 0.05,
        };
        let json = serde_json::to_string(&granted).unwrap();
        assert_eq!(json, r#"{"Granted":{"amount":25.0,"rate":0.05}}"#);
        let denied: LoanDecision = serde_json::from_str(r#"{"Denied":"Ceiling"}"#).unwrap();
        assert_eq!(denied, LoanDecision::Denied(Denial::Ceiling));
    }

    #[test]
    fn accepted_loan_carries_leverage_markup() {
        let config = BehaviorConfig {
            kappa_e: 0.5,
            r_l: 0.04,
            beta_l: 0.5,
            ..BehaviorConfig::default()
        };
        let mut b = bank(300.0);
        let decision = b.assess_loan(25.0, 100.0, &config, &mut ZeroRng);
        match decision {
            LoanDecision::Granted { amount, rate } => {
                assert!((amount - 25.0).abs() < 1e-12);
                // 0.04 * (1 + 0.5 * 0.25)
                assert!((rate - 0.045).abs() < 1e-12);
            }
            LoanDecision::Denied(reason) => panic!("denied: {reason:?}"),
        }
        assert!((b.lent - 25.0).abs() < 1e-12);
    }

    #[test]
    fn ceiling_denies_without_drawing() {
        let config = BehaviorConfig::default();
        let mut b = bank(10.0);
        // Ceiling is 5.
        let decision = b.assess_loan(6.0, 1000.0, &config, &mut ZeroRng);
        assert_eq!(decision, LoanDecision::Denied(Denial::Ceiling));
        assert!(b.lent.abs() < 1e-12);
    }

    #[test]
    fn granted_loans_never_exceed_the_ceiling() {
        let config = BehaviorConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);
        for equity in [10.0, 150.0, 300.0] {
            let mut b = bank(equity);
            let mut total = 0.0;
            for request in [5.0, 50.0, 1.0, 30.0, 80.0, 12.0, 0.5, 70.0] {
                total += b.assess_loan(request, 500.0, &config, &mut rng).granted();
            }
            assert!(total <= config.kappa_e * equity + 1e-9);
        }
    }

    #[test]
    fn highly_leveraged_firms_are_refused() {
        let config = BehaviorConfig::default();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut b = bank(1.0e9);
        for _ in 0..20 {
            let decision = b.assess_loan(50_000.0, 50.0, &config, &mut rng);
            assert_eq!(decision, LoanDecision::Denied(Denial::Draw));
        }
    }

    #[test]
    fn firms_without_equity_are_refused() {
        let config = BehaviorConfig::default();
        let mut b = bank(100.0);
        let decision = b.assess_loan(1.0, 0.0, &config, &mut ZeroRng);
        assert_eq!(decision, LoanDecision::Denied(Denial::NoEquity));
    }

    #[test]
    fn profit_is_the_interest_margin() {
        let mut b = bank(10.0);
        b.accounts.flows.interest_loans = 5.0;
        b.accounts.flows.interest_bonds = 2.0;
        b.accounts.flows.interest_deposits = 1.0;
        b.accounts.flows.defaults = 3.0;
        assert!((b.compute_profit() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn reserve_gap_measures_excess_reserves() {
        let config = BehaviorConfig::default();
        let mut b = bank(10.0);
        b.accounts.stocks.cash = 15.0;
        b.accounts.stocks.deposits = 100.0;
        assert!((b.reserve_gap(&config) - 5.0).abs() < 1e-12);
    }
}
