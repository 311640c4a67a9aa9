//! Block 2: banks.
//!
//! Loans, deposits and advances are taken as given (from the firm block and
//! the household deposit ratio). Bank equity is a fixed share of risky
//! assets and reserves a fixed share of deposits; bonds are the residual
//! that closes the bank's own column:
//!
//! ```text
//! [Pi, T, Pi_d, E, B, M]
//!   Pi - zeta_1 r_B B                 = zeta_1 (r_L L - r_D D - r_A A)
//!   tau Pi - T                        = 0
//!   rho Pi - rho T - Pi_d             = 0
//!   E - theta_E B                     = theta_E L
//!   M                                 = kappa_R D
//!   Pi - T - Pi_d - zeta_2 (B + M - E) = zeta_2 (L - D - A)
//! ```
//!
//! The system is linear in `(L, D, A)`, so [`solve_bank`] is also used to
//! size each individual bank when the population is created.

use tracing::debug;

use crate::firms::FirmBlock;
use crate::params::ParamMap;
use crate::{Block, CalibrationError, Growth, solve_block};

/// Rates and ratios that drive the bank block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BankPolicy {
    /// Growth factors.
    pub growth: Growth,
    /// Profit tax rate.
    pub tau: f64,
    /// Dividend payout ratio.
    pub rho: f64,
    /// Equity over risky assets (loans plus bonds).
    pub theta_e: f64,
    /// Reserve requirement over deposits.
    pub kappa_r: f64,
    /// Loan rate.
    pub r_l: f64,
    /// Deposit rate.
    pub r_d: f64,
    /// Bond rate.
    pub r_b: f64,
    /// Advance rate.
    pub r_a: f64,
}

impl BankPolicy {
    /// Read the policy from the parameters.
    pub fn from_params(params: &ParamMap) -> Result<Self, CalibrationError> {
        Ok(Self {
            growth: Growth::from_params(params)?,
            tau: params.policy("tau")?,
            rho: params.policy("rho")?,
            theta_e: params.policy("theta_E")?,
            kappa_r: params.policy("kappa_R")?,
            r_l: params.policy("r_L")?,
            r_d: params.policy("r_D")?,
            r_b: params.policy("r_B")?,
            r_a: params.policy("r_A")?,
        })
    }
}

/// Steady-state balance sheet and income of a bank (or of all banks).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BankAggregates {
    /// Loans to firms (`L_B`).
    pub loans: f64,
    /// Deposits owed to clients (`D_B`).
    pub deposits: f64,
    /// Advances owed to the central bank (`A_B`).
    pub advances: f64,
    /// Profits (`Pi_B`).
    pub profits: f64,
    /// Profit taxes (`T_B`).
    pub taxes: f64,
    /// Dividends paid to owners (`Pi_dB`).
    pub dividends: f64,
    /// Owner equity (`E_B`).
    pub equity: f64,
    /// Government bonds held (`B_B`).
    pub bonds: f64,
    /// Reserves held as cash (`M_B`).
    pub reserves: f64,
    /// Interest earned on loans (`iota_LB`).
    pub interest_loans: f64,
    /// Interest paid on deposits (`iota_DB`).
    pub interest_deposits: f64,
    /// Interest earned on bonds (`iota_BB`).
    pub interest_bonds: f64,
    /// Interest paid on advances (`iota_AB`).
    pub interest_advances: f64,
}

/// Solve the bank block for given loans, deposits and advances.
pub fn solve_bank(
    policy: &BankPolicy,
    loans: f64,
    deposits: f64,
    advances: f64,
) -> Result<BankAggregates, CalibrationError> {
    let BankPolicy {
        growth: Growth { zeta_1, zeta_2, .. },
        tau,
        rho,
        theta_e,
        kappa_r,
        r_l,
        r_d,
        r_b,
        r_a,
    } = *policy;

    let [profits, taxes, dividends, equity, bonds, reserves] = solve_block(
        Block::Banks,
        ["Pi_B", "T_B", "Pi_dB", "E_B", "B_B", "M_B"],
        [
            [1.0, 0.0, 0.0, 0.0, -zeta_1 * r_b, 0.0],
            [tau, -1.0, 0.0, 0.0, 0.0, 0.0],
            [rho, -rho, -1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, -theta_e, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
            [1.0, -1.0, -1.0, zeta_2, -zeta_2, -zeta_2],
        ],
        [
            zeta_1 * (r_l * loans - r_d * deposits - r_a * advances),
            0.0,
            0.0,
            theta_e * loans,
            kappa_r * deposits,
            zeta_2 * (loans - deposits - advances),
        ],
    )?;

    Ok(BankAggregates {
        loans,
        deposits,
        advances,
        profits,
        taxes,
        dividends,
        equity,
        bonds,
        reserves,
        interest_loans: zeta_1 * r_l * loans,
        interest_deposits: zeta_1 * r_d * deposits,
        interest_bonds: zeta_1 * r_b * bonds,
        interest_advances: zeta_1 * r_a * advances,
    })
}

/// Solution of the bank block for the whole banking sector.
#[derive(Debug, Clone, PartialEq)]
pub struct BankBlock {
    /// Policy used for the aggregate and for per-bank re-solves.
    pub policy: BankPolicy,
    /// Public employees' wage bill (`W_G`).
    pub public_wages: f64,
    /// Household deposits (`D_H`), a fixed share of wage income.
    pub household_deposits: f64,
    /// Sector aggregates.
    pub aggregate: BankAggregates,
}

impl BankBlock {
    /// Solve the banking sector on top of the firm block.
    pub fn solve(params: &ParamMap, firms: &FirmBlock) -> Result<Self, CalibrationError> {
        let policy = BankPolicy::from_params(params)?;
        let public_wages = params.policy("w_G")? * f64::from(params.count_or_zero("N_WG")?);
        let household_deposits = params.policy("theta_D")? * (firms.wage_bill() + public_wages);
        let loans = firms.loans();
        let deposits = firms.deposits() + household_deposits;
        let aggregate = solve_bank(&policy, loans, deposits, 0.0)?;

        debug!(
            loans,
            deposits,
            bonds = aggregate.bonds,
            equity = aggregate.equity,
            "Bank sector calibrated"
        );
        Ok(Self {
            policy,
            public_wages,
            household_deposits,
            aggregate,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn closes_column(policy: &BankPolicy, bank: &BankAggregates) {
        let income = bank.interest_loans + bank.interest_bonds
            - bank.interest_deposits
            - bank.interest_advances
            - bank.taxes
            - bank.dividends;
        let worth = bank.reserves + bank.bonds + bank.loans
            - bank.deposits
            - bank.advances
            - bank.equity;
        assert_close(income, policy.growth.zeta_2 * worth);
    }

    #[test]
    fn aggregate_bank_closes_its_column() {
        let params = ParamMap::baseline();
        let firms = FirmBlock::solve(&params).unwrap();
        let block = BankBlock::solve(&params, &firms).unwrap();
        let bank = block.aggregate;
        closes_column(&block.policy, &bank);
        assert_close(bank.reserves, 0.1 * bank.deposits);
        assert_close(bank.equity, 0.1 * (bank.loans + bank.bonds));
        assert!(bank.bonds > 0.0);
    }

    #[test]
    fn household_deposits_follow_wage_income() {
        let params = ParamMap::baseline();
        let firms = FirmBlock::solve(&params).unwrap();
        let block = BankBlock::solve(&params, &firms).unwrap();
        // theta_D (100 + 25 + 30)
        assert_close(block.household_deposits, 155.0);
        assert_close(block.aggregate.deposits, 155.0 + firms.deposits());
    }

    #[test]
    fn per_bank_solutions_add_up() {
        let params = ParamMap::baseline();
        let policy = BankPolicy::from_params(&params).unwrap();
        let whole = solve_bank(&policy, 30.0, 200.0, 0.0).unwrap();
        let first = solve_bank(&policy, 10.0, 120.0, 0.0).unwrap();
        let second = solve_bank(&policy, 20.0, 80.0, 0.0).unwrap();
        closes_column(&policy, &first);
        closes_column(&policy, &second);
        assert_close(first.bonds + second.bonds, whole.bonds);
        assert_close(first.profits + second.profits, whole.profits);
        assert_close(first.equity + second.equity, whole.equity);
    }
}
