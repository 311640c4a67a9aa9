//! Block 3: households.
//!
//! Households receive every wage, every dividend, deposit interest and the
//! doles paid to the unemployed. They buy all output, hold the deposits
//! fixed by the bank block and own all firm and bank equity. Cash is the
//! residual:
//!
//! ```text
//! [Y, T, Y_d, M]
//!   Y              = W + Pi_d + iota_D
//!   tau Y - T      = 0
//!   Y - T - Y_d    = -Z
//!   Y_d - zeta_2 M = C + zeta_2 (D + E)
//! ```

use tracing::debug;

use crate::banks::BankBlock;
use crate::firms::FirmBlock;
use crate::params::ParamMap;
use crate::{Block, CalibrationError, solve_block};

/// Solution of the household block.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdBlock {
    /// Wage income (`W_H`).
    pub wages: f64,
    /// Doles received by the unemployed (`Z_H`).
    pub doles: f64,
    /// Dividends from firms and banks (`Pi_dH`).
    pub dividends: f64,
    /// Interest on deposits (`iota_DH`).
    pub interest_deposits: f64,
    /// Consumption (`C_H`), equal to total sales.
    pub consumption: f64,
    /// Deposits (`D_H`).
    pub deposits: f64,
    /// Equity in firms and banks (`E_H`).
    pub equity: f64,
    /// Gross taxable income (`Y_H`).
    pub income: f64,
    /// Income taxes (`T_H`).
    pub taxes: f64,
    /// Disposable income (`Y_dH`).
    pub disposable_income: f64,
    /// Cash holdings (`M_H`).
    pub cash: f64,
    /// Consumption share of each sector, in sector order (`alpha{s}`).
    pub shares: Vec<f64>,
}

impl HouseholdBlock {
    /// Solve the household sector on top of the firm and bank blocks.
    pub fn solve(
        params: &ParamMap,
        firms: &FirmBlock,
        banks: &BankBlock,
    ) -> Result<Self, CalibrationError> {
        let zeta_1 = firms.growth.zeta_1;
        let zeta_2 = firms.growth.zeta_2;
        let tau = params.policy("tau")?;

        let wages = firms.wage_bill() + banks.public_wages;
        let doles = params.policy("kappa_Z")?
            * params.policy("w_min")?
            * f64::from(params.count_or_zero("N_U")?);
        let dividends = firms.dividends() + banks.aggregate.dividends;
        let deposits = banks.household_deposits;
        let interest_deposits = zeta_1 * params.policy("r_D")? * deposits;
        let consumption = firms.sales();
        let equity = firms.equity() + banks.aggregate.equity;

        let [income, taxes, disposable_income, cash] = solve_block(
            Block::Households,
            ["Y_H", "T_H", "Y_dH", "M_H"],
            [
                [1.0, 0.0, 0.0, 0.0],
                [tau, -1.0, 0.0, 0.0],
                [1.0, -1.0, -1.0, 0.0],
                [0.0, 0.0, 1.0, -zeta_2],
            ],
            [
                wages + dividends + interest_deposits,
                0.0,
                -doles,
                consumption + zeta_2 * (deposits + equity),
            ],
        )?;

        let shares = firms
            .sectors
            .iter()
            .map(|s| {
                if consumption > 0.0 {
                    s.sales / consumption
                } else {
                    0.0
                }
            })
            .collect();

        debug!(income, disposable_income, cash, "Household sector calibrated");
        Ok(Self {
            wages,
            doles,
            dividends,
            interest_deposits,
            consumption,
            deposits,
            equity,
            income,
            taxes,
            disposable_income,
            cash,
            shares,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn solved() -> (FirmBlock, HouseholdBlock) {
        let params = ParamMap::baseline();
        let firms = FirmBlock::solve(&params).unwrap();
        let banks = BankBlock::solve(&params, &firms).unwrap();
        let households = HouseholdBlock::solve(&params, &firms, &banks).unwrap();
        (firms, households)
    }

    #[test]
    fn disposable_income_funds_consumption_and_saving() {
        let (firms, h) = solved();
        let zeta_2 = firms.growth.zeta_2;
        let saving = zeta_2 * (h.cash + h.deposits + h.equity);
        assert!((h.disposable_income - h.consumption - saving).abs() < 1e-9);
        assert!((h.disposable_income - (h.income - h.taxes + h.doles)).abs() < 1e-9);
        assert!(h.cash > 0.0);
    }

    #[test]
    fn doles_cover_the_unemployed() {
        let (_, h) = solved();
        // kappa_Z w_min N_U = 0.5 * 0.4 * 10
        assert!((h.doles - 2.0).abs() < 1e-12);
    }

    #[test]
    fn consumption_shares_sum_to_one() {
        let (_, h) = solved();
        let total: f64 = h.shares.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(h.shares.len(), 2);
    }
}
