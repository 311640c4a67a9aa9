//! Accounting matrices built from a calibrated parameter mapping.
//!
//! In the steady state the opening stock of every holding is `zeta_1`
//! times its closing stock, so the change rows of the flow matrix are
//! `zeta_2` times the balance sheet.

use dualeco_ledger::{AccountingMatrix, SectorTotals};
use dualeco_types::{Flows, Sector, Stocks};

use crate::params::{ParamMap, sector_key};

fn sum_sectors(params: &ParamMap, name: &str) -> f64 {
    let count = params.sectors().unwrap_or(0);
    (1..=count)
        .map(|s| params.value_or(&sector_key(name, s), 0.0))
        .sum()
}

/// Per-sector stock and flow totals read from canonical keys.
///
/// Missing keys count as zero, so an uncalibrated mapping yields an empty
/// (and trivially consistent) economy.
pub fn sector_totals(params: &ParamMap) -> SectorTotals {
    let v = |key: &str| params.value_or(key, 0.0);
    let f = |name: &str| sum_sectors(params, name);

    let mut totals = SectorTotals::new();
    totals.stocks.insert(
        Sector::Household,
        Stocks {
            cash: v("M_H"),
            deposits: v("D_H"),
            equity: v("E_H"),
            ..Stocks::default()
        },
    );
    totals.flows.insert(
        Sector::Household,
        Flows {
            consumption: v("C_H"),
            wages: v("W_H"),
            transfers: v("Z_H"),
            taxes: v("T_H"),
            interest_deposits: v("iota_DH"),
            dividends: v("Pi_dH"),
            ..Flows::default()
        },
    );

    totals.stocks.insert(
        Sector::Firm,
        Stocks {
            cash: f("M_F"),
            deposits: f("D_F"),
            loans: f("L_F"),
            equity: f("E_F"),
            ..Stocks::default()
        },
    );
    totals.flows.insert(
        Sector::Firm,
        Flows {
            consumption: f("Q"),
            wages: f("W_F"),
            taxes: f("T_F"),
            interest_loans: f("iota_LF"),
            interest_deposits: f("iota_DF"),
            dividends: f("Pi_dF"),
            ..Flows::default()
        },
    );
    totals.inventories = f("Y_inv");

    totals.stocks.insert(
        Sector::Bank,
        Stocks {
            cash: v("M_B"),
            advances: v("A_B"),
            deposits: v("D_B"),
            bonds: v("B_B"),
            loans: v("L_B"),
            equity: v("E_B"),
        },
    );
    totals.flows.insert(
        Sector::Bank,
        Flows {
            taxes: v("T_B"),
            interest_advances: v("iota_AB"),
            interest_bonds: v("iota_BB"),
            interest_loans: v("iota_LB"),
            interest_deposits: v("iota_DB"),
            dividends: v("Pi_dB"),
            ..Flows::default()
        },
    );

    totals.stocks.insert(
        Sector::Government,
        Stocks {
            cash: v("M_G"),
            bonds: v("B_G"),
            ..Stocks::default()
        },
    );
    totals.flows.insert(
        Sector::Government,
        Flows {
            wages: v("W_G"),
            transfers: v("Z_G"),
            taxes: v("T_G"),
            interest_bonds: v("iota_BG"),
            profits: v("Pi_G"),
            ..Flows::default()
        },
    );

    totals.stocks.insert(
        Sector::CentralBank,
        Stocks {
            cash: v("M_CB"),
            advances: v("A_CB"),
            bonds: v("B_CB"),
            ..Stocks::default()
        },
    );
    totals.flows.insert(
        Sector::CentralBank,
        Flows {
            interest_advances: v("iota_ACB"),
            interest_bonds: v("iota_BCB"),
            profits: v("Pi_CB"),
            ..Flows::default()
        },
    );

    totals
}

/// Balance-sheet and flow matrices of the calibrated steady state.
pub fn accounting_matrix(params: &ParamMap) -> AccountingMatrix {
    let totals = sector_totals(params);
    let opening = totals.scaled_stocks(params.value_or("zeta_1", 1.0));
    AccountingMatrix::build(&totals, &opening)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pipeline::calibrate;

    #[test]
    fn empty_mapping_is_consistent() {
        accounting_matrix(&ParamMap::new()).check(8).unwrap();
    }

    #[test]
    fn calibrated_baseline_closes() {
        let mut params = ParamMap::baseline();
        calibrate(&params).unwrap().write_into(&mut params);
        accounting_matrix(&params).check(6).unwrap();
    }

    #[test]
    fn tampered_mapping_is_flagged() {
        let mut params = ParamMap::baseline();
        calibrate(&params).unwrap().write_into(&mut params);
        let cash = params.value("M_H").unwrap();
        params.set("M_H", cash + 1.0);
        let violation = accounting_matrix(&params).check(6).unwrap_err();
        assert!(
            violation
                .breaches
                .iter()
                .any(|(_, breach)| breach.label == "M")
        );
    }
}
