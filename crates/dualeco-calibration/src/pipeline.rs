//! The full calibration pipeline and its write-back into the parameters.

use tracing::info;

use crate::banks::BankBlock;
use crate::firms::FirmBlock;
use crate::households::HouseholdBlock;
use crate::params::{ParamMap, sector_key};
use crate::public::PublicBlock;
use crate::{CalibrationError, Growth};

/// A complete steady-state solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    /// Block 1.
    pub firms: FirmBlock,
    /// Block 2.
    pub banks: BankBlock,
    /// Block 3.
    pub households: HouseholdBlock,
    /// Block 4.
    pub public: PublicBlock,
}

/// Solve the four blocks in order.
pub fn calibrate(params: &ParamMap) -> Result<Calibration, CalibrationError> {
    let firms = FirmBlock::solve(params)?;
    let banks = BankBlock::solve(params, &firms)?;
    let households = HouseholdBlock::solve(params, &firms, &banks)?;
    let public = PublicBlock::solve(params, &firms, &banks, &households)?;

    info!(
        sectors = firms.sectors.len(),
        sales = firms.sales(),
        loans = banks.aggregate.loans,
        bonds = public.bonds_issued,
        "Steady state calibrated"
    );
    Ok(Calibration {
        firms,
        banks,
        households,
        public,
    })
}

impl Calibration {
    /// Growth factors the solution was computed with.
    pub const fn growth(&self) -> Growth {
        self.firms.growth
    }

    /// Write every solved aggregate into `params` under its canonical key.
    pub fn write_into(&self, params: &mut ParamMap) {
        let growth = self.growth();
        params.set("zeta_1", growth.zeta_1);
        params.set("zeta_2", growth.zeta_2);

        for (s, alpha) in self.firms.sectors.iter().zip(&self.households.shares) {
            let n = s.sector;
            for (name, value) in [
                ("y", s.output),
                ("W_F", s.wage_bill),
                ("p", s.price),
                ("Q", s.sales),
                ("y_inv", s.inventory_units),
                ("Y_inv", s.inventory_value),
                ("E_F", s.equity),
                ("D_F", s.deposits),
                ("M_F", s.cash),
                ("L_F", s.loans),
                ("Pi_F", s.profits),
                ("T_F", s.taxes),
                ("Pi_dF", s.dividends),
                ("iota_LF", s.interest_loans),
                ("iota_DF", s.interest_deposits),
                ("alpha", *alpha),
            ] {
                params.set(sector_key(name, n), value);
            }
        }

        let b = &self.banks.aggregate;
        let h = &self.households;
        let g = &self.public;
        for (key, value) in [
            ("L_B", b.loans),
            ("D_B", b.deposits),
            ("M_B", b.reserves),
            ("A_B", b.advances),
            ("B_B", b.bonds),
            ("E_B", b.equity),
            ("Pi_B", b.profits),
            ("T_B", b.taxes),
            ("Pi_dB", b.dividends),
            ("iota_LB", b.interest_loans),
            ("iota_DB", b.interest_deposits),
            ("iota_BB", b.interest_bonds),
            ("iota_AB", b.interest_advances),
            ("W_H", h.wages),
            ("Z_H", h.doles),
            ("Pi_dH", h.dividends),
            ("iota_DH", h.interest_deposits),
            ("D_H", h.deposits),
            ("M_H", h.cash),
            ("E_H", h.equity),
            ("Y_H", h.income),
            ("T_H", h.taxes),
            ("Y_dH", h.disposable_income),
            ("C_H", h.consumption),
            ("W_G", g.wages),
            ("Z_G", g.doles),
            ("T_G", g.taxes),
            ("Pi_G", g.profit_received),
            ("Pi_CB", g.profit_paid),
            ("M_G", g.government_cash),
            ("M_CB", g.central_bank_cash),
            ("B_G", g.bonds_issued),
            ("B_CB", g.central_bank_bonds),
            ("A_CB", g.advances),
            ("iota_BG", g.interest_bonds_paid),
            ("iota_BCB", g.interest_bonds_received),
            ("iota_ACB", g.interest_advances),
        ] {
            params.set(key, value);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn write_back_uses_canonical_keys() {
        let mut params = ParamMap::baseline();
        let calibration = calibrate(&params).unwrap();
        calibration.write_into(&mut params);

        for key in ["y1", "W_F2", "p1", "alpha2", "L_F1", "D_B", "M_H", "B_CB", "zeta_2"] {
            assert!(params.get(key).is_some(), "{key} missing");
        }
        let sales = params.value("Q1").unwrap() + params.value("Q2").unwrap();
        assert!((params.value("C_H").unwrap() - sales).abs() < 1e-9);
        // Inputs are preserved.
        assert!((params.value("tau").unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn zero_growth_is_singular() {
        let mut params = ParamMap::baseline();
        params.set("g", 0.0);
        let err = calibrate(&params).unwrap_err();
        assert!(matches!(err, CalibrationError::Singular { .. }), "{err}");
    }
}
