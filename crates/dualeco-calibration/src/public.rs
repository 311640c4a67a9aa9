//! Block 4: government and central bank.
//!
//! The government pays public wages and doles, collects every tax and
//! receives the central bank's profit. Its deficit is financed by bonds,
//! held by banks and by the central bank; the central bank's bond holdings
//! and advances are matched by the cash it issues:
//!
//! ```text
//! [Pi_G, Pi_CB, M_CB, B_G, B_CB]
//!   Pi_G - Pi_CB                      = 0
//!   M_CB - B_CB                       = A_CB
//!   B_G - B_CB                        = B_B
//!   Pi_G + (zeta_2 - zeta_1 r_B) B_G  = W_G + Z_G - T_G + zeta_2 M_G
//!   Pi_CB - zeta_1 r_B B_CB           = zeta_1 r_A A_CB
//! ```
//!
//! No cash row is solved here: with every other column closed, the cash
//! issued by the central bank equals the cash held by everyone else.

use tracing::debug;

use crate::banks::BankBlock;
use crate::firms::FirmBlock;
use crate::households::HouseholdBlock;
use crate::params::ParamMap;
use crate::{Block, CalibrationError, solve_block};

/// Solution of the public block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublicBlock {
    /// Public wages (`W_G`).
    pub wages: f64,
    /// Doles (`Z_G`).
    pub doles: f64,
    /// Taxes from households, firms and banks (`T_G`).
    pub taxes: f64,
    /// Profit transferred from the central bank, as received (`Pi_G`).
    pub profit_received: f64,
    /// Profit transferred by the central bank, as paid (`Pi_CB`).
    pub profit_paid: f64,
    /// Government cash (`M_G`).
    pub government_cash: f64,
    /// Cash issued by the central bank (`M_CB`).
    pub central_bank_cash: f64,
    /// Bonds issued (`B_G`).
    pub bonds_issued: f64,
    /// Bonds held by the central bank (`B_CB`).
    pub central_bank_bonds: f64,
    /// Advances granted by the central bank (`A_CB`).
    pub advances: f64,
    /// Coupons paid by the government (`iota_BG`).
    pub interest_bonds_paid: f64,
    /// Coupons received by the central bank (`iota_BCB`).
    pub interest_bonds_received: f64,
    /// Interest received on advances (`iota_ACB`).
    pub interest_advances: f64,
}

impl PublicBlock {
    /// Solve the public sector on top of every earlier block.
    pub fn solve(
        params: &ParamMap,
        firms: &FirmBlock,
        banks: &BankBlock,
        households: &HouseholdBlock,
    ) -> Result<Self, CalibrationError> {
        let zeta_1 = firms.growth.zeta_1;
        let zeta_2 = firms.growth.zeta_2;
        let r_b = params.policy("r_B")?;
        let r_a = params.policy("r_A")?;

        let wages = banks.public_wages;
        let doles = households.doles;
        let taxes = households.taxes + firms.taxes() + banks.aggregate.taxes;
        let advances = banks.aggregate.advances;
        let government_cash = 0.0;

        let [profit_received, profit_paid, central_bank_cash, bonds_issued, central_bank_bonds] =
            solve_block(
                Block::Public,
                ["Pi_G", "Pi_CB", "M_CB", "B_G", "B_CB"],
                [
                    [1.0, -1.0, 0.0, 0.0, 0.0],
                    [0.0, 0.0, 1.0, 0.0, -1.0],
                    [0.0, 0.0, 0.0, 1.0, -1.0],
                    [1.0, 0.0, 0.0, zeta_2 - zeta_1 * r_b, 0.0],
                    [0.0, 1.0, 0.0, 0.0, -zeta_1 * r_b],
                ],
                [
                    0.0,
                    advances,
                    banks.aggregate.bonds,
                    wages + doles - taxes + zeta_2 * government_cash,
                    zeta_1 * r_a * advances,
                ],
            )?;

        debug!(
            bonds_issued,
            central_bank_bonds, central_bank_cash, "Public sector calibrated"
        );
        Ok(Self {
            wages,
            doles,
            taxes,
            profit_received,
            profit_paid,
            government_cash,
            central_bank_cash,
            bonds_issued,
            central_bank_bonds,
            advances,
            interest_bonds_paid: zeta_1 * r_b * bonds_issued,
            interest_bonds_received: zeta_1 * r_b * central_bank_bonds,
            interest_advances: zeta_1 * r_a * advances,
        })
    }
}
