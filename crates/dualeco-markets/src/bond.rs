//! Bond market and reserve settlement.
//!
//! The government covers any cash deficit by issuing bonds. Banks first
//! bring their reserves back to `kappa_R` of deposits: a shortfall is met
//! by selling bonds to the central bank and then by taking advances, and
//! an excess repays advances before it buys new bonds. The central bank
//! buys whatever the banks leave.

use tracing::debug;

use dualeco_agents::{Bank, BehaviorConfig, CentralBank, Government};
use dualeco_ledger::{Transaction, primitives};

/// What a settlement round moved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settlement {
    /// Bonds issued by the government.
    pub issued: f64,
    /// Part of the issue bought by commercial banks.
    pub bought_by_banks: f64,
    /// Part of the issue bought by the central bank.
    pub bought_by_central_bank: f64,
    /// Bonds banks sold to the central bank for reserves.
    pub sold_to_central_bank: f64,
    /// New advances taken.
    pub advances_taken: f64,
    /// Advances repaid.
    pub advances_repaid: f64,
    /// Transactions applied.
    pub transactions: Vec<Transaction>,
}

/// Pay `r_B` coupons on every bond holding.
pub fn pay_coupons(
    r_b: f64,
    government: &mut Government,
    banks: &mut [Bank],
    central_bank: &mut CentralBank,
) -> Vec<Transaction> {
    let holders = banks
        .iter_mut()
        .map(|bank| &mut bank.accounts)
        .chain(std::iter::once(&mut central_bank.accounts));
    let mut transactions = Vec::new();
    for holder in holders {
        let coupon = r_b * holder.stocks.bonds;
        if coupon > 0.0 {
            transactions.push(primitives::repay_bonds(
                0.0,
                coupon,
                &mut government.accounts,
                holder,
            ));
        }
    }
    transactions
}

/// Pay `r_A` interest on every bank's outstanding advances.
pub fn pay_advance_interest(
    r_a: f64,
    banks: &mut [Bank],
    central_bank: &mut CentralBank,
) -> Vec<Transaction> {
    banks
        .iter_mut()
        .filter_map(|bank| {
            let interest = r_a * bank.accounts.stocks.advances;
            (interest > 0.0).then(|| {
                primitives::repay_advances(
                    0.0,
                    interest,
                    &mut bank.accounts,
                    &mut central_bank.accounts,
                )
            })
        })
        .collect()
}

/// Restore bank reserves, then issue and place the government's bonds.
pub fn settle(
    government: &mut Government,
    banks: &mut [Bank],
    central_bank: &mut CentralBank,
    config: &BehaviorConfig,
) -> Settlement {
    let mut settlement = Settlement::default();
    let mut unplaced = government.bond_need();
    settlement.issued = unplaced;

    for bank in banks.iter_mut() {
        let gap = bank.reserve_gap(config);
        if gap < 0.0 {
            let shortfall = -gap;
            let sold = shortfall.min(bank.accounts.stocks.bonds.max(0.0));
            if sold > 0.0 {
                settlement.transactions.push(primitives::transfer_bonds(
                    sold,
                    &mut bank.accounts,
                    &mut central_bank.accounts,
                ));
                settlement.sold_to_central_bank += sold;
            }
            let borrowed = shortfall - sold;
            if borrowed > 0.0 {
                settlement.transactions.push(primitives::give_advances(
                    borrowed,
                    &mut central_bank.accounts,
                    &mut bank.accounts,
                ));
                settlement.advances_taken += borrowed;
            }
        } else if gap > 0.0 {
            let repaid = gap.min(bank.accounts.stocks.advances.max(0.0));
            if repaid > 0.0 {
                settlement.transactions.push(primitives::repay_advances(
                    repaid,
                    0.0,
                    &mut bank.accounts,
                    &mut central_bank.accounts,
                ));
                settlement.advances_repaid += repaid;
            }
            let bought = (gap - repaid).min(unplaced);
            if bought > 0.0 {
                settlement.transactions.push(primitives::buy_bonds(
                    bought,
                    &mut bank.accounts,
                    &mut government.accounts,
                ));
                settlement.bought_by_banks += bought;
                unplaced -= bought;
            }
        }
    }

    if unplaced > 0.0 {
        settlement.transactions.push(primitives::buy_bonds(
            unplaced,
            &mut central_bank.accounts,
            &mut government.accounts,
        ));
        settlement.bought_by_central_bank = unplaced;
    }

    if settlement.issued > 0.0 {
        debug!(
            issued = settlement.issued,
            banks = settlement.bought_by_banks,
            central_bank = settlement.bought_by_central_bank,
            "Bonds placed"
        );
    }
    settlement
}
