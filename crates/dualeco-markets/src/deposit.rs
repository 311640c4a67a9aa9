//! Deposit market: client-to-bank assignment and deposit servicing.
//!
//! Every household and every formal firm banks with exactly one bank.
//! Clients are assigned round-robin, households first; the counter carries
//! over to the firms so the combined client load stays balanced.

use dualeco_agents::Bank;
use dualeco_ledger::{Transaction, primitives};
use dualeco_types::{Accounts, BankId, FirmId, HouseholdId};

use crate::relation::Relation;

/// Client relations of the banking system.
#[derive(Debug, Clone, Default)]
pub struct DepositMarket {
    households: Relation<HouseholdId, BankId>,
    firms: Relation<FirmId, BankId>,
}

impl DepositMarket {
    /// Assign clients to `banks` in round-robin order.
    ///
    /// With no banks the market stays empty.
    pub fn round_robin(
        households: impl IntoIterator<Item = HouseholdId>,
        firms: impl IntoIterator<Item = FirmId>,
        banks: &[BankId],
    ) -> Self {
        let mut market = Self::default();
        if banks.is_empty() {
            return market;
        }
        let mut cycle = banks.iter().copied().cycle();
        for (household, bank) in households.into_iter().zip(&mut cycle) {
            market.households.link(household, bank);
        }
        for (firm, bank) in firms.into_iter().zip(&mut cycle) {
            market.firms.link(firm, bank);
        }
        market
    }

    /// Bank of a household.
    pub fn bank_of_household(&self, household: HouseholdId) -> Option<BankId> {
        self.households.partner_of(household)
    }

    /// Bank of a firm.
    pub fn bank_of_firm(&self, firm: FirmId) -> Option<BankId> {
        self.firms.partner_of(firm)
    }

    /// Household clients of a bank.
    pub fn households_of(&self, bank: BankId) -> &[HouseholdId] {
        self.households.members_of(bank)
    }

    /// Firm clients of a bank.
    pub fn firms_of(&self, bank: BankId) -> &[FirmId] {
        self.firms.members_of(bank)
    }

    /// Number of clients (households and firms) of a bank.
    pub fn clients_of(&self, bank: BankId) -> u32 {
        self.households
            .count_of(bank)
            .saturating_add(self.firms.count_of(bank))
    }

    /// The firm relation, from which the credit market is built.
    pub const fn firm_relation(&self) -> &Relation<FirmId, BankId> {
        &self.firms
    }
}

/// Move a client's liquid wealth towards `target_cash` in hand.
///
/// Cash above the target is deposited; a shortfall is withdrawn as far as
/// the deposits allow.
pub fn rebalance(target_cash: f64, client: &mut Accounts, bank: &mut Bank) -> Option<Transaction> {
    let gap = client.stocks.cash - target_cash.max(0.0);
    if gap > 0.0 {
        Some(primitives::make_deposits(gap, client, &mut bank.accounts))
    } else {
        let amount = (-gap).min(client.stocks.deposits);
        (amount > 0.0).then(|| primitives::withdraw_deposits(amount, &mut bank.accounts, client))
    }
}

/// Credit `r_D` interest on a client's deposits.
pub fn credit_interest(r_d: f64, bank: &mut Bank, client: &mut Accounts) -> Option<Transaction> {
    let interest = r_d * client.stocks.deposits;
    (interest > 0.0).then(|| primitives::pay_interests(interest, &mut bank.accounts, client))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dualeco_types::Sector;

    use super::*;

    fn banks(n: u32) -> Vec<BankId> {
        (0..n).map(BankId::new).collect()
    }

    #[test]
    fn round_robin_balances_the_load() {
        let bank_ids = banks(3);
        let market = DepositMarket::round_robin(
            (0..10).map(HouseholdId::new),
            (0..4).map(FirmId::new),
            &bank_ids,
        );
        // 14 clients over 3 banks.
        let loads: Vec<u32> = bank_ids.iter().map(|&b| market.clients_of(b)).collect();
        assert_eq!(loads.iter().sum::<u32>(), 14);
        assert!(loads.iter().all(|&n| n == 4 || n == 5));
    }

    #[test]
    fn firm_assignment_continues_the_household_cycle() {
        let market = DepositMarket::round_robin(
            (0..2).map(HouseholdId::new),
            (0..1).map(FirmId::new),
            &banks(3),
        );
        assert_eq!(market.bank_of_household(HouseholdId::new(1)), Some(BankId::new(1)));
        assert_eq!(market.bank_of_firm(FirmId::new(0)), Some(BankId::new(2)));
        assert_eq!(market.firms_of(BankId::new(2)), &[FirmId::new(0)]);
    }

    #[test]
    fn no_banks_means_no_clients() {
        let market =
            DepositMarket::round_robin((0..3).map(HouseholdId::new), std::iter::empty(), &[]);
        assert_eq!(market.bank_of_household(HouseholdId::new(0)), None);
    }

    #[test]
    fn rebalancing_deposits_surplus_and_withdraws_shortfall() {
        let mut bank = Bank::new(BankId::new(0), HouseholdId::new(0));
        let mut client = Accounts::new(Sector::Household);
        client.stocks.cash = 10.0;

        let tx = rebalance(4.0, &mut client, &mut bank).unwrap();
        assert!(tx.is_balanced());
        assert!((client.stocks.deposits - 6.0).abs() < 1e-12);
        assert!((bank.accounts.stocks.cash - 6.0).abs() < 1e-12);

        rebalance(20.0, &mut client, &mut bank).unwrap();
        assert!((client.stocks.cash - 10.0).abs() < 1e-12);
        assert!(client.stocks.deposits.abs() < 1e-12);
        assert!(rebalance(20.0, &mut client, &mut bank).is_none());
    }

    #[test]
    fn interest_is_credited_to_deposits() {
        let mut bank = Bank::new(BankId::new(0), HouseholdId::new(0));
        let mut client = Accounts::new(Sector::Firm);
        client.stocks.deposits = 100.0;
        credit_interest(0.01, &mut bank, &mut client).unwrap();
        assert!((client.stocks.deposits - 101.0).abs() < 1e-12);
        assert!((client.flows.interest_deposits - 1.0).abs() < 1e-12);
    }
}
