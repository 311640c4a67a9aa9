//! Goods market: one per sector, cash purchases from sampled suppliers.

use rand::Rng;
use rand::seq::index;

use dualeco_agents::Firm;
use dualeco_ledger::{Transaction, primitives};
use dualeco_types::{Accounts, FirmId};

use crate::error::MarketError;

/// Result of one buyer's visit to a goods market.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Purchase {
    /// Cash spent.
    pub spent: f64,
    /// Units bought.
    pub units: f64,
    /// Transactions applied.
    pub transactions: Vec<Transaction>,
}

/// Goods market of a single sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoodsMarket {
    /// Sector traded.
    pub sector: u32,
    suppliers: Vec<FirmId>,
}

impl GoodsMarket {
    /// Create a market over the given suppliers.
    pub const fn new(sector: u32, suppliers: Vec<FirmId>) -> Self {
        Self { sector, suppliers }
    }

    /// Firms selling on this market.
    pub fn suppliers(&self) -> &[FirmId] {
        &self.suppliers
    }

    /// Spend up to `budget` (capped by the buyer's cash) at up to `chi`
    /// sampled suppliers.
    ///
    /// Each visited supplier sells what the remaining budget buys, limited
    /// by its inventories. Unspent budget stays with the buyer.
    pub fn buy<R: Rng + ?Sized>(
        &self,
        budget: f64,
        buyer: &mut Accounts,
        firms: &mut [Firm],
        chi: u32,
        rng: &mut R,
    ) -> Result<Purchase, MarketError> {
        let mut purchase = Purchase::default();
        let mut remaining = budget.min(buyer.stocks.cash);
        let amount = usize::try_from(chi)
            .unwrap_or(usize::MAX)
            .min(self.suppliers.len());
        if remaining <= 0.0 || amount == 0 {
            return Ok(purchase);
        }
        for position in index::sample(rng, self.suppliers.len(), amount) {
            if remaining <= 0.0 {
                break;
            }
            let Some(&id) = self.suppliers.get(position) else {
                continue;
            };
            let firm = firms
                .get_mut(id.index())
                .ok_or(MarketError::UnknownFirm(id))?;
            let value = remaining.min(firm.available_value());
            if value <= 0.0 {
                continue;
            }
            purchase.units += firm.sell(value);
            purchase
                .transactions
                .push(primitives::consume_goods(value, buyer, &mut firm.accounts));
            purchase.spent += value;
            remaining -= value;
        }
        Ok(purchase)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use dualeco_types::{HouseholdId, Sector, Segment};

    use super::*;

    fn firm(id: u32, inventory: f64) -> Firm {
        // Price = 1.25 * 1.0 / 1.0
        let mut f = Firm::new(
            FirmId::new(id),
            1,
            Segment::Formal,
            HouseholdId::new(id),
            1.0,
            1.0,
            0.25,
        );
        f.inventory = inventory;
        f
    }

    fn buyer(cash: f64) -> Accounts {
        let mut a = Accounts::new(Sector::Household);
        a.stocks.cash = cash;
        a
    }

    #[test]
    fn spending_is_limited_by_cash() {
        let market = GoodsMarket::new(1, vec![FirmId::new(0), FirmId::new(1)]);
        let mut firms = vec![firm(0, 100.0), firm(1, 100.0)];
        let mut client = buyer(10.0);
        let mut rng = SmallRng::seed_from_u64(4);

        let purchase = market.buy(50.0, &mut client, &mut firms, 2, &mut rng).unwrap();
        assert!((purchase.spent - 10.0).abs() < 1e-12);
        assert!((purchase.units - 8.0).abs() < 1e-12);
        assert!(client.stocks.cash.abs() < 1e-12);
        assert!((client.flows.consumption - 10.0).abs() < 1e-12);
        assert!(purchase.transactions.iter().all(Transaction::is_balanced));
    }

    #[test]
    fn spending_is_limited_by_inventories() {
        let market = GoodsMarket::new(1, vec![FirmId::new(0), FirmId::new(1)]);
        let mut firms = vec![firm(0, 2.0), firm(1, 4.0)];
        let mut client = buyer(100.0);
        let mut rng = SmallRng::seed_from_u64(8);

        let purchase = market.buy(20.0, &mut client, &mut firms, 2, &mut rng).unwrap();
        assert!((purchase.units - 6.0).abs() < 1e-12);
        assert!((purchase.spent - 7.5).abs() < 1e-12);
        assert!(firms.iter().all(|f| f.inventory.abs() < 1e-12));
        assert!((client.stocks.cash - 92.5).abs() < 1e-12);
    }

    #[test]
    fn empty_market_buys_nothing() {
        let market = GoodsMarket::new(2, Vec::new());
        let mut client = buyer(10.0);
        let mut rng = SmallRng::seed_from_u64(0);
        let purchase = market.buy(5.0, &mut client, &mut [], 3, &mut rng).unwrap();
        assert_eq!(purchase, Purchase::default());
    }

    #[test]
    fn unknown_supplier_is_an_error() {
        let market = GoodsMarket::new(1, vec![FirmId::new(3)]);
        let mut client = buyer(10.0);
        let mut rng = SmallRng::seed_from_u64(0);
        let err = market.buy(5.0, &mut client, &mut [], 1, &mut rng).unwrap_err();
        assert_eq!(err, MarketError::UnknownFirm(FirmId::new(3)));
    }
}
