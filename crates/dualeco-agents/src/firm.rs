//! Firms of the formal and informal production sectors.
//!
//! A firm forms adaptive sales expectations, plans output and labor
//! demand, sets its wage and a markup price, borrows (formal firms only),
//! produces with labor alone, sells out of inventories and distributes its
//! profit to its owner.

use rand::Rng;
use serde::{Deserialize, Serialize};

use dualeco_ledger::{Transaction, primitives};
use dualeco_types::{Accounts, BankId, FirmId, HouseholdId, Sector, Segment};

use crate::config::BehaviorConfig;

/// Slack below which a fractional worker is treated as rounding noise.
const HEADCOUNT_TOLERANCE: f64 = 1e-9;

/// Round a non-negative quantity up to a whole headcount.
fn headcount_for(quantity: f64) -> u32 {
    let rounded = (quantity - HEADCOUNT_TOLERANCE).ceil();
    if !rounded.is_finite() || rounded <= 0.0 {
        return 0;
    }
    if rounded >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    // Clamped to the u32 range above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = rounded as u32;
    whole
}

/// A production firm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Firm {
    /// Population index.
    pub id: FirmId,
    /// Production sector (1-based).
    pub sector: u32,
    /// Formal or informal.
    pub segment: Segment,
    /// Stocks and period flows.
    pub accounts: Accounts,
    /// The entrepreneur who owns and works in the firm.
    pub owner: HouseholdId,
    /// Deposit and credit bank (formal firms only).
    pub bank: Option<BankId>,
    /// Output per worker.
    pub productivity: f64,
    /// Wage offered per worker.
    pub wage: f64,
    /// Unit price.
    pub price: f64,
    /// Inventories in units.
    pub inventory: f64,
    /// Inventories valued at unit labor cost.
    pub inventory_value: f64,
    /// Expected sales in units.
    pub expected_sales: f64,
    /// Units sold during the current step.
    pub sold: f64,
    /// Units produced during the current step.
    pub output: f64,
    /// Desired output for the current step.
    pub desired_output: f64,
    /// Desired headcount, the entrepreneur included.
    pub labor_demand: u32,
    /// Open vacancies.
    pub vacancies: u32,
    /// Whether vacancies were left open at the end of the last labor market.
    pub unfilled: bool,
    /// Loan demand for the current step.
    pub loan_demand: f64,
    /// Rate on the outstanding loan, set when credit is granted.
    pub loan_rate: f64,
    /// Profit of the current step.
    pub profit: f64,
}

impl Firm {
    /// Create a firm with empty accounts.
    pub fn new(
        id: FirmId,
        sector: u32,
        segment: Segment,
        owner: HouseholdId,
        productivity: f64,
        wage: f64,
        markup: f64,
    ) -> Self {
        let price = if productivity > 0.0 {
            (1.0 + markup) * wage / productivity
        } else {
            (1.0 + markup) * wage
        };
        Self {
            id,
            sector,
            segment,
            accounts: Accounts::new(Sector::Firm),
            owner,
            bank: None,
            productivity,
            wage,
            price,
            inventory: 0.0,
            inventory_value: 0.0,
            expected_sales: 0.0,
            sold: 0.0,
            output: 0.0,
            desired_output: 0.0,
            labor_demand: 0,
            vacancies: 0,
            unfilled: false,
            loan_demand: 0.0,
            loan_rate: 0.0,
            profit: 0.0,
        }
    }

    /// Whether the firm belongs to the formal segment.
    pub fn is_formal(&self) -> bool {
        self.segment == Segment::Formal
    }

    /// Labor cost of one unit of output.
    pub fn unit_cost(&self) -> f64 {
        if self.productivity > 0.0 {
            self.wage / self.productivity
        } else {
            self.wage
        }
    }

    /// Wage bill for a given headcount.
    pub fn wage_bill(&self, headcount: u32) -> f64 {
        self.wage * f64::from(headcount)
    }

    /// Value of the inventories a buyer can purchase at the current price.
    pub fn available_value(&self) -> f64 {
        self.price * self.inventory
    }

    /// Plan the step's production, labor demand, wage and price.
    ///
    /// Expected sales adapt towards last step's sales. Desired output
    /// covers expected sales plus the inventory target, net of current
    /// inventories. A firm that could not fill its vacancies last step
    /// raises its wage by `1 + upsilon_F u`. The price is a markup on the
    /// unit labor cost. Labor demand is at least one (the entrepreneur).
    pub fn plan_production<R: Rng + ?Sized>(
        &mut self,
        headcount: u32,
        config: &BehaviorConfig,
        rng: &mut R,
    ) {
        self.expected_sales += config.delta * (self.sold - self.expected_sales);
        self.desired_output =
            (self.expected_sales * (1.0 + config.theta_y) - self.inventory).max(0.0);
        let needed = if self.productivity > 0.0 {
            headcount_for(self.desired_output / self.productivity)
        } else {
            0
        };
        self.labor_demand = needed.max(1);
        self.vacancies = self.labor_demand.saturating_sub(headcount);

        if self.unfilled {
            let u: f64 = rng.random();
            self.wage *= 1.0 + config.upsilon_f * u;
        }
        self.price = (1.0 + config.markup) * self.unit_cost();
    }

    /// Credit needed to pay the planned wage bill out of liquid funds.
    ///
    /// Informal firms have no access to credit.
    pub fn plan_loan_demand(&mut self) -> f64 {
        self.loan_demand = if self.is_formal() {
            (self.wage_bill(self.labor_demand) - self.accounts.liquidity()).max(0.0)
        } else {
            0.0
        };
        self.loan_demand
    }

    /// Leverage of a loan request over the firm's equity.
    ///
    /// `None` when the firm has no positive equity.
    pub fn leverage(&self, amount: f64) -> Option<f64> {
        let equity = self.accounts.stocks.equity;
        (equity > 0.0).then(|| amount / equity)
    }

    /// Produce with the given headcount and add the output to inventories.
    pub fn produce(&mut self, headcount: u32) -> f64 {
        self.output = self.productivity * f64::from(headcount);
        self.inventory += self.output;
        self.output
    }

    /// Sell goods worth `value` out of inventories; returns units sold.
    pub fn sell(&mut self, value: f64) -> f64 {
        if self.price <= 0.0 {
            return 0.0;
        }
        let units = (value / self.price).min(self.inventory).max(0.0);
        self.inventory -= units;
        self.sold += units;
        units
    }

    /// Value the remaining inventories at the current unit cost.
    pub fn revalue_inventory(&mut self) -> f64 {
        self.inventory_value = self.unit_cost() * self.inventory;
        self.inventory_value
    }

    /// Clear per-step production counters.
    pub const fn open_step(&mut self) {
        self.sold = 0.0;
        self.output = 0.0;
    }

    /// Deposits kept as a working-capital buffer.
    pub fn deposit_buffer(&self, headcount: u32, config: &BehaviorConfig) -> f64 {
        config.theta_w * self.wage_bill(headcount)
    }

    /// Compute the step's profit: sales and deposit interest net of wages
    /// and loan interest.
    pub fn compute_profit(&mut self) -> f64 {
        let flows = &self.accounts.flows;
        self.profit =
            flows.consumption + flows.interest_deposits - flows.wages - flows.interest_loans;
        self.profit
    }

    /// Profit tax due: formal firms pay `tau` on positive profits.
    pub fn profit_tax(&self, config: &BehaviorConfig) -> f64 {
        if self.is_formal() && self.profit > 0.0 {
            config.tau * self.profit
        } else {
            0.0
        }
    }

    /// Pay the profit tax, truncated to cash on hand.
    pub fn pay_profit_tax(
        &mut self,
        config: &BehaviorConfig,
        government: &mut Accounts,
    ) -> Option<Transaction> {
        let tax = self.profit_tax(config).min(self.accounts.stocks.cash);
        (tax > 0.0).then(|| primitives::pay_taxes(tax, &mut self.accounts, government))
    }

    /// Dividend due on after-tax profit.
    pub fn dividend(&self, config: &BehaviorConfig) -> f64 {
        (config.rho * (self.profit - self.accounts.flows.taxes)).max(0.0)
    }

    /// Pay the dividend to the owner, truncated to cash on hand.
    pub fn pay_dividend(
        &mut self,
        config: &BehaviorConfig,
        owner: &mut Accounts,
    ) -> Option<Transaction> {
        let dividend = self.dividend(config).min(self.accounts.stocks.cash);
        (dividend > 0.0).then(|| primitives::pay_dividends(dividend, &mut self.accounts, owner))
    }
}
