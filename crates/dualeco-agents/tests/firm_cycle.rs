//! A formal firm through one production cycle: wages, sales, taxes and
//! dividends, with the books balanced at the end.

#![allow(clippy::unwrap_used)]

use dualeco_agents::{BehaviorConfig, Firm, Household};
use dualeco_ledger::{Journal, primitives};
use dualeco_types::{Accounts, Employer, FirmId, HouseholdId, LaborStatus, Sector, Segment};

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

#[test]
fn production_cycle_distributes_profit() {
    let config = BehaviorConfig::default();
    let mut firm = Firm::new(FirmId::new(0), 1, Segment::Formal, HouseholdId::new(0), 1.0, 1.0, 0.2);
    firm.accounts.stocks.cash = 10.0;

    let mut owner = Household::new(HouseholdId::new(0), LaborStatus::Entrepreneur, 1.0);
    owner.hire(Employer::Firm(firm.id), LaborStatus::Entrepreneur, 1.0);
    let mut worker = Household::new(HouseholdId::new(1), LaborStatus::Unemployed, 1.0);
    worker.hire(Employer::Firm(firm.id), LaborStatus::Formal, 1.0);
    worker.accounts.stocks.cash = 20.0;
    let mut government = Accounts::new(Sector::Government);

    let mut journal = Journal::new();
    journal.open_step(1);

    for household in [&mut owner, &mut worker] {
        journal.record(primitives::pay_wages(
            firm.wage,
            &mut firm.accounts,
            &mut household.accounts,
        ));
    }
    assert!(close(firm.produce(2), 2.0));
    assert!(close(firm.price, 1.2));

    // The worker buys the whole output.
    let spend = firm.available_value();
    let units = firm.sell(spend);
    journal.record(primitives::consume_goods(
        spend,
        &mut worker.accounts,
        &mut firm.accounts,
    ));
    assert!(close(units, 2.0));
    assert!(close(firm.inventory, 0.0));

    assert!(close(firm.compute_profit(), 0.4));
    journal.record(firm.pay_profit_tax(&config, &mut government).unwrap());
    journal.record(firm.pay_dividend(&config, &mut owner.accounts).unwrap());
    assert!(close(government.stocks.cash, 0.04));
    assert!(close(owner.accounts.flows.dividends, 0.95 * 0.36));

    journal.record(worker.pay_income_tax(&config, &mut government).unwrap());
    worker.close_income();
    assert!(close(worker.disposable_income, 0.9));

    assert!(journal.verify_conservation().is_balanced());
    let cash = firm.accounts.stocks.cash
        + owner.accounts.stocks.cash
        + worker.accounts.stocks.cash
        + government.stocks.cash;
    assert!(close(cash, 30.0));
}

#[test]
fn informal_firm_pays_no_profit_tax() {
    let config = BehaviorConfig::default();
    let mut firm = Firm::new(FirmId::new(1), 2, Segment::Informal, HouseholdId::new(0), 0.6, 0.5, 0.2);
    firm.accounts.flows.consumption = 3.0;
    firm.accounts.flows.wages = 1.0;
    firm.compute_profit();
    assert!(close(firm.profit_tax(&config), 0.0));
    assert!(close(firm.dividend(&config), 0.95 * 2.0));
    assert!(close(firm.plan_loan_demand(), 0.0));
}
