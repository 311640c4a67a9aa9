//! One pass through every market on a small economy, checking that money
//! is conserved and relations stay consistent.

#![allow(clippy::unwrap_used)]

use rand::SeedableRng;
use rand::rngs::SmallRng;

use dualeco_agents::{Bank, BehaviorConfig, CentralBank, Firm, Government, Household};
use dualeco_ledger::Journal;
use dualeco_markets::labor::vacancy_rate;
use dualeco_markets::{
    CreditMarket, DepositMarket, GoodsMarket, JobSearch, LaborMarket, Vacancy, bond, deposit,
};
use dualeco_types::{BankId, Employer, FirmId, HouseholdId, LaborStatus, Segment};

struct Economy {
    households: Vec<Household>,
    firms: Vec<Firm>,
    banks: Vec<Bank>,
    government: Government,
    central_bank: CentralBank,
}

fn economy() -> Economy {
    let households = (0..8)
        .map(|i| {
            let mut h = Household::new(HouseholdId::new(i), LaborStatus::Unemployed, 0.8);
            h.accounts.stocks.cash = 10.0;
            h
        })
        .collect();
    let firms = vec![
        Firm::new(FirmId::new(0), 1, Segment::Formal, HouseholdId::new(0), 1.2, 1.0, 0.2),
        Firm::new(FirmId::new(1), 2, Segment::Informal, HouseholdId::new(1), 1.0, 0.6, 0.2),
    ];
    let banks = vec![
        Bank::new(BankId::new(0), HouseholdId::new(6)),
        Bank::new(BankId::new(1), HouseholdId::new(7)),
    ];
    Economy {
        households,
        firms,
        banks,
        government: Government::new(1.0, 2),
        central_bank: CentralBank::new(),
    }
}

#[test]
fn a_market_round_conserves_money() {
    let config = BehaviorConfig::default();
    let mut rng = SmallRng::seed_from_u64(2024);
    let mut eco = economy();
    let mut journal = Journal::new();
    journal.open_step(1);

    // Banking relations and initial deposits.
    let bank_ids: Vec<BankId> = eco.banks.iter().map(|b| b.id).collect();
    let deposits = DepositMarket::round_robin(
        eco.households.iter().map(|h| h.id),
        eco.firms.iter().filter(|f| f.is_formal()).map(|f| f.id),
        &bank_ids,
    );
    for household in &mut eco.households {
        let bank = deposits.bank_of_household(household.id).unwrap();
        let target = config.theta_m * household.accounts.liquidity();
        let bank = &mut eco.banks[bank.index()];
        if let Some(tx) = deposit::rebalance(target, &mut household.accounts, bank) {
            journal.record(tx);
        }
    }
    for bank in &mut eco.banks {
        bank.accounts.stocks.equity = 40.0;
    }

    // Labor.
    let mut labor = LaborMarket::new();
    let mut formal = vec![
        Vacancy {
            employer: Employer::Firm(FirmId::new(0)),
            wage: 1.0,
            open: 2,
        },
        Vacancy {
            employer: Employer::Government,
            wage: 1.0,
            open: 2,
        },
    ];
    let mut informal = vec![Vacancy {
        employer: Employer::Firm(FirmId::new(1)),
        wage: 0.6,
        open: 3,
    }];
    let mut matched = 0_u32;
    for household in &mut eco.households {
        if labor.search(household, &mut formal, &mut informal, config.chi_w, &mut rng)
            != JobSearch::Unmatched
        {
            matched = matched.saturating_add(1);
        }
    }
    assert_eq!(matched, labor.employed());
    assert!(labor.employed() <= 7);
    let open: u32 = formal.iter().chain(&informal).map(|v| v.open).sum();
    assert!(vacancy_rate(open, labor.employed()) < 1.0);

    // Credit for the formal firm's wage bill.
    let credit = CreditMarket::from_deposits(&deposits);
    let formal_firm = &mut eco.firms[0];
    formal_firm.accounts.stocks.equity = 10.0;
    formal_firm.loan_demand = 2.0;
    let report = credit
        .ration(&mut eco.banks, &mut eco.firms, &config, &mut rng)
        .unwrap();
    report.transactions.into_iter().for_each(|tx| journal.record(tx));
    assert!(credit.lender_of(FirmId::new(1)).is_none());

    // Production and consumption.
    for firm in &mut eco.firms {
        let headcount = labor.headcount(Employer::Firm(firm.id));
        firm.produce(headcount);
    }
    let markets = [
        GoodsMarket::new(1, vec![FirmId::new(0)]),
        GoodsMarket::new(2, vec![FirmId::new(1)]),
    ];
    for household in &mut eco.households {
        for market in &markets {
            let purchase = market
                .buy(1.0, &mut household.accounts, &mut eco.firms, config.chi_y, &mut rng)
                .unwrap();
            purchase.transactions.into_iter().for_each(|tx| journal.record(tx));
        }
    }

    // Government pays its employees and settles its deficit.
    for &worker in labor.workers_of(Employer::Government) {
        let wage = eco.government.wage;
        journal.record(dualeco_ledger::primitives::pay_wages(
            wage,
            &mut eco.government.accounts,
            &mut eco.households[worker.index()].accounts,
        ));
    }
    let settlement = bond::settle(
        &mut eco.government,
        &mut eco.banks,
        &mut eco.central_bank,
        &config,
    );
    assert!(eco.government.accounts.stocks.cash >= -1e-9);
    settlement.transactions.into_iter().for_each(|tx| journal.record(tx));

    assert!(journal.verify_conservation().is_balanced());
}
