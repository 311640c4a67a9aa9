//! Step cycle: the ten-phase loop that drives a DualEco economy.
//!
//! Each step runs these phases in a fixed order, iterating agents in id
//! order:
//!
//! 1. **Open** -- advance the clock, clear the journal, reset flows and
//!    record opening stocks.
//! 2. **Plan** -- firms revise expected sales, output, labor demand, wage,
//!    price and loan demand; the government posts vacancies.
//! 3. **Labor** -- dismissals, reservation-wage revision, job search.
//! 4. **Credit** -- loan rationing and owner equity injections.
//! 5. **Wages** -- firms and government pay wages, the government pays
//!    doles, firms produce.
//! 6. **Goods** -- households spend their consumption budget.
//! 7. **Interest** -- deposit interest, loan service, bond coupons and
//!    interest on advances.
//! 8. **Profits** -- taxes, dividends and the central bank transfer.
//! 9. **Portfolio** -- cash and deposit rebalancing, bond issuance and
//!    reserve management.
//! 10. **Close** -- revalue inventories, verify conservation, check the
//!     accounting matrices and build the [`Snapshot`].
//!
//! Given the same configuration and seed a run is reproducible.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use dualeco_agents::{Bank, BehaviorConfig, Firm, Household};
use dualeco_calibration::{ParamMap, accounting_matrix, calibrate};
use dualeco_ledger::{AccountingMatrix, ConservationResult, Journal, Transaction, primitives};
use dualeco_markets::labor::vacancy_rate;
use dualeco_markets::{JobSearch, MarketError, Vacancy, bond, deposit};
use dualeco_types::{Accounts, BankId, Employer, HouseholdId, LaborStatus, Sector, Stocks};

use crate::clock::StepClock;
use crate::config::{SimulationConfig, behavior_from_params};
use crate::error::{SetupError, StepError};
use crate::population::{Markets, Population, populate};
use crate::snapshot::Snapshot;

/// The mutable economy passed through the step cycle.
#[derive(Debug)]
pub struct SimulationContext {
    /// Step counter.
    pub clock: StepClock,
    /// Every agent.
    pub population: Population,
    /// Market relations.
    pub markets: Markets,
    /// Behavioral and policy parameters.
    pub behavior: BehaviorConfig,
    /// Full parameter mapping, calibrated values included.
    pub parameters: ParamMap,
    /// Transactions of the current step.
    pub journal: Journal,
    /// The run's only source of randomness.
    pub rng: StdRng,
    /// Decimal places used by the sigma checks.
    pub precision: u32,
    /// Whether the matrices are checked after every step.
    pub check_every_step: bool,
}

impl SimulationContext {
    /// Calibrate the configured economy and create its population.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] if calibration fails, the calibrated
    /// aggregates or the initial balance sheets do not close, or a
    /// behavioral parameter is out of range.
    pub fn new(config: &SimulationConfig) -> Result<Self, SetupError> {
        let precision = config.simulation.precision;
        let mut parameters = config.parameters();
        let calibration = calibrate(&parameters)?;
        calibration.write_into(&mut parameters);
        accounting_matrix(&parameters)
            .check(precision)
            .map_err(|source| SetupError::SteadyState { source })?;
        info!(
            parameters = parameters.len(),
            g = parameters.value_or("g", 0.0),
            "Steady state calibrated"
        );

        let behavior = behavior_from_params(&parameters)?;
        let (population, markets) = populate(&calibration, &parameters)?;

        let totals = population.sector_totals();
        AccountingMatrix::build(&totals, &totals.stocks).check(precision)?;

        info!(
            households = population.households.len(),
            firms = population.firms.len(),
            banks = population.banks.len(),
            seed = config.simulation.seed,
            "Economy created"
        );

        Ok(Self {
            clock: StepClock::new(config.simulation.steps),
            population,
            markets,
            behavior,
            parameters,
            journal: Journal::new(),
            rng: StdRng::seed_from_u64(config.simulation.seed),
            precision,
            check_every_step: config.simulation.check_every_step,
        })
    }
}

/// Counters gathered by the phases of one step.
#[derive(Debug, Default)]
struct StepReport {
    hires: u32,
    vacancy_rate: f64,
    output: f64,
    units_sold: f64,
    credit_requested: f64,
    credit_granted: f64,
    denied_at_ceiling: u32,
    defaults: f64,
    bonds_issued: f64,
}

/// Execute one complete step and return its snapshot.
///
/// # Errors
///
/// Returns [`StepError`] if the clock overflows, a market relation points
/// at a missing agent, money is not conserved, or the accounting matrices
/// do not close.
pub fn run_step(ctx: &mut SimulationContext) -> Result<Snapshot, StepError> {
    // --- Phase 1: Open ---
    let opening = phase_open(ctx)?;
    let step = ctx.clock.step();
    let market_error = |source: MarketError| StepError::Market { step, source };
    let mut report = StepReport::default();

    // --- Phase 2: Plan ---
    phase_plan(ctx);

    // --- Phase 3: Labor ---
    phase_labor(ctx, &mut report).map_err(market_error)?;

    // --- Phase 4: Credit ---
    phase_credit(ctx, &mut report).map_err(market_error)?;

    // --- Phase 5: Wages ---
    phase_wages(ctx, &mut report).map_err(market_error)?;

    // --- Phase 6: Goods ---
    phase_goods(ctx, &mut report).map_err(market_error)?;

    // --- Phase 7: Interest ---
    phase_interest(ctx, &mut report).map_err(market_error)?;

    // --- Phase 8: Profits ---
    phase_profits(ctx).map_err(market_error)?;

    // --- Phase 9: Portfolio ---
    phase_portfolio(ctx, &mut report).map_err(market_error)?;

    // --- Phase 10: Close ---
    let snapshot = phase_close(ctx, &opening, &report)?;
    info!(
        step,
        employed = snapshot.employed,
        unemployed = snapshot.unemployed,
        output = snapshot.output,
        transactions = snapshot.transactions,
        "Step closed"
    );
    Ok(snapshot)
}

fn record_all(journal: &mut Journal, transactions: Vec<Transaction>) {
    for transaction in transactions {
        journal.record(transaction);
    }
}

fn bank_mut(banks: &mut [Bank], id: BankId) -> Result<&mut Bank, MarketError> {
    banks.get_mut(id.index()).ok_or(MarketError::UnknownBank(id))
}

fn household_mut(
    households: &mut [Household],
    id: HouseholdId,
) -> Result<&mut Household, MarketError> {
    households
        .get_mut(id.index())
        .ok_or(MarketError::UnknownHousehold(id))
}

/// Withdraw up to `amount` of a client's deposits into cash.
fn withdraw(
    amount: f64,
    client: &mut Accounts,
    bank: Option<BankId>,
    banks: &mut [Bank],
    journal: &mut Journal,
) -> Result<(), MarketError> {
    let amount = amount.min(client.stocks.deposits);
    if amount <= 0.0 {
        return Ok(());
    }
    if let Some(id) = bank {
        let bank = bank_mut(banks, id)?;
        journal.record(primitives::withdraw_deposits(amount, &mut bank.accounts, client));
    }
    Ok(())
}

/// Deposit all of a client's cash.
fn deposit_cash(
    client: &mut Accounts,
    bank: Option<BankId>,
    banks: &mut [Bank],
    journal: &mut Journal,
) -> Result<(), MarketError> {
    let cash = client.stocks.cash;
    if cash <= 0.0 {
        return Ok(());
    }
    if let Some(id) = bank {
        let bank = bank_mut(banks, id)?;
        journal.record(primitives::make_deposits(cash, client, &mut bank.accounts));
    }
    Ok(())
}

/// Phase 1: advance the clock and record the opening balance sheets.
fn phase_open(ctx: &mut SimulationContext) -> Result<BTreeMap<Sector, Stocks>, StepError> {
    let step = ctx.clock.advance()?;
    ctx.journal.open_step(step);

    let population = &mut ctx.population;
    for household in &mut population.households {
        household.accounts.reset_flows();
    }
    for firm in &mut population.firms {
        firm.accounts.reset_flows();
    }
    for bank in &mut population.banks {
        bank.accounts.reset_flows();
        bank.open_step();
    }
    population.government.accounts.reset_flows();
    population.central_bank.accounts.reset_flows();

    debug!(step, "Step opened");
    Ok(population.sector_totals().stocks)
}

/// Phase 2: production planning and public vacancies.
fn phase_plan(ctx: &mut SimulationContext) {
    let SimulationContext {
        population,
        markets,
        behavior,
        rng,
        ..
    } = ctx;

    for firm in &mut population.firms {
        let headcount = markets.labor.headcount(Employer::Firm(firm.id));
        firm.plan_production(headcount, behavior, rng);
        firm.open_step();
        firm.plan_loan_demand();
    }

    // Workers are paid their employer's current wage.
    for household in &mut population.households {
        let wage = match household.employer {
            Some(Employer::Firm(id)) => population.firms.get(id.index()).map(|f| f.wage),
            _ => None,
        };
        if let Some(wage) = wage {
            household.wage = wage;
        }
    }

    let public = markets.labor.headcount(Employer::Government);
    population.government.post_vacancies(public);
    let labor_demand = population
        .firms
        .iter()
        .map(|f| f.labor_demand)
        .fold(0_u32, u32::saturating_add);
    debug!(
        labor_demand,
        public_vacancies = population.government.vacancies,
        "Production planned"
    );
}

/// Phase 3: dismissals, reservation wages and job search.
fn phase_labor(ctx: &mut SimulationContext, report: &mut StepReport) -> Result<(), MarketError> {
    let SimulationContext {
        population,
        markets,
        behavior,
        rng,
        ..
    } = ctx;
    let Population {
        households,
        firms,
        government,
        ..
    } = population;
    let labor = &mut markets.labor;

    for firm in firms.iter_mut() {
        let employer = Employer::Firm(firm.id);
        labor.dismiss_surplus(employer, firm.labor_demand, households)?;
        firm.vacancies = firm.labor_demand.saturating_sub(labor.headcount(employer));
        firm.unfilled = false;
    }

    let open = firms
        .iter()
        .map(|f| f.vacancies)
        .fold(government.vacancies, u32::saturating_add);
    let rate = vacancy_rate(open, labor.employed());
    report.vacancy_rate = rate;
    for household in households.iter_mut() {
        household.adapt_reservation_wage(rate, behavior, rng);
    }

    let offer = |firm: &Firm| Vacancy {
        employer: Employer::Firm(firm.id),
        wage: firm.wage,
        open: firm.vacancies,
    };
    let mut formal: Vec<Vacancy> = firms
        .iter()
        .filter(|f| f.is_formal() && f.vacancies > 0)
        .map(offer)
        .collect();
    if government.vacancies > 0 {
        formal.push(Vacancy {
            employer: Employer::Government,
            wage: government.wage,
            open: government.vacancies,
        });
    }
    let mut informal: Vec<Vacancy> = firms
        .iter()
        .filter(|f| !f.is_formal() && f.vacancies > 0)
        .map(offer)
        .collect();

    for household in households.iter_mut() {
        if !household.is_searching() {
            continue;
        }
        let outcome = labor.search(household, &mut formal, &mut informal, behavior.chi_w, rng);
        if let JobSearch::Matched { .. } = outcome {
            report.hires = report.hires.saturating_add(1);
        }
    }

    for vacancy in formal.iter().chain(&informal) {
        match vacancy.employer {
            Employer::Firm(id) => {
                if let Some(firm) = firms.get_mut(id.index()) {
                    firm.vacancies = vacancy.open;
                    firm.unfilled = vacancy.open > 0;
                }
            }
            Employer::Government => government.vacancies = vacancy.open,
        }
    }

    debug!(
        vacancy_rate = rate,
        hires = report.hires,
        employed = labor.employed(),
        "Labor market cleared"
    );
    Ok(())
}

/// Phase 4: loan rationing, then owners top up firms still short of
/// their wage bill.
fn phase_credit(ctx: &mut SimulationContext, report: &mut StepReport) -> Result<(), MarketError> {
    let SimulationContext {
        population,
        markets,
        behavior,
        rng,
        journal,
        ..
    } = ctx;
    let Population {
        households,
        firms,
        banks,
        ..
    } = population;

    // Loan demand is revised to the workforce actually hired.
    for firm in firms.iter_mut() {
        let headcount = markets.labor.headcount(Employer::Firm(firm.id));
        firm.labor_demand = firm.labor_demand.min(headcount.max(1));
        firm.plan_loan_demand();
    }

    let rationed = markets.credit.ration(banks, firms, behavior, rng)?;
    report.credit_requested = rationed.requested;
    report.credit_granted = rationed.granted;
    report.denied_at_ceiling = rationed.denied_ceiling;
    record_all(journal, rationed.transactions);

    for firm in firms.iter_mut() {
        let headcount = markets.labor.headcount(Employer::Firm(firm.id));
        let gap = firm.wage_bill(headcount) - firm.accounts.liquidity();
        if gap <= 0.0 {
            continue;
        }
        let owner = household_mut(households, firm.owner)?;
        let amount = gap.min(owner.accounts.stocks.cash);
        if amount > 0.0 {
            journal.record(primitives::invest_equities(
                amount,
                &mut owner.accounts,
                &mut firm.accounts,
            ));
            debug!(firm = %firm.id, amount, "Owner injected equity");
        }
    }
    Ok(())
}

/// Phase 5: wages, doles and production.
fn phase_wages(ctx: &mut SimulationContext, report: &mut StepReport) -> Result<(), MarketError> {
    let SimulationContext {
        population,
        markets,
        behavior,
        journal,
        ..
    } = ctx;
    let Population {
        households,
        firms,
        banks,
        government,
        ..
    } = population;

    for firm in firms.iter_mut() {
        let workers = markets.labor.workers_of(Employer::Firm(firm.id));
        let headcount = u32::try_from(workers.len()).unwrap_or(u32::MAX);
        if firm.is_formal() {
            let short = firm.wage_bill(headcount) - firm.accounts.stocks.cash;
            withdraw(short, &mut firm.accounts, firm.bank, banks, journal)?;
        }
        for &worker in workers {
            let household = household_mut(households, worker)?;
            let wage = firm.wage.min(firm.accounts.stocks.cash);
            if wage > 0.0 {
                journal.record(primitives::pay_wages(
                    wage,
                    &mut firm.accounts,
                    &mut household.accounts,
                ));
            }
        }
        report.output += firm.produce(headcount);
    }

    for &worker in markets.labor.workers_of(Employer::Government) {
        let household = household_mut(households, worker)?;
        journal.record(primitives::pay_wages(
            government.wage,
            &mut government.accounts,
            &mut household.accounts,
        ));
    }

    let dole = behavior.dole();
    if dole > 0.0 {
        for household in households
            .iter_mut()
            .filter(|h| h.status == LaborStatus::Unemployed)
        {
            journal.record(primitives::pay_doles(
                dole,
                &mut government.accounts,
                &mut household.accounts,
            ));
        }
    }

    debug!(output = report.output, "Wages paid and goods produced");
    Ok(())
}

/// Phase 6: consumption.
///
/// The first step spends the steady-state consumption of the calibration;
/// later steps follow the consumption rule.
fn phase_goods(ctx: &mut SimulationContext, report: &mut StepReport) -> Result<(), MarketError> {
    let first_step = ctx.clock.step() == 1;
    let SimulationContext {
        population,
        markets,
        behavior,
        rng,
        journal,
        ..
    } = ctx;
    let Population {
        households,
        firms,
        banks,
        initial_consumption,
        ..
    } = population;

    let mut spent = 0.0;
    for (household, initial) in households.iter_mut().zip(initial_consumption.iter()) {
        let budget = if first_step {
            initial.max(0.0)
        } else {
            household.desired_consumption(behavior)
        };
        if budget <= 0.0 {
            continue;
        }
        let short = budget - household.accounts.stocks.cash;
        withdraw(short, &mut household.accounts, household.bank, banks, journal)?;

        for (market, share) in markets.goods.iter().zip(&markets.shares) {
            let purchase = market.buy(
                budget * share,
                &mut household.accounts,
                firms,
                behavior.chi_y,
                rng,
            )?;
            spent += purchase.spent;
            report.units_sold += purchase.units;
            record_all(journal, purchase.transactions);
        }
    }

    debug!(spent, units = report.units_sold, "Goods market cleared");
    Ok(())
}

/// Phase 7: interest on deposits, loans, bonds and advances.
fn phase_interest(
    ctx: &mut SimulationContext,
    report: &mut StepReport,
) -> Result<(), MarketError> {
    let SimulationContext {
        population,
        markets,
        behavior,
        journal,
        ..
    } = ctx;
    let Population {
        households,
        firms,
        banks,
        government,
        central_bank,
        ..
    } = population;

    for household in households.iter_mut() {
        if let Some(id) = household.bank {
            let bank = bank_mut(banks, id)?;
            if let Some(tx) = deposit::credit_interest(behavior.r_d, bank, &mut household.accounts)
            {
                journal.record(tx);
            }
        }
    }
    for firm in firms.iter_mut().filter(|f| f.is_formal()) {
        if let Some(id) = firm.bank {
            let bank = bank_mut(banks, id)?;
            if let Some(tx) = deposit::credit_interest(behavior.r_d, bank, &mut firm.accounts) {
                journal.record(tx);
            }
        }
        deposit_cash(&mut firm.accounts, firm.bank, banks, journal)?;
    }

    let labor = &markets.labor;
    let servicing = markets.credit.service(banks, firms, |firm| {
        firm.deposit_buffer(labor.headcount(Employer::Firm(firm.id)), behavior)
    })?;
    if servicing.defaulted > 0.0 {
        warn!(
            defaulted = servicing.defaulted,
            repaid = servicing.repaid,
            "Firms defaulted on their loans"
        );
    }
    report.defaults = servicing.defaulted;
    record_all(journal, servicing.transactions);

    record_all(
        journal,
        bond::pay_coupons(behavior.r_b, government, banks, central_bank),
    );
    record_all(
        journal,
        bond::pay_advance_interest(behavior.r_a, banks, central_bank),
    );

    debug!(
        loan_interest = servicing.interest,
        repaid = servicing.repaid,
        "Interest paid"
    );
    Ok(())
}

/// Phase 8: taxes, dividends and the central bank profit transfer.
fn phase_profits(ctx: &mut SimulationContext) -> Result<(), MarketError> {
    let SimulationContext {
        population,
        behavior,
        journal,
        ..
    } = ctx;
    let Population {
        households,
        firms,
        banks,
        government,
        central_bank,
        ..
    } = population;

    for firm in firms.iter_mut() {
        firm.compute_profit();
        if firm.is_formal() {
            let tax = firm.profit_tax(behavior);
            let dividend = (behavior.rho * (firm.profit - tax)).max(0.0);
            let short = tax + dividend - firm.accounts.stocks.cash;
            withdraw(short, &mut firm.accounts, firm.bank, banks, journal)?;
        }
        if let Some(tx) = firm.pay_profit_tax(behavior, &mut government.accounts) {
            journal.record(tx);
        }
        let owner = household_mut(households, firm.owner)?;
        if let Some(tx) = firm.pay_dividend(behavior, &mut owner.accounts) {
            journal.record(tx);
        }
    }

    for bank in banks.iter_mut() {
        bank.compute_profit();
        if let Some(tx) = bank.pay_profit_tax(behavior, &mut government.accounts) {
            journal.record(tx);
        }
        let owner = household_mut(households, bank.owner)?;
        if let Some(tx) = bank.pay_dividend(behavior, &mut owner.accounts) {
            journal.record(tx);
        }
    }

    for household in households.iter_mut() {
        if let Some(tx) = household.pay_income_tax(behavior, &mut government.accounts) {
            journal.record(tx);
        }
        household.close_income();
    }

    if let Some(tx) = central_bank.transfer_profit(&mut government.accounts) {
        journal.record(tx);
    }

    debug!(
        government_cash = government.accounts.stocks.cash,
        "Profits distributed"
    );
    Ok(())
}

/// Phase 9: portfolio rebalancing and bond settlement.
fn phase_portfolio(
    ctx: &mut SimulationContext,
    report: &mut StepReport,
) -> Result<(), MarketError> {
    let SimulationContext {
        population,
        behavior,
        journal,
        ..
    } = ctx;
    let Population {
        households,
        firms,
        banks,
        government,
        central_bank,
        ..
    } = population;

    for household in households.iter_mut() {
        if let Some(id) = household.bank {
            let bank = bank_mut(banks, id)?;
            let target = behavior.theta_m * household.accounts.liquidity();
            if let Some(tx) = deposit::rebalance(target, &mut household.accounts, bank) {
                journal.record(tx);
            }
        }
    }
    for firm in firms.iter_mut().filter(|f| f.is_formal()) {
        deposit_cash(&mut firm.accounts, firm.bank, banks, journal)?;
    }

    let settlement = bond::settle(government, banks, central_bank, behavior);
    report.bonds_issued = settlement.issued;
    record_all(journal, settlement.transactions);
    Ok(())
}

/// Phase 10: revalue inventories, verify the books, build the snapshot.
fn phase_close(
    ctx: &mut SimulationContext,
    opening: &BTreeMap<Sector, Stocks>,
    report: &StepReport,
) -> Result<Snapshot, StepError> {
    let step = ctx.clock.step();
    for firm in &mut ctx.population.firms {
        firm.revalue_inventory();
    }

    if let ConservationResult::Anomaly(source) = ctx.journal.verify_conservation() {
        return Err(StepError::Ledger { step, source });
    }

    let totals = ctx.population.sector_totals();
    if ctx.check_every_step {
        AccountingMatrix::build(&totals, opening)
            .check(ctx.precision)
            .map_err(|source| StepError::Invariant { step, source })?;
    }

    debug!(step, checked = ctx.check_every_step, "Books verified");

    Ok(Snapshot {
        step,
        stocks: totals.stocks,
        flows: totals.flows,
        inventories: totals.inventories,
        employed: ctx.markets.labor.employed(),
        unemployed: ctx.population.unemployed(),
        hires: report.hires,
        vacancy_rate: report.vacancy_rate,
        output: report.output,
        units_sold: report.units_sold,
        credit_requested: report.credit_requested,
        credit_granted: report.credit_granted,
        denied_at_ceiling: report.denied_at_ceiling,
        defaults: report.defaults,
        bonds_issued: report.bonds_issued,
        transactions: ctx.journal.len(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn context(steps: u64) -> SimulationContext {
        let mut config = SimulationConfig::default();
        config.simulation.steps = steps;
        SimulationContext::new(&config).unwrap()
    }

    #[test]
    fn context_starts_at_step_zero() {
        let ctx = context(5);
        assert_eq!(ctx.clock.step(), 0);
        assert!(ctx.journal.is_empty());
        assert!(ctx.parameters.get("L_F1").is_some());
    }

    #[test]
    fn context_holds_a_closed_steady_state() {
        let ctx = context(1);
        assert!(ctx.parameters.get("C_H").is_some());
        accounting_matrix(&ctx.parameters)
            .check(ctx.precision)
            .unwrap();
    }

    #[test]
    fn one_step_closes_the_books() {
        let mut ctx = context(1);
        let snapshot = run_step(&mut ctx).unwrap();
        assert_eq!(snapshot.step, 1);
        assert!(snapshot.transactions > 0);
        assert!(snapshot.output > 0.0);
        assert!(ctx.journal.verify_conservation().is_balanced());
        assert!(ctx.clock.is_finished());
    }

    #[test]
    fn entrepreneurs_keep_their_firms() {
        let mut ctx = context(3);
        for _ in 0..3 {
            run_step(&mut ctx).unwrap();
        }
        for firm in &ctx.population.firms {
            let owner = &ctx.population.households[firm.owner.index()];
            assert_eq!(owner.status, LaborStatus::Entrepreneur);
            assert_eq!(owner.employer, Some(Employer::Firm(firm.id)));
        }
    }
}
