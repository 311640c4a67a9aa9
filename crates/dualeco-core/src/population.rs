//! Population creation and distribution of the calibrated steady state.
//!
//! Households are created in a fixed order: entrepreneurs per sector (one
//! per firm), bank owners, workers per sector, public employees and the
//! unemployed. Every sector aggregate is then shared among the agents that
//! hold it:
//!
//! - firm stocks in proportion to each firm's workforce;
//! - bank stocks by re-solving the bank block on each bank's own loans and
//!   deposits, which sums back to the aggregate because the block is
//!   linear;
//! - household deposits in proportion to wage income, cash in proportion
//!   to disposable income, equity to the owner of each firm and bank.
//!
//! Each household's steady-state consumption is the residual that closes
//! its own column: disposable income minus `zeta_2` times its cash,
//! deposits and equity.
//!
//! Only stocks are distributed. Every agent starts with zero period flows
//! (the calibrated flows live on in the parameter mapping); the first step
//! rebuilds them through the ledger, seeded by each household's
//! disposable income and steady-state consumption.

use dualeco_agents::{Bank, CentralBank, Firm, Government, Household, Ownership};
use dualeco_calibration::{Calibration, ParamMap, solve_bank};
use dualeco_ledger::SectorTotals;
use dualeco_markets::{CreditMarket, DepositMarket, GoodsMarket, LaborMarket};
use dualeco_types::{BankId, Employer, FirmId, HouseholdId, LaborStatus, Segment};

use crate::error::SetupError;

/// Every agent of the economy.
#[derive(Debug, Clone)]
pub struct Population {
    /// Households in creation order.
    pub households: Vec<Household>,
    /// Firms, grouped by sector.
    pub firms: Vec<Firm>,
    /// Commercial banks.
    pub banks: Vec<Bank>,
    /// The government.
    pub government: Government,
    /// The central bank.
    pub central_bank: CentralBank,
    /// Steady-state consumption of each household, in household order.
    ///
    /// Can be negative for an owner whose saving on equity exceeds its
    /// income.
    pub initial_consumption: Vec<f64>,
}

impl Population {
    /// Aggregate every agent's accounts by sector.
    pub fn sector_totals(&self) -> SectorTotals {
        let mut totals = SectorTotals::new();
        for household in &self.households {
            totals.add_agent(&household.accounts);
        }
        for firm in &self.firms {
            totals.add_agent(&firm.accounts);
            totals.inventories += firm.inventory_value;
        }
        for bank in &self.banks {
            totals.add_agent(&bank.accounts);
        }
        totals.add_agent(&self.government.accounts);
        totals.add_agent(&self.central_bank.accounts);
        totals
    }

    /// Households without a job.
    pub fn unemployed(&self) -> u32 {
        let count = self
            .households
            .iter()
            .filter(|h| h.status == LaborStatus::Unemployed)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// Market relations created alongside the population.
#[derive(Debug, Clone)]
pub struct Markets {
    /// Employment relation.
    pub labor: LaborMarket,
    /// Client-to-bank relation.
    pub deposits: DepositMarket,
    /// Borrower-to-bank relation.
    pub credit: CreditMarket,
    /// One goods market per sector, in sector order.
    pub goods: Vec<GoodsMarket>,
    /// Share of consumption spent in each sector (`alpha{s}`).
    pub shares: Vec<f64>,
}

/// Convert a vector length into the next dense id.
fn next_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Create the population and distribute the calibrated steady state.
///
/// # Errors
///
/// Returns [`SetupError::Parameter`] when a structural key is missing,
/// [`SetupError::NoFirms`] when a sector has workers but no entrepreneurs,
/// and [`SetupError::Calibration`] when a per-bank re-solve fails.
#[allow(clippy::too_many_lines)]
pub fn populate(
    calibration: &Calibration,
    params: &ParamMap,
) -> Result<(Population, Markets), SetupError> {
    let growth = calibration.growth();
    let markup = params.value("m")?;
    let tau = params.value("tau")?;
    let r_d = params.value("r_D")?;
    let r_l = params.value("r_L")?;
    let w_g = params.value("w_G")?;
    let w_min = params.value("w_min")?;
    let dole = params.value("kappa_Z")? * w_min;
    let n_banks = params.count_or_zero("N_B")?;
    let n_public = params.count("N_WG")?;
    let n_unemployed = params.count("N_U")?;

    let mut households: Vec<Household> = Vec::new();
    let mut firms: Vec<Firm> = Vec::new();
    let mut banks: Vec<Bank> = Vec::new();
    let mut labor = LaborMarket::new();
    let mut sector_firms: Vec<Vec<FirmId>> = Vec::new();

    // Entrepreneurs and their firms.
    for sector in &calibration.firms.sectors {
        let segment = if sector.formal {
            Segment::Formal
        } else {
            Segment::Informal
        };
        let mut ids = Vec::new();
        for _ in 0..sector.entrepreneurs {
            let firm_id = FirmId::new(next_index(firms.len()));
            let owner_id = HouseholdId::new(next_index(households.len()));
            let mut owner = Household::new(owner_id, LaborStatus::Entrepreneur, sector.wage);
            owner.owns = Some(Ownership::Firm(firm_id));
            labor.hire(
                &mut owner,
                Employer::Firm(firm_id),
                LaborStatus::Entrepreneur,
                sector.wage,
            );
            households.push(owner);
            firms.push(Firm::new(
                firm_id,
                sector.sector,
                segment,
                owner_id,
                sector.productivity,
                sector.wage,
                markup,
            ));
            ids.push(firm_id);
        }
        sector_firms.push(ids);
    }

    // Bank owners and their banks.
    for _ in 0..n_banks {
        let bank_id = BankId::new(next_index(banks.len()));
        let owner_id = HouseholdId::new(next_index(households.len()));
        let mut owner = Household::new(owner_id, LaborStatus::BankOwner, w_min);
        owner.owns = Some(Ownership::Bank(bank_id));
        households.push(owner);
        banks.push(Bank::new(bank_id, owner_id));
    }

    // Workers, round-robin over their sector's firms.
    for (sector, ids) in calibration.firms.sectors.iter().zip(&sector_firms) {
        if ids.is_empty() {
            if sector.workers > 0 {
                return Err(SetupError::NoFirms {
                    sector: sector.sector,
                    workers: sector.workers,
                });
            }
            continue;
        }
        let status = if sector.formal {
            LaborStatus::Formal
        } else {
            LaborStatus::Informal
        };
        for (_, &firm_id) in (0..sector.workers).zip(ids.iter().cycle()) {
            let id = HouseholdId::new(next_index(households.len()));
            let mut worker = Household::new(id, status, sector.wage);
            labor.hire(&mut worker, Employer::Firm(firm_id), status, sector.wage);
            households.push(worker);
        }
    }

    // Public employees and the unemployed.
    for _ in 0..n_public {
        let id = HouseholdId::new(next_index(households.len()));
        let mut worker = Household::new(id, LaborStatus::Public, w_g);
        labor.hire(&mut worker, Employer::Government, LaborStatus::Public, w_g);
        households.push(worker);
    }
    for _ in 0..n_unemployed {
        let id = HouseholdId::new(next_index(households.len()));
        households.push(Household::new(id, LaborStatus::Unemployed, w_min));
    }

    // Firm stocks in proportion to workforce.
    let mut firm_dividends = vec![0.0; firms.len()];
    for (firm, dividend) in firms.iter_mut().zip(&mut firm_dividends) {
        let Some(sector) = calibration.firms.sector(firm.sector) else {
            continue;
        };
        let headcount = sector.headcount();
        let share = if headcount > 0 {
            f64::from(labor.headcount(Employer::Firm(firm.id))) / f64::from(headcount)
        } else {
            0.0
        };
        let stocks = &mut firm.accounts.stocks;
        stocks.equity = sector.equity * share;
        stocks.deposits = sector.deposits * share;
        stocks.cash = sector.cash * share;
        stocks.loans = sector.loans * share;
        firm.loan_rate = if stocks.loans > 0.0 { r_l } else { 0.0 };
        firm.inventory = sector.inventory_units * share;
        firm.inventory_value = sector.inventory_value * share;
        firm.expected_sales = sector.output * share;
        firm.sold = firm.expected_sales;
        firm.profit = sector.profits * share;
        *dividend = sector.dividends * share;
    }

    // Household deposits in proportion to wage income.
    let total_wages = calibration.households.wages;
    for household in &mut households {
        let share = if total_wages > 0.0 {
            household.wage / total_wages
        } else {
            0.0
        };
        household.accounts.stocks.deposits = calibration.households.deposits * share;
    }

    // Banking relations and per-bank balance sheets.
    let bank_ids: Vec<BankId> = banks.iter().map(|b| b.id).collect();
    let deposits = DepositMarket::round_robin(
        households.iter().map(|h| h.id),
        firms.iter().filter(|f| f.is_formal()).map(|f| f.id),
        &bank_ids,
    );
    for household in &mut households {
        household.bank = deposits.bank_of_household(household.id);
    }
    for firm in &mut firms {
        firm.bank = deposits.bank_of_firm(firm.id);
    }

    let mut bank_dividends = vec![0.0; banks.len()];
    for (bank, dividend) in banks.iter_mut().zip(&mut bank_dividends) {
        let household_deposits: f64 = deposits
            .households_of(bank.id)
            .iter()
            .filter_map(|id| households.get(id.index()))
            .map(|h| h.accounts.stocks.deposits)
            .sum();
        let (firm_deposits, loans) = deposits
            .firms_of(bank.id)
            .iter()
            .filter_map(|id| firms.get(id.index()))
            .fold((0.0, 0.0), |(d, l), f| {
                (d + f.accounts.stocks.deposits, l + f.accounts.stocks.loans)
            });
        let solved = solve_bank(
            &calibration.banks.policy,
            loans,
            household_deposits + firm_deposits,
            0.0,
        )?;
        let stocks = &mut bank.accounts.stocks;
        stocks.loans = solved.loans;
        stocks.deposits = solved.deposits;
        stocks.equity = solved.equity;
        stocks.bonds = solved.bonds;
        stocks.cash = solved.reserves;
        bank.profit = solved.profits;
        *dividend = solved.dividends;
    }

    // Household incomes, equity and disposable income.
    for household in &mut households {
        let (dividends, equity) = match household.owns {
            Some(Ownership::Firm(id)) => (
                firm_dividends.get(id.index()).copied().unwrap_or(0.0),
                firms
                    .get(id.index())
                    .map_or(0.0, |f| f.accounts.stocks.equity),
            ),
            Some(Ownership::Bank(id)) => (
                bank_dividends.get(id.index()).copied().unwrap_or(0.0),
                banks
                    .get(id.index())
                    .map_or(0.0, |b| b.accounts.stocks.equity),
            ),
            None => (0.0, 0.0),
        };
        let interest = growth.zeta_1 * r_d * household.accounts.stocks.deposits;
        let transfers = if household.status == LaborStatus::Unemployed {
            dole
        } else {
            0.0
        };
        let taxes = tau * (household.wage + interest + dividends);
        household.accounts.stocks.equity = equity;
        household.disposable_income =
            household.wage + transfers + interest + dividends - taxes;
    }

    // Cash in proportion to disposable income; consumption closes the column.
    let total_disposable: f64 = households.iter().map(|h| h.disposable_income).sum();
    let mut initial_consumption = Vec::with_capacity(households.len());
    for household in &mut households {
        let share = if total_disposable > 0.0 {
            household.disposable_income / total_disposable
        } else {
            0.0
        };
        let stocks = &mut household.accounts.stocks;
        stocks.cash = calibration.households.cash * share;
        let saving = growth.zeta_2 * (stocks.cash + stocks.deposits + stocks.equity);
        initial_consumption.push(household.disposable_income - saving);
    }

    let public = &calibration.public;
    let mut government = Government::new(w_g, n_public);
    government.accounts.stocks.bonds = public.bonds_issued;
    government.accounts.stocks.cash = public.government_cash;
    let mut central_bank = CentralBank::new();
    central_bank.accounts.stocks.bonds = public.central_bank_bonds;
    central_bank.accounts.stocks.cash = public.central_bank_cash;
    central_bank.accounts.stocks.advances = public.advances;

    let goods = calibration
        .firms
        .sectors
        .iter()
        .zip(sector_firms)
        .map(|(sector, ids)| GoodsMarket::new(sector.sector, ids))
        .collect();
    let credit = CreditMarket::from_deposits(&deposits);

    let population = Population {
        households,
        firms,
        banks,
        government,
        central_bank,
        initial_consumption,
    };
    let markets = Markets {
        labor,
        deposits,
        credit,
        goods,
        shares: calibration.households.shares.clone(),
    };
    Ok((population, markets))
}
