//! Block 1: firms.
//!
//! Each production sector is solved independently. Output and the wage
//! bill follow from employment; the price is a markup on unit labor cost;
//! inventories are a fixed share of output valued at unit cost and are
//! financed by the owner's equity. The remaining unknowns close the
//! sector's own flow column:
//!
//! ```text
//! formal:   [Pi, T, Pi_d, L]     M = 0, D = theta_W W
//!   Pi + zeta_1 r_L L             = Q + zeta_1 r_D D - W
//!   tau Pi - T                    = 0
//!   rho Pi - rho T - Pi_d         = 0
//!   Pi - T - Pi_d + zeta_2 L      = zeta_2 (D - E)
//!
//! informal: [Pi, T, Pi_d, M]     L = D = 0, untaxed
//!   Pi                            = Q - W
//!   T                             = 0
//!   rho Pi - rho T - Pi_d         = 0
//!   Pi - T - Pi_d - zeta_2 M      = -zeta_2 E
//! ```

use tracing::debug;

use crate::params::ParamMap;
use crate::{Block, CalibrationError, Growth, solve_block};

/// Steady-state aggregates of one production sector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorAggregates {
    /// Sector number (1-based).
    pub sector: u32,
    /// Whether the sector is formal.
    pub formal: bool,
    /// Number of entrepreneurs, one per firm.
    pub entrepreneurs: u32,
    /// Number of hired workers.
    pub workers: u32,
    /// Labor productivity.
    pub productivity: f64,
    /// Wage per worker.
    pub wage: f64,
    /// Output in units (`y`).
    pub output: f64,
    /// Wage bill (`W_F`).
    pub wage_bill: f64,
    /// Unit price (`p`).
    pub price: f64,
    /// Sales value (`Q`).
    pub sales: f64,
    /// Inventories in units (`y_inv`).
    pub inventory_units: f64,
    /// Inventories valued at unit cost (`Y_inv`).
    pub inventory_value: f64,
    /// Owner equity (`E_F`).
    pub equity: f64,
    /// Bank deposits (`D_F`).
    pub deposits: f64,
    /// Cash holdings (`M_F`).
    pub cash: f64,
    /// Bank loans (`L_F`).
    pub loans: f64,
    /// Profits (`Pi_F`).
    pub profits: f64,
    /// Profit taxes (`T_F`).
    pub taxes: f64,
    /// Dividends paid to owners (`Pi_dF`).
    pub dividends: f64,
    /// Interest paid on loans (`iota_LF`).
    pub interest_loans: f64,
    /// Interest received on deposits (`iota_DF`).
    pub interest_deposits: f64,
}

impl SectorAggregates {
    /// Number of firms in the sector.
    pub const fn firms(&self) -> u32 {
        self.entrepreneurs
    }

    /// Total headcount, entrepreneurs included.
    pub const fn headcount(&self) -> u32 {
        self.entrepreneurs.saturating_add(self.workers)
    }

    /// Output, wage bill, price, sales and inventories of one sector.
    ///
    /// Needs only the sector's structure and the markup; every funding
    /// field is left at zero.
    pub fn produce(params: &ParamMap, sector: u32) -> Result<Self, CalibrationError> {
        let entrepreneurs = params.sector_count("N_E", sector)?;
        let workers = params.sector_count("N_W", sector)?;
        let productivity = params.sector_value("phi", sector)?;
        let wage = params.sector_value("w", sector)?;
        let markup = params.value("m")?;
        let theta_y = params.policy("theta_y")?;

        let employed = f64::from(entrepreneurs) + f64::from(workers);
        let output = productivity * employed;
        let wage_bill = wage * employed;
        let (price, unit_cost) = if output > 0.0 {
            ((1.0 + markup) * wage_bill / output, wage_bill / output)
        } else {
            ((1.0 + markup) * wage, wage)
        };
        let inventory_units = theta_y * output;
        let inventory_value = unit_cost * inventory_units;

        Ok(Self {
            sector,
            formal: params.is_formal(sector),
            entrepreneurs,
            workers,
            productivity,
            wage,
            output,
            wage_bill,
            price,
            sales: price * output,
            inventory_units,
            inventory_value,
            equity: inventory_value,
            deposits: 0.0,
            cash: 0.0,
            loans: 0.0,
            profits: 0.0,
            taxes: 0.0,
            dividends: 0.0,
            interest_loans: 0.0,
            interest_deposits: 0.0,
        })
    }

    /// Close the sector's flow column: profits, taxes, dividends and the
    /// balancing stock (loans when formal, cash when informal).
    fn fund(&mut self, params: &ParamMap, growth: Growth) -> Result<(), CalibrationError> {
        let tau = params.policy("tau")?;
        let rho = params.policy("rho")?;
        let Growth { zeta_1, zeta_2, .. } = growth;
        let block = Block::Firms(self.sector);
        let Self {
            sales,
            wage_bill,
            equity,
            ..
        } = *self;

        if self.formal {
            let r_l = params.policy("r_L")?;
            let r_d = params.policy("r_D")?;
            let deposits = params.policy("theta_W")? * wage_bill;
            let [profits, taxes, dividends, loans] = solve_block(
                block,
                ["Pi_F", "T_F", "Pi_dF", "L_F"],
                [
                    [1.0, 0.0, 0.0, zeta_1 * r_l],
                    [tau, -1.0, 0.0, 0.0],
                    [rho, -rho, -1.0, 0.0],
                    [1.0, -1.0, -1.0, zeta_2],
                ],
                [
                    sales + zeta_1 * r_d * deposits - wage_bill,
                    0.0,
                    0.0,
                    zeta_2 * (deposits - equity),
                ],
            )?;
            self.deposits = deposits;
            self.loans = loans;
            self.profits = profits;
            self.taxes = taxes;
            self.dividends = dividends;
            self.interest_loans = zeta_1 * r_l * loans;
            self.interest_deposits = zeta_1 * r_d * deposits;
        } else {
            let [profits, taxes, dividends, cash] = solve_block(
                block,
                ["Pi_F", "T_F", "Pi_dF", "M_F"],
                [
                    [1.0, 0.0, 0.0, 0.0],
                    [0.0, 1.0, 0.0, 0.0],
                    [rho, -rho, -1.0, 0.0],
                    [1.0, -1.0, -1.0, -zeta_2],
                ],
                [sales - wage_bill, 0.0, 0.0, -zeta_2 * equity],
            )?;
            self.cash = cash;
            self.profits = profits;
            self.taxes = taxes;
            self.dividends = dividends;
        }

        debug!(
            sector = self.sector,
            formal = self.formal,
            output = self.output,
            price = self.price,
            profits = self.profits,
            loans = self.loans,
            "Firm sector calibrated"
        );
        Ok(())
    }
}

/// Solution of the firm block for every sector.
#[derive(Debug, Clone, PartialEq)]
pub struct FirmBlock {
    /// Growth factors shared by every block.
    pub growth: Growth,
    /// Aggregates per sector, in sector order.
    pub sectors: Vec<SectorAggregates>,
}

impl FirmBlock {
    /// Production aggregates of every sector listed by `N`, before any
    /// funding is solved.
    pub fn production(params: &ParamMap) -> Result<Self, CalibrationError> {
        let growth = Growth::from_params(params)?;
        let sectors = (1..=params.sectors()?)
            .map(|sector| SectorAggregates::produce(params, sector))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { growth, sectors })
    }

    /// Solve every production sector listed by `N`.
    ///
    /// Absent policy keys (`g`, `tau`, `rho`, `theta_y`, `theta_W`, `r_L`,
    /// `r_D`) read as zero. Without growth the funding systems are
    /// singular, so a mapping that omits `g` fails here even though
    /// [`FirmBlock::production`] succeeds on it.
    pub fn solve(params: &ParamMap) -> Result<Self, CalibrationError> {
        let mut block = Self::production(params)?;
        let growth = block.growth;
        for sector in &mut block.sectors {
            sector.fund(params, growth)?;
        }
        Ok(block)
    }

    /// Aggregates of one sector (1-based).
    pub fn sector(&self, sector: u32) -> Option<&SectorAggregates> {
        self.sectors.iter().find(|s| s.sector == sector)
    }

    fn total(&self, field: impl Fn(&SectorAggregates) -> f64) -> f64 {
        self.sectors.iter().map(field).sum()
    }

    /// Wage bill across sectors.
    pub fn wage_bill(&self) -> f64 {
        self.total(|s| s.wage_bill)
    }

    /// Sales across sectors.
    pub fn sales(&self) -> f64 {
        self.total(|s| s.sales)
    }

    /// Loans across sectors.
    pub fn loans(&self) -> f64 {
        self.total(|s| s.loans)
    }

    /// Deposits across sectors.
    pub fn deposits(&self) -> f64 {
        self.total(|s| s.deposits)
    }

    /// Owner equity across sectors.
    pub fn equity(&self) -> f64 {
        self.total(|s| s.equity)
    }

    /// Profit taxes across sectors.
    pub fn taxes(&self) -> f64 {
        self.total(|s| s.taxes)
    }

    /// Dividends across sectors.
    pub fn dividends(&self) -> f64 {
        self.total(|s| s.dividends)
    }
}
