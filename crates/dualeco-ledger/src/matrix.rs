//! Accounting matrices and the sigma consistency check.
//!
//! The balance-sheet matrix has one row per stock plus the inventory
//! (`Y_inv`) and net-worth (`V`) rows; the transaction-flow matrix has one
//! row per flow plus one change row per stock. Columns are institutional
//! sectors. Cells carry the accounting sign of the holder, so in a
//! consistent economy every row and every column sums to zero, except the
//! residual `Y_inv` and `V` rows.
//!
//! Matrices are built from per-sector [`SectorTotals`], which can come from
//! the calibrated parameter mapping or from a live population.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dualeco_types::{Accounts, Flow, Flows, Sector, Stock, Stocks};

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// Behavior shared by balance-sheet and flow rows.
pub trait MatrixRow: Copy + Ord + core::fmt::Debug {
    /// Row label as printed in the matrix.
    fn label(self) -> String;

    /// Whether the row is a residual exempt from the row-sigma check.
    fn is_residual(self) -> bool;
}

/// A row of the balance-sheet matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StockRow {
    /// A financial stock.
    Stock(Stock),
    /// Firms' inventories valued at unit cost (`Y_inv`).
    Inventories,
    /// Net worth (`V`), minus the column sum of every other row.
    NetWorth,
}

impl MatrixRow for StockRow {
    fn label(self) -> String {
        match self {
            Self::Stock(stock) => stock.symbol().to_owned(),
            Self::Inventories => "Y_inv".to_owned(),
            Self::NetWorth => "V".to_owned(),
        }
    }

    fn is_residual(self) -> bool {
        matches!(self, Self::Inventories | Self::NetWorth)
    }
}

/// A row of the transaction-flow matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlowRow {
    /// A period flow.
    Flow(Flow),
    /// The change of a financial stock over the period.
    Change(Stock),
}

impl MatrixRow for FlowRow {
    fn label(self) -> String {
        match self {
            Self::Flow(flow) => flow.symbol().to_owned(),
            Self::Change(stock) => format!("Delta{}", stock.symbol()),
        }
    }

    fn is_residual(self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Matrix
// ---------------------------------------------------------------------------

/// One matrix row across the five institutional sectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorRow {
    /// Households column.
    pub household: f64,
    /// Firms column.
    pub firm: f64,
    /// Banks column.
    pub bank: f64,
    /// Government column.
    pub government: f64,
    /// Central bank column.
    pub central_bank: f64,
}

impl SectorRow {
    /// Read one column.
    pub const fn get(&self, sector: Sector) -> f64 {
        match sector {
            Sector::Household => self.household,
            Sector::Firm => self.firm,
            Sector::Bank => self.bank,
            Sector::Government => self.government,
            Sector::CentralBank => self.central_bank,
        }
    }

    /// Mutable access to one column.
    pub const fn get_mut(&mut self, sector: Sector) -> &mut f64 {
        match sector {
            Sector::Household => &mut self.household,
            Sector::Firm => &mut self.firm,
            Sector::Bank => &mut self.bank,
            Sector::Government => &mut self.government,
            Sector::CentralBank => &mut self.central_bank,
        }
    }

    /// Row sigma: the sum across sectors.
    pub fn sigma(&self) -> f64 {
        Sector::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

/// A labelled accounting matrix with sigma row and column.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<R> {
    rows: BTreeMap<R, SectorRow>,
}

/// Balance-sheet matrix.
pub type StockMatrix = Matrix<StockRow>;

/// Transaction-flow matrix.
pub type FlowMatrix = Matrix<FlowRow>;

impl<R: MatrixRow> Default for Matrix<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: MatrixRow> Matrix<R> {
    /// Create an empty matrix.
    pub const fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    /// Add `value` to a cell.
    pub fn add(&mut self, row: R, sector: Sector, value: f64) {
        *self.rows.entry(row).or_default().get_mut(sector) += value;
    }

    /// Read a cell (zero when the row was never written).
    pub fn cell(&self, row: R, sector: Sector) -> f64 {
        self.rows.get(&row).map_or(0.0, |r| r.get(sector))
    }

    /// Iterate rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = (R, &SectorRow)> {
        self.rows.iter().map(|(row, values)| (*row, values))
    }

    /// Sum of a row across sectors.
    pub fn row_sigma(&self, row: R) -> f64 {
        self.rows.get(&row).map_or(0.0, SectorRow::sigma)
    }

    /// Sum of a column across all rows.
    pub fn column_sigma(&self, sector: Sector) -> f64 {
        self.rows.values().map(|r| r.get(sector)).sum()
    }

    /// Every sigma that does not round to zero at `precision` decimals.
    pub fn breaches(&self, precision: u32) -> Vec<SigmaBreach> {
        let mut out = Vec::new();
        for (row, values) in &self.rows {
            if row.is_residual() {
                continue;
            }
            let sigma = values.sigma();
            if !rounds_to_zero(sigma, precision) {
                out.push(SigmaBreach {
                    label: row.label(),
                    axis: Axis::Row,
                    value: sigma,
                });
            }
        }
        for sector in Sector::ALL {
            let sigma = self.column_sigma(sector);
            if !rounds_to_zero(sigma, precision) {
                out.push(SigmaBreach {
                    label: sector.symbol().to_owned(),
                    axis: Axis::Column,
                    value: sigma,
                });
            }
        }
        out
    }
}

impl StockMatrix {
    /// Fill the `V` row so every column of the balance sheet sums to zero.
    pub fn close_net_worth(&mut self) {
        self.rows.remove(&StockRow::NetWorth);
        let mut net_worth = SectorRow::default();
        for sector in Sector::ALL {
            *net_worth.get_mut(sector) = -self.column_sigma(sector);
        }
        self.rows.insert(StockRow::NetWorth, net_worth);
    }
}

impl<R: MatrixRow> core::fmt::Display for Matrix<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:>10}", "")?;
        for sector in Sector::ALL {
            write!(f, "{:>14}", sector.symbol())?;
        }
        writeln!(f, "{:>14}", "sigma")?;
        for (row, values) in &self.rows {
            write!(f, "{:>10}", row.label())?;
            for sector in Sector::ALL {
                write!(f, "{:>14.4}", values.get(sector))?;
            }
            writeln!(f, "{:>14.4}", values.sigma())?;
        }
        write!(f, "{:>10}", "sigma")?;
        for sector in Sector::ALL {
            write!(f, "{:>14.4}", self.column_sigma(sector))?;
        }
        writeln!(f)
    }
}

// ---------------------------------------------------------------------------
// Sector totals
// ---------------------------------------------------------------------------

/// Stocks and flows aggregated per institutional sector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorTotals {
    /// Summed stocks per sector.
    pub stocks: BTreeMap<Sector, Stocks>,
    /// Summed flows per sector.
    pub flows: BTreeMap<Sector, Flows>,
    /// Value of firms' inventories.
    pub inventories: f64,
}

impl SectorTotals {
    /// Create empty totals.
    pub const fn new() -> Self {
        Self {
            stocks: BTreeMap::new(),
            flows: BTreeMap::new(),
            inventories: 0.0,
        }
    }

    /// Fold one agent's accounts into its sector.
    pub fn add_agent(&mut self, accounts: &Accounts) {
        let stocks = self.stocks.entry(accounts.sector).or_default();
        *stocks = stocks.plus(&accounts.stocks);
        let flows = self.flows.entry(accounts.sector).or_default();
        *flows = flows.plus(&accounts.flows);
    }

    /// Summed stocks of one sector.
    pub fn stocks_of(&self, sector: Sector) -> Stocks {
        self.stocks.get(&sector).copied().unwrap_or_default()
    }

    /// Summed flows of one sector.
    pub fn flows_of(&self, sector: Sector) -> Flows {
        self.flows.get(&sector).copied().unwrap_or_default()
    }

    /// Stocks of every sector scaled by `factor`.
    pub fn scaled_stocks(&self, factor: f64) -> BTreeMap<Sector, Stocks> {
        self.stocks
            .iter()
            .map(|(sector, stocks)| (*sector, stocks.scaled(factor)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Accounting matrix
// ---------------------------------------------------------------------------

/// Balance-sheet and transaction-flow matrices of one period.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountingMatrix {
    /// End-of-period balance sheet.
    pub stocks: StockMatrix,
    /// Flows of the period, including stock changes.
    pub flows: FlowMatrix,
}

impl AccountingMatrix {
    /// Build both matrices from closing totals and opening stocks.
    ///
    /// Change rows record `closing - opening` as a use of funds, so a
    /// sector's column sums to its income minus the growth of its net
    /// financial position.
    pub fn build(closing: &SectorTotals, opening: &BTreeMap<Sector, Stocks>) -> Self {
        let mut stocks = StockMatrix::new();
        let mut flows = FlowMatrix::new();

        for sector in Sector::ALL {
            let end = closing.stocks_of(sector);
            let start = opening.get(&sector).copied().unwrap_or_default();
            let period = closing.flows_of(sector);

            for stock in Stock::ALL {
                let sign = stock.sign(sector);
                if sign.abs() > 0.0 {
                    stocks.add(StockRow::Stock(stock), sector, sign * end.get(stock));
                    let change = end.get(stock) - start.get(stock);
                    flows.add(FlowRow::Change(stock), sector, -sign * change);
                }
            }
            for flow in Flow::ALL {
                let sign = flow.sign(sector);
                if sign.abs() > 0.0 {
                    flows.add(FlowRow::Flow(flow), sector, sign * period.get(flow));
                }
            }
        }

        stocks.add(StockRow::Inventories, Sector::Firm, closing.inventories);
        stocks.close_net_worth();

        Self { stocks, flows }
    }

    /// Run the sigma check on both matrices.
    ///
    /// Every row sigma (except `Y_inv` and `V`) and every column sigma must
    /// round to zero at `precision` decimal places.
    pub fn check(&self, precision: u32) -> Result<(), InvariantViolation> {
        let mut breaches: Vec<(Table, SigmaBreach)> = Vec::new();
        breaches.extend(
            self.stocks
                .breaches(precision)
                .into_iter()
                .map(|b| (Table::Stocks, b)),
        );
        breaches.extend(
            self.flows
                .breaches(precision)
                .into_iter()
                .map(|b| (Table::Flows, b)),
        );
        if breaches.is_empty() {
            Ok(())
        } else {
            Err(InvariantViolation {
                precision,
                breaches,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// Which matrix a breach was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Table {
    /// The balance-sheet matrix.
    Stocks,
    /// The transaction-flow matrix.
    Flows,
}

/// Whether a breach is a row sigma or a column sigma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Sum across sectors.
    Row,
    /// Sum within a sector.
    Column,
}

/// A sigma that does not net to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigmaBreach {
    /// Row or column label.
    pub label: String,
    /// Row or column sigma.
    pub axis: Axis,
    /// Unrounded sigma value.
    pub value: f64,
}

/// The accounting matrix is not consistent.
///
/// Signals a logic defect in the calibrator or in a ledger primitive.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("accounting matrix inconsistent at {precision} decimals: {}", describe(.breaches))]
pub struct InvariantViolation {
    /// Rounding precision used by the check.
    pub precision: u32,
    /// Every offending row and column.
    pub breaches: Vec<(Table, SigmaBreach)>,
}

fn describe(breaches: &[(Table, SigmaBreach)]) -> String {
    breaches
        .iter()
        .map(|(table, b)| format!("{table:?} {:?} {} = {}", b.axis, b.label, b.value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Round `value` to `precision` decimal places.
///
/// Returns `None` for non-finite values or values outside the decimal range.
pub fn rounded(value: f64, precision: u32) -> Option<Decimal> {
    Decimal::from_f64_retain(value).map(|d| d.round_dp(precision))
}

fn rounds_to_zero(value: f64, precision: u32) -> bool {
    rounded(value, precision).is_some_and(|d| d.is_zero())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::primitives;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn totals_of(agents: &[Accounts]) -> SectorTotals {
        let mut totals = SectorTotals::new();
        for a in agents {
            totals.add_agent(a);
        }
        totals
    }

    #[test]
    fn empty_totals_give_a_zero_matrix() {
        let matrix = AccountingMatrix::build(&SectorTotals::new(), &BTreeMap::new());
        assert!(matrix.check(2).is_ok());
        for (_, row) in matrix.stocks.rows() {
            assert_close(row.sigma(), 0.0);
        }
    }

    #[test]
    fn rounding_uses_decimal_places() {
        assert_eq!(rounded(0.004, 2), Some(dec!(0.00)));
        assert_eq!(rounded(1.235, 1), Some(dec!(1.2)));
        assert_eq!(rounded(f64::NAN, 2), None);
        assert!(rounds_to_zero(-0.004, 2));
        assert!(!rounds_to_zero(0.006, 2));
    }

    #[test]
    fn transactions_keep_matrix_consistent() {
        let mut firm = Accounts::new(Sector::Firm);
        let mut worker = Accounts::new(Sector::Household);
        let mut bank = Accounts::new(Sector::Bank);
        let mut gov = Accounts::new(Sector::Government);
        let mut cb = Accounts::new(Sector::CentralBank);
        let opening = totals_of(&[firm, worker, bank, gov, cb]).stocks;

        let _ = primitives::give_advances(40.0, &mut cb, &mut bank);
        let _ = primitives::give_loans(30.0, &mut bank, &mut firm);
        let _ = primitives::withdraw_deposits(30.0, &mut bank, &mut firm);
        let _ = primitives::pay_wages(30.0, &mut firm, &mut worker);
        let _ = primitives::consume_goods(20.0, &mut worker, &mut firm);
        let _ = primitives::pay_taxes(2.0, &mut worker, &mut gov);
        let _ = primitives::buy_bonds(5.0, &mut bank, &mut gov);
        let _ = primitives::repay_bonds(0.0, 0.5, &mut gov, &mut bank);
        let _ = primitives::repay_advances(0.0, 0.4, &mut bank, &mut cb);
        let _ = primitives::transfer_profits(0.4, &mut cb, &mut gov);

        let mut closing = totals_of(&[firm, worker, bank, gov, cb]);
        closing.inventories = 12.0;
        let matrix = AccountingMatrix::build(&closing, &opening);

        assert!(matrix.check(2).is_ok(), "{:?}", matrix.check(2));
        assert_close(matrix.stocks.row_sigma(StockRow::Inventories), 12.0);
        assert_close(matrix.stocks.cell(StockRow::Stock(Stock::Cash), Sector::CentralBank), -40.0);
        assert_close(matrix.flows.cell(FlowRow::Flow(Flow::Consumption), Sector::Household), -20.0);
    }

    #[test]
    fn unmatched_balance_is_reported() {
        let mut household = Accounts::new(Sector::Household);
        household.stocks.deposits = 10.0;
        let closing = totals_of(&[household]);
        let opening = closing.stocks.clone();

        let violation = AccountingMatrix::build(&closing, &opening).check(2).unwrap_err();

        assert!(
            violation
                .breaches
                .iter()
                .any(|(table, b)| *table == Table::Stocks && b.axis == Axis::Row && b.label == "D")
        );
        assert!(violation.to_string().contains("D = 10"));
    }

    #[test]
    fn net_worth_row_closes_columns() {
        let mut m = StockMatrix::new();
        m.add(StockRow::Stock(Stock::Deposits), Sector::Household, 10.0);
        m.add(StockRow::Inventories, Sector::Firm, 3.0);
        m.close_net_worth();
        assert_close(m.cell(StockRow::NetWorth, Sector::Household), -10.0);
        assert_close(m.cell(StockRow::NetWorth, Sector::Firm), -3.0);
        assert_close(m.column_sigma(Sector::Household), 0.0);
    }

    #[test]
    fn display_lists_every_row() {
        let mut m = FlowMatrix::new();
        m.add(FlowRow::Flow(Flow::Wages), Sector::Household, 1.0);
        m.add(FlowRow::Change(Stock::Cash), Sector::Household, -1.0);
        let text = m.to_string();
        assert!(text.contains("W"));
        assert!(text.contains("DeltaM"));
        assert!(text.contains("sigma"));
    }
}
