//! Enumeration types for the DualEco model.
//!
//! Sectors and stock/flow kinds double as the row and column labels of the
//! accounting matrix, so their declaration order is the display order.

use serde::{Deserialize, Serialize};

use crate::ids::FirmId;

// ---------------------------------------------------------------------------
// Institutional sectors
// ---------------------------------------------------------------------------

/// Institutional sector tag carried by every agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sector {
    /// Households (workers, entrepreneurs, bank owners, unemployed).
    Household,
    /// Production firms, formal and informal.
    Firm,
    /// Commercial banks.
    Bank,
    /// The government.
    Government,
    /// The central bank.
    CentralBank,
}

impl Sector {
    /// All sectors in accounting-matrix column order.
    pub const ALL: [Self; 5] = [
        Self::Household,
        Self::Firm,
        Self::Bank,
        Self::Government,
        Self::CentralBank,
    ];

    /// Short column label used in accounting matrices.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Household => "H",
            Self::Firm => "F",
            Self::Bank => "B",
            Self::Government => "G",
            Self::CentralBank => "CB",
        }
    }
}

impl core::fmt::Display for Sector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.symbol())
    }
}

// ---------------------------------------------------------------------------
// Stocks and flows
// ---------------------------------------------------------------------------

/// A balance-sheet stock held at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stock {
    /// Cash and central bank money (`M`).
    Cash,
    /// Central bank advances to banks (`A`).
    Advances,
    /// Bank deposits (`D`).
    Deposits,
    /// Government bonds (`B`).
    Bonds,
    /// Bank loans to firms (`L`).
    Loans,
    /// Owner equity in firms and banks (`E`).
    Equity,
}

impl Stock {
    /// All stocks in accounting-matrix row order.
    pub const ALL: [Self; 6] = [
        Self::Cash,
        Self::Advances,
        Self::Deposits,
        Self::Bonds,
        Self::Loans,
        Self::Equity,
    ];

    /// Short row label.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Cash => "M",
            Self::Advances => "A",
            Self::Deposits => "D",
            Self::Bonds => "B",
            Self::Loans => "L",
            Self::Equity => "E",
        }
    }

    /// Balance-sheet role of this stock for a sector.
    ///
    /// `+1.0` marks an asset, `-1.0` a liability and `0.0` a stock the
    /// sector never holds.
    pub const fn sign(self, sector: Sector) -> f64 {
        use Sector::{Bank, CentralBank, Firm, Government, Household};
        match (self, sector) {
            (Self::Cash, Household | Firm | Bank | Government)
            | (Self::Advances | Self::Bonds, CentralBank)
            | (Self::Deposits, Household | Firm)
            | (Self::Bonds | Self::Loans, Bank)
            | (Self::Equity, Household) => 1.0,
            (Self::Cash, CentralBank)
            | (Self::Advances | Self::Deposits, Bank)
            | (Self::Bonds, Government)
            | (Self::Loans, Firm)
            | (Self::Equity, Firm | Bank) => -1.0,
            _ => 0.0,
        }
    }
}

/// A quantity accrued over one simulated period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Flow {
    /// Household consumption, booked as sales (`Q`) on the firm side.
    Consumption,
    /// Wages (`W`).
    Wages,
    /// Public transfers to the unemployed (`Z`).
    Transfers,
    /// Taxes (`T`).
    Taxes,
    /// Interest on central bank advances (`iota_A`).
    InterestAdvances,
    /// Coupons on government bonds (`iota_B`).
    InterestBonds,
    /// Interest on loans (`iota_L`).
    InterestLoans,
    /// Interest on deposits (`iota_D`).
    InterestDeposits,
    /// Dividends (`Pi_d`).
    Dividends,
    /// Central bank profit transferred to the government (`Pi`).
    Profits,
    /// Loans written off after a default (`L_def`).
    Defaults,
}

impl Flow {
    /// All flows in accounting-matrix row order.
    pub const ALL: [Self; 11] = [
        Self::Consumption,
        Self::Wages,
        Self::Transfers,
        Self::Taxes,
        Self::InterestAdvances,
        Self::InterestBonds,
        Self::InterestLoans,
        Self::InterestDeposits,
        Self::Dividends,
        Self::Profits,
        Self::Defaults,
    ];

    /// Short row label.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Consumption => "C",
            Self::Wages => "W",
            Self::Transfers => "Z",
            Self::Taxes => "T",
            Self::InterestAdvances => "iota_A",
            Self::InterestBonds => "iota_B",
            Self::InterestLoans => "iota_L",
            Self::InterestDeposits => "iota_D",
            Self::Dividends => "Pi_d",
            Self::Profits => "Pi",
            Self::Defaults => "L_def",
        }
    }

    /// Direction of this flow for a sector.
    ///
    /// `+1.0` is a source of funds (income), `-1.0` a use of funds and
    /// `0.0` a flow the sector never records.
    pub const fn sign(self, sector: Sector) -> f64 {
        use Sector::{Bank, CentralBank, Firm, Government, Household};
        match (self, sector) {
            (Self::Consumption, Firm)
            | (Self::Wages | Self::Transfers, Household)
            | (Self::Taxes | Self::Profits, Government)
            | (Self::InterestAdvances, CentralBank)
            | (Self::InterestBonds, Bank | CentralBank)
            | (Self::InterestLoans, Bank)
            | (Self::InterestDeposits, Household | Firm)
            | (Self::Dividends, Household)
            | (Self::Defaults, Firm) => 1.0,
            (Self::Consumption, Household)
            | (Self::Wages, Firm | Government)
            | (Self::Transfers | Self::InterestBonds, Government)
            | (Self::Taxes, Household | Firm | Bank)
            | (Self::InterestAdvances | Self::InterestDeposits | Self::Defaults, Bank)
            | (Self::InterestLoans, Firm)
            | (Self::Dividends, Firm | Bank)
            | (Self::Profits, CentralBank) => -1.0,
            _ => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Labor
// ---------------------------------------------------------------------------

/// Segment of the dual economy a firm or labor market belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Segment {
    /// Taxed, banked, credit-eligible production (and public employment).
    Formal,
    /// Cash-only, untaxed production.
    Informal,
}

/// An employer on a labor market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Employer {
    /// A production firm.
    Firm(FirmId),
    /// The government, hiring public employees on the formal market.
    Government,
}

/// Labor-market state of a household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LaborStatus {
    /// Without a job, receiving transfers.
    Unemployed,
    /// Employed by a formal firm.
    Formal,
    /// Employed by an informal firm.
    Informal,
    /// Working in the household's own firm.
    Entrepreneur,
    /// Employed by the government.
    Public,
    /// Owner of a bank, outside the labor force.
    BankOwner,
}

impl LaborStatus {
    /// Whether the household currently holds a wage-paying job.
    pub const fn is_employed(self) -> bool {
        matches!(
            self,
            Self::Formal | Self::Informal | Self::Entrepreneur | Self::Public
        )
    }

    /// Whether the household takes part in job search at all.
    ///
    /// Entrepreneurs are tied to their own firm and bank owners live on
    /// dividends; neither ever searches.
    pub const fn can_search(self) -> bool {
        !matches!(self, Self::Entrepreneur | Self::BankOwner)
    }
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// The ledger primitive that produced a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Employer pays a wage to a worker.
    PayWages,
    /// Government pays a transfer to a household.
    PayDoles,
    /// A payer settles taxes with the government.
    PayTaxes,
    /// A firm or bank distributes dividends to its owner.
    PayDividends,
    /// Central bank transfers its profit to the government.
    TransferProfits,
    /// Central bank lends reserves to a bank.
    GiveAdvances,
    /// A bank repays advances and interest.
    RepayAdvances,
    /// An owner injects equity into a firm or bank.
    InvestEquities,
    /// A firm or bank pays back its owner's equity.
    ReimburseEquities,
    /// A household buys goods from a firm.
    ConsumeGoods,
    /// An agent moves cash into its deposit account.
    MakeDeposits,
    /// An agent withdraws cash from its deposit account.
    WithdrawDeposits,
    /// A bank credits deposit interest.
    PayInterests,
    /// A bank grants a loan into the borrower's deposit account.
    GiveLoans,
    /// A firm repays loan capital and interest.
    RepayLoans,
    /// A firm defaults on outstanding loans.
    MakeDefaults,
    /// A bank or the central bank buys newly issued bonds.
    BuyBonds,
    /// The government pays coupons and redeems bonds.
    RepayBonds,
    /// A bank sells bonds to the central bank.
    TransferBonds,
}
