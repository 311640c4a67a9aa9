//! Steady-state calibration for the DualEco model.
//!
//! Given structural and behavioral parameters, the calibrator computes an
//! accounting-consistent allocation of every stock and flow for every
//! institutional sector. It solves four small dense linear systems in a
//! fixed order, each depending on the previous block's solution:
//!
//! 1. [`FirmBlock`] -- output, prices, profits and funding per sector.
//! 2. [`BankBlock`] -- bank profits, equity, bonds and reserves.
//! 3. [`HouseholdBlock`] -- income, taxes, disposable income and cash.
//! 4. [`PublicBlock`] -- government deficit financing and the central bank.
//!
//! Each block's `solve` takes the previous blocks by reference, so the
//! ordering is enforced by the types. [`calibrate`] runs the whole pipeline
//! and [`Calibration::write_into`] stores the solution back into the
//! [`ParamMap`] under canonical keys.
//!
//! In the steady state every stock grows at rate `g`. Interest is paid on
//! the previous period's stock (`zeta_1 r X`) and the period change of a
//! stock is `zeta_2 X`, with `zeta_1 = 1/(1+g)` and `zeta_2 = g/(1+g)`.
//!
//! # Usage
//!
//! ```
//! use dualeco_calibration::{ParamMap, accounting_matrix, calibrate};
//!
//! let mut params = ParamMap::baseline();
//! let calibration = calibrate(&params).unwrap();
//! calibration.write_into(&mut params);
//!
//! accounting_matrix(&params).check(6).unwrap();
//! ```

pub mod accounts;
pub mod banks;
pub mod firms;
pub mod households;
pub mod linalg;
pub mod params;
pub mod pipeline;
pub mod public;

pub use accounts::{accounting_matrix, sector_totals};
pub use banks::{BankAggregates, BankBlock, BankPolicy, solve_bank};
pub use firms::{FirmBlock, SectorAggregates};
pub use households::HouseholdBlock;
pub use params::{ParamError, ParamMap, sector_key};
pub use pipeline::{Calibration, calibrate};
pub use public::PublicBlock;

use linalg::SolveError;

/// One of the four calibration blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Block {
    /// Firms of one production sector (1-based).
    Firms(u32),
    /// The banking sector, or a single bank during distribution.
    Banks,
    /// The household sector.
    Households,
    /// Government and central bank.
    Public,
}

impl core::fmt::Display for Block {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Firms(sector) => write!(f, "firms (sector {sector})"),
            Self::Banks => write!(f, "banks"),
            Self::Households => write!(f, "households"),
            Self::Public => write!(f, "public"),
        }
    }
}

/// Errors that make a parameter set uncalibratable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    /// A block's coefficient matrix is singular.
    #[error("{block} block is singular: no pivot for unknown {unknown}")]
    Singular {
        /// The failing block.
        block: Block,
        /// Name of the unknown whose column lacks a pivot.
        unknown: &'static str,
    },

    /// A block's solution is NaN or infinite.
    #[error("{block} block produced a non-finite {unknown}")]
    NonFinite {
        /// The failing block.
        block: Block,
        /// Name of the offending unknown.
        unknown: &'static str,
    },

    /// A required parameter is missing or invalid.
    #[error(transparent)]
    Param(#[from] ParamError),
}

/// Steady-state growth factors derived from `g`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Growth {
    /// Steady-state growth rate.
    pub g: f64,
    /// Share of a stock carried over from the previous period, `1/(1+g)`.
    pub zeta_1: f64,
    /// Share of a stock created in the current period, `g/(1+g)`.
    pub zeta_2: f64,
}

impl Growth {
    /// Derive the growth factors for rate `g`.
    pub fn new(g: f64) -> Self {
        Self {
            g,
            zeta_1: 1.0 / (1.0 + g),
            zeta_2: g / (1.0 + g),
        }
    }

    /// Read `g` from the parameters, zero when absent.
    pub fn from_params(params: &ParamMap) -> Result<Self, CalibrationError> {
        Ok(Self::new(params.policy("g")?))
    }
}

/// Solve one block, naming the failing unknown on error.
pub(crate) fn solve_block<const N: usize>(
    block: Block,
    unknowns: [&'static str; N],
    a: [[f64; N]; N],
    b: [f64; N],
) -> Result<[f64; N], CalibrationError> {
    let name = |index: usize| unknowns.get(index).copied().unwrap_or("?");
    linalg::solve(a, b).map_err(|err| match err {
        SolveError::Singular { column } => CalibrationError::Singular {
            block,
            unknown: name(column),
        },
        SolveError::NonFinite { index } => CalibrationError::NonFinite {
            block,
            unknown: name(index),
        },
    })
}
