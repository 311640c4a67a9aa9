//! Markets of the DualEco model.
//!
//! Markets match agents and move money between them through the ledger
//! primitives. Relations between agents (employment, banking) are typed
//! edge sets that a market owns; agents only keep a copy of their own
//! counterpart for convenience.
//!
//! # Modules
//!
//! - [`relation`] -- Many-to-one edge sets ([`Relation`])
//! - [`labor`] -- Job search on the formal and informal segments
//! - [`goods`] -- Per-sector cash purchases from sampled suppliers
//! - [`deposit`] -- Client assignment and deposit servicing
//! - [`credit`] -- Rationed lending and loan servicing
//! - [`bond`] -- Bond issuance, coupons and reserve settlement
//! - [`error`] -- Error types ([`MarketError`])

pub mod bond;
pub mod credit;
pub mod deposit;
pub mod error;
pub mod goods;
pub mod labor;
pub mod relation;

pub use bond::Settlement;
pub use credit::{CreditMarket, CreditReport, Servicing};
pub use deposit::DepositMarket;
pub use error::MarketError;
pub use goods::{GoodsMarket, Purchase};
pub use labor::{JobSearch, LaborMarket, Vacancy};
pub use relation::{Indexed, Relation};
