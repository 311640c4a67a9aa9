//! Credit market: rationed lending to formal firms and loan servicing.
//!
//! A firm borrows only from the bank that holds its deposits. Banks work
//! through their borrowers in client order and stop granting once the
//! step's lending ceiling is reached.

use rand::Rng;
use tracing::{debug, warn};

use dualeco_agents::{Bank, BehaviorConfig, Denial, Firm, LoanDecision};
use dualeco_ledger::{Transaction, primitives};
use dualeco_types::{BankId, FirmId};

use crate::deposit::DepositMarket;
use crate::error::MarketError;
use crate::relation::Relation;

/// Aggregate outcome of one rationing round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreditReport {
    /// Total amount requested.
    pub requested: f64,
    /// Total amount granted.
    pub granted: f64,
    /// Requests denied at a bank's ceiling.
    pub denied_ceiling: u32,
    /// Requests denied for any other reason.
    pub denied_other: u32,
    /// Transactions applied.
    pub transactions: Vec<Transaction>,
}

/// Outcome of servicing outstanding loans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Servicing {
    /// Interest paid by firms.
    pub interest: f64,
    /// Capital repaid.
    pub repaid: f64,
    /// Loans written off.
    pub defaulted: f64,
    /// Transactions applied.
    pub transactions: Vec<Transaction>,
}

/// Lending relations between formal firms and banks.
#[derive(Debug, Clone, Default)]
pub struct CreditMarket {
    borrowers: Relation<FirmId, BankId>,
}

impl CreditMarket {
    /// Lend along the deposit relations.
    pub fn from_deposits(deposits: &DepositMarket) -> Self {
        Self {
            borrowers: deposits.firm_relation().clone(),
        }
    }

    /// Lender of a firm.
    pub fn lender_of(&self, firm: FirmId) -> Option<BankId> {
        self.borrowers.partner_of(firm)
    }

    /// Grant or deny every firm's pending loan demand.
    ///
    /// Granted loans credit the firm's deposits and fold the new rate
    /// into the firm's average loan rate.
    pub fn ration<R: Rng + ?Sized>(
        &self,
        banks: &mut [Bank],
        firms: &mut [Firm],
        config: &BehaviorConfig,
        rng: &mut R,
    ) -> Result<CreditReport, MarketError> {
        let mut report = CreditReport::default();
        for bank_id in self.borrowers.counterparts() {
            let bank = banks
                .get_mut(bank_id.index())
                .ok_or(MarketError::UnknownBank(bank_id))?;
            for &firm_id in self.borrowers.members_of(bank_id) {
                let firm = firms
                    .get_mut(firm_id.index())
                    .ok_or(MarketError::UnknownFirm(firm_id))?;
                let demand = firm.loan_demand;
                if demand <= 0.0 {
                    continue;
                }
                report.requested += demand;
                match bank.assess_loan(demand, firm.accounts.stocks.equity, config, rng) {
                    LoanDecision::Granted { amount, rate } => {
                        let outstanding = firm.accounts.stocks.loans;
                        let total = outstanding + amount;
                        firm.loan_rate = if total > 0.0 {
                            (firm.loan_rate * outstanding + rate * amount) / total
                        } else {
                            rate
                        };
                        report.transactions.push(primitives::give_loans(
                            amount,
                            &mut bank.accounts,
                            &mut firm.accounts,
                        ));
                        report.granted += amount;
                        firm.loan_demand = 0.0;
                    }
                    LoanDecision::Denied(Denial::Ceiling) => {
                        report.denied_ceiling = report.denied_ceiling.saturating_add(1);
                    }
                    LoanDecision::Denied(_) => {
                        report.denied_other = report.denied_other.saturating_add(1);
                    }
                }
            }
        }
        if report.denied_ceiling > 0 {
            warn!(
                denied = report.denied_ceiling,
                requested = report.requested,
                granted = report.granted,
                "Loan requests denied at bank ceilings"
            );
        }
        debug!(
            requested = report.requested,
            granted = report.granted,
            "Credit rationed"
        );
        Ok(report)
    }

    /// Collect interest and capital on outstanding loans.
    ///
    /// A firm pays `loan_rate` on its loans out of deposits and repays as
    /// much capital as its deposits allow above `buffer(firm)`. A firm
    /// whose deposits cannot cover the interest defaults on its whole
    /// loan, which the bank writes off.
    pub fn service(
        &self,
        banks: &mut [Bank],
        firms: &mut [Firm],
        buffer: impl Fn(&Firm) -> f64,
    ) -> Result<Servicing, MarketError> {
        let mut servicing = Servicing::default();
        for bank_id in self.borrowers.counterparts() {
            let bank = banks
                .get_mut(bank_id.index())
                .ok_or(MarketError::UnknownBank(bank_id))?;
            for &firm_id in self.borrowers.members_of(bank_id) {
                let firm = firms
                    .get_mut(firm_id.index())
                    .ok_or(MarketError::UnknownFirm(firm_id))?;
                let loans = firm.accounts.stocks.loans;
                if loans <= 0.0 {
                    continue;
                }
                let interest = firm.loan_rate * loans;
                let deposits = firm.accounts.stocks.deposits;
                if deposits < interest {
                    debug!(firm = %firm_id, loans, deposits, "Firm defaults");
                    servicing.transactions.push(primitives::make_defaults(
                        loans,
                        &mut firm.accounts,
                        &mut bank.accounts,
                    ));
                    servicing.defaulted += loans;
                    firm.loan_rate = 0.0;
                    continue;
                }
                let capital = (deposits - interest - buffer(&*firm)).clamp(0.0, loans);
                servicing.transactions.push(primitives::repay_loans(
                    capital,
                    interest,
                    &mut firm.accounts,
                    &mut bank.accounts,
                ));
                servicing.interest += interest;
                servicing.repaid += capital;
                if firm.accounts.stocks.loans <= 0.0 {
                    firm.loan_rate = 0.0;
                }
            }
        }
        Ok(servicing)
    }
}
