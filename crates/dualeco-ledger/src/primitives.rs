//! Atomic bilateral ledger primitives.
//!
//! Each primitive moves an amount between two agents' [`Accounts`] and
//! returns the [`Transaction`] it applied. For every field a primitive
//! touches, the signed postings of both parties cancel, so money is never
//! created or destroyed by a single call, and each party's period flows
//! stay equal to the change in its financial position.
//!
//! Primitives never fail. Callers check cash and credit limits before
//! invoking them.

use dualeco_types::{Accounts, Field, Flow, Sector, Stock, TransactionKind};

use crate::transaction::{Transaction, TransactionBuilder};

const M: Field = Field::Stock(Stock::Cash);
const A: Field = Field::Stock(Stock::Advances);
const D: Field = Field::Stock(Stock::Deposits);
const B: Field = Field::Stock(Stock::Bonds);
const L: Field = Field::Stock(Stock::Loans);
const E: Field = Field::Stock(Stock::Equity);

/// Employer pays `amount` of wages in cash to a worker.
pub fn pay_wages(amount: f64, employer: &mut Accounts, worker: &mut Accounts) -> Transaction {
    TransactionBuilder::new(TransactionKind::PayWages, amount)
        .post(employer, Field::Flow(Flow::Wages), amount)
        .post(employer, M, -amount)
        .post(worker, Field::Flow(Flow::Wages), amount)
        .post(worker, M, amount)
        .build()
}

/// Government pays a transfer to a household.
pub fn pay_doles(amount: f64, government: &mut Accounts, household: &mut Accounts) -> Transaction {
    TransactionBuilder::new(TransactionKind::PayDoles, amount)
        .post(government, Field::Flow(Flow::Transfers), amount)
        .post(government, M, -amount)
        .post(household, Field::Flow(Flow::Transfers), amount)
        .post(household, M, amount)
        .build()
}

/// A payer settles `amount` of taxes with the government.
pub fn pay_taxes(amount: f64, payer: &mut Accounts, government: &mut Accounts) -> Transaction {
    TransactionBuilder::new(TransactionKind::PayTaxes, amount)
        .post(payer, Field::Flow(Flow::Taxes), amount)
        .post(payer, M, -amount)
        .post(government, Field::Flow(Flow::Taxes), amount)
        .post(government, M, amount)
        .build()
}

/// A firm or bank pays dividends to its owner.
pub fn pay_dividends(amount: f64, source: &mut Accounts, owner: &mut Accounts) -> Transaction {
    TransactionBuilder::new(TransactionKind::PayDividends, amount)
        .post(source, Field::Flow(Flow::Dividends), amount)
        .post(source, M, -amount)
        .post(owner, Field::Flow(Flow::Dividends), amount)
        .post(owner, M, amount)
        .build()
}

/// The central bank transfers its profit to the government.
///
/// Central bank money is a liability, so paying out raises both the
/// government's balance and the central bank's outstanding money.
pub fn transfer_profits(
    amount: f64,
    central_bank: &mut Accounts,
    government: &mut Accounts,
) -> Transaction {
    TransactionBuilder::new(TransactionKind::TransferProfits, amount)
        .post(central_bank, Field::Flow(Flow::Profits), amount)
        .post(central_bank, M, amount)
        .post(government, Field::Flow(Flow::Profits), amount)
        .post(government, M, amount)
        .build()
}

/// The central bank lends `amount` of reserves to a bank.
pub fn give_advances(amount: f64, central_bank: &mut Accounts, bank: &mut Accounts) -> Transaction {
    TransactionBuilder::new(TransactionKind::GiveAdvances, amount)
        .post(central_bank, A, amount)
        .post(central_bank, M, amount)
        .post(bank, A, amount)
        .post(bank, M, amount)
        .build()
}

/// A bank repays `capital` of advances plus `interest`.
pub fn repay_advances(
    capital: f64,
    interest: f64,
    bank: &mut Accounts,
    central_bank: &mut Accounts,
) -> Transaction {
    let total = capital + interest;
    TransactionBuilder::new(TransactionKind::RepayAdvances, total)
        .post(bank, Field::Flow(Flow::InterestAdvances), interest)
        .post(bank, A, -capital)
        .post(bank, M, -total)
        .post(central_bank, Field::Flow(Flow::InterestAdvances), interest)
        .post(central_bank, A, -capital)
        .post(central_bank, M, -total)
        .build()
}

/// An owner invests `amount` of cash as equity in a firm or bank.
pub fn invest_equities(amount: f64, owner: &mut Accounts, target: &mut Accounts) -> Transaction {
    TransactionBuilder::new(TransactionKind::InvestEquities, amount)
        .post(owner, E, amount)
        .post(owner, M, -amount)
        .post(target, E, amount)
        .post(target, M, amount)
        .build()
}

/// A firm or bank pays its whole equity back to the owner.
///
/// The target hands over all its cash. Whatever part of the equity the cash
/// does not cover is booked as a negative dividend on both sides, so the
/// amount moved may be negative.
pub fn reimburse_equities(target: &mut Accounts, owner: &mut Accounts) -> Transaction {
    let cash = target.stocks.cash;
    let equity = target.stocks.equity;
    let uncovered = equity - cash;
    TransactionBuilder::new(TransactionKind::ReimburseEquities, cash)
        .post(target, Field::Flow(Flow::Dividends), -uncovered)
        .post(target, E, -equity)
        .post(target, M, -cash)
        .post(owner, Field::Flow(Flow::Dividends), -uncovered)
        .post(owner, E, -equity)
        .post(owner, M, cash)
        .build()
}

/// A client buys `amount` worth of goods from a firm.
pub fn consume_goods(amount: f64, client: &mut Accounts, firm: &mut Accounts) -> Transaction {
    TransactionBuilder::new(TransactionKind::ConsumeGoods, amount)
        .post(client, Field::Flow(Flow::Consumption), amount)
        .post(client, M, -amount)
        .post(firm, Field::Flow(Flow::Consumption), amount)
        .post(firm, M, amount)
        .build()
}

/// A client moves `amount` of cash into its deposit account.
pub fn make_deposits(amount: f64, client: &mut Accounts, bank: &mut Accounts) -> Transaction {
    TransactionBuilder::new(TransactionKind::MakeDeposits, amount)
        .post(client, D, amount)
        .post(client, M, -amount)
        .post(bank, D, amount)
        .post(bank, M, amount)
        .build()
}

/// A client withdraws `amount` of cash from its deposit account.
pub fn withdraw_deposits(amount: f64, bank: &mut Accounts, client: &mut Accounts) -> Transaction {
    TransactionBuilder::new(TransactionKind::WithdrawDeposits, amount)
        .post(bank, D, -amount)
        .post(bank, M, -amount)
        .post(client, D, -amount)
        .post(client, M, amount)
        .build()
}

/// A bank credits `amount` of interest to a client's deposit account.
pub fn pay_interests(amount: f64, bank: &mut Accounts, client: &mut Accounts) -> Transaction {
    TransactionBuilder::new(TransactionKind::PayInterests, amount)
        .post(bank, Field::Flow(Flow::InterestDeposits), amount)
        .post(bank, D, amount)
        .post(client, Field::Flow(Flow::InterestDeposits), amount)
        .post(client, D, amount)
        .build()
}

/// A bank grants a loan, crediting the firm's deposit account.
pub fn give_loans(amount: f64, bank: &mut Accounts, firm: &mut Accounts) -> Transaction {
    TransactionBuilder::new(TransactionKind::GiveLoans, amount)
        .post(bank, L, amount)
        .post(bank, D, amount)
        .post(firm, L, amount)
        .post(firm, D, amount)
        .build()
}

/// A firm repays `capital` and `interest` out of its deposits.
pub fn repay_loans(
    capital: f64,
    interest: f64,
    firm: &mut Accounts,
    bank: &mut Accounts,
) -> Transaction {
    let total = capital + interest;
    TransactionBuilder::new(TransactionKind::RepayLoans, total)
        .post(firm, Field::Flow(Flow::InterestLoans), interest)
        .post(firm, L, -capital)
        .post(firm, D, -total)
        .post(bank, Field::Flow(Flow::InterestLoans), interest)
        .post(bank, L, -capital)
        .post(bank, D, -total)
        .build()
}

/// A firm defaults on `amount` of loans, which the bank writes off.
pub fn make_defaults(amount: f64, firm: &mut Accounts, bank: &mut Accounts) -> Transaction {
    TransactionBuilder::new(TransactionKind::MakeDefaults, amount)
        .post(firm, L, -amount)
        .post(firm, Field::Flow(Flow::Defaults), amount)
        .post(bank, L, -amount)
        .post(bank, Field::Flow(Flow::Defaults), amount)
        .build()
}

/// A bank or the central bank buys `amount` of newly issued bonds.
///
/// A commercial bank pays with reserves. The central bank pays by issuing
/// money, which raises its money liability instead.
pub fn buy_bonds(amount: f64, buyer: &mut Accounts, government: &mut Accounts) -> Transaction {
    let buyer_cash = cash_direction(buyer.sector, -amount);
    TransactionBuilder::new(TransactionKind::BuyBonds, amount)
        .post(government, B, amount)
        .post(government, M, amount)
        .post(buyer, B, amount)
        .post(buyer, M, buyer_cash)
        .build()
}

/// The government pays `interest` and redeems `capital` of a holder's bonds.
pub fn repay_bonds(
    capital: f64,
    interest: f64,
    government: &mut Accounts,
    holder: &mut Accounts,
) -> Transaction {
    let total = capital + interest;
    let holder_cash = cash_direction(holder.sector, total);
    TransactionBuilder::new(TransactionKind::RepayBonds, total)
        .post(government, Field::Flow(Flow::InterestBonds), interest)
        .post(government, B, -capital)
        .post(government, M, -total)
        .post(holder, Field::Flow(Flow::InterestBonds), interest)
        .post(holder, B, -capital)
        .post(holder, M, holder_cash)
        .build()
}

/// A bank sells `amount` of bonds to the central bank for reserves.
pub fn transfer_bonds(amount: f64, bank: &mut Accounts, central_bank: &mut Accounts) -> Transaction {
    TransactionBuilder::new(TransactionKind::TransferBonds, amount)
        .post(bank, B, -amount)
        .post(bank, M, amount)
        .post(central_bank, B, amount)
        .post(central_bank, M, amount)
        .build()
}

/// Cash movement seen by a party receiving `delta` of money.
///
/// For the central bank, money is a liability, so receiving money shrinks it.
fn cash_direction(sector: Sector, delta: f64) -> f64 {
    if sector == Sector::CentralBank {
        -delta
    } else {
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn funded(sector: Sector) -> Accounts {
        let mut accounts = Accounts::new(sector);
        accounts.stocks.cash = 100.0;
        accounts.stocks.deposits = 100.0;
        accounts.stocks.loans = 100.0;
        accounts.stocks.bonds = 100.0;
        accounts.stocks.advances = 100.0;
        accounts.stocks.equity = 100.0;
        accounts
    }

    /// Both the transaction and each party's own column must close.
    fn assert_conserving(
        tx: &Transaction,
        parties: [(&Accounts, &Accounts); 2],
    ) {
        assert!(tx.is_balanced(), "{:?} not balanced: {:?}", tx.kind, tx.imbalances());
        for (before, after) in parties {
            let income = after.net_income() - before.net_income();
            let change = after.net_worth() - before.net_worth();
            assert_close(income, change);
        }
    }

    macro_rules! check_pair {
        ($a:expr, $b:expr, |$x:ident, $y:ident| $call:expr) => {{
            let mut $x = funded($a);
            let mut $y = funded($b);
            let (x0, y0) = ($x, $y);
            let tx = $call;
            assert_conserving(&tx, [(&x0, &$x), (&y0, &$y)]);
            ($x, $y)
        }};
    }

    #[test]
    fn every_primitive_conserves() {
        use Sector::{Bank, CentralBank, Firm, Government, Household};
        check_pair!(Firm, Household, |f, h| pay_wages(12.0, &mut f, &mut h));
        check_pair!(Government, Household, |g, h| pay_wages(12.0, &mut g, &mut h));
        check_pair!(Government, Household, |g, h| pay_doles(3.0, &mut g, &mut h));
        check_pair!(Household, Government, |h, g| pay_taxes(4.0, &mut h, &mut g));
        check_pair!(Bank, Government, |b, g| pay_taxes(4.0, &mut b, &mut g));
        check_pair!(Firm, Household, |f, h| pay_dividends(7.0, &mut f, &mut h));
        check_pair!(CentralBank, Government, |c, g| transfer_profits(2.0, &mut c, &mut g));
        check_pair!(CentralBank, Bank, |c, b| give_advances(9.0, &mut c, &mut b));
        check_pair!(Bank, CentralBank, |b, c| repay_advances(5.0, 0.5, &mut b, &mut c));
        check_pair!(Household, Firm, |h, f| invest_equities(8.0, &mut h, &mut f));
        check_pair!(Bank, Household, |b, h| reimburse_equities(&mut b, &mut h));
        check_pair!(Household, Firm, |h, f| consume_goods(6.0, &mut h, &mut f));
        check_pair!(Firm, Bank, |f, b| make_deposits(6.0, &mut f, &mut b));
        check_pair!(Bank, Household, |b, h| withdraw_deposits(6.0, &mut b, &mut h));
        check_pair!(Bank, Firm, |b, f| pay_interests(1.5, &mut b, &mut f));
        check_pair!(Bank, Firm, |b, f| give_loans(25.0, &mut b, &mut f));
        check_pair!(Firm, Bank, |f, b| repay_loans(10.0, 1.0, &mut f, &mut b));
        check_pair!(Firm, Bank, |f, b| make_defaults(30.0, &mut f, &mut b));
        check_pair!(Bank, Government, |b, g| buy_bonds(20.0, &mut b, &mut g));
        check_pair!(CentralBank, Government, |c, g| buy_bonds(20.0, &mut c, &mut g));
        check_pair!(Government, Bank, |g, b| repay_bonds(10.0, 2.0, &mut g, &mut b));
        check_pair!(Government, CentralBank, |g, c| repay_bonds(10.0, 2.0, &mut g, &mut c));
        check_pair!(Bank, CentralBank, |b, c| transfer_bonds(15.0, &mut b, &mut c));
    }

    #[test]
    fn taxes_move_cash_to_government() {
        let (payer, government) =
            check_pair!(Sector::Firm, Sector::Government, |f, g| pay_taxes(10.0, &mut f, &mut g));
        assert_close(payer.flows.taxes, 10.0);
        assert_close(payer.stocks.cash, 90.0);
        assert_close(government.flows.taxes, 10.0);
        assert_close(government.stocks.cash, 110.0);
    }

    #[test]
    fn reimbursement_books_uncovered_equity_as_negative_dividend() {
        let mut target = Accounts::new(Sector::Firm);
        let mut owner = Accounts::new(Sector::Household);
        target.stocks.cash = 50.0;
        target.stocks.equity = 100.0;
        owner.stocks.equity = 100.0;

        let tx = reimburse_equities(&mut target, &mut owner);

        assert!(tx.is_balanced());
        assert_close(target.flows.dividends, -50.0);
        assert_close(owner.flows.dividends, -50.0);
        assert_close(target.stocks.equity, 0.0);
        assert_close(owner.stocks.equity, 0.0);
        assert_close(target.stocks.cash, 0.0);
        assert_close(owner.stocks.cash, 50.0);
    }

    #[test]
    fn central_bank_bond_purchase_issues_money() {
        let mut cb = Accounts::new(Sector::CentralBank);
        let mut gov = Accounts::new(Sector::Government);
        let _tx = buy_bonds(40.0, &mut cb, &mut gov);
        assert_close(cb.stocks.bonds, 40.0);
        assert_close(cb.stocks.cash, 40.0);
        assert_close(gov.stocks.bonds, 40.0);
        assert_close(gov.stocks.cash, 40.0);
    }

    #[test]
    fn bank_bond_purchase_spends_reserves() {
        let mut bank = funded(Sector::Bank);
        let mut gov = Accounts::new(Sector::Government);
        let _tx = buy_bonds(40.0, &mut bank, &mut gov);
        assert_close(bank.stocks.bonds, 140.0);
        assert_close(bank.stocks.cash, 60.0);
    }

    #[test]
    fn loan_repayment_draws_capital_and_interest_from_deposits() {
        let mut firm = funded(Sector::Firm);
        let mut bank = funded(Sector::Bank);
        let tx = repay_loans(20.0, 2.0, &mut firm, &mut bank);
        assert_close(tx.amount, 22.0);
        assert_close(firm.stocks.loans, 80.0);
        assert_close(firm.stocks.deposits, 78.0);
        assert_close(bank.flows.interest_loans, 2.0);
        assert_close(bank.stocks.deposits, 78.0);
    }

    #[test]
    fn default_writes_off_both_sides() {
        let mut firm = funded(Sector::Firm);
        let mut bank = funded(Sector::Bank);
        let _tx = make_defaults(100.0, &mut firm, &mut bank);
        assert_close(firm.stocks.loans, 0.0);
        assert_close(bank.stocks.loans, 0.0);
        assert_close(firm.flows.defaults, 100.0);
        assert_close(bank.flows.defaults, 100.0);
    }
}
