//! End-to-end calibration: solve, write back, and check the matrices.

#![allow(clippy::unwrap_used, clippy::panic)]

use dualeco_calibration::{
    Block, CalibrationError, FirmBlock, ParamMap, accounting_matrix, calibrate, sector_totals,
};
use dualeco_ledger::matrix::{FlowRow, StockRow};
use dualeco_types::{Sector, Stock};

fn calibrated(params: &mut ParamMap) {
    calibrate(params).unwrap().write_into(params);
}

#[test]
fn baseline_steady_state_passes_the_sigma_check() {
    let mut params = ParamMap::baseline();
    calibrated(&mut params);
    let matrix = accounting_matrix(&params);
    matrix.check(6).unwrap();

    // Net worth is held by households and by the firms' inventories.
    let household_worth = matrix.stocks.cell(StockRow::NetWorth, Sector::Household);
    assert!(household_worth < 0.0);
    let inventories = matrix.stocks.cell(StockRow::Inventories, Sector::Firm);
    assert!((inventories - 12.5).abs() < 1e-9);
}

#[test]
fn change_rows_are_growth_times_stocks() {
    let mut params = ParamMap::baseline();
    calibrated(&mut params);
    let matrix = accounting_matrix(&params);
    let zeta_2 = params.value("zeta_2").unwrap();
    let loans = params.value("L_B").unwrap();
    let delta = matrix.flows.cell(FlowRow::Change(Stock::Loans), Sector::Bank);
    assert!((delta + zeta_2 * loans).abs() < 1e-9);
}

#[test]
fn single_unbanked_sector_scenario() {
    let mut params = ParamMap::new();
    for (key, value) in [
        ("N_E1", 5.0),
        ("N_W1", 10.0),
        ("phi1", 1.0),
        ("w1", 1.0),
        ("m", 0.2),
        ("N", 1.0),
    ] {
        params.set(key, value);
    }
    let firms = FirmBlock::production(&params).unwrap();
    let sector = firms.sector(1).unwrap();
    assert!((sector.output - 15.0).abs() < 1e-12);
    assert!((sector.wage_bill - 15.0).abs() < 1e-12);
    assert!((sector.price - 1.2).abs() < 1e-12);
    assert!((sector.sales - 18.0).abs() < 1e-12);

    // Stocks are undetermined without growth.
    assert!(matches!(
        calibrate(&params).unwrap_err(),
        CalibrationError::Singular {
            block: Block::Firms(1),
            ..
        }
    ));

    params.set("g", 0.05);
    calibrated(&mut params);
    assert!((params.value("Q1").unwrap() - 18.0).abs() < 1e-9);
    assert!(params.value("T_F1").unwrap().abs() < 1e-12);
    accounting_matrix(&params).check(6).unwrap();
}

#[test]
fn zero_growth_cannot_be_calibrated() {
    let mut params = ParamMap::baseline();
    params.set("g", 0.0);
    match calibrate(&params).unwrap_err() {
        CalibrationError::Singular { block, unknown } => {
            assert_eq!(block, Block::Firms(2));
            assert_eq!(unknown, "M_F");
        }
        other => panic!("expected a singular block, got {other}"),
    }
}

#[test]
fn missing_parameter_is_reported() {
    let mut params = ParamMap::baseline();
    let pruned: ParamMap = params
        .iter()
        .filter(|(key, _)| *key != "phi1")
        .map(|(key, value)| (key.to_owned(), value))
        .collect();
    params = pruned;
    let err = calibrate(&params).unwrap_err();
    assert_eq!(err.to_string(), "missing parameter: phi1");
}

#[test]
fn sector_totals_match_written_keys() {
    let mut params = ParamMap::baseline();
    calibrated(&mut params);
    let totals = sector_totals(&params);
    let firm = totals.stocks_of(Sector::Firm);
    let expected = params.value("L_F1").unwrap() + params.value("L_F2").unwrap();
    assert!((firm.loans - expected).abs() < 1e-12);
    assert!((totals.stocks_of(Sector::Bank).loans - firm.loans).abs() < 1e-9);
}
