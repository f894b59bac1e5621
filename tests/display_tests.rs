// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use ownercalc::display::{
    CalculationSummary, DeductionRow, TruckMap, deduction_unit_number, revenue_rows,
};
use ownercalc::models::{Amount, CalculationUnit, CalculationView, OwnerCalculation, Truck};
use ownercalc::utils::{coerce_decimal, format_currency, format_money};
use rust_decimal::Decimal;
use serde_json::json;

fn unit(v: serde_json::Value) -> CalculationUnit {
    serde_json::from_value(v).unwrap()
}

fn trucks() -> TruckMap {
    let list: Vec<Truck> = serde_json::from_value(json!([
        {"id": 7, "unit_number": "T-700", "carrier_company": "Haul Co"},
        {"id": "8", "unit_number": ""},
        {"unit_number": "orphan"}
    ]))
    .unwrap();
    TruckMap::from_list(list)
}

#[test]
fn currency_formatting() {
    assert_eq!(format_currency(None), "$0.00");
    assert_eq!(format_currency(Some(&Amount::from(""))), "$0.00");
    assert_eq!(format_currency(Some(&Amount::from("abc"))), "$0.00");
    assert_eq!(format_currency(Some(&Amount::from("12.5"))), "$12.50");
    assert_eq!(format_currency(Some(&Amount::from(12.5))), "$12.50");
    assert_eq!(format_currency(Some(&Amount::from(-50.0))), "$-50.00");
    assert_eq!(format_currency(Some(&Amount::from("1234567.891"))), "$1234567.89");
    assert_eq!(format_currency(Some(&Amount::from("0.005"))), "$0.01");
    assert_eq!(format_currency(Some(&Amount::from(0.125))), "$0.13");
    assert_eq!(format_currency(Some(&Amount::from("0"))), "$0.00");
    assert_eq!(format_currency(Some(&Amount::from("  42 USD"))), "$42.00");
}

#[test]
fn currency_rounds_the_binary_value() {
    // 1.005 is stored just below the midpoint, so it rounds down.
    assert_eq!(format_currency(Some(&Amount::from("1.005"))), "$1.00");
    assert_eq!(format_currency(Some(&Amount::from("2.675"))), "$2.67");
    assert_eq!(format_currency(Some(&Amount::from(1.255))), "$1.25");
    assert_eq!(format_currency(Some(&Amount::from("-0.001"))), "$-0.00");
    assert_eq!(format_currency(Some(&Amount::from(-0.0))), "$0.00");
    assert_eq!(format_money(&Decimal::new(2675, 3)), "$2.67");
    assert_eq!(format_money(&Decimal::new(-5000, 2)), "$-50.00");
}

#[test]
fn coercion_reads_leading_number_only() {
    assert_eq!(coerce_decimal("3.25abc"), Some(Decimal::new(325, 2)));
    assert_eq!(coerce_decimal(".5"), Some(Decimal::new(5, 1)));
    assert_eq!(coerce_decimal("1e2"), Some(Decimal::new(100, 0)));
    assert_eq!(coerce_decimal("Infinity"), None);
    assert_eq!(coerce_decimal("$5"), None);
    assert_eq!(coerce_decimal(""), None);
}

#[test]
fn truck_map_skips_trucks_without_id() {
    let map = trucks();
    assert_eq!(map.len(), 2);
    assert!(!map.is_empty());
    assert!(TruckMap::from_list(Vec::new()).is_empty());
}

#[test]
fn unit_number_falls_back_in_order() {
    let map = trucks();
    let listed = unit(json!({"id": 1, "truck": 7}));
    let listed_by_text = unit(json!({"id": 2, "truck": "7"}));
    let embedded = unit(json!({"id": 3, "truck": {"id": 99, "unit_number": "E-1"}}));
    let unknown = unit(json!({"id": 4, "truck": 42}));
    let blank_listing = unit(json!({"id": 5, "truck": 8}));
    let none = unit(json!({"id": 6}));

    assert_eq!(deduction_unit_number(&listed, &map), "T-700");
    assert_eq!(deduction_unit_number(&listed_by_text, &map), "T-700");
    assert_eq!(deduction_unit_number(&embedded, &map), "E-1");
    assert_eq!(deduction_unit_number(&unknown, &map), "Truck 42");
    assert_eq!(deduction_unit_number(&blank_listing, &map), "Truck 8");
    assert_eq!(deduction_unit_number(&none, &map), "N/A");
}

#[test]
fn deduction_row_cells() {
    let map = trucks();
    let row = DeductionRow::build(
        &unit(json!({
            "id": 10, "truck": 7, "driver_name": "Bo", "amount": "-50",
            "escrow": 0, "note": "  fuel advance "
        })),
        &map,
    );
    assert_eq!(
        row.cells(),
        vec!["10", "T-700", "Bo", "$-50.00", "", "fuel advance"]
    );

    let bare = DeductionRow::build(&unit(json!({"id": 11, "escrow": "12"})), &map);
    assert_eq!(bare.driver, "No Driver Assigned");
    assert_eq!(bare.escrow_display(), "$12.00");
    assert_eq!(bare.amount, Decimal::ZERO);
}

#[test]
fn revenue_rows_need_a_statement_pdf() {
    let calc: OwnerCalculation = serde_json::from_value(json!({
        "id": 1, "owner": "Acme", "start_date": "2024-01-01", "end_date": "2024-01-07",
        "total_amount": "1500", "total_escrow": null, "note": "first week",
        "calculation_units": [
            {"id": 1, "statement": {"driver": "Ann", "company": "Ann LLC", "pdf_file": "a.pdf"},
             "truck": {"id": 7, "unit_number": "T-700", "carrier_company": "Haul Co"}, "amount": 1500},
            {"id": 2, "statement": {"driver": "Ann"}},
            {"id": 3, "statement": null, "amount": -20}
        ]
    }))
    .unwrap();
    let view = CalculationView::open(calc, "Acme");

    let rows = revenue_rows(&view);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].unit, "T-700");
    assert_eq!(rows[0].driver, "Ann");
    assert_eq!(rows[0].company, "Ann LLC");
    assert_eq!(rows[0].pdf_url.as_deref(), Some("a.pdf"));

    let summary = CalculationSummary::build(&view);
    assert_eq!(summary.owner, "Acme");
    assert_eq!(summary.period, "2024-01-01 to 2024-01-07");
    assert_eq!(summary.total_amount, "$1500.00");
    assert_eq!(summary.total_escrow, "$0.00");
    assert_eq!(summary.rows().len(), 5);
}
