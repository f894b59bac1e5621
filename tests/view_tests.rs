// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use ownercalc::api::{ApiError, Backend};
use ownercalc::cli;
use ownercalc::commands::view::load_view;
use ownercalc::display::TruckMap;
use ownercalc::models::{CalculationUnit, CalculationView, OwnerCalculation, RecordId};
use ownercalc::view::{ViewSession, delete_deduction, open_view};
use serde_json::{Value, json};
use std::sync::Mutex;

fn view(owner: &str, start: &str) -> CalculationView {
    let calc: OwnerCalculation = serde_json::from_value(json!({
        "id": 1, "owner": owner, "start_date": start, "end_date": "2024-01-07",
        "calculation_units": [{"id": 10, "owner": 5, "statement": null, "amount": "-50"}]
    }))
    .unwrap();
    CalculationView::open(calc, owner)
}

fn units(ids: &[i64]) -> Vec<CalculationUnit> {
    ids.iter()
        .map(|id| serde_json::from_value(json!({"id": id, "statement": null})).unwrap())
        .collect()
}

#[test]
fn stale_results_are_dropped() {
    let mut session = ViewSession::new();
    let first = session.open(&view("Acme", "2024-01-01"));
    let second = session.open(&view("Beta", "2024-01-01"));

    assert!(!session.accept_deductions(&first, units(&[1])));
    assert!(!session.accept_trucks(&first, TruckMap::default()));
    assert!(session.deductions().is_empty());

    assert!(session.accept_deductions(&second, units(&[2])));
    assert_eq!(session.deductions().len(), 1);

    let refreshed = session.refresh().unwrap();
    assert!(!session.is_current(&second));
    assert!(!session.accept_deductions(&second, units(&[3])));
    assert!(session.accept_trucks(&second, TruckMap::default()));
    assert!(session.accept_deductions(&refreshed, units(&[4, 5])));
    assert_eq!(session.deductions().len(), 2);

    let reopened = session.open(&view("Acme", "2024-01-08"));
    assert!(!session.is_current(&refreshed));
    assert!(session.deductions().is_empty());
    assert!(session.is_current(&reopened));
}

/// Backend with a mutable unit list so a delete is visible to the refetch.
struct Fleet {
    units: Mutex<Vec<Value>>,
    deleted: Mutex<Vec<String>>,
}

impl Fleet {
    fn new() -> Self {
        Self {
            units: Mutex::new(vec![
                json!({"id": 10, "owner": 5, "statement": null, "amount": "-50", "truck": 7}),
                json!({"id": 11, "owner": 5, "statement": null, "amount": "-5",
                       "start_date": "2024-01-01", "end_date": "2024-01-07"}),
            ]),
            deleted: Mutex::new(Vec::new()),
        }
    }
}

impl Backend for Fleet {
    fn get(&self, path: &str) -> Result<Value, ApiError> {
        if path.starts_with("/calculations/all-trucks") {
            return Ok(json!({"trucks": [{"id": 7, "unit_number": "T-700"}]}));
        }
        if path.starts_with("/calculations/owner-calculation/") {
            return Ok(json!([{
                "id": 1, "owner": "Acme", "start_date": "2024-01-01", "end_date": "2024-01-07",
                "calculation_units": [{"id": 10, "owner": 5, "statement": null}]
            }]));
        }
        if path.starts_with("/calculations/calculation-unit/") {
            return Ok(Value::Array(self.units.lock().unwrap().clone()));
        }
        Err(ApiError::Status {
            path: path.to_string(),
            status: 404,
        })
    }

    fn post(&self, path: &str, _body: &Value) -> Result<Value, ApiError> {
        Err(ApiError::Status {
            path: path.to_string(),
            status: 405,
        })
    }

    fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.post(path, body)
    }

    fn delete(&self, path: &str) -> Result<(), ApiError> {
        let id = path
            .trim_start_matches("/calculations/calculation-unit/")
            .trim_end_matches('/')
            .to_string();
        self.units
            .lock()
            .unwrap()
            .retain(|u| u["id"].to_string() != id);
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }
}

#[test]
fn open_view_reports_summary_revenue_and_deductions() {
    let api = Fleet::new();
    let mut session = ViewSession::new();
    let report = open_view(&api, &mut session, &view("Acme", "2024-01-01"));

    assert_eq!(report.summary.period, "2024-01-01 to 2024-01-07");
    assert!(report.revenue.is_empty());
    let cells: Vec<Vec<String>> = report.deductions.iter().map(|d| d.cells()).collect();
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[0][1], "T-700");
    assert_eq!(cells[0][3], "$-50.00");
    assert_eq!(cells[1][0], "11");
    assert_eq!(session.trucks().len(), 1);
}

#[test]
fn deleting_a_deduction_refetches_the_week() {
    let api = Fleet::new();
    let mut session = ViewSession::new();
    let v = view("Acme", "2024-01-01");
    open_view(&api, &mut session, &v);

    let report = delete_deduction(&api, &mut session, &v, &RecordId::from(11)).unwrap();
    assert_eq!(api.deleted.lock().unwrap().as_slice(), ["11".to_string()]);
    let ids: Vec<_> = report.deductions.iter().map(|d| d.id.clone()).collect();
    assert_eq!(ids, vec![Some(RecordId::from(10))]);
}

#[test]
fn load_view_matches_owner_and_exact_period() {
    let api = Fleet::new();
    let m = cli::build_cli().get_matches_from([
        "ownercalc", "view", "--owner", " acme ", "--start", "2024-01-01", "--end", "2024-01-07",
    ]);
    let Some(("view", sub)) = m.subcommand() else {
        panic!("no view subcommand");
    };

    let v = load_view(&api, sub, None).unwrap();
    assert_eq!(v.owner.as_deref(), Some("Acme"));
    assert_eq!(v.calculations().len(), 1);

    assert!(load_view(&api, sub, Some("1")).is_ok());
    assert!(load_view(&api, sub, Some("99")).is_err());

    let m = cli::build_cli().get_matches_from([
        "ownercalc", "view", "--owner", "Acme", "--start", "2024-01-08", "--end", "2024-01-14",
    ]);
    let Some(("view", sub)) = m.subcommand() else {
        panic!("no view subcommand");
    };
    assert!(load_view(&api, sub, None).is_err());
}
