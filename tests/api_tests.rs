// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use ownercalc::api::{
    self, ApiError, Backend, OwnerKey, calculation_units_path, decode_list,
    owner_calculations_path, unwrap_list, unwrap_truck_list,
};
use ownercalc::deductions::{fetch_deductions_for_view, resolve_owner_key};
use ownercalc::models::{
    CalculationView, NewDeduction, OwnerCalculation, OwnerCalculationPatch, RecordId, Truck,
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

/// Canned responses by path prefix; every call is recorded.
#[derive(Default)]
struct FakeBackend {
    responses: HashMap<String, Value>,
    calls: Mutex<Vec<(String, String, Option<Value>)>>,
}

impl FakeBackend {
    fn with(mut self, prefix: &str, body: Value) -> Self {
        self.responses.insert(prefix.to_string(), body);
        self
    }

    fn respond(&self, method: &str, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), path.to_string(), body.cloned()));
        self.responses
            .iter()
            .filter(|(prefix, _)| path.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, v)| v.clone())
            .ok_or_else(|| ApiError::Status {
                path: path.to_string(),
                status: 500,
            })
    }

    fn calls(&self) -> Vec<(String, String, Option<Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Backend for FakeBackend {
    fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.respond("GET", path, None)
    }
    fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.respond("POST", path, Some(body))
    }
    fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.respond("PATCH", path, Some(body))
    }
    fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.respond("DELETE", path, None).map(|_| ())
    }
}

fn week_calc() -> OwnerCalculation {
    serde_json::from_value(json!({
        "id": 1, "owner": "Acme Hauling", "start_date": "2024-01-01", "end_date": "2024-01-07",
        "calculation_units": [{"id": 10, "owner": 5, "statement": null, "amount": "-50"}]
    }))
    .unwrap()
}

#[test]
fn list_responses_unwrap_to_one_shape() {
    assert_eq!(unwrap_list(json!([1, 2])), vec![json!(1), json!(2)]);
    assert_eq!(unwrap_list(json!({"results": [3]})), vec![json!(3)]);
    assert!(unwrap_list(json!({"data": [3]})).is_empty());
    assert!(unwrap_list(json!({"results": {"a": 1}})).is_empty());
    assert!(unwrap_list(Value::Null).is_empty());
}

#[test]
fn truck_lists_unwrap_from_any_wrapper() {
    assert_eq!(unwrap_truck_list(json!([{"id": 1}])).len(), 1);
    assert_eq!(unwrap_truck_list(json!({"data": [{"id": 1}, {"id": 2}]})).len(), 2);
    assert_eq!(
        unwrap_truck_list(json!({"trucks": [], "items": [{"id": 1}]})).len(),
        0,
        "an empty array under an earlier key still wins"
    );
    assert_eq!(
        unwrap_truck_list(json!({"trucks": null, "results": [{"id": 4}]})).len(),
        1
    );
    assert_eq!(
        unwrap_truck_list(json!({"data": {"a": {"id": 1}, "b": {"id": 2}}})).len(),
        2
    );
    assert!(unwrap_truck_list(json!({"trucks": "none"})).is_empty());
    assert!(unwrap_truck_list(json!("oops")).is_empty());
}

#[test]
fn decode_list_skips_nulls_and_bad_records() {
    let trucks: Vec<Truck> = decode_list(
        vec![json!({"id": 1, "unit_number": 101}), Value::Null, json!(7), json!({"id": 2})],
        "truck",
    );
    assert_eq!(trucks.len(), 2);
    assert_eq!(trucks[0].unit_number.as_deref(), Some("101"));
}

#[test]
fn undecodable_nested_unit_keeps_its_calculation() {
    let calcs: Vec<OwnerCalculation> = decode_list(
        unwrap_list(json!([{
            "id": 1, "owner": "Acme", "start_date": "2024-01-01", "end_date": "2024-01-07",
            "calculation_units": [
                {"id": 10, "statement": null, "amount": "-50.00"},
                {"id": 11, "statement": null, "amount": true},
                null
            ]
        }, {
            "id": 2, "owner": "Acme", "calculation_units": "not a list"
        }])),
        "owner calculation",
    );
    assert_eq!(calcs.len(), 2);
    assert_eq!(calcs[0].calculation_units.len(), 1);
    assert_eq!(calcs[0].calculation_units[0].id, Some(RecordId::from(10)));
    assert!(calcs[1].calculation_units.is_empty());
}

#[test]
fn query_paths_are_encoded() {
    let p = owner_calculations_path("Acme & Sons", None).unwrap();
    assert_eq!(p, "/calculations/owner-calculation/?search=Acme+%26+Sons");

    let range = (
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
    );
    let p = owner_calculations_path("Acme", Some(range)).unwrap();
    assert_eq!(
        p,
        "/calculations/owner-calculation/?search=Acme&start_date=2024-01-01&end_date=2024-01-07"
    );

    assert_eq!(
        calculation_units_path(&OwnerKey::Id(5)).unwrap(),
        "/calculations/calculation-unit/?owner=5"
    );
}

#[test]
fn owner_key_prefers_numeric_unit_owner() {
    let calcs = vec![week_calc()];
    assert_eq!(resolve_owner_key(&calcs, "Acme Hauling"), OwnerKey::Id(5));

    let nameless: Vec<OwnerCalculation> = serde_json::from_value(json!([
        {"id": 2, "calculation_units": [{"id": 1, "owner": {"id": 5, "name": "Acme"}}]},
        {"id": 3, "calculation_units": []}
    ]))
    .unwrap();
    assert_eq!(
        resolve_owner_key(&nameless, "Acme Hauling"),
        OwnerKey::Name("Acme Hauling".into())
    );
}

#[test]
fn deductions_for_view_fetch_calculations_then_units() {
    let api = FakeBackend::default()
        .with(
            "/calculations/owner-calculation/",
            json!({"results": [{
                "id": 1, "owner": "Acme Hauling", "start_date": "2024-01-01", "end_date": "2024-01-07",
                "calculation_units": [{"id": 10, "owner": 5, "statement": null}]
            }]}),
        )
        .with(
            "/calculations/calculation-unit/",
            json!([
                {"id": 10, "owner": 5, "statement": null, "amount": "-50"},
                {"id": 11, "owner": 5, "statement": null, "start_date": "2024-01-01T00:00:00", "end_date": "2024-01-07"},
                {"id": 12, "owner": 5, "statement": null, "start_date": "2024-01-08", "end_date": "2024-01-14"}
            ]),
        );
    let view = CalculationView::open(week_calc(), "Acme Hauling");

    let got = fetch_deductions_for_view(&api, &view);
    let ids: Vec<String> = got.iter().map(|u| u.id.as_ref().unwrap().to_string()).collect();
    assert_eq!(ids, vec!["10", "11"]);

    let paths: Vec<String> = api.calls().into_iter().map(|(_, p, _)| p).collect();
    assert_eq!(
        paths,
        vec![
            "/calculations/owner-calculation/?search=Acme+Hauling".to_string(),
            "/calculations/calculation-unit/?owner=5".to_string(),
        ]
    );
}

#[test]
fn deductions_for_view_degrade_to_empty() {
    let view = CalculationView::open(week_calc(), "Acme Hauling");

    let failing = FakeBackend::default();
    assert!(fetch_deductions_for_view(&failing, &view).is_empty());

    let no_calcs = FakeBackend::default().with("/calculations/owner-calculation/", json!([]));
    assert!(fetch_deductions_for_view(&no_calcs, &view).is_empty());
    assert_eq!(no_calcs.calls().len(), 1, "units are not fetched without calculations");

    let mut undated = week_calc();
    undated.end_date = None;
    let undated = CalculationView::single(undated);
    let untouched = FakeBackend::default();
    assert!(fetch_deductions_for_view(&untouched, &undated).is_empty());
    assert!(untouched.calls().is_empty());
}

#[test]
fn crud_calls_hit_the_record_paths() {
    let api = FakeBackend::default()
        .with("/calculations/calculation-unit/", json!({"id": 77, "statement": null, "amount": "-20"}))
        .with(
            "/calculations/owner-calculation/",
            json!({"id": 3, "owner": "Acme", "note": "fixed"}),
        );

    api::delete_calculation_unit(&api, &RecordId::from(10)).unwrap();

    let new = NewDeduction {
        owner: 5,
        truck: Some(RecordId::from(7)),
        amount: Decimal::new(-20, 0),
        escrow: Decimal::ZERO,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
        note: None,
        statement: None,
    };
    let created = api::create_deduction(&api, &new).unwrap();
    assert_eq!(created.id, Some(RecordId::from(77)));

    let patch = OwnerCalculationPatch {
        note: Some("fixed".into()),
        ..Default::default()
    };
    let updated = api::update_owner_calculation(&api, &RecordId::from(3), &patch).unwrap();
    assert_eq!(updated.note.as_deref(), Some("fixed"));

    let calls = api.calls();
    assert_eq!(calls[0].0, "DELETE");
    assert_eq!(calls[0].1, "/calculations/calculation-unit/10/");

    assert_eq!(calls[1].0, "POST");
    let body = calls[1].2.as_ref().unwrap();
    assert_eq!(body["owner"], json!(5));
    assert_eq!(body["truck"], json!(7));
    assert_eq!(body["start_date"], json!("2024-01-01"));
    assert_eq!(body["statement"], Value::Null);
    assert!(body.get("note").is_none());

    assert_eq!(calls[2].0, "PATCH");
    assert_eq!(calls[2].1, "/calculations/owner-calculation/3/");
    assert_eq!(calls[2].2, Some(json!({"note": "fixed"})));
}

#[test]
fn status_errors_name_the_path() {
    let api = FakeBackend::default();
    let err = api::fetch_trucks(&api).unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert!(err.to_string().contains("/calculations/all-trucks"));
}
