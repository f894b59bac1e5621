// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{
    CalculationUnit, CalculationView, RecordId, Truck, amount_or_zero, non_empty,
};
use crate::reconcile::has_statement_pdf;
use crate::utils::{format_currency, format_money};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Trucks from the truck list, keyed by id string.
#[derive(Debug, Clone, Default)]
pub struct TruckMap {
    trucks: HashMap<String, Truck>,
}

impl TruckMap {
    pub fn from_list(list: Vec<Truck>) -> Self {
        let mut trucks = HashMap::new();
        for t in list {
            if let Some(id) = t.id.as_ref().filter(|id| id.is_present()) {
                trucks.insert(id.key(), t);
            }
        }
        Self { trucks }
    }

    pub fn get(&self, id: &RecordId) -> Option<&Truck> {
        self.trucks.get(&id.key())
    }

    pub fn len(&self) -> usize {
        self.trucks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trucks.is_empty()
    }
}

/// Unit number shown for a deduction: the listed truck, then the embedded
/// one, then `Truck <id>`, then `N/A`.
pub fn deduction_unit_number(unit: &CalculationUnit, trucks: &TruckMap) -> String {
    let truck_ref = unit.truck.as_ref();
    let truck_id = truck_ref
        .and_then(|t| t.id())
        .filter(|id| id.is_present());
    let embedded = truck_ref.and_then(|t| t.embedded());
    let truck = truck_id.and_then(|id| trucks.get(id)).or(embedded);

    truck
        .and_then(|t| non_empty(t.unit_number.as_deref()))
        .or_else(|| embedded.and_then(|t| non_empty(t.unit_number.as_deref())))
        .map(str::to_string)
        .or_else(|| truck_id.map(|id| format!("Truck {}", id)))
        .unwrap_or_else(|| "N/A".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeductionRow {
    pub id: Option<RecordId>,
    pub unit: String,
    pub driver: String,
    pub amount: Decimal,
    pub escrow: Decimal,
    pub note: String,
}

impl DeductionRow {
    pub fn build(unit: &CalculationUnit, trucks: &TruckMap) -> Self {
        let driver = non_empty(unit.driver.as_deref())
            .or_else(|| non_empty(unit.driver_name.as_deref()))
            .unwrap_or("No Driver Assigned");
        Self {
            id: unit.id.clone(),
            unit: deduction_unit_number(unit, trucks),
            driver: driver.to_string(),
            amount: amount_or_zero(unit.amount.as_ref()),
            escrow: amount_or_zero(unit.escrow.as_ref()),
            note: unit.note.clone().unwrap_or_default(),
        }
    }

    /// Escrow is only worth showing when it is non-zero.
    pub fn escrow_display(&self) -> String {
        if self.escrow.is_zero() {
            String::new()
        } else {
            format_money(&self.escrow)
        }
    }

    pub fn cells(&self) -> Vec<String> {
        vec![
            self.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
            self.unit.clone(),
            self.driver.clone(),
            format_money(&self.amount),
            self.escrow_display(),
            self.note.trim().to_string(),
        ]
    }
}

pub const DEDUCTION_HEADERS: [&str; 6] = ["ID", "Unit", "Driver", "Amount", "Escrow", "Reason"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueRow {
    pub id: Option<RecordId>,
    pub unit: String,
    pub driver: String,
    pub company: String,
    pub amount: Decimal,
    pub escrow: Decimal,
    pub note: String,
    pub pdf_url: Option<String>,
}

impl RevenueRow {
    pub fn build(unit: &CalculationUnit) -> Self {
        let truck = unit.truck.as_ref().and_then(|t| t.embedded());
        let statement = unit.statement.as_ref().and_then(|s| s.info());

        let unit_number = truck
            .and_then(|t| non_empty(t.unit_number.as_deref()))
            .unwrap_or("N/A");
        let driver = non_empty(unit.driver.as_deref())
            .or_else(|| statement.and_then(|s| non_empty(s.driver.as_deref())))
            .unwrap_or("N/A");
        let company = statement
            .and_then(|s| non_empty(s.company.as_deref()))
            .or_else(|| truck.and_then(|t| non_empty(t.carrier_company.as_deref())))
            .unwrap_or("N/A");
        let note = non_empty(unit.note.as_deref()).unwrap_or("-");

        Self {
            id: unit.id.clone(),
            unit: unit_number.to_string(),
            driver: driver.to_string(),
            company: company.to_string(),
            amount: amount_or_zero(unit.amount.as_ref()),
            escrow: amount_or_zero(unit.escrow.as_ref()),
            note: note.to_string(),
            pdf_url: statement
                .and_then(|s| non_empty(s.pdf_file.as_deref()))
                .map(str::to_string),
        }
    }

    pub fn cells(&self) -> Vec<String> {
        vec![
            self.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
            self.unit.clone(),
            self.driver.clone(),
            self.company.clone(),
            format_money(&self.amount),
            format_money(&self.escrow),
            self.note.clone(),
            self.pdf_url.clone().unwrap_or_default(),
        ]
    }
}

pub const REVENUE_HEADERS: [&str; 8] = [
    "ID", "Unit", "Driver", "Company", "Amount", "Escrow", "Note", "Statement PDF",
];

/// Revenue units across every calculation in the view.
pub fn revenue_rows(view: &CalculationView) -> Vec<RevenueRow> {
    view.calculations()
        .into_iter()
        .flat_map(|c| c.calculation_units.iter())
        .filter(|u| has_statement_pdf(u))
        .map(RevenueRow::build)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationSummary {
    pub owner: String,
    pub period: String,
    pub total_amount: String,
    pub total_escrow: String,
    pub notes: Option<String>,
}

impl CalculationSummary {
    pub fn build(view: &CalculationView) -> Self {
        let notes: Vec<&str> = view
            .calculations()
            .into_iter()
            .filter_map(|c| non_empty(c.note.as_deref()))
            .collect();
        Self {
            owner: view.owner.clone().filter(|o| !o.is_empty()).unwrap_or_else(|| "N/A".into()),
            period: format!(
                "{} to {}",
                non_empty(view.start_date.as_deref()).unwrap_or("N/A"),
                non_empty(view.end_date.as_deref()).unwrap_or("N/A")
            ),
            total_amount: format_currency(view.total_amount.as_ref()),
            total_escrow: format_currency(view.total_escrow.as_ref()),
            notes: if notes.is_empty() {
                None
            } else {
                Some(notes.join(", "))
            },
        }
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        let mut rows = vec![
            vec!["Owner".to_string(), self.owner.clone()],
            vec!["Period".to_string(), self.period.clone()],
            vec!["Total Gross".to_string(), self.total_amount.clone()],
            vec!["Total Escrow".to_string(), self.total_escrow.clone()],
        ];
        if let Some(n) = &self.notes {
            rows.push(vec!["Notes".to_string(), n.clone()]);
        }
        rows
    }
}
