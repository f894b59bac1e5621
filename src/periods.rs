// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Owner page: an owner's calculations grouped into settlement periods.

use crate::models::{OwnerCalculation, RecordId, amount_or_zero, created_by_name, non_empty};
use crate::reconcile::normalize_date;
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Calculations with units, a positive gross, or any escrow.
pub fn is_valid_calculation(calc: &OwnerCalculation) -> bool {
    !calc.calculation_units.is_empty()
        || calc
            .total_amount
            .as_ref()
            .and_then(|a| a.to_decimal())
            .is_some_and(|d| d > Decimal::ZERO)
        || calc
            .total_escrow
            .as_ref()
            .and_then(|a| a.to_decimal())
            .is_some_and(|d| !d.is_zero())
}

/// Case-insensitive match on the trimmed owner name.
pub fn owner_matches(calc: &OwnerCalculation, owner: &str) -> bool {
    let item = calc.owner.as_deref().unwrap_or("").trim();
    item.to_lowercase() == owner.trim().to_lowercase()
}

pub fn period_key(calc: &OwnerCalculation) -> String {
    format!(
        "{}_{}",
        non_empty(calc.start_date.as_deref()).unwrap_or("N/A"),
        non_empty(calc.end_date.as_deref()).unwrap_or("N/A")
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub key: String,
    pub id: Option<RecordId>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub total_gross: Decimal,
    pub total_escrow: Decimal,
    pub total_prev: Decimal,
    pub created_by: String,
    pub previous_week_id: Option<RecordId>,
    pub calculations: Vec<OwnerCalculation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodPage {
    pub page: usize,
    pub page_size: usize,
    pub total_periods: usize,
    pub periods: Vec<PeriodSummary>,
}

impl PeriodPage {
    pub fn total_pages(&self) -> usize {
        self.total_periods.div_ceil(self.page_size.max(1))
    }
}

/// Group `calculations` for `owner` into periods, newest first, and return
/// one 1-based page of them.
pub fn list_periods(
    calculations: &[OwnerCalculation],
    owner: &str,
    page: usize,
    page_size: usize,
) -> PeriodPage {
    let valid: Vec<&OwnerCalculation> = calculations
        .iter()
        .filter(|c| owner_matches(c, owner))
        .filter(|c| is_valid_calculation(c))
        .collect();

    let mut seen: HashSet<&RecordId> = HashSet::new();
    let unique: Vec<&OwnerCalculation> = valid
        .iter()
        .copied()
        .filter(|c| match c.id.as_ref().filter(|id| id.is_present()) {
            Some(id) => seen.insert(id),
            None => true,
        })
        .collect();

    let mut groups: Vec<(String, Vec<&OwnerCalculation>)> = Vec::new();
    for calc in unique {
        let key = period_key(calc);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => {
                if !members.iter().any(|m| m.id == calc.id) {
                    members.push(calc);
                }
            }
            None => groups.push((key, vec![calc])),
        }
    }

    // Newest first; periods without a start go last in their original order.
    groups.sort_by(|(_, a), (_, b)| {
        match (
            non_empty(a[0].start_date.as_deref()),
            non_empty(b[0].start_date.as_deref()),
        ) {
            (Some(x), Some(y)) => y.cmp(x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });

    let page_size = page_size.max(1);
    let page = page.max(1);
    let total_periods = groups.len();
    let periods = groups
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .map(|(key, members)| summarize(key, &members, &valid, owner))
        .collect();

    PeriodPage {
        page,
        page_size,
        total_periods,
        periods,
    }
}

fn summarize(
    key: String,
    members: &[&OwnerCalculation],
    valid: &[&OwnerCalculation],
    owner: &str,
) -> PeriodSummary {
    let first = members[0];
    let mut total_gross = Decimal::ZERO;
    let mut total_escrow = Decimal::ZERO;
    let mut total_prev = Decimal::ZERO;
    let mut names: Vec<String> = Vec::new();
    for calc in members {
        total_gross += amount_or_zero(calc.total_amount.as_ref());
        total_escrow += amount_or_zero(calc.total_escrow.as_ref());
        total_prev += amount_or_zero(calc.prev_amount.as_ref());
        let name = created_by_name(calc.created_by.as_ref());
        if name != "N/A" && !names.contains(&name) {
            names.push(name);
        }
    }
    let created_by = if names.is_empty() {
        "N/A".to_string()
    } else {
        names.join(", ")
    };

    let period_owner = non_empty(first.owner.as_deref()).unwrap_or(owner);
    let previous_week_id =
        find_previous_week(first, valid, period_owner).and_then(|c| c.id.clone());

    PeriodSummary {
        key,
        id: first.id.clone(),
        start_date: first.start_date.clone(),
        end_date: first.end_date.clone(),
        total_gross,
        total_escrow,
        total_prev,
        created_by,
        previous_week_id,
        calculations: members.iter().map(|c| (*c).clone()).collect(),
    }
}

fn parse_key(date: Option<&str>) -> Option<NaiveDate> {
    let key = normalize_date(date);
    NaiveDate::parse_from_str(key.as_str(), "%Y-%m-%d").ok()
}

/// The week ending the day before `current` starts, for the same owner.
pub fn find_previous_week<'a>(
    current: &OwnerCalculation,
    candidates: &[&'a OwnerCalculation],
    owner: &str,
) -> Option<&'a OwnerCalculation> {
    non_empty(current.end_date.as_deref())?;
    let start = parse_key(current.start_date.as_deref())?;
    let prev_end = start - Duration::days(1);
    let prev_start = prev_end - Duration::days(6);

    candidates.iter().copied().find(|c| {
        parse_key(c.start_date.as_deref()) == Some(prev_start)
            && parse_key(c.end_date.as_deref()) == Some(prev_end)
            && c.owner.as_deref() == Some(owner)
    })
}
