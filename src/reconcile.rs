// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Matching deduction units to the billing period being viewed.
//!
//! The backend reports a unit's period in two places: the owner calculation
//! that contains it, and the unit's own `start_date`/`end_date`. The two are
//! not guaranteed to agree, so the period of every deduction is resolved
//! through an id -> period index before filtering. Everything here is pure:
//! inputs are borrowed, nothing is mutated, and callers rebuild the index
//! whenever their inputs change.

use crate::models::{CalculationUnit, CalculationView, OwnerCalculation, RecordId, ViewBody};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Canonical `YYYY-MM-DD` key. Compared as text, never as a calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DateKey(String);

impl DateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for DateKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Prefix before the first `T`, else before the first space, of the trimmed input.
pub fn normalize_date(date: Option<&str>) -> DateKey {
    let s = match date {
        Some(d) => d.trim(),
        None => return DateKey::default(),
    };
    let head = match s.find('T') {
        Some(i) => &s[..i],
        None => match s.find(' ') {
            Some(i) => &s[..i],
            None => s,
        },
    };
    DateKey(head.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    pub start: DateKey,
    pub end: DateKey,
}

impl Period {
    pub fn new(start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            start: normalize_date(start),
            end: normalize_date(end),
        }
    }

    /// Equality after trimming both sides.
    pub fn same_trimmed(&self, other: &Period) -> bool {
        self.start.as_str().trim() == other.start.as_str().trim()
            && self.end.as_str().trim() == other.end.as_str().trim()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// A unit is a deduction iff it carries no statement.
pub fn is_deduction(unit: &CalculationUnit) -> bool {
    unit.statement.is_none()
}

/// Revenue units are displayed only when their statement has a PDF.
pub fn has_statement_pdf(unit: &CalculationUnit) -> bool {
    unit.statement
        .as_ref()
        .and_then(|s| s.info())
        .is_some_and(|info| {
            info.pdf_file.as_deref().is_some_and(|f| !f.is_empty())
                || info.pdf_file_url.as_deref().is_some_and(|f| !f.is_empty())
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPeriod<'a> {
    pub period: Period,
    /// Calculation the period came from; `None` when taken from the unit itself.
    pub source: Option<&'a OwnerCalculation>,
}

/// Unit id -> billing period, keyed by the id's string form.
#[derive(Debug, Clone, Default)]
pub struct PeriodIndex<'a> {
    entries: HashMap<String, IndexedPeriod<'a>>,
}

impl<'a> PeriodIndex<'a> {
    pub fn get(&self, id: Option<&RecordId>) -> Option<&IndexedPeriod<'a>> {
        id.and_then(|id| self.entries.get(&id.key()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert_first(&mut self, id: &RecordId, entry: IndexedPeriod<'a>) {
        self.entries.entry(id.key()).or_insert(entry);
    }
}

/// Calculation-derived periods are recorded first, then the units' own
/// dates fill in ids no calculation claimed. The first writer for an id wins.
pub fn build_period_index<'a>(
    calculations: &'a [OwnerCalculation],
    units: &[CalculationUnit],
) -> PeriodIndex<'a> {
    let mut index = PeriodIndex::default();

    for calc in calculations {
        let period = Period::new(calc.start_date.as_deref(), calc.end_date.as_deref());
        for unit in &calc.calculation_units {
            let Some(id) = unit.id.as_ref().filter(|id| id.is_present()) else {
                continue;
            };
            if is_deduction(unit) {
                index.insert_first(
                    id,
                    IndexedPeriod {
                        period: period.clone(),
                        source: Some(calc),
                    },
                );
            }
        }
    }

    for unit in units {
        let Some(id) = unit.id.as_ref().filter(|id| id.is_present()) else {
            continue;
        };
        if !is_deduction(unit) {
            continue;
        }
        if let Some((start, end)) = unit.own_dates() {
            index.insert_first(
                id,
                IndexedPeriod {
                    period: Period::new(Some(start), Some(end)),
                    source: None,
                },
            );
        }
    }

    index
}

/// Deductions from `units` whose resolved period is `target`.
///
/// A unit is admitted when some calculation contains it or when its indexed
/// period matches; the admitted unit's own dates (if both are set) are then
/// authoritative, falling back to the indexed period.
pub fn select_deductions_for_period<'u>(
    units: &'u [CalculationUnit],
    calculations: &[OwnerCalculation],
    index: &PeriodIndex<'_>,
    target: &Period,
) -> Vec<&'u CalculationUnit> {
    units
        .iter()
        .filter(|unit| {
            if !is_deduction(unit) {
                return false;
            }
            let linked = calculations.iter().any(|c| c.contains_unit(&unit.id));
            let indexed = index.get(unit.id.as_ref());
            let matches_indexed = indexed.is_some_and(|e| e.period.same_trimmed(target));
            if !linked && !matches_indexed {
                return false;
            }

            match (unit.own_dates(), indexed) {
                (Some((start, end)), _) => Period::new(Some(start), Some(end)) == *target,
                (None, Some(e)) => e.period.same_trimmed(target),
                (None, None) => false,
            }
        })
        .collect()
}

/// Deductions nested in the viewed calculation(s) whose dates are `target`.
pub fn collect_view_deductions<'v>(
    view: &'v CalculationView,
    target: &Period,
) -> Vec<&'v CalculationUnit> {
    let mut out: Vec<&CalculationUnit> = Vec::new();
    let mut take = |units: &'v [CalculationUnit]| {
        for unit in units {
            if unit.has_present_id() && is_deduction(unit) && !out.iter().any(|d| d.id == unit.id)
            {
                out.push(unit);
            }
        }
    };

    match &view.body {
        ViewBody::Group(calcs) => {
            for calc in calcs {
                if Period::new(calc.start_date.as_deref(), calc.end_date.as_deref()) == *target {
                    take(&calc.calculation_units);
                }
            }
        }
        ViewBody::Single(calc) => {
            if Period::new(view.start_date.as_deref(), view.end_date.as_deref()) == *target {
                take(&calc.calculation_units);
            }
        }
    }
    out
}

/// Deductions only the index places in `target`.
pub fn index_stragglers<'u>(
    units: &'u [CalculationUnit],
    index: &PeriodIndex<'_>,
    target: &Period,
) -> Vec<&'u CalculationUnit> {
    units
        .iter()
        .filter(|u| u.has_present_id() && is_deduction(u))
        .filter(|u| {
            index
                .get(u.id.as_ref())
                .is_some_and(|e| e.period.same_trimmed(target))
        })
        .collect()
}

/// Concatenate in precedence order, keeping the first unit seen per id.
/// Units without a present id are never duplicates of one another.
pub fn merge_deductions<'a>(
    filtered: Vec<&'a CalculationUnit>,
    from_view: Vec<&'a CalculationUnit>,
    stragglers: Vec<&'a CalculationUnit>,
) -> Vec<&'a CalculationUnit> {
    let mut out: Vec<&CalculationUnit> = Vec::new();
    for unit in filtered.into_iter().chain(from_view).chain(stragglers) {
        if !unit.has_present_id() || !out.iter().any(|d| d.id == unit.id) {
            out.push(unit);
        }
    }
    out
}

/// Full pipeline for one view over already-fetched calculations and units.
/// A view without both dates has no week and yields nothing.
pub fn compute_deductions_for_week(
    view: &CalculationView,
    calculations: &[OwnerCalculation],
    units: &[CalculationUnit],
) -> Vec<CalculationUnit> {
    let target = match view_period(view) {
        Some(p) => p,
        None => return Vec::new(),
    };
    let index = build_period_index(calculations, units);
    let filtered = select_deductions_for_period(units, calculations, &index, &target);
    let from_view = collect_view_deductions(view, &target);
    let stragglers = index_stragglers(units, &index, &target);
    merge_deductions(filtered, from_view, stragglers)
        .into_iter()
        .cloned()
        .collect()
}

/// The view's normalized week, when both ends are set.
pub fn view_period(view: &CalculationView) -> Option<Period> {
    let start = view.start_date.as_deref().filter(|s| !s.is_empty())?;
    let end = view.end_date.as_deref().filter(|s| !s.is_empty())?;
    Some(Period::new(Some(start), Some(end)))
}

/// Why a deduction did or did not land in `target`, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct DeductionTrace {
    pub id: Option<RecordId>,
    pub own_period: Option<Period>,
    pub indexed_period: Option<Period>,
    pub final_start: String,
    pub final_end: String,
    pub dates_match: bool,
}

pub fn trace_deductions(
    units: &[CalculationUnit],
    index: &PeriodIndex<'_>,
    target: &Period,
) -> Vec<DeductionTrace> {
    units
        .iter()
        .filter(|u| is_deduction(u))
        .map(|u| {
            let own = u.start_date.as_deref().map(|s| normalize_date(Some(s)));
            let own_end = u.end_date.as_deref().map(|s| normalize_date(Some(s)));
            let indexed = index.get(u.id.as_ref()).map(|e| e.period.clone());
            let pick = |own: &Option<DateKey>, idx: Option<&DateKey>| -> String {
                own.as_ref()
                    .filter(|k| !k.is_empty())
                    .or(idx)
                    .map(|k| k.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            };
            let final_start = pick(&own, indexed.as_ref().map(|p| &p.start));
            let final_end = pick(&own_end, indexed.as_ref().map(|p| &p.end));
            let dates_match =
                final_start == target.start.as_str() && final_end == target.end.as_str();
            DeductionTrace {
                id: u.id.clone(),
                own_period: u
                    .own_dates()
                    .map(|(s, e)| Period::new(Some(s), Some(e))),
                indexed_period: indexed,
                final_start,
                final_end,
                dates_match,
            }
        })
        .collect()
}
