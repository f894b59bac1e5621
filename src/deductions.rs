// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Fetch stages in front of the reconciliation pipeline.
//!
//! Calculations must resolve before the owner id is known, and the owner id
//! before units can be fetched. Any failure along the way is logged and the
//! view shows no deductions.

use crate::api::{self, ApiError, Backend, OwnerKey};
use crate::models::{CalculationUnit, CalculationView, OwnerCalculation};
use crate::reconcile::{build_period_index, compute_deductions_for_week, trace_deductions, view_period};
use tracing::{debug, error, info, warn};

/// Owner id from the first calculation whose first unit carries a numeric
/// owner; the owner's name when none does.
pub fn resolve_owner_key(calculations: &[OwnerCalculation], owner_name: &str) -> OwnerKey {
    calculations
        .iter()
        .filter_map(|c| c.calculation_units.first())
        .find_map(|u| u.owner.as_ref().and_then(|o| o.numeric_id()))
        .map(OwnerKey::Id)
        .unwrap_or_else(|| {
            warn!(owner = owner_name, "no numeric owner id in calculations, using name");
            OwnerKey::Name(owner_name.to_string())
        })
}

/// Deductions for the week `view` shows. Never fails: errors degrade to an
/// empty list.
pub fn fetch_deductions_for_view(api: &dyn Backend, view: &CalculationView) -> Vec<CalculationUnit> {
    match try_fetch(api, view) {
        Ok(units) => units,
        Err(e) => {
            error!(view = %view.key(), error = %e, "fetching deductions failed");
            Vec::new()
        }
    }
}

fn try_fetch(api: &dyn Backend, view: &CalculationView) -> Result<Vec<CalculationUnit>, ApiError> {
    let Some(target) = view_period(view) else {
        warn!(
            start_date = ?view.start_date,
            end_date = ?view.end_date,
            "calculation is missing dates"
        );
        return Ok(Vec::new());
    };
    let Some(owner) = view.owner_name() else {
        warn!("could not find owner name on calculation");
        return Ok(Vec::new());
    };
    debug!(owner, week = %target, "matching deductions");

    let calculations = api::fetch_owner_calculations(api, owner, None)?;
    if calculations.is_empty() {
        warn!(owner, "no owner calculations found");
        return Ok(Vec::new());
    }

    let owner_key = resolve_owner_key(&calculations, owner);
    let units = api::fetch_calculation_units(api, &owner_key)?;
    debug!(
        calculations = calculations.len(),
        units = units.len(),
        owner_key = %owner_key,
        "fetched reconciliation inputs"
    );

    let matched = compute_deductions_for_week(view, &calculations, &units);
    info!(week = %target, deductions = matched.len(), "deductions matched");

    if matched.is_empty() && tracing::enabled!(tracing::Level::DEBUG) {
        let index = build_period_index(&calculations, &units);
        for t in trace_deductions(&units, &index, &target) {
            debug!(
                id = ?t.id,
                own = ?t.own_period,
                indexed = ?t.indexed_period,
                final_start = %t.final_start,
                final_end = %t.final_end,
                dates_match = t.dates_match,
                "unmatched deduction"
            );
        }
    }
    Ok(matched)
}
