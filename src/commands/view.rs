// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::{self, Backend};
use crate::display::{DEDUCTION_HEADERS, REVENUE_HEADERS};
use crate::models::{CalculationView, RecordId};
use crate::periods::{is_valid_calculation, owner_matches};
use crate::reconcile::Period;
use crate::utils::{maybe_print_json, parse_date, pretty_table};
use crate::view::{ViewReport, ViewSession, open_view};
use anyhow::{Context, Result, bail};

pub fn handle(api: &dyn Backend, m: &clap::ArgMatches) -> Result<()> {
    let calc_id = m.get_one::<String>("id").map(String::as_str);
    let view = load_view(api, m, calc_id)?;
    let mut session = ViewSession::new();
    let report = open_view(api, &mut session, &view);
    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &report)? {
        print_report(&report);
    }
    Ok(())
}

/// The owner's calculations for `--start`/`--end`, as the owner page would
/// open them: the calculation `calc_id` when given, else the whole period.
pub fn load_view(
    api: &dyn Backend,
    m: &clap::ArgMatches,
    calc_id: Option<&str>,
) -> Result<CalculationView> {
    let owner = m.get_one::<String>("owner").unwrap().trim().to_string();
    let start = parse_date(m.get_one::<String>("start").unwrap())?;
    let end = parse_date(m.get_one::<String>("end").unwrap())?;
    let target = Period::new(Some(&start.to_string()), Some(&end.to_string()));

    let calcs = api::fetch_owner_calculations(api, &owner, Some((start, end)))
        .with_context(|| format!("Fetch calculations for owner '{}'", owner))?;
    let mut in_period: Vec<_> = calcs
        .into_iter()
        .filter(|c| owner_matches(c, &owner) && is_valid_calculation(c))
        .filter(|c| Period::new(c.start_date.as_deref(), c.end_date.as_deref()) == target)
        .collect();

    if let Some(raw) = calc_id {
        let id = RecordId::from(raw);
        let Some(pos) = in_period.iter().position(|c| c.id.as_ref() == Some(&id)) else {
            bail!("Calculation {} not found for {} in {}", id, owner, target);
        };
        return Ok(CalculationView::open(in_period.swap_remove(pos), &owner));
    }

    match in_period.len() {
        0 => bail!("No calculation for {} in {}", owner, target),
        1 => Ok(CalculationView::open(in_period.remove(0), &owner)),
        _ => Ok(CalculationView::group(&owner, in_period)),
    }
}

pub fn print_report(report: &ViewReport) {
    println!("{}", pretty_table(&["Field", "Value"], report.summary.rows()));

    if report.revenue.is_empty() {
        println!("No revenue loads found for this period.");
    } else {
        let rows = report.revenue.iter().map(|r| r.cells()).collect();
        println!("{}", pretty_table(&REVENUE_HEADERS, rows));
    }

    print_deductions(report);
}

pub fn print_deductions(report: &ViewReport) {
    if report.deductions.is_empty() {
        println!("No deductions or adjustments recorded for this week.");
        return;
    }
    let rows = report.deductions.iter().map(|d| d.cells()).collect();
    println!("{}", pretty_table(&DEDUCTION_HEADERS, rows));
    println!("{} Items", report.deductions.len());
}
