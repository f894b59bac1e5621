// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::view::{load_view, print_deductions};
use crate::api::{self, Backend, OwnerKey};
use crate::deductions::resolve_owner_key;
use crate::models::{NewDeduction, RecordId};
use crate::utils::{format_money, maybe_print_json, parse_date, parse_decimal};
use crate::view::{ViewSession, delete_deduction, open_view};
use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;

pub fn handle(api: &dyn Backend, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(api, sub)?,
        Some(("rm", sub)) => rm(api, sub)?,
        Some(("add", sub)) => add(api, sub)?,
        _ => {}
    }
    Ok(())
}

fn list(api: &dyn Backend, sub: &clap::ArgMatches) -> Result<()> {
    let view = load_view(api, sub, None)?;
    let mut session = ViewSession::new();
    let report = open_view(api, &mut session, &view);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report.deductions)? {
        print_deductions(&report);
    }
    Ok(())
}

fn rm(api: &dyn Backend, sub: &clap::ArgMatches) -> Result<()> {
    let id = RecordId::from(sub.get_one::<String>("id").unwrap().as_str());
    let view = load_view(api, sub, None)?;
    let mut session = ViewSession::new();
    let before = open_view(api, &mut session, &view);
    if !before.deductions.iter().any(|d| d.id.as_ref() == Some(&id)) {
        bail!("Deduction {} is not listed for {}", id, before.summary.period);
    }
    let after = delete_deduction(api, &mut session, &view, &id)
        .with_context(|| format!("Failed to delete deduction {}", id))?;
    println!("Deduction {} deleted", id);
    print_deductions(&after);
    Ok(())
}

/// `--owner-id` when given, else the numeric owner on the first unit of the
/// owner's calculations.
pub fn resolve_owner_id(api: &dyn Backend, sub: &clap::ArgMatches) -> Result<i64> {
    if let Some(id) = sub.get_one::<i64>("owner-id") {
        return Ok(*id);
    }
    let name = sub.get_one::<String>("owner").unwrap().trim();
    let calcs = api::fetch_owner_calculations(api, name, None)
        .with_context(|| format!("Fetch calculations for owner '{}'", name))?;
    match resolve_owner_key(&calcs, name) {
        OwnerKey::Id(id) => Ok(id),
        OwnerKey::Name(_) => bail!("No numeric owner id found for '{}'; pass --owner-id", name),
    }
}

pub fn new_deduction(sub: &clap::ArgMatches, owner: i64) -> Result<NewDeduction> {
    let start_date = parse_date(sub.get_one::<String>("start").unwrap())?;
    let end_date = parse_date(sub.get_one::<String>("end").unwrap())?;
    if end_date < start_date {
        bail!("Period end {} is before start {}", end_date, start_date);
    }
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let escrow = match sub.get_one::<String>("escrow") {
        Some(s) => parse_decimal(s)?,
        None => Decimal::ZERO,
    };
    Ok(NewDeduction {
        owner,
        truck: sub
            .get_one::<String>("truck")
            .map(|t| RecordId::from(t.as_str())),
        amount,
        escrow,
        start_date,
        end_date,
        note: sub
            .get_one::<String>("note")
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        statement: None,
    })
}

fn add(api: &dyn Backend, sub: &clap::ArgMatches) -> Result<()> {
    let owner = resolve_owner_id(api, sub)?;
    let new = new_deduction(sub, owner)?;
    let created = api::create_deduction(api, &new).context("Failed to create deduction")?;
    println!(
        "Recorded deduction {} of {} for {} to {}",
        created
            .id
            .as_ref()
            .map(|i| i.to_string())
            .unwrap_or_else(|| "(pending)".into()),
        format_money(&new.amount),
        new.start_date,
        new.end_date
    );
    Ok(())
}
