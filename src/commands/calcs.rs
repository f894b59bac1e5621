// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::{self, Backend};
use crate::models::{NewOwnerCalculation, OwnerCalculation, OwnerCalculationPatch, RecordId};
use crate::utils::{format_currency, parse_date};
use anyhow::{Context, Result, bail};

pub fn handle(api: &dyn Backend, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let new = new_calculation(sub)?;
            let created = api::create_owner_calculation(api, &new)
                .context("Failed to create owner calculation")?;
            print_saved("Created", &created);
        }
        Some(("edit", sub)) => {
            let id = RecordId::from(sub.get_one::<String>("id").unwrap().as_str());
            let patch = calculation_patch(sub)?;
            if patch.is_empty() {
                bail!("Nothing to update: pass --owner, --start, --end, --unit or --note");
            }
            let updated = api::update_owner_calculation(api, &id, &patch)
                .with_context(|| format!("Failed to update owner calculation {}", id))?;
            print_saved("Updated", &updated);
        }
        _ => {}
    }
    Ok(())
}

fn unit_ids(sub: &clap::ArgMatches) -> Option<Vec<RecordId>> {
    sub.get_many::<String>("unit")
        .map(|vals| vals.map(|v| RecordId::from(v.as_str())).collect())
}

fn note(sub: &clap::ArgMatches) -> Option<String> {
    sub.get_one::<String>("note").map(|n| n.trim().to_string())
}

pub fn new_calculation(sub: &clap::ArgMatches) -> Result<NewOwnerCalculation> {
    let owner = sub.get_one::<String>("owner").unwrap().trim().to_string();
    if owner.is_empty() {
        bail!("Owner name is required");
    }
    let start_date = parse_date(sub.get_one::<String>("start").unwrap())?;
    let end_date = parse_date(sub.get_one::<String>("end").unwrap())?;
    if end_date < start_date {
        bail!("Period end {} is before start {}", end_date, start_date);
    }
    Ok(NewOwnerCalculation {
        owner,
        start_date,
        end_date,
        calculation_units: unit_ids(sub).unwrap_or_default(),
        note: note(sub).filter(|n| !n.is_empty()),
    })
}

/// Only the flags given end up in the patch. An empty `--note ""` clears the note.
pub fn calculation_patch(sub: &clap::ArgMatches) -> Result<OwnerCalculationPatch> {
    let start_date = sub.get_one::<String>("start").map(|s| parse_date(s)).transpose()?;
    let end_date = sub.get_one::<String>("end").map(|s| parse_date(s)).transpose()?;
    if let (Some(s), Some(e)) = (start_date, end_date) {
        if e < s {
            bail!("Period end {} is before start {}", e, s);
        }
    }
    Ok(OwnerCalculationPatch {
        owner: sub
            .get_one::<String>("owner")
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty()),
        start_date,
        end_date,
        calculation_units: unit_ids(sub),
        note: note(sub),
    })
}

fn print_saved(verb: &str, calc: &OwnerCalculation) {
    println!(
        "{} calculation {} for {} ({} to {}), gross {}, {} units",
        verb,
        calc.id
            .as_ref()
            .map(|i| i.to_string())
            .unwrap_or_else(|| "(pending)".into()),
        calc.owner.as_deref().unwrap_or("N/A"),
        calc.start_date.as_deref().unwrap_or("N/A"),
        calc.end_date.as_deref().unwrap_or("N/A"),
        format_currency(calc.total_amount.as_ref()),
        calc.calculation_units.len()
    );
}
