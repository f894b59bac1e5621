// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::view::load_view;
use crate::api::Backend;
use crate::display::DeductionRow;
use crate::view::{ViewSession, open_view};
use anyhow::{Result, bail};
use serde_json::json;
use std::path::Path;

pub fn handle(api: &dyn Backend, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("deductions", sub)) => export_deductions(api, sub),
        _ => Ok(()),
    }
}

fn export_deductions(api: &dyn Backend, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let view = load_view(api, sub, None)?;
    let mut session = ViewSession::new();
    let report = open_view(api, &mut session, &view);
    write_deductions(&report.deductions, &fmt, Path::new(out))?;
    println!(
        "Exported {} deductions for {} to {}",
        report.deductions.len(),
        report.summary.period,
        out
    );
    Ok(())
}

/// Write deduction rows as `csv` or `json`. Amounts keep full precision.
pub fn write_deductions(rows: &[DeductionRow], fmt: &str, out: &Path) -> Result<()> {
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["id", "unit", "driver", "amount", "escrow", "note"])?;
            for row in rows {
                wtr.write_record([
                    row.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
                    row.unit.clone(),
                    row.driver.clone(),
                    row.amount.to_string(),
                    row.escrow.to_string(),
                    row.note.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|row| {
                    json!({
                        "id": row.id, "unit": row.unit, "driver": row.driver,
                        "amount": row.amount.to_string(), "escrow": row.escrow.to_string(), "note": row.note
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(())
}
