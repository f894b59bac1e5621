// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::{self, Backend};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};

pub fn handle(api: &dyn Backend, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("list", sub)) = m.subcommand() {
        let trucks = api::fetch_trucks(api).context("Failed to fetch trucks")?;
        if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &trucks)? {
            return Ok(());
        }
        let rows: Vec<Vec<String>> = trucks
            .iter()
            .map(|t| {
                vec![
                    t.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
                    t.unit_number.clone().unwrap_or_else(|| "N/A".into()),
                    t.carrier_company.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["ID", "Unit", "Carrier"], rows));
    }
    Ok(())
}
