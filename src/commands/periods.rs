// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::{self, Backend};
use crate::config::Settings;
use crate::periods::{PeriodPage, list_periods};
use crate::utils::{format_money, maybe_print_json, parse_date, pretty_table};
use anyhow::{Context, Result};

pub fn handle(api: &dyn Backend, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let page = query_page(api, settings, m)?;
    if jsonl_flag {
        maybe_print_json(false, true, &page.periods)?;
        return Ok(());
    }
    if maybe_print_json(json_flag, false, &page)? {
        return Ok(());
    }
    if page.periods.is_empty() {
        println!("No data available for the selected owner and date range");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = page
        .periods
        .iter()
        .map(|p| {
            vec![
                format!(
                    "{} to {}",
                    p.start_date.as_deref().unwrap_or("N/A"),
                    p.end_date.as_deref().unwrap_or("N/A")
                ),
                format_money(&p.total_gross),
                format_money(&p.total_escrow),
                format_money(&p.total_prev),
                p.created_by.clone(),
                p.calculations.len().to_string(),
                p.previous_week_id
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Period", "Gross", "Escrow", "Prev Amount", "Created By", "Calcs", "Prev Week"],
            rows,
        )
    );
    println!(
        "Page {} of {} ({} periods)",
        page.page,
        page.total_pages().max(1),
        page.total_periods
    );
    Ok(())
}

pub fn query_page(api: &dyn Backend, settings: &Settings, m: &clap::ArgMatches) -> Result<PeriodPage> {
    let owner = m.get_one::<String>("owner").unwrap().trim();
    let range = match (m.get_one::<String>("from"), m.get_one::<String>("to")) {
        (Some(from), Some(to)) => Some((parse_date(from)?, parse_date(to)?)),
        _ => None,
    };
    let page = *m.get_one::<usize>("page").unwrap_or(&1);
    let page_size = m
        .get_one::<usize>("page-size")
        .copied()
        .unwrap_or(settings.page_size);

    let calcs = api::fetch_owner_calculations(api, owner, range)
        .with_context(|| format!("Fetch calculations for owner '{}'", owner))?;
    Ok(list_periods(&calcs, owner, page, page_size))
}
