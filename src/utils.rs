// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Amount;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

const UA: &str = concat!("ownercalc/", env!("CARGO_PKG_VERSION"));

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

// Leading numeric prefix, the way a lenient float parser reads "12.5 USD".
static NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid numeric regex")
});

/// Leading number of `s`, skipping leading whitespace and ignoring trailing
/// garbage. `None` when no number leads the string.
pub fn coerce_f64(s: &str) -> Option<f64> {
    let m = NUMERIC_PREFIX.find(s.trim_start())?;
    m.as_str().parse::<f64>().ok()
}

/// Coerce a numeric string to a decimal; see [`coerce_f64`].
pub fn coerce_decimal(s: &str) -> Option<Decimal> {
    coerce_f64(s).and_then(decimal_from_f64)
}

pub fn decimal_from_f64(n: f64) -> Option<Decimal> {
    if !n.is_finite() {
        return None;
    }
    if n == 0.0 {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(&n.to_string()).ok()
}

/// `$` and `n` at two decimals, rounded from its exact binary value with
/// ties away from zero. A negative input keeps its sign even when it rounds
/// to zero (`$-0.00`), and the sign follows the dollar sign (`$-50.00`).
pub fn format_fixed(n: f64) -> String {
    let sign = if n < 0.0 { "-" } else { "" };
    let magnitude = n.abs();
    match Decimal::from_f64_retain(magnitude) {
        Some(d) => {
            let rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            format!("${}{:.2}", sign, rounded)
        }
        None => format!("${}{:.2}", sign, magnitude),
    }
}

/// Decimal totals print through their nearest `f64`, like any other amount.
pub fn format_money(d: &Decimal) -> String {
    match d.to_f64() {
        Some(n) => format_fixed(n),
        None => "$0.00".to_string(),
    }
}

pub fn format_currency(value: Option<&Amount>) -> String {
    match value.and_then(Amount::to_f64) {
        Some(n) if n.is_finite() => format_fixed(n),
        _ => "$0.00".to_string(),
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
