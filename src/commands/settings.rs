// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, Settings};
use crate::utils::pretty_table;
use anyhow::Result;
use std::path::Path;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let path = config::config_path()?;
    match m.subcommand() {
        Some(("show", _)) => {
            let s = config::load_from(&path)?;
            show(&path, &s);
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = sub.get_one::<String>("value").unwrap();
            set_value(&path, key, value)?;
            println!("Saved {} to {}", key, path.display());
        }
        _ => {}
    }
    Ok(())
}

pub fn set_value(path: &Path, key: &str, value: &str) -> Result<Settings> {
    let mut s = config::load_from(path)?;
    s.set(key, value)?;
    config::save_to(path, &s)?;
    Ok(s)
}

fn show(path: &Path, s: &Settings) {
    let rows = vec![
        vec!["config".to_string(), path.display().to_string()],
        vec!["api-url".to_string(), s.api_url.clone()],
        vec!["token".to_string(), s.masked_token()],
        vec!["page-size".to_string(), s.page_size.to_string()],
    ];
    println!("{}", pretty_table(&["Setting", "Value"], rows));
}
