// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::{self, Backend};
use crate::models::RecordId;
use anyhow::{Context, Result, bail};

pub fn handle(api: &dyn Backend, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("rm", sub)) = m.subcommand() {
        let raw = sub.get_one::<String>("id").unwrap();
        let id = RecordId::from(raw.as_str());
        if !id.is_present() {
            bail!("Cannot delete: unit id is missing");
        }
        api::delete_calculation_unit(api, &id)
            .with_context(|| format!("Failed to delete unit {}", id))?;
        println!("Unit {} deleted", id);
    }
    Ok(())
}
