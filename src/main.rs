// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use ownercalc::{api::HttpBackend, cli, commands, config, logging};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    logging::init(matches.get_flag("verbose"));

    if let Some(("config", sub)) = matches.subcommand() {
        return commands::settings::handle(sub);
    }

    let settings = config::resolve(&matches)?;
    let backend = HttpBackend::new(&settings)?;
    tracing::debug!(api_url = backend.base_url(), "backend ready");

    match matches.subcommand() {
        Some(("periods", sub)) => commands::periods::handle(&backend, &settings, sub)?,
        Some(("view", sub)) => commands::view::handle(&backend, sub)?,
        Some(("deductions", sub)) => commands::deductions::handle(&backend, sub)?,
        Some(("units", sub)) => commands::units::handle(&backend, sub)?,
        Some(("calc", sub)) => commands::calcs::handle(&backend, sub)?,
        Some(("trucks", sub)) => commands::trucks::handle(&backend, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&backend, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
