// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use tracing_subscriber::{EnvFilter, fmt};

/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
pub fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "ownercalc=debug,warn" } else { "warn" })
    })
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
pub fn init(verbose: bool) {
    let _ = fmt()
        .with_env_filter(filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
