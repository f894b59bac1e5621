// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Ownercalc", "ownercalc"));

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_PAGE_SIZE: usize = 5;

pub const ENV_API_URL: &str = "OWNERCALC_API_URL";
pub const ENV_TOKEN: &str = "OWNERCALC_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    pub token: Option<String>,
    pub page_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Settings {
    /// Environment overrides, read through `lookup` so callers pick the source.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.token = Some(token.trim().to_string());
        }
        self
    }

    pub fn with_flags(mut self, api_url: Option<&String>, token: Option<&String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url.trim().to_string();
        }
        if let Some(t) = token {
            self.token = Some(t.trim().to_string());
        }
        self
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "api-url" | "api_url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    bail!("Invalid api-url '{}', expected http(s)://...", value);
                }
                self.api_url = value.to_string();
            }
            "token" => {
                self.token = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "page-size" | "page_size" => {
                let n: usize = value
                    .parse()
                    .with_context(|| format!("Invalid page-size '{}'", value))?;
                if n == 0 {
                    bail!("page-size must be at least 1");
                }
                self.page_size = n;
            }
            other => return Err(anyhow!("Unknown setting '{}'", other)),
        }
        Ok(())
    }

    /// Token with all but the last four characters hidden.
    pub fn masked_token(&self) -> String {
        match &self.token {
            None => "(none)".to_string(),
            Some(t) => {
                let n = t.chars().count();
                let tail: String = t.chars().skip(n.saturating_sub(4)).collect();
                format!("{}{}", "*".repeat(n.saturating_sub(4)), tail)
            }
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific config dir")?;
    let dir = proj.config_dir();
    fs::create_dir_all(dir).context("Failed to create config dir")?;
    Ok(dir.join("config.json"))
}

pub fn load_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Read config at {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Parse config at {}", path.display()))
}

pub fn save_to(path: &Path, settings: &Settings) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(settings)?)
        .with_context(|| format!("Write config at {}", path.display()))
}

/// File settings, then environment, then command line flags.
pub fn resolve(m: &clap::ArgMatches) -> Result<Settings> {
    let settings = load_from(&config_path()?)?
        .with_env(|k| std::env::var(k).ok())
        .with_flags(m.get_one::<String>("api-url"), m.get_one::<String>("token"));
    Ok(settings)
}
