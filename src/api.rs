// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Backend transport and the typed calls made through it.
//!
//! List endpoints answer with a bare array, a `{results: [...]}` page, or
//! (for trucks) one of several wrapper keys. [`unwrap_list`] and
//! [`unwrap_truck_list`] turn all of those into one sequence before any
//! record is decoded.

use crate::config::Settings;
use crate::models::{
    CalculationUnit, NewDeduction, NewOwnerCalculation, OwnerCalculation,
    OwnerCalculationPatch, RecordId, Truck,
};
use chrono::NaiveDate;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("could not decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode request body for {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode query: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),
}

/// Request/response transport to the calculations backend. Paths are
/// relative to the configured base URL.
pub trait Backend: Send + Sync {
    fn get(&self, path: &str) -> Result<Value, ApiError>;
    fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError>;
    fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError>;
    fn delete(&self, path: &str) -> Result<(), ApiError>;
}

pub struct HttpBackend {
    client: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            client: crate::utils::http_client()?,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            token: settings.token.clone().filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "backend request");

        let mut req = self.client.request(method, &url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let transport = |source| ApiError::Transport {
            path: path.to_string(),
            source,
        };
        let resp = req.send().map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        let text = resp.text().map_err(transport)?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

impl Backend for HttpBackend {
    fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send(Method::GET, path, None)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.send(Method::POST, path, Some(body))
    }

    fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.send(Method::PATCH, path, Some(body))
    }

    fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None).map(|_| ())
    }
}

pub const TRUCKS_PATH: &str = "/calculations/all-trucks";
pub const OWNER_CALCULATION_PATH: &str = "/calculations/owner-calculation/";
pub const CALCULATION_UNIT_PATH: &str = "/calculations/calculation-unit/";

const TRUCK_LIST_KEYS: [&str; 4] = ["trucks", "data", "results", "items"];

/// Bare array or `{results: [...]}`; anything else is empty.
pub fn unwrap_list(v: Value) -> Vec<Value> {
    match v {
        Value::Array(items) => items,
        Value::Object(mut m) => match m.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Truck lists come wrapped in whichever key the endpoint version uses.
/// The first set wrapper wins; an object under it is read by its values.
pub fn unwrap_truck_list(v: Value) -> Vec<Value> {
    match v {
        Value::Array(items) => items,
        Value::Object(mut m) => {
            let inner = TRUCK_LIST_KEYS
                .iter()
                .filter_map(|k| m.remove(*k))
                .find(is_truthy);
            match inner {
                Some(Value::Array(items)) => items,
                Some(Value::Object(o)) => o.into_iter().map(|(_, v)| v).collect(),
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Decode each element on its own; nulls are dropped and records that do
/// not decode are skipped with a warning.
pub fn decode_list<T: DeserializeOwned>(items: Vec<Value>, what: &str) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        if item.is_null() {
            continue;
        }
        match serde_json::from_value::<T>(item) {
            Ok(rec) => out.push(rec),
            Err(e) => warn!(index = idx, error = %e, "skipping undecodable {}", what),
        }
    }
    out
}

/// Owner filter for the calculation-unit endpoint: the numeric owner id when
/// one is known, otherwise the owner's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerKey {
    Id(i64),
    Name(String),
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerKey::Id(n) => write!(f, "{}", n),
            OwnerKey::Name(s) => f.write_str(s),
        }
    }
}

pub fn owner_calculations_path(
    owner: &str,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<String, ApiError> {
    let mut params = vec![("search", owner.to_string())];
    if let Some((start, end)) = range {
        params.push(("start_date", start.format("%Y-%m-%d").to_string()));
        params.push(("end_date", end.format("%Y-%m-%d").to_string()));
    }
    let qs = serde_urlencoded::to_string(&params)?;
    Ok(format!("{}?{}", OWNER_CALCULATION_PATH, qs))
}

pub fn calculation_units_path(owner: &OwnerKey) -> Result<String, ApiError> {
    let qs = serde_urlencoded::to_string([("owner", owner.to_string())])?;
    Ok(format!("{}?{}", CALCULATION_UNIT_PATH, qs))
}

pub fn fetch_trucks(api: &dyn Backend) -> Result<Vec<Truck>, ApiError> {
    let v = api.get(TRUCKS_PATH)?;
    Ok(decode_list(unwrap_truck_list(v), "truck"))
}

pub fn fetch_owner_calculations(
    api: &dyn Backend,
    owner: &str,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<OwnerCalculation>, ApiError> {
    let v = api.get(&owner_calculations_path(owner, range)?)?;
    Ok(decode_list(unwrap_list(v), "owner calculation"))
}

pub fn fetch_calculation_units(
    api: &dyn Backend,
    owner: &OwnerKey,
) -> Result<Vec<CalculationUnit>, ApiError> {
    let v = api.get(&calculation_units_path(owner)?)?;
    Ok(decode_list(unwrap_list(v), "calculation unit"))
}

pub fn delete_calculation_unit(api: &dyn Backend, id: &RecordId) -> Result<(), ApiError> {
    api.delete(&format!("{}{}/", CALCULATION_UNIT_PATH, id))
}

fn decode_one<T: DeserializeOwned>(path: &str, v: Value) -> Result<T, ApiError> {
    serde_json::from_value(v).map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}

fn encode<T: serde::Serialize>(path: &str, body: &T) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|source| ApiError::Encode {
        path: path.to_string(),
        source,
    })
}

pub fn create_owner_calculation(
    api: &dyn Backend,
    new: &NewOwnerCalculation,
) -> Result<OwnerCalculation, ApiError> {
    let body = encode(OWNER_CALCULATION_PATH, new)?;
    let v = api.post(OWNER_CALCULATION_PATH, &body)?;
    decode_one(OWNER_CALCULATION_PATH, v)
}

pub fn update_owner_calculation(
    api: &dyn Backend,
    id: &RecordId,
    patch: &OwnerCalculationPatch,
) -> Result<OwnerCalculation, ApiError> {
    let path = format!("{}{}/", OWNER_CALCULATION_PATH, id);
    let body = encode(&path, patch)?;
    let v = api.patch(&path, &body)?;
    decode_one(&path, v)
}

pub fn create_deduction(
    api: &dyn Backend,
    new: &NewDeduction,
) -> Result<CalculationUnit, ApiError> {
    let body = encode(CALCULATION_UNIT_PATH, new)?;
    let v = api.post(CALCULATION_UNIT_PATH, &body)?;
    decode_one(CALCULATION_UNIT_PATH, v)
}
