// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Backend record identifier. The backend hands out numbers, but some
/// endpoints echo them back as strings, so both are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// `0` and `""` are treated as "no id".
    pub fn is_present(&self) -> bool {
        match self {
            RecordId::Number(n) => *n != 0,
            RecordId::Text(s) => !s.is_empty(),
        }
    }

    /// Lookup key; `7` and `"7"` share it.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Number(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        match s.trim().parse::<i64>() {
            Ok(n) => RecordId::Number(n),
            Err(_) => RecordId::Text(s.trim().to_string()),
        }
    }
}

/// Monetary value as sent by the backend: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// `None` when the value does not coerce to a number.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Amount::Number(n) => crate::utils::decimal_from_f64(*n),
            Amount::Text(s) => crate::utils::coerce_decimal(s),
        }
    }

    /// The value as a float; `None` for blank or non-numeric text.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Amount::Number(n) => Some(*n),
            Amount::Text(s) => crate::utils::coerce_f64(s),
        }
    }
}

impl From<f64> for Amount {
    fn from(n: f64) -> Self {
        Amount::Number(n)
    }
}

impl From<&str> for Amount {
    fn from(s: &str) -> Self {
        Amount::Text(s.to_string())
    }
}

impl From<Decimal> for Amount {
    fn from(d: Decimal) -> Self {
        Amount::Text(d.to_string())
    }
}

/// Missing or non-numeric amounts count as zero.
pub fn amount_or_zero(a: Option<&Amount>) -> Decimal {
    a.and_then(Amount::to_decimal).unwrap_or(Decimal::ZERO)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementInfo {
    #[serde(default, deserialize_with = "opt_text")]
    pub driver: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub pdf_file: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub pdf_file_url: Option<String>,
}

/// Statement attached to a revenue unit. Anything that is not an object
/// (a bare id, `false`, ...) is still "a statement" for classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Statement {
    Attached(StatementInfo),
    Reference(Value),
}

impl Statement {
    pub fn info(&self) -> Option<&StatementInfo> {
        match self {
            Statement::Attached(info) => Some(info),
            Statement::Reference(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Truck {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "opt_text")]
    pub unit_number: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub carrier_company: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TruckRef {
    Embedded(Truck),
    Ref(RecordId),
}

impl TruckRef {
    pub fn id(&self) -> Option<&RecordId> {
        match self {
            TruckRef::Embedded(t) => t.id.as_ref(),
            TruckRef::Ref(id) => Some(id),
        }
    }

    pub fn embedded(&self) -> Option<&Truck> {
        match self {
            TruckRef::Embedded(t) => Some(t),
            TruckRef::Ref(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerInfo {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "opt_text")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerRef {
    Id(i64),
    Name(String),
    Embedded(OwnerInfo),
}

impl OwnerRef {
    /// Numeric owner id, only when the backend sent a bare non-zero number.
    pub fn numeric_id(&self) -> Option<i64> {
        match self {
            OwnerRef::Id(n) if *n != 0 => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default, deserialize_with = "opt_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreatedBy {
    Name(String),
    User(UserInfo),
}

impl CreatedBy {
    pub fn display_name(&self) -> String {
        match self {
            CreatedBy::Name(s) => s.clone(),
            CreatedBy::User(u) => {
                let first = non_empty(u.first_name.as_deref());
                let last = non_empty(u.last_name.as_deref());
                let username = non_empty(u.username.as_deref());
                if first.is_some() || last.is_some() {
                    let full = format!("{} {}", first.unwrap_or(""), last.unwrap_or(""));
                    let full = full.trim();
                    if !full.is_empty() {
                        return full.to_string();
                    }
                }
                username.unwrap_or("N/A").to_string()
            }
        }
    }
}

pub fn created_by_name(c: Option<&CreatedBy>) -> String {
    c.map(CreatedBy::display_name)
        .unwrap_or_else(|| "N/A".to_string())
}

/// One billable record. Units without a statement are deductions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationUnit {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub owner: Option<OwnerRef>,
    #[serde(default)]
    pub statement: Option<Statement>,
    #[serde(default, deserialize_with = "opt_text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub escrow: Option<Amount>,
    #[serde(default)]
    pub truck: Option<TruckRef>,
    #[serde(default, deserialize_with = "opt_text")]
    pub driver: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub driver_name: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub note: Option<String>,
}

impl CalculationUnit {
    /// Both own dates present and non-empty.
    pub fn own_dates(&self) -> Option<(&str, &str)> {
        match (
            non_empty(self.start_date.as_deref()),
            non_empty(self.end_date.as_deref()),
        ) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        }
    }

    pub fn has_present_id(&self) -> bool {
        self.id.as_ref().is_some_and(RecordId::is_present)
    }
}

/// Billing-period aggregate for one owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerCalculation {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "opt_text")]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub total_amount: Option<Amount>,
    #[serde(default)]
    pub total_escrow: Option<Amount>,
    #[serde(default)]
    pub prev_amount: Option<Amount>,
    #[serde(default, deserialize_with = "unit_list")]
    pub calculation_units: Vec<CalculationUnit>,
    #[serde(default)]
    pub created_by: Option<CreatedBy>,
    #[serde(default, deserialize_with = "opt_text")]
    pub note: Option<String>,
}

impl OwnerCalculation {
    pub fn contains_unit(&self, id: &Option<RecordId>) -> bool {
        self.calculation_units.iter().any(|u| &u.id == id)
    }
}

/// Payload for `POST /calculations/owner-calculation/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOwnerCalculation {
    pub owner: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub calculation_units: Vec<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Payload for `PATCH /calculations/owner-calculation/<id>/`; unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OwnerCalculationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation_units: Option<Vec<RecordId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl OwnerCalculationPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Payload for `POST /calculations/calculation-unit/`. Deductions carry a null statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDeduction {
    pub owner: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truck: Option<RecordId>,
    pub amount: Decimal,
    pub escrow: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub statement: Option<Statement>,
}

/// What a calculation view was opened on.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewBody {
    Single(OwnerCalculation),
    Group(Vec<OwnerCalculation>),
}

/// Immutable snapshot of the calculation being viewed.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationView {
    pub owner: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub total_amount: Option<Amount>,
    pub total_escrow: Option<Amount>,
    pub body: ViewBody,
}

impl CalculationView {
    pub fn single(calc: OwnerCalculation) -> Self {
        Self {
            owner: calc.owner.clone(),
            start_date: calc.start_date.clone(),
            end_date: calc.end_date.clone(),
            total_amount: calc.total_amount.clone(),
            total_escrow: calc.total_escrow.clone(),
            body: ViewBody::Single(calc),
        }
    }

    /// A one-calculation group, the way the owner page opens a calculation.
    pub fn open(calc: OwnerCalculation, fallback_owner: &str) -> Self {
        let owner = non_empty(calc.owner.as_deref())
            .unwrap_or(fallback_owner)
            .to_string();
        Self {
            owner: Some(owner),
            start_date: calc.start_date.clone(),
            end_date: calc.end_date.clone(),
            total_amount: calc.total_amount.clone(),
            total_escrow: calc.total_escrow.clone(),
            body: ViewBody::Group(vec![calc]),
        }
    }

    /// Every calculation of one period; totals are summed across them.
    pub fn group(owner: &str, calcs: Vec<OwnerCalculation>) -> Self {
        let first = calcs.first();
        let start_date = first.and_then(|c| c.start_date.clone());
        let end_date = first.and_then(|c| c.end_date.clone());
        let total = |f: fn(&OwnerCalculation) -> Option<&Amount>| -> Amount {
            calcs
                .iter()
                .map(|c| amount_or_zero(f(c)))
                .sum::<Decimal>()
                .into()
        };
        Self {
            owner: Some(owner.to_string()),
            start_date,
            end_date,
            total_amount: Some(total(|c| c.total_amount.as_ref())),
            total_escrow: Some(total(|c| c.total_escrow.as_ref())),
            body: ViewBody::Group(calcs),
        }
    }

    pub fn calculations(&self) -> Vec<&OwnerCalculation> {
        match &self.body {
            ViewBody::Single(c) => vec![c],
            ViewBody::Group(cs) => cs.iter().collect(),
        }
    }

    /// The view's own owner, else the first nested calculation's.
    pub fn owner_name(&self) -> Option<&str> {
        if let Some(o) = non_empty(self.owner.as_deref()) {
            return Some(o);
        }
        match &self.body {
            ViewBody::Group(cs) => cs.first().and_then(|c| non_empty(c.owner.as_deref())),
            ViewBody::Single(_) => None,
        }
    }

    pub fn key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.owner_name().unwrap_or(""),
            self.start_date.as_deref().unwrap_or(""),
            self.end_date.as_deref().unwrap_or("")
        )
    }
}

pub(crate) fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.is_empty())
}

fn opt_text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Nested units decode one by one; a unit that does not decode is skipped
/// without losing its calculation.
fn unit_list<'de, D>(d: D) -> Result<Vec<CalculationUnit>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    Ok(crate::api::decode_list(items, "nested calculation unit"))
}
