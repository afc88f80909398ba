use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ParameterError;

/// The kind of an operator parameter, as declared by the backend catalog.
///
/// This is a closed set: every kind the backend can emit has a variant, and
/// every dispatch over it is an exhaustive match. The dotted aliases cover
/// the wire names the catalog marshaller produces for the datetime kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Str,
    Bool,
    Int,
    Float,
    Dict,
    List,
    Mapping,
    #[serde(alias = "datetime.datetime")]
    Datetime,
    #[serde(alias = "datetime.timedelta")]
    Timedelta,
    Callable,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterKind::Str => "str",
            ParameterKind::Bool => "bool",
            ParameterKind::Int => "int",
            ParameterKind::Float => "float",
            ParameterKind::Dict => "dict",
            ParameterKind::List => "list",
            ParameterKind::Mapping => "mapping",
            ParameterKind::Datetime => "datetime",
            ParameterKind::Timedelta => "timedelta",
            ParameterKind::Callable => "callable",
        };
        write!(f, "{}", name)
    }
}

/// A raw parameter value coerced into its declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Dict(serde_json::Map<String, serde_json::Value>),
    List(Vec<serde_json::Value>),
    Mapping(serde_json::Map<String, serde_json::Value>),
    Datetime(NaiveDateTime),
    Timedelta(Duration),
    Callable(String),
}

impl ParameterKind {
    /// Coerces a raw string value (the form the backend and the parameter
    /// forms exchange) into a typed [`ParameterValue`].
    pub fn coerce(&self, id: &str, raw: &str) -> Result<ParameterValue, ParameterError> {
        let invalid = || ParameterError::InvalidValue {
            id: id.to_string(),
            kind: *self,
            raw: raw.to_string(),
        };

        match self {
            ParameterKind::Str => Ok(ParameterValue::Str(raw.to_string())),

            ParameterKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(ParameterValue::Bool(true)),
                "false" | "0" => Ok(ParameterValue::Bool(false)),
                _ => Err(invalid()),
            },

            ParameterKind::Int => raw
                .trim()
                .parse::<i64>()
                .map(ParameterValue::Int)
                .map_err(|_| invalid()),

            ParameterKind::Float => raw
                .trim()
                .parse::<f64>()
                .map(ParameterValue::Float)
                .map_err(|_| invalid()),

            ParameterKind::Dict => parse_object(raw)
                .map(ParameterValue::Dict)
                .ok_or_else(invalid),

            ParameterKind::Mapping => parse_object(raw)
                .map(ParameterValue::Mapping)
                .ok_or_else(invalid),

            ParameterKind::List => serde_json::from_str::<serde_json::Value>(raw)
                .ok()
                .and_then(|value| value.as_array().cloned())
                .map(ParameterValue::List)
                .ok_or_else(invalid),

            ParameterKind::Datetime => parse_datetime(raw.trim())
                .map(ParameterValue::Datetime)
                .ok_or_else(invalid),

            ParameterKind::Timedelta => parse_timedelta(raw.trim())
                .map(ParameterValue::Timedelta)
                .ok_or_else(invalid),

            ParameterKind::Callable => {
                let trimmed = raw.trim();
                if is_dotted_identifier(trimmed) {
                    Ok(ParameterValue::Callable(trimmed.to_string()))
                } else {
                    Err(invalid())
                }
            }
        }
    }
}

fn parse_object(raw: &str) -> Option<serde_json::Map<String, serde_json::Value>> {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|value| value.as_object().cloned())
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Accepts `HH:MM:SS` or a plain number of seconds.
fn parse_timedelta(raw: &str) -> Option<Duration> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() == 3 {
        let hours = parts[0].parse::<i64>().ok()?;
        let minutes = parts[1].parse::<i64>().ok()?;
        let seconds = parts[2].parse::<i64>().ok()?;
        if !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
            return None;
        }
        return Some(Duration::seconds(hours * 3600 + minutes * 60 + seconds));
    }
    let seconds = raw.parse::<f64>().ok()?;
    Some(Duration::milliseconds((seconds * 1000.0) as i64))
}

fn is_dotted_identifier(raw: &str) -> bool {
    !raw.is_empty()
        && raw.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}

/// A single operator or DAG parameter, as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorParameter {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(
        rename = "inheritedFrom",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub inherited_from: Option<String>,
}

impl OperatorParameter {
    /// Copies `default` into `value` when no value is set. Runs once per
    /// fetched payload, at catalog/DAG load time; later edits are never
    /// re-seeded.
    pub fn seed_from_default(&mut self) {
        if self.value.is_none() && self.default.is_some() {
            self.value = self.default.clone();
        }
    }

    /// Coerces the current value, if any, into its declared kind.
    pub fn coerced_value(&self) -> Option<Result<ParameterValue, ParameterError>> {
        self.value
            .as_deref()
            .map(|raw| self.kind.coerce(&self.id, raw))
    }

    /// A set value must coerce into the declared kind; an unset value is
    /// fine here (required-ness is checked with node context, see `wml`).
    pub fn validate(&self) -> Result<(), ParameterError> {
        match self.coerced_value() {
            Some(Err(err)) => Err(err),
            _ => Ok(()),
        }
    }
}
