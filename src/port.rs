//! The port record and the partial body used to create or update one.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

pub const DEFAULT_PORT_TYPE: &str = "Access";

/// One switch port record as stored and served.
///
/// Fields missing from a stored record take their defaults on load. Fields
/// this type does not know about are kept in `extra` and written back.
/// Text fields holding a number or bool on disk load as its JSON text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Port {
    #[serde(deserialize_with = "text")]
    pub id: String,
    #[serde(deserialize_with = "text")]
    pub port_number: String,
    #[serde(deserialize_with = "text")]
    pub hostname: String,
    #[serde(deserialize_with = "text")]
    pub vlan: String,
    #[serde(deserialize_with = "text")]
    pub port_type: String,
    #[serde(deserialize_with = "truthy")]
    pub lag: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Port {
    fn default() -> Self {
        Self {
            id: String::new(),
            port_number: String::new(),
            hostname: String::new(),
            vlan: String::new(),
            port_type: DEFAULT_PORT_TYPE.to_owned(),
            lag: false,
            extra: Map::new(),
        }
    }
}

impl Port {
    /// Builds a new record from `input`, generating `port-<count+1>` when no
    /// id was supplied.
    ///
    /// The generated id is sequential over the current collection size, not
    /// over ids ever issued: after a delete it can repeat an id still in use.
    pub fn from_input(input: PortInput, count: usize) -> Self {
        let id = input
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("port-{}", count + 1));
        let defaults = Self::default();
        Self {
            id,
            port_number: input.port_number.unwrap_or(defaults.port_number),
            hostname: input.hostname.unwrap_or(defaults.hostname),
            vlan: input.vlan.unwrap_or(defaults.vlan),
            port_type: input.port_type.unwrap_or(defaults.port_type),
            lag: input.lag.unwrap_or(defaults.lag),
            extra: Map::new(),
        }
    }

    /// Overwrites every field present in `input`. The id never changes.
    pub fn apply(&mut self, input: PortInput) {
        if let Some(v) = input.port_number {
            self.port_number = v;
        }
        if let Some(v) = input.hostname {
            self.hostname = v;
        }
        if let Some(v) = input.vlan {
            self.vlan = v;
        }
        if let Some(v) = input.port_type {
            self.port_type = v;
        }
        if let Some(v) = input.lag {
            self.lag = v;
        }
    }
}

/// A partial port as sent in a create or update body.
///
/// Text fields accept any JSON value; non-strings are kept as their JSON
/// text and `null` counts as absent. A `lag` that is present, `null`
/// included, is read by truthiness.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortInput {
    #[serde(deserialize_with = "maybe_text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "maybe_text")]
    pub port_number: Option<String>,
    #[serde(deserialize_with = "maybe_text")]
    pub hostname: Option<String>,
    #[serde(deserialize_with = "maybe_text")]
    pub vlan: Option<String>,
    #[serde(deserialize_with = "maybe_text")]
    pub port_type: Option<String>,
    #[serde(deserialize_with = "maybe_truthy")]
    pub lag: Option<bool>,
}

impl PortInput {
    /// Parses a request body. A zero-length body is an empty object; anything
    /// else must parse as a JSON object.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;
        if !value.is_object() {
            return Err(ApiError::InvalidJson);
        }
        serde_json::from_value(value).map_err(|_| ApiError::InvalidJson)
    }
}

fn json_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(json_text(Value::deserialize(d)?).unwrap_or_default())
}

fn maybe_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(json_text(Value::deserialize(d)?))
}

fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(is_truthy(&Value::deserialize(d)?))
}

fn maybe_truthy<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    Ok(Some(is_truthy(&Value::deserialize(d)?)))
}
