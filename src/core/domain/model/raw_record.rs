//! Typed access to the loosely-typed JSON objects the API returns.
//!
//! Proxmox is inconsistent about scalar encodings (numbers may arrive as
//! strings, flags as `0/1`, `"1"` or booleans), so every accessor returns an
//! `Option` and the caller applies its own default.

use serde::Serialize;
use serde_json::{Map, Value};

/// A single JSON object from an API response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Wraps a JSON value; anything but an object yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Splits a JSON array into records, dropping non-object entries.
    /// A non-array value yields an empty list.
    pub fn list(value: Value) -> Vec<Self> {
        match value {
            Value::Array(items) => items.into_iter().filter_map(Self::from_value).collect(),
            _ => Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Reads a field as text; numbers and booleans are rendered.
    pub fn text_field(&self, name: &str) -> Option<String> {
        self.field(name).and_then(scalar_to_string)
    }

    pub fn u64_field(&self, name: &str) -> Option<u64> {
        match self.field(name)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn f64_field(&self, name: &str) -> Option<f64> {
        match self.field(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Reads a Proxmox boolean flag (`1`, `"1"`, `true`). Absent means `false`.
    pub fn flag(&self, name: &str) -> bool {
        match self.field(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64().is_some_and(|v| v != 0),
            Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "yes" | "on"),
            _ => false,
        }
    }

    /// Iterates over all scalar entries as `(key, text)` pairs.
    pub fn text_entries(&self) -> impl Iterator<Item = (&str, String)> {
        self.0
            .iter()
            .filter_map(|(key, value)| scalar_to_string(value).map(|text| (key.as_str(), text)))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}
