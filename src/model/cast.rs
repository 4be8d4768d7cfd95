// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Attribute casts.
//!
//! Each cast is a decoding strategy resolved once from its declared name,
//! so reading an attribute never re-inspects cast strings.

use serde_json::Value;

use crate::error::SphinxError;
use crate::mva;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cast {
    /// Multi-value attribute: `"(1,2,3)"` / `"1,2,3"` / `[1,2,3]` to an integer list
    Mva,
    /// JSON attribute returned as text
    Json,
    Integer,
    Float,
    Boolean,
    String,
}

impl Cast {
    /// Resolve a cast name. Unknown names are rejected so typos surface when
    /// the schema is declared rather than on first read.
    pub fn parse(name: &str) -> Result<Cast, SphinxError> {
        let cast = match name.trim().to_ascii_lowercase().as_str() {
            "mva" => Cast::Mva,
            "json" | "array" | "object" => Cast::Json,
            "int" | "integer" => Cast::Integer,
            "float" | "double" | "real" => Cast::Float,
            "bool" | "boolean" => Cast::Boolean,
            "string" => Cast::String,
            other => return Err(SphinxError::Config(format!("unknown cast '{}'", other))),
        };
        Ok(cast)
    }

    /// Decode a raw attribute. `null` stays `null` for every cast.
    pub fn decode(&self, raw: &Value) -> Result<Value, SphinxError> {
        if raw.is_null() {
            return Ok(Value::Null);
        }
        match self {
            Cast::Mva => Ok(Value::from(mva::decode(raw)?)),
            Cast::Json => match raw {
                Value::String(text) => serde_json::from_str(text)
                    .map_err(|e| SphinxError::decode(text.as_str(), e.to_string())),
                other => Ok(other.clone()),
            },
            Cast::Integer => as_integer(raw).map(Value::from),
            Cast::Float => as_float(raw).map(Value::from),
            Cast::Boolean => Ok(Value::Bool(as_bool(raw))),
            Cast::String => Ok(match raw {
                Value::String(_) => raw.clone(),
                other => Value::String(other.to_string()),
            }),
        }
    }
}

pub(crate) fn as_integer(raw: &Value) -> Result<i64, SphinxError> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| SphinxError::decode(n.to_string(), "out of integer range")),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f.trunc() as i64))
                .map_err(|_| SphinxError::decode(s, "not an integer"))
        }
        other => Err(SphinxError::decode(other.to_string(), "not an integer")),
    }
}

fn as_float(raw: &Value) -> Result<f64, SphinxError> {
    match raw {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| SphinxError::decode(n.to_string(), "not a float")),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| SphinxError::decode(s.as_str(), "not a float")),
        other => Err(SphinxError::decode(other.to_string(), "not a float")),
    }
}

fn as_bool(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !matches!(s.trim(), "" | "0" | "false"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}
