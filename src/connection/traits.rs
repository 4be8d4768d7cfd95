// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Transport seam between the statement compilers and the daemon.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SphinxError;
use crate::mva;

/// Result row: field name to value, as returned by the daemon.
pub type Row = serde_json::Map<String, Value>;

/// Bound statement parameter.
///
/// SphinxQL has no server-side prepared statements, so parameters are rendered
/// into the statement text by the transport (see [`crate::query::interpolate`]).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    /// Multi-value attribute, rendered as an inline tuple `(1,2,3)`.
    Multi(Vec<i64>),
}

impl SqlParam {
    /// Convert a caller-supplied value. Sequences must hold integers (MVA);
    /// objects are bound as their JSON text.
    pub fn from_value(value: &Value) -> Result<SqlParam, SphinxError> {
        let param = match value {
            Value::Null => SqlParam::Null,
            Value::Bool(b) => SqlParam::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlParam::Integer(i),
                None => match n.as_f64() {
                    Some(f) => SqlParam::Float(f),
                    None => SqlParam::Text(n.to_string()),
                },
            },
            Value::String(s) => SqlParam::Text(s.clone()),
            Value::Array(_) => SqlParam::Multi(mva::decode(value)?),
            Value::Object(_) => SqlParam::Text(value.to_string()),
        };
        Ok(param)
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Integer(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Integer(i64::from(v))
    }
}

impl From<u32> for SqlParam {
    fn from(v: u32) -> Self {
        SqlParam::Integer(i64::from(v))
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        SqlParam::Float(v)
    }
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        SqlParam::Boolean(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<Vec<i64>> for SqlParam {
    fn from(v: Vec<i64>) -> Self {
        SqlParam::Multi(v)
    }
}

/// An opaque SQL-executing connection to the search daemon.
///
/// Implementations perform exactly one round trip per call and surface daemon
/// rejections as [`SphinxError::Execution`]. Retries and timeouts, if any, are
/// the implementation's business.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run a statement that returns rows.
    async fn select(&self, sql: &str, bindings: &[SqlParam]) -> Result<Vec<Row>, SphinxError>;

    /// Run a statement for its side effect; returns affected rows.
    async fn execute(&self, sql: &str, bindings: &[SqlParam]) -> Result<u64, SphinxError>;
}
