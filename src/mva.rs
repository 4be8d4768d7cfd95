// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Multi-value attribute (MVA) codec.
//!
//! The daemon returns MVA columns as text, e.g. `1,2,3` (or `(1,2,3)` in
//! some client renderings). Callers get an ordered `Vec<i64>`.
//!
//! ```
//! use sphinx_connection::mva;
//! use serde_json::json;
//!
//! assert_eq!(mva::decode(&json!("(1, 2, 3)")).unwrap(), vec![1, 2, 3]);
//! assert_eq!(mva::decode(&json!("")).unwrap(), Vec::<i64>::new());
//! assert_eq!(mva::decode(&json!([3, 1, 3])).unwrap(), vec![3, 1, 3]);
//! ```
//!
//! Tokens that are not integers are rejected with [`SphinxError::Decode`].

use serde_json::Value;

use crate::error::SphinxError;

/// Decode a raw attribute value into its integer sequence.
///
/// Sequences are returned unchanged (order and duplicates preserved).
/// `null` decodes to an empty sequence.
pub fn decode(raw: &Value) -> Result<Vec<i64>, SphinxError> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(integer_from_value).collect(),
        Value::String(s) => decode_str(s),
        Value::Number(_) => Ok(vec![integer_from_value(raw)?]),
        other => Err(SphinxError::decode(other.to_string(), "not a multi-value attribute")),
    }
}

/// Decode the textual MVA form: strip parentheses and whitespace, then split on commas.
pub fn decode_str(raw: &str) -> Result<Vec<i64>, SphinxError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '(' | ')') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Ok(Vec::new());
    }

    cleaned
        .split(',')
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| SphinxError::decode(raw, format!("'{}' is not an integer", token)))
        })
        .collect()
}

/// Render values as the inline tuple literal SphinxQL expects in INSERT/UPDATE: `(1,2,3)`.
#[must_use]
pub fn to_tuple_literal(values: &[i64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("({})", parts.join(","))
}

/// Normalize filter arguments for MVA predicates.
///
/// Flattens nested sequences, drops `null` and empty-string entries, parses the
/// rest as integers, and removes duplicates keeping first occurrence order.
pub fn filter_uint(values: &[Value]) -> Result<Vec<i64>, SphinxError> {
    let mut out: Vec<i64> = Vec::with_capacity(values.len());
    collect_filter_values(values, &mut out)?;
    Ok(out)
}

fn collect_filter_values(values: &[Value], out: &mut Vec<i64>) -> Result<(), SphinxError> {
    for value in values {
        match value {
            Value::Null => continue,
            Value::String(s) if s.trim().is_empty() => continue,
            Value::Array(nested) => collect_filter_values(nested, out)?,
            _ => {
                let id = integer_from_value(value)?;
                if !out.contains(&id) {
                    out.push(id);
                }
            }
        }
    }
    Ok(())
}

fn integer_from_value(value: &Value) -> Result<i64, SphinxError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => Err(SphinxError::decode(n.to_string(), "not a 64-bit integer")),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| SphinxError::decode(s.as_str(), "not an integer")),
        other => Err(SphinxError::decode(other.to_string(), "not an integer")),
    }
}
