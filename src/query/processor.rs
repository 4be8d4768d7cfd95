// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Result processor for introspection statements (`DESC`, `SHOW TABLES`).

use serde_json::Value;

use crate::connection::Row;
use crate::types::{self, ColumnType};

/// Normalizes rows returned by the daemon's introspection statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphinxProcessor;

impl SphinxProcessor {
    /// Field names from a `DESC` result, in listing order.
    pub fn process_column_listing(&self, rows: &[Row]) -> Vec<String> {
        rows.iter()
            .filter_map(|row| text(row, "Field"))
            .map(str::to_string)
            .collect()
    }

    /// Portable type of `column` from a `DESC` result, or `None` if the column
    /// is not listed.
    pub fn process_column_type(&self, rows: &[Row], column: &str) -> Option<ColumnType> {
        rows.iter()
            .find(|row| text(row, "Field") == Some(column))
            .and_then(|row| text(row, "Type"))
            .map(types::to_portable_type)
    }

    /// Index names from a `SHOW TABLES` result.
    pub fn process_all_tables(&self, rows: &[Row]) -> Vec<String> {
        rows.iter().filter_map(table_name).map(str::to_string).collect()
    }

    /// True iff a `SHOW TABLES LIKE ?` result names exactly `table`.
    ///
    /// `LIKE` treats `_` as a wildcard, so a non-empty result alone is not enough.
    pub fn process_table_exists(&self, rows: &[Row], table: &str) -> bool {
        rows.iter().filter_map(table_name).any(|name| name == table)
    }
}

fn text<'r>(row: &'r Row, key: &str) -> Option<&'r str> {
    row.get(key).and_then(Value::as_str)
}

// Sphinx reports `Index`, Manticore reports `Table`/`Name` depending on version.
fn table_name(row: &Row) -> Option<&str> {
    ["Index", "Table", "Name"]
        .iter()
        .find_map(|key| text(row, key))
}
