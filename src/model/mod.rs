// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Entity schema for rows stored in a search index.
//!
//! Documents in a real-time index carry a caller-assigned `id`, no
//! timestamps and no auto-increment. An [`EntitySchema`] records that along
//! with the per-attribute casts used to decode rows.
//!
//! ```
//! use serde_json::json;
//! use sphinx_connection::model::EntitySchema;
//!
//! let products = EntitySchema::new("products")
//!     .cast("tags", "mva").unwrap()
//!     .cast("meta", "json").unwrap();
//!
//! let row = json!({"id": "7", "tags": "(3,5)", "meta": "{\"a\":1}"});
//! let row = products.decode_row(row.as_object().unwrap()).unwrap();
//! assert_eq!(row["tags"], json!([3, 5]));
//! assert_eq!(row["meta"], json!({"a": 1}));
//! ```

pub mod cast;

use std::collections::HashMap;

use serde_json::Value;

pub use cast::Cast;

use crate::connection::{Row, SphinxConnection};
use crate::error::SphinxError;
use crate::mva;
use crate::query::QueryBuilder;

#[derive(Debug, Clone)]
pub struct EntitySchema {
    table: String,
    key_name: String,
    casts: HashMap<String, Cast>,
    per_page: u64,
}

impl EntitySchema {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key_name: "id".to_string(),
            casts: HashMap::new(),
            per_page: 15,
        }
    }

    /// Declare how `attribute` decodes; see [`Cast::parse`] for names.
    pub fn cast(mut self, attribute: &str, cast: &str) -> Result<Self, SphinxError> {
        self.casts.insert(attribute.to_string(), Cast::parse(cast)?);
        Ok(self)
    }

    #[must_use]
    pub fn key_name(mut self, key: impl Into<String>) -> Self {
        self.key_name = key.into();
        self
    }

    #[must_use]
    pub fn per_page(mut self, per_page: u64) -> Self {
        self.per_page = per_page;
        self
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn get_key_name(&self) -> &str {
        &self.key_name
    }

    #[must_use]
    pub fn get_per_page(&self) -> u64 {
        self.per_page
    }

    /// Always false: indexes have no `created_at`/`updated_at` bookkeeping.
    #[must_use]
    pub const fn uses_timestamps(&self) -> bool {
        false
    }

    /// Always false: document ids are assigned by the caller.
    #[must_use]
    pub const fn is_incrementing(&self) -> bool {
        false
    }

    #[must_use]
    pub fn cast_for(&self, attribute: &str) -> Option<Cast> {
        self.casts.get(attribute).copied()
    }

    /// Apply declared casts; attributes without a cast pass through.
    pub fn decode_row(&self, row: &Row) -> Result<Row, SphinxError> {
        row.iter()
            .map(|(name, value)| {
                let value = match self.casts.get(name) {
                    Some(cast) => cast.decode(value)?,
                    None => value.clone(),
                };
                Ok((name.clone(), value))
            })
            .collect()
    }

    /// Read `name` as an MVA list. Missing, null and empty values read as `[]`.
    pub fn mva_attribute(&self, row: &Row, name: &str) -> Result<Vec<i64>, SphinxError> {
        match row.get(name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(s)) if s.is_empty() => Ok(Vec::new()),
            Some(value) => mva::decode(value),
        }
    }

    /// Primary key for UPDATE/DELETE by key: document ids are integers.
    pub fn key_for_save_query(&self, row: &Row) -> Result<i64, SphinxError> {
        let key = row
            .get(&self.key_name)
            .ok_or_else(|| SphinxError::decode("", format!("row has no '{}' key", self.key_name)))?;
        cast::as_integer(key)
    }

    /// Query builder targeting this entity's index.
    #[must_use]
    pub fn query<'c>(&self, connection: &'c SphinxConnection) -> QueryBuilder<'c> {
        connection.table(&self.table)
    }

    pub async fn find(
        &self,
        connection: &SphinxConnection,
        id: i64,
    ) -> Result<Option<Row>, SphinxError> {
        let row = self
            .query(connection)
            .and_where(&self.key_name, "=", id)
            .first()
            .await?;
        row.map(|r| self.decode_row(&r)).transpose()
    }

    /// One page of decoded rows; `page` is 1-based.
    pub async fn paginate(
        &self,
        connection: &SphinxConnection,
        page: u64,
    ) -> Result<Vec<Row>, SphinxError> {
        let rows = self
            .query(connection)
            .for_page(page, self.per_page)
            .get()
            .await?;
        rows.iter().map(|r| self.decode_row(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SphinxConfig;
    use crate::connection::MemoryTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_defaults() {
        let schema = EntitySchema::new("products");
        assert_eq!(schema.get_key_name(), "id");
        assert_eq!(schema.get_per_page(), 15);
        assert!(!schema.uses_timestamps());
        assert!(!schema.is_incrementing());
    }

    #[test]
    fn test_unknown_cast_rejected_at_definition() {
        assert!(EntitySchema::new("products").cast("tags", "mva32").is_err());
    }

    #[test]
    fn test_mva_attribute_empty_cases() {
        let schema = EntitySchema::new("products");
        let r = row(json!({"a": "", "b": null, "c": "0", "d": "(4, 5)"}));
        assert_eq!(schema.mva_attribute(&r, "a").unwrap(), Vec::<i64>::new());
        assert_eq!(schema.mva_attribute(&r, "b").unwrap(), Vec::<i64>::new());
        assert_eq!(schema.mva_attribute(&r, "missing").unwrap(), Vec::<i64>::new());
        assert_eq!(schema.mva_attribute(&r, "c").unwrap(), vec![0]);
        assert_eq!(schema.mva_attribute(&r, "d").unwrap(), vec![4, 5]);
    }

    #[test]
    fn test_key_for_save_query_coerces() {
        let schema = EntitySchema::new("products");
        assert_eq!(schema.key_for_save_query(&row(json!({"id": "12"}))).unwrap(), 12);
        assert_eq!(schema.key_for_save_query(&row(json!({"id": 12}))).unwrap(), 12);
        assert!(schema.key_for_save_query(&row(json!({}))).is_err());
    }

    #[tokio::test]
    async fn test_find_decodes_row() {
        let transport = Arc::new(MemoryTransport::new());
        let conn = SphinxConnection::with_transport(SphinxConfig::default(), transport.clone());
        transport.respond(
            "SELECT * FROM products WHERE id = ? LIMIT 0, 1",
            vec![row(json!({"id": 3, "tags": "1,2"}))],
        );

        let schema = EntitySchema::new("products").cast("tags", "mva").unwrap();
        let found = schema.find(&conn, 3).await.unwrap().unwrap();
        assert_eq!(found["tags"], json!([1, 2]));
    }

    #[tokio::test]
    async fn test_paginate_uses_per_page() {
        let transport = Arc::new(MemoryTransport::new());
        let conn = SphinxConnection::with_transport(SphinxConfig::default(), transport.clone());
        let schema = EntitySchema::new("products").per_page(10);

        schema.paginate(&conn, 2).await.unwrap();
        assert_eq!(transport.sql_log(), vec!["SELECT * FROM products LIMIT 10, 10"]);
    }
}
