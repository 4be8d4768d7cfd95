// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query builder with the full-text extensions.
//!
//! A builder is owned by one caller, accumulates clause fragments, and is
//! consumed by a terminal method (`get`, `count`, `update`, ...).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use sphinx_connection::{MemoryTransport, SphinxConfig, SphinxConnection};
//! use sphinx_connection::query::Direction;
//!
//! let conn = SphinxConnection::with_transport(
//!     SphinxConfig::default(),
//!     Arc::new(MemoryTransport::new()),
//! );
//! let compiled = conn
//!     .table("products")
//!     .match_("title", "running shoes", false)
//!     .where_multi("tags", "=", &[json!(1), json!(null), json!(""), json!(3)])
//!     .unwrap()
//!     .within_group_order_by("price", Direction::Asc)
//!     .group_by("brand_id")
//!     .option("ranker", "sph04")
//!     .to_sql()
//!     .unwrap();
//!
//! assert_eq!(
//!     compiled.sql,
//!     "SELECT * FROM products WHERE MATCH(?) AND tags IN (?, ?) \
//!      GROUP BY brand_id WITHIN GROUP ORDER BY price ASC OPTION ranker = sph04"
//! );
//! ```

use serde_json::Value;
use tracing::debug;

use super::ast::{
    Boolean, Direction, MatchClause, MatchColumn, MultiOperator, OptionValue, OrderClause,
    SelectQuery, WhereClause,
};
use super::facet::FacetBuilder;
use super::grammar::{CompiledStatement, InsertVerb};
use crate::connection::{Row, SphinxConnection, SqlParam};
use crate::error::SphinxError;
use crate::metrics;
use crate::mva;

pub struct QueryBuilder<'c> {
    connection: &'c SphinxConnection,
    query: SelectQuery,
}

impl<'c> QueryBuilder<'c> {
    pub fn new(connection: &'c SphinxConnection) -> Self {
        Self {
            connection,
            query: SelectQuery::default(),
        }
    }

    /// The clause fragments collected so far.
    #[must_use]
    pub fn query(&self) -> &SelectQuery {
        &self.query
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Projection and source
    // ═══════════════════════════════════════════════════════════════════════

    #[must_use]
    pub fn from(mut self, table: &str) -> Self {
        self.query.from = Some(table.to_string());
        self
    }

    #[must_use]
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Predicates
    // ═══════════════════════════════════════════════════════════════════════

    #[must_use]
    pub fn and_where(self, column: &str, operator: &str, value: impl Into<SqlParam>) -> Self {
        self.basic(column, operator, value.into(), Boolean::And)
    }

    #[must_use]
    pub fn or_where(self, column: &str, operator: &str, value: impl Into<SqlParam>) -> Self {
        self.basic(column, operator, value.into(), Boolean::Or)
    }

    fn basic(mut self, column: &str, operator: &str, value: SqlParam, boolean: Boolean) -> Self {
        self.query.wheres.push(WhereClause::Basic {
            column: column.to_string(),
            operator: operator.to_string(),
            value,
            boolean,
        });
        self
    }

    #[must_use]
    pub fn where_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlParam>,
    {
        self.in_list(column, values, false)
    }

    #[must_use]
    pub fn where_not_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlParam>,
    {
        self.in_list(column, values, true)
    }

    fn in_list<I, V>(mut self, column: &str, values: I, negated: bool) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlParam>,
    {
        self.query.wheres.push(WhereClause::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
            negated,
            boolean: Boolean::And,
        });
        self
    }

    #[must_use]
    pub fn where_between(
        mut self,
        column: &str,
        low: impl Into<SqlParam>,
        high: impl Into<SqlParam>,
    ) -> Self {
        self.query.wheres.push(WhereClause::Between {
            column: column.to_string(),
            low: low.into(),
            high: high.into(),
            negated: false,
            boolean: Boolean::And,
        });
        self
    }

    #[must_use]
    pub fn where_null(self, column: &str) -> Self {
        self.null(column, false)
    }

    #[must_use]
    pub fn where_not_null(self, column: &str) -> Self {
        self.null(column, true)
    }

    fn null(mut self, column: &str, negated: bool) -> Self {
        self.query.wheres.push(WhereClause::Null {
            column: column.to_string(),
            negated,
            boolean: Boolean::And,
        });
        self
    }

    /// Filter on a multi-value attribute.
    ///
    /// `values` is normalized first: nested lists are flattened, `null` and
    /// `""` dropped, the rest parsed as integers and de-duplicated. If nothing
    /// survives, a positive operator makes the query match no rows and a
    /// negated one (`!=`, `not in`) adds no predicate.
    pub fn where_multi(
        mut self,
        column: &str,
        operator: &str,
        values: &[Value],
    ) -> Result<Self, SphinxError> {
        let values = mva::filter_uint(values)?;
        self.query.wheres.push(WhereClause::Multi {
            column: column.to_string(),
            operator: MultiOperator::parse(operator),
            values,
            boolean: Boolean::And,
        });
        Ok(self)
    }

    /// Full-text term. `column` is a field name, `"*"` for all fields, or a
    /// list of fields. `half` keeps the user's `|`, `-` and phrase operators.
    #[must_use]
    pub fn match_(mut self, column: impl Into<MatchColumn>, value: &str, half: bool) -> Self {
        self.query.matches.push(MatchClause {
            column: column.into(),
            value: value.to_string(),
            half,
        });
        self
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Grouping, ordering, paging
    // ═══════════════════════════════════════════════════════════════════════

    #[must_use]
    pub fn group_by(mut self, column: &str) -> Self {
        self.query.groups.push(column.to_string());
        self
    }

    /// `GROUP n BY column`: keep up to `n` rows per group.
    #[must_use]
    pub fn group_n_by(mut self, column: &str, n: u32) -> Self {
        self.query.groups.push(column.to_string());
        self.query.group_limit = Some(n);
        self
    }

    /// Order rows inside each group; independent of [`order_by`](Self::order_by).
    #[must_use]
    pub fn within_group_order_by(mut self, column: &str, direction: Direction) -> Self {
        self.query.within_group_orders.push(OrderClause {
            column: column.to_string(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn having(mut self, column: &str, operator: &str, value: impl Into<SqlParam>) -> Self {
        self.query.havings.push(WhereClause::Basic {
            column: column.to_string(),
            operator: operator.to_string(),
            value: value.into(),
            boolean: Boolean::And,
        });
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.query.orders.push(OrderClause {
            column: column.to_string(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.query.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.query.offset = Some(offset);
        self
    }

    /// `page` is 1-based.
    #[must_use]
    pub fn for_page(self, page: u64, per_page: u64) -> Self {
        self.offset(page.saturating_sub(1).saturating_mul(per_page)).limit(per_page)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SphinxQL extensions
    // ═══════════════════════════════════════════════════════════════════════

    /// Per-query tuning, e.g. `option("ranker", "bm25")`. Setting the same
    /// name again overwrites the earlier value.
    #[must_use]
    pub fn option(mut self, name: &str, value: impl Into<OptionValue>) -> Self {
        self.query.set_option(name, value.into());
        self
    }

    /// Attach a `FACET` clause built by `callback`. Facets without columns are skipped.
    #[must_use]
    pub fn facet<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(FacetBuilder) -> FacetBuilder,
    {
        self.query.facets.push(callback(FacetBuilder::new()).build());
        self
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Terminals
    // ═══════════════════════════════════════════════════════════════════════

    pub fn to_sql(&self) -> Result<CompiledStatement, SphinxError> {
        self.connection.query_grammar().compile_select(&self.query)
    }

    /// Run the SELECT. With facets, the daemon's extra result sets follow the
    /// main rows in the returned list.
    pub async fn get(self) -> Result<Vec<Row>, SphinxError> {
        let compiled = self.to_sql()?;
        if compiled.always_empty {
            return Ok(short_circuit(&compiled, Vec::new()));
        }
        self.connection
            .run_select("select", &compiled.sql, &compiled.bindings)
            .await
    }

    pub async fn first(self) -> Result<Option<Row>, SphinxError> {
        Ok(self.limit(1).get().await?.into_iter().next())
    }

    pub async fn find(self, id: i64) -> Result<Option<Row>, SphinxError> {
        self.and_where("id", "=", id).first().await
    }

    pub async fn count(self) -> Result<u64, SphinxError> {
        let compiled = self.connection.query_grammar().compile_count(&self.query)?;
        if compiled.always_empty {
            return Ok(short_circuit(&compiled, 0));
        }
        let rows = self
            .connection
            .run_select("count", &compiled.sql, &compiled.bindings)
            .await?;
        let aggregate = rows.first().and_then(|row| row.get("aggregate"));
        Ok(match aggregate {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(Value::String(s)) => s.parse().map_err(|_| {
                SphinxError::decode(s.as_str(), "COUNT(*) is not an unsigned integer")
            })?,
            _ => 0,
        })
    }

    pub async fn insert(self, row: Row) -> Result<u64, SphinxError> {
        self.write(vec![row], InsertVerb::Insert).await
    }

    pub async fn insert_many(self, rows: Vec<Row>) -> Result<u64, SphinxError> {
        self.write(rows, InsertVerb::Insert).await
    }

    /// Insert or overwrite by `id`.
    pub async fn replace(self, row: Row) -> Result<u64, SphinxError> {
        self.write(vec![row], InsertVerb::Replace).await
    }

    pub async fn replace_many(self, rows: Vec<Row>) -> Result<u64, SphinxError> {
        self.write(rows, InsertVerb::Replace).await
    }

    async fn write(self, rows: Vec<Row>, verb: InsertVerb) -> Result<u64, SphinxError> {
        let rows = rows
            .iter()
            .map(params_of)
            .collect::<Result<Vec<_>, _>>()?;
        let compiled = self
            .connection
            .query_grammar()
            .compile_insert(&self.query, &rows, verb)?;
        let kind = match verb {
            InsertVerb::Insert => "insert",
            InsertVerb::Replace => "replace",
        };
        self.connection
            .run_execute(kind, &compiled.sql, &compiled.bindings)
            .await
    }

    /// Update attributes of matching rows. Sequence values are written as MVA tuples.
    pub async fn update(self, values: Row) -> Result<u64, SphinxError> {
        let values = params_of(&values)?;
        let compiled = self
            .connection
            .query_grammar()
            .compile_update(&self.query, &values)?;
        if compiled.always_empty {
            return Ok(short_circuit(&compiled, 0));
        }
        self.connection
            .run_execute("update", &compiled.sql, &compiled.bindings)
            .await
    }

    pub async fn delete(self) -> Result<u64, SphinxError> {
        let compiled = self.connection.query_grammar().compile_delete(&self.query)?;
        if compiled.always_empty {
            return Ok(short_circuit(&compiled, 0));
        }
        self.connection
            .run_execute("delete", &compiled.sql, &compiled.bindings)
            .await
    }

    /// Empty a real-time index.
    pub async fn truncate(self) -> Result<(), SphinxError> {
        let compiled = self.connection.query_grammar().compile_truncate(&self.query)?;
        self.connection
            .run_execute("truncate", &compiled.sql, &compiled.bindings)
            .await?;
        Ok(())
    }
}

fn short_circuit<T>(compiled: &CompiledStatement, empty: T) -> T {
    debug!(sql = %compiled.sql, "Predicates can never match, skipping round trip");
    metrics::record_short_circuit();
    empty
}

fn params_of(row: &Row) -> Result<Vec<(String, SqlParam)>, SphinxError> {
    row.iter()
        .map(|(column, value)| Ok((column.clone(), SqlParam::from_value(value)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SphinxConfig;
    use crate::connection::MemoryTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn connection() -> (SphinxConnection, Arc<MemoryTransport>) {
        let transport = Arc::new(MemoryTransport::new());
        (
            SphinxConnection::with_transport(SphinxConfig::default(), transport.clone()),
            transport,
        )
    }

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_where_multi_normalizes_values() {
        let (conn, _) = connection();
        let compiled = conn
            .table("products")
            .where_multi("tags", "=", &[json!(1), json!(null), json!(""), json!(3)])
            .unwrap()
            .to_sql()
            .unwrap();

        assert_eq!(compiled.sql, "SELECT * FROM products WHERE tags IN (?, ?)");
        assert_eq!(
            compiled.bindings,
            vec![SqlParam::Integer(1), SqlParam::Integer(3)]
        );
    }

    #[test]
    fn test_where_multi_rejects_non_numeric() {
        let (conn, _) = connection();
        let result = conn.table("products").where_multi("tags", "in", &[json!("red")]);
        assert!(matches!(result, Err(SphinxError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_empty_where_multi_skips_round_trip() {
        let (conn, transport) = connection();
        let rows = conn
            .table("products")
            .where_multi("tags", "in", &[json!(null), json!("")])
            .unwrap()
            .get()
            .await
            .unwrap();

        assert!(rows.is_empty());
        assert!(transport.is_empty());
    }

    #[test]
    fn test_option_overwrites_same_name() {
        let (conn, _) = connection();
        let compiled = conn
            .table("products")
            .option("ranker", "bm25")
            .option("max_matches", 2000)
            .option("ranker", "sph04")
            .to_sql()
            .unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT * FROM products OPTION ranker = sph04, max_matches = 2000"
        );
    }

    #[test]
    fn test_facet_callback() {
        let (conn, _) = connection();
        let compiled = conn
            .table("products")
            .facet(|f| f.column("brand_id").order_by("COUNT(*)", Direction::Desc).limit(5))
            .facet(|f| f)
            .to_sql()
            .unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT * FROM products FACET brand_id ORDER BY COUNT(*) DESC LIMIT 0, 5"
        );
    }

    #[test]
    fn test_for_page() {
        let (conn, _) = connection();
        let compiled = conn.table("products").for_page(3, 15).to_sql().unwrap();
        assert_eq!(compiled.sql, "SELECT * FROM products LIMIT 30, 15");
    }

    #[test]
    fn test_for_page_saturates_on_huge_page() {
        let (conn, _) = connection();
        let compiled = conn.table("products").for_page(u64::MAX, 15).to_sql().unwrap();
        assert_eq!(
            compiled.sql,
            format!("SELECT * FROM products LIMIT {}, 15", u64::MAX)
        );
    }

    #[tokio::test]
    async fn test_find_uses_id_and_limit() {
        let (conn, transport) = connection();
        transport.respond(
            "SELECT * FROM products WHERE id = ? LIMIT 0, 1",
            vec![row(json!({"id": 9, "title": "boots"}))],
        );

        let found = conn.table("products").find(9).await.unwrap();
        assert_eq!(found.and_then(|r| r.get("title").cloned()), Some(json!("boots")));
        assert_eq!(transport.statements()[0].bindings, vec![SqlParam::Integer(9)]);
    }

    #[tokio::test]
    async fn test_count_reads_aggregate() {
        let (conn, transport) = connection();
        transport.respond(
            "SELECT COUNT(*) AS aggregate FROM products WHERE price > ?",
            vec![row(json!({"aggregate": 42}))],
        );
        let n = conn
            .table("products")
            .and_where("price", ">", 10)
            .order_by("price", Direction::Desc)
            .count()
            .await
            .unwrap();
        assert_eq!(n, 42);
    }

    #[tokio::test]
    async fn test_replace_writes_mva_tuple() {
        let (conn, transport) = connection();
        conn.table("products")
            .replace(row(json!({"id": 1, "tags": [3, 4]})))
            .await
            .unwrap();

        let recorded = transport.statements();
        assert_eq!(recorded[0].sql, "REPLACE INTO products (id, tags) VALUES (?, ?)");
        assert_eq!(
            recorded[0].bindings,
            vec![SqlParam::Integer(1), SqlParam::Multi(vec![3, 4])]
        );
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (conn, transport) = connection();
        conn.table("products")
            .and_where("id", "=", 1)
            .update(row(json!({"price": 5})))
            .await
            .unwrap();
        conn.table("products").where_in("id", [1, 2]).delete().await.unwrap();
        conn.table("products").truncate().await.unwrap();

        assert_eq!(
            transport.sql_log(),
            vec![
                "UPDATE products SET price = ? WHERE id = ?",
                "DELETE FROM products WHERE id IN (?, ?)",
                "TRUNCATE RTINDEX products",
            ]
        );
    }
}
