// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Connection facade.
//!
//! Owns the configuration, the lazily-dialed transport and the grammar pair,
//! and hands out builders bound to them. Every statement, whether raw or
//! compiled by a builder, goes through [`SphinxConnection::run_select`] or
//! [`SphinxConnection::run_execute`] so logging and metrics live in one place.

use std::sync::{Arc, OnceLock};

use tokio::sync::OnceCell;
use tracing::debug;

use super::mysql::MySqlTransport;
use super::traits::{Row, SqlParam, Transport};
use crate::config::SphinxConfig;
use crate::error::{SphinxError, Unsupported};
use crate::metrics::{self, LatencyTimer};
use crate::query::{QueryBuilder, QueryGrammar, SphinxProcessor};
use crate::schema::{SchemaBuilder, SchemaGrammar};

pub struct SphinxConnection {
    config: SphinxConfig,
    transport: OnceCell<Arc<dyn Transport>>,
    query_grammar: QueryGrammar,
    processor: SphinxProcessor,
    schema_grammar: OnceLock<SchemaGrammar>,
}

impl SphinxConnection {
    /// Prepare a connection. The transport is dialed on the first statement
    /// and reused for the connection's lifetime.
    pub fn connect(config: SphinxConfig) -> Result<Self, SphinxError> {
        config.validate()?;
        Ok(Self::build(config, OnceCell::new()))
    }

    /// Use an already-established transport.
    pub fn with_transport(config: SphinxConfig, transport: Arc<dyn Transport>) -> Self {
        Self::build(config, OnceCell::new_with(Some(transport)))
    }

    fn build(config: SphinxConfig, transport: OnceCell<Arc<dyn Transport>>) -> Self {
        Self {
            query_grammar: QueryGrammar::new(config.prefix.clone()),
            processor: SphinxProcessor,
            schema_grammar: OnceLock::new(),
            transport,
            config,
        }
    }

    async fn transport(&self) -> Result<&Arc<dyn Transport>, SphinxError> {
        self.transport
            .get_or_try_init(|| async {
                let transport = MySqlTransport::connect(&self.config).await?;
                Ok::<Arc<dyn Transport>, SphinxError>(Arc::new(transport))
            })
            .await
    }

    #[must_use]
    pub fn config(&self) -> &SphinxConfig {
        &self.config
    }

    #[must_use]
    pub fn table_prefix(&self) -> &str {
        &self.config.prefix
    }

    #[must_use]
    pub fn query_grammar(&self) -> &QueryGrammar {
        &self.query_grammar
    }

    #[must_use]
    pub fn processor(&self) -> &SphinxProcessor {
        &self.processor
    }

    /// A fresh query builder bound to this connection.
    #[must_use]
    pub fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }

    /// A query builder targeting `table` (prefix applied at compile time).
    #[must_use]
    pub fn table(&self, table: &str) -> QueryBuilder<'_> {
        self.query().from(table)
    }

    /// Schema builder. The schema grammar is built on first use and cached.
    #[must_use]
    pub fn schema(&self) -> SchemaBuilder<'_> {
        let grammar = self
            .schema_grammar
            .get_or_init(|| SchemaGrammar::new(self.config.prefix.clone()));
        SchemaBuilder::new(self, grammar)
    }

    /// Run a raw statement that returns rows.
    pub async fn select(&self, sql: &str, bindings: &[SqlParam]) -> Result<Vec<Row>, SphinxError> {
        self.run_select("select", sql, bindings).await
    }

    /// Run a raw statement, reporting success.
    pub async fn statement(&self, sql: &str, bindings: &[SqlParam]) -> Result<bool, SphinxError> {
        self.run_execute("statement", sql, bindings).await?;
        Ok(true)
    }

    /// Run a raw statement, returning the affected row count.
    pub async fn affecting_statement(
        &self,
        sql: &str,
        bindings: &[SqlParam],
    ) -> Result<u64, SphinxError> {
        self.run_execute("affecting", sql, bindings).await
    }

    /// Run a `REPLACE` statement. The daemon's `REPLACE` already upserts, so
    /// this is a plain statement.
    pub async fn replace(&self, sql: &str, bindings: &[SqlParam]) -> Result<bool, SphinxError> {
        self.statement(sql, bindings).await
    }

    pub fn begin_transaction(&self) -> Result<(), SphinxError> {
        Err(Unsupported::Transactions.into())
    }

    pub fn commit(&self) -> Result<(), SphinxError> {
        Err(Unsupported::Transactions.into())
    }

    pub fn rollback(&self) -> Result<(), SphinxError> {
        Err(Unsupported::Transactions.into())
    }

    pub(crate) async fn run_select(
        &self,
        kind: &'static str,
        sql: &str,
        bindings: &[SqlParam],
    ) -> Result<Vec<Row>, SphinxError> {
        debug!(kind, sql, bindings = bindings.len(), "Running statement");
        let transport = self.transport().await?;
        let _timer = LatencyTimer::new(kind);
        let result = transport.select(sql, bindings).await;
        metrics::record_statement(kind, status(&result));
        result
    }

    pub(crate) async fn run_execute(
        &self,
        kind: &'static str,
        sql: &str,
        bindings: &[SqlParam],
    ) -> Result<u64, SphinxError> {
        debug!(kind, sql, bindings = bindings.len(), "Running statement");
        let transport = self.transport().await?;
        let _timer = LatencyTimer::new(kind);
        let result = transport.execute(sql, bindings).await;
        metrics::record_statement(kind, status(&result));
        result
    }
}

fn status<T>(result: &Result<T, SphinxError>) -> &'static str {
    if result.is_ok() {
        "success"
    } else {
        "error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::MemoryTransport;

    fn connection() -> (SphinxConnection, Arc<MemoryTransport>) {
        let transport = Arc::new(MemoryTransport::new());
        let config = SphinxConfig {
            prefix: "rt_".into(),
            ..Default::default()
        };
        (
            SphinxConnection::with_transport(config, transport.clone()),
            transport,
        )
    }

    #[test]
    fn test_connect_validates_config() {
        let config = SphinxConfig {
            port: 0,
            ..Default::default()
        };
        assert!(matches!(
            SphinxConnection::connect(config),
            Err(SphinxError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_replace_is_plain_statement() {
        let (conn, transport) = connection();
        let ok = conn
            .replace("REPLACE INTO rt_products (id) VALUES (?)", &[SqlParam::Integer(1)])
            .await
            .unwrap();
        assert!(ok);
        assert_eq!(transport.sql_log(), vec!["REPLACE INTO rt_products (id) VALUES (?)"]);
    }

    #[tokio::test]
    async fn test_affecting_statement_returns_count() {
        let (conn, transport) = connection();
        transport.affect("DELETE FROM rt_products WHERE id > ?", 4);
        let n = conn
            .affecting_statement("DELETE FROM rt_products WHERE id > ?", &[SqlParam::Integer(0)])
            .await
            .unwrap();
        assert_eq!(n, 4);
    }

    #[tokio::test]
    async fn test_execution_errors_pass_through() {
        let (conn, transport) = connection();
        transport.fail_on("SELECT", "unknown column");
        let err = conn.select("SELECT nope FROM rt_products", &[]).await.unwrap_err();
        assert!(matches!(err, SphinxError::Execution(ref m) if m == "unknown column"));
    }

    #[test]
    fn test_transactions_are_unsupported() {
        let (conn, transport) = connection();
        assert!(conn.begin_transaction().unwrap_err().is_capability());
        assert!(conn.commit().unwrap_err().is_capability());
        assert!(conn.rollback().unwrap_err().is_capability());
        assert!(transport.is_empty());
    }

    #[test]
    fn test_schema_grammar_is_cached() {
        let (conn, _) = connection();
        let first = conn.schema().grammar() as *const SchemaGrammar;
        let second = conn.schema().grammar() as *const SchemaGrammar;
        assert_eq!(first, second);
        assert_eq!(conn.schema().grammar().table_prefix(), "rt_");
    }
}
