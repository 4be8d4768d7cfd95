// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! MySQL-wire transport for SphinxQL.
//!
//! Sphinx and Manticore speak the MySQL client protocol but implement only a
//! sliver of MySQL. Two consequences shape this module:
//!
//! 1. **No prepared statements.** Statements are interpolated client-side
//!    ([`interpolate`]) and sent with `sqlx::raw_sql`, which uses the text
//!    protocol.
//! 2. **No session setup.** sqlx normally issues `SET sql_mode` and
//!    `SET time_zone` after connecting; the daemon rejects both, so those
//!    options are switched off.
//!
//! Result columns are decoded by trying integer, unsigned, float and text in
//! that order, falling back to lossy UTF-8 for binary strings.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Row as _};
use tracing::info;

use super::traits::{Row, SqlParam, Transport};
use crate::config::SphinxConfig;
use crate::error::SphinxError;
use crate::query::interpolate;
use crate::resilience::retry::{retry, RetryConfig};

pub struct MySqlTransport {
    pool: MySqlPool,
}

impl MySqlTransport {
    /// Open a pool against the daemon, retrying with startup backoff.
    pub async fn connect(config: &SphinxConfig) -> Result<Self, SphinxError> {
        config.validate()?;
        let options = connect_options(config);

        let pool = retry(
            "sphinx_connect",
            &RetryConfig::startup(config.connect_retries),
            || {
                let options = options.clone();
                async move {
                    MySqlPoolOptions::new()
                        .max_connections(config.max_connections)
                        .acquire_timeout(Duration::from_millis(config.connect_timeout_ms))
                        .connect_with(options)
                        .await
                        .map_err(|e| SphinxError::Connection(e.to_string()))
                }
            },
        )
        .await?;

        info!(dsn = %config.dsn(), "Connected to search daemon");
        Ok(Self { pool })
    }

    /// Wrap an existing pool (shared with another component, or pre-configured).
    #[must_use]
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> MySqlPool {
        self.pool.clone()
    }
}

fn connect_options(config: &SphinxConfig) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.username)
        .charset(&config.charset)
        .pipes_as_concat(false)
        .no_engine_substitution(false)
        .timezone(None)
        .statement_cache_capacity(0);

    if let Some(password) = &config.password {
        options = options.password(password);
    }
    if let Some(database) = &config.database {
        options = options.database(database);
    }
    if let Some(collation) = &config.collation {
        options = options.collation(collation);
    }
    options
}

#[async_trait]
impl Transport for MySqlTransport {
    async fn select(&self, sql: &str, bindings: &[SqlParam]) -> Result<Vec<Row>, SphinxError> {
        let sql = interpolate(sql, bindings)?;
        let rows = sqlx::raw_sql(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SphinxError::Execution(e.to_string()))?;
        Ok(rows.iter().map(row_to_map).collect())
    }

    async fn execute(&self, sql: &str, bindings: &[SqlParam]) -> Result<u64, SphinxError> {
        let sql = interpolate(sql, bindings)?;
        let result = sqlx::raw_sql(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| SphinxError::Execution(e.to_string()))?;
        Ok(result.rows_affected())
    }
}

fn row_to_map(row: &MySqlRow) -> Row {
    let mut map = Row::new();
    for (i, column) in row.columns().iter().enumerate() {
        map.insert(column.name().to_string(), column_value(row, i));
    }
    map
}

fn column_value(row: &MySqlRow, i: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(i) {
        return v.map_or(Value::Null, Value::from);
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(i) {
        return v.map_or(Value::Null, Value::from);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(i) {
        return v.map_or(Value::Null, Value::from);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(i) {
        return v.map_or(Value::Null, Value::String);
    }
    // BLOB-flagged text columns
    row.try_get::<Option<Vec<u8>>, _>(i)
        .ok()
        .flatten()
        .map_or(Value::Null, |bytes| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
}
