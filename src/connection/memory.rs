// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Recording in-memory transport.
//!
//! Records every statement it receives and answers from canned responses.
//! Used to prove that rejected operations never reach the daemon, and to
//! drive the builders end-to-end without a running server.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use super::traits::{Row, SqlParam, Transport};
use crate::error::SphinxError;

/// Which trait method received a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Execute,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStatement {
    pub sql: String,
    pub bindings: Vec<SqlParam>,
    pub kind: StatementKind,
}

pub struct MemoryTransport {
    responses: DashMap<String, Vec<Row>>,
    affected: DashMap<String, u64>,
    failures: Mutex<Vec<(String, String)>>,
    log: Mutex<Vec<RecordedStatement>>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: DashMap::new(),
            affected: DashMap::new(),
            failures: Mutex::new(Vec::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Answer `select(sql, ..)` with `rows`. Matched on the exact statement text.
    pub fn respond(&self, sql: impl Into<String>, rows: Vec<Row>) {
        self.responses.insert(sql.into(), rows);
    }

    /// Affected-row count for `execute(sql, ..)`; defaults to 1.
    pub fn affect(&self, sql: impl Into<String>, rows: u64) {
        self.affected.insert(sql.into(), rows);
    }

    /// Reject every statement starting with `prefix` as the daemon would.
    pub fn fail_on(&self, prefix: impl Into<String>, message: impl Into<String>) {
        self.failures.lock().push((prefix.into(), message.into()));
    }

    /// Snapshot of everything received, in arrival order.
    #[must_use]
    pub fn statements(&self) -> Vec<RecordedStatement> {
        self.log.lock().clone()
    }

    #[must_use]
    pub fn sql_log(&self) -> Vec<String> {
        self.log.lock().iter().map(|s| s.sql.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.log.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.lock().is_empty()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }

    fn record(&self, sql: &str, bindings: &[SqlParam], kind: StatementKind) -> Result<(), SphinxError> {
        self.log.lock().push(RecordedStatement {
            sql: sql.to_string(),
            bindings: bindings.to_vec(),
            kind,
        });
        let failures = self.failures.lock();
        match failures.iter().find(|(prefix, _)| sql.starts_with(prefix.as_str())) {
            Some((_, message)) => Err(SphinxError::Execution(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn select(&self, sql: &str, bindings: &[SqlParam]) -> Result<Vec<Row>, SphinxError> {
        self.record(sql, bindings, StatementKind::Select)?;
        Ok(self
            .responses
            .get(sql)
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }

    async fn execute(&self, sql: &str, bindings: &[SqlParam]) -> Result<u64, SphinxError> {
        self.record(sql, bindings, StatementKind::Execute)?;
        Ok(self.affected.get(sql).map(|r| *r.value()).unwrap_or(1))
    }
}
