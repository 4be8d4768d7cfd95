// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Schema capability traits.
//!
//! [`SearchIndexSchema`] is the subset a search daemon can actually perform;
//! code written against it cannot reach an unsupported operation.
//! [`RelationalSchema`] is the full relational contract, for hosts that
//! program against it generically. Its extra methods return
//! [`SphinxError::CapabilityUnsupported`] on a search daemon without touching
//! the connection.

use async_trait::async_trait;

use super::blueprint::Blueprint;
use crate::error::SphinxError;
use crate::types::ColumnType;

#[async_trait]
pub trait SearchIndexSchema: Send + Sync {
    async fn has_table(&self, table: &str) -> Result<bool, SphinxError>;

    async fn has_column(&self, table: &str, column: &str) -> Result<bool, SphinxError>;

    /// True iff every name in `columns` is present.
    async fn has_columns(&self, table: &str, columns: &[&str]) -> Result<bool, SphinxError>;

    async fn get_column_listing(&self, table: &str) -> Result<Vec<String>, SphinxError>;

    /// `None` when the column does not exist.
    async fn get_column_type(
        &self,
        table: &str,
        column: &str,
    ) -> Result<Option<ColumnType>, SphinxError>;

    async fn get_all_tables(&self) -> Result<Vec<String>, SphinxError>;

    /// Compile and execute a change-set, statement by statement.
    async fn alter(&self, blueprint: Blueprint) -> Result<(), SphinxError>;
}

#[async_trait]
pub trait RelationalSchema: SearchIndexSchema {
    async fn create(&self, blueprint: Blueprint) -> Result<(), SphinxError>;

    async fn drop(&self, table: &str) -> Result<(), SphinxError>;

    async fn drop_if_exists(&self, table: &str) -> Result<(), SphinxError>;

    async fn drop_all_tables(&self) -> Result<(), SphinxError>;

    async fn drop_all_views(&self) -> Result<(), SphinxError>;

    async fn drop_all_types(&self) -> Result<(), SphinxError>;

    async fn get_all_views(&self) -> Result<Vec<String>, SphinxError>;

    async fn rename(&self, from: &str, to: &str) -> Result<(), SphinxError>;

    async fn enable_foreign_key_constraints(&self) -> Result<(), SphinxError>;

    async fn disable_foreign_key_constraints(&self) -> Result<(), SphinxError>;

    async fn register_custom_doctrine_type(
        &self,
        class: &str,
        name: &str,
        type_name: &str,
    ) -> Result<(), SphinxError>;
}
