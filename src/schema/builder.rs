// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Schema builder: the capability gate between callers and the daemon.

use async_trait::async_trait;
use tracing::info;

use super::blueprint::Blueprint;
use super::capability::{RelationalSchema, SearchIndexSchema};
use super::grammar::SchemaGrammar;
use crate::connection::{SphinxConnection, SqlParam};
use crate::error::{SphinxError, Unsupported};
use crate::types::ColumnType;

/// Schema operations for one connection. Obtain through
/// [`SphinxConnection::schema`].
pub struct SchemaBuilder<'c> {
    connection: &'c SphinxConnection,
    grammar: &'c SchemaGrammar,
}

impl<'c> SchemaBuilder<'c> {
    pub(crate) fn new(connection: &'c SphinxConnection, grammar: &'c SchemaGrammar) -> Self {
        Self {
            connection,
            grammar,
        }
    }

    #[must_use]
    pub fn grammar(&self) -> &'c SchemaGrammar {
        self.grammar
    }

    /// Alter an existing index.
    ///
    /// The mutator runs to completion before anything is sent, so a rejected
    /// column or index type leaves the daemon untouched. Statements then run
    /// in declaration order without rollback: if one fails, those before it
    /// stay applied.
    pub async fn table<F>(&self, table: &str, mutator: F) -> Result<(), SphinxError>
    where
        F: FnOnce(&mut Blueprint) -> Result<(), SphinxError>,
    {
        let blueprint = Blueprint::with(table, mutator)?;
        self.alter(blueprint).await
    }

    async fn describe(&self, table: &str) -> Result<Vec<crate::connection::Row>, SphinxError> {
        let sql = self
            .grammar
            .compile_column_listing(&self.grammar.wrap_table(table));
        self.connection.run_select("desc", &sql, &[]).await
    }
}

#[async_trait]
impl SearchIndexSchema for SchemaBuilder<'_> {
    async fn has_table(&self, table: &str) -> Result<bool, SphinxError> {
        let table = self.grammar.wrap_table(table);
        let rows = self
            .connection
            .run_select(
                "show",
                &self.grammar.compile_table_exists(),
                &[SqlParam::Text(table.clone())],
            )
            .await?;
        Ok(self.connection.processor().process_table_exists(&rows, &table))
    }

    async fn has_column(&self, table: &str, column: &str) -> Result<bool, SphinxError> {
        let listing = self.get_column_listing(table).await?;
        Ok(listing.iter().any(|c| c.eq_ignore_ascii_case(column)))
    }

    async fn has_columns(&self, table: &str, columns: &[&str]) -> Result<bool, SphinxError> {
        let listing = self.get_column_listing(table).await?;
        Ok(columns
            .iter()
            .all(|wanted| listing.iter().any(|c| c.eq_ignore_ascii_case(wanted))))
    }

    async fn get_column_listing(&self, table: &str) -> Result<Vec<String>, SphinxError> {
        let rows = self.describe(table).await?;
        Ok(self.connection.processor().process_column_listing(&rows))
    }

    async fn get_column_type(
        &self,
        table: &str,
        column: &str,
    ) -> Result<Option<ColumnType>, SphinxError> {
        let rows = self.describe(table).await?;
        Ok(self.connection.processor().process_column_type(&rows, column))
    }

    async fn get_all_tables(&self) -> Result<Vec<String>, SphinxError> {
        let rows = self
            .connection
            .run_select("show", &self.grammar.compile_get_all_tables(), &[])
            .await?;
        Ok(self.connection.processor().process_all_tables(&rows))
    }

    async fn alter(&self, blueprint: Blueprint) -> Result<(), SphinxError> {
        let statements = blueprint.to_sql(self.grammar)?;
        for sql in &statements {
            self.connection.run_execute("alter", sql, &[]).await?;
        }
        info!(
            table = blueprint.table(),
            statements = statements.len(),
            "Applied schema change"
        );
        Ok(())
    }
}

#[async_trait]
impl RelationalSchema for SchemaBuilder<'_> {
    async fn create(&self, _blueprint: Blueprint) -> Result<(), SphinxError> {
        Err(Unsupported::CreateTable.into())
    }

    async fn drop(&self, _table: &str) -> Result<(), SphinxError> {
        Err(Unsupported::DropTable.into())
    }

    async fn drop_if_exists(&self, _table: &str) -> Result<(), SphinxError> {
        Err(Unsupported::DropTable.into())
    }

    async fn drop_all_tables(&self) -> Result<(), SphinxError> {
        Err(Unsupported::DropAllTables.into())
    }

    async fn drop_all_views(&self) -> Result<(), SphinxError> {
        Err(Unsupported::DropAllViews.into())
    }

    async fn drop_all_types(&self) -> Result<(), SphinxError> {
        Err(Unsupported::DropAllTypes.into())
    }

    async fn get_all_views(&self) -> Result<Vec<String>, SphinxError> {
        Err(Unsupported::Views.into())
    }

    async fn rename(&self, _from: &str, _to: &str) -> Result<(), SphinxError> {
        Err(Unsupported::RenameTable.into())
    }

    async fn enable_foreign_key_constraints(&self) -> Result<(), SphinxError> {
        Err(Unsupported::ForeignKeyConstraints.into())
    }

    async fn disable_foreign_key_constraints(&self) -> Result<(), SphinxError> {
        Err(Unsupported::ForeignKeyConstraints.into())
    }

    async fn register_custom_doctrine_type(
        &self,
        _class: &str,
        _name: &str,
        _type_name: &str,
    ) -> Result<(), SphinxError> {
        Err(Unsupported::DoctrineTypes.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SphinxConfig;
    use crate::connection::{MemoryTransport, Row};
    use crate::types::PortableType;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn connection(prefix: &str) -> (SphinxConnection, Arc<MemoryTransport>) {
        let transport = Arc::new(MemoryTransport::new());
        let config = SphinxConfig {
            prefix: prefix.into(),
            ..Default::default()
        };
        (
            SphinxConnection::with_transport(config, transport.clone()),
            transport,
        )
    }

    fn rows(value: Value) -> Vec<Row> {
        value
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|r| r.as_object().cloned())
            .collect()
    }

    #[tokio::test]
    async fn test_table_runs_statements_in_order() {
        let (conn, transport) = connection("rt_");
        conn.schema()
            .table("products", |t| {
                t.string("name");
                t.set("tags", true);
                t.drop_column(&["legacy"]);
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(
            transport.sql_log(),
            vec![
                "ALTER TABLE rt_products ADD COLUMN name STRING",
                "ALTER TABLE rt_products ADD COLUMN tags MULTI",
                "ALTER TABLE rt_products DROP COLUMN legacy",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_statement_keeps_earlier_ones() {
        let (conn, transport) = connection("");
        transport.fail_on("ALTER TABLE products ADD COLUMN b", "duplicate attribute");

        let err = conn
            .schema()
            .table("products", |t| {
                t.integer("a");
                t.integer("b");
                t.integer("c");
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SphinxError::Execution(_)));
        // third statement never sent
        assert_eq!(transport.len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_mutator_sends_nothing() {
        let (conn, transport) = connection("");
        let err = conn
            .schema()
            .table("products", |t| {
                t.string("name");
                t.unique(&["name"])?;
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(err.is_capability());
        assert!(transport.is_empty());
    }

    #[tokio::test]
    async fn test_has_table_binds_prefixed_name() {
        let (conn, transport) = connection("rt_");
        transport.respond(
            "SHOW TABLES LIKE ?",
            rows(json!([{"Index": "rt_products", "Type": "rt"}])),
        );

        assert!(conn.schema().has_table("products").await.unwrap());
        assert!(!conn.schema().has_table("product").await.unwrap());
        assert_eq!(
            transport.statements()[0].bindings,
            vec![SqlParam::Text("rt_products".into())]
        );
    }

    #[tokio::test]
    async fn test_column_introspection() {
        let (conn, transport) = connection("rt_");
        transport.respond(
            "DESC rt_products",
            rows(json!([
                {"Field": "id", "Type": "bigint"},
                {"Field": "tags", "Type": "mva"},
            ])),
        );
        let schema = conn.schema();

        assert_eq!(schema.get_column_listing("products").await.unwrap(), vec!["id", "tags"]);
        assert!(schema.has_column("products", "TAGS").await.unwrap());
        assert!(schema.has_columns("products", &["id", "tags"]).await.unwrap());
        assert!(!schema.has_columns("products", &["id", "price"]).await.unwrap());
        assert_eq!(
            schema
                .get_column_type("products", "tags")
                .await
                .unwrap()
                .and_then(|t| t.as_portable()),
            Some(PortableType::Set)
        );
        assert_eq!(schema.get_column_type("products", "price").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_all_tables() {
        let (conn, transport) = connection("");
        transport.respond(
            "SHOW TABLES",
            rows(json!([{"Index": "a", "Type": "rt"}, {"Index": "b", "Type": "plain"}])),
        );
        assert_eq!(conn.schema().get_all_tables().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_relational_operations_never_reach_transport() {
        let (conn, transport) = connection("");
        let schema = conn.schema();

        assert!(schema.create(Blueprint::new("t")).await.unwrap_err().is_capability());
        assert!(RelationalSchema::drop(&schema, "t").await.unwrap_err().is_capability());
        assert!(schema.drop_if_exists("t").await.unwrap_err().is_capability());
        assert!(schema.drop_all_tables().await.unwrap_err().is_capability());
        assert!(schema.get_all_views().await.unwrap_err().is_capability());
        assert!(schema.rename("a", "b").await.unwrap_err().is_capability());
        assert!(schema
            .disable_foreign_key_constraints()
            .await
            .unwrap_err()
            .is_capability());
        assert!(transport.is_empty());
    }
}
