// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Schema Grammar
//!
//! Compiles change-set commands into SphinxQL DDL. This is the complete set of
//! statements the schema layer ever emits:
//!
//! ```text
//! ALTER TABLE <t> ADD COLUMN <c> <TYPE>
//! ALTER TABLE <t> DROP COLUMN <c>
//! DESC <t>
//! SHOW TABLES
//! SHOW TABLES LIKE ?
//! ```
//!
//! The grammar never validates; the capability gate lives in
//! [`SchemaBuilder`](super::SchemaBuilder) and [`Blueprint`].

use super::blueprint::{Blueprint, Command};
use super::column::ColumnDefinition;

#[derive(Debug, Clone, Default)]
pub struct SchemaGrammar {
    table_prefix: String,
}

impl SchemaGrammar {
    pub fn new(table_prefix: impl Into<String>) -> Self {
        Self {
            table_prefix: table_prefix.into(),
        }
    }

    #[must_use]
    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    /// Compile one command; `None` when the grammar has no compiler for it.
    #[must_use]
    pub fn compile(&self, blueprint: &Blueprint, command: &Command) -> Option<String> {
        match command {
            Command::Add(column) => Some(self.compile_add(blueprint, column)),
            Command::DropColumn(column) => Some(self.compile_drop_column(blueprint, column)),
            Command::Raw { .. } => None,
        }
    }

    #[must_use]
    pub fn compile_add(&self, blueprint: &Blueprint, column: &ColumnDefinition) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            self.wrap_table(blueprint.table()),
            column.name(),
            column.sphinx_type()
        )
    }

    #[must_use]
    pub fn compile_drop_column(&self, blueprint: &Blueprint, column: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.wrap_table(blueprint.table()),
            column
        )
    }

    /// `table` is expected to already carry the prefix.
    #[must_use]
    pub fn compile_column_listing(&self, table: &str) -> String {
        format!("DESC {}", table)
    }

    #[must_use]
    pub fn compile_get_all_tables(&self) -> String {
        "SHOW TABLES".to_string()
    }

    /// Existence probe; bind the prefixed table name.
    #[must_use]
    pub fn compile_table_exists(&self) -> String {
        "SHOW TABLES LIKE ?".to_string()
    }

    /// Apply the configured table prefix. Identifiers are emitted bare:
    /// SphinxQL does not accept backtick-quoted index names everywhere.
    #[must_use]
    pub fn wrap_table(&self, table: &str) -> String {
        format!("{}{}", self.table_prefix, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::column::ColumnKind;
    use crate::types::SphinxType;

    #[test]
    fn test_compile_add_for_every_wire_type() {
        let grammar = SchemaGrammar::default();
        let blueprint = Blueprint::new("rt");
        let kinds = [
            (ColumnKind::String, "STRING"),
            (ColumnKind::Integer, "INTEGER"),
            (ColumnKind::BigInteger, "BIGINT"),
            (ColumnKind::Float, "FLOAT"),
            (ColumnKind::Boolean, "BOOL"),
            (ColumnKind::Set, "MULTI"),
            (ColumnKind::Set64, "MULTI64"),
            (ColumnKind::Json, "JSON"),
            (ColumnKind::Timestamp, "TIMESTAMP"),
        ];
        for (kind, keyword) in kinds {
            let column = ColumnDefinition::new("c", kind);
            assert_eq!(
                grammar.compile_add(&blueprint, &column),
                format!("ALTER TABLE rt ADD COLUMN c {}", keyword)
            );
        }
        assert_eq!(kinds.len(), SphinxType::ALL.len());
    }

    #[test]
    fn test_compile_drop_column() {
        let grammar = SchemaGrammar::default();
        let blueprint = Blueprint::new("rt");
        assert_eq!(
            grammar.compile_drop_column(&blueprint, "gid"),
            "ALTER TABLE rt DROP COLUMN gid"
        );
    }

    #[test]
    fn test_prefix_applies_to_alter() {
        let grammar = SchemaGrammar::new("app_");
        let blueprint = Blueprint::new("rt");
        let column = ColumnDefinition::new("name", ColumnKind::Text);
        assert_eq!(
            grammar.compile_add(&blueprint, &column),
            "ALTER TABLE app_rt ADD COLUMN name STRING"
        );
    }

    #[test]
    fn test_introspection_statements() {
        let grammar = SchemaGrammar::default();
        assert_eq!(grammar.compile_column_listing("rt"), "DESC rt");
        assert_eq!(grammar.compile_get_all_tables(), "SHOW TABLES");
        assert_eq!(grammar.compile_table_exists(), "SHOW TABLES LIKE ?");
    }

    #[test]
    fn test_raw_command_has_no_compiler() {
        let grammar = SchemaGrammar::default();
        let blueprint = Blueprint::new("rt");
        let command = Command::Raw { name: "optimize".into(), columns: vec![] };
        assert!(grammar.compile(&blueprint, &command).is_none());
    }
}
