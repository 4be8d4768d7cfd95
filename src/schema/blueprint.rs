// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Change-set ("blueprint") describing schema mutations for one table.
//!
//! A blueprint is built through a mutator callback, compiled once by the
//! [`SchemaGrammar`], then discarded:
//!
//! ```
//! use sphinx_connection::schema::{Blueprint, SchemaGrammar};
//!
//! let blueprint = Blueprint::with("rt", |table| {
//!     table.string("name");
//!     table.set("tags", true);
//!     Ok(())
//! }).unwrap();
//!
//! let statements = blueprint.to_sql(&SchemaGrammar::default()).unwrap();
//! assert_eq!(statements, vec![
//!     "ALTER TABLE rt ADD COLUMN name STRING",
//!     "ALTER TABLE rt ADD COLUMN tags MULTI",
//! ]);
//! ```
//!
//! Relational features without a SphinxQL equivalent (indexes, foreign keys,
//! renames, auto-increment, ...) fail with
//! [`SphinxError::CapabilityUnsupported`] before anything is appended.

use tracing::debug;

use super::column::{ColumnDefinition, ColumnKind};
use super::grammar::SchemaGrammar;
use crate::error::{SphinxError, Unsupported};

/// Default column name used by soft-delete helpers.
pub const SOFT_DELETE_COLUMN: &str = "__soft_deleted";

/// One schema mutation. Each command compiles to at most one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `ALTER TABLE t ADD COLUMN c TYPE`
    Add(ColumnDefinition),
    /// `ALTER TABLE t DROP COLUMN c`
    DropColumn(String),
    /// Command added by name through the extension hook; the grammar only
    /// compiles names it knows.
    Raw { name: String, columns: Vec<String> },
}

impl Command {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Command::Add(_) => "add",
            Command::DropColumn(_) => "dropColumn",
            Command::Raw { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    table: String,
    columns: Vec<ColumnDefinition>,
    commands: Vec<Command>,
}

macro_rules! unsupported_columns {
    ($($method:ident => $feature:ident),* $(,)?) => {
        $(
            pub fn $method(&mut self, _column: &str) -> Result<&mut ColumnDefinition, SphinxError> {
                Err(Unsupported::$feature.into())
            }
        )*
    };
}

macro_rules! unsupported_indexes {
    ($($method:ident => $feature:ident),* $(,)?) => {
        $(
            pub fn $method(&mut self, _columns: &[&str]) -> Result<(), SphinxError> {
                Err(Unsupported::$feature.into())
            }
        )*
    };
}

impl Blueprint {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Create a blueprint and run the mutator against it.
    ///
    /// An error from the mutator (typically a capability rejection) is
    /// returned as-is and the half-built blueprint is dropped.
    pub fn with<F>(table: impl Into<String>, mutator: F) -> Result<Self, SphinxError>
    where
        F: FnOnce(&mut Blueprint) -> Result<(), SphinxError>,
    {
        let mut blueprint = Self::new(table);
        mutator(&mut blueprint)?;
        Ok(blueprint)
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn added_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| !c.is_change())
    }

    pub fn changed_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| c.is_change())
    }

    /// Compile into SphinxQL statements in declaration order.
    ///
    /// Added columns come first (one `ADD COLUMN` each), followed by the
    /// explicit commands. Commands the grammar has no compiler for are skipped.
    pub fn to_sql(&self, grammar: &SchemaGrammar) -> Result<Vec<String>, SphinxError> {
        if self.changed_columns().next().is_some() {
            return Err(Unsupported::ColumnModification.into());
        }
        self.ensure_commands_are_valid()?;

        let mut statements = Vec::new();
        for command in self.implied_commands().iter().chain(self.commands.iter()) {
            match grammar.compile(self, command) {
                Some(sql) => statements.push(sql),
                None => debug!(table = %self.table, command = command.name(), "No compiler for command, skipping"),
            }
        }
        Ok(statements)
    }

    fn implied_commands(&self) -> Vec<Command> {
        self.added_columns().cloned().map(Command::Add).collect()
    }

    /// Reject `dropForeign` / `renameColumn` commands added by name, which
    /// bypass the typed methods.
    pub fn ensure_commands_are_valid(&self) -> Result<(), SphinxError> {
        for command in &self.commands {
            match command.name() {
                "dropForeign" => return Err(Unsupported::ForeignKey.into()),
                "renameColumn" => return Err(Unsupported::RenameColumn.into()),
                _ => {}
            }
        }
        Ok(())
    }

    /// Append a command by name. Used by extensions; prefer the typed methods.
    pub fn add_command(&mut self, name: impl Into<String>, columns: &[&str]) -> &mut Command {
        let index = self.commands.len();
        self.commands.push(Command::Raw {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        &mut self.commands[index]
    }

    /// Declare a column of the given kind.
    pub fn add_column(&mut self, kind: ColumnKind, name: &str) -> &mut ColumnDefinition {
        let index = self.columns.len();
        self.columns.push(ColumnDefinition::new(name, kind));
        &mut self.columns[index]
    }

    /// Declare a column by schema-builder method name, e.g. `column("double", "price")`.
    pub fn column(&mut self, method: &str, name: &str) -> Result<&mut ColumnDefinition, SphinxError> {
        let kind = ColumnKind::from_method(method)?;
        Ok(self.add_column(kind, name))
    }

    /// Forget a pending column definition.
    pub fn remove_column(&mut self, name: &str) -> &mut Self {
        self.columns.retain(|c| c.name() != name);
        self
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Supported columns
    // ═══════════════════════════════════════════════════════════════════════

    pub fn string(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::String, column)
    }

    pub fn char(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::Char, column)
    }

    pub fn text(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::Text, column)
    }

    pub fn tiny_integer(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::TinyInteger, column)
    }

    pub fn small_integer(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::SmallInteger, column)
    }

    pub fn medium_integer(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::MediumInteger, column)
    }

    pub fn integer(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::Integer, column)
    }

    pub fn unsigned_integer(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::UnsignedInteger, column)
    }

    pub fn big_integer(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::BigInteger, column)
    }

    pub fn unsigned_big_integer(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::UnsignedBigInteger, column)
    }

    pub fn float(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::Float, column)
    }

    pub fn double(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::Double, column)
    }

    /// Stored as STRING: the daemon has no fixed-point type.
    pub fn decimal(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::Decimal, column)
    }

    pub fn unsigned_decimal(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::UnsignedDecimal, column)
    }

    pub fn boolean(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::Boolean, column)
    }

    /// Multi-value attribute. `unsigned` selects 32-bit `MULTI`, otherwise `MULTI64`.
    pub fn set(&mut self, column: &str, unsigned: bool) -> &mut ColumnDefinition {
        let kind = if unsigned { ColumnKind::Set } else { ColumnKind::Set64 };
        self.add_column(kind, column)
    }

    pub fn json(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::Json, column)
    }

    pub fn jsonb(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::Jsonb, column)
    }

    pub fn timestamp(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::Timestamp, column)
    }

    pub fn timestamp_tz(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::TimestampTz, column)
    }

    pub fn date_time(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::DateTime, column)
    }

    pub fn date_time_tz(&mut self, column: &str) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::DateTimeTz, column)
    }

    /// `created_at` and `updated_at` TIMESTAMP columns.
    pub fn timestamps(&mut self) {
        self.timestamp("created_at");
        self.timestamp("updated_at");
    }

    pub fn nullable_timestamps(&mut self) {
        self.timestamps();
    }

    pub fn timestamps_tz(&mut self) {
        self.timestamps();
    }

    /// Soft deletes are a BOOL flag; the daemon has no nullable datetime.
    pub fn soft_deletes(&mut self, column: Option<&str>) -> &mut ColumnDefinition {
        self.add_column(ColumnKind::Boolean, column.unwrap_or(SOFT_DELETE_COLUMN))
    }

    pub fn soft_deletes_tz(&mut self, column: Option<&str>) -> &mut ColumnDefinition {
        self.soft_deletes(column)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Supported drops
    // ═══════════════════════════════════════════════════════════════════════

    /// Queue one `DROP COLUMN` per name.
    pub fn drop_column(&mut self, columns: &[&str]) -> &mut Self {
        for column in columns {
            self.commands.push(Command::DropColumn(column.to_string()));
        }
        self
    }

    pub fn drop_timestamps(&mut self) -> &mut Self {
        self.drop_column(&["created_at", "updated_at"])
    }

    pub fn drop_timestamps_tz(&mut self) -> &mut Self {
        self.drop_timestamps()
    }

    pub fn drop_soft_deletes(&mut self, column: Option<&str>) -> &mut Self {
        self.drop_column(&[column.unwrap_or(SOFT_DELETE_COLUMN)])
    }

    pub fn drop_soft_deletes_tz(&mut self, column: Option<&str>) -> &mut Self {
        self.drop_soft_deletes(column)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Capability gate: column families the daemon cannot store
    // ═══════════════════════════════════════════════════════════════════════

    unsupported_columns! {
        increments => AutoIncrement,
        tiny_increments => AutoIncrement,
        small_increments => AutoIncrement,
        medium_increments => AutoIncrement,
        integer_increments => AutoIncrement,
        big_increments => AutoIncrement,
        date => DateColumn,
        time => TimeColumn,
        time_tz => TimeColumn,
        year => YearColumn,
        binary => BinaryColumn,
        uuid => UuidColumn,
        foreign_uuid => UuidColumn,
        ip_address => IpAddressColumn,
        mac_address => MacAddressColumn,
        geometry => GeometryColumn,
        point => GeometryColumn,
        line_string => GeometryColumn,
        polygon => GeometryColumn,
        geometry_collection => GeometryColumn,
        multi_point => GeometryColumn,
        multi_line_string => GeometryColumn,
        multi_polygon => GeometryColumn,
        morphs => Morphs,
        nullable_morphs => Morphs,
        uuid_morphs => Morphs,
        nullable_uuid_morphs => Morphs,
        foreign_id => ForeignKey,
    }

    pub fn id(&mut self) -> Result<&mut ColumnDefinition, SphinxError> {
        Err(Unsupported::AutoIncrement.into())
    }

    pub fn enumeration(&mut self, _column: &str, _allowed: &[&str]) -> Result<&mut ColumnDefinition, SphinxError> {
        Err(Unsupported::EnumColumn.into())
    }

    pub fn remember_token(&mut self) -> Result<&mut ColumnDefinition, SphinxError> {
        Err(Unsupported::RememberToken.into())
    }

    /// Generated columns (`virtualAs` / `storedAs`).
    pub fn computed(&mut self, _column: &str, _expression: &str) -> Result<&mut ColumnDefinition, SphinxError> {
        Err(Unsupported::ComputedColumn.into())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Capability gate: indexes, keys and renames
    // ═══════════════════════════════════════════════════════════════════════

    unsupported_indexes! {
        primary => PrimaryKey,
        unique => UniqueIndex,
        index => PlainIndex,
        fulltext => FullTextIndex,
        spatial_index => SpatialIndex,
        foreign => ForeignKey,
        drop_primary => PrimaryKey,
        drop_unique => UniqueIndex,
        drop_index => PlainIndex,
        drop_fulltext => FullTextIndex,
        drop_spatial_index => SpatialIndex,
        drop_foreign => ForeignKey,
        drop_morphs => Morphs,
    }

    pub fn rename_index(&mut self, _from: &str, _to: &str) -> Result<(), SphinxError> {
        Err(Unsupported::RenameIndex.into())
    }

    pub fn rename_column(&mut self, _from: &str, _to: &str) -> Result<(), SphinxError> {
        Err(Unsupported::RenameColumn.into())
    }

    pub fn rename(&mut self, _to: &str) -> Result<(), SphinxError> {
        Err(Unsupported::RenameTable.into())
    }

    pub fn drop(&mut self) -> Result<(), SphinxError> {
        Err(Unsupported::DropTable.into())
    }

    pub fn drop_if_exists(&mut self) -> Result<(), SphinxError> {
        Err(Unsupported::DropTable.into())
    }
}
