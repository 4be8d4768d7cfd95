// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error taxonomy for the SphinxQL adapter.
//!
//! Three families matter to callers:
//!
//! - [`SphinxError::CapabilityUnsupported`]: local-origin, fatal. The caller asked
//!   for a relational feature the search daemon cannot express. Never retried.
//! - [`SphinxError::Execution`]: the daemon rejected a statement. Passed through
//!   untouched from the transport.
//! - "Not found" on column-type lookups is *not* an error: those APIs return
//!   `Option` and callers check for `None`.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SphinxError {
    #[error("{0}")]
    CapabilityUnsupported(Unsupported),
    #[error("Statement rejected by search daemon: {0}")]
    Execution(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Cannot decode '{value}': {reason}")]
    Decode { value: String, reason: String },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Statement has {placeholders} placeholders but {bindings} bindings")]
    BindingMismatch { placeholders: usize, bindings: usize },
}

impl SphinxError {
    /// True for errors caused by calling an API the engine cannot support.
    #[must_use]
    pub fn is_capability(&self) -> bool {
        matches!(self, SphinxError::CapabilityUnsupported(_))
    }

    pub(crate) fn decode(value: impl Into<String>, reason: impl Into<String>) -> Self {
        SphinxError::Decode {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl From<Unsupported> for SphinxError {
    fn from(feature: Unsupported) -> Self {
        crate::metrics::record_capability_rejection(feature.name());
        tracing::warn!(feature = feature.name(), "Rejected unsupported schema operation");
        SphinxError::CapabilityUnsupported(feature)
    }
}

/// Relational features the search daemon has no equivalent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unsupported {
    CreateTable,
    DropTable,
    DropAllTables,
    DropAllViews,
    DropAllTypes,
    Views,
    RenameTable,
    ForeignKeyConstraints,
    DoctrineTypes,
    PrimaryKey,
    UniqueIndex,
    PlainIndex,
    FullTextIndex,
    SpatialIndex,
    ForeignKey,
    RenameIndex,
    RenameColumn,
    ColumnModification,
    AutoIncrement,
    EnumColumn,
    DateColumn,
    TimeColumn,
    YearColumn,
    BinaryColumn,
    UuidColumn,
    IpAddressColumn,
    MacAddressColumn,
    GeometryColumn,
    Morphs,
    RememberToken,
    ComputedColumn,
    Transactions,
}

impl Unsupported {
    /// Stable identifier used for log fields and metric labels.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Unsupported::CreateTable => "create_table",
            Unsupported::DropTable => "drop_table",
            Unsupported::DropAllTables => "drop_all_tables",
            Unsupported::DropAllViews => "drop_all_views",
            Unsupported::DropAllTypes => "drop_all_types",
            Unsupported::Views => "views",
            Unsupported::RenameTable => "rename_table",
            Unsupported::ForeignKeyConstraints => "foreign_key_constraints",
            Unsupported::DoctrineTypes => "doctrine_types",
            Unsupported::PrimaryKey => "primary_key",
            Unsupported::UniqueIndex => "unique_index",
            Unsupported::PlainIndex => "index",
            Unsupported::FullTextIndex => "fulltext_index",
            Unsupported::SpatialIndex => "spatial_index",
            Unsupported::ForeignKey => "foreign_key",
            Unsupported::RenameIndex => "rename_index",
            Unsupported::RenameColumn => "rename_column",
            Unsupported::ColumnModification => "column_modification",
            Unsupported::AutoIncrement => "auto_increment",
            Unsupported::EnumColumn => "enum_column",
            Unsupported::DateColumn => "date_column",
            Unsupported::TimeColumn => "time_column",
            Unsupported::YearColumn => "year_column",
            Unsupported::BinaryColumn => "binary_column",
            Unsupported::UuidColumn => "uuid_column",
            Unsupported::IpAddressColumn => "ip_address_column",
            Unsupported::MacAddressColumn => "mac_address_column",
            Unsupported::GeometryColumn => "geometry_column",
            Unsupported::Morphs => "morphs",
            Unsupported::RememberToken => "remember_token",
            Unsupported::ComputedColumn => "computed_column",
            Unsupported::Transactions => "transactions",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Unsupported::CreateTable => "create tables",
            Unsupported::DropTable => "dropping tables",
            Unsupported::DropAllTables => "dropping all tables",
            Unsupported::DropAllViews => "dropping all views",
            Unsupported::DropAllTypes => "dropping all types",
            Unsupported::Views => "views",
            Unsupported::RenameTable => "rename tables",
            Unsupported::ForeignKeyConstraints => "toggling foreign key constraints",
            Unsupported::DoctrineTypes => "doctrine type registration",
            Unsupported::PrimaryKey => "primary keys",
            Unsupported::UniqueIndex => "unique indexes",
            Unsupported::PlainIndex => "indexes",
            Unsupported::FullTextIndex => "fulltext indexes",
            Unsupported::SpatialIndex => "spatial indexes",
            Unsupported::ForeignKey => "foreign keys",
            Unsupported::RenameIndex => "renaming indexes",
            Unsupported::RenameColumn => "renaming columns",
            Unsupported::ColumnModification => "modifying existing columns",
            Unsupported::AutoIncrement => "auto-increment columns",
            Unsupported::EnumColumn => "enum columns",
            Unsupported::DateColumn => "date columns",
            Unsupported::TimeColumn => "time columns",
            Unsupported::YearColumn => "year columns",
            Unsupported::BinaryColumn => "binary columns",
            Unsupported::UuidColumn => "uuid columns",
            Unsupported::IpAddressColumn => "ip address columns",
            Unsupported::MacAddressColumn => "mac address columns",
            Unsupported::GeometryColumn => "geometry columns",
            Unsupported::Morphs => "polymorphic relation columns",
            Unsupported::RememberToken => "remember token columns",
            Unsupported::ComputedColumn => "computed columns",
            Unsupported::Transactions => "transactions",
        }
    }
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "This database driver does not support {}.", self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_message_names_feature() {
        let err: SphinxError = Unsupported::CreateTable.into();
        assert!(err.is_capability());
        assert_eq!(err.to_string(), "This database driver does not support create tables.");
    }

    #[test]
    fn test_execution_error_passes_message_through() {
        let err = SphinxError::Execution("unknown column: 'foo'".into());
        assert!(!err.is_capability());
        assert!(err.to_string().contains("unknown column: 'foo'"));
    }

    #[test]
    fn test_feature_names_are_snake_case() {
        for feature in [Unsupported::RenameColumn, Unsupported::ForeignKey, Unsupported::Morphs] {
            assert!(feature.name().chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
