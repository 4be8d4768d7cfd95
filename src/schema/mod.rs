// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Schema layer for real-time indexes.
//!
//! The daemon supports a narrow slice of relational DDL: adding and dropping
//! attributes on an existing index, and introspecting indexes and their
//! columns. Everything else (creating or dropping indexes, renames, keys,
//! secondary indexes, auto-increment, exotic column families) is refused by
//! the capability gate before a statement is compiled.
//!
//! # Example
//!
//! ```rust,no_run
//! use sphinx_connection::{SphinxConfig, SphinxConnection};
//! use sphinx_connection::schema::SearchIndexSchema;
//!
//! # async fn run() -> Result<(), sphinx_connection::SphinxError> {
//! let conn = SphinxConnection::connect(SphinxConfig::default())?;
//! let schema = conn.schema();
//!
//! schema.table("products", |t| {
//!     t.string("name");
//!     t.set("tags", true);
//!     Ok(())
//! }).await?;
//!
//! assert!(schema.has_column("products", "tags").await?);
//! # Ok(())
//! # }
//! ```

pub mod blueprint;
pub mod builder;
pub mod capability;
pub mod column;
pub mod grammar;

pub use blueprint::{Blueprint, Command, SOFT_DELETE_COLUMN};
pub use builder::SchemaBuilder;
pub use capability::{RelationalSchema, SearchIndexSchema};
pub use column::{ColumnAttributes, ColumnDefinition, ColumnKind};
pub use grammar::SchemaGrammar;
