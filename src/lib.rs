//! # Sphinx Connection
//!
//! An ORM-facing driver adapter for Sphinx and Manticore search daemons,
//! speaking SphinxQL over the MySQL wire protocol.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Caller intents                          │
//! │  • schema().table(..) change-sets                          │
//! │  • query() with match / where_multi / option / facet        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Capability gate                          │
//! │  • Blueprint rejects indexes, keys, renames, exotic types  │
//! │  • RelationalSchema operations fail before any I/O         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Grammars                             │
//! │  • SchemaGrammar: ALTER TABLE / DESC / SHOW TABLES         │
//! │  • QueryGrammar: SELECT / INSERT / REPLACE / UPDATE ...     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              SphinxConnection → Transport                   │
//! │  • MySqlTransport (sqlx, text protocol)                    │
//! │  • MemoryTransport (recording fake)                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!          SphinxProcessor / EntitySchema decode results
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use sphinx_connection::{SphinxConfig, SphinxConnection};
//! use sphinx_connection::query::Direction;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sphinx_connection::SphinxError> {
//!     let conn = SphinxConnection::connect(SphinxConfig {
//!         prefix: "rt_".into(),
//!         ..Default::default()
//!     })?;
//!
//!     conn.schema().table("products", |t| {
//!         t.string("title");
//!         t.set("tags", true);
//!         Ok(())
//!     }).await?;
//!
//!     let hits = conn
//!         .table("products")
//!         .match_("title", "trail shoes", false)
//!         .where_multi("tags", "in", &[json!(4), json!(9)])?
//!         .order_by("WEIGHT()", Direction::Desc)
//!         .option("ranker", "sph04")
//!         .limit(20)
//!         .get()
//!         .await?;
//!
//!     println!("{} hits", hits.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`schema`]: change-sets, schema grammar and the capability gate
//! - [`query`]: query builder, statement grammar and result processor
//! - [`connection`]: facade and transports
//! - [`model`]: attribute casts and entity schema
//! - [`types`]: Sphinx / portable type mapping
//! - [`mva`]: multi-value attribute codec

pub mod config;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod model;
pub mod mva;
pub mod query;
pub mod resilience;
pub mod schema;
pub mod types;

pub use config::SphinxConfig;
pub use connection::{MemoryTransport, MySqlTransport, Row, SphinxConnection, SqlParam, Transport};
pub use error::{SphinxError, Unsupported};
pub use metrics::LatencyTimer;
pub use model::{Cast, EntitySchema};
pub use query::{QueryBuilder, QueryGrammar, SphinxProcessor};
pub use resilience::retry::RetryConfig;
pub use schema::{Blueprint, RelationalSchema, SchemaBuilder, SchemaGrammar, SearchIndexSchema};
pub use types::{ColumnType, PortableType, SphinxType};
