// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Connection layer.
//!
//! - [`Transport`]: async seam that executes statement text against the daemon
//! - [`MySqlTransport`]: sqlx pool speaking the MySQL wire protocol
//! - [`MemoryTransport`]: recording fake for tests
//! - [`SphinxConnection`]: facade handing out query and schema builders

pub mod facade;
pub mod memory;
pub mod mysql;
pub mod traits;

pub use facade::SphinxConnection;
pub use memory::{MemoryTransport, RecordedStatement, StatementKind};
pub use mysql::MySqlTransport;
pub use traits::{Row, SqlParam, Transport};
