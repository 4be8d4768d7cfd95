// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query layer
//!
//! Builds SphinxQL SELECT and DML statements, including the search-specific
//! clauses a relational builder lacks.
//!
//! # Architecture
//!
//! ```text
//! QueryBuilder (fluent)  →  SelectQuery (clause fragments)
//!                                   │
//!                                   ▼
//!                 QueryGrammar → CompiledStatement { sql, bindings }
//!                                   │
//!                                   ▼
//!                       SphinxConnection → Transport
//! ```
//!
//! Introspection results (`DESC`, `SHOW TABLES`) flow back through
//! [`SphinxProcessor`].

pub mod ast;
pub mod builder;
pub mod facet;
pub mod grammar;
pub mod processor;

pub use ast::{Direction, MatchColumn, MultiOperator, OptionValue, SelectQuery, WhereClause};
pub use builder::QueryBuilder;
pub use facet::FacetBuilder;
pub use grammar::{escape_match, half_escape_match, interpolate, CompiledStatement, QueryGrammar};
pub use processor::SphinxProcessor;
