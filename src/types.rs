// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Type mapping between SphinxQL column types and portable schema types.
//!
//! ```text
//! SphinxQL (wire / DESC)         Portable
//! ─────────────────────────────  ───────────
//! STRING     string              string
//! INTEGER    uint                integer
//! BIGINT     bigint              bigInteger
//! FLOAT      float               float
//! BOOL       bool                boolean
//! MULTI      mva                 set
//! MULTI64    mva64               set
//! JSON       json                json
//! TIMESTAMP  timestamp           timestamp
//! ```
//!
//! Unknown native names (e.g. `field`, `text`, or types added by newer daemons)
//! pass through as [`ColumnType::Native`] instead of failing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Column type keyword understood by `ALTER TABLE ... ADD COLUMN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SphinxType {
    String,
    Integer,
    BigInt,
    Float,
    Bool,
    Multi,
    Multi64,
    Json,
    Timestamp,
}

impl SphinxType {
    pub const ALL: [SphinxType; 9] = [
        SphinxType::String,
        SphinxType::Integer,
        SphinxType::BigInt,
        SphinxType::Float,
        SphinxType::Bool,
        SphinxType::Multi,
        SphinxType::Multi64,
        SphinxType::Json,
        SphinxType::Timestamp,
    ];

    /// Wire keyword, exactly as emitted in DDL.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match self {
            SphinxType::String => "STRING",
            SphinxType::Integer => "INTEGER",
            SphinxType::BigInt => "BIGINT",
            SphinxType::Float => "FLOAT",
            SphinxType::Bool => "BOOL",
            SphinxType::Multi => "MULTI",
            SphinxType::Multi64 => "MULTI64",
            SphinxType::Json => "JSON",
            SphinxType::Timestamp => "TIMESTAMP",
        }
    }

    /// Parse a wire keyword or a native `DESC` type name (case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Option<SphinxType> {
        let ty = match name.trim().to_ascii_lowercase().as_str() {
            "string" => SphinxType::String,
            "integer" | "int" | "uint" => SphinxType::Integer,
            "bigint" => SphinxType::BigInt,
            "float" => SphinxType::Float,
            "bool" => SphinxType::Bool,
            "multi" | "mva" => SphinxType::Multi,
            "multi64" | "mva64" => SphinxType::Multi64,
            "json" => SphinxType::Json,
            "timestamp" => SphinxType::Timestamp,
            _ => return None,
        };
        Some(ty)
    }

    /// Portable type this column reads back as.
    #[must_use]
    pub fn portable(&self) -> PortableType {
        match self {
            SphinxType::String => PortableType::String,
            SphinxType::Integer => PortableType::Integer,
            SphinxType::BigInt => PortableType::BigInteger,
            SphinxType::Float => PortableType::Float,
            SphinxType::Bool => PortableType::Boolean,
            SphinxType::Multi | SphinxType::Multi64 => PortableType::Set,
            SphinxType::Json => PortableType::Json,
            SphinxType::Timestamp => PortableType::Timestamp,
        }
    }

    #[must_use]
    pub fn is_multi(&self) -> bool {
        matches!(self, SphinxType::Multi | SphinxType::Multi64)
    }
}

impl fmt::Display for SphinxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Caller-facing schema type vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PortableType {
    String,
    Integer,
    BigInteger,
    Float,
    Decimal,
    Boolean,
    Set,
    Json,
    Timestamp,
}

impl PortableType {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PortableType::String => "string",
            PortableType::Integer => "integer",
            PortableType::BigInteger => "bigInteger",
            PortableType::Float => "float",
            PortableType::Decimal => "decimal",
            PortableType::Boolean => "boolean",
            PortableType::Set => "set",
            PortableType::Json => "json",
            PortableType::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for PortableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of mapping a native type name: either a known portable type or
/// the raw daemon name for types this crate does not know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Portable(PortableType),
    Native(String),
}

impl ColumnType {
    #[must_use]
    pub fn as_portable(&self) -> Option<PortableType> {
        match self {
            ColumnType::Portable(ty) => Some(*ty),
            ColumnType::Native(_) => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Portable(ty) => write!(f, "{}", ty),
            ColumnType::Native(raw) => f.write_str(raw),
        }
    }
}

/// Map a SphinxQL type name (wire keyword or `DESC` output) to the portable vocabulary.
#[must_use]
pub fn to_portable_type(sphinx_type: &str) -> ColumnType {
    match SphinxType::parse(sphinx_type) {
        Some(ty) => ColumnType::Portable(ty.portable()),
        None => ColumnType::Native(sphinx_type.to_string()),
    }
}

/// Map a portable type to the DDL keyword used to declare it.
///
/// `set` maps to the 32-bit `MULTI`; callers wanting `MULTI64` declare the
/// column through `Blueprint::set(name, false)`.
#[must_use]
pub fn to_sphinx_type(portable: PortableType) -> SphinxType {
    match portable {
        PortableType::String | PortableType::Decimal => SphinxType::String,
        PortableType::Integer => SphinxType::Integer,
        PortableType::BigInteger => SphinxType::BigInt,
        PortableType::Float => SphinxType::Float,
        PortableType::Boolean => SphinxType::Bool,
        PortableType::Set => SphinxType::Multi,
        PortableType::Json => SphinxType::Json,
        PortableType::Timestamp => SphinxType::Timestamp,
    }
}
