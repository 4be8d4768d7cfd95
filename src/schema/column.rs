// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Column definitions and the column-kind alias table.
//!
//! Every column constructor on [`Blueprint`](super::Blueprint) resolves through
//! [`ColumnKind`] to exactly one [`SphinxType`]:
//!
//! ```text
//! string, char, text                          → STRING
//! tinyInteger .. integer, unsignedInteger     → INTEGER
//! bigInteger, unsignedBigInteger              → BIGINT
//! float, double                               → FLOAT
//! decimal, unsignedDecimal                    → STRING
//! boolean                                     → BOOL
//! set (unsigned) / set64                      → MULTI / MULTI64
//! json, jsonb                                 → JSON
//! timestamp, timestampTz, dateTime, dateTimeTz → TIMESTAMP
//! ```

use serde_json::Value;

use crate::error::{SphinxError, Unsupported};
use crate::types::{to_sphinx_type, PortableType, SphinxType};

/// Requested column kind, before alias resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    String,
    Char,
    Text,
    TinyInteger,
    SmallInteger,
    MediumInteger,
    Integer,
    UnsignedInteger,
    BigInteger,
    UnsignedBigInteger,
    Float,
    Double,
    Decimal,
    UnsignedDecimal,
    Boolean,
    Set,
    Set64,
    Json,
    Jsonb,
    Timestamp,
    TimestampTz,
    DateTime,
    DateTimeTz,
}

impl ColumnKind {
    /// Canonical portable type for this kind.
    #[must_use]
    pub fn canonical(&self) -> PortableType {
        match self {
            ColumnKind::String | ColumnKind::Char | ColumnKind::Text => PortableType::String,
            ColumnKind::TinyInteger
            | ColumnKind::SmallInteger
            | ColumnKind::MediumInteger
            | ColumnKind::Integer
            | ColumnKind::UnsignedInteger => PortableType::Integer,
            ColumnKind::BigInteger | ColumnKind::UnsignedBigInteger => PortableType::BigInteger,
            ColumnKind::Float | ColumnKind::Double => PortableType::Float,
            ColumnKind::Decimal | ColumnKind::UnsignedDecimal => PortableType::Decimal,
            ColumnKind::Boolean => PortableType::Boolean,
            ColumnKind::Set | ColumnKind::Set64 => PortableType::Set,
            ColumnKind::Json | ColumnKind::Jsonb => PortableType::Json,
            ColumnKind::Timestamp
            | ColumnKind::TimestampTz
            | ColumnKind::DateTime
            | ColumnKind::DateTimeTz => PortableType::Timestamp,
        }
    }

    /// Wire type used in `ADD COLUMN`.
    #[must_use]
    pub fn sphinx_type(&self) -> SphinxType {
        match self {
            ColumnKind::Set64 => SphinxType::Multi64,
            other => to_sphinx_type(other.canonical()),
        }
    }

    /// Resolve a schema-builder method name (`"double"`, `"dateTimeTz"`, ...).
    ///
    /// Names of column families the daemon cannot store fail with
    /// [`SphinxError::CapabilityUnsupported`]; names nobody recognizes fail
    /// with [`SphinxError::Config`].
    pub fn from_method(method: &str) -> Result<ColumnKind, SphinxError> {
        let kind = match method {
            "string" => ColumnKind::String,
            "char" => ColumnKind::Char,
            "text" | "tinyText" | "mediumText" | "longText" => ColumnKind::Text,
            "tinyInteger" | "unsignedTinyInteger" => ColumnKind::TinyInteger,
            "smallInteger" | "unsignedSmallInteger" => ColumnKind::SmallInteger,
            "mediumInteger" | "unsignedMediumInteger" => ColumnKind::MediumInteger,
            "integer" => ColumnKind::Integer,
            "unsignedInteger" => ColumnKind::UnsignedInteger,
            "bigInteger" => ColumnKind::BigInteger,
            "unsignedBigInteger" => ColumnKind::UnsignedBigInteger,
            "float" => ColumnKind::Float,
            "double" => ColumnKind::Double,
            "decimal" => ColumnKind::Decimal,
            "unsignedDecimal" => ColumnKind::UnsignedDecimal,
            "boolean" => ColumnKind::Boolean,
            "set" => ColumnKind::Set,
            "set64" => ColumnKind::Set64,
            "json" => ColumnKind::Json,
            "jsonb" => ColumnKind::Jsonb,
            "timestamp" => ColumnKind::Timestamp,
            "timestampTz" => ColumnKind::TimestampTz,
            "dateTime" => ColumnKind::DateTime,
            "dateTimeTz" => ColumnKind::DateTimeTz,
            other => {
                return Err(match unsupported_family(other) {
                    Some(feature) => feature.into(),
                    None => SphinxError::Config(format!("unknown column type '{}'", other)),
                })
            }
        };
        Ok(kind)
    }
}

fn unsupported_family(method: &str) -> Option<Unsupported> {
    let feature = match method {
        "increments" | "tinyIncrements" | "smallIncrements" | "mediumIncrements"
        | "bigIncrements" | "id" => Unsupported::AutoIncrement,
        "enum" => Unsupported::EnumColumn,
        "date" => Unsupported::DateColumn,
        "time" | "timeTz" => Unsupported::TimeColumn,
        "year" => Unsupported::YearColumn,
        "binary" => Unsupported::BinaryColumn,
        "uuid" | "foreignUuid" => Unsupported::UuidColumn,
        "ipAddress" => Unsupported::IpAddressColumn,
        "macAddress" => Unsupported::MacAddressColumn,
        "geometry" | "point" | "lineString" | "polygon" | "geometryCollection"
        | "multiPoint" | "multiLineString" | "multiPolygon" => Unsupported::GeometryColumn,
        "morphs" | "nullableMorphs" | "uuidMorphs" | "nullableUuidMorphs" => Unsupported::Morphs,
        "rememberToken" => Unsupported::RememberToken,
        "foreignId" | "foreignIdFor" => Unsupported::ForeignKey,
        _ => return None,
    };
    Some(feature)
}

/// A column declared inside a change-set.
///
/// The fluent attribute setters are accepted for source compatibility with
/// relational migrations but have no effect on the compiled statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    name: String,
    kind: ColumnKind,
    change: bool,
    attributes: ColumnAttributes,
}

/// Attributes the daemon ignores. Kept so callers can inspect what they declared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnAttributes {
    pub nullable: bool,
    pub unsigned: bool,
    pub default: Option<Value>,
    pub comment: Option<String>,
    pub after: Option<String>,
    pub first: bool,
    pub charset: Option<String>,
    pub collation: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            change: false,
            attributes: ColumnAttributes::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    #[must_use]
    pub fn sphinx_type(&self) -> SphinxType {
        self.kind.sphinx_type()
    }

    #[must_use]
    pub fn is_change(&self) -> bool {
        self.change
    }

    #[must_use]
    pub fn attributes(&self) -> &ColumnAttributes {
        &self.attributes
    }

    /// Mark this column as modifying an existing one.
    pub fn change(&mut self) -> &mut Self {
        self.change = true;
        self
    }

    pub fn nullable(&mut self) -> &mut Self {
        self.attributes.nullable = true;
        self
    }

    pub fn unsigned(&mut self) -> &mut Self {
        self.attributes.unsigned = true;
        self
    }

    pub fn default(&mut self, value: impl Into<Value>) -> &mut Self {
        self.attributes.default = Some(value.into());
        self
    }

    pub fn comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.attributes.comment = Some(comment.into());
        self
    }

    pub fn after(&mut self, column: impl Into<String>) -> &mut Self {
        self.attributes.after = Some(column.into());
        self
    }

    pub fn first(&mut self) -> &mut Self {
        self.attributes.first = true;
        self
    }

    pub fn charset(&mut self, charset: impl Into<String>) -> &mut Self {
        self.attributes.charset = Some(charset.into());
        self
    }

    pub fn collation(&mut self, collation: impl Into<String>) -> &mut Self {
        self.attributes.collation = Some(collation.into());
        self
    }
}
