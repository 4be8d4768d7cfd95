// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query-scoped clause fragments.
//!
//! A [`SelectQuery`] is owned by exactly one [`QueryBuilder`](super::QueryBuilder),
//! compiled once by the [`QueryGrammar`](super::QueryGrammar), then dropped.

use std::fmt;

use crate::connection::SqlParam;

/// How a predicate joins the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boolean {
    And,
    Or,
}

impl Boolean {
    pub(crate) fn keyword(&self) -> &'static str {
        match self {
            Boolean::And => "AND",
            Boolean::Or => "OR",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("ASC"),
            Direction::Desc => f.write_str("DESC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderClause {
    pub column: String,
    pub direction: Direction,
}

/// Operator of an MVA predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultiOperator {
    /// `col IN (...)`: any value of the attribute is in the list
    In,
    /// `col NOT IN (...)`
    NotIn,
    /// `ANY(col) IN (...)`
    Any,
    /// `ALL(col) IN (...)`
    All,
    /// Passed through verbatim; the daemon decides whether it is valid.
    Other(String),
}

impl MultiOperator {
    #[must_use]
    pub fn parse(operator: &str) -> MultiOperator {
        match operator.trim().to_ascii_lowercase().as_str() {
            "=" | "in" => MultiOperator::In,
            "!=" | "<>" | "not in" => MultiOperator::NotIn,
            "any" => MultiOperator::Any,
            "all" => MultiOperator::All,
            _ => MultiOperator::Other(operator.trim().to_string()),
        }
    }

    /// Negated operators match every row when the value list is empty.
    #[must_use]
    pub fn is_negated(&self) -> bool {
        matches!(self, MultiOperator::NotIn)
    }
}

/// A WHERE / HAVING predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    Basic {
        column: String,
        operator: String,
        value: SqlParam,
        boolean: Boolean,
    },
    In {
        column: String,
        values: Vec<SqlParam>,
        negated: bool,
        boolean: Boolean,
    },
    Between {
        column: String,
        low: SqlParam,
        high: SqlParam,
        negated: bool,
        boolean: Boolean,
    },
    Null {
        column: String,
        negated: bool,
        boolean: Boolean,
    },
    /// MVA predicate; `values` is already normalized (unique integers).
    Multi {
        column: String,
        operator: MultiOperator,
        values: Vec<i64>,
        boolean: Boolean,
    },
}

impl WhereClause {
    pub(crate) fn boolean(&self) -> Boolean {
        match self {
            WhereClause::Basic { boolean, .. }
            | WhereClause::In { boolean, .. }
            | WhereClause::Between { boolean, .. }
            | WhereClause::Null { boolean, .. }
            | WhereClause::Multi { boolean, .. } => *boolean,
        }
    }
}

/// Which full-text fields a MATCH term targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchColumn {
    All,
    One(String),
    Many(Vec<String>),
}

impl From<&str> for MatchColumn {
    fn from(column: &str) -> Self {
        match column.trim() {
            "" | "*" => MatchColumn::All,
            c => MatchColumn::One(c.to_string()),
        }
    }
}

impl From<String> for MatchColumn {
    fn from(column: String) -> Self {
        MatchColumn::from(column.as_str())
    }
}

impl From<&[&str]> for MatchColumn {
    fn from(columns: &[&str]) -> Self {
        MatchColumn::Many(columns.iter().map(|c| c.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for MatchColumn {
    fn from(columns: [&str; N]) -> Self {
        MatchColumn::Many(columns.iter().map(|c| c.to_string()).collect())
    }
}

/// One full-text term. `half` selects the relaxed escaping mode that keeps
/// the user's `|`, `-`, `*` and quoted-phrase operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchClause {
    pub column: MatchColumn,
    pub value: String,
    pub half: bool,
}

/// Value of an `OPTION name = value` pair.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Integer(i64),
    Float(f64),
    /// Bare identifier, e.g. `ranker = sph04`
    Ident(String),
    /// Quoted literal, e.g. `comment = 'nightly'`
    Text(String),
    /// Named weights, e.g. `field_weights = (title=10, body=3)`
    Weights(Vec<(String, i64)>),
}

impl OptionValue {
    pub fn text(value: impl Into<String>) -> Self {
        OptionValue::Text(value.into())
    }

    pub fn weights<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        OptionValue::Weights(weights.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Integer(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Integer(i64::from(v))
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Ident(v.to_string())
    }
}

/// `FACET` sub-clause.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FacetClause {
    pub columns: Vec<String>,
    pub by: Vec<String>,
    pub order: Option<OrderClause>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Everything a SELECT (and the WHERE part of UPDATE/DELETE) can carry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectQuery {
    pub from: Option<String>,
    pub columns: Vec<String>,
    pub matches: Vec<MatchClause>,
    pub wheres: Vec<WhereClause>,
    pub groups: Vec<String>,
    pub group_limit: Option<u32>,
    pub within_group_orders: Vec<OrderClause>,
    pub havings: Vec<WhereClause>,
    pub orders: Vec<OrderClause>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub options: Vec<(String, OptionValue)>,
    pub facets: Vec<FacetClause>,
}

impl SelectQuery {
    /// Insert or overwrite an option, keeping first-declaration order.
    pub fn set_option(&mut self, name: &str, value: OptionValue) {
        match self.options.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.options.push((name.to_string(), value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_operator_parse() {
        assert_eq!(MultiOperator::parse("="), MultiOperator::In);
        assert_eq!(MultiOperator::parse("IN"), MultiOperator::In);
        assert_eq!(MultiOperator::parse("not in"), MultiOperator::NotIn);
        assert_eq!(MultiOperator::parse("<>"), MultiOperator::NotIn);
        assert_eq!(MultiOperator::parse("all"), MultiOperator::All);
        assert_eq!(MultiOperator::parse(">"), MultiOperator::Other(">".into()));
    }

    #[test]
    fn test_match_column_from_str() {
        assert_eq!(MatchColumn::from("*"), MatchColumn::All);
        assert_eq!(MatchColumn::from(""), MatchColumn::All);
        assert_eq!(MatchColumn::from("title"), MatchColumn::One("title".into()));
        assert_eq!(
            MatchColumn::from(["title", "body"]),
            MatchColumn::Many(vec!["title".into(), "body".into()])
        );
    }

    #[test]
    fn test_set_option_overwrites_in_place() {
        let mut query = SelectQuery::default();
        query.set_option("ranker", OptionValue::from("bm25"));
        query.set_option("max_matches", OptionValue::from(500));
        query.set_option("ranker", OptionValue::from("sph04"));

        assert_eq!(query.options.len(), 2);
        assert_eq!(query.options[0], ("ranker".to_string(), OptionValue::Ident("sph04".into())));
    }
}
