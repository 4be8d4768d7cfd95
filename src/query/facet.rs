// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Builder for a single `FACET` sub-clause.

use super::ast::{Direction, FacetClause, OrderClause};

/// Collects one facet's columns, grouping, ordering and paging.
///
/// ```
/// use sphinx_connection::query::{Direction, FacetBuilder};
///
/// let facet = FacetBuilder::new()
///     .column("brand_id")
///     .order_by("COUNT(*)", Direction::Desc)
///     .limit(5)
///     .build();
/// assert_eq!(facet.columns, vec!["brand_id".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FacetBuilder {
    clause: FacetClause,
}

impl FacetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.clause.columns.push(column.into());
        self
    }

    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clause.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Facet over an expression, e.g. `facet_function("INTERVAL", &["price", "200", "400"])`.
    #[must_use]
    pub fn facet_function(mut self, function: &str, params: &[&str]) -> Self {
        self.clause
            .columns
            .push(format!("{}({})", function.to_ascii_uppercase(), params.join(",")));
        self
    }

    #[must_use]
    pub fn by(mut self, column: impl Into<String>) -> Self {
        self.clause.by.push(column.into());
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.clause.order = Some(OrderClause {
            column: column.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn order_by_function(self, function: &str, params: &[&str], direction: Direction) -> Self {
        let expr = format!("{}({})", function.to_ascii_uppercase(), params.join(","));
        self.order_by(expr, direction)
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.clause.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.clause.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn build(self) -> FacetClause {
        self.clause
    }
}
