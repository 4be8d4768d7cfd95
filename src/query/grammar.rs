// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! SphinxQL statement grammar
//!
//! Compiles a [`SelectQuery`] into statement text with `?` placeholders plus the
//! ordered parameter list, the same shape the relational translators produce.
//!
//! # SphinxQL Generated
//!
//! ```sql
//! SELECT * FROM products WHERE MATCH(?) AND price BETWEEN ? AND ?
//!     GROUP 3 BY brand_id WITHIN GROUP ORDER BY price ASC
//!     ORDER BY WEIGHT() DESC LIMIT 0, 20
//!     OPTION ranker = sph04, field_weights = (title=10, body=3)
//!     FACET brand_id ORDER BY COUNT(*) DESC LIMIT 0, 5
//! INSERT INTO products (id, tags, title) VALUES (?, ?, ?)
//! UPDATE products SET tags = ? WHERE id = ?
//! TRUNCATE RTINDEX products
//! ```

use crate::connection::SqlParam;
use crate::error::SphinxError;
use crate::mva;

use super::ast::{
    Boolean, FacetClause, MatchClause, MatchColumn, MultiOperator, OptionValue, OrderClause,
    SelectQuery, WhereClause,
};

/// LIMIT used when only an offset was requested (the daemon's default `max_matches`).
const OFFSET_ONLY_LIMIT: u64 = 1000;

/// A compiled statement ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    pub sql: String,
    pub bindings: Vec<SqlParam>,
    /// Set when a predicate can never match (an empty positive MVA list). The
    /// connection answers such statements locally without a round trip.
    pub always_empty: bool,
}

/// Statement compiler for SphinxQL DML.
#[derive(Debug, Clone, Default)]
pub struct QueryGrammar {
    table_prefix: String,
}

impl QueryGrammar {
    pub fn new(table_prefix: impl Into<String>) -> Self {
        Self {
            table_prefix: table_prefix.into(),
        }
    }

    pub fn wrap_table(&self, table: &str) -> String {
        format!("{}{}", self.table_prefix, table)
    }

    fn from_clause(&self, query: &SelectQuery) -> Result<String, SphinxError> {
        query
            .from
            .as_deref()
            .map(|t| self.wrap_table(t))
            .ok_or_else(|| SphinxError::Config("query has no target index; call from()".into()))
    }

    pub fn compile_select(&self, query: &SelectQuery) -> Result<CompiledStatement, SphinxError> {
        let mut bindings = Vec::new();
        let mut always_empty = false;

        let columns = if query.columns.is_empty() {
            "*".to_string()
        } else {
            query.columns.join(", ")
        };
        let mut sql = format!("SELECT {} FROM {}", columns, self.from_clause(query)?);

        let predicate = self.compile_predicates(
            &query.matches,
            &query.wheres,
            &mut bindings,
            &mut always_empty,
        );
        if let Some(predicate) = predicate {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }

        if !query.groups.is_empty() {
            match query.group_limit {
                Some(n) => sql.push_str(&format!(" GROUP {} BY ", n)),
                None => sql.push_str(" GROUP BY "),
            }
            sql.push_str(&query.groups.join(", "));
        }

        if !query.within_group_orders.is_empty() {
            sql.push_str(" WITHIN GROUP ORDER BY ");
            sql.push_str(&compile_orders(&query.within_group_orders));
        }

        if let Some(having) =
            self.compile_predicates(&[], &query.havings, &mut bindings, &mut always_empty)
        {
            sql.push_str(" HAVING ");
            sql.push_str(&having);
        }

        if !query.orders.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&compile_orders(&query.orders));
        }

        if let Some(limit) = compile_limit(query.limit, query.offset) {
            sql.push(' ');
            sql.push_str(&limit);
        }

        if !query.options.is_empty() {
            let options: Vec<String> = query
                .options
                .iter()
                .map(|(name, value)| format!("{} = {}", name, compile_option_value(value)))
                .collect();
            sql.push_str(" OPTION ");
            sql.push_str(&options.join(", "));
        }

        for facet in &query.facets {
            if let Some(fragment) = compile_facet(facet) {
                sql.push(' ');
                sql.push_str(&fragment);
            }
        }

        Ok(CompiledStatement {
            sql,
            bindings,
            always_empty,
        })
    }

    /// `SELECT COUNT(*) AS aggregate ...` with the query's predicates.
    pub fn compile_count(&self, query: &SelectQuery) -> Result<CompiledStatement, SphinxError> {
        let mut counting = query.clone();
        counting.columns = vec!["COUNT(*) AS aggregate".to_string()];
        counting.orders.clear();
        counting.limit = None;
        counting.offset = None;
        counting.facets.clear();
        self.compile_select(&counting)
    }

    /// `INSERT INTO` / `REPLACE INTO` for one or more rows. Every row must carry
    /// exactly the first row's columns, in any order.
    pub fn compile_insert(
        &self,
        query: &SelectQuery,
        rows: &[Vec<(String, SqlParam)>],
        verb: InsertVerb,
    ) -> Result<CompiledStatement, SphinxError> {
        let table = self.from_clause(query)?;
        let first = rows
            .first()
            .ok_or_else(|| SphinxError::Config(format!("{} without values", verb.keyword())))?;
        let columns: Vec<&str> = first.iter().map(|(c, _)| c.as_str()).collect();

        let mut bindings = Vec::with_capacity(columns.len() * rows.len());
        let mut tuples = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(mismatched_row(verb, index));
            }
            for column in &columns {
                let value = row
                    .iter()
                    .find(|(c, _)| c == column)
                    .map(|(_, v)| v.clone())
                    .ok_or_else(|| mismatched_row(verb, index))?;
                bindings.push(value);
            }
            tuples.push(format!("({})", placeholders(columns.len())));
        }

        Ok(CompiledStatement {
            sql: format!(
                "{} INTO {} ({}) VALUES {}",
                verb.keyword(),
                table,
                columns.join(", "),
                tuples.join(", ")
            ),
            bindings,
            always_empty: false,
        })
    }

    pub fn compile_update(
        &self,
        query: &SelectQuery,
        values: &[(String, SqlParam)],
    ) -> Result<CompiledStatement, SphinxError> {
        if values.is_empty() {
            return Err(SphinxError::Config("UPDATE without values".into()));
        }
        let mut bindings: Vec<SqlParam> = values.iter().map(|(_, v)| v.clone()).collect();
        let assignments: Vec<String> = values.iter().map(|(c, _)| format!("{} = ?", c)).collect();
        let mut always_empty = false;

        let mut sql = format!(
            "UPDATE {} SET {}",
            self.from_clause(query)?,
            assignments.join(", ")
        );
        if let Some(predicate) =
            self.compile_predicates(&query.matches, &query.wheres, &mut bindings, &mut always_empty)
        {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }

        Ok(CompiledStatement {
            sql,
            bindings,
            always_empty,
        })
    }

    pub fn compile_delete(&self, query: &SelectQuery) -> Result<CompiledStatement, SphinxError> {
        let mut bindings = Vec::new();
        let mut always_empty = false;
        let mut sql = format!("DELETE FROM {}", self.from_clause(query)?);
        if let Some(predicate) =
            self.compile_predicates(&query.matches, &query.wheres, &mut bindings, &mut always_empty)
        {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }
        Ok(CompiledStatement {
            sql,
            bindings,
            always_empty,
        })
    }

    pub fn compile_truncate(&self, query: &SelectQuery) -> Result<CompiledStatement, SphinxError> {
        Ok(CompiledStatement {
            sql: format!("TRUNCATE RTINDEX {}", self.from_clause(query)?),
            bindings: Vec::new(),
            always_empty: false,
        })
    }

    /// MATCH first, then the remaining predicates joined by their own booleans.
    ///
    /// Predicates are grouped the way SQL precedence reads them: each `OR`
    /// opens a new group of `AND`-joined terms. A group holding an
    /// unsatisfiable term is dropped whole. If every group is dropped the
    /// statement is marked `always_empty`. A group left with no terms is
    /// vacuously true and so is the whole filter.
    fn compile_predicates(
        &self,
        matches: &[MatchClause],
        wheres: &[WhereClause],
        bindings: &mut Vec<SqlParam>,
        always_empty: &mut bool,
    ) -> Option<String> {
        let mut groups: Vec<PredicateGroup> = vec![PredicateGroup::default()];

        if let Some(text) = compile_match(matches) {
            groups[0].terms.push("MATCH(?)".to_string());
            groups[0].bindings.push(SqlParam::Text(text));
        }

        for (i, clause) in wheres.iter().enumerate() {
            if i > 0 && clause.boolean() == Boolean::Or {
                groups.push(PredicateGroup::default());
            }
            let Some(group) = groups.last_mut() else {
                continue;
            };
            let mut scratch = Vec::new();
            match compile_where(clause, &mut scratch) {
                Compiled::Sql(sql) => {
                    group.terms.push(sql);
                    group.bindings.append(&mut scratch);
                }
                Compiled::Skip => {}
                Compiled::NeverMatches => group.never_matches = true,
            }
        }

        let total = groups.len();
        let live: Vec<PredicateGroup> = groups.into_iter().filter(|g| !g.never_matches).collect();
        if live.is_empty() {
            *always_empty = true;
            return None;
        }
        if live.len() < total {
            tracing::debug!(
                dropped = total - live.len(),
                "Dropping OR branches with an empty list predicate"
            );
        }
        if live.iter().any(|g| g.terms.is_empty()) {
            return None;
        }

        let mut branches = Vec::with_capacity(live.len());
        for group in live {
            bindings.extend(group.bindings);
            branches.push(group.terms.join(" AND "));
        }
        Some(branches.join(" OR "))
    }
}

#[derive(Default)]
struct PredicateGroup {
    terms: Vec<String>,
    bindings: Vec<SqlParam>,
    never_matches: bool,
}

/// Which write verb an insert compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertVerb {
    Insert,
    Replace,
}

impl InsertVerb {
    fn keyword(&self) -> &'static str {
        match self {
            InsertVerb::Insert => "INSERT",
            InsertVerb::Replace => "REPLACE",
        }
    }
}

enum Compiled {
    Sql(String),
    /// Predicate is vacuous and contributes nothing.
    Skip,
    /// Predicate can never be satisfied.
    NeverMatches,
}

fn compile_where(clause: &WhereClause, bindings: &mut Vec<SqlParam>) -> Compiled {
    match clause {
        WhereClause::Basic {
            column,
            operator,
            value,
            ..
        } => {
            bindings.push(value.clone());
            Compiled::Sql(format!("{} {} ?", column, operator))
        }
        WhereClause::In {
            column,
            values,
            negated,
            ..
        } => {
            if values.is_empty() {
                return if *negated {
                    Compiled::Skip
                } else {
                    Compiled::NeverMatches
                };
            }
            bindings.extend(values.iter().cloned());
            let keyword = if *negated { "NOT IN" } else { "IN" };
            Compiled::Sql(format!(
                "{} {} ({})",
                column,
                keyword,
                placeholders(values.len())
            ))
        }
        WhereClause::Between {
            column,
            low,
            high,
            negated,
            ..
        } => {
            bindings.push(low.clone());
            bindings.push(high.clone());
            let keyword = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
            Compiled::Sql(format!("{} {} ? AND ?", column, keyword))
        }
        WhereClause::Null {
            column, negated, ..
        } => {
            let keyword = if *negated { "IS NOT NULL" } else { "IS NULL" };
            Compiled::Sql(format!("{} {}", column, keyword))
        }
        WhereClause::Multi {
            column,
            operator,
            values,
            ..
        } => {
            if values.is_empty() {
                return if operator.is_negated() {
                    Compiled::Skip
                } else {
                    Compiled::NeverMatches
                };
            }
            bindings.extend(values.iter().map(|v| SqlParam::Integer(*v)));
            let list = placeholders(values.len());
            let sql = match operator {
                MultiOperator::In => format!("{} IN ({})", column, list),
                MultiOperator::NotIn => format!("{} NOT IN ({})", column, list),
                MultiOperator::Any => format!("ANY({}) IN ({})", column, list),
                MultiOperator::All => format!("ALL({}) IN ({})", column, list),
                MultiOperator::Other(op) => format!("{} {} ({})", column, op, list),
            };
            Compiled::Sql(sql)
        }
    }
}

fn compile_match(matches: &[MatchClause]) -> Option<String> {
    if matches.is_empty() {
        return None;
    }
    let terms: Vec<String> = matches
        .iter()
        .map(|m| {
            let prefix = match &m.column {
                MatchColumn::All => String::new(),
                MatchColumn::One(column) => format!("@{} ", column),
                MatchColumn::Many(columns) => format!("@({}) ", columns.join(",")),
            };
            let value = if m.half {
                half_escape_match(&m.value)
            } else {
                escape_match(&m.value)
            };
            format!("({}{})", prefix, value)
        })
        .collect();
    Some(terms.join(" ").trim().to_string())
}

fn compile_orders(orders: &[OrderClause]) -> String {
    orders
        .iter()
        .map(|o| format!("{} {}", o.column, o.direction))
        .collect::<Vec<_>>()
        .join(", ")
}

fn compile_limit(limit: Option<u64>, offset: Option<u64>) -> Option<String> {
    match (limit, offset) {
        (None, None) => None,
        (limit, offset) => Some(format!(
            "LIMIT {}, {}",
            offset.unwrap_or(0),
            limit.unwrap_or(OFFSET_ONLY_LIMIT)
        )),
    }
}

fn compile_option_value(value: &OptionValue) -> String {
    match value {
        OptionValue::Integer(i) => i.to_string(),
        OptionValue::Float(f) => f.to_string(),
        OptionValue::Ident(ident) => ident.clone(),
        OptionValue::Text(text) => quote(text),
        OptionValue::Weights(weights) => {
            let pairs: Vec<String> = weights.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            format!("({})", pairs.join(", "))
        }
    }
}

fn compile_facet(facet: &FacetClause) -> Option<String> {
    if facet.columns.is_empty() {
        return None;
    }
    let mut sql = format!("FACET {}", facet.columns.join(", "));
    if !facet.by.is_empty() {
        sql.push_str(" BY ");
        sql.push_str(&facet.by.join(", "));
    }
    if let Some(order) = &facet.order {
        sql.push_str(&format!(" ORDER BY {} {}", order.column, order.direction));
    }
    if let Some(limit) = compile_limit(facet.limit, facet.offset) {
        sql.push(' ');
        sql.push_str(&limit);
    }
    Some(sql)
}

fn mismatched_row(verb: InsertVerb, index: usize) -> SphinxError {
    SphinxError::Config(format!(
        "{} row {} does not have the same columns as row 0",
        verb.keyword(),
        index
    ))
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Escape every extended-query operator so the text matches literally.
#[must_use]
pub fn escape_match(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(
            c,
            '\\' | '(' | ')' | '|' | '-' | '!' | '@' | '~' | '"' | '&' | '/' | '^' | '$' | '=' | '<'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape operators that break queries while keeping `|`, `-`, `*` and
/// phrase quotes usable. An unbalanced quote is closed, runs of dashes
/// collapse to one, and dashes inside words are escaped. Output is lowercased.
#[must_use]
pub fn half_escape_match(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(
            c,
            '\\' | '(' | ')' | '!' | '@' | '~' | '&' | '/' | '^' | '$' | '=' | '<'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    if escaped.chars().filter(|c| *c == '"').count() % 2 != 0 {
        escaped.push('"');
    }

    let collapsed = collapse_dashes(&escaped);
    escape_inner_dashes(&collapsed).to_lowercase()
}

/// `a - - b` and `a--b` become `a - b` / `a-b`.
fn collapse_dashes(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '-' {
            let mut j = i + 1;
            let mut last_dash = i;
            while j < chars.len() && (chars[j] == '-' || chars[j].is_whitespace()) {
                if chars[j] == '-' {
                    last_dash = j;
                }
                j += 1;
            }
            out.push('-');
            // keep trailing whitespace after the final dash
            for c in &chars[last_dash + 1..j] {
                out.push(*c);
            }
            i = j;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// `foo-bar` becomes `"foo\-bar"`; a dash that starts a word stays an operator.
fn escape_inner_dashes(value: &str) -> String {
    let mut words = Vec::new();
    for word in value.split(' ') {
        let inner = word
            .char_indices()
            .any(|(i, c)| c == '-' && i > 0 && !word[..i].ends_with('\\'));
        if !inner {
            words.push(word.to_string());
            continue;
        }
        let mut rebuilt = String::with_capacity(word.len() + 4);
        for (i, c) in word.char_indices() {
            if c == '-' && i > 0 && !word[..i].ends_with('\\') {
                rebuilt.push('\\');
            }
            rebuilt.push(c);
        }
        if rebuilt.starts_with('"') && rebuilt.ends_with('"') && rebuilt.len() > 1 {
            words.push(rebuilt);
        } else {
            words.push(format!("\"{}\"", rebuilt));
        }
    }
    words.join(" ")
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn render_param(param: &SqlParam) -> String {
    match param {
        SqlParam::Null => "NULL".to_string(),
        SqlParam::Integer(i) => i.to_string(),
        SqlParam::Float(f) if f.is_finite() => f.to_string(),
        SqlParam::Float(_) => "NULL".to_string(),
        SqlParam::Text(text) => quote(text),
        SqlParam::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
        SqlParam::Multi(values) => mva::to_tuple_literal(values),
    }
}

/// Substitute each `?` outside quoted literals with its rendered binding.
///
/// SphinxQL has no server-side prepared statements, so the transport sends the
/// interpolated text.
pub fn interpolate(sql: &str, bindings: &[SqlParam]) -> Result<String, SphinxError> {
    let placeholders = placeholder_positions(sql);
    if placeholders.len() != bindings.len() {
        return Err(SphinxError::BindingMismatch {
            placeholders: placeholders.len(),
            bindings: bindings.len(),
        });
    }

    let mut out = String::with_capacity(sql.len() + bindings.len() * 8);
    let mut last = 0;
    for (pos, param) in placeholders.iter().zip(bindings) {
        out.push_str(&sql[last..*pos]);
        out.push_str(&render_param(param));
        last = pos + 1;
    }
    out.push_str(&sql[last..]);
    Ok(out)
}

fn placeholder_positions(sql: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in sql.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '?' => positions.push(i),
                _ => {}
            },
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::Direction;

    fn query(from: &str) -> SelectQuery {
        SelectQuery {
            from: Some(from.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_select_star() {
        let compiled = QueryGrammar::default().compile_select(&query("products")).unwrap();
        assert_eq!(compiled.sql, "SELECT * FROM products");
        assert!(compiled.bindings.is_empty());
    }

    #[test]
    fn test_select_applies_prefix() {
        let compiled = QueryGrammar::new("rt_").compile_select(&query("products")).unwrap();
        assert_eq!(compiled.sql, "SELECT * FROM rt_products");
    }

    #[test]
    fn test_select_without_from_is_config_error() {
        let err = QueryGrammar::default()
            .compile_select(&SelectQuery::default())
            .unwrap_err();
        assert!(matches!(err, SphinxError::Config(_)));
    }

    #[test]
    fn test_match_comes_first() {
        let mut q = query("products");
        q.wheres.push(WhereClause::Basic {
            column: "price".into(),
            operator: ">".into(),
            value: SqlParam::Integer(10),
            boolean: Boolean::And,
        });
        q.matches.push(MatchClause {
            column: MatchColumn::One("title".into()),
            value: "red shoes".into(),
            half: false,
        });

        let compiled = QueryGrammar::default().compile_select(&q).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT * FROM products WHERE MATCH(?) AND price > ?"
        );
        assert_eq!(
            compiled.bindings,
            vec![SqlParam::Text("(@title red shoes)".into()), SqlParam::Integer(10)]
        );
    }

    #[test]
    fn test_multi_column_match() {
        let text = compile_match(&[
            MatchClause {
                column: MatchColumn::Many(vec!["title".into(), "body".into()]),
                value: "a".into(),
                half: false,
            },
            MatchClause {
                column: MatchColumn::All,
                value: "b".into(),
                half: false,
            },
        ]);
        assert_eq!(text.as_deref(), Some("(@(title,body) a) (b)"));
    }

    #[test]
    fn test_full_clause_order() {
        let mut q = query("products");
        q.groups.push("brand_id".into());
        q.group_limit = Some(3);
        q.within_group_orders.push(OrderClause {
            column: "price".into(),
            direction: Direction::Asc,
        });
        q.orders.push(OrderClause {
            column: "WEIGHT()".into(),
            direction: Direction::Desc,
        });
        q.limit = Some(20);
        q.set_option("ranker", OptionValue::from("sph04"));
        q.set_option("field_weights", OptionValue::weights([("title", 10), ("body", 3)]));
        q.facets.push(FacetClause {
            columns: vec!["brand_id".into()],
            order: Some(OrderClause {
                column: "COUNT(*)".into(),
                direction: Direction::Desc,
            }),
            limit: Some(5),
            ..Default::default()
        });

        let compiled = QueryGrammar::default().compile_select(&q).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT * FROM products GROUP 3 BY brand_id WITHIN GROUP ORDER BY price ASC \
             ORDER BY WEIGHT() DESC LIMIT 0, 20 \
             OPTION ranker = sph04, field_weights = (title=10, body=3) \
             FACET brand_id ORDER BY COUNT(*) DESC LIMIT 0, 5"
        );
    }

    #[test]
    fn test_offset_only_limit() {
        assert_eq!(compile_limit(None, Some(40)).as_deref(), Some("LIMIT 40, 1000"));
        assert_eq!(compile_limit(Some(10), None).as_deref(), Some("LIMIT 0, 10"));
        assert_eq!(compile_limit(None, None), None);
    }

    #[test]
    fn test_multi_operators() {
        let mut bindings = Vec::new();
        let cases = [
            (MultiOperator::In, "tags IN (?, ?)"),
            (MultiOperator::NotIn, "tags NOT IN (?, ?)"),
            (MultiOperator::Any, "ANY(tags) IN (?, ?)"),
            (MultiOperator::All, "ALL(tags) IN (?, ?)"),
        ];
        for (operator, expected) in cases {
            let clause = WhereClause::Multi {
                column: "tags".into(),
                operator,
                values: vec![1, 3],
                boolean: Boolean::And,
            };
            match compile_where(&clause, &mut bindings) {
                Compiled::Sql(sql) => assert_eq!(sql, expected),
                _ => panic!("expected SQL for {}", expected),
            }
        }
    }

    #[test]
    fn test_empty_positive_multi_is_always_empty() {
        let mut q = query("products");
        q.wheres.push(WhereClause::Multi {
            column: "tags".into(),
            operator: MultiOperator::In,
            values: vec![],
            boolean: Boolean::And,
        });
        let compiled = QueryGrammar::default().compile_select(&q).unwrap();
        assert!(compiled.always_empty);
        assert_eq!(compiled.sql, "SELECT * FROM products");
    }

    #[test]
    fn test_empty_negated_multi_is_dropped() {
        let mut q = query("products");
        q.wheres.push(WhereClause::Multi {
            column: "tags".into(),
            operator: MultiOperator::NotIn,
            values: vec![],
            boolean: Boolean::And,
        });
        let compiled = QueryGrammar::default().compile_select(&q).unwrap();
        assert!(!compiled.always_empty);
        assert_eq!(compiled.sql, "SELECT * FROM products");
    }

    fn basic(column: &str, value: i64, boolean: Boolean) -> WhereClause {
        WhereClause::Basic {
            column: column.into(),
            operator: "=".into(),
            value: SqlParam::Integer(value),
            boolean,
        }
    }

    fn empty_tags(boolean: Boolean) -> WhereClause {
        WhereClause::Multi {
            column: "tags".into(),
            operator: MultiOperator::In,
            values: vec![],
            boolean,
        }
    }

    #[test]
    fn test_empty_list_drops_its_and_group_only() {
        let mut q = query("products");
        q.wheres.push(basic("a", 1, Boolean::And));
        q.wheres.push(empty_tags(Boolean::And));
        q.wheres.push(basic("b", 2, Boolean::Or));
        let compiled = QueryGrammar::default().compile_select(&q).unwrap();
        assert!(!compiled.always_empty);
        assert_eq!(compiled.sql, "SELECT * FROM products WHERE b = ?");
        assert_eq!(compiled.bindings, vec![SqlParam::Integer(2)]);
    }

    #[test]
    fn test_empty_list_alone_in_or_branch() {
        let mut q = query("products");
        q.wheres.push(basic("a", 1, Boolean::And));
        q.wheres.push(empty_tags(Boolean::Or));
        q.wheres.push(basic("c", 3, Boolean::Or));
        let compiled = QueryGrammar::default().compile_select(&q).unwrap();
        assert!(!compiled.always_empty);
        assert_eq!(compiled.sql, "SELECT * FROM products WHERE a = ? OR c = ?");
        assert_eq!(
            compiled.bindings,
            vec![SqlParam::Integer(1), SqlParam::Integer(3)]
        );
    }

    #[test]
    fn test_every_or_branch_unsatisfiable() {
        let mut q = query("products");
        q.wheres.push(basic("a", 1, Boolean::And));
        q.wheres.push(empty_tags(Boolean::And));
        q.wheres.push(empty_tags(Boolean::Or));
        let compiled = QueryGrammar::default().compile_select(&q).unwrap();
        assert!(compiled.always_empty);
        assert!(compiled.bindings.is_empty());
    }

    #[test]
    fn test_vacuous_or_branch_removes_filter() {
        let mut q = query("products");
        q.wheres.push(basic("a", 1, Boolean::And));
        q.wheres.push(WhereClause::Multi {
            column: "tags".into(),
            operator: MultiOperator::NotIn,
            values: vec![],
            boolean: Boolean::Or,
        });
        let compiled = QueryGrammar::default().compile_select(&q).unwrap();
        assert!(!compiled.always_empty);
        assert_eq!(compiled.sql, "SELECT * FROM products");
        assert!(compiled.bindings.is_empty());
    }

    #[test]
    fn test_insert_multiple_rows() {
        let rows = vec![
            vec![
                ("id".to_string(), SqlParam::Integer(1)),
                ("tags".to_string(), SqlParam::Multi(vec![1, 2])),
            ],
            vec![
                ("tags".to_string(), SqlParam::Multi(vec![3])),
                ("id".to_string(), SqlParam::Integer(2)),
            ],
        ];
        let compiled = QueryGrammar::default()
            .compile_insert(&query("products"), &rows, InsertVerb::Replace)
            .unwrap();
        assert_eq!(
            compiled.sql,
            "REPLACE INTO products (id, tags) VALUES (?, ?), (?, ?)"
        );
        assert_eq!(compiled.bindings[2], SqlParam::Integer(2));
        assert_eq!(compiled.bindings[3], SqlParam::Multi(vec![3]));
    }

    #[test]
    fn test_insert_rejects_extra_column_in_later_row() {
        let rows = vec![
            vec![("id".to_string(), SqlParam::Integer(1))],
            vec![
                ("id".to_string(), SqlParam::Integer(2)),
                ("title".to_string(), SqlParam::Text("kept".into())),
            ],
        ];
        let err = QueryGrammar::default()
            .compile_insert(&query("products"), &rows, InsertVerb::Insert)
            .unwrap_err();
        assert!(matches!(err, SphinxError::Config(ref msg) if msg.contains("row 1")));
    }

    #[test]
    fn test_insert_rejects_missing_column_in_later_row() {
        let rows = vec![
            vec![
                ("id".to_string(), SqlParam::Integer(1)),
                ("title".to_string(), SqlParam::Text("first".into())),
            ],
            vec![("id".to_string(), SqlParam::Integer(2))],
        ];
        assert!(matches!(
            QueryGrammar::default().compile_insert(&query("products"), &rows, InsertVerb::Insert),
            Err(SphinxError::Config(_))
        ));

        let renamed = vec![
            vec![("id".to_string(), SqlParam::Integer(1))],
            vec![("title".to_string(), SqlParam::Text("second".into()))],
        ];
        assert!(QueryGrammar::default()
            .compile_insert(&query("products"), &renamed, InsertVerb::Insert)
            .is_err());
    }

    #[test]
    fn test_update_and_delete() {
        let mut q = query("products");
        q.wheres.push(WhereClause::Basic {
            column: "id".into(),
            operator: "=".into(),
            value: SqlParam::Integer(7),
            boolean: Boolean::And,
        });
        let grammar = QueryGrammar::default();

        let update = grammar
            .compile_update(&q, &[("tags".into(), SqlParam::Multi(vec![4]))])
            .unwrap();
        assert_eq!(update.sql, "UPDATE products SET tags = ? WHERE id = ?");
        assert_eq!(update.bindings.len(), 2);

        let delete = grammar.compile_delete(&q).unwrap();
        assert_eq!(delete.sql, "DELETE FROM products WHERE id = ?");

        let truncate = grammar.compile_truncate(&q).unwrap();
        assert_eq!(truncate.sql, "TRUNCATE RTINDEX products");
    }

    #[test]
    fn test_escape_match() {
        assert_eq!(escape_match("a-b (c)"), r"a\-b \(c\)");
        assert_eq!(escape_match("x@y|z"), r"x\@y\|z");
        assert_eq!(escape_match("plain"), "plain");
    }

    #[test]
    fn test_half_escape_match() {
        assert_eq!(half_escape_match("cats | dogs"), "cats | dogs");
        assert_eq!(half_escape_match("-excluded"), "-excluded");
        assert_eq!(half_escape_match("\"open phrase"), "\"open phrase\"");
        assert_eq!(half_escape_match("a -- b"), "a - b");
        assert_eq!(half_escape_match("Spider-Man"), r#""spider\-man""#);
        assert_eq!(half_escape_match("(x)"), r"\(x\)");
    }

    #[test]
    fn test_interpolate() {
        let sql = interpolate(
            "SELECT * FROM t WHERE a = ? AND b IN (?, ?) AND c = ?",
            &[
                SqlParam::Text("it's".into()),
                SqlParam::Integer(1),
                SqlParam::Boolean(true),
                SqlParam::Null,
            ],
        )
        .unwrap();
        assert_eq!(
            sql,
            r"SELECT * FROM t WHERE a = 'it\'s' AND b IN (1, 1) AND c = NULL"
        );
    }

    #[test]
    fn test_interpolate_skips_quoted_question_marks() {
        let sql = interpolate("SELECT '?' AS q FROM t WHERE id = ?", &[SqlParam::Integer(5)])
            .unwrap();
        assert_eq!(sql, "SELECT '?' AS q FROM t WHERE id = 5");
    }

    #[test]
    fn test_interpolate_multi_as_tuple() {
        let sql = interpolate("UPDATE t SET tags = ?", &[SqlParam::Multi(vec![1, 2, 3])]).unwrap();
        assert_eq!(sql, "UPDATE t SET tags = (1,2,3)");
    }

    #[test]
    fn test_interpolate_count_mismatch() {
        let err = interpolate("SELECT ?", &[]).unwrap_err();
        assert!(matches!(
            err,
            SphinxError::BindingMismatch {
                placeholders: 1,
                bindings: 0
            }
        ));
    }
}
