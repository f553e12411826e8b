//! Query predicate builder
//!
//! Listing queries are composed from independently-optional criteria.
//! Instead of assembling SQL fragments ad hoc at every call site, a
//! filter is a sequence of tagged predicate variants combined with AND
//! semantics; it renders its `WHERE` clause and yields its bind
//! arguments in matching order. An absent criterion simply contributes
//! no predicate.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

/// A bindable query argument
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Date(DateTime<Utc>),
}

impl Arg {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// A single filter condition
#[derive(Debug, Clone)]
pub enum Predicate {
    /// `<column> = ?`
    Equals(&'static str, Arg),
    /// `LOWER(<column>) LIKE ?` - case-insensitive substring match
    Contains(&'static str, String),
    /// Disjunction of case-insensitive substring matches over several columns
    AnyContains(&'static [&'static str], String),
    /// `<column> IN (?, ...)`; an empty set matches nothing
    InSet(&'static str, Vec<Arg>),
    /// `<column> >= ? AND <column> < ?` - half-open range
    Between(&'static str, Arg, Arg),
    /// `EXISTS (<subquery>)` with a single bound argument
    Exists(&'static str, Arg),
}

impl Predicate {
    fn sql(&self) -> String {
        match self {
            Predicate::Equals(column, _) => format!("{} = ?", column),
            Predicate::Contains(column, _) => format!("LOWER({}) LIKE ?", column),
            Predicate::AnyContains(columns, _) => {
                let clauses: Vec<String> = columns
                    .iter()
                    .map(|column| format!("LOWER({}) LIKE ?", column))
                    .collect();
                format!("({})", clauses.join(" OR "))
            }
            Predicate::InSet(column, args) => {
                if args.is_empty() {
                    // An empty IN set is invalid SQL; match nothing instead
                    "1 = 0".to_string()
                } else {
                    let placeholders = vec!["?"; args.len()].join(", ");
                    format!("{} IN ({})", column, placeholders)
                }
            }
            Predicate::Between(column, _, _) => format!("{} >= ? AND {} < ?", column, column),
            Predicate::Exists(subquery, _) => format!("EXISTS ({})", subquery),
        }
    }

    fn collect_args(&self, out: &mut Vec<Arg>) {
        match self {
            Predicate::Equals(_, arg) => out.push(arg.clone()),
            Predicate::Contains(_, needle) => out.push(like_pattern(needle)),
            Predicate::AnyContains(columns, needle) => {
                for _ in columns.iter() {
                    out.push(like_pattern(needle));
                }
            }
            Predicate::InSet(_, args) => out.extend(args.iter().cloned()),
            Predicate::Between(_, low, high) => {
                out.push(low.clone());
                out.push(high.clone());
            }
            Predicate::Exists(_, arg) => out.push(arg.clone()),
        }
    }
}

fn like_pattern(needle: &str) -> Arg {
    Arg::Text(format!("%{}%", needle.to_lowercase()))
}

/// An AND-combined sequence of predicates
#[derive(Debug, Clone, Default)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate (builder form)
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Add a predicate in place
    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Render the `WHERE ...` clause, or an empty string for an empty filter
    pub fn where_clause(&self) -> String {
        if self.predicates.is_empty() {
            return String::new();
        }
        let clauses: Vec<String> = self.predicates.iter().map(Predicate::sql).collect();
        format!("WHERE {}", clauses.join(" AND "))
    }

    /// Bind arguments in clause order
    pub fn args(&self) -> Vec<Arg> {
        let mut out = Vec::new();
        for predicate in &self.predicates {
            predicate.collect_args(&mut out);
        }
        out
    }
}

/// Bind a filter's arguments onto a prepared query
pub fn bind_args<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    args: Vec<Arg>,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    let mut query = query;
    for arg in args {
        query = match arg {
            Arg::Int(value) => query.bind(value),
            Arg::Float(value) => query.bind(value),
            Arg::Text(value) => query.bind(value),
            Arg::Bool(value) => query.bind(value),
            Arg::Date(value) => query.bind(value),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_renders_nothing() {
        let filter = Filter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.where_clause(), "");
        assert!(filter.args().is_empty());
    }

    #[test]
    fn test_conjunction_order() {
        let filter = Filter::new()
            .and(Predicate::Equals("p.status", Arg::text("published")))
            .and(Predicate::Equals("c.slug", Arg::text("gorillas")));

        assert_eq!(
            filter.where_clause(),
            "WHERE p.status = ? AND c.slug = ?"
        );
        assert_eq!(
            filter.args(),
            vec![Arg::text("published"), Arg::text("gorillas")]
        );
    }

    #[test]
    fn test_any_contains_expands_per_column() {
        let filter = Filter::new().and(Predicate::AnyContains(
            &["p.title", "p.excerpt", "p.body"],
            "Volcano".to_string(),
        ));

        assert_eq!(
            filter.where_clause(),
            "WHERE (LOWER(p.title) LIKE ? OR LOWER(p.excerpt) LIKE ? OR LOWER(p.body) LIKE ?)"
        );
        assert_eq!(
            filter.args(),
            vec![
                Arg::text("%volcano%"),
                Arg::text("%volcano%"),
                Arg::text("%volcano%"),
            ]
        );
    }

    #[test]
    fn test_in_set() {
        let filter = Filter::new().and(Predicate::InSet(
            "b.status",
            vec![Arg::text("confirmed"), Arg::text("completed")],
        ));
        assert_eq!(filter.where_clause(), "WHERE b.status IN (?, ?)");
    }

    #[test]
    fn test_empty_in_set_matches_nothing() {
        let filter = Filter::new().and(Predicate::InSet("b.status", Vec::new()));
        assert_eq!(filter.where_clause(), "WHERE 1 = 0");
        assert!(filter.args().is_empty());
    }

    #[test]
    fn test_between_is_half_open() {
        let low = Arg::Int(10);
        let high = Arg::Int(20);
        let filter = Filter::new().and(Predicate::Between("b.created_at", low, high));
        assert_eq!(
            filter.where_clause(),
            "WHERE b.created_at >= ? AND b.created_at < ?"
        );
        assert_eq!(filter.args().len(), 2);
    }

    #[test]
    fn test_exists_subquery() {
        let filter = Filter::new().and(Predicate::Exists(
            "SELECT 1 FROM post_tags pt WHERE pt.post_id = p.id AND pt.tag_id = ?",
            Arg::Int(7),
        ));
        assert_eq!(
            filter.where_clause(),
            "WHERE EXISTS (SELECT 1 FROM post_tags pt WHERE pt.post_id = p.id AND pt.tag_id = ?)"
        );
        assert_eq!(filter.args(), vec![Arg::Int(7)]);
    }
}
