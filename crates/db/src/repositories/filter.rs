//! Dynamic WHERE-clause assembly for list endpoints with optional filters.

use lao_cinema_core::types::Timestamp;
use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::Postgres;

/// Typed bind value for dynamically-built queries.
pub(crate) enum BindValue {
    BigInt(i64),
    Text(String),
    Timestamp(Timestamp),
}

/// Accumulates `AND`-joined conditions with positional placeholders.
#[derive(Default)]
pub(crate) struct Conditions {
    clauses: Vec<String>,
    values: Vec<BindValue>,
}

impl Conditions {
    /// Add a condition. Every `?` in `template` becomes the next `$n`
    /// placeholder, all bound to the same `value`.
    pub fn push(&mut self, template: &str, value: BindValue) {
        let placeholder = format!("${}", self.values.len() + 1);
        self.clauses.push(template.replace('?', &placeholder));
        self.values.push(value);
    }

    /// Add a condition that takes no bind value.
    pub fn push_static(&mut self, clause: &str) {
        self.clauses.push(clause.to_string());
    }

    /// `WHERE ...`, or an empty string when no conditions were added.
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Index of the next free placeholder (for LIMIT/OFFSET).
    pub fn next_index(&self) -> usize {
        self.values.len() + 1
    }

    pub fn bind_as<'q, O>(
        &'q self,
        mut q: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        for val in &self.values {
            match val {
                BindValue::BigInt(v) => q = q.bind(*v),
                BindValue::Text(v) => q = q.bind(v.as_str()),
                BindValue::Timestamp(v) => q = q.bind(*v),
            }
        }
        q
    }

    pub fn bind_scalar<'q>(
        &'q self,
        mut q: QueryScalar<'q, Postgres, i64, PgArguments>,
    ) -> QueryScalar<'q, Postgres, i64, PgArguments> {
        for val in &self.values {
            match val {
                BindValue::BigInt(v) => q = q.bind(*v),
                BindValue::Text(v) => q = q.bind(v.as_str()),
                BindValue::Timestamp(v) => q = q.bind(*v),
            }
        }
        q
    }
}

/// Escape `%` and `_` for use inside an `ILIKE` pattern.
pub(crate) fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
