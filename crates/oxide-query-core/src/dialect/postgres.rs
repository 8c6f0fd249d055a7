//! PostgreSQL dialect.

use super::{DataType, Dialect, IsolationLevel, LockLevel};

/// PostgreSQL dialect: numbered `$n` placeholders and `limit`/`offset`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn parameter_placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn cast_type(&self, data_type: DataType) -> &'static str {
        match data_type {
            DataType::Boolean => "boolean",
            DataType::Integer => "integer",
            DataType::BigInt => "bigint",
            DataType::Double => "double precision",
            DataType::Text => "text",
            DataType::Blob => "bytea",
        }
    }

    fn pagination_sql(&self, fetch_first: Option<u64>, offset: Option<u64>, _ordered: bool) -> String {
        let mut sql = String::new();
        if let Some(n) = fetch_first {
            sql.push_str(&format!(" limit {n}"));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" offset {offset}"));
        }
        sql
    }

    fn keep_locks_sql(&self, _level: Option<IsolationLevel>, lock: LockLevel) -> Option<String> {
        Some(String::from(match lock {
            LockLevel::Share => " for share",
            LockLevel::Update | LockLevel::Exclusive => " for update",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_placeholders_are_numbered() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.parameter_placeholder(1), "$1");
        assert_eq!(dialect.parameter_placeholder(12), "$12");
    }

    #[test]
    fn test_postgres_pagination_uses_limit() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.pagination_sql(Some(5), Some(10), false), " limit 5 offset 10");
        assert_eq!(dialect.pagination_sql(None, Some(10), false), " offset 10");
    }

    #[test]
    fn test_postgres_locks() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.keep_locks_sql(None, LockLevel::Share).as_deref(), Some(" for share"));
        assert_eq!(
            dialect.keep_locks_sql(None, LockLevel::Exclusive).as_deref(),
            Some(" for update")
        );
    }
}
