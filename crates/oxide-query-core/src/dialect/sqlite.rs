//! SQLite dialect implementation.

use super::{DataType, Dialect, Function};

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn function_name(&self, function: Function) -> &'static str {
        match function {
            Function::Length => "length",
            Function::Substring => "substr",
            other => other.ansi_name(),
        }
    }

    fn cast_type(&self, data_type: DataType) -> &'static str {
        // SQLite only knows type affinities
        match data_type {
            DataType::Boolean | DataType::Integer | DataType::BigInt => "integer",
            DataType::Double => "real",
            DataType::Text => "text",
            DataType::Blob => "blob",
        }
    }

    fn pagination_sql(&self, fetch_first: Option<u64>, offset: Option<u64>, _ordered: bool) -> String {
        match (fetch_first, offset) {
            (Some(n), Some(offset)) => format!(" limit {n} offset {offset}"),
            (Some(n), None) => format!(" limit {n}"),
            (None, Some(offset)) => format!(" limit -1 offset {offset}"),
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::LockLevel;

    #[test]
    fn test_sqlite_dialect() {
        let dialect = SqliteDialect::new();
        assert_eq!(dialect.name(), "sqlite");
        assert_eq!(dialect.parameter_placeholder(1), "?");
        assert_eq!(dialect.function_name(Function::Substring), "substr");
        assert_eq!(dialect.cast_type(DataType::Double), "real");
    }

    #[test]
    fn test_sqlite_cannot_keep_locks() {
        assert_eq!(SqliteDialect::new().keep_locks_sql(None, LockLevel::Update), None);
    }

    #[test]
    fn test_sqlite_offset_without_limit() {
        assert_eq!(SqliteDialect::new().pagination_sql(None, Some(4), false), " limit -1 offset 4");
    }
}
