//! MySQL / MariaDB dialect.

use super::{DataType, Dialect, IsolationLevel, LockLevel};

/// MySQL dialect: `concat(...)` instead of `||` and MySQL cast targets.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn concat_operator(&self) -> Option<&'static str> {
        None
    }

    fn cast_type(&self, data_type: DataType) -> &'static str {
        match data_type {
            DataType::Boolean | DataType::Integer | DataType::BigInt => "signed",
            DataType::Double => "double",
            DataType::Text => "char",
            DataType::Blob => "binary",
        }
    }

    fn pagination_sql(&self, fetch_first: Option<u64>, offset: Option<u64>, _ordered: bool) -> String {
        match (fetch_first, offset) {
            (Some(n), Some(offset)) => format!(" limit {n} offset {offset}"),
            (Some(n), None) => format!(" limit {n}"),
            // MySQL has no OFFSET without LIMIT
            (None, Some(offset)) => format!(" limit {} offset {offset}", u64::MAX),
            (None, None) => String::new(),
        }
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
    fn test_mysql_uses_concat_function() {
        assert_eq!(MySqlDialect::new().concat_operator(), None);
    }

    #[test]
    fn test_mysql_cast_targets() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.cast_type(DataType::BigInt), "signed");
        assert_eq!(dialect.cast_type(DataType::Text), "char");
    }

    #[test]
    fn test_mysql_offset_without_limit() {
        assert_eq!(
            MySqlDialect::new().pagination_sql(None, Some(3), true),
            " limit 18446744073709551615 offset 3"
        );
    }
}
