//! Apache Derby dialect.

use super::db2::{with_isolation, with_kept_locks};
use super::{DataType, Dialect, IsolationLevel, LockLevel};

/// Derby dialect.
///
/// Derby window functions take neither PARTITION BY nor ORDER BY; both are
/// dropped when rendering.
#[derive(Debug, Default, Clone, Copy)]
pub struct DerbyDialect;

impl DerbyDialect {
    /// Creates a new Derby dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for DerbyDialect {
    fn name(&self) -> &'static str {
        "derby"
    }

    fn temporary_table_name(&self, name: &str) -> Option<String> {
        Some(format!("session.{name}"))
    }

    fn supports_partition_by_in_olap(&self) -> bool {
        false
    }

    fn supports_order_by_in_olap(&self) -> bool {
        false
    }

    fn cast_type(&self, data_type: DataType) -> &'static str {
        match data_type {
            DataType::Boolean => "boolean",
            DataType::Integer => "integer",
            DataType::BigInt => "bigint",
            DataType::Double => "double",
            DataType::Text => "varchar(4000)",
            DataType::Blob => "blob",
        }
    }

    fn isolation_level_sql(&self, level: IsolationLevel) -> Option<String> {
        Some(with_isolation(level))
    }

    fn keep_locks_sql(&self, level: Option<IsolationLevel>, lock: LockLevel) -> Option<String> {
        Some(with_kept_locks(level, lock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derby_has_no_window_clauses() {
        let dialect = DerbyDialect::new();
        assert!(!dialect.supports_partition_by_in_olap());
        assert!(!dialect.supports_order_by_in_olap());
    }
}
