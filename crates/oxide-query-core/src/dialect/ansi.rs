//! ANSI SQL dialect.

use super::Dialect;

/// A generic SQL dialect using ANSI SQL standards.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnsiDialect;

impl AnsiDialect {
    /// Creates a new ANSI dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for AnsiDialect {
    fn name(&self) -> &'static str {
        "ansi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{IsolationLevel, LockLevel};

    #[test]
    fn test_ansi_dialect() {
        let dialect = AnsiDialect::new();
        assert_eq!(dialect.name(), "ansi");
        assert_eq!(dialect.parameter_placeholder(3), "?");
        assert_eq!(dialect.concat_operator(), Some("||"));
        assert!(dialect.supports_partition_by_in_olap());
        assert!(dialect.supports_order_by_in_olap());
        assert!(!dialect.requires_order_by_in_row_number());
    }

    #[test]
    fn test_ansi_has_no_in_query_isolation() {
        let dialect = AnsiDialect::new();
        assert_eq!(dialect.isolation_level_sql(IsolationLevel::Serializable), None);
        assert_eq!(dialect.keep_locks_sql(None, LockLevel::Update), None);
    }
}
