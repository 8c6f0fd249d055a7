//! IBM DB2 dialect.

use super::{DataType, Dialect, Function, IsolationLevel, LockLevel};

/// DB2 dialect: `with ur|cs|rs|rr` isolation clauses and `session.` temp tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct Db2Dialect;

impl Db2Dialect {
    /// Creates a new DB2 dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Isolation suffix shared by DB2 and Derby.
pub(super) fn with_isolation(level: IsolationLevel) -> String {
    String::from(match level {
        IsolationLevel::UncommittedRead => " with ur",
        IsolationLevel::ReadCommitted => " with cs",
        IsolationLevel::RepeatableRead => " with rs",
        IsolationLevel::Serializable => " with rr",
    })
}

/// Lock-keeping suffix shared by DB2 and Derby.
pub(super) fn with_kept_locks(level: Option<IsolationLevel>, lock: LockLevel) -> String {
    let isolation = match level {
        Some(IsolationLevel::Serializable) => "rr",
        _ => "rs",
    };
    format!(" for read only with {isolation} use and keep {lock} locks")
}

impl Dialect for Db2Dialect {
    fn name(&self) -> &'static str {
        "db2"
    }

    fn temporary_table_name(&self, name: &str) -> Option<String> {
        Some(format!("session.{name}"))
    }

    fn function_name(&self, function: Function) -> &'static str {
        match function {
            Function::Length => "length",
            Function::Substring => "substr",
            other => other.ansi_name(),
        }
    }

    fn cast_type(&self, data_type: DataType) -> &'static str {
        match data_type {
            DataType::Boolean => "smallint",
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
    fn test_db2_isolation_levels() {
        let dialect = Db2Dialect::new();
        let rendered: Vec<String> = [
            IsolationLevel::UncommittedRead,
            IsolationLevel::ReadCommitted,
            IsolationLevel::RepeatableRead,
            IsolationLevel::Serializable,
        ]
        .into_iter()
        .filter_map(|level| dialect.isolation_level_sql(level))
        .collect();
        assert_eq!(rendered, vec![" with ur", " with cs", " with rs", " with rr"]);
    }

    #[test]
    fn test_db2_keep_locks() {
        let dialect = Db2Dialect::new();
        assert_eq!(
            dialect.keep_locks_sql(Some(IsolationLevel::Serializable), LockLevel::Exclusive).as_deref(),
            Some(" for read only with rr use and keep exclusive locks")
        );
        assert_eq!(
            dialect.keep_locks_sql(None, LockLevel::Share).as_deref(),
            Some(" for read only with rs use and keep share locks")
        );
    }

    #[test]
    fn test_db2_temp_tables_live_in_session() {
        assert_eq!(
            Db2Dialect::new().temporary_table_name("WORK").as_deref(),
            Some("session.WORK")
        );
    }
}
