//! Oracle dialect.

use super::{DataType, Dialect, Function, IsolationLevel, LockLevel};
use crate::value::SqlValue;

/// Oracle dialect.
///
/// Oracle rejects `as` between a table and its alias and has no local
/// temporary tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct OracleDialect;

impl OracleDialect {
    /// Creates a new Oracle dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn table_alias_separator(&self) -> &'static str {
        " "
    }

    fn temporary_table_name(&self, _name: &str) -> Option<String> {
        None
    }

    fn requires_order_by_in_row_number(&self) -> bool {
        true
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
            DataType::Boolean => "number(1)",
            DataType::Integer => "number(10)",
            DataType::BigInt => "number(19)",
            DataType::Double => "binary_double",
            DataType::Text => "varchar2(4000)",
            DataType::Blob => "blob",
        }
    }

    fn inline_literal(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
            other => other.to_sql_inline(),
        }
    }

    fn keep_locks_sql(&self, _level: Option<IsolationLevel>, lock: LockLevel) -> Option<String> {
        match lock {
            LockLevel::Share => None,
            LockLevel::Update | LockLevel::Exclusive => Some(String::from(" for update")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_alias_has_no_as() {
        assert_eq!(OracleDialect::new().table_alias_separator(), " ");
    }

    #[test]
    fn test_oracle_rejects_temp_tables_and_share_locks() {
        let dialect = OracleDialect::new();
        assert_eq!(dialect.temporary_table_name("WORK"), None);
        assert_eq!(dialect.keep_locks_sql(None, LockLevel::Share), None);
        assert!(dialect.requires_order_by_in_row_number());
    }
}
