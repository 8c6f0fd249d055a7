//! Microsoft SQL Server dialect.

use super::{DataType, Dialect, Function};
use crate::value::SqlValue;

/// SQL Server dialect.
///
/// Local temporary tables are prefixed with `#`, `row_number()` requires an
/// ORDER BY, and booleans are rendered as `1`/`0`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlServerDialect;

impl SqlServerDialect {
    /// Creates a new SQL Server dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn temporary_table_name(&self, name: &str) -> Option<String> {
        Some(format!("#{name}"))
    }

    fn requires_order_by_in_row_number(&self) -> bool {
        true
    }

    fn function_name(&self, function: Function) -> &'static str {
        match function {
            Function::Length => "len",
            other => other.ansi_name(),
        }
    }

    fn concat_operator(&self) -> Option<&'static str> {
        None
    }

    fn cast_type(&self, data_type: DataType) -> &'static str {
        match data_type {
            DataType::Boolean => "bit",
            DataType::Integer => "int",
            DataType::BigInt => "bigint",
            DataType::Double => "float",
            DataType::Text => "nvarchar(max)",
            DataType::Blob => "varbinary(max)",
        }
    }

    fn inline_literal(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
            other => other.to_sql_inline(),
        }
    }

    fn pagination_sql(&self, fetch_first: Option<u64>, offset: Option<u64>, ordered: bool) -> String {
        if fetch_first.is_none() && offset.is_none() {
            return String::new();
        }
        // OFFSET/FETCH is only legal after an ORDER BY
        let mut sql = String::from(if ordered { "" } else { " order by (select null)" });
        sql.push_str(&format!(" offset {} rows", offset.unwrap_or(0)));
        if let Some(n) = fetch_first {
            sql.push_str(&format!(" fetch next {n} rows only"));
        }
        sql
    }
}
