//! SQL Dialect support.
//!
//! Different databases have slightly different SQL syntax. A [`Dialect`] is a
//! stateless table of fragments and capability flags consulted while a
//! statement renders. The supported set is closed: one unit struct per
//! database, enumerated by [`DialectKind`].
//!
//! Unsupported features follow an explicit per-feature policy:
//!
//! | Feature                                    | Policy                     |
//! |--------------------------------------------|----------------------------|
//! | window `PARTITION BY` / `ORDER BY`         | omitted, logged at debug   |
//! | `row_number()` without a required ORDER BY | `UnsupportedDialectFeature`|
//! | isolation level not expressible in a query | omitted, logged at debug   |
//! | lock level not expressible in a query      | `UnsupportedDialectFeature`|
//! | local temporary tables                     | `UnsupportedDialectFeature`|

mod ansi;
mod db2;
mod derby;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod sqlserver;

use std::fmt;

use serde::Deserialize;

pub use ansi::AnsiDialect;
pub use db2::Db2Dialect;
pub use derby::DerbyDialect;
pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;

use crate::schema::DataType;
use crate::value::SqlValue;

/// Functions whose spelling varies between databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Upper,
    Lower,
    Length,
    Trim,
    Abs,
    Coalesce,
    Substring,
    RowNumber,
    Rank,
    DenseRank,
    FirstValue,
    LastValue,
    Lag,
    Lead,
}

impl Function {
    /// The ANSI spelling.
    #[must_use]
    pub const fn ansi_name(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
            Self::Upper => "upper",
            Self::Lower => "lower",
            Self::Length => "char_length",
            Self::Trim => "trim",
            Self::Abs => "abs",
            Self::Coalesce => "coalesce",
            Self::Substring => "substring",
            Self::RowNumber => "row_number",
            Self::Rank => "rank",
            Self::DenseRank => "dense_rank",
            Self::FirstValue => "first_value",
            Self::LastValue => "last_value",
            Self::Lag => "lag",
            Self::Lead => "lead",
        }
    }
}

/// Transaction isolation levels a query may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IsolationLevel {
    UncommittedRead,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

/// Locks a query may ask the database to keep on the rows it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockLevel {
    Share,
    Update,
    Exclusive,
}

impl fmt::Display for LockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Share => "share",
            Self::Update => "update",
            Self::Exclusive => "exclusive",
        })
    }
}

/// Trait for SQL dialect-specific behavior.
///
/// Every method is a pure function of its arguments; implementations carry no
/// state and are shared freely between threads.
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the placeholder for the 1-based parameter `index`.
    fn parameter_placeholder(&self, index: usize) -> String {
        let _ = index;
        String::from("?")
    }

    /// Qualifies a table name with its schema.
    fn qualified_table_name(&self, schema: Option<&str>, name: &str) -> String {
        match schema {
            Some(schema) if !schema.is_empty() => format!("{schema}.{name}"),
            _ => String::from(name),
        }
    }

    /// Text placed between a table and its alias in a FROM clause.
    fn table_alias_separator(&self) -> &'static str {
        " as "
    }

    /// Name for a local temporary table, or `None` if the database has none.
    fn temporary_table_name(&self, name: &str) -> Option<String> {
        Some(String::from(name))
    }

    /// Whether window functions accept `PARTITION BY`.
    fn supports_partition_by_in_olap(&self) -> bool {
        true
    }

    /// Whether window functions accept `ORDER BY`.
    fn supports_order_by_in_olap(&self) -> bool {
        true
    }

    /// Whether `row_number()` must carry an `ORDER BY`.
    fn requires_order_by_in_row_number(&self) -> bool {
        false
    }

    /// The spelling of `function`.
    fn function_name(&self, function: Function) -> &'static str {
        function.ansi_name()
    }

    /// The infix concatenation operator, or `None` when the dialect only
    /// offers a `concat(...)` function.
    fn concat_operator(&self) -> Option<&'static str> {
        Some("||")
    }

    /// Type name used by `cast(... as <type>)`.
    fn cast_type(&self, data_type: DataType) -> &'static str {
        match data_type {
            DataType::Boolean => "boolean",
            DataType::Integer => "integer",
            DataType::BigInt => "bigint",
            DataType::Double => "double precision",
            DataType::Text => "varchar(4000)",
            DataType::Blob => "blob",
        }
    }

    /// Renders a value inline.
    fn inline_literal(&self, value: &SqlValue) -> String {
        value.to_sql_inline()
    }

    /// Pagination suffix appended after ORDER BY.
    ///
    /// `ordered` tells whether the statement already has an ORDER BY.
    fn pagination_sql(&self, fetch_first: Option<u64>, offset: Option<u64>, ordered: bool) -> String {
        let _ = ordered;
        let mut sql = String::new();
        if let Some(offset) = offset {
            sql.push_str(&format!(" offset {offset} rows"));
        }
        if let Some(n) = fetch_first {
            sql.push_str(&format!(" fetch first {n} rows only"));
        }
        sql
    }

    /// Suffix requesting `level` for this query, or `None` if the database
    /// cannot express it inside a statement.
    fn isolation_level_sql(&self, level: IsolationLevel) -> Option<String> {
        let _ = level;
        None
    }

    /// Suffix asking the database to keep `lock` on the rows read, or `None`
    /// if the database cannot express it.
    fn keep_locks_sql(&self, level: Option<IsolationLevel>, lock: LockLevel) -> Option<String> {
        let _ = (level, lock);
        None
    }
}

/// The closed set of supported dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    Ansi,
    Postgres,
    MySql,
    Sqlite,
    SqlServer,
    Oracle,
    Db2,
    Derby,
}

impl DialectKind {
    /// Returns the dialect implementation for this kind.
    #[must_use]
    pub fn dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Ansi => Box::new(AnsiDialect::new()),
            Self::Postgres => Box::new(PostgresDialect::new()),
            Self::MySql => Box::new(MySqlDialect::new()),
            Self::Sqlite => Box::new(SqliteDialect::new()),
            Self::SqlServer => Box::new(SqlServerDialect::new()),
            Self::Oracle => Box::new(OracleDialect::new()),
            Self::Db2 => Box::new(Db2Dialect::new()),
            Self::Derby => Box::new(DerbyDialect::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_maps_to_its_dialect() {
        let names: Vec<&str> = [
            DialectKind::Ansi,
            DialectKind::Postgres,
            DialectKind::MySql,
            DialectKind::Sqlite,
            DialectKind::SqlServer,
            DialectKind::Oracle,
            DialectKind::Db2,
            DialectKind::Derby,
        ]
        .into_iter()
        .map(|kind| kind.dialect().name())
        .collect();
        assert_eq!(
            names,
            vec!["ansi", "postgres", "mysql", "sqlite", "sqlserver", "oracle", "db2", "derby"]
        );
    }

    #[test]
    fn test_dialect_kind_deserializes_lowercase() {
        let kind: DialectKind = serde_json::from_str("\"sqlserver\"").unwrap();
        assert_eq!(kind, DialectKind::SqlServer);
        assert!(serde_json::from_str::<DialectKind>("\"firebird\"").is_err());
    }

    #[test]
    fn test_default_pagination_is_ansi() {
        let dialect = AnsiDialect::new();
        assert_eq!(dialect.pagination_sql(Some(10), None, false), " fetch first 10 rows only");
        assert_eq!(
            dialect.pagination_sql(Some(10), Some(20), true),
            " offset 20 rows fetch first 10 rows only"
        );
        assert_eq!(dialect.pagination_sql(None, None, true), "");
    }

    #[test]
    fn test_qualified_table_name_skips_empty_schema() {
        let dialect = AnsiDialect::new();
        assert_eq!(dialect.qualified_table_name(Some("AP"), "INVOICE"), "AP.INVOICE");
        assert_eq!(dialect.qualified_table_name(Some(""), "INVOICE"), "INVOICE");
        assert_eq!(dialect.qualified_table_name(None, "INVOICE"), "INVOICE");
    }
}
