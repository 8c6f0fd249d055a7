//! # oxide-query-core
//!
//! Typed, composable SQL query construction.
//!
//! This crate provides:
//! - A static catalog of tables and columns (usually generated with
//!   `#[derive(Table)]` from `oxide-query-derive`)
//! - Aliases and scopes: every column reference is resolved to exactly one
//!   visible alias, with correlated sub-queries reading enclosing scopes
//! - A precedence-aware expression model with positional arguments
//! - A type-state SELECT builder that only admits legal clause orders and
//!   tracks the Rust type of each result row
//! - Dialects for ANSI, PostgreSQL, MySQL, SQLite, SQL Server, Oracle, DB2
//!   and Derby
//!
//! Statements never talk to a database themselves; terminals hand SQL,
//! arguments and a row mapper to a [`SqlExecutor`] or [`AsyncSqlExecutor`].
//!
//! ## Building a statement
//!
//! ```rust
//! use oxide_query_core::{Alias, Database, SqlValue};
//! use oxide_query_core::dialect::PostgresDialect;
//! use oxide_query_derive::Table;
//!
//! #[derive(Table)]
//! #[table(name = "EMP")]
//! pub struct Employee {
//!     #[column(primary_key)]
//!     id: i64,
//!     name: String,
//!     salary: f64,
//! }
//!
//! #[derive(Table)]
//! #[table(schema = "HR")]
//! pub struct Bonus {
//!     employee_id: i64,
//!     amount: f64,
//! }
//!
//! # fn main() {
//! let e = Alias::<EmployeeTable>::new("e");
//! let b = Alias::<BonusTable>::new("b");
//! let database = Database::new(PostgresDialect::new());
//!
//! let (sql, args) = database
//!     .from(&e)
//!     .left_join(&b)
//!     .on(Bonus::employee_id())
//!     .is_equal_to(Employee::id())
//!     .where_(Employee::salary())
//!     .is_greater_than(1000.0_f64)
//!     .order_by(Employee::name())
//!     .fetch_first(10)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "select e.*, b.* from EMP as e left join HR.BONUS as b on b.EMPLOYEE_ID = e.ID \
//!      where e.SALARY > $1 order by e.NAME limit 10"
//! );
//! assert_eq!(args, vec![SqlValue::Float(1000.0)]);
//! # }
//! ```
//!
//! Values are always bound as arguments unless wrapped in
//! [`expression::literal`], so user input never reaches the SQL text.

pub mod database;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod expression;
mod render;
pub mod row;
pub mod schema;
pub mod scope;
pub mod statement;
pub mod value;

pub use database::{Database, DatabaseBuilder, DatabaseConfig};
pub use dialect::{Dialect, DialectKind, IsolationLevel, LockLevel};
pub use error::{QueryError, Result};
pub use executor::{AsyncSqlExecutor, RowMapper, SqlExecutor};
pub use expression::{
    condition, exists, literal, not_exists, value, Condition, Operand, Typed, TypedExpression,
};
pub use row::{FromRow, Row};
pub use schema::{Column, ColumnSchema, DataType, SqlType, Table};
pub use scope::{Alias, AnyAlias, Scope};
pub use statement::{Select, Subquery};
pub use value::{FromSqlValue, SqlValue, ToSqlValue};
