//! # oxide-query-sqlite
//!
//! SQLite execution backend for `oxide-query-core` statements, built on
//! `sqlx` and `tokio`.
//!
//! - [`SqliteExecutor`]: pool-backed [`AsyncSqlExecutor`]
//! - [`BlockingSqliteExecutor`]: [`SqlExecutor`] driving its own runtime
//! - [`SqliteTransaction`]: [`AsyncSqlExecutor`] whose operations run in
//!   issue order on one connection
//!
//! Cells come back as the core `SqlValue` matching the SQLite storage class
//! of each value (`INTEGER`, `REAL`, `TEXT`, `BLOB`, `NULL`).
//!
//! ## Example
//!
//! ```rust
//! use oxide_query_core::{Alias, SqlValue, ToSqlValue};
//! use oxide_query_derive::Table;
//! use oxide_query_sqlite::BlockingSqliteExecutor;
//!
//! #[derive(Table)]
//! pub struct Employee {
//!     #[column(primary_key)]
//!     id: i64,
//!     name: String,
//! }
//!
//! # fn main() {
//! let executor = BlockingSqliteExecutor::connect("sqlite::memory:").unwrap();
//! executor
//!     .execute("create table EMPLOYEE (ID integer primary key, NAME text not null)", vec![])
//!     .unwrap();
//! executor
//!     .execute("insert into EMPLOYEE values (?, ?)", vec![SqlValue::Int(1), "Fred".to_sql_value()])
//!     .unwrap();
//!
//! let s = Alias::<EmployeeTable>::new("s");
//! let fred = executor
//!     .database()
//!     .from(&s)
//!     .where_(Employee::name())
//!     .is_equal_to("Fred")
//!     .single(&executor)
//!     .unwrap();
//! assert_eq!(fred.id, 1);
//! # }
//! ```
//!
//! [`AsyncSqlExecutor`]: oxide_query_core::AsyncSqlExecutor
//! [`SqlExecutor`]: oxide_query_core::SqlExecutor

mod convert;
mod executor;
mod transaction;

pub use executor::{BlockingSqliteExecutor, SqliteExecutor};
pub use oxide_query_core::dialect::SqliteDialect;
pub use transaction::SqliteTransaction;
