//! The execution collaborator.
//!
//! Statements never talk to a database themselves. A terminal operation
//! renders SQL and arguments and hands them, together with a row mapper, to
//! an executor implementing one of the traits below. Backends live in their
//! own crates (see `oxide-query-sqlite`).

use futures::future::BoxFuture;

use crate::error::Result;
use crate::row::Row;
use crate::value::SqlValue;

/// Converts one physical row into a typed result.
pub type RowMapper<T> = fn(&Row) -> Result<T>;

/// Runs a statement and blocks until every row has been mapped.
pub trait SqlExecutor {
    /// Executes `sql` with positional `args` and maps each returned row.
    fn query<T>(&self, sql: &str, args: &[SqlValue], mapper: RowMapper<T>) -> Result<Vec<T>>;
}

/// Runs a statement asynchronously.
///
/// Independently issued queries are not ordered with respect to each other
/// unless the executor says otherwise; a transaction handle, for instance,
/// runs them in issue order. Dropping the returned future cancels the query
/// as far as the backend allows.
pub trait AsyncSqlExecutor: Send + Sync {
    /// Executes `sql` with positional `args` and maps each returned row.
    fn query_async<'a, T: Send + 'static>(
        &'a self,
        sql: String,
        args: Vec<SqlValue>,
        mapper: RowMapper<T>,
    ) -> BoxFuture<'a, Result<Vec<T>>>;
}

