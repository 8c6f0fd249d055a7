//! Pool-backed executors.

use futures::future::BoxFuture;
use oxide_query_core::dialect::SqliteDialect;
use oxide_query_core::executor::RowMapper;
use oxide_query_core::{AsyncSqlExecutor, Database, QueryError, Result, SqlExecutor, SqlValue};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::convert::{execute, fetch};
use crate::transaction::SqliteTransaction;

/// Asynchronous executor over a SQLite connection pool.
///
/// Queries issued concurrently through one executor may run on different
/// pooled connections and complete in any order. Use a
/// [`SqliteTransaction`] when ordering matters.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    pool: SqlitePool,
    database: Database,
}

impl SqliteExecutor {
    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            database: Database::new(SqliteDialect::new()),
        }
    }

    /// Opens a pool for `url`.
    ///
    /// An in-memory database (`sqlite::memory:`) is private to one
    /// connection, so the pool is limited to a single connection for it.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Executor`] if the database cannot be opened.
    pub async fn connect(url: &str) -> Result<Self> {
        let mut options = SqlitePoolOptions::new();
        if url.contains(":memory:") {
            options = options.max_connections(1);
        }
        let pool = options.connect(url).await.map_err(QueryError::executor)?;
        debug!(url = %url, "Opened SQLite pool");
        Ok(Self::new(pool))
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The [`Database`] statements for this executor render against.
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.database
    }

    /// Runs a statement that returns no rows (DDL, inserts, updates).
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Executor`] if SQLite rejects the statement.
    pub async fn execute(&self, sql: &str, args: Vec<SqlValue>) -> Result<u64> {
        execute(&self.pool, sql, args).await
    }

    /// Starts a transaction on one pooled connection.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Executor`] if no connection can be acquired.
    pub async fn begin(&self) -> Result<SqliteTransaction> {
        let tx = self.pool.begin().await.map_err(QueryError::executor)?;
        Ok(SqliteTransaction::new(tx))
    }
}

impl AsyncSqlExecutor for SqliteExecutor {
    fn query_async<'a, T: Send + 'static>(
        &'a self,
        sql: String,
        args: Vec<SqlValue>,
        mapper: RowMapper<T>,
    ) -> BoxFuture<'a, Result<Vec<T>>> {
        Box::pin(async move { fetch(&self.pool, &sql, args, mapper).await })
    }
}

/// Blocking executor: a [`SqliteExecutor`] driven by its own runtime.
///
/// Every call blocks the current thread until the query finishes, so it must
/// not be used from inside an async context.
#[derive(Debug)]
pub struct BlockingSqliteExecutor {
    runtime: Runtime,
    inner: SqliteExecutor,
}

impl BlockingSqliteExecutor {
    /// Opens a pool for `url` on a private current-thread runtime.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Executor`] if the runtime cannot be started or
    /// the database cannot be opened.
    pub fn connect(url: &str) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(QueryError::executor)?;
        let inner = runtime.block_on(SqliteExecutor::connect(url))?;
        Ok(Self { runtime, inner })
    }

    /// The asynchronous executor this one drives.
    #[must_use]
    pub const fn inner(&self) -> &SqliteExecutor {
        &self.inner
    }

    /// The [`Database`] statements for this executor render against.
    #[must_use]
    pub const fn database(&self) -> &Database {
        self.inner.database()
    }

    /// Runs a statement that returns no rows.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Executor`] if SQLite rejects the statement.
    pub fn execute(&self, sql: &str, args: Vec<SqlValue>) -> Result<u64> {
        self.runtime.block_on(self.inner.execute(sql, args))
    }
}

impl SqlExecutor for BlockingSqliteExecutor {
    fn query<T>(&self, sql: &str, args: &[SqlValue], mapper: RowMapper<T>) -> Result<Vec<T>> {
        self.runtime
            .block_on(fetch(self.inner.pool(), sql, args.to_vec(), mapper))
    }
}
