//! Transactions.

use futures::future::BoxFuture;
use oxide_query_core::executor::RowMapper;
use oxide_query_core::{AsyncSqlExecutor, QueryError, Result, SqlValue};
use sqlx::{Sqlite, Transaction};
use tokio::sync::Mutex;
use tracing::debug;

use crate::convert::{execute, fetch};

/// A transaction on one pooled connection.
///
/// Operations issued through the same handle run one at a time, in the order
/// they were issued. `commit` and `rollback` consume the handle; dropping it
/// without either rolls the transaction back.
pub struct SqliteTransaction {
    tx: Mutex<Transaction<'static, Sqlite>>,
}

impl SqliteTransaction {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        debug!("Transaction started");
        Self { tx: Mutex::new(tx) }
    }

    /// Runs a statement that returns no rows inside the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Executor`] if SQLite rejects the statement.
    pub async fn execute(&self, sql: &str, args: Vec<SqlValue>) -> Result<u64> {
        let mut tx = self.tx.lock().await;
        execute(&mut **tx, sql, args).await
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Executor`] if the commit fails.
    pub async fn commit(self) -> Result<()> {
        self.tx
            .into_inner()
            .commit()
            .await
            .map_err(QueryError::executor)?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Executor`] if the rollback fails.
    pub async fn rollback(self) -> Result<()> {
        self.tx
            .into_inner()
            .rollback()
            .await
            .map_err(QueryError::executor)?;
        debug!("Transaction rolled back");
        Ok(())
    }
}

impl std::fmt::Debug for SqliteTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTransaction").finish_non_exhaustive()
    }
}

impl AsyncSqlExecutor for SqliteTransaction {
    fn query_async<'a, T: Send + 'static>(
        &'a self,
        sql: String,
        args: Vec<SqlValue>,
        mapper: RowMapper<T>,
    ) -> BoxFuture<'a, Result<Vec<T>>> {
        Box::pin(async move {
            let mut tx = self.tx.lock().await;
            fetch(&mut **tx, &sql, args, mapper).await
        })
    }
}
