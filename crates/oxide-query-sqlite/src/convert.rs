//! Conversions between core values and sqlx's SQLite types.

use oxide_query_core::executor::RowMapper;
use oxide_query_core::{QueryError, Result, Row, SqlValue};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row as _, Sqlite, TypeInfo, ValueRef};
use tracing::debug;

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Binds a `SqlValue` parameter to a query.
fn bind_param(query: SqliteQuery<'_>, value: SqlValue) -> SqliteQuery<'_> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
    }
}

fn prepare(sql: &str, args: Vec<SqlValue>) -> SqliteQuery<'_> {
    debug!(sql = %sql, args = args.len(), "Executing SQL");
    args.into_iter().fold(sqlx::query(sql), bind_param)
}

/// Reads one cell by the storage class of the value actually returned.
fn cell(row: &SqliteRow, index: usize) -> std::result::Result<SqlValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let storage = raw.type_info().name().to_ascii_uppercase();
    Ok(match storage.as_str() {
        "INTEGER" | "INT" | "INT8" | "BIGINT" | "BOOLEAN" => SqlValue::Int(row.try_get_unchecked(index)?),
        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => SqlValue::Float(row.try_get_unchecked(index)?),
        "BLOB" => SqlValue::Blob(row.try_get_unchecked(index)?),
        _ => SqlValue::Text(row.try_get_unchecked(index)?),
    })
}

/// Converts a physical SQLite row into a core [`Row`].
pub(crate) fn to_row(row: &SqliteRow) -> Result<Row> {
    (0..row.len())
        .map(|index| cell(row, index))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(Row::new)
        .map_err(QueryError::executor)
}

/// Runs a query and maps every returned row.
pub(crate) async fn fetch<'c, E, T>(
    executor: E,
    sql: &str,
    args: Vec<SqlValue>,
    mapper: RowMapper<T>,
) -> Result<Vec<T>>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let rows = prepare(sql, args)
        .fetch_all(executor)
        .await
        .map_err(QueryError::executor)?;
    rows.iter().map(|row| mapper(&to_row(row)?)).collect()
}

/// Runs a statement that returns no rows and reports the rows affected.
pub(crate) async fn execute<'c, E>(executor: E, sql: &str, args: Vec<SqlValue>) -> Result<u64>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let result = prepare(sql, args)
        .execute(executor)
        .await
        .map_err(QueryError::executor)?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_cells_follow_storage_class() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let rows = fetch(
            &pool,
            "select 1, 2.5, 'x', x'0102', null, ?",
            vec![SqlValue::Bool(true)],
            |row| Ok(row.clone()),
        )
        .await
        .unwrap();
        assert_eq!(
            rows[0].values(),
            &[
                SqlValue::Int(1),
                SqlValue::Float(2.5),
                SqlValue::Text(String::from("x")),
                SqlValue::Blob(vec![1, 2]),
                SqlValue::Null,
                SqlValue::Int(1),
            ]
        );
    }
}
