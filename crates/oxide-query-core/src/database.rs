//! Shared database configuration: dialect plus default schema.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::dialect::{AnsiDialect, Dialect, DialectKind};
use crate::error::{QueryError, Result};
use crate::schema::{Table, TableInfo};
use crate::scope::{Alias, Scope};
use crate::statement::{ExpectingJoin, Select};

struct DatabaseInner {
    dialect: Box<dyn Dialect>,
    default_schema: Option<String>,
}

/// An immutable, cheaply clonable handle on the configuration every statement
/// renders against.
///
/// # Example
///
/// ```rust
/// use oxide_query_core::Database;
/// use oxide_query_core::dialect::PostgresDialect;
///
/// let database = Database::builder()
///     .dialect(PostgresDialect::new())
///     .default_schema("AP")
///     .build();
/// assert_eq!(database.dialect().name(), "postgres");
/// assert_eq!(database.default_schema(), Some("AP"));
/// ```
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Creates a database with `dialect` and no default schema.
    pub fn new(dialect: impl Dialect + 'static) -> Self {
        Self::builder().dialect(dialect).build()
    }

    /// Starts a [`DatabaseBuilder`].
    #[must_use]
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::default()
    }

    /// Creates a database from a deserialized [`DatabaseConfig`].
    #[must_use]
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            inner: Arc::new(DatabaseInner {
                dialect: config.dialect.dialect(),
                default_schema: config.default_schema.clone(),
            }),
        }
    }

    /// The dialect statements render with.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.inner.dialect.as_ref()
    }

    /// The schema used for tables that do not declare one.
    #[must_use]
    pub fn default_schema(&self) -> Option<&str> {
        self.inner.default_schema.as_deref()
    }

    /// The schema-qualified name of `table` as this database spells it.
    #[must_use]
    pub fn qualified_table_name(&self, table: TableInfo) -> String {
        let schema = table.schema().or_else(|| self.default_schema());
        self.dialect().qualified_table_name(schema, table.name())
    }

    /// Starts a SELECT statement reading from `alias`.
    pub fn from<R: Table>(&self, alias: &Alias<R>) -> Select<(R::Row,), ExpectingJoin> {
        Select::start(Scope::new(self), alias)
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("dialect", &self.dialect().name())
            .field("default_schema", &self.default_schema())
            .finish()
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new(AnsiDialect::new())
    }
}

/// Builder for [`Database`].
#[derive(Default)]
pub struct DatabaseBuilder {
    dialect: Option<Box<dyn Dialect>>,
    default_schema: Option<String>,
}

impl DatabaseBuilder {
    /// Sets the dialect. Defaults to [`AnsiDialect`].
    #[must_use]
    pub fn dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Some(Box::new(dialect));
        self
    }

    /// Sets the schema used for tables that do not declare one.
    #[must_use]
    pub fn default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    /// Builds the database handle.
    #[must_use]
    pub fn build(self) -> Database {
        Database {
            inner: Arc::new(DatabaseInner {
                dialect: self
                    .dialect
                    .unwrap_or_else(|| Box::new(AnsiDialect::new())),
                default_schema: self.default_schema,
            }),
        }
    }
}

/// Serializable database configuration.
///
/// ```rust
/// use oxide_query_core::{Database, DatabaseConfig};
///
/// let config = DatabaseConfig::from_json(r#"{"dialect": "db2", "default_schema": "AP"}"#).unwrap();
/// let database = Database::from_config(&config);
/// assert_eq!(database.dialect().name(), "db2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// Which dialect to render.
    pub dialect: DialectKind,
    /// Schema for tables that do not declare one.
    #[serde(default)]
    pub default_schema: Option<String>,
}

impl DatabaseConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| QueryError::Configuration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures::{DepartmentTable, EmployeeTable};

    #[test]
    fn test_default_database_is_ansi() {
        let database = Database::default();
        assert_eq!(database.dialect().name(), "ansi");
        assert_eq!(database.default_schema(), None);
    }

    #[test]
    fn test_declared_schema_wins_over_default() {
        let database = Database::builder().default_schema("AP").build();
        assert_eq!(
            database.qualified_table_name(TableInfo::of::<EmployeeTable>()),
            "AP.EMPLOYEE"
        );
        assert_eq!(
            database.qualified_table_name(TableInfo::of::<DepartmentTable>()),
            "HR.DEPARTMENT"
        );
    }

    #[test]
    fn test_config_without_schema() {
        let config = DatabaseConfig::from_json(r#"{"dialect": "postgres"}"#).unwrap();
        assert_eq!(config.default_schema, None);
        assert_eq!(Database::from_config(&config).dialect().name(), "postgres");
    }

    #[test]
    fn test_config_rejects_unknown_dialect() {
        let err = DatabaseConfig::from_json(r#"{"dialect": "firebird"}"#).unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));
    }

    #[test]
    fn test_database_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Database>();
    }
}
