//! Error types for statement construction and execution.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while building, rendering or executing a statement.
///
/// Construction-time variants are recorded by the builder the first time they
/// occur and returned by every rendering or terminal operation afterwards,
/// before any SQL is produced or any executor is contacted.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// A column accessor matched no alias visible in scope.
    #[error("unable to resolve column {column}: no visible alias exposes it (visible aliases: {})", .visible.join(", "))]
    UnresolvedReference {
        /// The column that was being resolved, as `TABLE.COLUMN`.
        column: String,
        /// Every alias visible from the point of resolution, nearest first.
        visible: Vec<String>,
    },

    /// More than one visible alias exposes the column and no hint narrowed it.
    #[error("column {column} is ambiguous between aliases {}", .candidates.join(", "))]
    AmbiguousReference {
        /// The column that was being resolved, as `TABLE.COLUMN`.
        column: String,
        /// The aliases that all matched.
        candidates: Vec<String>,
    },

    /// `is_in` / `is_not_in` was given no values.
    #[error("IN list for {column} is empty")]
    EmptyInList {
        /// The rendered left operand, as far as it is known.
        column: String,
    },

    /// A join predicate does not reference the alias it joins.
    #[error("join condition for alias {alias} does not reference it")]
    InvalidJoin {
        /// The alias being joined.
        alias: String,
    },

    /// The active dialect cannot express a feature whose omission would
    /// change the meaning of the statement.
    #[error("{dialect} does not support {feature}")]
    UnsupportedDialectFeature {
        /// Dialect name.
        dialect: &'static str,
        /// Human-readable feature description.
        feature: String,
    },

    /// `single` or `optional` got more rows than allowed.
    #[error("expected at most one row but got {count}")]
    TooManyRows {
        /// Number of rows actually returned.
        count: usize,
    },

    /// `single` got no rows.
    #[error("expected exactly one row but got none")]
    NoSuchRow,

    /// A physical row could not be decoded into the requested type.
    #[error("row mapping error: {0}")]
    RowMapping(String),

    /// Database configuration could not be loaded.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The execution backend failed; the cause is passed through unchanged.
    #[error("executor error: {0}")]
    Executor(#[source] Arc<dyn StdError + Send + Sync>),
}

impl QueryError {
    /// Wraps a backend error.
    pub fn executor(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Executor(Arc::new(err))
    }

    /// Builds an [`QueryError::UnsupportedDialectFeature`].
    pub fn unsupported(dialect: &'static str, feature: impl Into<String>) -> Self {
        Self::UnsupportedDialectFeature {
            dialect,
            feature: feature.into(),
        }
    }

    /// Returns true for errors raised while building or rendering a
    /// statement, as opposed to execution-time failures.
    #[must_use]
    pub const fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedReference { .. }
                | Self::AmbiguousReference { .. }
                | Self::EmptyInList { .. }
                | Self::InvalidJoin { .. }
                | Self::UnsupportedDialectFeature { .. }
        )
    }
}

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_message_lists_visible_aliases() {
        let err = QueryError::UnresolvedReference {
            column: String::from("EMPLOYEE.NAME"),
            visible: vec![String::from("d"), String::from("p")],
        };
        assert_eq!(
            err.to_string(),
            "unable to resolve column EMPLOYEE.NAME: no visible alias exposes it (visible aliases: d, p)"
        );
    }

    #[test]
    fn test_construction_errors_are_classified() {
        assert!(QueryError::EmptyInList {
            column: String::from("s.ID")
        }
        .is_construction_error());
        assert!(!QueryError::NoSuchRow.is_construction_error());
        assert!(!QueryError::TooManyRows { count: 2 }.is_construction_error());
    }

    #[test]
    fn test_executor_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = QueryError::executor(io);
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "executor error: disk on fire");
    }
}
