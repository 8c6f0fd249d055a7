//! Scopes: the aliases visible at one point of statement construction.
//!
//! A [`Scope`] is immutable. Adding an alias with [`Scope::plus`] returns a new
//! scope, so references already resolved against an older scope stay valid
//! while the statement keeps growing. A sub-query scope created with
//! [`Scope::nested`] reads through to its outer scope but never adds aliases
//! to it.

mod alias;

use std::fmt;
use std::sync::Arc;

use tracing::trace;

pub use alias::{Alias, AnyAlias};
pub(crate) use alias::AliasSource;

use crate::database::Database;
use crate::error::{QueryError, Result};
use crate::schema::{ColumnInfo, Table};

/// How a column reference narrows the aliases it may resolve against.
#[derive(Clone, Debug)]
pub enum AliasHint {
    /// Any visible alias exposing the column.
    None,
    /// Only aliases with this display name.
    Name(String),
    /// Only this alias.
    Alias(AnyAlias),
}

impl AliasHint {
    fn admits(&self, alias: &AnyAlias) -> bool {
        match self {
            Self::None => true,
            Self::Name(name) => alias.display_name() == name,
            Self::Alias(expected) => expected.same(alias),
        }
    }
}

/// A column reference bound to exactly one alias.
#[derive(Clone, Debug)]
pub struct ResolvedColumn {
    alias: AnyAlias,
    column: ColumnInfo,
}

impl ResolvedColumn {
    /// The alias the column was bound to.
    #[must_use]
    pub const fn alias(&self) -> &AnyAlias {
        &self.alias
    }

    /// The column metadata.
    #[must_use]
    pub const fn column(&self) -> &ColumnInfo {
        &self.column
    }

    /// The alias-qualified SQL fragment, e.g. `s.NAME`.
    #[must_use]
    pub fn sql(&self) -> String {
        format!("{}.{}", self.alias.display_name(), self.column.name())
    }
}

impl PartialEq for ResolvedColumn {
    fn eq(&self, other: &Self) -> bool {
        self.alias.same(&other.alias) && self.column == other.column
    }
}

struct ScopeInner {
    database: Database,
    outer: Option<Scope>,
    aliases: Vec<AnyAlias>,
}

/// The set of aliases visible at a point in a statement, plus an optional
/// enclosing scope for correlated sub-queries.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    /// An empty top-level scope.
    #[must_use]
    pub fn new(database: &Database) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                database: database.clone(),
                outer: None,
                aliases: Vec::new(),
            }),
        }
    }

    /// An empty sub-query scope whose lookups fall back to `self`.
    #[must_use]
    pub fn nested(&self) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                database: self.inner.database.clone(),
                outer: Some(self.clone()),
                aliases: Vec::new(),
            }),
        }
    }

    /// A new scope with `alias` visible at this level.
    #[must_use]
    pub fn plus<R: Table>(&self, alias: &Alias<R>) -> Self {
        self.plus_any(alias.erased().clone())
    }

    pub(crate) fn plus_any(&self, alias: AnyAlias) -> Self {
        let mut aliases = self.inner.aliases.clone();
        aliases.push(alias);
        Self {
            inner: Arc::new(ScopeInner {
                database: self.inner.database.clone(),
                outer: self.inner.outer.clone(),
                aliases,
            }),
        }
    }

    /// The database statements in this scope render against.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.inner.database
    }

    /// The enclosing scope, if this is a sub-query scope.
    #[must_use]
    pub fn outer(&self) -> Option<&Self> {
        self.inner.outer.as_ref()
    }

    /// Returns true if `alias` is visible here or in an enclosing scope.
    #[must_use]
    pub fn contains(&self, alias: &AnyAlias) -> bool {
        self.levels().any(|level| level.inner.aliases.iter().any(|a| a.same(alias)))
    }

    /// Display names of every visible alias, nearest level first.
    #[must_use]
    pub fn visible_aliases(&self) -> Vec<String> {
        self.levels()
            .flat_map(|level| level.inner.aliases.iter().map(|a| String::from(a.display_name())))
            .collect()
    }

    /// Binds `column` to exactly one visible alias.
    ///
    /// Levels are searched nearest first. Within a level every alias admitted
    /// by `hint` that exposes the column is a candidate: one candidate binds,
    /// several are ambiguous, none moves the search to the enclosing scope.
    pub fn resolve(&self, column: &ColumnInfo, hint: &AliasHint) -> Result<ResolvedColumn> {
        for level in self.levels() {
            let mut candidates = level
                .inner
                .aliases
                .iter()
                .filter(|alias| hint.admits(alias) && alias.exposes(column));
            let Some(first) = candidates.next() else {
                continue;
            };
            let rest: Vec<&AnyAlias> = candidates.collect();
            if !rest.is_empty() {
                let candidates = std::iter::once(first)
                    .chain(rest)
                    .map(|a| String::from(a.display_name()))
                    .collect();
                return Err(QueryError::AmbiguousReference {
                    column: column.to_string(),
                    candidates,
                });
            }
            return Ok(ResolvedColumn {
                alias: first.clone(),
                column: *column,
            });
        }
        trace!(column = %column, hint = ?hint, "column not resolvable in scope");
        Err(QueryError::UnresolvedReference {
            column: column.to_string(),
            visible: self.visible_aliases(),
        })
    }

    fn levels(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |scope| scope.outer())
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("aliases", &self.inner.aliases)
            .field("outer", &self.inner.outer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures::{DepartmentTable, DeptName, EmpDept, EmpId, EmpName, EmployeeTable};

    fn scope() -> Scope {
        Scope::new(&Database::default())
    }

    #[test]
    fn test_resolves_unique_alias() {
        let s = Alias::<EmployeeTable>::new("s");
        let scope = scope().plus(&s);
        let resolved = scope.resolve(&ColumnInfo::of::<EmpName>(), &AliasHint::None).unwrap();
        assert_eq!(resolved.sql(), "s.NAME");
        assert!(resolved.alias().same(s.erased()));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let s = Alias::<EmployeeTable>::new("s");
        let scope = scope().plus(&s);
        let column = ColumnInfo::of::<EmpDept>();
        let first = scope.resolve(&column, &AliasHint::None).unwrap();
        let second = scope.resolve(&column, &AliasHint::None).unwrap();
        assert_eq!(first, second);

        let missing = ColumnInfo::of::<DeptName>();
        let a = scope.resolve(&missing, &AliasHint::None).unwrap_err();
        let b = scope.resolve(&missing, &AliasHint::None).unwrap_err();
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_unresolved_lists_visible_aliases() {
        let s = Alias::<EmployeeTable>::new("s");
        let scope = scope().plus(&s);
        let err = scope
            .resolve(&ColumnInfo::of::<DeptName>(), &AliasHint::None)
            .unwrap_err();
        match err {
            QueryError::UnresolvedReference { column, visible } => {
                assert_eq!(column, "DEPARTMENT.NAME");
                assert_eq!(visible, vec![String::from("s")]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_two_aliases_of_same_table_are_ambiguous() {
        let s = Alias::<EmployeeTable>::new("s");
        let m = Alias::<EmployeeTable>::new("m");
        let scope = scope().plus(&s).plus(&m);
        let err = scope.resolve(&ColumnInfo::of::<EmpId>(), &AliasHint::None).unwrap_err();
        match err {
            QueryError::AmbiguousReference { candidates, .. } => {
                assert_eq!(candidates, vec![String::from("s"), String::from("m")]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_hints_narrow_resolution() {
        let s = Alias::<EmployeeTable>::new("s");
        let m = Alias::<EmployeeTable>::new("m");
        let scope = scope().plus(&s).plus(&m);
        let column = ColumnInfo::of::<EmpId>();

        let by_name = scope.resolve(&column, &AliasHint::Name(String::from("m"))).unwrap();
        assert!(by_name.alias().same(m.erased()));

        let by_alias = scope
            .resolve(&column, &AliasHint::Alias(s.erased().clone()))
            .unwrap();
        assert!(by_alias.alias().same(s.erased()));
    }

    #[test]
    fn test_alias_hint_must_be_visible() {
        let s = Alias::<EmployeeTable>::new("s");
        let stranger = Alias::<EmployeeTable>::new("s");
        let scope = scope().plus(&s);
        let err = scope
            .resolve(
                &ColumnInfo::of::<EmpId>(),
                &AliasHint::Alias(stranger.erased().clone()),
            )
            .unwrap_err();
        assert!(matches!(err, QueryError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_nested_scope_prefers_nearest_level() {
        let outer_alias = Alias::<EmployeeTable>::new("o");
        let inner_alias = Alias::<EmployeeTable>::new("i");
        let outer = scope().plus(&outer_alias);
        let inner = outer.nested().plus(&inner_alias);

        let resolved = inner.resolve(&ColumnInfo::of::<EmpId>(), &AliasHint::None).unwrap();
        assert!(resolved.alias().same(inner_alias.erased()));
        assert_eq!(inner.visible_aliases(), vec!["i", "o"]);
    }

    #[test]
    fn test_nested_scope_falls_back_to_outer_for_reads() {
        let d = Alias::<DepartmentTable>::new("d");
        let e = Alias::<EmployeeTable>::new("e");
        let outer = scope().plus(&d);
        let inner = outer.nested().plus(&e);

        let resolved = inner.resolve(&ColumnInfo::of::<DeptName>(), &AliasHint::None).unwrap();
        assert_eq!(resolved.sql(), "d.NAME");
        // the inner alias never leaks outwards
        assert!(!outer.contains(e.erased()));
        assert!(inner.contains(d.erased()));
    }

    #[test]
    fn test_plus_leaves_original_untouched() {
        let s = Alias::<EmployeeTable>::new("s");
        let base = scope();
        let grown = base.plus(&s);
        assert!(base.visible_aliases().is_empty());
        assert_eq!(grown.visible_aliases(), vec!["s"]);
    }
}
