//! Table aliases: one bound occurrence of a relation in a FROM/JOIN tree.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::Result;
use crate::expression::AliasColumn;
use crate::schema::{Column, ColumnInfo, Table, TableInfo};
use crate::statement::{Complete, Query, Select, Shape};

use super::AliasHint;

#[derive(Debug)]
pub(crate) enum AliasSource {
    Table,
    Temporary,
    Derived(Query),
    /// A common table expression, declared in the outermost WITH clause.
    Common(Query),
}

#[derive(Debug)]
struct AliasInner {
    name: Option<String>,
    table: TableInfo,
    source: AliasSource,
}

/// An alias with its row type erased.
///
/// Identity is by reference: two aliases of the same table with the same
/// display name are still different aliases.
#[derive(Clone)]
pub struct AnyAlias {
    inner: Arc<AliasInner>,
}

impl AnyAlias {
    /// The name columns are qualified with: the explicit alias name, or the
    /// table name for an unnamed alias.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.inner.name.as_deref().unwrap_or(self.inner.table.name())
    }

    /// The explicit alias name, if one was given.
    #[must_use]
    pub fn explicit_name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// The relation this alias ranges over.
    #[must_use]
    pub fn table(&self) -> TableInfo {
        self.inner.table
    }

    /// Returns true if both handles denote the same alias.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns true if `column` belongs to the relation behind this alias.
    #[must_use]
    pub fn exposes(&self, column: &ColumnInfo) -> bool {
        column.table() == self.inner.table
    }

    pub(crate) fn source(&self) -> &AliasSource {
        &self.inner.source
    }
}

impl fmt::Debug for AnyAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.inner.table.name(), self.display_name())
    }
}

/// A typed alias over the relation `R`.
///
/// # Example
///
/// ```rust
/// use oxide_query_core::{Alias, Database};
/// # use oxide_query_core::schema::{ColumnSchema, Table};
/// # struct Employee;
/// # struct EmployeeTable;
/// # impl Table for EmployeeTable {
/// #     type Row = Employee;
/// #     const NAME: &'static str = "EMPLOYEE";
/// #     const COLUMNS: &'static [ColumnSchema] = &[];
/// #     const PRIMARY_KEY: Option<&'static str> = None;
/// # }
///
/// let s = Alias::<EmployeeTable>::new("s");
/// let t = Alias::<EmployeeTable>::new("s");
/// assert_eq!(s.name(), t.name());
/// assert!(!s.same(&t));
/// ```
pub struct Alias<R: Table> {
    any: AnyAlias,
    _table: PhantomData<fn() -> R>,
}

impl<R: Table> Alias<R> {
    fn with(name: Option<String>, source: AliasSource) -> Self {
        Self {
            any: AnyAlias {
                inner: Arc::new(AliasInner {
                    name,
                    table: TableInfo::of::<R>(),
                    source,
                }),
            },
            _table: PhantomData,
        }
    }

    /// Creates an alias with an explicit display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with(Some(name.into()), AliasSource::Table)
    }

    /// Creates an alias that renders as the bare table name.
    #[must_use]
    pub fn unnamed() -> Self {
        Self::with(None, AliasSource::Table)
    }

    /// Creates an alias over the local temporary table declared by `R`.
    pub fn temporary(name: impl Into<String>) -> Self {
        Self::with(Some(name.into()), AliasSource::Temporary)
    }

    /// Creates an alias over a derived table: `(select ...) as name`.
    ///
    /// The sub-select must produce rows of `R`. Any error recorded while it
    /// was being built is returned here.
    pub fn derived<Sh, S>(select: Select<Sh, S>, name: impl Into<String>) -> Result<Self>
    where
        Sh: Shape<Row = R::Row>,
        S: Complete,
    {
        let query = select.into_query()?;
        Ok(Self::with(Some(name.into()), AliasSource::Derived(query)))
    }

    /// Creates an alias over a common table expression. The sub-select is
    /// declared once as `with name as (select ...)` ahead of the outermost
    /// statement that uses it, however deeply the alias is nested, and
    /// referred to by `name` everywhere else.
    pub fn common<Sh, S>(select: Select<Sh, S>, name: impl Into<String>) -> Result<Self>
    where
        Sh: Shape<Row = R::Row>,
        S: Complete,
    {
        let query = select.into_query()?;
        Ok(Self::with(Some(name.into()), AliasSource::Common(query)))
    }

    /// The alias-qualified reference to column `C`.
    #[must_use]
    pub fn col<C: Column<Table = R>>(&self, _column: C) -> AliasColumn<C> {
        AliasColumn::new(AliasHint::Alias(self.any.clone()))
    }

    /// The display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.any.display_name()
    }

    /// Returns true if both handles denote the same alias.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        self.any.same(&other.any)
    }

    /// The type-erased handle.
    #[must_use]
    pub const fn erased(&self) -> &AnyAlias {
        &self.any
    }
}

impl<R: Table> Clone for Alias<R> {
    fn clone(&self) -> Self {
        Self {
            any: self.any.clone(),
            _table: PhantomData,
        }
    }
}

impl<R: Table> fmt::Debug for Alias<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.any, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fixtures::{EmpId, EmployeeTable};

    #[test]
    fn test_unnamed_alias_uses_table_name() {
        let alias = Alias::<EmployeeTable>::unnamed();
        assert_eq!(alias.name(), "EMPLOYEE");
        assert_eq!(alias.erased().explicit_name(), None);
    }

    #[test]
    fn test_identity_is_by_reference() {
        let s = Alias::<EmployeeTable>::new("s");
        let copy = s.clone();
        let other = Alias::<EmployeeTable>::new("s");
        assert!(s.same(&copy));
        assert!(!s.same(&other));
    }

    #[test]
    fn test_erased_alias_reports_its_table() {
        let s = Alias::<EmployeeTable>::new("s");
        assert_eq!(s.erased().table().name(), "EMPLOYEE");
        assert_eq!(s.erased().table(), TableInfo::of::<EmployeeTable>());
    }

    #[test]
    fn test_alias_exposes_its_own_columns() {
        let s = Alias::<EmployeeTable>::new("s");
        assert!(s.erased().exposes(&ColumnInfo::of::<EmpId>()));
        assert!(!s
            .erased()
            .exposes(&ColumnInfo::of::<crate::schema::fixtures::DeptId>()));
    }
}
