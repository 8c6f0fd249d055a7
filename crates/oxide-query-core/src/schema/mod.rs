//! Statically declared table and column catalog.
//!
//! This module provides traits that are implemented by the `#[derive(Table)]`
//! macro. Each struct field becomes a zero-sized column type, so a column
//! accessor is a value whose type carries the owning table, the Rust type and
//! the SQL name. No runtime reflection is involved.

use std::any::TypeId;
use std::fmt;

use crate::expression::NamedColumn;
use crate::scope::AliasHint;

/// Logical SQL data types, mapped to concrete type names by each dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean.
    Boolean,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// Double precision float.
    Double,
    /// Variable length text.
    Text,
    /// Binary data.
    Blob,
}

/// Rust types with a fixed SQL data type.
pub trait SqlType {
    /// The data type the column is declared with.
    const DATA_TYPE: DataType;
}

macro_rules! impl_sql_type {
    ($($ty:ty => $dt:ident),* $(,)?) => {
        $(
            impl SqlType for $ty {
                const DATA_TYPE: DataType = DataType::$dt;
            }
        )*
    };
}

impl_sql_type!(
    bool => Boolean,
    i32 => Integer,
    i64 => BigInt,
    f64 => Double,
    String => Text,
    Vec<u8> => Blob,
);

impl<T: SqlType> SqlType for Option<T> {
    const DATA_TYPE: DataType = T::DATA_TYPE;
}

/// Static column descriptor, one per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSchema {
    /// SQL column name.
    pub name: &'static str,
    /// Declared data type.
    pub data_type: DataType,
    /// Whether the column is nullable.
    pub nullable: bool,
    /// Whether the column is (part of) the primary key.
    pub primary_key: bool,
}

/// Trait for table metadata.
///
/// Implemented by types generated from `#[derive(Table)]`.
pub trait Table: 'static {
    /// The row type (the original struct).
    type Row;

    /// The SQL table name.
    const NAME: &'static str;

    /// The schema the table lives in, if not the database default.
    const SCHEMA: Option<&'static str> = None;

    /// All columns, in declaration order.
    const COLUMNS: &'static [ColumnSchema];

    /// The primary key column name, if any.
    const PRIMARY_KEY: Option<&'static str>;
}

/// Trait for column metadata.
///
/// Implemented by the zero-sized column types generated from
/// `#[derive(Table)]`. A column value used in a clause is a *bare accessor*:
/// it is resolved against whichever alias of its table is visible.
pub trait Column: Copy + 'static {
    /// The table this column belongs to.
    type Table: Table;

    /// The Rust type of this column.
    type Type;

    /// The SQL column name.
    const NAME: &'static str;

    /// The declared data type.
    const DATA_TYPE: DataType;

    /// Whether this column is nullable.
    const NULLABLE: bool;

    /// Whether this column is the primary key.
    const PRIMARY_KEY: bool;

    /// Restricts resolution to the alias with the given display name.
    fn of(self, alias: impl Into<String>) -> NamedColumn<Self> {
        NamedColumn::new(AliasHint::Name(alias.into()))
    }
}

/// Identity of a table type as seen by the resolver.
#[derive(Clone, Copy)]
pub struct TableInfo {
    id: TypeId,
    name: &'static str,
    schema: Option<&'static str>,
}

impl TableInfo {
    /// Returns the identity of `T`.
    #[must_use]
    pub fn of<T: Table>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::NAME,
            schema: T::SCHEMA,
        }
    }

    /// The SQL table name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The declared schema, if any.
    #[must_use]
    pub const fn schema(&self) -> Option<&'static str> {
        self.schema
    }
}

impl PartialEq for TableInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TableInfo {}

impl fmt::Debug for TableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Column metadata for a bare accessor: owning table, SQL name and type.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ColumnInfo {
    table: TableInfo,
    name: &'static str,
    data_type: DataType,
}

impl ColumnInfo {
    /// Resolves a column accessor type to its metadata.
    #[must_use]
    pub fn of<C: Column>() -> Self {
        Self {
            table: TableInfo::of::<C::Table>(),
            name: C::NAME,
            data_type: C::DATA_TYPE,
        }
    }

    /// The owning table.
    #[must_use]
    pub const fn table(&self) -> TableInfo {
        self.table
    }

    /// The SQL column name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The declared data type.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }
}

impl fmt::Display for ColumnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table.name, self.name)
    }
}

impl fmt::Debug for ColumnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{DepartmentTable, DeptId, EmpId, EmployeeTable};
    use super::*;

    #[test]
    fn test_column_info_resolves_owner() {
        let info = ColumnInfo::of::<EmpId>();
        assert_eq!(info.table(), TableInfo::of::<EmployeeTable>());
        assert_eq!(info.name(), "ID");
        assert_eq!(info.data_type(), DataType::BigInt);
        assert_eq!(info.to_string(), "EMPLOYEE.ID");
    }

    #[test]
    fn test_same_column_name_on_different_tables_differs() {
        assert_ne!(ColumnInfo::of::<EmpId>(), ColumnInfo::of::<DeptId>());
        assert_eq!(TableInfo::of::<DepartmentTable>().schema(), Some("HR"));
    }

    #[test]
    fn test_option_keeps_inner_sql_type() {
        assert_eq!(<Option<String> as SqlType>::DATA_TYPE, DataType::Text);
        assert_eq!(<i32 as SqlType>::DATA_TYPE, DataType::Integer);
    }
}
