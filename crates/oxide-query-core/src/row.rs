//! Physical rows and typed row decoding.

use crate::error::{QueryError, Result};
use crate::value::{FromSqlValue, SqlValue};

/// One result row as handed back by an executor: a value per projected
/// column, in projection order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates a row from its cell values.
    #[must_use]
    pub const fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The cell at `index`.
    pub fn get(&self, index: usize) -> Result<&SqlValue> {
        self.values.get(index).ok_or_else(|| {
            QueryError::RowMapping(format!(
                "column index {index} out of range for row of {} columns",
                self.values.len()
            ))
        })
    }

    /// All cells.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

impl From<Vec<SqlValue>> for Row {
    fn from(values: Vec<SqlValue>) -> Self {
        Self::new(values)
    }
}

/// Types decodable from a contiguous run of cells.
///
/// Scalars take one cell, table rows (see `#[derive(Table)]`) take one cell
/// per column, and tuples concatenate their members. `Option<T>` decodes to
/// `None` when every cell `T` would read is NULL, which is how the nullable
/// side of an outer join comes back.
pub trait FromRow: Sized {
    /// Number of cells consumed.
    const WIDTH: usize;

    /// Decodes `Self` from the cells starting at `offset`.
    fn from_row(row: &Row, offset: usize) -> Result<Self>;
}

impl<T: FromSqlValue> FromRow for T {
    const WIDTH: usize = 1;

    fn from_row(row: &Row, offset: usize) -> Result<Self> {
        T::from_sql_value(row.get(offset)?)
    }
}

impl<T: FromRow> FromRow for Option<T> {
    const WIDTH: usize = T::WIDTH;

    fn from_row(row: &Row, offset: usize) -> Result<Self> {
        let mut all_null = true;
        for index in offset..offset + T::WIDTH {
            all_null &= row.get(index)?.is_null();
        }
        if all_null {
            Ok(None)
        } else {
            T::from_row(row, offset).map(Some)
        }
    }
}

macro_rules! impl_from_row_tuple {
    ($($name:ident),+) => {
        impl<$($name: FromRow),+> FromRow for ($($name,)+) {
            const WIDTH: usize = 0 $(+ $name::WIDTH)+;

            fn from_row(row: &Row, offset: usize) -> Result<Self> {
                let mut _at = offset;
                Ok(($(
                    {
                        let value = $name::from_row(row, _at)?;
                        _at += $name::WIDTH;
                        value
                    },
                )+))
            }
        }
    };
}

impl_from_row_tuple!(A, B);
impl_from_row_tuple!(A, B, C);
impl_from_row_tuple!(A, B, C, D);
impl_from_row_tuple!(A, B, C, D, E);
impl_from_row_tuple!(A, B, C, D, E, F);

/// Decodes a whole row as `T`, rejecting rows of the wrong width.
pub fn decode<T: FromRow>(row: &Row) -> Result<T> {
    if row.len() != T::WIDTH {
        return Err(QueryError::RowMapping(format!(
            "expected {} columns but the row has {}",
            T::WIDTH,
            row.len()
        )));
    }
    T::from_row(row, 0)
}
