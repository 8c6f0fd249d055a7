//! Window (OLAP) functions.
//!
//! A window function is built with a small grammar of its own:
//!
//! ```text
//! row_number()                       ExpectingPartitionBy
//!     .partition_by(a).then(b)       InPartitionByExpectingThen
//!     .order_by(c).then_desc(d)      InOrderByExpectingThen
//! ```
//!
//! Both clauses are optional. The accumulated lists are frozen when the
//! window is used as an expression.
//!
//! Dialects that cannot express `PARTITION BY` or `ORDER BY` inside `OVER`
//! get the function with the unsupported part left out:
//!
//! ```rust
//! use oxide_query_core::expression::olap;
//! # use oxide_query_core::schema::{Column, ColumnSchema, DataType, Table};
//! # struct Sale; struct SaleTable;
//! # impl Table for SaleTable {
//! #     type Row = Sale;
//! #     const NAME: &'static str = "SALE";
//! #     const COLUMNS: &'static [ColumnSchema] = &[];
//! #     const PRIMARY_KEY: Option<&'static str> = None;
//! # }
//! # #[derive(Clone, Copy)] struct Amount;
//! # impl Column for Amount {
//! #     type Table = SaleTable; type Type = f64;
//! #     const NAME: &'static str = "AMOUNT"; const DATA_TYPE: DataType = DataType::Double;
//! #     const NULLABLE: bool = false; const PRIMARY_KEY: bool = false;
//! # }
//! # #[derive(Clone, Copy)] struct Region;
//! # impl Column for Region {
//! #     type Table = SaleTable; type Type = String;
//! #     const NAME: &'static str = "REGION"; const DATA_TYPE: DataType = DataType::Text;
//! #     const NULLABLE: bool = false; const PRIMARY_KEY: bool = false;
//! # }
//! use oxide_query_core::{Alias, Database};
//! use oxide_query_core::dialect::DerbyDialect;
//!
//! let s = Alias::<SaleTable>::new("s");
//! let sql = Database::new(DerbyDialect::new())
//!     .from(&s)
//!     .select(olap::sum(Amount).partition_by(Region))
//!     .sql()
//!     .unwrap();
//! assert_eq!(sql, "select sum(s.AMOUNT) over () as c1 from SALE as s");
//! ```

use std::marker::PhantomData;

use crate::dialect::Function;
use crate::error::QueryError;

use super::typed::{Numeric, Typed, TypedExpression};
use super::{Expr, OrderItem, WindowCall};

// Typestate markers
/// Marker: nothing added to `OVER (...)` yet.
pub struct ExpectingPartitionBy;
/// Marker: inside `PARTITION BY`; more expressions may follow with `then`.
pub struct InPartitionByExpectingThen;
/// Marker: inside `ORDER BY`; more entries may follow with `then` / `then_desc`.
pub struct InOrderByExpectingThen;

/// A window function producing `T`, in grammar state `S`.
#[must_use]
pub struct Window<T, S> {
    call: WindowCall,
    error: Option<QueryError>,
    _state: PhantomData<fn() -> (T, S)>,
}

impl<T, S> Window<T, S> {
    fn transition<To>(self) -> Window<T, To> {
        Window {
            call: self.call,
            error: self.error,
            _state: PhantomData,
        }
    }

    fn push_partition<X: Typed>(mut self, x: X) -> Self {
        let (expr, error) = x.into_expression().into_parts();
        self.error = self.error.or(error);
        self.call.partition_by.push(expr);
        self
    }

    fn push_order<X: Typed>(mut self, x: X, descending: bool) -> Self {
        let (expr, error) = x.into_expression().into_parts();
        self.error = self.error.or(error);
        self.call.order_by.push(OrderItem { expr, descending });
        self
    }
}

impl<T> Window<T, ExpectingPartitionBy> {
    fn new(function: Function, args: Vec<TypedExpression<()>>) -> Self {
        let mut error = None;
        let args = args
            .into_iter()
            .map(|arg| {
                let (expr, e) = arg.into_parts();
                error = error.take().or(e);
                expr
            })
            .collect();
        Self {
            call: WindowCall {
                function,
                args,
                partition_by: Vec::new(),
                order_by: Vec::new(),
            },
            error,
            _state: PhantomData,
        }
    }

    /// `partition by x`
    pub fn partition_by<X: Typed>(self, x: X) -> Window<T, InPartitionByExpectingThen> {
        self.push_partition(x).transition()
    }

    /// `order by x`
    pub fn order_by<X: Typed>(self, x: X) -> Window<T, InOrderByExpectingThen> {
        self.push_order(x, false).transition()
    }

    /// `order by x desc`
    pub fn order_by_desc<X: Typed>(self, x: X) -> Window<T, InOrderByExpectingThen> {
        self.push_order(x, true).transition()
    }
}

impl<T> Window<T, InPartitionByExpectingThen> {
    /// Adds another partitioning expression.
    pub fn then<X: Typed>(self, x: X) -> Self {
        self.push_partition(x)
    }

    /// `order by x`
    pub fn order_by<X: Typed>(self, x: X) -> Window<T, InOrderByExpectingThen> {
        self.push_order(x, false).transition()
    }

    /// `order by x desc`
    pub fn order_by_desc<X: Typed>(self, x: X) -> Window<T, InOrderByExpectingThen> {
        self.push_order(x, true).transition()
    }
}

impl<T> Window<T, InOrderByExpectingThen> {
    /// Adds another ascending ordering entry.
    pub fn then<X: Typed>(self, x: X) -> Self {
        self.push_order(x, false)
    }

    /// Adds another descending ordering entry.
    pub fn then_desc<X: Typed>(self, x: X) -> Self {
        self.push_order(x, true)
    }
}

impl<T, S> Typed for Window<T, S> {
    type Type = T;

    fn into_expression(self) -> TypedExpression<T> {
        TypedExpression::with_error(Expr::Window(Box::new(self.call)), self.error)
    }
}

fn over<X: Typed, T>(function: Function, x: X) -> Window<T, ExpectingPartitionBy> {
    Window::new(function, vec![x.into_expression().retype()])
}

/// `row_number() over (...)`
pub fn row_number() -> Window<i64, ExpectingPartitionBy> {
    Window::new(Function::RowNumber, Vec::new())
}

/// `rank() over (...)`
pub fn rank() -> Window<i64, ExpectingPartitionBy> {
    Window::new(Function::Rank, Vec::new())
}

/// `dense_rank() over (...)`
pub fn dense_rank() -> Window<i64, ExpectingPartitionBy> {
    Window::new(Function::DenseRank, Vec::new())
}

/// `sum(x) over (...)`
pub fn sum<X>(x: X) -> Window<X::Type, ExpectingPartitionBy>
where
    X: Typed,
    X::Type: Numeric,
{
    over(Function::Sum, x)
}

/// `avg(x) over (...)`
pub fn avg<X>(x: X) -> Window<f64, ExpectingPartitionBy>
where
    X: Typed,
    X::Type: Numeric,
{
    over(Function::Avg, x)
}

/// `count(x) over (...)`
pub fn count<X: Typed>(x: X) -> Window<i64, ExpectingPartitionBy> {
    over(Function::Count, x)
}

/// `min(x) over (...)`
pub fn min<X: Typed>(x: X) -> Window<X::Type, ExpectingPartitionBy> {
    over(Function::Min, x)
}

/// `max(x) over (...)`
pub fn max<X: Typed>(x: X) -> Window<X::Type, ExpectingPartitionBy> {
    over(Function::Max, x)
}

/// `first_value(x) over (...)`
pub fn first_value<X: Typed>(x: X) -> Window<X::Type, ExpectingPartitionBy> {
    over(Function::FirstValue, x)
}

/// `last_value(x) over (...)`
pub fn last_value<X: Typed>(x: X) -> Window<X::Type, ExpectingPartitionBy> {
    over(Function::LastValue, x)
}

/// `lag(x) over (...)`
pub fn lag<X: Typed>(x: X) -> Window<X::Type, ExpectingPartitionBy> {
    over(Function::Lag, x)
}

/// `lead(x) over (...)`
pub fn lead<X: Typed>(x: X) -> Window<X::Type, ExpectingPartitionBy> {
    over(Function::Lead, x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::dialect::{Db2Dialect, DerbyDialect, OracleDialect};
    use crate::error::Result;
    use crate::render::SqlWriter;
    use crate::schema::fixtures::{EmpDept, EmpId, EmpName, EmpSalary, EmployeeTable};
    use crate::scope::{Alias, Scope};

    fn render_on<X: Typed>(database: &Database, x: X) -> Result<String> {
        let s = Alias::<EmployeeTable>::new("s");
        let scope = Scope::new(database).plus(&s);
        let (expr, error) = x.into_expression().into_parts();
        assert!(error.is_none());
        let mut w = SqlWriter::new(database);
        expr.bind(&scope)?.render(&mut w)?;
        Ok(w.finish().0)
    }

    #[test]
    fn test_full_window_clause() {
        let w = rank()
            .partition_by(EmpDept)
            .then(EmpName)
            .order_by_desc(EmpSalary)
            .then(EmpId);
        assert_eq!(
            render_on(&Database::default(), w).unwrap(),
            "rank() over (partition by s.DEPT, s.NAME order by s.SALARY desc, s.ID)"
        );
    }

    #[test]
    fn test_order_only_window() {
        let w = row_number().order_by(EmpId);
        assert_eq!(
            render_on(&Database::default(), w).unwrap(),
            "row_number() over (order by s.ID)"
        );
    }

    #[test]
    fn test_derby_omits_unsupported_clauses() {
        let derby = Database::new(DerbyDialect::new());
        let w = sum(EmpSalary).partition_by(EmpDept).order_by(EmpId);
        assert_eq!(render_on(&derby, w).unwrap(), "sum(s.SALARY) over ()");
        let db2 = Database::new(Db2Dialect::new());
        let w = sum(EmpSalary).partition_by(EmpDept);
        assert_eq!(
            render_on(&db2, w).unwrap(),
            "sum(s.SALARY) over (partition by s.DEPT)"
        );
    }

    #[test]
    fn test_row_number_requires_order_on_oracle() {
        let oracle = Database::new(OracleDialect::new());
        let err = render_on(&oracle, row_number().partition_by(EmpDept)).unwrap_err();
        assert!(matches!(
            err,
            QueryError::UnsupportedDialectFeature {
                dialect: "oracle",
                ..
            }
        ));
        assert!(render_on(&oracle, row_number().order_by(EmpId)).is_ok());
    }

    #[test]
    fn test_window_is_usable_in_arithmetic() {
        let w = lag(EmpSalary).order_by(EmpId).minus(EmpSalary);
        assert_eq!(
            render_on(&Database::default(), w).unwrap(),
            "lag(s.SALARY) over (order by s.ID) - s.SALARY"
        );
    }
}
