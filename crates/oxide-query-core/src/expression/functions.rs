//! Aggregate and scalar SQL functions.
//!
//! Function names are looked up in the active dialect at render time, so
//! `length(x)` renders `char_length(x)` on ANSI and `len(x)` on SQL Server.

use std::marker::PhantomData;

use crate::dialect::Function;
use crate::error::QueryError;
use crate::schema::SqlType;
use crate::value::ToSqlValue;

use super::typed::{Numeric, Operand, TextType, Typed, TypedExpression};
use super::Expr;

fn call<T>(
    function: Function,
    distinct: bool,
    args: impl IntoIterator<Item = (Expr, Option<QueryError>)>,
) -> TypedExpression<T> {
    let mut error = None;
    let args = args
        .into_iter()
        .map(|(expr, e)| {
            error = error.take().or(e);
            expr
        })
        .collect();
    TypedExpression::with_error(
        Expr::Function {
            function,
            distinct,
            args,
        },
        error,
    )
}

fn unary<X: Typed, T>(function: Function, x: X) -> TypedExpression<T> {
    call(function, false, [x.into_expression().into_parts()])
}

/// `count(*)`
#[must_use]
pub fn count_all() -> TypedExpression<i64> {
    TypedExpression::new(Expr::CountAll)
}

/// `count(x)`
pub fn count<X: Typed>(x: X) -> TypedExpression<i64> {
    unary(Function::Count, x)
}

/// `count(distinct x)`
pub fn count_distinct<X: Typed>(x: X) -> TypedExpression<i64> {
    call(Function::Count, true, [x.into_expression().into_parts()])
}

/// `sum(x)`
pub fn sum<X>(x: X) -> TypedExpression<X::Type>
where
    X: Typed,
    X::Type: Numeric,
{
    unary(Function::Sum, x)
}

/// `avg(x)`, always a double.
pub fn avg<X>(x: X) -> TypedExpression<f64>
where
    X: Typed,
    X::Type: Numeric,
{
    unary(Function::Avg, x)
}

/// `min(x)`
pub fn min<X: Typed>(x: X) -> TypedExpression<X::Type> {
    unary(Function::Min, x)
}

/// `max(x)`
pub fn max<X: Typed>(x: X) -> TypedExpression<X::Type> {
    unary(Function::Max, x)
}

/// `upper(x)`
pub fn upper<X>(x: X) -> TypedExpression<X::Type>
where
    X: Typed,
    X::Type: TextType,
{
    unary(Function::Upper, x)
}

/// `lower(x)`
pub fn lower<X>(x: X) -> TypedExpression<X::Type>
where
    X: Typed,
    X::Type: TextType,
{
    unary(Function::Lower, x)
}

/// `trim(x)`
pub fn trim<X>(x: X) -> TypedExpression<X::Type>
where
    X: Typed,
    X::Type: TextType,
{
    unary(Function::Trim, x)
}

/// Character length of `x`.
pub fn length<X>(x: X) -> TypedExpression<i64>
where
    X: Typed,
    X::Type: TextType,
{
    unary(Function::Length, x)
}

/// `abs(x)`
pub fn abs<X>(x: X) -> TypedExpression<X::Type>
where
    X: Typed,
    X::Type: Numeric,
{
    unary(Function::Abs, x)
}

/// `coalesce(x, fallback)`
pub fn coalesce<X, O>(x: X, fallback: O) -> TypedExpression<X::Type>
where
    X: Typed,
    O: Operand<X::Type>,
{
    call(
        Function::Coalesce,
        false,
        [
            x.into_expression().into_parts(),
            fallback.into_operand().into_parts(),
        ],
    )
}

/// `substring(x, start, len)` with 1-based `start`; both bounds are bound
/// parameters.
pub fn substring<X>(x: X, start: i64, len: i64) -> TypedExpression<X::Type>
where
    X: Typed,
    X::Type: TextType,
{
    call(
        Function::Substring,
        false,
        [
            x.into_expression().into_parts(),
            (Expr::Param(start.to_sql_value()), None),
            (Expr::Param(len.to_sql_value()), None),
        ],
    )
}

/// `cast(x as ...)`; the target is chosen with [`CastBuilder::as_type`].
pub fn cast<X: Typed>(x: X) -> CastBuilder<X::Type> {
    CastBuilder {
        operand: x.into_expression(),
        _target: PhantomData,
    }
}

/// A cast waiting for its target type.
#[must_use = "a cast needs a target type"]
pub struct CastBuilder<T> {
    operand: TypedExpression<T>,
    _target: PhantomData<fn() -> T>,
}

impl<T> CastBuilder<T> {
    /// `cast(x as <U>)`, with the type name taken from the dialect.
    pub fn as_type<U: SqlType>(self) -> TypedExpression<U> {
        self.operand.map(|operand| Expr::Cast {
            operand: Box::new(operand),
            data_type: U::DATA_TYPE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::dialect::{MySqlDialect, SqlServerDialect, SqliteDialect};
    use crate::render::SqlWriter;
    use crate::schema::fixtures::{EmpDept, EmpId, EmpName, EmpSalary, EmployeeTable};
    use crate::scope::{Alias, Scope};
    use crate::value::SqlValue;

    fn render_on<T>(database: &Database, e: TypedExpression<T>) -> (String, Vec<SqlValue>) {
        let s = Alias::<EmployeeTable>::new("s");
        let scope = Scope::new(database).plus(&s);
        let mut w = SqlWriter::new(database);
        e.expr.bind(&scope).unwrap().render(&mut w).unwrap();
        w.finish()
    }

    fn render<T>(e: TypedExpression<T>) -> String {
        render_on(&Database::default(), e).0
    }

    #[test]
    fn test_aggregates() {
        assert_eq!(render(count_all()), "count(*)");
        assert_eq!(render(count(EmpId)), "count(s.ID)");
        assert_eq!(render(count_distinct(EmpDept)), "count(distinct s.DEPT)");
        assert_eq!(render(sum(EmpSalary)), "sum(s.SALARY)");
        assert_eq!(render(avg(EmpId)), "avg(s.ID)");
        assert_eq!(render(max(EmpName)), "max(s.NAME)");
    }

    #[test]
    fn test_function_arguments_are_never_wrapped() {
        assert_eq!(
            render(abs(EmpSalary.minus(100.0_f64))),
            "abs(s.SALARY - ?)"
        );
        assert_eq!(render(coalesce(EmpName, "n/a")), "coalesce(s.NAME, ?)");
    }

    #[test]
    fn test_function_names_follow_dialect() {
        let sqlserver = Database::new(SqlServerDialect::new());
        assert_eq!(render_on(&sqlserver, length(EmpName)).0, "len(s.NAME)");
        assert_eq!(render(length(EmpName)), "char_length(s.NAME)");
        let sqlite = Database::new(SqliteDialect::new());
        let (sql, args) = render_on(&sqlite, substring(EmpName, 1, 3));
        assert_eq!(sql, "substr(s.NAME, ?, ?)");
        assert_eq!(args, vec![SqlValue::Int(1), SqlValue::Int(3)]);
    }

    #[test]
    fn test_cast_uses_dialect_type_names() {
        assert_eq!(
            render(cast(EmpId).as_type::<String>()),
            "cast(s.ID as varchar(4000))"
        );
        let mysql = Database::new(MySqlDialect::new());
        assert_eq!(
            render_on(&mysql, cast(EmpId).as_type::<String>()).0,
            "cast(s.ID as char)"
        );
    }

    #[test]
    fn test_text_functions_compose() {
        assert_eq!(render(upper(trim(EmpName))), "upper(trim(s.NAME))");
        assert_eq!(render(lower(EmpDept.concat("x"))), "lower(s.DEPT || ?)");
    }
}
