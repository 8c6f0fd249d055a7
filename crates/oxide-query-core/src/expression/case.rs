//! Searched `CASE` expressions.
//!
//! ```rust
//! use oxide_query_core::expression::case_when;
//! use oxide_query_core::{condition, literal, Alias, Database};
//! use oxide_query_derive::Table;
//!
//! #[derive(Table)]
//! pub struct Employee {
//!     id: i64,
//!     salary: f64,
//! }
//!
//! # fn main() {
//! let s = Alias::<EmployeeTable>::new("s");
//! let band = case_when(condition(Employee::salary()).is_greater_than(100.0_f64))
//!     .then(literal("high"))
//!     .else_("low");
//! let sql = Database::default().from(&s).select(band).sql().unwrap();
//! assert_eq!(
//!     sql,
//!     "select case when s.SALARY > ? then 'high' else ? end as c1 from EMPLOYEE as s"
//! );
//! # }
//! ```

use std::marker::PhantomData;

use crate::error::QueryError;

use super::typed::{Condition, Operand, Typed, TypedExpression};
use super::Expr;

#[derive(Default)]
struct Branches {
    done: Vec<(Expr, Expr)>,
    error: Option<QueryError>,
}

impl Branches {
    fn absorb<T>(&mut self, e: TypedExpression<T>) -> Expr {
        let (expr, error) = e.into_parts();
        self.error = self.error.take().or(error);
        expr
    }

    fn finish<T>(self, otherwise: Option<Expr>) -> TypedExpression<T> {
        TypedExpression::with_error(
            Expr::Case {
                branches: self.done,
                otherwise: otherwise.map(Box::new),
            },
            self.error,
        )
    }
}

/// Starts `case when <condition> then ...`.
pub fn case_when(condition: Condition) -> CaseStart {
    let mut branches = Branches::default();
    let condition = branches.absorb(condition);
    CaseStart {
        branches,
        condition,
    }
}

/// The first `when` of a CASE, waiting for its result. The result fixes the
/// type of every later branch.
#[must_use]
pub struct CaseStart {
    branches: Branches,
    condition: Expr,
}

impl CaseStart {
    /// `then <x>`
    pub fn then<X: Typed>(mut self, x: X) -> Case<X::Type> {
        let result = self.branches.absorb(x.into_expression());
        self.branches.done.push((self.condition, result));
        Case {
            branches: self.branches,
            _type: PhantomData,
        }
    }
}

/// A CASE with at least one branch.
#[must_use]
pub struct Case<T> {
    branches: Branches,
    _type: PhantomData<fn() -> T>,
}

impl<T> Case<T> {
    /// Adds `when <condition>`.
    pub fn when(mut self, condition: Condition) -> CaseWhen<T> {
        let condition = self.branches.absorb(condition);
        CaseWhen {
            case: self,
            condition,
        }
    }

    /// Closes with `else <otherwise> end`.
    pub fn else_<O: Operand<T>>(mut self, otherwise: O) -> TypedExpression<T> {
        let otherwise = self.branches.absorb(otherwise.into_operand());
        self.branches.finish(Some(otherwise))
    }

    /// Closes with `end`; rows matching no branch read NULL.
    #[must_use]
    pub fn end(self) -> TypedExpression<Option<T>> {
        self.branches.finish(None)
    }
}

/// A later `when`, waiting for its result.
#[must_use]
pub struct CaseWhen<T> {
    case: Case<T>,
    condition: Expr,
}

impl<T> CaseWhen<T> {
    /// `then <x>`
    pub fn then<O: Operand<T>>(self, x: O) -> Case<T> {
        let Self {
            mut case,
            condition,
        } = self;
        let result = case.branches.absorb(x.into_operand());
        case.branches.done.push((condition, result));
        case
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::expression::{condition, literal, value};
    use crate::render::SqlWriter;
    use crate::schema::fixtures::{DeptName, EmpDept, EmpSalary, EmployeeTable};
    use crate::scope::{Alias, Scope};
    use crate::value::SqlValue;

    fn render<T>(e: TypedExpression<T>) -> crate::Result<(String, Vec<SqlValue>)> {
        let s = Alias::<EmployeeTable>::new("s");
        let database = Database::default();
        let scope = Scope::new(&database).plus(&s);
        let (expr, error) = e.into_parts();
        if let Some(err) = error {
            return Err(err);
        }
        let mut w = SqlWriter::new(&database);
        expr.bind(&scope)?.render(&mut w)?;
        Ok(w.finish())
    }

    #[test]
    fn test_branches_render_in_order() {
        let band = case_when(condition(EmpSalary).is_greater_than(100.0_f64))
            .then(literal("high"))
            .when(condition(EmpDept).is_equal_to("Ops"))
            .then("ops")
            .else_(value("low"));
        let (sql, args) = render(band).unwrap();
        assert_eq!(
            sql,
            "case when s.SALARY > ? then 'high' when s.DEPT = ? then ? else ? end"
        );
        assert_eq!(
            args,
            vec![
                SqlValue::Float(100.0),
                SqlValue::Text(String::from("Ops")),
                SqlValue::Text(String::from("ops")),
                SqlValue::Text(String::from("low")),
            ]
        );
    }

    #[test]
    fn test_case_without_else() {
        let flagged: TypedExpression<Option<f64>> =
            case_when(condition(EmpDept).is_null()).then(EmpSalary).end();
        assert_eq!(
            render(flagged).unwrap().0,
            "case when s.DEPT is null then s.SALARY end"
        );
    }

    #[test]
    fn test_case_is_a_primary_operand() {
        let doubled = case_when(condition(EmpDept).is_like("A%"))
            .then(EmpSalary)
            .else_(0.0_f64)
            .times(2.0_f64);
        assert_eq!(
            render(doubled).unwrap().0,
            "case when s.DEPT like ? then s.SALARY else ? end * ?"
        );
    }

    #[test]
    fn test_branch_errors_are_kept() {
        let broken = case_when(condition(EmpDept).is_in(Vec::<&str>::new()))
            .then(EmpSalary)
            .end();
        assert!(matches!(render(broken), Err(QueryError::EmptyInList { .. })));

        let unresolved = case_when(condition(DeptName).is_equal_to("x"))
            .then(EmpSalary)
            .end();
        assert!(matches!(
            render(unresolved),
            Err(QueryError::UnresolvedReference { .. })
        ));
    }
}
