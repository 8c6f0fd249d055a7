//! Predicate builders: `<operand> <comparison> <right-hand side>`.
//!
//! A builder holds the left operand and a *continuation* that decides what
//! the finished predicate turns into. The standalone continuation returns a
//! [`Condition`]; statements supply their own continuations so that
//! `select.where_(x).is_equal_to(y)` lands back in the next grammar state.

use crate::error::QueryError;
use crate::statement::{Complete, Select, Shape};

use super::typed::{Condition, Operand, TextType, Typed, TypedExpression};
use super::{BinaryOp, Expr};

/// What happens to a predicate once its comparison is supplied.
pub trait Continuation {
    /// The value handed back to the caller.
    type Output;

    /// Consumes the finished predicate.
    fn complete(self, predicate: Condition) -> Self::Output;
}

/// Returns the predicate itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standalone;

impl Continuation for Standalone {
    type Output = Condition;

    fn complete(self, predicate: Condition) -> Condition {
        predicate
    }
}

/// Joins the predicate onto an existing condition with `and` / `or`.
#[derive(Debug, Clone)]
pub struct Chain {
    left: Condition,
    op: BinaryOp,
}

impl Chain {
    pub(crate) const fn new(left: Condition, op: BinaryOp) -> Self {
        Self { left, op }
    }
}

impl Continuation for Chain {
    type Output = Condition;

    fn complete(self, predicate: Condition) -> Condition {
        let op = self.op;
        self.left
            .combine(predicate, |l, r| Expr::binary(op, l, r))
    }
}

/// Starts a standalone predicate on `x`.
///
/// # Example
///
/// ```rust
/// use oxide_query_core::expression::{condition, value};
///
/// let positive = condition(value(3_i64)).is_greater_than(0_i64);
/// # let _ = positive;
/// ```
pub fn condition<X: Typed>(x: X) -> ExpressionBuilder<X::Type, Standalone> {
    ExpressionBuilder::new(x.into_expression(), Standalone)
}

/// `exists (<sub-select>)`.
pub fn exists<Sh: Shape, S: Complete>(select: Select<Sh, S>) -> Condition {
    subquery_predicate(select, false)
}

/// `not exists (<sub-select>)`.
pub fn not_exists<Sh: Shape, S: Complete>(select: Select<Sh, S>) -> Condition {
    subquery_predicate(select, true)
}

fn subquery_predicate<Sh: Shape, S: Complete>(select: Select<Sh, S>, negated: bool) -> Condition {
    match select.into_query() {
        Ok(query) => TypedExpression::new(Expr::Exists {
            negated,
            query: Box::new(query),
        }),
        Err(err) => TypedExpression::with_error(Expr::CountAll, Some(err)),
    }
}

/// A left operand waiting for its comparison.
#[must_use = "a predicate is only complete once a comparison is supplied"]
pub struct ExpressionBuilder<T, K> {
    operand: TypedExpression<T>,
    continuation: K,
}

impl<T, K: Continuation> ExpressionBuilder<T, K> {
    pub(crate) const fn new(operand: TypedExpression<T>, continuation: K) -> Self {
        Self {
            operand,
            continuation,
        }
    }

    fn compare<O: Operand<T>>(self, op: BinaryOp, rhs: O) -> K::Output {
        let predicate = self
            .operand
            .combine(rhs.into_operand(), |l, r| Expr::binary(op, l, r));
        self.continuation.complete(predicate)
    }

    fn finish(self, f: impl FnOnce(Expr) -> Expr) -> K::Output {
        self.continuation.complete(self.operand.map(f))
    }

    /// `= rhs`
    pub fn is_equal_to<O: Operand<T>>(self, rhs: O) -> K::Output {
        self.compare(BinaryOp::Eq, rhs)
    }

    /// `<> rhs`
    pub fn is_not_equal_to<O: Operand<T>>(self, rhs: O) -> K::Output {
        self.compare(BinaryOp::NotEq, rhs)
    }

    /// `> rhs`
    pub fn is_greater_than<O: Operand<T>>(self, rhs: O) -> K::Output {
        self.compare(BinaryOp::Gt, rhs)
    }

    /// `< rhs`
    pub fn is_less_than<O: Operand<T>>(self, rhs: O) -> K::Output {
        self.compare(BinaryOp::Lt, rhs)
    }

    /// `>= rhs`
    pub fn is_greater_than_or_equal_to<O: Operand<T>>(self, rhs: O) -> K::Output {
        self.compare(BinaryOp::GtEq, rhs)
    }

    /// `<= rhs`
    pub fn is_less_than_or_equal_to<O: Operand<T>>(self, rhs: O) -> K::Output {
        self.compare(BinaryOp::LtEq, rhs)
    }

    /// `between low and ...`; the upper bound follows with
    /// [`BetweenBuilder::and`].
    pub fn is_between<O: Operand<T>>(self, low: O) -> BetweenBuilder<T, K> {
        BetweenBuilder {
            builder: self,
            low: low.into_operand(),
            negated: false,
        }
    }

    /// `not between low and ...`
    pub fn is_not_between<O: Operand<T>>(self, low: O) -> BetweenBuilder<T, K> {
        BetweenBuilder {
            builder: self,
            low: low.into_operand(),
            negated: true,
        }
    }

    /// `in (v1, v2, ...)`. An empty list is recorded as
    /// [`QueryError::EmptyInList`].
    pub fn is_in<I>(self, values: I) -> K::Output
    where
        I: IntoIterator,
        I::Item: Operand<T>,
    {
        self.in_list(values, false)
    }

    /// `not in (v1, v2, ...)`. An empty list is recorded as
    /// [`QueryError::EmptyInList`].
    pub fn is_not_in<I>(self, values: I) -> K::Output
    where
        I: IntoIterator,
        I::Item: Operand<T>,
    {
        self.in_list(values, true)
    }

    fn in_list<I>(self, values: I, negated: bool) -> K::Output
    where
        I: IntoIterator,
        I::Item: Operand<T>,
    {
        let (operand, mut error) = self.operand.into_parts();
        let mut items = Vec::new();
        for v in values {
            let (item, item_error) = v.into_operand().into_parts();
            error = error.or(item_error);
            items.push(item);
        }
        if items.is_empty() {
            error = error.or(Some(QueryError::EmptyInList {
                column: operand.describe(),
            }));
        }
        let predicate = TypedExpression::with_error(
            Expr::InList {
                negated,
                operand: Box::new(operand),
                items,
            },
            error,
        );
        self.continuation.complete(predicate)
    }

    /// `in (<sub-select>)`; the sub-select projects one column of type `T`.
    pub fn is_in_select<S: Complete>(self, select: Select<(T,), S>) -> K::Output {
        self.in_select(select, false)
    }

    /// `not in (<sub-select>)`
    pub fn is_not_in_select<S: Complete>(self, select: Select<(T,), S>) -> K::Output {
        self.in_select(select, true)
    }

    fn in_select<S: Complete>(self, select: Select<(T,), S>, negated: bool) -> K::Output {
        let (operand, error) = self.operand.into_parts();
        let (expr, error) = match select.into_query() {
            Ok(query) => (
                Expr::InSelect {
                    negated,
                    operand: Box::new(operand),
                    query: Box::new(query),
                },
                error,
            ),
            Err(err) => (operand, error.or(Some(err))),
        };
        self.continuation
            .complete(TypedExpression::with_error(expr, error))
    }

    /// `is null`
    pub fn is_null(self) -> K::Output {
        self.finish(|operand| Expr::IsNull {
            negated: false,
            operand: Box::new(operand),
        })
    }

    /// `is not null`
    pub fn is_not_null(self) -> K::Output {
        self.finish(|operand| Expr::IsNull {
            negated: true,
            operand: Box::new(operand),
        })
    }
}

impl<T: TextType, K: Continuation> ExpressionBuilder<T, K> {
    /// `like pattern`
    pub fn is_like<O: Operand<T>>(self, pattern: O) -> K::Output {
        self.like(pattern, false)
    }

    /// `not like pattern`
    pub fn is_not_like<O: Operand<T>>(self, pattern: O) -> K::Output {
        self.like(pattern, true)
    }

    fn like<O: Operand<T>>(self, pattern: O, negated: bool) -> K::Output {
        let predicate = self.operand.combine(pattern.into_operand(), |operand, pattern| {
            Expr::Like {
                negated,
                operand: Box::new(operand),
                pattern: Box::new(pattern),
            }
        });
        self.continuation.complete(predicate)
    }
}

/// `between <low> and ...`, waiting for the upper bound.
#[must_use = "between needs an upper bound"]
pub struct BetweenBuilder<T, K> {
    builder: ExpressionBuilder<T, K>,
    low: TypedExpression<T>,
    negated: bool,
}

impl<T, K: Continuation> BetweenBuilder<T, K> {
    /// Supplies the upper bound and completes the predicate.
    pub fn and<O: Operand<T>>(self, high: O) -> K::Output {
        let Self {
            builder,
            low,
            negated,
        } = self;
        let (operand, error) = builder.operand.into_parts();
        let (low, low_error) = low.into_parts();
        let (high, high_error) = high.into_operand().into_parts();
        let predicate = TypedExpression::with_error(
            Expr::Between {
                negated,
                operand: Box::new(operand),
                low: Box::new(low),
                high: Box::new(high),
            },
            error.or(low_error).or(high_error),
        );
        builder.continuation.complete(predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::expression::{literal, value};
    use crate::render::SqlWriter;
    use crate::schema::fixtures::{EmpDept, EmpId, EmpName, EmpSalary, EmployeeTable};
    use crate::schema::Column;
    use crate::scope::{Alias, Scope};
    use crate::value::SqlValue;

    fn render(c: Condition) -> (String, Vec<SqlValue>) {
        let s = Alias::<EmployeeTable>::new("s");
        let database = Database::default();
        let scope = Scope::new(&database).plus(&s);
        let (expr, error) = c.into_parts();
        assert!(error.is_none(), "unexpected {error:?}");
        let mut w = SqlWriter::new(&database);
        expr.bind(&scope).unwrap().render(&mut w).unwrap();
        w.finish()
    }

    #[test]
    fn test_comparison_shapes() {
        assert_eq!(render(condition(EmpName).is_equal_to("Fred")).0, "s.NAME = ?");
        assert_eq!(render(condition(EmpName).is_equal_to(EmpDept)).0, "s.NAME = s.DEPT");
        assert_eq!(
            render(condition(EmpName).is_not_equal_to(EmpDept.of("s"))).0,
            "s.NAME <> s.DEPT"
        );
        assert_eq!(
            render(condition(EmpSalary).is_greater_than(EmpSalary.times(2.0_f64))).0,
            "s.SALARY > s.SALARY * ?"
        );
    }

    #[test]
    fn test_chained_conditions_are_left_associated() {
        let c = condition(EmpId)
            .is_greater_than(1_i64)
            .and(EmpId)
            .is_less_than(10_i64)
            .or(EmpName)
            .is_null();
        let (sql, args) = render(c);
        assert_eq!(sql, "s.ID > ? and s.ID < ? or s.NAME is null");
        assert_eq!(args, vec![SqlValue::Int(1), SqlValue::Int(10)]);
    }

    #[test]
    fn test_or_clause_nested_under_and_is_wrapped() {
        let either = condition(EmpDept)
            .is_equal_to("Sales")
            .or(EmpDept)
            .is_equal_to("Ops");
        let c = condition(EmpId).is_greater_than(0_i64).and_clause(either);
        assert_eq!(
            render(c).0,
            "s.ID > ? and (s.DEPT = ? or s.DEPT = ?)"
        );
    }

    #[test]
    fn test_between_is_two_step() {
        let (sql, args) = render(condition(EmpSalary).is_between(10.0_f64).and(20.0_f64));
        assert_eq!(sql, "s.SALARY between ? and ?");
        assert_eq!(args, vec![SqlValue::Float(10.0), SqlValue::Float(20.0)]);
        let (sql, _) = render(condition(EmpSalary).is_not_between(literal(1.5_f64)).and(2.0_f64));
        assert_eq!(sql, "s.SALARY not between 1.5 and ?");
    }

    #[test]
    fn test_in_list_binds_each_value() {
        let (sql, args) = render(condition(EmpId).is_in([1_i64, 2, 3]));
        assert_eq!(sql, "s.ID in (?, ?, ?)");
        assert_eq!(args.len(), 3);
        let (sql, _) = render(condition(EmpDept).is_not_in(vec!["a", "b"]));
        assert_eq!(sql, "s.DEPT not in (?, ?)");
    }

    #[test]
    fn test_empty_in_list_is_recorded() {
        let c = condition(EmpDept).is_in(Vec::<&str>::new());
        match c.error {
            Some(QueryError::EmptyInList { column }) => assert_eq!(column, "EMPLOYEE.DEPT"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_like_and_null_checks() {
        assert_eq!(render(condition(EmpName).is_like("F%")).0, "s.NAME like ?");
        assert_eq!(render(condition(EmpName).is_not_like("F%")).0, "s.NAME not like ?");
        assert_eq!(render(condition(EmpDept).is_not_null()).0, "s.DEPT is not null");
    }

    #[test]
    fn test_not_wraps_predicate() {
        let c = condition(value(1_i64)).is_equal_to(1_i64).not();
        assert_eq!(render(c).0, "not (? = ?)");
    }
}
