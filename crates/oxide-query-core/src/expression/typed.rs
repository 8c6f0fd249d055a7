//! Typed wrappers over the expression tree.

use std::fmt;
use std::marker::PhantomData;

use crate::error::QueryError;
use crate::schema::{Column, ColumnInfo};
use crate::scope::AliasHint;
use crate::value::ToSqlValue;

use super::builder::{Chain, ExpressionBuilder};
use super::{BinaryOp, ColumnReference, Expr};

/// An expression whose SQL result has the Rust type `T`.
///
/// Construction never fails eagerly: an error detected while the expression
/// is assembled (for instance an empty IN list) travels inside it and is
/// surfaced by the statement that admits it.
pub struct TypedExpression<T> {
    pub(crate) expr: Expr,
    pub(crate) error: Option<QueryError>,
    _type: PhantomData<fn() -> T>,
}

/// A boolean expression: a predicate ready to be used in a clause.
pub type Condition = TypedExpression<bool>;

impl<T> TypedExpression<T> {
    pub(crate) const fn new(expr: Expr) -> Self {
        Self {
            expr,
            error: None,
            _type: PhantomData,
        }
    }

    pub(crate) const fn with_error(expr: Expr, error: Option<QueryError>) -> Self {
        Self {
            expr,
            error,
            _type: PhantomData,
        }
    }

    /// Reinterprets the result type. Only used where SQL types coincide.
    pub(crate) fn retype<U>(self) -> TypedExpression<U> {
        TypedExpression::with_error(self.expr, self.error)
    }

    /// Combines this expression with another into a new node, keeping the
    /// first error seen.
    pub(crate) fn combine<U, V>(
        self,
        other: TypedExpression<U>,
        f: impl FnOnce(Expr, Expr) -> Expr,
    ) -> TypedExpression<V> {
        TypedExpression::with_error(f(self.expr, other.expr), self.error.or(other.error))
    }

    pub(crate) fn map<U>(self, f: impl FnOnce(Expr) -> Expr) -> TypedExpression<U> {
        TypedExpression::with_error(f(self.expr), self.error)
    }

    pub(crate) fn into_parts(self) -> (Expr, Option<QueryError>) {
        (self.expr, self.error)
    }
}

impl<T> Clone for TypedExpression<T> {
    fn clone(&self) -> Self {
        Self::with_error(self.expr.clone(), self.error.clone())
    }
}

impl<T> fmt::Debug for TypedExpression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedExpression")
            .field("expr", &self.expr)
            .field("error", &self.error)
            .finish()
    }
}

impl TypedExpression<bool> {
    /// Starts `self and <x> <comparison>`.
    pub fn and<X: Typed>(self, x: X) -> ExpressionBuilder<X::Type, Chain> {
        ExpressionBuilder::new(x.into_expression(), Chain::new(self, BinaryOp::And))
    }

    /// Starts `self or <x> <comparison>`.
    pub fn or<X: Typed>(self, x: X) -> ExpressionBuilder<X::Type, Chain> {
        ExpressionBuilder::new(x.into_expression(), Chain::new(self, BinaryOp::Or))
    }

    /// `self and other`.
    #[must_use]
    pub fn and_clause(self, other: Self) -> Self {
        self.combine(other, |l, r| Expr::binary(BinaryOp::And, l, r))
    }

    /// `self or other`.
    #[must_use]
    pub fn or_clause(self, other: Self) -> Self {
        self.combine(other, |l, r| Expr::binary(BinaryOp::Or, l, r))
    }

    /// `not self`.
    #[must_use]
    pub fn not(self) -> Self {
        self.map(|e| Expr::Not(Box::new(e)))
    }
}

/// Marker for numeric result types.
pub trait Numeric {}
impl Numeric for i32 {}
impl Numeric for i64 {}
impl Numeric for f64 {}
impl<T: Numeric> Numeric for Option<T> {}

/// Marker for textual result types.
pub trait TextType {}
impl TextType for String {}
impl TextType for Option<String> {}

/// Anything usable where a typed expression is expected: column accessors in
/// their three forms, typed expressions and window functions.
pub trait Typed: Sized {
    /// The Rust type of the SQL result.
    type Type;

    /// Converts into an expression node.
    fn into_expression(self) -> TypedExpression<Self::Type>;

    /// `self + rhs`
    fn plus<O>(self, rhs: O) -> TypedExpression<Self::Type>
    where
        O: Operand<Self::Type>,
        Self::Type: Numeric,
    {
        arithmetic(self, BinaryOp::Add, rhs)
    }

    /// `self - rhs`
    fn minus<O>(self, rhs: O) -> TypedExpression<Self::Type>
    where
        O: Operand<Self::Type>,
        Self::Type: Numeric,
    {
        arithmetic(self, BinaryOp::Sub, rhs)
    }

    /// `self * rhs`
    fn times<O>(self, rhs: O) -> TypedExpression<Self::Type>
    where
        O: Operand<Self::Type>,
        Self::Type: Numeric,
    {
        arithmetic(self, BinaryOp::Mul, rhs)
    }

    /// `self / rhs`
    fn divided_by<O>(self, rhs: O) -> TypedExpression<Self::Type>
    where
        O: Operand<Self::Type>,
        Self::Type: Numeric,
    {
        arithmetic(self, BinaryOp::Div, rhs)
    }

    /// `self % rhs`
    fn remainder<O>(self, rhs: O) -> TypedExpression<Self::Type>
    where
        O: Operand<Self::Type>,
        Self::Type: Numeric,
    {
        arithmetic(self, BinaryOp::Mod, rhs)
    }

    /// `-self`
    fn negate(self) -> TypedExpression<Self::Type>
    where
        Self::Type: Numeric,
    {
        self.into_expression().map(|e| Expr::Negate(Box::new(e)))
    }

    /// Reads the result as `Option<Self::Type>`: NULL decodes to `None`.
    ///
    /// Columns of an alias on the outer side of a join may come back NULL
    /// even when the column itself is not nullable; project them through
    /// this.
    fn nullable(self) -> TypedExpression<Option<Self::Type>> {
        self.into_expression().retype()
    }

    /// String concatenation in the dialect's spelling.
    fn concat<O>(self, rhs: O) -> TypedExpression<Self::Type>
    where
        O: Operand<Self::Type>,
        Self::Type: TextType,
    {
        arithmetic(self, BinaryOp::Concat, rhs)
    }
}

fn arithmetic<X: Typed, O: Operand<X::Type>>(x: X, op: BinaryOp, rhs: O) -> TypedExpression<X::Type> {
    x.into_expression()
        .combine(rhs.into_operand(), |l, r| Expr::binary(op, l, r))
}

impl<T> Typed for TypedExpression<T> {
    type Type = T;

    fn into_expression(self) -> Self {
        self
    }
}

/// Bare accessor: resolved against any visible alias of the column's table.
impl<C: Column> Typed for C {
    type Type = C::Type;

    fn into_expression(self) -> TypedExpression<C::Type> {
        TypedExpression::new(Expr::Column(ColumnReference::Unresolved {
            column: ColumnInfo::of::<C>(),
            hint: AliasHint::None,
        }))
    }
}

/// Accessor restricted to one alias object, from [`crate::Alias::col`].
pub struct AliasColumn<C> {
    hint: AliasHint,
    _column: PhantomData<C>,
}

impl<C: Column> AliasColumn<C> {
    pub(crate) const fn new(hint: AliasHint) -> Self {
        Self {
            hint,
            _column: PhantomData,
        }
    }
}

impl<C: Column> Clone for AliasColumn<C> {
    fn clone(&self) -> Self {
        Self::new(self.hint.clone())
    }
}

impl<C: Column> Typed for AliasColumn<C> {
    type Type = C::Type;

    fn into_expression(self) -> TypedExpression<C::Type> {
        TypedExpression::new(Expr::Column(ColumnReference::Unresolved {
            column: ColumnInfo::of::<C>(),
            hint: self.hint,
        }))
    }
}

/// Accessor restricted to aliases with a given name, from [`Column::of`].
pub struct NamedColumn<C> {
    hint: AliasHint,
    _column: PhantomData<C>,
}

impl<C: Column> NamedColumn<C> {
    pub(crate) const fn new(hint: AliasHint) -> Self {
        Self {
            hint,
            _column: PhantomData,
        }
    }
}

impl<C: Column> Clone for NamedColumn<C> {
    fn clone(&self) -> Self {
        Self::new(self.hint.clone())
    }
}

impl<C: Column> Typed for NamedColumn<C> {
    type Type = C::Type;

    fn into_expression(self) -> TypedExpression<C::Type> {
        TypedExpression::new(Expr::Column(ColumnReference::Unresolved {
            column: ColumnInfo::of::<C>(),
            hint: self.hint,
        }))
    }
}

/// A right-hand side that type-checks against a left operand of type `T`:
/// any [`Typed`] of the same type, or a plain value.
pub trait Operand<T> {
    /// Converts into an expression node.
    fn into_operand(self) -> TypedExpression<T>;
}

impl<X: Typed> Operand<X::Type> for X {
    fn into_operand(self) -> TypedExpression<X::Type> {
        self.into_expression()
    }
}

macro_rules! impl_value_operand {
    ($target:ty => $($value:ty),+ $(,)?) => {
        $(
            impl Operand<$target> for $value {
                fn into_operand(self) -> TypedExpression<$target> {
                    TypedExpression::new(Expr::Param(self.to_sql_value()))
                }
            }
        )+
    };
}

impl_value_operand!(String => &str, String);
impl_value_operand!(Option<String> => &str, String, Option<&str>, Option<String>);
impl_value_operand!(i64 => i64, i32);
impl_value_operand!(Option<i64> => i64, i32, Option<i64>);
impl_value_operand!(i32 => i32);
impl_value_operand!(Option<i32> => i32, Option<i32>);
impl_value_operand!(f64 => f64);
impl_value_operand!(Option<f64> => f64, Option<f64>);
impl_value_operand!(bool => bool);
impl_value_operand!(Option<bool> => bool, Option<bool>);
impl_value_operand!(Vec<u8> => Vec<u8>);
impl_value_operand!(Option<Vec<u8>> => Vec<u8>, Option<Vec<u8>>);

/// Plain values and the result type they compare as.
pub trait Value: ToSqlValue {
    /// The result type.
    type Type;
}

macro_rules! impl_value {
    ($($value:ty => $target:ty),+ $(,)?) => {
        $(
            impl Value for $value {
                type Type = $target;
            }
        )+
    };
}

impl_value!(
    &str => String,
    String => String,
    i64 => i64,
    i32 => i32,
    f64 => f64,
    bool => bool,
    Vec<u8> => Vec<u8>,
);

/// A value bound as a positional argument.
pub fn value<V: Value>(value: V) -> TypedExpression<V::Type> {
    TypedExpression::new(Expr::Param(value.to_sql_value()))
}

/// A value rendered inline in the SQL text (escaped), contributing no
/// argument.
pub fn literal<V: Value>(value: V) -> TypedExpression<V::Type> {
    TypedExpression::new(Expr::Inline(value.to_sql_value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::render::SqlWriter;
    use crate::schema::fixtures::{EmpName, EmpSalary, EmployeeTable};
    use crate::scope::{Alias, Scope};
    use crate::value::SqlValue;

    fn render<T>(e: TypedExpression<T>) -> (String, Vec<SqlValue>) {
        let s = Alias::<EmployeeTable>::new("s");
        let database = Database::default();
        let scope = Scope::new(&database).plus(&s);
        let (expr, error) = e.into_parts();
        assert!(error.is_none());
        let bound = expr.bind(&scope).unwrap();
        let mut w = SqlWriter::new(&database);
        bound.render(&mut w).unwrap();
        w.finish()
    }

    #[test]
    fn test_arithmetic_on_bare_accessor() {
        let (sql, args) = render(EmpSalary.times(2.0_f64).plus(literal(100.0_f64)));
        assert_eq!(sql, "s.SALARY * ? + 100");
        assert_eq!(args, vec![SqlValue::Float(2.0)]);
    }

    #[test]
    fn test_named_accessor_narrows_to_alias_name() {
        let (sql, _) = render(EmpName.of("s").concat("!"));
        assert_eq!(sql, "s.NAME || ?");
    }

    #[test]
    fn test_negate_wraps_sum() {
        let (sql, _) = render(EmpSalary.plus(1.0_f64).negate());
        assert_eq!(sql, "-(s.SALARY + ?)");
    }

    #[test]
    fn test_literal_is_inline_and_value_is_bound() {
        let (sql, args) = render(literal("it's"));
        assert_eq!(sql, "'it''s'");
        assert!(args.is_empty());
        let (sql, args) = render(value(7_i64));
        assert_eq!(sql, "?");
        assert_eq!(args, vec![SqlValue::Int(7)]);
    }

    #[test]
    fn test_nullable_keeps_the_expression() {
        let salary: TypedExpression<Option<f64>> = EmpSalary.nullable();
        let (sql, args) = render(salary.plus(1.0_f64));
        assert_eq!(sql, "s.SALARY + ?");
        assert_eq!(args, vec![SqlValue::Float(1.0)]);
    }

    #[test]
    fn test_first_error_wins_when_combining() {
        let failing = TypedExpression::<i64>::with_error(
            Expr::Param(SqlValue::Null),
            Some(QueryError::NoSuchRow),
        );
        let combined = value(1_i64).plus(failing);
        assert!(matches!(combined.error, Some(QueryError::NoSuchRow)));
    }
}
