//! Typed expression model.
//!
//! Callers build [`TypedExpression`] values: column accessors, bound values,
//! predicates, arithmetic, functions and window functions. Underneath, every
//! typed expression wraps an untyped [`Expr`] tree. A tree starts out holding
//! *unresolved* column references; when a statement admits an expression into
//! one of its clauses the tree is bound against that clause's [`Scope`] and
//! every reference becomes *resolved* to exactly one alias.
//!
//! Rendering walks the bound tree once, left to right, recording each bound
//! argument as its placeholder is written. Parentheses are inserted only where a child binds
//! more loosely than its position in the parent requires.

mod builder;
mod case;
mod functions;
pub mod olap;
mod typed;

use tracing::debug;

pub use builder::{
    condition, exists, not_exists, BetweenBuilder, Chain, Continuation, ExpressionBuilder,
    Standalone,
};
pub use case::{case_when, Case, CaseStart, CaseWhen};
pub use functions::{
    abs, avg, cast, coalesce, count, count_all, count_distinct, length, lower, max, min,
    substring, sum, trim, upper, CastBuilder,
};
pub use typed::{
    literal, value, AliasColumn, Condition, NamedColumn, Numeric, Operand, TextType, Typed,
    TypedExpression, Value,
};

use crate::dialect::{Dialect, Function};
use crate::error::{QueryError, Result};
use crate::render::SqlWriter;
use crate::schema::{ColumnInfo, DataType};
use crate::scope::{AliasHint, AnyAlias, ResolvedColumn, Scope};
use crate::statement::Query;
use crate::value::SqlValue;

/// Binding strength of an expression node, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// `OR`
    Or,
    /// `AND`
    And,
    /// `BETWEEN`, `LIKE`, `IN`, `IS NULL`, `EXISTS`
    Predicate,
    /// `=`, `<>`, `<`, `>`, `<=`, `>=`
    Comparison,
    /// `+`, `-`, `||`
    Additive,
    /// `*`, `/`, `%`
    Multiplicative,
    /// `NOT`, unary minus
    Unary,
    /// Literals, columns, function calls, parenthesized sub-queries.
    Primary,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Logical
    And,
    Or,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // String
    Concat,
}

impl BinaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Concat => "||",
        }
    }

    /// Returns the precedence of the operator.
    #[must_use]
    pub const fn precedence(&self) -> Precedence {
        match self {
            Self::Or => Precedence::Or,
            Self::And => Precedence::And,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => {
                Precedence::Comparison
            }
            Self::Add | Self::Sub | Self::Concat => Precedence::Additive,
            Self::Mul | Self::Div | Self::Mod => Precedence::Multiplicative,
        }
    }
}

/// A column mention, before or after binding to an alias.
#[derive(Debug, Clone)]
pub enum ColumnReference {
    /// Accessor plus an optional narrowing hint, not yet bound.
    Unresolved {
        /// Column metadata for the accessor.
        column: ColumnInfo,
        /// Restriction on which aliases may match.
        hint: AliasHint,
    },
    /// Bound to one alias.
    Resolved(ResolvedColumn),
}

impl ColumnReference {
    /// Binds the reference against `scope`. Already-resolved references are
    /// returned as they are.
    pub fn resolve(&self, scope: &Scope) -> Result<ResolvedColumn> {
        match self {
            Self::Unresolved { column, hint } => scope.resolve(column, hint),
            Self::Resolved(resolved) => Ok(resolved.clone()),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Unresolved {
                column,
                hint: AliasHint::None,
            } => column.to_string(),
            Self::Unresolved {
                column,
                hint: AliasHint::Name(name),
            } => format!("{name}.{}", column.name()),
            Self::Unresolved {
                column,
                hint: AliasHint::Alias(alias),
            } => format!("{}.{}", alias.display_name(), column.name()),
            Self::Resolved(resolved) => resolved.sql(),
        }
    }
}

/// One `ORDER BY` entry.
#[derive(Debug, Clone)]
pub(crate) struct OrderItem {
    pub(crate) expr: Expr,
    pub(crate) descending: bool,
}

impl OrderItem {
    pub(crate) fn bind(self, scope: &Scope) -> Result<Self> {
        Ok(Self {
            expr: self.expr.bind(scope)?,
            descending: self.descending,
        })
    }

    pub(crate) fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        self.expr.render(w)?;
        if self.descending {
            w.push(" desc");
        }
        Ok(())
    }
}

/// A window function call with its `OVER` clause contents.
#[derive(Debug, Clone)]
pub(crate) struct WindowCall {
    pub(crate) function: Function,
    pub(crate) args: Vec<Expr>,
    pub(crate) partition_by: Vec<Expr>,
    pub(crate) order_by: Vec<OrderItem>,
}

/// Untyped expression tree.
#[derive(Debug, Clone)]
pub(crate) enum Expr {
    /// A value bound as a positional argument.
    Param(SqlValue),
    /// A value rendered inline.
    Inline(SqlValue),
    Column(ColumnReference),
    Not(Box<Expr>),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Between {
        negated: bool,
        operand: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    Like {
        negated: bool,
        operand: Box<Expr>,
        pattern: Box<Expr>,
    },
    InList {
        negated: bool,
        operand: Box<Expr>,
        items: Vec<Expr>,
    },
    InSelect {
        negated: bool,
        operand: Box<Expr>,
        query: Box<Query>,
    },
    Exists {
        negated: bool,
        query: Box<Query>,
    },
    IsNull {
        negated: bool,
        operand: Box<Expr>,
    },
    Function {
        function: Function,
        distinct: bool,
        args: Vec<Expr>,
    },
    CountAll,
    Cast {
        operand: Box<Expr>,
        data_type: DataType,
    },
    Window(Box<WindowCall>),
    Subquery(Box<Query>),
    /// `case when .. then .. [else ..] end`
    Case {
        branches: Vec<(Expr, Expr)>,
        otherwise: Option<Box<Expr>>,
    },
}

impl Expr {
    pub(crate) fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Binding strength of this node under `dialect`.
    pub(crate) fn precedence(&self, dialect: &dyn Dialect) -> Precedence {
        match self {
            Self::Binary {
                op: BinaryOp::Concat,
                ..
            } if dialect.concat_operator().is_none() => Precedence::Primary,
            Self::Binary { op, .. } => op.precedence(),
            Self::Not(_) | Self::Negate(_) => Precedence::Unary,
            // negative literals render with a leading minus sign
            Self::Inline(SqlValue::Int(n)) if *n < 0 => Precedence::Unary,
            Self::Inline(SqlValue::Float(f)) if f.is_sign_negative() => Precedence::Unary,
            Self::Between { .. }
            | Self::Like { .. }
            | Self::InList { .. }
            | Self::InSelect { .. }
            | Self::Exists { .. }
            | Self::IsNull { .. } => Precedence::Predicate,
            Self::Param(_)
            | Self::Inline(_)
            | Self::Column(_)
            | Self::Function { .. }
            | Self::CountAll
            | Self::Cast { .. }
            | Self::Window(_)
            | Self::Subquery(_)
            | Self::Case { .. } => Precedence::Primary,
        }
    }

    /// Short human-readable description used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Column(column) => column.describe(),
            _ => String::from("expression"),
        }
    }

    /// Binds every unresolved column reference against `scope`.
    ///
    /// Sub-queries were bound against their own scope when they were built
    /// and are left as they are.
    pub(crate) fn bind(self, scope: &Scope) -> Result<Self> {
        let bind_box = |e: Box<Self>| -> Result<Box<Self>> { Ok(Box::new(e.bind(scope)?)) };
        let bind_all = |items: Vec<Self>| -> Result<Vec<Self>> {
            items.into_iter().map(|e| e.bind(scope)).collect()
        };
        Ok(match self {
            Self::Column(reference) => Self::Column(ColumnReference::Resolved(reference.resolve(scope)?)),
            Self::Not(inner) => Self::Not(bind_box(inner)?),
            Self::Negate(inner) => Self::Negate(bind_box(inner)?),
            Self::Binary { op, left, right } => Self::Binary {
                op,
                left: bind_box(left)?,
                right: bind_box(right)?,
            },
            Self::Between {
                negated,
                operand,
                low,
                high,
            } => Self::Between {
                negated,
                operand: bind_box(operand)?,
                low: bind_box(low)?,
                high: bind_box(high)?,
            },
            Self::Like {
                negated,
                operand,
                pattern,
            } => Self::Like {
                negated,
                operand: bind_box(operand)?,
                pattern: bind_box(pattern)?,
            },
            Self::InList {
                negated,
                operand,
                items,
            } => Self::InList {
                negated,
                operand: bind_box(operand)?,
                items: bind_all(items)?,
            },
            Self::InSelect {
                negated,
                operand,
                query,
            } => Self::InSelect {
                negated,
                operand: bind_box(operand)?,
                query,
            },
            Self::IsNull { negated, operand } => Self::IsNull {
                negated,
                operand: bind_box(operand)?,
            },
            Self::Function {
                function,
                distinct,
                args,
            } => Self::Function {
                function,
                distinct,
                args: bind_all(args)?,
            },
            Self::Cast { operand, data_type } => Self::Cast {
                operand: bind_box(operand)?,
                data_type,
            },
            Self::Window(call) => {
                let WindowCall {
                    function,
                    args,
                    partition_by,
                    order_by,
                } = *call;
                Self::Window(Box::new(WindowCall {
                    function,
                    args: bind_all(args)?,
                    partition_by: bind_all(partition_by)?,
                    order_by: order_by
                        .into_iter()
                        .map(|item| item.bind(scope))
                        .collect::<Result<_>>()?,
                }))
            }
            Self::Case {
                branches,
                otherwise,
            } => Self::Case {
                branches: branches
                    .into_iter()
                    .map(|(when, then)| -> Result<(Self, Self)> {
                        Ok((when.bind(scope)?, then.bind(scope)?))
                    })
                    .collect::<Result<_>>()?,
                otherwise: otherwise.map(bind_box).transpose()?,
            },
            other @ (Self::Param(_)
            | Self::Inline(_)
            | Self::CountAll
            | Self::Exists { .. }
            | Self::Subquery(_)) => other,
        })
    }

    /// Returns true if any bound column in this tree (outside sub-queries)
    /// refers to `alias`.
    pub(crate) fn references(&self, alias: &AnyAlias) -> bool {
        match self {
            Self::Column(ColumnReference::Resolved(resolved)) => resolved.alias().same(alias),
            Self::Not(inner) | Self::Negate(inner) => inner.references(alias),
            Self::Binary { left, right, .. } => left.references(alias) || right.references(alias),
            Self::Between {
                operand, low, high, ..
            } => operand.references(alias) || low.references(alias) || high.references(alias),
            Self::Like {
                operand, pattern, ..
            } => operand.references(alias) || pattern.references(alias),
            Self::InList { operand, items, .. } => {
                operand.references(alias) || items.iter().any(|e| e.references(alias))
            }
            Self::InSelect { operand, .. }
            | Self::IsNull { operand, .. }
            | Self::Cast { operand, .. } => operand.references(alias),
            Self::Function { args, .. } => args.iter().any(|e| e.references(alias)),
            Self::Window(call) => {
                call.args.iter().any(|e| e.references(alias))
                    || call.partition_by.iter().any(|e| e.references(alias))
                    || call.order_by.iter().any(|o| o.expr.references(alias))
            }
            Self::Case {
                branches,
                otherwise,
            } => {
                branches
                    .iter()
                    .any(|(when, then)| when.references(alias) || then.references(alias))
                    || otherwise.as_ref().is_some_and(|e| e.references(alias))
            }
            Self::Column(ColumnReference::Unresolved { .. })
            | Self::Param(_)
            | Self::Inline(_)
            | Self::CountAll
            | Self::Exists { .. }
            | Self::Subquery(_) => false,
        }
    }

    /// The label given to this expression when it is projected without one.
    /// Plain columns keep their own name.
    pub(crate) fn default_label(&self, position: usize) -> Option<String> {
        match self {
            Self::Column(_) => None,
            _ => Some(format!("c{position}")),
        }
    }

    fn render_child(
        child: &Self,
        w: &mut SqlWriter<'_>,
        required: Precedence,
        strict: bool,
    ) -> Result<()> {
        let precedence = child.precedence(w.dialect());
        let wrap = precedence < required || (strict && precedence == required);
        if wrap {
            w.push("(");
        }
        child.render(w)?;
        if wrap {
            w.push(")");
        }
        Ok(())
    }

    fn render_list(items: &[Self], w: &mut SqlWriter<'_>) -> Result<()> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            item.render(w)?;
        }
        Ok(())
    }

    /// Renders the node, writing placeholders and recording their values.
    pub(crate) fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        match self {
            Self::Param(value) => w.push_param(value),
            Self::Inline(value) => w.push_inline(value),
            Self::Column(ColumnReference::Resolved(resolved)) => w.push(&resolved.sql()),
            Self::Column(ColumnReference::Unresolved { column, .. }) => {
                return Err(QueryError::UnresolvedReference {
                    column: column.to_string(),
                    visible: Vec::new(),
                });
            }
            Self::Not(inner) => {
                w.push("not ");
                Self::render_child(inner, w, Precedence::Unary, false)?;
            }
            Self::Negate(inner) => {
                w.push("-");
                Self::render_child(inner, w, Precedence::Unary, true)?;
            }
            Self::Binary {
                op: BinaryOp::Concat,
                left,
                right,
            } if w.dialect().concat_operator().is_none() => {
                w.push("concat(");
                left.render(w)?;
                w.push(", ");
                right.render(w)?;
                w.push(")");
            }
            Self::Binary { op, left, right } => {
                let precedence = op.precedence();
                Self::render_child(left, w, precedence, false)?;
                let symbol = match op {
                    BinaryOp::Concat => w.dialect().concat_operator().unwrap_or("||"),
                    other => other.as_str(),
                };
                w.push(" ");
                w.push(symbol);
                w.push(" ");
                Self::render_child(right, w, precedence, true)?;
            }
            Self::Between {
                negated,
                operand,
                low,
                high,
            } => {
                Self::render_child(operand, w, Precedence::Predicate, true)?;
                w.push(if *negated { " not between " } else { " between " });
                Self::render_child(low, w, Precedence::Additive, false)?;
                w.push(" and ");
                Self::render_child(high, w, Precedence::Additive, false)?;
            }
            Self::Like {
                negated,
                operand,
                pattern,
            } => {
                Self::render_child(operand, w, Precedence::Predicate, true)?;
                w.push(if *negated { " not like " } else { " like " });
                Self::render_child(pattern, w, Precedence::Additive, false)?;
            }
            Self::InList {
                negated,
                operand,
                items,
            } => {
                Self::render_child(operand, w, Precedence::Predicate, true)?;
                w.push(if *negated { " not in (" } else { " in (" });
                Self::render_list(items, w)?;
                w.push(")");
            }
            Self::InSelect {
                negated,
                operand,
                query,
            } => {
                Self::render_child(operand, w, Precedence::Predicate, true)?;
                w.push(if *negated { " not in (" } else { " in (" });
                query.render(w)?;
                w.push(")");
            }
            Self::Exists { negated, query } => {
                w.push(if *negated { "not exists (" } else { "exists (" });
                query.render(w)?;
                w.push(")");
            }
            Self::IsNull { negated, operand } => {
                Self::render_child(operand, w, Precedence::Predicate, true)?;
                w.push(if *negated { " is not null" } else { " is null" });
            }
            Self::Function {
                function,
                distinct,
                args,
            } => {
                w.push(w.dialect().function_name(*function));
                w.push(if *distinct { "(distinct " } else { "(" });
                Self::render_list(args, w)?;
                w.push(")");
            }
            Self::CountAll => {
                w.push(w.dialect().function_name(Function::Count));
                w.push("(*)");
            }
            Self::Cast { operand, data_type } => {
                w.push("cast(");
                operand.render(w)?;
                w.push(" as ");
                w.push(w.dialect().cast_type(*data_type));
                w.push(")");
            }
            Self::Window(call) => call.render(w)?,
            Self::Subquery(query) => {
                w.push("(");
                query.render(w)?;
                w.push(")");
            }
            Self::Case {
                branches,
                otherwise,
            } => {
                w.push("case");
                for (when, then) in branches {
                    w.push(" when ");
                    when.render(w)?;
                    w.push(" then ");
                    then.render(w)?;
                }
                if let Some(otherwise) = otherwise {
                    w.push(" else ");
                    otherwise.render(w)?;
                }
                w.push(" end");
            }
        }
        Ok(())
    }
}

impl WindowCall {
    fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        let dialect = w.dialect();
        if self.function == Function::RowNumber
            && dialect.requires_order_by_in_row_number()
            && (self.order_by.is_empty() || !dialect.supports_order_by_in_olap())
        {
            return Err(QueryError::unsupported(
                dialect.name(),
                "row_number() without order by",
            ));
        }
        w.push(dialect.function_name(self.function));
        w.push("(");
        Expr::render_list(&self.args, w)?;
        w.push(") over (");
        let partition = !self.partition_by.is_empty() && dialect.supports_partition_by_in_olap();
        let order = !self.order_by.is_empty() && dialect.supports_order_by_in_olap();
        if !self.partition_by.is_empty() && !partition {
            debug!(dialect = dialect.name(), "omitting partition by from window function");
        }
        if !self.order_by.is_empty() && !order {
            debug!(dialect = dialect.name(), "omitting order by from window function");
        }
        if partition {
            w.push("partition by ");
            Expr::render_list(&self.partition_by, w)?;
        }
        if order {
            if partition {
                w.push(" ");
            }
            w.push("order by ");
            for (i, item) in self.order_by.iter().enumerate() {
                if i > 0 {
                    w.push(", ");
                }
                item.render(w)?;
            }
        }
        w.push(")");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::dialect::{DerbyDialect, MySqlDialect, SqlServerDialect};
    use crate::schema::fixtures::{EmpDept, EmpId, EmpSalary, EmployeeTable};
    use crate::scope::Alias;

    fn render_with(database: &Database, expr: &Expr) -> Result<(String, Vec<SqlValue>)> {
        let mut w = SqlWriter::new(database);
        expr.render(&mut w)?;
        Ok(w.finish())
    }

    fn bound(expr: Expr) -> Expr {
        let s = Alias::<EmployeeTable>::new("s");
        let scope = Scope::new(&Database::default()).plus(&s);
        expr.bind(&scope).unwrap()
    }

    fn column<C: crate::schema::Column>() -> Expr {
        Expr::Column(ColumnReference::Unresolved {
            column: ColumnInfo::of::<C>(),
            hint: AliasHint::None,
        })
    }

    fn int(n: i64) -> Expr {
        Expr::Param(SqlValue::Int(n))
    }

    fn sql(expr: &Expr) -> String {
        render_with(&Database::default(), expr).unwrap().0
    }

    #[test]
    fn test_binary_op_precedence() {
        assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
        assert!(BinaryOp::Add.precedence() > BinaryOp::Eq.precedence());
        assert!(BinaryOp::And.precedence() > BinaryOp::Or.precedence());
        assert!(Precedence::Comparison > Precedence::Predicate);
        assert!(Precedence::Predicate > Precedence::And);
    }

    #[test]
    fn test_higher_precedence_children_are_not_wrapped() {
        // s.SALARY + ? * ?
        let expr = bound(Expr::binary(
            BinaryOp::Add,
            column::<EmpSalary>(),
            Expr::binary(BinaryOp::Mul, int(2), int(3)),
        ));
        assert_eq!(sql(&expr), "s.SALARY + ? * ?");
    }

    #[test]
    fn test_lower_precedence_children_are_wrapped() {
        // (s.SALARY + ?) * ?
        let expr = bound(Expr::binary(
            BinaryOp::Mul,
            Expr::binary(BinaryOp::Add, column::<EmpSalary>(), int(2)),
            int(3),
        ));
        assert_eq!(sql(&expr), "(s.SALARY + ?) * ?");
    }

    #[test]
    fn test_right_nested_equal_precedence_is_wrapped() {
        let left = Expr::binary(
            BinaryOp::Sub,
            Expr::binary(BinaryOp::Sub, int(1), int(2)),
            int(3),
        );
        let right = Expr::binary(
            BinaryOp::Sub,
            int(1),
            Expr::binary(BinaryOp::Sub, int(2), int(3)),
        );
        assert_eq!(sql(&left), "? - ? - ?");
        assert_eq!(sql(&right), "? - (? - ?)");
    }

    #[test]
    fn test_or_inside_and_is_wrapped() {
        let a = Expr::binary(BinaryOp::Eq, int(1), int(1));
        let b = Expr::binary(BinaryOp::Eq, int(2), int(2));
        let c = Expr::binary(BinaryOp::Eq, int(3), int(3));
        let expr = Expr::binary(BinaryOp::And, a, Expr::binary(BinaryOp::Or, b, c));
        assert_eq!(sql(&expr), "? = ? and (? = ? or ? = ?)");
    }

    #[test]
    fn test_not_wraps_comparison() {
        let expr = Expr::Not(Box::new(Expr::binary(BinaryOp::Eq, int(1), int(2))));
        assert_eq!(sql(&expr), "not (? = ?)");
    }

    #[test]
    fn test_double_negation_is_wrapped() {
        let expr = Expr::Negate(Box::new(Expr::Negate(Box::new(int(1)))));
        assert_eq!(sql(&expr), "-(-?)");
    }

    #[test]
    fn test_between_bounds_accept_arithmetic() {
        let expr = bound(Expr::Between {
            negated: false,
            operand: Box::new(column::<EmpSalary>()),
            low: Box::new(Expr::binary(BinaryOp::Add, int(1), int(2))),
            high: Box::new(int(10)),
        });
        assert_eq!(sql(&expr), "s.SALARY between ? + ? and ?");
    }

    #[test]
    fn test_concat_uses_function_on_mysql() {
        let expr = bound(Expr::binary(
            BinaryOp::Concat,
            column::<EmpDept>(),
            Expr::Inline(SqlValue::Text(String::from("-"))),
        ));
        assert_eq!(sql(&expr), "s.DEPT || '-'");
        let mysql = Database::new(MySqlDialect::new());
        assert_eq!(render_with(&mysql, &expr).unwrap().0, "concat(s.DEPT, '-')");
    }

    #[test]
    fn test_window_degrades_on_derby() {
        let call = Expr::Window(Box::new(WindowCall {
            function: Function::Sum,
            args: vec![column::<EmpSalary>()],
            partition_by: vec![column::<EmpDept>()],
            order_by: vec![OrderItem {
                expr: column::<EmpId>(),
                descending: true,
            }],
        }));
        let expr = bound(call);
        assert_eq!(
            sql(&expr),
            "sum(s.SALARY) over (partition by s.DEPT order by s.ID desc)"
        );
        let derby = Database::new(DerbyDialect::new());
        assert_eq!(render_with(&derby, &expr).unwrap().0, "sum(s.SALARY) over ()");
    }

    #[test]
    fn test_row_number_without_order_fails_on_sqlserver() {
        let expr = Expr::Window(Box::new(WindowCall {
            function: Function::RowNumber,
            args: Vec::new(),
            partition_by: Vec::new(),
            order_by: Vec::new(),
        }));
        let sqlserver = Database::new(SqlServerDialect::new());
        let err = render_with(&sqlserver, &expr).unwrap_err();
        assert!(matches!(err, QueryError::UnsupportedDialectFeature { dialect: "sqlserver", .. }));
        assert_eq!(sql(&expr), "row_number() over ()");
    }

    #[test]
    fn test_arguments_follow_placeholder_order() {
        let expr = bound(Expr::binary(
            BinaryOp::And,
            Expr::Between {
                negated: true,
                operand: Box::new(column::<EmpSalary>()),
                low: Box::new(int(1)),
                high: Box::new(int(2)),
            },
            Expr::InList {
                negated: false,
                operand: Box::new(column::<EmpId>()),
                items: vec![int(3), int(4)],
            },
        ));
        let (rendered, args) = render_with(&Database::default(), &expr).unwrap();
        assert_eq!(rendered, "s.SALARY not between ? and ? and s.ID in (?, ?)");
        assert_eq!(
            args,
            vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3), SqlValue::Int(4)]
        );
    }

    #[test]
    fn test_negating_negative_literal_is_wrapped() {
        let negative = |value| Expr::Negate(Box::new(Expr::Inline(value)));
        assert_eq!(sql(&negative(SqlValue::Int(-5))), "-(-5)");
        assert_eq!(sql(&negative(SqlValue::Float(-1.5))), "-(-1.5)");
        assert_eq!(sql(&negative(SqlValue::Int(5))), "-5");
        // subtraction keeps a space between the two signs
        let difference = Expr::binary(BinaryOp::Sub, int(1), Expr::Inline(SqlValue::Int(-2)));
        assert_eq!(sql(&difference), "? - -2");
    }

    #[test]
    fn test_unbound_column_fails_to_render() {
        let err = render_with(&Database::default(), &column::<EmpId>()).unwrap_err();
        assert!(matches!(err, QueryError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_references_sees_bound_aliases() {
        let s = Alias::<EmployeeTable>::new("s");
        let other = Alias::<EmployeeTable>::new("o");
        let scope = Scope::new(&Database::default()).plus(&s);
        let expr = Expr::binary(BinaryOp::Eq, column::<EmpId>(), int(1))
            .bind(&scope)
            .unwrap();
        assert!(expr.references(s.erased()));
        assert!(!expr.references(other.erased()));
    }
}
