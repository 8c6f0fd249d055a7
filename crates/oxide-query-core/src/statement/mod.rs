//! SELECT statements and their type-state grammar.
//!
//! A statement is a [`Select<Sh, S>`]: `Sh` is the result [`Shape`] and `S`
//! is a marker for the grammar position. Every operation consumes the
//! builder and returns one in the next position, so only legal sequences
//! compile:
//!
//! ```text
//! from ─┬─> join/left_join/right_join/full_outer_join ─> on ─> and/or* ─┐
//!       │<──────────────────────────────────────────────────────────────┘
//!       ├─> cross_join ─┘
//!       ├─> select ─> comma*
//!       ├─> where_ ─> and/or*
//!       ├─> group_by ─> comma* ─> having ─> and/or*
//!       ├─> order_by ─> then*
//!       ├─> union / union_all ─> union / union_all*
//!       ├─> fetch_first / offset / with_isolation / keep_locks
//!       └─> sql / build / list / optional / single (+ async)
//! ```
//!
//! Each predicate is bound to the aliases visible at the point it is
//! admitted. An ON predicate therefore sees the alias it joins, and a
//! WHERE predicate sees every alias of the FROM tree.
//!
//! A union is only taken between statements with neither ORDER BY,
//! pagination nor locking; those options may follow the last union and
//! apply to the combined rows.
//!
//! Errors found while building (an unresolvable column, an empty IN list, a
//! join condition not mentioning its alias) are recorded and the chain
//! carries on; `sql`, `build` and every terminal return the first of them
//! before any SQL is produced.
//!
//! # Example
//!
//! ```rust
//! use oxide_query_core::{Alias, Database};
//! use oxide_query_derive::Table;
//!
//! #[derive(Table)]
//! pub struct Employee {
//!     #[column(primary_key)]
//!     id: i64,
//!     name: String,
//!     dept: String,
//! }
//!
//! # fn main() {
//! let s = Alias::<EmployeeTable>::new("s");
//! let (sql, args) = Database::default()
//!     .from(&s)
//!     .where_(s.col(Employee::name()))
//!     .is_equal_to("Fred")
//!     .build()
//!     .unwrap();
//! assert_eq!(sql, "select s.* from EMPLOYEE as s where s.NAME = ?");
//! assert_eq!(args.len(), 1);
//! # }
//! ```
//!
//! A WHERE predicate cannot be given before the FROM tree is complete: a
//! join must receive its ON predicate first.
//!
//! ```compile_fail
//! use oxide_query_core::{Alias, Database};
//! use oxide_query_derive::Table;
//!
//! #[derive(Table)]
//! pub struct Employee {
//!     id: i64,
//!     name: String,
//! }
//!
//! # fn main() {
//! let s = Alias::<EmployeeTable>::new("s");
//! let t = Alias::<EmployeeTable>::new("t");
//! let _ = Database::default()
//!     .from(&s)
//!     .join(&t)
//!     .where_(s.col(Employee::name()))
//!     .is_equal_to("Fred");
//! # }
//! ```
//!
//! Clauses cannot be reordered: no join after WHERE, no WHERE after ORDER BY.
//!
//! ```compile_fail
//! use oxide_query_core::{Alias, Database};
//! use oxide_query_derive::Table;
//!
//! #[derive(Table)]
//! pub struct Employee {
//!     id: i64,
//!     name: String,
//! }
//!
//! # fn main() {
//! let s = Alias::<EmployeeTable>::new("s");
//! let _ = Database::default()
//!     .from(&s)
//!     .order_by(Employee::id())
//!     .where_(Employee::name())
//!     .is_equal_to("Fred");
//! # }
//! ```
//!
//! ```compile_fail
//! use oxide_query_core::{Alias, Database};
//! use oxide_query_derive::Table;
//!
//! #[derive(Table)]
//! pub struct Employee {
//!     id: i64,
//!     name: String,
//! }
//!
//! # fn main() {
//! let s = Alias::<EmployeeTable>::new("s");
//! let t = Alias::<EmployeeTable>::new("t");
//! let _ = Database::default()
//!     .from(&s)
//!     .where_(s.col(Employee::name()))
//!     .is_equal_to("Fred")
//!     .join(&t);
//! # }
//! ```
//!
//! A statement whose last join has no ON predicate cannot be rendered.
//!
//! ```compile_fail
//! use oxide_query_core::{Alias, Database};
//! use oxide_query_derive::Table;
//!
//! #[derive(Table)]
//! pub struct Employee {
//!     id: i64,
//! }
//!
//! # fn main() {
//! let s = Alias::<EmployeeTable>::new("s");
//! let t = Alias::<EmployeeTable>::new("t");
//! let _ = Database::default().from(&s).join(&t).sql();
//! # }
//! ```

mod query;
mod shape;

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

pub(crate) use query::Query;
pub use shape::{Append, Nullable, Shape};

use crate::dialect::{IsolationLevel, LockLevel};
use crate::error::{QueryError, Result};
use crate::executor::{AsyncSqlExecutor, SqlExecutor};
use crate::expression::{BinaryOp, Condition, Continuation, Expr, ExpressionBuilder, OrderItem, Typed, TypedExpression};
use crate::row::{decode, FromRow};
use crate::schema::Table;
use crate::scope::{Alias, Scope};
use crate::value::SqlValue;

use query::{Join, JoinKind, Projected, SetOperator};

// Typestate markers
/// Marker: FROM tree open; joins, projection and later clauses may follow.
pub struct ExpectingJoin;
/// Marker: a join was added and needs its ON predicate.
pub struct ExpectingOn;
/// Marker: inside an ON predicate; `and` / `or` extend it.
pub struct InJoinExpectingAnd;
/// Marker: inside the SELECT list; `comma` adds entries.
pub struct InSelectExpectingComma;
/// Marker: inside the WHERE predicate; `and` / `or` extend it.
pub struct InWhereExpectingAnd;
/// Marker: inside GROUP BY; `comma` adds entries.
pub struct InGroupByExpectingComma;
/// Marker: inside the HAVING predicate; `and` / `or` extend it.
pub struct InHavingExpectingAnd;
/// Marker: inside ORDER BY; `then` / `then_desc` add entries.
pub struct InOrderByExpectingThen;
/// Marker: after a union; more unions, options and terminals may follow.
pub struct InUnionExpectingUnion;
/// Marker: only statement options and terminals remain.
pub struct ExpectingEndOfStatement;

/// Positions from which further sources may be joined and the projection
/// chosen.
pub trait JoinStage {}
impl JoinStage for ExpectingJoin {}
impl JoinStage for InJoinExpectingAnd {}

/// Positions from which the WHERE clause may start.
pub trait WhereStage {}
impl<S: JoinStage> WhereStage for S {}
impl WhereStage for InSelectExpectingComma {}

/// Positions from which GROUP BY may start.
pub trait GroupStage {}
impl<S: WhereStage> GroupStage for S {}
impl GroupStage for InWhereExpectingAnd {}

/// Positions from which ORDER BY may start.
pub trait OrderStage {}
impl<S: GroupStage> OrderStage for S {}
impl OrderStage for InGroupByExpectingComma {}
impl OrderStage for InHavingExpectingAnd {}

/// Positions from which a union may follow.
pub trait UnionStage {}
impl<S: OrderStage> UnionStage for S {}
impl UnionStage for InUnionExpectingUnion {}

/// Positions at which the statement is complete: it can be rendered,
/// executed, paginated or given locking options.
pub trait Complete {}
impl<S: OrderStage> Complete for S {}
impl Complete for InOrderByExpectingThen {}
impl Complete for InUnionExpectingUnion {}
impl Complete for ExpectingEndOfStatement {}

/// Where a predicate lands.
#[derive(Debug, Clone, Copy)]
enum Slot {
    On,
    Where,
    Having,
}

/// A SELECT statement under construction.
///
/// See the [module documentation](self) for the grammar.
#[must_use]
pub struct Select<Sh, S> {
    query: Query,
    scope: Scope,
    error: Option<QueryError>,
    _state: PhantomData<fn() -> (Sh, S)>,
}

/// Starts a sub-query whose columns may also resolve against an enclosing
/// statement.
///
/// ```rust
/// use oxide_query_core::{exists, Alias, Database, Subquery};
/// use oxide_query_derive::Table;
///
/// #[derive(Table)]
/// pub struct Employee {
///     id: i64,
///     manager_id: i64,
/// }
///
/// # fn main() {
/// let e = Alias::<EmployeeTable>::new("e");
/// let m = Alias::<EmployeeTable>::new("m");
/// let outer = Database::default().from(&e);
/// let reports = Subquery::within(outer.scope())
///     .from(&m)
///     .where_(m.col(Employee::manager_id()))
///     .is_equal_to(e.col(Employee::id()));
/// let sql = outer.where_clause(exists(reports)).sql().unwrap();
/// assert_eq!(
///     sql,
///     "select e.* from EMPLOYEE as e where exists (select m.* from EMPLOYEE as m where m.MANAGER_ID = e.ID)"
/// );
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Subquery {
    scope: Scope,
}

impl Subquery {
    /// A sub-query nested in `outer`.
    #[must_use]
    pub fn within(outer: &Scope) -> Self {
        Self {
            scope: outer.nested(),
        }
    }

    /// Starts the sub-query's FROM tree.
    pub fn from<R: Table>(self, alias: &Alias<R>) -> Select<(R::Row,), ExpectingJoin> {
        Select::start(self.scope, alias)
    }
}

/// Continuation that files a finished predicate into a statement clause.
pub struct Clause<Sh, S> {
    select: Select<Sh, S>,
    slot: Slot,
    op: Option<BinaryOp>,
}

impl<Sh, S> Continuation for Clause<Sh, S> {
    type Output = Select<Sh, S>;

    fn complete(self, predicate: Condition) -> Select<Sh, S> {
        let mut select = self.select;
        select.attach(self.slot, self.op, predicate);
        select
    }
}

fn combine(existing: Option<Expr>, op: Option<BinaryOp>, expr: Expr) -> Expr {
    match (existing, op) {
        (Some(left), Some(op)) => Expr::binary(op, left, expr),
        _ => expr,
    }
}

impl<R> Select<(R,), ExpectingJoin> {
    pub(crate) fn start<T: Table<Row = R>>(scope: Scope, alias: &Alias<T>) -> Self {
        Self {
            query: Query::new(alias.erased().clone()),
            scope: scope.plus(alias),
            error: None,
            _state: PhantomData,
        }
    }
}

impl<Sh, S> Select<Sh, S> {
    fn transition<Sh2, To>(self) -> Select<Sh2, To> {
        Select {
            query: self.query,
            scope: self.scope,
            error: self.error,
            _state: PhantomData,
        }
    }

    /// The aliases visible at this point, for correlated sub-queries.
    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The first error recorded so far, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&QueryError> {
        self.error.as_ref()
    }

    /// Binds `e` against the current scope, recording the first failure.
    fn admit<T>(&mut self, e: TypedExpression<T>) -> Option<Expr> {
        let (expr, error) = e.into_parts();
        if self.error.is_some() {
            return None;
        }
        let bound = match error {
            Some(err) => Err(err),
            None => expr.bind(&self.scope),
        };
        match bound {
            Ok(expr) => Some(expr),
            Err(err) => {
                self.error = Some(err);
                None
            }
        }
    }

    fn attach(&mut self, slot: Slot, op: Option<BinaryOp>, predicate: Condition) {
        let Some(expr) = self.admit(predicate) else {
            return;
        };
        match slot {
            Slot::On => {
                let Some(join) = self.query.joins.last_mut() else {
                    return;
                };
                if op.is_none() && !expr.references(&join.alias) {
                    self.error = Some(QueryError::InvalidJoin {
                        alias: String::from(join.alias.display_name()),
                    });
                    return;
                }
                join.on = Some(combine(join.on.take(), op, expr));
            }
            Slot::Where => self.query.filter = Some(combine(self.query.filter.take(), op, expr)),
            Slot::Having => self.query.having = Some(combine(self.query.having.take(), op, expr)),
        }
    }

    fn clause<To, X: Typed>(
        self,
        x: X,
        slot: Slot,
        op: Option<BinaryOp>,
    ) -> ExpressionBuilder<X::Type, Clause<Sh, To>> {
        ExpressionBuilder::new(
            x.into_expression(),
            Clause {
                select: self.transition(),
                slot,
                op,
            },
        )
    }

    fn with_predicate<To>(
        mut self,
        slot: Slot,
        op: Option<BinaryOp>,
        predicate: Condition,
    ) -> Select<Sh, To> {
        self.attach(slot, op, predicate);
        self.transition()
    }

    fn add_join<Sh2, To, R: Table>(mut self, kind: JoinKind, alias: &Alias<R>) -> Select<Sh2, To> {
        self.query.joins.push(Join {
            kind,
            alias: alias.erased().clone(),
            on: None,
        });
        self.scope = self.scope.plus(alias);
        self.transition()
    }

    fn project<X: Typed>(mut self, x: X, label: Option<String>) -> Self {
        if let Some(expr) = self.admit(x.into_expression()) {
            self.query.projection.push(Projected { expr, label });
        }
        self
    }

    fn order<X: Typed>(mut self, x: X, descending: bool) -> Self {
        if let Some(expr) = self.admit(x.into_expression()) {
            self.query.order_by.push(OrderItem { expr, descending });
        }
        self
    }

    fn group<X: Typed>(mut self, x: X) -> Self {
        if let Some(expr) = self.admit(x.into_expression()) {
            self.query.group_by.push(expr);
        }
        self
    }

    fn combine_with<S2>(
        mut self,
        operator: SetOperator,
        other: Select<Sh, S2>,
    ) -> Select<Sh, InUnionExpectingUnion> {
        if self.error.is_none() {
            match other.error {
                Some(err) => self.error = Some(err),
                None => self.query.unions.push((operator, other.query)),
            }
        }
        self.transition()
    }
}

// ============================================================================
// FROM tree
// ============================================================================

impl<Sh, S: JoinStage> Select<Sh, S> {
    /// `join <alias>`; the ON predicate follows.
    pub fn join<R: Table>(self, alias: &Alias<R>) -> Select<<Sh as Append<R::Row>>::Output, ExpectingOn>
    where
        Sh: Append<R::Row>,
    {
        self.add_join(JoinKind::Inner, alias)
    }

    /// `left join <alias>`; the joined row comes back as `Option`. Columns
    /// of `alias` named in an explicit projection should go through
    /// [`Typed::nullable`].
    pub fn left_join<R: Table>(
        self,
        alias: &Alias<R>,
    ) -> Select<<Sh as Append<Option<R::Row>>>::Output, ExpectingOn>
    where
        Sh: Append<Option<R::Row>>,
    {
        self.add_join(JoinKind::Left, alias)
    }

    /// `right join <alias>`; every earlier row comes back as `Option`.
    pub fn right_join<R: Table>(
        self,
        alias: &Alias<R>,
    ) -> Select<<<Sh as Nullable>::Output as Append<R::Row>>::Output, ExpectingOn>
    where
        Sh: Nullable,
        <Sh as Nullable>::Output: Append<R::Row>,
    {
        self.add_join(JoinKind::Right, alias)
    }

    /// `full outer join <alias>`; every row comes back as `Option`.
    pub fn full_outer_join<R: Table>(
        self,
        alias: &Alias<R>,
    ) -> Select<<<Sh as Nullable>::Output as Append<Option<R::Row>>>::Output, ExpectingOn>
    where
        Sh: Nullable,
        <Sh as Nullable>::Output: Append<Option<R::Row>>,
    {
        self.add_join(JoinKind::Full, alias)
    }

    /// `cross join <alias>`; takes no predicate.
    pub fn cross_join<R: Table>(self, alias: &Alias<R>) -> Select<<Sh as Append<R::Row>>::Output, ExpectingJoin>
    where
        Sh: Append<R::Row>,
    {
        self.add_join(JoinKind::Cross, alias)
    }

    /// Replaces the default `alias.*` projection with `x`.
    pub fn select<X: Typed>(self, x: X) -> Select<(X::Type,), InSelectExpectingComma> {
        self.project(x, None).transition()
    }

    /// Like [`Select::select`], labelling the column `label`.
    pub fn select_as<X: Typed>(self, x: X, label: impl Into<String>) -> Select<(X::Type,), InSelectExpectingComma> {
        self.project(x, Some(label.into())).transition()
    }
}

impl<Sh> Select<Sh, ExpectingOn> {
    /// Starts the ON predicate of the last join. It must reference the
    /// joined alias.
    pub fn on<X: Typed>(self, x: X) -> ExpressionBuilder<X::Type, Clause<Sh, InJoinExpectingAnd>> {
        self.clause(x, Slot::On, None)
    }

    /// Uses a complete condition as the ON predicate.
    pub fn on_clause(self, condition: Condition) -> Select<Sh, InJoinExpectingAnd> {
        self.with_predicate(Slot::On, None, condition)
    }
}

macro_rules! predicate_stage {
    ($stage:ident, $slot:expr, $clause:literal) => {
        impl<Sh> Select<Sh, $stage> {
            #[doc = concat!("Extends the ", $clause, " predicate with `and <x> ...`.")]
            pub fn and<X: Typed>(self, x: X) -> ExpressionBuilder<X::Type, Clause<Sh, $stage>> {
                self.clause(x, $slot, Some(BinaryOp::And))
            }

            #[doc = concat!("Extends the ", $clause, " predicate with `or <x> ...`.")]
            pub fn or<X: Typed>(self, x: X) -> ExpressionBuilder<X::Type, Clause<Sh, $stage>> {
                self.clause(x, $slot, Some(BinaryOp::Or))
            }

            #[doc = concat!("Extends the ", $clause, " predicate with `and <condition>`.")]
            pub fn and_clause(self, condition: Condition) -> Self {
                self.with_predicate($slot, Some(BinaryOp::And), condition)
            }

            #[doc = concat!("Extends the ", $clause, " predicate with `or <condition>`.")]
            pub fn or_clause(self, condition: Condition) -> Self {
                self.with_predicate($slot, Some(BinaryOp::Or), condition)
            }
        }
    };
}

predicate_stage!(InJoinExpectingAnd, Slot::On, "ON");
predicate_stage!(InWhereExpectingAnd, Slot::Where, "WHERE");
predicate_stage!(InHavingExpectingAnd, Slot::Having, "HAVING");

// ============================================================================
// Projection
// ============================================================================

impl<Sh> Select<Sh, InSelectExpectingComma> {
    /// Adds `x` to the SELECT list.
    pub fn comma<X: Typed>(self, x: X) -> Select<<Sh as Append<X::Type>>::Output, InSelectExpectingComma>
    where
        Sh: Append<X::Type>,
    {
        self.project(x, None).transition()
    }

    /// Adds `x` to the SELECT list, labelled `label`.
    pub fn comma_as<X: Typed>(
        self,
        x: X,
        label: impl Into<String>,
    ) -> Select<<Sh as Append<X::Type>>::Output, InSelectExpectingComma>
    where
        Sh: Append<X::Type>,
    {
        self.project(x, Some(label.into())).transition()
    }

    /// `select distinct ...`
    pub fn distinct(mut self) -> Self {
        self.query.distinct = true;
        self
    }
}

// ============================================================================
// WHERE / GROUP BY / HAVING / ORDER BY
// ============================================================================

impl<Sh, S: WhereStage> Select<Sh, S> {
    /// Starts the WHERE predicate with `x`.
    pub fn where_<X: Typed>(self, x: X) -> ExpressionBuilder<X::Type, Clause<Sh, InWhereExpectingAnd>> {
        self.clause(x, Slot::Where, None)
    }

    /// Uses a complete condition as the WHERE predicate.
    pub fn where_clause(self, condition: Condition) -> Select<Sh, InWhereExpectingAnd> {
        self.with_predicate(Slot::Where, None, condition)
    }
}

impl<Sh, S: GroupStage> Select<Sh, S> {
    /// `group by x`
    pub fn group_by<X: Typed>(self, x: X) -> Select<Sh, InGroupByExpectingComma> {
        self.group(x).transition()
    }
}

impl<Sh> Select<Sh, InGroupByExpectingComma> {
    /// Adds `x` to GROUP BY.
    pub fn comma<X: Typed>(self, x: X) -> Self {
        self.group(x)
    }

    /// Starts the HAVING predicate with `x`.
    pub fn having<X: Typed>(self, x: X) -> ExpressionBuilder<X::Type, Clause<Sh, InHavingExpectingAnd>> {
        self.clause(x, Slot::Having, None)
    }

    /// Uses a complete condition as the HAVING predicate.
    pub fn having_clause(self, condition: Condition) -> Select<Sh, InHavingExpectingAnd> {
        self.with_predicate(Slot::Having, None, condition)
    }
}

impl<Sh, S: OrderStage> Select<Sh, S> {
    /// `order by x`
    pub fn order_by<X: Typed>(self, x: X) -> Select<Sh, InOrderByExpectingThen> {
        self.order(x, false).transition()
    }

    /// `order by x desc`
    pub fn order_by_desc<X: Typed>(self, x: X) -> Select<Sh, InOrderByExpectingThen> {
        self.order(x, true).transition()
    }
}

impl<Sh> Select<Sh, InOrderByExpectingThen> {
    /// Adds an ascending ORDER BY entry.
    pub fn then<X: Typed>(self, x: X) -> Self {
        self.order(x, false)
    }

    /// Adds a descending ORDER BY entry.
    pub fn then_desc<X: Typed>(self, x: X) -> Self {
        self.order(x, true)
    }
}

// ============================================================================
// Unions
// ============================================================================

impl<Sh, S: UnionStage> Select<Sh, S> {
    /// `self union other`: rows of either statement, duplicates removed.
    /// Arguments of `other` follow those of `self`.
    pub fn union<S2: OrderStage>(self, other: Select<Sh, S2>) -> Select<Sh, InUnionExpectingUnion> {
        self.combine_with(SetOperator::Union, other)
    }

    /// `self union all other`: rows of both statements, duplicates kept.
    pub fn union_all<S2: OrderStage>(self, other: Select<Sh, S2>) -> Select<Sh, InUnionExpectingUnion> {
        self.combine_with(SetOperator::UnionAll, other)
    }
}

// ============================================================================
// Statement options and rendering
// ============================================================================

impl<Sh, S: Complete> Select<Sh, S> {
    /// Returns at most `n` rows.
    pub fn fetch_first(mut self, n: u64) -> Select<Sh, ExpectingEndOfStatement> {
        self.query.fetch_first = Some(n);
        self.transition()
    }

    /// Skips the first `n` rows.
    pub fn offset(mut self, n: u64) -> Select<Sh, ExpectingEndOfStatement> {
        self.query.offset = Some(n);
        self.transition()
    }

    /// Requests `level` for this query. Dialects that can only set isolation
    /// per transaction render nothing.
    pub fn with_isolation(mut self, level: IsolationLevel) -> Select<Sh, ExpectingEndOfStatement> {
        self.query.isolation = Some(level);
        self.transition()
    }

    /// Asks the database to keep `lock` on the rows read. Rendering fails
    /// with [`QueryError::UnsupportedDialectFeature`] if the dialect cannot
    /// express it.
    pub fn keep_locks(mut self, lock: LockLevel) -> Select<Sh, ExpectingEndOfStatement> {
        self.query.lock = Some(lock);
        self.transition()
    }

    pub(crate) fn into_query(self) -> Result<Query> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.query),
        }
    }

    /// Renders the SQL text and its positional arguments.
    pub fn build(&self) -> Result<(String, Vec<SqlValue>)> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.query.to_sql(self.scope.database())
    }

    /// Renders the SQL text.
    pub fn sql(&self) -> Result<String> {
        self.build().map(|(sql, _)| sql)
    }

    /// The positional arguments, in placeholder order. Fails exactly when
    /// [`Select::build`] does.
    pub fn arguments(&self) -> Result<Vec<SqlValue>> {
        self.build().map(|(_, args)| args)
    }

    fn prepare(&self) -> Result<(String, Vec<SqlValue>)> {
        let (sql, args) = self.build()?;
        debug!(sql = %sql, args = args.len(), "executing select");
        Ok((sql, args))
    }
}

// ============================================================================
// Terminals
// ============================================================================

fn at_most_one<T>(rows: Vec<T>) -> Result<Option<T>> {
    let count = rows.len();
    if count > 1 {
        return Err(QueryError::TooManyRows { count });
    }
    Ok(rows.into_iter().next())
}

impl<Sh, S> Select<Sh, S>
where
    Sh: Shape,
    Sh::Row: FromRow,
    S: Complete,
{
    /// Executes the statement and returns every row.
    pub fn list<E: SqlExecutor>(&self, executor: &E) -> Result<Vec<Sh::Row>> {
        let (sql, args) = self.prepare()?;
        executor.query(&sql, &args, decode::<Sh::Row>)
    }

    /// Executes the statement, expecting at most one row.
    pub fn optional<E: SqlExecutor>(&self, executor: &E) -> Result<Option<Sh::Row>> {
        at_most_one(self.list(executor)?)
    }

    /// Executes the statement, expecting exactly one row.
    pub fn single<E: SqlExecutor>(&self, executor: &E) -> Result<Sh::Row> {
        self.optional(executor)?.ok_or(QueryError::NoSuchRow)
    }
}

impl<Sh, S> Select<Sh, S>
where
    Sh: Shape,
    Sh::Row: FromRow + Send + 'static,
    S: Complete,
{
    /// Executes the statement asynchronously and returns every row.
    pub async fn list_async<E: AsyncSqlExecutor>(&self, executor: &E) -> Result<Vec<Sh::Row>> {
        let (sql, args) = self.prepare()?;
        executor.query_async(sql, args, decode::<Sh::Row>).await
    }

    /// Executes the statement asynchronously, expecting at most one row.
    pub async fn optional_async<E: AsyncSqlExecutor>(&self, executor: &E) -> Result<Option<Sh::Row>> {
        at_most_one(self.list_async(executor).await?)
    }

    /// Executes the statement asynchronously, expecting exactly one row.
    pub async fn single_async<E: AsyncSqlExecutor>(&self, executor: &E) -> Result<Sh::Row> {
        self.optional_async(executor).await?.ok_or(QueryError::NoSuchRow)
    }
}

/// A one-column statement used as a scalar sub-query operand.
impl<T, S: Complete> Typed for Select<(T,), S> {
    type Type = T;

    fn into_expression(self) -> TypedExpression<T> {
        match self.into_query() {
            Ok(query) => TypedExpression::new(Expr::Subquery(Box::new(query))),
            Err(err) => TypedExpression::with_error(Expr::CountAll, Some(err)),
        }
    }
}

impl<Sh, S> fmt::Debug for Select<Sh, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Select")
            .field("query", &self.query)
            .field("scope", &self.scope)
            .field("error", &self.error)
            .finish()
    }
}
