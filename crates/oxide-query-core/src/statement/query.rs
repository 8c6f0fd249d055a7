//! The statement-under-construction and its rendering.

use tracing::debug;

use crate::database::Database;
use crate::dialect::{IsolationLevel, LockLevel};
use crate::error::{QueryError, Result};
use crate::expression::{Expr, OrderItem};
use crate::render::SqlWriter;
use crate::scope::{AliasSource, AnyAlias};
use crate::value::SqlValue;

/// Kind of a FROM-tree join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Inner => " join ",
            Self::Left => " left join ",
            Self::Right => " right join ",
            Self::Full => " full outer join ",
            Self::Cross => " cross join ",
        }
    }
}

/// Set operator joining two statements of the same shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetOperator {
    Union,
    UnionAll,
}

impl SetOperator {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Union => " union ",
            Self::UnionAll => " union all ",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Join {
    pub(crate) kind: JoinKind,
    pub(crate) alias: AnyAlias,
    pub(crate) on: Option<Expr>,
}

/// One SELECT list entry.
#[derive(Debug, Clone)]
pub(crate) struct Projected {
    pub(crate) expr: Expr,
    pub(crate) label: Option<String>,
}

/// A SELECT statement with every column reference bound.
///
/// Only ever appended to while the builder runs; once it leaves the builder
/// it is rendered as is.
#[derive(Debug, Clone)]
pub(crate) struct Query {
    pub(crate) distinct: bool,
    /// Empty means `alias.*` for every source.
    pub(crate) projection: Vec<Projected>,
    pub(crate) from: AnyAlias,
    pub(crate) joins: Vec<Join>,
    pub(crate) filter: Option<Expr>,
    pub(crate) group_by: Vec<Expr>,
    pub(crate) having: Option<Expr>,
    /// Further statements combined with this one; ordering, pagination and
    /// locking below apply to the combined result.
    pub(crate) unions: Vec<(SetOperator, Query)>,
    pub(crate) order_by: Vec<OrderItem>,
    pub(crate) fetch_first: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) isolation: Option<IsolationLevel>,
    pub(crate) lock: Option<LockLevel>,
}

impl Query {
    pub(crate) const fn new(from: AnyAlias) -> Self {
        Self {
            distinct: false,
            projection: Vec::new(),
            from,
            joins: Vec::new(),
            filter: None,
            group_by: Vec::new(),
            having: None,
            unions: Vec::new(),
            order_by: Vec::new(),
            fetch_first: None,
            offset: None,
            isolation: None,
            lock: None,
        }
    }

    /// Renders against `database`, returning the SQL and its arguments.
    ///
    /// Common table expressions used anywhere in the tree are declared once,
    /// in a WITH clause ahead of this statement.
    pub(crate) fn to_sql(&self, database: &Database) -> Result<(String, Vec<SqlValue>)> {
        let mut w = SqlWriter::new(database);
        self.render(&mut w)?;
        let common = w.take_common();
        if common.is_empty() {
            return Ok(w.finish());
        }

        let mut declared = Vec::new();
        for alias in common {
            declare(alias, database, &mut declared)?;
        }
        debug!(count = declared.len(), "hoisting common table expressions");
        let mut w = SqlWriter::new(database);
        w.push("with ");
        for (i, alias) in declared.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push(alias.display_name());
            w.push(" as (");
            if let AliasSource::Common(query) = alias.source() {
                query.render(&mut w)?;
            }
            w.push(")");
        }
        w.push(" ");
        self.render(&mut w)?;
        Ok(w.finish())
    }

    fn sources(&self) -> impl Iterator<Item = &AnyAlias> {
        std::iter::once(&self.from).chain(self.joins.iter().map(|j| &j.alias))
    }

    pub(crate) fn render(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        w.push(if self.distinct { "select distinct " } else { "select " });
        self.render_projection(w)?;

        w.push(" from ");
        render_source(&self.from, w)?;
        for join in &self.joins {
            w.push(join.kind.keyword());
            render_source(&join.alias, w)?;
            if let Some(on) = &join.on {
                w.push(" on ");
                on.render(w)?;
            }
        }

        if let Some(filter) = &self.filter {
            w.push(" where ");
            filter.render(w)?;
        }

        if !self.group_by.is_empty() {
            w.push(" group by ");
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    w.push(", ");
                }
                expr.render(w)?;
            }
        }

        if let Some(having) = &self.having {
            w.push(" having ");
            having.render(w)?;
        }

        for (operator, operand) in &self.unions {
            w.push(operator.keyword());
            operand.render(w)?;
        }

        if !self.order_by.is_empty() {
            w.push(" order by ");
            for (i, item) in self.order_by.iter().enumerate() {
                if i > 0 {
                    w.push(", ");
                }
                item.render(w)?;
            }
        }

        if self.fetch_first.is_some() || self.offset.is_some() {
            let pagination = w.dialect().pagination_sql(
                self.fetch_first,
                self.offset,
                !self.order_by.is_empty(),
            );
            w.push(&pagination);
        }

        self.render_locking(w)
    }

    fn render_projection(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        if self.projection.is_empty() {
            for (i, alias) in self.sources().enumerate() {
                if i > 0 {
                    w.push(", ");
                }
                w.push(alias.display_name());
                w.push(".*");
            }
            return Ok(());
        }
        for (i, item) in self.projection.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            item.expr.render(w)?;
            let label = item
                .label
                .clone()
                .or_else(|| item.expr.default_label(i + 1));
            if let Some(label) = label {
                w.push(" as ");
                w.push(&label);
            }
        }
        Ok(())
    }

    fn render_locking(&self, w: &mut SqlWriter<'_>) -> Result<()> {
        let dialect = w.dialect();
        if let Some(lock) = self.lock {
            let sql = dialect
                .keep_locks_sql(self.isolation, lock)
                .ok_or_else(|| QueryError::unsupported(dialect.name(), format!("keeping {lock} locks")))?;
            w.push(&sql);
        } else if let Some(level) = self.isolation {
            match dialect.isolation_level_sql(level) {
                Some(sql) => w.push(&sql),
                None => debug!(dialect = dialect.name(), ?level, "omitting query isolation level"),
            }
        }
        Ok(())
    }
}

fn render_source(alias: &AnyAlias, w: &mut SqlWriter<'_>) -> Result<()> {
    let dialect = w.dialect();
    match alias.source() {
        AliasSource::Table => {
            let name = w.database().qualified_table_name(alias.table());
            w.push(&name);
        }
        AliasSource::Temporary => {
            let name = dialect
                .temporary_table_name(alias.table().name())
                .ok_or_else(|| QueryError::unsupported(dialect.name(), "local temporary tables"))?;
            w.push(&name);
        }
        AliasSource::Derived(query) => {
            w.push("(");
            query.render(w)?;
            w.push(")");
        }
        AliasSource::Common(_) => {
            w.note_common(alias);
            w.push(alias.display_name());
            return Ok(());
        }
    }
    if let Some(name) = alias.explicit_name() {
        w.push(dialect.table_alias_separator());
        w.push(name);
    }
    Ok(())
}

/// Appends `alias` to `declared` after every common table expression its own
/// query uses.
fn declare(alias: AnyAlias, database: &Database, declared: &mut Vec<AnyAlias>) -> Result<()> {
    if declared.iter().any(|seen| seen.same(&alias)) {
        return Ok(());
    }
    if let AliasSource::Common(query) = alias.source() {
        let mut scan = SqlWriter::new(database);
        query.render(&mut scan)?;
        for used in scan.take_common() {
            declare(used, database, declared)?;
        }
    }
    declared.push(alias);
    Ok(())
}
