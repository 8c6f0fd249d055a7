//! Single-pass SQL writer shared by statements and expressions.

use tracing::debug;

use crate::database::Database;
use crate::dialect::Dialect;
use crate::scope::AnyAlias;
use crate::value::SqlValue;

/// Accumulates SQL text and the bound arguments in placeholder order.
///
/// Placeholders are only ever written through [`SqlWriter::push_param`], which
/// records the value at the same moment, so text and arguments cannot drift.
pub(crate) struct SqlWriter<'d> {
    database: &'d Database,
    sql: String,
    args: Vec<SqlValue>,
    /// Common table expressions referenced so far, in first-use order.
    common: Vec<AnyAlias>,
}

impl<'d> SqlWriter<'d> {
    pub(crate) const fn new(database: &'d Database) -> Self {
        Self {
            database,
            sql: String::new(),
            args: Vec::new(),
            common: Vec::new(),
        }
    }

    pub(crate) fn dialect(&self) -> &'d dyn Dialect {
        self.database.dialect()
    }

    pub(crate) const fn database(&self) -> &'d Database {
        self.database
    }

    pub(crate) fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    pub(crate) fn push_param(&mut self, value: &SqlValue) {
        self.args.push(value.clone());
        let placeholder = self.dialect().parameter_placeholder(self.args.len());
        self.sql.push_str(&placeholder);
    }

    /// Writes `value` as a literal. Values with no SQL literal spelling
    /// (non-finite floats) are bound instead.
    pub(crate) fn push_inline(&mut self, value: &SqlValue) {
        if !value.has_literal() {
            debug!(?value, "binding value that has no literal form");
            self.push_param(value);
            return;
        }
        let literal = self.dialect().inline_literal(value);
        self.sql.push_str(&literal);
    }

    /// Records a reference to a common table expression.
    pub(crate) fn note_common(&mut self, alias: &AnyAlias) {
        if !self.common.iter().any(|seen| seen.same(alias)) {
            self.common.push(alias.clone());
        }
    }

    pub(crate) fn take_common(&mut self) -> Vec<AnyAlias> {
        std::mem::take(&mut self.common)
    }

    pub(crate) fn finish(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PostgresDialect;

    #[test]
    fn test_params_are_numbered_in_push_order() {
        let database = Database::new(PostgresDialect::new());
        let mut writer = SqlWriter::new(&database);
        writer.push("a = ");
        writer.push_param(&SqlValue::Int(1));
        writer.push(" and b = ");
        writer.push_param(&SqlValue::Text(String::from("x")));
        writer.push(" and c = ");
        writer.push_inline(&SqlValue::Bool(true));
        let (sql, args) = writer.finish();
        assert_eq!(sql, "a = $1 and b = $2 and c = true");
        assert_eq!(args, vec![SqlValue::Int(1), SqlValue::Text(String::from("x"))]);
    }

    #[test]
    fn test_non_finite_floats_are_bound_not_inlined() {
        let database = Database::default();
        let mut writer = SqlWriter::new(&database);
        writer.push_inline(&SqlValue::Float(2.5));
        writer.push(", ");
        writer.push_inline(&SqlValue::Float(f64::NAN));
        writer.push(", ");
        writer.push_inline(&SqlValue::Float(f64::NEG_INFINITY));
        let (sql, args) = writer.finish();
        assert_eq!(sql, "2.5, ?, ?");
        assert_eq!(args.len(), 2);
        assert!(matches!(args[0], SqlValue::Float(f) if f.is_nan()));
        assert_eq!(args[1], SqlValue::Float(f64::NEG_INFINITY));
    }
}
