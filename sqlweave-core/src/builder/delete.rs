//! DELETE query builder module

use super::common::{finish, impl_where_methods, QueryBuilder, QueryCore};
use crate::table::IntoTableRef;
use crate::{DialectRef, Result, Statement};

/// DELETE query builder
///
/// A DELETE without conditions renders as-is and removes every row.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    core: QueryCore,
}

impl DeleteBuilder {
    pub fn new(dialect: DialectRef) -> Self {
        Self {
            core: QueryCore::new(dialect),
        }
    }

    /// Set the table to delete from
    pub fn from<T: IntoTableRef>(mut self, table: T) -> Result<Self> {
        self.core.set_table(table)?;
        Ok(self)
    }
}

impl_where_methods!(DeleteBuilder);

impl QueryBuilder for DeleteBuilder {
    fn render(&self) -> Result<Statement> {
        let table = self.core.table_sql("DELETE")?;
        let mut binder = self.core.binder();

        let mut sql = format!("DELETE FROM {}", table);
        if let Some(predicate) = self.core.render_where(&mut binder) {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }

        Ok(finish("DELETE", sql, binder))
    }
}
