//! UPDATE query builder module

use super::common::{finish, impl_assignment_methods, impl_where_methods, QueryBuilder, QueryCore};
use crate::table::IntoTableRef;
use crate::{DialectRef, Error, Result, Statement};

/// UPDATE query builder
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    core: QueryCore,
}

impl UpdateBuilder {
    /// Create a new UPDATE query builder
    pub fn new(dialect: DialectRef) -> Self {
        Self {
            core: QueryCore::new(dialect),
        }
    }

    /// Set the table to update
    ///
    /// # Examples
    /// ```
    /// use sqlweave_core::{dialect, QueryBuilder, UpdateBuilder};
    ///
    /// let query = UpdateBuilder::new(dialect::mysql())
    ///     .table("users").unwrap()
    ///     .set("name", "Jane")
    ///     .where_(("id", 1)).unwrap();
    ///
    /// assert_eq!(
    ///     query.to_sql().unwrap(),
    ///     "UPDATE `users` SET `name` = :name WHERE `id` = :p0"
    /// );
    /// ```
    pub fn table<T: IntoTableRef>(mut self, table: T) -> Result<Self> {
        self.core.set_table(table)?;
        Ok(self)
    }
}

impl_where_methods!(UpdateBuilder);
impl_assignment_methods!(UpdateBuilder);

impl QueryBuilder for UpdateBuilder {
    fn render(&self) -> Result<Statement> {
        let table = self.core.table_sql("UPDATE")?;
        if self.core.assignments.is_empty() {
            return Err(Error::logic("UPDATE requires SET clauses"));
        }

        let mut binder = self.core.binder();
        let set_parts: Vec<String> = self
            .core
            .render_assignments(&mut binder)
            .into_iter()
            .map(|(column, value)| format!("{} = {}", column, value))
            .collect();

        let mut sql = format!("UPDATE {} SET {}", table, set_parts.join(", "));

        if let Some(predicate) = self.core.render_where(&mut binder) {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }

        Ok(finish("UPDATE", sql, binder))
    }
}
