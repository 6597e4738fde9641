//! INSERT query builder module

use super::common::{
    finish, impl_assignment_methods, impl_where_methods, IntoColumns, QueryBuilder, QueryCore,
};
use crate::table::IntoTableRef;
use crate::{DialectRef, Error, Result, Statement};

/// INSERT query builder
///
/// Values are bound under their column names:
///
/// ```
/// use sqlweave_core::{dialect, InsertBuilder, QueryBuilder};
///
/// let stmt = InsertBuilder::new(dialect::mysql())
///     .into("users").unwrap()
///     .set("name", "Ada")
///     .set("age", 36)
///     .render()
///     .unwrap();
///
/// assert_eq!(stmt.sql, "INSERT INTO `users` (`name`, `age`) VALUES (:name, :age)");
/// ```
///
/// WHERE conditions can be attached like on every other builder, but an
/// INSERT carrying one fails to render.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    core: QueryCore,
    returning: Vec<String>,
}

impl InsertBuilder {
    pub fn new(dialect: DialectRef) -> Self {
        Self {
            core: QueryCore::new(dialect),
            returning: Vec::new(),
        }
    }

    /// Set the target table
    pub fn into<T: IntoTableRef>(mut self, table: T) -> Result<Self> {
        self.core.set_table(table)?;
        Ok(self)
    }

    /// Request generated columns back (`RETURNING ...`)
    pub fn returning<C: IntoColumns>(mut self, columns: C) -> Self {
        self.returning.extend(columns.into_columns());
        self
    }
}

impl_where_methods!(InsertBuilder);
impl_assignment_methods!(InsertBuilder);

impl QueryBuilder for InsertBuilder {
    fn render(&self) -> Result<Statement> {
        let table = self.core.table_sql("INSERT")?;

        if !self.core.predicate.is_empty() {
            return Err(Error::logic("INSERT does not accept WHERE conditions"));
        }
        if self.core.assignments.is_empty() {
            return Err(Error::logic("INSERT requires at least one column value"));
        }
        if !self.returning.is_empty() && !self.core.dialect.supports_returning() {
            return Err(Error::logic(format!(
                "The {} dialect does not support RETURNING",
                self.core.dialect.name()
            )));
        }

        let mut binder = self.core.binder();
        let (columns, values): (Vec<String>, Vec<String>) =
            self.core.render_assignments(&mut binder).into_iter().unzip();

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            values.join(", ")
        );

        if !self.returning.is_empty() {
            let returning: Vec<String> = self
                .returning
                .iter()
                .map(|column| self.core.quote(column))
                .collect();
            sql.push_str(" RETURNING ");
            sql.push_str(&returning.join(", "));
        }

        Ok(finish("INSERT", sql, binder))
    }
}
