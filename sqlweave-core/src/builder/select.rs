//! SELECT query builder implementation

use super::common::{
    finish, impl_where_methods, IntoColumns, JoinType, QueryBuilder, QueryCore, SortDirection,
};
use crate::table::{IntoTableRef, TableRef};
use crate::{DialectRef, Result, Statement};

/// A JOIN clause: `INNER JOIN "t" AS "a" ON "x" = "y"`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: TableRef,
    pub on: Option<(String, String)>,
}

/// ORDER BY entry
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    pub column: String,
    pub direction: SortDirection,
}

/// SELECT query builder
///
/// # Examples
/// ```
/// use sqlweave_core::{dialect, op, QueryBuilder, SelectBuilder};
///
/// let stmt = SelectBuilder::new(dialect::mysql())
///     .from(("u", "users")).unwrap()
///     .columns(("u.id", "u.name"))
///     .where_(("u.age", op::GTE, 18)).unwrap()
///     .order_by_asc("u.name")
///     .limit(10)
///     .render()
///     .unwrap();
///
/// assert_eq!(
///     stmt.sql,
///     "SELECT `u`.`id`, `u`.`name` FROM `users` AS `u` WHERE `u`.`age` >= :p0 ORDER BY `u`.`name` ASC LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    core: QueryCore,
    selected_columns: Vec<String>,
    distinct: bool,
    joins: Vec<JoinClause>,
    group_by_columns: Vec<String>,
    order_by_clauses: Vec<OrderByClause>,
    limit_value: Option<u64>,
    offset_value: Option<u64>,
}

impl SelectBuilder {
    /// Create a new SELECT query builder for `dialect`
    pub fn new(dialect: DialectRef) -> Self {
        Self {
            core: QueryCore::new(dialect),
            selected_columns: Vec::new(),
            distinct: false,
            joins: Vec::new(),
            group_by_columns: Vec::new(),
            order_by_clauses: Vec::new(),
            limit_value: None,
            offset_value: None,
        }
    }

    /// Set the FROM table, either a name or an `(alias, table)` pair
    pub fn from<T: IntoTableRef>(mut self, table: T) -> Result<Self> {
        self.core.set_table(table)?;
        Ok(self)
    }

    /// Select specific columns, replacing any previous selection.
    ///
    /// Wrap an expression in single quotes to emit it unquoted: `"'COUNT(*)'"`.
    pub fn columns<T: IntoColumns>(mut self, columns: T) -> Self {
        self.selected_columns = columns.into_columns();
        self
    }

    /// Append columns to the selection
    pub fn add_columns<T: IntoColumns>(mut self, columns: T) -> Self {
        self.selected_columns.extend(columns.into_columns());
        self
    }

    /// Select all columns (equivalent to SELECT *)
    pub fn select_all(mut self) -> Self {
        self.selected_columns.clear();
        self
    }

    /// Add DISTINCT to the query
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add a JOIN matching `left_column = right_column`
    pub fn join<T: IntoTableRef>(
        mut self,
        join_type: JoinType,
        table: T,
        left_column: &str,
        right_column: &str,
    ) -> Result<Self> {
        self.joins.push(JoinClause {
            join_type,
            table: table.into_table_ref()?,
            on: Some((left_column.to_string(), right_column.to_string())),
        });
        Ok(self)
    }

    pub fn inner_join<T: IntoTableRef>(self, table: T, left_column: &str, right_column: &str) -> Result<Self> {
        self.join(JoinType::Inner, table, left_column, right_column)
    }

    pub fn left_join<T: IntoTableRef>(self, table: T, left_column: &str, right_column: &str) -> Result<Self> {
        self.join(JoinType::Left, table, left_column, right_column)
    }

    pub fn right_join<T: IntoTableRef>(self, table: T, left_column: &str, right_column: &str) -> Result<Self> {
        self.join(JoinType::Right, table, left_column, right_column)
    }

    pub fn full_outer_join<T: IntoTableRef>(self, table: T, left_column: &str, right_column: &str) -> Result<Self> {
        self.join(JoinType::Full, table, left_column, right_column)
    }

    /// CROSS JOIN takes no ON clause
    pub fn cross_join<T: IntoTableRef>(mut self, table: T) -> Result<Self> {
        self.joins.push(JoinClause {
            join_type: JoinType::Cross,
            table: table.into_table_ref()?,
            on: None,
        });
        Ok(self)
    }

    /// Add GROUP BY columns
    pub fn group_by<C: IntoColumns>(mut self, columns: C) -> Self {
        self.group_by_columns.extend(columns.into_columns());
        self
    }

    /// Add ORDER BY clause
    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.order_by_clauses.push(OrderByClause {
            column: column.to_string(),
            direction,
        });
        self
    }

    /// Add ORDER BY ASC clause
    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by(column, SortDirection::Asc)
    }

    /// Add ORDER BY DESC clause
    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, SortDirection::Desc)
    }

    /// Set the LIMIT clause
    pub fn limit(mut self, count: u64) -> Self {
        self.limit_value = Some(count);
        self
    }

    /// Set the OFFSET clause
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_value = Some(offset);
        self
    }
}

impl_where_methods!(SelectBuilder);

impl QueryBuilder for SelectBuilder {
    fn render(&self) -> Result<Statement> {
        let table = self.core.table_sql("SELECT")?;
        let mut binder = self.core.binder();
        let mut sql = String::from("SELECT ");

        if self.distinct {
            sql.push_str("DISTINCT ");
        }

        if self.selected_columns.is_empty() {
            sql.push('*');
        } else {
            let columns: Vec<String> = self
                .selected_columns
                .iter()
                .map(|column| self.core.quote(column))
                .collect();
            sql.push_str(&columns.join(", "));
        }

        sql.push_str(" FROM ");
        sql.push_str(&table);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join.join_type.as_str());
            sql.push(' ');
            sql.push_str(&join.table.resolve(self.core.dialect.as_ref()));
            if let Some((left, right)) = &join.on {
                sql.push_str(&format!(
                    " ON {} = {}",
                    self.core.quote(left),
                    self.core.quote(right)
                ));
            }
        }

        if let Some(predicate) = self.core.render_where(&mut binder) {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }

        if !self.group_by_columns.is_empty() {
            let columns: Vec<String> = self
                .group_by_columns
                .iter()
                .map(|column| self.core.quote(column))
                .collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&columns.join(", "));
        }

        if !self.order_by_clauses.is_empty() {
            let clauses: Vec<String> = self
                .order_by_clauses
                .iter()
                .map(|clause| format!("{} {}", self.core.quote(&clause.column), clause.direction.as_str()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&clauses.join(", "));
        }

        if let Some(limit) = self.limit_value {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset_value {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        Ok(finish("SELECT", sql, binder))
    }
}
