//! sqlweave core - a dialect-aware fluent SQL statement builder
//!
//! Statements are assembled through chained calls, every value is bound as a
//! named parameter and identifiers are quoted for the target dialect.
//!
//! ```
//! use sqlweave_core::{op, QueryBuilder, Sql, Value};
//!
//! let sql = Sql::mysql();
//! let stmt = sql
//!     .update()
//!     .table("users").unwrap()
//!     .set("name", "Bob")
//!     .where_(("id", "=", 5)).unwrap()
//!     .render()
//!     .unwrap();
//!
//! assert_eq!(stmt.sql, "UPDATE `users` SET `name` = :name WHERE `id` = :p0");
//! assert_eq!(stmt.params["name"], Value::from("Bob"));
//! assert_eq!(stmt.params["p0"], Value::I32(5));
//!
//! let stmt = sql
//!     .select()
//!     .from(("u", "users")).unwrap()
//!     .where_(("age", op::GTE, 18)).unwrap()
//!     .render()
//!     .unwrap();
//! assert_eq!(stmt.sql, "SELECT * FROM `users` AS `u` WHERE `age` >= :p0");
//! ```

pub mod binder;
pub mod builder;
pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod literal;
pub mod operator;
pub mod statement;
pub mod table;
pub mod value;

// Re-export main types
pub use binder::{ParamRef, ParameterBinder};
pub use builder::{
    DeleteBuilder, InsertBuilder, IntoCondition, JoinType, PredicateBuilder, QueryBuilder,
    SelectBuilder, SortDirection, UpdateBuilder,
};
pub use config::{ConnectionConfig, Driver};
pub use dialect::{Dialect, DialectRef};
pub use error::{Error, Result};
pub use executor::{Database, ExecResult, ExecutableModification, ExecutableQuery, Executor, Row};
pub use literal::{func, Literal};
pub use operator::{op, IntoOperator, Operator};
pub use statement::{PlaceholderStyle, Statement};
pub use table::{IntoTableRef, TableRef};
pub use value::Value;

/// Builder factory bound to one dialect
#[derive(Debug, Clone)]
pub struct Sql {
    dialect: DialectRef,
}

impl Sql {
    pub fn new(dialect: DialectRef) -> Self {
        Self { dialect }
    }

    /// ANSI double-quote quoting
    pub fn generic() -> Self {
        Self::new(dialect::generic())
    }

    /// Back-tick quoting
    pub fn mysql() -> Self {
        Self::new(dialect::mysql())
    }

    pub fn dialect(&self) -> &DialectRef {
        &self.dialect
    }

    pub fn select(&self) -> SelectBuilder {
        SelectBuilder::new(self.dialect.clone())
    }

    pub fn insert(&self) -> InsertBuilder {
        InsertBuilder::new(self.dialect.clone())
    }

    pub fn update(&self) -> UpdateBuilder {
        UpdateBuilder::new(self.dialect.clone())
    }

    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::new(self.dialect.clone())
    }

    /// Hand-written SQL with `:name` placeholders
    pub fn literal(&self, sql: impl Into<String>) -> Literal {
        Literal::new(sql)
    }
}
