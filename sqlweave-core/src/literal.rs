//! Literal SQL fragments with their own bind parameters

use std::fmt;

use indexmap::IndexMap;

use crate::binder::sanitize_name;
use crate::builder::QueryBuilder;
use crate::{Result, Statement, Value};

/// Pre-rendered SQL emitted verbatim.
///
/// A literal can stand in for a whole statement (hand-written SQL) or be used
/// as a value inside a WHERE condition or SET list, where its text is
/// interpolated directly instead of being bound. Its own parameters are merged
/// into the enclosing statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Literal {
    sql: String,
    params: IndexMap<String, Value>,
}

impl Literal {
    /// Create a literal without bind parameters
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: IndexMap::new(),
        }
    }

    /// Create a literal with bind parameters referenced as `:name` in `sql`
    pub fn with_params<I, K, V>(sql: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        params
            .into_iter()
            .fold(Self::new(sql), |literal, (name, value)| {
                literal.bind(name.as_ref(), value)
            })
    }

    /// Add a bind parameter
    pub fn bind(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(sanitize_name(name), value.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &IndexMap<String, Value> {
        &self.params
    }
}

/// Shorthand for a parameterless SQL expression such as `NOW()`
pub fn func(expression: impl Into<String>) -> Literal {
    Literal::new(expression)
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

impl QueryBuilder for Literal {
    fn render(&self) -> Result<Statement> {
        Ok(Statement::new(self.sql.clone(), self.params.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_literal() {
        let expression = "literal expression";
        let literal = func(expression);
        assert_eq!(literal.to_string(), expression);
        assert!(literal.params().is_empty());
    }

    #[test]
    fn test_render_is_untouched() {
        let literal = Literal::with_params(
            "SELECT * FROM tests WHERE id = :id",
            [("id", 1)],
        );
        let stmt = literal.render().unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM tests WHERE id = :id");
        assert_eq!(stmt.params["id"], Value::I32(1));
        assert_eq!(literal.render().unwrap(), stmt);
    }

    #[test]
    fn test_bind_strips_colon() {
        let literal = Literal::new("x = :x").bind(":x", "y");
        assert_eq!(literal.params().get("x"), Some(&Value::from("y")));
    }
}
