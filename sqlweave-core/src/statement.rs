//! Rendered statements and placeholder rewriting

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::dialect::Dialect;
use crate::{Error, Result, Value};

/// A rendered statement: SQL text with `:name` placeholders and the values bound to them
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Statement {
    pub sql: String,
    pub params: IndexMap<String, Value>,
}

/// Positional placeholder flavor expected by a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStyle {
    /// MySQL and SQLite use ?, ?, etc.
    #[default]
    Question,
    /// PostgreSQL uses $1, $2, etc.
    Dollar,
}

impl PlaceholderStyle {
    /// Get the placeholder for a 1-based parameter index
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::Question => "?".to_string(),
            Self::Dollar => format!("${}", index),
        }
    }
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: IndexMap<String, Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &IndexMap<String, Value> {
        &self.params
    }

    pub fn into_parts(self) -> (String, IndexMap<String, Value>) {
        (self.sql, self.params)
    }

    /// Rewrite `:name` placeholders into the driver's positional form.
    ///
    /// Text inside string literals and the dialect's quoted identifiers is left
    /// alone, as are `::` casts. Backslash escapes inside strings are honored
    /// only when the dialect uses them. With [`PlaceholderStyle::Dollar`] a
    /// name used twice reuses its index; with [`PlaceholderStyle::Question`]
    /// its value is repeated.
    ///
    /// ```
    /// use indexmap::IndexMap;
    /// use sqlweave_core::dialect::Generic;
    /// use sqlweave_core::{PlaceholderStyle, Statement, Value};
    ///
    /// let mut params = IndexMap::new();
    /// params.insert("id".to_string(), Value::I32(5));
    /// let stmt = Statement::new("SELECT * FROM \"t\" WHERE \"id\" = :id", params);
    ///
    /// let (sql, values) = stmt.to_positional(&Generic, PlaceholderStyle::Dollar).unwrap();
    /// assert_eq!(sql, "SELECT * FROM \"t\" WHERE \"id\" = $1");
    /// assert_eq!(values, vec![Value::I32(5)]);
    /// ```
    pub fn to_positional(
        &self,
        dialect: &dyn Dialect,
        style: PlaceholderStyle,
    ) -> Result<(String, Vec<Value>)> {
        let mut sql = String::with_capacity(self.sql.len());
        let mut values = Vec::new();
        let mut indexes: HashMap<&str, usize> = HashMap::new();
        let mut quote: Option<char> = None;
        let (ident_open, ident_close) = dialect.quote_chars();
        let backslash_escapes = dialect.backslash_escapes();

        let bytes = self.sql.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let c = bytes[i] as char;

            if let Some(q) = quote {
                if c == '\\' && backslash_escapes && (q == '\'' || q == '"') {
                    push_char_at(&mut sql, &self.sql, &mut i);
                    if i < bytes.len() {
                        push_char_at(&mut sql, &self.sql, &mut i);
                    }
                    continue;
                }
                if c == q {
                    quote = None;
                }
                push_char_at(&mut sql, &self.sql, &mut i);
                continue;
            }

            match c {
                '\'' | '"' => {
                    quote = Some(c);
                    push_char_at(&mut sql, &self.sql, &mut i);
                }
                c if c == ident_open => {
                    quote = Some(ident_close);
                    push_char_at(&mut sql, &self.sql, &mut i);
                }
                ':' if bytes.get(i + 1) == Some(&b':') => {
                    sql.push_str("::");
                    i += 2;
                }
                ':' if bytes
                    .get(i + 1)
                    .is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_') =>
                {
                    let start = i + 1;
                    let mut end = start;
                    while end < bytes.len()
                        && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
                    {
                        end += 1;
                    }
                    let name = &self.sql[start..end];
                    let value = self.params.get(name).ok_or_else(|| {
                        Error::invalid_argument(format!("No value bound for placeholder ':{}'", name))
                    })?;

                    match style {
                        PlaceholderStyle::Question => {
                            values.push(value.clone());
                            sql.push_str(&style.placeholder(values.len()));
                        }
                        PlaceholderStyle::Dollar => {
                            let index = match indexes.get(name) {
                                Some(index) => *index,
                                None => {
                                    values.push(value.clone());
                                    indexes.insert(name, values.len());
                                    values.len()
                                }
                            };
                            sql.push_str(&style.placeholder(index));
                        }
                    }
                    i = end;
                }
                _ => push_char_at(&mut sql, &self.sql, &mut i),
            }
        }

        Ok((sql, values))
    }
}

// Copies the (possibly multi-byte) character starting at `*i` and advances past it.
fn push_char_at(out: &mut String, source: &str, i: &mut usize) {
    let ch = source[*i..].chars().next().unwrap_or_default();
    out.push(ch);
    *i += ch.len_utf8().max(1);
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Generic, MySql, SqlServer};

    fn stmt(sql: &str, params: &[(&str, Value)]) -> Statement {
        Statement::new(
            sql,
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_placeholder_styles() {
        assert_eq!(PlaceholderStyle::Dollar.placeholder(1), "$1");
        assert_eq!(PlaceholderStyle::Dollar.placeholder(5), "$5");
        assert_eq!(PlaceholderStyle::Question.placeholder(1), "?");
    }

    #[test]
    fn test_question_rewrite_follows_placeholder_order() {
        let s = stmt(
            "UPDATE `users` SET `name` = :name WHERE `id` = :p0",
            &[("p0", Value::I32(5)), ("name", Value::from("Bob"))],
        );
        let (sql, values) = s.to_positional(&MySql, PlaceholderStyle::Question).unwrap();
        assert_eq!(sql, "UPDATE `users` SET `name` = ? WHERE `id` = ?");
        assert_eq!(values, vec![Value::from("Bob"), Value::I32(5)]);
    }

    #[test]
    fn test_repeated_name() {
        let s = stmt("SELECT :a, :a, :b", &[("a", Value::I32(1)), ("b", Value::I32(2))]);

        let (sql, values) = s.to_positional(&Generic, PlaceholderStyle::Dollar).unwrap();
        assert_eq!(sql, "SELECT $1, $1, $2");
        assert_eq!(values.len(), 2);

        let (sql, values) = s.to_positional(&Generic, PlaceholderStyle::Question).unwrap();
        assert_eq!(sql, "SELECT ?, ?, ?");
        assert_eq!(values, vec![Value::I32(1), Value::I32(1), Value::I32(2)]);
    }

    #[test]
    fn test_quoted_text_and_casts_are_untouched() {
        let s = stmt(
            "SELECT ':not_a_param', \"col:x\", created::date FROM t WHERE id = :id",
            &[("id", Value::I32(1))],
        );
        let (sql, values) = s.to_positional(&Generic, PlaceholderStyle::Dollar).unwrap();
        assert_eq!(
            sql,
            "SELECT ':not_a_param', \"col:x\", created::date FROM t WHERE id = $1"
        );
        assert_eq!(values, vec![Value::I32(1)]);
    }

    #[test]
    fn test_array_brackets_are_not_quotes_outside_sqlserver() {
        let s = stmt(
            "SELECT * FROM \"t\" WHERE \"tags\" = ANY(ARRAY[:a, :b])",
            &[("a", Value::I32(1)), ("b", Value::I32(2))],
        );
        let (sql, values) = s.to_positional(&Generic, PlaceholderStyle::Dollar).unwrap();
        assert_eq!(sql, "SELECT * FROM \"t\" WHERE \"tags\" = ANY(ARRAY[$1, $2])");
        assert_eq!(values, vec![Value::I32(1), Value::I32(2)]);

        let s = stmt("SELECT [col:x] FROM t WHERE id = :id", &[("id", Value::I32(3))]);
        let (sql, values) = s.to_positional(&SqlServer, PlaceholderStyle::Question).unwrap();
        assert_eq!(sql, "SELECT [col:x] FROM t WHERE id = ?");
        assert_eq!(values, vec![Value::I32(3)]);
    }

    #[test]
    fn test_mysql_backslash_escape_stays_inside_string() {
        let s = stmt(
            r"SELECT 'it\'s :x' FROM `t` WHERE `id` = :id",
            &[("id", Value::I32(1))],
        );
        let (sql, values) = s.to_positional(&MySql, PlaceholderStyle::Question).unwrap();
        assert_eq!(sql, r"SELECT 'it\'s :x' FROM `t` WHERE `id` = ?");
        assert_eq!(values, vec![Value::I32(1)]);

        // without backslash escapes the string closes early and :x is unbound
        let err = s.to_positional(&Generic, PlaceholderStyle::Question).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_unbound_placeholder_fails() {
        let s = stmt("SELECT * FROM t WHERE id = :missing", &[]);
        let err = s.to_positional(&Generic, PlaceholderStyle::Question).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_non_ascii_text_survives() {
        let s = stmt("SELECT 'héllo' AS \"naïve\", :v", &[("v", Value::I32(1))]);
        let (sql, _) = s.to_positional(&Generic, PlaceholderStyle::Question).unwrap();
        assert_eq!(sql, "SELECT 'héllo' AS \"naïve\", ?");
    }

    #[test]
    fn test_display_is_sql() {
        let s = stmt("DELETE FROM t", &[]);
        assert_eq!(s.to_string(), "DELETE FROM t");
    }
}
