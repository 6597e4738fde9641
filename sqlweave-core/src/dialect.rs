//! SQL dialect support.
//!
//! A dialect decides how identifiers are quoted for a target database. Builders
//! receive one as an `Arc<dyn Dialect>` when they are created and keep it for
//! their whole lifetime.
//!
//! Identifier rules shared by every dialect:
//!
//! - A name starting with `'` is a raw expression: the surrounding single
//!   quotes are stripped and the rest is emitted verbatim (`'NOW()'` → `NOW()`).
//! - Every `.`-separated segment is quoted on its own (`foo.bar` → `"foo"."bar"`).
//! - A `*` segment is left bare (`foo.*` → `"foo".*`).

use std::fmt;
use std::sync::Arc;

/// Shared handle to a dialect, as held by the builders
pub type DialectRef = Arc<dyn Dialect>;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the opening and closing identifier quote characters.
    fn quote_chars(&self) -> (char, char) {
        ('"', '"')
    }

    /// Whether a backslash escapes the next character inside string literals.
    fn backslash_escapes(&self) -> bool {
        false
    }

    /// Returns whether the dialect supports an `INSERT ... RETURNING` clause.
    fn supports_returning(&self) -> bool {
        false
    }

    /// Quotes an identifier, keeping dotted qualification and bare wildcards.
    fn quote_identifier(&self, identifier: &str) -> String {
        if identifier.starts_with('\'') {
            return identifier.trim_matches('\'').to_string();
        }

        let (open, close) = self.quote_chars();
        identifier
            .split('.')
            .map(|segment| {
                if segment == "*" {
                    return segment.to_string();
                }
                let mut quoted = String::with_capacity(segment.len() + 2);
                quoted.push(open);
                for c in segment.chars() {
                    // a closing quote inside the name is written twice
                    if c == close {
                        quoted.push(close);
                    }
                    quoted.push(c);
                }
                quoted.push(close);
                quoted
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Checks whether a string already looks like a quoted identifier.
    fn is_quoted_identifier(&self, s: &str) -> bool {
        let (open, close) = self.quote_chars();
        s.chars().count() >= 2 && s.starts_with(open) && s.ends_with(close)
    }
}

/// ANSI SQL quoting with double quotes (PostgreSQL, SQLite, ...)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Generic;

impl Dialect for Generic {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn supports_returning(&self) -> bool {
        true
    }
}

/// MySQL / MariaDB quoting with back-ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_chars(&self) -> (char, char) {
        ('`', '`')
    }

    fn backslash_escapes(&self) -> bool {
        true
    }
}

/// SQL Server quoting with square brackets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlServer;

impl Dialect for SqlServer {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn quote_chars(&self) -> (char, char) {
        ('[', ']')
    }
}

/// Shared handle to the [`Generic`] dialect
pub fn generic() -> DialectRef {
    Arc::new(Generic)
}

/// Shared handle to the [`MySql`] dialect
pub fn mysql() -> DialectRef {
    Arc::new(MySql)
}
