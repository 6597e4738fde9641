//! Named bind-parameter bookkeeping for a single statement

use std::fmt;

use indexmap::IndexMap;

use crate::Value;

const AUTO_PREFIX: &str = "p";

/// Reference to a bound parameter, rendered inline as `:name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamRef(String);

impl ParamRef {
    /// The parameter name, without the leading colon
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

/// Ordered `name → value` map for one statement.
///
/// Explicit names overwrite earlier bindings of the same name and keep their
/// original position. Auto names (`p0`, `p1`, ...) skip every name already in
/// the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBinder {
    params: IndexMap<String, Value>,
    counter: usize,
}

impl ParameterBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value under the next free auto-generated name
    pub fn bind(&mut self, value: impl Into<Value>) -> ParamRef {
        let name = loop {
            let candidate = format!("{}{}", AUTO_PREFIX, self.counter);
            self.counter += 1;
            if !self.params.contains_key(&candidate) {
                break candidate;
            }
        };
        self.params.insert(name.clone(), value.into());
        ParamRef(name)
    }

    /// Bind a value under an explicit name, replacing any previous value
    pub fn bind_named(&mut self, name: &str, value: impl Into<Value>) -> ParamRef {
        let name = sanitize_name(name);
        self.params.insert(name.clone(), value.into());
        ParamRef(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Every binding made so far, in first-bound order
    pub fn snapshot(&self) -> IndexMap<String, Value> {
        self.params.clone()
    }

    pub fn into_params(self) -> IndexMap<String, Value> {
        self.params
    }
}

/// Placeholder names are limited to `[A-Za-z_][A-Za-z0-9_]*`, so `users.name` binds as `users_name`
pub fn sanitize_name(name: &str) -> String {
    let name = name.strip_prefix(':').unwrap_or(name);
    if name.is_empty() {
        return "_".to_string();
    }
    let mut sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        sanitized.insert(0, '_');
    }
    sanitized
}
