//! Shared builder state, traits and helpers

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;

use super::predicate::PredicateBuilder;
use crate::binder::{sanitize_name, ParameterBinder};
use crate::table::{IntoTableRef, TableRef};
use crate::{DialectRef, Error, Literal, Result, Statement, Value};

/// Core trait for all query builders
pub trait QueryBuilder {
    /// Render the statement text and its bind map.
    ///
    /// Rendering never mutates the builder; calling it twice yields identical output.
    fn render(&self) -> Result<Statement>;

    /// Generate the SQL query string
    fn to_sql(&self) -> Result<String> {
        Ok(self.render()?.sql)
    }

    /// Get the parameters for the query
    fn parameters(&self) -> Result<IndexMap<String, Value>> {
        Ok(self.render()?.params)
    }
}

/// Value side of a SET / VALUES pair
#[derive(Debug, Clone, PartialEq)]
pub enum SetValue {
    Value(Value),
    Literal(Literal),
}

/// Trait for types that can be assigned to a column
pub trait IntoSetValue {
    fn into_set_value(self) -> SetValue;
}

macro_rules! impl_into_set_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoSetValue for $ty {
                fn into_set_value(self) -> SetValue {
                    SetValue::Value(self.into())
                }
            }
        )*
    };
}

impl_into_set_value!(
    Value,
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    String,
    &str,
    &String,
    Vec<u8>,
    serde_json::Value,
);

impl<T: Into<Value>> IntoSetValue for Option<T> {
    fn into_set_value(self) -> SetValue {
        SetValue::Value(self.into())
    }
}

impl IntoSetValue for Literal {
    fn into_set_value(self) -> SetValue {
        SetValue::Literal(self)
    }
}

/// Trait for collections of `column → value` pairs accepted by `values()`
pub trait IntoValuePairs {
    fn into_value_pairs(self) -> Vec<(String, SetValue)>;
}

impl<K: Into<String>, V: IntoSetValue> IntoValuePairs for Vec<(K, V)> {
    fn into_value_pairs(self) -> Vec<(String, SetValue)> {
        self.into_iter()
            .map(|(k, v)| (k.into(), v.into_set_value()))
            .collect()
    }
}

impl<K: Into<String>, V: IntoSetValue, const N: usize> IntoValuePairs for [(K, V); N] {
    fn into_value_pairs(self) -> Vec<(String, SetValue)> {
        self.into_iter()
            .map(|(k, v)| (k.into(), v.into_set_value()))
            .collect()
    }
}

impl<K: Into<String>, V: IntoSetValue, S> IntoValuePairs for IndexMap<K, V, S> {
    fn into_value_pairs(self) -> Vec<(String, SetValue)> {
        self.into_iter()
            .map(|(k, v)| (k.into(), v.into_set_value()))
            .collect()
    }
}

impl<K: Into<String>, V: IntoSetValue> IntoValuePairs for BTreeMap<K, V> {
    fn into_value_pairs(self) -> Vec<(String, SetValue)> {
        self.into_iter()
            .map(|(k, v)| (k.into(), v.into_set_value()))
            .collect()
    }
}

// HashMap iteration order is unspecified, so column order follows it.
impl<K: Into<String>, V: IntoSetValue, S> IntoValuePairs for HashMap<K, V, S> {
    fn into_value_pairs(self) -> Vec<(String, SetValue)> {
        self.into_iter()
            .map(|(k, v)| (k.into(), v.into_set_value()))
            .collect()
    }
}

/// Trait for types that can be converted to column lists
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(|s| s.to_string()).collect()
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<String> {
        self
    }
}

impl<const N: usize> IntoColumns for [&str; N] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoColumns for (&str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string()]
    }
}

impl IntoColumns for (&str, &str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string(), self.2.to_string()]
    }
}

impl IntoColumns for (&str, &str, &str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![
            self.0.to_string(),
            self.1.to_string(),
            self.2.to_string(),
            self.3.to_string(),
        ]
    }
}

/// Sort direction for ORDER BY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// JOIN flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL OUTER JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }
}

/// State shared by every statement builder
#[derive(Debug, Clone)]
pub struct QueryCore {
    pub(crate) dialect: DialectRef,
    pub(crate) table: Option<TableRef>,
    pub(crate) predicate: PredicateBuilder,
    pub(crate) assignments: Vec<(String, SetValue)>,
}

impl QueryCore {
    pub fn new(dialect: DialectRef) -> Self {
        Self {
            dialect,
            table: None,
            predicate: PredicateBuilder::new(),
            assignments: Vec::new(),
        }
    }

    pub(crate) fn set_table<T: IntoTableRef>(&mut self, table: T) -> Result<()> {
        self.table = Some(table.into_table_ref()?);
        Ok(())
    }

    /// Assign a column, replacing an earlier value for it in place
    pub(crate) fn assign(&mut self, column: String, value: SetValue) {
        match self.assignments.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.assignments.push((column, value)),
        }
    }

    pub(crate) fn quote(&self, identifier: &str) -> String {
        self.dialect.quote_identifier(identifier)
    }

    /// The quoted table reference, or a logic error naming the statement kind
    pub(crate) fn table_sql(&self, kind: &str) -> Result<String> {
        self.table
            .as_ref()
            .map(|table| table.resolve(self.dialect.as_ref()))
            .ok_or_else(|| Error::logic(format!("{} requires a table", kind)))
    }

    /// A fresh binder with every literal's own parameters already registered
    pub(crate) fn binder(&self) -> ParameterBinder {
        let mut binder = ParameterBinder::new();
        for (_, value) in &self.assignments {
            if let SetValue::Literal(literal) = value {
                for (name, value) in literal.params() {
                    binder.bind_named(name, value.clone());
                }
            }
        }
        self.predicate.bind_literal_params(&mut binder);
        binder
    }

    /// Bind every assignment under its column name.
    ///
    /// Returns `(quoted column, placeholder or literal SQL)` in assignment order.
    pub(crate) fn render_assignments(&self, binder: &mut ParameterBinder) -> Vec<(String, String)> {
        self.assignments
            .iter()
            .map(|(column, value)| {
                let rendered = match value {
                    SetValue::Value(value) => {
                        let base = sanitize_name(column);
                        let mut name = base.clone();
                        let mut suffix = 1;
                        while binder.contains(&name) {
                            name = format!("{}_{}", base, suffix);
                            suffix += 1;
                        }
                        binder.bind_named(&name, value.clone()).to_string()
                    }
                    SetValue::Literal(literal) => literal.sql().to_string(),
                };
                (self.quote(column), rendered)
            })
            .collect()
    }

    pub(crate) fn render_where(&self, binder: &mut ParameterBinder) -> Option<String> {
        self.predicate.render(self.dialect.as_ref(), binder)
    }
}

/// Package rendered SQL with its bindings and emit the render event
pub(crate) fn finish(kind: &'static str, sql: String, binder: ParameterBinder) -> Statement {
    let params = binder.into_params();
    tracing::trace!(
        target: "sqlweave::render",
        kind,
        sql = %sql,
        params = params.len(),
        "rendered statement"
    );
    Statement::new(sql, params)
}

/// WHERE methods, generated for every builder holding a `core: QueryCore`
macro_rules! impl_where_methods {
    ($builder:ty) => {
        impl $builder {
            /// Add a WHERE condition, AND-combined with everything before it
            pub fn where_<C>(mut self, condition: C) -> $crate::Result<Self>
            where
                C: $crate::builder::predicate::IntoCondition,
            {
                self.core
                    .predicate
                    .push_condition($crate::builder::predicate::WhereConnector::And, condition)?;
                Ok(self)
            }

            /// Add an OR WHERE condition, grouping everything before it
            pub fn or_where<C>(mut self, condition: C) -> $crate::Result<Self>
            where
                C: $crate::builder::predicate::IntoCondition,
            {
                self.core
                    .predicate
                    .push_condition($crate::builder::predicate::WhereConnector::Or, condition)?;
                Ok(self)
            }

            /// Add an AND WHERE condition (same as where_)
            pub fn and_where<C>(self, condition: C) -> $crate::Result<Self>
            where
                C: $crate::builder::predicate::IntoCondition,
            {
                self.where_(condition)
            }

            pub fn where_null(mut self, column: &str) -> Self {
                self.core
                    .predicate
                    .push_null_test(column, $crate::Operator::IS_NULL);
                self
            }

            pub fn where_not_null(mut self, column: &str) -> Self {
                self.core
                    .predicate
                    .push_null_test(column, $crate::Operator::IS_NOT_NULL);
                self
            }

            /// Add a parenthesized group of conditions built by `build`
            pub fn where_group<F>(mut self, build: F) -> $crate::Result<Self>
            where
                F: FnOnce(
                    $crate::builder::predicate::PredicateBuilder,
                ) -> $crate::Result<$crate::builder::predicate::PredicateBuilder>,
            {
                self.core
                    .predicate
                    .push_group($crate::builder::predicate::WhereConnector::And, build)?;
                Ok(self)
            }

            pub fn or_where_group<F>(mut self, build: F) -> $crate::Result<Self>
            where
                F: FnOnce(
                    $crate::builder::predicate::PredicateBuilder,
                ) -> $crate::Result<$crate::builder::predicate::PredicateBuilder>,
            {
                self.core
                    .predicate
                    .push_group($crate::builder::predicate::WhereConnector::Or, build)?;
                Ok(self)
            }

            /// The WHERE tree built so far
            pub fn predicate(&self) -> &$crate::builder::predicate::PredicateBuilder {
                &self.core.predicate
            }

            pub fn dialect(&self) -> &$crate::DialectRef {
                &self.core.dialect
            }
        }
    };
}

/// SET / VALUES methods for the mutating builders
macro_rules! impl_assignment_methods {
    ($builder:ty) => {
        impl $builder {
            /// Assign one column. Assigning the same column again replaces its value.
            pub fn set<V>(mut self, column: &str, value: V) -> Self
            where
                V: $crate::builder::common::IntoSetValue,
            {
                self.core.assign(
                    column.to_string(),
                    $crate::builder::common::IntoSetValue::into_set_value(value),
                );
                self
            }

            /// Assign several columns at once, in the collection's order
            pub fn values<T>(mut self, pairs: T) -> Self
            where
                T: $crate::builder::common::IntoValuePairs,
            {
                for (column, value) in $crate::builder::common::IntoValuePairs::into_value_pairs(pairs) {
                    self.core.assign(column, value);
                }
                self
            }
        }
    };
}

pub(crate) use impl_assignment_methods;
pub(crate) use impl_where_methods;
