//! WHERE clause predicate tree
//!
//! Conditions are kept as a tree of comparisons joined by AND / OR nodes and
//! only flattened into SQL at render time. `where_` AND-combines a condition
//! with everything before it, `or_where` OR-combines it, both associating to
//! the left:
//!
//! ```text
//! where_(a).or_where(b).where_(c)   =>   (a OR b) AND c
//! where_(a).where_(b).or_where(c)   =>   (a AND b) OR c
//! ```

use crate::binder::ParameterBinder;
use crate::{Dialect, Error, IntoOperator, Literal, Operator, Result, Value};

/// The right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Nothing to compare against (`IS NULL`, `IS NOT NULL`)
    None,
    /// A single bound value
    Value(Value),
    /// A list of bound values (`IN`, `NOT IN`)
    List(Vec<Value>),
    /// Raw SQL interpolated as-is
    Literal(Literal),
}

/// Trait for types usable as the right-hand side of a condition
pub trait IntoOperand {
    fn into_operand(self) -> Operand;
}

macro_rules! impl_into_operand_for_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoOperand for $ty {
                fn into_operand(self) -> Operand {
                    Operand::Value(self.into())
                }
            }
        )*
    };
}

impl_into_operand_for_values!(
    Value,
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
    serde_json::Value,
);

impl IntoOperand for () {
    fn into_operand(self) -> Operand {
        Operand::None
    }
}

impl IntoOperand for Literal {
    fn into_operand(self) -> Operand {
        Operand::Literal(self)
    }
}

impl<T: Into<Value>> IntoOperand for Option<T> {
    fn into_operand(self) -> Operand {
        Operand::Value(self.into())
    }
}

impl<T: Into<Value>> IntoOperand for Vec<T> {
    fn into_operand(self) -> Operand {
        Operand::List(self.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> IntoOperand for &[T] {
    fn into_operand(self) -> Operand {
        Operand::List(self.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> IntoOperand for [T; N] {
    fn into_operand(self) -> Operand {
        Operand::List(self.into_iter().map(Into::into).collect())
    }
}

/// A single `column operator operand` test
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    column: String,
    operator: Operator,
    operand: Operand,
}

impl Comparison {
    /// Validate an operator/operand combination.
    ///
    /// `IS NULL` / `IS NOT NULL` drop any operand. `IN` / `NOT IN` need a
    /// non-empty list (a single value becomes a one-element list). Every other
    /// operator needs a single value or a literal.
    pub fn new(column: impl Into<String>, operator: Operator, operand: Operand) -> Result<Self> {
        let column = column.into();

        let operand = if !operator.takes_value() {
            Operand::None
        } else if operator.takes_list() {
            match operand {
                Operand::List(values) if values.is_empty() => {
                    return Err(Error::invalid_argument(format!(
                        "{} on '{}' requires at least one value",
                        operator, column
                    )));
                }
                Operand::Value(value) => Operand::List(vec![value]),
                Operand::None => {
                    return Err(Error::invalid_argument(format!(
                        "{} on '{}' requires a list of values",
                        operator, column
                    )));
                }
                other => other,
            }
        } else {
            match operand {
                Operand::List(_) => {
                    return Err(Error::invalid_argument(format!(
                        "Operator '{}' on '{}' does not accept a list of values",
                        operator, column
                    )));
                }
                Operand::None => {
                    return Err(Error::invalid_argument(format!(
                        "Operator '{}' on '{}' requires a value; use IS NULL to test for NULL",
                        operator, column
                    )));
                }
                other => other,
            }
        };

        Ok(Self {
            column,
            operator,
            operand,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    fn render(&self, dialect: &dyn Dialect, binder: &mut ParameterBinder) -> String {
        let column = dialect.quote_identifier(&self.column);
        match &self.operand {
            Operand::None => format!("{} {}", column, self.operator),
            Operand::Value(value) => {
                format!("{} {} {}", column, self.operator, binder.bind(value.clone()))
            }
            Operand::List(values) => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|value| binder.bind(value.clone()).to_string())
                    .collect();
                format!("{} {} ({})", column, self.operator, placeholders.join(", "))
            }
            Operand::Literal(literal) if self.operator.takes_list() => {
                format!("{} {} ({})", column, self.operator, literal.sql())
            }
            Operand::Literal(literal) => format!("{} {} {}", column, self.operator, literal.sql()),
        }
    }
}

/// Trait for conditions that can be used in WHERE clauses
pub trait IntoCondition {
    fn into_condition(self) -> Result<Comparison>;
}

impl IntoCondition for Comparison {
    fn into_condition(self) -> Result<Comparison> {
        Comparison::new(self.column, self.operator, self.operand)
    }
}

// Shorthand equality: where_(("age", 18))
impl<T: IntoOperand> IntoCondition for (&str, T) {
    fn into_condition(self) -> Result<Comparison> {
        Comparison::new(self.0, Operator::EQ, self.1.into_operand())
    }
}

impl<T: IntoOperand> IntoCondition for (String, T) {
    fn into_condition(self) -> Result<Comparison> {
        Comparison::new(self.0, Operator::EQ, self.1.into_operand())
    }
}

// Explicit operators: where_(("age", op::GT, 18)) or where_(("age", ">", 18))
impl<O: IntoOperator, T: IntoOperand> IntoCondition for (&str, O, T) {
    fn into_condition(self) -> Result<Comparison> {
        Comparison::new(self.0, self.1.into_operator()?, self.2.into_operand())
    }
}

impl<O: IntoOperator, T: IntoOperand> IntoCondition for (String, O, T) {
    fn into_condition(self) -> Result<Comparison> {
        Comparison::new(self.0, self.1.into_operator()?, self.2.into_operand())
    }
}

/// How sibling predicates are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereConnector {
    And,
    Or,
}

impl WhereConnector {
    fn separator(&self) -> &'static str {
        match self {
            WhereConnector::And => " AND ",
            WhereConnector::Or => " OR ",
        }
    }
}

/// A node of the WHERE tree
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Comparison(Comparison),
    Conjunction {
        kind: WhereConnector,
        children: Vec<Predicate>,
    },
}

impl Predicate {
    fn render(
        &self,
        parent: Option<WhereConnector>,
        dialect: &dyn Dialect,
        binder: &mut ParameterBinder,
    ) -> String {
        match self {
            Predicate::Comparison(comparison) => comparison.render(dialect, binder),
            Predicate::Conjunction { kind, children } => {
                let parts: Vec<String> = children
                    .iter()
                    .map(|child| child.render(Some(*kind), dialect, binder))
                    .filter(|part| !part.is_empty())
                    .collect();
                let joined = parts.join(kind.separator());
                match parent {
                    Some(parent) if parent != *kind && parts.len() > 1 => format!("({})", joined),
                    _ => joined,
                }
            }
        }
    }

    fn for_each_literal<'a>(&'a self, f: &mut impl FnMut(&'a Literal)) {
        match self {
            Predicate::Comparison(Comparison {
                operand: Operand::Literal(literal),
                ..
            }) => f(literal),
            Predicate::Comparison(_) => {}
            Predicate::Conjunction { children, .. } => {
                for child in children {
                    child.for_each_literal(f);
                }
            }
        }
    }
}

/// Incrementally built WHERE clause
///
/// # Examples
/// ```
/// use sqlweave_core::{dialect::MySql, ParameterBinder, PredicateBuilder};
///
/// let predicate = PredicateBuilder::new()
///     .where_(("a", "=", 1)).unwrap()
///     .or_where(("b", "=", 2)).unwrap()
///     .where_(("c", "=", 3)).unwrap();
///
/// let mut binder = ParameterBinder::new();
/// let sql = predicate.render(&MySql, &mut binder).unwrap();
/// assert_eq!(sql, "(`a` = :p0 OR `b` = :p1) AND `c` = :p2");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateBuilder {
    root: Option<Predicate>,
}

impl PredicateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition, AND-combined with everything before it
    pub fn where_<C: IntoCondition>(mut self, condition: C) -> Result<Self> {
        self.push_condition(WhereConnector::And, condition)?;
        Ok(self)
    }

    /// Add an AND WHERE condition (same as where_)
    pub fn and_where<C: IntoCondition>(self, condition: C) -> Result<Self> {
        self.where_(condition)
    }

    /// Add a condition, OR-combined with everything before it
    pub fn or_where<C: IntoCondition>(mut self, condition: C) -> Result<Self> {
        self.push_condition(WhereConnector::Or, condition)?;
        Ok(self)
    }

    /// Add a parenthesized group, AND-combined with everything before it
    pub fn where_group<F>(mut self, build: F) -> Result<Self>
    where
        F: FnOnce(PredicateBuilder) -> Result<PredicateBuilder>,
    {
        self.push_group(WhereConnector::And, build)?;
        Ok(self)
    }

    /// Add a parenthesized group, OR-combined with everything before it
    pub fn or_where_group<F>(mut self, build: F) -> Result<Self>
    where
        F: FnOnce(PredicateBuilder) -> Result<PredicateBuilder>,
    {
        self.push_group(WhereConnector::Or, build)?;
        Ok(self)
    }

    /// Add `column IS NULL`, AND-combined
    pub fn where_null(mut self, column: &str) -> Self {
        self.push_null_test(column, Operator::IS_NULL);
        self
    }

    /// Add `column IS NOT NULL`, AND-combined
    pub fn where_not_null(mut self, column: &str) -> Self {
        self.push_null_test(column, Operator::IS_NOT_NULL);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn push_null_test(&mut self, column: &str, operator: Operator) {
        self.push(
            WhereConnector::And,
            Predicate::Comparison(Comparison {
                column: column.to_string(),
                operator,
                operand: Operand::None,
            }),
        );
    }

    /// The current tree, for inspection
    pub fn root(&self) -> Option<&Predicate> {
        self.root.as_ref()
    }

    pub(crate) fn push_condition<C: IntoCondition>(
        &mut self,
        connector: WhereConnector,
        condition: C,
    ) -> Result<()> {
        let comparison = condition.into_condition()?;
        self.push(connector, Predicate::Comparison(comparison));
        Ok(())
    }

    pub(crate) fn push_group<F>(&mut self, connector: WhereConnector, build: F) -> Result<()>
    where
        F: FnOnce(PredicateBuilder) -> Result<PredicateBuilder>,
    {
        if let Some(group) = build(PredicateBuilder::new())?.root {
            self.push(connector, group);
        }
        Ok(())
    }

    pub(crate) fn push(&mut self, connector: WhereConnector, predicate: Predicate) {
        self.root = Some(match self.root.take() {
            None => predicate,
            Some(Predicate::Conjunction { kind, mut children }) if kind == connector => {
                children.push(predicate);
                Predicate::Conjunction { kind, children }
            }
            Some(prior) => Predicate::Conjunction {
                kind: connector,
                children: vec![prior, predicate],
            },
        });
    }

    /// Register the parameters carried by literal operands under their own names
    pub fn bind_literal_params(&self, binder: &mut ParameterBinder) {
        if let Some(root) = &self.root {
            root.for_each_literal(&mut |literal| {
                for (name, value) in literal.params() {
                    binder.bind_named(name, value.clone());
                }
            });
        }
    }

    /// Flatten the tree into SQL, binding every compared value.
    ///
    /// Returns `None` when there is nothing to render.
    pub fn render(&self, dialect: &dyn Dialect, binder: &mut ParameterBinder) -> Option<String> {
        let sql = self.root.as_ref()?.render(None, dialect, binder);
        if sql.is_empty() {
            None
        } else {
            Some(sql)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Generic, MySql};
    use crate::operator::op;
    use crate::literal::func;

    fn render(predicate: &PredicateBuilder) -> (Option<String>, ParameterBinder) {
        let mut binder = ParameterBinder::new();
        predicate.bind_literal_params(&mut binder);
        let sql = predicate.render(&MySql, &mut binder);
        (sql, binder)
    }

    #[test]
    fn test_empty_predicate_renders_nothing() {
        let (sql, binder) = render(&PredicateBuilder::new());
        assert_eq!(sql, None);
        assert!(binder.is_empty());
    }

    #[test]
    fn test_single_comparison() {
        let predicate = PredicateBuilder::new().where_(("id", "=", 5)).unwrap();
        let (sql, binder) = render(&predicate);
        assert_eq!(sql.unwrap(), "`id` = :p0");
        assert_eq!(binder.get("p0"), Some(&Value::I32(5)));
    }

    #[test]
    fn test_shorthand_equality() {
        let predicate = PredicateBuilder::new().where_(("name", "John")).unwrap();
        let (sql, _) = render(&predicate);
        assert_eq!(sql.unwrap(), "`name` = :p0");
    }

    #[test]
    fn test_and_chain() {
        let predicate = PredicateBuilder::new()
            .where_(("age", op::GT, 18))
            .unwrap()
            .and_where(("status", "active"))
            .unwrap();
        let (sql, _) = render(&predicate);
        assert_eq!(sql.unwrap(), "`age` > :p0 AND `status` = :p1");
    }

    #[test]
    fn test_or_then_and_is_parenthesized() {
        let predicate = PredicateBuilder::new()
            .where_(("a", "=", 1))
            .unwrap()
            .or_where(("b", "=", 2))
            .unwrap()
            .where_(("c", "=", 3))
            .unwrap();
        let (sql, binder) = render(&predicate);
        assert_eq!(sql.unwrap(), "(`a` = :p0 OR `b` = :p1) AND `c` = :p2");
        let names: Vec<String> = binder.into_params().into_keys().collect();
        assert_eq!(names, vec!["p0", "p1", "p2"]);
    }

    #[test]
    fn test_and_then_or_groups_prior_chain() {
        let predicate = PredicateBuilder::new()
            .where_(("a", "=", 1))
            .unwrap()
            .where_(("b", "=", 2))
            .unwrap()
            .or_where(("c", "=", 3))
            .unwrap();
        let (sql, _) = render(&predicate);
        assert_eq!(sql.unwrap(), "(`a` = :p0 AND `b` = :p1) OR `c` = :p2");
    }

    #[test]
    fn test_consecutive_or_stays_flat() {
        let predicate = PredicateBuilder::new()
            .where_(("a", 1))
            .unwrap()
            .or_where(("b", 2))
            .unwrap()
            .or_where(("c", 3))
            .unwrap();
        let (sql, _) = render(&predicate);
        assert_eq!(sql.unwrap(), "`a` = :p0 OR `b` = :p1 OR `c` = :p2");
    }

    #[test]
    fn test_nested_group() {
        let predicate = PredicateBuilder::new()
            .where_(("active", true))
            .unwrap()
            .where_group(|g| g.where_(("role", "admin"))?.or_where(("role", "owner")))
            .unwrap();
        let (sql, _) = render(&predicate);
        assert_eq!(
            sql.unwrap(),
            "`active` = :p0 AND (`role` = :p1 OR `role` = :p2)"
        );
    }

    #[test]
    fn test_or_group_inside_or_chain_needs_no_parens() {
        let predicate = PredicateBuilder::new()
            .where_(("a", 1))
            .unwrap()
            .or_where_group(|g| g.where_(("b", 2))?.or_where(("c", 3)))
            .unwrap();
        let (sql, _) = render(&predicate);
        assert_eq!(sql.unwrap(), "`a` = :p0 OR `b` = :p1 OR `c` = :p2");
    }

    #[test]
    fn test_empty_group_is_ignored() {
        let predicate = PredicateBuilder::new()
            .where_(("a", 1))
            .unwrap()
            .where_group(Ok)
            .unwrap();
        let (sql, _) = render(&predicate);
        assert_eq!(sql.unwrap(), "`a` = :p0");
    }

    #[test]
    fn test_in_list_binds_each_value() {
        let predicate = PredicateBuilder::new()
            .where_(("id", op::IN, vec![1, 2, 3]))
            .unwrap();
        let (sql, binder) = render(&predicate);
        assert_eq!(sql.unwrap(), "`id` IN (:p0, :p1, :p2)");
        assert_eq!(binder.len(), 3);
        assert_eq!(binder.get("p2"), Some(&Value::I32(3)));
    }

    #[test]
    fn test_in_with_scalar_becomes_single_element_list() {
        let predicate = PredicateBuilder::new().where_(("id", "in", 7)).unwrap();
        let (sql, _) = render(&predicate);
        assert_eq!(sql.unwrap(), "`id` IN (:p0)");
    }

    #[test]
    fn test_empty_in_list_fails() {
        let err = PredicateBuilder::new()
            .where_(("id", "IN", Vec::<i32>::new()))
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_list_with_scalar_operator_fails() {
        let err = PredicateBuilder::new()
            .where_(("id", "=", vec![1, 2]))
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_prebuilt_comparison_is_revalidated() {
        let empty_in = Comparison {
            column: "id".to_string(),
            operator: op::IN,
            operand: Operand::List(vec![]),
        };
        assert!(PredicateBuilder::new().where_(empty_in).unwrap_err().is_invalid_argument());

        let list_eq = Comparison {
            column: "id".to_string(),
            operator: op::EQ,
            operand: Operand::List(vec![Value::I32(1), Value::I32(2)]),
        };
        assert!(PredicateBuilder::new().where_(list_eq).unwrap_err().is_invalid_argument());

        let bare_eq = Comparison {
            column: "id".to_string(),
            operator: op::EQ,
            operand: Operand::None,
        };
        assert!(PredicateBuilder::new().or_where(bare_eq).unwrap_err().is_invalid_argument());

        let valid = Comparison::new("id", op::IN, Operand::Value(Value::I32(4))).unwrap();
        assert_eq!(valid.column(), "id");
        assert_eq!(valid.operand(), &Operand::List(vec![Value::I32(4)]));
        let predicate = PredicateBuilder::new().where_(valid).unwrap();
        assert_eq!(render(&predicate).0.unwrap(), "`id` IN (:p0)");
    }

    #[test]
    fn test_unknown_operator_fails() {
        let err = PredicateBuilder::new()
            .where_(("id", "===", 1))
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_null_operators_bind_nothing() {
        let predicate = PredicateBuilder::new()
            .where_(("deleted_at", "IS NULL", ()))
            .unwrap()
            .where_(("email", op::IS_NOT_NULL, "ignored"))
            .unwrap();
        let (sql, binder) = render(&predicate);
        assert_eq!(sql.unwrap(), "`deleted_at` IS NULL AND `email` IS NOT NULL");
        assert!(binder.is_empty());
    }

    #[test]
    fn test_null_helpers() {
        let predicate = PredicateBuilder::new()
            .where_null("deleted_at")
            .where_not_null("confirmed_at");
        let (sql, _) = render(&predicate);
        assert_eq!(
            sql.unwrap(),
            "`deleted_at` IS NULL AND `confirmed_at` IS NOT NULL"
        );
    }

    #[test]
    fn test_equality_without_value_fails() {
        let err = PredicateBuilder::new().where_(("a", "=", ())).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_literal_operand_is_not_bound() {
        let predicate = PredicateBuilder::new()
            .where_(("created_at", "<", func("NOW()")))
            .unwrap();
        let (sql, binder) = render(&predicate);
        assert_eq!(sql.unwrap(), "`created_at` < NOW()");
        assert!(binder.is_empty());
    }

    #[test]
    fn test_literal_params_are_merged_and_reserved() {
        let since = Literal::new("DATE_SUB(NOW(), INTERVAL :p0 DAY)").bind("p0", 30);
        let predicate = PredicateBuilder::new()
            .where_(("status", "open"))
            .unwrap()
            .where_(("created_at", ">", since))
            .unwrap();
        let (sql, binder) = render(&predicate);
        assert_eq!(
            sql.unwrap(),
            "`status` = :p1 AND `created_at` > DATE_SUB(NOW(), INTERVAL :p0 DAY)"
        );
        assert_eq!(binder.get("p0"), Some(&Value::I32(30)));
        assert_eq!(binder.get("p1"), Some(&Value::from("open")));
    }

    #[test]
    fn test_literal_in_subquery() {
        let sub = Literal::new("SELECT user_id FROM bans");
        let predicate = PredicateBuilder::new()
            .where_(("id", op::NOT_IN, sub))
            .unwrap();
        let mut binder = ParameterBinder::new();
        let sql = predicate.render(&Generic, &mut binder).unwrap();
        assert_eq!(sql, "\"id\" NOT IN (SELECT user_id FROM bans)");
    }

    #[test]
    fn test_qualified_columns_are_quoted() {
        let predicate = PredicateBuilder::new().where_(("u.id", 1)).unwrap();
        let mut binder = ParameterBinder::new();
        assert_eq!(
            predicate.render(&Generic, &mut binder).unwrap(),
            "\"u\".\"id\" = :p0"
        );
    }

    #[test]
    fn test_render_is_repeatable() {
        let predicate = PredicateBuilder::new()
            .where_(("a", 1))
            .unwrap()
            .or_where(("b", op::IN, vec!["x", "y"]))
            .unwrap();
        let first = render(&predicate);
        let second = render(&predicate);
        assert_eq!(first, second);
    }
}
