//! SQL comparison operators and conversions

use std::fmt::{self, Display};

use crate::{Error, Result};

/// A comparison operator usable in a WHERE condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operator(&'static str);

impl Operator {
    pub const EQ: Self = Operator("=");
    pub const NEQ: Self = Operator("!=");
    pub const LT: Self = Operator("<");
    pub const LTE: Self = Operator("<=");
    pub const GT: Self = Operator(">");
    pub const GTE: Self = Operator(">=");
    pub const LIKE: Self = Operator("LIKE");
    pub const NOT_LIKE: Self = Operator("NOT LIKE");
    pub const IN: Self = Operator("IN");
    pub const NOT_IN: Self = Operator("NOT IN");
    pub const IS_NULL: Self = Operator("IS NULL");
    pub const IS_NOT_NULL: Self = Operator("IS NOT NULL");

    const ALL: [Operator; 12] = [
        Self::EQ,
        Self::NEQ,
        Self::LT,
        Self::LTE,
        Self::GT,
        Self::GTE,
        Self::LIKE,
        Self::NOT_LIKE,
        Self::IN,
        Self::NOT_IN,
        Self::IS_NULL,
        Self::IS_NOT_NULL,
    ];

    /// Parse an operator token, case-insensitively and ignoring extra whitespace
    ///
    /// ```
    /// use sqlweave_core::Operator;
    ///
    /// assert_eq!(Operator::parse("is  not null").unwrap(), Operator::IS_NOT_NULL);
    /// assert!(Operator::parse("@@").is_err());
    /// ```
    pub fn parse(token: &str) -> Result<Self> {
        let normalized = token
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        let normalized = if normalized == "<>" { "!=".to_string() } else { normalized };

        Self::ALL
            .iter()
            .copied()
            .find(|op| op.0 == normalized)
            .ok_or_else(|| Error::invalid_argument(format!("Unsupported operator '{}'", token)))
    }

    /// Get the string representation of the operator
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// `IS NULL` and `IS NOT NULL` compare against nothing
    pub fn takes_value(&self) -> bool {
        !matches!(*self, Self::IS_NULL | Self::IS_NOT_NULL)
    }

    /// `IN` and `NOT IN` compare against a parenthesized list
    pub fn takes_list(&self) -> bool {
        matches!(*self, Self::IN | Self::NOT_IN)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for types that can be converted to SQL operators
pub trait IntoOperator {
    fn into_operator(self) -> Result<Operator>;
}

impl IntoOperator for Operator {
    fn into_operator(self) -> Result<Operator> {
        Ok(self)
    }
}

impl IntoOperator for &str {
    fn into_operator(self) -> Result<Operator> {
        Operator::parse(self)
    }
}

impl IntoOperator for String {
    fn into_operator(self) -> Result<Operator> {
        Operator::parse(&self)
    }
}

/// Convenience module for operator constants
pub mod op {
    use super::Operator;

    pub const EQ: Operator = Operator::EQ;
    pub const NEQ: Operator = Operator::NEQ;
    pub const LT: Operator = Operator::LT;
    pub const LTE: Operator = Operator::LTE;
    pub const GT: Operator = Operator::GT;
    pub const GTE: Operator = Operator::GTE;
    pub const LIKE: Operator = Operator::LIKE;
    pub const NOT_LIKE: Operator = Operator::NOT_LIKE;
    pub const IN: Operator = Operator::IN;
    pub const NOT_IN: Operator = Operator::NOT_IN;
    pub const IS_NULL: Operator = Operator::IS_NULL;
    pub const IS_NOT_NULL: Operator = Operator::IS_NOT_NULL;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_constants() {
        assert_eq!(Operator::GT.as_str(), ">");
        assert_eq!(Operator::LT.as_str(), "<");
        assert_eq!(Operator::EQ.as_str(), "=");
        assert_eq!(Operator::LIKE.as_str(), "LIKE");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Operator::GT), ">");
        assert_eq!(format!("{}", Operator::IS_NOT_NULL), "IS NOT NULL");
    }

    #[test]
    fn test_string_conversion() {
        assert_eq!(">".into_operator().unwrap(), Operator::GT);
        assert_eq!("LIKE".into_operator().unwrap(), Operator::LIKE);
        assert_eq!("like".into_operator().unwrap(), Operator::LIKE);
        assert_eq!(">=".into_operator().unwrap(), Operator::GTE);
        assert_eq!("<>".into_operator().unwrap(), Operator::NEQ);
        assert_eq!(" not   in ".into_operator().unwrap(), Operator::NOT_IN);
    }

    #[test]
    fn test_invalid_string_conversion() {
        let err = "INVALID".into_operator().unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("Unsupported operator 'INVALID'"));
    }

    #[test]
    fn test_null_operators() {
        assert_eq!("IS NULL".into_operator().unwrap(), Operator::IS_NULL);
        assert_eq!("is null".into_operator().unwrap(), Operator::IS_NULL);
        assert!(!Operator::IS_NULL.takes_value());
        assert!(!Operator::IS_NOT_NULL.takes_value());
        assert!(Operator::EQ.takes_value());
    }

    #[test]
    fn test_list_operators() {
        assert!(Operator::IN.takes_list());
        assert!(Operator::NOT_IN.takes_list());
        assert!(!Operator::LIKE.takes_list());
    }
}
