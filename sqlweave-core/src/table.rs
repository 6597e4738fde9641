//! Table references with optional aliases

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;

use crate::{Dialect, Error, Result};

/// The target table of a statement: a bare name or an `alias → name` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRef {
    Name(String),
    Aliased { alias: String, name: String },
}

impl TableRef {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn aliased(alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Aliased {
            alias: alias.into(),
            name: name.into(),
        }
    }

    /// Render the reference with the dialect's quoting: `"users"` or `"users" AS "u"`
    pub fn resolve(&self, dialect: &dyn Dialect) -> String {
        match self {
            Self::Name(name) => dialect.quote_identifier(name),
            Self::Aliased { alias, name } => format!(
                "{} AS {}",
                dialect.quote_identifier(name),
                dialect.quote_identifier(alias)
            ),
        }
    }

    /// Build an aliased reference from a single-entry `alias → name` mapping
    pub fn from_pairs<I, A, N>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (A, N)>,
        A: Into<String>,
        N: Into<String>,
    {
        let mut iter = pairs.into_iter();
        let (alias, name) = iter
            .next()
            .ok_or_else(|| Error::invalid_argument("Table alias mapping is empty"))?;
        if iter.next().is_some() {
            return Err(Error::invalid_argument(
                "Table alias mapping must contain exactly one alias => table pair",
            ));
        }
        Ok(Self::aliased(alias, name))
    }
}

/// Trait for types that can name a statement's table
pub trait IntoTableRef {
    fn into_table_ref(self) -> Result<TableRef>;
}

impl IntoTableRef for TableRef {
    fn into_table_ref(self) -> Result<TableRef> {
        Ok(self)
    }
}

impl IntoTableRef for &str {
    fn into_table_ref(self) -> Result<TableRef> {
        Ok(TableRef::name(self))
    }
}

impl IntoTableRef for String {
    fn into_table_ref(self) -> Result<TableRef> {
        Ok(TableRef::Name(self))
    }
}

impl IntoTableRef for &String {
    fn into_table_ref(self) -> Result<TableRef> {
        Ok(TableRef::name(self.as_str()))
    }
}

// `(alias, table)`
impl IntoTableRef for (&str, &str) {
    fn into_table_ref(self) -> Result<TableRef> {
        Ok(TableRef::aliased(self.0, self.1))
    }
}

impl IntoTableRef for (String, String) {
    fn into_table_ref(self) -> Result<TableRef> {
        Ok(TableRef::aliased(self.0, self.1))
    }
}

impl<const N: usize> IntoTableRef for [(&str, &str); N] {
    fn into_table_ref(self) -> Result<TableRef> {
        TableRef::from_pairs(self)
    }
}

impl IntoTableRef for Vec<(&str, &str)> {
    fn into_table_ref(self) -> Result<TableRef> {
        TableRef::from_pairs(self)
    }
}

impl IntoTableRef for Vec<(String, String)> {
    fn into_table_ref(self) -> Result<TableRef> {
        TableRef::from_pairs(self)
    }
}

impl<A, N, S> IntoTableRef for HashMap<A, N, S>
where
    A: Into<String>,
    N: Into<String>,
{
    fn into_table_ref(self) -> Result<TableRef> {
        TableRef::from_pairs(self)
    }
}

impl<A, N> IntoTableRef for BTreeMap<A, N>
where
    A: Into<String>,
    N: Into<String>,
{
    fn into_table_ref(self) -> Result<TableRef> {
        TableRef::from_pairs(self)
    }
}

impl<A, N, S> IntoTableRef for IndexMap<A, N, S>
where
    A: Into<String>,
    N: Into<String>,
{
    fn into_table_ref(self) -> Result<TableRef> {
        TableRef::from_pairs(self)
    }
}
