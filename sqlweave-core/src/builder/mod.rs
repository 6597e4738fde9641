//! Query builder module

pub mod common;
pub mod predicate;
pub mod select;
pub mod insert;
pub mod update;
pub mod delete;

// Re-export types from submodules
pub use common::{
    IntoColumns, IntoSetValue, IntoValuePairs, JoinType, QueryBuilder, QueryCore, SetValue,
    SortDirection,
};
pub use predicate::{
    Comparison, IntoCondition, IntoOperand, Operand, Predicate, PredicateBuilder, WhereConnector,
};
pub use select::{JoinClause, OrderByClause, SelectBuilder};
pub use insert::InsertBuilder;
pub use update::UpdateBuilder;
pub use delete::DeleteBuilder;
