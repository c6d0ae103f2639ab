//! Query Builder Module - Renders relation descriptors into parameterized SQL

pub mod builder;
pub mod dml;
pub mod joins;
pub mod select;
pub mod sql_generation;
pub mod types;
pub mod where_clause;

pub use builder::QueryBuilder;
pub use types::{JoinClause, JoinType, QueryOperator, QueryType, WhereCondition};
