//! Query Builder - Core builder implementation

use super::types::*;

/// Query builder for relation SELECT and cascade DELETE statements
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    pub(crate) query_type: QueryType,
    pub(crate) select_fields: Vec<String>,
    pub(crate) from_tables: Vec<String>,
    pub(crate) delete_table: Option<String>,
    pub(crate) where_conditions: Vec<WhereCondition>,
    pub(crate) joins: Vec<JoinClause>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    /// Create a new query builder
    pub fn new() -> Self {
        Self {
            query_type: QueryType::Select,
            select_fields: Vec::new(),
            from_tables: Vec::new(),
            delete_table: None,
            where_conditions: Vec::new(),
            joins: Vec::new(),
        }
    }

    /// Kind of statement this builder produces
    pub fn query_type(&self) -> &QueryType {
        &self.query_type
    }

    /// WHERE conditions in insertion order
    pub fn where_conditions(&self) -> &[WhereCondition] {
        &self.where_conditions
    }

    /// JOIN clauses in insertion order
    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }
}
