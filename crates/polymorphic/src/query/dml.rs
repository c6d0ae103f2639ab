//! Query Builder DML operations (DELETE)

use super::builder::QueryBuilder;
use super::types::*;

impl QueryBuilder {
    /// Start a DELETE query
    pub fn delete_from(mut self, table: &str) -> Self {
        self.query_type = QueryType::Delete;
        self.delete_table = Some(table.to_string());
        self
    }
}
