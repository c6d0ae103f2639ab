//! Query Builder SELECT operations

use super::builder::QueryBuilder;

impl QueryBuilder {
    /// Add SELECT fields to the query
    pub fn select(mut self, fields: &str) -> Self {
        self.select_fields.extend(
            fields
                .split(',')
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty()),
        );
        self
    }

    /// Set the FROM table
    pub fn from(mut self, table: &str) -> Self {
        self.from_tables = vec![table.to_string()];
        self
    }
}
