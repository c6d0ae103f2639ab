//! Query Builder WHERE clause operations

use super::builder::QueryBuilder;
use super::types::*;
use serde_json::Value;

impl QueryBuilder {
    /// Add WHERE condition with equality; a JSON `null` becomes `IS NULL`
    pub fn where_eq<T>(mut self, column: &str, value: T) -> Self
    where
        T: Into<Value>,
    {
        let value = value.into();
        if value.is_null() {
            return self.where_null(column);
        }
        self.where_conditions.push(WhereCondition {
            column: column.to_string(),
            operator: QueryOperator::Equal,
            value: Some(value),
        });
        self
    }

    /// Add WHERE column IS NULL
    pub fn where_null(mut self, column: &str) -> Self {
        self.where_conditions.push(WhereCondition {
            column: column.to_string(),
            operator: QueryOperator::IsNull,
            value: None,
        });
        self
    }

    /// Add one equality condition per entry, qualifying columns with `table` when given
    pub fn where_all<'a, I>(self, table: Option<&str>, conditions: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        conditions.into_iter().fold(self, |query, (column, value)| {
            let column = match table {
                Some(table) => format!("{}.{}", table, column),
                None => column.clone(),
            };
            query.where_eq(&column, value.clone())
        })
    }
}
