//! Query Builder SQL generation

use serde_json::Value;
use super::builder::QueryBuilder;
use super::types::*;

impl QueryBuilder {
    /// Generate SQL with `$n` placeholders and return the bound parameters in order
    pub fn to_sql_with_params(&self) -> (String, Vec<Value>) {
        match self.query_type {
            QueryType::Select => self.build_select_sql(),
            QueryType::Delete => self.build_delete_sql(),
        }
    }

    /// Generated SQL without its parameters
    pub fn to_sql(&self) -> String {
        self.to_sql_with_params().0
    }

    /// Build SELECT SQL with parameters
    fn build_select_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::from("SELECT ");
        let mut params = Vec::new();

        if self.select_fields.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.select_fields.join(", "));
        }

        if !self.from_tables.is_empty() {
            sql.push_str(" FROM ");
            sql.push_str(&self.from_tables.join(", "));
        }

        for join in &self.joins {
            sql.push_str(&format!(" {} {}", join.join_type, join.table));
            if !join.on_conditions.is_empty() {
                let conditions: Vec<String> = join
                    .on_conditions
                    .iter()
                    .map(|(left, right)| format!("{} = {}", left, right))
                    .collect();
                sql.push_str(" ON ");
                sql.push_str(&conditions.join(" AND "));
            }
        }

        self.build_where_clause(&mut sql, &mut params);
        (sql, params)
    }

    /// Build DELETE SQL with parameters
    fn build_delete_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();

        if let Some(table) = &self.delete_table {
            sql.push_str(&format!("DELETE FROM {}", table));
            self.build_where_clause(&mut sql, &mut params);
        }

        (sql, params)
    }

    /// Helper method to build WHERE clauses
    fn build_where_clause(&self, sql: &mut String, params: &mut Vec<Value>) {
        if self.where_conditions.is_empty() {
            return;
        }

        sql.push_str(" WHERE ");
        for (i, condition) in self.where_conditions.iter().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }
            match (&condition.operator, &condition.value) {
                (QueryOperator::Equal, Some(value)) => {
                    params.push(value.clone());
                    sql.push_str(&format!("{} {} ${}", condition.column, condition.operator, params.len()));
                }
                (QueryOperator::Equal, None) | (QueryOperator::IsNull, _) => {
                    sql.push_str(&format!("{} {}", condition.column, QueryOperator::IsNull));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select_with_join_and_filters() {
        let (sql, params) = QueryBuilder::new()
            .select("tags.*")
            .from("tags")
            .join("entity_tag", "tags.id", "entity_tag.tag_id")
            .where_eq("entity_tag.external_id", 42)
            .where_eq("entity_tag.type", 1)
            .to_sql_with_params();

        assert_eq!(
            sql,
            "SELECT tags.* FROM tags INNER JOIN entity_tag ON tags.id = entity_tag.tag_id \
             WHERE entity_tag.external_id = $1 AND entity_tag.type = $2"
        );
        assert_eq!(params, vec![json!(42), json!(1)]);
    }

    #[test]
    fn test_delete_with_filters() {
        let (sql, params) = QueryBuilder::new()
            .delete_from("comments")
            .where_eq("external_id", 7)
            .where_eq("type", "article")
            .to_sql_with_params();

        assert_eq!(sql, "DELETE FROM comments WHERE external_id = $1 AND type = $2");
        assert_eq!(params, vec![json!(7), json!("article")]);
    }

    #[test]
    fn test_null_value_renders_is_null() {
        let (sql, params) = QueryBuilder::new()
            .from("comments")
            .where_eq("external_id", Value::Null)
            .where_eq("type", 1)
            .to_sql_with_params();

        assert_eq!(sql, "SELECT * FROM comments WHERE external_id IS NULL AND type = $1");
        assert_eq!(params, vec![json!(1)]);
    }

    #[test]
    fn test_where_all_qualifies_columns() {
        let mut conditions = std::collections::BTreeMap::new();
        conditions.insert("type".to_string(), json!(2));
        conditions.insert("external_id".to_string(), json!(5));

        let query = QueryBuilder::new().from("comments").where_all(Some("comments"), &conditions);
        assert_eq!(
            query.to_sql(),
            "SELECT * FROM comments WHERE comments.external_id = $1 AND comments.type = $2"
        );
        assert_eq!(query.where_conditions().len(), 2);
    }

    #[test]
    fn test_empty_builder_selects_everything() {
        let query = QueryBuilder::new();
        assert_eq!(query.to_sql(), "SELECT *");
        assert_eq!(*query.query_type(), QueryType::Select);
    }
}
