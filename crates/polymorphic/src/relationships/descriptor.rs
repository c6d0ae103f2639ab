//! Query Descriptors - Backend-neutral description of how to fetch related rows

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::EntityMetadata;
use crate::query::QueryBuilder;
use super::metadata::RelationShape;

/// Column/value equality conditions, ordered by column name
pub type Conditions = BTreeMap<String, Value>;

/// A `(local, remote)` column pair joined by equality
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLink {
    pub local: String,
    pub remote: String,
}

impl ColumnLink {
    pub fn new(local: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            remote: remote.into(),
        }
    }
}

/// How a many-to-many relation passes through its junction table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JunctionDescriptor {
    pub table: String,
    /// (owner key column, junction foreign key column)
    pub owner_link: ColumnLink,
    /// (related primary key column, junction related key column)
    pub related_link: ColumnLink,
    /// Discriminator condition applied to junction rows
    pub junction_filter: Conditions,
}

/// Everything a data-access layer needs to fetch the rows of one relation for one owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub relation: String,
    pub shape: RelationShape,
    pub related_entity_type: String,
    /// One-to-many: (owner key, foreign key). Many-to-many: the junction's related link.
    pub link_column: ColumnLink,
    /// Discriminator condition on the related table; empty for many-to-many
    pub filter: Conditions,
    pub owner_key: Value,
    pub junction: Option<JunctionDescriptor>,
}

impl QueryDescriptor {
    /// Returns true if rows are reached through a junction table
    pub fn is_junction(&self) -> bool {
        self.junction.is_some()
    }

    /// Full equality predicate for this owner.
    ///
    /// One-to-many conditions apply to the related table; many-to-many
    /// conditions apply to the junction table.
    pub fn conditions(&self) -> Conditions {
        match &self.junction {
            None => {
                let mut conditions = self.filter.clone();
                conditions.insert(self.link_column.remote.clone(), self.owner_key.clone());
                conditions
            }
            Some(junction) => {
                let mut conditions = junction.junction_filter.clone();
                conditions.insert(junction.owner_link.remote.clone(), self.owner_key.clone());
                conditions
            }
        }
    }

    /// Render as a SELECT over the related table
    pub fn to_query_builder(&self, metadata: &dyn EntityMetadata) -> QueryBuilder {
        let table = metadata.table_name(&self.related_entity_type);
        let query = QueryBuilder::new()
            .select(&format!("{}.*", table))
            .from(&table);

        match &self.junction {
            None => query
                .where_eq(&format!("{}.{}", table, self.link_column.remote), self.owner_key.clone())
                .where_all(Some(table.as_str()), &self.filter),
            Some(junction) => query
                .join(
                    &junction.table,
                    &format!("{}.{}", table, junction.related_link.local),
                    &format!("{}.{}", junction.table, junction.related_link.remote),
                )
                .where_eq(
                    &format!("{}.{}", junction.table, junction.owner_link.remote),
                    self.owner_key.clone(),
                )
                .where_all(Some(junction.table.as_str()), &junction.junction_filter),
        }
    }

    /// Parameterized SQL for this relation
    pub fn to_sql(&self, metadata: &dyn EntityMetadata) -> (String, Vec<Value>) {
        self.to_query_builder(metadata).to_sql_with_params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityCatalog;
    use serde_json::json;

    fn filter(column: &str, value: Value) -> Conditions {
        let mut conditions = Conditions::new();
        conditions.insert(column.to_string(), value);
        conditions
    }

    fn one_to_many() -> QueryDescriptor {
        QueryDescriptor {
            relation: "comments".to_string(),
            shape: RelationShape::OneToMany,
            related_entity_type: "Comment".to_string(),
            link_column: ColumnLink::new("id", "external_id"),
            filter: filter("type", json!(1)),
            owner_key: json!(10),
            junction: None,
        }
    }

    fn many_to_many() -> QueryDescriptor {
        QueryDescriptor {
            relation: "tags".to_string(),
            shape: RelationShape::ManyToMany,
            related_entity_type: "Tag".to_string(),
            link_column: ColumnLink::new("id", "tag_id"),
            filter: Conditions::new(),
            owner_key: json!(10),
            junction: Some(JunctionDescriptor {
                table: "entity_tag".to_string(),
                owner_link: ColumnLink::new("id", "external_id"),
                related_link: ColumnLink::new("id", "tag_id"),
                junction_filter: filter("type", json!(1)),
            }),
        }
    }

    #[test]
    fn test_one_to_many_conditions() {
        let descriptor = one_to_many();
        assert!(!descriptor.is_junction());

        let conditions = descriptor.conditions();
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions["external_id"], json!(10));
        assert_eq!(conditions["type"], json!(1));
    }

    #[test]
    fn test_many_to_many_conditions_target_junction() {
        let descriptor = many_to_many();
        assert!(descriptor.is_junction());

        let conditions = descriptor.conditions();
        assert_eq!(conditions["external_id"], json!(10));
        assert_eq!(conditions["type"], json!(1));
        assert!(!conditions.contains_key("tag_id"));
    }

    #[test]
    fn test_one_to_many_sql() {
        let catalog = EntityCatalog::new();
        let (sql, params) = one_to_many().to_sql(&catalog);

        assert_eq!(
            sql,
            "SELECT comments.* FROM comments WHERE comments.external_id = $1 AND comments.type = $2"
        );
        assert_eq!(params, vec![json!(10), json!(1)]);
    }

    #[test]
    fn test_many_to_many_sql() {
        let catalog = EntityCatalog::new().with_entity("Tag", "tag", ["id"]);
        let (sql, params) = many_to_many().to_sql(&catalog);

        assert_eq!(
            sql,
            "SELECT tag.* FROM tag INNER JOIN entity_tag ON tag.id = entity_tag.tag_id \
             WHERE entity_tag.external_id = $1 AND entity_tag.type = $2"
        );
        assert_eq!(params, vec![json!(10), json!(1)]);
    }

    #[test]
    fn test_descriptor_serializes() {
        let value = serde_json::to_value(one_to_many()).unwrap();
        assert_eq!(value["shape"], json!("one_to_many"));
        assert_eq!(value["link_column"]["remote"], json!("external_id"));
        assert_eq!(value["junction"], Value::Null);
    }
}
