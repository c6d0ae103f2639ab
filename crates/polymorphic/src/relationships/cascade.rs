//! Cascade Delete - Removes owned related rows when their owner is deleted
//!
//! The owner's own delete routine calls [`cascade_delete_owned`] after the
//! owner row is gone. Only one-to-many relations declared with
//! `cascade_delete` are touched; junction rows of many-to-many relations are
//! never removed here.

use crate::backends::RelatedRowStore;
use crate::entity::OwnerRecord;
use super::descriptor::Conditions;
use super::metadata::RelationDefinition;

/// Conditions selecting the rows of `definition` owned by an owner with key `owner_key`
pub fn cascade_conditions(definition: &RelationDefinition, owner_key: &serde_json::Value) -> Conditions {
    let mut conditions = definition.discriminator_filter();
    conditions.insert(definition.foreign_key_column().to_string(), owner_key.clone());
    conditions
}

/// Delete the owned rows of every cascading one-to-many relation in `definitions`.
///
/// Rows are matched on [`OwnerRecord::primary_key_value`], even for relations
/// whose `primary_key_column` points at another owner column. Queries built by
/// [`PolymorphicQueryBuilder`](super::PolymorphicQueryBuilder) link on that
/// column instead, so such relations read and delete through different keys.
///
/// Stops at the first store error and returns it unchanged.
pub async fn cascade_delete_owned<'a, O, S, I>(
    owner: &O,
    definitions: I,
    store: &S,
) -> Result<(), S::Error>
where
    O: OwnerRecord + ?Sized,
    S: RelatedRowStore + ?Sized,
    I: IntoIterator<Item = &'a RelationDefinition>,
{
    let owner_key = owner.primary_key_value();
    let cascading: Vec<&RelationDefinition> = definitions
        .into_iter()
        .filter(|definition| definition.cascade_delete())
        .collect();

    if cascading.is_empty() {
        return Ok(());
    }

    if owner_key.is_null() {
        tracing::warn!(
            "Skipping cascade delete for '{}': owner has no primary key value",
            owner.entity_type()
        );
        return Ok(());
    }

    for definition in cascading {
        let conditions = cascade_conditions(definition, &owner_key);
        let deleted = store
            .delete_where(definition.related_entity_type(), &conditions)
            .await?;

        tracing::info!(
            "Cascade deleted {} '{}' row(s) of relation '{}' for '{}' {}",
            deleted,
            definition.related_entity_type(),
            definition.name(),
            owner.entity_type(),
            owner_key
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryRowStore;
    use crate::relationships::{PolymorphicDefaults, RelationRegistry, RelationSpec};
    use serde_json::{json, Value};

    struct Article(Value);

    impl OwnerRecord for Article {
        fn entity_type(&self) -> &str {
            "Article"
        }

        fn primary_key_value(&self) -> Value {
            self.0.clone()
        }
    }

    fn registry() -> RelationRegistry {
        RelationRegistry::normalize(
            [
                ("comments", RelationSpec::one_to_many("Comment").with_cascade_delete(true)),
                ("notes", RelationSpec::one_to_many("Note")),
                (
                    "tags",
                    RelationSpec::many_to_many("Tag", "entity_tag").with_cascade_delete(true),
                ),
            ],
            &PolymorphicDefaults::default().with_discriminator_value(1),
        )
        .unwrap()
    }

    fn seeded_store() -> MemoryRowStore {
        let store = MemoryRowStore::new();
        store.insert("Comment", json!({"id": 1, "external_id": 7, "type": 1}));
        store.insert("Comment", json!({"id": 2, "external_id": 7, "type": 2}));
        store.insert("Comment", json!({"id": 3, "external_id": 8, "type": 1}));
        store.insert("Note", json!({"id": 1, "external_id": 7, "type": 1}));
        store.insert("Tag", json!({"id": 1, "external_id": 7, "type": 1}));
        store
    }

    #[test]
    fn test_cascade_conditions() {
        let registry = registry();
        let conditions = cascade_conditions(registry.get("comments").unwrap(), &json!(7));
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions["external_id"], json!(7));
        assert_eq!(conditions["type"], json!(1));
    }

    #[tokio::test]
    async fn test_cascade_only_touches_cascading_one_to_many() {
        let registry = registry();
        let store = seeded_store();

        cascade_delete_owned(&Article(json!(7)), &registry, &store).await.unwrap();

        let comments: Vec<Value> = store.rows("Comment").iter().map(|row| row["id"].clone()).collect();
        assert_eq!(comments, vec![json!(2), json!(3)]);
        assert_eq!(store.count("Note"), 1);
        assert_eq!(store.count("Tag"), 1);
    }

    #[tokio::test]
    async fn test_cascade_matches_primary_key_value_not_link_column() {
        let registry = RelationRegistry::normalize(
            [(
                "comments",
                RelationSpec::one_to_many("Comment")
                    .with_primary_key("ID")
                    .with_cascade_delete(true),
            )],
            &PolymorphicDefaults::default().with_discriminator_value(1),
        )
        .unwrap();
        let store = MemoryRowStore::new();
        store.insert("Comment", json!({"id": 1, "external_id": 7, "type": 1}));
        store.insert("Comment", json!({"id": 2, "external_id": 700, "type": 1}));

        cascade_delete_owned(&Article(json!(7)), &registry, &store).await.unwrap();

        assert_eq!(store.rows("Comment"), vec![json!({"id": 2, "external_id": 700, "type": 1})]);
    }

    #[tokio::test]
    async fn test_null_owner_key_deletes_nothing() {
        let registry = registry();
        let store = seeded_store();

        cascade_delete_owned(&Article(Value::Null), registry.iter(), &store).await.unwrap();
        assert_eq!(store.count("Comment"), 3);
    }
}
