//! Polymorphic Query Builder - Turns a normalized relation and an owner into a query descriptor

use serde_json::Value;

use crate::entity::{single_primary_key, EntityMetadata, OwnerRecord};
use crate::error::{PolymorphicError, PolymorphicResult};
use super::descriptor::{ColumnLink, Conditions, JunctionDescriptor, QueryDescriptor};
use super::metadata::{RelationDefinition, RelationKind};
use super::registry::RelationRegistry;

/// Builds [`QueryDescriptor`]s, introspecting primary keys through [`EntityMetadata`]
#[derive(Clone, Copy)]
pub struct PolymorphicQueryBuilder<'a> {
    metadata: &'a dyn EntityMetadata,
}

impl<'a> PolymorphicQueryBuilder<'a> {
    pub fn new(metadata: &'a dyn EntityMetadata) -> Self {
        Self { metadata }
    }

    /// Describe how to fetch the rows of `definition` that belong to `owner`
    pub fn build_query<O>(
        &self,
        owner: &O,
        definition: &RelationDefinition,
    ) -> PolymorphicResult<QueryDescriptor>
    where
        O: OwnerRecord + ?Sized,
    {
        let owner_key_column = self.owner_key_column(owner, definition)?;
        let owner_key = owner_key_value(owner, definition, &owner_key_column)?;

        let owner_link = ColumnLink::new(owner_key_column, definition.foreign_key_column());

        let descriptor = match definition.kind() {
            RelationKind::OneToMany { .. } => QueryDescriptor {
                relation: definition.name().to_string(),
                shape: definition.shape(),
                related_entity_type: definition.related_entity_type().to_string(),
                link_column: owner_link,
                filter: definition.discriminator_filter(),
                owner_key,
                junction: None,
            },
            RelationKind::ManyToMany {
                junction_table,
                related_key_column,
                ..
            } => {
                let related_link = ColumnLink::new(
                    self.related_primary_key_column(definition)?,
                    related_key_column.as_str(),
                );
                QueryDescriptor {
                    relation: definition.name().to_string(),
                    shape: definition.shape(),
                    related_entity_type: definition.related_entity_type().to_string(),
                    link_column: related_link.clone(),
                    filter: Conditions::new(),
                    owner_key,
                    junction: Some(JunctionDescriptor {
                        table: junction_table.clone(),
                        owner_link,
                        related_link,
                        junction_filter: definition.discriminator_filter(),
                    }),
                }
            }
        };

        tracing::debug!(
            "Built {} query for relation '{}' of '{}' (owner key {})",
            descriptor.shape,
            descriptor.relation,
            owner.entity_type(),
            descriptor.owner_key
        );

        Ok(descriptor)
    }

    /// Look a relation up by name and build its query
    pub fn build_by_name<O>(
        &self,
        owner: &O,
        registry: &RelationRegistry,
        name: &str,
    ) -> PolymorphicResult<QueryDescriptor>
    where
        O: OwnerRecord + ?Sized,
    {
        let definition = registry
            .get(name)
            .ok_or_else(|| PolymorphicError::UnknownRelation(name.to_string()))?;
        self.build_query(owner, definition)
    }

    /// Owner column the junction or related foreign key points at
    pub fn owner_key_column<O>(
        &self,
        owner: &O,
        definition: &RelationDefinition,
    ) -> PolymorphicResult<String>
    where
        O: OwnerRecord + ?Sized,
    {
        match definition.primary_key_column() {
            Some(column) => Ok(column.to_string()),
            None => single_primary_key(self.metadata, owner.entity_type()),
        }
    }

    /// Related entity column matched against the junction's related key
    pub fn related_primary_key_column(
        &self,
        definition: &RelationDefinition,
    ) -> PolymorphicResult<String> {
        match definition.kind() {
            RelationKind::ManyToMany {
                related_primary_key_column: Some(column),
                ..
            } => Ok(column.clone()),
            _ => single_primary_key(self.metadata, definition.related_entity_type()),
        }
    }
}

/// Value of the owner key column.
///
/// A configured column must be exposed through [`OwnerRecord::attribute`].
/// An introspected primary key column may fall back to
/// [`OwnerRecord::primary_key_value`]. Null keys are rejected, since they
/// would match every orphan row.
fn owner_key_value<O>(owner: &O, definition: &RelationDefinition, column: &str) -> PolymorphicResult<Value>
where
    O: OwnerRecord + ?Sized,
{
    let value = match (owner.attribute(column), definition.primary_key_column()) {
        (Some(value), _) => value,
        (None, None) => owner.primary_key_value(),
        (None, Some(_)) => {
            tracing::warn!(
                "Owner '{}' does not expose key column '{}' of relation '{}'",
                owner.entity_type(),
                column,
                definition.name()
            );
            return Err(PolymorphicError::MissingAttribute {
                entity_type: owner.entity_type().to_string(),
                column: column.to_string(),
            });
        }
    };

    if value.is_null() {
        return Err(PolymorphicError::NullOwnerKey {
            entity_type: owner.entity_type().to_string(),
            column: column.to_string(),
        });
    }

    Ok(value)
}
