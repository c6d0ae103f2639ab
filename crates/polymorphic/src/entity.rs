//! Entity boundary - What the relation core needs from the persistence layer
//!
//! The core never loads or stores records itself. It asks an [`EntityMetadata`]
//! implementation for primary key columns and table names, and reads key values
//! from owner instances through [`OwnerRecord`].

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{PolymorphicError, PolymorphicResult};
use crate::inflector::{table_name_for, EnglishInflector};

/// Primary key column used when an entity type was never described
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Schema introspection for entity types
pub trait EntityMetadata: Send + Sync {
    /// Primary key column(s) of an entity type
    fn primary_key_columns(&self, entity_type: &str) -> Vec<String>;

    /// Table backing an entity type
    fn table_name(&self, entity_type: &str) -> String {
        table_name_for(&EnglishInflector, entity_type)
    }
}

/// An owner instance whose relations are being resolved
pub trait OwnerRecord {
    /// Entity type of this record, as known to [`EntityMetadata`]
    fn entity_type(&self) -> &str;

    /// Current primary key value
    fn primary_key_value(&self) -> Value;

    /// Value of an arbitrary column, used when a relation links on a non-key column
    fn attribute(&self, _column: &str) -> Option<Value> {
        None
    }
}

/// Resolve the single primary key column of an entity type.
///
/// Composite keys are rejected with [`PolymorphicError::UnsupportedKey`].
pub fn single_primary_key(
    metadata: &dyn EntityMetadata,
    entity_type: &str,
) -> PolymorphicResult<String> {
    let mut columns = metadata.primary_key_columns(entity_type);
    match columns.len() {
        0 => Err(PolymorphicError::MissingPrimaryKey {
            entity_type: entity_type.to_string(),
        }),
        1 => Ok(columns.remove(0)),
        _ => {
            tracing::warn!(
                "Rejecting composite primary key of '{}': {:?}",
                entity_type,
                columns
            );
            Err(PolymorphicError::UnsupportedKey {
                entity_type: entity_type.to_string(),
                columns,
            })
        }
    }
}

/// Table and key information of one entity type
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInfo {
    pub table: String,
    pub primary_key: Vec<String>,
}

/// In-memory [`EntityMetadata`] keyed by entity type
///
/// Entity types that were never registered report a single `id` key and a
/// table name derived from the pluralized type name.
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entities: HashMap<String, EntityInfo>,
}

impl EntityCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity type with its table and primary key column(s)
    pub fn register<I, S>(&mut self, entity_type: &str, table: &str, primary_key: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities.insert(
            entity_type.to_string(),
            EntityInfo {
                table: table.to_string(),
                primary_key: primary_key.into_iter().map(Into::into).collect(),
            },
        );
    }

    /// Builder form of [`EntityCatalog::register`]
    pub fn with_entity<I, S>(mut self, entity_type: &str, table: &str, primary_key: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(entity_type, table, primary_key);
        self
    }

    /// Registered information for an entity type
    pub fn get(&self, entity_type: &str) -> Option<&EntityInfo> {
        self.entities.get(entity_type)
    }
}

impl EntityMetadata for EntityCatalog {
    fn primary_key_columns(&self, entity_type: &str) -> Vec<String> {
        self.entities
            .get(entity_type)
            .map(|info| info.primary_key.clone())
            .unwrap_or_else(|| vec![DEFAULT_PRIMARY_KEY.to_string()])
    }

    fn table_name(&self, entity_type: &str) -> String {
        self.entities
            .get(entity_type)
            .map(|info| info.table.clone())
            .unwrap_or_else(|| table_name_for(&EnglishInflector, entity_type))
    }
}
