//! # elif-polymorphic: Polymorphic Relations for elif.rs
//!
//! One related table (or junction table) can hold rows for many unrelated
//! owner types, told apart by a discriminator column. This crate normalizes a
//! declarative relation map into immutable definitions, describes how to
//! fetch the rows of a relation for an owner, and cascade-deletes owned rows
//! when an owner goes away.
//!
//! ```ignore
//! let registry = RelationRegistry::normalize(
//!     [("comments", "ArticleComment")],
//!     &PolymorphicDefaults::default().with_discriminator_value(1),
//! )?;
//! let descriptor = PolymorphicQueryBuilder::new(&catalog)
//!     .build_by_name(&article, &registry, "comments")?;
//! let (sql, params) = descriptor.to_sql(&catalog);
//! ```

pub mod backends;
pub mod config;
pub mod entity;
pub mod error;
pub mod inflector;
pub mod query;
pub mod relationships;

// Re-export core traits and types
pub use backends::{MemoryRowStore, PgRelatedRowStore, RelatedRowStore};
pub use config::PolymorphicConfig;
pub use entity::{single_primary_key, EntityCatalog, EntityInfo, EntityMetadata, OwnerRecord};
pub use error::{ConfigError, ConfigResult, PolymorphicError, PolymorphicResult};
pub use inflector::{EnglishInflector, Inflector};
pub use query::QueryBuilder;
pub use relationships::{
    cascade_delete_owned, ColumnLink, Conditions, JunctionDescriptor, PolymorphicDefaults,
    PolymorphicQueryBuilder, PolymorphicRelations, QueryDescriptor, RawRelation,
    RelationDefinition, RelationKind, RelationRegistry, RelationShape, RelationSpec,
};
