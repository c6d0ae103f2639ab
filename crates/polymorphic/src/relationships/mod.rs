//! Polymorphic Relations
//!
//! Normalization of relation configuration, query description for both
//! relation shapes, and cascade deletion of owned rows.

pub mod builder;
pub mod cascade;
pub mod descriptor;
pub mod metadata;
pub mod registry;
pub mod traits;

pub use builder::PolymorphicQueryBuilder;
pub use cascade::{cascade_conditions, cascade_delete_owned};
pub use descriptor::{ColumnLink, Conditions, JunctionDescriptor, QueryDescriptor};
pub use metadata::{
    PolymorphicDefaults, RawRelation, RelationDefinition, RelationKind, RelationShape,
    RelationSpec, UnknownShape,
};
pub use registry::RelationRegistry;
pub use traits::PolymorphicRelations;
