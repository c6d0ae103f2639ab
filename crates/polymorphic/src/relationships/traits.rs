//! Owner integration - Typed relation access and cascade deletion for owner types

use async_trait::async_trait;

use crate::backends::RelatedRowStore;
use crate::entity::{EntityMetadata, OwnerRecord};
use crate::error::PolymorphicResult;
use super::builder::PolymorphicQueryBuilder;
use super::cascade::cascade_delete_owned;
use super::descriptor::QueryDescriptor;
use super::registry::RelationRegistry;

/// Owner types with a process-wide polymorphic relation registry
///
/// ```ignore
/// static ARTICLE_RELATIONS: Lazy<RelationRegistry> = Lazy::new(|| {
///     RelationRegistry::normalize([("comments", "ArticleComment")], &defaults)
///         .expect("article relations")
/// });
///
/// impl PolymorphicRelations for Article {
///     fn relations() -> &'static RelationRegistry {
///         &ARTICLE_RELATIONS
///     }
/// }
/// ```
#[async_trait]
pub trait PolymorphicRelations: OwnerRecord + Sized + Send + Sync {
    /// Normalized relations shared by every instance of this type
    fn relations() -> &'static RelationRegistry;

    /// Query descriptor of the named relation for this instance
    fn relation(
        &self,
        metadata: &dyn EntityMetadata,
        name: &str,
    ) -> PolymorphicResult<QueryDescriptor> {
        PolymorphicQueryBuilder::new(metadata).build_by_name(self, Self::relations(), name)
    }

    /// Delete rows owned through cascading relations; call after deleting this owner
    async fn delete_owned<S>(&self, store: &S) -> Result<(), S::Error>
    where
        S: RelatedRowStore + ?Sized,
    {
        cascade_delete_owned(self, Self::relations(), store).await
    }
}
