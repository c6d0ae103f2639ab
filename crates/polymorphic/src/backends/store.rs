//! Related Row Store Trait

use async_trait::async_trait;

use crate::relationships::Conditions;

/// Storage that can remove related rows by equality conditions
#[async_trait]
pub trait RelatedRowStore: Send + Sync {
    /// Error reported by the storage layer, passed through untouched
    type Error: Send;

    /// Delete every row of `entity_type` matching all `conditions`; returns the deleted count
    async fn delete_where(
        &self,
        entity_type: &str,
        conditions: &Conditions,
    ) -> Result<u64, Self::Error>;
}
