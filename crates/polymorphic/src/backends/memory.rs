//! In-memory Related Row Store
//!
//! Rows are JSON objects grouped by entity type. Useful for tests and for
//! embedding the cascade logic without a database.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::relationships::Conditions;
use super::store::RelatedRowStore;

#[derive(Debug, Default)]
pub struct MemoryRowStore {
    rows: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to an entity type
    pub fn insert(&self, entity_type: &str, row: Value) {
        self.lock()
            .entry(entity_type.to_string())
            .or_default()
            .push(row);
    }

    /// Snapshot of the rows stored for an entity type
    pub fn rows(&self, entity_type: &str) -> Vec<Value> {
        self.lock().get(entity_type).cloned().unwrap_or_default()
    }

    pub fn count(&self, entity_type: &str) -> usize {
        self.lock().get(entity_type).map(Vec::len).unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Value>>> {
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn matches_all(row: &Value, conditions: &Conditions) -> bool {
    conditions
        .iter()
        .all(|(column, expected)| row.get(column).unwrap_or(&Value::Null) == expected)
}

#[async_trait]
impl RelatedRowStore for MemoryRowStore {
    type Error = Infallible;

    async fn delete_where(
        &self,
        entity_type: &str,
        conditions: &Conditions,
    ) -> Result<u64, Self::Error> {
        let mut rows = self.lock();
        let Some(table) = rows.get_mut(entity_type) else {
            return Ok(0);
        };

        let before = table.len();
        table.retain(|row| !matches_all(row, conditions));
        Ok((before - table.len()) as u64)
    }
}
