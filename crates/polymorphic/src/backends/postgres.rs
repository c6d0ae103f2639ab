//! PostgreSQL Related Row Store
//!
//! Renders cascade deletions through the query builder and executes them with
//! sqlx. Errors from the driver are returned as-is.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Pool, Postgres};

use crate::entity::EntityMetadata;
use crate::query::QueryBuilder;
use crate::relationships::Conditions;
use super::store::RelatedRowStore;

/// [`RelatedRowStore`] backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgRelatedRowStore {
    pool: Pool<Postgres>,
    metadata: Arc<dyn EntityMetadata>,
}

impl PgRelatedRowStore {
    /// Create a store; `metadata` maps entity types to table names
    pub fn new(pool: Pool<Postgres>, metadata: Arc<dyn EntityMetadata>) -> Self {
        Self { pool, metadata }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    /// DELETE statement and parameters for the rows of `entity_type` matching `conditions`
    pub fn delete_statement(&self, entity_type: &str, conditions: &Conditions) -> (String, Vec<Value>) {
        let table = self.metadata.table_name(entity_type);
        QueryBuilder::new()
            .delete_from(&table)
            .where_all(None, conditions)
            .to_sql_with_params()
    }
}

#[async_trait]
impl RelatedRowStore for PgRelatedRowStore {
    type Error = sqlx::Error;

    async fn delete_where(
        &self,
        entity_type: &str,
        conditions: &Conditions,
    ) -> Result<u64, Self::Error> {
        let (sql, params) = self.delete_statement(entity_type, conditions);
        tracing::debug!("Executing cascade delete: {} ({} parameter(s))", sql, params.len());

        let mut query = sqlx::query(&sql);
        for param in &params {
            query = bind_value(query, param);
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Bind a JSON value to a sqlx query using the closest PostgreSQL type
fn bind_value<'q>(
    query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
    value: &Value,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.clone()),
        Value::Array(_) | Value::Object(_) => query.bind(value.clone()),
    }
}
