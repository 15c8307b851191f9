//! Order metadata repository backed by `PostgreSQL`.
//!
//! All statements are parameterized; the key is always a bound value.

use async_trait::async_trait;
use sqlx::PgPool;

use pickup_core::{MetaKey, MetadataError, OrderId, OrderMetadataRepository};

/// `storefront.order_meta` access.
#[derive(Clone)]
pub struct PgOrderMetadataRepository {
    pool: PgPool,
}

impl PgOrderMetadataRepository {
    /// Create a new metadata repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinct values for `key` with the number of orders using each,
    /// most used first.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::StoreUnavailable` if the query fails.
    pub async fn value_counts(&self, key: &MetaKey) -> Result<Vec<(String, i64)>, MetadataError> {
        sqlx::query_as(
            r"
            SELECT meta_value, COUNT(*) AS orders
            FROM storefront.order_meta
            WHERE meta_key = $1
            GROUP BY meta_value
            ORDER BY orders DESC, meta_value
            ",
        )
        .bind(key.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)
    }
}

fn unavailable(e: sqlx::Error) -> MetadataError {
    MetadataError::StoreUnavailable(e.to_string())
}

#[async_trait]
impl OrderMetadataRepository for PgOrderMetadataRepository {
    async fn values(&self, key: &MetaKey) -> Result<Vec<String>, MetadataError> {
        sqlx::query_scalar(
            r"
            SELECT meta_value
            FROM storefront.order_meta
            WHERE meta_key = $1
            ORDER BY id
            ",
        )
        .bind(key.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)
    }

    async fn get(&self, order_id: OrderId, key: &MetaKey) -> Result<Option<String>, MetadataError> {
        sqlx::query_scalar(
            r"
            SELECT meta_value
            FROM storefront.order_meta
            WHERE order_id = $1 AND meta_key = $2
            ",
        )
        .bind(order_id)
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)
    }

    async fn set(
        &self,
        order_id: OrderId,
        key: &MetaKey,
        value: &str,
    ) -> Result<(), MetadataError> {
        sqlx::query(
            r"
            INSERT INTO storefront.order_meta (order_id, meta_key, meta_value)
            VALUES ($1, $2, $3)
            ON CONFLICT (order_id, meta_key) DO UPDATE SET meta_value = EXCLUDED.meta_value
            ",
        )
        .bind(order_id)
        .bind(key.as_str())
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return MetadataError::OrderNotFound(order_id);
            }
            unavailable(e)
        })?;
        Ok(())
    }
}
