//! Order metadata store interface.
//!
//! Checkout extensions never touch tables directly. They read and write
//! order metadata through [`OrderMetadataRepository`], which the storefront
//! implements on `PostgreSQL` and in memory.

use async_trait::async_trait;
use thiserror::Error;

use crate::{MetaKey, OrderId};

/// Errors returned by an [`OrderMetadataRepository`].
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The backing store could not be reached or the query failed.
    #[error("order metadata store unavailable: {0}")]
    StoreUnavailable(String),

    /// Metadata was written for an order that does not exist.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),
}

/// Key/value metadata attached to orders.
#[async_trait]
pub trait OrderMetadataRepository: Send + Sync {
    /// Every stored value for `key` across all orders, oldest first.
    ///
    /// Duplicates and blank values are returned as stored.
    async fn values(&self, key: &MetaKey) -> Result<Vec<String>, MetadataError>;

    /// The value stored for `key` on one order.
    async fn get(&self, order_id: OrderId, key: &MetaKey) -> Result<Option<String>, MetadataError>;

    /// Insert or replace the value stored for `key` on one order.
    async fn set(&self, order_id: OrderId, key: &MetaKey, value: &str)
    -> Result<(), MetadataError>;
}
