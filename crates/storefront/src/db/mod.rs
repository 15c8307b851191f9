//! Database operations for storefront `PostgreSQL`.
//!
//! # Database: `pickup_storefront`
//!
//! ## Tables
//!
//! - `storefront.orders` - Orders placed through checkout
//! - `storefront.order_meta` - Key/value metadata per order (pickup location lives here)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p pickup-cli -- migrate
//! ```
//!
//! # Stores
//!
//! Handlers only see the [`OrderRepository`] and
//! [`pickup_core::OrderMetadataRepository`] traits. [`PgOrderRepository`] and
//! [`PgOrderMetadataRepository`] back them in production;
//! [`InMemoryOrderStore`] backs both in tests and local demos.

pub mod memory;
pub mod order_meta;
pub mod orders;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use pickup_core::{MetadataError, NewOrder, Order, OrderId};

pub use memory::InMemoryOrderStore;
pub use order_meta::PgOrderMetadataRepository;
pub use orders::PgOrderRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate order key).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<MetadataError> for RepositoryError {
    fn from(e: MetadataError) -> Self {
        match e {
            MetadataError::OrderNotFound(_) => Self::NotFound,
            MetadataError::StoreUnavailable(msg) => Self::Unavailable(msg),
        }
    }
}

/// Orders owned by the host order system.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order together with its pending metadata.
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// Fetch an order by ID.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
