//! Application state shared across handlers.

use std::sync::Arc;

use pickup_core::OrderMetadataRepository;

use crate::checkout::{CheckoutHooks, PickupLocationField};
use crate::config::PickupConfig;
use crate::db::{InMemoryOrderStore, OrderRepository};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// order stores and the registered checkout hooks.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    orders: Arc<dyn OrderRepository>,
    hooks: CheckoutHooks,
}

impl AppState {
    /// Create a new application state and register the checkout hooks.
    ///
    /// # Arguments
    ///
    /// * `orders` - Store for order rows
    /// * `metadata` - Store for order metadata (usually backed by the same database)
    /// * `pickup` - Pickup-location field settings
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        metadata: Arc<dyn OrderMetadataRepository>,
        pickup: PickupConfig,
    ) -> Self {
        let hooks =
            CheckoutHooks::new().register(Arc::new(PickupLocationField::new(metadata, pickup)));

        Self {
            inner: Arc::new(AppStateInner { orders, hooks }),
        }
    }

    /// State over a fresh in-memory store, returned alongside it.
    #[must_use]
    pub fn in_memory(pickup: PickupConfig) -> (Self, Arc<InMemoryOrderStore>) {
        let store = Arc::new(InMemoryOrderStore::new());
        let state = Self::new(store.clone(), store.clone(), pickup);
        (state, store)
    }

    /// Get the order store.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderRepository {
        self.inner.orders.as_ref()
    }

    /// Get the registered checkout hooks.
    #[must_use]
    pub fn hooks(&self) -> &CheckoutHooks {
        &self.inner.hooks
    }
}
