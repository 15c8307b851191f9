//! In-memory order store for tests and local demos.
//!
//! Implements both [`OrderRepository`] and [`OrderMetadataRepository`] over
//! one shared state, so orders created through checkout are visible to the
//! pickup-location field exactly as they would be in `PostgreSQL`.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use pickup_core::{MetaKey, MetadataError, NewOrder, Order, OrderId, OrderMetadataRepository};

use super::{OrderRepository, RepositoryError};

/// One `order_meta` row, kept in insertion order.
#[derive(Debug, Clone)]
struct MetaRow {
    order_id: OrderId,
    key: MetaKey,
    value: String,
}

#[derive(Debug, Default)]
struct State {
    orders: Vec<Order>,
    meta: Vec<MetaRow>,
}

/// Order and metadata store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    state: RwLock<State>,
    unavailable: AtomicBool,
}

impl InMemoryOrderStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of orders stored.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.state.read().orders.len()
    }

    fn check_available(&self) -> Result<(), MetadataError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MetadataError::StoreUnavailable(
                "in-memory store marked unavailable".to_owned(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        self.check_available()?;
        let mut state = self.state.write();

        if state.orders.iter().any(|o| o.order_key == order.order_key) {
            return Err(RepositoryError::Conflict(
                "order key already exists".to_owned(),
            ));
        }

        let next_id = i32::try_from(state.orders.len() + 1)
            .map_err(|_| RepositoryError::Conflict("order id space exhausted".to_owned()))?;
        let id = OrderId::new(next_id);

        let rows: Vec<MetaRow> = order
            .meta_data()
            .map(|(key, value)| MetaRow {
                order_id: id,
                key: key.clone(),
                value: value.to_owned(),
            })
            .collect();
        state.meta.extend(rows);

        let created = Order {
            id,
            order_key: order.order_key,
            billing: order.billing,
            customer_note: order.customer_note,
            created_at: Utc::now(),
        };
        state.orders.push(created.clone());
        drop(state);

        Ok(created)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.check_available()?;
        Ok(self.state.read().orders.iter().find(|o| o.id == id).cloned())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_available()?;
        Ok(())
    }
}

#[async_trait]
impl OrderMetadataRepository for InMemoryOrderStore {
    async fn values(&self, key: &MetaKey) -> Result<Vec<String>, MetadataError> {
        self.check_available()?;
        Ok(self
            .state
            .read()
            .meta
            .iter()
            .filter(|row| &row.key == key)
            .map(|row| row.value.clone())
            .collect())
    }

    async fn get(&self, order_id: OrderId, key: &MetaKey) -> Result<Option<String>, MetadataError> {
        self.check_available()?;
        Ok(self
            .state
            .read()
            .meta
            .iter()
            .find(|row| row.order_id == order_id && &row.key == key)
            .map(|row| row.value.clone()))
    }

    async fn set(
        &self,
        order_id: OrderId,
        key: &MetaKey,
        value: &str,
    ) -> Result<(), MetadataError> {
        self.check_available()?;
        let mut state = self.state.write();

        if !state.orders.iter().any(|o| o.id == order_id) {
            return Err(MetadataError::OrderNotFound(order_id));
        }

        if let Some(row) = state
            .meta
            .iter_mut()
            .find(|row| row.order_id == order_id && &row.key == key)
        {
            value.clone_into(&mut row.value);
        } else {
            state.meta.push(MetaRow {
                order_id,
                key: key.clone(),
                value: value.to_owned(),
            });
        }
        drop(state);

        Ok(())
    }
}
