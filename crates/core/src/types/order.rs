//! Orders as seen by checkout extensions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Email, MetaKey, OrderId};

/// Billing details collected by the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub address_1: String,
    pub city: String,
    pub postcode: String,
    pub phone: Option<String>,
}

impl BillingDetails {
    /// First and last name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

/// An order being assembled at checkout, before the host persists it.
///
/// Checkout extensions attach metadata with [`NewOrder::update_meta_data`];
/// the host writes the order row and every metadata entry together.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_key: Uuid,
    pub billing: BillingDetails,
    pub customer_note: Option<String>,
    meta: BTreeMap<MetaKey, String>,
}

impl NewOrder {
    /// Start a new order with a freshly generated order key.
    #[must_use]
    pub fn new(billing: BillingDetails, customer_note: Option<String>) -> Self {
        Self {
            order_key: Uuid::new_v4(),
            billing,
            customer_note,
            meta: BTreeMap::new(),
        }
    }

    /// Set a metadata entry, replacing any earlier value for the key.
    pub fn update_meta_data(&mut self, key: MetaKey, value: impl Into<String>) {
        self.meta.insert(key, value.into());
    }

    /// Pending metadata value for `key`.
    #[must_use]
    pub fn meta(&self, key: &MetaKey) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// All pending metadata entries, ordered by key.
    pub fn meta_data(&self) -> impl Iterator<Item = (&MetaKey, &str)> {
        self.meta.iter().map(|(k, v)| (k, v.as_str()))
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_key: Uuid,
    pub billing: BillingDetails,
    pub customer_note: Option<String>,
    pub created_at: DateTime<Utc>,
}
