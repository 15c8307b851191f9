//! Typed checkout lifecycle interface.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use pickup_core::{MetadataError, NewOrder, Order, OrderId};

/// Errors a hook can raise while an order is being created.
#[derive(Debug, Error)]
pub enum HookError {
    /// Submitted data was rejected; shown to the customer.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The hook needed the metadata store and could not reach it.
    #[error("metadata store error: {0}")]
    Store(#[from] MetadataError),
}

/// Raw checkout form submission, keyed by field name.
///
/// Fields the customer never sent are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CheckoutData(HashMap<String, String>);

impl CheckoutData {
    /// Submitted value of `field`, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Submitted value of `field`, or the empty string when absent.
    #[must_use]
    pub fn value(&self, field: &str) -> &str {
        self.get(field).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CheckoutData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// What a checkout-field hook knows about the current render.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutContext<'a> {
    /// The submission being re-displayed after a failed checkout, if any.
    pub submitted: Option<&'a CheckoutData>,
}

impl<'a> CheckoutContext<'a> {
    /// Context for a first render of the checkout page.
    #[must_use]
    pub const fn fresh() -> Self {
        Self { submitted: None }
    }

    /// Context for re-rendering a rejected submission.
    #[must_use]
    pub const fn resubmission(submitted: &'a CheckoutData) -> Self {
        Self {
            submitted: Some(submitted),
        }
    }

    /// Previously submitted value of `field`.
    #[must_use]
    pub fn previous_value(&self, field: &str) -> Option<&'a str> {
        self.submitted.and_then(|data| data.get(field))
    }
}

/// A checkout extension bound to the host's lifecycle events.
///
/// Every method has a no-op default so extensions implement only the events
/// they care about. Render methods return markup fragments that the host
/// inserts unescaped, so implementations must escape their own output.
#[async_trait]
pub trait CheckoutHook: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Extra form fields, rendered before the order notes.
    async fn render_checkout_fields(&self, _ctx: &CheckoutContext<'_>) -> String {
        String::new()
    }

    /// Called once per order, after host validation and before persistence.
    async fn create_order(
        &self,
        _order: &mut NewOrder,
        _data: &CheckoutData,
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Markup shown on the admin order screen after the billing address.
    async fn render_admin_order(&self, _order: &Order) -> String {
        String::new()
    }

    /// Markup shown in the billing section of customer-facing order views.
    async fn render_billing_fields(&self, _order_id: OrderId) -> String {
        String::new()
    }
}

/// Hooks in registration order.
#[derive(Clone, Default)]
pub struct CheckoutHooks {
    hooks: Vec<Arc<dyn CheckoutHook>>,
}

impl fmt::Debug for CheckoutHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|h| h.name()))
            .finish()
    }
}

impl CheckoutHooks {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook; hooks run in the order they were registered.
    #[must_use]
    pub fn register(mut self, hook: Arc<dyn CheckoutHook>) -> Self {
        tracing::debug!(hook = hook.name(), "Registered checkout hook");
        self.hooks.push(hook);
        self
    }

    /// Concatenated checkout-field markup from every hook.
    pub async fn render_checkout_fields(&self, ctx: &CheckoutContext<'_>) -> String {
        let mut out = String::new();
        for hook in &self.hooks {
            out.push_str(&hook.render_checkout_fields(ctx).await);
        }
        out
    }

    /// Run every `create_order` hook, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first [`HookError`] raised.
    pub async fn create_order(
        &self,
        order: &mut NewOrder,
        data: &CheckoutData,
    ) -> Result<(), HookError> {
        for hook in &self.hooks {
            if let Err(e) = hook.create_order(order, data).await {
                tracing::info!(hook = hook.name(), error = %e, "Checkout hook rejected order");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Concatenated admin order markup from every hook.
    pub async fn render_admin_order(&self, order: &Order) -> String {
        let mut out = String::new();
        for hook in &self.hooks {
            out.push_str(&hook.render_admin_order(order).await);
        }
        out
    }

    /// Concatenated billing-section markup from every hook.
    pub async fn render_billing_fields(&self, order_id: OrderId) -> String {
        let mut out = String::new();
        for hook in &self.hooks {
            out.push_str(&hook.render_billing_fields(order_id).await);
        }
        out
    }
}
