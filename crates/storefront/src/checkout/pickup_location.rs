//! Pickup-location checkout field.
//!
//! The option list is whatever pickup locations past orders recorded, read
//! fresh from the metadata store on every render. The chosen value is stored
//! escaped on the new order under [`BILLING_PICKUP_LOCATION`] and echoed back
//! on the admin order screen and the order-received page.
//!
//! Nothing here can block checkout: store failures degrade to an empty option
//! list or to no display line, and a missing submission is stored as "".

use std::sync::Arc;

use askama::Template;
use async_trait::async_trait;

use pickup_core::html::escape_attr;
use pickup_core::{
    BILLING_PICKUP_LOCATION, MetadataError, NewOrder, Order, OrderId, OrderMetadataRepository,
};

use super::hooks::{CheckoutContext, CheckoutData, CheckoutHook, HookError};
use crate::config::{PickupConfig, WritePolicy};

/// Label used on order views.
const DISPLAY_LABEL: &str = "Pickup Location";

/// One `<option>` of the select. `value` is already escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "checkout/pickup_location_field.html")]
struct PickupLocationFieldTemplate<'a> {
    field_name: &'a str,
    label: &'a str,
    options: Vec<SelectOption>,
}

/// The pickup-location field, bound to all four checkout lifecycle events.
pub struct PickupLocationField {
    metadata: Arc<dyn OrderMetadataRepository>,
    config: PickupConfig,
}

impl PickupLocationField {
    /// Create the field over a metadata store.
    #[must_use]
    pub fn new(metadata: Arc<dyn OrderMetadataRepository>, config: PickupConfig) -> Self {
        Self { metadata, config }
    }

    /// Every pickup location recorded on past orders, duplicates included.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::StoreUnavailable` if the store cannot be read.
    pub async fn try_catalog(&self) -> Result<Vec<String>, MetadataError> {
        self.metadata.values(&BILLING_PICKUP_LOCATION).await
    }

    /// Like [`Self::try_catalog`], with a store failure logged and read as
    /// "no locations yet".
    pub async fn catalog(&self) -> Vec<String> {
        self.try_catalog().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Pickup location catalog unavailable, rendering no options");
            Vec::new()
        })
    }

    /// Escaped locations a strict write is checked against.
    ///
    /// Empty when the catalog cannot be read: the page the customer chose from
    /// may have listed values this request cannot see, so nothing is rejected.
    async fn known_locations(&self) -> Vec<String> {
        match self.try_catalog().await {
            Ok(catalog) => self.options(&catalog),
            Err(e) => {
                tracing::warn!(error = %e, "Pickup location catalog unavailable, accepting submission unchecked");
                Vec::new()
            }
        }
    }

    /// Escaped option values: configured seeds, then the catalog.
    ///
    /// Repeated values collapse onto their first occurrence.
    #[must_use]
    pub fn options(&self, catalog: &[String]) -> Vec<String> {
        let mut options: Vec<String> = Vec::new();
        for value in self.config.seeds.iter().chain(catalog) {
            let escaped = escape_attr(value);
            if !options.contains(&escaped) {
                options.push(escaped);
            }
        }
        options
    }

    /// Render the required select for `catalog`, pre-selecting `previous`.
    ///
    /// An empty catalog with no seeds renders a select without options.
    #[must_use]
    pub fn render_field(&self, catalog: &[String], previous: Option<&str>) -> String {
        let previous = previous.map(escape_attr);
        let options: Vec<SelectOption> = self
            .options(catalog)
            .into_iter()
            .map(|value| SelectOption {
                selected: previous.as_deref() == Some(value.as_str()),
                value,
            })
            .collect();

        let key = BILLING_PICKUP_LOCATION;
        let template = PickupLocationFieldTemplate {
            field_name: key.as_str(),
            label: &self.config.label,
            options,
        };

        template.render().unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to render pickup location field");
            String::new()
        })
    }

    /// Copy the submitted location, escaped, onto the order's metadata.
    ///
    /// `known` is the escaped option list and only matters under
    /// [`WritePolicy::Strict`], which rejects empty or unknown values as long
    /// as at least one location is known.
    ///
    /// # Errors
    ///
    /// Returns `HookError::Validation` when the strict policy rejects the value.
    pub fn write(
        &self,
        order: &mut NewOrder,
        data: &CheckoutData,
        known: &[String],
    ) -> Result<(), HookError> {
        let submitted = data.value(BILLING_PICKUP_LOCATION.as_str());
        let stored = escape_attr(submitted);

        if self.config.policy == WritePolicy::Strict && !known.is_empty() {
            if submitted.trim().is_empty() {
                return Err(HookError::Validation {
                    field: "billing_pickup_location",
                    message: format!("{} is a required field.", self.config.label),
                });
            }
            if !known.contains(&stored) {
                return Err(HookError::Validation {
                    field: "billing_pickup_location",
                    message: "Please choose one of the listed pickup locations.".to_owned(),
                });
            }
        }

        order.update_meta_data(BILLING_PICKUP_LOCATION, stored);
        Ok(())
    }

    /// Display line for one order, or "" when nothing is stored.
    pub async fn display(&self, order_id: OrderId) -> String {
        match self.metadata.get(order_id, &BILLING_PICKUP_LOCATION).await {
            Ok(Some(value)) => render_display(&value),
            Ok(None) => String::new(),
            Err(e) => {
                tracing::warn!(order_id = %order_id, error = %e, "Pickup location lookup failed");
                String::new()
            }
        }
    }
}

/// `<p><strong>Pickup Location:</strong> VALUE</p>`, or "" for an empty value.
#[must_use]
pub fn render_display(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    format!(
        "<p><strong>{DISPLAY_LABEL}:</strong> {}</p>",
        escape_attr(value)
    )
}

#[async_trait]
impl CheckoutHook for PickupLocationField {
    fn name(&self) -> &'static str {
        "pickup_location"
    }

    async fn render_checkout_fields(&self, ctx: &CheckoutContext<'_>) -> String {
        let catalog = self.catalog().await;
        self.render_field(
            &catalog,
            ctx.previous_value(BILLING_PICKUP_LOCATION.as_str()),
        )
    }

    async fn create_order(
        &self,
        order: &mut NewOrder,
        data: &CheckoutData,
    ) -> Result<(), HookError> {
        let known = match self.config.policy {
            WritePolicy::Lenient => Vec::new(),
            WritePolicy::Strict => self.known_locations().await,
        };
        self.write(order, data, &known)
    }

    async fn render_admin_order(&self, order: &Order) -> String {
        self.display(order.id).await
    }

    async fn render_billing_fields(&self, order_id: OrderId) -> String {
        self.display(order_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{InMemoryOrderStore, OrderRepository};
    use pickup_core::{BillingDetails, Email};

    fn new_order() -> NewOrder {
        NewOrder::new(
            BillingDetails {
                first_name: "Alex".to_string(),
                last_name: "Rivera".to_string(),
                email: Email::parse("alex@example.com").unwrap(),
                address_1: "9 Pine Rd".to_string(),
                city: "Capital City".to_string(),
                postcode: "99999".to_string(),
                phone: None,
            },
            None,
        )
    }

    fn field(store: &Arc<InMemoryOrderStore>, config: PickupConfig) -> PickupLocationField {
        PickupLocationField::new(store.clone(), config)
    }

    fn strict() -> PickupConfig {
        PickupConfig {
            policy: WritePolicy::Strict,
            ..PickupConfig::default()
        }
    }

    async fn place(store: &InMemoryOrderStore, location: &str) -> Order {
        let mut order = new_order();
        order.update_meta_data(BILLING_PICKUP_LOCATION, location);
        store.create(order).await.unwrap()
    }

    fn catalog(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[tokio::test]
    async fn test_catalog_returns_every_stored_value() {
        let store = Arc::new(InMemoryOrderStore::new());
        for location in ["North", "North", "South"] {
            place(&store, location).await;
        }

        let field = field(&store, PickupConfig::default());
        assert_eq!(field.catalog().await, vec!["North", "North", "South"]);
    }

    #[tokio::test]
    async fn test_catalog_is_empty_when_store_unavailable() {
        let store = Arc::new(InMemoryOrderStore::new());
        place(&store, "North").await;
        store.set_unavailable(true);

        let field = field(&store, PickupConfig::default());
        assert!(field.catalog().await.is_empty());
    }

    #[test]
    fn test_render_field_selects_previous_value() {
        let store = Arc::new(InMemoryOrderStore::new());
        let field = field(&store, PickupConfig::default());

        let html = field.render_field(&catalog(&["North", "South"]), Some("South"));

        assert_eq!(html.matches("<option").count(), 2);
        assert!(html.contains(r#"<option value="North">North</option>"#));
        assert!(html.contains(r#"<option value="South" selected="selected">South</option>"#));
        assert!(html.contains(r#"name="billing_pickup_location""#));
        assert!(html.contains("required"));
        assert!(html.contains("Pickup Locations"));
    }

    #[test]
    fn test_render_field_with_empty_catalog_has_no_options() {
        let store = Arc::new(InMemoryOrderStore::new());
        let field = field(&store, PickupConfig::default());

        let html = field.render_field(&[], None);

        assert!(html.contains("<select"));
        assert!(!html.contains("<option"));
    }

    #[test]
    fn test_render_field_collapses_duplicates() {
        let store = Arc::new(InMemoryOrderStore::new());
        let field = field(&store, PickupConfig::default());

        let html = field.render_field(&catalog(&["North", "South", "North"]), None);

        assert_eq!(html.matches("<option").count(), 2);
        assert!(!html.contains("selected"));
    }

    #[test]
    fn test_options_put_seeds_first() {
        let store = Arc::new(InMemoryOrderStore::new());
        let field = field(
            &store,
            PickupConfig {
                seeds: catalog(&["Depot", "North"]),
                ..PickupConfig::default()
            },
        );

        assert_eq!(
            field.options(&catalog(&["South", "North"])),
            vec!["Depot", "North", "South"]
        );
    }

    #[test]
    fn test_render_field_escapes_values_once() {
        let store = Arc::new(InMemoryOrderStore::new());
        let field = field(&store, PickupConfig::default());

        let html = field.render_field(&catalog(&["North &lt;script&gt;", "Fish & Chips"]), None);

        assert!(html.contains(r#"value="North &lt;script&gt;""#));
        assert!(html.contains(r#"value="Fish &amp; Chips""#));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_write_escapes_submitted_value() {
        let store = Arc::new(InMemoryOrderStore::new());
        let field = field(&store, PickupConfig::default());
        let data: CheckoutData = [("billing_pickup_location", "North <script>")]
            .into_iter()
            .collect();

        let mut order = new_order();
        field.write(&mut order, &data, &[]).unwrap();

        assert_eq!(
            order.meta(&BILLING_PICKUP_LOCATION),
            Some("North &lt;script&gt;")
        );
    }

    #[test]
    fn test_write_missing_value_stores_empty_string() {
        let store = Arc::new(InMemoryOrderStore::new());
        let field = field(&store, PickupConfig::default());

        let mut order = new_order();
        field
            .write(&mut order, &CheckoutData::default(), &[])
            .unwrap();

        assert_eq!(order.meta(&BILLING_PICKUP_LOCATION), Some(""));
    }

    #[test]
    fn test_lenient_write_accepts_unknown_value() {
        let store = Arc::new(InMemoryOrderStore::new());
        let field = field(&store, PickupConfig::default());
        let data: CheckoutData = [("billing_pickup_location", "Nowhere")].into_iter().collect();

        let mut order = new_order();
        field
            .write(&mut order, &data, &catalog(&["North"]))
            .unwrap();

        assert_eq!(order.meta(&BILLING_PICKUP_LOCATION), Some("Nowhere"));
    }

    #[test]
    fn test_strict_write_rejects_unknown_and_empty_values() {
        let store = Arc::new(InMemoryOrderStore::new());
        let field = field(&store, strict());
        let known = catalog(&["North", "South"]);

        let unknown: CheckoutData = [("billing_pickup_location", "Nowhere")].into_iter().collect();
        let mut order = new_order();
        assert!(matches!(
            field.write(&mut order, &unknown, &known),
            Err(HookError::Validation { .. })
        ));
        assert_eq!(order.meta(&BILLING_PICKUP_LOCATION), None);

        let err = field
            .write(&mut order, &CheckoutData::default(), &known)
            .unwrap_err();
        assert_eq!(err.to_string(), "Pickup Locations is a required field.");
    }

    #[test]
    fn test_strict_write_accepts_anything_when_nothing_is_known() {
        let store = Arc::new(InMemoryOrderStore::new());
        let field = field(&store, strict());
        let data: CheckoutData = [("billing_pickup_location", "First Depot")]
            .into_iter()
            .collect();

        let mut order = new_order();
        field.write(&mut order, &data, &[]).unwrap();

        assert_eq!(order.meta(&BILLING_PICKUP_LOCATION), Some("First Depot"));
    }

    #[tokio::test]
    async fn test_strict_create_order_matches_escaped_catalog() {
        let store = Arc::new(InMemoryOrderStore::new());
        place(&store, "North &lt;2&gt;").await;
        let field = field(&store, strict());
        let data: CheckoutData = [("billing_pickup_location", "North <2>")]
            .into_iter()
            .collect();

        let mut order = new_order();
        field.create_order(&mut order, &data).await.unwrap();

        assert_eq!(order.meta(&BILLING_PICKUP_LOCATION), Some("North &lt;2&gt;"));
    }

    #[tokio::test]
    async fn test_strict_create_order_accepts_value_when_catalog_unreadable() {
        let store = Arc::new(InMemoryOrderStore::new());
        place(&store, "North").await;
        let field = field(
            &store,
            PickupConfig {
                seeds: catalog(&["Depot"]),
                ..strict()
            },
        );

        let page = field.render_checkout_fields(&CheckoutContext::fresh()).await;
        assert!(page.contains(r#"<option value="North">North</option>"#));

        store.set_unavailable(true);
        let data: CheckoutData = [("billing_pickup_location", "North")].into_iter().collect();
        let mut order = new_order();
        field.create_order(&mut order, &data).await.unwrap();

        assert_eq!(order.meta(&BILLING_PICKUP_LOCATION), Some("North"));
    }

    #[tokio::test]
    async fn test_try_catalog_reports_store_failure() {
        let store = Arc::new(InMemoryOrderStore::new());
        store.set_unavailable(true);
        let field = field(&store, PickupConfig::default());

        assert!(matches!(
            field.try_catalog().await,
            Err(MetadataError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_display_stored_value() {
        let store = Arc::new(InMemoryOrderStore::new());
        let order = place(&store, "North").await;
        let field = field(&store, PickupConfig::default());

        assert_eq!(
            field.display(order.id).await,
            "<p><strong>Pickup Location:</strong> North</p>"
        );
        assert_eq!(
            field.render_admin_order(&order).await,
            field.render_billing_fields(order.id).await
        );
    }

    #[tokio::test]
    async fn test_display_renders_nothing_without_value() {
        let store = Arc::new(InMemoryOrderStore::new());
        let empty = place(&store, "").await;
        let field = field(&store, PickupConfig::default());

        assert_eq!(field.display(empty.id).await, "");
        assert_eq!(field.display(OrderId::new(404)).await, "");
    }

    #[tokio::test]
    async fn test_display_renders_nothing_when_store_unavailable() {
        let store = Arc::new(InMemoryOrderStore::new());
        let order = place(&store, "North").await;
        store.set_unavailable(true);
        let field = field(&store, PickupConfig::default());

        assert_eq!(field.display(order.id).await, "");
    }
}
