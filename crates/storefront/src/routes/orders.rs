//! Order-received route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use pickup_core::{Order, OrderId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Order display data for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address_1: String,
    pub city: String,
    pub postcode: String,
    pub phone: Option<String>,
    pub customer_note: Option<String>,
    pub created_at: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            name: order.billing.full_name(),
            email: order.billing.email.to_string(),
            address_1: order.billing.address_1.clone(),
            city: order.billing.city.clone(),
            postcode: order.billing.postcode.clone(),
            phone: order.billing.phone.clone(),
            customer_note: order.customer_note.clone(),
            created_at: order.created_at.format("%B %-d, %Y").to_string(),
        }
    }
}

/// Query parameters for the order-received page.
#[derive(Debug, Deserialize)]
pub struct OrderReceivedQuery {
    pub key: Uuid,
}

/// Order-received page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/received.html")]
pub struct OrderReceivedTemplate {
    pub order: OrderView,
    /// Markup from checkout hooks, already escaped.
    pub billing_fields: String,
}

/// Display the order confirmation.
///
/// GET /checkout/order-received/{id}?key=K
///
/// The order key acts as the bearer credential. A wrong key looks exactly
/// like a missing order.
#[instrument(skip(state, query), fields(order_id = %id))]
pub async fn received(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Query(query): Query<OrderReceivedQuery>,
) -> Result<OrderReceivedTemplate> {
    let order = state
        .orders()
        .get(id)
        .await?
        .filter(|order| order.order_key == query.key)
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let billing_fields = state.hooks().render_billing_fields(order.id).await;

    Ok(OrderReceivedTemplate {
        order: OrderView::from(&order),
        billing_fields,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pickup_core::{BillingDetails, Email};

    use super::*;

    #[test]
    fn test_order_view_from_order() {
        let order = Order {
            id: OrderId::new(9),
            order_key: Uuid::new_v4(),
            billing: BillingDetails {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: Email::parse("ada@example.com").unwrap(),
                address_1: "12 Analytical Row".to_string(),
                city: "London".to_string(),
                postcode: "N1".to_string(),
                phone: None,
            },
            customer_note: Some("Ring twice".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap(),
        };

        let view = OrderView::from(&order);
        assert_eq!(view.id, "9");
        assert_eq!(view.name, "Ada Lovelace");
        assert_eq!(view.email, "ada@example.com");
        assert_eq!(view.created_at, "March 5, 2024");
        assert_eq!(view.customer_note.as_deref(), Some("Ring twice"));
    }
}
