//! Admin order screen.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use pickup_core::OrderId;

use super::orders::OrderView;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Admin order details template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/order.html")]
pub struct AdminOrderTemplate {
    pub order: OrderView,
    pub admin_fields: String,
}

/// Display one order with hook-provided fields under the billing address.
///
/// GET /orders/{id}
#[instrument(skip(state), fields(order_id = %id))]
pub async fn show_order(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<AdminOrderTemplate> {
    let order = state
        .orders()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let admin_fields = state.hooks().render_admin_order(&order).await;

    Ok(AdminOrderTemplate {
        order: OrderView::from(&order),
        admin_fields,
    })
}
