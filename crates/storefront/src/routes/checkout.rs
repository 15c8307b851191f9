//! Checkout route handlers.
//!
//! The host owns billing validation and order persistence. Checkout hooks add
//! their fields to the form and their metadata to the order in between.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use pickup_core::{BillingDetails, Email, NewOrder};

use crate::checkout::{CheckoutContext, CheckoutData, HookError};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// Billing form values echoed back into the checkout form.
#[derive(Debug, Clone, Default)]
pub struct BillingFormView {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address_1: String,
    pub city: String,
    pub postcode: String,
    pub phone: String,
    pub order_comments: String,
}

impl From<&CheckoutData> for BillingFormView {
    fn from(data: &CheckoutData) -> Self {
        let field = |name: &str| data.value(name).to_owned();
        Self {
            first_name: field("billing_first_name"),
            last_name: field("billing_last_name"),
            email: field("billing_email"),
            address_1: field("billing_address_1"),
            city: field("billing_city"),
            postcode: field("billing_postcode"),
            phone: field("billing_phone"),
            order_comments: field("order_comments"),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub errors: Vec<String>,
    pub billing: BillingFormView,
    /// Markup from checkout hooks, already escaped.
    pub extra_fields: String,
}

/// Required billing fields and their labels, in form order.
const REQUIRED_FIELDS: &[(&str, &str)] = &[
    ("billing_first_name", "First name"),
    ("billing_last_name", "Last name"),
    ("billing_address_1", "Street address"),
    ("billing_city", "Town / City"),
    ("billing_postcode", "Postcode / ZIP"),
    ("billing_email", "Email address"),
];

/// Validate the billing section of a submission.
///
/// Collects every problem so the customer sees them all at once.
fn parse_billing(data: &CheckoutData) -> std::result::Result<BillingDetails, Vec<String>> {
    let mut errors: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|(name, _)| data.value(name).trim().is_empty())
        .map(|(_, label)| format!("Billing {label} is a required field."))
        .collect();

    let email_raw = data.value("billing_email");
    let email = Email::parse(email_raw);
    if let Err(e) = &email
        && !email_raw.trim().is_empty()
    {
        errors.push(format!("Billing Email address is not valid: {e}."));
    }

    match email {
        Ok(email) if errors.is_empty() => {
            let field = |name: &str| data.value(name).trim().to_owned();
            Ok(BillingDetails {
                first_name: field("billing_first_name"),
                last_name: field("billing_last_name"),
                email,
                address_1: field("billing_address_1"),
                city: field("billing_city"),
                postcode: field("billing_postcode"),
                phone: Some(field("billing_phone")).filter(|p| !p.is_empty()),
            })
        }
        _ => Err(errors),
    }
}

/// Order notes, if the customer left any.
fn customer_note(data: &CheckoutData) -> Option<String> {
    Some(data.value("order_comments").trim().to_owned()).filter(|n| !n.is_empty())
}

/// Re-render the checkout form for a rejected submission.
async fn rejected(state: &AppState, data: &CheckoutData, errors: Vec<String>) -> Response {
    let extra_fields = state
        .hooks()
        .render_checkout_fields(&CheckoutContext::resubmission(data))
        .await;

    let template = CheckoutTemplate {
        errors,
        billing: BillingFormView::from(data),
        extra_fields,
    };

    (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
}

/// Display the checkout form.
///
/// GET /checkout
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> CheckoutTemplate {
    let extra_fields = state
        .hooks()
        .render_checkout_fields(&CheckoutContext::fresh())
        .await;

    CheckoutTemplate {
        errors: Vec::new(),
        billing: BillingFormView::default(),
        extra_fields,
    }
}

/// Place an order.
///
/// POST /checkout
///
/// Validates billing details, lets hooks attach metadata, persists the order
/// and redirects to the order-received page.
#[instrument(skip(state, data))]
pub async fn submit(
    State(state): State<AppState>,
    Form(data): Form<CheckoutData>,
) -> Result<Response> {
    let billing = match parse_billing(&data) {
        Ok(billing) => billing,
        Err(errors) => {
            tracing::debug!(errors = errors.len(), "Checkout rejected by billing validation");
            return Ok(rejected(&state, &data, errors).await);
        }
    };

    let mut order = NewOrder::new(billing, customer_note(&data));

    match state.hooks().create_order(&mut order, &data).await {
        Ok(()) => {}
        Err(e @ HookError::Validation { .. }) => {
            return Ok(rejected(&state, &data, vec![e.to_string()]).await);
        }
        Err(HookError::Store(e)) => return Err(AppError::Database(e.into())),
    }

    let order = state.orders().create(order).await?;

    let order_id = order.id.to_string();
    tracing::info!(order_id = %order.id, "Order created");
    add_breadcrumb("checkout", "Order created", Some(&[("order_id", &order_id)]));

    Ok(Redirect::to(&format!(
        "/checkout/order-received/{}?key={}",
        order.id, order.order_key
    ))
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> CheckoutData {
        pairs.iter().copied().collect()
    }

    fn valid() -> Vec<(&'static str, &'static str)> {
        vec![
            ("billing_first_name", " Jo "),
            ("billing_last_name", "Park"),
            ("billing_email", "jo@example.com"),
            ("billing_address_1", "5 Bay St"),
            ("billing_city", "Harbor"),
            ("billing_postcode", "10101"),
        ]
    }

    #[test]
    fn test_parse_billing_valid() {
        let billing = parse_billing(&data(&valid())).unwrap();
        assert_eq!(billing.first_name, "Jo");
        assert_eq!(billing.email.as_str(), "jo@example.com");
        assert_eq!(billing.phone, None);
    }

    #[test]
    fn test_parse_billing_reports_every_missing_field() {
        let errors = parse_billing(&CheckoutData::default()).unwrap_err();
        assert_eq!(errors.len(), REQUIRED_FIELDS.len());
        assert_eq!(
            errors.first().map(String::as_str),
            Some("Billing First name is a required field.")
        );
    }

    #[test]
    fn test_parse_billing_invalid_email() {
        let mut pairs = valid();
        pairs.retain(|(k, _)| *k != "billing_email");
        pairs.push(("billing_email", "not-an-email"));

        let errors = parse_billing(&data(&pairs)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(
            errors
                .first()
                .is_some_and(|e| e.starts_with("Billing Email address is not valid"))
        );
    }

    #[test]
    fn test_customer_note_blank_is_none() {
        assert_eq!(customer_note(&data(&[("order_comments", "  ")])), None);
        assert_eq!(
            customer_note(&data(&[("order_comments", "Leave at desk")])).as_deref(),
            Some("Leave at desk")
        );
    }
}
