//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Storefront (public)
//! GET  /health                              - Liveness check
//! GET  /health/ready                        - Readiness check (order store)
//! GET  /checkout                            - Checkout form
//! POST /checkout                            - Place order (303 to order-received)
//! GET  /checkout/order-received/{id}?key=K  - Order confirmation with billing details
//!
//! # Admin (private network only)
//! GET  /health                              - Liveness check
//! GET  /orders/{id}                         - Order details screen (bearer token)
//! ```
//!
//! The admin screen shows customer billing details. Bind it to a private
//! interface and set `ADMIN_TOKEN`; without a token the router only relies on
//! network isolation.

pub mod admin;
pub mod checkout;
pub mod orders;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};

use crate::middleware::{AdminToken, require_admin_token, with_request_tracing};
use crate::state::AppState;

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::submit))
        .route("/order-received/{id}", get(orders::received))
}

/// Create all routes for the public storefront.
pub fn storefront_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/checkout", checkout_routes())
        .with_state(state);

    with_request_tracing(router)
}

/// Create all routes for the admin surface.
///
/// When `token` is set, every route except `/health` requires
/// `Authorization: Bearer <token>`.
pub fn admin_router(state: AppState, token: AdminToken) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/orders/{id}", get(admin::show_order))
        .with_state(state)
        .layer(axum::middleware::from_fn_with_state(token, require_admin_token));

    with_request_tracing(router)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the order store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.orders().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use tower::ServiceExt;

    use super::*;
    use crate::config::PickupConfig;

    async fn body_string(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post_checkout(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/checkout")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    const VALID_BILLING: &str = "billing_first_name=Jo&billing_last_name=Park\
        &billing_email=jo%40example.com&billing_address_1=5+Bay+St\
        &billing_city=Harbor&billing_postcode=10101";

    #[tokio::test]
    async fn test_readiness_reports_store_state() {
        let (state, store) = AppState::in_memory(PickupConfig::default());
        let app = storefront_router(state);

        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        store.set_unavailable(true);
        let resp = app
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let (state, _store) = AppState::in_memory(PickupConfig::default());
        let resp = storefront_router(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.headers().get("x-request-id").unwrap(), "abc-123");
    }

    #[tokio::test]
    async fn test_checkout_page_renders_empty_pickup_select() {
        let (state, _store) = AppState::in_memory(PickupConfig::default());
        let resp = storefront_router(state)
            .oneshot(Request::builder().uri("/checkout").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_string(resp).await;
        assert!(body.contains(r#"<select name="billing_pickup_location""#));
        assert!(!body.contains("<option"));
    }

    #[tokio::test]
    async fn test_checkout_page_survives_store_outage() {
        let (state, store) = AppState::in_memory(PickupConfig {
            seeds: vec!["Depot".to_string()],
            ..PickupConfig::default()
        });
        store.set_unavailable(true);

        let resp = storefront_router(state)
            .oneshot(Request::builder().uri("/checkout").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_string(resp).await;
        assert!(body.contains(r#"<option value="Depot">Depot</option>"#));
    }

    #[tokio::test]
    async fn test_invalid_checkout_keeps_pickup_selection() {
        let (state, store) = AppState::in_memory(PickupConfig {
            seeds: vec!["North".to_string(), "South".to_string()],
            ..PickupConfig::default()
        });

        let resp = storefront_router(state)
            .oneshot(post_checkout(
                "billing_first_name=&billing_email=nope&billing_pickup_location=South",
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_string(resp).await;
        assert!(body.contains("First name is a required field."));
        assert!(body.contains(r#"<option value="South" selected="selected">South</option>"#));
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_checkout_creates_order_and_redirects() {
        let (state, store) = AppState::in_memory(PickupConfig::default());

        let resp = storefront_router(state)
            .oneshot(post_checkout(&format!(
                "{VALID_BILLING}&billing_pickup_location=Downtown"
            )))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        assert!(location.starts_with("/checkout/order-received/1?key="));
        assert_eq!(store.order_count(), 1);
    }

    #[tokio::test]
    async fn test_strict_checkout_rejects_unknown_location() {
        let (state, store) = AppState::in_memory(PickupConfig {
            policy: crate::config::WritePolicy::Strict,
            seeds: vec!["North".to_string()],
            ..PickupConfig::default()
        });

        let resp = storefront_router(state)
            .oneshot(post_checkout(&format!(
                "{VALID_BILLING}&billing_pickup_location=Elsewhere"
            )))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_string(resp).await;
        assert!(body.contains("Please choose one of the listed pickup locations."));
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn test_admin_unknown_order_is_not_found() {
        let (state, _store) = AppState::in_memory(PickupConfig::default());
        let resp = admin_router(state, None)
            .oneshot(Request::builder().uri("/orders/77").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_requires_configured_token() {
        let (state, _store) = AppState::in_memory(PickupConfig::default());
        let token = Some(std::sync::Arc::new(secrecy::SecretString::from("s3cret")));
        let app = admin_router(state, token);

        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/orders/77").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/orders/77")
                    .header(header::AUTHORIZATION, "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/orders/77")
                    .header(header::AUTHORIZATION, "Bearer s3cret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
