//! Integration tests for the pickup-location storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no services needed)
//! cargo test -p pickup-integration-tests
//!
//! # Including the PostgreSQL-backed tests
//! STOREFRONT_DATABASE_URL=postgres://... cargo test -p pickup-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `pickup_location_flow` - checkout through order-received and the admin screen
//! - `postgres_order_meta` - repository behavior against a migrated database

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use tower::ServiceExt;

use pickup_storefront::config::PickupConfig;
use pickup_storefront::db::InMemoryOrderStore;
use pickup_storefront::routes::{admin_router, storefront_router};
use pickup_storefront::state::AppState;

/// A response reduced to what the tests assert on.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing.
    #[must_use]
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .expect("response has no Location header")
    }
}

/// Both routers over one in-memory store.
pub struct TestContext {
    pub storefront: Router,
    pub admin: Router,
    pub store: Arc<InMemoryOrderStore>,
}

impl TestContext {
    /// Build a context with the given pickup-location settings.
    #[must_use]
    pub fn new(pickup: PickupConfig) -> Self {
        let (state, store) = AppState::in_memory(pickup);
        Self {
            storefront: storefront_router(state.clone()),
            admin: admin_router(state, None),
            store,
        }
    }

    /// GET a storefront path.
    pub async fn get(&self, uri: &str) -> TestResponse {
        send(&self.storefront, get_request(uri)).await
    }

    /// GET an admin path.
    pub async fn admin_get(&self, uri: &str) -> TestResponse {
        send(&self.admin, get_request(uri)).await
    }

    /// POST the checkout form with the given fields.
    pub async fn checkout(&self, fields: &[(&str, &str)]) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/checkout")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form_encode(fields)))
            .expect("valid request");
        send(&self.storefront, request).await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new(PickupConfig::default())
    }
}

/// Billing fields that pass checkout validation.
pub const VALID_BILLING: &[(&str, &str)] = &[
    ("billing_first_name", "Jo"),
    ("billing_last_name", "Park"),
    ("billing_email", "jo@example.com"),
    ("billing_address_1", "5 Bay St"),
    ("billing_city", "Harbor"),
    ("billing_postcode", "10101"),
];

/// Valid billing fields plus a pickup location.
#[must_use]
pub fn checkout_fields(location: &str) -> Vec<(&str, &str)> {
    let mut fields = VALID_BILLING.to_vec();
    fields.push(("billing_pickup_location", location));
    fields
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");

    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

/// Encode fields as an `application/x-www-form-urlencoded` body.
fn form_encode(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
