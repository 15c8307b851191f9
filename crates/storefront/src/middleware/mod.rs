//! HTTP middleware stack shared by the storefront and admin routers.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`)
//! 2. `TraceLayer` (one span per request)
//! 3. Request ID (recorded on the span and echoed in the response)
//! 4. Admin token (admin router only)

pub mod admin_auth;
pub mod request_id;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use admin_auth::{AdminToken, require_admin_token};
pub use request_id::{REQUEST_ID_HEADER, make_request_span, request_id_middleware};

/// Wrap a router with request tracing and request IDs.
pub fn with_request_tracing(router: Router) -> Router {
    router
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
}
