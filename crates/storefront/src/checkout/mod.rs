//! Checkout extensions.
//!
//! The host (routes) drives four lifecycle events; extensions implement
//! [`CheckoutHook`] and are registered on [`CheckoutHooks`] at start-up:
//!
//! ```text
//! render_checkout_fields  GET/POST /checkout, before the order notes
//! create_order            POST /checkout, before the order is persisted
//! render_admin_order      admin GET /orders/{id}, after the billing address
//! render_billing_fields   GET /checkout/order-received/{id}, billing section
//! ```

pub mod hooks;
pub mod pickup_location;

pub use hooks::{CheckoutContext, CheckoutData, CheckoutHook, CheckoutHooks, HookError};
pub use pickup_location::PickupLocationField;
