//! Core types for Pickup Point.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod meta;
pub mod order;

pub use email::{Email, EmailError};
pub use id::*;
pub use meta::{BILLING_PICKUP_LOCATION, MetaKey};
pub use order::{BillingDetails, NewOrder, Order};
