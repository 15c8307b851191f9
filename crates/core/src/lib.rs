//! Pickup Point Core - Shared types library.
//!
//! This crate provides the types and store interfaces used by every
//! Pickup Point component:
//! - `storefront` - Checkout, order-received and admin order views
//! - `cli` - Migrations and pickup-location maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. Store implementations live with the binaries that own the
//! connection pools.
//!
//! # Modules
//!
//! - [`types`] - Order IDs, billing details, emails and metadata keys
//! - [`metadata`] - The order metadata store interface
//! - [`html`] - Attribute escaping for values stored on orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod html;
pub mod metadata;
pub mod types;

pub use metadata::{MetadataError, OrderMetadataRepository};
pub use types::*;
