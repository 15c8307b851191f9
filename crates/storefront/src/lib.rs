//! Pickup-location storefront library.
//!
//! This crate provides the checkout, order-received and admin order screens
//! as a library, allowing them to be tested and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
