//! Quickcart Core - Shared checkout types.
//!
//! This crate provides the types shared by every Quickcart component:
//! - `storefront` - Cart, checkout state and the verification workflow
//! - `cli` - Command-line tools for running verifications by hand
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, addresses, statuses and payment gateways

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
