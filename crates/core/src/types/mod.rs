//! Core types for Quickcart.
//!
//! This module provides type-safe wrappers for common checkout concepts.

pub mod address;
pub mod gateway;
pub mod id;
pub mod price;
pub mod status;

pub use address::{Address, AddressFields, AddressType};
pub use gateway::{
    GatewayEntry, GatewaySettings, PaymentGateway, is_gateway_available, is_stripe_available,
};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use status::*;
