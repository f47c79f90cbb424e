//! Quickcart Storefront library.
//!
//! Cart state, checkout state and the checkout verification workflow, as a
//! library so it can be embedded and tested.
//!
//! # Modules
//!
//! - [`cart`] - Cart store with emptiness notifications
//! - [`state`] - Address and verification slots shared across components
//! - [`trigger`] - Verifies the checkout whenever the cart becomes non-empty
//! - [`api`] - Shop REST API client
//! - [`summary`] - Order summary built from the cart and verification result
//! - [`i18n`] - Message catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod i18n;
pub mod state;
pub mod summary;
pub mod trigger;

pub use trigger::{TriggerStatus, VerificationTrigger};
