//! Checkout state shared between the address picker, the verification
//! workflow and the order summary.
//!
//! Every slot is a `watch` channel: readers take a snapshot or subscribe to
//! changes, and all writes go through [`CheckoutState::dispatch`].

use std::sync::Arc;

use quickcart_core::Address;
use tokio::sync::watch;

use crate::api::VerifiedResponse;

/// An update to the checkout state.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutAction {
    SetBillingAddress(Option<Address>),
    SetShippingAddress(Option<Address>),
    ClearAddresses,
    /// Replaces any previous verification result.
    SetVerifiedResponse(VerifiedResponse),
    ClearVerifiedResponse,
}

/// Checkout state shared across components.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct CheckoutState {
    inner: Arc<CheckoutStateInner>,
}

struct CheckoutStateInner {
    billing_address: watch::Sender<Option<Address>>,
    shipping_address: watch::Sender<Option<Address>>,
    verified_response: watch::Sender<Option<VerifiedResponse>>,
}

impl Default for CheckoutState {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutState {
    /// Create an empty checkout state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CheckoutStateInner {
                billing_address: watch::channel(None).0,
                shipping_address: watch::channel(None).0,
                verified_response: watch::channel(None).0,
            }),
        }
    }

    /// Apply an update.
    pub fn dispatch(&self, action: CheckoutAction) {
        tracing::debug!(action = action_name(&action), "Checkout state update");

        match action {
            CheckoutAction::SetBillingAddress(address) => {
                self.inner.billing_address.send_replace(address);
            }
            CheckoutAction::SetShippingAddress(address) => {
                self.inner.shipping_address.send_replace(address);
            }
            CheckoutAction::ClearAddresses => {
                self.inner.billing_address.send_replace(None);
                self.inner.shipping_address.send_replace(None);
            }
            CheckoutAction::SetVerifiedResponse(response) => {
                self.inner.verified_response.send_replace(Some(response));
            }
            CheckoutAction::ClearVerifiedResponse => {
                self.inner.verified_response.send_replace(None);
            }
        }
    }

    /// Current billing address.
    #[must_use]
    pub fn billing_address(&self) -> Option<Address> {
        self.inner.billing_address.borrow().clone()
    }

    /// Current shipping address.
    #[must_use]
    pub fn shipping_address(&self) -> Option<Address> {
        self.inner.shipping_address.borrow().clone()
    }

    /// Latest successful verification result.
    #[must_use]
    pub fn verified_response(&self) -> Option<VerifiedResponse> {
        self.inner.verified_response.borrow().clone()
    }

    /// Subscribe to verification results.
    #[must_use]
    pub fn watch_verified_response(&self) -> watch::Receiver<Option<VerifiedResponse>> {
        self.inner.verified_response.subscribe()
    }

    /// Subscribe to billing address changes.
    #[must_use]
    pub fn watch_billing_address(&self) -> watch::Receiver<Option<Address>> {
        self.inner.billing_address.subscribe()
    }

    /// Subscribe to shipping address changes.
    #[must_use]
    pub fn watch_shipping_address(&self) -> watch::Receiver<Option<Address>> {
        self.inner.shipping_address.subscribe()
    }
}

impl std::fmt::Debug for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutState")
            .field("billing_address", &self.billing_address().is_some())
            .field("shipping_address", &self.shipping_address().is_some())
            .field("verified_response", &self.verified_response().is_some())
            .finish()
    }
}

const fn action_name(action: &CheckoutAction) -> &'static str {
    match action {
        CheckoutAction::SetBillingAddress(_) => "set_billing_address",
        CheckoutAction::SetShippingAddress(_) => "set_shipping_address",
        CheckoutAction::ClearAddresses => "clear_addresses",
        CheckoutAction::SetVerifiedResponse(_) => "set_verified_response",
        CheckoutAction::ClearVerifiedResponse => "clear_verified_response",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quickcart_core::{AddressFields, AddressType};
    use serde_json::json;

    use super::*;

    fn address(address_type: AddressType) -> Address {
        Address::new(
            address_type,
            AddressFields {
                city: Some("Lisbon".to_string()),
                ..AddressFields::default()
            },
        )
    }

    #[test]
    fn test_addresses_start_empty() {
        let state = CheckoutState::new();
        assert!(state.billing_address().is_none());
        assert!(state.shipping_address().is_none());
        assert!(state.verified_response().is_none());
    }

    #[test]
    fn test_dispatch_sets_and_clears_addresses() {
        let state = CheckoutState::new();
        state.dispatch(CheckoutAction::SetBillingAddress(Some(address(
            AddressType::Billing,
        ))));
        state.dispatch(CheckoutAction::SetShippingAddress(Some(address(
            AddressType::Shipping,
        ))));
        assert_eq!(
            state.billing_address().unwrap().address_type,
            AddressType::Billing
        );
        assert!(state.shipping_address().is_some());

        state.dispatch(CheckoutAction::ClearAddresses);
        assert!(state.billing_address().is_none());
        assert!(state.shipping_address().is_none());
    }

    #[test]
    fn test_verified_response_replaces_previous() {
        let state = CheckoutState::new();
        state.dispatch(CheckoutAction::SetVerifiedResponse(VerifiedResponse::new(
            json!({ "total_tax": 1 }),
        )));
        state.dispatch(CheckoutAction::SetVerifiedResponse(VerifiedResponse::new(
            json!({ "total_tax": 2 }),
        )));
        assert_eq!(
            state.verified_response().unwrap().payload(),
            &json!({ "total_tax": 2 })
        );
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let state = CheckoutState::new();
        let mut rx = state.watch_verified_response();

        let writer = state.clone();
        writer.dispatch(CheckoutAction::SetVerifiedResponse(VerifiedResponse::new(
            json!({ "ok": true }),
        )));

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_some());

        writer.dispatch(CheckoutAction::ClearVerifiedResponse);
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }
}
