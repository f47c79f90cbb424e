//! Checkout verification trigger.
//!
//! Once mounted, the trigger verifies the checkout with the shop API every
//! time the cart goes from empty to non-empty, and once at mount if the cart
//! already has items.
//!
//! # Flow
//!
//! 1. The cart store notifies the trigger of an emptiness change
//! 2. An empty cart is ignored
//! 3. Without both addresses the activation ends in `AddressMissing` and no
//!    request is sent
//! 4. Otherwise the status moves to `Checking` and the request runs as a task
//! 5. Success stores the payload in [`CheckoutState`]; failure records the
//!    API's message key and leaves the previous payload in place
//!
//! Activations are not deduplicated. If a second activation starts before the
//! first resolves, both requests complete and whichever resolves last writes
//! the final status and verified response.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use quickcart_core::VerificationPhase;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{CheckoutApi, CheckoutVerificationInput, VerifiedResponse};
use crate::cart::{CartError, CartSnapshot, CartStore, EmptinessListener, ListenerId};
use crate::error::{VerificationError, add_breadcrumb, report_verification_failure};
use crate::state::{CheckoutAction, CheckoutState};

/// Errors that can occur when setting up a trigger.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("verification trigger must be created inside a tokio runtime")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
    #[error("cart error: {0}")]
    Cart(#[from] CartError),
}

/// What the trigger shows to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TriggerStatus {
    pub phase: VerificationPhase,
    /// True while at least one request is in flight.
    pub loading: bool,
    /// Message key to display, if any.
    pub error: Option<String>,
    /// Number of the activation that last wrote this status (0 before the first).
    pub activation: u64,
}

/// Runs checkout verification in response to cart emptiness changes.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct VerificationTrigger {
    inner: Arc<TriggerInner>,
}

struct TriggerInner {
    api: Arc<dyn CheckoutApi>,
    cart: CartStore,
    state: CheckoutState,
    runtime: Handle,
    status: watch::Sender<TriggerStatus>,
    activations: AtomicU64,
    in_flight: AtomicUsize,
    listener: Mutex<Option<ListenerId>>,
}

/// Cart listener holding only a weak reference, so the cart does not keep an
/// unmounted trigger alive.
struct CartListener(Weak<TriggerInner>);

impl EmptinessListener for CartListener {
    fn on_emptiness_changed(&self, snapshot: &CartSnapshot) {
        if let Some(inner) = self.0.upgrade() {
            inner.activate(snapshot);
        }
    }
}

impl VerificationTrigger {
    /// Create a trigger on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `TriggerError::NoRuntime` when called outside a runtime.
    pub fn new(
        api: Arc<dyn CheckoutApi>,
        cart: CartStore,
        state: CheckoutState,
    ) -> Result<Self, TriggerError> {
        Ok(Self::with_runtime(api, cart, state, Handle::try_current()?))
    }

    /// Create a trigger that spawns requests on `runtime`.
    #[must_use]
    pub fn with_runtime(
        api: Arc<dyn CheckoutApi>,
        cart: CartStore,
        state: CheckoutState,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(TriggerInner {
                api,
                cart,
                state,
                runtime,
                status: watch::channel(TriggerStatus::default()).0,
                activations: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
                listener: Mutex::new(None),
            }),
        }
    }

    /// Start listening to the cart and run the mount-time activation.
    ///
    /// Returns the request task if the mount-time activation sent one.
    /// Mounting twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `TriggerError::Cart` if the cart lock is poisoned.
    pub fn mount(&self) -> Result<Option<JoinHandle<()>>, TriggerError> {
        {
            let mut listener = self
                .inner
                .listener
                .lock()
                .map_err(|_| CartError::LockPoisoned)?;
            if listener.is_some() {
                return Ok(None);
            }
            let id = self
                .inner
                .cart
                .subscribe_emptiness(Arc::new(CartListener(Arc::downgrade(&self.inner))))?;
            *listener = Some(id);
        }

        tracing::debug!("Verification trigger mounted");
        let snapshot = self.inner.cart.snapshot()?;
        Ok(self.inner.activate(&snapshot))
    }

    /// Stop listening to the cart. Requests already in flight still complete.
    ///
    /// # Errors
    ///
    /// Returns `TriggerError::Cart` if the cart lock is poisoned.
    pub fn unmount(&self) -> Result<(), TriggerError> {
        let id = self
            .inner
            .listener
            .lock()
            .map_err(|_| CartError::LockPoisoned)?
            .take();
        if let Some(id) = id {
            self.inner.cart.unsubscribe(id)?;
            tracing::debug!("Verification trigger unmounted");
        }
        Ok(())
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> TriggerStatus {
        self.inner.status.borrow().clone()
    }

    /// Subscribe to status changes.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<TriggerStatus> {
        self.inner.status.subscribe()
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.status.borrow().loading
    }

    /// Message key to display, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.inner.status.borrow().error.clone()
    }

    /// Wait until no request is in flight and return the status at that point.
    pub async fn settled(&self) -> TriggerStatus {
        let mut rx = self.inner.status.subscribe();
        // The sender lives in `inner`, which `self` keeps alive.
        match rx.wait_for(|status| !status.loading).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        }
    }
}

impl std::fmt::Debug for VerificationTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationTrigger")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl TriggerInner {
    /// Run one activation against `snapshot`.
    fn activate(self: &Arc<Self>, snapshot: &CartSnapshot) -> Option<JoinHandle<()>> {
        if snapshot.is_empty {
            return None;
        }

        let activation = self.activations.fetch_add(1, Ordering::SeqCst) + 1;

        let (Some(billing), Some(shipping)) =
            (self.state.billing_address(), self.state.shipping_address())
        else {
            let err = VerificationError::MissingAddress;
            report_verification_failure(&err, activation);
            self.publish(|in_flight| TriggerStatus {
                phase: VerificationPhase::AddressMissing,
                loading: in_flight.load(Ordering::SeqCst) > 0,
                error: err.message_key(),
                activation,
            });
            return None;
        };

        let input = CheckoutVerificationInput::from_checkout(snapshot, &billing, &shipping);

        self.publish(|in_flight| {
            in_flight.fetch_add(1, Ordering::SeqCst);
            TriggerStatus {
                phase: VerificationPhase::Checking,
                loading: true,
                error: None,
                activation,
            }
        });

        let items = snapshot.items.len().to_string();
        add_breadcrumb(
            "checkout",
            "Checkout verification started",
            Some(&[("items", items.as_str())]),
        );
        tracing::info!(
            activation,
            items = snapshot.items.len(),
            amount = %snapshot.total,
            "Verifying checkout"
        );

        let inner = Arc::clone(self);
        Some(self.runtime.spawn(async move {
            let result = inner
                .api
                .verify_checkout(input)
                .await
                .map_err(VerificationError::from);
            inner.finish(activation, result);
        }))
    }

    /// Record the outcome of a request. Last writer wins.
    fn finish(&self, activation: u64, result: Result<VerifiedResponse, VerificationError>) {
        let (phase, error) = match result {
            Ok(response) => {
                tracing::info!(activation, "Checkout verified");
                self.state
                    .dispatch(CheckoutAction::SetVerifiedResponse(response));
                (VerificationPhase::Success, None)
            }
            Err(err) => {
                report_verification_failure(&err, activation);
                (VerificationPhase::Failed, err.message_key())
            }
        };

        self.publish(|in_flight| {
            let remaining = in_flight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
            TriggerStatus {
                phase,
                loading: remaining > 0,
                error,
                activation,
            }
        });
    }

    /// Replace the status. The in-flight count only changes inside `next`,
    /// under the status lock.
    fn publish(&self, next: impl FnOnce(&AtomicUsize) -> TriggerStatus) {
        self.status.send_modify(|status| *status = next(&self.in_flight));
    }
}
