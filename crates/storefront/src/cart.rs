//! Cart state holder.
//!
//! The cart owns its items and notifies listeners whenever its emptiness flag
//! flips. Listeners run synchronously on the thread that performed the
//! mutation, after the cart lock is released.

use std::sync::{Arc, Mutex, MutexGuard};

use quickcart_core::{ProductId, VariationId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when mutating the cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("cart item not found: {0}")]
    ItemNotFound(String),
    #[error("cart lock poisoned")]
    LockPoisoned,
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Line id. Lines for the same product and variation share an id.
    pub id: String,
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<VariationId>,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartItem {
    /// Price of the whole line.
    #[must_use]
    pub fn item_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Read-only view of the cart at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub total: Decimal,
    pub is_empty: bool,
}

impl CartSnapshot {
    /// Build a snapshot, deriving the total and emptiness flag from the items.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let total = items.iter().map(CartItem::item_total).sum();
        let is_empty = items.is_empty();
        Self {
            items,
            total,
            is_empty,
        }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Receives emptiness transitions from a [`CartStore`].
pub trait EmptinessListener: Send + Sync {
    /// Called with the snapshot taken right after the flag flipped.
    fn on_emptiness_changed(&self, snapshot: &CartSnapshot);
}

impl<F> EmptinessListener for F
where
    F: Fn(&CartSnapshot) + Send + Sync,
{
    fn on_emptiness_changed(&self, snapshot: &CartSnapshot) {
        self(snapshot);
    }
}

/// Handle returned by [`CartStore::subscribe_emptiness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Shared cart. Cheaply cloneable via `Arc`.
#[derive(Clone, Default)]
pub struct CartStore {
    inner: Arc<Mutex<CartInner>>,
}

#[derive(Default)]
struct CartInner {
    items: Vec<CartItem>,
    listeners: Vec<(ListenerId, Arc<dyn EmptinessListener>)>,
    next_listener: u64,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LockPoisoned` if a previous mutation panicked.
    pub fn snapshot(&self) -> Result<CartSnapshot, CartError> {
        Ok(CartSnapshot::from_items(self.lock()?.items.clone()))
    }

    /// Register a listener for emptiness transitions.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LockPoisoned` if a previous mutation panicked.
    pub fn subscribe_emptiness(
        &self,
        listener: Arc<dyn EmptinessListener>,
    ) -> Result<ListenerId, CartError> {
        let mut inner = self.lock()?;
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, listener));
        Ok(id)
    }

    /// Remove a listener. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LockPoisoned` if a previous mutation panicked.
    pub fn unsubscribe(&self, id: ListenerId) -> Result<(), CartError> {
        self.lock()?.listeners.retain(|(listener_id, _)| *listener_id != id);
        Ok(())
    }

    /// Add an item, merging its quantity into an existing line with the same id.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ZeroQuantity` for an empty line.
    pub fn add_item(&self, item: CartItem) -> Result<(), CartError> {
        if item.quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        self.mutate(|items| {
            if let Some(existing) = items.iter_mut().find(|line| line.id == item.id) {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            } else {
                items.push(item);
            }
            Ok(())
        })
    }

    /// Set the quantity of a line. A quantity of zero removes it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if no line has this id.
    pub fn update_quantity(&self, id: &str, quantity: u32) -> Result<(), CartError> {
        self.mutate(|items| {
            let position = items
                .iter()
                .position(|line| line.id == id)
                .ok_or_else(|| CartError::ItemNotFound(id.to_string()))?;
            if quantity == 0 {
                items.remove(position);
            } else if let Some(line) = items.get_mut(position) {
                line.quantity = quantity;
            }
            Ok(())
        })
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if no line has this id.
    pub fn remove_item(&self, id: &str) -> Result<(), CartError> {
        self.update_quantity(id, 0)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LockPoisoned` if a previous mutation panicked.
    pub fn reset(&self) -> Result<(), CartError> {
        self.mutate(|items| {
            items.clear();
            Ok(())
        })
    }

    /// Apply a mutation and notify listeners if the emptiness flag flipped.
    fn mutate(
        &self,
        f: impl FnOnce(&mut Vec<CartItem>) -> Result<(), CartError>,
    ) -> Result<(), CartError> {
        let (snapshot, listeners) = {
            let mut inner = self.lock()?;
            let was_empty = inner.items.is_empty();
            f(&mut inner.items)?;
            if inner.items.is_empty() == was_empty {
                return Ok(());
            }
            let listeners: Vec<_> = inner
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            (CartSnapshot::from_items(inner.items.clone()), listeners)
        };

        tracing::debug!(
            is_empty = snapshot.is_empty,
            listeners = listeners.len(),
            "Cart emptiness changed"
        );
        for listener in listeners {
            listener.on_emptiness_changed(&snapshot);
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, CartInner>, CartError> {
        self.inner.lock().map_err(|_| CartError::LockPoisoned)
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items = self.inner.lock().map(|inner| inner.items.len()).ok();
        f.debug_struct("CartStore").field("items", &items).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn item(id: &str, price: i64, quantity: u32) -> CartItem {
        CartItem {
            id: id.to_string(),
            product_id: ProductId::new(id.parse().unwrap_or(1)),
            variation_id: None,
            name: format!("Item {id}"),
            unit_price: Decimal::from(price),
            quantity,
        }
    }

    fn counting_listener(cart: &CartStore) -> Arc<AtomicUsize> {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        cart.subscribe_emptiness(Arc::new(move |_: &CartSnapshot| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
        calls
    }

    #[test]
    fn test_snapshot_totals() {
        let cart = CartStore::new();
        cart.add_item(item("1", 100, 1)).unwrap();
        cart.add_item(item("2", 200, 2)).unwrap();

        let snapshot = cart.snapshot().unwrap();
        assert_eq!(snapshot.total, Decimal::from(500));
        assert_eq!(snapshot.total_quantity(), 3);
        assert!(!snapshot.is_empty);
    }

    #[test]
    fn test_add_merges_same_line() {
        let cart = CartStore::new();
        cart.add_item(item("1", 100, 1)).unwrap();
        cart.add_item(item("1", 100, 2)).unwrap();

        let snapshot = cart.snapshot().unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].quantity, 3);
    }

    #[test]
    fn test_add_rejects_zero_quantity() {
        let cart = CartStore::new();
        assert_eq!(cart.add_item(item("1", 100, 0)), Err(CartError::ZeroQuantity));
    }

    #[test]
    fn test_update_missing_item() {
        let cart = CartStore::new();
        assert_eq!(
            cart.update_quantity("9", 2),
            Err(CartError::ItemNotFound("9".to_string()))
        );
    }

    #[test]
    fn test_listener_fires_only_on_transitions() {
        let cart = CartStore::new();
        let calls = counting_listener(&cart);

        cart.add_item(item("1", 100, 1)).unwrap(); // empty -> non-empty
        cart.add_item(item("2", 100, 1)).unwrap(); // stays non-empty
        cart.update_quantity("1", 5).unwrap(); // stays non-empty
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cart.remove_item("1").unwrap(); // stays non-empty
        cart.remove_item("2").unwrap(); // non-empty -> empty
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cart.reset().unwrap(); // already empty
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_sees_post_mutation_snapshot() {
        let cart = CartStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        cart.subscribe_emptiness(Arc::new(move |snapshot: &CartSnapshot| {
            sink.lock().unwrap().push(snapshot.is_empty);
        }))
        .unwrap();

        cart.add_item(item("1", 100, 1)).unwrap();
        cart.reset().unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![false, true]);
    }

    #[test]
    fn test_listener_may_read_cart() {
        let cart = CartStore::new();
        let reader = cart.clone();
        let totals = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&totals);
        cart.subscribe_emptiness(Arc::new(move |_: &CartSnapshot| {
            sink.lock().unwrap().push(reader.snapshot().unwrap().total);
        }))
        .unwrap();

        cart.add_item(item("1", 250, 2)).unwrap();
        assert_eq!(*totals.lock().unwrap(), vec![Decimal::from(500)]);
    }

    #[test]
    fn test_unsubscribe() {
        let cart = CartStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let id = cart
            .subscribe_emptiness(Arc::new(move |_: &CartSnapshot| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        cart.unsubscribe(id).unwrap();
        cart.add_item(item("1", 100, 1)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
