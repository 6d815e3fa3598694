//! Cart store.
//!
//! [`CartStore`] wraps the pure [`CartState`] reducer with persistence: each
//! operation builds a [`CartAction`], reduces it, and when the state changed
//! writes the whole state to local storage under [`keys::CART`] before
//! returning. Reads therefore always observe persisted state.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut cart = CartStore::load(storage, notifier)?;
//! cart.add_item(product, 2)?;
//! cart.decrement(product_id)?; // quantity 1 -> line removed
//! ```

mod state;
mod summary;

pub use state::{CartAction, CartLine, CartState};
pub use summary::{CartSummary, TAX_RATE};

use rust_decimal::Decimal;
use tracing::{debug, warn};

use vitrine_core::{CurrencyCode, Product, ProductId};

use crate::error::add_breadcrumb;
use crate::notify::{Notice, SharedNotifier};
use crate::storage::{LocalStorage, StorageError, keys};

/// Persisted, reducer-backed cart.
pub struct CartStore<S> {
    state: CartState,
    storage: S,
    notifier: SharedNotifier,
}

impl<S: LocalStorage> CartStore<S> {
    /// Hydrate the cart from storage.
    ///
    /// A stored payload that does not parse is discarded and the cart starts
    /// empty. Either way the resulting state is written back, so a corrupt
    /// payload does not survive the first load.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or written.
    pub fn load(storage: S, notifier: SharedNotifier) -> Result<Self, StorageError> {
        let loaded = match storage.get_item(keys::CART)? {
            None => CartState::new(),
            Some(raw) => serde_json::from_str::<CartState>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding malformed cart from storage");
                CartState::new()
            }),
        };

        let store = Self {
            state: CartState::new().reduce(CartAction::Load(loaded)),
            storage,
            notifier,
        };
        store.save(&store.state)?;

        debug!(
            lines = store.state.lines().len(),
            total_items = store.state.total_items(),
            "Cart hydrated"
        );
        Ok(store)
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.state.lines()
    }

    /// The line for `id`, if any.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.state.line(id)
    }

    #[must_use]
    pub const fn total_items(&self) -> u32 {
        self.state.total_items()
    }

    #[must_use]
    pub const fn total_price(&self) -> Decimal {
        self.state.total_price()
    }

    /// Order summary in `currency`.
    #[must_use]
    pub fn summary(&self, currency: CurrencyCode) -> CartSummary {
        CartSummary::new(&self.state, currency)
    }

    /// Add `quantity` units of `product`.
    ///
    /// Returns `false` (and changes nothing) when `quantity` is zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the new state cannot be persisted.
    pub fn add_item(&mut self, product: Product, quantity: u32) -> Result<bool, StorageError> {
        if quantity == 0 {
            warn!(product_id = %product.id, "Ignoring add of zero units");
            return Ok(false);
        }

        let title = product.title.clone();
        let id = product.id.to_string();
        let changed = self.dispatch(CartAction::AddItem { product, quantity })?;
        if changed {
            add_breadcrumb("cart", "Added item", Some(&[("product_id", id.as_str())]));
            self.notifier
                .notify(Notice::success(format!("{title} added to cart")));
        }
        Ok(changed)
    }

    /// Remove the line for `id`. Missing lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the new state cannot be persisted.
    pub fn remove_item(&mut self, id: ProductId) -> Result<bool, StorageError> {
        let changed = self.dispatch(CartAction::RemoveItem(id))?;
        if changed {
            add_breadcrumb(
                "cart",
                "Removed item",
                Some(&[("product_id", id.to_string().as_str())]),
            );
            self.notifier.notify(Notice::success("Item removed from cart"));
        }
        Ok(changed)
    }

    /// Set the quantity of the line for `id`; zero removes the line.
    /// Missing lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the new state cannot be persisted.
    pub fn update_quantity(&mut self, id: ProductId, quantity: u32) -> Result<bool, StorageError> {
        if quantity == 0 {
            return self.remove_item(id);
        }
        self.dispatch(CartAction::UpdateQuantity { id, quantity })
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// Returns an error if the new state cannot be persisted.
    pub fn increment(&mut self, id: ProductId) -> Result<bool, StorageError> {
        let Some(quantity) = self.line(id).map(|line| line.quantity) else {
            return Ok(false);
        };
        match quantity.checked_add(1) {
            Some(next) => self.update_quantity(id, next),
            None => Ok(false),
        }
    }

    /// Take one unit off an existing line, removing it when it reaches zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the new state cannot be persisted.
    pub fn decrement(&mut self, id: ProductId) -> Result<bool, StorageError> {
        match self.line(id).map(|line| line.quantity) {
            None => Ok(false),
            Some(quantity) if quantity <= 1 => self.remove_item(id),
            Some(quantity) => self.update_quantity(id, quantity - 1),
        }
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the new state cannot be persisted.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.dispatch(CartAction::Clear)?;
        add_breadcrumb("cart", "Cleared cart", None);
        self.notifier.notify(Notice::success("Cart cleared"));
        Ok(())
    }

    /// Reduce `action`; persist and report `true` if the state changed.
    ///
    /// The new state is adopted only once it is stored, so a failed write
    /// leaves the store on the last persisted state.
    fn dispatch(&mut self, action: CartAction) -> Result<bool, StorageError> {
        let next = self.state.clone().reduce(action);
        if next == self.state {
            return Ok(false);
        }
        self.save(&next)?;
        self.state = next;
        Ok(true)
    }

    fn save(&self, state: &CartState) -> Result<(), StorageError> {
        let raw = serde_json::to_string(state)?;
        self.storage.set_item(keys::CART, &raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::notify::NoticeLog;
    use crate::storage::MemoryStorage;
    use crate::test_support::{FlakyStorage, product};

    fn store() -> (CartStore<MemoryStorage>, MemoryStorage, NoticeLog) {
        let storage = MemoryStorage::new();
        let log = NoticeLog::new();
        let cart = CartStore::load(storage.clone(), Arc::new(log.clone())).unwrap();
        (cart, storage, log)
    }

    fn stored_state(storage: &MemoryStorage) -> CartState {
        serde_json::from_str(&storage.get_item(keys::CART).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn test_empty_storage_hydrates_empty_cart() {
        let (cart, storage, _) = store();
        assert!(cart.lines().is_empty());
        assert_eq!(stored_state(&storage), CartState::new());
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let (mut cart, storage, _) = store();

        cart.add_item(product(1, 1000), 2).unwrap();
        assert_eq!(&stored_state(&storage), cart.state());

        cart.update_quantity(ProductId::new(1), 5).unwrap();
        assert_eq!(stored_state(&storage).total_items(), 5);

        cart.remove_item(ProductId::new(1)).unwrap();
        assert!(stored_state(&storage).is_empty());
    }

    #[test]
    fn test_failed_write_keeps_last_saved_state() {
        let storage = FlakyStorage::default();
        let log = NoticeLog::new();
        let mut cart = CartStore::load(storage.clone(), Arc::new(log.clone())).unwrap();
        cart.add_item(product(1, 1000), 2).unwrap();
        let saved = cart.state().clone();

        storage.fail_writes(true);
        assert!(cart.add_item(product(2, 500), 1).is_err());
        assert!(cart.update_quantity(ProductId::new(1), 7).is_err());
        assert!(cart.clear().is_err());

        assert_eq!(cart.state(), &saved);
        assert_eq!(log.messages(), vec!["Product 1 added to cart"]);

        storage.fail_writes(false);
        let reloaded = CartStore::load(storage, Arc::new(NoticeLog::new())).unwrap();
        assert_eq!(reloaded.state(), &saved);
    }

    #[test]
    fn test_state_survives_reload() {
        let (mut cart, storage, _) = store();
        cart.add_item(product(1, 1999), 3).unwrap();
        cart.add_item(product(2, 500), 1).unwrap();

        let reloaded = CartStore::load(storage, Arc::new(NoticeLog::new())).unwrap();
        assert_eq!(reloaded.state(), cart.state());
        assert_eq!(reloaded.total_price(), Decimal::new(6497, 2));
    }

    #[test]
    fn test_malformed_payload_is_replaced_with_empty_cart() {
        let storage = MemoryStorage::new();
        storage.set_item(keys::CART, "{not json").unwrap();

        let cart = CartStore::load(storage.clone(), Arc::new(NoticeLog::new())).unwrap();
        assert!(cart.lines().is_empty());
        assert_eq!(stored_state(&storage), CartState::new());
    }

    #[test]
    fn test_wrong_shape_is_replaced_with_empty_cart() {
        let storage = MemoryStorage::new();
        storage.set_item(keys::CART, "[1,2,3]").unwrap();

        let cart = CartStore::load(storage, Arc::new(NoticeLog::new())).unwrap();
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn test_notices() {
        let (mut cart, _, log) = store();
        cart.add_item(product(1, 1000), 1).unwrap();
        cart.remove_item(ProductId::new(1)).unwrap();
        cart.clear().unwrap();

        assert_eq!(
            log.messages(),
            vec!["Product 1 added to cart", "Item removed from cart", "Cart cleared"]
        );
    }

    #[test]
    fn test_missing_line_is_silent_noop() {
        let (mut cart, storage, log) = store();
        cart.add_item(product(1, 1000), 1).unwrap();
        let before = storage.get_item(keys::CART).unwrap();

        assert!(!cart.remove_item(ProductId::new(42)).unwrap());
        assert!(!cart.update_quantity(ProductId::new(42), 3).unwrap());
        assert!(!cart.increment(ProductId::new(42)).unwrap());
        assert!(!cart.decrement(ProductId::new(42)).unwrap());

        assert_eq!(storage.get_item(keys::CART).unwrap(), before);
        assert_eq!(log.messages().len(), 1);
    }

    #[test]
    fn test_zero_quantity_add_is_rejected() {
        let (mut cart, _, log) = store();
        assert!(!cart.add_item(product(1, 1000), 0).unwrap());
        assert!(cart.lines().is_empty());
        assert!(log.notices().is_empty());
    }

    #[test]
    fn test_update_to_zero_removes_line() {
        let (mut cart, _, _) = store();
        cart.add_item(product(1, 1000), 3).unwrap();
        assert!(cart.update_quantity(ProductId::new(1), 0).unwrap());
        assert!(cart.line(ProductId::new(1)).is_none());
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_increment_and_decrement() {
        let (mut cart, _, _) = store();
        cart.add_item(product(1, 250), 1).unwrap();

        cart.increment(ProductId::new(1)).unwrap();
        assert_eq!(cart.line(ProductId::new(1)).unwrap().quantity, 2);
        assert_eq!(cart.total_price(), Decimal::new(500, 2));

        cart.decrement(ProductId::new(1)).unwrap();
        cart.decrement(ProductId::new(1)).unwrap();
        assert!(cart.lines().is_empty());
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn test_clear_after_activity() {
        let (mut cart, storage, _) = store();
        cart.add_item(product(1, 1000), 2).unwrap();
        cart.add_item(product(2, 300), 4).unwrap();
        cart.clear().unwrap();

        assert_eq!(cart.state(), &CartState::new());
        assert_eq!(stored_state(&storage), CartState::new());
    }

    #[test]
    fn test_summary_uses_current_totals() {
        let (mut cart, _, _) = store();
        cart.add_item(product(1, 1000), 2).unwrap();
        let summary = cart.summary(CurrencyCode::BRL);
        assert_eq!(summary.subtotal.display(), "R$ 20,00");
        assert_eq!(summary.total.display(), "R$ 22,00");
    }
}
