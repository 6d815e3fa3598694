//! Cart state and its pure reducer.
//!
//! [`CartState::reduce`] is the only way the state changes. It never touches
//! storage; [`super::CartStore`] persists whatever it returns.
//!
//! The aggregates (`total_items`, `total_price`) are adjusted in the same
//! transition as the line they describe, never recomputed from scratch. On
//! the wire the state keeps the browser storefront's layout:
//!
//! ```json
//! {"items":[{"id":1,"product":{...},"quantity":2}],"totalItems":2,"totalPrice":20.0}
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use vitrine_core::{Product, ProductId};

/// One product-quantity pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Key of the line; equals `product.id`.
    #[serde(rename = "id")]
    pub product_id: ProductId,
    /// Snapshot of the product taken when it was first added.
    pub product: Product,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// `price * quantity` for this line, `None` on overflow.
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        self.product.line_total(self.quantity)
    }
}

/// A change to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add `quantity` units, merging into an existing line for the product.
    AddItem { product: Product, quantity: u32 },
    /// Delete the line for a product.
    RemoveItem(ProductId),
    /// Set a line's quantity. Zero deletes the line.
    UpdateQuantity { id: ProductId, quantity: u32 },
    /// Reset to the empty cart.
    Clear,
    /// Replace the whole state, e.g. with one read from storage.
    Load(CartState),
}

/// Ordered cart lines plus their running totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    #[serde(rename = "items")]
    lines: Vec<CartLine>,
    total_items: u32,
    #[serde(with = "rust_decimal::serde::float")]
    total_price: Decimal,
}

impl CartState {
    /// The empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `id`, if any.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == id)
    }

    /// Sum of all line quantities.
    #[must_use]
    pub const fn total_items(&self) -> u32 {
        self.total_items
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub const fn total_price(&self) -> Decimal {
        self.total_price
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the stored totals match the lines.
    ///
    /// Always true for states produced by [`CartState::reduce`] from the
    /// empty cart. A state loaded from storage is trusted as-is and may not
    /// satisfy it.
    #[must_use]
    pub fn totals_consistent(&self) -> bool {
        let items = self
            .lines
            .iter()
            .try_fold(0_u32, |acc, line| acc.checked_add(line.quantity));
        let price = self
            .lines
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.subtotal()?));
        items == Some(self.total_items) && price == Some(self.total_price)
    }

    /// Apply `action` and return the resulting state.
    ///
    /// Actions that would not change anything (removing or updating a missing
    /// line, adding zero units, overflowing a quantity or a total) return the
    /// state untouched.
    #[must_use]
    pub fn reduce(self, action: CartAction) -> Self {
        match action {
            CartAction::AddItem { product, quantity } => self.add_item(product, quantity),
            CartAction::RemoveItem(id) => self.remove_item(id),
            CartAction::UpdateQuantity { id, quantity: 0 } => self.remove_item(id),
            CartAction::UpdateQuantity { id, quantity } => self.update_quantity(id, quantity),
            CartAction::Clear => Self::default(),
            CartAction::Load(state) => state,
        }
    }

    fn add_item(mut self, product: Product, quantity: u32) -> Self {
        if quantity == 0 {
            return self;
        }
        let Some(total_items) = self.total_items.checked_add(quantity) else {
            return self;
        };

        // An existing line keeps its original snapshot, so the added amount is
        // priced from that snapshot to keep `total_price` equal to the sum of
        // line subtotals.
        let existing = self
            .lines
            .iter()
            .position(|line| line.product_id == product.id);
        let priced = existing
            .and_then(|index| self.lines.get(index))
            .map_or(&product, |line| &line.product);
        let Some(total_price) = priced
            .line_total(quantity)
            .and_then(|added| self.total_price.checked_add(added))
        else {
            return self;
        };

        match existing.and_then(|index| self.lines.get_mut(index)) {
            Some(line) => {
                let Some(merged) = line.quantity.checked_add(quantity) else {
                    return self;
                };
                line.quantity = merged;
            }
            None => self.lines.push(CartLine {
                product_id: product.id,
                product,
                quantity,
            }),
        }

        self.total_items = total_items;
        self.total_price = total_price;
        self
    }

    fn remove_item(mut self, id: ProductId) -> Self {
        let Some(index) = self.lines.iter().position(|line| line.product_id == id) else {
            return self;
        };
        let Some(total_price) = self
            .lines
            .get(index)
            .and_then(CartLine::subtotal)
            .and_then(|subtotal| self.total_price.checked_sub(subtotal))
        else {
            return self;
        };
        let removed = self.lines.remove(index);
        self.total_items = self.total_items.saturating_sub(removed.quantity);
        self.total_price = total_price;
        self
    }

    fn update_quantity(mut self, id: ProductId, quantity: u32) -> Self {
        let Some(line) = self.lines.iter_mut().find(|line| line.product_id == id) else {
            return self;
        };
        let previous = line.quantity;
        let Some(total_items) = self
            .total_items
            .saturating_sub(previous)
            .checked_add(quantity)
        else {
            return self;
        };

        let Some(total_price) = line
            .product
            .line_total(previous)
            .and_then(|old| self.total_price.checked_sub(old))
            .zip(line.product.line_total(quantity))
            .and_then(|(rest, new)| rest.checked_add(new))
        else {
            return self;
        };

        line.quantity = quantity;
        self.total_price = total_price;
        self.total_items = total_items;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::test_support::product;

    fn add(state: CartState, product: Product, quantity: u32) -> CartState {
        state.reduce(CartAction::AddItem { product, quantity })
    }

    #[test]
    fn test_checkout_page_scenario() {
        let state = add(CartState::new(), product(1, 1000), 2);
        assert_eq!(state.total_items(), 2);
        assert_eq!(state.total_price(), Decimal::new(2000, 2));

        let state = add(state, product(2, 500), 1);
        assert_eq!(state.total_items(), 3);
        assert_eq!(state.total_price(), Decimal::new(2500, 2));

        let state = state.reduce(CartAction::UpdateQuantity {
            id: ProductId::new(1),
            quantity: 5,
        });
        assert_eq!(state.total_items(), 6);
        assert_eq!(state.total_price(), Decimal::new(5500, 2));

        let state = state.reduce(CartAction::RemoveItem(ProductId::new(2)));
        assert_eq!(state.total_items(), 5);
        assert_eq!(state.total_price(), Decimal::new(5000, 2));
        assert_eq!(state.lines().len(), 1);
    }

    #[test]
    fn test_adding_same_product_twice_merges_lines() {
        let twice = add(add(CartState::new(), product(1, 1000), 2), product(1, 1000), 3);
        let once = add(CartState::new(), product(1, 1000), 5);

        assert_eq!(twice, once);
        assert_eq!(twice.lines().len(), 1);
        assert_eq!(twice.line(ProductId::new(1)).unwrap().quantity, 5);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let state = add(add(add(CartState::new(), product(3, 100), 1), product(1, 100), 1), product(2, 100), 1);
        let ids: Vec<i32> = state.lines().iter().map(|l| l.product_id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_merge_prices_from_existing_snapshot() {
        let state = add(CartState::new(), product(1, 1000), 1);
        let repriced = product(1, 1500);
        let state = add(state, repriced, 1);

        assert_eq!(state.total_price(), Decimal::new(2000, 2));
        assert!(state.totals_consistent());
    }

    #[test]
    fn test_remove_missing_line_is_noop() {
        let state = add(CartState::new(), product(1, 1000), 2);
        let before = serde_json::to_string(&state).unwrap();

        let after = state.reduce(CartAction::RemoveItem(ProductId::new(99)));
        assert_eq!(serde_json::to_string(&after).unwrap(), before);
    }

    #[test]
    fn test_update_missing_line_is_noop() {
        let state = add(CartState::new(), product(1, 1000), 2);
        let after = state.clone().reduce(CartAction::UpdateQuantity {
            id: ProductId::new(7),
            quantity: 3,
        });
        assert_eq!(after, state);
    }

    #[test]
    fn test_update_to_zero_removes_line() {
        let state = add(add(CartState::new(), product(1, 1000), 2), product(2, 250), 4);
        let state = state.reduce(CartAction::UpdateQuantity {
            id: ProductId::new(1),
            quantity: 0,
        });

        assert!(state.line(ProductId::new(1)).is_none());
        assert_eq!(state.total_items(), 4);
        assert_eq!(state.total_price(), Decimal::new(1000, 2));
    }

    #[test]
    fn test_add_zero_quantity_is_noop() {
        let state = add(CartState::new(), product(1, 1000), 0);
        assert!(state.is_empty());
        assert_eq!(state.total_items(), 0);
    }

    #[test]
    fn test_add_overflow_leaves_state_untouched() {
        let state = add(CartState::new(), product(1, 100), u32::MAX);
        let after = add(state.clone(), product(2, 100), 1);
        assert_eq!(after, state);
    }

    #[test]
    fn test_price_overflow_leaves_state_untouched() {
        let mut yacht = product(1, 100);
        yacht.price = Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0);

        let empty = add(CartState::new(), yacht.clone(), 1_000_000_000);
        assert_eq!(empty, CartState::new());

        let state = add(CartState::new(), yacht.clone(), 1);
        assert_eq!(add(state.clone(), yacht, 1_000_000_000), state);

        let after = state.clone().reduce(CartAction::UpdateQuantity {
            id: ProductId::new(1),
            quantity: 1_000_000_000,
        });
        assert_eq!(after, state);
        assert!(after.totals_consistent());
    }

    #[test]
    fn test_loaded_total_near_max_does_not_panic() {
        let mut state = add(CartState::new(), product(1, 100), 1);
        state.total_price = Decimal::MAX;

        let after = add(state.clone(), product(2, 100), 1);
        assert_eq!(after, state);

        let cleared = after.reduce(CartAction::Clear);
        assert!(cleared.is_empty());
    }

    #[test]
    fn test_clear_resets_everything() {
        let state = add(add(CartState::new(), product(1, 1999), 3), product(2, 1), 1);
        let cleared = state.reduce(CartAction::Clear);

        assert!(cleared.lines().is_empty());
        assert_eq!(cleared.total_items(), 0);
        assert_eq!(cleared.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_load_replaces_state() {
        let loaded = add(CartState::new(), product(4, 700), 2);
        let state = add(CartState::new(), product(1, 100), 1).reduce(CartAction::Load(loaded.clone()));
        assert_eq!(state, loaded);
    }

    #[test]
    fn test_wire_format_matches_browser_layout() {
        let state = add(CartState::new(), product(1, 1000), 2);
        let json: serde_json::Value = serde_json::to_value(&state).unwrap();

        assert_eq!(json["totalItems"], 2);
        assert_eq!(json["totalPrice"], 20.0);
        assert_eq!(json["items"][0]["id"], 1);
        assert_eq!(json["items"][0]["quantity"], 2);
        assert_eq!(json["items"][0]["product"]["title"], "Product 1");
    }

    #[test]
    fn test_serialized_state_reloads_equal() {
        let state = add(add(CartState::new(), product(1, 1999), 3), product(2, 5), 7);
        let json = serde_json::to_string(&state).unwrap();
        let reloaded: CartState = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, state);
    }

    #[test]
    fn test_reads_browser_written_cart() {
        let json = r#"{
            "items": [{
                "id": 9,
                "product": {
                    "id": 9,
                    "title": "Classic Cap",
                    "price": 12.5,
                    "description": "A cap",
                    "category": {"id": 1, "name": "Clothes", "image": ""},
                    "images": []
                },
                "quantity": 2
            }],
            "totalItems": 2,
            "totalPrice": 25
        }"#;
        let state: CartState = serde_json::from_str(json).unwrap();
        assert_eq!(state.total_items(), 2);
        assert_eq!(state.total_price(), Decimal::from(25));
        assert!(state.totals_consistent());
    }

    fn action_strategy() -> impl Strategy<Value = CartAction> {
        let id = 1_i32..6;
        prop_oneof![
            (id.clone(), 1_i64..100_000, 0_u32..20).prop_map(|(id, cents, quantity)| {
                CartAction::AddItem {
                    product: product(id, cents),
                    quantity,
                }
            }),
            id.clone()
                .prop_map(|id| CartAction::RemoveItem(ProductId::new(id))),
            (id, 0_u32..20).prop_map(|(id, quantity)| CartAction::UpdateQuantity {
                id: ProductId::new(id),
                quantity,
            }),
            Just(CartAction::Clear),
        ]
    }

    proptest! {
        #[test]
        fn totals_hold_after_every_action(
            actions in proptest::collection::vec(action_strategy(), 0..40)
        ) {
            let mut state = CartState::new();
            for action in actions {
                state = state.reduce(action);
                prop_assert!(state.totals_consistent());
                prop_assert!(state.lines().iter().all(|line| line.quantity >= 1));
                prop_assert!(state.lines().iter().all(|line| line.product_id == line.product.id));

                let mut ids: Vec<_> = state.lines().iter().map(|line| line.product_id).collect();
                ids.sort();
                ids.dedup();
                prop_assert_eq!(ids.len(), state.lines().len());
            }
        }

        #[test]
        fn clear_always_yields_empty(
            actions in proptest::collection::vec(action_strategy(), 0..20)
        ) {
            let state = actions.into_iter().fold(CartState::new(), CartState::reduce);
            prop_assert_eq!(state.reduce(CartAction::Clear), CartState::new());
        }
    }
}
