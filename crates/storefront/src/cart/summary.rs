//! Order summary shown next to the cart.

use rust_decimal::Decimal;

use vitrine_core::{CurrencyCode, Price};

use super::CartState;

/// Flat tax applied to the subtotal (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Subtotal, shipping, taxes and grand total for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    pub item_count: u32,
    pub subtotal: Price,
    /// Shipping is free for every order.
    pub shipping: Price,
    pub taxes: Price,
    pub total: Price,
}

impl CartSummary {
    /// Build the summary for `state` in `currency`.
    #[must_use]
    pub fn new(state: &CartState, currency: CurrencyCode) -> Self {
        let subtotal = state.total_price();
        let taxes = subtotal * TAX_RATE;
        let shipping = Decimal::ZERO;

        Self {
            item_count: state.total_items(),
            subtotal: Price::new(subtotal, currency),
            shipping: Price::new(shipping, currency),
            taxes: Price::new(taxes, currency),
            total: Price::new(subtotal.saturating_add(shipping).saturating_add(taxes), currency),
        }
    }

    /// Whether the order ships for free.
    #[must_use]
    pub fn free_shipping(&self) -> bool {
        self.shipping.amount.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartAction;
    use crate::test_support::product;

    #[test]
    fn test_taxes_are_ten_percent() {
        let state = CartState::new().reduce(CartAction::AddItem {
            product: product(1, 5000),
            quantity: 1,
        });
        let summary = CartSummary::new(&state, CurrencyCode::BRL);

        assert_eq!(summary.subtotal.amount, Decimal::new(5000, 2));
        assert_eq!(summary.taxes.amount, Decimal::new(500, 2));
        assert_eq!(summary.total.amount, Decimal::new(5500, 2));
        assert_eq!(summary.total.display(), "R$ 55,00");
        assert!(summary.free_shipping());
        assert_eq!(summary.item_count, 1);
    }

    #[test]
    fn test_empty_cart_summary_is_zero() {
        let summary = CartSummary::new(&CartState::new(), CurrencyCode::USD);
        assert!(summary.total.amount.is_zero());
        assert_eq!(summary.total.display(), "$0.00");
    }
}
