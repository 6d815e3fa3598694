//! Product listing filters.

use rust_decimal::Decimal;

use vitrine_core::{CategoryId, Product};

/// Upper bound of the price slider.
pub const DEFAULT_MAX_PRICE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Filters applied to the product listing.
///
/// A product passes when it belongs to the selected category (if any), its
/// title or description contains the search text (case-insensitive), and its
/// price lies within `min_price..=max_price`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
    pub search: String,
    pub min_price: Decimal,
    pub max_price: Decimal,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category: None,
            search: String::new(),
            min_price: Decimal::ZERO,
            max_price: DEFAULT_MAX_PRICE,
        }
    }
}

impl ProductFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    #[must_use]
    pub const fn with_price_range(mut self, min: Decimal, max: Decimal) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Whether any filter differs from its default.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self != &Self::default()
    }

    /// Clear every filter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if self.category.is_some_and(|id| product.category.id != id) {
            return false;
        }

        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty()
            && !product.title.to_lowercase().contains(&needle)
            && !product.description.to_lowercase().contains(&needle)
        {
            return false;
        }

        (self.min_price..=self.max_price).contains(&product.price)
    }

    /// The matching products, in input order.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        products
            .iter()
            .filter(|product| self.matches(product))
            .cloned()
            .collect()
    }
}
