//! Cache types for catalog responses.

use vitrine_core::{Category, CategoryId, Product, ProductId};

/// Cache key, one per cacheable GET request.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Product(ProductId),
    CategoryProducts(CategoryId),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Categories(Vec<Category>),
}
