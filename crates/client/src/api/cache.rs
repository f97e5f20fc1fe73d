//! Cache types for catalog responses.

use shopfront_core::{Category, CategoryId, Product, ProductId};

/// Cache key for products and categories.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Category(CategoryId),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Category(Box<Category>),
    Categories(Vec<Category>),
}
