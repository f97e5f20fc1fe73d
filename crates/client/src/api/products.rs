//! Product and category endpoints.
//!
//! Product detail and category reads are cached. Filtered listings are not.

use serde::Serialize;
use shopfront_core::{Category, CategoryId, Price, Product, ProductId};
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::{ApiClient, endpoints};
use crate::error::ApiError;

/// Largest page the backend will serve.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Filters and pagination for the product listing.
///
/// ```
/// use shopfront_client::api::products::ProductQuery;
///
/// let query = ProductQuery::new().search("pineapple").limit(500);
/// assert_eq!(query.limit, Some(100));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Price>,
}

impl ProductQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Page size, clamped to `1..=100`.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit.clamp(1, MAX_PAGE_SIZE));
        self
    }

    #[must_use]
    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Case-insensitive match on name or description. Blank input is ignored.
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = (!term.trim().is_empty()).then_some(term);
        self
    }

    #[must_use]
    pub const fn price_range(mut self, min: Option<Price>, max: Option<Price>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }
}

impl ApiClient {
    /// List active products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        self.get_with_query(endpoints::PRODUCTS, query).await
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist or is inactive.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get(&endpoints::product(id)).await?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get(endpoints::CATEGORIES).await?;

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the category does not exist.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        let key = CacheKey::Category(id.clone());

        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let category: Category = self.get(&endpoints::category(id)).await?;

        self.inner
            .cache
            .insert(key, CacheValue::Category(Box::new(category.clone())))
            .await;

        Ok(category)
    }

    /// Drop every cached product and category.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(ProductQuery::new().limit(0).limit, Some(1));
        assert_eq!(ProductQuery::new().limit(101).limit, Some(MAX_PAGE_SIZE));
        assert_eq!(ProductQuery::new().limit(6).limit, Some(6));
    }

    #[test]
    fn test_blank_search_ignored() {
        assert_eq!(ProductQuery::new().search("   ").search, None);
    }

    #[test]
    fn test_query_serializes_only_set_fields() {
        let query = ProductQuery::new()
            .skip(10)
            .category(CategoryId::new("fruit"))
            .price_range(Some(Price::from_cents(150)), None);
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"skip": 10, "category_id": "fruit", "min_price": 1.5})
        );
    }
}
