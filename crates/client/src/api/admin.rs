//! Administrator endpoints (`/api/v1/admin/*`).
//!
//! All of these require an administrator token; the backend answers 403
//! otherwise. Product and category mutations invalidate the catalog cache.

use shopfront_core::models::Message;
use shopfront_core::{
    Category, CategoryId, CategoryUpdate, Identity, NewCategory, NewProduct, Order, OrderId,
    OrderUpdate, Product, ProductId, ProductUpdate, UserId, UserUpdate,
};
use tracing::instrument;

use super::{ApiClient, endpoints};
use crate::error::ApiError;

impl ApiClient {
    // =========================================================================
    // Users
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-administrators.
    #[instrument(skip(self))]
    pub async fn admin_users(&self) -> Result<Vec<Identity>, ApiError> {
        self.get(endpoints::ADMIN_USERS).await
    }

    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the user does not exist.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn admin_user(&self, id: &UserId) -> Result<Identity, ApiError> {
        self.get(&endpoints::admin_user(id)).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn admin_update_user(
        &self,
        id: &UserId,
        update: &UserUpdate,
    ) -> Result<Identity, ApiError> {
        self.put(&endpoints::admin_user(id), update).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn admin_delete_user(&self, id: &UserId) -> Result<(), ApiError> {
        let _: Message = self.delete(&endpoints::admin_user(id)).await?;
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// All products, including inactive ones.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-administrators.
    #[instrument(skip(self))]
    pub async fn admin_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get(endpoints::ADMIN_PRODUCTS).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn admin_create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let created = self.post(endpoints::ADMIN_PRODUCTS, product).await?;
        self.invalidate_catalog();
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, update), fields(product_id = %id))]
    pub async fn admin_update_product(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, ApiError> {
        let updated = self.put(&endpoints::admin_product(id), update).await?;
        self.invalidate_catalog();
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn admin_delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        let _: Message = self.delete(&endpoints::admin_product(id)).await?;
        self.invalidate_catalog();
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-administrators.
    #[instrument(skip(self))]
    pub async fn admin_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get(endpoints::ADMIN_CATEGORIES).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, category), fields(name = %category.name))]
    pub async fn admin_create_category(
        &self,
        category: &NewCategory,
    ) -> Result<Category, ApiError> {
        let created = self.post(endpoints::ADMIN_CATEGORIES, category).await?;
        self.invalidate_catalog();
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, update), fields(category_id = %id))]
    pub async fn admin_update_category(
        &self,
        id: &CategoryId,
        update: &CategoryUpdate,
    ) -> Result<Category, ApiError> {
        let updated = self.put(&endpoints::admin_category(id), update).await?;
        self.invalidate_catalog();
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn admin_delete_category(&self, id: &CategoryId) -> Result<(), ApiError> {
        let _: Message = self.delete(&endpoints::admin_category(id)).await?;
        self.invalidate_catalog();
        Ok(())
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Every order in the store.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-administrators.
    #[instrument(skip(self))]
    pub async fn admin_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get(endpoints::ADMIN_ORDERS).await
    }

    /// Change an order's status or shipping address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, update), fields(order_id = %id))]
    pub async fn admin_update_order(
        &self,
        id: &OrderId,
        update: &OrderUpdate,
    ) -> Result<Order, ApiError> {
        self.put(&endpoints::admin_order(id), update).await
    }
}
