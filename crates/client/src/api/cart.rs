//! Cart endpoints.

use shopfront_core::models::Message;
use shopfront_core::{CartItem, CartItemId, CartItemUpdate, NewCartItem};
use tracing::instrument;

use super::{ApiClient, endpoints};
use crate::collection::CartBackend;
use crate::error::ApiError;

impl CartBackend for ApiClient {
    #[instrument(skip(self))]
    async fn list_cart(&self) -> Result<Vec<CartItem>, ApiError> {
        self.get(endpoints::CART).await
    }

    #[instrument(skip(self, item), fields(product_id = %item.product_id, quantity = %item.quantity))]
    async fn add_cart_item(&self, item: &NewCartItem) -> Result<CartItem, ApiError> {
        self.post(endpoints::CART, item).await
    }

    #[instrument(skip(self, update), fields(item_id = %id, quantity = %update.quantity))]
    async fn update_cart_item(
        &self,
        id: &CartItemId,
        update: CartItemUpdate,
    ) -> Result<CartItem, ApiError> {
        self.put(&endpoints::cart_item(id), &update).await
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn remove_cart_item(&self, id: &CartItemId) -> Result<(), ApiError> {
        let _: Message = self.delete(&endpoints::cart_item(id)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), ApiError> {
        let _: Message = self.delete(endpoints::CART).await?;
        Ok(())
    }
}
