//! Wishlist endpoints.

use shopfront_core::models::Message;
use shopfront_core::{NewWishlistItem, WishlistItem, WishlistItemId};
use tracing::instrument;

use super::{ApiClient, endpoints};
use crate::collection::WishlistBackend;
use crate::error::ApiError;

impl WishlistBackend for ApiClient {
    #[instrument(skip(self))]
    async fn list_wishlist(&self) -> Result<Vec<WishlistItem>, ApiError> {
        self.get(endpoints::WISHLIST).await
    }

    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    async fn add_wishlist_item(&self, item: &NewWishlistItem) -> Result<WishlistItem, ApiError> {
        self.post(endpoints::WISHLIST, item).await
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn remove_wishlist_item(&self, id: &WishlistItemId) -> Result<(), ApiError> {
        let _: Message = self.delete(&endpoints::wishlist_item(id)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_wishlist(&self) -> Result<(), ApiError> {
        let _: Message = self.delete(endpoints::WISHLIST).await?;
        Ok(())
    }
}
