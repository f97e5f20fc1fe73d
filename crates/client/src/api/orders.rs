//! Order endpoints.

use shopfront_core::models::Message;
use shopfront_core::{NewOrder, Order, OrderId};
use tracing::instrument;

use super::{ApiClient, endpoints};
use crate::error::ApiError;

impl ApiClient {
    /// Place an order. The backend checks stock, recomputes the total and
    /// empties the cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the server detail (e.g. "Insufficient
    /// stock for product ...") or any transport error.
    #[instrument(skip(self, order), fields(lines = order.items.len()))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        self.post(endpoints::ORDERS, order).await
    }

    /// The current user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get(endpoints::ORDERS).await
    }

    /// One of the current user's orders.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not exist or belongs to
    /// someone else.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, id: &OrderId) -> Result<Order, ApiError> {
        self.get(&endpoints::order(id)).await
    }

    /// Cancel a pending order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` ("Only pending orders can be cancelled") or
    /// any transport error.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel_order(&self, id: &OrderId) -> Result<String, ApiError> {
        let message: Message = self.post_empty(&endpoints::order_cancel(id)).await?;
        Ok(message.message)
    }
}
