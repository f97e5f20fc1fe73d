//! Cart state.

use std::future::Future;
use std::sync::Arc;

use shopfront_core::{
    CartItem, CartItemId, CartItemUpdate, Identity, LineItem, NewCartItem, Price, ProductId,
    Quantity,
};
use tracing::{debug, instrument};

use super::Mirror;
use crate::api::ApiClient;
use crate::error::ApiError;
use crate::notice::Notices;

const LOGIN_TO_ADD: &str = "Please login to add items to cart";
const LOGIN_TO_MANAGE: &str = "Please login to manage your cart";
const LOAD_FAILED: &str = "Failed to load cart";
const ADDED: &str = "Added to cart successfully!";
const ADD_FAILED: &str = "Failed to add to cart";
const UPDATED: &str = "Cart updated successfully!";
const UPDATE_FAILED: &str = "Failed to update cart";
const REMOVED: &str = "Item removed from cart!";
const REMOVE_FAILED: &str = "Failed to remove item";
const CLEARED: &str = "Cart cleared successfully!";
const CLEAR_FAILED: &str = "Failed to clear cart";

/// Server operations the cart depends on.
pub trait CartBackend: Send + Sync + 'static {
    fn list_cart(&self) -> impl Future<Output = Result<Vec<CartItem>, ApiError>> + Send;

    fn add_cart_item(
        &self,
        item: &NewCartItem,
    ) -> impl Future<Output = Result<CartItem, ApiError>> + Send;

    fn update_cart_item(
        &self,
        id: &CartItemId,
        update: CartItemUpdate,
    ) -> impl Future<Output = Result<CartItem, ApiError>> + Send;

    fn remove_cart_item(&self, id: &CartItemId)
    -> impl Future<Output = Result<(), ApiError>> + Send;

    fn clear_cart(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Local mirror of the current identity's cart.
///
/// Cheap to clone; clones share the same mirror.
pub struct CartState<B = ApiClient> {
    inner: Arc<CartInner<B>>,
}

struct CartInner<B> {
    backend: B,
    mirror: Mirror<CartItem>,
    notices: Notices,
}

impl<B> Clone for CartState<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: CartBackend> CartState<B> {
    #[must_use]
    pub fn new(backend: B, notices: Notices) -> Self {
        Self {
            inner: Arc::new(CartInner {
                backend,
                mirror: Mirror::new(),
                notices,
            }),
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// React to the session identity changing.
    ///
    /// A new owner triggers exactly one read. Losing the owner empties the
    /// cart without any request. The same owner again is a no-op.
    pub async fn on_identity_change(&self, identity: Option<&Identity>) {
        if !self.inner.mirror.set_owner(identity) {
            return;
        }
        if identity.is_some() {
            self.fetch().await;
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Replace the cart with the server's copy.
    ///
    /// Without an identity the cart is emptied and no request is made.
    /// Returns whether a server copy was applied.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> bool {
        let Some(pending) = self.inner.mirror.begin_fetch() else {
            debug!("No identity, cart emptied");
            return false;
        };

        match self.inner.backend.list_cart().await {
            Ok(items) => {
                debug!(items = items.len(), "Cart loaded");
                pending.finish(Some(items))
            }
            Err(err) => {
                let ticket = pending.ticket();
                pending.finish(None);
                if self.inner.mirror.is_current(ticket) {
                    self.inner.notices.error(err.user_message(LOAD_FAILED));
                }
                false
            }
        }
    }

    /// Add `quantity` of a product. The server merges into an existing line.
    #[instrument(skip_all, fields(product_id = %product_id, quantity = %quantity))]
    pub async fn add(&self, product_id: &ProductId, quantity: Quantity) -> bool {
        if !self.guard(LOGIN_TO_ADD) {
            return false;
        }
        let item = NewCartItem {
            product_id: product_id.clone(),
            quantity,
        };
        match self.inner.backend.add_cart_item(&item).await {
            Ok(_) => {
                self.fetch().await;
                self.inner.notices.success(ADDED);
                true
            }
            Err(err) => {
                self.inner.notices.error(err.user_message(ADD_FAILED));
                false
            }
        }
    }

    /// Set a line's quantity. Values below one are sent as one.
    #[instrument(skip_all, fields(item_id = %item_id, quantity = quantity))]
    pub async fn update(&self, item_id: &CartItemId, quantity: i64) -> bool {
        if !self.guard(LOGIN_TO_MANAGE) {
            return false;
        }
        let update = CartItemUpdate {
            quantity: Quantity::clamped(quantity),
        };
        match self.inner.backend.update_cart_item(item_id, update).await {
            Ok(_) => {
                self.fetch().await;
                self.inner.notices.success(UPDATED);
                true
            }
            Err(err) => {
                self.inner.notices.error(err.user_message(UPDATE_FAILED));
                false
            }
        }
    }

    /// Raise a line's quantity by one.
    pub async fn increment(&self, item_id: &CartItemId) -> bool {
        if !self.guard(LOGIN_TO_MANAGE) {
            return false;
        }
        let Some(current) = self.quantity_of(item_id) else {
            self.inner.notices.error(UPDATE_FAILED);
            return false;
        };
        self.update(item_id, i64::from(current.incremented().get()))
            .await
    }

    /// Lower a line's quantity by one, stopping at one.
    pub async fn decrement(&self, item_id: &CartItemId) -> bool {
        if !self.guard(LOGIN_TO_MANAGE) {
            return false;
        }
        let Some(current) = self.quantity_of(item_id) else {
            self.inner.notices.error(UPDATE_FAILED);
            return false;
        };
        self.update(item_id, i64::from(current.decremented().get()))
            .await
    }

    /// Delete a line.
    #[instrument(skip_all, fields(item_id = %item_id))]
    pub async fn remove(&self, item_id: &CartItemId) -> bool {
        if !self.guard(LOGIN_TO_MANAGE) {
            return false;
        }
        match self.inner.backend.remove_cart_item(item_id).await {
            Ok(()) => {
                self.fetch().await;
                self.inner.notices.success(REMOVED);
                true
            }
            Err(err) => {
                self.inner.notices.error(err.user_message(REMOVE_FAILED));
                false
            }
        }
    }

    /// Empty the cart. The result is known, so no re-read follows.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> bool {
        if !self.guard(LOGIN_TO_MANAGE) {
            return false;
        }
        let Some(ticket) = self.inner.mirror.ticket() else {
            return false;
        };
        match self.inner.backend.clear_cart().await {
            Ok(()) => {
                self.inner.mirror.clear_items(ticket);
                self.inner.notices.success(CLEARED);
                true
            }
            Err(err) => {
                self.inner.notices.error(err.user_message(CLEAR_FAILED));
                false
            }
        }
    }

    fn guard(&self, message: &str) -> bool {
        let access = self.inner.mirror.access();
        if !access.is_allowed() {
            debug!(?access, "Cart command rejected");
            self.inner.notices.error(message);
        }
        access.is_allowed()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the current lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.inner.mirror.items()
    }

    #[must_use]
    pub fn quantity_of(&self, item_id: &CartItemId) -> Option<Quantity> {
        self.inner.mirror.with_items(|items| {
            items
                .iter()
                .find(|line| &line.id == item_id)
                .map(|line| line.quantity)
        })
    }

    /// Total units across all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.inner
            .mirror
            .with_items(|items| items.iter().map(|line| u64::from(line.units())).sum())
    }

    /// Sum of price times quantity across all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.inner
            .mirror
            .with_items(|items| items.iter().map(CartItem::line_total).sum())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.mirror.with_items(<[CartItem]>::is_empty)
    }

    /// Whether a read is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.mirror.is_loading()
    }
}
