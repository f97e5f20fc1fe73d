//! Wishlist state.

use std::future::Future;
use std::sync::Arc;

use shopfront_core::{Identity, NewWishlistItem, ProductId, WishlistItem, WishlistItemId};
use tracing::{debug, instrument};

use super::Mirror;
use crate::api::ApiClient;
use crate::error::ApiError;
use crate::notice::Notices;

const LOGIN_TO_ADD: &str = "Please login to add items to wishlist";
const LOGIN_TO_MANAGE: &str = "Please login to manage your wishlist";
const LOAD_FAILED: &str = "Failed to load wishlist";
const ADDED: &str = "Added to wishlist successfully!";
const ADD_FAILED: &str = "Failed to add to wishlist";
const REMOVED: &str = "Item removed from wishlist!";
const REMOVE_FAILED: &str = "Failed to remove item";
const CLEARED: &str = "Wishlist cleared successfully!";
const CLEAR_FAILED: &str = "Failed to clear wishlist";

/// Server operations the wishlist depends on.
pub trait WishlistBackend: Send + Sync + 'static {
    fn list_wishlist(&self) -> impl Future<Output = Result<Vec<WishlistItem>, ApiError>> + Send;

    fn add_wishlist_item(
        &self,
        item: &NewWishlistItem,
    ) -> impl Future<Output = Result<WishlistItem, ApiError>> + Send;

    fn remove_wishlist_item(
        &self,
        id: &WishlistItemId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn clear_wishlist(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Local mirror of the current identity's wishlist.
pub struct WishlistState<B = ApiClient> {
    inner: Arc<WishlistInner<B>>,
}

struct WishlistInner<B> {
    backend: B,
    mirror: Mirror<WishlistItem>,
    notices: Notices,
}

impl<B> Clone for WishlistState<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: WishlistBackend> WishlistState<B> {
    #[must_use]
    pub fn new(backend: B, notices: Notices) -> Self {
        Self {
            inner: Arc::new(WishlistInner {
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

    /// React to the session identity changing. Same rules as the cart.
    pub async fn on_identity_change(&self, identity: Option<&Identity>) {
        if self.inner.mirror.set_owner(identity) && identity.is_some() {
            self.fetch().await;
        }
    }

    /// Replace the wishlist with the server's copy.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> bool {
        let Some(pending) = self.inner.mirror.begin_fetch() else {
            debug!("No identity, wishlist emptied");
            return false;
        };

        match self.inner.backend.list_wishlist().await {
            Ok(items) => pending.finish(Some(items)),
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

    /// Save a product. The server rejects products already saved.
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn add(&self, product_id: &ProductId) -> bool {
        if !self.guard(LOGIN_TO_ADD) {
            return false;
        }
        let item = NewWishlistItem {
            product_id: product_id.clone(),
        };
        match self.inner.backend.add_wishlist_item(&item).await {
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

    #[instrument(skip_all, fields(item_id = %item_id))]
    pub async fn remove(&self, item_id: &WishlistItemId) -> bool {
        if !self.guard(LOGIN_TO_MANAGE) {
            return false;
        }
        match self.inner.backend.remove_wishlist_item(item_id).await {
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

    #[instrument(skip(self))]
    pub async fn clear(&self) -> bool {
        if !self.guard(LOGIN_TO_MANAGE) {
            return false;
        }
        let Some(ticket) = self.inner.mirror.ticket() else {
            return false;
        };
        match self.inner.backend.clear_wishlist().await {
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
            debug!(?access, "Wishlist command rejected");
            self.inner.notices.error(message);
        }
        access.is_allowed()
    }

    #[must_use]
    pub fn items(&self) -> Vec<WishlistItem> {
        self.inner.mirror.items()
    }

    /// Whether a product is saved.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.inner
            .mirror
            .with_items(|items| items.iter().any(|item| &item.product_id == product_id))
    }

    /// The saved entry for a product, for removal by product.
    #[must_use]
    pub fn entry_for(&self, product_id: &ProductId) -> Option<WishlistItemId> {
        self.inner.mirror.with_items(|items| {
            items
                .iter()
                .find(|item| &item.product_id == product_id)
                .map(|item| item.id.clone())
        })
    }

    /// Number of saved products.
    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.mirror.with_items(<[WishlistItem]>::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.mirror.is_loading()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::sync::broadcast::Receiver;

    use super::super::fake::{FakeBackend, identity, product};
    use super::*;
    use crate::notice::{Notice, NoticeLevel};

    fn wishlist() -> (WishlistState<FakeBackend>, Receiver<Notice>) {
        let notices = Notices::new();
        let rx = notices.subscribe();
        let backend = FakeBackend::with_products(vec![product("p1", 1000), product("p2", 500)]);
        (WishlistState::new(backend, notices), rx)
    }

    fn drain(rx: &mut Receiver<Notice>) -> Vec<Notice> {
        let mut out = Vec::new();
        while let Ok(notice) = rx.try_recv() {
            out.push(notice);
        }
        out
    }

    #[tokio::test]
    async fn test_add_without_identity() {
        let (wishlist, mut rx) = wishlist();
        assert!(!wishlist.add(&ProductId::new("p1")).await);
        assert_eq!(wishlist.backend().total_calls(), 0);
        assert_eq!(
            drain(&mut rx),
            vec![Notice {
                level: NoticeLevel::Error,
                message: "Please login to add items to wishlist".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_add_then_contains() {
        let (wishlist, _rx) = wishlist();
        wishlist.on_identity_change(Some(&identity("u1"))).await;
        assert!(!wishlist.contains(&ProductId::new("p1")));

        assert!(wishlist.add(&ProductId::new("p1")).await);
        assert!(wishlist.contains(&ProductId::new("p1")));
        assert!(!wishlist.contains(&ProductId::new("p2")));
        assert_eq!(wishlist.count(), 1);
        assert_eq!(wishlist.items(), wishlist.backend().server_wishlist());
    }

    #[tokio::test]
    async fn test_duplicate_add_surfaces_server_detail() {
        let (wishlist, mut rx) = wishlist();
        wishlist.on_identity_change(Some(&identity("u1"))).await;
        assert!(wishlist.add(&ProductId::new("p1")).await);
        drain(&mut rx);

        assert!(!wishlist.add(&ProductId::new("p1")).await);
        let notices = drain(&mut rx);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, "Product already in wishlist");
        assert_eq!(wishlist.count(), 1);
    }

    #[tokio::test]
    async fn test_remove_by_product() {
        let (wishlist, _rx) = wishlist();
        wishlist.on_identity_change(Some(&identity("u1"))).await;
        wishlist.add(&ProductId::new("p1")).await;
        wishlist.add(&ProductId::new("p2")).await;

        let entry = wishlist.entry_for(&ProductId::new("p1")).unwrap();
        assert!(wishlist.remove(&entry).await);
        assert!(!wishlist.contains(&ProductId::new("p1")));
        assert_eq!(wishlist.count(), 1);
    }

    #[tokio::test]
    async fn test_clear_sets_empty_without_reread() {
        let (wishlist, _rx) = wishlist();
        wishlist.on_identity_change(Some(&identity("u1"))).await;
        wishlist.add(&ProductId::new("p1")).await;
        let reads = wishlist.backend().calls("list_wishlist");

        assert!(wishlist.clear().await);
        assert!(wishlist.is_empty());
        assert_eq!(wishlist.backend().calls("list_wishlist"), reads);
    }

    #[tokio::test]
    async fn test_switching_identity_refetches() {
        let (wishlist, _rx) = wishlist();
        wishlist.on_identity_change(Some(&identity("u1"))).await;
        wishlist.on_identity_change(Some(&identity("u2"))).await;
        assert_eq!(wishlist.backend().calls("list_wishlist"), 2);

        wishlist.on_identity_change(None).await;
        assert!(wishlist.is_empty());
        assert_eq!(wishlist.backend().calls("list_wishlist"), 2);
    }
}
