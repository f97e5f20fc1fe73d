//! In-memory backend for collection tests.
//!
//! Behaves like the real server for the parts the collections depend on:
//! cart adds merge quantities, wishlist adds reject duplicates, and every
//! call is counted so tests can assert on request traffic.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use reqwest::StatusCode;
use shopfront_core::{
    CartItem, CartItemId, CartItemUpdate, CategoryId, Email, Identity, NewCartItem,
    NewWishlistItem, Price, Product, ProductId, Role, UserId, WishlistItem, WishlistItemId,
};
use tokio::sync::{Notify, oneshot};

use super::{CartBackend, WishlistBackend};
use crate::error::ApiError;

pub(crate) fn identity(id: &str) -> Identity {
    Identity {
        id: UserId::new(id),
        username: id.to_string(),
        email: Email::parse(&format!("{id}@shop.test")).unwrap(),
        full_name: id.to_uppercase(),
        role: Role::Customer,
        is_active: true,
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn product(id: &str, cents: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: String::new(),
        price: Price::from_cents(cents),
        category_id: CategoryId::new("c1"),
        stock_quantity: 50,
        image_url: None,
        is_active: true,
        created_at: None,
        updated_at: None,
    }
}

#[derive(Default)]
struct Server {
    products: Vec<Product>,
    cart: Vec<CartItem>,
    wishlist: Vec<WishlistItem>,
    next_id: u32,
    calls: HashMap<&'static str, usize>,
    fail_next: Option<(StatusCode, String)>,
}

impl Server {
    fn call(&mut self, op: &'static str) -> Result<(), ApiError> {
        *self.calls.entry(op).or_default() += 1;
        match self.fail_next.take() {
            Some((status, body)) => Err(ApiError::from_response(status, &body)),
            None => Ok(()),
        }
    }

    fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(Some("Product not found".to_string())))
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

/// Holds list responses until released, so tests can interleave events.
#[derive(Default)]
pub(crate) struct Gate {
    started: Notify,
    held: Mutex<Vec<oneshot::Sender<()>>>,
}

impl Gate {
    /// Wait until a list call is being held.
    pub(crate) async fn started(&self) {
        self.started.notified().await;
    }

    /// Let the most recently held list call respond.
    pub(crate) fn release_newest(&self) {
        if let Some(tx) = self.held.lock().unwrap().pop() {
            let _ = tx.send(());
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    server: Mutex<Server>,
    gate: Option<Gate>,
}

impl FakeBackend {
    pub(crate) fn with_products(products: Vec<Product>) -> Self {
        Self {
            server: Mutex::new(Server {
                products,
                ..Server::default()
            }),
            gate: None,
        }
    }

    pub(crate) fn gated(mut self) -> Self {
        self.gate = Some(Gate::default());
        self
    }

    pub(crate) fn gate(&self) -> &Gate {
        self.gate.as_ref().unwrap()
    }

    pub(crate) fn calls(&self, op: &str) -> usize {
        self.server.lock().unwrap().calls.get(op).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.server.lock().unwrap().calls.values().sum()
    }

    pub(crate) fn fail_next(&self, status: StatusCode, body: &str) {
        self.server.lock().unwrap().fail_next = Some((status, body.to_string()));
    }

    pub(crate) fn server_cart(&self) -> Vec<CartItem> {
        self.server.lock().unwrap().cart.clone()
    }

    pub(crate) fn server_wishlist(&self) -> Vec<WishlistItem> {
        self.server.lock().unwrap().wishlist.clone()
    }

    /// Change the server cart behind the client's back.
    pub(crate) fn seed_cart(&self, product_id: &str, quantity: u32) {
        let mut server = self.server.lock().unwrap();
        let product = server.product(&ProductId::new(product_id)).unwrap();
        let id = server.next_id("ci");
        server.cart.push(CartItem {
            id: CartItemId::new(id),
            product_id: product.id.clone(),
            quantity: shopfront_core::Quantity::new(quantity).unwrap(),
            product,
            user_id: None,
            created_at: None,
            updated_at: None,
        });
    }

    async fn hold(&self) {
        if let Some(gate) = &self.gate {
            let (tx, rx) = oneshot::channel();
            gate.held.lock().unwrap().push(tx);
            gate.started.notify_one();
            let _ = rx.await;
        }
    }
}

impl CartBackend for FakeBackend {
    async fn list_cart(&self) -> Result<Vec<CartItem>, ApiError> {
        let items = {
            let mut server = self.server.lock().unwrap();
            server.call("list_cart")?;
            server.cart.clone()
        };
        self.hold().await;
        Ok(items)
    }

    async fn add_cart_item(&self, item: &NewCartItem) -> Result<CartItem, ApiError> {
        let mut server = self.server.lock().unwrap();
        server.call("add_cart_item")?;
        let product = server.product(&item.product_id)?;
        if let Some(existing) = server
            .cart
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            existing.quantity = shopfront_core::Quantity::clamped(
                i64::from(existing.quantity.get()) + i64::from(item.quantity.get()),
            );
            return Ok(existing.clone());
        }
        let id = server.next_id("ci");
        let line = CartItem {
            id: CartItemId::new(id),
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            product,
            user_id: None,
            created_at: None,
            updated_at: None,
        };
        server.cart.push(line.clone());
        Ok(line)
    }

    async fn update_cart_item(
        &self,
        id: &CartItemId,
        update: CartItemUpdate,
    ) -> Result<CartItem, ApiError> {
        let mut server = self.server.lock().unwrap();
        server.call("update_cart_item")?;
        let line = server
            .cart
            .iter_mut()
            .find(|line| &line.id == id)
            .ok_or_else(|| ApiError::NotFound(Some("Cart item not found".to_string())))?;
        line.quantity = update.quantity;
        Ok(line.clone())
    }

    async fn remove_cart_item(&self, id: &CartItemId) -> Result<(), ApiError> {
        let mut server = self.server.lock().unwrap();
        server.call("remove_cart_item")?;
        let before = server.cart.len();
        server.cart.retain(|line| &line.id != id);
        if server.cart.len() == before {
            return Err(ApiError::NotFound(Some("Cart item not found".to_string())));
        }
        Ok(())
    }

    async fn clear_cart(&self) -> Result<(), ApiError> {
        let mut server = self.server.lock().unwrap();
        server.call("clear_cart")?;
        server.cart.clear();
        Ok(())
    }
}

impl WishlistBackend for FakeBackend {
    async fn list_wishlist(&self) -> Result<Vec<WishlistItem>, ApiError> {
        let items = {
            let mut server = self.server.lock().unwrap();
            server.call("list_wishlist")?;
            server.wishlist.clone()
        };
        self.hold().await;
        Ok(items)
    }

    async fn add_wishlist_item(&self, item: &NewWishlistItem) -> Result<WishlistItem, ApiError> {
        let mut server = self.server.lock().unwrap();
        server.call("add_wishlist_item")?;
        let product = server.product(&item.product_id)?;
        if server.wishlist.iter().any(|w| w.product_id == item.product_id) {
            return Err(ApiError::from_response(
                StatusCode::BAD_REQUEST,
                r#"{"detail":"Product already in wishlist"}"#,
            ));
        }
        let id = server.next_id("wi");
        let entry = WishlistItem {
            id: WishlistItemId::new(id),
            product_id: item.product_id.clone(),
            product,
            user_id: None,
            created_at: None,
        };
        server.wishlist.push(entry.clone());
        Ok(entry)
    }

    async fn remove_wishlist_item(&self, id: &WishlistItemId) -> Result<(), ApiError> {
        let mut server = self.server.lock().unwrap();
        server.call("remove_wishlist_item")?;
        let before = server.wishlist.len();
        server.wishlist.retain(|w| &w.id != id);
        if server.wishlist.len() == before {
            return Err(ApiError::NotFound(Some("Wishlist item not found".to_string())));
        }
        Ok(())
    }

    async fn clear_wishlist(&self) -> Result<(), ApiError> {
        let mut server = self.server.lock().unwrap();
        server.call("clear_wishlist")?;
        server.wishlist.clear();
        Ok(())
    }
}
