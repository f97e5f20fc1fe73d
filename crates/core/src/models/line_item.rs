//! Cart and wishlist line items.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::types::{CartItemId, Price, ProductId, Quantity, UserId, WishlistItemId};

/// Behavior shared by every line item kind.
pub trait LineItem {
    /// The embedded product snapshot.
    fn product(&self) -> &Product;

    /// How many units this line contributes to a collection count.
    fn units(&self) -> u32;
}

/// One line of the shopper's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub product: Product,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl CartItem {
    /// Product price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.line_total(self.quantity)
    }
}

impl LineItem for CartItem {
    fn product(&self) -> &Product {
        &self.product
    }

    fn units(&self) -> u32 {
        self.quantity.get()
    }
}

/// One saved product on the shopper's wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub product: Product,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl LineItem for WishlistItem {
    fn product(&self) -> &Product {
        &self.product
    }

    fn units(&self) -> u32 {
        1
    }
}

/// `POST /api/v1/cart/` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// `PUT /api/v1/cart/{id}` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemUpdate {
    pub quantity: Quantity,
}

/// `POST /api/v1/wishlist/` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWishlistItem {
    pub product_id: ProductId,
}
