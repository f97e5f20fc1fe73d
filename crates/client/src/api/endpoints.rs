//! Endpoint paths, relative to the configured base URL.
//!
//! Paths have no leading slash so a base URL with a path prefix
//! (`https://host/backend/`) is preserved when joining.

use shopfront_core::{CartItemId, CategoryId, OrderId, ProductId, UserId, WishlistItemId};

pub const AUTH_LOGIN: &str = "api/v1/auth/login";
pub const AUTH_REGISTER: &str = "api/v1/auth/register";
pub const AUTH_ME: &str = "api/v1/auth/me";

pub const PRODUCTS: &str = "api/v1/products/";
pub const CATEGORIES: &str = "api/v1/products/categories";

pub const CART: &str = "api/v1/cart/";
pub const WISHLIST: &str = "api/v1/wishlist/";
pub const ORDERS: &str = "api/v1/orders/";

pub const ADMIN_USERS: &str = "api/v1/admin/users";
pub const ADMIN_PRODUCTS: &str = "api/v1/admin/products";
pub const ADMIN_CATEGORIES: &str = "api/v1/admin/categories";
pub const ADMIN_ORDERS: &str = "api/v1/admin/orders";

fn under(prefix: &str, id: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        urlencoding::encode(id)
    )
}

#[must_use]
pub fn product(id: &ProductId) -> String {
    under(PRODUCTS, id.as_str())
}

#[must_use]
pub fn category(id: &CategoryId) -> String {
    under(CATEGORIES, id.as_str())
}

#[must_use]
pub fn cart_item(id: &CartItemId) -> String {
    under(CART, id.as_str())
}

#[must_use]
pub fn wishlist_item(id: &WishlistItemId) -> String {
    under(WISHLIST, id.as_str())
}

#[must_use]
pub fn order(id: &OrderId) -> String {
    under(ORDERS, id.as_str())
}

#[must_use]
pub fn order_cancel(id: &OrderId) -> String {
    format!("{}/cancel", order(id))
}

#[must_use]
pub fn admin_user(id: &UserId) -> String {
    under(ADMIN_USERS, id.as_str())
}

#[must_use]
pub fn admin_product(id: &ProductId) -> String {
    under(ADMIN_PRODUCTS, id.as_str())
}

#[must_use]
pub fn admin_category(id: &CategoryId) -> String {
    under(ADMIN_CATEGORIES, id.as_str())
}

#[must_use]
pub fn admin_order(id: &OrderId) -> String {
    under(ADMIN_ORDERS, id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_paths() {
        assert_eq!(cart_item(&CartItemId::new("c1")), "api/v1/cart/c1");
        assert_eq!(wishlist_item(&WishlistItemId::new("w1")), "api/v1/wishlist/w1");
        assert_eq!(product(&ProductId::new("p1")), "api/v1/products/p1");
        assert_eq!(category(&CategoryId::new("k1")), "api/v1/products/categories/k1");
        assert_eq!(order_cancel(&OrderId::new("o1")), "api/v1/orders/o1/cancel");
        assert_eq!(admin_user(&UserId::new("u1")), "api/v1/admin/users/u1");
    }

    #[test]
    fn test_ids_are_encoded_as_one_segment() {
        assert_eq!(product(&ProductId::new("../admin")), "api/v1/products/..%2Fadmin");
    }
}
