//! Wire records exchanged with the storefront backend.
//!
//! Field names follow the backend's JSON exactly. Timestamps are naive UTC
//! because that is what the backend emits.

pub mod identity;
pub mod line_item;
pub mod order;
pub mod product;

pub use identity::{AccessToken, Identity, LoginForm, NewUser, UserUpdate};
pub use line_item::{CartItem, CartItemUpdate, LineItem, NewCartItem, NewWishlistItem, WishlistItem};
pub use order::{NewOrder, Order, OrderLine, OrderUpdate};
pub use product::{
    Availability, Category, CategoryUpdate, NewCategory, NewProduct, Product, ProductUpdate,
};

use serde::{Deserialize, Serialize};

/// Plain acknowledgement body returned by delete and cancel endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Error envelope the backend returns on failure.
///
/// `detail` is optional so that bodies from proxies or validation layers that
/// do not follow the envelope still decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default, deserialize_with = "detail_as_text")]
    pub detail: Option<String>,
}

/// Validation errors arrive with `detail` as an array of objects; keep only
/// string details, which are the human-readable ones.
fn detail_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}
