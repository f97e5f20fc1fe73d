//! Orders.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, OrderStatus, ProductId, Quantity, UserId};

/// One product line on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderLine>,
    pub shipping_address: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity.get())).sum()
    }
}

/// `POST /api/v1/orders/` body.
///
/// `total_amount` is the client's display total; the server recomputes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub items: Vec<OrderLine>,
    pub shipping_address: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

/// Admin order update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
}
