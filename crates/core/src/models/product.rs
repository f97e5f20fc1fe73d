//! Catalog records. Server-owned and read-only on the client.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId, Quantity};

/// Stock level at or below which a product is shown as running low.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// A product snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category_id: CategoryId,
    pub stock_quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

const fn default_active() -> bool {
    true
}

/// Display-only stock classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    InStock(u32),
    LowStock(u32),
    OutOfStock,
}

impl Product {
    /// Classify the stock level for display.
    #[must_use]
    pub const fn availability(&self) -> Availability {
        match self.stock_quantity {
            0 => Availability::OutOfStock,
            n if n <= LOW_STOCK_THRESHOLD => Availability::LowStock(n),
            n => Availability::InStock(n),
        }
    }

    /// The largest quantity a quantity picker should offer, or `None` when out
    /// of stock. The server still makes the final stock decision.
    #[must_use]
    pub fn max_orderable(&self) -> Option<Quantity> {
        Quantity::new(self.stock_quantity).ok()
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Product creation payload (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category_id: CategoryId,
    pub stock_quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub is_active: bool,
}

/// Partial product update (admin).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Category creation payload (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial category update (admin).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
