//! Order status.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Order lifecycle status, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Only pending orders can be cancelled by the shopper.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The backend's spelling of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown order status.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown order status: {0} (expected pending, confirmed, shipped, delivered or cancelled)")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}
