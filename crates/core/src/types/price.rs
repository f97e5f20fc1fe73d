//! Type-safe price representation using decimal arithmetic.
//!
//! The backend sends prices as JSON numbers. They are decoded straight into a
//! [`Decimal`] so that display totals (`price * quantity`, summed) never pick
//! up binary floating point drift.

use core::fmt;
use core::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Quantity;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// The amount was below zero.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative price in the store currency.
///
/// Decoding goes through [`TryFrom<Decimal>`], so a negative amount on the
/// wire is a deserialization error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "WireAmount", into = "WireAmount")]
pub struct Price(Decimal);

/// A price as the backend encodes it: a bare JSON number.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct WireAmount(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, returning `None` for negative amounts.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (!amount.is_sign_negative() || amount.is_zero()).then_some(Self(amount))
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// `self * quantity`, the cost of one line.
    #[must_use]
    pub fn line_total(self, quantity: Quantity) -> Self {
        Self(self.0 * Decimal::from(quantity.get()))
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount).ok_or(PriceError::Negative(amount))
    }
}

impl TryFrom<WireAmount> for Price {
    type Error = PriceError;

    fn try_from(wire: WireAmount) -> Result<Self, Self::Error> {
        Self::try_from(wire.0)
    }
}

impl From<Price> for WireAmount {
    fn from(price: Price) -> Self {
        Self(price.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|p| p.0).sum())
    }
}
