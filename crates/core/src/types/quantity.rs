//! Line item quantity.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantities start at one; removal is a separate operation.
    #[error("quantity must be at least 1")]
    Zero,
}

/// A cart line quantity. Always at least one.
///
/// ```
/// use shopfront_core::Quantity;
///
/// assert_eq!(Quantity::clamped(0).get(), 1);
/// assert_eq!(Quantity::clamped(-4).get(), 1);
/// assert_eq!(Quantity::clamped(3).get(), 3);
/// assert!(Quantity::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(1);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] for `0`.
    pub const fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 {
            Err(QuantityError::Zero)
        } else {
            Ok(Self(value))
        }
    }

    /// Create a quantity from any integer, clamping into `1..=u32::MAX`.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        Self(u32::try_from(value.max(1)).unwrap_or(u32::MAX))
    }

    /// The quantity as an integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// One more, saturating at `u32::MAX`.
    #[must_use]
    pub const fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// One fewer, never below one.
    #[must_use]
    pub fn decremented(self) -> Self {
        Self::clamped(i64::from(self.0) - 1)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_stops_at_one() {
        let q = Quantity::new(2).unwrap();
        assert_eq!(q.decremented().get(), 1);
        assert_eq!(q.decremented().decremented().get(), 1);
    }

    #[test]
    fn test_clamped_large_value_saturates() {
        assert_eq!(Quantity::clamped(i64::MAX).get(), u32::MAX);
    }

    #[test]
    fn test_zero_rejected_on_the_wire() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("4").unwrap().get(), 4);
        assert_eq!(serde_json::to_string(&Quantity::ONE).unwrap(), "1");
    }
}
