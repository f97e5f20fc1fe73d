//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod quantity;
pub mod role;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use quantity::{Quantity, QuantityError};
pub use role::Role;
pub use status::{OrderStatus, UnknownStatus};
