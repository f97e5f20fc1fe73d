//! Account roles.

use serde::{Deserialize, Serialize};

/// The role attached to an identity.
///
/// The backend spells these `"user"` and `"admin"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// An ordinary shopper.
    #[default]
    #[serde(rename = "user")]
    Customer,
    /// Has access to the admin dashboard and `/api/v1/admin/*`.
    #[serde(rename = "admin")]
    Administrator,
}

impl Role {
    /// Whether this role grants administrator access.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Administrator)
    }
}
