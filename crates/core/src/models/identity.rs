//! Authenticated identity and auth payloads.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{Email, Role, UserId};

/// The authenticated user record (`GET /api/v1/auth/me`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
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

impl Identity {
    /// Whether this identity may use administrator-only views.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Bearer token returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

/// OAuth2 password-grant form posted to the login endpoint.
///
/// The backend names the field `username` but expects the email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: Email,
    pub username: String,
    pub full_name: String,
    pub password: String,
}

/// Partial user update (admin).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_backend_json() {
        let json = r#"{
            "id": "65f1",
            "email": "ada@shop.test",
            "username": "ada",
            "full_name": "Ada Lovelace",
            "role": "admin",
            "is_active": true,
            "created_at": "2024-03-01T10:15:30.123456",
            "updated_at": "2024-03-01T10:15:30.123456"
        }"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert!(identity.is_admin());
        assert_eq!(identity.email.as_str(), "ada@shop.test");
        assert!(identity.created_at.is_some());
    }

    #[test]
    fn test_identity_defaults_to_customer() {
        let json = r#"{"id":"1","email":"a@b.c","username":"a","full_name":"A"}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.role, Role::Customer);
        assert!(identity.is_active);
    }

    #[test]
    fn test_user_update_omits_unset_fields() {
        let update = UserUpdate {
            full_name: Some("New Name".to_string()),
            ..UserUpdate::default()
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"full_name":"New Name"}"#
        );
    }
}
