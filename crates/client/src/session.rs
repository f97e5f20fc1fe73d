//! Session and identity state.
//!
//! The identity lives in a `watch` channel: one writer (the session), any
//! number of observers. The bearer token lives in the [`ApiClient`]. The two
//! are kept in step: whenever the identity is cleared the token is too.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use shopfront_core::{Email, Identity, NewUser};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::notice::Notices;

const LOGIN_OK: &str = "Login successful!";
const LOGIN_FAILED: &str = "Login failed";
const REGISTER_OK: &str = "Registration successful! Please login.";
const REGISTER_FAILED: &str = "Registration failed";
const LOGGED_OUT: &str = "Logged out successfully";
const SESSION_EXPIRED: &str = "Your session has expired. Please login again.";
const REFRESH_FAILED: &str = "Failed to refresh session";

/// Current identity, or none.
#[derive(Clone)]
pub struct Session {
    api: ApiClient,
    notices: Notices,
    identity: Arc<watch::Sender<Option<Identity>>>,
}

impl Session {
    #[must_use]
    pub fn new(api: ApiClient, notices: Notices) -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            api,
            notices,
            identity: Arc::new(identity),
        }
    }

    /// The current identity.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.borrow().is_some()
    }

    /// Whether the current identity is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.identity.borrow().as_ref().is_some_and(Identity::is_admin)
    }

    /// Observe identity changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }

    fn set(&self, identity: Option<Identity>) {
        self.identity.send_replace(identity);
    }

    async fn clear(&self) {
        self.api.set_token(None).await;
        self.set(None);
    }

    /// Log in with email and password.
    ///
    /// A malformed email is rejected locally without a request.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn login(&self, email: &str, password: &SecretString) -> bool {
        let email = match Email::parse(email) {
            Ok(email) => email,
            Err(err) => {
                self.notices.error(err.to_string());
                return false;
            }
        };

        let token = match self.api.login(&email, password).await {
            Ok(token) => token,
            Err(err) => {
                self.notices.error(err.user_message(LOGIN_FAILED));
                return false;
            }
        };
        self.api
            .set_token(Some(SecretString::from(token.access_token)))
            .await;

        match self.api.current_identity().await {
            Ok(identity) => {
                info!(user_id = %identity.id, role = ?identity.role, "Logged in");
                self.set(Some(identity));
                self.notices.success(LOGIN_OK);
                true
            }
            Err(err) => {
                self.clear().await;
                self.notices.error(err.user_message(LOGIN_FAILED));
                false
            }
        }
    }

    /// Create an account. Does not log in.
    #[instrument(skip_all, fields(email = %email, username = %username))]
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        full_name: &str,
        password: &SecretString,
    ) -> bool {
        let email = match Email::parse(email) {
            Ok(email) => email,
            Err(err) => {
                self.notices.error(err.to_string());
                return false;
            }
        };
        let user = NewUser {
            email,
            username: username.trim().to_string(),
            full_name: full_name.trim().to_string(),
            password: password.expose_secret().to_string(),
        };

        match self.api.register(&user).await {
            Ok(identity) => {
                info!(user_id = %identity.id, "Registered");
                self.notices.success(REGISTER_OK);
                true
            }
            Err(err) => {
                self.notices.error(err.user_message(REGISTER_FAILED));
                false
            }
        }
    }

    /// Resume a session from a previously issued token.
    #[instrument(skip_all)]
    pub async fn restore(&self, token: SecretString) -> bool {
        self.api.set_token(Some(token)).await;
        match self.api.current_identity().await {
            Ok(identity) => {
                info!(user_id = %identity.id, "Session restored");
                self.set(Some(identity));
                true
            }
            Err(err) => {
                warn!(error = %err, "Stored token rejected");
                self.clear().await;
                if err.is_unauthorized() {
                    self.notices.info(SESSION_EXPIRED);
                } else {
                    self.notices.error(err.user_message(REFRESH_FAILED));
                }
                false
            }
        }
    }

    /// Re-read the identity. A `401` means the token expired and ends the
    /// session; other failures keep the current identity.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> bool {
        if !self.api.has_token().await {
            self.set(None);
            return false;
        }
        match self.api.current_identity().await {
            Ok(identity) => {
                self.set(Some(identity));
                true
            }
            Err(err) if err.is_unauthorized() => {
                info!("Token expired, ending session");
                self.clear().await;
                self.notices.info(SESSION_EXPIRED);
                false
            }
            Err(err) => {
                self.notices.error(err.user_message(REFRESH_FAILED));
                false
            }
        }
    }

    pub async fn logout(&self) {
        let was_authenticated = self.is_authenticated();
        self.clear().await;
        if was_authenticated {
            info!("Logged out");
            self.notices.info(LOGGED_OUT);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::notice::NoticeLevel;

    fn session() -> Session {
        // Nothing listens here; tests only exercise paths that send no request.
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        Session::new(ApiClient::new(&config).unwrap(), Notices::new())
    }

    #[tokio::test]
    async fn test_starts_anonymous() {
        let session = session();
        assert!(session.identity().is_none());
        assert!(!session.is_authenticated());
        assert!(!session.is_admin());
    }

    #[tokio::test]
    async fn test_malformed_email_rejected_locally() {
        let session = session();
        let mut rx = session.notices.subscribe();
        let password = SecretString::from("pw");

        assert!(!session.login("not-an-email", &password).await);
        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "email must contain exactly one @ symbol");
        assert!(!session.api.has_token().await);
    }

    #[tokio::test]
    async fn test_refresh_without_token_is_anonymous() {
        let session = session();
        assert!(!session.refresh().await);
        assert!(session.identity().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_token_and_notifies_observers() {
        let session = session();
        let mut observer = session.subscribe();
        session.api.set_token(Some(SecretString::from("t"))).await;
        session.set(Some(crate::collection::fake::identity("u1")));
        assert!(observer.has_changed().unwrap());
        let _ = observer.borrow_and_update();

        session.logout().await;
        assert!(observer.has_changed().unwrap());
        assert!(observer.borrow_and_update().is_none());
        assert!(!session.api.has_token().await);
    }
}
