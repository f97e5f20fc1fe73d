//! Authentication endpoints.

use secrecy::{ExposeSecret, SecretString};
use shopfront_core::{AccessToken, Email, Identity, LoginForm, NewUser};
use tracing::instrument;

use super::{ApiClient, endpoints};
use crate::error::ApiError;

impl ApiClient {
    /// Exchange email and password for an access token.
    ///
    /// Does not store the token; see [`ApiClient::set_token`].
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials, or any transport error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AccessToken, ApiError> {
        let form = LoginForm {
            username: email.as_str().to_string(),
            password: password.expose_secret().to_string(),
        };
        self.post_form(endpoints::AUTH_LOGIN, &form).await
    }

    /// Create an account. The new account is not logged in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the server detail (e.g. "Email already
    /// registered") or any transport error.
    #[instrument(skip(self, user), fields(email = %user.email, username = %user.username))]
    pub async fn register(&self, user: &NewUser) -> Result<Identity, ApiError> {
        self.post(endpoints::AUTH_REGISTER, user).await
    }

    /// Fetch the identity the current token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the token is missing or expired.
    #[instrument(skip(self))]
    pub async fn current_identity(&self) -> Result<Identity, ApiError> {
        self.get(endpoints::AUTH_ME).await
    }
}
