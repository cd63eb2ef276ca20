// Auth endpoints: login and sign-out.
//
// Both bypass the authenticated pipeline -- the contract strips any
// bearer header from `auth/login` and `auth/refresh`, so these calls go
// through the raw send path with no token attached. The refresh exchange
// itself lives in `client.rs` next to the single-flight gate.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, info};

use crate::client::{ApiClient, SessionState, parse_response};
use crate::error::Error;
use crate::models::LoginResponse;
use crate::token::TokenPair;

impl ApiClient {
    /// Authenticate with username/password.
    ///
    /// On success the returned pair is installed in the token store
    /// (persisted when the store is file-backed) and the session state
    /// moves to `Active`.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, Error> {
        let url = self.api_url("auth/login")?;
        debug!(%username, "logging in");

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self.send(Method::POST, url, Some(&body), None).await?;
        let login: LoginResponse = parse_response(resp).await?;

        self.token_store().replace(TokenPair::new(
            login.access_token.clone(),
            login.refresh_token.clone(),
        ));
        self.set_session_state(SessionState::Active);
        info!("login successful");
        Ok(login)
    }

    /// End the session locally: drop both tokens (and the persisted file).
    ///
    /// The backend invalidates refresh tokens by expiry; there is no
    /// server-side logout endpoint in the contract.
    pub fn logout(&self) {
        self.token_store().clear();
        self.set_session_state(SessionState::SignedOut);
        debug!("signed out");
    }
}
