// ── Auth service ──
//
// Login, session restoration, and session-lifecycle observation. The
// typed claims parser is the authority on identity and role: a token
// whose payload does not decode leaves the user signed out (fails
// closed), regardless of what the login response body claimed.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, warn};

use liftops_api::{ApiClient, SessionState, decode_access_claims};

use crate::error::CoreError;
use crate::model::Session;

pub struct AuthService {
    api: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Authenticate and derive the session from the access token's claims.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Session, CoreError> {
        let login = self.api.login(username, password).await?;

        match decode_access_claims(&login.access_token) {
            Ok(claims) => {
                let session = Session::from_claims(&claims);
                debug!(username = %session.username, role = ?session.role, "session established");
                Ok(session)
            }
            Err(e) => {
                // A token we cannot type is a token we do not trust.
                warn!(error = %e, "discarding undecodable access token");
                self.api.logout();
                Err(e.into())
            }
        }
    }

    /// Rebuild the session from persisted tokens after a reload.
    ///
    /// Returns `None` when signed out; an undecodable persisted token is
    /// discarded rather than trusted.
    pub fn restore(&self) -> Option<Session> {
        let access = self.api.token_store().access_token()?;
        match decode_access_claims(&access) {
            Ok(claims) => Some(Session::from_claims(&claims)),
            Err(e) => {
                warn!(error = %e, "persisted token undecodable -- signing out");
                self.api.logout();
                None
            }
        }
    }

    /// Drop credentials locally.
    pub fn logout(&self) {
        self.api.logout();
    }

    /// Observe session lifecycle changes (`Expired` means the refresh
    /// exchange failed terminally and the shell must route to sign-in).
    pub fn session_states(&self) -> watch::Receiver<SessionState> {
        self.api.session_states()
    }
}
