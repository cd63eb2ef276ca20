// The authenticated request pipeline.
//
// Every outbound call passes through here exactly once per logical
// attempt: bearer attachment, envelope unwrapping, and refresh-on-401/403
// with a single-flight guarantee. Endpoint modules (auth, qr, plans) are
// implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::Error;
use crate::models::{ApiEnvelope, TokenPairDto};
use crate::token::{TokenPair, TokenStore};
use crate::transport::TransportConfig;

/// Session lifecycle as observed by the application shell.
///
/// `Expired` is broadcast exactly when a refresh exchange fails
/// terminally -- the shell surfaces a session-expired notice and routes
/// back to the sign-in screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    Active,
    Expired,
}

/// HTTP client for the liftops backend.
///
/// Attaches `Authorization: Bearer` to every call except the auth
/// endpoints, fails fast when no token exists, retries a 401/403 exactly
/// once after refreshing, and normalizes every failure into [`Error`].
/// Cheap to share behind an `Arc`; the token store and the refresh gate
/// are the only mutable state.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<TokenStore>,
    /// Single-flight refresh gate. Callers that hit an auth failure while
    /// a refresh is underway queue on this mutex; the generation check in
    /// [`refreshed_token`](Self::refreshed_token) keeps the exchange
    /// from running more than once per failure storm.
    refresh_gate: Mutex<()>,
    session_tx: watch::Sender<SessionState>,
}

impl ApiClient {
    /// Create a client from a transport config.
    pub fn new(
        base_url: Url,
        tokens: Arc<TokenStore>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, tokens))
    }

    /// Create a client with a pre-built `reqwest::Client` (used by tests).
    pub fn with_client(http: reqwest::Client, base_url: Url, tokens: Arc<TokenStore>) -> Self {
        let initial = if tokens.is_authenticated() {
            SessionState::Active
        } else {
            SessionState::SignedOut
        };
        let (session_tx, _) = watch::channel(initial);
        Self {
            http,
            base_url,
            tokens,
            refresh_gate: Mutex::new(()),
            session_tx,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Subscribe to session lifecycle changes.
    pub fn session_states(&self) -> watch::Receiver<SessionState> {
        self.session_tx.subscribe()
    }

    pub(crate) fn set_session_state(&self, state: SessionState) {
        let _ = self.session_tx.send(state);
    }

    // ── URL construction ─────────────────────────────────────────────

    /// Build a full URL for an API path (`maintenance-plans/3/reschedule`).
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}")).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let resp = self.dispatch(Method::GET, path, None::<&()>).await?;
        parse_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let resp = self.dispatch(Method::POST, path, Some(body)).await?;
        parse_response(resp).await
    }

    pub(crate) async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let resp = self.dispatch(Method::PATCH, path, Some(body)).await?;
        parse_response(resp).await
    }

    /// PATCH for operations whose response payload is irrelevant.
    pub(crate) async fn patch_ok(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        let resp = self.dispatch(Method::PATCH, path, Some(body)).await?;
        parse_response_ok(resp).await
    }

    /// The pipeline proper: attach bearer, dispatch, refresh-and-replay
    /// once on an auth failure. Returns the settled response; the typed
    /// wrappers above unwrap the envelope.
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.api_url(path)?;

        // Fail fast: a missing token cannot succeed server-side, so it
        // never reaches the network.
        let Some(access) = self.tokens.access_token() else {
            return Err(Error::Authentication {
                message: "no active session".into(),
            });
        };
        let sent_generation = self.tokens.generation();

        debug!(%method, %url, "dispatching request");
        let resp = self
            .send(method.clone(), url.clone(), body, Some(&access))
            .await?;

        let status = resp.status();
        if !is_auth_failure(status) {
            return Ok(resp);
        }

        trace!(%url, %status, "auth failure -- entering refresh gate");
        let access = self.refreshed_token(sent_generation).await?;

        // Replay exactly once with the refreshed token.
        let resp = self.send(method, url, body, Some(&access)).await?;
        let status = resp.status();
        if is_auth_failure(status) {
            // Still rejected after a refresh: surface, never loop.
            return Err(auth_failure_error(status));
        }
        Ok(resp)
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl Serialize + Sync)>,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response, Error> {
        let mut builder = self.http.request(method, url);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(b) = body {
            builder = builder.json(b);
        }
        builder.send().await.map_err(Error::Transport)
    }

    // ── Refresh coordination ─────────────────────────────────────────

    /// Obtain a token newer than `sent_generation`, refreshing if no other
    /// caller already has.
    ///
    /// N concurrent auth failures serialize on the gate; the first runs
    /// the exchange, the rest observe the bumped generation and replay
    /// with the stored token. When the exchange failed the store is empty
    /// and the waiters fail together without further network calls.
    async fn refreshed_token(&self, sent_generation: u64) -> Result<String, Error> {
        let _gate = self.refresh_gate.lock().await;

        if self.tokens.generation() != sent_generation {
            return self.tokens.access_token().ok_or(Error::SessionExpired);
        }
        self.refresh_exchange().await
    }

    /// Exchange the refresh token for a new pair. Attempted once per
    /// failure storm; a failed exchange is terminal for the session.
    async fn refresh_exchange(&self) -> Result<String, Error> {
        let Some(refresh) = self.tokens.refresh_token() else {
            return Err(self.terminate_session("no refresh token"));
        };

        let url = self.api_url("auth/refresh")?;
        debug!("refreshing access token");

        // Auth endpoints never carry a bearer header.
        let body = serde_json::json!({ "refreshToken": refresh.expose_secret() });
        let resp = match self.send(Method::POST, url, Some(&body), None).await {
            Ok(resp) => resp,
            Err(e) => {
                self.tokens.clear();
                return Err(e);
            }
        };

        let status = resp.status();
        if matches!(status.as_u16(), 400 | 401 | 403) {
            return Err(self.terminate_session("refresh token rejected"));
        }

        let pair: TokenPairDto = match parse_response(resp).await {
            Ok(pair) => pair,
            Err(e) => {
                self.tokens.clear();
                return Err(e);
            }
        };

        let access = pair.access_token.clone();
        self.tokens
            .replace(TokenPair::new(pair.access_token, pair.refresh_token));
        info!("token refresh succeeded");
        Ok(access)
    }

    /// Clear all credentials and broadcast session expiry.
    fn terminate_session(&self, reason: &str) -> Error {
        warn!(reason, "terminating session");
        self.tokens.clear();
        let _ = self.session_tx.send(SessionState::Expired);
        Error::SessionExpired
    }
}

// ── Response handling ────────────────────────────────────────────────

fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

fn auth_failure_error(status: StatusCode) -> Error {
    if status == StatusCode::FORBIDDEN {
        Error::Authorization {
            message: "insufficient permissions".into(),
        }
    } else {
        Error::Authentication {
            message: "access token rejected".into(),
        }
    }
}

/// Unwrap the `{ success, message, data, errors }` envelope, returning
/// `data` on success.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        return Err(classify_failure(status, &body));
    }

    let envelope: ApiEnvelope<T> =
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;

    if !envelope.success {
        return Err(Error::Api {
            message: envelope
                .message
                .unwrap_or_else(|| "backend reported failure".into()),
        });
    }

    envelope.data.ok_or_else(|| Error::Deserialization {
        message: "envelope succeeded but carried no data".into(),
        body,
    })
}

/// Like [`parse_response`] for operations whose payload is irrelevant.
pub(crate) async fn parse_response_ok(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        return Err(classify_failure(status, &body));
    }

    let envelope: ApiEnvelope<serde_json::Value> =
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })?;

    if envelope.success {
        Ok(())
    } else {
        Err(Error::Api {
            message: envelope
                .message
                .unwrap_or_else(|| "backend reported failure".into()),
        })
    }
}

/// Map a non-2xx response onto the error taxonomy, pulling the message
/// and field errors out of the envelope when the body carries one.
fn classify_failure(status: StatusCode, body: &str) -> Error {
    let (message, errors) = match serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body) {
        Ok(env) => (
            env.message.unwrap_or_else(|| format!("HTTP {status}")),
            env.errors,
        ),
        Err(_) => (format!("HTTP {status}: {}", preview(body)), Vec::new()),
    };

    match status.as_u16() {
        401 => Error::Authentication { message },
        403 => Error::Authorization { message },
        400 | 422 => Error::Validation { message, errors },
        404 => Error::NotFound { message },
        500..=599 => Error::Server {
            status: status.as_u16(),
            message,
        },
        _ => Error::Api { message },
    }
}

fn preview(body: &str) -> &str {
    if body.len() <= 200 {
        body
    } else {
        body.get(..200).unwrap_or(body)
    }
}
