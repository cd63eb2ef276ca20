// Token storage for the request pipeline.
//
// Holds the current access/refresh pair and a generation counter that the
// pipeline uses to coordinate single-flight refresh: a request records the
// generation it was sent with, and on an auth failure only refreshes if no
// other caller has moved the generation in the meantime.

use std::path::PathBuf;
use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// An access/refresh token pair. Always replaced as a unit.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: SecretString,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: SecretString::from(refresh.into()),
        }
    }
}

/// On-disk shape of the persisted pair. Plain strings -- the file lives
/// under the platform data dir with user-only visibility.
#[derive(Serialize, Deserialize)]
struct PersistedTokens {
    access: String,
    refresh: String,
}

struct TokenState {
    tokens: Option<TokenPair>,
    generation: u64,
}

/// Process-wide token store.
///
/// Owned and exclusively mutated by the pipeline; injectable so tests can
/// run isolated instances instead of sharing module-level state. When
/// constructed with a file path the pair survives restarts: every
/// successful replace rewrites the file, `clear` removes it.
pub struct TokenStore {
    state: RwLock<TokenState>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// A store with no persistence. Starts empty.
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(TokenState {
                tokens: None,
                generation: 0,
            }),
            path: None,
        }
    }

    /// A store backed by a JSON file. Loads any persisted pair; an
    /// unreadable or malformed file is treated as signed-out.
    pub fn with_file(path: PathBuf) -> Self {
        let tokens = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<PersistedTokens>(&raw) {
                Ok(p) => {
                    debug!("loaded persisted tokens");
                    Some(TokenPair::new(p.access, p.refresh))
                }
                Err(e) => {
                    warn!(error = %e, "ignoring malformed token file");
                    None
                }
            },
            Err(_) => None,
        };

        Self {
            state: RwLock::new(TokenState {
                tokens,
                generation: 0,
            }),
            path: Some(path),
        }
    }

    /// The current access token, if signed in.
    pub fn access_token(&self) -> Option<String> {
        let state = self.state.read().expect("token lock poisoned");
        state.tokens.as_ref().map(|t| t.access.clone())
    }

    /// The current refresh token, if signed in.
    pub fn refresh_token(&self) -> Option<SecretString> {
        let state = self.state.read().expect("token lock poisoned");
        state.tokens.as_ref().map(|t| t.refresh.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        let state = self.state.read().expect("token lock poisoned");
        state.tokens.is_some()
    }

    /// Generation counter, bumped on every replace or clear.
    pub fn generation(&self) -> u64 {
        self.state.read().expect("token lock poisoned").generation
    }

    /// Atomically install a new pair and bump the generation.
    pub fn replace(&self, pair: TokenPair) {
        self.persist(&pair);
        let mut state = self.state.write().expect("token lock poisoned");
        state.tokens = Some(pair);
        state.generation += 1;
    }

    /// Drop the pair (memory and disk) and bump the generation.
    pub fn clear(&self) {
        if let Some(ref path) = self.path {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(error = %e, "failed to remove token file");
                }
            }
        }
        let mut state = self.state.write().expect("token lock poisoned");
        state.tokens = None;
        state.generation += 1;
    }

    fn persist(&self, pair: &TokenPair) {
        let Some(ref path) = self.path else { return };
        let persisted = PersistedTokens {
            access: pair.access.clone(),
            refresh: pair.refresh.expose_secret().to_owned(),
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(error = %e, "failed to create token dir");
                return;
            }
        }
        match serde_json::to_string(&persisted) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    warn!(error = %e, "failed to persist tokens");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize tokens"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_in_memory() {
        let store = TokenStore::in_memory();
        assert!(!store.is_authenticated());
        assert!(store.access_token().is_none());
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn replace_bumps_generation() {
        let store = TokenStore::in_memory();
        store.replace(TokenPair::new("a1", "r1"));
        assert_eq!(store.generation(), 1);
        assert_eq!(store.access_token().as_deref(), Some("a1"));

        store.replace(TokenPair::new("a2", "r2"));
        assert_eq!(store.generation(), 2);
        assert_eq!(store.access_token().as_deref(), Some("a2"));
    }

    #[test]
    fn clear_drops_tokens_and_bumps_generation() {
        let store = TokenStore::in_memory();
        store.replace(TokenPair::new("a1", "r1"));
        store.clear();
        assert!(!store.is_authenticated());
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        let store = TokenStore::with_file(path.clone());
        store.replace(TokenPair::new("a1", "r1"));
        assert!(path.exists());

        let reloaded = TokenStore::with_file(path.clone());
        assert_eq!(reloaded.access_token().as_deref(), Some("a1"));
        assert!(reloaded.is_authenticated());
    }

    #[test]
    fn clear_removes_persisted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        let store = TokenStore::with_file(path.clone());
        store.replace(TokenPair::new("a1", "r1"));
        store.clear();
        assert!(!path.exists());

        let reloaded = TokenStore::with_file(path);
        assert!(!reloaded.is_authenticated());
    }

    #[test]
    fn malformed_file_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "not json").unwrap();

        let store = TokenStore::with_file(path);
        assert!(!store.is_authenticated());
    }
}
