//! Shared configuration for liftops front-ends.
//!
//! TOML profiles (one per backend environment), credential resolution
//! (env + keyring + plaintext), token persistence paths, and translation
//! to `liftops_api::TransportConfig`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use liftops_api::{TlsMode, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("unknown profile '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named explicitly.
    pub default_profile: Option<String>,

    /// Global defaults, overridable per profile.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles (e.g. "production", "staging").
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name, falling back to `default_profile`.
    pub fn profile<'a>(
        &'a self,
        name: Option<&'a str>,
    ) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: "<none>".into(),
            })?;
        let profile = self
            .profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })?;
        Ok((name, profile))
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g. "https://api.liftops.example").
    pub backend: String,

    /// Sign-in username.
    pub username: Option<String>,

    /// Sign-in password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_file("config.toml")
}

/// Resolve the token persistence path for a profile. Tokens outlive the
/// process so a restart resumes the session without re-authenticating.
pub fn token_path(profile_name: &str) -> PathBuf {
    project_file(&format!("tokens-{profile_name}.json"))
}

fn project_file(file: &str) -> PathBuf {
    ProjectDirs::from("com", "liftops", "liftops").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push(file);
            p
        },
        |dirs| dirs.config_dir().join(file),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("liftops");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("LIFTOPS_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve sign-in credentials for a profile.
///
/// Username: profile, then `LIFTOPS_USERNAME`. Password, in order:
/// `LIFTOPS_PASSWORD` env var, system keyring, plaintext in the config.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("LIFTOPS_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    if let Ok(pw) = std::env::var("LIFTOPS_PASSWORD") {
        return Ok((username, SecretString::from(pw)));
    }

    if let Ok(entry) = keyring::Entry::new("liftops", &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok((username, SecretString::from(pw)));
        }
    }

    if let Some(ref pw) = profile.password {
        return Ok((username, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a password in the system keyring for a profile.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new("liftops", &format!("{profile_name}/password"))
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

// ── Translation to transport settings ───────────────────────────────

/// Build the backend base URL and transport settings from a profile.
pub fn profile_to_transport(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<(url::Url, TransportConfig), ConfigError> {
    let url: url::Url = profile
        .backend
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "backend".into(),
            reason: format!("invalid URL: {}", profile.backend),
        })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok((url, TransportConfig { tls, timeout }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Config {
        toml::from_str(
            r#"
            default_profile = "prod"

            [defaults]
            timeout = 20

            [profiles.prod]
            backend = "https://api.liftops.example"
            username = "ops.demir"

            [profiles.lab]
            backend = "https://lab.liftops.example"
            insecure = true
            timeout = 5
            "#,
        )
        .unwrap()
    }

    #[test]
    fn default_profile_is_used_when_unnamed() {
        let cfg = sample();
        let (name, profile) = cfg.profile(None).unwrap();
        assert_eq!(name, "prod");
        assert_eq!(profile.backend, "https://api.liftops.example");
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = sample();
        assert!(matches!(
            cfg.profile(Some("nope")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn profile_overrides_beat_defaults() {
        let cfg = sample();
        let (_, lab) = cfg.profile(Some("lab")).unwrap();

        let (url, transport) = profile_to_transport(lab, &cfg.defaults).unwrap();
        assert_eq!(url.as_str(), "https://lab.liftops.example/");
        assert_eq!(transport.timeout, Duration::from_secs(5));
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn defaults_fill_profile_gaps() {
        let cfg = sample();
        let (_, prod) = cfg.profile(Some("prod")).unwrap();

        let (_, transport) = profile_to_transport(prod, &cfg.defaults).unwrap();
        assert_eq!(transport.timeout, Duration::from_secs(20));
        assert!(matches!(transport.tls, TlsMode::System));
    }

    #[test]
    fn invalid_backend_url_is_rejected() {
        let profile = Profile {
            backend: "not a url".into(),
            username: None,
            password: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        };
        assert!(matches!(
            profile_to_transport(&profile, &Defaults::default()),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn token_paths_are_per_profile() {
        assert_ne!(token_path("prod"), token_path("lab"));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = sample();
        let serialized = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(back.default_profile.as_deref(), Some("prod"));
        assert_eq!(back.profiles.len(), 2);
    }
}
