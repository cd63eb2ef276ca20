//! Async HTTP client for the liftops elevator-maintenance backend.
//!
//! The centerpiece is the authenticated request pipeline
//! ([`ApiClient`]): bearer attachment, fail-fast when signed out,
//! single-flight token refresh with a retry-once replay, and
//! normalization of every failure into the typed [`Error`] taxonomy.
//! Domain rules (plan lifecycle, conflict checking, QR elevator binding)
//! live in `liftops-core` on top of this crate.

pub mod claims;
pub mod client;
pub mod error;
pub mod models;
pub mod token;
pub mod transport;

mod auth;
mod plans;
mod qr;

pub use claims::{AccessClaims, RoleClaim, decode_access_claims};
pub use client::{ApiClient, SessionState};
pub use error::{Error, ErrorKind};
pub use token::{TokenPair, TokenStore};
pub use transport::{TlsMode, TransportConfig};
