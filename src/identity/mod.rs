//! Identity of the signed-in user.
//!
//! Authentication itself happens outside this service. An [`IdentityProvider`]
//! turns an incoming request into an [`Identity`] and answers whether that
//! identity is a site administrator.

mod header;

pub use header::HeaderIdentityProvider;

use async_trait::async_trait;
use axum::http::request::Parts;
use std::fmt;

/// Opaque, email-equivalent user identifier.
///
/// Normalized to trimmed lowercase so whitelist lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Identity(trimmed.to_lowercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The authenticated identity behind a request, if any.
    async fn current_identity(&self, parts: &Parts) -> Option<Identity>;

    async fn is_admin(&self, identity: &Identity) -> bool;

    /// Link that signs the user out and then sends them to `path`.
    fn logout_url(&self, path: &str) -> String;
}
