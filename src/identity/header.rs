use super::{Identity, IdentityProvider};
use crate::config::IdentityConfig;
use async_trait::async_trait;
use axum::http::{HeaderName, request::Parts};
use std::collections::HashSet;
use url::form_urlencoded;

/// Reads the identity from a header set by an authenticating reverse proxy.
///
/// The header must only be reachable through that proxy; the service trusts it
/// verbatim.
#[derive(Debug, Clone)]
pub struct HeaderIdentityProvider {
    header: HeaderName,
    admins: HashSet<Identity>,
    logout_url: String,
    logout_redirect_param: String,
}

impl HeaderIdentityProvider {
    pub fn new(cfg: &IdentityConfig) -> Result<Self, String> {
        let header = HeaderName::from_bytes(cfg.header.trim().to_ascii_lowercase().as_bytes())
            .map_err(|e| format!("invalid identity.header {:?}: {e}", cfg.header))?;
        let admins = cfg
            .admin_emails
            .iter()
            .filter_map(|email| Identity::parse(email))
            .collect();

        Ok(Self {
            header,
            admins,
            logout_url: cfg.logout_url.clone(),
            logout_redirect_param: cfg.logout_redirect_param.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HeaderIdentityProvider {
    async fn current_identity(&self, parts: &Parts) -> Option<Identity> {
        parts
            .headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .and_then(Identity::parse)
    }

    async fn is_admin(&self, identity: &Identity) -> bool {
        self.admins.contains(identity)
    }

    fn logout_url(&self, path: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(&self.logout_redirect_param, path)
            .finish();
        let separator = if self.logout_url.contains('?') { '&' } else { '?' };
        format!("{}{separator}{query}", self.logout_url)
    }
}
