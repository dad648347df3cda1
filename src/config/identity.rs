use serde::{Deserialize, Serialize};

/// Settings for the trusted-header identity provider.
///
/// The service sits behind an authenticating proxy which forwards the
/// signed-in user's email in `header`. Site admins are listed explicitly.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
    /// Request header carrying the authenticated email.
    /// TOML: `identity.header`. Default: `x-auth-request-email`.
    #[serde(default = "default_header")]
    pub header: String,

    /// Site administrators (matched case-insensitively).
    /// TOML: `identity.admin_emails`. Default: empty.
    #[serde(default)]
    pub admin_emails: Vec<String>,

    /// Proxy sign-out endpoint used to build logout links.
    /// TOML: `identity.logout_url`. Default: `/oauth2/sign_out`.
    #[serde(default = "default_logout_url")]
    pub logout_url: String,

    /// Query parameter the sign-out endpoint reads its post-logout target from.
    /// TOML: `identity.logout_redirect_param`. Default: `rd`.
    #[serde(default = "default_logout_redirect_param")]
    pub logout_redirect_param: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            header: default_header(),
            admin_emails: Vec::new(),
            logout_url: default_logout_url(),
            logout_redirect_param: default_logout_redirect_param(),
        }
    }
}

fn default_header() -> String {
    "x-auth-request-email".to_string()
}

fn default_logout_url() -> String {
    "/oauth2/sign_out".to_string()
}

fn default_logout_redirect_param() -> String {
    "rd".to_string()
}
