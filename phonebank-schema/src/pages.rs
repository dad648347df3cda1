//! Template-variable maps handed to the presentation layer.
//!
//! Rendering happens outside this service; each page model is emitted as JSON
//! and tagged with the template it belongs to.

use serde::{Deserialize, Serialize};

/// Variables for the caller home page (`index`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomePage {
    pub page: String,
    pub logout_url: String,
    pub form_key: Option<String>,
}

impl HomePage {
    pub const TEMPLATE: &'static str = "index";

    pub fn new(logout_url: String, form_key: Option<String>) -> Self {
        Self {
            page: Self::TEMPLATE.to_string(),
            logout_url,
            form_key,
        }
    }
}

/// Variables for the admin page (`admin`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPage {
    pub page: String,
    pub current_users_email: Vec<String>,
    pub form_key: Option<String>,
    pub logout_url: String,
    pub recipients: RecipientSummary,
}

impl AdminPage {
    pub const TEMPLATE: &'static str = "admin";

    pub fn new(
        current_users_email: Vec<String>,
        form_key: Option<String>,
        logout_url: String,
        recipients: RecipientSummary,
    ) -> Self {
        Self {
            page: Self::TEMPLATE.to_string(),
            current_users_email,
            form_key,
            logout_url,
            recipients,
        }
    }
}

/// Outreach progress shown on the admin page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientSummary {
    pub total: i64,
    pub contacted: i64,
    /// Assigned to a caller but not yet contacted.
    pub claimed: i64,
}
