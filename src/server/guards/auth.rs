use crate::error::PhonebankError;
use crate::identity::Identity;
use crate::server::router::PhonebankState;
use axum::{extract::FromRequestParts, http::request::Parts};

/// The authenticated identity behind a request.
///
/// Rejects with 401 when the identity provider recognizes nobody. Admin and
/// whitelist checks are left to the services.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl FromRequestParts<PhonebankState> for CurrentUser {
    type Rejection = PhonebankError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &PhonebankState,
    ) -> Result<Self, Self::Rejection> {
        state
            .identity
            .current_identity(parts)
            .await
            .map(CurrentUser)
            .ok_or(PhonebankError::Unauthorized)
    }
}
