use crate::error::PhonebankError;
use crate::server::guards::auth::CurrentUser;
use crate::server::router::PhonebankState;
use axum::{Json, Router, extract::State, routing::get};
use phonebank_schema::HomePage;

pub fn router() -> Router<PhonebankState> {
    Router::new().route("/", get(home_handler))
}

/// GET /
///
/// Caller home page. Only whitelisted identities get the page model.
async fn home_handler(
    State(state): State<PhonebankState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<HomePage>, PhonebankError> {
    let phonebank = &state.phonebank;
    phonebank.gate.require_caller(&identity).await?;

    let form_key = phonebank.forms.get_form_key().await?;
    Ok(Json(HomePage::new(phonebank.gate.logout_url("/"), form_key)))
}
