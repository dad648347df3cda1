use crate::error::PhonebankError;
use crate::server::guards::auth::CurrentUser;
use crate::server::router::PhonebankState;
use axum::{
    Form, Json, Router,
    extract::{State, rejection::FormRejection},
    routing::get,
};
use phonebank_schema::{ClaimResponse, RecordResponseForm};

pub fn router() -> Router<PhonebankState> {
    Router::new().route(
        "/phonenumbers",
        get(claim_number_handler).post(record_response_handler),
    )
}

/// GET /phonenumbers
///
/// `{"phone_number": N}` for the claimed number, or `"no number"`.
async fn claim_number_handler(
    State(state): State<PhonebankState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<ClaimResponse>, PhonebankError> {
    let claimed = state.phonebank.dispatch.claim_next(&identity).await?;
    Ok(Json(ClaimResponse::from_claim(claimed)))
}

/// POST /phonenumbers
///
/// Plain-text confirmation such as `252611111111 marked answered`.
///
/// An absent or unreadable body counts as no fields, so the caller check
/// still runs first and the missing values come back as 400.
async fn record_response_handler(
    State(state): State<PhonebankState>,
    CurrentUser(identity): CurrentUser,
    payload: Result<Form<RecordResponseForm>, FormRejection>,
) -> Result<String, PhonebankError> {
    let form = payload.map(|Form(form)| form).unwrap_or_default();
    let result = state
        .phonebank
        .dispatch
        .record_response(
            form.phone_number.as_deref(),
            form.contact_response.as_deref(),
            &identity,
        )
        .await?;
    Ok(result.to_string())
}
