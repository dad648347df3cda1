use crate::error::PhonebankError;
use crate::identity::Identity;
use crate::server::guards::auth::CurrentUser;
use crate::server::router::PhonebankState;
use crate::server::routes::form_payload;
use crate::service::ingest::split_csv_upload;
use axum::{
    Form, Json, Router,
    extract::{State, rejection::FormRejection},
    response::Redirect,
    routing::{get, post},
};
use phonebank_schema::{AdminPage, CsvUploadForm, FormKeyForm, RecipientSummary, UserMethodForm};

const ADMIN_PATH: &str = "/admin";

pub fn router() -> Router<PhonebankState> {
    Router::new()
        .route(ADMIN_PATH, get(admin_page_handler).post(admin_upload_handler))
        .route(
            "/formmethod",
            get(form_key_get_handler).post(form_key_set_handler),
        )
        .route("/usermethod", post(user_method_handler))
}

/// GET /admin
async fn admin_page_handler(
    State(state): State<PhonebankState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<AdminPage>, PhonebankError> {
    let phonebank = &state.phonebank;
    phonebank.gate.require_admin(&identity).await?;

    let users = phonebank.whitelist.list(&identity).await?;
    let form_key = phonebank.forms.get_form_key().await?;
    let counts = phonebank.db.count_recipients().await?;

    Ok(Json(AdminPage::new(
        users,
        form_key,
        phonebank.gate.logout_url("/"),
        RecipientSummary {
            total: counts.total,
            contacted: counts.contacted,
            claimed: counts.claimed,
        },
    )))
}

/// POST /admin
///
/// Imports the `phone-number-csv` upload. Any malformed row rejects the
/// whole upload with 400.
async fn admin_upload_handler(
    State(state): State<PhonebankState>,
    CurrentUser(identity): CurrentUser,
    payload: Result<Form<CsvUploadForm>, FormRejection>,
) -> Result<Redirect, PhonebankError> {
    let phonebank = &state.phonebank;
    phonebank.gate.require_admin(&identity).await?;
    let form = form_payload(payload)?;

    let upload = form
        .phone_number_csv
        .ok_or_else(|| PhonebankError::Validation("missing phone-number-csv".to_string()))?;
    phonebank
        .ingestion
        .ingest(split_csv_upload(&upload).as_slice(), &identity)
        .await?;

    Ok(Redirect::to(ADMIN_PATH))
}

/// GET /formmethod
async fn form_key_get_handler(
    State(state): State<PhonebankState>,
    CurrentUser(_identity): CurrentUser,
) -> Result<String, PhonebankError> {
    state
        .phonebank
        .forms
        .get_form_key()
        .await?
        .ok_or_else(|| PhonebankError::NotFound("no survey form key is set".to_string()))
}

/// POST /formmethod
async fn form_key_set_handler(
    State(state): State<PhonebankState>,
    CurrentUser(identity): CurrentUser,
    payload: Result<Form<FormKeyForm>, FormRejection>,
) -> Result<Redirect, PhonebankError> {
    let phonebank = &state.phonebank;
    phonebank.gate.require_admin(&identity).await?;
    let form = form_payload(payload)?;

    let form_key = form.form_key.unwrap_or_default();
    phonebank.forms.set_form_key(&form_key, &identity).await?;
    Ok(Redirect::to(ADMIN_PATH))
}

/// POST /usermethod
///
/// `add_email` and `delete_email` may both be given; the add runs first.
async fn user_method_handler(
    State(state): State<PhonebankState>,
    CurrentUser(identity): CurrentUser,
    payload: Result<Form<UserMethodForm>, FormRejection>,
) -> Result<Redirect, PhonebankError> {
    let phonebank = &state.phonebank;
    phonebank.gate.require_admin(&identity).await?;
    let form = form_payload(payload)?;

    if let Some(entry) = form.add_email.as_deref().and_then(Identity::parse) {
        phonebank.whitelist.add(&entry, &identity).await?;
    }
    if let Some(entry) = form.delete_email.as_deref().and_then(Identity::parse) {
        phonebank.whitelist.remove(&entry, &identity).await?;
    }
    Ok(Redirect::to(ADMIN_PATH))
}
