pub mod admin;
pub mod pages;
pub mod phone_numbers;

use crate::error::PhonebankError;
use axum::{Form, extract::rejection::FormRejection};

/// Unwraps a form body taken as `Result<Form<T>, FormRejection>`.
///
/// Handlers take the body this way so the authorization gate runs before the
/// body is looked at. Call it only after the gate has passed.
pub(crate) fn form_payload<T>(
    payload: Result<Form<T>, FormRejection>,
) -> Result<T, PhonebankError> {
    payload
        .map(|Form(form)| form)
        .map_err(|rejection| PhonebankError::Validation(rejection.body_text()))
}
