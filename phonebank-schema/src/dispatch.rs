//! Caller-facing dispatch payloads.

use serde::{Deserialize, Serialize};

pub const NO_NUMBER_MESSAGE: &str = "no number";

/// GET /phonenumbers response.
///
/// Serializes as `{"phone_number": 123}` when a number was claimed and as the
/// bare JSON string `"no number"` when the pool is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimResponse {
    Assigned { phone_number: i64 },
    Exhausted(String),
}

impl ClaimResponse {
    pub fn from_claim(claimed: Option<i64>) -> Self {
        match claimed {
            Some(phone_number) => ClaimResponse::Assigned { phone_number },
            None => ClaimResponse::Exhausted(NO_NUMBER_MESSAGE.to_string()),
        }
    }

    pub fn phone_number(&self) -> Option<i64> {
        match self {
            ClaimResponse::Assigned { phone_number } => Some(*phone_number),
            ClaimResponse::Exhausted(_) => None,
        }
    }
}

/// POST /phonenumbers body.
///
/// Fields are kept as raw strings so that missing or malformed values can be
/// reported as validation errors instead of extractor rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordResponseForm {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub contact_response: Option<String>,
}
