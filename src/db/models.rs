use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbWhitelistEntry {
    pub id: i64,
    pub identity: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbCallRecipient {
    pub id: i64,
    pub phone_number: i64,
    pub assigned_caller: Option<String>,
    pub contacted: bool,
    pub last_contact: Option<DateTime<Utc>>,
    pub contact_response: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbSurveyForm {
    /// Always `SURVEY_FORM_ID`.
    pub id: i64,
    pub form_key: String,
    pub updated_at: DateTime<Utc>,
}

/// Row id of the singleton survey form.
pub const SURVEY_FORM_ID: i64 = 1;

/// Result of inserting a batch of phone numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertOutcome {
    pub inserted: u64,
    /// Numbers already stored (or repeated within the batch).
    pub skipped: u64,
}

/// Aggregate recipient counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct DbRecipientCounts {
    pub total: i64,
    pub contacted: i64,
    pub claimed: i64,
}
