use super::gate::AuthorizationGate;
use crate::db::DbActorHandle;
use crate::error::PhonebankError;
use crate::identity::Identity;
use std::fmt;
use tracing::{debug, info};

/// Confirmation of a recorded call outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordResult {
    pub phone_number: i64,
    pub contact_response: String,
}

impl fmt::Display for RecordResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} marked {}", self.phone_number, self.contact_response)
    }
}

/// How `claim_next` reserves a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimMode {
    /// One conditional update selects and assigns the number.
    Atomic,
    /// Separate read and write. Two callers racing may get the same number.
    Legacy,
}

/// Hands out uncalled numbers and records call outcomes.
#[derive(Clone)]
pub struct NumberDispatch {
    db: DbActorHandle,
    gate: AuthorizationGate,
    mode: ClaimMode,
}

impl NumberDispatch {
    pub fn new(db: DbActorHandle, gate: AuthorizationGate, mode: ClaimMode) -> Self {
        Self { db, gate, mode }
    }

    pub fn mode(&self) -> ClaimMode {
        self.mode
    }

    /// Assigns the next uncontacted number to `requester`.
    ///
    /// A number the requester already holds is handed back first, otherwise
    /// the oldest unassigned one. Returns `None` when nothing is left.
    pub async fn claim_next(&self, requester: &Identity) -> Result<Option<i64>, PhonebankError> {
        self.gate.require_caller(requester).await?;

        let claimed = match self.mode {
            ClaimMode::Atomic => self.db.claim_next(requester.as_str()).await?,
            ClaimMode::Legacy => {
                match self.db.find_claimable(requester.as_str()).await? {
                    Some(recipient) => {
                        // Not atomic: another caller may assign the same row in between.
                        self.db
                            .assign_caller(recipient.id, requester.as_str())
                            .await?;
                        Some(recipient.phone_number)
                    }
                    None => None,
                }
            }
        };

        match claimed {
            Some(phone_number) => {
                info!(caller = %requester, phone_number, mode = ?self.mode, "number claimed")
            }
            None => debug!(caller = %requester, "no number left to claim"),
        }
        Ok(claimed)
    }

    /// Marks a number contacted with the caller's response.
    ///
    /// Both inputs arrive as raw form values; a missing or malformed value is
    /// a validation error and an unknown number is not found.
    pub async fn record_response(
        &self,
        phone_number: Option<&str>,
        contact_response: Option<&str>,
        requester: &Identity,
    ) -> Result<RecordResult, PhonebankError> {
        self.gate.require_caller(requester).await?;

        let phone_number = phone_number
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PhonebankError::Validation("missing phone_number".to_string()))?;
        let phone_number = phone_number.parse::<i64>().map_err(|_| {
            PhonebankError::Validation(format!("phone_number {phone_number:?} is not a number"))
        })?;
        let contact_response = contact_response
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PhonebankError::Validation("missing contact_response".to_string()))?;

        let Some(recipient) = self
            .db
            .record_response(phone_number, contact_response)
            .await?
        else {
            return Err(PhonebankError::NotFound(format!(
                "phone number {phone_number} is not on the call list"
            )));
        };

        info!(
            caller = %requester,
            phone_number,
            contact_response,
            "call response recorded"
        );
        Ok(RecordResult {
            phone_number: recipient.phone_number,
            contact_response: recipient.contact_response.unwrap_or_default(),
        })
    }
}
