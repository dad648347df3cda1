use super::gate::AuthorizationGate;
use crate::db::DbActorHandle;
use crate::error::PhonebankError;
use crate::identity::Identity;
use tracing::info;

/// Holds the key of the single survey form responses are collected in.
#[derive(Clone)]
pub struct SurveyFormRegistry {
    db: DbActorHandle,
    gate: AuthorizationGate,
}

impl SurveyFormRegistry {
    pub fn new(db: DbActorHandle, gate: AuthorizationGate) -> Self {
        Self { db, gate }
    }

    pub async fn get_form_key(&self) -> Result<Option<String>, PhonebankError> {
        Ok(self.db.get_survey_form().await?.map(|form| form.form_key))
    }

    /// Replace the active form key (or set the first one) and return the
    /// stored record's id.
    pub async fn set_form_key(
        &self,
        key: &str,
        requester: &Identity,
    ) -> Result<i64, PhonebankError> {
        self.gate.require_admin(requester).await?;

        let key = key.trim();
        if key.is_empty() {
            return Err(PhonebankError::Validation(
                "form_key must not be empty".to_string(),
            ));
        }

        let id = self.db.upsert_survey_form(key).await?;
        info!(requester = %requester, form_key = key, id, "survey form key set");
        Ok(id)
    }
}
