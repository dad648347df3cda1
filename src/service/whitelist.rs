use super::gate::AuthorizationGate;
use crate::db::DbActorHandle;
use crate::error::PhonebankError;
use crate::identity::Identity;
use tracing::info;

/// Admin-side management of the caller whitelist.
#[derive(Clone)]
pub struct WhitelistRegistry {
    db: DbActorHandle,
    gate: AuthorizationGate,
}

impl WhitelistRegistry {
    pub fn new(db: DbActorHandle, gate: AuthorizationGate) -> Self {
        Self { db, gate }
    }

    /// Returns `false` when the identity was already whitelisted.
    pub async fn add(&self, entry: &Identity, requester: &Identity) -> Result<bool, PhonebankError> {
        self.gate.require_admin(requester).await?;
        let created = self.db.add_whitelist(entry.as_str()).await?;
        info!(requester = %requester, identity = %entry, created, "whitelist add");
        Ok(created)
    }

    /// Returns `false` when there was nothing to remove.
    pub async fn remove(
        &self,
        entry: &Identity,
        requester: &Identity,
    ) -> Result<bool, PhonebankError> {
        self.gate.require_admin(requester).await?;
        let removed = self.db.remove_whitelist(entry.as_str()).await?;
        info!(requester = %requester, identity = %entry, removed, "whitelist remove");
        Ok(removed)
    }

    pub async fn list(&self, requester: &Identity) -> Result<Vec<String>, PhonebankError> {
        self.gate.require_admin(requester).await?;
        Ok(self
            .db
            .list_whitelist()
            .await?
            .into_iter()
            .map(|entry| entry.identity)
            .collect())
    }
}
