use crate::db::DbActorHandle;
use crate::error::PhonebankError;
use crate::identity::{Identity, IdentityProvider};
use std::sync::Arc;
use tracing::debug;

/// Admin and whitelist checks run before any privileged operation.
#[derive(Clone)]
pub struct AuthorizationGate {
    db: DbActorHandle,
    identity: Arc<dyn IdentityProvider>,
}

impl AuthorizationGate {
    pub fn new(db: DbActorHandle, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { db, identity }
    }

    pub async fn is_admin(&self, identity: &Identity) -> bool {
        self.identity.is_admin(identity).await
    }

    pub async fn is_whitelisted(&self, identity: &Identity) -> Result<bool, PhonebankError> {
        self.db.is_whitelisted(identity.as_str()).await
    }

    /// 403 unless `identity` is a site admin.
    pub async fn require_admin(&self, identity: &Identity) -> Result<(), PhonebankError> {
        if self.is_admin(identity).await {
            Ok(())
        } else {
            debug!(identity = %identity, "admin check failed");
            Err(PhonebankError::Forbidden)
        }
    }

    /// 401 unless `identity` is on the caller whitelist.
    pub async fn require_caller(&self, identity: &Identity) -> Result<(), PhonebankError> {
        if self.is_whitelisted(identity).await? {
            Ok(())
        } else {
            debug!(identity = %identity, "whitelist check failed");
            Err(PhonebankError::Unauthorized)
        }
    }

    pub fn logout_url(&self, path: &str) -> String {
        self.identity.logout_url(path)
    }
}
