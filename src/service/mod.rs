//! Application services sitting between the HTTP routes and the store.
//!
//! Every operation takes the requesting [`Identity`](crate::identity::Identity)
//! explicitly and runs the relevant authorization check before touching data.

pub mod dispatch;
pub mod forms;
pub mod gate;
pub mod ingest;
pub mod whitelist;

pub use dispatch::{ClaimMode, NumberDispatch, RecordResult};
pub use forms::SurveyFormRegistry;
pub use gate::AuthorizationGate;
pub use ingest::RecipientIngestion;
pub use whitelist::WhitelistRegistry;

use crate::config::Config;
use crate::db::DbActorHandle;
use crate::identity::IdentityProvider;
use std::sync::Arc;

/// All services wired to one store and one identity provider.
#[derive(Clone)]
pub struct Phonebank {
    pub db: DbActorHandle,
    pub gate: AuthorizationGate,
    pub forms: SurveyFormRegistry,
    pub whitelist: WhitelistRegistry,
    pub ingestion: RecipientIngestion,
    pub dispatch: NumberDispatch,
}

impl Phonebank {
    pub fn new(db: DbActorHandle, identity: Arc<dyn IdentityProvider>, cfg: &Config) -> Self {
        let gate = AuthorizationGate::new(db.clone(), identity);
        let mode = if cfg.dispatch.atomic_claim {
            ClaimMode::Atomic
        } else {
            ClaimMode::Legacy
        };

        Self {
            forms: SurveyFormRegistry::new(db.clone(), gate.clone()),
            whitelist: WhitelistRegistry::new(db.clone(), gate.clone()),
            ingestion: RecipientIngestion::new(db.clone(), gate.clone()),
            dispatch: NumberDispatch::new(db.clone(), gate.clone(), mode),
            gate,
            db,
        }
    }
}
