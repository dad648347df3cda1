use crate::db::models::{
    DbCallRecipient, DbRecipientCounts, DbSurveyForm, DbWhitelistEntry, InsertOutcome,
    SURVEY_FORM_ID,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::PhonebankError;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

const RECIPIENT_COLUMNS: &str =
    "id, phone_number, assigned_caller, contacted, last_contact, contact_response, created_at";

#[derive(Debug)]
pub enum DbActorMessage {
    /// Add an identity to the whitelist. Replies `true` if a row was created.
    AddWhitelist(String, RpcReplyPort<Result<bool, PhonebankError>>),

    /// Remove an identity from the whitelist. Replies `true` if a row was deleted.
    RemoveWhitelist(String, RpcReplyPort<Result<bool, PhonebankError>>),

    /// Whitelist membership check.
    IsWhitelisted(String, RpcReplyPort<Result<bool, PhonebankError>>),

    /// All whitelist entries in insertion order.
    ListWhitelist(RpcReplyPort<Result<Vec<DbWhitelistEntry>, PhonebankError>>),

    /// The singleton survey form, if one was ever set.
    GetSurveyForm(RpcReplyPort<Result<Option<DbSurveyForm>, PhonebankError>>),

    /// Create or overwrite the singleton survey form and return its id.
    UpsertSurveyForm(String, RpcReplyPort<Result<i64, PhonebankError>>),

    /// Insert each phone number not already stored, in one transaction.
    InsertRecipients(Vec<i64>, RpcReplyPort<Result<InsertOutcome, PhonebankError>>),

    /// Look up a recipient by phone number.
    GetRecipient(i64, RpcReplyPort<Result<Option<DbCallRecipient>, PhonebankError>>),

    /// Read the next recipient the caller may claim, without assigning it.
    FindClaimable(String, RpcReplyPort<Result<Option<DbCallRecipient>, PhonebankError>>),

    /// Unconditionally set the assigned caller of a recipient row.
    AssignCaller(i64, String, RpcReplyPort<Result<(), PhonebankError>>),

    /// Select and assign the next claimable recipient in a single statement.
    ClaimNext(String, RpcReplyPort<Result<Option<i64>, PhonebankError>>),

    /// Mark a recipient contacted with the given response.
    RecordResponse(
        i64,
        String,
        RpcReplyPort<Result<Option<DbCallRecipient>, PhonebankError>>,
    ),

    /// Total / contacted / claimed counters.
    CountRecipients(RpcReplyPort<Result<DbRecipientCounts, PhonebankError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn add_whitelist(&self, identity: &str) -> Result<bool, PhonebankError> {
        ractor::call!(self.actor, DbActorMessage::AddWhitelist, identity.to_string()).map_err(
            |e| PhonebankError::RactorError(format!("DbActor AddWhitelist RPC failed: {e}")),
        )?
    }

    pub async fn remove_whitelist(&self, identity: &str) -> Result<bool, PhonebankError> {
        ractor::call!(
            self.actor,
            DbActorMessage::RemoveWhitelist,
            identity.to_string()
        )
        .map_err(|e| {
            PhonebankError::RactorError(format!("DbActor RemoveWhitelist RPC failed: {e}"))
        })?
    }

    pub async fn is_whitelisted(&self, identity: &str) -> Result<bool, PhonebankError> {
        ractor::call!(self.actor, DbActorMessage::IsWhitelisted, identity.to_string()).map_err(
            |e| PhonebankError::RactorError(format!("DbActor IsWhitelisted RPC failed: {e}")),
        )?
    }

    pub async fn list_whitelist(&self) -> Result<Vec<DbWhitelistEntry>, PhonebankError> {
        ractor::call!(self.actor, DbActorMessage::ListWhitelist).map_err(|e| {
            PhonebankError::RactorError(format!("DbActor ListWhitelist RPC failed: {e}"))
        })?
    }

    pub async fn get_survey_form(&self) -> Result<Option<DbSurveyForm>, PhonebankError> {
        ractor::call!(self.actor, DbActorMessage::GetSurveyForm).map_err(|e| {
            PhonebankError::RactorError(format!("DbActor GetSurveyForm RPC failed: {e}"))
        })?
    }

    pub async fn upsert_survey_form(&self, form_key: &str) -> Result<i64, PhonebankError> {
        ractor::call!(
            self.actor,
            DbActorMessage::UpsertSurveyForm,
            form_key.to_string()
        )
        .map_err(|e| {
            PhonebankError::RactorError(format!("DbActor UpsertSurveyForm RPC failed: {e}"))
        })?
    }

    pub async fn insert_recipients(
        &self,
        phone_numbers: Vec<i64>,
    ) -> Result<InsertOutcome, PhonebankError> {
        ractor::call!(self.actor, DbActorMessage::InsertRecipients, phone_numbers).map_err(|e| {
            PhonebankError::RactorError(format!("DbActor InsertRecipients RPC failed: {e}"))
        })?
    }

    pub async fn get_recipient(
        &self,
        phone_number: i64,
    ) -> Result<Option<DbCallRecipient>, PhonebankError> {
        ractor::call!(self.actor, DbActorMessage::GetRecipient, phone_number).map_err(|e| {
            PhonebankError::RactorError(format!("DbActor GetRecipient RPC failed: {e}"))
        })?
    }

    pub async fn find_claimable(
        &self,
        caller: &str,
    ) -> Result<Option<DbCallRecipient>, PhonebankError> {
        ractor::call!(self.actor, DbActorMessage::FindClaimable, caller.to_string()).map_err(
            |e| PhonebankError::RactorError(format!("DbActor FindClaimable RPC failed: {e}")),
        )?
    }

    pub async fn assign_caller(&self, id: i64, caller: &str) -> Result<(), PhonebankError> {
        ractor::call!(
            self.actor,
            DbActorMessage::AssignCaller,
            id,
            caller.to_string()
        )
        .map_err(|e| PhonebankError::RactorError(format!("DbActor AssignCaller RPC failed: {e}")))?
    }

    pub async fn claim_next(&self, caller: &str) -> Result<Option<i64>, PhonebankError> {
        ractor::call!(self.actor, DbActorMessage::ClaimNext, caller.to_string())
            .map_err(|e| PhonebankError::RactorError(format!("DbActor ClaimNext RPC failed: {e}")))?
    }

    pub async fn record_response(
        &self,
        phone_number: i64,
        response: &str,
    ) -> Result<Option<DbCallRecipient>, PhonebankError> {
        ractor::call!(
            self.actor,
            DbActorMessage::RecordResponse,
            phone_number,
            response.to_string()
        )
        .map_err(|e| {
            PhonebankError::RactorError(format!("DbActor RecordResponse RPC failed: {e}"))
        })?
    }

    pub async fn count_recipients(&self) -> Result<DbRecipientCounts, PhonebankError> {
        ractor::call!(self.actor, DbActorMessage::CountRecipients).map_err(|e| {
            PhonebankError::RactorError(format!("DbActor CountRecipients RPC failed: {e}"))
        })?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let pool = &state.pool;
        match message {
            DbActorMessage::AddWhitelist(identity, reply) => {
                let _ = reply.send(self.add_whitelist(pool, &identity).await);
            }
            DbActorMessage::RemoveWhitelist(identity, reply) => {
                let _ = reply.send(self.remove_whitelist(pool, &identity).await);
            }
            DbActorMessage::IsWhitelisted(identity, reply) => {
                let _ = reply.send(self.is_whitelisted(pool, &identity).await);
            }
            DbActorMessage::ListWhitelist(reply) => {
                let _ = reply.send(self.list_whitelist(pool).await);
            }
            DbActorMessage::GetSurveyForm(reply) => {
                let _ = reply.send(self.get_survey_form(pool).await);
            }
            DbActorMessage::UpsertSurveyForm(form_key, reply) => {
                let _ = reply.send(self.upsert_survey_form(pool, &form_key).await);
            }
            DbActorMessage::InsertRecipients(numbers, reply) => {
                let _ = reply.send(self.insert_recipients(pool, &numbers).await);
            }
            DbActorMessage::GetRecipient(phone_number, reply) => {
                let _ = reply.send(self.get_recipient(pool, phone_number).await);
            }
            DbActorMessage::FindClaimable(caller, reply) => {
                let _ = reply.send(self.find_claimable(pool, &caller).await);
            }
            DbActorMessage::AssignCaller(id, caller, reply) => {
                let _ = reply.send(self.assign_caller(pool, id, &caller).await);
            }
            DbActorMessage::ClaimNext(caller, reply) => {
                let _ = reply.send(self.claim_next(pool, &caller).await);
            }
            DbActorMessage::RecordResponse(phone_number, response, reply) => {
                let _ = reply.send(self.record_response(pool, phone_number, &response).await);
            }
            DbActorMessage::CountRecipients(reply) => {
                let _ = reply.send(self.count_recipients(pool).await);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn add_whitelist(&self, pool: &SqlitePool, identity: &str) -> Result<bool, PhonebankError> {
        let res = sqlx::query(
            r#"
        INSERT INTO whitelist (identity, created_at)
        VALUES (?, ?)
        ON CONFLICT(identity) DO NOTHING
        "#,
        )
        .bind(identity)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Ok(res.rows_affected() > 0)
    }

    async fn remove_whitelist(
        &self,
        pool: &SqlitePool,
        identity: &str,
    ) -> Result<bool, PhonebankError> {
        let res = sqlx::query("DELETE FROM whitelist WHERE identity = ?")
            .bind(identity)
            .execute(pool)
            .await?;

        Ok(res.rows_affected() > 0)
    }

    async fn is_whitelisted(&self, pool: &SqlitePool, identity: &str) -> Result<bool, PhonebankError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM whitelist WHERE identity = ?")
            .bind(identity)
            .fetch_optional(pool)
            .await?;

        Ok(found.is_some())
    }

    async fn list_whitelist(
        &self,
        pool: &SqlitePool,
    ) -> Result<Vec<DbWhitelistEntry>, PhonebankError> {
        let rows = sqlx::query_as::<_, DbWhitelistEntry>(
            r#"
        SELECT id, identity, created_at
        FROM whitelist
        ORDER BY id
        "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    async fn get_survey_form(
        &self,
        pool: &SqlitePool,
    ) -> Result<Option<DbSurveyForm>, PhonebankError> {
        let row = sqlx::query_as::<_, DbSurveyForm>(
            "SELECT id, form_key, updated_at FROM survey_form WHERE id = ?",
        )
        .bind(SURVEY_FORM_ID)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn upsert_survey_form(
        &self,
        pool: &SqlitePool,
        form_key: &str,
    ) -> Result<i64, PhonebankError> {
        let id: i64 = sqlx::query_scalar(
            r#"
        INSERT INTO survey_form (id, form_key, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            form_key = excluded.form_key,
            updated_at = excluded.updated_at
        RETURNING id
        "#,
        )
        .bind(SURVEY_FORM_ID)
        .bind(form_key)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(id)
    }

    async fn insert_recipients(
        &self,
        pool: &SqlitePool,
        phone_numbers: &[i64],
    ) -> Result<InsertOutcome, PhonebankError> {
        let now = Utc::now();
        let mut outcome = InsertOutcome::default();
        let mut tx = pool.begin().await?;

        for phone_number in phone_numbers {
            let res = sqlx::query(
                r#"
            INSERT INTO call_recipient (phone_number, contacted, created_at)
            VALUES (?, 0, ?)
            ON CONFLICT(phone_number) DO NOTHING
            "#,
            )
            .bind(*phone_number)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if res.rows_affected() > 0 {
                outcome.inserted += 1;
            } else {
                outcome.skipped += 1;
            }
        }

        tx.commit().await?;
        debug!(
            inserted = outcome.inserted,
            skipped = outcome.skipped,
            "recipients inserted"
        );
        Ok(outcome)
    }

    async fn get_recipient(
        &self,
        pool: &SqlitePool,
        phone_number: i64,
    ) -> Result<Option<DbCallRecipient>, PhonebankError> {
        let row = sqlx::query_as::<_, DbCallRecipient>(&format!(
            "SELECT {RECIPIENT_COLUMNS} FROM call_recipient WHERE phone_number = ?"
        ))
        .bind(phone_number)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn find_claimable(
        &self,
        pool: &SqlitePool,
        caller: &str,
    ) -> Result<Option<DbCallRecipient>, PhonebankError> {
        // Own outstanding claim first, then creation order.
        let row = sqlx::query_as::<_, DbCallRecipient>(&format!(
            r#"
        SELECT {RECIPIENT_COLUMNS}
        FROM call_recipient
        WHERE contacted = 0 AND (assigned_caller IS NULL OR assigned_caller = ?)
        ORDER BY (assigned_caller IS NULL), id
        LIMIT 1
        "#
        ))
        .bind(caller)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn assign_caller(
        &self,
        pool: &SqlitePool,
        id: i64,
        caller: &str,
    ) -> Result<(), PhonebankError> {
        let res = sqlx::query("UPDATE call_recipient SET assigned_caller = ? WHERE id = ?")
            .bind(caller)
            .bind(id)
            .execute(pool)
            .await?;

        if res.rows_affected() == 0 {
            return Err(PhonebankError::NotFound(format!(
                "call recipient not found for id={id}"
            )));
        }
        Ok(())
    }

    async fn claim_next(
        &self,
        pool: &SqlitePool,
        caller: &str,
    ) -> Result<Option<i64>, PhonebankError> {
        // Selection and assignment in one statement: the row only changes hands
        // while it is still uncontacted and unclaimed (or already ours).
        let claimed: Option<i64> = sqlx::query_scalar(
            r#"
        UPDATE call_recipient
        SET assigned_caller = ?
        WHERE id = (
            SELECT id
            FROM call_recipient
            WHERE contacted = 0 AND (assigned_caller IS NULL OR assigned_caller = ?)
            ORDER BY (assigned_caller IS NULL), id
            LIMIT 1
        )
        RETURNING phone_number
        "#,
        )
        .bind(caller)
        .bind(caller)
        .fetch_optional(pool)
        .await?;

        Ok(claimed)
    }

    async fn record_response(
        &self,
        pool: &SqlitePool,
        phone_number: i64,
        response: &str,
    ) -> Result<Option<DbCallRecipient>, PhonebankError> {
        let row = sqlx::query_as::<_, DbCallRecipient>(&format!(
            r#"
        UPDATE call_recipient
        SET contacted = 1, last_contact = ?, contact_response = ?
        WHERE phone_number = ?
        RETURNING {RECIPIENT_COLUMNS}
        "#
        ))
        .bind(Utc::now())
        .bind(response)
        .bind(phone_number)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn count_recipients(&self, pool: &SqlitePool) -> Result<DbRecipientCounts, PhonebankError> {
        let counts = sqlx::query_as::<_, DbRecipientCounts>(
            r#"
        SELECT
            COUNT(*) AS total,
            COALESCE(SUM(contacted), 0) AS contacted,
            COALESCE(SUM(CASE WHEN contacted = 0 AND assigned_caller IS NOT NULL THEN 1 ELSE 0 END), 0) AS claimed
        FROM call_recipient
        "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(counts)
    }
}

/// Spawn the database actor and return a cloneable handle.
///
/// The actor is left unnamed so that several stores can live in one process.
pub async fn spawn(database_url: &str) -> DbActorHandle {
    let (actor, _jh) = ractor::Actor::spawn(
        None,
        DbActor,
        database_url.to_string(),
    )
    .await
    .expect("failed to spawn DbActor");

    DbActorHandle { actor }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), PhonebankError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
