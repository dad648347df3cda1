use super::gate::AuthorizationGate;
use crate::db::{DbActorHandle, InsertOutcome};
use crate::error::PhonebankError;
use crate::identity::Identity;
use tracing::info;

/// Splits an uploaded CSV into raw phone-number tokens.
///
/// Rows are separated by any whitespace and only the first column of each row
/// is kept. Rows whose first column is empty are dropped.
pub fn split_csv_upload(upload: &str) -> Vec<&str> {
    upload
        .split_whitespace()
        .filter_map(|row| row.split(',').next())
        .map(|first| first.trim().trim_matches('"'))
        .filter(|first| !first.is_empty())
        .collect()
}

/// Parses every token as an integer phone number.
///
/// A single malformed token rejects the whole batch; the error names its
/// 1-based row.
pub fn parse_phone_numbers<S: AsRef<str>>(raw: &[S]) -> Result<Vec<i64>, PhonebankError> {
    raw.iter()
        .enumerate()
        .map(|(idx, token)| {
            let token = token.as_ref().trim();
            token
                .parse::<i64>()
                .map_err(|_| PhonebankError::MalformedNumber {
                    row: idx + 1,
                    token: token.to_string(),
                })
        })
        .collect()
}

/// Loads uploaded phone numbers as new call recipients.
#[derive(Clone)]
pub struct RecipientIngestion {
    db: DbActorHandle,
    gate: AuthorizationGate,
}

impl RecipientIngestion {
    pub fn new(db: DbActorHandle, gate: AuthorizationGate) -> Self {
        Self { db, gate }
    }

    /// Inserts each distinct number that is not stored yet. Repeats within the
    /// batch and numbers already present count as skipped.
    pub async fn ingest<S: AsRef<str>>(
        &self,
        raw_numbers: &[S],
        requester: &Identity,
    ) -> Result<InsertOutcome, PhonebankError> {
        self.gate.require_admin(requester).await?;

        let numbers = parse_phone_numbers(raw_numbers)?;
        if numbers.is_empty() {
            return Ok(InsertOutcome::default());
        }

        let outcome = self.db.insert_recipients(numbers).await?;
        info!(
            requester = %requester,
            inserted = outcome.inserted,
            skipped = outcome.skipped,
            "phone numbers ingested"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_upload_keeps_first_column_of_each_row() {
        let upload = "252611111111,Mogadishu\r\n252622222222\n\n  252633333333,\"x\"\n,empty";
        assert_eq!(
            split_csv_upload(upload),
            vec!["252611111111", "252622222222", "252633333333"]
        );
    }

    #[test]
    fn malformed_token_rejects_batch_with_row() {
        let err = parse_phone_numbers(&["1", "2", "2", "abc"]).unwrap_err();
        match err {
            PhonebankError::MalformedNumber { row, token } => {
                assert_eq!(row, 4);
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(parse_phone_numbers(&[" 7 ", "+8"]).unwrap(), vec![7, 8]);
    }
}
