use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

fn temp_db_path(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "phonebank-db-{label}-{}-{nanos}.sqlite",
        std::process::id()
    ))
}

async fn cleanup(db_path: &PathBuf) {
    let wal_path = PathBuf::from(format!("{}-wal", db_path.to_string_lossy()));
    let shm_path = PathBuf::from(format!("{}-shm", db_path.to_string_lossy()));
    let _ = fs::remove_file(&wal_path).await;
    let _ = fs::remove_file(&shm_path).await;
    let _ = fs::remove_file(db_path).await;
}

#[tokio::test]
async fn whitelist_and_survey_form_baseline() {
    let db_path = temp_db_path("baseline");
    let db = phonebank::db::spawn(&format!("sqlite:{}", db_path.display())).await;

    // 1. Fresh store is empty
    assert!(db.list_whitelist().await.unwrap().is_empty());
    assert!(db.get_survey_form().await.unwrap().is_none());
    assert!(!db.is_whitelisted("caller@example.org").await.unwrap());

    // 2. Whitelist add is idempotent on identity
    assert!(db.add_whitelist("caller@example.org").await.unwrap());
    assert!(!db.add_whitelist("caller@example.org").await.unwrap());
    assert!(db.add_whitelist("second@example.org").await.unwrap());
    assert!(db.is_whitelisted("caller@example.org").await.unwrap());

    let entries = db.list_whitelist().await.unwrap();
    let identities: Vec<&str> = entries.iter().map(|e| e.identity.as_str()).collect();
    assert_eq!(identities, vec!["caller@example.org", "second@example.org"]);

    // 3. Remove reports whether anything was deleted
    assert!(db.remove_whitelist("caller@example.org").await.unwrap());
    assert!(!db.remove_whitelist("caller@example.org").await.unwrap());
    assert!(!db.is_whitelisted("caller@example.org").await.unwrap());

    // 4. Survey form stays a single row across overwrites
    let first_id = db.upsert_survey_form("form-A").await.unwrap();
    let second_id = db.upsert_survey_form("form-B").await.unwrap();
    assert_eq!(first_id, phonebank::db::SURVEY_FORM_ID);
    assert_eq!(first_id, second_id);
    let form = db.get_survey_form().await.unwrap().unwrap();
    assert_eq!(form.form_key, "form-B");

    cleanup(&db_path).await;
}

#[tokio::test]
async fn recipients_insert_claim_and_record() {
    let db_path = temp_db_path("recipients");
    let db = phonebank::db::spawn(&format!("sqlite:{}", db_path.display())).await;

    // 1. Duplicates inside the batch and across batches are skipped
    let outcome = db.insert_recipients(vec![10, 20, 20, 30]).await.unwrap();
    assert_eq!(outcome.inserted, 3);
    assert_eq!(outcome.skipped, 1);
    let outcome = db.insert_recipients(vec![30, 40]).await.unwrap();
    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.skipped, 1);

    let fresh = db.get_recipient(10).await.unwrap().unwrap();
    assert!(!fresh.contacted);
    assert!(fresh.assigned_caller.is_none());
    assert!(fresh.last_contact.is_none());
    assert!(fresh.contact_response.is_none());

    // 2. Atomic claim follows creation order and sticks to the caller
    assert_eq!(db.claim_next("a@example.org").await.unwrap(), Some(10));
    assert_eq!(db.claim_next("a@example.org").await.unwrap(), Some(10));
    assert_eq!(db.claim_next("b@example.org").await.unwrap(), Some(20));

    // 3. Legacy read does not assign; the write does
    let candidate = db.find_claimable("c@example.org").await.unwrap().unwrap();
    assert_eq!(candidate.phone_number, 30);
    assert!(candidate.assigned_caller.is_none());
    db.assign_caller(candidate.id, "c@example.org").await.unwrap();
    let claimed = db.get_recipient(30).await.unwrap().unwrap();
    assert_eq!(claimed.assigned_caller.as_deref(), Some("c@example.org"));

    // 4. Recording a response marks the row contacted
    let recorded = db.record_response(10, "answered").await.unwrap().unwrap();
    assert!(recorded.contacted);
    assert!(recorded.last_contact.is_some());
    assert_eq!(recorded.contact_response.as_deref(), Some("answered"));
    assert!(db.record_response(99, "answered").await.unwrap().is_none());

    let counts = db.count_recipients().await.unwrap();
    assert_eq!(counts.total, 4);
    assert_eq!(counts.contacted, 1);
    assert_eq!(counts.claimed, 2);

    // 5. Contacted rows are never claimable again
    assert_eq!(db.claim_next("a@example.org").await.unwrap(), Some(40));

    cleanup(&db_path).await;
}
