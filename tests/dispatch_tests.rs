use phonebank::config::Config;
use phonebank::service::ClaimMode;
use phonebank::{HeaderIdentityProvider, Identity, IdentityProvider, Phonebank, PhonebankError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const ADMIN: &str = "admin@example.org";

fn temp_db_path(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "phonebank-dispatch-{label}-{}-{nanos}.sqlite",
        std::process::id()
    ))
}

fn cleanup(db_path: &PathBuf) {
    let wal_path = PathBuf::from(format!("{}-wal", db_path.to_string_lossy()));
    let shm_path = PathBuf::from(format!("{}-shm", db_path.to_string_lossy()));
    let _ = std::fs::remove_file(&wal_path);
    let _ = std::fs::remove_file(&shm_path);
    let _ = std::fs::remove_file(db_path);
}

async fn setup(label: &str, atomic_claim: bool) -> (Phonebank, PathBuf) {
    let db_path = temp_db_path(label);
    let db = phonebank::db::spawn(&format!("sqlite:{}", db_path.display())).await;

    let mut cfg = Config::default();
    cfg.identity.admin_emails = vec![ADMIN.to_string()];
    cfg.dispatch.atomic_claim = atomic_claim;
    let identity: Arc<dyn IdentityProvider> =
        Arc::new(HeaderIdentityProvider::new(&cfg.identity).expect("valid identity config"));

    (Phonebank::new(db, identity, &cfg), db_path)
}

fn id(email: &str) -> Identity {
    Identity::parse(email).expect("non-empty identity")
}

async fn whitelist(phonebank: &Phonebank, emails: &[&str]) {
    for email in emails {
        phonebank.whitelist.add(&id(email), &id(ADMIN)).await.unwrap();
    }
}

#[tokio::test]
async fn ingest_dedupes_and_rejects_malformed_batches() {
    let (phonebank, db_path) = setup("ingest", true).await;
    let admin = id(ADMIN);

    // Duplicates collapse to one recipient per number
    let outcome = phonebank
        .ingestion
        .ingest(&["1", "2", "2", "3", "1"], &admin)
        .await
        .unwrap();
    assert_eq!(outcome.inserted, 3);
    assert_eq!(outcome.skipped, 2);
    assert_eq!(phonebank.db.count_recipients().await.unwrap().total, 3);

    // One bad row rejects the whole batch
    let err = phonebank
        .ingestion
        .ingest(&["4", "5", "5", "abc"], &admin)
        .await
        .unwrap_err();
    assert!(matches!(err, PhonebankError::MalformedNumber { row: 4, .. }));
    assert!(phonebank.db.get_recipient(4).await.unwrap().is_none());
    assert_eq!(phonebank.db.count_recipients().await.unwrap().total, 3);

    // Non-admins cannot ingest
    let err = phonebank
        .ingestion
        .ingest(&["6"], &id("caller@example.org"))
        .await
        .unwrap_err();
    assert!(matches!(err, PhonebankError::Forbidden));
    assert!(phonebank.db.get_recipient(6).await.unwrap().is_none());

    cleanup(&db_path);
}

#[tokio::test]
async fn claim_prefers_own_claim_then_creation_order() {
    let (phonebank, db_path) = setup("order", true).await;
    whitelist(&phonebank, &["a@example.org", "b@example.org"]).await;
    phonebank
        .ingestion
        .ingest(&["300", "100", "200"], &id(ADMIN))
        .await
        .unwrap();

    let a = id("a@example.org");
    let b = id("b@example.org");

    assert_eq!(phonebank.dispatch.claim_next(&a).await.unwrap(), Some(300));
    assert_eq!(phonebank.dispatch.claim_next(&b).await.unwrap(), Some(100));
    // Asking again returns the caller's outstanding number
    assert_eq!(phonebank.dispatch.claim_next(&a).await.unwrap(), Some(300));

    cleanup(&db_path);
}

#[tokio::test]
async fn recorded_numbers_are_never_claimed_again() {
    for atomic in [true, false] {
        let label = if atomic { "record-atomic" } else { "record-legacy" };
        let (phonebank, db_path) = setup(label, atomic).await;
        whitelist(&phonebank, &["a@example.org", "b@example.org"]).await;
        phonebank
            .ingestion
            .ingest(&["11", "22"], &id(ADMIN))
            .await
            .unwrap();

        let a = id("a@example.org");
        let b = id("b@example.org");

        let first = phonebank.dispatch.claim_next(&a).await.unwrap().unwrap();
        assert_eq!(first, 11);
        let result = phonebank
            .dispatch
            .record_response(Some("11"), Some("no answer"), &a)
            .await
            .unwrap();
        assert_eq!(result.to_string(), "11 marked no answer");

        assert_eq!(phonebank.dispatch.claim_next(&a).await.unwrap(), Some(22));
        // 22 now belongs to a, 11 is contacted: nothing left for b
        assert_eq!(phonebank.dispatch.claim_next(&b).await.unwrap(), None);

        phonebank
            .dispatch
            .record_response(Some("22"), Some("answered"), &a)
            .await
            .unwrap();
        assert_eq!(phonebank.dispatch.claim_next(&a).await.unwrap(), None);

        cleanup(&db_path);
    }
}

#[tokio::test]
async fn record_response_validates_input_and_caller() {
    let (phonebank, db_path) = setup("validate", true).await;
    whitelist(&phonebank, &["a@example.org"]).await;
    phonebank
        .ingestion
        .ingest(&["5"], &id(ADMIN))
        .await
        .unwrap();
    let a = id("a@example.org");

    let err = phonebank
        .dispatch
        .record_response(None, Some("answered"), &a)
        .await
        .unwrap_err();
    assert!(matches!(err, PhonebankError::Validation(_)));

    let err = phonebank
        .dispatch
        .record_response(Some("five"), Some("answered"), &a)
        .await
        .unwrap_err();
    assert!(matches!(err, PhonebankError::Validation(_)));

    let err = phonebank
        .dispatch
        .record_response(Some("5"), Some("  "), &a)
        .await
        .unwrap_err();
    assert!(matches!(err, PhonebankError::Validation(_)));

    let err = phonebank
        .dispatch
        .record_response(Some("6"), Some("answered"), &a)
        .await
        .unwrap_err();
    assert!(matches!(err, PhonebankError::NotFound(_)));

    // Not whitelisted: rejected before anything is written
    let err = phonebank
        .dispatch
        .record_response(Some("5"), Some("answered"), &id("stranger@example.org"))
        .await
        .unwrap_err();
    assert!(matches!(err, PhonebankError::Unauthorized));
    let err = phonebank
        .dispatch
        .claim_next(&id("stranger@example.org"))
        .await
        .unwrap_err();
    assert!(matches!(err, PhonebankError::Unauthorized));

    let untouched = phonebank.db.get_recipient(5).await.unwrap().unwrap();
    assert!(!untouched.contacted);
    assert!(untouched.assigned_caller.is_none());

    cleanup(&db_path);
}

#[tokio::test]
async fn concurrent_atomic_claims_hand_out_a_number_once() {
    let (phonebank, db_path) = setup("concurrent-atomic", true).await;
    assert_eq!(phonebank.dispatch.mode(), ClaimMode::Atomic);
    whitelist(&phonebank, &["a@example.org", "b@example.org"]).await;
    phonebank
        .ingestion
        .ingest(&["777"], &id(ADMIN))
        .await
        .unwrap();

    let pa = phonebank.clone();
    let pb = phonebank.clone();
    let ta = tokio::spawn(async move { pa.dispatch.claim_next(&id("a@example.org")).await });
    let tb = tokio::spawn(async move { pb.dispatch.claim_next(&id("b@example.org")).await });
    let a = ta.await.unwrap().unwrap();
    let b = tb.await.unwrap().unwrap();

    let mut results = vec![a, b];
    results.sort();
    assert_eq!(results, vec![None, Some(777)]);

    cleanup(&db_path);
}

#[tokio::test]
#[ignore = "known race: legacy claim reads then writes, so two callers can both get the number"]
async fn concurrent_legacy_claims_may_double_assign() {
    let (phonebank, db_path) = setup("concurrent-legacy", false).await;
    assert_eq!(phonebank.dispatch.mode(), ClaimMode::Legacy);
    whitelist(&phonebank, &["a@example.org", "b@example.org"]).await;
    phonebank
        .ingestion
        .ingest(&["777"], &id(ADMIN))
        .await
        .unwrap();

    let pa = phonebank.clone();
    let pb = phonebank.clone();
    let ta = tokio::spawn(async move { pa.dispatch.claim_next(&id("a@example.org")).await });
    let tb = tokio::spawn(async move { pb.dispatch.claim_next(&id("b@example.org")).await });
    let a = ta.await.unwrap().unwrap();
    let b = tb.await.unwrap().unwrap();

    // Would hold with an atomic claim; the legacy path does not guarantee it.
    assert!(
        a.is_none() || b.is_none(),
        "both callers were handed {a:?}"
    );

    cleanup(&db_path);
}
