//! Integration test for the local store lifecycle.
//!
//! Exercises: open_db, migrate, open_or_create_session,
//! record_bulk_action, recent_actions, touch_session.

use loandesk_core::db::{self, NewActionLog};

fn temp_db_path() -> String {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.keep().join("test.db");
    path.to_string_lossy().to_string()
}

fn log_entry(session_id: &str, ids: &[&str], detail: &str, outcome: &str) -> NewActionLog {
    NewActionLog {
        session_id: session_id.to_owned(),
        kind: "status_change".to_owned(),
        application_ids: ids.iter().map(|s| s.to_string()).collect(),
        detail: detail.to_owned(),
        comment: "[Policy Violation] flagged by compliance".to_owned(),
        outcome: outcome.to_owned(),
    }
}

#[tokio::test]
async fn full_session_lifecycle() {
    let path = temp_db_path();
    let conn = db::open_db(&path).await.unwrap();

    // Verify schema_version = 1
    let version: i64 = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(db.query_row(
                "SELECT MAX(version) FROM schema_version",
                [],
                |r| r.get(0),
            )?)
        })
        .await
        .unwrap();
    assert_eq!(version, 1, "schema_version should be 1");

    // Verify WAL mode
    let journal: String = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(
                db.query_row("PRAGMA journal_mode", [], |r| r.get(0))?,
            )
        })
        .await
        .unwrap();
    assert_eq!(journal, "wal", "journal_mode should be wal");

    // Verify action_log table exists (empty)
    let log_count: i64 = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(
                db.query_row("SELECT COUNT(*) FROM action_log", [], |r| r.get(0))?,
            )
        })
        .await
        .unwrap();
    assert_eq!(log_count, 0, "action_log table should exist and be empty");

    // Verify sessions table has TEXT primary key
    let session_pk_type: String = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(db.query_row(
                "SELECT type FROM pragma_table_info('sessions') WHERE name = 'id'",
                [],
                |r| r.get(0),
            )?)
        })
        .await
        .unwrap();
    assert_eq!(session_pk_type, "TEXT", "sessions.id should be TEXT");

    // Create a session
    let session = db::open_or_create_session(&conn, "https://loans.example.test", "ana")
        .await
        .unwrap();
    assert!(!session.id.is_empty(), "session ID should be non-empty UUID");
    assert_eq!(session.api_url, "https://loans.example.test");
    assert_eq!(session.operator, "ana");

    // Resume same session (should return same ID)
    let resumed = db::open_or_create_session(&conn, "https://loans.example.test", "ana")
        .await
        .unwrap();
    assert_eq!(resumed.id, session.id, "should resume same session");

    // Different operator creates new session
    let other = db::open_or_create_session(&conn, "https://loans.example.test", "mikkel")
        .await
        .unwrap();
    assert_ne!(other.id, session.id, "different operator = new session");

    // Session count should be 2
    let count: i64 = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(
                db.query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0))?,
            )
        })
        .await
        .unwrap();
    assert_eq!(count, 2, "should have 2 sessions");

    // Record two bulk actions for the first session, one for the other
    db::record_bulk_action(&conn, log_entry(&session.id, &["la-1", "la-2"], "REJECTED", "accepted"))
        .await
        .unwrap();
    db::record_bulk_action(&conn, log_entry(&session.id, &["la-3"], "APPROVED", "failed"))
        .await
        .unwrap();
    db::record_bulk_action(&conn, log_entry(&other.id, &["la-9"], "APPROVED", "accepted"))
        .await
        .unwrap();

    // recent_actions is per-session and decodes the stored id array
    let actions = db::recent_actions(&conn, &session.id, 10).await.unwrap();
    assert_eq!(actions.len(), 2, "only this session's actions");
    let rejected = actions
        .iter()
        .find(|a| a.detail == "REJECTED")
        .expect("rejected batch present");
    assert_eq!(rejected.application_ids, ["la-1", "la-2"]);
    assert_eq!(rejected.outcome, "accepted");
    assert_eq!(rejected.comment, "[Policy Violation] flagged by compliance");

    // The limit caps the result
    let actions = db::recent_actions(&conn, &session.id, 1).await.unwrap();
    assert_eq!(actions.len(), 1);

    // Unknown kind/outcome values are rejected by the CHECK constraints
    let bad = NewActionLog {
        kind: "delete_everything".to_owned(),
        ..log_entry(&session.id, &["la-1"], "REJECTED", "accepted")
    };
    assert!(db::record_bulk_action(&conn, bad).await.is_err());

    // Update session timestamp
    db::touch_session(&conn, &session.id).await.unwrap();

    // Verify persistence: open a second connection to the same DB
    let conn2 = db::open_db(&path).await.unwrap();
    let actions2 = db::recent_actions(&conn2, &session.id, 10).await.unwrap();
    assert_eq!(
        actions2.len(),
        2,
        "action log should persist across connections"
    );
}

#[tokio::test]
async fn migration_is_idempotent_across_reopens() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("reopen.db").to_string_lossy().to_string();

    {
        let conn = db::open_db(&path).await.unwrap();
        db::open_or_create_session(&conn, "https://loans.example.test", "ana")
            .await
            .unwrap();
    }

    // Second open re-runs the pragmas and migrate() against version 1.
    let conn = db::open_db(&path).await.unwrap();
    let version: i64 = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(db.query_row(
                "SELECT COUNT(*) FROM schema_version",
                [],
                |r| r.get(0),
            )?)
        })
        .await
        .unwrap();
    assert_eq!(version, 1, "migrate must not insert a second version row");

    let sessions: i64 = conn
        .call(|db| {
            Ok::<_, rusqlite::Error>(
                db.query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0))?,
            )
        })
        .await
        .unwrap();
    assert_eq!(sessions, 1, "existing data survives the reopen");
}
