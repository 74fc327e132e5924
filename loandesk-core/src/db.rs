use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::types::{ActionLogEntry, Session};

/// Opens (or creates) the SQLite database at `path`, configures WAL mode,
/// and applies schema migrations via the `schema_version` table.
///
/// This function is the single entry point for all database connections.
/// It sets `busy_timeout` via the `Connection` method (not a PRAGMA string)
/// so the setting takes effect regardless of pragma caching.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the file cannot be opened, WAL
/// configuration fails, or schema DDL fails.
pub async fn open_db(path: &str) -> Result<Connection, tokio_rusqlite::Error> {
    let conn = Connection::open(path).await?;

    // Step 1: WAL pragmas — connection-level settings re-applied on every open.
    conn.call(|db| {
        db.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )?;
        db.busy_timeout(Duration::from_secs(5))?;
        Ok(())
    })
    .await?;

    // Step 2: Checkpoint any leftover WAL from a previous run.
    conn.call(|db| {
        db.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    })
    .await?;

    // Step 3: Apply schema migrations via the schema_version table.
    conn.call(|db| {
        crate::schema::migrate(db)?;
        Ok(())
    })
    .await?;

    Ok(conn)
}

/// Returns the current Unix timestamp in seconds.
fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Finds the most recent session for `api_url + operator`, or creates one.
///
/// On resume: updates `updated_at` to the current time via `BEGIN IMMEDIATE`.
/// On create: generates a new UUID v4 and inserts the session.
///
/// Called before the first event-loop frame so the session id is available
/// to the action log from the very first bulk submit.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the query or write transaction fails.
pub async fn open_or_create_session(
    conn: &Connection,
    api_url: &str,
    operator: &str,
) -> Result<Session, tokio_rusqlite::Error> {
    let api_url = api_url.to_owned();
    let operator = operator.to_owned();

    conn.call(move |db| {
        let existing: Option<Session> = db
            .query_row(
                "SELECT id, api_url, operator, created_at, updated_at
                 FROM sessions
                 WHERE api_url = ?1 AND operator = ?2
                 ORDER BY updated_at DESC
                 LIMIT 1",
                rusqlite::params![&api_url, &operator],
                |r| {
                    Ok(Session {
                        id: r.get(0)?,
                        api_url: r.get(1)?,
                        operator: r.get(2)?,
                        created_at: r.get(3)?,
                        updated_at: r.get(4)?,
                    })
                },
            )
            .optional()?;

        if let Some(session) = existing {
            let now = now_secs();
            let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
            tx.execute(
                "UPDATE sessions SET updated_at = ?1 WHERE id = ?2",
                rusqlite::params![now, &session.id],
            )?;
            tx.commit()?;
            Ok(session)
        } else {
            let id = uuid::Uuid::new_v4().to_string();
            let now = now_secs();
            let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
            tx.execute(
                "INSERT INTO sessions (id, api_url, operator, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                rusqlite::params![&id, &api_url, &operator, now],
            )?;
            tx.commit()?;
            Ok(Session {
                id,
                api_url,
                operator,
                created_at: now,
                updated_at: now,
            })
        }
    })
    .await
}

/// Input for one action-log row; id and timestamp are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewActionLog {
    pub session_id: String,
    /// `"status_change"` or `"assign_reviewer"`.
    pub kind: String,
    pub application_ids: Vec<String>,
    pub detail: String,
    pub comment: String,
    /// `"accepted"` or `"failed"`.
    pub outcome: String,
}

/// Appends one bulk-action outcome to the local audit trail.
///
/// `application_ids` is serialized to JSON array text; the CHECK
/// constraints on `kind` and `outcome` reject anything but the known
/// values at the SQLite level.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if serialization or the insert fails.
pub async fn record_bulk_action(
    conn: &Connection,
    entry: NewActionLog,
) -> Result<(), tokio_rusqlite::Error> {
    conn.call(move |db| {
        let ids_json = serde_json::to_string(&entry.application_ids)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_secs();
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO action_log
                 (id, session_id, kind, application_ids, detail, comment, outcome, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                &id,
                &entry.session_id,
                &entry.kind,
                &ids_json,
                &entry.detail,
                &entry.comment,
                &entry.outcome,
                now
            ],
        )?;
        tx.commit()?;
        Ok(())
    })
    .await
}

/// Loads the most recent `limit` action-log rows for `session_id`,
/// newest first. Rows whose `application_ids` text fails to decode are
/// returned with an empty id list rather than failing the whole read.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the query fails.
pub async fn recent_actions(
    conn: &Connection,
    session_id: &str,
    limit: u32,
) -> Result<Vec<ActionLogEntry>, tokio_rusqlite::Error> {
    let session_id = session_id.to_owned();

    conn.call(move |db| {
        let mut stmt = db.prepare(
            "SELECT id, session_id, kind, application_ids, detail, comment, outcome, created_at
             FROM action_log
             WHERE session_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![&session_id, limit], |r| {
                let ids_json: String = r.get(3)?;
                Ok(ActionLogEntry {
                    id: r.get(0)?,
                    session_id: r.get(1)?,
                    kind: r.get(2)?,
                    application_ids: serde_json::from_str(&ids_json).unwrap_or_default(),
                    detail: r.get(4)?,
                    comment: r.get(5)?,
                    outcome: r.get(6)?,
                    created_at: r.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    })
    .await
}

/// Updates the `updated_at` timestamp for `session_id` to the current time.
///
/// Called on quit so `open_or_create_session` resumes the right session
/// next launch.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the `BEGIN IMMEDIATE` transaction fails.
pub async fn touch_session(
    conn: &Connection,
    session_id: &str,
) -> Result<(), tokio_rusqlite::Error> {
    let session_id = session_id.to_owned();

    conn.call(move |db| {
        let now = now_secs();
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute(
            "UPDATE sessions SET updated_at = ?1 WHERE id = ?2",
            rusqlite::params![now, &session_id],
        )?;
        tx.commit()?;
        Ok(())
    })
    .await
}
