/// DDL to create the schema_version tracking table.
///
/// Applied unconditionally on every DB open (before checking the version),
/// using `IF NOT EXISTS` so it is safe to run multiple times.
pub const SCHEMA_VERSION_DDL: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL
    ) STRICT;
";

/// DDL for the full v1 schema.
///
/// Two tables:
/// - `sessions`: one row per console session, keyed by UUID v4 text. A
///   session is identified by the platform URL and operator name so that
///   relaunching against the same instance resumes the same session.
/// - `action_log`: local audit trail of bulk actions submitted from this
///   machine. `application_ids` holds a JSON array of application ids;
///   `comment` holds the encoded comment exactly as sent to the backend.
///
/// All tables use `STRICT` mode for type enforcement. Foreign keys use
/// `ON DELETE CASCADE` so removing a session cleans up its log rows.
pub const SCHEMA_V1_SQL: &str = "
    CREATE TABLE IF NOT EXISTS sessions (
        id          TEXT    PRIMARY KEY,
        api_url     TEXT    NOT NULL,
        operator    TEXT    NOT NULL,
        created_at  INTEGER NOT NULL,
        updated_at  INTEGER NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS action_log (
        id              TEXT    PRIMARY KEY,
        session_id      TEXT    NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
        kind            TEXT    NOT NULL
                                CHECK(kind IN ('status_change', 'assign_reviewer')),
        application_ids TEXT    NOT NULL,
        detail          TEXT    NOT NULL,
        comment         TEXT    NOT NULL DEFAULT '',
        outcome         TEXT    NOT NULL
                                CHECK(outcome IN ('accepted', 'failed')),
        created_at      INTEGER NOT NULL
    ) STRICT;
";

/// Runs forward-only schema migration to bring the DB to the latest version.
///
/// Idempotent: safe to call on every startup regardless of whether the
/// schema has already been applied.
///
/// # Process
///
/// 1. Creates the `schema_version` table if it does not exist.
/// 2. Reads the current version (`0` if the table is empty).
/// 3. If the version is below 1, applies `SCHEMA_V1_SQL` inside a
///    `BEGIN IMMEDIATE` transaction and records `version = 1`.
///
/// # Errors
///
/// Returns `rusqlite::Error` if the DDL fails or the version row cannot be read.
pub fn migrate(db: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    db.execute_batch(SCHEMA_VERSION_DDL)?;

    let version: i64 = db
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if version < 1 {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute_batch(SCHEMA_V1_SQL)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        tx.commit()?;
    }

    Ok(())
}
