//! Schema migrations.
//!
//! Versioned via `PRAGMA user_version`. Each migration runs in order inside
//! a transaction-free batch; statements are written to be idempotent.

use rusqlite::Connection;

use crate::error::StoreError;

const MIGRATIONS: [&str; 1] = [
    // v1: initial schema.
    "CREATE TABLE IF NOT EXISTS profiles (
        profile_id   TEXT PRIMARY KEY,
        display_name TEXT NOT NULL,
        vault_root   TEXT NOT NULL,
        start_date   TEXT,
        active       INTEGER NOT NULL DEFAULT 0
    );
    CREATE TABLE IF NOT EXISTS chat_sessions (
        session_id TEXT PRIMARY KEY,
        profile_id TEXT NOT NULL REFERENCES profiles(profile_id),
        day        TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (profile_id, day)
    );
    CREATE TABLE IF NOT EXISTS chat_messages (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id TEXT NOT NULL REFERENCES chat_sessions(session_id),
        profile_id TEXT NOT NULL,
        role       TEXT NOT NULL,
        content    TEXT NOT NULL,
        metadata   TEXT,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_messages_session
        ON chat_messages(session_id, id);",
];

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    for (index, sql) in MIGRATIONS.iter().enumerate() {
        let version = (index + 1) as i64;
        if version <= current {
            continue;
        }
        conn.execute_batch(sql)?;
        conn.execute_batch(&format!("PRAGMA user_version = {}", version))?;
        tracing::info!(version, "Migration applied");
    }
    Ok(())
}
