//! Chat transcript persistence.
//!
//! One "daily session" per (profile, day); messages are append-only and
//! ordered by insertion. Assistant messages may carry structured metadata
//! (intent, action, reason, files) serialized as JSON.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

use scrivener_core::{ProfileId, Role, SessionId};

use crate::db::Database;
use crate::error::StoreError;

/// A persisted transcript message.
#[derive(Debug, Clone, Serialize)]
pub struct StoredMessage {
    pub role: Role,
    pub content: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: String,
}

/// Summary row for a session listing.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub day: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Store for sessions and their messages.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    db: Arc<Database>,
}

impl TranscriptStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Get or create the daily session for a profile.
    ///
    /// Exactly one session exists per (profile, day); repeated calls on the
    /// same day return the same id.
    pub fn daily_session(
        &self,
        profile: ProfileId,
        day: NaiveDate,
    ) -> Result<SessionId, StoreError> {
        let day_str = day.format("%Y-%m-%d").to_string();
        self.db.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT session_id FROM chat_sessions
                     WHERE profile_id = ?1 AND day = ?2",
                    params![profile.to_string(), day_str],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(id_text) = existing {
                return parse_session_id(&id_text);
            }

            let id = SessionId::new();
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO chat_sessions (session_id, profile_id, day, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![id.to_string(), profile.to_string(), day_str, now],
            )?;
            tracing::info!(session = %id, profile = %profile, day = %day_str, "Daily session created");
            Ok(id)
        })
    }

    /// Whether a session exists.
    pub fn session_exists(&self, session: SessionId) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let found: Option<String> = conn
                .query_row(
                    "SELECT session_id FROM chat_sessions WHERE session_id = ?1",
                    params![session.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Append a message and touch the session's updated_at.
    pub fn append(
        &self,
        session: SessionId,
        profile: ProfileId,
        role: Role,
        content: &str,
        metadata: Option<&serde_json::Value>,
    ) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let metadata_text = metadata.map(|m| m.to_string());
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chat_messages (session_id, profile_id, role, content, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    session.to_string(),
                    profile.to_string(),
                    role.to_string(),
                    content,
                    metadata_text,
                    now
                ],
            )?;
            conn.execute(
                "UPDATE chat_sessions SET updated_at = ?1 WHERE session_id = ?2",
                params![now, session.to_string()],
            )?;
            Ok(())
        })
    }

    /// Messages for a session in insertion order, up to `limit`.
    pub fn history(
        &self,
        session: SessionId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT role, content, metadata, created_at FROM chat_messages
                 WHERE session_id = ?1 ORDER BY id ASC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![session.to_string(), limit as i64], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
    }

    /// Role-prefixed transcript lines for prompt assembly.
    pub fn context(&self, session: SessionId, limit: usize) -> Result<String, StoreError> {
        let messages = self.history(session, limit)?;
        let lines: Vec<String> = messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect();
        Ok(lines.join("\n").trim().to_string())
    }

    /// Sessions for a profile, newest first.
    pub fn sessions(&self, profile: ProfileId) -> Result<Vec<SessionSummary>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT session_id, day, created_at, updated_at FROM chat_sessions
                 WHERE profile_id = ?1 ORDER BY updated_at DESC",
            )?;
            let rows = stmt.query_map(params![profile.to_string()], |row| {
                let id_text: String = row.get(0)?;
                Ok((id_text, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
            let mut sessions = Vec::new();
            for row in rows {
                let (id_text, day, created_at, updated_at) = row?;
                sessions.push(SessionSummary {
                    id: parse_session_id(&id_text)?,
                    day,
                    created_at,
                    updated_at,
                });
            }
            Ok(sessions)
        })
    }

    /// Delete all messages in a session (the session row remains).
    pub fn clear(&self, session: SessionId) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM chat_messages WHERE session_id = ?1",
                params![session.to_string()],
            )?;
            Ok(())
        })
    }
}

fn parse_session_id(text: &str) -> Result<SessionId, StoreError> {
    Uuid::parse_str(text)
        .map(SessionId)
        .map_err(|e| StoreError::Query(format!("invalid session id {}: {}", text, e)))
}

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<StoredMessage> {
    let role_text: String = row.get(0)?;
    let role = role_text.parse::<Role>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            e.into(),
        )
    })?;
    let metadata_text: Option<String> = row.get(2)?;
    let metadata = metadata_text.and_then(|m| serde_json::from_str(&m).ok());
    Ok(StoredMessage {
        role,
        content: row.get(1)?,
        metadata,
        created_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TranscriptStore, ProfileId, SessionId) {
        let db = Arc::new(Database::in_memory().unwrap());
        let profiles = crate::profiles::ProfileStore::new(Arc::clone(&db));
        let profile = profiles.create("Test", "/vault", None, true).unwrap();
        let store = TranscriptStore::new(db);
        let day = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        let session = store.daily_session(profile.id, day).unwrap();
        (store, profile.id, session)
    }

    #[test]
    fn test_daily_session_is_stable_within_a_day() {
        let (store, profile, session) = setup();
        let day = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        assert_eq!(store.daily_session(profile, day).unwrap(), session);
    }

    #[test]
    fn test_new_day_creates_new_session() {
        let (store, profile, session) = setup();
        let next_day = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
        let other = store.daily_session(profile, next_day).unwrap();
        assert_ne!(session, other);
    }

    #[test]
    fn test_append_and_history_preserve_order() {
        let (store, profile, session) = setup();
        store.append(session, profile, Role::User, "first", None).unwrap();
        store
            .append(session, profile, Role::Assistant, "second", None)
            .unwrap();
        store.append(session, profile, Role::User, "third", None).unwrap();

        let history = store.history(session, 50).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].content, "first");
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[2].content, "third");
    }

    #[test]
    fn test_metadata_round_trip() {
        let (store, profile, session) = setup();
        let meta = serde_json::json!({"action": "act", "files": ["a.md"]});
        store
            .append(session, profile, Role::Assistant, "done", Some(&meta))
            .unwrap();

        let history = store.history(session, 10).unwrap();
        assert_eq!(history[0].metadata.as_ref().unwrap()["action"], "act");
    }

    #[test]
    fn test_context_formats_role_lines() {
        let (store, profile, session) = setup();
        store.append(session, profile, Role::User, "hi", None).unwrap();
        store.append(session, profile, Role::Assistant, "hello", None).unwrap();
        assert_eq!(
            store.context(session, 10).unwrap(),
            "user: hi\nassistant: hello"
        );
    }

    #[test]
    fn test_clear_removes_messages_keeps_session() {
        let (store, profile, session) = setup();
        store.append(session, profile, Role::User, "hi", None).unwrap();
        store.clear(session).unwrap();
        assert!(store.history(session, 10).unwrap().is_empty());
        assert!(store.session_exists(session).unwrap());
    }

    #[test]
    fn test_sessions_listing() {
        let (store, profile, _session) = setup();
        let next_day = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
        store.daily_session(profile, next_day).unwrap();
        let sessions = store.sessions(profile).unwrap();
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_history_limit() {
        let (store, profile, session) = setup();
        for i in 0..10 {
            store
                .append(session, profile, Role::User, &format!("m{}", i), None)
                .unwrap();
        }
        assert_eq!(store.history(session, 4).unwrap().len(), 4);
    }
}
