//! Profile management.
//!
//! A profile scopes one vault root and one conversation history. At most
//! one profile is active at a time; activation is flipped inside a single
//! transaction so the invariant holds even across concurrent callers.

use std::sync::Arc;

use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

use scrivener_core::ProfileId;

use crate::db::Database;
use crate::error::StoreError;

/// A stored profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: ProfileId,
    pub display_name: String,
    pub vault_root: String,
    pub start_date: Option<String>,
    pub active: bool,
}

/// Store for profile rows.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    db: Arc<Database>,
}

impl ProfileStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The currently active profile, if any.
    pub fn active(&self) -> Result<Option<Profile>, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT profile_id, display_name, vault_root, start_date, active
                 FROM profiles WHERE active = 1 LIMIT 1",
                [],
                row_to_profile,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    /// Fetch a profile by id.
    pub fn get(&self, id: ProfileId) -> Result<Option<Profile>, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT profile_id, display_name, vault_root, start_date, active
                 FROM profiles WHERE profile_id = ?1",
                params![id.to_string()],
                row_to_profile,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    /// All profiles, ordered by display name.
    pub fn list(&self) -> Result<Vec<Profile>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT profile_id, display_name, vault_root, start_date, active
                 FROM profiles ORDER BY display_name ASC",
            )?;
            let rows = stmt.query_map([], row_to_profile)?;
            let mut profiles = Vec::new();
            for row in rows {
                profiles.push(row?);
            }
            Ok(profiles)
        })
    }

    /// Create a profile, optionally activating it (deactivating the rest).
    pub fn create(
        &self,
        display_name: &str,
        vault_root: &str,
        start_date: Option<&str>,
        activate: bool,
    ) -> Result<Profile, StoreError> {
        let id = ProfileId::new();
        self.db.with_conn(|conn| {
            if activate {
                conn.execute("UPDATE profiles SET active = 0", [])?;
            }
            conn.execute(
                "INSERT INTO profiles (profile_id, display_name, vault_root, start_date, active)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id.to_string(),
                    display_name,
                    vault_root,
                    start_date,
                    activate as i64
                ],
            )?;
            Ok(())
        })?;
        tracing::info!(profile = %id, activate, "Profile created");
        Ok(Profile {
            id,
            display_name: display_name.to_string(),
            vault_root: vault_root.to_string(),
            start_date: start_date.map(str::to_string),
            active: activate,
        })
    }

    /// Make a profile the single active one.
    ///
    /// Returns `NotFound` if the profile does not exist.
    pub fn switch(&self, id: ProfileId) -> Result<Profile, StoreError> {
        self.db.with_conn(|conn| {
            let exists: Option<String> = conn
                .query_row(
                    "SELECT profile_id FROM profiles WHERE profile_id = ?1",
                    params![id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(StoreError::NotFound(format!("profile {}", id)));
            }
            conn.execute("UPDATE profiles SET active = 0", [])?;
            conn.execute(
                "UPDATE profiles SET active = 1 WHERE profile_id = ?1",
                params![id.to_string()],
            )?;
            Ok(())
        })?;
        self.get(id)?
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", id)))
    }

    /// Update mutable profile fields. Unset fields are left as-is.
    pub fn update(
        &self,
        id: ProfileId,
        display_name: Option<&str>,
        vault_root: Option<&str>,
        start_date: Option<&str>,
    ) -> Result<Profile, StoreError> {
        self.db.with_conn(|conn| {
            if let Some(name) = display_name {
                conn.execute(
                    "UPDATE profiles SET display_name = ?1 WHERE profile_id = ?2",
                    params![name, id.to_string()],
                )?;
            }
            if let Some(root) = vault_root {
                conn.execute(
                    "UPDATE profiles SET vault_root = ?1 WHERE profile_id = ?2",
                    params![root, id.to_string()],
                )?;
            }
            if let Some(date) = start_date {
                conn.execute(
                    "UPDATE profiles SET start_date = ?1 WHERE profile_id = ?2",
                    params![date, id.to_string()],
                )?;
            }
            Ok(())
        })?;
        self.get(id)?
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", id)))
    }

    /// Return the active profile, creating a default one if none exists.
    pub fn ensure_default(&self, vault_root: &str) -> Result<Profile, StoreError> {
        if let Some(profile) = self.active()? {
            return Ok(profile);
        }
        self.create("Default", vault_root, None, true)
    }
}

fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<Profile> {
    let id_text: String = row.get(0)?;
    let id = Uuid::parse_str(&id_text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Profile {
        id: ProfileId(id),
        display_name: row.get(1)?,
        vault_root: row.get(2)?,
        start_date: row.get(3)?,
        active: row.get::<_, i64>(4)? != 0,
    })
}
