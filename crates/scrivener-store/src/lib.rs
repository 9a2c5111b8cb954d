//! Durable storage for Scrivener: profiles and chat transcripts.
//!
//! Backed by SQLite through a single mutex-guarded connection. The vault's
//! Markdown files are handled by `scrivener-vault`; this crate only owns
//! relational state.

pub mod db;
pub mod error;
pub mod migrations;
pub mod profiles;
pub mod transcript;

pub use db::Database;
pub use error::StoreError;
pub use profiles::{Profile, ProfileStore};
pub use transcript::{SessionSummary, StoredMessage, TranscriptStore};
