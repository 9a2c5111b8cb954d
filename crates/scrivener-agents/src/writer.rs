//! Writer trait and registry.
//!
//! A writer persists one kind of structured artifact given a request
//! already bound to a date partition. The registry dispatches by kind.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use scrivener_vault::{VaultError, VaultStore};

use crate::llm::{LanguageModel, LlmError};

/// Writer kinds, one per artifact family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriterKind {
    Notes,
    Tasks,
    Meeting,
    Progress,
    Report,
}

impl fmt::Display for WriterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriterKind::Notes => write!(f, "notes"),
            WriterKind::Tasks => write!(f, "tasks"),
            WriterKind::Meeting => write!(f, "meeting"),
            WriterKind::Progress => write!(f, "progress"),
            WriterKind::Report => write!(f, "report"),
        }
    }
}

impl std::str::FromStr for WriterKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notes" => Ok(WriterKind::Notes),
            "tasks" => Ok(WriterKind::Tasks),
            "meeting" => Ok(WriterKind::Meeting),
            "progress" => Ok(WriterKind::Progress),
            "report" => Ok(WriterKind::Report),
            _ => Err(format!("Unknown writer kind: {}", s)),
        }
    }
}

/// A write request bound to a date.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    /// Source text the artifact is derived from.
    pub text: String,
    /// Date the artifact is partitioned under.
    pub date: NaiveDate,
    /// Optional notes category hint (Meetings, Learning, Ideas).
    pub category: Option<String>,
}

/// Result of a successful (possibly partial) write.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// Human-readable description of what happened.
    pub message: String,
    /// Action labels performed, e.g. "tasks_created".
    pub actions: Vec<String>,
    /// Files written, relative to the vault root.
    pub files: Vec<PathBuf>,
    /// True when a follow-up step failed after the primary artifact was
    /// already written.
    pub partial: bool,
}

impl WriteOutcome {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            actions: Vec::new(),
            files: Vec::new(),
            partial: false,
        }
    }
}

/// Errors from writer execution.
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Model(#[from] LlmError),
    #[error(transparent)]
    Vault(#[from] VaultError),
}

/// A writer capability: persists one artifact family into the vault.
#[async_trait]
pub trait Writer: Send + Sync {
    /// The kind this writer handles.
    fn kind(&self) -> WriterKind;

    /// Perform the write. Must be safe to call at most once per confirmed
    /// action; retries are the caller's decision, not the writer's.
    async fn execute(
        &self,
        vault: &VaultStore,
        request: &WriteRequest,
    ) -> Result<WriteOutcome, WriterError>;

    /// Short human-readable description of what the write would do.
    fn describe(&self, request: &WriteRequest) -> String;
}

/// Registry mapping writer kinds to implementations.
#[derive(Default)]
pub struct WriterRegistry {
    writers: HashMap<WriterKind, Box<dyn Writer>>,
}

impl WriterRegistry {
    pub fn new() -> Self {
        Self {
            writers: HashMap::new(),
        }
    }

    /// Register a writer, replacing any existing one of the same kind.
    pub fn register(&mut self, writer: Box<dyn Writer>) {
        self.writers.insert(writer.kind(), writer);
    }

    /// Register the five default writers backed by the given model.
    pub fn register_defaults(&mut self, model: Arc<dyn LanguageModel>) {
        self.register(Box::new(crate::notes::NotesWriter::new(Arc::clone(&model))));
        self.register(Box::new(crate::tasks::TasksWriter::new(Arc::clone(&model))));
        self.register(Box::new(crate::meeting::MeetingWriter::new(Arc::clone(
            &model,
        ))));
        self.register(Box::new(crate::progress::ProgressWriter::new(Arc::clone(
            &model,
        ))));
        self.register(Box::new(crate::report::ReportWriter::new(model)));
    }

    pub fn get(&self, kind: WriterKind) -> Option<&dyn Writer> {
        self.writers.get(&kind).map(Box::as_ref)
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }
}
