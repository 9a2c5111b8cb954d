//! Language-model capability interface.
//!
//! One method per capability the writers consume; concrete adapters are
//! injected at construction. The decision layer never depends on how an
//! adapter produces its output, only on these typed results. Adapters must
//! not invent content: empty inputs yield empty lists.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a language-model adapter.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Model unavailable: {0}")]
    Unavailable(String),
    #[error("Model returned malformed output: {0}")]
    Malformed(String),
    #[error("Model request timed out after {0} seconds")]
    Timeout(u64),
}

/// Completion state of an extracted task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    #[default]
    Todo,
    Done,
}

/// A cleaned-up note produced from raw text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizedNote {
    pub title: String,
    pub summary: String,
    pub cleaned_markdown: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A single actionable task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskItem {
    pub description: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub state: TaskState,
}

impl TaskItem {
    pub fn todo(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            due_date: None,
            state: TaskState::Todo,
        }
    }
}

/// A structured meeting summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub decisions: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub participants: Vec<String>,
}

/// User-supplied progress inputs for a day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressInputs {
    #[serde(default)]
    pub done: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

/// A generated daily progress entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyProgress {
    pub summary: String,
    #[serde(default)]
    pub done: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// A generated weekly progress roll-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyProgress {
    pub summary: String,
    #[serde(default)]
    pub accomplishments: Vec<String>,
    #[serde(default)]
    pub meetings: Vec<String>,
    #[serde(default)]
    pub tasks_completed: Vec<String>,
    #[serde(default)]
    pub tasks_pending: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub next_week: Vec<String>,
}

/// A generated weekly report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub next_week: Vec<String>,
}

/// Capability interface to the language-model backend.
///
/// Every method is total from the caller's perspective: it returns a value
/// or an `LlmError` the caller degrades on. Nothing here writes files.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Conversational reply. Must not claim to have performed actions.
    async fn respond(&self, text: &str, history: &str) -> Result<String, LlmError>;

    /// Answer a reflective question strictly from the provided context.
    async fn answer_from_context(&self, question: &str, context: &str)
        -> Result<String, LlmError>;

    /// Clean raw notes into a titled Markdown note.
    async fn organize_note(&self, raw_text: &str) -> Result<OrganizedNote, LlmError>;

    /// Extract actionable tasks from text.
    async fn extract_tasks(&self, source_text: &str) -> Result<Vec<TaskItem>, LlmError>;

    /// Summarize meeting notes into decisions and action items.
    async fn summarize_meeting(&self, raw_text: &str) -> Result<MeetingSummary, LlmError>;

    /// Compose a daily progress entry from inputs and vault context.
    async fn daily_progress(
        &self,
        date: NaiveDate,
        inputs: &ProgressInputs,
        context: &str,
    ) -> Result<DailyProgress, LlmError>;

    /// Compose a weekly progress roll-up from the week's vault context.
    async fn weekly_progress(&self, context: &str) -> Result<WeeklyProgress, LlmError>;

    /// Compose a weekly report from the trailing daily logs.
    async fn weekly_report(&self, context: &str) -> Result<WeeklyReport, LlmError>;
}
