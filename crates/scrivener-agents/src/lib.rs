//! Writer capabilities for Scrivener.
//!
//! Each writer turns free text into a structured Markdown artifact in the
//! vault, driven through the `LanguageModel` capability interface. Writers
//! are dispatched by kind through the `WriterRegistry`.

pub mod llm;
pub mod meeting;
pub mod notes;
pub mod outline;
pub mod progress;
pub mod report;
pub mod tasks;
pub mod writer;

pub use llm::{
    DailyProgress, LanguageModel, LlmError, MeetingSummary, OrganizedNote, ProgressInputs,
    TaskItem, TaskState, WeeklyProgress, WeeklyReport,
};
pub use outline::OutlineModel;
pub use writer::{WriteOutcome, WriteRequest, Writer, WriterError, WriterKind, WriterRegistry};
