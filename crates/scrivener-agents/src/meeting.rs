//! Meeting writer.
//!
//! Summarizes meeting notes into a structured note and cascades action
//! items into the day's task file. If the cascade fails after the meeting
//! note is written, the outcome is partial rather than failed.

use std::sync::Arc;

use async_trait::async_trait;

use scrivener_vault::{build_frontmatter, slugify, Category, VaultStore};

use crate::llm::{LanguageModel, TaskItem};
use crate::tasks::write_task_file;
use crate::writer::{WriteOutcome, WriteRequest, Writer, WriterError, WriterKind};

pub struct MeetingWriter {
    model: Arc<dyn LanguageModel>,
}

impl MeetingWriter {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

fn bullet_section(items: &[String]) -> Vec<String> {
    if items.is_empty() {
        vec!["- None recorded.".to_string()]
    } else {
        items.iter().map(|item| format!("- {}", item)).collect()
    }
}

#[async_trait]
impl Writer for MeetingWriter {
    fn kind(&self) -> WriterKind {
        WriterKind::Meeting
    }

    async fn execute(
        &self,
        vault: &VaultStore,
        request: &WriteRequest,
    ) -> Result<WriteOutcome, WriterError> {
        if request.text.trim().is_empty() {
            return Err(WriterError::InvalidRequest(
                "Meeting notes must not be empty".to_string(),
            ));
        }

        let summary = self.model.summarize_meeting(&request.text).await?;
        let title = summary.title.trim().to_string();

        let frontmatter =
            build_frontmatter(&title, request.date, &["meeting"], Some(summary.summary.trim()));
        let mut lines = vec![
            frontmatter,
            String::new(),
            format!("# {}", title),
            String::new(),
            "## Summary".to_string(),
            summary.summary.trim().to_string(),
            String::new(),
            "## Decisions".to_string(),
        ];
        lines.extend(bullet_section(&summary.decisions));
        lines.push(String::new());
        lines.push("## Action Items".to_string());
        lines.extend(bullet_section(&summary.action_items));
        if !summary.participants.is_empty() {
            lines.push(String::new());
            lines.push("## Participants".to_string());
            lines.extend(summary.participants.iter().map(|p| format!("- {}", p)));
        }
        let content = format!("{}\n", lines.join("\n").trim_end());

        let meetings_base = vault.week_subpath(request.date, Category::Meetings)?;
        let meeting_path = meetings_base.join(format!("{}.md", slugify(&title)));
        vault.write_markdown(&meeting_path, &content)?;
        tracing::info!(path = %meeting_path.display(), "Meeting summarized");

        let mut outcome = WriteOutcome::new("Meeting summarized and tasks updated for the selected week.");
        outcome.actions.push("meeting_summarized".to_string());
        outcome.files.push(meeting_path);

        let tasks: Vec<TaskItem> = summary
            .action_items
            .iter()
            .map(|item| TaskItem::todo(item.clone()))
            .collect();
        match write_task_file(vault, request.date, &tasks, &[]) {
            Ok(task_file) => {
                if !tasks.is_empty() {
                    outcome.actions.push("tasks_created".to_string());
                }
                outcome.files.push(task_file);
            }
            Err(e) => {
                // The meeting note is already on disk; report a partial write.
                tracing::warn!(error = %e, "Task cascade failed after meeting note was written");
                outcome.partial = true;
                outcome.message =
                    format!("Meeting note saved, but the task cascade failed: {}", e);
            }
        }
        Ok(outcome)
    }

    fn describe(&self, request: &WriteRequest) -> String {
        let preview: String = request.text.chars().take(50).collect();
        format!("Summarize the meeting and file action items from: {}", preview)
    }
}
