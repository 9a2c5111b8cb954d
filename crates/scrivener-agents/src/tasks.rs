//! Tasks writer.
//!
//! Extracts actionable tasks and writes them as checkbox lists into the
//! week's task file. The file accumulates: later extractions on the same
//! day append a dated section rather than replacing earlier tasks.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use scrivener_vault::{build_frontmatter, Category, Partition, VaultError, VaultStore};

use crate::llm::{LanguageModel, TaskItem, TaskState};
use crate::writer::{WriteOutcome, WriteRequest, Writer, WriterError, WriterKind};

pub struct TasksWriter {
    model: Arc<dyn LanguageModel>,
}

impl TasksWriter {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

/// Relative path of the day's task file.
pub fn task_file_path(date: NaiveDate) -> PathBuf {
    Partition::resolve(date)
        .subpath(Category::Tasks)
        .join(format!("{}-tasks.md", date.format("%Y-%m-%d")))
}

/// Write (or append) tasks into the day's task file.
///
/// The first write of the day lays down frontmatter, a heading, and a
/// Blockers section; subsequent writes append an "Extracted Tasks" section.
pub fn write_task_file(
    vault: &VaultStore,
    date: NaiveDate,
    tasks: &[TaskItem],
    blockers: &[String],
) -> Result<PathBuf, WriterError> {
    let date_str = date.format("%Y-%m-%d").to_string();
    vault.week_subpath(date, Category::Tasks)?;
    let task_file = task_file_path(date);
    let file_exists = vault.exists(&task_file);

    let mut lines: Vec<String> = if file_exists {
        vec![format!("## Extracted Tasks ({})", date_str), String::new()]
    } else {
        vec![
            build_frontmatter(&format!("Tasks {}", date_str), date, &["tasks"], None),
            String::new(),
            format!("# Tasks {}", date_str),
            String::new(),
        ]
    };

    if tasks.is_empty() {
        lines.push("- [ ] No tasks extracted.".to_string());
    } else {
        for task in tasks {
            let checkbox = match task.state {
                TaskState::Done => "[x]",
                TaskState::Todo => "[ ]",
            };
            let due = task
                .due_date
                .as_deref()
                .map(|d| format!(" (due: {})", d))
                .unwrap_or_default();
            lines.push(format!("- {} {}{}", checkbox, task.description.trim(), due));
        }
    }

    if !file_exists {
        lines.push(String::new());
        lines.push("## Blockers".to_string());
        if blockers.is_empty() {
            lines.push("- None noted.".to_string());
        } else {
            lines.extend(blockers.iter().map(|b| format!("- {}", b)));
        }
    }

    let content = format!("{}\n", lines.join("\n").trim_end());
    if file_exists {
        vault.append_markdown(&task_file, &content)?;
    } else {
        vault.write_markdown(&task_file, &content)?;
    }
    Ok(task_file)
}

/// Unchecked task descriptions from the day's task file.
pub fn list_pending(vault: &VaultStore, date: NaiveDate) -> Result<Vec<String>, WriterError> {
    let content = match vault.read_markdown(&task_file_path(date)) {
        Ok(content) => content,
        Err(VaultError::NotFound(_)) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    Ok(content
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("- [ ]"))
        .map(|rest| rest.trim().to_string())
        .filter(|rest| !rest.is_empty())
        .collect())
}

#[async_trait]
impl Writer for TasksWriter {
    fn kind(&self) -> WriterKind {
        WriterKind::Tasks
    }

    async fn execute(
        &self,
        vault: &VaultStore,
        request: &WriteRequest,
    ) -> Result<WriteOutcome, WriterError> {
        let tasks = self.model.extract_tasks(&request.text).await?;
        let task_file = write_task_file(vault, request.date, &tasks, &[])?;
        tracing::info!(count = tasks.len(), path = %task_file.display(), "Tasks written");

        let mut outcome = WriteOutcome::new(format!(
            "Tasks extracted and saved for the selected week ({} task(s)).",
            tasks.len()
        ));
        outcome.actions.push("tasks_created".to_string());
        outcome.files.push(task_file);
        Ok(outcome)
    }

    fn describe(&self, request: &WriteRequest) -> String {
        let preview: String = request.text.chars().take(50).collect();
        format!("Extract tasks and save them from: {}", preview)
    }
}
