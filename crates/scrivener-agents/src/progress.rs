//! Progress writer.
//!
//! Logs daily progress (appending update blocks on repeat saves) and
//! regenerates the week's summary after every daily log. Raw progress
//! text can also accumulate in a per-day draft cache before a final save;
//! the cache is scratch space, never a report artifact.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};

use scrivener_vault::reader::read_folder;
use scrivener_vault::{build_frontmatter, Category, Partition, VaultStore};

use crate::llm::{LanguageModel, ProgressInputs};
use crate::writer::{WriteOutcome, WriteRequest, Writer, WriterError, WriterKind};

pub struct ProgressWriter {
    model: Arc<dyn LanguageModel>,
}

impl ProgressWriter {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

/// Split free text into done/blockers/next-steps buckets.
///
/// Section headers (`done:`, `blockers:`, `next:`/`next steps:`) switch the
/// current bucket; unlabeled leading lines count as done.
pub fn parse_progress_text(text: &str) -> ProgressInputs {
    let mut inputs = ProgressInputs::default();
    let mut current: Option<&str> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();
        if let Some(rest) = lower.strip_prefix("done:").map(|_| line[5..].trim()) {
            current = Some("done");
            if !rest.is_empty() {
                inputs.done.push(rest.to_string());
            }
            continue;
        }
        if let Some(rest) = lower.strip_prefix("blockers:").map(|_| line[9..].trim()) {
            current = Some("blockers");
            if !rest.is_empty() {
                inputs.blockers.push(rest.to_string());
            }
            continue;
        }
        if lower.starts_with("next:") || lower.starts_with("next steps:") {
            current = Some("next");
            let rest = line.splitn(2, ':').nth(1).unwrap_or("").trim();
            if !rest.is_empty() {
                inputs.next_steps.push(rest.to_string());
            }
            continue;
        }

        let item = line.trim_start_matches("- ").to_string();
        match current {
            Some("blockers") => inputs.blockers.push(item),
            Some("next") => inputs.next_steps.push(item),
            _ => inputs.done.push(item),
        }
    }
    inputs
}

/// Relative path of the day's daily log.
pub fn daily_log_path(date: NaiveDate) -> PathBuf {
    Partition::resolve(date)
        .subpath(Category::Progress)
        .join(format!("{}-daily-progress.md", date.format("%Y-%m-%d")))
}

/// Relative path of the week's regenerated summary.
pub fn weekly_summary_path(date: NaiveDate) -> PathBuf {
    Partition::resolve(date)
        .subpath(Category::Progress)
        .join("weekly-summary.md")
}

/// Relative path of the day's draft cache.
pub fn cache_path(date: NaiveDate) -> PathBuf {
    Partition::resolve(date)
        .subpath(Category::Progress)
        .join(format!("{}-draft-cache.md", date.format("%Y-%m-%d")))
}

/// Append a raw entry to the day's draft cache, creating it on first use.
pub fn cache_entry(
    vault: &VaultStore,
    date: NaiveDate,
    raw_text: &str,
) -> Result<PathBuf, WriterError> {
    let date_str = date.format("%Y-%m-%d").to_string();
    vault.week_subpath(date, Category::Progress)?;
    let path = cache_path(date);
    let stamp = Local::now().format("%H:%M:%S").to_string();

    if vault.exists(&path) {
        let block = format!("## Entry {}\n{}\n", stamp, raw_text.trim());
        vault.append_markdown(&path, &block)?;
        return Ok(path);
    }

    let frontmatter = build_frontmatter(
        &format!("Daily Draft Cache {}", date_str),
        date,
        &["progress", "draft", "cache"],
        None,
    );
    let content = format!(
        "{}\n\n# Daily Draft Cache {}\n\n## Entry {}\n{}\n\n## Notes\n- Review these entries before final save.\n",
        frontmatter,
        date_str,
        stamp,
        raw_text.trim()
    );
    vault.write_markdown(&path, &content)?;
    Ok(path)
}

/// Extract progress inputs from the day's draft cache.
///
/// Tries the model first and falls back to bullet-line extraction when the
/// model is unavailable. A missing cache yields empty inputs.
pub async fn collect_inputs(
    vault: &VaultStore,
    model: &dyn LanguageModel,
    date: NaiveDate,
) -> ProgressInputs {
    let cache_text = match vault.read_markdown(&cache_path(date)) {
        Ok(text) => text,
        Err(_) => return ProgressInputs::default(),
    };
    match model
        .daily_progress(date, &ProgressInputs::default(), &cache_text)
        .await
    {
        Ok(parsed) => ProgressInputs {
            done: parsed.done,
            blockers: parsed.blockers,
            next_steps: parsed.next_steps,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Cache extraction degraded to bullet scan");
            let done: Vec<String> = cache_text
                .lines()
                .map(str::trim)
                .filter(|line| line.starts_with('-'))
                .map(|line| line.trim_start_matches('-').trim().to_string())
                .take(8)
                .collect();
            ProgressInputs {
                done,
                ..ProgressInputs::default()
            }
        }
    }
}

fn section(title: &str, items: &[String]) -> Vec<String> {
    let mut lines = vec![format!("## {}", title)];
    if items.is_empty() {
        lines.push("- None noted.".to_string());
    } else {
        lines.extend(items.iter().map(|item| format!("- {}", item)));
    }
    lines
}

/// Regenerate the week's summary from everything in the week partition.
pub async fn generate_weekly(
    vault: &VaultStore,
    model: &dyn LanguageModel,
    date: NaiveDate,
) -> Result<PathBuf, WriterError> {
    let partition = Partition::resolve(date);
    let mut context_parts = Vec::new();
    for category in Category::ALL {
        let dump = read_folder(vault, &partition.subpath(category));
        context_parts.push(format!("{}:", category.folder()));
        context_parts.push(if dump.is_empty() { "None.".to_string() } else { dump });
        context_parts.push(String::new());
    }
    let context = context_parts.join("\n");

    let weekly = model.weekly_progress(&context).await?;
    let frontmatter = build_frontmatter(
        "Weekly Progress Summary",
        date,
        &["progress", "weekly"],
        None,
    );
    let mut lines = vec![
        frontmatter,
        String::new(),
        "# Weekly Progress Summary".to_string(),
        String::new(),
        "## Summary".to_string(),
        weekly.summary.trim().to_string(),
        String::new(),
    ];
    lines.extend(section("Accomplishments", &weekly.accomplishments));
    lines.push(String::new());
    lines.extend(section("Meetings", &weekly.meetings));
    lines.push(String::new());
    lines.extend(section("Tasks Completed", &weekly.tasks_completed));
    lines.push(String::new());
    lines.extend(section("Tasks Pending", &weekly.tasks_pending));
    lines.push(String::new());
    lines.extend(section("Blockers", &weekly.blockers));
    lines.push(String::new());
    lines.extend(section("Next Week", &weekly.next_week));

    let path = weekly_summary_path(date);
    vault.write_markdown(&path, &format!("{}\n", lines.join("\n").trim_end()))?;
    Ok(path)
}

#[async_trait]
impl Writer for ProgressWriter {
    fn kind(&self) -> WriterKind {
        WriterKind::Progress
    }

    async fn execute(
        &self,
        vault: &VaultStore,
        request: &WriteRequest,
    ) -> Result<WriteOutcome, WriterError> {
        let mut inputs = parse_progress_text(&request.text);
        if inputs.done.is_empty() && inputs.blockers.is_empty() && inputs.next_steps.is_empty() {
            // Nothing inline; fall back to whatever accumulated in the cache.
            inputs = collect_inputs(vault, self.model.as_ref(), request.date).await;
        }

        let context = scrivener_vault::build_read_context(vault, request.date);
        let daily = self
            .model
            .daily_progress(request.date, &inputs, &context)
            .await?;

        let date_str = request.date.format("%Y-%m-%d").to_string();
        let mut body = vec![
            "## Summary".to_string(),
            daily.summary.trim().to_string(),
            String::new(),
        ];
        body.extend(section("Highlights", &daily.highlights));
        body.push(String::new());
        body.extend(section("Done", &daily.done));
        body.push(String::new());
        body.extend(section("Blockers", &daily.blockers));
        body.push(String::new());
        body.extend(section("Next Steps", &daily.next_steps));

        vault.week_subpath(request.date, Category::Progress)?;
        let log_path = daily_log_path(request.date);
        if vault.exists(&log_path) {
            let mut block = vec![format!("## Update {}", date_str), String::new()];
            block.extend(body);
            vault.append_markdown(&log_path, &format!("{}\n", block.join("\n").trim_end()))?;
        } else {
            let frontmatter = build_frontmatter(
                &format!("Daily Progress {}", date_str),
                request.date,
                &["progress", "daily"],
                None,
            );
            let mut full = vec![
                frontmatter,
                String::new(),
                format!("# Daily Progress {}", date_str),
                String::new(),
            ];
            full.extend(body);
            vault.write_markdown(&log_path, &format!("{}\n", full.join("\n").trim_end()))?;
        }
        tracing::info!(path = %log_path.display(), "Daily progress logged");

        let weekly_path = generate_weekly(vault, self.model.as_ref(), request.date).await?;

        let mut message =
            "Daily progress logged and weekly summary updated.".to_string();
        if daily.blockers.is_empty() {
            message.push_str(" Share any blockers to keep the follow-up accurate.");
        }
        let mut outcome = WriteOutcome::new(message);
        outcome.actions.push("progress_logged".to_string());
        outcome.actions.push("weekly_progress_generated".to_string());
        outcome.files.push(log_path);
        outcome.files.push(weekly_path);
        Ok(outcome)
    }

    fn describe(&self, request: &WriteRequest) -> String {
        format!(
            "Log daily progress for {} and refresh the weekly summary",
            request.date.format("%Y-%m-%d")
        )
    }
}
