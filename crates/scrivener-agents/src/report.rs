//! Report writer.
//!
//! Builds a weekly report from the trailing seven days of daily logs and
//! files it under `Reports/YYYY/MM`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};

use scrivener_vault::{build_frontmatter, VaultStore};

use crate::llm::LanguageModel;
use crate::progress::daily_log_path;
use crate::writer::{WriteOutcome, WriteRequest, Writer, WriterError, WriterKind};

pub struct ReportWriter {
    model: Arc<dyn LanguageModel>,
}

impl ReportWriter {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

/// Relative path of the report for a week ending on `date`.
pub fn report_path(vault: &VaultStore, date: NaiveDate) -> PathBuf {
    vault
        .report_base_path(date)
        .join(format!("{}-weekly-report.md", date.format("%Y-%m-%d")))
}

/// Daily logs for the seven days ending on `date`, oldest first.
fn load_daily_logs(vault: &VaultStore, week_ending: NaiveDate) -> Vec<String> {
    let mut logs = Vec::new();
    for offset in (0..7u64).rev() {
        let day = week_ending
            .checked_sub_days(Days::new(offset))
            .unwrap_or(week_ending);
        if let Ok(content) = vault.read_markdown(&daily_log_path(day)) {
            logs.push(content);
        }
    }
    logs
}

fn bullet_section(items: &[String]) -> Vec<String> {
    if items.is_empty() {
        vec!["- None noted.".to_string()]
    } else {
        items.iter().map(|item| format!("- {}", item)).collect()
    }
}

#[async_trait]
impl Writer for ReportWriter {
    fn kind(&self) -> WriterKind {
        WriterKind::Report
    }

    async fn execute(
        &self,
        vault: &VaultStore,
        request: &WriteRequest,
    ) -> Result<WriteOutcome, WriterError> {
        let week_ending = request.date;
        let logs = load_daily_logs(vault, week_ending);
        let context = if logs.is_empty() {
            "No daily logs found.".to_string()
        } else {
            logs.join("\n\n")
        };

        let report = self.model.weekly_report(&context).await?;
        let title = if report.title.trim().is_empty() {
            format!("Weekly Report {}", week_ending.format("%Y-%m-%d"))
        } else {
            report.title.trim().to_string()
        };

        let frontmatter = build_frontmatter(
            &title,
            week_ending,
            &["report", "weekly"],
            Some(report.summary.trim()),
        );
        let mut lines = vec![
            frontmatter,
            String::new(),
            format!("# {}", title),
            String::new(),
            "## Summary".to_string(),
            report.summary.trim().to_string(),
            String::new(),
            "## Highlights".to_string(),
        ];
        lines.extend(bullet_section(&report.highlights));
        lines.push(String::new());
        lines.push("## Challenges".to_string());
        lines.extend(bullet_section(&report.challenges));
        lines.push(String::new());
        lines.push("## Next Week".to_string());
        lines.extend(bullet_section(&report.next_week));

        let path = report_path(vault, week_ending);
        vault.write_markdown(&path, &format!("{}\n", lines.join("\n").trim_end()))?;
        tracing::info!(path = %path.display(), "Weekly report generated");

        let mut outcome = WriteOutcome::new(format!(
            "Weekly report generated for week ending {}.",
            week_ending.format("%Y-%m-%d")
        ));
        outcome.actions.push("weekly_report_generated".to_string());
        outcome.files.push(path);
        Ok(outcome)
    }

    fn describe(&self, request: &WriteRequest) -> String {
        format!(
            "Generate the weekly report for the week ending {}",
            request.date.format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::OutlineModel;

    fn setup() -> (tempfile::TempDir, VaultStore, ReportWriter, NaiveDate) {
        let dir = tempfile::tempdir().unwrap();
        let vault = VaultStore::new(dir.path().join("vault"));
        vault.ensure_vault().unwrap();
        let writer = ReportWriter::new(Arc::new(OutlineModel));
        (dir, vault, writer, NaiveDate::from_ymd_opt(2026, 2, 8).unwrap())
    }

    #[tokio::test]
    async fn test_report_without_logs_notes_absence() {
        let (_dir, vault, writer, date) = setup();
        let request = WriteRequest {
            text: String::new(),
            date,
            category: None,
        };
        let outcome = writer.execute(&vault, &request).await.unwrap();

        assert_eq!(outcome.actions, vec!["weekly_report_generated".to_string()]);
        assert_eq!(
            outcome.files[0],
            PathBuf::from("Reports/2026/02/2026-02-08-weekly-report.md")
        );
        let content = vault.read_markdown(&outcome.files[0]).unwrap();
        assert!(content.contains("# Weekly Report 2026-02-08"));
        assert!(content.contains("No daily logs were recorded this week."));
    }

    #[tokio::test]
    async fn test_report_pulls_trailing_week_of_logs() {
        let (_dir, vault, writer, date) = setup();
        // A log inside the window (Feb 3) and one outside it (Jan 20).
        let inside = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
        let outside = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap();
        vault
            .write_markdown(&daily_log_path(inside), "- [x] landed the migration\n")
            .unwrap();
        vault
            .write_markdown(&daily_log_path(outside), "- [x] ancient history\n")
            .unwrap();

        let request = WriteRequest {
            text: String::new(),
            date,
            category: None,
        };
        let outcome = writer.execute(&vault, &request).await.unwrap();
        let content = vault.read_markdown(&outcome.files[0]).unwrap();
        assert!(content.contains("landed the migration"));
        assert!(!content.contains("ancient history"));
    }

    #[tokio::test]
    async fn test_report_message_names_week_ending() {
        let (_dir, vault, writer, date) = setup();
        let request = WriteRequest {
            text: String::new(),
            date,
            category: None,
        };
        let outcome = writer.execute(&vault, &request).await.unwrap();
        assert!(outcome.message.contains("week ending 2026-02-08"));
    }
}
