//! Notes writer.
//!
//! Cleans raw text into a titled note under the week's Notes folder,
//! bucketed by category (Meetings, Learning, Ideas).

use std::sync::Arc;

use async_trait::async_trait;

use scrivener_vault::{build_frontmatter, slugify, Category, VaultStore};

use crate::llm::LanguageModel;
use crate::writer::{WriteOutcome, WriteRequest, Writer, WriterError, WriterKind};

/// Allowed notes categories; anything else normalizes to Learning.
const CATEGORIES: [&str; 3] = ["Meetings", "Learning", "Ideas"];

pub struct NotesWriter {
    model: Arc<dyn LanguageModel>,
}

impl NotesWriter {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

fn normalize_category(category: Option<&str>) -> &'static str {
    let requested = category.unwrap_or("Learning").trim();
    CATEGORIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(requested))
        .copied()
        .unwrap_or("Learning")
}

#[async_trait]
impl Writer for NotesWriter {
    fn kind(&self) -> WriterKind {
        WriterKind::Notes
    }

    async fn execute(
        &self,
        vault: &VaultStore,
        request: &WriteRequest,
    ) -> Result<WriteOutcome, WriterError> {
        if request.text.trim().is_empty() {
            return Err(WriterError::InvalidRequest(
                "Note text must not be empty".to_string(),
            ));
        }

        let category = normalize_category(request.category.as_deref());
        let organized = self.model.organize_note(&request.text).await?;
        let title = organized.title.trim().to_string();

        let tags: Vec<&str> = organized.tags.iter().map(String::as_str).collect();
        let frontmatter =
            build_frontmatter(&title, request.date, &tags, Some(organized.summary.trim()));
        let content = format!(
            "{}\n\n# {}\n\n{}\n",
            frontmatter,
            title,
            organized.cleaned_markdown.trim()
        );

        let notes_base = vault.week_subpath(request.date, Category::Notes)?;
        let note_path = notes_base
            .join(category)
            .join(format!("{}.md", slugify(&title)));
        vault.write_markdown(&note_path, &content)?;
        tracing::info!(path = %note_path.display(), "Note organized");

        let mut outcome = WriteOutcome::new(format!("Note organized for {}.", title));
        outcome.actions.push("notes_organized".to_string());
        outcome.files.push(note_path);
        Ok(outcome)
    }

    fn describe(&self, request: &WriteRequest) -> String {
        let category = normalize_category(request.category.as_deref());
        let preview: String = request.text.chars().take(50).collect();
        format!("Organize a {} note from: {}", category, preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::OutlineModel;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn setup() -> (tempfile::TempDir, VaultStore, NotesWriter, WriteRequest) {
        let dir = tempfile::tempdir().unwrap();
        let vault = VaultStore::new(dir.path().join("vault"));
        vault.ensure_vault().unwrap();
        let writer = NotesWriter::new(Arc::new(OutlineModel));
        let request = WriteRequest {
            text: "Rust ownership notes\nBorrowing rules and lifetimes.".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 2, 8).unwrap(),
            category: None,
        };
        (dir, vault, writer, request)
    }

    #[tokio::test]
    async fn test_writes_note_under_week_partition() {
        let (_dir, vault, writer, request) = setup();
        let outcome = writer.execute(&vault, &request).await.unwrap();

        assert_eq!(outcome.actions, vec!["notes_organized".to_string()]);
        assert_eq!(
            outcome.files,
            vec![PathBuf::from(
                "2026/02/Week-2/Notes/Learning/rust-ownership-notes.md"
            )]
        );
        let content = vault.read_markdown(&outcome.files[0]).unwrap();
        assert!(content.starts_with("---\n"));
        assert!(content.contains("# Rust ownership notes"));
    }

    #[tokio::test]
    async fn test_category_normalization() {
        let (_dir, vault, writer, mut request) = setup();
        request.category = Some("ideas".to_string());
        let outcome = writer.execute(&vault, &request).await.unwrap();
        assert!(outcome.files[0].to_string_lossy().contains("/Ideas/"));

        request.category = Some("Random".to_string());
        let outcome = writer.execute(&vault, &request).await.unwrap();
        assert!(outcome.files[0].to_string_lossy().contains("/Learning/"));
    }

    #[tokio::test]
    async fn test_empty_text_is_invalid() {
        let (_dir, vault, writer, mut request) = setup();
        request.text = "   ".to_string();
        let err = writer.execute(&vault, &request).await.unwrap_err();
        assert!(matches!(err, WriterError::InvalidRequest(_)));
    }

    #[test]
    fn test_describe_mentions_category() {
        let (_dir, _vault, writer, request) = setup();
        let described = writer.describe(&request);
        assert!(described.contains("Learning"));
        assert!(described.contains("Rust ownership notes"));
    }
}
