//! Read-context assembly for reflective questions.
//!
//! Collects the day's progress log and task file plus the week's meetings
//! and notes into a single plain-text block. Used to answer status
//! questions from existing data without implying any file changes.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::partition::{Category, Partition};
use crate::store::VaultStore;

/// Files excluded from folder dumps (regenerated artifacts).
const EXCLUDED: &str = "weekly-summary.md";

/// Build the read-only context block for a date.
pub fn build_read_context(vault: &VaultStore, date: NaiveDate) -> String {
    let date_str = date.format("%Y-%m-%d").to_string();
    let partition = Partition::resolve(date);

    let daily = vault
        .read_markdown(
            &partition
                .subpath(Category::Progress)
                .join(format!("{}-daily-progress.md", date_str)),
        )
        .unwrap_or_default();
    let tasks = vault
        .read_markdown(
            &partition
                .subpath(Category::Tasks)
                .join(format!("{}-tasks.md", date_str)),
        )
        .unwrap_or_default();
    let meetings = read_folder(vault, &partition.subpath(Category::Meetings));
    let notes = read_folder(vault, &partition.subpath(Category::Notes));

    let parts = [
        format!("Date: {}", date_str),
        String::new(),
        "Daily progress log:".to_string(),
        or_none(&daily),
        String::new(),
        "Tasks for the day:".to_string(),
        or_none(&tasks),
        String::new(),
        "Meetings this week:".to_string(),
        or_none(&meetings),
        String::new(),
        "Notes this week:".to_string(),
        or_none(&notes),
    ];
    parts.join("\n").trim().to_string()
}

fn or_none(text: &str) -> String {
    if text.is_empty() {
        "None found.".to_string()
    } else {
        text.to_string()
    }
}

/// Concatenate every Markdown file under a vault folder, headed by its
/// file name, skipping regenerated summaries.
pub fn read_folder(vault: &VaultStore, relative: &Path) -> String {
    let folder = vault.root().join(relative);
    if !folder.exists() {
        return String::new();
    }
    let mut files = Vec::new();
    collect_markdown(&folder, &mut files);
    files.sort();

    let mut parts = Vec::new();
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if name.eq_ignore_ascii_case(EXCLUDED) {
            continue;
        }
        if let Ok(content) = std::fs::read_to_string(&path) {
            parts.push(format!("## {}\n{}", name, content));
        }
    }
    parts.join("\n\n")
}

fn collect_markdown(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_markdown(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "md") {
            out.push(path);
        }
    }
}
