//! Frontmatter rendering and title slugging for vault notes.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

fn strip_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9\s-]").expect("valid regex"))
}

fn whitespace_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Turn a note title into a filesystem-safe slug.
///
/// Non-alphanumerics are stripped, whitespace collapses to single dashes,
/// and the result is lowercased. An empty result falls back to "note".
pub fn slugify(text: &str) -> String {
    let stripped = strip_pattern().replace_all(text, "");
    let normalized = whitespace_pattern()
        .replace_all(stripped.trim(), "-")
        .to_lowercase();
    if normalized.is_empty() {
        "note".to_string()
    } else {
        normalized
    }
}

/// Render a YAML frontmatter block for a note.
pub fn build_frontmatter(
    title: &str,
    date: NaiveDate,
    tags: &[&str],
    summary: Option<&str>,
) -> String {
    let mut lines = vec![
        "---".to_string(),
        format!("title: {}", title),
        format!("date: {}", date.format("%Y-%m-%d")),
    ];
    if !tags.is_empty() {
        lines.push(format!("tags: [{}]", tags.join(", ")));
    }
    if let Some(summary) = summary {
        lines.push(format!("summary: {}", summary));
    }
    lines.push("---".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 8).unwrap()
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Weekly Sync Notes"), "weekly-sync-notes");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("Q1 plan: goals & risks!"), "q1-plan-goals-risks");
    }

    #[test]
    fn test_slugify_collapses_whitespace() {
        assert_eq!(slugify("  too   many    spaces "), "too-many-spaces");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify(""), "note");
        assert_eq!(slugify("???"), "note");
    }

    #[test]
    fn test_frontmatter_minimal() {
        let fm = build_frontmatter("Title", day(), &[], None);
        assert_eq!(fm, "---\ntitle: Title\ndate: 2026-02-08\n---");
    }

    #[test]
    fn test_frontmatter_with_tags_and_summary() {
        let fm = build_frontmatter("Title", day(), &["meeting", "weekly"], Some("short recap"));
        assert!(fm.contains("tags: [meeting, weekly]"));
        assert!(fm.contains("summary: short recap"));
        assert!(fm.starts_with("---\n"));
        assert!(fm.ends_with("\n---"));
    }
}
