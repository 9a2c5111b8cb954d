//! Deterministic offline language-model adapter.
//!
//! Structures text with plain heuristics: first line becomes the title,
//! bullet lines become items, checkbox markers carry completion state.
//! It never invents content, which makes it safe as the default adapter
//! for the binary and the test suites. Network-backed adapters implement
//! the same `LanguageModel` trait and are injected in their place.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::llm::{
    DailyProgress, LanguageModel, LlmError, MeetingSummary, OrganizedNote, ProgressInputs,
    TaskItem, TaskState, WeeklyProgress, WeeklyReport,
};

const MAX_TITLE_CHARS: usize = 60;
const MAX_SUMMARY_CHARS: usize = 140;
const MAX_FALLBACK_TASKS: usize = 8;

/// Offline adapter that outlines text instead of calling a model.
#[derive(Debug, Clone, Default)]
pub struct OutlineModel;

impl OutlineModel {
    pub fn new() -> Self {
        Self
    }
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

/// Lines starting with a bullet marker, with the marker and any checkbox
/// stripped. Returns (text, completed).
fn bullet_lines(text: &str) -> Vec<(String, bool)> {
    text.lines()
        .map(str::trim)
        .filter_map(|line| {
            let rest = line
                .strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))?;
            if let Some(item) = rest.strip_prefix("[x] ").or_else(|| rest.strip_prefix("[X] ")) {
                Some((item.trim().to_string(), true))
            } else if let Some(item) = rest.strip_prefix("[ ] ") {
                Some((item.trim().to_string(), false))
            } else {
                Some((rest.trim().to_string(), false))
            }
        })
        .filter(|(item, _)| !item.is_empty())
        .collect()
}

fn summary_of(text: &str) -> String {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&flattened, MAX_SUMMARY_CHARS)
}

#[async_trait]
impl LanguageModel for OutlineModel {
    async fn respond(&self, text: &str, _history: &str) -> Result<String, LlmError> {
        if text.trim().is_empty() {
            return Ok("I'm listening.".to_string());
        }
        Ok(
            "Happy to talk it through. If you want any of this kept, ask me to save it \
             and I'll prepare a note."
                .to_string(),
        )
    }

    async fn answer_from_context(
        &self,
        _question: &str,
        context: &str,
    ) -> Result<String, LlmError> {
        if context.trim().is_empty() {
            return Ok("I don't have any recorded notes for that period yet.".to_string());
        }
        Ok(format!("Here is what your notes show:\n\n{}", context))
    }

    async fn organize_note(&self, raw_text: &str) -> Result<OrganizedNote, LlmError> {
        let title = first_line(raw_text)
            .map(|line| truncate(line.trim_start_matches('#').trim(), MAX_TITLE_CHARS))
            .unwrap_or_else(|| "Untitled Note".to_string());
        Ok(OrganizedNote {
            title,
            summary: summary_of(raw_text),
            cleaned_markdown: raw_text.trim().to_string(),
            tags: Vec::new(),
        })
    }

    async fn extract_tasks(&self, source_text: &str) -> Result<Vec<TaskItem>, LlmError> {
        let bullets = bullet_lines(source_text);
        if !bullets.is_empty() {
            return Ok(bullets
                .into_iter()
                .map(|(description, completed)| TaskItem {
                    description,
                    due_date: None,
                    state: if completed { TaskState::Done } else { TaskState::Todo },
                })
                .collect());
        }
        // No bullet structure: treat each substantial line as a task.
        Ok(source_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(MAX_FALLBACK_TASKS)
            .map(TaskItem::todo)
            .collect())
    }

    async fn summarize_meeting(&self, raw_text: &str) -> Result<MeetingSummary, LlmError> {
        let title = first_line(raw_text)
            .map(|line| truncate(line.trim_start_matches('#').trim(), MAX_TITLE_CHARS))
            .unwrap_or_else(|| "Meeting Notes".to_string());
        let decisions: Vec<String> = raw_text
            .lines()
            .map(str::trim)
            .filter(|line| line.to_lowercase().contains("decid"))
            .map(|line| line.trim_start_matches("- ").to_string())
            .collect();
        let action_items: Vec<String> = bullet_lines(raw_text)
            .into_iter()
            .filter(|(_, completed)| !completed)
            .map(|(item, _)| item)
            .collect();
        Ok(MeetingSummary {
            title,
            summary: summary_of(raw_text),
            decisions,
            action_items,
            participants: Vec::new(),
        })
    }

    async fn daily_progress(
        &self,
        date: NaiveDate,
        inputs: &ProgressInputs,
        context: &str,
    ) -> Result<DailyProgress, LlmError> {
        let mut done = inputs.done.clone();
        if done.is_empty() && !context.trim().is_empty() {
            done = bullet_lines(context)
                .into_iter()
                .filter(|(_, completed)| *completed)
                .map(|(item, _)| item)
                .take(MAX_FALLBACK_TASKS)
                .collect();
        }
        let highlights = done.first().cloned().into_iter().collect();
        Ok(DailyProgress {
            summary: format!(
                "{}: {} item(s) done, {} blocker(s), {} next step(s).",
                date.format("%Y-%m-%d"),
                done.len(),
                inputs.blockers.len(),
                inputs.next_steps.len()
            ),
            done,
            blockers: inputs.blockers.clone(),
            next_steps: inputs.next_steps.clone(),
            highlights,
        })
    }

    async fn weekly_progress(&self, context: &str) -> Result<WeeklyProgress, LlmError> {
        let bullets = bullet_lines(context);
        let tasks_completed: Vec<String> = bullets
            .iter()
            .filter(|(_, completed)| *completed)
            .map(|(item, _)| item.clone())
            .collect();
        let tasks_pending: Vec<String> = bullets
            .iter()
            .filter(|(_, completed)| !completed)
            .map(|(item, _)| item.clone())
            .collect();
        Ok(WeeklyProgress {
            summary: format!(
                "{} task(s) completed, {} pending this week.",
                tasks_completed.len(),
                tasks_pending.len()
            ),
            accomplishments: tasks_completed.clone(),
            meetings: Vec::new(),
            tasks_completed,
            tasks_pending,
            blockers: Vec::new(),
            next_week: Vec::new(),
        })
    }

    async fn weekly_report(&self, context: &str) -> Result<WeeklyReport, LlmError> {
        let highlights: Vec<String> = bullet_lines(context)
            .into_iter()
            .map(|(item, _)| item)
            .take(5)
            .collect();
        let summary = if context.trim().is_empty() || context.contains("No daily logs found") {
            "No daily logs were recorded this week.".to_string()
        } else {
            summary_of(context)
        };
        Ok(WeeklyReport {
            title: String::new(),
            summary,
            highlights,
            challenges: Vec::new(),
            next_week: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_organize_note_titles_from_first_line() {
        let note = block_on(OutlineModel.organize_note("# Borrow checker notes\nDetails here"))
            .unwrap();
        assert_eq!(note.title, "Borrow checker notes");
        assert!(note.cleaned_markdown.contains("Details here"));
    }

    #[test]
    fn test_organize_note_empty_gets_fallback_title() {
        let note = block_on(OutlineModel.organize_note("")).unwrap();
        assert_eq!(note.title, "Untitled Note");
    }

    #[test]
    fn test_extract_tasks_from_bullets() {
        let tasks = block_on(
            OutlineModel.extract_tasks("- [ ] review PR\n- [x] write tests\n- ship it"),
        )
        .unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].description, "review PR");
        assert_eq!(tasks[0].state, TaskState::Todo);
        assert_eq!(tasks[1].state, TaskState::Done);
        assert_eq!(tasks[2].description, "ship it");
    }

    #[test]
    fn test_extract_tasks_falls_back_to_lines() {
        let tasks = block_on(OutlineModel.extract_tasks("call the vendor\nupdate the doc")).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].description, "call the vendor");
    }

    #[test]
    fn test_extract_tasks_empty_input_yields_nothing() {
        let tasks = block_on(OutlineModel.extract_tasks("")).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_summarize_meeting_collects_action_items() {
        let summary = block_on(OutlineModel.summarize_meeting(
            "Advisor sync\nWe decided to ship early.\n- draft the announcement\n- [x] book the room",
        ))
        .unwrap();
        assert_eq!(summary.title, "Advisor sync");
        assert_eq!(summary.action_items, vec!["draft the announcement".to_string()]);
        assert_eq!(summary.decisions.len(), 1);
        assert!(summary.participants.is_empty());
    }

    #[test]
    fn test_daily_progress_counts_inputs() {
        let inputs = ProgressInputs {
            done: vec!["shipped parser".to_string()],
            blockers: vec![],
            next_steps: vec!["write docs".to_string()],
        };
        let date = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        let daily = block_on(OutlineModel.daily_progress(date, &inputs, "")).unwrap();
        assert!(daily.summary.contains("1 item(s) done"));
        assert_eq!(daily.highlights, vec!["shipped parser".to_string()]);
    }

    #[test]
    fn test_weekly_progress_splits_checkboxes() {
        let weekly =
            block_on(OutlineModel.weekly_progress("- [x] done thing\n- [ ] pending thing")).unwrap();
        assert_eq!(weekly.tasks_completed, vec!["done thing".to_string()]);
        assert_eq!(weekly.tasks_pending, vec!["pending thing".to_string()]);
    }

    #[test]
    fn test_respond_never_claims_writes() {
        let reply = block_on(OutlineModel.respond("tell me about rust", "")).unwrap();
        assert!(!reply.to_lowercase().contains("saved a file"));
    }
}
