//! Message-surface scanning: permission verbs, confirmation tokens, and
//! target routing.
//!
//! These are fixed vocabularies, deliberately not delegated to the model:
//! the engine's write/no-write decision must be deterministic and
//! auditable regardless of classifier quality.

use scrivener_agents::WriterKind;

/// Verbs that grant same-turn write permission.
const PERMISSION_VERBS: [&str; 8] = [
    "save", "log", "write", "record", "create", "update", "organize", "confirm",
];

/// Whole-message confirmation tokens for a pending proposal.
const CONFIRMATION_TOKENS: [&str; 12] = [
    "yes",
    "y",
    "sure",
    "do it",
    "do it.",
    "save it",
    "save",
    "ok",
    "okay",
    "please do",
    "go ahead",
    "confirm",
];

/// Whole-message cancellation tokens for a pending proposal.
const CANCEL_TOKENS: [&str; 5] = ["cancel", "no", "discard", "never mind", "nevermind"];

/// Prefix marking a message as an edit of the pending proposal.
pub const EDIT_SENTINEL: &str = "edit:";

/// Reflective questions answered from existing data, never written.
const READ_ONLY_TRIGGERS: [&str; 7] = [
    "what did i achieve",
    "what did i work on",
    "summarize my progress",
    "what have i done",
    "progress today",
    "today's progress",
    "status update",
];

/// Words carrying no routable content on their own.
const STOPWORDS: [&str; 24] = [
    "this", "that", "it", "them", "these", "those", "my", "our", "your", "the", "a", "an",
    "please", "to", "for", "me", "and", "of", "in", "on", "with", "about", "note", "notes",
];

/// Whether the message contains an explicit permission verb.
pub fn has_permission_verb(text: &str) -> bool {
    words_of(text).any(|word| PERMISSION_VERBS.contains(&word.as_str()))
}

/// Whether the whole message is a confirmation token.
pub fn is_confirmation(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    CONFIRMATION_TOKENS.contains(&normalized.as_str())
}

/// Whether the whole message is a cancellation token.
pub fn is_cancel(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    CANCEL_TOKENS.contains(&normalized.as_str())
}

/// The edited text, when the message carries the edit sentinel.
pub fn strip_edit(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    match trimmed.get(..EDIT_SENTINEL.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(EDIT_SENTINEL) => {
            Some(trimmed[EDIT_SENTINEL.len()..].trim())
        }
        _ => None,
    }
}

/// Whether the message is a reflective read-only question.
pub fn is_read_only_trigger(text: &str) -> bool {
    let lower = text.to_lowercase();
    READ_ONLY_TRIGGERS.iter().any(|t| lower.contains(t))
}

/// Resolve the target writer for a message.
///
/// Returns `None` when no routing keyword matches and the message has no
/// substance beyond verbs and deictics ("organize this"): the target is
/// ambiguous and the engine must ask.
pub fn resolve_target(text: &str) -> Option<(WriterKind, Option<String>)> {
    let lower = text.to_lowercase();
    if ["meeting", "advisor", "sync", "standup"]
        .iter()
        .any(|k| lower.contains(k))
    {
        return Some((WriterKind::Meeting, None));
    }
    if lower.contains("report") {
        return Some((WriterKind::Report, None));
    }
    if lower.contains("progress") || lower.contains("daily") {
        return Some((WriterKind::Progress, None));
    }
    if lower.contains("task") || lower.contains("todo") || lower.contains("to-do") {
        return Some((WriterKind::Tasks, None));
    }
    if lower.contains("idea") || lower.contains("brainstorm") {
        return Some((WriterKind::Notes, Some("Ideas".to_string())));
    }
    if is_substantive(text) {
        return Some((WriterKind::Notes, Some("Learning".to_string())));
    }
    None
}

/// Whether the message carries enough content to file as a note.
fn is_substantive(text: &str) -> bool {
    let content_words = words_of(text)
        .filter(|word| {
            !PERMISSION_VERBS.contains(&word.as_str()) && !STOPWORDS.contains(&word.as_str())
        })
        .count();
    content_words >= 2
}

fn words_of(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_verbs_match_on_word_boundary() {
        assert!(has_permission_verb("please save this for me"));
        assert!(has_permission_verb("LOG today's progress"));
        assert!(has_permission_verb("update the task file"));
        // "extract" and "summarize" are not permission verbs.
        assert!(!has_permission_verb("extract tasks from the text"));
        assert!(!has_permission_verb("summarize this meeting"));
        // Substrings do not count as verbs.
        assert!(!has_permission_verb("the wavelog was interesting"));
    }

    #[test]
    fn test_confirmation_tokens() {
        for token in ["yes", "Yes", "  save it ", "go ahead", "confirm", "OK"] {
            assert!(is_confirmation(token), "{} should confirm", token);
        }
        assert!(!is_confirmation("yes, but change the title"));
        assert!(!is_confirmation("maybe"));
    }

    #[test]
    fn test_cancel_tokens() {
        assert!(is_cancel("cancel"));
        assert!(is_cancel("No"));
        assert!(is_cancel("never mind"));
        assert!(!is_cancel("no thanks, actually save it"));
    }

    #[test]
    fn test_edit_sentinel() {
        assert_eq!(
            strip_edit("edit: save the meeting notes instead"),
            Some("save the meeting notes instead")
        );
        assert_eq!(strip_edit("EDIT: new text"), Some("new text"));
        assert_eq!(strip_edit("editorial comment"), None);
        assert_eq!(strip_edit("no sentinel here"), None);
    }

    #[test]
    fn test_read_only_triggers() {
        assert!(is_read_only_trigger("What did I achieve this week?"));
        assert!(is_read_only_trigger("give me a status update"));
        assert!(!is_read_only_trigger("save my notes"));
    }

    #[test]
    fn test_routing_keywords() {
        assert_eq!(
            resolve_target("summarize the advisor meeting").map(|t| t.0),
            Some(WriterKind::Meeting)
        );
        assert_eq!(
            resolve_target("generate the weekly report").map(|t| t.0),
            Some(WriterKind::Report)
        );
        assert_eq!(
            resolve_target("log today's progress").map(|t| t.0),
            Some(WriterKind::Progress)
        );
        assert_eq!(
            resolve_target("extract tasks from this text").map(|t| t.0),
            Some(WriterKind::Tasks)
        );
    }

    #[test]
    fn test_idea_routes_to_notes_ideas() {
        let (kind, category) = resolve_target("save this idea about caching").unwrap();
        assert_eq!(kind, WriterKind::Notes);
        assert_eq!(category.as_deref(), Some("Ideas"));
    }

    #[test]
    fn test_substantive_text_defaults_to_learning_notes() {
        let (kind, category) =
            resolve_target("save what I learned: rust lifetimes elide in simple cases").unwrap();
        assert_eq!(kind, WriterKind::Notes);
        assert_eq!(category.as_deref(), Some("Learning"));
    }

    #[test]
    fn test_bare_deictics_are_ambiguous() {
        assert!(resolve_target("organize this").is_none());
        assert!(resolve_target("save it please").is_none());
        assert!(resolve_target("write this for me").is_none());
    }
}
