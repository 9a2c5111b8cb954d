//! Intent classifier capability.
//!
//! The engine consumes this interface; the decision rules themselves stay
//! deterministic in the engine. `KeywordClassifier` is the injectable
//! offline adapter; an LLM-backed adapter implements the same trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::surface;
use crate::types::IntentCategory;

/// Errors from a classifier adapter.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),
    #[error("Classifier timed out after {0} seconds")]
    Timeout(u64),
}

/// Categorical judgment plus confidence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub category: IntentCategory,
    pub confidence: f32,
}

/// Capability boundary to the intent-classification backend.
///
/// Must be total: always returns a classification or raises an error the
/// engine degrades on (never a write).
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str, history: &str)
        -> Result<Classification, ClassifierError>;
}

const QUESTION_OPENERS: [&str; 12] = [
    "what", "when", "where", "who", "why", "how", "can", "could", "should", "is", "are", "do",
];

/// Deterministic keyword classifier.
///
/// Permission verbs and routing keywords read as commands; questions and
/// everything discursive read as conversation; very short messages with
/// neither signal are ambiguous.
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(
        &self,
        text: &str,
        _history: &str,
    ) -> Result<Classification, ClassifierError> {
        let lower = text.trim().to_lowercase();
        let first_word = lower.split_whitespace().next().unwrap_or("");
        let word_count = lower.split_whitespace().count();

        if surface::is_read_only_trigger(&lower)
            || lower.ends_with('?')
            || QUESTION_OPENERS.contains(&first_word)
        {
            return Ok(Classification {
                category: IntentCategory::Conversation,
                confidence: 0.85,
            });
        }
        if surface::has_permission_verb(&lower) {
            return Ok(Classification {
                category: IntentCategory::Command,
                confidence: 0.9,
            });
        }
        if surface::resolve_target(&lower).is_some_and(|(_, category)| category.is_none())
            || lower.contains("extract")
            || lower.contains("summarize")
            || lower.contains("generate")
        {
            // A routing keyword without a permission verb still reads as a
            // command; the engine decides whether it may write.
            return Ok(Classification {
                category: IntentCategory::Command,
                confidence: 0.7,
            });
        }
        if word_count <= 2 {
            return Ok(Classification {
                category: IntentCategory::Ambiguous,
                confidence: 0.4,
            });
        }
        Ok(Classification {
            category: IntentCategory::Conversation,
            confidence: 0.6,
        })
    }
}
