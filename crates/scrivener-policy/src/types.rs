//! Decision-layer types and the response envelope.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use scrivener_agents::WriterKind;
use scrivener_core::{ProfileId, SessionId, Timestamp};

/// Classifier's categorical judgment of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    Conversation,
    Command,
    Ambiguous,
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntentCategory::Conversation => write!(f, "conversation"),
            IntentCategory::Command => write!(f, "command"),
            IntentCategory::Ambiguous => write!(f, "ambiguous"),
        }
    }
}

/// Policy engine's operational decision, distinct from intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Talk,
    Act,
    Ask,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Talk => write!(f, "talk"),
            Action::Act => write!(f, "act"),
            Action::Ask => write!(f, "ask"),
        }
    }
}

/// Fixed reason vocabulary surfaced in every response.
pub mod reason {
    pub const EXPLICIT_WRITE_PERMISSION_REQUIRED: &str = "Explicit write permission required";
    pub const WRITE_PERMISSION_GRANTED: &str = "Explicit write permission granted";
    pub const AWAITING_CONFIRMATION: &str = "Awaiting confirmation";
    pub const CONFIRMED_PERMISSION: &str = "Confirmed permission";
    pub const DRAFT_CACHE_CREATED: &str = "Draft cache created";
    pub const NO_PENDING_ACTION: &str = "No pending action";
    pub const CLASSIFIER_UNAVAILABLE: &str = "Classifier unavailable";
    pub const WRITE_FAILED: &str = "Write failed";
    pub const CONVERSATION: &str = "Conversational message";
    pub const ANSWERED_FROM_DATA: &str = "Answered from existing data";
    pub const CANCELLED: &str = "Cancelled";
    pub const MEMORY_RESET: &str = "Memory reset";
    pub const NO_ACTIVE_PROFILE: &str = "No active profile";
}

/// A resolved write operation: which writer, what text, which date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOperation {
    pub writer: WriterKind,
    pub text: String,
    pub date: NaiveDate,
    pub category: Option<String>,
}

/// A proposed but unconfirmed write operation awaiting approval.
#[derive(Clone, Debug)]
pub struct PendingAction {
    pub session_id: SessionId,
    pub profile_id: ProfileId,
    pub operation: WriteOperation,
    pub created_at: Timestamp,
}

impl PendingAction {
    pub fn new(session_id: SessionId, profile_id: ProfileId, operation: WriteOperation) -> Self {
        Self {
            session_id,
            profile_id,
            operation,
            created_at: Timestamp::now(),
        }
    }
}

/// Turn outcome status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Success,
    Failed,
}

/// An inbound message to decide on.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TurnRequest {
    pub session_id: Option<SessionId>,
    pub text: String,
    /// Optional `YYYY-MM-DD`; malformed input defaults to today.
    pub date: Option<String>,
}

/// The structured response for one turn.
///
/// Every response states in plain terms whether a file was written, and if
/// not, why.
#[derive(Clone, Debug, Serialize)]
pub struct TurnResponse {
    pub status: TurnStatus,
    pub message: String,
    pub intent: Option<IntentCategory>,
    pub action: Action,
    pub reason: String,
    pub actions: Vec<String>,
    pub files: Vec<String>,
    pub notice: Option<String>,
    pub session_id: SessionId,
}

impl TurnResponse {
    pub fn talk(session_id: SessionId, reason: &str, message: impl Into<String>) -> Self {
        Self {
            status: TurnStatus::Success,
            message: message.into(),
            intent: None,
            action: Action::Talk,
            reason: reason.to_string(),
            actions: Vec::new(),
            files: Vec::new(),
            notice: None,
            session_id,
        }
    }

    pub fn with_intent(mut self, intent: IntentCategory) -> Self {
        self.intent = Some(intent);
        self
    }

    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_category_display() {
        assert_eq!(IntentCategory::Conversation.to_string(), "conversation");
        assert_eq!(IntentCategory::Command.to_string(), "command");
        assert_eq!(IntentCategory::Ambiguous.to_string(), "ambiguous");
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Talk.to_string(), "talk");
        assert_eq!(Action::Act.to_string(), "act");
        assert_eq!(Action::Ask.to_string(), "ask");
    }

    #[test]
    fn test_action_serde_format() {
        assert_eq!(serde_json::to_string(&Action::Ask).unwrap(), "\"ask\"");
        assert_eq!(
            serde_json::to_string(&IntentCategory::Ambiguous).unwrap(),
            "\"ambiguous\""
        );
    }

    #[test]
    fn test_talk_response_defaults() {
        let session = SessionId::new();
        let resp = TurnResponse::talk(session, reason::CONVERSATION, "hello")
            .with_intent(IntentCategory::Conversation)
            .with_notice("nothing written");
        assert_eq!(resp.status, TurnStatus::Success);
        assert_eq!(resp.action, Action::Talk);
        assert!(resp.actions.is_empty());
        assert!(resp.files.is_empty());
        assert_eq!(resp.notice.as_deref(), Some("nothing written"));
        assert_eq!(resp.session_id, session);
    }

    #[test]
    fn test_pending_action_records_origin() {
        let session = SessionId::new();
        let profile = ProfileId::new();
        let op = WriteOperation {
            writer: WriterKind::Tasks,
            text: "extract tasks".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 2, 8).unwrap(),
            category: None,
        };
        let pending = PendingAction::new(session, profile, op.clone());
        assert_eq!(pending.session_id, session);
        assert_eq!(pending.profile_id, profile);
        assert_eq!(pending.operation, op);
    }
}
