//! Pending-action store.
//!
//! Holds at most one awaiting write proposal per session. A new proposal
//! supersedes the prior one; a profile switch discards everything the
//! outgoing profile left behind. Keyed by session, so concurrent sessions
//! never interfere.

use std::collections::HashMap;
use std::sync::Mutex;

use scrivener_core::{ProfileId, SessionId};

use crate::error::PolicyError;
use crate::types::PendingAction;

/// In-memory keyed store for pending write proposals.
#[derive(Debug, Default)]
pub struct PendingStore {
    inner: Mutex<HashMap<SessionId, PendingAction>>,
}

impl PendingStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Record a proposal, superseding any existing one for the session.
    pub fn put(&self, action: PendingAction) {
        let mut inner = self.inner.lock().expect("pending store lock");
        if inner.insert(action.session_id, action).is_some() {
            tracing::debug!("Pending action superseded");
        }
    }

    /// The awaiting proposal for a session, if any.
    pub fn peek(&self, session: SessionId) -> Option<PendingAction> {
        self.inner
            .lock()
            .expect("pending store lock")
            .get(&session)
            .cloned()
    }

    /// Remove and return the awaiting proposal.
    ///
    /// Errors with `NoPendingAction` when nothing is awaiting.
    pub fn resolve(&self, session: SessionId) -> Result<PendingAction, PolicyError> {
        self.inner
            .lock()
            .expect("pending store lock")
            .remove(&session)
            .ok_or(PolicyError::NoPendingAction(session))
    }

    /// Drop the awaiting proposal. Idempotent; returns whether one existed.
    pub fn discard(&self, session: SessionId) -> bool {
        self.inner
            .lock()
            .expect("pending store lock")
            .remove(&session)
            .is_some()
    }

    /// Drop every proposal belonging to a profile. Returns how many were
    /// discarded.
    pub fn discard_profile(&self, profile: ProfileId) -> usize {
        let mut inner = self.inner.lock().expect("pending store lock");
        let before = inner.len();
        inner.retain(|_, action| action.profile_id != profile);
        before - inner.len()
    }

    /// Number of sessions with an awaiting proposal.
    pub fn awaiting_count(&self) -> usize {
        self.inner.lock().expect("pending store lock").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WriteOperation;
    use chrono::NaiveDate;
    use scrivener_agents::WriterKind;

    fn make_action(session: SessionId, profile: ProfileId, text: &str) -> PendingAction {
        PendingAction::new(
            session,
            profile,
            WriteOperation {
                writer: WriterKind::Notes,
                text: text.to_string(),
                date: NaiveDate::from_ymd_opt(2026, 2, 8).unwrap(),
                category: None,
            },
        )
    }

    #[test]
    fn test_put_and_resolve() {
        let store = PendingStore::new();
        let session = SessionId::new();
        let profile = ProfileId::new();

        store.put(make_action(session, profile, "save this"));
        assert_eq!(store.awaiting_count(), 1);

        let resolved = store.resolve(session).unwrap();
        assert_eq!(resolved.operation.text, "save this");
        assert_eq!(store.awaiting_count(), 0);
    }

    #[test]
    fn test_resolve_empty_is_no_pending_action() {
        let store = PendingStore::new();
        let err = store.resolve(SessionId::new()).unwrap_err();
        assert!(matches!(err, PolicyError::NoPendingAction(_)));
    }

    #[test]
    fn test_double_resolve_errors() {
        let store = PendingStore::new();
        let session = SessionId::new();
        store.put(make_action(session, ProfileId::new(), "x"));
        assert!(store.resolve(session).is_ok());
        assert!(store.resolve(session).is_err());
    }

    #[test]
    fn test_new_proposal_supersedes_prior() {
        let store = PendingStore::new();
        let session = SessionId::new();
        let profile = ProfileId::new();

        store.put(make_action(session, profile, "first"));
        store.put(make_action(session, profile, "second"));

        // At most one awaiting proposal per session.
        assert_eq!(store.awaiting_count(), 1);
        assert_eq!(store.resolve(session).unwrap().operation.text, "second");
    }

    #[test]
    fn test_discard_is_idempotent() {
        let store = PendingStore::new();
        let session = SessionId::new();
        store.put(make_action(session, ProfileId::new(), "x"));
        assert!(store.discard(session));
        assert!(!store.discard(session));
    }

    #[test]
    fn test_sessions_do_not_interfere() {
        let store = PendingStore::new();
        let profile = ProfileId::new();
        let session_a = SessionId::new();
        let session_b = SessionId::new();

        store.put(make_action(session_a, profile, "for a"));
        store.put(make_action(session_b, profile, "for b"));

        assert_eq!(store.resolve(session_a).unwrap().operation.text, "for a");
        assert_eq!(store.peek(session_b).unwrap().operation.text, "for b");
    }

    #[test]
    fn test_discard_profile_scopes_to_owner() {
        let store = PendingStore::new();
        let profile_a = ProfileId::new();
        let profile_b = ProfileId::new();
        let session_a = SessionId::new();
        let session_b = SessionId::new();

        store.put(make_action(session_a, profile_a, "a"));
        store.put(make_action(session_b, profile_b, "b"));

        assert_eq!(store.discard_profile(profile_a), 1);
        assert!(store.peek(session_a).is_none());
        assert!(store.peek(session_b).is_some());
    }

    #[test]
    fn test_peek_does_not_remove() {
        let store = PendingStore::new();
        let session = SessionId::new();
        store.put(make_action(session, ProfileId::new(), "x"));
        assert!(store.peek(session).is_some());
        assert!(store.peek(session).is_some());
        assert_eq!(store.awaiting_count(), 1);
    }

    #[test]
    fn test_concurrent_puts_keep_single_proposal() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(PendingStore::new());
        let session = SessionId::new();
        let profile = ProfileId::new();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                store.put(make_action(session, profile, &format!("p{}", i)));
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.awaiting_count(), 1);
    }
}
