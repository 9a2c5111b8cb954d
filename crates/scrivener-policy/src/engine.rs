//! The action policy engine.
//!
//! One decision per inbound message: talk, act, or ask. The engine owns
//! the per-session confirmation state machine (IDLE /
//! AWAITING_CONFIRMATION), serializes concurrent messages per session,
//! and recovers every failure into a structured response. Invariant: no
//! final artifact is written without an explicit permission verb in the
//! same turn or a confirmation of a recorded proposal.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{Local, NaiveDate};
use tokio::sync::{Mutex as AsyncMutex, RwLock};

use scrivener_agents::{progress, LanguageModel, WriterKind, WriterRegistry};
use scrivener_core::config::PolicyConfig;
use scrivener_core::{ProfileId, Role, SessionId};
use scrivener_store::{Profile, ProfileStore, TranscriptStore};
use scrivener_vault::{build_read_context, parse_date, VaultStore};

use crate::classifier::IntentClassifier;
use crate::error::PolicyError;
use crate::pending::PendingStore;
use crate::router::{DispatchStatus, Router};
use crate::surface;
use crate::types::{
    reason, Action, IntentCategory, PendingAction, TurnRequest, TurnResponse, TurnStatus,
    WriteOperation,
};

const NOTHING_PENDING_MESSAGE: &str =
    "There's nothing waiting for confirmation. Tell me what you'd like me to do.";

/// The active scope a decision runs under.
#[derive(Clone, Debug)]
pub struct ProfileContext {
    pub profile_id: ProfileId,
    pub vault_root: PathBuf,
}

/// Decision engine wiring classifier, pending store, router, and stores.
pub struct PolicyEngine {
    classifier: Arc<dyn IntentClassifier>,
    model: Arc<dyn LanguageModel>,
    router: Router,
    pending: Arc<PendingStore>,
    transcripts: Arc<TranscriptStore>,
    profiles: Arc<ProfileStore>,
    context: RwLock<Option<ProfileContext>>,
    session_locks: StdMutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>,
    settings: PolicyConfig,
}

impl PolicyEngine {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        model: Arc<dyn LanguageModel>,
        registry: WriterRegistry,
        transcripts: Arc<TranscriptStore>,
        profiles: Arc<ProfileStore>,
        settings: PolicyConfig,
    ) -> Self {
        let pending = Arc::new(PendingStore::new());
        let router = Router::new(registry, Arc::clone(&pending));
        Self {
            classifier,
            model,
            router,
            pending,
            transcripts,
            profiles,
            context: RwLock::new(None),
            session_locks: StdMutex::new(HashMap::new()),
            settings,
        }
    }

    /// The pending-action store (exposed for inspection in tests and UIs).
    pub fn pending_store(&self) -> &PendingStore {
        &self.pending
    }

    /// Load the store's active profile into the engine context.
    pub async fn activate(&self) -> Result<Option<Profile>, PolicyError> {
        let profile = self.profiles.active()?;
        if let Some(p) = &profile {
            VaultStore::new(&p.vault_root).ensure_vault()?;
        }
        let mut guard = self.context.write().await;
        *guard = profile.as_ref().map(|p| ProfileContext {
            profile_id: p.id,
            vault_root: PathBuf::from(&p.vault_root),
        });
        Ok(profile)
    }

    /// Switch the active profile.
    ///
    /// Holds the context write half for the whole swap, which serializes
    /// the switch against in-flight decisions, and discards any pending
    /// action the outgoing profile left behind: a proposal never carries
    /// across profiles.
    pub async fn switch_profile(&self, id: ProfileId) -> Result<Profile, PolicyError> {
        let mut guard = self.context.write().await;
        let profile = self.profiles.switch(id)?;
        if let Some(prev) = guard.as_ref() {
            if prev.profile_id != profile.id {
                let dropped = self.pending.discard_profile(prev.profile_id);
                if dropped > 0 {
                    tracing::info!(dropped, "Pending actions discarded on profile switch");
                }
            }
        }
        VaultStore::new(&profile.vault_root).ensure_vault()?;
        *guard = Some(ProfileContext {
            profile_id: profile.id,
            vault_root: PathBuf::from(&profile.vault_root),
        });
        Ok(profile)
    }

    /// Decide on one inbound message.
    ///
    /// Never returns an error: every failure is recovered into a
    /// structured response that states whether a file was written.
    pub async fn handle_message(&self, request: TurnRequest) -> TurnResponse {
        match self.try_handle(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Turn recovered to a failure response");
                TurnResponse {
                    status: TurnStatus::Failed,
                    message: format!("I hit an internal problem: {}. Nothing was written.", e),
                    intent: None,
                    action: Action::Talk,
                    reason: reason::WRITE_FAILED.to_string(),
                    actions: Vec::new(),
                    files: Vec::new(),
                    notice: None,
                    session_id: request.session_id.unwrap_or_else(SessionId::new),
                }
            }
        }
    }

    async fn try_handle(&self, request: &TurnRequest) -> Result<TurnResponse, PolicyError> {
        // Read half held for the whole turn: profile switches wait for
        // in-flight decisions instead of swapping the vault under them.
        let guard = self.context.read().await;
        let Some(ctx) = guard.clone() else {
            return Ok(TurnResponse::talk(
                request.session_id.unwrap_or_else(SessionId::new),
                reason::NO_ACTIVE_PROFILE,
                "No active profile. Create or select a profile to continue.",
            ));
        };

        let date = parse_date(request.date.as_deref());
        let today = Local::now().date_naive();
        let session = match request.session_id {
            Some(session) if self.transcripts.session_exists(session)? => session,
            _ => self.transcripts.daily_session(ctx.profile_id, today)?,
        };

        // One decision at a time per session: the classify -> decide ->
        // store sequence is not atomic without this.
        let lock = self.session_lock(session);
        let _turn = lock.lock().await;

        let text = request.text.trim().to_string();
        self.transcripts
            .append(session, ctx.profile_id, Role::User, &text, None)?;
        let vault = VaultStore::new(&ctx.vault_root);

        if self.pending.peek(session).is_some() {
            if surface::is_confirmation(&text) {
                return Ok(self.confirm_pending(&ctx, &vault, session).await);
            }
            if surface::is_cancel(&text) {
                self.pending.discard(session);
                let response = TurnResponse::talk(
                    session,
                    reason::CANCELLED,
                    "Discarded the pending write. Nothing was saved to your vault.",
                );
                self.record(&ctx, session, &response);
                return Ok(response);
            }
            if let Some(edited) = surface::strip_edit(&text) {
                // Edit: drop the old proposal, decide fresh on the new text.
                self.pending.discard(session);
                let edited = edited.to_string();
                return Ok(self.decide(&ctx, &vault, session, &edited, date).await);
            }
            // Unrelated new message: the stale proposal does not linger.
            self.pending.discard(session);
            tracing::debug!("Stale pending action discarded on unrelated message");
        } else if surface::is_confirmation(&text) {
            let response =
                TurnResponse::talk(session, reason::NO_PENDING_ACTION, NOTHING_PENDING_MESSAGE);
            self.record(&ctx, session, &response);
            return Ok(response);
        }

        let lower = text.to_lowercase();
        if lower.contains("reset this conversation") || lower.contains("reset conversation") {
            self.transcripts.clear(session)?;
            self.pending.discard(session);
            let response = TurnResponse::talk(
                session,
                reason::MEMORY_RESET,
                "Conversation memory cleared for the active profile.",
            );
            self.record(&ctx, session, &response);
            return Ok(response);
        }

        Ok(self.decide(&ctx, &vault, session, &text, date).await)
    }

    /// The IDLE decision path.
    async fn decide(
        &self,
        ctx: &ProfileContext,
        vault: &VaultStore,
        session: SessionId,
        text: &str,
        date: NaiveDate,
    ) -> TurnResponse {
        if surface::is_read_only_trigger(text) {
            let context = build_read_context(vault, date);
            let message = match self.model.answer_from_context(text, &context).await {
                Ok(answer) => answer,
                Err(e) => {
                    tracing::warn!(error = %e, "Responder degraded; echoing raw context");
                    context
                }
            };
            let response = TurnResponse::talk(session, reason::ANSWERED_FROM_DATA, message)
                .with_intent(IntentCategory::Conversation)
                .with_notice("Answered from existing notes; no file was written.");
            self.record(ctx, session, &response);
            return response;
        }

        let history = self
            .transcripts
            .context(session, self.settings.history_turns)
            .unwrap_or_default();

        let classification = match self.classifier.classify(text, &history).await {
            Ok(classification) => classification,
            Err(e) => {
                // Degrade, never write.
                tracing::warn!(error = %e, "Classifier failure; degrading to talk");
                let response = TurnResponse::talk(
                    session,
                    reason::CLASSIFIER_UNAVAILABLE,
                    "I couldn't classify that message just now, so I'm treating it as \
                     conversation. Nothing was written.",
                )
                .with_intent(IntentCategory::Ambiguous)
                .with_notice("Degraded mode: intent classification is unavailable.");
                self.record(ctx, session, &response);
                return response;
            }
        };

        let mut category = classification.category;
        if category == IntentCategory::Command
            && classification.confidence < self.settings.min_confidence
        {
            category = IntentCategory::Ambiguous;
        }

        if category == IntentCategory::Conversation {
            let message = match self.model.respond(text, &history).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(error = %e, "Responder unavailable");
                    "I'm having trouble reaching the language model right now. Nothing was \
                     written."
                        .to_string()
                }
            };
            let response = TurnResponse::talk(session, reason::CONVERSATION, message)
                .with_intent(category);
            self.record(ctx, session, &response);
            return response;
        }

        let has_verb = surface::has_permission_verb(text);
        let target = surface::resolve_target(text);

        if has_verb {
            return match target {
                Some((writer, category_hint)) => {
                    // Same-turn explicit permission: no confirmation round-trip.
                    let operation = WriteOperation {
                        writer,
                        text: text.to_string(),
                        date,
                        category: category_hint,
                    };
                    self.dispatch_now(ctx, vault, session, operation, category).await
                }
                None => {
                    // Permission granted but the target is ambiguous: never
                    // guess and write. Capture a best-effort proposal and ask.
                    let operation = best_effort_operation(text, date, None);
                    self.pending
                        .put(PendingAction::new(session, ctx.profile_id, operation));
                    let response = ask(
                        session,
                        reason::AWAITING_CONFIRMATION,
                        "I can save that, but I'm not sure where it belongs. Should I file it \
                         as a Learning note? Reply \"yes\" to proceed or \"cancel\" to drop it.",
                        category,
                    );
                    self.record(ctx, session, &response);
                    response
                }
            };
        }

        if category == IntentCategory::Command {
            if let Some((WriterKind::Progress, _)) = target {
                // Progress text without permission parks in the draft cache.
                return match progress::cache_entry(vault, date, text) {
                    Ok(cache_path) => {
                        let operation = WriteOperation {
                            writer: WriterKind::Progress,
                            text: text.to_string(),
                            date,
                            category: None,
                        };
                        self.pending
                            .put(PendingAction::new(session, ctx.profile_id, operation));
                        let mut response = TurnResponse::talk(
                            session,
                            reason::DRAFT_CACHE_CREATED,
                            "Stashed that in today's draft cache. No final file was written; \
                             say \"save it\" to log today's progress.",
                        )
                        .with_intent(category)
                        .with_notice("Draft cache only; nothing final was written.");
                        response.files = vec![cache_path.display().to_string()];
                        self.record(ctx, session, &response);
                        response
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Draft cache write failed");
                        let response = self.failed_talk(session, e.to_string());
                        self.record(ctx, session, &response);
                        response
                    }
                };
            }

            // Command without a permission verb: derive, describe, persist
            // nothing, and keep the proposal so "save it" can dispatch it.
            let operation = best_effort_operation(text, date, target);
            let preview = self
                .router
                .describe(&operation)
                .unwrap_or_else(|| "save this".to_string());
            self.pending
                .put(PendingAction::new(session, ctx.profile_id, operation));
            let response = TurnResponse::talk(
                session,
                reason::EXPLICIT_WRITE_PERMISSION_REQUIRED,
                format!(
                    "Here's what I'd do: {}. No file has been written; say \"save it\" and \
                     I'll go ahead.",
                    preview
                ),
            )
            .with_intent(category)
            .with_notice("No file was written.");
            self.record(ctx, session, &response);
            return response;
        }

        // Ambiguous without a permission verb: ask before doing anything.
        let operation = best_effort_operation(text, date, target);
        self.pending
            .put(PendingAction::new(session, ctx.profile_id, operation));
        let response = ask(
            session,
            reason::AWAITING_CONFIRMATION,
            "Do you want me to save or update anything in your vault, or just talk it through?",
            category,
        );
        self.record(ctx, session, &response);
        response
    }

    /// Dispatch with same-turn permission.
    async fn dispatch_now(
        &self,
        ctx: &ProfileContext,
        vault: &VaultStore,
        session: SessionId,
        operation: WriteOperation,
        intent: IntentCategory,
    ) -> TurnResponse {
        let result = self.router.dispatch(vault, session, &operation).await;
        let response = match result.status {
            DispatchStatus::Success | DispatchStatus::Partial => TurnResponse {
                status: TurnStatus::Success,
                message: result.message,
                intent: Some(intent),
                action: Action::Act,
                reason: reason::WRITE_PERMISSION_GRANTED.to_string(),
                actions: result.actions,
                files: result.files,
                notice: (result.status == DispatchStatus::Partial)
                    .then(|| "Some follow-up steps did not complete.".to_string()),
                session_id: session,
            },
            DispatchStatus::Failed => {
                // Keep the proposal so a bare confirmation retries it.
                self.pending
                    .put(PendingAction::new(session, ctx.profile_id, operation));
                TurnResponse {
                    status: TurnStatus::Failed,
                    message: format!(
                        "{} The write did not complete; say \"confirm\" to retry.",
                        result.message
                    ),
                    intent: Some(intent),
                    action: Action::Act,
                    reason: reason::WRITE_FAILED.to_string(),
                    actions: Vec::new(),
                    files: Vec::new(),
                    notice: Some("No file was written.".to_string()),
                    session_id: session,
                }
            }
        };
        self.record(ctx, session, &response);
        response
    }

    /// Dispatch the stored proposal after an explicit confirmation.
    async fn confirm_pending(
        &self,
        ctx: &ProfileContext,
        vault: &VaultStore,
        session: SessionId,
    ) -> TurnResponse {
        let pending = match self.pending.resolve(session) {
            Ok(pending) if pending.profile_id == ctx.profile_id => pending,
            Ok(_) | Err(_) => {
                // Nothing pending under this profile; a proposal from
                // another profile never dispatches here.
                let response = TurnResponse::talk(
                    session,
                    reason::NO_PENDING_ACTION,
                    NOTHING_PENDING_MESSAGE,
                );
                self.record(ctx, session, &response);
                return response;
            }
        };

        let result = self.router.dispatch(vault, session, &pending.operation).await;
        let response = match result.status {
            DispatchStatus::Success | DispatchStatus::Partial => TurnResponse {
                status: TurnStatus::Success,
                message: result.message,
                intent: None,
                action: Action::Act,
                reason: reason::CONFIRMED_PERMISSION.to_string(),
                actions: result.actions,
                files: result.files,
                notice: (result.status == DispatchStatus::Partial)
                    .then(|| "Some follow-up steps did not complete.".to_string()),
                session_id: session,
            },
            DispatchStatus::Failed => {
                // Restore the proposal: the user retries with a bare
                // confirmation instead of re-stating the whole request.
                self.pending.put(pending);
                TurnResponse {
                    status: TurnStatus::Failed,
                    message: format!(
                        "{} The write did not complete; say \"confirm\" to retry.",
                        result.message
                    ),
                    intent: None,
                    action: Action::Act,
                    reason: reason::WRITE_FAILED.to_string(),
                    actions: Vec::new(),
                    files: Vec::new(),
                    notice: Some("No file was written.".to_string()),
                    session_id: session,
                }
            }
        };
        self.record(ctx, session, &response);
        response
    }

    fn failed_talk(&self, session: SessionId, detail: String) -> TurnResponse {
        TurnResponse {
            status: TurnStatus::Failed,
            message: format!("{} Nothing was written.", detail),
            intent: None,
            action: Action::Talk,
            reason: reason::WRITE_FAILED.to_string(),
            actions: Vec::new(),
            files: Vec::new(),
            notice: None,
            session_id: session,
        }
    }

    fn session_lock(&self, session: SessionId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.session_locks.lock().expect("session lock table");
        Arc::clone(locks.entry(session).or_default())
    }

    fn record(&self, ctx: &ProfileContext, session: SessionId, response: &TurnResponse) {
        let metadata = serde_json::json!({
            "intent": response.intent.map(|i| i.to_string()),
            "action": response.action.to_string(),
            "reason": response.reason,
            "actions": response.actions,
            "files": response.files,
        });
        if let Err(e) = self.transcripts.append(
            session,
            ctx.profile_id,
            Role::Assistant,
            &response.message,
            Some(&metadata),
        ) {
            tracing::warn!(error = %e, "Failed to record assistant turn");
        }
    }
}

/// Best-effort operation for a proposal when the user has not (yet)
/// granted permission or the target is unresolved.
fn best_effort_operation(
    text: &str,
    date: NaiveDate,
    target: Option<(WriterKind, Option<String>)>,
) -> WriteOperation {
    let (writer, category) =
        target.unwrap_or((WriterKind::Notes, Some("Learning".to_string())));
    WriteOperation {
        writer,
        text: text.to_string(),
        date,
        category,
    }
}

fn ask(session: SessionId, reason: &str, message: &str, intent: IntentCategory) -> TurnResponse {
    TurnResponse {
        status: TurnStatus::Success,
        message: message.to_string(),
        intent: Some(intent),
        action: Action::Ask,
        reason: reason.to_string(),
        actions: Vec::new(),
        files: Vec::new(),
        notice: Some("No file was written.".to_string()),
        session_id: session,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_effort_defaults_to_learning_notes() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        let op = best_effort_operation("organize this", date, None);
        assert_eq!(op.writer, WriterKind::Notes);
        assert_eq!(op.category.as_deref(), Some("Learning"));
    }

    #[test]
    fn test_best_effort_keeps_resolved_target() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 8).unwrap();
        let op = best_effort_operation(
            "extract tasks from the planning doc",
            date,
            Some((WriterKind::Tasks, None)),
        );
        assert_eq!(op.writer, WriterKind::Tasks);
        assert!(op.category.is_none());
    }

    #[test]
    fn test_ask_response_shape() {
        let session = SessionId::new();
        let response = ask(
            session,
            reason::AWAITING_CONFIRMATION,
            "save or talk?",
            IntentCategory::Ambiguous,
        );
        assert_eq!(response.action, Action::Ask);
        assert_eq!(response.reason, reason::AWAITING_CONFIRMATION);
        assert_eq!(response.notice.as_deref(), Some("No file was written."));
        assert!(response.files.is_empty());
    }
}
