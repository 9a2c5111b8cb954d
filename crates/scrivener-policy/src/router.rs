//! Dispatch of accepted operations to writer capabilities.
//!
//! Dispatch is synchronous from the caller's perspective: the result
//! always reflects the outcome of actually attempting the write, never an
//! optimistic success. The router never retries; on success it clears the
//! session's pending entry (a no-op when none exists).

use std::sync::Arc;

use scrivener_agents::{WriteRequest, WriterRegistry};
use scrivener_core::SessionId;
use scrivener_vault::VaultStore;

use crate::pending::PendingStore;
use crate::types::WriteOperation;

/// Outcome status of a dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchStatus {
    Success,
    Partial,
    Failed,
}

/// Uniform result envelope for a dispatched operation.
#[derive(Clone, Debug)]
pub struct DispatchResult {
    pub status: DispatchStatus,
    pub message: String,
    pub actions: Vec<String>,
    pub files: Vec<String>,
}

/// Routes accepted operations to the registered writer.
pub struct Router {
    registry: WriterRegistry,
    pending: Arc<PendingStore>,
}

impl Router {
    pub fn new(registry: WriterRegistry, pending: Arc<PendingStore>) -> Self {
        Self { registry, pending }
    }

    /// Short description of what an operation would write.
    pub fn describe(&self, operation: &WriteOperation) -> Option<String> {
        let request = WriteRequest {
            text: operation.text.clone(),
            date: operation.date,
            category: operation.category.clone(),
        };
        self.registry
            .get(operation.writer)
            .map(|writer| writer.describe(&request))
    }

    /// Execute an operation against its writer.
    ///
    /// A writer error yields `Failed` with the writer's reason; the
    /// caller decides whether the proposal stays retryable.
    pub async fn dispatch(
        &self,
        vault: &VaultStore,
        session: SessionId,
        operation: &WriteOperation,
    ) -> DispatchResult {
        let Some(writer) = self.registry.get(operation.writer) else {
            return DispatchResult {
                status: DispatchStatus::Failed,
                message: format!("No writer registered for {}", operation.writer),
                actions: Vec::new(),
                files: Vec::new(),
            };
        };

        let request = WriteRequest {
            text: operation.text.clone(),
            date: operation.date,
            category: operation.category.clone(),
        };

        match writer.execute(vault, &request).await {
            Ok(outcome) => {
                self.pending.discard(session);
                tracing::info!(
                    writer = %operation.writer,
                    files = outcome.files.len(),
                    partial = outcome.partial,
                    "Operation dispatched"
                );
                DispatchResult {
                    status: if outcome.partial {
                        DispatchStatus::Partial
                    } else {
                        DispatchStatus::Success
                    },
                    message: outcome.message,
                    actions: outcome.actions,
                    files: outcome
                        .files
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect(),
                }
            }
            Err(e) => {
                tracing::warn!(writer = %operation.writer, error = %e, "Dispatch failed");
                DispatchResult {
                    status: DispatchStatus::Failed,
                    message: e.to_string(),
                    actions: Vec::new(),
                    files: Vec::new(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PendingAction;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use scrivener_agents::{
        OutlineModel, WriteOutcome, Writer, WriterError, WriterKind,
    };
    use scrivener_core::ProfileId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn operation(kind: WriterKind, text: &str) -> WriteOperation {
        WriteOperation {
            writer: kind,
            text: text.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 2, 8).unwrap(),
            category: None,
        }
    }

    fn make_vault() -> (tempfile::TempDir, VaultStore) {
        let dir = tempfile::tempdir().unwrap();
        let vault = VaultStore::new(dir.path().join("vault"));
        vault.ensure_vault().unwrap();
        (dir, vault)
    }

    struct FailingWriter {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Writer for FailingWriter {
        fn kind(&self) -> WriterKind {
            WriterKind::Notes
        }
        async fn execute(
            &self,
            _vault: &VaultStore,
            _request: &WriteRequest,
        ) -> Result<WriteOutcome, WriterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(WriterError::InvalidRequest("vault root is read-only".to_string()))
        }
        fn describe(&self, _request: &WriteRequest) -> String {
            "always fails".to_string()
        }
    }

    #[tokio::test]
    async fn test_successful_dispatch_clears_pending() {
        let mut registry = WriterRegistry::new();
        registry.register_defaults(Arc::new(OutlineModel));
        let pending = Arc::new(PendingStore::new());
        let router = Router::new(registry, Arc::clone(&pending));
        let (_dir, vault) = make_vault();

        let session = SessionId::new();
        let op = operation(WriterKind::Tasks, "- [ ] review PR");
        pending.put(PendingAction::new(session, ProfileId::new(), op.clone()));

        let result = router.dispatch(&vault, session, &op).await;
        assert_eq!(result.status, DispatchStatus::Success);
        assert!(result.actions.contains(&"tasks_created".to_string()));
        assert_eq!(result.files.len(), 1);
        assert!(pending.peek(session).is_none());
    }

    #[tokio::test]
    async fn test_clearing_with_no_pending_is_idempotent() {
        let mut registry = WriterRegistry::new();
        registry.register_defaults(Arc::new(OutlineModel));
        let pending = Arc::new(PendingStore::new());
        let router = Router::new(registry, Arc::clone(&pending));
        let (_dir, vault) = make_vault();

        let op = operation(WriterKind::Tasks, "- [ ] a task");
        let result = router.dispatch(&vault, SessionId::new(), &op).await;
        assert_eq!(result.status, DispatchStatus::Success);
    }

    #[tokio::test]
    async fn test_failed_dispatch_reports_reason_and_does_not_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = WriterRegistry::new();
        registry.register(Box::new(FailingWriter {
            calls: Arc::clone(&calls),
        }));
        let pending = Arc::new(PendingStore::new());
        let router = Router::new(registry, Arc::clone(&pending));
        let (_dir, vault) = make_vault();

        let session = SessionId::new();
        let op = operation(WriterKind::Notes, "save this note");
        pending.put(PendingAction::new(session, ProfileId::new(), op.clone()));

        let result = router.dispatch(&vault, session, &op).await;
        assert_eq!(result.status, DispatchStatus::Failed);
        assert!(result.message.contains("vault root is read-only"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // The failed dispatch did not clear the pending entry.
        assert!(pending.peek(session).is_some());
    }

    #[tokio::test]
    async fn test_unregistered_writer_fails() {
        let registry = WriterRegistry::new();
        let router = Router::new(registry, Arc::new(PendingStore::new()));
        let (_dir, vault) = make_vault();

        let op = operation(WriterKind::Report, "report please");
        let result = router.dispatch(&vault, SessionId::new(), &op).await;
        assert_eq!(result.status, DispatchStatus::Failed);
        assert!(result.message.contains("No writer registered"));
    }

    #[tokio::test]
    async fn test_describe_uses_writer() {
        let mut registry = WriterRegistry::new();
        registry.register_defaults(Arc::new(OutlineModel));
        let router = Router::new(registry, Arc::new(PendingStore::new()));

        let op = operation(WriterKind::Tasks, "call the vendor about the contract");
        let described = router.describe(&op).unwrap();
        assert!(described.contains("Extract tasks"));
    }
}
