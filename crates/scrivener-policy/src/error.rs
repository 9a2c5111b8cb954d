//! Error taxonomy for the decision layer.
//!
//! Every variant is recovered at the engine boundary and converted into a
//! structured response; none propagates to the caller as a fault.

use thiserror::Error;

use scrivener_core::SessionId;
use scrivener_store::StoreError;
use scrivener_vault::VaultError;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("No pending action for session {0}")]
    NoPendingAction(SessionId),

    #[error("Ambiguous target: {0}")]
    AmbiguousTarget(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = PolicyError::ClassifierUnavailable("timeout".to_string());
        assert_eq!(err.to_string(), "Classifier unavailable: timeout");

        let session = SessionId::new();
        let err = PolicyError::NoPendingAction(session);
        assert_eq!(
            err.to_string(),
            format!("No pending action for session {}", session)
        );

        let err = PolicyError::WriteFailed("disk full".to_string());
        assert_eq!(err.to_string(), "Write failed: disk full");
    }

    #[test]
    fn test_from_store_error() {
        let err: PolicyError = StoreError::LockPoisoned.into();
        assert!(matches!(err, PolicyError::Storage(_)));
    }
}
