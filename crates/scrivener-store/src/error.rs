use thiserror::Error;

/// Errors from the relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    Open(String),
    #[error("Query failed: {0}")]
    Query(String),
    #[error("Database lock poisoned")]
    LockPoisoned,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => {
                StoreError::NotFound("query returned no rows".to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

impl From<StoreError> for scrivener_core::ScrivenerError {
    fn from(err: StoreError) -> Self {
        scrivener_core::ScrivenerError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = StoreError::Open("locked".to_string());
        assert_eq!(err.to_string(), "Failed to open database: locked");

        let err = StoreError::NotFound("profile abc".to_string());
        assert_eq!(err.to_string(), "Not found: profile abc");
    }

    #[test]
    fn test_no_rows_maps_to_not_found() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_converts_to_top_level_error() {
        let err: scrivener_core::ScrivenerError = StoreError::LockPoisoned.into();
        assert!(err.to_string().contains("Database lock poisoned"));
    }
}
