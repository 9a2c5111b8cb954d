use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrivenerError>;

/// Top-level error type for the Scrivener system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for
/// ScrivenerError` so that the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScrivenerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vault error: {0}")]
    Vault(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Policy error: {0}")]
    Policy(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ScrivenerError {
    fn from(err: toml::de::Error) -> Self {
        ScrivenerError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ScrivenerError {
    fn from(err: toml::ser::Error) -> Self {
        ScrivenerError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ScrivenerError {
    fn from(err: serde_json::Error) -> Self {
        ScrivenerError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        let err = ScrivenerError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = ScrivenerError::Vault("root not writable".to_string());
        assert_eq!(err.to_string(), "Vault error: root not writable");

        let err = ScrivenerError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "Storage error: disk full");

        let err = ScrivenerError::Model("backend offline".to_string());
        assert_eq!(err.to_string(), "Model error: backend offline");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ScrivenerError = io.into();
        assert!(matches!(err, ScrivenerError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ScrivenerError = parse.into();
        assert!(matches!(err, ScrivenerError::Serialization(_)));
    }

    #[test]
    fn test_from_toml_error() {
        let parse = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: ScrivenerError = parse.into();
        assert!(matches!(err, ScrivenerError::Config(_)));
    }
}
