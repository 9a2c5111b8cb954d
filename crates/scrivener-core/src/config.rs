use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, ScrivenerError};

/// Top-level configuration for the Scrivener application.
///
/// Loaded from `~/.scrivener/config.toml` by default. Each section
/// corresponds to a bounded context or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrivenerConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl ScrivenerConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ScrivenerConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ScrivenerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.scrivener/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Vault settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Default vault root used when bootstrapping the first profile.
    pub root: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: "~/.scrivener/vault".to_string(),
        }
    }
}

/// Decision-layer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Classifier confidence below which a command is treated as ambiguous.
    pub min_confidence: f32,
    /// Number of transcript turns handed to the classifier as history.
    pub history_turns: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            history_turns: 12,
        }
    }
}
