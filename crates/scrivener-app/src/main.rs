//! Scrivener application binary - composition root.
//!
//! Ties together the Scrivener crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Open the SQLite store and bootstrap the default profile
//! 3. Build the writer registry and the policy engine
//! 4. Run a line-oriented REPL over stdin
//!
//! The offline OutlineModel and KeywordClassifier adapters are wired in by
//! default; network-backed adapters implement the same traits and can be
//! swapped in here.

use std::io::{BufRead, Write as _};
use std::path::PathBuf;
use std::sync::Arc;

use scrivener_agents::{OutlineModel, WriterRegistry};
use scrivener_core::ScrivenerConfig;
use scrivener_policy::{KeywordClassifier, PolicyEngine, TurnRequest};
use scrivener_store::{Database, ProfileStore, TranscriptStore};

/// Expand ~ to the home directory in a path string.
fn resolve_dir(dir: &str) -> PathBuf {
    if let Some(rest) = dir.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(dir)
    }
}

/// Resolve the config file path (SCRIVENER_CONFIG env, or
/// ~/.scrivener/config.toml).
fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("SCRIVENER_CONFIG") {
        return PathBuf::from(path);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".scrivener").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Scrivener v{}", env!("CARGO_PKG_VERSION"));

    let config_file = config_path();
    let config = ScrivenerConfig::load_or_default(&config_file);
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    let data_dir = resolve_dir(&config.general.data_dir);
    let db_path = data_dir.join("scrivener.db");
    let db = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    let profiles = Arc::new(ProfileStore::new(Arc::clone(&db)));
    let transcripts = Arc::new(TranscriptStore::new(Arc::clone(&db)));

    let vault_root = resolve_dir(&config.vault.root);
    let profile = profiles.ensure_default(&vault_root.display().to_string())?;
    tracing::info!(profile = %profile.id, vault = %profile.vault_root, "Active profile ready");

    let model = Arc::new(OutlineModel::new());
    let mut registry = WriterRegistry::new();
    registry.register_defaults(model.clone());

    let engine = PolicyEngine::new(
        Arc::new(KeywordClassifier::new()),
        model,
        registry,
        transcripts,
        profiles,
        config.policy.clone(),
    );
    engine.activate().await?;

    println!("Scrivener is listening. Type a message, or \"quit\" to exit.");
    let stdin = std::io::stdin();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "quit" || text == "exit" {
            break;
        }

        let response = engine
            .handle_message(TurnRequest {
                session_id: None,
                text: text.to_string(),
                date: None,
            })
            .await;

        println!("scrivener> {}", response.message);
        println!(
            "           [action: {} | reason: {}]",
            response.action, response.reason
        );
        for file in &response.files {
            println!("           wrote: {}", file);
        }
        if let Some(notice) = &response.notice {
            println!("           note: {}", notice);
        }
    }

    tracing::info!("Scrivener shutting down");
    Ok(())
}
