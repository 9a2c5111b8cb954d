//! Filesystem-backed Markdown vault.
//!
//! All paths handed to the store are relative to the vault root; the store
//! creates parent directories on write and enforces the fixed vault layout
//! (top-level `Reports/` and `Templates/`, week partitions with one folder
//! per content category).

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::partition::{Category, Partition};

/// Top-level folders that exist in every vault.
const VAULT_STRUCTURE: [&str; 2] = ["Reports", "Templates"];

/// Errors from vault file operations.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("File not found in vault: {0}")]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<VaultError> for scrivener_core::ScrivenerError {
    fn from(err: VaultError) -> Self {
        scrivener_core::ScrivenerError::Vault(err.to_string())
    }
}

/// Markdown store rooted at one profile's vault directory.
#[derive(Debug, Clone)]
pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the vault root and its fixed top-level folders.
    pub fn ensure_vault(&self) -> Result<(), VaultError> {
        std::fs::create_dir_all(&self.root)?;
        for subpath in VAULT_STRUCTURE {
            std::fs::create_dir_all(self.root.join(subpath))?;
        }
        Ok(())
    }

    /// Write a Markdown file, replacing any existing content.
    pub fn write_markdown(&self, relative: &Path, content: &str) -> Result<PathBuf, VaultError> {
        let full = self.root.join(relative);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full, content)?;
        debug!(path = %relative.display(), bytes = content.len(), "Markdown written");
        Ok(full)
    }

    /// Append a Markdown block, separated from existing content by a blank
    /// line. Creates the file if it does not exist.
    pub fn append_markdown(&self, relative: &Path, content: &str) -> Result<PathBuf, VaultError> {
        let full = self.root.join(relative);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if full.exists() {
            let existing = std::fs::read_to_string(&full)?;
            let joined = format!("{}\n\n{}", existing.trim_end(), content);
            std::fs::write(&full, joined)?;
        } else {
            std::fs::write(&full, content)?;
        }
        debug!(path = %relative.display(), "Markdown appended");
        Ok(full)
    }

    /// Read a Markdown file relative to the vault root.
    pub fn read_markdown(&self, relative: &Path) -> Result<String, VaultError> {
        let full = self.root.join(relative);
        if !full.exists() {
            return Err(VaultError::NotFound(relative.to_path_buf()));
        }
        Ok(std::fs::read_to_string(&full)?)
    }

    /// Whether a relative path exists in the vault.
    pub fn exists(&self, relative: &Path) -> bool {
        self.root.join(relative).exists()
    }

    /// Create the week partition folders for a date and return the week base
    /// path relative to the vault root.
    pub fn ensure_week_folders(&self, date: NaiveDate) -> Result<PathBuf, VaultError> {
        let partition = Partition::resolve(date);
        for category in Category::ALL {
            std::fs::create_dir_all(self.root.join(partition.subpath(category)))?;
        }
        Ok(partition.relative_path())
    }

    /// Category folder for a date, creating the week partition as needed.
    pub fn week_subpath(&self, date: NaiveDate, category: Category) -> Result<PathBuf, VaultError> {
        self.ensure_week_folders(date)?;
        Ok(Partition::resolve(date).subpath(category))
    }

    /// Report folder for a date: `Reports/YYYY/MM`.
    pub fn report_base_path(&self, date: NaiveDate) -> PathBuf {
        use chrono::Datelike;
        PathBuf::from("Reports")
            .join(format!("{:04}", date.year()))
            .join(format!("{:02}", date.month()))
    }
}
