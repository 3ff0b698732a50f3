// src/output/vault.rs
//! The destination vault: a directory tree addressed by relative paths.

use crate::error::AppError;
use crate::types::ValidationError;
use std::path::{Component, Path, PathBuf};

/// Storage the migration writes notes and attachments into.
///
/// All paths are relative to the vault root.
#[async_trait::async_trait]
pub trait Vault: Send + Sync {
    async fn dir_exists(&self, path: &Path) -> bool;

    async fn file_exists(&self, path: &Path) -> bool;

    /// Writes bytes, replacing any existing file. Parent folders are created.
    async fn write_binary(&self, path: &Path, bytes: &[u8]) -> Result<(), AppError>;

    /// Writes UTF-8 text, replacing any existing file. Parent folders are created.
    async fn write_text(&self, path: &Path, text: &str) -> Result<(), AppError> {
        self.write_binary(path, text.as_bytes()).await
    }
}

/// A vault rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Joins a vault-relative path onto the root, refusing paths that
    /// would escape it.
    pub fn resolve(&self, path: &Path) -> Result<PathBuf, ValidationError> {
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ValidationError::InvalidFilePath {
                path: path.display().to_string(),
                reason: "must stay inside the vault".to_string(),
            });
        }
        Ok(self.root.join(path))
    }
}

#[async_trait::async_trait]
impl Vault for FsVault {
    async fn dir_exists(&self, path: &Path) -> bool {
        match self.resolve(path) {
            Ok(full) => tokio::fs::metadata(full)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn file_exists(&self, path: &Path) -> bool {
        match self.resolve(path) {
            Ok(full) => tokio::fs::metadata(full)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn write_binary(&self, path: &Path, bytes: &[u8]) -> Result<(), AppError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), full.display());
        Ok(())
    }
}
