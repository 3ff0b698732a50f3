// src/output/migration_log.rs
//! Persisted, human-readable progress log of migration runs.
//!
//! Each run appends short lines such as `Fetching data from Notion...`
//! and `Migration completed!`. The log survives between runs until it is
//! cleared explicitly.

use crate::error::AppError;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct MigrationLog {
    path: PathBuf,
}

impl MigrationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line and mirrors it to the application log. A log that
    /// cannot be written is reported but never stops a migration.
    pub async fn record(&self, line: &str) {
        log::info!("{}", line);
        if let Err(e) = self.append(line).await {
            log::warn!(
                "Could not append to migration log {}: {}",
                self.path.display(),
                e
            );
        }
    }

    async fn append(&self, line: &str) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", line).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// All recorded lines, oldest first. A missing log reads as empty.
    pub async fn lines(&self) -> Result<Vec<String>, AppError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes every recorded line.
    pub async fn clear(&self) -> Result<(), AppError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                log::info!("Cleared migration log {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
