// src/output/attachments.rs
//! Attachment Materializer: downloads referenced binaries into the vault's
//! attachment folder and hands back an embed token.

use super::paths::sniff_extension;
use super::vault::Vault;
use crate::api::AssetSource;
use crate::constants::MAX_NAME_ATTEMPTS;
use crate::formatting::ConversionContext;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

pub struct AttachmentMaterializer {
    source: Arc<dyn AssetSource>,
    vault: Arc<dyn Vault>,
    dir: PathBuf,
    reserved: Mutex<HashSet<String>>,
}

impl AttachmentMaterializer {
    /// `dir` is the attachment folder, relative to the vault root.
    pub fn new(source: Arc<dyn AssetSource>, vault: Arc<dyn Vault>, dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            vault,
            dir: dir.into(),
            reserved: Mutex::new(HashSet::new()),
        }
    }

    /// Downloads `url` and stores it as `{file_stem}_{seq}.{ext}`.
    ///
    /// Returns the embed token `![[name]]`, or `None` when any step fails;
    /// failures are logged and never abort the document.
    pub async fn materialize(&self, url: &str, ctx: &mut ConversionContext) -> Option<String> {
        let extension = sniff_extension(url);
        let name = self.reserve_name(ctx, &extension).await?;

        let bytes = match self.source.download(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Failed to download attachment {}: {}", url, e);
                return None;
            }
        };

        if let Err(e) = self.vault.write_binary(&self.dir.join(&name), &bytes).await {
            log::warn!("Failed to store attachment {}: {}", name, e);
            return None;
        }

        log::debug!("Stored attachment {} ({} bytes)", name, bytes.len());
        Some(format!("![[{}]]", name))
    }

    /// Picks the next free `{stem}_{seq}.{ext}`. A name is free when it is
    /// neither on disk nor reserved earlier in this run.
    async fn reserve_name(&self, ctx: &mut ConversionContext, extension: &str) -> Option<String> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let seq = ctx.next_attachment_seq();
            let candidate = format!("{}_{}.{}", ctx.file_stem(), seq, extension);
            if self.vault.file_exists(&self.dir.join(&candidate)).await {
                continue;
            }
            if self.reserved.lock().insert(candidate.clone()) {
                return Some(candidate);
            }
        }

        log::warn!(
            "No free attachment name for '{}' after {} attempts",
            ctx.file_stem(),
            MAX_NAME_ATTEMPTS
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::formatting::{CancellationFlag, ConversionSettings};
    use crate::output::vault::FsVault;
    use tempfile::TempDir;

    struct StaticSource;

    #[async_trait::async_trait]
    impl AssetSource for StaticSource {
        async fn download(&self, url: &str) -> Result<Vec<u8>, AppError> {
            if url.contains("broken") {
                return Err(AppError::DownloadFailed {
                    url: url.to_string(),
                    reason: "HTTP 403 Forbidden".to_string(),
                });
            }
            Ok(url.as_bytes().to_vec())
        }
    }

    fn ctx(stem: &str) -> ConversionContext {
        ConversionContext::new(
            stem,
            Arc::new(ConversionSettings::default()),
            CancellationFlag::new(),
        )
    }

    fn materializer(dir: &TempDir) -> AttachmentMaterializer {
        AttachmentMaterializer::new(
            Arc::new(StaticSource),
            Arc::new(FsVault::new(dir.path())),
            "attachments",
        )
    }

    #[tokio::test]
    async fn test_same_basename_gets_distinct_names() {
        let dir = TempDir::new().unwrap();
        let materializer = materializer(&dir);
        let mut ctx = ctx("Note");

        let first = materializer
            .materialize("https://a.example/x/image.png", &mut ctx)
            .await;
        let second = materializer
            .materialize("https://b.example/y/image.png", &mut ctx)
            .await;

        assert_eq!(first.as_deref(), Some("![[Note_1.png]]"));
        assert_eq!(second.as_deref(), Some("![[Note_2.png]]"));
        let stored = std::fs::read(dir.path().join("attachments/Note_2.png")).unwrap();
        assert_eq!(stored, b"https://b.example/y/image.png");
    }

    #[tokio::test]
    async fn test_existing_file_bumps_sequence() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("attachments")).unwrap();
        std::fs::write(dir.path().join("attachments/Note_1.pdf"), b"old").unwrap();
        let materializer = materializer(&dir);
        let mut ctx = ctx("Note");

        let embed = materializer
            .materialize("https://a.example/report.PDF?sig=abc", &mut ctx)
            .await;

        assert_eq!(embed.as_deref(), Some("![[Note_2.pdf]]"));
        assert_eq!(
            std::fs::read(dir.path().join("attachments/Note_1.pdf")).unwrap(),
            b"old"
        );
    }

    #[tokio::test]
    async fn test_download_failure_returns_none() {
        let dir = TempDir::new().unwrap();
        let materializer = materializer(&dir);
        let mut ctx = ctx("Note");

        assert_eq!(
            materializer
                .materialize("https://a.example/broken.png", &mut ctx)
                .await,
            None
        );
        let next = materializer
            .materialize("https://a.example/fine.png", &mut ctx)
            .await;
        assert_eq!(next.as_deref(), Some("![[Note_2.png]]"));
    }
}
