// src/pipeline.rs
//! The migration batch: list a database, convert each row, write the notes.

use crate::api::{fetch_all_documents, AssetSource, NotionRepository};
use crate::constants::DEFAULT_CONCURRENCY;
use crate::error::AppError;
use crate::formatting::{
    serialize_header, BlockWalker, CancellationFlag, ChildPageConverter, ConversionContext,
    ConversionSettings, RelationResolver, RenderedBody,
};
use crate::model::{ChildPageBlock, Document};
use crate::output::{
    finalize, AttachmentMaterializer, MigrationLog, PendingWrite, TitleRegistry, Vault,
    WriteOutcome,
};
use crate::types::{DatabaseId, PageId};
use futures::stream::{self, StreamExt};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// What a batch did, per document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationReport {
    /// Vault-relative paths of the notes written.
    pub written: Vec<PathBuf>,
    /// Documents not started because the run was cancelled.
    pub skipped: Vec<PageId>,
    /// Documents that failed, with the reason.
    pub failed: Vec<(PageId, String)>,
    /// Child page notes flushed alongside their parents.
    pub child_pages: usize,
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} written ({} child pages), {} skipped, {} failed",
            self.written.len(),
            self.child_pages,
            self.skipped.len(),
            self.failed.len()
        )
    }
}

enum DocumentOutcome {
    Written(WriteOutcome),
    Skipped(PageId),
    Failed(PageId, String),
}

/// Runs migrations of one Notion workspace into one vault.
pub struct Migrator {
    repository: Arc<dyn NotionRepository>,
    vault: Arc<dyn Vault>,
    attachments: AttachmentMaterializer,
    relations: RelationResolver,
    titles: TitleRegistry,
    settings: Arc<ConversionSettings>,
    cancel: CancellationFlag,
    log: Option<MigrationLog>,
    concurrency: usize,
}

impl Migrator {
    pub fn new(
        repository: Arc<dyn NotionRepository>,
        assets: Arc<dyn AssetSource>,
        vault: Arc<dyn Vault>,
        settings: ConversionSettings,
    ) -> Self {
        Self {
            attachments: AttachmentMaterializer::new(
                assets,
                vault.clone(),
                settings.attachments.clone(),
            ),
            relations: RelationResolver::new(repository.clone()),
            titles: TitleRegistry::new(),
            settings: Arc::new(settings),
            cancel: CancellationFlag::new(),
            log: None,
            concurrency: DEFAULT_CONCURRENCY,
            repository,
            vault,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Uses `cancel` as the stop flag. It is read as each document starts,
    /// so up to `concurrency` documents already running still finish and
    /// are written.
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_migration_log(mut self, log: MigrationLog) -> Self {
        self.log = Some(log);
        self
    }

    /// The flag that stops the batch before its next document.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    async fn record(&self, line: &str) {
        match &self.log {
            Some(log) => log.record(line).await,
            None => log::info!("{}", line),
        }
    }

    /// Migrates every document of `collection`.
    ///
    /// Per-document failures end up in the report. Only a missing
    /// destination or a failed listing fails the batch.
    pub async fn run(&self, collection: &DatabaseId) -> Result<MigrationReport, AppError> {
        match self.run_batch(collection).await {
            Ok(report) => {
                self.record("Migration completed!").await;
                log::info!("{}", report);
                Ok(report)
            }
            Err(e) => {
                log::error!("Migration of {} failed: {}", collection, e);
                self.record(&format!("Error: {}", e)).await;
                Err(e)
            }
        }
    }

    async fn run_batch(&self, collection: &DatabaseId) -> Result<MigrationReport, AppError> {
        let destination = &self.settings.destination;
        if !self.vault.dir_exists(destination).await {
            return Err(AppError::DestinationMissing(destination.clone()));
        }

        match self.repository.retrieve_collection_title(collection).await {
            Ok(Some(title)) => log::info!("Migrating '{}' ({})", title, collection),
            Ok(None) => log::info!("Migrating untitled database {}", collection),
            Err(e) => log::warn!("Could not read the title of {}: {}", collection, e),
        }

        self.record("Fetching data from Notion...").await;
        let documents = fetch_all_documents(&*self.repository, collection).await?;
        self.record(&format!("{} items fetched from Notion.", documents.len()))
            .await;

        self.record("Creating markdown files...").await;
        let outcomes: Vec<DocumentOutcome> = stream::iter(&documents)
            .map(|document| self.migrate_document(document))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = MigrationReport::default();
        for outcome in outcomes {
            match outcome {
                DocumentOutcome::Written(write) => {
                    report.child_pages += write.children_written;
                    report.written.push(write.path);
                }
                DocumentOutcome::Skipped(id) => report.skipped.push(id),
                DocumentOutcome::Failed(id, reason) => report.failed.push((id, reason)),
            }
        }
        Ok(report)
    }

    async fn migrate_document(&self, document: &Document) -> DocumentOutcome {
        if self.cancel.is_cancelled() {
            log::info!("Cancelled, skipping {}", document.id);
            return DocumentOutcome::Skipped(document.id.clone());
        }

        match self.write_document(document).await {
            Ok(outcome) => DocumentOutcome::Written(outcome),
            Err(e) => {
                log::warn!("Document {} failed: {}", document.id, e);
                DocumentOutcome::Failed(document.id.clone(), e.to_string())
            }
        }
    }

    async fn write_document(&self, document: &Document) -> Result<WriteOutcome, AppError> {
        let dir = &self.settings.destination;
        let stem = self
            .titles
            .claim(
                &*self.vault,
                dir,
                &document.title_text(),
                &document.id,
                self.settings.title_policy,
            )
            .await;

        let mut ctx = ConversionContext::new(
            stem.as_str(),
            self.settings.clone(),
            self.cancel.clone(),
        );
        let note = self.convert_document(document, &mut ctx).await?;
        finalize(
            &*self.vault,
            PendingWrite::new(dir.join(format!("{}.md", stem)), note.text),
            note.children,
        )
        .await
    }

    /// Header, semantic-link lines and body of one page, plus the child
    /// notes discovered while walking it.
    async fn convert_document(
        &self,
        document: &Document,
        ctx: &mut ConversionContext,
    ) -> Result<RenderedBody, AppError> {
        let header = serialize_header(document, ctx, &self.relations, &self.attachments).await?;
        let mut note = RenderedBody {
            text: header.render(),
            children: Default::default(),
        };

        if self.settings.include_body {
            let blocks = self
                .repository
                .retrieve_children(&document.root_block())
                .await?;
            log::debug!("Rendering {} top-level blocks of {}", blocks.len(), document.id);
            let walker = BlockWalker::new(&*self.repository, &self.attachments, self);
            let body = walker.render_blocks(&blocks, ctx).await?;
            note.text.push_str(&body.text);
            note.children = body.children;
        }

        Ok(note)
    }
}

#[async_trait::async_trait]
impl ChildPageConverter for Migrator {
    async fn child_stem(&self, page: &ChildPageBlock) -> String {
        let id: PageId = page.common.id.cast();
        self.titles
            .claim(
                &*self.vault,
                &self.settings.subpages_dir(),
                &page.title,
                &id,
                self.settings.title_policy,
            )
            .await
    }

    async fn convert_child(
        &self,
        page: &ChildPageBlock,
        stem: &str,
        parent: &ConversionContext,
    ) -> Result<WriteOutcome, AppError> {
        let id: PageId = page.common.id.cast();
        let document = self.repository.retrieve_document(&id).await?;
        let mut ctx = parent.for_child(stem);
        let note = self.convert_document(&document, &mut ctx).await?;

        let path = self.settings.subpages_dir().join(format!("{}.md", stem));
        log::debug!("Child page {} converted, writing {}", id, path.display());
        finalize(&*self.vault, PendingWrite::new(path, note.text), note.children).await
    }
}
