// src/testing.rs
//! In-memory doubles for the repository and asset seams.
//!
//! [`MemoryNotion`] serves a whole workspace from memory, including paged
//! listings and injected failures. [`EchoAssets`] serves each URL as its own
//! file content. Both are used by the unit tests and the integration tests.

use crate::api::{AssetSource, NotionRepository, PaginatedResponse};
use crate::error::{AppError, NotionErrorCode};
use crate::formatting::CancellationFlag;
use crate::model::{Block, Document};
use crate::types::{BlockId, DatabaseId, PageId};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A Notion workspace held in memory.
///
/// Database rows are served in listing pages whose cursor is the index of
/// the next page. Every row is also retrievable as a page.
#[derive(Default)]
pub struct MemoryNotion {
    listing: Vec<Vec<Document>>,
    pages: HashMap<String, Document>,
    children: HashMap<String, Vec<Block>>,
    failing_children: HashSet<String>,
    cancel_on_children: Mutex<Option<(String, CancellationFlag)>>,
    fail_listing: bool,
    queries: AtomicUsize,
    page_lookups: AtomicUsize,
}

impl MemoryNotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// One listing page per inner vector.
    pub fn with_listing(mut self, pages: Vec<Vec<Document>>) -> Self {
        for document in pages.iter().flatten() {
            self.pages
                .insert(document.id.as_str().to_string(), document.clone());
        }
        self.listing = pages;
        self
    }

    /// All rows in a single listing page.
    pub fn with_rows(self, rows: Vec<Document>) -> Self {
        self.with_listing(vec![rows])
    }

    /// Appends a row to the last listing page.
    pub fn with_row(mut self, document: Document) -> Self {
        self.pages
            .insert(document.id.as_str().to_string(), document.clone());
        match self.listing.last_mut() {
            Some(page) => page.push(document),
            None => self.listing.push(vec![document]),
        }
        self
    }

    /// Adds a page that is not a database row.
    pub fn with_page(mut self, document: Document) -> Self {
        self.pages.insert(document.id.as_str().to_string(), document);
        self
    }

    pub fn with_children(mut self, parent: &str, blocks: Vec<Block>) -> Self {
        self.children.insert(block_key(parent), blocks);
        self
    }

    /// Fetching the children of `parent` fails with a service error.
    pub fn failing_children(mut self, parent: &str) -> Self {
        self.failing_children.insert(block_key(parent));
        self
    }

    /// Every listing request fails as unauthorized.
    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Sets `flag` as soon as the children of `parent` are requested.
    pub fn cancel_when_reading(self, parent: &str, flag: CancellationFlag) -> Self {
        *self.cancel_on_children.lock() = Some((block_key(parent), flag));
        self
    }

    /// Number of listing requests served.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of single-page lookups served.
    pub fn page_lookups(&self) -> usize {
        self.page_lookups.load(Ordering::SeqCst)
    }
}

fn block_key(id: &str) -> String {
    BlockId::parse(id)
        .map(|id| id.as_str().to_string())
        .unwrap_or_else(|_| id.to_string())
}

#[async_trait::async_trait]
impl NotionRepository for MemoryNotion {
    async fn query_documents(
        &self,
        _collection: &DatabaseId,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<Document>, AppError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            return Err(AppError::NotionService {
                code: NotionErrorCode::Unauthorized,
                message: "API token is invalid.".to_string(),
                status: 401,
            });
        }

        let index = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
        let rows = self.listing.get(index).cloned().unwrap_or_default();
        if index + 1 < self.listing.len() {
            Ok(PaginatedResponse::partial(rows, (index + 1).to_string()))
        } else {
            Ok(PaginatedResponse::last(rows))
        }
    }

    async fn retrieve_document(&self, id: &PageId) -> Result<Document, AppError> {
        self.page_lookups.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| AppError::NotionService {
                code: NotionErrorCode::ObjectNotFound,
                message: format!("Could not find page with ID: {}", id),
                status: 404,
            })
    }

    async fn retrieve_children(&self, parent: &BlockId) -> Result<Vec<Block>, AppError> {
        if let Some((watched, flag)) = self.cancel_on_children.lock().as_ref() {
            if watched == parent.as_str() {
                flag.cancel();
            }
        }
        if self.failing_children.contains(parent.as_str()) {
            return Err(AppError::NotionService {
                code: NotionErrorCode::InternalError,
                message: "Unexpected error while reading block children.".to_string(),
                status: 500,
            });
        }
        Ok(self.children.get(parent.as_str()).cloned().unwrap_or_default())
    }

    async fn retrieve_collection_title(
        &self,
        _collection: &DatabaseId,
    ) -> Result<Option<String>, AppError> {
        Ok(Some("Reading List".to_string()))
    }
}

/// Serves the URL itself as the file content; URLs containing `broken` fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoAssets;

#[async_trait::async_trait]
impl AssetSource for EchoAssets {
    async fn download(&self, url: &str) -> Result<Vec<u8>, AppError> {
        if url.contains("broken") {
            return Err(AppError::DownloadFailed {
                url: url.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            });
        }
        Ok(url.as_bytes().to_vec())
    }
}
