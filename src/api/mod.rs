// src/api/mod.rs
//! Notion API interaction: listing documents, reading pages and block
//! children, and downloading attachments.
//!
//! The conversion engine depends only on the traits defined here, never on
//! HTTP details.

pub mod client;
mod fetcher;
pub mod notion_client_adapter;
mod pagination;
pub mod parser;
pub mod responses;

use crate::error::AppError;
use crate::model::{Block, Document};
use crate::types::{BlockId, DatabaseId, PageId};

pub use client::{HttpAssetSource, NotionHttpClient};
pub use fetcher::fetch_all_documents;
pub use pagination::fetch_all_pages;
pub use responses::{PaginatedResponse, PaginationResult};

/// The ability to read content from a Notion workspace.
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    /// One page of rows from a database query.
    async fn query_documents(
        &self,
        collection: &DatabaseId,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<Document>, AppError>;

    /// A page's properties, without its content.
    async fn retrieve_document(&self, id: &PageId) -> Result<Document, AppError>;

    /// All children of a block (or page), following pagination.
    async fn retrieve_children(&self, parent: &BlockId) -> Result<Vec<Block>, AppError>;

    /// The database's display title, if it has one.
    async fn retrieve_collection_title(
        &self,
        collection: &DatabaseId,
    ) -> Result<Option<String>, AppError>;
}

/// The ability to fetch the bytes behind an attachment URL.
#[async_trait::async_trait]
pub trait AssetSource: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>, AppError>;
}
