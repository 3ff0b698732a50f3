// src/api/fetcher.rs
//! Document Fetcher: every row of a database, in service order.

use super::pagination::fetch_all_pages;
use super::NotionRepository;
use crate::error::AppError;
use crate::model::Document;
use crate::types::DatabaseId;

/// Lists every document in `collection`, following cursors until exhausted.
///
/// All pages are accumulated before returning. The first failure is
/// returned as-is and discards the pages collected before it.
pub async fn fetch_all_documents(
    repository: &dyn NotionRepository,
    collection: &DatabaseId,
) -> Result<Vec<Document>, AppError> {
    let result = fetch_all_pages(
        move |_page_size, cursor| repository.query_documents(collection, cursor),
        None,
    )
    .await?;

    log::info!(
        "Fetched {} documents from {} in {} page(s)",
        result.items.len(),
        collection,
        result.pages_fetched
    );
    Ok(result.items)
}
