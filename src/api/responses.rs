// src/api/responses.rs
//! Response envelopes shared by the Notion client and test doubles.

use serde::{Deserialize, Serialize};

pub use notion_client::objects::error::Error as NotionError;

/// Generic paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub object: String,
    pub results: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    /// A page with more results behind `next_cursor`.
    pub fn partial(results: Vec<T>, next_cursor: impl Into<String>) -> Self {
        Self {
            object: "list".to_string(),
            results,
            next_cursor: Some(next_cursor.into()),
            has_more: true,
        }
    }

    /// The final page of a listing.
    pub fn last(results: Vec<T>) -> Self {
        Self {
            object: "list".to_string(),
            results,
            next_cursor: None,
            has_more: false,
        }
    }
}

/// Everything collected by a pagination loop.
#[derive(Debug, Clone)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub pages_fetched: u32,
}
