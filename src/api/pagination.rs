// src/api/pagination.rs
//! Cursor pagination without BoxFuture.

use super::responses::{PaginatedResponse, PaginationResult};
use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::AppError;

/// Fetches all pages using async closures directly.
///
/// The loop ends when the service reports `has_more == false` or stops
/// handing out a cursor. The first error aborts the loop and discards
/// whatever was collected so far.
pub async fn fetch_all_pages<T, F, Fut>(
    mut fetch_fn: F,
    max_pages: Option<u32>,
) -> Result<PaginationResult<T>, AppError>
where
    F: FnMut(u32, Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<PaginatedResponse<T>, AppError>>,
{
    let mut all_items = Vec::new();
    let mut cursor = None;
    let mut pages_fetched = 0u32;

    loop {
        if let Some(max) = max_pages {
            if pages_fetched >= max {
                log::debug!("Reached maximum page limit: {}", max);
                break;
            }
        }

        let response = fetch_fn(NOTION_API_PAGE_SIZE as u32, cursor).await?;

        let has_more = response.has_more;
        cursor = response.next_cursor;
        all_items.extend(response.results);
        pages_fetched += 1;

        if !has_more || cursor.is_none() {
            break;
        }
    }

    Ok(PaginationResult {
        items: all_items,
        pages_fetched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(items: Vec<u32>, next: Option<&str>) -> PaginatedResponse<u32> {
        match next {
            Some(cursor) => PaginatedResponse::partial(items, cursor),
            None => PaginatedResponse::last(items),
        }
    }

    #[tokio::test]
    async fn test_follows_cursor_until_exhausted() {
        let mut seen_cursors = Vec::new();
        let result = fetch_all_pages(
            |_, cursor| {
                seen_cursors.push(cursor.clone());
                let response = match cursor.as_deref() {
                    None => page(vec![1, 2], Some("c1")),
                    Some("c1") => page(vec![3], Some("c2")),
                    _ => page(vec![4], None),
                };
                async move { Ok(response) }
            },
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.items, vec![1, 2, 3, 4]);
        assert_eq!(result.pages_fetched, 3);
        assert_eq!(
            seen_cursors,
            vec![None, Some("c1".to_string()), Some("c2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_missing_cursor_stops_even_if_has_more() {
        let result = fetch_all_pages(
            |_, _| async {
                Ok(PaginatedResponse {
                    object: "list".to_string(),
                    results: vec![7u32],
                    next_cursor: None,
                    has_more: true,
                })
            },
            None,
        )
        .await
        .unwrap();
        assert_eq!(result.items, vec![7]);
    }

    #[tokio::test]
    async fn test_error_discards_collected_pages() {
        let result: Result<PaginationResult<u32>, _> = fetch_all_pages(
            |_, cursor| async move {
                match cursor {
                    None => Ok(page(vec![1], Some("c1"))),
                    Some(_) => Err(AppError::MalformedResponse("boom".to_string())),
                }
            },
            None,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_max_pages_limit() {
        let result = fetch_all_pages(
            |_, _| async { Ok(page(vec![1u32], Some("again"))) },
            Some(2),
        )
        .await
        .unwrap();
        assert_eq!(result.items.len(), 2);
    }
}
