// src/api/client.rs
//! HTTP clients: the authenticated Notion API client and the plain
//! downloader used for attachments.

use super::pagination::fetch_all_pages;
use super::parser;
use super::responses::PaginatedResponse;
use super::{AssetSource, NotionRepository};
use crate::constants::{NOTION_API_BASE_URL, NOTION_API_VERSION};
use crate::error::AppError;
use crate::model::{Block, Document};
use crate::types::{ApiKey, BlockId, DatabaseId, PageId};
use reqwest::{header, Client, Response};
use serde::Serialize;

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(api_key: &ApiKey) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .build()?;
        Ok(Self {
            client,
            base_url: NOTION_API_BASE_URL.to_string(),
        })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_API_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Makes a GET request to the specified endpoint (path relative to the API base).
    pub async fn get(&self, endpoint: &str) -> Result<Response, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("GET {}", url);
        Ok(self.client.get(url).send().await?)
    }

    /// Makes a POST request with JSON body to the specified endpoint.
    pub async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("POST {}", url);
        Ok(self.client.post(url).json(body).send().await?)
    }
}

#[async_trait::async_trait]
impl NotionRepository for NotionHttpClient {
    async fn query_documents(
        &self,
        collection: &DatabaseId,
        cursor: Option<String>,
    ) -> Result<PaginatedResponse<Document>, AppError> {
        let endpoint = format!("databases/{}/query", collection.to_dashed());
        let mut body = serde_json::json!({
            "page_size": crate::constants::NOTION_API_PAGE_SIZE
        });
        if let Some(cursor) = cursor {
            body["start_cursor"] = serde_json::json!(cursor);
        }
        let response = self.post(&endpoint, &body).await?;
        let result = extract_response_text(response).await?;
        parser::parse_documents_page(result)
    }

    async fn retrieve_document(&self, id: &PageId) -> Result<Document, AppError> {
        let endpoint = format!("pages/{}", id.to_dashed());
        let response = self.get(&endpoint).await?;
        let result = extract_response_text(response).await?;
        parser::parse_document_response(result)
    }

    async fn retrieve_children(&self, parent: &BlockId) -> Result<Vec<Block>, AppError> {
        let endpoint = format!("blocks/{}/children", parent.to_dashed());
        let client = self.clone();
        let pagination_result = fetch_all_pages(
            |page_size, cursor| {
                let client = client.clone();
                let mut endpoint = format!("{}?page_size={}", endpoint, page_size);
                if let Some(cursor) = cursor {
                    endpoint.push_str("&start_cursor=");
                    endpoint.push_str(&cursor);
                }
                async move {
                    let response = client.get(&endpoint).await?;
                    let result = extract_response_text(response).await?;
                    parser::parse_blocks_page(result)
                }
            },
            None,
        )
        .await?;
        Ok(pagination_result.items)
    }

    async fn retrieve_collection_title(
        &self,
        collection: &DatabaseId,
    ) -> Result<Option<String>, AppError> {
        let endpoint = format!("databases/{}", collection.to_dashed());
        let response = self.get(&endpoint).await?;
        let result = extract_response_text(response).await?;
        parser::parse_database_title(result)
    }
}

/// Downloads attachment bytes. Notion file URLs are pre-signed, so no
/// authentication header is sent.
#[derive(Clone, Default)]
pub struct HttpAssetSource {
    client: Client,
}

impl HttpAssetSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AssetSource for HttpAssetSource {
    async fn download(&self, url: &str) -> Result<Vec<u8>, AppError> {
        log::debug!("Downloading {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::DownloadFailed {
                url: url.to_string(),
                reason: format!("HTTP {}", status),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
