// src/api/parser.rs
//! Turns Notion API bodies into domain values.
//!
//! Bodies are first read as ordered JSON so property order survives, then
//! each property and block is handed to notion-client's serde types one at
//! a time. A payload notion-client rejects becomes an `Unsupported` value
//! instead of failing the whole page.

use super::client::ApiResponse;
use super::notion_client_adapter::{convert_block, convert_page_property};
use super::responses::{NotionError, PaginatedResponse};
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionClientError, NotionErrorCode};
use crate::model::blocks::{FileObject, MediaBlock, UnsupportedBlock};
use crate::model::{Block, BlockCommon, Document, PropertyValue};
use crate::types::{BlockId, PageId, PropertyName};
use serde_json::Value;

/// Parse any Notion API response, mapping error bodies to typed errors.
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    if result.status.is_success() {
        parse_success_body(&result.data, &result.url)
    } else {
        Err(parse_error_body(
            &result.data,
            result.status.as_u16(),
            &result.url,
        ))
    }
}

fn parse_success_body<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        NotionClientError::Deserialization {
            source: e,
            body: preview(body),
        }
        .into()
    })
}

/// Maps an error body to `AppError::NotionService`, falling back to the HTTP status.
fn parse_error_body(body: &str, status: u16, url: &str) -> AppError {
    match serde_json::from_str::<NotionError>(body) {
        Ok(notion_error) => AppError::NotionService {
            code: NotionErrorCode::from_api_response(&notion_error.code),
            message: notion_error.message,
            status,
        },
        Err(_) => AppError::NotionService {
            code: NotionErrorCode::from_http_status(status),
            message: format!("HTTP {} from {}: {}", status, url, preview(body)),
            status,
        },
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let cut: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}

// --- Documents ---

/// Parse a page object into a `Document`, keeping property order.
pub fn parse_document(value: &Value) -> Result<Document, AppError> {
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::MalformedResponse("Page object without 'id'".to_string()))?;
    let mut document = Document::new(PageId::parse(id)?);

    if let Some(Value::Object(properties)) = value.get("properties") {
        for (name, raw) in properties {
            document
                .properties
                .insert(PropertyName::new(name.as_str()), parse_property(name, raw));
        }
    }

    Ok(document)
}

/// Parse one property payload; never fails.
pub fn parse_property(name: &str, raw: &Value) -> PropertyValue {
    let kind = raw
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    match serde_json::from_value(raw.clone()) {
        Ok(property) => convert_page_property(property),
        Err(e) => {
            log::warn!("Property '{}' of type '{}' could not be parsed: {}", name, kind, e);
            PropertyValue::Unsupported { kind }
        }
    }
}

/// Parse one page of a database query.
pub fn parse_documents_page(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<Document>, AppError> {
    let response: PaginatedResponse<Value> = parse_api_response(result)?;
    let documents = response
        .results
        .iter()
        .map(parse_document)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PaginatedResponse {
        object: response.object,
        results: documents,
        next_cursor: response.next_cursor,
        has_more: response.has_more,
    })
}

/// Parse a single page response.
pub fn parse_document_response(result: ApiResponse<String>) -> Result<Document, AppError> {
    let value: Value = parse_api_response(result)?;
    parse_document(&value)
}

/// Extract the plain-text title of a database object.
pub fn parse_database_title(result: ApiResponse<String>) -> Result<Option<String>, AppError> {
    let value: Value = parse_api_response(result)?;
    let title: String = value
        .get("title")
        .and_then(Value::as_array)
        .map(|runs| {
            runs.iter()
                .filter_map(|run| run.get("plain_text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    Ok(if title.is_empty() { None } else { Some(title) })
}

// --- Blocks ---

/// Parse one block object.
pub fn parse_block(raw: &Value) -> Result<Block, AppError> {
    let id = raw
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::MalformedResponse("Block object without 'id'".to_string()))?;
    let block_type = raw
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let common = BlockCommon {
        id: BlockId::parse(id)?,
        has_children: raw
            .get("has_children")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    };

    if block_type == "audio" {
        return Ok(parse_audio_block(common, raw));
    }

    let language = raw
        .pointer("/code/language")
        .and_then(Value::as_str)
        .map(str::to_string);

    match serde_json::from_value::<notion_client::objects::block::Block>(raw.clone()) {
        Ok(block) => Ok(convert_block(common, block.block_type, &block_type, language)),
        Err(e) => {
            log::warn!("Block {} of type '{}' could not be parsed: {}", id, block_type, e);
            Ok(Block::Unsupported(UnsupportedBlock { common, block_type }))
        }
    }
}

/// Audio blocks are read straight from JSON; the payload mirrors other media.
fn parse_audio_block(common: BlockCommon, raw: &Value) -> Block {
    let hosted = raw.pointer("/audio/file/url").and_then(Value::as_str);
    let external = raw.pointer("/audio/external/url").and_then(Value::as_str);

    let source = match (hosted, external) {
        (Some(url), _) => FileObject::Hosted {
            url: url.to_string(),
            expiry_time: None,
        },
        (None, Some(url)) => FileObject::External {
            url: url.to_string(),
        },
        (None, None) => {
            log::warn!("Audio block {} has no source URL", common.id);
            return Block::Unsupported(UnsupportedBlock {
                common,
                block_type: "audio".to_string(),
            });
        }
    };

    Block::Audio(MediaBlock { common, source })
}

/// Parse one page of block children.
pub fn parse_blocks_page(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<Block>, AppError> {
    let response: PaginatedResponse<Value> = parse_api_response(result)?;
    let blocks = response
        .results
        .iter()
        .map(parse_block)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PaginatedResponse {
        object: response.object,
        results: blocks,
        next_cursor: response.next_cursor,
        has_more: response.has_more,
    })
}
