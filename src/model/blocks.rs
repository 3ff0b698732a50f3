use super::common::BlockCommon;
use crate::types::RichTextRun;
use chrono::{DateTime, Utc};

/// Paragraph block
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphBlock {
    pub common: BlockCommon,
    pub rich_text: Vec<RichTextRun>,
}

/// Heading block; `level` is 1, 2 or 3.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingBlock {
    pub common: BlockCommon,
    pub level: u8,
    pub rich_text: Vec<RichTextRun>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulletedListItemBlock {
    pub common: BlockCommon,
    pub rich_text: Vec<RichTextRun>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberedListItemBlock {
    pub common: BlockCommon,
    pub rich_text: Vec<RichTextRun>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToDoBlock {
    pub common: BlockCommon,
    pub rich_text: Vec<RichTextRun>,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToggleBlock {
    pub common: BlockCommon,
    pub rich_text: Vec<RichTextRun>,
}

/// Code block
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    pub common: BlockCommon,
    pub rich_text: Vec<RichTextRun>,
    /// Notion language identifier, e.g. `rust` or `plain text`.
    pub language: String,
}

/// Where a media block's bytes live.
#[derive(Debug, Clone, PartialEq)]
pub enum FileObject {
    /// Uploaded to Notion; the URL is signed and expires.
    Hosted {
        url: String,
        expiry_time: Option<DateTime<Utc>>,
    },
    External {
        url: String,
    },
}

impl FileObject {
    pub fn url(&self) -> &str {
        match self {
            FileObject::Hosted { url, .. } | FileObject::External { url } => url,
        }
    }

    pub fn is_hosted(&self) -> bool {
        matches!(self, FileObject::Hosted { .. })
    }
}

/// Image, video, audio and file blocks share one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaBlock {
    pub common: BlockCommon,
    pub source: FileObject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkBlock {
    pub common: BlockCommon,
    pub url: String,
    pub caption: Vec<RichTextRun>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkPreviewBlock {
    pub common: BlockCommon,
    pub url: String,
}

/// A nested page. Its id doubles as the child page id.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildPageBlock {
    pub common: BlockCommon,
    pub title: String,
}

/// Table block; rows arrive as `table_row` children.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub common: BlockCommon,
    pub table_width: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRowBlock {
    pub common: BlockCommon,
    pub cells: Vec<Vec<RichTextRun>>,
}

/// Any block kind the converter has no rule for.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedBlock {
    pub common: BlockCommon,
    pub block_type: String,
}
