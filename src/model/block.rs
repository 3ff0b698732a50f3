use super::blocks::*;
use super::common::BlockCommon;
use crate::types::BlockId;

/// Macro to reduce boilerplate in Block enum methods
macro_rules! match_all_blocks {
    ($self:expr, $pattern:pat => $result:expr) => {
        match $self {
            Block::Paragraph($pattern) => $result,
            Block::Heading($pattern) => $result,
            Block::BulletedListItem($pattern) => $result,
            Block::NumberedListItem($pattern) => $result,
            Block::ToDo($pattern) => $result,
            Block::Toggle($pattern) => $result,
            Block::Code($pattern) => $result,
            Block::Image($pattern) => $result,
            Block::Video($pattern) => $result,
            Block::Audio($pattern) => $result,
            Block::File($pattern) => $result,
            Block::Bookmark($pattern) => $result,
            Block::LinkPreview($pattern) => $result,
            Block::ChildPage($pattern) => $result,
            Block::Table($pattern) => $result,
            Block::TableRow($pattern) => $result,
            Block::Unsupported($pattern) => $result,
        }
    };
}

/// The block kinds the converter renders, plus a catch-all.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(ParagraphBlock),
    Heading(HeadingBlock),
    BulletedListItem(BulletedListItemBlock),
    NumberedListItem(NumberedListItemBlock),
    ToDo(ToDoBlock),
    Toggle(ToggleBlock),
    Code(CodeBlock),
    Image(MediaBlock),
    Video(MediaBlock),
    Audio(MediaBlock),
    File(MediaBlock),
    Bookmark(BookmarkBlock),
    LinkPreview(LinkPreviewBlock),
    ChildPage(ChildPageBlock),
    Table(TableBlock),
    TableRow(TableRowBlock),
    Unsupported(UnsupportedBlock),
}

impl Block {
    /// Get the block's ID
    pub fn id(&self) -> &BlockId {
        &self.common().id
    }

    /// Check if block has children
    pub fn has_children(&self) -> bool {
        self.common().has_children
    }

    /// Get common block data
    pub fn common(&self) -> &BlockCommon {
        match_all_blocks!(self, b => &b.common)
    }

    /// Get block type name as Notion spells it
    pub fn block_type(&self) -> &str {
        match self {
            Block::Paragraph(_) => "paragraph",
            Block::Heading(h) => match h.level {
                1 => "heading_1",
                2 => "heading_2",
                _ => "heading_3",
            },
            Block::BulletedListItem(_) => "bulleted_list_item",
            Block::NumberedListItem(_) => "numbered_list_item",
            Block::ToDo(_) => "to_do",
            Block::Toggle(_) => "toggle",
            Block::Code(_) => "code",
            Block::Image(_) => "image",
            Block::Video(_) => "video",
            Block::Audio(_) => "audio",
            Block::File(_) => "file",
            Block::Bookmark(_) => "bookmark",
            Block::LinkPreview(_) => "link_preview",
            Block::ChildPage(_) => "child_page",
            Block::Table(_) => "table",
            Block::TableRow(_) => "table_row",
            Block::Unsupported(b) => &b.block_type,
        }
    }

    pub fn is_numbered_list_item(&self) -> bool {
        matches!(self, Block::NumberedListItem(_))
    }
}
