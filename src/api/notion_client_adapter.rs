// src/api/notion_client_adapter.rs
//! Conversions from `notion-client` wire types into the converter's model.
//!
//! Everything here is infallible on purpose: a value the model cannot
//! represent degrades to an `Unsupported` variant and is logged by the
//! caller, so one odd property never sinks a whole page.

use crate::model::blocks::*;
use crate::model::common::BlockCommon;
use crate::model::{Block, DateValue, FileReference, FormulaValue, PropertyValue, RollupValue};
use crate::types::{Annotations, Mention, PageId, RichTextRun};
use chrono::{DateTime, NaiveTime, Utc};
use notion_client::objects::block::BlockType;
use notion_client::objects::page::{
    DateOrDateTime, DatePropertyValue, FormulaPropertyValue, PageProperty, RollupPropertyValue,
};

/// Convert a parsed notion-client block body into our domain Block.
///
/// `common` and `raw_type` come from the raw JSON; `language` is the raw
/// code language string, which notion-client only exposes as an enum.
pub fn convert_block(
    common: BlockCommon,
    block_type: BlockType,
    raw_type: &str,
    language: Option<String>,
) -> Block {
    match block_type {
        BlockType::Paragraph { paragraph } => Block::Paragraph(ParagraphBlock {
            common,
            rich_text: convert_rich_text_array(paragraph.rich_text),
        }),

        BlockType::Heading1 { heading_1 } => Block::Heading(HeadingBlock {
            common,
            level: 1,
            rich_text: convert_rich_text_array(heading_1.rich_text),
        }),

        BlockType::Heading2 { heading_2 } => Block::Heading(HeadingBlock {
            common,
            level: 2,
            rich_text: convert_rich_text_array(heading_2.rich_text),
        }),

        BlockType::Heading3 { heading_3 } => Block::Heading(HeadingBlock {
            common,
            level: 3,
            rich_text: convert_rich_text_array(heading_3.rich_text),
        }),

        BlockType::BulletedListItem { bulleted_list_item } => {
            Block::BulletedListItem(BulletedListItemBlock {
                common,
                rich_text: convert_rich_text_array(bulleted_list_item.rich_text),
            })
        }

        BlockType::NumberedListItem { numbered_list_item } => {
            Block::NumberedListItem(NumberedListItemBlock {
                common,
                rich_text: convert_rich_text_array(numbered_list_item.rich_text),
            })
        }

        BlockType::ToDo { to_do } => Block::ToDo(ToDoBlock {
            common,
            rich_text: convert_rich_text_array(to_do.rich_text),
            checked: to_do.checked.unwrap_or(false),
        }),

        BlockType::Toggle { toggle } => Block::Toggle(ToggleBlock {
            common,
            rich_text: convert_rich_text_array(toggle.rich_text),
        }),

        BlockType::Code { code } => Block::Code(CodeBlock {
            common,
            rich_text: convert_rich_text_array(code.rich_text),
            language: language.unwrap_or_default(),
        }),

        BlockType::Bookmark { bookmark } => Block::Bookmark(BookmarkBlock {
            common,
            url: bookmark.url,
            caption: convert_rich_text_array(bookmark.caption),
        }),

        BlockType::LinkPreview { link_preview } => Block::LinkPreview(LinkPreviewBlock {
            common,
            url: link_preview.url,
        }),

        BlockType::ChildPage { child_page } => Block::ChildPage(ChildPageBlock {
            common,
            title: child_page.title,
        }),

        BlockType::Image { image } => Block::Image(MediaBlock {
            common,
            source: convert_file_object(image.file_type),
        }),

        BlockType::Video { video } => Block::Video(MediaBlock {
            common,
            source: convert_file_object(video.file_type),
        }),

        BlockType::File { file } => Block::File(MediaBlock {
            common,
            source: convert_file_object(file.file_type),
        }),

        BlockType::Table { table } => Block::Table(TableBlock {
            common,
            table_width: table.table_width as usize,
        }),

        BlockType::TableRow { table_row } => Block::TableRow(TableRowBlock {
            common,
            cells: table_row
                .cells
                .into_iter()
                .map(convert_rich_text_array)
                .collect(),
        }),

        _ => Block::Unsupported(UnsupportedBlock {
            common,
            block_type: raw_type.to_string(),
        }),
    }
}

/// Convert file object from notion-client to our domain type
fn convert_file_object(file: notion_client::objects::file::File) -> FileObject {
    use notion_client::objects::file::File as NcFile;

    match file {
        NcFile::External { external } => FileObject::External { url: external.url },
        NcFile::File { file } => FileObject::Hosted {
            url: file.url,
            expiry_time: Some(file.expiry_time),
        },
    }
}

/// Convert array of rich text items
pub fn convert_rich_text_array(
    rich_texts: Vec<notion_client::objects::rich_text::RichText>,
) -> Vec<RichTextRun> {
    rich_texts.into_iter().map(convert_rich_text).collect()
}

/// Convert single rich text item
fn convert_rich_text(rich_text: notion_client::objects::rich_text::RichText) -> RichTextRun {
    use notion_client::objects::rich_text::RichText as NcRichText;

    match rich_text {
        NcRichText::Text {
            text,
            annotations,
            plain_text,
            href,
        } => RichTextRun {
            href: href.or_else(|| text.link.map(|link| link.url)),
            plain_text: plain_text.unwrap_or(text.content),
            annotations: annotations.map(convert_annotations).unwrap_or_default(),
            mention: None,
        },

        NcRichText::Mention {
            mention,
            annotations,
            plain_text,
            href,
        } => RichTextRun {
            plain_text,
            annotations: convert_annotations(annotations),
            href,
            mention: Some(convert_mention(mention)),
        },

        NcRichText::Equation {
            annotations,
            plain_text,
            href,
            ..
        } => RichTextRun {
            plain_text,
            annotations: convert_annotations(annotations),
            href,
            mention: None,
        },

        _ => {
            log::debug!("Unsupported rich text type, dropping run");
            RichTextRun::default()
        }
    }
}

/// Convert annotations; only bold and italic survive.
fn convert_annotations(
    annotations: notion_client::objects::rich_text::Annotations,
) -> Annotations {
    Annotations {
        bold: annotations.bold,
        italic: annotations.italic,
    }
}

fn convert_mention(mention: notion_client::objects::rich_text::Mention) -> Mention {
    use notion_client::objects::rich_text::Mention as NcMention;

    match mention {
        NcMention::Date { date } => Mention::Date {
            start: date.start.naive_utc().date(),
        },
        NcMention::Page { page } => Mention::Page { id: page.id },
        NcMention::User { user } => Mention::User { name: user.name },
        _ => Mention::Other,
    }
}

// --- Properties ---

/// Convert individual page property, degrading to `Unsupported`.
pub fn convert_page_property(property: PageProperty) -> PropertyValue {
    match property {
        PageProperty::Title { title, .. } => PropertyValue::Title {
            title: convert_rich_text_array(title),
        },
        PageProperty::RichText { rich_text, .. } => PropertyValue::RichText {
            rich_text: convert_rich_text_array(rich_text),
        },
        PageProperty::Number { number, .. } => PropertyValue::Number { number },
        PageProperty::Checkbox { checkbox, .. } => PropertyValue::Checkbox { checkbox },
        PageProperty::Url { url, .. } => PropertyValue::Url { url },
        PageProperty::Select { select, .. } => PropertyValue::Select {
            select: select.and_then(|s| s.name),
        },
        PageProperty::MultiSelect { multi_select, .. } => PropertyValue::MultiSelect {
            multi_select: multi_select.into_iter().filter_map(|s| s.name).collect(),
        },
        PageProperty::Status { status, .. } => PropertyValue::Status {
            status: status.and_then(|s| s.name),
        },
        PageProperty::Date { date, .. } => PropertyValue::Date {
            date: date.and_then(convert_notion_date),
        },
        PageProperty::CreatedTime { created_time, .. } => {
            PropertyValue::CreatedTime { created_time }
        }
        PageProperty::Relation { relation, .. } => PropertyValue::Relation {
            relation: relation
                .into_iter()
                .filter_map(|r| {
                    PageId::parse(&r.id)
                        .map_err(|e| {
                            log::warn!("Skipping relation with invalid ID '{}': {}", r.id, e)
                        })
                        .ok()
                })
                .collect(),
        },
        PageProperty::Files { files, .. } => PropertyValue::Files {
            files: files.into_iter().map(convert_file_ref).collect(),
        },
        PageProperty::Formula { formula, .. } => PropertyValue::Formula {
            formula: formula.map(convert_formula_value),
        },
        PageProperty::Rollup { rollup, .. } => PropertyValue::Rollup {
            rollup: convert_rollup_value(rollup),
        },
        other => PropertyValue::Unsupported {
            kind: unsupported_kind(&other).to_string(),
        },
    }
}

fn unsupported_kind(property: &PageProperty) -> &'static str {
    match property {
        PageProperty::People { .. } => "people",
        PageProperty::Email { .. } => "email",
        PageProperty::PhoneNumber { .. } => "phone_number",
        PageProperty::CreatedBy { .. } => "created_by",
        PageProperty::LastEditedTime { .. } => "last_edited_time",
        PageProperty::LastEditedBy { .. } => "last_edited_by",
        PageProperty::UniqueID { .. } => "unique_id",
        PageProperty::Verification { .. } => "verification",
        PageProperty::Button { .. } => "button",
        _ => "unknown",
    }
}

/// Date-only values become midnight UTC.
fn resolve_datetime(dod: DateOrDateTime) -> DateTime<Utc> {
    match dod {
        DateOrDateTime::Date(d) => d.and_time(NaiveTime::MIN).and_utc(),
        DateOrDateTime::DateTime(dt) => dt.naive_utc().and_utc(),
    }
}

fn convert_notion_date(d: DatePropertyValue) -> Option<DateValue> {
    Some(DateValue {
        start: resolve_datetime(d.start?),
        end: d.end.map(resolve_datetime),
    })
}

fn convert_file_ref(f: notion_client::objects::page::FilePropertyValue) -> FileReference {
    use notion_client::objects::file::File as NcFile;

    let url = match f.file {
        NcFile::External { external } => external.url,
        NcFile::File { file } => file.url,
    };
    FileReference { name: f.name, url }
}

fn convert_formula_value(formula: FormulaPropertyValue) -> FormulaValue {
    match formula {
        FormulaPropertyValue::String { string } => FormulaValue::String(string),
        FormulaPropertyValue::Number { number } => FormulaValue::Number(number),
        FormulaPropertyValue::Boolean { boolean } => FormulaValue::Boolean(boolean),
        FormulaPropertyValue::Date { date } => {
            FormulaValue::Date(date.and_then(convert_notion_date))
        }
    }
}

fn convert_rollup_value(rollup: Option<RollupPropertyValue>) -> RollupValue {
    match rollup {
        Some(RollupPropertyValue::Array { array, .. }) => {
            RollupValue::Array(array.into_iter().map(convert_page_property).collect())
        }
        Some(RollupPropertyValue::Number { number, .. }) => RollupValue::Number(number),
        Some(RollupPropertyValue::Date { date, .. }) => {
            RollupValue::Date(date.map(|d| d.naive_utc().and_utc()))
        }
        _ => RollupValue::Other,
    }
}
