// tests/api_parsing.rs
//! Full Notion payloads read through `notion-client` into the model.

use chrono::{NaiveDate, TimeZone, Utc};
use notion2vault::api::parser::{parse_block, parse_document};
use notion2vault::{
    Block, BlockCommon, BlockId, BookmarkBlock, ChildPageBlock, CodeBlock, DateValue, Document,
    FileObject, FileReference, FormulaValue, HeadingBlock, LinkPreviewBlock, MediaBlock, PageId,
    ParagraphBlock, PropertyName, PropertyValue, RichTextRun, RollupValue, TableBlock,
    TableRowBlock, ToDoBlock, ToggleBlock,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const PAGE_ID: &str = "414cd412-8533-8087-a989-cf37889137c5";
const BLOCK_ID: &str = "216cd412-8533-8087-a989-cf37889137c3";

fn annotations() -> Value {
    json!({
        "bold": false,
        "italic": false,
        "strikethrough": false,
        "underline": false,
        "code": false,
        "color": "default"
    })
}

fn text_run(content: &str) -> Value {
    json!({
        "type": "text",
        "text": {"content": content, "link": null},
        "annotations": annotations(),
        "plain_text": content,
        "href": null
    })
}

fn page(properties: Value) -> Value {
    json!({
        "object": "page",
        "id": PAGE_ID,
        "created_time": "2024-01-10T08:00:00.000Z",
        "last_edited_time": "2024-01-12T08:00:00.000Z",
        "created_by": {"object": "user", "id": "user-id"},
        "last_edited_by": {"object": "user", "id": "user-id"},
        "cover": null,
        "icon": null,
        "parent": {"type": "database_id", "database_id": "0123456789abcdef0123456789abcdef"},
        "archived": false,
        "in_trash": false,
        "properties": properties,
        "url": "https://www.notion.so/Reading-414cd41285338087a989cf37889137c5",
        "public_url": null
    })
}

fn block(kind: &str, body: Value, has_children: bool) -> Value {
    let mut value = json!({
        "object": "block",
        "id": BLOCK_ID,
        "parent": {"type": "page_id", "page_id": PAGE_ID},
        "created_time": "2025-06-20T00:00:00.000Z",
        "last_edited_time": "2025-06-20T00:00:00.000Z",
        "created_by": {"object": "user", "id": "user-id"},
        "last_edited_by": {"object": "user", "id": "user-id"},
        "has_children": has_children,
        "archived": false,
        "in_trash": false,
        "type": kind
    });
    value[kind] = body;
    value
}

fn parsed_document(properties: Value) -> Document {
    parse_document(&page(properties)).expect("page should parse")
}

fn property<'a>(document: &'a Document, name: &str) -> &'a PropertyValue {
    document
        .properties
        .get(&PropertyName::new(name))
        .unwrap_or_else(|| panic!("missing property {}", name))
}

fn common() -> BlockCommon {
    BlockCommon::new(BlockId::parse(BLOCK_ID).unwrap())
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

// --- Properties ---

#[test]
fn test_choice_properties() {
    let document = parsed_document(json!({
        "Stage": {
            "id": "a%3Ab",
            "type": "select",
            "select": {"id": "1", "name": "Reading: now", "color": "green"}
        },
        "Empty Stage": {"id": "a%3Ac", "type": "select", "select": null},
        "Status": {
            "id": "st",
            "type": "status",
            "status": {"id": "2", "name": "Done", "color": "green"}
        },
        "Tags": {
            "id": "tg",
            "type": "multi_select",
            "multi_select": [
                {"id": "3", "name": "rust", "color": "red"},
                {"id": "4", "name": "async", "color": "blue"}
            ]
        }
    }));

    assert_eq!(
        property(&document, "Stage"),
        &PropertyValue::Select {
            select: Some("Reading: now".to_string())
        }
    );
    assert_eq!(
        property(&document, "Empty Stage"),
        &PropertyValue::Select { select: None }
    );
    assert_eq!(
        property(&document, "Status"),
        &PropertyValue::Status {
            status: Some("Done".to_string())
        }
    );
    assert_eq!(
        property(&document, "Tags"),
        &PropertyValue::MultiSelect {
            multi_select: vec!["rust".to_string(), "async".to_string()]
        }
    );
}

#[test]
fn test_date_properties_normalize_to_utc() {
    let document = parsed_document(json!({
        "Due": {
            "id": "du",
            "type": "date",
            "date": {"start": "2024-01-15", "end": null, "time_zone": null}
        },
        "Meeting": {
            "id": "me",
            "type": "date",
            "date": {
                "start": "2024-01-15T09:30:00.000+02:00",
                "end": "2024-01-15T10:00:00.000+02:00",
                "time_zone": null
            }
        },
        "Unset": {"id": "un", "type": "date", "date": null},
        "Created": {
            "id": "cr",
            "type": "created_time",
            "created_time": "2023-12-01T08:00:00.000Z"
        }
    }));

    assert_eq!(
        property(&document, "Due"),
        &PropertyValue::Date {
            date: Some(DateValue {
                start: utc(2024, 1, 15, 0, 0),
                end: None
            })
        }
    );
    assert_eq!(
        property(&document, "Meeting"),
        &PropertyValue::Date {
            date: Some(DateValue {
                start: utc(2024, 1, 15, 7, 30),
                end: Some(utc(2024, 1, 15, 8, 0))
            })
        }
    );
    assert_eq!(
        property(&document, "Unset"),
        &PropertyValue::Date { date: None }
    );
    assert_eq!(
        property(&document, "Created"),
        &PropertyValue::CreatedTime {
            created_time: utc(2023, 12, 1, 8, 0)
        }
    );
}

#[test]
fn test_scalar_properties() {
    let document = parsed_document(json!({
        "Pages": {"id": "pg", "type": "number", "number": 0},
        "Rating": {"id": "rt", "type": "number", "number": 4.5},
        "No Rating": {"id": "nr", "type": "number", "number": null},
        "Read": {"id": "rd", "type": "checkbox", "checkbox": true},
        "Link": {"id": "ln", "type": "url", "url": "https://example.com/a?b=c"},
        "Summary": {
            "id": "sm",
            "type": "rich_text",
            "rich_text": [
                text_run("See "),
                {
                    "type": "text",
                    "text": {"content": "docs", "link": {"url": "https://docs.rs"}},
                    "annotations": annotations(),
                    "plain_text": "docs",
                    "href": "https://docs.rs"
                }
            ]
        }
    }));

    assert_eq!(
        property(&document, "Pages"),
        &PropertyValue::Number {
            number: Some(serde_json::Number::from(0u64))
        }
    );
    assert_eq!(
        property(&document, "Rating"),
        &PropertyValue::Number {
            number: serde_json::Number::from_f64(4.5)
        }
    );
    assert_eq!(
        property(&document, "No Rating"),
        &PropertyValue::Number { number: None }
    );
    assert_eq!(
        property(&document, "Read"),
        &PropertyValue::Checkbox { checkbox: true }
    );
    assert_eq!(
        property(&document, "Link"),
        &PropertyValue::Url {
            url: Some("https://example.com/a?b=c".to_string())
        }
    );
    assert_eq!(
        property(&document, "Summary"),
        &PropertyValue::RichText {
            rich_text: vec![
                RichTextRun::plain("See "),
                RichTextRun::plain("docs").with_href("https://docs.rs"),
            ]
        }
    );
}

#[test]
fn test_relation_and_files() {
    let document = parsed_document(json!({
        "Author": {
            "id": "au",
            "type": "relation",
            "relation": [
                {"id": "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee"},
                {"id": "not-a-page-id"}
            ],
            "has_more": false
        },
        "Attachments": {
            "id": "at",
            "type": "files",
            "files": [
                {
                    "name": "cover.png",
                    "type": "file",
                    "file": {
                        "url": "https://prod-files.s3.amazonaws.com/cover.png?X-Amz-Signature=1",
                        "expiry_time": "2024-01-10T09:00:00.000Z"
                    }
                },
                {
                    "name": "logo",
                    "type": "external",
                    "external": {"url": "https://cdn.example.com/logo.svg"}
                }
            ]
        }
    }));

    assert_eq!(
        property(&document, "Author"),
        &PropertyValue::Relation {
            relation: vec![PageId::parse("aaaaaaaabbbbccccddddeeeeeeeeeeee").unwrap()]
        }
    );
    assert_eq!(
        property(&document, "Attachments"),
        &PropertyValue::Files {
            files: vec![
                FileReference {
                    name: "cover.png".to_string(),
                    url: "https://prod-files.s3.amazonaws.com/cover.png?X-Amz-Signature=1"
                        .to_string(),
                },
                FileReference {
                    name: "logo".to_string(),
                    url: "https://cdn.example.com/logo.svg".to_string(),
                },
            ]
        }
    );
}

#[test]
fn test_formula_kinds() {
    let document = parsed_document(json!({
        "Label": {
            "id": "f1",
            "type": "formula",
            "formula": {"type": "string", "string": "Chapter 3"}
        },
        "Progress": {
            "id": "f2",
            "type": "formula",
            "formula": {"type": "number", "number": 75}
        },
        "Finished": {
            "id": "f3",
            "type": "formula",
            "formula": {"type": "boolean", "boolean": false}
        },
        "Next Review": {
            "id": "f4",
            "type": "formula",
            "formula": {"type": "date", "date": {"start": "2024-02-01", "end": null, "time_zone": null}}
        }
    }));

    assert_eq!(
        property(&document, "Label"),
        &PropertyValue::Formula {
            formula: Some(FormulaValue::String(Some("Chapter 3".to_string())))
        }
    );
    assert_eq!(
        property(&document, "Progress"),
        &PropertyValue::Formula {
            formula: Some(FormulaValue::Number(Some(serde_json::Number::from(75u64))))
        }
    );
    assert_eq!(
        property(&document, "Finished"),
        &PropertyValue::Formula {
            formula: Some(FormulaValue::Boolean(false))
        }
    );
    assert_eq!(
        property(&document, "Next Review"),
        &PropertyValue::Formula {
            formula: Some(FormulaValue::Date(Some(DateValue {
                start: utc(2024, 2, 1, 0, 0),
                end: None
            })))
        }
    );
}

#[test]
fn test_rollup_kinds() {
    let document = parsed_document(json!({
        "Chapter Labels": {
            "id": "r1",
            "type": "rollup",
            "rollup": {
                "type": "array",
                "function": "show_original",
                "array": [
                    {"type": "formula", "formula": {"type": "string", "string": "Intro"}},
                    {"type": "formula", "formula": {"type": "string", "string": "Outro"}}
                ]
            }
        },
        "Total Pages": {
            "id": "r2",
            "type": "rollup",
            "rollup": {"type": "number", "function": "sum", "number": 320}
        }
    }));

    assert_eq!(
        property(&document, "Chapter Labels"),
        &PropertyValue::Rollup {
            rollup: RollupValue::Array(vec![
                PropertyValue::Formula {
                    formula: Some(FormulaValue::String(Some("Intro".to_string())))
                },
                PropertyValue::Formula {
                    formula: Some(FormulaValue::String(Some("Outro".to_string())))
                },
            ])
        }
    );
    assert_eq!(
        property(&document, "Total Pages"),
        &PropertyValue::Rollup {
            rollup: RollupValue::Number(Some(serde_json::Number::from(320u64)))
        }
    );
}

#[test]
fn test_property_order_follows_the_payload() {
    let document = parsed_document(json!({
        "Zeta": {"id": "z", "type": "checkbox", "checkbox": false},
        "Name": {"id": "title", "type": "title", "title": [text_run("Dune")]},
        "Alpha": {"id": "a", "type": "url", "url": null}
    }));

    let names: Vec<&str> = document.properties.keys().map(|k| k.as_str()).collect();
    assert_eq!(names, vec!["Zeta", "Name", "Alpha"]);
    assert_eq!(document.title_text(), "Dune");
}

// --- Blocks ---

#[test]
fn test_text_blocks() {
    let paragraph = parse_block(&block(
        "paragraph",
        json!({"rich_text": [text_run("Hello")], "color": "default"}),
        false,
    ))
    .unwrap();
    assert_eq!(
        paragraph,
        Block::Paragraph(ParagraphBlock {
            common: common(),
            rich_text: vec![RichTextRun::plain("Hello")],
        })
    );

    let heading = parse_block(&block(
        "heading_2",
        json!({"rich_text": [text_run("Part II")], "is_toggleable": false, "color": "default"}),
        false,
    ))
    .unwrap();
    assert_eq!(
        heading,
        Block::Heading(HeadingBlock {
            common: common(),
            level: 2,
            rich_text: vec![RichTextRun::plain("Part II")],
        })
    );

    let todo = parse_block(&block(
        "to_do",
        json!({"rich_text": [text_run("Return book")], "checked": true, "color": "default"}),
        false,
    ))
    .unwrap();
    assert_eq!(
        todo,
        Block::ToDo(ToDoBlock {
            common: common(),
            rich_text: vec![RichTextRun::plain("Return book")],
            checked: true,
        })
    );

    let toggle = parse_block(&block(
        "toggle",
        json!({"rich_text": [text_run("Spoilers")], "color": "default"}),
        true,
    ))
    .unwrap();
    assert_eq!(
        toggle,
        Block::Toggle(ToggleBlock {
            common: common().with_children(),
            rich_text: vec![RichTextRun::plain("Spoilers")],
        })
    );
}

#[test]
fn test_date_mention_in_rich_text() {
    let paragraph = parse_block(&block(
        "paragraph",
        json!({
            "rich_text": [
                text_run("Due "),
                {
                    "type": "mention",
                    "mention": {
                        "type": "date",
                        "date": {"start": "2024-03-08T00:00:00.000+00:00", "end": null}
                    },
                    "annotations": annotations(),
                    "plain_text": "2024-03-08",
                    "href": null
                }
            ],
            "color": "default"
        }),
        false,
    ))
    .unwrap();

    assert_eq!(
        paragraph,
        Block::Paragraph(ParagraphBlock {
            common: common(),
            rich_text: vec![
                RichTextRun::plain("Due "),
                RichTextRun::date_mention(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()),
            ],
        })
    );
}

#[test]
fn test_code_block_keeps_raw_language() {
    let code = parse_block(&block(
        "code",
        json!({
            "caption": [],
            "rich_text": [text_run("fn main() {}")],
            "language": "rust"
        }),
        false,
    ))
    .unwrap();

    assert_eq!(
        code,
        Block::Code(CodeBlock {
            common: common(),
            rich_text: vec![RichTextRun::plain("fn main() {}")],
            language: "rust".to_string(),
        })
    );
}

#[test]
fn test_table_blocks() {
    let table = parse_block(&block(
        "table",
        json!({"table_width": 3, "has_column_header": true, "has_row_header": false}),
        true,
    ))
    .unwrap();
    assert_eq!(
        table,
        Block::Table(TableBlock {
            common: common().with_children(),
            table_width: 3,
        })
    );

    let row = parse_block(&block(
        "table_row",
        json!({"cells": [[text_run("Title")], [], [text_run("Year")]]}),
        false,
    ))
    .unwrap();
    assert_eq!(
        row,
        Block::TableRow(TableRowBlock {
            common: common(),
            cells: vec![
                vec![RichTextRun::plain("Title")],
                vec![],
                vec![RichTextRun::plain("Year")],
            ],
        })
    );
}

#[test]
fn test_child_page_block() {
    let child = parse_block(&block("child_page", json!({"title": "Notes: Part 1"}), true)).unwrap();

    assert_eq!(
        child,
        Block::ChildPage(ChildPageBlock {
            common: common().with_children(),
            title: "Notes: Part 1".to_string(),
        })
    );
}

#[test]
fn test_image_sources() {
    let hosted = parse_block(&block(
        "image",
        json!({
            "caption": [],
            "type": "file",
            "file": {
                "url": "https://prod-files.s3.amazonaws.com/cover.png?X-Amz-Signature=1",
                "expiry_time": "2025-06-20T01:00:00.000Z"
            }
        }),
        false,
    ))
    .unwrap();
    assert_eq!(
        hosted,
        Block::Image(MediaBlock {
            common: common(),
            source: FileObject::Hosted {
                url: "https://prod-files.s3.amazonaws.com/cover.png?X-Amz-Signature=1".to_string(),
                expiry_time: Some(utc(2025, 6, 20, 1, 0)),
            },
        })
    );

    let external = parse_block(&block(
        "image",
        json!({
            "caption": [],
            "type": "external",
            "external": {"url": "https://images.example.com/dune.jpg"}
        }),
        false,
    ))
    .unwrap();
    assert_eq!(
        external,
        Block::Image(MediaBlock {
            common: common(),
            source: FileObject::External {
                url: "https://images.example.com/dune.jpg".to_string(),
            },
        })
    );
}

#[test]
fn test_link_blocks() {
    let bookmark = parse_block(&block(
        "bookmark",
        json!({
            "caption": [text_run("Official site")],
            "url": "https://notion.so"
        }),
        false,
    ))
    .unwrap();
    assert_eq!(
        bookmark,
        Block::Bookmark(BookmarkBlock {
            common: common(),
            url: "https://notion.so".to_string(),
            caption: vec![RichTextRun::plain("Official site")],
        })
    );

    let preview = parse_block(&block(
        "link_preview",
        json!({"url": "https://github.com/rust-lang/rust/pull/1"}),
        false,
    ))
    .unwrap();
    assert_eq!(
        preview,
        Block::LinkPreview(LinkPreviewBlock {
            common: common(),
            url: "https://github.com/rust-lang/rust/pull/1".to_string(),
        })
    );
}
