// tests/common/mod.rs
//! Shared fixtures: builders for documents and blocks, and vault helpers.

#![allow(dead_code)]

pub use notion2vault::testing::{EchoAssets, MemoryNotion};

use notion2vault::{BlockCommon, BlockId, DatabaseId, Document, PageId, PropertyValue, RichTextRun};
use std::path::Path;

pub const COLLECTION: &str = "0123456789abcdef0123456789abcdef";

/// A 32-hex id derived from a small number.
pub fn hex_id(n: u32) -> String {
    format!("{:032x}", n)
}

pub fn block_id(id: &str) -> BlockId {
    BlockId::parse(id).expect("test block id")
}

pub fn collection() -> DatabaseId {
    DatabaseId::parse(COLLECTION).expect("test collection id")
}

pub fn document(id: &str, title: &str) -> Document {
    Document::new(PageId::parse(id).expect("test page id")).with_property(
        "Name",
        PropertyValue::Title {
            title: vec![RichTextRun::plain(title)],
        },
    )
}

pub fn common(id: &str) -> BlockCommon {
    BlockCommon::new(block_id(id))
}

pub fn text(s: &str) -> Vec<RichTextRun> {
    vec![RichTextRun::plain(s)]
}

pub fn read(root: &Path, relative: &str) -> String {
    std::fs::read_to_string(root.join(relative))
        .unwrap_or_else(|e| panic!("reading {}: {}", relative, e))
}
