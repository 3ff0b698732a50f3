//! Domain model for migrated content: documents, their properties and blocks.

mod block;
pub mod blocks;
pub mod common;
mod property_value;

pub use block::Block;
pub use blocks::*;
pub use common::*;
pub use property_value::{DateValue, FileReference, FormulaValue, PropertyValue, RollupValue};

use crate::types::{plain_text_of, BlockId, PageId, PropertyName};
use indexmap::IndexMap;

/// One database row: an id plus its properties in payload order.
///
/// The block tree is not part of the document; the walker fetches it
/// through the repository starting at [`Document::root_block`].
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: PageId,
    pub properties: IndexMap<PropertyName, PropertyValue>,
}

impl Document {
    pub fn new(id: PageId) -> Self {
        Self {
            id,
            properties: IndexMap::new(),
        }
    }

    /// Builder-style property insertion, keeping insertion order.
    pub fn with_property(mut self, name: impl Into<PropertyName>, value: PropertyValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Plain text of the `title` property, or empty when there is none.
    pub fn title_text(&self) -> String {
        self.properties
            .values()
            .find_map(|value| match value {
                PropertyValue::Title { title } => Some(plain_text_of(title)),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// A page's content is the children of the block sharing its id.
    pub fn root_block(&self) -> BlockId {
        self.id.cast()
    }
}
