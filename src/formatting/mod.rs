// src/formatting/mod.rs
//! Converts documents into note text: the property header and the
//! Markdown body.

mod block_walker;
mod frontmatter;
mod relations;
mod rich_text;
mod state;

pub use block_walker::{BlockWalker, ChildPageConverter, RenderedBody};
pub use frontmatter::{quote_key, quote_value, serialize_header, snake_case_key, Header};
pub use relations::RelationResolver;
pub use rich_text::{render_cell, render_runs};
pub use state::{
    CancellationFlag, ConversionContext, ConversionSettings, ListState, PropertyFilter,
};
