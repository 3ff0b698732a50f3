// src/lib.rs
//! notion2vault library: migrates a Notion database into an Obsidian vault.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `ValidationError`
//! - **Configuration**: `MigrationConfig`, `CommandLineInput`, `SettingsFile`
//! - **Domain model**: `Document`, `PropertyValue`, `Block` and the block structs
//! - **API client**: `NotionRepository`, `AssetSource` and their HTTP implementations
//! - **Conversion**: `serialize_header`, `BlockWalker`, `ConversionContext`
//! - **Output**: `Vault`, `FsVault`, `TitlePolicy`, `MigrationLog`
//! - **Batch**: `Migrator`, `MigrationReport`
//! - **Doubles**: `testing::MemoryNotion`, `testing::EchoAssets`

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatting;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod types;

pub mod testing;

// --- Error Handling ---
pub use crate::error::{AppError, NotionErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, MigrationConfig, SettingsFile};

// --- Domain Model ---
pub use crate::model::{
    Block, BlockCommon, DateValue, Document, FileReference, FormulaValue, PropertyValue,
    RollupValue,
};

// --- Block Types ---
pub use crate::model::blocks::{
    BookmarkBlock, BulletedListItemBlock, ChildPageBlock, CodeBlock, FileObject, HeadingBlock,
    LinkPreviewBlock, MediaBlock, NumberedListItemBlock, ParagraphBlock, TableBlock, TableRowBlock,
    ToDoBlock, ToggleBlock, UnsupportedBlock,
};

// --- Domain Types ---
pub use crate::types::{
    Annotations, ApiKey, BlockId, DatabaseId, Mention, PageId, PropertyName, RichTextRun,
};

// --- API Client ---
pub use crate::api::{
    fetch_all_documents, AssetSource, HttpAssetSource, NotionHttpClient, NotionRepository,
    PaginatedResponse,
};

// --- Conversion ---
pub use crate::formatting::{
    serialize_header, BlockWalker, CancellationFlag, ChildPageConverter, ConversionContext,
    ConversionSettings, Header, PropertyFilter, RelationResolver, RenderedBody,
};

// --- Output ---
pub use crate::output::{
    AttachmentMaterializer, FsVault, MigrationLog, PendingWrite, TitlePolicy, TitleRegistry,
    Vault, WriteOutcome,
};

// --- Batch ---
pub use crate::pipeline::{MigrationReport, Migrator};
