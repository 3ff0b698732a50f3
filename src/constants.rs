//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role.

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// How many objects the Notion API returns per page of results.
///
/// The Notion API maximum is 100. We use the maximum to minimize
/// round-trips while listing rows and block children.
pub const NOTION_API_PAGE_SIZE: usize = 100;

/// API version sent with every request.
pub const NOTION_API_VERSION: &str = "2022-06-28";

/// Base URL of the Notion REST API.
pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";

// ---------------------------------------------------------------------------
// Conversion boundaries
// ---------------------------------------------------------------------------

/// Maximum nesting depth when recursively rendering blocks.
///
/// Notion has no hard nesting limit; anything deeper than this is cut and
/// logged rather than risking runaway recursion on malformed trees.
pub const BLOCK_MAX_RENDER_DEPTH: usize = 64;

/// Maximum length of a sanitized note title, in characters.
pub const TITLE_MAX_LENGTH: usize = 200;

/// Title used when a document has no usable title text.
pub const UNTITLED_TITLE: &str = "Untitled";

/// Extension used when none can be sniffed from an attachment URL.
pub const DEFAULT_ATTACHMENT_EXTENSION: &str = "png";
/// How many numeric suffixes are tried before giving up on a name.
/// Upper bound for numeric suffix probing before giving up on a name.
pub const MAX_NAME_ATTEMPTS: usize = 10_000;

/// Number of resolved relation titles kept in memory per run.
pub const RELATION_CACHE_CAPACITY: usize = 1024;

// ---------------------------------------------------------------------------
// Output layout
// ---------------------------------------------------------------------------

/// Folder (below the destination) that receives child pages.
pub const SUBPAGES_DIR: &str = "subpages";

/// Default attachment folder, relative to the vault root.
pub const DEFAULT_ATTACHMENTS_DIR: &str = "attachments";

/// Default location of the persisted migration log, relative to the vault root.
pub const DEFAULT_MIGRATION_LOG: &str = ".notion2vault/migration.log";

/// Documents converted at the same time.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Upper bound accepted for `--concurrency`.
pub const MAX_CONCURRENCY: u32 = 32;

// ---------------------------------------------------------------------------
// String capacity hints (performance, not correctness)
// ---------------------------------------------------------------------------

/// Estimated characters per block, used to pre-allocate output strings.
pub const CHARS_PER_BLOCK_ESTIMATE: usize = 256;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 500;
