// src/formatting/state.rs
//! Per-document conversion state threaded through the recursive walk.
//!
//! A `ConversionContext` belongs to exactly one document conversion and is
//! passed by `&mut` down the walk. Nothing here is global, so concurrent
//! documents cannot see each other's counters.

use crate::model::Block;
use crate::output::TitlePolicy;
use indexmap::IndexMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, cooperative stop request for a batch.
///
/// The batch reads it once before each top-level document; the walker
/// only carries it along for child conversions.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-property enable switches. Names not listed are enabled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter(IndexMap<String, bool>);

impl PropertyFilter {
    pub fn new(switches: IndexMap<String, bool>) -> Self {
        Self(switches)
    }

    pub fn disable(mut self, name: impl Into<String>) -> Self {
        self.0.insert(name.into(), false);
        self
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(true)
    }
}

/// Run-wide conversion options, shared by every context of a batch.
#[derive(Debug, Clone)]
pub struct ConversionSettings {
    /// Folder receiving notes, relative to the vault root.
    pub destination: PathBuf,
    /// Folder receiving attachments, relative to the vault root.
    pub attachments: PathBuf,
    pub title_policy: TitlePolicy,
    /// When false only the header is written.
    pub include_body: bool,
    pub relations_as_list: bool,
    pub semantic_links: bool,
    pub normalize_date_keys: bool,
    pub property_filter: PropertyFilter,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            destination: PathBuf::new(),
            attachments: PathBuf::from(crate::constants::DEFAULT_ATTACHMENTS_DIR),
            title_policy: TitlePolicy::AppendId,
            include_body: true,
            relations_as_list: false,
            semantic_links: false,
            normalize_date_keys: false,
            property_filter: PropertyFilter::default(),
        }
    }
}

impl ConversionSettings {
    /// Folder receiving child pages.
    pub fn subpages_dir(&self) -> PathBuf {
        self.destination.join(crate::constants::SUBPAGES_DIR)
    }
}

/// Numbered-list bookkeeping for one nesting level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    counter: usize,
    previous_kind: Option<String>,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            counter: 1,
            previous_kind: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversionContext {
    list: ListState,
    attachment_seq: u32,
    file_stem: String,
    depth: usize,
    settings: Arc<ConversionSettings>,
    cancel: CancellationFlag,
}

impl ConversionContext {
    /// Creates the context for one document whose note is named `file_stem`.
    pub fn new(
        file_stem: impl Into<String>,
        settings: Arc<ConversionSettings>,
        cancel: CancellationFlag,
    ) -> Self {
        Self {
            list: ListState::default(),
            attachment_seq: 0,
            file_stem: file_stem.into(),
            depth: 0,
            settings,
            cancel,
        }
    }

    /// Fresh context for a child page; shares settings and the cancel flag.
    pub fn for_child(&self, file_stem: impl Into<String>) -> Self {
        let mut child = Self::new(file_stem, self.settings.clone(), self.cancel.clone());
        child.depth = self.depth + 1;
        child
    }

    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancel
    }

    pub fn file_stem(&self) -> &str {
        &self.file_stem
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Called before a block is rendered. Leaving a numbered run resets
    /// the counter.
    pub fn begin_block(&mut self, block: &Block) {
        if self.list.previous_kind.as_deref() == Some("numbered_list_item")
            && !block.is_numbered_list_item()
        {
            self.list.counter = 1;
        }
    }

    /// Called once a block (and its children) is done.
    pub fn end_block(&mut self, block: &Block) {
        self.list.previous_kind = Some(block.block_type().to_string());
    }

    /// Ordinal for the current numbered item; advances the counter.
    pub fn next_ordinal(&mut self) -> usize {
        let n = self.list.counter;
        self.list.counter += 1;
        n
    }

    /// Starts a nested list level and returns the parent's state.
    pub fn enter_children(&mut self) -> ListState {
        self.depth += 1;
        std::mem::take(&mut self.list)
    }

    /// Restores the parent's list state after a nested level.
    pub fn exit_children(&mut self, saved: ListState) {
        self.depth = self.depth.saturating_sub(1);
        self.list = saved;
    }

    /// Next attachment sequence number for this document, starting at 1.
    pub fn next_attachment_seq(&mut self) -> u32 {
        self.attachment_seq += 1;
        self.attachment_seq
    }
}
