// src/output/paths.rs
//! Note and attachment naming.
//!
//! Sanitizing and extension sniffing are pure. The title registry is the
//! one piece of shared state: it remembers every name handed out during a
//! run so concurrent documents never claim the same file.

use super::vault::Vault;
use crate::constants::{
    DEFAULT_ATTACHMENT_EXTENSION, MAX_NAME_ATTEMPTS, TITLE_MAX_LENGTH, UNTITLED_TITLE,
};
use crate::types::PageId;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref TITLE_DISALLOWED: Regex =
        Regex::new(r"[^a-zA-Z0-9\-_ ]").expect("Invalid title regex");
    static ref EXTENSION: Regex = Regex::new(r"\.([A-Za-z0-9]{1,5})$").expect("Invalid extension regex");
}

/// Reduces a title to a safe file stem.
///
/// Keeps ASCII letters, digits, `-`, `_` and spaces; spaces become `_`.
pub fn sanitize_title(title: &str) -> String {
    let kept = TITLE_DISALLOWED.replace_all(title.trim(), "");
    let mut stem = kept.trim().replace(' ', "_");
    if stem.len() > TITLE_MAX_LENGTH {
        // ASCII only at this point, so byte truncation is safe.
        stem.truncate(TITLE_MAX_LENGTH);
    }
    if stem.is_empty() {
        UNTITLED_TITLE.to_string()
    } else {
        stem
    }
}

/// Extension from the last path segment of a URL, lowercased.
///
/// Query strings and fragments are ignored. Falls back to `png`.
pub fn sniff_extension(source: &str) -> String {
    let path = match url::Url::parse(source) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => source
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    let last_segment = path.rsplit('/').next().unwrap_or_default();

    EXTENSION
        .captures(last_segment)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_ATTACHMENT_EXTENSION.to_string())
}

/// How note names are made unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TitlePolicy {
    /// `{title}_{page id}`, no lookup.
    #[default]
    AppendId,
    /// `{title}`, then `{title}_1`, `{title}_2`, ... until free.
    Deduplicate,
}

/// Names claimed during the current run, keyed by folder.
#[derive(Debug, Default)]
pub struct TitleRegistry {
    reserved: Mutex<HashSet<PathBuf>>,
}

impl TitleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a note stem in `dir` for a document.
    ///
    /// Under `Deduplicate`, a candidate is taken when `{dir}/{candidate}.md`
    /// exists in the vault or was claimed earlier in this run.
    pub async fn claim(
        &self,
        vault: &dyn Vault,
        dir: &Path,
        title: &str,
        id: &PageId,
        policy: TitlePolicy,
    ) -> String {
        let base = sanitize_title(title);
        match policy {
            TitlePolicy::AppendId => format!("{}_{}", base, id),
            TitlePolicy::Deduplicate => self.claim_free(vault, dir, &base, id).await,
        }
    }

    async fn claim_free(&self, vault: &dyn Vault, dir: &Path, base: &str, id: &PageId) -> String {
        for n in 0..MAX_NAME_ATTEMPTS {
            let candidate = if n == 0 {
                base.to_string()
            } else {
                format!("{}_{}", base, n)
            };
            let path = dir.join(format!("{}.md", candidate));
            if vault.file_exists(&path).await {
                continue;
            }
            if self.reserved.lock().insert(path) {
                return candidate;
            }
        }

        log::warn!(
            "No free name for '{}' after {} attempts, falling back to the page id",
            base,
            MAX_NAME_ATTEMPTS
        );
        format!("{}_{}", base, id)
    }
}
