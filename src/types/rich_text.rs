// src/types/rich_text.rs
//! Rich text runs as the converter sees them.
//!
//! Notion annotates text with bold, italic, strikethrough, underline, code
//! and color. Only bold and italic survive the conversion; everything else
//! is dropped at parse time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One styled span of text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RichTextRun {
    pub plain_text: String,
    pub annotations: Annotations,
    pub href: Option<String>,
    pub mention: Option<Mention>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
}

/// The mention sub-kinds the converter distinguishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mention {
    Date { start: NaiveDate },
    Page { id: String },
    User { name: Option<String> },
    Other,
}

impl RichTextRun {
    /// Creates an unstyled run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.annotations.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.annotations.italic = true;
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Creates a date mention run. The plain text mirrors what Notion sends.
    pub fn date_mention(start: NaiveDate) -> Self {
        Self {
            plain_text: start.format("%Y-%m-%d").to_string(),
            mention: Some(Mention::Date { start }),
            ..Default::default()
        }
    }
}

/// Concatenates the plain text of all runs.
pub fn plain_text_of(runs: &[RichTextRun]) -> String {
    runs.iter().map(|r| r.plain_text.as_str()).collect()
}
