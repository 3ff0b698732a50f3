// src/formatting/block_walker.rs
//! Block Tree Walker: renders a page's block tree to Markdown.
//!
//! The walk is depth-first and left to right. Children are fetched lazily
//! through the repository when a block reports `has_children`. Child pages
//! are converted and written through [`ChildPageConverter`] the moment they
//! are found, so a parent failing later never loses them.

use super::rich_text::{render_cell, render_runs};
use super::state::ConversionContext;
use crate::api::NotionRepository;
use crate::constants::{BLOCK_MAX_RENDER_DEPTH, CHARS_PER_BLOCK_ESTIMATE};
use crate::error::AppError;
use crate::model::{Block, ChildPageBlock, CodeBlock, MediaBlock, TableBlock};
use crate::output::{AttachmentMaterializer, ChildTally, WriteOutcome};
use crate::types::{plain_text_of, RichTextRun};
use futures::future::{BoxFuture, FutureExt};

/// Converts a nested page into its own note.
#[async_trait::async_trait]
pub trait ChildPageConverter: Send + Sync {
    /// The note stem the child page will be written under.
    async fn child_stem(&self, page: &ChildPageBlock) -> String;

    /// Converts the child page and writes its note.
    async fn convert_child(
        &self,
        page: &ChildPageBlock,
        stem: &str,
        parent: &ConversionContext,
    ) -> Result<WriteOutcome, AppError>;
}

/// Markdown for a block list plus the child notes written on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedBody {
    pub text: String,
    pub children: ChildTally,
}

impl RenderedBody {
    fn with_capacity(blocks: usize) -> Self {
        Self {
            text: String::with_capacity(blocks * CHARS_PER_BLOCK_ESTIMATE),
            children: ChildTally::default(),
        }
    }

    fn absorb(&mut self, other: RenderedBody) {
        self.text.push_str(&other.text);
        self.children.absorb(other.children);
    }
}

pub struct BlockWalker<'a> {
    repository: &'a dyn NotionRepository,
    attachments: &'a AttachmentMaterializer,
    children: &'a dyn ChildPageConverter,
}

impl<'a> BlockWalker<'a> {
    pub fn new(
        repository: &'a dyn NotionRepository,
        attachments: &'a AttachmentMaterializer,
        children: &'a dyn ChildPageConverter,
    ) -> Self {
        Self {
            repository,
            attachments,
            children,
        }
    }

    /// Renders `blocks` in order. Only repository failures are errors.
    pub fn render_blocks<'s>(
        &'s self,
        blocks: &'s [Block],
        ctx: &'s mut ConversionContext,
    ) -> BoxFuture<'s, Result<RenderedBody, AppError>> {
        async move {
            let mut body = RenderedBody::with_capacity(blocks.len());

            for block in blocks {
                ctx.begin_block(block);

                match block {
                    Block::Table(table) => self.render_table(table, ctx, &mut body).await?,
                    Block::ChildPage(page) => self.render_child_page(page, ctx, &mut body).await,
                    Block::Toggle(toggle) => {
                        body.text.push_str(&callout_line(&toggle.rich_text));
                        if block.has_children() {
                            if let Some(nested) = self.render_children(block, ctx).await? {
                                body.text.push_str(&quote_lines(&nested.text));
                                body.children.absorb(nested.children);
                            }
                        }
                        body.text.push('\n');
                    }
                    _ => {
                        let text = self.render_leaf(block, ctx).await;
                        body.text.push_str(&text);
                        if block.has_children() {
                            if let Some(nested) = self.render_children(block, ctx).await? {
                                body.absorb(nested);
                            }
                        }
                    }
                }

                ctx.end_block(block);
            }

            Ok(body)
        }
        .boxed()
    }

    /// Renders a block's children one list level deeper. `None` when the
    /// depth limit cuts the branch.
    async fn render_children(
        &self,
        block: &Block,
        ctx: &mut ConversionContext,
    ) -> Result<Option<RenderedBody>, AppError> {
        if ctx.depth() >= BLOCK_MAX_RENDER_DEPTH {
            log::warn!(
                "Block {} is nested deeper than {}, skipping its children",
                block.id(),
                BLOCK_MAX_RENDER_DEPTH
            );
            return Ok(None);
        }

        let children = self.repository.retrieve_children(block.id()).await?;
        let saved = ctx.enter_children();
        let rendered = self.render_blocks(&children, ctx).await;
        ctx.exit_children(saved);
        rendered.map(Some)
    }

    async fn render_leaf(&self, block: &Block, ctx: &mut ConversionContext) -> String {
        match block {
            Block::Paragraph(p) => non_empty(&p.rich_text, |t| format!("{}\n\n", t)),
            Block::Heading(h) => non_empty(&h.rich_text, |t| {
                format!("{} {}\n\n", "#".repeat(h.level as usize), t)
            }),
            Block::BulletedListItem(b) => non_empty(&b.rich_text, |t| format!("- {}\n", t)),
            Block::NumberedListItem(n) => {
                let text = render_runs(&n.rich_text);
                if text.is_empty() {
                    String::new()
                } else {
                    format!("{}. {}\n", ctx.next_ordinal(), text)
                }
            }
            Block::ToDo(todo) => non_empty(&todo.rich_text, |t| {
                format!("- [{}] {}\n", if todo.checked { "x" } else { " " }, t)
            }),
            Block::Code(code) => code_fence(code),
            Block::Image(media) => self.embed(media, ctx).await,
            Block::Video(media) if !media.source.is_hosted() => {
                let url = media.source.url();
                format!("Video: [{}]({})\n\n", url, url)
            }
            Block::Audio(media) | Block::File(media) if !media.source.is_hosted() => {
                let url = media.source.url();
                format!("[{}]({})\n\n", url, url)
            }
            Block::Video(media) | Block::Audio(media) | Block::File(media) => {
                self.embed(media, ctx).await
            }
            Block::Bookmark(bookmark) => {
                let caption = plain_text_of(&bookmark.caption);
                let label = if caption.is_empty() {
                    bookmark.url.as_str()
                } else {
                    caption.as_str()
                };
                format!("[{}]({})\n\n", label, bookmark.url)
            }
            Block::LinkPreview(preview) => format!("[Link Preview]({})\n\n", preview.url),
            Block::TableRow(row) => table_row_line(&row.cells),
            Block::Unsupported(unsupported) => {
                log::debug!(
                    "Block {} of type '{}' has no Markdown form",
                    unsupported.common.id,
                    unsupported.block_type
                );
                String::new()
            }
            Block::Toggle(_) | Block::Table(_) | Block::ChildPage(_) => String::new(),
        }
    }

    async fn embed(&self, media: &MediaBlock, ctx: &mut ConversionContext) -> String {
        match self.attachments.materialize(media.source.url(), ctx).await {
            Some(embed) => format!("{}\n\n", embed),
            None => String::new(),
        }
    }

    async fn render_table(
        &self,
        table: &TableBlock,
        ctx: &mut ConversionContext,
        body: &mut RenderedBody,
    ) -> Result<(), AppError> {
        if !table.common.has_children {
            return Ok(());
        }
        if ctx.depth() >= BLOCK_MAX_RENDER_DEPTH {
            log::warn!("Table {} is nested too deeply, skipping", table.common.id);
            return Ok(());
        }

        let rows = self.repository.retrieve_children(&table.common.id).await?;
        let mut emitted = 0;
        for row in &rows {
            let Block::TableRow(row) = row else {
                log::debug!("Ignoring non-row child {} of table {}", row.id(), table.common.id);
                continue;
            };
            body.text.push_str(&table_row_line(&row.cells));
            if emitted == 0 {
                let width = if table.table_width > 0 {
                    table.table_width
                } else {
                    row.cells.len()
                };
                body.text.push_str(&separator_line(width));
            }
            emitted += 1;
        }

        if emitted > 0 {
            body.text.push('\n');
        }
        Ok(())
    }

    async fn render_child_page(
        &self,
        page: &ChildPageBlock,
        ctx: &mut ConversionContext,
        body: &mut RenderedBody,
    ) {
        let stem = self.children.child_stem(page).await;
        match self.children.convert_child(page, &stem, ctx).await {
            Ok(written) => body.children.record_written(&written),
            Err(e) => {
                log::warn!(
                    "Child page '{}' ({}) could not be converted: {}",
                    page.title,
                    page.common.id,
                    e
                );
                body.children.record_failed();
            }
        }

        let label = page.title.replace(['[', ']', '|'], "");
        if label.is_empty() || label == stem {
            body.text.push_str(&format!("[[{}]]\n\n", stem));
        } else {
            body.text.push_str(&format!("[[{}|{}]]\n\n", stem, label));
        }
    }
}

fn non_empty(runs: &[RichTextRun], wrap: impl FnOnce(&str) -> String) -> String {
    let text = render_runs(runs);
    if text.is_empty() {
        String::new()
    } else {
        wrap(&text)
    }
}

fn callout_line(runs: &[RichTextRun]) -> String {
    let summary = render_runs(runs);
    if summary.is_empty() {
        "> [!NOTE]+\n".to_string()
    } else {
        format!("> [!NOTE]+ {}\n", summary)
    }
}

/// Prefixes every line with `> `; blank lines become a bare `>`.
fn quote_lines(text: &str) -> String {
    let trimmed = text.trim_end_matches('\n');
    if trimmed.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(trimmed.len() + 16);
    for line in trimmed.split('\n') {
        if line.is_empty() {
            out.push_str(">\n");
        } else {
            out.push_str("> ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

fn code_fence(code: &CodeBlock) -> String {
    let language = if code.language == "plain text" {
        ""
    } else {
        code.language.as_str()
    };
    format!("```{}\n{}\n```\n\n", language, plain_text_of(&code.rich_text))
}

fn table_row_line(cells: &[Vec<RichTextRun>]) -> String {
    let rendered: Vec<String> = cells.iter().map(|cell| render_cell(cell)).collect();
    format!("| {} |\n", rendered.join(" | "))
}

fn separator_line(width: usize) -> String {
    format!("|{}\n", " --- |".repeat(width.max(1)))
}
