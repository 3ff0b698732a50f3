// src/formatting/rich_text.rs
//! Inline rendering of rich text runs to Markdown.

use crate::types::{Mention, RichTextRun};

/// Renders runs to Markdown: bold and italic markers, links for runs with
/// an href, and date mentions as `[[D.M.YYYY]]` daily-note links.
pub fn render_runs(runs: &[RichTextRun]) -> String {
    let mut out = String::new();
    for run in runs {
        render_run(run, &mut out);
    }
    out
}

fn render_run(run: &RichTextRun, out: &mut String) {
    if let Some(Mention::Date { start }) = &run.mention {
        out.push_str(&format!("[[{}]]", start.format("%-d.%-m.%Y")));
        return;
    }

    let text = run.plain_text.as_str();
    if text.is_empty() {
        return;
    }

    let mut styled = match (run.annotations.bold, run.annotations.italic) {
        (true, true) => format!("***{}***", text),
        (true, false) => format!("**{}**", text),
        (false, true) => format!("*{}*", text),
        (false, false) => text.to_string(),
    };

    if let Some(href) = &run.href {
        styled = format!("[{}]({})", styled, href);
    }

    out.push_str(&styled);
}

/// Renders a table cell: inline Markdown with pipes escaped and line breaks
/// folded, so the row stays on one line.
pub fn render_cell(runs: &[RichTextRun]) -> String {
    render_runs(runs)
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_plain_runs_concatenate() {
        let runs = vec![RichTextRun::plain("Hello, "), RichTextRun::plain("world")];
        assert_eq!(render_runs(&runs), "Hello, world");
    }

    #[test]
    fn test_annotations_and_links() {
        let runs = vec![
            RichTextRun::plain("bold").bold(),
            RichTextRun::plain(" and "),
            RichTextRun::plain("both").bold().italic(),
            RichTextRun::plain(" "),
            RichTextRun::plain("site").italic().with_href("https://example.com"),
        ];
        assert_eq!(
            render_runs(&runs),
            "**bold** and ***both*** [*site*](https://example.com)"
        );
    }

    #[test]
    fn test_date_mention_becomes_daily_note_link() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let runs = vec![RichTextRun::plain("Due "), RichTextRun::date_mention(date)];
        assert_eq!(render_runs(&runs), "Due [[7.3.2024]]");
    }

    #[test]
    fn test_cell_escapes_pipes_and_newlines() {
        let runs = vec![RichTextRun::plain("a|b\nc")];
        assert_eq!(render_cell(&runs), "a\\|b<br>c");
    }
}
