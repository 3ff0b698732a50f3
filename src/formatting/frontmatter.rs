// src/formatting/frontmatter.rs
//! Property Serializer: a document's properties as a `---` delimited
//! YAML-style header.
//!
//! Lines are emitted in the order the properties arrived. Each kind has one
//! fixed rendering; kinds without a rule are logged and left out.

use super::relations::RelationResolver;
use super::state::ConversionContext;
use crate::error::AppError;
use crate::model::{DateValue, Document, FormulaValue, PropertyValue, RollupValue};
use crate::output::{sanitize_title, AttachmentMaterializer};
use crate::types::{plain_text_of, PageId};
use chrono::{DateTime, SecondsFormat, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PLAIN_KEY: Regex = Regex::new(r"^[A-Za-z0-9_ ]+$").expect("Invalid key regex");
    static ref NEEDS_QUOTES: Regex = Regex::new(r"[^\w\s]").expect("Invalid value regex");
    static ref NON_ALNUM_RUN: Regex = Regex::new(r"[^a-z0-9]+").expect("Invalid key regex");
}

const MARKER: &str = "---";
const ALIAS_KEY: &str = "Alias";

/// The serialized header plus the semantic-link lines that belong right
/// after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub text: String,
    pub semantic_links: Vec<String>,
}

impl Header {
    /// Header and semantic-link lines, ready to prepend to a body.
    pub fn render(&self) -> String {
        let mut out = self.text.clone();
        for line in &self.semantic_links {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Serializes every enabled property of `document`.
///
/// Only a failed relation lookup is an error; it aborts the document.
pub async fn serialize_header(
    document: &Document,
    ctx: &mut ConversionContext,
    relations: &RelationResolver,
    attachments: &AttachmentMaterializer,
) -> Result<Header, AppError> {
    let mut header = Header::default();
    header.text.push_str(MARKER);
    header.text.push('\n');

    let normalize_dates = ctx.settings().normalize_date_keys;
    let relations_as_list = ctx.settings().relations_as_list;
    let semantic_links = ctx.settings().semantic_links;

    for (name, value) in &document.properties {
        if !ctx.settings().property_filter.is_enabled(name.as_str()) {
            log::debug!("Property '{}' disabled, skipping", name);
            continue;
        }

        let raw_key = if normalize_dates && value.is_date_like() {
            snake_case_key(name.as_str())
        } else {
            name.as_str().to_string()
        };
        let key = quote_key(&raw_key);
        let out = &mut header.text;

        match value {
            PropertyValue::Title { title } => {
                let alias = sanitize_title(&plain_text_of(title));
                push_line(out, ALIAS_KEY, Some(&quote_value(&alias)));
            }
            PropertyValue::RichText { rich_text } => {
                let text = collapse_newlines(&plain_text_of(rich_text));
                if text.is_empty() {
                    push_line(out, &key, Some("null"));
                } else {
                    push_line(out, &key, Some(&format!("\"{}\"", escape(&text))));
                }
            }
            PropertyValue::Select { select } | PropertyValue::Status { status: select } => {
                match select {
                    Some(name) => push_line(out, &key, Some(&quote_value(name))),
                    None if matches!(value, PropertyValue::Status { .. }) => {
                        push_line(out, &key, None)
                    }
                    None => {}
                }
            }
            PropertyValue::MultiSelect { multi_select } => {
                if !multi_select.is_empty() {
                    push_line(out, &key, Some(&quote_value(&multi_select.join(" "))));
                }
            }
            PropertyValue::Checkbox { checkbox } => {
                push_line(out, &key, Some(&checkbox.to_string()));
            }
            PropertyValue::Date { date } => {
                let start = date.as_ref().map(|d| iso_timestamp(&d.start));
                push_line(out, &key, start.as_deref());
            }
            PropertyValue::CreatedTime { created_time } => {
                push_line(out, &key, Some(&iso_timestamp(created_time)));
            }
            PropertyValue::Number { number } => {
                if let Some(number) = number {
                    push_line(out, &key, Some(&number.to_string()));
                }
            }
            PropertyValue::Url { url } => {
                let url = url.as_deref().filter(|u| !u.is_empty()).map(quote_value);
                push_line(out, &key, url.as_deref());
            }
            PropertyValue::Formula { formula } => match formula {
                Some(formula) => push_line(out, &key, formula_scalar(formula).as_deref()),
                None => log::debug!("Formula '{}' has no value, dropping", name),
            },
            PropertyValue::Rollup { rollup } => {
                push_line(out, &key, Some(&rollup_value(name.as_str(), rollup)));
            }
            PropertyValue::Relation { relation } => {
                let lines = relation_lines(&key, relation, relations, relations_as_list).await?;
                header.text.push_str(&lines.header);
                if semantic_links {
                    header.semantic_links.extend(lines.semantic(name.as_str()));
                }
            }
            PropertyValue::Files { files } => {
                let mut embeds = Vec::with_capacity(files.len());
                for file in files {
                    match attachments.materialize(&file.url, ctx).await {
                        Some(embed) => embeds.push(embed),
                        None => log::warn!("Skipping file '{}' of '{}'", file.name, name),
                    }
                }
                let out = &mut header.text;
                if embeds.is_empty() {
                    push_line(out, &key, Some("[]"));
                } else {
                    push_line(out, &key, None);
                    for embed in embeds {
                        out.push_str(&format!("  - \"{}\"\n", escape(&embed)));
                    }
                }
            }
            PropertyValue::Unsupported { kind } => {
                log::debug!("Property '{}' of type '{}' has no header form", name, kind);
            }
        }
    }

    header.text.push_str(MARKER);
    header.text.push('\n');
    Ok(header)
}

struct RelationLines {
    header: String,
    names: Vec<String>,
}

impl RelationLines {
    fn semantic(&self, name: &str) -> Option<String> {
        if self.names.is_empty() {
            return None;
        }
        let links: Vec<String> = self.names.iter().map(|n| format!("[[{}]]", n)).collect();
        Some(format!("{}:: {}", name, links.join(", ")))
    }
}

async fn relation_lines(
    key: &str,
    ids: &[PageId],
    resolver: &RelationResolver,
    as_list: bool,
) -> Result<RelationLines, AppError> {
    let names = resolver.resolve(ids).await?;
    let quoted: Vec<String> = names
        .iter()
        .map(|n| format!("\"[[{}]]\"", escape(n)))
        .collect();

    let mut header = String::new();
    if as_list {
        push_line(&mut header, key, None);
        for link in &quoted {
            header.push_str(&format!("  - {}\n", link));
        }
    } else {
        push_line(&mut header, key, Some(&format!("[{}]", quoted.join(", "))));
    }

    Ok(RelationLines { header, names })
}

fn push_line(out: &mut String, key: &str, value: Option<&str>) {
    match value {
        Some(value) => out.push_str(&format!("{}: {}\n", key, value)),
        None => out.push_str(&format!("{}:\n", key)),
    }
}

/// Scalar form of a formula result; `None` when the result is empty.
fn formula_scalar(formula: &FormulaValue) -> Option<String> {
    match formula {
        FormulaValue::String(Some(s)) if !s.is_empty() => Some(quote_value(s)),
        FormulaValue::String(_) => None,
        FormulaValue::Number(number) => number.as_ref().map(|n| n.to_string()),
        FormulaValue::Boolean(b) => Some(b.to_string()),
        FormulaValue::Date(date) => date.as_ref().map(|d: &DateValue| iso_timestamp(&d.start)),
    }
}

fn rollup_value(name: &str, rollup: &RollupValue) -> String {
    let entries = match rollup {
        RollupValue::Array(entries) => entries,
        _ => return "null".to_string(),
    };

    let values: Vec<String> = entries
        .iter()
        .filter_map(|entry| match entry {
            PropertyValue::Formula {
                formula: Some(formula),
            } => formula_scalar(formula),
            other => {
                log::debug!(
                    "Rollup '{}' entry of type '{}' skipped",
                    name,
                    other.type_name()
                );
                None
            }
        })
        .collect();

    match values.len() {
        0 => "null".to_string(),
        1 => values[0].clone(),
        _ => format!("[{}]", values.join(", ")),
    }
}

fn iso_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn collapse_newlines(value: &str) -> String {
    value.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Quotes keys holding anything beyond letters, digits, `_` and spaces.
pub fn quote_key(key: &str) -> String {
    if PLAIN_KEY.is_match(key) {
        key.to_string()
    } else {
        format!("\"{}\"", escape(key))
    }
}

/// Quotes values holding anything beyond word characters and whitespace.
pub fn quote_value(value: &str) -> String {
    if NEEDS_QUOTES.is_match(value) {
        format!("\"{}\"", escape(value))
    } else {
        value.to_string()
    }
}

/// `Due Date` -> `due_date`.
pub fn snake_case_key(key: &str) -> String {
    let lowered = key.to_lowercase();
    NON_ALNUM_RUN
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}
