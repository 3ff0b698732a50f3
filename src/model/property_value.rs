use crate::types::{PageId, RichTextRun};
use chrono::{DateTime, Utc};

/// A typed property value as the header serializer consumes it.
///
/// Kinds the serializer has no rule for (people, email, unique_id, ...) and
/// payloads that fail to parse are carried as `Unsupported` so they can be
/// logged and skipped instead of failing the document.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Title { title: Vec<RichTextRun> },
    RichText { rich_text: Vec<RichTextRun> },
    Select { select: Option<String> },
    MultiSelect { multi_select: Vec<String> },
    Status { status: Option<String> },
    Checkbox { checkbox: bool },
    Date { date: Option<DateValue> },
    CreatedTime { created_time: DateTime<Utc> },
    /// Kept as the JSON number so integers print without a fraction.
    Number { number: Option<serde_json::Number> },
    Url { url: Option<String> },
    Relation { relation: Vec<PageId> },
    Files { files: Vec<FileReference> },
    Formula { formula: Option<FormulaValue> },
    Rollup { rollup: RollupValue },
    Unsupported { kind: String },
}

impl PropertyValue {
    /// Returns the Notion API type name for this property value.
    pub fn type_name(&self) -> &str {
        match self {
            PropertyValue::Title { .. } => "title",
            PropertyValue::RichText { .. } => "rich_text",
            PropertyValue::Select { .. } => "select",
            PropertyValue::MultiSelect { .. } => "multi_select",
            PropertyValue::Status { .. } => "status",
            PropertyValue::Checkbox { .. } => "checkbox",
            PropertyValue::Date { .. } => "date",
            PropertyValue::CreatedTime { .. } => "created_time",
            PropertyValue::Number { .. } => "number",
            PropertyValue::Url { .. } => "url",
            PropertyValue::Relation { .. } => "relation",
            PropertyValue::Files { .. } => "files",
            PropertyValue::Formula { .. } => "formula",
            PropertyValue::Rollup { .. } => "rollup",
            PropertyValue::Unsupported { kind } => kind,
        }
    }

    /// Whether the value holds a date, for header key normalization.
    pub fn is_date_like(&self) -> bool {
        matches!(
            self,
            PropertyValue::Date { .. } | PropertyValue::CreatedTime { .. }
        )
    }
}

/// Start (and optional end) of a date property, normalized to UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct DateValue {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

/// One entry of a `files` property.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReference {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    String(Option<String>),
    Number(Option<serde_json::Number>),
    Boolean(bool),
    Date(Option<DateValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RollupValue {
    /// Each entry is a full property value; only formulas are rendered.
    Array(Vec<PropertyValue>),
    Number(Option<serde_json::Number>),
    Date(Option<DateTime<Utc>>),
    /// Incomplete, unsupported or missing rollups.
    Other,
}
