use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Identifier of a field, unique within one form.
pub type FieldId = u64;

/// Identifier of a persisted submission (milliseconds since the Unix epoch at creation).
pub type SubmissionId = i64;

/// Options every choice-bearing field starts with.
pub const DEFAULT_OPTIONS: [&str; 2] = ["Option 1", "Option 2"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Header,
    Label,
    Paragraph,
    Linebreak,
    Text,
    Number,
    Dropdown,
    Checkboxes,
    MultipleChoice,
    Tags,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Header => "header",
            FieldType::Label => "label",
            FieldType::Paragraph => "paragraph",
            FieldType::Linebreak => "linebreak",
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Dropdown => "dropdown",
            FieldType::Checkboxes => "checkboxes",
            FieldType::MultipleChoice => "multipleChoice",
            FieldType::Tags => "tags",
            FieldType::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "header" => FieldType::Header,
            "label" => FieldType::Label,
            "paragraph" => FieldType::Paragraph,
            "linebreak" => FieldType::Linebreak,
            "text" => FieldType::Text,
            "number" => FieldType::Number,
            "dropdown" => FieldType::Dropdown,
            "checkboxes" => FieldType::Checkboxes,
            "multipleChoice" => FieldType::MultipleChoice,
            "tags" => FieldType::Tags,
            other => FieldType::Other(other.to_string()),
        }
    }

    /// All known variants in palette order.
    pub fn all() -> Vec<FieldType> {
        vec![
            FieldType::Header,
            FieldType::Label,
            FieldType::Paragraph,
            FieldType::Linebreak,
            FieldType::Text,
            FieldType::Number,
            FieldType::Dropdown,
            FieldType::Checkboxes,
            FieldType::MultipleChoice,
            FieldType::Tags,
        ]
    }

    /// Whether the variant produces a value and takes part in required validation.
    pub fn is_interactive(&self) -> bool {
        matches!(
            self,
            FieldType::Text
                | FieldType::Number
                | FieldType::Dropdown
                | FieldType::Checkboxes
                | FieldType::MultipleChoice
                | FieldType::Tags
        )
    }

    /// Whether the variant carries an option list.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            FieldType::Dropdown | FieldType::Checkboxes | FieldType::MultipleChoice
        )
    }

    /// Placeholder label for a new field, e.g. "MultipleChoice Label".
    pub fn default_label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!("{}{} Label", first.to_uppercase(), chars.as_str()),
            None => "Label".to_string(),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(FieldType::parse(&s))
    }
}

/// A single form element definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Field {
    pub fn new(id: FieldId, field_type: FieldType) -> Self {
        let options = if field_type.has_options() {
            DEFAULT_OPTIONS.iter().map(|o| o.to_string()).collect()
        } else {
            Vec::new()
        };

        Self {
            id,
            label: field_type.default_label(),
            field_type,
            required: false,
            options,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }
}

/// The value entered for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Empty strings and empty lists both count as "no value".
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::Text(_) => None,
            FieldValue::List(items) => Some(items),
        }
    }

    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(", "),
        }
    }
}

/// Immutable snapshot persisted after a successful submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub id: SubmissionId,
    pub title: String,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub data: BTreeMap<FieldId, FieldValue>,
    pub fields: Vec<Field>,
}

impl FormSubmission {
    pub fn value_for(&self, field_id: FieldId) -> Option<&FieldValue> {
        self.data.get(&field_id)
    }

    /// Number of interactive fields in the snapshot that received a non-empty value.
    pub fn answered_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| f.field_type.is_interactive())
            .filter(|f| self.value_for(f.id).map_or(false, |v| !v.is_empty()))
            .count()
    }
}

/// ISO-8601 with exactly three fractional digits, e.g. `2024-01-01T00:00:00.000Z`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}
