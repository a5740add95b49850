use serde::Serialize;

pub const UNKNOWN_SENDER: &str = "Unknown";
pub const NO_SUBJECT: &str = "No Subject";
pub const UNKNOWN_DATE: &str = "Unknown Date";
pub const NO_BODY: &str = "No Body Found";

/// Maximum number of characters kept from the decoded body.
pub const PREVIEW_CHARS: usize = 200;

/// One exported row. Every field is always populated; missing data is
/// represented by the sentinel constants above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRecord {
    pub date: String,
    pub sender: String,
    pub subject: String,
    pub preview: String,
}

/// Where a field value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Message,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub value: String,
    pub origin: Origin,
}

impl FieldValue {
    pub fn message(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            origin: Origin::Message,
        }
    }

    pub fn fallback(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            origin: Origin::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == Origin::Fallback
    }
}

/// Same shape as [`NormalizedRecord`], but each field remembers whether it
/// was read from the message or substituted by a sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    pub date: FieldValue,
    pub sender: FieldValue,
    pub subject: FieldValue,
    pub preview: FieldValue,
}

impl ExtractedRecord {
    pub fn into_record(self) -> NormalizedRecord {
        NormalizedRecord {
            date: self.date.value,
            sender: self.sender.value,
            subject: self.subject.value,
            preview: self.preview.value,
        }
    }
}
