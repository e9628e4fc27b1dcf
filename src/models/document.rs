use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Calendar day used as the aggregation bucket
pub type DateKey = NaiveDate;

/// Publication date as stored on a document.
///
/// Stores are inconsistent about this field: some write a single ISO-8601
/// string, others a list of strings where the first entry is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublishedDate {
    /// `"2024-02-10T08:00:00Z"`
    Single(String),
    /// `["2024-02-10T08:00:00Z", ...]`
    Many(Vec<String>),
    /// Any other JSON shape (numbers, objects, mixed lists)
    Other(Value),
}

impl PublishedDate {
    /// Resolve the publication date to a day, dropping any time component
    pub fn date_key(&self) -> Result<DateKey, DocumentError> {
        match self {
            PublishedDate::Single(raw) => parse_date_key(raw),
            PublishedDate::Many(values) => values
                .first()
                .ok_or(DocumentError::EmptyDateList)
                .and_then(|raw| parse_date_key(raw)),
            PublishedDate::Other(value) => {
                Err(DocumentError::UnsupportedDateShape(value.to_string()))
            }
        }
    }
}

impl From<&str> for PublishedDate {
    fn from(value: &str) -> Self {
        PublishedDate::Single(value.to_string())
    }
}

impl From<Vec<&str>> for PublishedDate {
    fn from(values: Vec<&str>) -> Self {
        PublishedDate::Many(values.into_iter().map(String::from).collect())
    }
}

/// Parse an ISO-8601 date or date-time string into a day.
///
/// Everything from the first `T` (or space) on is discarded, so
/// `2024-02-10T23:59:59-05:00` is bucketed on 2024-02-10 regardless of offset.
pub fn parse_date_key(raw: &str) -> Result<DateKey, DocumentError> {
    let trimmed = raw.trim();
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| DocumentError::InvalidDate {
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Why a single matched document could not be counted
#[derive(Debug, Clone, PartialEq, Eq, Error, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum DocumentError {
    #[error("document has no text field")]
    MissingText,

    #[error("document has no publication date")]
    MissingDate,

    #[error("publication date list is empty")]
    EmptyDateList,

    #[error("unsupported publication date shape: {0}")]
    UnsupportedDateShape(String),

    #[error("invalid publication date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },
}

/// The part of a stored document the aggregation needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchedDocument {
    /// Store-assigned identifier, if the store reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Free-text body
    #[serde(default)]
    pub text: Option<String>,

    /// Publication date
    #[serde(default)]
    pub published_date: Option<PublishedDate>,
}

impl MatchedDocument {
    pub fn new(text: impl Into<String>, published_date: impl Into<PublishedDate>) -> Self {
        Self {
            id: None,
            text: Some(text.into()),
            published_date: Some(published_date.into()),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Project a raw `_source` object using the configured field names.
    ///
    /// A non-string text value is treated as absent; a `null` date likewise.
    pub fn from_source(
        id: Option<String>,
        source: &Value,
        text_field: &str,
        date_field: &str,
    ) -> Self {
        let text = source
            .get(text_field)
            .and_then(Value::as_str)
            .map(String::from);

        let published_date = source
            .get(date_field)
            .filter(|value| !value.is_null())
            .map(|value| {
                serde_json::from_value(value.clone())
                    .unwrap_or_else(|_| PublishedDate::Other(value.clone()))
            });

        Self {
            id,
            text,
            published_date,
        }
    }

    /// Text and day of this document, or the reason it must be skipped
    pub fn extract(&self) -> Result<(&str, DateKey), DocumentError> {
        let text = self.text.as_deref().ok_or(DocumentError::MissingText)?;
        let date = self
            .published_date
            .as_ref()
            .ok_or(DocumentError::MissingDate)?
            .date_key()?;

        Ok((text, date))
    }

    /// Label used in logs when the store gave no id
    pub fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or("<unknown>")
    }
}
