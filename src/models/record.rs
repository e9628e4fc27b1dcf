use super::document::DateKey;
use serde::{Deserialize, Serialize};

/// One persisted (keyword, day, count) fact.
///
/// Serialized as `{"date": "2024-01-01", "value": 5, "keyword": "inflation", "index": "news"}`,
/// where `index` names the collection the counts were computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRecord {
    /// Day, written as an ISO-8601 date
    pub date: DateKey,

    /// Occurrences of the keyword on that day
    pub value: u64,

    /// Keyword as supplied to the run
    pub keyword: String,

    /// Source collection name
    #[serde(rename = "index")]
    pub source_collection: String,
}

impl WriteRecord {
    pub fn new(
        date: DateKey,
        value: u64,
        keyword: impl Into<String>,
        source_collection: impl Into<String>,
    ) -> Self {
        Self {
            date,
            value,
            keyword: keyword.into(),
            source_collection: source_collection.into(),
        }
    }
}
