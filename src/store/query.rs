//! Keyword query description

use serde::{Deserialize, Serialize};

/// Documents matching `keyword` published within `[start_date, end_date]`.
///
/// Both bounds are inclusive ISO-8601 strings passed to the store verbatim.
/// `size` caps the result to a single page; callers never page further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordQuery {
    pub keyword: String,
    pub start_date: String,
    pub end_date: String,
    pub size: usize,
}

impl KeywordQuery {
    pub fn new(
        keyword: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            size: 1000,
        }
    }

    /// Set the page size
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }
}
