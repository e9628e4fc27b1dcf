use super::document::DateKey;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-day occurrence counts for one keyword, sorted by day
pub type FrequencyMap = BTreeMap<DateKey, u64>;

/// Count case-insensitive, non-overlapping literal occurrences of `keyword` in `text`.
///
/// Matches are substring matches: "inflation" is counted inside "hyperinflation".
/// An empty keyword never matches.
pub fn count_occurrences(text: &str, keyword: &str) -> u64 {
    if keyword.is_empty() {
        return 0;
    }

    let text = text.to_lowercase();
    let keyword = keyword.to_lowercase();

    text.matches(keyword.as_str()).count() as u64
}

/// Frequency map under construction, shared by concurrent document workers
#[derive(Debug, Default)]
pub struct ConcurrentFrequencies {
    counts: DashMap<DateKey, u64>,
}

impl ConcurrentFrequencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` to the day's total.
    ///
    /// The read-modify-write happens under the shard lock for `date`, so
    /// concurrent merges on the same day are never lost. A zero count does not
    /// create an entry.
    pub fn merge(&self, date: DateKey, count: u64) {
        if count == 0 {
            return;
        }

        self.counts
            .entry(date)
            .and_modify(|total| *total += count)
            .or_insert(count);
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sorted copy of everything merged so far
    pub fn snapshot(&self) -> FrequencyMap {
        self.counts
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect()
    }
}

/// Outcome of one keyword's aggregation job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordResult {
    pub keyword: String,
    pub frequencies: FrequencyMap,
}

impl KeywordResult {
    pub fn new(keyword: impl Into<String>, frequencies: FrequencyMap) -> Self {
        Self {
            keyword: keyword.into(),
            frequencies,
        }
    }

    /// Result recorded for a keyword whose job failed
    pub fn empty(keyword: impl Into<String>) -> Self {
        Self::new(keyword, FrequencyMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Sum of all per-day counts
    pub fn total_occurrences(&self) -> u64 {
        self.frequencies.values().sum()
    }
}
