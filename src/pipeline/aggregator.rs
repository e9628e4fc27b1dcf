use super::metrics::{DocumentOutcome, PIPELINE_METRICS};
use super::pool::WorkerPool;
use crate::config::PipelineConfig;
use crate::models::{
    count_occurrences, ConcurrentFrequencies, DocumentError, FrequencyMap, MatchedDocument,
};
use crate::store::{DocumentStore, KeywordQuery};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Bookkeeping for one keyword's aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationStats {
    /// Documents returned by the query
    pub matched: usize,

    /// Documents whose occurrences were merged
    pub counted: usize,

    /// Documents skipped for missing or malformed fields
    pub skipped: usize,

    /// Document units that panicked
    pub failed: usize,

    /// Document units cancelled by the join deadline
    pub cancelled: usize,

    /// The store query itself failed
    pub query_failed: bool,

    /// The document join hit its deadline
    pub timed_out: bool,
}

/// Builds a per-day frequency map for one keyword.
///
/// Issues a single query against the source collection, then counts every
/// returned document on a bounded pool, merging into a shared concurrent map.
/// Nothing here fails the caller: a failed query yields an empty map and a
/// broken document is skipped.
pub struct FrequencyAggregator {
    store: Arc<dyn DocumentStore>,
    document_workers: usize,
    document_timeout: Duration,
    page_size: usize,
}

impl FrequencyAggregator {
    pub fn new(store: Arc<dyn DocumentStore>, config: &PipelineConfig, page_size: usize) -> Self {
        Self {
            store,
            document_workers: config.document_workers,
            document_timeout: Duration::from_secs(config.document_timeout_secs),
            page_size,
        }
    }

    /// Override the document join deadline
    pub fn with_document_timeout(mut self, timeout: Duration) -> Self {
        self.document_timeout = timeout;
        self
    }

    /// Per-day occurrence counts of `keyword` within `[start_date, end_date]`
    pub async fn aggregate(
        &self,
        source_collection: &str,
        keyword: &str,
        start_date: &str,
        end_date: &str,
    ) -> FrequencyMap {
        self.aggregate_with_stats(source_collection, keyword, start_date, end_date)
            .await
            .0
    }

    /// Same as [`aggregate`](Self::aggregate), also reporting what happened
    /// to each matched document
    pub async fn aggregate_with_stats(
        &self,
        source_collection: &str,
        keyword: &str,
        start_date: &str,
        end_date: &str,
    ) -> (FrequencyMap, AggregationStats) {
        let started = Instant::now();
        let mut stats = AggregationStats::default();

        let query = KeywordQuery::new(keyword, start_date, end_date).with_size(self.page_size);
        let documents = match self.store.search(source_collection, &query).await {
            Ok(documents) => documents,
            Err(e) => {
                warn!(
                    collection = %source_collection,
                    keyword = %keyword,
                    error = %e,
                    "Keyword query failed, returning empty frequencies"
                );
                PIPELINE_METRICS.record_query_failure(self.store.backend_name());
                stats.query_failed = true;
                return (FrequencyMap::new(), stats);
            }
        };

        stats.matched = documents.len();
        if documents.len() >= self.page_size {
            warn!(
                keyword = %keyword,
                page_size = self.page_size,
                "Query hit the page size; later matches are not counted"
            );
        }

        let frequencies = Arc::new(ConcurrentFrequencies::new());
        let keyword: Arc<str> = Arc::from(keyword);
        let mut pool = WorkerPool::new("documents", self.document_workers);

        for document in documents {
            let frequencies = Arc::clone(&frequencies);
            let keyword = Arc::clone(&keyword);
            pool.submit(async move { count_document(&document, &keyword, &frequencies) });
        }

        let outcome = pool.join_with_timeout(self.document_timeout).await;
        for result in &outcome.results {
            match result {
                Ok(_) => stats.counted += 1,
                Err(_) => stats.skipped += 1,
            }
        }
        stats.failed = outcome.failed;
        stats.cancelled = outcome.cancelled;
        stats.timed_out = outcome.timed_out;

        if outcome.timed_out {
            PIPELINE_METRICS.record_join_timeout("documents");
        }
        PIPELINE_METRICS.record_documents(DocumentOutcome::Counted, stats.counted);
        PIPELINE_METRICS.record_documents(DocumentOutcome::Skipped, stats.skipped);
        PIPELINE_METRICS.record_documents(DocumentOutcome::Failed, stats.failed);
        PIPELINE_METRICS.record_documents(DocumentOutcome::Cancelled, stats.cancelled);

        let elapsed = started.elapsed();
        PIPELINE_METRICS
            .aggregation_duration
            .with_label_values(&[self.store.backend_name()])
            .observe(elapsed.as_secs_f64());

        let frequencies = frequencies.snapshot();
        info!(
            keyword = %keyword,
            matched = stats.matched,
            counted = stats.counted,
            skipped = stats.skipped,
            days = frequencies.len(),
            duration_ms = elapsed.as_millis() as u64,
            "Keyword aggregation completed"
        );

        (frequencies, stats)
    }
}

/// Count one document and merge it into the shared map.
///
/// Returns the number of occurrences merged, or why the document was skipped.
fn count_document(
    document: &MatchedDocument,
    keyword: &str,
    frequencies: &ConcurrentFrequencies,
) -> Result<u64, DocumentError> {
    let (text, day) = document.extract().map_err(|e| {
        let reason: &str = e.as_ref();
        warn!(
            document_id = %document.display_id(),
            reason,
            error = %e,
            "Skipping document"
        );
        e
    })?;

    let count = count_occurrences(text, keyword);
    frequencies.merge(day, count);
    debug!(document_id = %document.display_id(), date = %day, count, "Document counted");

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PublishedDate;
    use crate::store::InMemoryStore;
    use chrono::NaiveDate;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn aggregator(store: InMemoryStore) -> FrequencyAggregator {
        FrequencyAggregator::new(Arc::new(store), &PipelineConfig::default(), 1000)
    }

    #[test]
    fn test_count_document_merges() {
        let frequencies = ConcurrentFrequencies::new();
        let document = MatchedDocument::new("Inflation and more inflation", "2024-03-05T10:00:00");

        assert_eq!(count_document(&document, "inflation", &frequencies), Ok(2));
        assert_eq!(frequencies.snapshot().get(&day(2024, 3, 5)), Some(&2));
    }

    #[test]
    fn test_count_document_skips_bad_shapes() {
        let frequencies = ConcurrentFrequencies::new();

        let no_text = MatchedDocument {
            published_date: Some("2024-01-01".into()),
            ..Default::default()
        };
        let no_date = MatchedDocument {
            text: Some("inflation".to_string()),
            ..Default::default()
        };
        let odd_date = MatchedDocument {
            text: Some("inflation".to_string()),
            published_date: Some(PublishedDate::Other(json!(20240101))),
            ..Default::default()
        };

        assert_eq!(
            count_document(&no_text, "inflation", &frequencies),
            Err(DocumentError::MissingText)
        );
        assert_eq!(
            count_document(&no_date, "inflation", &frequencies),
            Err(DocumentError::MissingDate)
        );
        assert!(count_document(&odd_date, "inflation", &frequencies).is_err());
        assert!(frequencies.is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_sums_per_day() {
        let store = InMemoryStore::new();
        store.insert_documents(
            "news",
            vec![
                MatchedDocument::new("inflation up", "2024-01-01T08:00:00Z"),
                MatchedDocument::new("Inflation inflation", "2024-01-01T18:00:00Z"),
                MatchedDocument::new("INFLATION", vec!["2024-01-02"]),
            ],
        );

        let (frequencies, stats) = aggregator(store)
            .aggregate_with_stats("news", "inflation", "2024-01-01", "2024-01-31")
            .await;

        assert_eq!(frequencies.get(&day(2024, 1, 1)), Some(&3));
        assert_eq!(frequencies.get(&day(2024, 1, 2)), Some(&1));
        assert_eq!(stats.matched, 3);
        assert_eq!(stats.counted, 3);
        assert!(!stats.query_failed);
    }

    #[tokio::test]
    async fn test_query_failure_yields_empty_map() {
        let (frequencies, stats) = aggregator(InMemoryStore::new())
            .aggregate_with_stats("missing", "inflation", "2024-01-01", "2024-01-31")
            .await;

        assert!(frequencies.is_empty());
        assert!(stats.query_failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_document_deadline_returns_partial_map() {
        // Move the paused clock off zero so a zero deadline has already passed
        tokio::time::advance(Duration::from_millis(10)).await;

        let store = InMemoryStore::new();
        store.insert_documents(
            "news",
            (0..20).map(|i| {
                MatchedDocument::new("inflation", format!("2024-01-{:02}", i % 3 + 1).as_str())
            }),
        );
        let config = PipelineConfig {
            document_workers: 1,
            ..PipelineConfig::default()
        };
        let aggregator = FrequencyAggregator::new(Arc::new(store), &config, 1000)
            .with_document_timeout(Duration::ZERO);

        let (frequencies, stats) = aggregator
            .aggregate_with_stats("news", "inflation", "2024-01-01", "2024-01-31")
            .await;

        assert!(stats.timed_out);
        assert_eq!(stats.matched, 20);
        assert!(stats.cancelled > 0);
        assert_eq!(stats.counted + stats.skipped + stats.failed + stats.cancelled, 20);
        assert_eq!(frequencies.values().sum::<u64>(), stats.counted as u64);
        assert!(frequencies.keys().all(|d| *d >= day(2024, 1, 1) && *d <= day(2024, 1, 3)));
    }

    #[tokio::test]
    async fn test_page_size_caps_documents() {
        let store = InMemoryStore::new();
        store.insert_documents(
            "news",
            (0..5).map(|_| MatchedDocument::new("inflation", "2024-01-01")),
        );

        let aggregator =
            FrequencyAggregator::new(Arc::new(store), &PipelineConfig::default(), 3);
        let frequencies = aggregator
            .aggregate("news", "inflation", "2024-01-01", "2024-01-01")
            .await;

        assert_eq!(frequencies.get(&day(2024, 1, 1)), Some(&3));
    }
}
