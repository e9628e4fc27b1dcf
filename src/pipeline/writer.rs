use super::metrics::{WriteOutcome, PIPELINE_METRICS};
use super::pool::{bounded_by_parallelism, WorkerPool};
use crate::config::PipelineConfig;
use crate::models::{FrequencyMap, WriteRecord};
use crate::store::{DocumentStore, StoreResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Bookkeeping for one keyword's writes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteStats {
    /// Records submitted
    pub attempted: usize,

    /// Records the destination accepted
    pub written: usize,

    /// Records rejected by the destination or whose write panicked
    pub failed: usize,

    /// Records still in flight when the join deadline passed
    pub cancelled: usize,

    /// The write join hit its deadline
    pub timed_out: bool,
}

/// Persists a frequency map as one record per day
pub struct ResultWriter {
    store: Arc<dyn DocumentStore>,
    workers: usize,
    write_timeout: Duration,
}

impl ResultWriter {
    /// Writer whose pool is `max_write_workers` capped by available parallelism
    pub fn new(store: Arc<dyn DocumentStore>, config: &PipelineConfig) -> Self {
        Self {
            store,
            workers: bounded_by_parallelism(config.max_write_workers),
            write_timeout: Duration::from_secs(config.write_timeout_secs),
        }
    }

    /// Override the write join deadline
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Write every entry of `frequencies` to `destination_collection`.
    ///
    /// Each record is written independently; a rejected write is logged and
    /// does not affect its siblings. Writes still pending at the deadline are
    /// cancelled and lost for this run. Never fails the caller.
    pub async fn write(
        &self,
        source_collection: &str,
        frequencies: &FrequencyMap,
        keyword: &str,
        destination_collection: &str,
    ) -> WriteStats {
        let started = Instant::now();
        let mut stats = WriteStats {
            attempted: frequencies.len(),
            ..Default::default()
        };

        if frequencies.is_empty() {
            return stats;
        }

        let destination: Arc<str> = Arc::from(destination_collection);
        let mut pool = WorkerPool::new("writes", self.workers);

        for (&date, &value) in frequencies {
            let record = WriteRecord::new(date, value, keyword, source_collection);
            let store = Arc::clone(&self.store);
            let destination = Arc::clone(&destination);
            pool.submit(async move { write_record(store.as_ref(), &destination, record).await });
        }

        let outcome = pool.join_with_timeout(self.write_timeout).await;
        for result in &outcome.results {
            match result {
                Ok(()) => stats.written += 1,
                Err(_) => stats.failed += 1,
            }
        }
        stats.failed += outcome.failed;
        stats.cancelled = outcome.cancelled;
        stats.timed_out = outcome.timed_out;

        if outcome.timed_out {
            PIPELINE_METRICS.record_join_timeout("writes");
        }
        PIPELINE_METRICS.record_writes(WriteOutcome::Written, stats.written);
        PIPELINE_METRICS.record_writes(WriteOutcome::Failed, stats.failed);
        PIPELINE_METRICS.record_writes(WriteOutcome::Cancelled, stats.cancelled);

        let elapsed = started.elapsed();
        PIPELINE_METRICS
            .write_duration
            .with_label_values(&[self.store.backend_name()])
            .observe(elapsed.as_secs_f64());

        info!(
            keyword = %keyword,
            collection = %destination_collection,
            attempted = stats.attempted,
            written = stats.written,
            failed = stats.failed,
            cancelled = stats.cancelled,
            duration_ms = elapsed.as_millis() as u64,
            "Frequency records written"
        );

        stats
    }
}

async fn write_record(
    store: &dyn DocumentStore,
    destination: &str,
    record: WriteRecord,
) -> StoreResult<()> {
    match store.index(destination, &record).await {
        Ok(()) => {
            debug!(
                collection = %destination,
                keyword = %record.keyword,
                date = %record.date,
                value = record.value,
                "Record written"
            );
            Ok(())
        }
        Err(e) => {
            warn!(
                collection = %destination,
                keyword = %record.keyword,
                date = %record.date,
                error = %e,
                "Record write failed"
            );
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_writes_one_record_per_day() {
        let store = InMemoryStore::new();
        let writer = ResultWriter::new(Arc::new(store.clone()), &PipelineConfig::default());
        let frequencies = FrequencyMap::from([(day(1), 3), (day(2), 1)]);

        let stats = writer
            .write("news", &frequencies, "inflation", "trends")
            .await;

        assert_eq!(stats.attempted, 2);
        assert_eq!(stats.written, 2);
        assert_eq!(stats.failed, 0);

        let mut records = store.records("trends");
        records.sort_by_key(|r| r.date);
        assert_eq!(
            records,
            vec![
                WriteRecord::new(day(1), 3, "inflation", "news"),
                WriteRecord::new(day(2), 1, "inflation", "news"),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_map_writes_nothing() {
        let store = InMemoryStore::new();
        let writer = ResultWriter::new(Arc::new(store.clone()), &PipelineConfig::default());

        let stats = writer
            .write("news", &FrequencyMap::new(), "inflation", "trends")
            .await;

        assert_eq!(stats, WriteStats::default());
        assert_eq!(store.record_count("trends"), 0);
    }

    #[test]
    fn test_pool_size_is_capped() {
        let config = PipelineConfig {
            max_write_workers: 10_000,
            ..Default::default()
        };
        let writer = ResultWriter::new(Arc::new(InMemoryStore::new()), &config);
        assert!(writer.workers() >= 1);
        assert!(writer.workers() < 10_000);
    }
}
