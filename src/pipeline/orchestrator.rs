use super::aggregator::{AggregationStats, FrequencyAggregator};
use super::metrics::{KeywordOutcome, PIPELINE_METRICS};
use super::pool::WorkerPool;
use super::writer::{ResultWriter, WriteStats};
use crate::config::{Config, PipelineConfig};
use crate::models::{FrequencyMap, KeywordResult, RunRequest};
use crate::store::DocumentStore;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

/// What happened to one keyword during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSummary {
    pub keyword: String,

    /// Final per-day counts, empty when the job failed
    pub frequencies: FrequencyMap,

    /// The aggregation job panicked
    pub failed: bool,

    /// Absent when the job failed before reporting
    pub aggregation: Option<AggregationStats>,

    pub write: WriteStats,
}

impl KeywordSummary {
    pub fn total_occurrences(&self) -> u64 {
        self.frequencies.values().sum()
    }
}

/// Telemetry for one run. Nothing in here is an error to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub source_collection: String,
    pub destination_collection: String,
    pub start_date: String,
    pub end_date: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,

    /// One entry per requested keyword, in request order
    pub keywords: Vec<KeywordSummary>,
}

impl RunSummary {
    pub fn records_written(&self) -> usize {
        self.keywords.iter().map(|k| k.write.written).sum()
    }

    pub fn failed_keywords(&self) -> usize {
        self.keywords.iter().filter(|k| k.failed).count()
    }

    /// Keyword results as handed to the writer
    pub fn results(&self) -> Vec<KeywordResult> {
        self.keywords
            .iter()
            .map(|k| KeywordResult::new(k.keyword.clone(), k.frequencies.clone()))
            .collect()
    }
}

struct KeywordRun {
    index: usize,
    result: KeywordResult,
    stats: Option<AggregationStats>,
}

/// Top-level batch driver.
///
/// Runs one aggregation job per keyword on a bounded pool, waits for all of
/// them, then writes every non-empty result. A failing keyword never affects
/// the others.
pub struct Orchestrator {
    aggregator: Arc<FrequencyAggregator>,
    writer: ResultWriter,
    keyword_workers: usize,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn DocumentStore>, config: &PipelineConfig, page_size: usize) -> Self {
        Self::with_parts(
            FrequencyAggregator::new(Arc::clone(&store), config, page_size),
            ResultWriter::new(store, config),
            config.keyword_workers,
        )
    }

    pub fn from_config(store: Arc<dyn DocumentStore>, config: &Config) -> Self {
        Self::new(store, &config.pipeline, config.store.page_size)
    }

    /// Assemble from prepared stages
    pub fn with_parts(
        aggregator: FrequencyAggregator,
        writer: ResultWriter,
        keyword_workers: usize,
    ) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            writer,
            keyword_workers,
        }
    }

    pub async fn run(&self, request: &RunRequest) -> RunSummary {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let started = Instant::now();

        info!(
            run_id = %run_id,
            keywords = request.keywords.len(),
            source = %request.source_collection,
            destination = %request.destination_collection,
            start_date = %request.start_date,
            end_date = %request.end_date,
            "Starting keyword trend run"
        );

        let source: Arc<str> = Arc::from(request.source_collection.as_str());
        let start_date: Arc<str> = Arc::from(request.start_date.as_str());
        let end_date: Arc<str> = Arc::from(request.end_date.as_str());
        let mut pool = WorkerPool::new("keywords", self.keyword_workers);

        for (index, keyword) in request.keywords.iter().enumerate() {
            let aggregator = Arc::clone(&self.aggregator);
            let source = Arc::clone(&source);
            let start_date = Arc::clone(&start_date);
            let end_date = Arc::clone(&end_date);
            let keyword = keyword.clone();

            pool.submit(async move {
                let job = aggregator.aggregate_with_stats(&source, &keyword, &start_date, &end_date);
                let outcome = AssertUnwindSafe(job).catch_unwind().await;

                match outcome {
                    Ok((frequencies, stats)) => KeywordRun {
                        index,
                        result: KeywordResult::new(keyword, frequencies),
                        stats: Some(stats),
                    },
                    Err(panic) => {
                        error!(
                            keyword = %keyword,
                            panic = %panic_message(panic.as_ref()),
                            "Keyword job failed, recording empty result"
                        );
                        KeywordRun {
                            index,
                            result: KeywordResult::empty(keyword),
                            stats: None,
                        }
                    }
                }
            });
        }

        let outcome = pool.join().await;

        let mut runs: Vec<Option<KeywordRun>> = request.keywords.iter().map(|_| None).collect();
        for run in outcome.results {
            let index = run.index;
            runs[index] = Some(run);
        }

        let mut keywords = Vec::with_capacity(runs.len());
        for (index, run) in runs.into_iter().enumerate() {
            let run = run.unwrap_or_else(|| KeywordRun {
                index,
                result: KeywordResult::empty(request.keywords[index].clone()),
                stats: None,
            });

            let write = if run.result.is_empty() {
                WriteStats::default()
            } else {
                self.writer
                    .write(
                        &request.source_collection,
                        &run.result.frequencies,
                        &run.result.keyword,
                        &request.destination_collection,
                    )
                    .await
            };

            let failed = run.stats.is_none();
            PIPELINE_METRICS.record_keyword(match (failed, run.result.is_empty()) {
                (true, _) => KeywordOutcome::Failed,
                (false, true) => KeywordOutcome::Empty,
                (false, false) => KeywordOutcome::Counted,
            });

            keywords.push(KeywordSummary {
                keyword: run.result.keyword,
                frequencies: run.result.frequencies,
                failed,
                aggregation: run.stats,
                write,
            });
        }

        let summary = RunSummary {
            run_id,
            source_collection: request.source_collection.clone(),
            destination_collection: request.destination_collection.clone(),
            start_date: request.start_date.clone(),
            end_date: request.end_date.clone(),
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
            keywords,
        };

        info!(
            run_id = %run_id,
            keywords = summary.keywords.len(),
            failed_keywords = summary.failed_keywords(),
            records_written = summary.records_written(),
            duration_ms = summary.duration_ms,
            "Keyword trend run completed"
        );

        summary
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
