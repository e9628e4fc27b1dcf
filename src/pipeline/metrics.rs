//! Prometheus metrics for the aggregation pipeline

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};
use strum::AsRefStr;

/// How a keyword job ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum KeywordOutcome {
    /// Produced a non-empty map
    Counted,
    /// Finished without any occurrences
    Empty,
    /// The job panicked and was replaced by an empty result
    Failed,
}

/// How a single document unit ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum DocumentOutcome {
    Counted,
    Skipped,
    Failed,
    Cancelled,
}

/// How a single record write ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum WriteOutcome {
    Written,
    Failed,
    Cancelled,
}

/// Pipeline metrics collection
pub struct PipelineMetrics {
    /// Keyword jobs by outcome
    pub keywords_total: CounterVec,

    /// Documents processed by outcome
    pub documents_total: CounterVec,

    /// Store queries that failed
    pub query_failures_total: CounterVec,

    /// Records written by outcome
    pub records_total: CounterVec,

    /// Pool joins that hit their deadline
    pub join_timeouts_total: CounterVec,

    /// Per-keyword aggregation duration in seconds
    pub aggregation_duration: HistogramVec,

    /// Per-keyword write duration in seconds
    pub write_duration: HistogramVec,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            keywords_total: register_counter_vec!(
                "keyword_trends_keywords_total",
                "Total number of keyword jobs by outcome",
                &["outcome"]
            )
            .unwrap(),

            documents_total: register_counter_vec!(
                "keyword_trends_documents_total",
                "Total number of matched documents by outcome",
                &["outcome"]
            )
            .unwrap(),

            query_failures_total: register_counter_vec!(
                "keyword_trends_query_failures_total",
                "Total number of failed store queries",
                &["backend"]
            )
            .unwrap(),

            records_total: register_counter_vec!(
                "keyword_trends_records_total",
                "Total number of frequency records by write outcome",
                &["outcome"]
            )
            .unwrap(),

            join_timeouts_total: register_counter_vec!(
                "keyword_trends_join_timeouts_total",
                "Total number of pool joins that hit their deadline",
                &["pool"]
            )
            .unwrap(),

            aggregation_duration: register_histogram_vec!(
                "keyword_trends_aggregation_duration_seconds",
                "Per-keyword aggregation duration in seconds",
                &["backend"],
                vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0]
            )
            .unwrap(),

            write_duration: register_histogram_vec!(
                "keyword_trends_write_duration_seconds",
                "Per-keyword write duration in seconds",
                &["backend"],
                vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0]
            )
            .unwrap(),
        }
    }

    pub fn record_keyword(&self, outcome: KeywordOutcome) {
        self.keywords_total
            .with_label_values(&[outcome.as_ref()])
            .inc();
    }

    pub fn record_documents(&self, outcome: DocumentOutcome, count: usize) {
        if count > 0 {
            self.documents_total
                .with_label_values(&[outcome.as_ref()])
                .inc_by(count as f64);
        }
    }

    pub fn record_writes(&self, outcome: WriteOutcome, count: usize) {
        if count > 0 {
            self.records_total
                .with_label_values(&[outcome.as_ref()])
                .inc_by(count as f64);
        }
    }

    pub fn record_query_failure(&self, backend: &str) {
        self.query_failures_total.with_label_values(&[backend]).inc();
    }

    pub fn record_join_timeout(&self, pool: &str) {
        self.join_timeouts_total.with_label_values(&[pool]).inc();
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    /// Global pipeline metrics instance
    pub static ref PIPELINE_METRICS: PipelineMetrics = PipelineMetrics::new();
}

/// Initialize pipeline metrics (idempotent)
pub fn init_pipeline_metrics() {
    lazy_static::initialize(&PIPELINE_METRICS);
}

/// Render every registered metric in the Prometheus text exposition format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
