//! Keyword frequency pipeline
//!
//! A run fans out one aggregation job per keyword. Each job queries the store
//! once and counts the matched documents concurrently into a per-day map, and
//! every non-empty map is then written back one record per day. The three
//! stages each run on their own bounded [`WorkerPool`], and no stage reports
//! failure to its caller.

mod aggregator;
pub mod metrics;
mod orchestrator;
mod pool;
mod writer;

pub use aggregator::{AggregationStats, FrequencyAggregator};
pub use metrics::{gather_metrics, init_pipeline_metrics, PIPELINE_METRICS};
pub use orchestrator::{KeywordSummary, Orchestrator, RunSummary};
pub use pool::{bounded_by_parallelism, PoolOutcome, WorkerPool};
pub use writer::{ResultWriter, WriteStats};
