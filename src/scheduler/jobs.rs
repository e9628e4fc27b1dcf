//! Registered trend jobs

use super::config::TrendJobConfig;
use super::error::SchedulerResult;
use super::metrics::SCHEDULER_METRICS;
use super::tasks::run_trend_job;
use crate::pipeline::{Orchestrator, RunSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

/// What happened the last time a trend job fired
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRun {
    pub fired_at: DateTime<Utc>,

    /// Pipeline run id, absent when the request was rejected before running
    pub run_id: Option<Uuid>,

    pub records_written: usize,
    pub failed_keywords: usize,
    pub duration_ms: u64,

    /// Why the job could not run
    pub error: Option<String>,
}

/// One configured trend job bound to the pipeline it drives
pub struct TrendJob {
    config: TrendJobConfig,
    orchestrator: Arc<Orchestrator>,
    last_run: RwLock<Option<TrendRun>>,
}

impl TrendJob {
    pub fn new(orchestrator: Arc<Orchestrator>, config: TrendJobConfig) -> Self {
        Self {
            config,
            orchestrator,
            last_run: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub async fn last_run(&self) -> Option<TrendRun> {
        self.last_run.read().await.clone()
    }

    /// Run the window ending on `fired_at`'s UTC date and remember the outcome
    pub async fn fire(&self, fired_at: DateTime<Utc>) -> SchedulerResult<RunSummary> {
        let name = self.name();
        SCHEDULER_METRICS.record_execution_start(name);

        let started = Instant::now();
        let result = run_trend_job(&self.orchestrator, &self.config, fired_at.date_naive()).await;
        let elapsed = started.elapsed();
        let duration_ms = elapsed.as_millis() as u64;

        SCHEDULER_METRICS.record_execution_complete(name, result.is_ok(), elapsed.as_secs_f64());

        let run = match &result {
            Ok(summary) => {
                info!(job_name = %name, run_id = %summary.run_id, duration_ms, "Trend job fired");
                TrendRun {
                    fired_at,
                    run_id: Some(summary.run_id),
                    records_written: summary.records_written(),
                    failed_keywords: summary.failed_keywords(),
                    duration_ms,
                    error: None,
                }
            }
            Err(e) => {
                error!(job_name = %name, error = %e, duration_ms, "Trend job could not run");
                TrendRun {
                    fired_at,
                    run_id: None,
                    records_written: 0,
                    failed_keywords: 0,
                    duration_ms,
                    error: Some(e.to_string()),
                }
            }
        };
        *self.last_run.write().await = Some(run);

        result
    }
}
