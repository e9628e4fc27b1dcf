//! Scheduled keyword trend runs

use super::config::TrendJobConfig;
use super::error::{SchedulerError, SchedulerResult};
use crate::models::{DateKey, RunRequest};
use crate::pipeline::{Orchestrator, RunSummary};
use chrono::Utc;
use tracing::info;

/// Request for `config` covering `[today - lookback_days, today]`
pub fn trend_request(config: &TrendJobConfig, today: DateKey) -> SchedulerResult<RunRequest> {
    RunRequest::for_window(
        config.keywords.clone(),
        config.source_collection.clone(),
        config.destination_collection.clone(),
        today,
        config.lookback_days,
    )
    .map_err(|e| SchedulerError::JobExecutionFailed(format!("{}: {}", config.name, e)))
}

/// Run `config` once for the window ending on `today`.
///
/// Fails only when the request itself is unusable; individual keyword
/// failures are absorbed by the pipeline and show up in the summary.
pub async fn run_trend_job(
    orchestrator: &Orchestrator,
    config: &TrendJobConfig,
    today: DateKey,
) -> SchedulerResult<RunSummary> {
    let request = trend_request(config, today)?;
    request
        .check()
        .map_err(|e| SchedulerError::JobExecutionFailed(format!("{}: {}", config.name, e)))?;

    let summary = orchestrator.run(&request).await;

    info!(
        job_name = %config.name,
        run_id = %summary.run_id,
        start_date = %request.start_date,
        end_date = %request.end_date,
        records_written = summary.records_written(),
        failed_keywords = summary.failed_keywords(),
        "Scheduled trend run finished"
    );

    Ok(summary)
}

/// Today's date in UTC
pub fn today_utc() -> DateKey {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::models::MatchedDocument;
    use crate::store::InMemoryStore;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn config() -> TrendJobConfig {
        TrendJobConfig::new(
            "nightly",
            "0 53 21 * * *",
            vec!["inflation".to_string()],
            "news",
            "trends",
        )
        .with_lookback_days(7)
    }

    #[test]
    fn test_trend_request_window() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let request = trend_request(&config(), today).unwrap();

        assert_eq!(request.start_date, "2024-03-03");
        assert_eq!(request.end_date, "2024-03-10");
        assert_eq!(request.source_collection, "news");
        assert_eq!(request.destination_collection, "trends");
    }

    #[test]
    fn test_trend_request_rejects_unrepresentable_window() {
        let config = config().with_lookback_days(u32::MAX);
        let result = trend_request(&config, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());

        assert!(matches!(result, Err(SchedulerError::JobExecutionFailed(_))));
    }

    #[tokio::test]
    async fn test_run_trend_job_writes_window() {
        let store = InMemoryStore::new();
        store.insert_documents(
            "news",
            vec![
                MatchedDocument::new("inflation", "2024-03-09"),
                MatchedDocument::new("inflation", "2024-02-01"),
            ],
        );
        let orchestrator =
            Orchestrator::new(Arc::new(store.clone()), &PipelineConfig::default(), 1000);
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        let summary = run_trend_job(&orchestrator, &config(), today).await.unwrap();

        assert_eq!(summary.records_written(), 1);
        assert_eq!(store.records("trends")[0].date.to_string(), "2024-03-09");
    }

    #[tokio::test]
    async fn test_blank_keyword_fails_job() {
        let orchestrator = Orchestrator::new(
            Arc::new(InMemoryStore::new()),
            &PipelineConfig::default(),
            1000,
        );
        let mut config = config();
        config.keywords = vec![" ".to_string()];

        let result = run_trend_job(&orchestrator, &config, today_utc()).await;
        assert!(matches!(result, Err(SchedulerError::JobExecutionFailed(_))));
    }
}
