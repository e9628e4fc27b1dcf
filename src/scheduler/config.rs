//! Configuration for the scheduler module

use super::error::{SchedulerError, SchedulerResult};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Configuration for the scheduler service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the scheduler is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Recurring trend runs
    #[serde(default)]
    pub jobs: Vec<TrendJobConfig>,
}

impl SchedulerConfig {
    /// Jobs that should be registered
    pub fn enabled_jobs(&self) -> impl Iterator<Item = &TrendJobConfig> {
        self.jobs.iter().filter(|job| job.enabled)
    }
}

/// One recurring run over a trailing window ending today (UTC)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TrendJobConfig {
    /// Job name, unique within the scheduler
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    /// Six-field cron expression (seconds first), e.g. `0 53 21 * * *`
    #[validate(length(min = 1))]
    pub schedule: String,

    /// Whether this job is registered
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[validate(length(min = 1))]
    pub keywords: Vec<String>,

    #[validate(length(min = 1, max = 255))]
    pub source_collection: String,

    #[validate(length(min = 1, max = 255))]
    pub destination_collection: String,

    /// Days before today included in the window
    #[serde(default = "default_lookback_days")]
    #[validate(range(max = 3650))]
    pub lookback_days: u32,
}

impl TrendJobConfig {
    pub fn new(
        name: impl Into<String>,
        schedule: impl Into<String>,
        keywords: Vec<String>,
        source_collection: impl Into<String>,
        destination_collection: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            schedule: schedule.into(),
            enabled: true,
            keywords,
            source_collection: source_collection.into(),
            destination_collection: destination_collection.into(),
            lookback_days: default_lookback_days(),
        }
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    /// Reject jobs that could never produce a usable request
    pub fn check(&self) -> SchedulerResult<()> {
        self.validate()
            .map_err(|e| SchedulerError::ConfigurationError(format!("job '{}': {}", self.name, e)))
    }
}

fn default_true() -> bool {
    true
}

fn default_lookback_days() -> u32 {
    1
}

/// Builder for SchedulerConfig
pub struct SchedulerConfigBuilder {
    config: SchedulerConfig,
}

impl SchedulerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn job(mut self, job: TrendJobConfig) -> Self {
        self.config.jobs.push(job);
        self
    }

    pub fn build(self) -> SchedulerConfig {
        self.config
    }
}

impl Default for SchedulerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> TrendJobConfig {
        TrendJobConfig::new(
            "nightly",
            "0 53 21 * * *",
            vec!["inflation".to_string()],
            "news",
            "keyword-trends",
        )
    }

    #[test]
    fn test_disabled_by_default() {
        let config = SchedulerConfig::default();
        assert!(!config.enabled);
        assert!(config.jobs.is_empty());
    }

    #[test]
    fn test_builder_and_enabled_jobs() {
        let mut paused = job();
        paused.name = "paused".to_string();
        paused.enabled = false;

        let config = SchedulerConfigBuilder::new()
            .enabled(true)
            .job(job())
            .job(paused)
            .build();

        let names: Vec<_> = config.enabled_jobs().map(|j| j.name.as_str()).collect();
        assert!(config.enabled);
        assert_eq!(names, vec!["nightly"]);
    }

    #[test]
    fn test_job_check() {
        assert!(job().check().is_ok());

        let mut no_keywords = job();
        no_keywords.keywords.clear();
        assert!(matches!(
            no_keywords.check(),
            Err(SchedulerError::ConfigurationError(_))
        ));

        assert!(job().with_lookback_days(3650).check().is_ok());
        assert!(matches!(
            job().with_lookback_days(u32::MAX).check(),
            Err(SchedulerError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_job_deserialize_defaults() {
        let job: TrendJobConfig = serde_json::from_value(serde_json::json!({
            "name": "nightly",
            "schedule": "0 0 1 * * *",
            "keywords": ["rates"],
            "source_collection": "news",
            "destination_collection": "trends"
        }))
        .unwrap();

        assert!(job.enabled);
        assert_eq!(job.lookback_days, 1);
    }
}
