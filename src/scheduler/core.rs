//! Cron service driving trend jobs

use super::{
    config::{SchedulerConfig, TrendJobConfig},
    error::{SchedulerError, SchedulerResult},
    jobs::{TrendJob, TrendRun},
    metrics::SCHEDULER_METRICS,
};
use crate::pipeline::{Orchestrator, RunSummary};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler, JobSchedulerError};
use tracing::{info, warn};

/// Fires configured trend jobs on their cron schedules
pub struct SchedulerService {
    config: SchedulerConfig,
    scheduler: JobScheduler,

    /// Registered jobs by name
    jobs: DashMap<String, Arc<TrendJob>>,

    running: tokio::sync::RwLock<bool>,
}

impl SchedulerService {
    pub async fn new(config: SchedulerConfig) -> SchedulerResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| SchedulerError::StartupFailed(e.to_string()))?;

        Ok(Self {
            config,
            scheduler,
            jobs: DashMap::new(),
            running: tokio::sync::RwLock::new(false),
        })
    }

    /// Register every enabled job from the configuration.
    ///
    /// Stops at the first job with an invalid config, a bad cron expression
    /// or a name that is already taken. Returns the registered names.
    pub async fn register_trend_jobs(
        &self,
        orchestrator: Arc<Orchestrator>,
    ) -> SchedulerResult<Vec<String>> {
        let mut names = Vec::new();

        for job_config in self.config.enabled_jobs() {
            self.register(Arc::clone(&orchestrator), job_config.clone()).await?;
            names.push(job_config.name.clone());
        }

        SCHEDULER_METRICS.update_job_count(self.jobs.len());
        info!(jobs = names.len(), "Trend jobs registered");
        Ok(names)
    }

    async fn register(
        &self,
        orchestrator: Arc<Orchestrator>,
        config: TrendJobConfig,
    ) -> SchedulerResult<()> {
        config.check()?;
        if self.jobs.contains_key(&config.name) {
            return Err(SchedulerError::JobAlreadyExists(config.name));
        }

        let schedule = config.schedule.clone();
        let job = Arc::new(TrendJob::new(orchestrator, config));

        let fired = Arc::clone(&job);
        let cron_job = CronJob::new_async(schedule.as_str(), move |_uuid, _lock| {
            let job = Arc::clone(&fired);
            Box::pin(async move {
                // Outcome is logged and kept as the job's last run
                let _ = job.fire(Utc::now()).await;
            })
        })
        .map_err(|e: JobSchedulerError| {
            SchedulerError::InvalidCronExpression(format!("{} ({})", schedule, e))
        })?;

        let cron_id = self
            .scheduler
            .add(cron_job)
            .await
            .map_err(|e| SchedulerError::JobCreationFailed(e.to_string()))?;

        info!(
            job_name = %job.name(),
            schedule = %schedule,
            cron_id = %cron_id,
            "Trend job scheduled"
        );
        self.jobs.insert(job.name().to_string(), job);

        Ok(())
    }

    /// Start firing registered jobs; a no-op when the scheduler is disabled
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in configuration");
            return Ok(());
        }

        {
            let mut running = self.running.write().await;
            if *running {
                warn!("Scheduler is already running");
                return Ok(());
            }
            *running = true;
        }

        self.scheduler
            .start()
            .await
            .map_err(|e| SchedulerError::StartupFailed(e.to_string()))?;

        info!(jobs = self.jobs.len(), "Scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> SchedulerResult<()> {
        {
            let mut running = self.running.write().await;
            if !*running {
                return Ok(());
            }
            *running = false;
        }

        self.scheduler
            .shutdown()
            .await
            .map_err(|e| SchedulerError::ShutdownFailed(e.to_string()))?;

        info!("Scheduler shut down");
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Fire a registered job now, outside its schedule
    pub async fn trigger(&self, name: &str) -> SchedulerResult<RunSummary> {
        self.job(name)?.fire(Utc::now()).await
    }

    /// Outcome of the job's most recent firing, if it has fired
    pub async fn last_run(&self, name: &str) -> SchedulerResult<Option<TrendRun>> {
        Ok(self.job(name)?.last_run().await)
    }

    /// Names of registered jobs, sorted
    pub fn job_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.jobs.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    fn job(&self, name: &str) -> SchedulerResult<Arc<TrendJob>> {
        self.jobs
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| SchedulerError::JobNotFound(name.to_string()))
    }
}
