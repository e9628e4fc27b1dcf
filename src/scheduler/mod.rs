//! Cron-driven trend runs
//!
//! Each configured job fires on a six-field cron expression (seconds first)
//! and runs the pipeline over a trailing window ending on the current UTC
//! date. The scheduler is just another caller of [`Orchestrator::run`]; it
//! keeps the outcome of each job's latest firing. Built on
//! tokio-cron-scheduler.
//!
//! [`Orchestrator::run`]: crate::pipeline::Orchestrator::run
//!
//! # Example
//!
//! ```no_run
//! use keyword_trends::config::PipelineConfig;
//! use keyword_trends::pipeline::Orchestrator;
//! use keyword_trends::scheduler::{SchedulerConfigBuilder, SchedulerService, TrendJobConfig};
//! use keyword_trends::store::InMemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator =
//!         Orchestrator::new(Arc::new(InMemoryStore::new()), &PipelineConfig::default(), 1000);
//!     let config = SchedulerConfigBuilder::new()
//!         .enabled(true)
//!         .job(TrendJobConfig::new(
//!             "nightly",
//!             "0 53 21 * * *",
//!             vec!["inflation".to_string()],
//!             "news",
//!             "keyword-trends",
//!         ))
//!         .build();
//!     let mut scheduler = SchedulerService::new(config).await?;
//!     scheduler.register_trend_jobs(Arc::new(orchestrator)).await?;
//!
//!     scheduler.start().await?;
//!     tokio::signal::ctrl_c().await?;
//!     scheduler.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod jobs;
mod metrics;
mod tasks;

pub use config::{SchedulerConfig, SchedulerConfigBuilder, TrendJobConfig};
pub use core::SchedulerService;
pub use error::{SchedulerError, SchedulerResult};
pub use jobs::{TrendJob, TrendRun};
pub use metrics::{init_scheduler_metrics, SCHEDULER_METRICS};
pub use tasks::{run_trend_job, today_utc, trend_request};
