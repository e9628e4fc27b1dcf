//! Keyword trend aggregation
//!
//! Counts how often each keyword appears per day in the documents of a source
//! collection and writes one `{date, value, keyword, index}` record per day to a
//! destination collection.
//!
//! ```no_run
//! use keyword_trends::{config::Config, models::RunRequest, pipeline::Orchestrator, store::create_store};
//!
//! # async fn run() -> keyword_trends::error::Result<()> {
//! let config = Config::load()?;
//! let store = create_store(&config.store)?;
//! let orchestrator = Orchestrator::from_config(store, &config);
//!
//! let request = RunRequest::new(
//!     vec!["inflation".to_string(), "tariffs".to_string()],
//!     "news",
//!     "keyword-trends",
//!     "2024-01-01",
//!     "2024-01-31",
//! );
//! let summary = orchestrator.run(&request).await;
//! println!("{} records written", summary.records_written());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod scheduler;
pub mod store;

pub use config::Config;
pub use error::{AppError, Result};
pub use models::{FrequencyMap, KeywordResult, MatchedDocument, RunRequest, WriteRecord};
pub use pipeline::{FrequencyAggregator, Orchestrator, ResultWriter, RunSummary};
pub use store::{create_store, DocumentStore};
