//! Document store seam
//!
//! The pipeline talks to the store through [`DocumentStore`]: one keyword query
//! per aggregation job and one write per output record. Two backends ship with
//! the crate:
//!
//! - [`ElasticsearchStore`]: HTTP client for an Elasticsearch-compatible cluster
//! - [`InMemoryStore`]: process-local collections for development and tests
//!
//! Implementations must be safe to share across all worker pools at once.

mod elasticsearch;
mod error;
mod factory;
mod memory;
mod query;

pub use elasticsearch::ElasticsearchStore;
pub use error::{StoreError, StoreResult};
pub use factory::{create_in_memory_store, create_store};
pub use memory::InMemoryStore;
pub use query::KeywordQuery;

use crate::models::{MatchedDocument, WriteRecord};
use async_trait::async_trait;

/// Trait for document store operations
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run a keyword query against `collection`, returning at most `query.size` documents
    async fn search(
        &self,
        collection: &str,
        query: &KeywordQuery,
    ) -> StoreResult<Vec<MatchedDocument>>;

    /// Write a single record to `collection`.
    ///
    /// Whether repeated writes of the same record overwrite or duplicate is up
    /// to the backend.
    async fn index(&self, collection: &str, record: &WriteRecord) -> StoreResult<()>;

    /// Backend name for logs
    fn backend_name(&self) -> &'static str;
}
