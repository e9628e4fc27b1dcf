use crate::config::{StoreBackend, StoreConfig};
use crate::error::Result;
use crate::store::{DocumentStore, ElasticsearchStore, InMemoryStore};
use std::sync::Arc;

/// Create a document store based on configuration
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Elasticsearch => {
            let store = ElasticsearchStore::new(config)?;
            tracing::info!(
                url = config.url.as_deref().unwrap_or_default(),
                page_size = config.page_size,
                "Initializing Elasticsearch store backend"
            );
            Ok(Arc::new(store))
        }

        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store backend; nothing will persist past this process");
            Ok(create_in_memory_store())
        }
    }
}

/// Create an in-memory store (for testing and development)
pub fn create_in_memory_store() -> Arc<dyn DocumentStore> {
    tracing::info!("Initializing in-memory store backend");
    Arc::new(InMemoryStore::new())
}
