use crate::models::{count_occurrences, parse_date_key, DateKey, MatchedDocument, WriteRecord};
use crate::store::{DocumentStore, KeywordQuery, StoreError, StoreResult};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory document store (for development and testing)
///
/// Query semantics approximate the Elasticsearch backend: a document matches
/// when its text contains the keyword case-insensitively and its publication
/// day lies within the inclusive window. Documents without text or date never
/// match. Results are returned in insertion order, truncated to the page size.
///
/// The window is compared at day granularity: both bounds and each publication
/// date are truncated to a calendar day first. Elasticsearch compares the full
/// timestamps, so a bound such as `2024-01-31T00:00:00` excludes later hours of
/// that day there but includes the whole day here.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    documents: Arc<DashMap<String, Vec<MatchedDocument>>>,
    records: Arc<DashMap<String, Vec<WriteRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection so searches against it succeed
    pub fn create_collection(&self, collection: &str) {
        self.documents.entry(collection.to_string()).or_default();
    }

    /// Add a document to a source collection
    pub fn insert_document(&self, collection: &str, document: MatchedDocument) {
        self.documents
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Add many documents to a source collection
    pub fn insert_documents(
        &self,
        collection: &str,
        documents: impl IntoIterator<Item = MatchedDocument>,
    ) {
        self.documents
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
    }

    /// Records written to a destination collection, in write order
    pub fn records(&self, collection: &str) -> Vec<WriteRecord> {
        self.records
            .get(collection)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Number of records written to a destination collection
    pub fn record_count(&self, collection: &str) -> usize {
        self.records
            .get(collection)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    fn matches(document: &MatchedDocument, query: &KeywordQuery, window: (DateKey, DateKey)) -> bool {
        let Ok((text, day)) = document.extract() else {
            return false;
        };

        day >= window.0 && day <= window.1 && count_occurrences(text, &query.keyword) > 0
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn search(
        &self,
        collection: &str,
        query: &KeywordQuery,
    ) -> StoreResult<Vec<MatchedDocument>> {
        let start = parse_date_key(&query.start_date)
            .map_err(|e| StoreError::QueryFailed(format!("start_date: {}", e)))?;
        let end = parse_date_key(&query.end_date)
            .map_err(|e| StoreError::QueryFailed(format!("end_date: {}", e)))?;

        let documents = self
            .documents
            .get(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        let hits: Vec<MatchedDocument> = documents
            .iter()
            .filter(|document| Self::matches(document, query, (start, end)))
            .take(query.size)
            .cloned()
            .collect();

        tracing::debug!(
            collection = %collection,
            keyword = %query.keyword,
            hits = hits.len(),
            "In-memory search completed"
        );

        Ok(hits)
    }

    async fn index(&self, collection: &str, record: &WriteRecord) -> StoreResult<()> {
        self.records
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());

        tracing::debug!(collection = %collection, date = %record.date, "Record written");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
