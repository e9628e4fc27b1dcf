//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use keyword_trends::config::PipelineConfig;
use keyword_trends::models::{MatchedDocument, RunRequest, WriteRecord};
use keyword_trends::store::{DocumentStore, KeywordQuery, StoreError, StoreResult};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn request(keywords: &[&str], start: &str, end: &str) -> RunRequest {
    RunRequest::new(
        keywords.iter().map(|k| k.to_string()).collect(),
        "news",
        "trends",
        start,
        end,
    )
}

/// Small pools and short deadlines so timeout paths finish quickly
pub fn fast_pipeline() -> PipelineConfig {
    PipelineConfig {
        keyword_workers: 4,
        document_workers: 4,
        max_write_workers: 4,
        document_timeout_secs: 5,
        write_timeout_secs: 5,
    }
}

/// Store that returns a fixed result set for every query, the way a
/// search cluster hands back whatever its analyzer matched, with knobs for
/// injecting failures.
#[derive(Default)]
pub struct ScriptedStore {
    documents: Vec<MatchedDocument>,
    failing_keywords: HashSet<String>,
    panicking_keywords: HashSet<String>,
    failing_write_dates: HashSet<NaiveDate>,
    write_delay: Option<Duration>,
    queries: Mutex<Vec<(String, KeywordQuery)>>,
    writes: Mutex<Vec<(String, WriteRecord)>>,
}

impl ScriptedStore {
    pub fn new(documents: Vec<MatchedDocument>) -> Self {
        Self {
            documents,
            ..Default::default()
        }
    }

    pub fn failing_query_for(mut self, keyword: &str) -> Self {
        self.failing_keywords.insert(keyword.to_string());
        self
    }

    pub fn panicking_query_for(mut self, keyword: &str) -> Self {
        self.panicking_keywords.insert(keyword.to_string());
        self
    }

    pub fn failing_write_on(mut self, date: NaiveDate) -> Self {
        self.failing_write_dates.insert(date);
        self
    }

    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    pub fn queries(&self) -> Vec<(String, KeywordQuery)> {
        self.queries.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<(String, WriteRecord)> {
        self.writes.lock().unwrap().clone()
    }

    /// Written records for `keyword`, sorted by date
    pub fn records_for(&self, keyword: &str) -> Vec<WriteRecord> {
        let mut records: Vec<_> = self
            .writes()
            .into_iter()
            .map(|(_, record)| record)
            .filter(|record| record.keyword == keyword)
            .collect();
        records.sort_by_key(|record| record.date);
        records
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn search(
        &self,
        collection: &str,
        query: &KeywordQuery,
    ) -> StoreResult<Vec<MatchedDocument>> {
        self.queries
            .lock()
            .unwrap()
            .push((collection.to_string(), query.clone()));

        if self.panicking_keywords.contains(&query.keyword) {
            panic!("scripted panic for {}", query.keyword);
        }
        if self.failing_keywords.contains(&query.keyword) {
            return Err(StoreError::QueryFailed(format!(
                "scripted failure for {}",
                query.keyword
            )));
        }

        Ok(self.documents.iter().take(query.size).cloned().collect())
    }

    async fn index(&self, collection: &str, record: &WriteRecord) -> StoreResult<()> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_write_dates.contains(&record.date) {
            return Err(StoreError::WriteFailed(format!("scripted failure on {}", record.date)));
        }

        self.writes
            .lock()
            .unwrap()
            .push((collection.to_string(), record.clone()));
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}
