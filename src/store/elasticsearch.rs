use crate::config::StoreConfig;
use crate::models::{MatchedDocument, WriteRecord};
use crate::store::{DocumentStore, KeywordQuery, StoreError, StoreResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Credentials attached to every request
#[derive(Clone)]
enum Credentials {
    Basic { username: String, password: Option<String> },
    ApiKey(String),
}

/// Elasticsearch-compatible HTTP backend
///
/// Searches with `POST /{collection}/_search` and writes with
/// `POST /{collection}/_doc`. Writes let the cluster assign document ids, so
/// repeating a run appends duplicate records.
#[derive(Clone)]
pub struct ElasticsearchStore {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
    text_field: String,
    date_field: String,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_id")]
    id: Option<String>,

    #[serde(rename = "_source")]
    source: Option<Value>,
}

impl ElasticsearchStore {
    /// Create a new store client from configuration
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let url = config.url.as_deref().ok_or_else(|| {
            StoreError::InvalidConfiguration(
                "Elasticsearch backend requires 'url' configuration".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                StoreError::InvalidConfiguration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            credentials: Self::credentials_from(config)?,
            text_field: config.text_field.clone(),
            date_field: config.date_field.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn credentials_from(config: &StoreConfig) -> StoreResult<Option<Credentials>> {
        if let Some(var) = &config.api_key_env {
            let key = std::env::var(var).map_err(|_| {
                StoreError::InvalidConfiguration(format!("API key env var {} is not set", var))
            })?;
            return Ok(Some(Credentials::ApiKey(key)));
        }

        let Some(username) = &config.username else {
            return Ok(None);
        };

        let password = match &config.password_env {
            Some(var) => Some(std::env::var(var).map_err(|_| {
                StoreError::InvalidConfiguration(format!("Password env var {} is not set", var))
            })?),
            None => None,
        };

        Ok(Some(Credentials::Basic {
            username: username.clone(),
            password,
        }))
    }

    /// Request body for a keyword query
    pub fn search_body(&self, query: &KeywordQuery) -> Value {
        let mut match_clause = Map::new();
        match_clause.insert(self.text_field.clone(), json!({ "query": query.keyword }));

        let mut range_clause = Map::new();
        range_clause.insert(
            self.date_field.clone(),
            json!({ "gte": query.start_date, "lte": query.end_date }),
        );

        json!({
            "size": query.size,
            "query": {
                "bool": {
                    "must": [{ "match": match_clause }],
                    "filter": [{ "range": range_clause }]
                }
            }
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(Credentials::ApiKey(key)) => {
                request.header("Authorization", format!("ApiKey {}", key))
            }
            Some(Credentials::Basic { username, password }) => {
                request.basic_auth(username, password.as_ref())
            }
            None => request,
        }
    }

    fn transport_error(
        &self,
        err: reqwest::Error,
        context: &str,
        otherwise: fn(String) -> StoreError,
    ) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout(format!(
                "{} timed out after {} seconds",
                context, self.timeout_secs
            ))
        } else if err.is_connect() {
            StoreError::ConnectionFailed(format!("{}: {}", context, err))
        } else {
            otherwise(format!("{}: {}", context, err))
        }
    }
}

#[async_trait]
impl DocumentStore for ElasticsearchStore {
    async fn search(
        &self,
        collection: &str,
        query: &KeywordQuery,
    ) -> StoreResult<Vec<MatchedDocument>> {
        let url = format!("{}/{}/_search", self.base_url, collection);

        let response = self
            .authorize(self.client.post(&url))
            .header("User-Agent", "keyword-trends/0.1")
            .json(&self.search_body(query))
            .send()
            .await
            .map_err(|e| self.transport_error(e, "Search request", StoreError::QueryFailed))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::CollectionNotFound(collection.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::QueryFailed(format!(
                "Search returned status {}: {}",
                status,
                if body.is_empty() { "No response body" } else { body.as_str() }
            )));
        }

        let body: SearchResponseBody = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("Malformed search response: {}", e)))?;

        let documents: Vec<MatchedDocument> = body
            .hits
            .hits
            .into_iter()
            .map(|hit| match hit.source {
                Some(source) => {
                    MatchedDocument::from_source(hit.id, &source, &self.text_field, &self.date_field)
                }
                None => {
                    warn!(document_id = ?hit.id, "Search hit carried no _source");
                    MatchedDocument {
                        id: hit.id,
                        ..Default::default()
                    }
                }
            })
            .collect();

        debug!(
            collection = %collection,
            keyword = %query.keyword,
            hits = documents.len(),
            "Search completed"
        );

        Ok(documents)
    }

    async fn index(&self, collection: &str, record: &WriteRecord) -> StoreResult<()> {
        let url = format!("{}/{}/_doc", self.base_url, collection);

        let response = self
            .authorize(self.client.post(&url))
            .header("User-Agent", "keyword-trends/0.1")
            .json(record)
            .send()
            .await
            .map_err(|e| self.transport_error(e, "Index request", StoreError::WriteFailed))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::WriteFailed(format!(
                "Index returned status {}: {}",
                status,
                if body.is_empty() { "No response body" } else { body.as_str() }
            )));
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "elasticsearch"
    }
}
