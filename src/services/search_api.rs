//! Client for the external vector-search service.
//!
//! This system does not index or search anything itself; it only
//! translates its own DTOs to and from the search service's snake_case
//! JSON and forwards requests over HTTP. Connectivity failures are
//! fatal for the current operation and are never retried here.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request timeout for all search service calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the search service boundary.
#[derive(Debug, Error)]
pub enum SearchApiError {
    #[error("search service unreachable: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("search service returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("invalid search request: {0}")]
    InvalidRequest(String),
}

/// A single scored point returned by the search service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPoint {
    pub id: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

/// Vector search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub vector: Vec<f64>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,
    #[serde(default = "default_true")]
    pub with_payload: bool,
    #[serde(default)]
    pub with_vector: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<serde_json::Value>,
}

/// Text search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSearchRequest {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,
    #[serde(default = "default_true")]
    pub with_payload: bool,
    #[serde(default)]
    pub with_vector: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<serde_json::Value>,
}

/// Recommendation request based on positive/negative example ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub positive_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_ids: Option<Vec<String>>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,
    #[serde(default = "default_true")]
    pub with_payload: bool,
    #[serde(default)]
    pub with_vector: bool,
}

/// One query of a batch search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_text: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Batch search request (at most 10 queries).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSearchRequest {
    pub queries: Vec<BatchQuery>,
}

/// Search response shared by vector, text and recommend endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchPoint>,
    #[serde(default)]
    pub total: u64,
    #[serde(default, rename = "executionTimeMs")]
    pub execution_time_ms: f64,
    #[serde(default, rename = "queryInfo")]
    pub query_info: serde_json::Value,
}

/// Batch search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResponse>,
    #[serde(default)]
    pub total: u64,
    #[serde(default, rename = "executionTimeMs")]
    pub execution_time_ms: f64,
}

/// Collection metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(default, rename = "vectorSize")]
    pub vector_size: u64,
    #[serde(default, rename = "vectorsCount")]
    pub vectors_count: u64,
    #[serde(default)]
    pub distance: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

fn default_limit() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn check_limit(limit: u32) -> Result<(), SearchApiError> {
    if !(1..=1000).contains(&limit) {
        return Err(SearchApiError::InvalidRequest(format!(
            "limit must be between 1 and 1000, got {}",
            limit
        )));
    }
    Ok(())
}

fn check_score_threshold(threshold: Option<f64>) -> Result<(), SearchApiError> {
    if let Some(t) = threshold {
        if !(0.0..=1.0).contains(&t) {
            return Err(SearchApiError::InvalidRequest(format!(
                "score_threshold must be between 0 and 1, got {}",
                t
            )));
        }
    }
    Ok(())
}

/// HTTP client for the search service.
#[derive(Clone)]
pub struct SearchApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl SearchApiClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(&self, endpoint: &str) -> Result<serde_json::Value, SearchApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::info!("Search API request: GET {}", url);

        let response = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<serde_json::Value, SearchApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::info!("Search API request: POST {}", url);

        let response = self
            .http
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode(response: reqwest::Response) -> Result<serde_json::Value, SearchApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchApiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    fn parse<T: serde::de::DeserializeOwned>(
        value: serde_json::Value,
    ) -> Result<T, SearchApiError> {
        serde_json::from_value(value).map_err(|e| SearchApiError::Upstream {
            status: 502,
            message: format!("unexpected response shape: {}", e),
        })
    }

    /// Health of the search service itself.
    pub async fn health(&self) -> Result<serde_json::Value, SearchApiError> {
        self.get_json("/health").await
    }

    /// List available collection names.
    ///
    /// The service has shipped both a bare array and a wrapped object
    /// over time; both shapes are accepted.
    pub async fn list_collections(&self) -> Result<Vec<String>, SearchApiError> {
        let value = self.get_json("/collections").await?;

        let items = match &value {
            serde_json::Value::Array(items) => items.clone(),
            serde_json::Value::Object(map) => map
                .get("collections")
                .or_else(|| map.get("result"))
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Object(map) => map
                    .get("name")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string()),
                _ => None,
            })
            .collect())
    }

    /// Fetch metadata for one collection.
    pub async fn collection_info(&self, name: &str) -> Result<CollectionInfo, SearchApiError> {
        let value = self.get_json(&format!("/collections/{}", name)).await?;
        Self::parse(value)
    }

    /// Basic vector search.
    pub async fn search(
        &self,
        collection: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchApiError> {
        check_limit(request.limit)?;
        check_score_threshold(request.score_threshold)?;

        let value = self
            .post_json(&format!("/collections/{}/search", collection), request)
            .await?;
        Self::parse(value)
    }

    /// Text search (the service embeds the query itself).
    pub async fn text_search(
        &self,
        collection: &str,
        request: &TextSearchRequest,
    ) -> Result<SearchResponse, SearchApiError> {
        if request.query.is_empty() {
            return Err(SearchApiError::InvalidRequest(
                "query must not be empty".to_string(),
            ));
        }
        check_limit(request.limit)?;
        check_score_threshold(request.score_threshold)?;

        let value = self
            .post_json(&format!("/collections/{}/search/text", collection), request)
            .await?;
        Self::parse(value)
    }

    /// Recommendations from positive/negative example ids.
    pub async fn recommend(
        &self,
        collection: &str,
        request: &RecommendRequest,
    ) -> Result<SearchResponse, SearchApiError> {
        if request.positive_ids.is_empty() {
            return Err(SearchApiError::InvalidRequest(
                "positive_ids must not be empty".to_string(),
            ));
        }
        check_limit(request.limit)?;
        check_score_threshold(request.score_threshold)?;

        let value = self
            .post_json(
                &format!("/collections/{}/search/recommend", collection),
                request,
            )
            .await?;
        Self::parse(value)
    }

    /// Multiple searches in one round trip.
    pub async fn batch_search(
        &self,
        collection: &str,
        request: &BatchSearchRequest,
    ) -> Result<BatchSearchResponse, SearchApiError> {
        if request.queries.is_empty() || request.queries.len() > 10 {
            return Err(SearchApiError::InvalidRequest(
                "batch must contain between 1 and 10 queries".to_string(),
            ));
        }
        for query in &request.queries {
            check_limit(query.limit)?;
        }

        let value = self
            .post_json(
                &format!("/collections/{}/search/batch", collection),
                request,
            )
            .await?;
        Self::parse(value)
    }
}
