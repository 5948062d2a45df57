use crate::config::ArticlesConfig;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{Article, DashboardMetrics, FiltersData, HealthStatus, SearchParams};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Client for the external article API
#[derive(Clone)]
pub struct ArticleClient {
    base_url: String,
    client: Client,
    timeout_secs: u64,
    default_limit: u32,
}

impl ArticleClient {
    pub fn from_config(config: &ArticlesConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.timeout_secs,
            config.default_limit,
        )
    }

    pub fn new(base_url: String, timeout_secs: u64, default_limit: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
            default_limit,
        })
    }

    /// Query articles: full-text search when `q` is present, plain listing
    /// otherwise
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<Article>> {
        let query = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

        let (endpoint, query_pairs) = match query {
            Some(q) => {
                let mut pairs = vec![("q".to_string(), q.to_string())];
                if let Some(top_k) = params.top_k {
                    pairs.push(("top_k".to_string(), top_k.to_string()));
                }
                ("/search-text", pairs)
            }
            None => {
                let mut pairs = vec![(
                    "limit".to_string(),
                    params.top_k.unwrap_or(self.default_limit).to_string(),
                )];
                if let Some(offset) = params.offset {
                    pairs.push(("offset".to_string(), offset.to_string()));
                }
                for (key, value) in [
                    ("source", &params.source),
                    ("country", &params.country),
                    ("domain", &params.domain),
                    ("min_date", &params.min_date),
                    ("max_date", &params.max_date),
                ] {
                    if let Some(value) = value {
                        pairs.push((key.to_string(), value.clone()));
                    }
                }
                ("/articles", pairs)
            }
        };

        self.fetch_articles(endpoint, &query_pairs).await
    }

    /// Fetch articles from an arbitrary upstream path with raw query
    /// parameters; used by the analysis pipeline's source passthrough
    pub async fn fetch_raw(
        &self,
        path: &str,
        params: &HashMap<String, String>,
    ) -> Result<Vec<Article>> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let pairs: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        self.fetch_articles(&path, &pairs).await
    }

    /// Distinct sources/domains/countries for faceted browsing
    pub async fn filters(&self) -> Result<FiltersData> {
        self.get_json("/filters", "filters").await
    }

    /// Aggregate article counts for the dashboard
    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics> {
        self.get_json("/metrics", "metrics").await
    }

    /// Upstream health; degrades to an offline report instead of erroring so
    /// the UI indicator always renders
    pub async fn health(&self) -> HealthStatus {
        match self.get_json::<HealthStatus>("/health", "health").await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Article API health check failed");
                HealthStatus::offline()
            }
        }
    }

    async fn fetch_articles(
        &self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<Vec<Article>> {
        let metric_endpoint = endpoint.trim_start_matches('/');

        let result = self.request_value(endpoint, query).await;

        match result {
            Ok(value) => {
                metrics::ARTICLE_API_REQUESTS_TOTAL
                    .with_label_values(&[metric_endpoint, "ok"])
                    .inc();
                Ok(extract_articles(value))
            }
            Err(e) => {
                metrics::ARTICLE_API_REQUESTS_TOTAL
                    .with_label_values(&[metric_endpoint, "error"])
                    .inc();
                Err(e)
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        metric_endpoint: &str,
    ) -> Result<T> {
        let result = self.request_value(endpoint, &[]).await.and_then(|value| {
            serde_json::from_value(value).map_err(|e| AppError::Upstream {
                upstream_source: "articles".to_string(),
                message: format!("unexpected {} response shape: {}", endpoint, e),
            })
        });

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::ARTICLE_API_REQUESTS_TOTAL
            .with_label_values(&[metric_endpoint, outcome])
            .inc();

        result
    }

    async fn request_value(&self, endpoint: &str, query: &[(String, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(url = %url, "Article API request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!(
                        "Article API request timed out after {} seconds",
                        self.timeout_secs
                    ))
                } else {
                    AppError::Upstream {
                        upstream_source: "articles".to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream {
                upstream_source: "articles".to_string(),
                message: format!("External API returned {}", status.as_u16()),
            });
        }

        response.json().await.map_err(|e| AppError::Upstream {
            upstream_source: "articles".to_string(),
            message: format!("invalid response body: {}", e),
        })
    }
}

/// Pull the article list out of whichever envelope the upstream used:
/// `{"articles": [...]}`, `{"results": [...]}`, or a bare array.
///
/// Items that do not parse as articles are skipped rather than failing the
/// whole batch.
fn extract_articles(value: Value) -> Vec<Article> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("articles").or_else(|| map.remove("results")) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Article>(item) {
            Ok(article) => Some(article.normalize()),
            Err(e) => {
                warn!(error = %e, "Skipping malformed article from upstream");
                None
            }
        })
        .collect()
}
