use crate::api::AppState;
use crate::error::Result;
use crate::models::*;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Health check endpoint; reflects the article API's health so the UI
/// indicator can show upstream row counts, and never errors when the
/// upstream is down
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let upstream = state.articles.health().await;

    Json(HealthResponse {
        status: upstream.status,
        rows: upstream.rows,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub rows: u64,
    pub version: String,
    pub timestamp: String,
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    let metrics = crate::metrics::gather_metrics();
    (StatusCode::OK, metrics)
}

/// List articles from the external API
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ListArticlesQuery>,
) -> Result<Json<ArticleListResponse>> {
    let articles = state
        .articles
        .search(&SearchParams {
            q: None,
            top_k: params.limit,
            offset: params.offset,
            source: params.source,
            country: params.country,
            domain: params.domain,
            min_date: params.min_date,
            max_date: params.max_date,
        })
        .await?;

    Ok(Json(ArticleListResponse {
        count: articles.len(),
        articles,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListArticlesQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub source: Option<String>,
    pub country: Option<String>,
    pub domain: Option<String>,
    pub min_date: Option<String>,
    pub max_date: Option<String>,
}

/// Full-text article search
pub async fn search_articles(
    State(state): State<AppState>,
    Query(params): Query<SearchArticlesQuery>,
) -> Result<Json<ArticleListResponse>> {
    let articles = state
        .articles
        .search(&SearchParams {
            q: Some(params.q),
            top_k: params.top_k,
            ..Default::default()
        })
        .await?;

    Ok(Json(ArticleListResponse {
        count: articles.len(),
        articles,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchArticlesQuery {
    pub q: String,
    pub top_k: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    pub count: usize,
    pub articles: Vec<Article>,
}

/// Distinct filter values for faceted browsing
pub async fn get_filters(State(state): State<AppState>) -> Result<Json<FiltersData>> {
    Ok(Json(state.articles.filters().await?))
}

/// Aggregate article counts for the dashboard
pub async fn get_dashboard_metrics(
    State(state): State<AppState>,
) -> Result<Json<DashboardMetrics>> {
    Ok(Json(state.articles.dashboard_metrics().await?))
}

/// Compare two headlines
pub async fn compare(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<ComparisonResult>> {
    request.validate()?;

    let result = state
        .analysis
        .compare_headlines(&request.h1, &request.h2)
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompareRequest {
    #[validate(length(min = 1))]
    pub h1: String,
    #[validate(length(min = 1))]
    pub h2: String,
}

/// Cluster articles into themes
pub async fn cluster(
    State(state): State<AppState>,
    Json(request): Json<ClusterRequest>,
) -> Result<Json<Vec<ArticleCluster>>> {
    let clusters = state.analysis.cluster_articles(&request.articles).await?;
    Ok(Json(clusters))
}

#[derive(Debug, Deserialize)]
pub struct ClusterRequest {
    pub articles: Vec<Article>,
}

/// Strategic summary over a headline set
pub async fn strategic_summary(
    State(state): State<AppState>,
    Json(request): Json<StrategicSummaryRequest>,
) -> Result<Json<StrategicSummary>> {
    let summary = state.analysis.strategic_summary(&request.articles).await?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct StrategicSummaryRequest {
    pub articles: Vec<Article>,
}

/// Editorial bias scores per headline
pub async fn detect_bias(
    State(state): State<AppState>,
    Json(request): Json<DetectBiasRequest>,
) -> Result<Json<Vec<BiasScore>>> {
    let scores = state.analysis.detect_bias(&request.articles).await?;
    Ok(Json(scores))
}

#[derive(Debug, Deserialize)]
pub struct DetectBiasRequest {
    pub articles: Vec<Article>,
}

/// Translate text to a target language
pub async fn translate(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslationResult>> {
    request.validate()?;

    let result = state
        .analysis
        .translate(&request.text, &request.lang)
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize, Validate)]
pub struct TranslateRequest {
    #[validate(length(min = 1))]
    pub text: String,
    #[validate(length(min = 1))]
    pub lang: String,
}

/// Sentiment verdict for a text
pub async fn sentiment(
    State(state): State<AppState>,
    Json(request): Json<SentimentRequest>,
) -> Result<Json<SentimentResult>> {
    request.validate()?;

    let result = state.analysis.analyze_sentiment(&request.text).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SentimentRequest {
    #[validate(length(min = 1))]
    pub text: String,
}

/// Full analysis pipeline: fetch articles, then run summary, sentiment, and
/// bias concurrently
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>> {
    let report = state
        .analysis
        .run_pipeline(request.source.as_deref(), &request.params)
        .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Upstream path to pull articles from (defaults to /articles)
    pub source: Option<String>,
    /// Raw query parameters forwarded to the upstream
    #[serde(default)]
    pub params: HashMap<String, String>,
}
