use serde::{Deserialize, Serialize};

/// A news article as served by the external article API.
///
/// The upstream is loose about which fields it fills in; everything that can
/// be absent deserializes to a default and gets normalized afterwards (see
/// [`Article::normalize`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Upstream identifier (string or number, depending on the endpoint)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ArticleId>,

    /// Headline text
    pub headline: String,

    /// Short summary
    #[serde(default)]
    pub article_summary: String,

    /// Full article body, when the endpoint includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Publication timestamp (upstream formats vary; kept verbatim)
    #[serde(default)]
    pub published_at: String,

    /// Publishing outlet
    #[serde(default)]
    pub source: String,

    /// Canonical article URL; also the de-duplication key downstream
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_label: Option<SentimentLabel>,
}

impl Article {
    /// Fill in placeholder values for fields the upstream left empty.
    ///
    /// A missing summary falls back to a prefix of the article body when one
    /// is available.
    pub fn normalize(mut self) -> Self {
        if self.article_summary.is_empty() {
            self.article_summary = self
                .content
                .as_deref()
                .map(|c| c.chars().take(150).collect())
                .filter(|s: &String| !s.is_empty())
                .unwrap_or_else(|| "no summary available".to_string());
        }
        if self.published_at.is_empty() {
            self.published_at = "unknown".to_string();
        }
        if self.source.is_empty() {
            self.source = "unknown source".to_string();
        }
        self
    }
}

/// Upstream article id: some endpoints return strings, others numbers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ArticleId {
    Text(String),
    Number(i64),
}

/// Sentiment label vocabulary shared by articles and model verdicts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// Query parameters accepted by the article search endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub top_k: Option<u32>,
    pub offset: Option<u32>,
    pub source: Option<String>,
    pub country: Option<String>,
    pub domain: Option<String>,
    pub min_date: Option<String>,
    pub max_date: Option<String>,
}

/// Distinct filter values the upstream exposes for faceted browsing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersData {
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub countries: Vec<String>,
}

/// Aggregate counts backing the dashboard view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_articles: u64,
    #[serde(default)]
    pub top_sources: Vec<SourceCount>,
    pub sentiment_distribution: SentimentDistribution,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCount {
    pub source: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentDistribution {
    #[serde(default)]
    pub positive: u64,
    #[serde(default)]
    pub neutral: u64,
    #[serde(default)]
    pub negative: u64,
}

/// Upstream health report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub rows: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl HealthStatus {
    /// The report used when the upstream cannot be reached
    pub fn offline() -> Self {
        Self {
            status: "offline".to_string(),
            rows: 0,
            service: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_deserializes_with_missing_fields() {
        let article: Article = serde_json::from_str(
            r#"{"headline": "Markets rally", "url": "https://example.com/a"}"#,
        )
        .unwrap();

        assert_eq!(article.headline, "Markets rally");
        assert!(article.article_summary.is_empty());
        assert!(article.id.is_none());
        assert!(article.sentiment_label.is_none());
    }

    #[test]
    fn test_article_id_accepts_string_and_number() {
        let a: Article = serde_json::from_str(
            r#"{"id": "abc-1", "headline": "h", "url": "u"}"#,
        )
        .unwrap();
        assert_eq!(a.id, Some(ArticleId::Text("abc-1".to_string())));

        let b: Article =
            serde_json::from_str(r#"{"id": 42, "headline": "h", "url": "u"}"#).unwrap();
        assert_eq!(b.id, Some(ArticleId::Number(42)));
    }

    #[test]
    fn test_normalize_fills_placeholders() {
        let article: Article =
            serde_json::from_str(r#"{"headline": "h", "url": "u"}"#).unwrap();
        let normalized = article.normalize();

        assert_eq!(normalized.article_summary, "no summary available");
        assert_eq!(normalized.published_at, "unknown");
        assert_eq!(normalized.source, "unknown source");
    }

    #[test]
    fn test_normalize_prefers_content_prefix() {
        let long_body = "x".repeat(400);
        let article: Article = serde_json::from_value(serde_json::json!({
            "headline": "h",
            "url": "u",
            "content": long_body,
        }))
        .unwrap();

        let normalized = article.normalize();
        assert_eq!(normalized.article_summary.chars().count(), 150);
    }

    #[test]
    fn test_normalize_keeps_populated_fields() {
        let article: Article = serde_json::from_value(serde_json::json!({
            "headline": "h",
            "url": "u",
            "article_summary": "already here",
            "published_at": "2026-07-01T00:00:00Z",
            "source": "Reuters",
        }))
        .unwrap();

        let normalized = article.normalize();
        assert_eq!(normalized.article_summary, "already here");
        assert_eq!(normalized.source, "Reuters");
    }

    #[test]
    fn test_sentiment_label_wire_format() {
        assert_eq!(
            serde_json::to_string(&SentimentLabel::Positive).unwrap(),
            "\"positive\""
        );
        let label: SentimentLabel = serde_json::from_str("\"negative\"").unwrap();
        assert_eq!(label, SentimentLabel::Negative);
    }

    #[test]
    fn test_health_status_offline() {
        let health = HealthStatus::offline();
        assert_eq!(health.status, "offline");
        assert_eq!(health.rows, 0);
    }
}
