use super::article::{Article, SentimentLabel};
use serde::{Deserialize, Serialize};

/// Verdict for a two-headline comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Similarity score from 0 to 1
    pub similarity: f64,
    pub insights: String,
    #[serde(default)]
    pub differences: Vec<String>,
}

/// A model-synthesized thematic grouping of articles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleCluster {
    pub title: String,
    pub summary: String,
    /// URLs of the member articles; the browse view joins these back to its
    /// article list by URL
    #[serde(rename = "articleUrls", default)]
    pub article_urls: Vec<String>,
}

/// High-level landscape read across many headlines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategicSummary {
    pub summary: String,
    #[serde(default)]
    pub metrics: Vec<TrendMetric>,
    #[serde(default)]
    pub key_takeaways: Vec<String>,
}

/// One 0-100 gauge on the dashboard radar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendMetric {
    pub category: String,
    pub value: f64,
}

/// Per-headline editorial bias judgment, 0 (neutral) to 100 (extreme)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiasScore {
    pub bias_score: f64,
}

/// Sentiment verdict for a single text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// Confidence from 0 to 1
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translated_text: String,
}

/// Combined report produced by the analysis pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: HeadlineSummary,
    pub sentiment: HeadlineSentiment,
    pub bias: BiasReport,
    /// The articles the verdicts were drawn from
    pub data: Vec<Article>,
    pub meta: ReportMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlineSummary {
    pub summary: String,
    #[serde(default)]
    pub takeaways: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlineSentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

/// Aggregate bias-and-propaganda verdict over a headline set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiasReport {
    pub score: f64,
    pub label: String,
    #[serde(default)]
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub runtime_ms: u64,
    pub model_versions: ModelVersions,
}

/// Which models produced which sections of the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVersions {
    pub summary: String,
    pub bias: String,
}
