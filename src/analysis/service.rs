use super::prompts;
use crate::articles::ArticleClient;
use crate::config::{AnalysisConfig, GeminiConfig};
use crate::error::{AppError, Result};
use crate::gemini::GeminiClient;
use crate::models::{
    AnalysisReport, Article, ArticleCluster, BiasReport, BiasScore, ComparisonResult,
    HeadlineSentiment, HeadlineSummary, ModelVersions, ReportMeta, SentimentResult,
    StrategicSummary, TranslationResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Orchestrates the analysis operations over the two upstream clients.
///
/// Holds every input limit; client payloads are sliced here, before prompt
/// assembly, so an oversized request can never expand the prompt.
pub struct AnalysisService {
    gemini: Arc<GeminiClient>,
    articles: Arc<ArticleClient>,
    limits: AnalysisConfig,
    pro_model: String,
    flash_model: String,
}

impl AnalysisService {
    pub fn new(
        gemini: Arc<GeminiClient>,
        articles: Arc<ArticleClient>,
        gemini_config: &GeminiConfig,
        limits: AnalysisConfig,
    ) -> Self {
        Self {
            gemini,
            articles,
            limits,
            pro_model: gemini_config.pro_model.clone(),
            flash_model: gemini_config.flash_model.clone(),
        }
    }

    /// Compare two headlines for similarity, perspective, and differences
    pub async fn compare_headlines(&self, h1: &str, h2: &str) -> Result<ComparisonResult> {
        self.gemini
            .generate_as(
                &self.pro_model,
                "compare",
                &prompts::compare_prompt(h1, h2),
                prompts::compare_schema(),
            )
            .await
    }

    /// Group articles into thematic clusters.
    ///
    /// Fewer than two articles cannot form a cluster; short-circuits to an
    /// empty list without a model call.
    pub async fn cluster_articles(&self, articles: &[Article]) -> Result<Vec<ArticleCluster>> {
        if articles.len() < 2 {
            return Ok(Vec::new());
        }

        let input = &articles[..articles.len().min(self.limits.cluster_input_limit)];
        self.gemini
            .generate_as(
                &self.flash_model,
                "cluster",
                &prompts::cluster_prompt(input),
                prompts::cluster_schema(),
            )
            .await
    }

    /// High-level read of the news landscape with 0-100 trend metrics
    pub async fn strategic_summary(&self, articles: &[Article]) -> Result<StrategicSummary> {
        let input = &articles[..articles.len().min(self.limits.summary_input_limit)];
        self.gemini
            .generate_as(
                &self.flash_model,
                "strategic_summary",
                &prompts::strategic_summary_prompt(input),
                prompts::strategic_summary_schema(),
            )
            .await
    }

    /// Per-headline editorial bias scores
    pub async fn detect_bias(&self, articles: &[Article]) -> Result<Vec<BiasScore>> {
        let input = &articles[..articles.len().min(self.limits.bias_input_limit)];
        self.gemini
            .generate_as(
                &self.pro_model,
                "detect_bias",
                &prompts::bias_prompt(input),
                prompts::bias_schema(),
            )
            .await
    }

    /// Translate text to the requested language
    pub async fn translate(&self, text: &str, lang: &str) -> Result<TranslationResult> {
        self.gemini
            .generate_as(
                &self.flash_model,
                "translate",
                &prompts::translate_prompt(text, lang),
                prompts::translate_schema(),
            )
            .await
    }

    /// Sentiment verdict for a single text
    pub async fn analyze_sentiment(&self, text: &str) -> Result<SentimentResult> {
        self.gemini
            .generate_as(
                &self.flash_model,
                "sentiment",
                &prompts::sentiment_prompt(text),
                prompts::sentiment_schema(),
            )
            .await
    }

    /// Full pipeline: fetch articles from the upstream, then run summary,
    /// sentiment, and bias generations concurrently over the leading
    /// headlines
    pub async fn run_pipeline(
        &self,
        source: Option<&str>,
        params: &HashMap<String, String>,
    ) -> Result<AnalysisReport> {
        let start = Instant::now();

        let path = source.unwrap_or("/articles");
        let articles = self.articles.fetch_raw(path, params).await?;

        if articles.is_empty() {
            return Err(AppError::NotFound(
                "No articles found to analyze".to_string(),
            ));
        }

        let input = &articles[..articles.len().min(self.limits.pipeline_input_limit)];
        let headlines = prompts::headlines(input);

        let summary_prompt = prompts::pipeline_summary_prompt(&headlines);
        let sentiment_prompt = prompts::pipeline_sentiment_prompt(&headlines);
        let bias_prompt = prompts::pipeline_bias_prompt(&headlines);

        let (summary, sentiment, bias) = tokio::join!(
            self.gemini.generate_as::<HeadlineSummary>(
                &self.flash_model,
                "pipeline_summary",
                &summary_prompt,
                prompts::pipeline_summary_schema(),
            ),
            self.gemini.generate_as::<HeadlineSentiment>(
                &self.flash_model,
                "pipeline_sentiment",
                &sentiment_prompt,
                prompts::pipeline_sentiment_schema(),
            ),
            self.gemini.generate_as::<BiasReport>(
                &self.pro_model,
                "pipeline_bias",
                &bias_prompt,
                prompts::pipeline_bias_schema(),
            ),
        );

        let report = AnalysisReport {
            summary: summary?,
            sentiment: sentiment?,
            bias: bias?,
            data: articles,
            meta: ReportMeta {
                runtime_ms: start.elapsed().as_millis() as u64,
                model_versions: ModelVersions {
                    summary: self.flash_model.clone(),
                    bias: self.pro_model.clone(),
                },
            },
        };

        info!(
            article_count = report.data.len(),
            runtime_ms = report.meta.runtime_ms,
            "Analysis pipeline complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    fn article_json(headline: &str, url: &str) -> serde_json::Value {
        json!({"headline": headline, "url": url, "source": "Wire", "article_summary": "s", "published_at": "2026-07-01"})
    }

    fn candidate_body(text: serde_json::Value) -> String {
        json!({
            "candidates": [{
                "content": {"parts": [{"text": text.to_string()}]},
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    fn service(gemini_url: String, articles_url: String) -> AnalysisService {
        let gemini_config = GeminiConfig {
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: gemini_url.clone(),
            pro_model: "gemini-3-pro-preview".to_string(),
            flash_model: "gemini-3-flash-preview".to_string(),
            timeout_secs: 5,
            max_retries: 0,
            retry_backoff_ms: 10,
        };
        let gemini =
            Arc::new(GeminiClient::new("test-key".to_string(), gemini_url, 5, 0, 10).unwrap());
        let articles = Arc::new(ArticleClient::new(articles_url, 5, 100).unwrap());
        AnalysisService::new(gemini, articles, &gemini_config, AnalysisConfig::default())
    }

    async fn mock_flash(
        server: &mut ServerGuard,
        prompt_fragment: &str,
        text: serde_json::Value,
    ) -> mockito::Mock {
        server
            .mock(
                "POST",
                "/v1beta/models/gemini-3-flash-preview:generateContent",
            )
            .match_query(Matcher::Any)
            .match_body(Matcher::Regex(prompt_fragment.to_string()))
            .with_status(200)
            .with_body(candidate_body(text))
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_cluster_short_circuits_below_two_articles() {
        // Unroutable upstreams: a model call would fail loudly
        let service = service(
            "http://127.0.0.1:1".to_string(),
            "http://127.0.0.1:1".to_string(),
        );

        let one: Article =
            serde_json::from_value(article_json("solo", "https://e.com/1")).unwrap();
        let clusters = service.cluster_articles(&[one]).await.unwrap();
        assert!(clusters.is_empty());
    }

    #[tokio::test]
    async fn test_compare_uses_pro_model() {
        let mut gemini = Server::new_async().await;
        let mock = gemini
            .mock(
                "POST",
                "/v1beta/models/gemini-3-pro-preview:generateContent",
            )
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(candidate_body(json!({
                "similarity": 0.7,
                "insights": "same story",
                "differences": ["framing"]
            })))
            .create_async()
            .await;

        let service = service(gemini.url(), "http://127.0.0.1:1".to_string());
        let result = service
            .compare_headlines("Fed holds rates", "Central bank pauses")
            .await
            .unwrap();

        mock.assert_async().await;
        assert!((result.similarity - 0.7).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_run_pipeline_assembles_report() {
        let mut gemini = Server::new_async().await;
        let mut articles = Server::new_async().await;

        let _articles_mock = articles
            .mock("GET", "/articles")
            .match_query(Matcher::UrlEncoded("top_k".into(), "40".into()))
            .with_status(200)
            .with_body(
                json!({"articles": [
                    article_json("Summit concludes", "https://e.com/1"),
                    article_json("Trade deal signed", "https://e.com/2"),
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let _summary_mock = mock_flash(
            &mut gemini,
            "strategic summary",
            json!({"summary": "busy week", "takeaways": ["a", "b", "c"]}),
        )
        .await;
        let _sentiment_mock = mock_flash(
            &mut gemini,
            "overall sentiment",
            json!({"label": "neutral", "score": 0.5}),
        )
        .await;
        let _bias_mock = gemini
            .mock(
                "POST",
                "/v1beta/models/gemini-3-pro-preview:generateContent",
            )
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(candidate_body(json!({
                "score": 35.0,
                "label": "Stable",
                "evidence": ["loaded phrasing in headline 2"]
            })))
            .create_async()
            .await;

        let service = service(gemini.url(), articles.url());
        let mut params = HashMap::new();
        params.insert("top_k".to_string(), "40".to_string());

        let report = service.run_pipeline(None, &params).await.unwrap();

        assert_eq!(report.data.len(), 2);
        assert_eq!(report.summary.takeaways.len(), 3);
        assert_eq!(report.bias.label, "Stable");
        assert_eq!(
            report.meta.model_versions.summary,
            "gemini-3-flash-preview"
        );
        assert_eq!(report.meta.model_versions.bias, "gemini-3-pro-preview");
    }

    #[tokio::test]
    async fn test_run_pipeline_404_when_no_articles() {
        let mut articles = Server::new_async().await;
        let _mock = articles
            .mock("GET", "/articles")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"articles": []}).to_string())
            .create_async()
            .await;

        let service = service("http://127.0.0.1:1".to_string(), articles.url());
        let err = service
            .run_pipeline(None, &HashMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
