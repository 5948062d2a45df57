use crate::config::GeminiConfig;
use crate::error::{AppError, Result};
use crate::metrics;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Client for structured-output Gemini generations
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: Client,
    timeout_secs: u64,
    max_retries: u32,
    retry_backoff: Duration,
}

/// Gemini failure with retryable classification
#[derive(Debug)]
struct GeminiError {
    message: String,
    status_code: Option<u16>,
    is_timeout: bool,
    is_retryable: bool,
}

impl GeminiError {
    fn from_status_code(status_code: u16, message: String) -> Self {
        let is_retryable = matches!(status_code, 408 | 429 | 500..=599);
        Self {
            message,
            status_code: Some(status_code),
            is_timeout: status_code == 408,
            is_retryable,
        }
    }

    fn from_reqwest_error(error: reqwest::Error) -> Self {
        Self {
            message: error.to_string(),
            status_code: error.status().map(|s| s.as_u16()),
            is_timeout: error.is_timeout(),
            is_retryable: error.is_timeout() || error.is_connect(),
        }
    }

    fn parse_failure(message: String) -> Self {
        Self {
            message,
            status_code: None,
            is_timeout: false,
            is_retryable: false,
        }
    }

    fn error_type(&self) -> &'static str {
        if self.is_timeout {
            "timeout"
        } else if matches!(self.status_code, Some(429)) {
            "rate_limit"
        } else if matches!(self.status_code, Some(500..=599)) {
            "server_error"
        } else if self.status_code.is_some() {
            "client_error"
        } else {
            "request"
        }
    }
}

impl From<GeminiError> for AppError {
    fn from(err: GeminiError) -> Self {
        if err.is_timeout {
            AppError::Timeout(format!("Gemini request timed out: {}", err.message))
        } else {
            AppError::Upstream {
                upstream_source: "gemini".to_string(),
                message: err.message,
            }
        }
    }
}

impl GeminiClient {
    /// Build a client from configuration, reading the API key from the
    /// configured environment variable
    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            AppError::Configuration(format!(
                "Gemini API key not found in environment variable {}",
                config.api_key_env
            ))
        })?;

        Self::new(
            api_key,
            config.base_url.clone(),
            config.timeout_secs,
            config.max_retries,
            config.retry_backoff_ms,
        )
    }

    pub fn new(
        api_key: String,
        base_url: String,
        timeout_secs: u64,
        max_retries: u32,
        retry_backoff_ms: u64,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(AppError::Configuration(
                "Gemini API key cannot be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
            max_retries,
            retry_backoff: Duration::from_millis(retry_backoff_ms),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model
        )
    }

    /// Run one structured-output generation and return the parsed JSON value.
    ///
    /// `operation` is a short label for metrics and logs ("sentiment",
    /// "cluster", ...). Retryable failures (5xx, 429, timeouts, connection
    /// errors) are retried up to the configured limit with fixed backoff;
    /// everything else is terminal.
    pub async fn generate(
        &self,
        model: &str,
        operation: &str,
        prompt: &str,
        response_schema: Value,
    ) -> Result<Value> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
                role: Some("user".to_string()),
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(response_schema),
            }),
        };

        metrics::GEMINI_REQUESTS_TOTAL
            .with_label_values(&[model, operation])
            .inc();

        let start = Instant::now();
        let mut attempt: u32 = 0;

        let outcome = loop {
            match self.try_generate(model, &request).await {
                Ok(value) => break Ok(value),
                Err(e) if e.is_retryable && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        model = model,
                        operation = operation,
                        attempt = attempt,
                        error = %e.message,
                        "Retrying Gemini request"
                    );
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(e) => break Err(e),
            }
        };

        metrics::GEMINI_REQUEST_DURATION_SECONDS
            .with_label_values(&[model])
            .observe(start.elapsed().as_secs_f64());

        match outcome {
            Ok(value) => {
                debug!(
                    model = model,
                    operation = operation,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Gemini generation complete"
                );
                Ok(value)
            }
            Err(e) => {
                metrics::GEMINI_ERRORS_TOTAL
                    .with_label_values(&[model, operation, e.error_type()])
                    .inc();
                Err(e.into())
            }
        }
    }

    /// Typed wrapper over [`generate`](Self::generate)
    pub async fn generate_as<T: DeserializeOwned>(
        &self,
        model: &str,
        operation: &str,
        prompt: &str,
        response_schema: Value,
    ) -> Result<T> {
        let value = self
            .generate(model, operation, prompt, response_schema)
            .await?;
        serde_json::from_value(value).map_err(|e| AppError::Upstream {
            upstream_source: "gemini".to_string(),
            message: format!("Model output did not match the requested schema: {}", e),
        })
    }

    async fn try_generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> std::result::Result<Value, GeminiError> {
        let response = self
            .client
            .post(format!("{}?key={}", self.endpoint(model), self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeminiError {
                        message: format!(
                            "request timed out after {} seconds",
                            self.timeout_secs
                        ),
                        status_code: None,
                        is_timeout: true,
                        is_retryable: true,
                    }
                } else {
                    GeminiError::from_reqwest_error(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::from_status_code(
                status.as_u16(),
                if body.is_empty() {
                    format!("status {}", status)
                } else {
                    format!("status {}: {}", status, body)
                },
            ));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::parse_failure(format!("invalid response body: {}", e)))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .ok_or_else(|| GeminiError::parse_failure("empty candidate response".to_string()))?;

        serde_json::from_str(strip_code_fences(text)).map_err(|e| {
            GeminiError::parse_failure(format!("candidate text is not valid JSON: {}", e))
        })
    }
}

/// Remove markdown code fences the model sometimes wraps around JSON output,
/// even when a JSON response was requested
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

// Generative Language API wire types
#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde_json::json;

    fn test_client(base_url: String) -> GeminiClient {
        GeminiClient::new("test-api-key".to_string(), base_url, 5, 1, 10).unwrap()
    }

    fn candidate_body(text: &str) -> String {
        json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": text}],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = GeminiClient::new(String::new(), "http://localhost".to_string(), 5, 0, 10);
        assert!(result.is_err());
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n[1, 2]\n```"), "[1, 2]");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(GeminiError::from_status_code(503, "unavailable".into()).is_retryable);
        assert!(GeminiError::from_status_code(429, "quota".into()).is_retryable);
        assert!(!GeminiError::from_status_code(400, "bad schema".into()).is_retryable);
        assert!(!GeminiError::from_status_code(401, "bad key".into()).is_retryable);
    }

    #[tokio::test]
    async fn test_generate_parses_candidate_json() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                "/v1beta/models/gemini-3-flash-preview:generateContent",
            )
            .match_query(mockito::Matcher::UrlEncoded(
                "key".into(),
                "test-api-key".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(candidate_body(
                r#"{"label": "positive", "score": 0.9, "explanation": "upbeat"}"#,
            ))
            .create_async()
            .await;

        let client = test_client(server.url());
        let value = client
            .generate(
                "gemini-3-flash-preview",
                "sentiment",
                "Analyze this",
                json!({"type": "OBJECT"}),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(value["label"], "positive");
    }

    #[tokio::test]
    async fn test_generate_strips_fenced_output() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock(
                "POST",
                "/v1beta/models/gemini-3-flash-preview:generateContent",
            )
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(candidate_body("```json\n{\"translated_text\": \"hola\"}\n```"))
            .create_async()
            .await;

        let client = test_client(server.url());
        let result: crate::models::TranslationResult = client
            .generate_as(
                "gemini-3-flash-preview",
                "translate",
                "Translate",
                json!({"type": "OBJECT"}),
            )
            .await
            .unwrap();

        assert_eq!(result.translated_text, "hola");
    }

    #[tokio::test]
    async fn test_generate_maps_client_error_without_retry() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                "/v1beta/models/gemini-3-pro-preview:generateContent",
            )
            .match_query(mockito::Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error": {"message": "invalid schema"}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = test_client(server.url());
        let err = client
            .generate(
                "gemini-3-pro-preview",
                "compare",
                "Compare",
                json!({"type": "OBJECT"}),
            )
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, AppError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_generate_retries_server_errors() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                "/v1beta/models/gemini-3-flash-preview:generateContent",
            )
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .with_body("overloaded")
            .expect(2) // initial attempt + one retry
            .create_async()
            .await;

        let client = test_client(server.url());
        let err = client
            .generate(
                "gemini-3-flash-preview",
                "cluster",
                "Group these",
                json!({"type": "ARRAY"}),
            )
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, AppError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_candidates() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock(
                "POST",
                "/v1beta/models/gemini-3-flash-preview:generateContent",
            )
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let client = test_client(server.url());
        let err = client
            .generate(
                "gemini-3-flash-preview",
                "sentiment",
                "Analyze",
                json!({"type": "OBJECT"}),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upstream { .. }));
    }
}
