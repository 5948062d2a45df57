use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Gemini model API configuration
    pub gemini: GeminiConfig,

    /// External article API configuration
    pub articles: ArticlesConfig,

    /// Analysis input limits
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: METAVIEW_)
            .add_source(
                config::Environment::with_prefix("METAVIEW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Directory holding the built dashboard bundle, served at `/`
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Generative Language API base URL
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model used for comparison and bias detection
    #[serde(default = "default_pro_model")]
    pub pro_model: String,

    /// Model used for everything else
    #[serde(default = "default_flash_model")]
    pub flash_model: String,

    /// Request timeout (seconds)
    #[serde(default = "default_gemini_timeout")]
    pub timeout_secs: u64,

    /// Max retry attempts for retryable failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff (milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticlesConfig {
    /// Article API base URL
    pub base_url: String,

    /// Request timeout (seconds)
    #[serde(default = "default_articles_timeout")]
    pub timeout_secs: u64,

    /// Default list size when no query is given
    #[serde(default = "default_article_limit")]
    pub default_limit: u32,
}

/// How many items each analysis operation feeds into its prompt.
///
/// Oversized client payloads are sliced to these limits before prompt
/// assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_cluster_limit")]
    pub cluster_input_limit: usize,

    #[serde(default = "default_summary_limit")]
    pub summary_input_limit: usize,

    #[serde(default = "default_bias_limit")]
    pub bias_input_limit: usize,

    #[serde(default = "default_pipeline_limit")]
    pub pipeline_input_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cluster_input_limit: default_cluster_limit(),
            summary_input_limit: default_summary_limit(),
            bias_input_limit: default_bias_limit(),
            pipeline_input_limit: default_pipeline_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_pro_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_flash_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_gemini_timeout() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_articles_timeout() -> u64 {
    15
}

fn default_article_limit() -> u32 {
    100
}

fn default_cluster_limit() -> usize {
    20
}

fn default_summary_limit() -> usize {
    40
}

fn default_bias_limit() -> usize {
    15
}

fn default_pipeline_limit() -> usize {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
