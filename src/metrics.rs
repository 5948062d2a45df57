//! Prometheus metrics for the intelligence server.
//!
//! Covers the three things worth watching in a proxy of this shape: inbound
//! HTTP traffic, Gemini generations (by model and operation), and article-API
//! calls. Exported in text exposition format by the `/metrics` endpoint.

use lazy_static::lazy_static;
use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace("metaview_server"),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// Total number of Gemini generation requests
    ///
    /// Labels: model, operation
    pub static ref GEMINI_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("gemini_requests_total", "Total number of Gemini generation requests")
            .namespace("metaview_server"),
        &["model", "operation"]
    ).expect("Failed to create GEMINI_REQUESTS_TOTAL metric");

    /// Total number of failed Gemini generation requests
    ///
    /// Labels: model, operation, error_type
    pub static ref GEMINI_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("gemini_errors_total", "Total number of failed Gemini requests")
            .namespace("metaview_server"),
        &["model", "operation", "error_type"]
    ).expect("Failed to create GEMINI_ERRORS_TOTAL metric");

    /// Gemini request duration in seconds
    ///
    /// Labels: model
    pub static ref GEMINI_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "gemini_request_duration_seconds",
            "Gemini request duration in seconds"
        )
        .namespace("metaview_server")
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0]),
        &["model"]
    ).expect("Failed to create GEMINI_REQUEST_DURATION_SECONDS metric");

    /// Total number of article API requests
    ///
    /// Labels: endpoint, outcome
    pub static ref ARTICLE_API_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("article_api_requests_total", "Total number of article API requests")
            .namespace("metaview_server"),
        &["endpoint", "outcome"]
    ).expect("Failed to create ARTICLE_API_REQUESTS_TOTAL metric");
}

/// Register all metrics with the global registry.
///
/// Call once at startup; registering twice is an error from prometheus.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(GEMINI_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(GEMINI_ERRORS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(GEMINI_REQUEST_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(ARTICLE_API_REQUESTS_TOTAL.clone()))?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Generate Prometheus text format metrics for the `/metrics` endpoint
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
