use crate::api::{handlers, AppState};
use crate::metrics;
use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let mut router = Router::new()
        // Health and observability
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Article proxying
        .route("/v1/articles", get(handlers::list_articles))
        .route("/v1/articles/search", get(handlers::search_articles))
        .route("/v1/filters", get(handlers::get_filters))
        .route("/v1/metrics/dashboard", get(handlers::get_dashboard_metrics))
        // AI operations
        .route("/v1/compare", post(handlers::compare))
        .route("/v1/cluster", post(handlers::cluster))
        .route("/v1/strategic-summary", post(handlers::strategic_summary))
        .route("/v1/detect-bias", post(handlers::detect_bias))
        .route("/v1/translate", post(handlers::translate))
        .route("/v1/sentiment", post(handlers::sentiment))
        .route("/v1/analyze", post(handlers::analyze))
        // Add state
        .with_state(state);

    // Serve the built dashboard bundle when configured
    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        // Add middleware
        .layer(middleware::from_fn(track_requests))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}

/// Record request counts per method/path/status
async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), path.as_str(), response.status().as_str()])
        .inc();

    response
}
