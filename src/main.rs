use metaview_server::{
    analysis::AnalysisService,
    api::{build_router, AppState},
    articles::ArticleClient,
    config::Config,
    gemini::GeminiClient,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metaview_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        default_config()
    });

    tracing::info!("Starting MetaView Intelligence Server v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = metaview_server::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("Prometheus metrics initialized");
        }
    } else {
        tracing::info!("Prometheus metrics disabled in configuration");
    }

    // Initialize upstream clients
    let gemini = Arc::new(GeminiClient::from_config(&config.gemini)?);
    tracing::info!(
        "Gemini client initialized (pro: {}, flash: {})",
        config.gemini.pro_model,
        config.gemini.flash_model
    );

    let articles = Arc::new(ArticleClient::from_config(&config.articles)?);
    tracing::info!("Article API client initialized ({})", config.articles.base_url);

    // Initialize analysis service
    let analysis = Arc::new(AnalysisService::new(
        gemini,
        articles.clone(),
        &config.gemini,
        config.analysis.clone(),
    ));
    tracing::info!("Analysis service initialized");

    // Create application state and build HTTP router
    let app_state = AppState::new(analysis, articles);
    let app = build_router(app_state, config.server.static_dir.clone());

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   REST API: http://{}/v1/articles", http_addr);
    if let Some(dir) = &config.server.static_dir {
        tracing::info!("   Dashboard bundle: {} served at /", dir.display());
    }

    let http_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tracing::info!("Press Ctrl+C to shutdown");

    tokio::select! {
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutting down gracefully...");
    Ok(())
}

fn default_config() -> Config {
    use metaview_server::config::*;

    Config {
        server: ServerConfig {
            host: "0.0.0.0".to_string(),
            http_port: 3000,
            request_timeout_secs: 30,
            static_dir: None,
        },
        gemini: GeminiConfig {
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            pro_model: "gemini-3-pro-preview".to_string(),
            flash_model: "gemini-3-flash-preview".to_string(),
            timeout_secs: 60,
            max_retries: 2,
            retry_backoff_ms: 500,
        },
        articles: ArticlesConfig {
            base_url: "https://metaview-api-production.up.railway.app".to_string(),
            timeout_secs: 15,
            default_limit: 100,
        },
        analysis: AnalysisConfig::default(),
        observability: ObservabilityConfig {
            log_level: "info".to_string(),
            prometheus_enabled: true,
        },
    }
}
