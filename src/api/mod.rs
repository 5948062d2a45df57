pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::{analysis::AnalysisService, articles::ArticleClient};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analysis: Arc<AnalysisService>,
    pub articles: Arc<ArticleClient>,
}

impl AppState {
    pub fn new(analysis: Arc<AnalysisService>, articles: Arc<ArticleClient>) -> Self {
        Self { analysis, articles }
    }
}
