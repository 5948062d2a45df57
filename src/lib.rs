//! MetaView Intelligence Server
//!
//! HTTP service backing the MetaView news-aggregation dashboard. Proxies
//! list/search queries to the external article API and drives
//! structured-output Gemini generations for clustering, strategic summaries,
//! bias scoring, sentiment, translation, and headline comparison.

pub mod analysis;
pub mod api;
pub mod articles;
pub mod config;
pub mod error;
pub mod gemini;
pub mod metrics;
pub mod models;

pub use error::{AppError, Result};
