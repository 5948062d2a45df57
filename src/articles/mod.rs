//! Client for the external article-data API.
//!
//! The upstream is the system of record for articles; this service only
//! forwards queries and smooths over its inconsistencies (varying response
//! envelopes, missing fields).

mod client;

pub use client::ArticleClient;
