//! Analysis operations: one fixed prompt template plus a requested JSON
//! response schema per operation, orchestrated over the Gemini client.

mod prompts;
mod service;

pub use service::AnalysisService;
