//! Client for the Generative Language (Gemini) REST API.
//!
//! Every analysis operation in this service is one `generateContent` call
//! with a fixed prompt and a requested JSON response schema; this module owns
//! the wire format, retry policy, and response parsing for those calls.

mod client;

pub use client::GeminiClient;
