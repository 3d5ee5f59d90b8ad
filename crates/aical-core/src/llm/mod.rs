//! LLM API client and types
//!
//! Supports the Gemini API and OpenAI-compatible APIs

mod client;
mod types;

pub use client::{LlmClient, UNKNOWN_FAILURE_MESSAGE};
pub use types::*;
