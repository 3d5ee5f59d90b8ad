//! Error types for aical-core

use thiserror::Error;

/// Main error type for aical-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// The model returned no text; carries the provider's block reason
    #[error("{0}")]
    EmptyResponse(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for aical-core
pub type Result<T> = std::result::Result<T, Error>;
