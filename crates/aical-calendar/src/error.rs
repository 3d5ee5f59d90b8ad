//! Error types for aical-calendar

use thiserror::Error;

/// aical-calendar error type
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    /// Non-success response from the calendar backend
    #[error("Calendar backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Reading a schedule image failed
    #[error("{0}")]
    Schedule(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CalendarError>;
