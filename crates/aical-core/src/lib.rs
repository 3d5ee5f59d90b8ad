//! aical-core: shared foundation of the calendar assistant
//!
//! Configuration, the error type, the LLM client (text and vision),
//! analysis prompt composition and report rendering.

pub mod config;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod report;

pub use config::{ApiConfig, CalendarConfig, Config, LlmConfig, LlmProvider};
pub use error::{Error, Result};
pub use llm::{Completion, ImageSource, LlmClient, Message, MessageContent};
pub use prompt::{AnalysisRequest, ScheduleDescription, DEFAULT_PROMPT, NO_DATA_MESSAGE};
pub use report::{render_error_html, render_html};
