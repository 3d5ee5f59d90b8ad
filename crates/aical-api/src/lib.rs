//! aical-api: HTTP API for the aical calendar assistant
//!
//! Proxies analysis requests to the generative-AI backend, extracts
//! uploaded calendar data and fronts the calendar backend service.
//! Built with axum for async HTTP handling.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{app, start_server, AppState};
