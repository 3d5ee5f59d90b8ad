//! Route definitions
//!
//! Defines all HTTP API endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{
    agent_card, ai_analytics, calendar_ai_query, calendar_events, calendar_freebusy,
    calendar_today, extract, health, schedule_image, timezones,
};
use crate::server::AppState;

/// Create the API router
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Agent discovery
        .route("/.well-known/agent.json", get(agent_card))
        // AI analysis of uploaded calendar data
        .route("/ai-analytics", post(ai_analytics))
        // Upload processing
        .route("/api/extract", post(extract))
        .route("/api/schedule-image", post(schedule_image))
        .route("/api/timezones", get(timezones))
        // Calendar backend proxy
        .route("/calendar/events", get(calendar_events))
        .route("/calendar/today", get(calendar_today))
        .route("/calendar/freebusy", post(calendar_freebusy))
        .route("/calendar/ai-query", post(calendar_ai_query))
}
