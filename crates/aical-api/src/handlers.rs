//! HTTP API handlers
//!
//! AI analytics proxy, upload processing and the calendar backend proxy.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use aical_calendar::timezone::{common_timezones, TimezoneInfo};
use aical_calendar::{
    extract_events, AiQueryRequest, AiQueryResponse, EventRecord, EventsResponse,
    FreeBusyRequest, FreeBusyResponse, ScheduleReader, TodayResponse,
};
use aical_core::llm::ImageSource;
use aical_core::prompt::{AnalysisRequest, ScheduleDescription, NO_DATA_MESSAGE};

use crate::error::{ApiError, Result};
use crate::server::AppState;

/// JSON-RPC code for an internal error
pub const JSONRPC_INTERNAL_ERROR: i32 = -32603;
/// JSON-RPC code for invalid parameters
pub const JSONRPC_INVALID_PARAMS: i32 = -32602;

const DEFAULT_MAX_RESULTS: u32 = 10;

// ============================================================================
// Request/Response types
// ============================================================================

/// Generic API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Agent discovery card
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub version: String,
    pub capabilities: AgentCapabilities,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub skills: Vec<AgentSkill>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    pub streaming: bool,
    pub push_notifications: bool,
    pub state_transition_history: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Analytics request payload
#[derive(Debug, Deserialize)]
pub struct AnalyticsPayload {
    #[serde(flatten)]
    pub request: AnalysisRequest,
    /// JSON-RPC request id, echoed back in errors
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyticsResult {
    pub text: String,
}

/// Analytics success payload
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub result: AnalyticsResult,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

/// JSON-RPC style error envelope used by the analytics endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: String,
    pub error: JsonRpcError,
    pub id: Option<serde_json::Value>,
}

impl JsonRpcErrorResponse {
    fn new(code: i32, message: impl Into<String>, id: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            error: JsonRpcError {
                code,
                message: message.into(),
            },
            id,
        }
    }
}

/// Schedule screenshot upload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleImageRequest {
    pub file_name: String,
    /// Defaults to the type implied by the file extension
    #[serde(default)]
    pub media_type: Option<String>,
    /// Base64 image data, or a `data:` URL
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub max_results: Option<u32>,
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TimezoneQuery {
    pub timezone: Option<String>,
}

// ============================================================================
// Handler functions
// ============================================================================

/// Health check endpoint
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "aical",
    }))
}

/// Agent card describing this service
pub async fn agent_card(State(state): State<AppState>) -> Json<AgentCard> {
    Json(AgentCard {
        name: "Free-Busy Calendar Agent".to_string(),
        description: "An AI agent that helps users manage their calendar by checking free/busy status and scheduling events.".to_string(),
        url: state.config.api.advertised_url(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        capabilities: AgentCapabilities {
            streaming: false,
            push_notifications: false,
            state_transition_history: false,
        },
        default_input_modes: vec!["text".to_string(), "text/plain".to_string()],
        default_output_modes: vec!["text".to_string(), "text/plain".to_string()],
        skills: vec![AgentSkill {
            id: "free_busy_check".to_string(),
            name: "free-busy-check".to_string(),
            description: "Checks free/busy status and schedules events".to_string(),
        }],
    })
}

/// Analyse calendar data with the LLM
pub async fn ai_analytics(
    State(state): State<AppState>,
    Json(payload): Json<AnalyticsPayload>,
) -> std::result::Result<Json<AnalyticsResponse>, (StatusCode, Json<JsonRpcErrorResponse>)> {
    let AnalyticsPayload { request, id } = payload;

    if !request.has_data() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(JsonRpcErrorResponse::new(JSONRPC_INVALID_PARAMS, NO_DATA_MESSAGE, id)),
        ));
    }

    let prompt = request.compose();
    debug!(
        "Analytics request: {} chars of prompt, {} schedules",
        prompt.len(),
        request.schedule_data.len()
    );

    match state.llm.generate(&prompt).await {
        Ok(text) => {
            info!("Analytics response: {} chars", text.len());
            Ok(Json(AnalyticsResponse {
                result: AnalyticsResult { text },
            }))
        }
        Err(e) => {
            error!("AI analysis error: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(JsonRpcErrorResponse::new(JSONRPC_INTERNAL_ERROR, e.to_string(), id)),
            ))
        }
    }
}

/// Extract events from a raw ICS document
pub async fn extract(body: Bytes) -> Json<Vec<EventRecord>> {
    let document = String::from_utf8_lossy(&body);
    Json(extract_events(&document))
}

/// Read a schedule screenshot through the vision model
pub async fn schedule_image(
    State(state): State<AppState>,
    Json(req): Json<ScheduleImageRequest>,
) -> Result<Json<ScheduleDescription>> {
    let image = match ImageSource::from_data_url(&req.data) {
        Some(image) => image,
        None => {
            let media_type = req
                .media_type
                .clone()
                .or_else(|| ImageSource::media_type_for(&req.file_name).map(str::to_string))
                .ok_or_else(|| {
                    ApiError::InvalidRequest(format!(
                        "{} is not a .jpg or .png image",
                        req.file_name
                    ))
                })?;
            ImageSource::base64(media_type, req.data.trim())
        }
    };

    if image.decode().is_none() {
        return Err(ApiError::InvalidRequest(
            "image data is not valid base64".to_string(),
        ));
    }

    let text = state.llm.read_schedule(&req.file_name, image).await?;

    Ok(Json(ScheduleDescription {
        file_name: req.file_name,
        text,
    }))
}

/// Common timezones for selection, with their current offsets
pub async fn timezones() -> Json<Vec<TimezoneInfo>> {
    Json(common_timezones())
}

/// Upcoming events from the calendar backend
pub async fn calendar_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>> {
    let timezone = query
        .timezone
        .unwrap_or_else(|| state.default_timezone().to_string());
    let max_results = query.max_results.unwrap_or(DEFAULT_MAX_RESULTS);

    Ok(Json(state.calendar.events(max_results, &timezone).await?))
}

/// Today's events from the calendar backend
pub async fn calendar_today(
    State(state): State<AppState>,
    Query(query): Query<TimezoneQuery>,
) -> Result<Json<TodayResponse>> {
    let timezone = query
        .timezone
        .unwrap_or_else(|| state.default_timezone().to_string());

    Ok(Json(state.calendar.today(&timezone).await?))
}

/// Busy periods in a date range
pub async fn calendar_freebusy(
    State(state): State<AppState>,
    Json(mut req): Json<FreeBusyRequest>,
) -> Result<Json<FreeBusyResponse>> {
    if !req.is_complete() {
        return Err(ApiError::InvalidRequest(
            "start_date and end_date are required".to_string(),
        ));
    }
    let timezone = req
        .timezone
        .get_or_insert_with(|| state.default_timezone().to_string())
        .clone();
    req.normalize_dates(&timezone);

    let mut response = state.calendar.free_busy(&req).await?;
    response.fill_display_times(&timezone);
    Ok(Json(response))
}

/// Question about the hosted calendar, answered by the backend
pub async fn calendar_ai_query(
    State(state): State<AppState>,
    Json(mut req): Json<AiQueryRequest>,
) -> Result<Json<AiQueryResponse>> {
    if !req.has_question() {
        return Err(ApiError::InvalidRequest("question is required".to_string()));
    }
    req.timezone
        .get_or_insert_with(|| state.default_timezone().to_string());

    Ok(Json(state.calendar.ai_query(&req).await?))
}
