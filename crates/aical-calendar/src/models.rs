//! Data models for calendar extraction and the calendar backend

use serde::{Deserialize, Serialize};

use crate::timezone::{convert_to_timezone, normalize_for_api};

/// One calendar event extracted from an ICS document.
///
/// Missing scalar properties serialize as `null`; `attendees` is always
/// present, in source order with duplicates kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub dtstart: Option<String>,
    pub dtend: Option<String>,
    pub status: Option<String>,
    pub organizer: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
}

// ============================================================================
// Calendar backend models
// ============================================================================

/// Event as returned by the calendar backend, times already converted to
/// the requested zone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendEvent {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub all_day: bool,
}

/// `GET /events` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<BackendEvent>,
}

/// `GET /today` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodayResponse {
    #[serde(default)]
    pub events: Vec<BackendEvent>,
    #[serde(default)]
    pub date: String,
}

/// `POST /freebusy` request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreeBusyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl FreeBusyRequest {
    /// Both ends of the range are present and non-blank
    pub fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.start_date) && present(&self.end_date)
    }

    /// Rewrite RFC 3339 range ends into the backend's local format for `zone`
    pub fn normalize_dates(&mut self, zone: &str) {
        for date in [&mut self.start_date, &mut self.end_date].into_iter().flatten() {
            *date = normalize_for_api(date, zone);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyPeriod {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub start_formatted: String,
    #[serde(default)]
    pub end_formatted: String,
}

/// `POST /freebusy` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreeBusyResponse {
    #[serde(default)]
    pub busy_periods: Vec<BusyPeriod>,
    #[serde(default)]
    pub is_busy: bool,
}

impl FreeBusyResponse {
    /// Fill blank display times from the raw period bounds
    pub fn fill_display_times(&mut self, zone: &str) {
        for period in &mut self.busy_periods {
            if period.start_formatted.is_empty() {
                period.start_formatted = convert_to_timezone(&period.start, zone);
            }
            if period.end_formatted.is_empty() {
                period.end_formatted = convert_to_timezone(&period.end, zone);
            }
        }
    }
}

/// `POST /ai-query` request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiQueryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl AiQueryRequest {
    pub fn has_question(&self) -> bool {
        self.question.as_deref().is_some_and(|q| !q.trim().is_empty())
    }
}

/// `POST /ai-query` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiQueryResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub calendar_data: Vec<BackendEvent>,
}

/// Error body used by the backend and mirrored by the proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendErrorBody {
    pub error: String,
}
