//! aical-calendar: calendar data for the aical assistant
//!
//! ## Features
//!
//! - ICS event extraction from uploaded calendar exports
//! - Upload batch processing (calendar files and schedule screenshots)
//! - REST client for the calendar backend service
//! - Timezone display helpers
//!
//! ## Usage
//!
//! ```rust
//! use aical_calendar::extract_events;
//!
//! let events = extract_events("BEGIN:VEVENT\r\nSUMMARY:Team Sync\r\nEND:VEVENT\r\n");
//! assert_eq!(events[0].summary.as_deref(), Some("Team Sync"));
//! assert!(events[0].attendees.is_empty());
//! ```

pub mod client;
pub mod error;
pub mod ics;
pub mod models;
pub mod timezone;
pub mod upload;

pub use client::CalendarClient;
pub use error::{CalendarError, Result};
pub use ics::extract_events;
pub use models::{
    AiQueryRequest, AiQueryResponse, BackendErrorBody, BackendEvent, BusyPeriod, EventRecord,
    EventsResponse, FreeBusyRequest, FreeBusyResponse, TodayResponse,
};
pub use timezone::{TimezoneInfo, DEFAULT_TIMEZONE};
pub use upload::{process_uploads, FileKind, ScheduleReader, UploadFile, UploadOutcome};
