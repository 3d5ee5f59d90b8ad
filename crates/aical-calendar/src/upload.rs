//! Upload batch processing
//!
//! Turns a set of uploaded files into extracted events and schedule
//! descriptions, ready to be composed into an analysis request.

use aical_core::llm::{ImageSource, LlmClient};
use aical_core::prompt::{AnalysisRequest, ScheduleDescription, SCHEDULE_IMAGE_INSTRUCTION};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CalendarError, Result};
use crate::ics::extract_events;
use crate::models::EventRecord;

/// Warning attached to a batch that contained unsupported files
pub const UNSUPPORTED_FILES_WARNING: &str =
    "Some files were not in the .ics, .jpg, or .png format and were ignored.";

/// Reads the contents of a schedule screenshot
#[async_trait]
pub trait ScheduleReader: Send + Sync {
    async fn read_schedule(&self, file_name: &str, image: ImageSource) -> Result<String>;
}

#[async_trait]
impl ScheduleReader for LlmClient {
    async fn read_schedule(&self, file_name: &str, image: ImageSource) -> Result<String> {
        debug!("Reading schedule image {}", file_name);
        self.describe_image(SCHEDULE_IMAGE_INSTRUCTION, image)
            .await
            .map_err(|e| CalendarError::Schedule(e.to_string()))
    }
}

/// An uploaded file
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// How a file is handled, judged by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Calendar,
    /// Schedule screenshot with its media type
    Image(&'static str),
    Unsupported,
}

impl FileKind {
    pub fn classify(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".ics") {
            FileKind::Calendar
        } else if lower.ends_with(".jpg") {
            FileKind::Image(ImageSource::MEDIA_TYPE_JPEG)
        } else if lower.ends_with(".png") {
            FileKind::Image(ImageSource::MEDIA_TYPE_PNG)
        } else {
            FileKind::Unsupported
        }
    }
}

/// Result of processing an upload batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadOutcome {
    /// Events from every calendar file, in file order
    pub events: Vec<EventRecord>,
    pub schedules: Vec<ScheduleDescription>,
    pub warnings: Vec<String>,
    /// One entry per file that failed
    pub errors: Vec<String>,
}

impl UploadOutcome {
    /// Events as a pretty-printed JSON array
    pub fn events_json(&self) -> String {
        serde_json::to_string_pretty(&self.events).unwrap_or_else(|_| "[]".to_string())
    }

    /// Build an analysis request from this batch
    pub fn analysis_request(&self, user_prompt: impl Into<String>) -> AnalysisRequest {
        AnalysisRequest::new(user_prompt, self.events_json()).with_schedules(self.schedules.clone())
    }
}

/// Process files in order. A failing file is recorded in
/// [`UploadOutcome::errors`] and does not stop the batch.
pub async fn process_uploads(files: &[UploadFile], reader: &dyn ScheduleReader) -> UploadOutcome {
    let mut outcome = UploadOutcome::default();
    let mut ignored = 0;

    for file in files {
        match FileKind::classify(&file.name) {
            FileKind::Calendar => {
                let document = String::from_utf8_lossy(&file.bytes);
                let events = extract_events(&document);
                debug!("{}: {} events", file.name, events.len());
                outcome.events.extend(events);
            }
            FileKind::Image(media_type) => {
                let image = ImageSource::from_bytes(media_type, &file.bytes);
                match reader.read_schedule(&file.name, image).await {
                    Ok(text) => outcome.schedules.push(ScheduleDescription {
                        file_name: file.name.clone(),
                        text,
                    }),
                    Err(e) => {
                        warn!("Failed to process {}: {}", file.name, e);
                        outcome
                            .errors
                            .push(format!("Error processing {}: {}", file.name, e));
                    }
                }
            }
            FileKind::Unsupported => {
                debug!("Ignoring unsupported file {}", file.name);
                ignored += 1;
            }
        }
    }

    if ignored > 0 {
        outcome.warnings.push(UNSUPPORTED_FILES_WARNING.to_string());
    }

    info!(
        "Processed {} files: {} events, {} schedules, {} errors",
        files.len(),
        outcome.events.len(),
        outcome.schedules.len(),
        outcome.errors.len()
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubReader;

    #[async_trait]
    impl ScheduleReader for StubReader {
        async fn read_schedule(&self, file_name: &str, image: ImageSource) -> Result<String> {
            if file_name.contains("broken") {
                return Err(CalendarError::Schedule("unreadable image".to_string()));
            }
            Ok(format!("{} ({})", file_name, image.media_type))
        }
    }

    fn ics(summary: &str) -> Vec<u8> {
        format!("BEGIN:VCALENDAR\nBEGIN:VEVENT\nSUMMARY:{summary}\nEND:VEVENT\nEND:VCALENDAR\n")
            .into_bytes()
    }

    #[test]
    fn test_classify() {
        assert_eq!(FileKind::classify("work.ICS"), FileKind::Calendar);
        assert_eq!(FileKind::classify("week.png"), FileKind::Image("image/png"));
        assert_eq!(FileKind::classify("week.JPG"), FileKind::Image("image/jpeg"));
        assert_eq!(FileKind::classify("notes.txt"), FileKind::Unsupported);
        assert_eq!(FileKind::classify("photo.jpeg"), FileKind::Unsupported);
    }

    #[tokio::test]
    async fn test_events_concatenated_in_file_order() {
        let files = vec![
            UploadFile::new("a.ics", ics("First")),
            UploadFile::new("b.ics", ics("Second")),
        ];
        let outcome = process_uploads(&files, &StubReader).await;

        let summaries: Vec<_> = outcome
            .events
            .iter()
            .filter_map(|e| e.summary.as_deref())
            .collect();
        assert_eq!(summaries, vec!["First", "Second"]);
        assert!(outcome.warnings.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn test_mixed_batch() {
        let files = vec![
            UploadFile::new("cal.ics", ics("Review")),
            UploadFile::new("week.png", vec![0x89, b'P', b'N', b'G']),
            UploadFile::new("notes.txt", "hello"),
            UploadFile::new("old.doc", "x"),
        ];
        let outcome = process_uploads(&files, &StubReader).await;

        assert_eq!(outcome.events.len(), 1);
        assert_eq!(
            outcome.schedules,
            vec![ScheduleDescription {
                file_name: "week.png".to_string(),
                text: "week.png (image/png)".to_string(),
            }]
        );
        assert_eq!(outcome.warnings, vec![UNSUPPORTED_FILES_WARNING]);
    }

    #[tokio::test]
    async fn test_failing_file_does_not_stop_batch() {
        let files = vec![
            UploadFile::new("broken.jpg", vec![1, 2, 3]),
            UploadFile::new("cal.ics", ics("Still here")),
        ];
        let outcome = process_uploads(&files, &StubReader).await;

        assert_eq!(
            outcome.errors,
            vec!["Error processing broken.jpg: unreadable image"]
        );
        assert_eq!(outcome.events[0].summary.as_deref(), Some("Still here"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_decoded_lossily() {
        let mut bytes = b"BEGIN:VEVENT\nSUMMARY:Caf".to_vec();
        bytes.push(0xff);
        bytes.extend_from_slice(b"\nEND:VEVENT");

        let outcome = process_uploads(&[UploadFile::new("x.ics", bytes)], &StubReader).await;
        assert_eq!(outcome.events[0].summary.as_deref(), Some("Caf\u{fffd}"));
    }

    #[tokio::test]
    async fn test_events_json_and_analysis_request() {
        let outcome = process_uploads(&[], &StubReader).await;
        assert_eq!(outcome.events_json(), "[]");
        assert!(!outcome.analysis_request("q").has_data());

        let outcome = process_uploads(&[UploadFile::new("a.ics", ics("X"))], &StubReader).await;
        let request = outcome.analysis_request("");
        assert!(request.has_data());
        assert!(request.json_data.contains("\"summary\": \"X\""));
    }
}
