//! Analysis prompt composition
//!
//! Combines the user's question, the extracted calendar events (as JSON)
//! and any schedule descriptions read from images into the single prompt
//! sent to the model.

use serde::{Deserialize, Serialize};

/// Prompt used when the user leaves the question blank
pub const DEFAULT_PROMPT: &str = "Based on the following calendar data and schedule information, provide a comprehensive analysis. Include insights about available meeting times, busy periods, and recommendations for optimal scheduling.";

/// Rejection message for a request with nothing to analyse
pub const NO_DATA_MESSAGE: &str = "No data available for analysis. Please upload valid files first.";

/// Instruction sent along with a schedule screenshot
pub const SCHEDULE_IMAGE_INSTRUCTION: &str = "This image shows a schedule or calendar. List every event or busy period you can read, one per line, with its day, date, start and end time and title. Then list the free time slots between them.";

/// Text read from a schedule screenshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDescription {
    pub file_name: String,
    pub text: String,
}

/// Body of an analytics request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub user_prompt: String,
    #[serde(default)]
    pub json_data: String,
    #[serde(default)]
    pub schedule_data: Vec<ScheduleDescription>,
}

impl AnalysisRequest {
    pub fn new(user_prompt: impl Into<String>, json_data: impl Into<String>) -> Self {
        Self {
            user_prompt: user_prompt.into(),
            json_data: json_data.into(),
            schedule_data: Vec::new(),
        }
    }

    pub fn with_schedules(mut self, schedules: Vec<ScheduleDescription>) -> Self {
        self.schedule_data = schedules;
        self
    }

    /// Whether there is any calendar or schedule data to analyse
    pub fn has_data(&self) -> bool {
        let json = self.json_data.trim();
        !(json.is_empty() || json == "[]") || !self.schedule_data.is_empty()
    }

    /// The user's question, or [`DEFAULT_PROMPT`] when blank
    pub fn effective_prompt(&self) -> &str {
        match self.user_prompt.trim() {
            "" => DEFAULT_PROMPT,
            prompt => prompt,
        }
    }

    /// Build the full prompt text for the model
    pub fn compose(&self) -> String {
        let mut prompt = format!(
            "{}\n\nHere is the calendar data:\n\n{}",
            self.effective_prompt(),
            self.json_data
        );

        if !self.schedule_data.is_empty() {
            prompt.push_str("\n\nSchedule Data from Images:\n");
            for (i, schedule) in self.schedule_data.iter().enumerate() {
                prompt.push_str(&format!(
                    "\nSchedule {} ({}):\n{}\n",
                    i + 1,
                    schedule.file_name,
                    schedule.text
                ));
            }
        }

        prompt
    }
}
