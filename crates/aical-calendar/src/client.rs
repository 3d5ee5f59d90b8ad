//! Calendar backend REST client
//!
//! Talks to the calendar agent service that fronts the user's hosted
//! calendar (`/health`, `/events`, `/today`, `/freebusy`, `/ai-query`).

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::error::{CalendarError, Result};
use crate::models::{
    AiQueryRequest, AiQueryResponse, BackendErrorBody, EventsResponse, FreeBusyRequest,
    FreeBusyResponse, TodayResponse,
};

/// Client for the calendar backend service
#[derive(Clone)]
pub struct CalendarClient {
    client: Client,
    base_url: String,
}

impl CalendarClient {
    /// Create a new backend client
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| CalendarError::Configuration(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(CalendarError::Configuration(
                "calendar backend URL is empty".to_string(),
            ));
        }

        info!("Calendar client initialized for: {}", base_url);

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Backend health document
    pub async fn health(&self) -> Result<serde_json::Value> {
        self.send(self.client.get(self.url("health"))).await
    }

    /// Upcoming events
    pub async fn events(&self, max_results: u32, timezone: &str) -> Result<EventsResponse> {
        let request = self.client.get(self.url("events")).query(&[
            ("max_results", max_results.to_string()),
            ("timezone", timezone.to_string()),
        ]);
        let response: EventsResponse = self.send(request).await?;

        info!("Fetched {} events", response.events.len());
        Ok(response)
    }

    /// Today's events in `timezone`
    pub async fn today(&self, timezone: &str) -> Result<TodayResponse> {
        let request = self
            .client
            .get(self.url("today"))
            .query(&[("timezone", timezone)]);
        self.send(request).await
    }

    /// Busy periods within a date range
    pub async fn free_busy(&self, request: &FreeBusyRequest) -> Result<FreeBusyResponse> {
        self.send(self.client.post(self.url("freebusy")).json(request))
            .await
    }

    /// Ask the backend's assistant a question about the calendar
    pub async fn ai_query(&self, request: &AiQueryRequest) -> Result<AiQueryResponse> {
        self.send(self.client.post(self.url("ai-query")).json(request))
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| CalendarError::Connection(e.to_string()))?;

        let status = response.status();
        debug!("Calendar backend responded {} for {}", status, response.url());

        let text = response
            .text()
            .await
            .map_err(|e| CalendarError::Http(e.to_string()))?;

        if !status.is_success() {
            error!("Calendar backend request failed: {} - {}", status, text);
            let message = serde_json::from_str::<BackendErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(CalendarError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| CalendarError::Parse(e.to_string()))
    }
}
