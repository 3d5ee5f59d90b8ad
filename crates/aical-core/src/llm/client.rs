//! LLM API HTTP Client
//!
//! Supports the Gemini API and OpenAI-compatible APIs (Groq, Ollama, etc.)

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::{Config, LlmProvider};
use crate::error::{Error, Result};

use super::types::*;

/// Message returned when the model produced no text and gave no reason
pub const UNKNOWN_FAILURE_MESSAGE: &str = "API request failed with unknown reason!";

/// LLM API client (supports Gemini and OpenAI-compatible APIs)
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    provider: LlmProvider,
}

impl LlmClient {
    /// Create a new LLM client
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(Error::Http)?;

        let llm_config = config.llm_config();

        Ok(Self {
            client,
            api_key: llm_config.api_key.clone(),
            model: llm_config.model.clone(),
            base_url: llm_config.effective_base_url(),
            provider: llm_config.provider.clone(),
        })
    }

    /// Create with custom base URL (for testing or custom endpoints)
    pub fn with_base_url(config: &Config, base_url: String) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.base_url = base_url;
        Ok(client)
    }

    /// Send a conversation to the LLM API
    pub async fn complete(&self, messages: &[Message]) -> Result<Completion> {
        match self.provider {
            LlmProvider::Gemini => self.send_gemini_request(messages).await,
            LlmProvider::OpenAi => self.send_openai_request(messages).await,
        }
    }

    /// Generate text for a single prompt.
    ///
    /// An empty answer is an error carrying the provider's block reason, or
    /// [`UNKNOWN_FAILURE_MESSAGE`] when none was given.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let completion = self.complete(&[Message::user(prompt)]).await?;
        Self::non_empty_text(completion)
    }

    /// Ask the model to describe an image, guided by `instruction`
    pub async fn describe_image(&self, instruction: &str, image: ImageSource) -> Result<String> {
        debug!("Describing {} image ({} base64 bytes)", image.media_type, image.data.len());

        let completion = self
            .complete(&[Message::user_with_image(instruction, image)])
            .await?;
        Self::non_empty_text(completion)
    }

    fn non_empty_text(completion: Completion) -> Result<String> {
        if completion.text.trim().is_empty() {
            let reason = completion
                .block_reason
                .unwrap_or_else(|| UNKNOWN_FAILURE_MESSAGE.to_string());
            warn!("LLM returned no text: {}", reason);
            return Err(Error::EmptyResponse(reason));
        }
        Ok(completion.text)
    }

    /// Send request to the Gemini API
    async fn send_gemini_request(&self, messages: &[Message]) -> Result<Completion> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        debug!("Sending request to Gemini API: {}", url);

        let request = GenerateContentRequest::from_messages(messages);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("Gemini API error: {} - {}", status, body);
            return Err(Error::LlmApi(format!("{}: {}", status, body)));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            Error::LlmApi(format!("Failed to parse response: {} - {}", e, body))
        })?;

        let completion = parsed.into_completion();

        info!(
            "Gemini API response: finish_reason={:?}, tokens={}",
            completion.finish_reason,
            completion.usage.map(|u| u.output_tokens).unwrap_or(0)
        );

        Ok(completion)
    }

    /// Send request to OpenAI-compatible API
    async fn send_openai_request(&self, messages: &[Message]) -> Result<Completion> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!("Sending request to OpenAI-compatible API: {}", url);

        let request = ChatCompletionRequest::from_messages(&self.model, messages);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("OpenAI API error: {} - {}", status, body);
            return Err(Error::LlmApi(format!("{}: {}", status, body)));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            Error::LlmApi(format!("Failed to parse response: {} - {}", e, body))
        })?;

        let completion = parsed.into_completion();

        info!(
            "OpenAI API response: finish_reason={:?}, tokens={}",
            completion.finish_reason,
            completion.usage.map(|u| u.output_tokens).unwrap_or(0)
        );

        Ok(completion)
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the provider type
    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }
}
