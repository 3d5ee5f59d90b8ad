//! LLM API types
//!
//! Provider-neutral messages plus the wire formats of the Gemini
//! `generateContent` API and OpenAI-compatible chat completions.

use serde::{Deserialize, Serialize};

/// Message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<MessageContent>,
}

impl Message {
    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![MessageContent::Text { text: text.into() }],
        }
    }

    /// Create a user message with text and image
    pub fn user_with_image(text: impl Into<String>, image: ImageSource) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![
                MessageContent::Text { text: text.into() },
                MessageContent::Image { source: image },
            ],
        }
    }

    /// Get text content from message
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                MessageContent::Text { text } => Some(text.as_str()),
                MessageContent::Image { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if message contains images
    pub fn has_images(&self) -> bool {
        self.content
            .iter()
            .any(|c| matches!(c, MessageContent::Image { .. }))
    }
}

/// Content block in a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: String },
    Image { source: ImageSource },
}

/// Base64 image payload for multimodal input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    pub media_type: String,
    pub data: String,
}

impl ImageSource {
    pub const MEDIA_TYPE_PNG: &'static str = "image/png";
    pub const MEDIA_TYPE_JPEG: &'static str = "image/jpeg";

    /// Create a new image source from base64 data
    pub fn base64(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Create an image source from raw bytes (encodes to base64)
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.into(),
            data: base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes),
        }
    }

    /// Media type for a file name, judged by its extension
    pub fn media_type_for(file_name: &str) -> Option<&'static str> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".png") {
            Some(Self::MEDIA_TYPE_PNG)
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            Some(Self::MEDIA_TYPE_JPEG)
        } else {
            None
        }
    }

    /// Create from a data URL (e.g., "data:image/png;base64,....")
    pub fn from_data_url(data_url: &str) -> Option<Self> {
        let rest = data_url.strip_prefix("data:")?;
        let (header, data) = rest.split_once(',')?;
        let media_type = header.split(';').next().unwrap_or(header);

        Some(Self::base64(media_type, data))
    }

    /// Decode base64 data to bytes
    pub fn decode(&self) -> Option<Vec<u8>> {
        base64::Engine::decode(&base64::engine::general_purpose::STANDARD, &self.data).ok()
    }

    /// Convert to a data URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Provider-neutral completion result
#[derive(Debug, Clone, Default)]
pub struct Completion {
    /// Generated text (may be empty)
    pub text: String,
    /// Provider finish reason, if reported
    pub finish_reason: Option<String>,
    /// Reason the provider gave for refusing the prompt, if any
    pub block_reason: Option<String>,
    pub usage: Option<Usage>,
}

// ============================================================================
// Gemini generateContent types
// ============================================================================

/// Gemini `generateContent` request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<GeminiContent>,
}

impl GenerateContentRequest {
    pub fn from_messages(messages: &[Message]) -> Self {
        Self {
            contents: messages.iter().map(GeminiContent::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

impl From<&Message> for GeminiContent {
    fn from(msg: &Message) -> Self {
        let role = match msg.role.as_str() {
            "assistant" => "model",
            _ => "user",
        };

        let parts = msg
            .content
            .iter()
            .map(|c| match c {
                MessageContent::Text { text } => GeminiPart {
                    text: Some(text.clone()),
                    inline_data: None,
                },
                MessageContent::Image { source } => GeminiPart {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: source.media_type.clone(),
                        data: source.data.clone(),
                    }),
                },
            })
            .collect();

        Self {
            role: Some(role.to_string()),
            parts,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Gemini `generateContent` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
    #[serde(default)]
    pub block_reason_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
}

impl GenerateContentResponse {
    /// Convert to a provider-neutral completion
    pub fn into_completion(self) -> Completion {
        let first = self.candidates.into_iter().next();

        let text = first
            .as_ref()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default();

        let block_reason = self.prompt_feedback.and_then(|f| {
            f.block_reason_message.or(f.block_reason)
        });

        Completion {
            text,
            finish_reason: first.and_then(|c| c.finish_reason),
            block_reason,
            usage: self.usage_metadata.map(|u| Usage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            }),
        }
    }
}

// ============================================================================
// OpenAI-compatible types
// ============================================================================

/// OpenAI-compatible chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiMessage {
    pub role: String,
    pub content: OpenAiContent,
}

/// Plain string content, or a list of parts when images are attached
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpenAiContent {
    Text(String),
    Parts(Vec<OpenAiPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenAiPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

impl From<&Message> for OpenAiMessage {
    fn from(msg: &Message) -> Self {
        let content = if msg.has_images() {
            OpenAiContent::Parts(
                msg.content
                    .iter()
                    .map(|c| match c {
                        MessageContent::Text { text } => OpenAiPart::Text { text: text.clone() },
                        MessageContent::Image { source } => OpenAiPart::ImageUrl {
                            image_url: ImageUrl {
                                url: source.to_data_url(),
                            },
                        },
                    })
                    .collect(),
            )
        } else {
            OpenAiContent::Text(msg.text_content())
        };

        Self {
            role: msg.role.clone(),
            content,
        }
    }
}

/// OpenAI-compatible chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
}

impl ChatCompletionRequest {
    pub fn from_messages(model: impl Into<String>, messages: &[Message]) -> Self {
        Self {
            model: model.into(),
            messages: messages.iter().map(OpenAiMessage::from).collect(),
            max_tokens: None,
        }
    }
}

/// OpenAI-compatible chat completion response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<OpenAiUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessageResponse,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub refusal: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

impl ChatCompletionResponse {
    /// Convert to a provider-neutral completion
    pub fn into_completion(self) -> Completion {
        let first = self.choices.into_iter().next();

        Completion {
            text: first
                .as_ref()
                .and_then(|c| c.message.content.clone())
                .unwrap_or_default(),
            block_reason: first.as_ref().and_then(|c| c.message.refusal.clone()),
            finish_reason: first.and_then(|c| c.finish_reason),
            usage: self.usage.map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        }
    }
}
