//! Data transfer objects for the OpenAI chat completions API.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One part of a multimodal user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text
    Text {
        /// The text
        text: String,
    },
    /// Image reference (URL or data URI)
    ImageUrl {
        /// Image location
        image_url: ImageUrl,
    },
}

impl ContentPart {
    /// Text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Image part.
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

/// Image location inside an `image_url` part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// URL or data URI
    pub url: String,
}

/// Message content: a bare string or a list of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatContent {
    /// Plain string content
    Text(String),
    /// Multimodal parts
    Parts(Vec<ContentPart>),
}

/// A message in the OpenAI chat format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant"
    pub role: String,
    /// Message content
    pub content: ChatContent,
}

/// OpenAI chat completion request.
#[derive(Debug, Clone, Serialize, Builder, Getters)]
#[builder(setter(into))]
pub struct ChatRequest {
    /// Model identifier
    model: String,
    /// Conversation messages
    messages: Vec<ChatMessage>,
    /// Maximum tokens to generate
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Sampling temperature
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Nucleus sampling cutoff
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    /// Enable streaming
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    /// Additional model parameters
    #[builder(default)]
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl ChatRequest {
    /// Creates a new builder for ChatRequest.
    pub fn builder() -> ChatRequestBuilder {
        ChatRequestBuilder::default()
    }
}

/// Assistant message in a response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Generated text
    #[serde(default)]
    pub content: Option<String>,
}

/// A choice in the OpenAI response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// The message content
    pub message: ResponseMessage,
    /// Reason for finishing
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatUsage {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    /// Tokens in the completion
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    /// Total tokens
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

/// OpenAI chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Model that answered
    #[serde(default)]
    pub model: Option<String>,
    /// Response choices
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    /// Token usage
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

/// Incremental delta in a streamed chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkDelta {
    /// Newly generated text
    #[serde(default)]
    pub content: Option<String>,
}

/// A choice in a streamed chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    /// The delta
    pub delta: ChunkDelta,
}

/// One `chat.completion.chunk` event.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunk {
    /// Chunk choices
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

/// Error details in an error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Human readable message
    pub message: String,
}

/// Error body returned with non-2xx statuses or inside a stream.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// The error
    pub error: ApiErrorDetail,
}
